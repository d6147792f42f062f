use crate::attrs::RawAttr;
use crate::constants::*;
use crate::error::{Error, Result};
use crate::header::{Header, MessageClass, TransId};
use bytes::{Buf, Bytes, BytesMut};

// 一个完整的 stun 包: 20字节header + 属性列表
// 解码时检查 header 标志位, magic cookie, 属性是否被截断

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub header: Header,
    pub attrs: Vec<RawAttr>,
}

impl Packet {
    pub fn new(header: Header, attrs: Vec<RawAttr>) -> Self {
        let mut packet = Self { header, attrs };
        packet.update_header_len();
        packet
    }

    pub fn binding_request(trans_id: TransId) -> Self {
        let header = Header::new(MessageClass::Request, METHOD_BINDING, trans_id);
        Packet::new(header, vec![])
    }

    fn update_header_len(&mut self) {
        // 超长的包在 pack 时报错
        let total = self.attrs.iter().fold(0_usize, |acc, x| acc + x.len());
        self.header.msg_len = u16::try_from(total).unwrap_or(u16::MAX);
    }

    pub fn add_attr(&mut self, attr: RawAttr) {
        self.attrs.push(attr);
        self.update_header_len();
    }

    // 同类型多个时取第一个
    pub fn find_attr(&self, attr_type: u16) -> Option<&RawAttr> {
        self.attrs.iter().find(|x| x.attr_type == attr_type)
    }

    // msg_len 按 attrs 重新计算, 不用 header 里存的值
    pub fn pack(&self) -> Result<Bytes> {
        let total = self.attrs.iter().fold(0_usize, |acc, x| acc + x.len());
        if total > u16::MAX as usize {
            return Err(Error::Malformed(format!(
                "attrs len:{} > {}",
                total,
                u16::MAX
            )));
        }

        let header = Header {
            msg_len: total as u16,
            ..self.header.clone()
        };

        let mut buf = BytesMut::with_capacity(HEADER_LEN + total);
        header.pack_into(&mut buf);
        for v in self.attrs.iter() {
            v.pack_into(&mut buf)?;
        }

        Ok(buf.freeze())
    }

    pub fn unpack(buf_bytes: Bytes) -> Result<Self> {
        let header = Header::unpack(&buf_bytes)?;

        let end = HEADER_LEN + header.msg_len as usize;
        if end > buf_bytes.len() {
            return Err(Error::Malformed(format!(
                "header len:{} > attr buf len:{}",
                header.msg_len,
                buf_bytes.len() - HEADER_LEN
            )));
        }

        let mut body = buf_bytes.slice(HEADER_LEN..end);
        let mut attr_list = vec![];

        while body.len() >= ATTR_HEADER_LEN {
            if attr_list.len() == MAX_ATTRS {
                return Err(Error::Malformed(format!(
                    "more than {} attributes",
                    MAX_ATTRS
                )));
            }

            let (attr, used) = RawAttr::unpack(&body)?;
            body.advance(used);
            attr_list.push(attr);
        }

        Ok(Self {
            header,
            attrs: attr_list,
        })
    }
}
