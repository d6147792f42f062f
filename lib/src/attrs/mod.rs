#![allow(clippy::len_without_is_empty)]

use bytes::{BufMut, Bytes, BytesMut};

use crate::constants::ATTR_HEADER_LEN;
use crate::error::{Error, Result};
use crate::util;

pub mod address_attr;
pub mod errcode_attr;
pub mod xor_address;

// type(2) + length(2) + value, value 填充到4字节边界
// length 是填充之前的长度
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttr {
    pub attr_type: u16,
    pub value: Bytes,
}

impl RawAttr {
    pub fn new(attr_type: u16, value: Bytes) -> Self {
        Self { attr_type, value }
    }

    // 包括4字节属性头和填充
    pub fn len(&self) -> usize {
        ATTR_HEADER_LEN + util::padded_len(self.value.len())
    }

    pub fn pack_into(&self, buf: &mut BytesMut) -> Result<()> {
        let value_len = self.value.len();
        if value_len > u16::MAX as usize {
            return Err(Error::Malformed(format!(
                "attr {:#06x} value len:{} > {}",
                self.attr_type,
                value_len,
                u16::MAX
            )));
        }

        buf.put_u16(self.attr_type);
        buf.put_u16(value_len as u16);
        buf.put_slice(&self.value);
        buf.put_bytes(0, util::padded_len(value_len) - value_len);

        Ok(())
    }

    // 返回 (属性, 占用的字节数含填充)
    pub fn unpack(buf: &Bytes) -> Result<(Self, usize)> {
        if buf.len() < ATTR_HEADER_LEN {
            return Err(Error::Malformed(format!("attr buf len:{}", buf.len())));
        }

        let attr_type = u16::from_be_bytes([buf[0], buf[1]]);
        let attr_len = u16::from_be_bytes([buf[2], buf[3]]) as usize;

        let value_end = ATTR_HEADER_LEN + attr_len;
        if buf.len() < value_end {
            return Err(Error::Malformed(format!(
                "attr {:#06x} truncated, buf len:{} < {}",
                attr_type,
                buf.len(),
                value_end
            )));
        }

        let used = ATTR_HEADER_LEN + util::padded_len(attr_len);
        if buf.len() < used {
            return Err(Error::Malformed(format!(
                "attr {:#06x} padding overflows message, buf len:{} < {}",
                attr_type,
                buf.len(),
                used
            )));
        }

        let value = buf.slice(ATTR_HEADER_LEN..value_end);

        Ok((Self { attr_type, value }, used))
    }
}
