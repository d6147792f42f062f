use crate::attrs::RawAttr;
use crate::constants::ATTR_ERROR_CODE;
use crate::error::{Error, Result};
use crate::util;
use bytes::{BufMut, BytesMut};

// reserved: 21 bit
// class:  3 bit        3-6
// number: 8 bit        0-99
// reason: utf8, 由 RawAttr 负责填充

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrcodeAttr {
    pub code: u16,
    pub msg: String,
}

impl ErrcodeAttr {
    pub fn new(code: u16, msg: &str) -> Self {
        Self {
            code,
            msg: msg.to_string(),
        }
    }

    pub fn is_valid(&self) -> bool {
        (300..700).contains(&self.code)
    }
}

impl From<ErrcodeAttr> for RawAttr {
    fn from(attr: ErrcodeAttr) -> Self {
        let mut bytes_buf = BytesMut::with_capacity(4 + attr.msg.len());
        bytes_buf.put_u16(0);
        bytes_buf.put_u16(util::pack_error_code(attr.code));
        bytes_buf.put_slice(attr.msg.as_bytes());

        RawAttr::new(ATTR_ERROR_CODE, bytes_buf.freeze())
    }
}

impl TryFrom<&RawAttr> for ErrcodeAttr {
    type Error = Error;

    fn try_from(raw_attr: &RawAttr) -> Result<Self> {
        let value = &raw_attr.value;
        if value.len() < 4 {
            return Err(Error::Malformed(format!(
                "err_code attr buf len:{} < 4",
                value.len()
            )));
        }

        let code = util::unpack_error_code(u16::from_be_bytes([value[2], value[3]]));

        let msg = match std::str::from_utf8(&value[4..]) {
            Ok(v) => v.trim_end().to_string(),
            Err(e) => {
                return Err(Error::Malformed(format!("err_code reason not utf8, {}", e)));
            }
        };

        let attr = Self { code, msg };
        if !attr.is_valid() {
            return Err(Error::Malformed(format!("err_code {} out of range", attr.code)));
        }

        Ok(attr)
    }
}
