use crate::constants::*;
use bytes::{BufMut, BytesMut};

use crate::error::{Error, Result};

pub type TransId = [u8; TRANS_ID_LEN];

// message type 里的两个 class 位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageClass {
    Request,
    Indication,
    SuccessResponse,
    ErrorResponse,
}

impl MessageClass {
    fn bits(self) -> u16 {
        match self {
            MessageClass::Request => 0b00,
            MessageClass::Indication => 0b01,
            MessageClass::SuccessResponse => 0b10,
            MessageClass::ErrorResponse => 0b11,
        }
    }

    fn from_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0b00 => MessageClass::Request,
            0b01 => MessageClass::Indication,
            0b10 => MessageClass::SuccessResponse,
            _ => MessageClass::ErrorResponse,
        }
    }
}

//  0                 1
//  2  3  4 5 6 7 8 9 0 1 2 3 4 5
// +--+--+-+-+-+-+-+-+-+-+-+-+-+-+
// |M |M |M|M|M|C|M|M|M|C|M|M|M|M|
// |11|10|9|8|7|1|6|5|4|0|3|2|1|0|
// +--+--+-+-+-+-+-+-+-+-+-+-+-+-+
pub fn message_type(class: MessageClass, method: u16) -> u16 {
    let class = class.bits();

    ((method & 0x0F80) << 2)
        | ((method & 0x0070) << 1)
        | (method & 0x000F)
        | ((class & 0b10) << 7)
        | ((class & 0b01) << 4)
}

// 最高两位不看
pub fn split_message_type(msg_type: u16) -> (MessageClass, u16) {
    let class = MessageClass::from_bits(((msg_type & 0x0100) >> 7) | ((msg_type & 0x0010) >> 4));
    let method = ((msg_type & 0x3E00) >> 2) | ((msg_type & 0x00E0) >> 1) | (msg_type & 0x000F);

    (class, method)
}

// rfc 5389, 6
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub class: MessageClass,
    pub method: u16,

    // 不包括header的20字节, 是填充之后的属性总长度
    pub msg_len: u16,

    pub trans_id: TransId,
}

impl Header {
    pub fn new(class: MessageClass, method: u16, trans_id: TransId) -> Self {
        Self {
            class,
            method,
            msg_len: 0,
            trans_id,
        }
    }

    pub fn msg_type(&self) -> u16 {
        message_type(self.class, self.method)
    }

    pub fn is_binding_request(&self) -> bool {
        self.class == MessageClass::Request && self.method == METHOD_BINDING
    }

    pub fn pack_into(&self, buf: &mut BytesMut) {
        buf.put_u16(self.msg_type());
        buf.put_u16(self.msg_len);
        buf.put_u32(MAGIC_COOKIE);
        buf.put_slice(&self.trans_id);
    }

    pub fn unpack(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_LEN {
            return Err(Error::Malformed(format!(
                "header buf len:{} < {}",
                buf.len(),
                HEADER_LEN
            )));
        }

        if buf[0] & 0xC0 != 0 {
            return Err(Error::Malformed(format!(
                "leading bits of first byte not zero: {:#04x}",
                buf[0]
            )));
        }

        let mut index = 0_usize;
        let msg_type = u16::from_be_bytes([buf[index], buf[index + 1]]);

        index += 2;
        let msg_len = u16::from_be_bytes([buf[index], buf[index + 1]]);

        index += 2;
        if buf[index..index + 4] != MAGIC_COOKIE_BYTES {
            return Err(Error::Malformed(format!(
                "bad magic cookie: {:02x?}",
                &buf[index..index + 4]
            )));
        }

        index += 4;
        let mut trans_id = [0_u8; TRANS_ID_LEN];
        trans_id.copy_from_slice(&buf[index..index + TRANS_ID_LEN]);

        let (class, method) = split_message_type(msg_type);

        Ok(Self {
            class,
            method,
            msg_len,
            trans_id,
        })
    }
}
