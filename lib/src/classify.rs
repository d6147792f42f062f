use crate::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Stun,
    Other,
}

// 只看前20字节, 只认 binding request, 其他 stun 消息也算 Other
pub fn classify(buf: &[u8]) -> Classification {
    if buf.len() < HEADER_LEN {
        return Classification::Other;
    }

    // quic long header 第一个字节最高位是1
    if buf[0] & 0xC0 != 0 {
        return Classification::Other;
    }

    let msg_type = u16::from_be_bytes([buf[0], buf[1]]);
    if msg_type != MESSAGE_TYPE_BIND_REQ {
        return Classification::Other;
    }

    if buf[4..8] != MAGIC_COOKIE_BYTES {
        return Classification::Other;
    }

    Classification::Stun
}
