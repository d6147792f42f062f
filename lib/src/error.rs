use std::io;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // 长度不够, 标志位不对, 属性被截断
    #[error("malformed stun message: {0}")]
    Malformed(String),

    // 只支持 ipv4
    #[error("unsupported address family: {0}")]
    UnsupportedFamily(u8),

    // class 或 method 不是期望的值
    #[error("protocol error: {0}")]
    ProtocolError(String),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("response has neither MAPPED-ADDRESS nor XOR-MAPPED-ADDRESS")]
    NoMappedAddress,

    #[error("io: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
