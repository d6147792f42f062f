use crate::attrs::address_attr::{ipv4_of, read_ipv4, write_ipv4};
use crate::attrs::RawAttr;
use crate::constants::*;
use crate::error::{Error, Result};
use bytes::Bytes;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

// xor-mapped-address 端口和ip需要混淆
// port 和 magic cookie 的高16位做 xor
// address(ipv4) 和 magic cookie做xor, 网络字节序, cookie最高字节对应地址第一个字节

fn xor_ipv4(port: u16, octets: [u8; 4], cookie: u32) -> (u16, [u8; 4]) {
    let key = cookie.to_be_bytes();
    let port = port ^ (cookie >> 16) as u16;

    let mut buf = [0_u8; 4];
    for i in 0..buf.len() {
        buf[i] = octets[i] ^ key[i];
    }

    (port, buf)
}

pub fn decode_xor_mapped(buf: &[u8], offset: usize, cookie: u32) -> Result<SocketAddr> {
    let (port, octets) = read_ipv4(buf, offset)?;
    let (port, octets) = xor_ipv4(port, octets, cookie);

    Ok(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::from(octets), port)))
}

pub fn encode_xor_mapped(addr: SocketAddr, cookie: u32) -> Result<Bytes> {
    let addr = ipv4_of(addr)?;
    let (port, octets) = xor_ipv4(addr.port(), addr.ip().octets(), cookie);

    Ok(write_ipv4(port, octets))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XorMappedAddress {
    pub address: SocketAddr,
}

impl XorMappedAddress {
    pub fn new(address: SocketAddr) -> Self {
        Self { address }
    }
}

impl TryFrom<XorMappedAddress> for RawAttr {
    type Error = Error;

    fn try_from(attr: XorMappedAddress) -> Result<Self> {
        let value = encode_xor_mapped(attr.address, MAGIC_COOKIE)?;
        Ok(RawAttr::new(ATTR_XOR_MAPPED_ADDRESS, value))
    }
}

impl TryFrom<&RawAttr> for XorMappedAddress {
    type Error = Error;

    fn try_from(raw_attr: &RawAttr) -> Result<Self> {
        let address = decode_xor_mapped(&raw_attr.value, 0, MAGIC_COOKIE)?;
        Ok(Self { address })
    }
}
