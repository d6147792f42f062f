use crate::attrs::RawAttr;
use crate::constants::*;
use crate::error::{Error, Result};
use bytes::{BufMut, Bytes, BytesMut};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

// mapped-address
//
// reserved(1) family(1) port(2) address(4)
// ipv4: family: 0x01, 4 bytes
// ipv6: family: 0x02, 不支持

pub const ADDRESS_VALUE_LEN: usize = 8;

// 读 offset 开始的 port 和 ipv4, 不做 xor
pub(crate) fn read_ipv4(buf: &[u8], offset: usize) -> Result<(u16, [u8; 4])> {
    if buf.len() < offset + ADDRESS_VALUE_LEN {
        return Err(Error::Malformed(format!(
            "address attr buf len:{} < {}",
            buf.len(),
            offset + ADDRESS_VALUE_LEN
        )));
    }

    // buf[offset] 保留字段
    let mut index = offset + 1;
    let family = buf[index];
    if family != ATTR_FAMILY_IPV4 {
        return Err(Error::UnsupportedFamily(family));
    }

    index += 1;
    let port = u16::from_be_bytes([buf[index], buf[index + 1]]);

    index += 2;
    let mut octets = [0_u8; 4];
    octets.copy_from_slice(&buf[index..index + 4]);

    Ok((port, octets))
}

pub(crate) fn write_ipv4(port: u16, octets: [u8; 4]) -> Bytes {
    let mut bytes_buf = BytesMut::with_capacity(ADDRESS_VALUE_LEN);

    bytes_buf.put_u8(0);
    bytes_buf.put_u8(ATTR_FAMILY_IPV4);
    bytes_buf.put_u16(port);
    bytes_buf.put_slice(&octets);

    bytes_buf.freeze()
}

pub(crate) fn ipv4_of(addr: SocketAddr) -> Result<SocketAddrV4> {
    match addr {
        SocketAddr::V4(v) => Ok(v),
        SocketAddr::V6(_) => Err(Error::UnsupportedFamily(ATTR_FAMILY_IPV6)),
    }
}

pub fn decode_mapped(buf: &[u8], offset: usize) -> Result<SocketAddr> {
    let (port, octets) = read_ipv4(buf, offset)?;
    Ok(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::from(octets), port)))
}

pub fn encode_mapped(addr: SocketAddr) -> Result<Bytes> {
    let addr = ipv4_of(addr)?;
    Ok(write_ipv4(addr.port(), addr.ip().octets()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedAddress {
    pub address: SocketAddr,
}

impl MappedAddress {
    pub fn new(address: SocketAddr) -> Self {
        Self { address }
    }
}

impl TryFrom<MappedAddress> for RawAttr {
    type Error = Error;

    fn try_from(attr: MappedAddress) -> Result<Self> {
        Ok(RawAttr::new(ATTR_MAPPED_ADDRESS, encode_mapped(attr.address)?))
    }
}

impl TryFrom<&RawAttr> for MappedAddress {
    type Error = Error;

    fn try_from(raw_attr: &RawAttr) -> Result<Self> {
        let address = decode_mapped(&raw_attr.value, 0)?;
        Ok(Self { address })
    }
}
