use std::net::SocketAddr;

use crate::attrs::xor_address::encode_xor_mapped;
use crate::attrs::RawAttr;
use crate::constants::*;
use crate::error::{Error, Result};
use crate::header::{Header, MessageClass};
use crate::packet::Packet;

// 只回一个 XOR-MAPPED-ADDRESS, trans_id 原样带回
pub fn respond(request: &Packet, sender: SocketAddr) -> Result<Packet> {
    let header = &request.header;
    if !header.is_binding_request() {
        return Err(Error::ProtocolError(format!(
            "expected binding request, got {:?} method {:#05x}",
            header.class, header.method
        )));
    }

    let value = encode_xor_mapped(sender, MAGIC_COOKIE)?;
    let response_header = Header::new(
        MessageClass::SuccessResponse,
        METHOD_BINDING,
        header.trans_id,
    );

    Ok(Packet::new(
        response_header,
        vec![RawAttr::new(ATTR_XOR_MAPPED_ADDRESS, value)],
    ))
}
