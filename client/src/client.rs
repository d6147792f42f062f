use bytes::Bytes;
use log::{debug, warn};
use std::net::SocketAddr;
use std::time::Duration;
use stun_mux::attrs::address_attr::decode_mapped;
use stun_mux::attrs::errcode_attr::ErrcodeAttr;
use stun_mux::attrs::xor_address::decode_xor_mapped;
use stun_mux::constants::*;
use stun_mux::header::{MessageClass, TransId};
use stun_mux::packet::Packet;
use stun_mux::util::{new_trans_id, print_bytes};
use stun_mux::{Error, Result};
use tokio::net::UdpSocket;
use tokio::time;

// 每次 discover 单独 bind 一个 socket, 只发一次请求, 不重传
// 函数返回时 socket 随之关闭
pub struct BindingClient {
    local: SocketAddr,
}

impl BindingClient {
    pub fn new(local: SocketAddr) -> Self {
        Self { local }
    }

    pub async fn discover(&self, server: SocketAddr, timeout: Duration) -> Result<SocketAddr> {
        if server.is_ipv6() {
            return Err(Error::UnsupportedFamily(ATTR_FAMILY_IPV6));
        }

        let sock = UdpSocket::bind(self.local).await?;
        let local_addr = sock.local_addr()?;

        let trans_id = new_trans_id();
        let buf = Packet::binding_request(trans_id).pack()?;
        debug!(
            "{} --> {}\n{}",
            local_addr,
            server,
            print_bytes(&buf, " ", 8)
        );

        let sent = sock.send_to(&buf, server).await?;
        debug!("sent: {}", sent);

        let response = match time::timeout(timeout, recv_response(&sock, server, &trans_id)).await {
            Ok(v) => v?,
            Err(_) => {
                debug!("no response from {} within {:?}", server, timeout);
                return Err(Error::Timeout(timeout));
            }
        };

        mapped_address(&response)
    }
}

// 只认来自 server 且 trans_id 一致的响应, 其他的忽略继续等
async fn recv_response(sock: &UdpSocket, server: SocketAddr, trans_id: &TransId) -> Result<Packet> {
    let mut recv_buf = vec![0u8; 2048];

    loop {
        let (len, remote_addr) = sock.recv_from(&mut recv_buf).await?;
        if remote_addr != server {
            debug!("ignore {} bytes from {}, not the server", len, remote_addr);
            continue;
        }

        let buf = Bytes::copy_from_slice(&recv_buf[..len]);
        debug!(
            "<-- {}, len: {}\n{}",
            remote_addr,
            len,
            print_bytes(&buf, " ", 8)
        );

        let response = Packet::unpack(buf)?;
        if response.header.trans_id != *trans_id {
            debug!("ignore response from {}, transaction id not match", remote_addr);
            continue;
        }

        return Ok(response);
    }
}

// 优先 XOR-MAPPED-ADDRESS
pub fn mapped_address(response: &Packet) -> Result<SocketAddr> {
    let header = &response.header;
    if header.method != METHOD_BINDING {
        return Err(Error::ProtocolError(format!(
            "unexpected method: {:#05x}",
            header.method
        )));
    }

    match header.class {
        MessageClass::SuccessResponse => find_address(response)?.ok_or(Error::NoMappedAddress),
        MessageClass::ErrorResponse => match find_address(response)? {
            Some(v) => {
                warn!("error response carries a mapped address, {}", error_reason(response));
                Ok(v)
            }
            None => Err(Error::ProtocolError(format!(
                "error response, {}",
                error_reason(response)
            ))),
        },
        class => Err(Error::ProtocolError(format!(
            "unexpected message class: {:?}",
            class
        ))),
    }
}

fn find_address(packet: &Packet) -> Result<Option<SocketAddr>> {
    if let Some(attr) = packet.find_attr(ATTR_XOR_MAPPED_ADDRESS) {
        return decode_xor_mapped(&attr.value, 0, MAGIC_COOKIE).map(Some);
    }

    if let Some(attr) = packet.find_attr(ATTR_MAPPED_ADDRESS) {
        return decode_mapped(&attr.value, 0).map(Some);
    }

    Ok(None)
}

fn error_reason(packet: &Packet) -> String {
    let attr = match packet.find_attr(ATTR_ERROR_CODE) {
        Some(v) => v,
        None => return "no error code".to_string(),
    };

    match ErrcodeAttr::try_from(attr) {
        Ok(v) => format!("{} {}", v.code, v.msg),
        Err(e) => format!("bad error code, {}", e),
    }
}
