use bytes::{Bytes, BytesMut};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use stun_mux::attrs::xor_address::decode_xor_mapped;
use stun_mux::classify::{classify, Classification};
use stun_mux::constants::*;
use stun_mux::demux::{Action, Demultiplexer, Outcome};
use stun_mux::header::{Header, MessageClass};
use stun_mux::packet::Packet;
use stun_mux::responder::respond;
use stun_mux::Error;

const TRANS_ID: [u8; TRANS_ID_LEN] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B,
];

fn sender() -> SocketAddr {
    "203.0.113.5:54321".parse().unwrap()
}

fn quic_initial() -> Bytes {
    let mut buf = vec![0xC0, 0x00, 0x00, 0x00, 0x01, 0x08];
    buf.extend_from_slice(&[0x21, 0x12, 0xA4, 0x42]);
    buf.resize(1200, 0);
    Bytes::from(buf)
}

#[test]
pub fn test_classify_binding_request() {
    let buf = Packet::binding_request(TRANS_ID).pack().unwrap();
    assert_eq!(classify(&buf), Classification::Stun);

    let mut raw = [0u8; 20];
    raw[1] = 0x01;
    raw[4..8].copy_from_slice(&[0x21, 0x12, 0xA4, 0x42]);
    assert_eq!(classify(&raw), Classification::Stun);
}

#[test]
pub fn test_classify_rejects() {
    // 长度不够
    let buf = Packet::binding_request(TRANS_ID).pack().unwrap();
    assert_eq!(classify(&buf[..19]), Classification::Other);

    // quic long header, cookie 在 offset 4 也不算
    let mut raw = BytesMut::from(&buf[..]);
    raw[0] = 0xC0;
    assert_eq!(classify(&raw), Classification::Other);
    assert_eq!(classify(&quic_initial()), Classification::Other);

    // binding success response is STUN but not a request
    let response = Packet::new(
        Header::new(MessageClass::SuccessResponse, METHOD_BINDING, TRANS_ID),
        vec![],
    );
    assert_eq!(classify(&response.pack().unwrap()), Classification::Other);

    // wrong cookie
    let mut raw = BytesMut::from(&buf[..]);
    raw[4] = 0x00;
    assert_eq!(classify(&raw), Classification::Other);

    assert_eq!(classify(b"GET / HTTP/1.1\r\nHost: a\r\n\r\n"), Classification::Other);
}

#[test]
pub fn test_respond_vector() {
    let request = Packet::binding_request(TRANS_ID);
    let response = respond(&request, sender()).unwrap();

    assert_eq!(response.header.class, MessageClass::SuccessResponse);
    assert_eq!(response.header.method, METHOD_BINDING);
    assert_eq!(response.header.trans_id, TRANS_ID);
    assert_eq!(response.attrs.len(), 1);

    let buf = response.pack().unwrap();
    assert_eq!(&buf[0..2], &[0x01, 0x01]);
    // message length
    assert_eq!(&buf[2..4], &[0x00, 0x0C]);
    assert_eq!(&buf[8..20], &TRANS_ID);
    assert_eq!(&buf[20..24], &[0x00, 0x20, 0x00, 0x08]);
    assert_eq!(&buf[24..26], &[0x00, 0x01]);
    assert_eq!(u16::from_be_bytes([buf[26], buf[27]]), 54321 ^ 0x2112);

    let expected: Vec<u8> = [203u8, 0, 113, 5]
        .iter()
        .zip([0x21u8, 0x12, 0xA4, 0x42].iter())
        .map(|(a, b)| a ^ b)
        .collect();
    assert_eq!(&buf[28..32], &expected[..]);

    assert_eq!(decode_xor_mapped(&buf, 24, MAGIC_COOKIE).unwrap(), sender());
}

#[test]
pub fn test_respond_is_stateless() {
    let request = Packet::binding_request(TRANS_ID);
    let a = respond(&request, sender()).unwrap();
    let b = respond(&request, sender()).unwrap();
    assert_eq!(a, b);

    let other: SocketAddr = "198.51.100.1:1".parse().unwrap();
    let c = respond(&request, other).unwrap();
    assert_eq!(a.header, c.header);
    assert_ne!(a.attrs, c.attrs);
}

#[test]
pub fn test_respond_rejects_non_binding_request() {
    let indication = Packet::new(
        Header::new(MessageClass::Indication, METHOD_BINDING, TRANS_ID),
        vec![],
    );
    assert!(matches!(
        respond(&indication, sender()),
        Err(Error::ProtocolError(_))
    ));

    // allocate request
    let allocate = Packet::new(Header::new(MessageClass::Request, 0x0003, TRANS_ID), vec![]);
    assert!(matches!(
        respond(&allocate, sender()),
        Err(Error::ProtocolError(_))
    ));
}

#[test]
pub fn test_respond_ipv6_sender() {
    let request = Packet::binding_request(TRANS_ID);
    let addr: SocketAddr = "[2001:db8::1]:3478".parse().unwrap();
    assert!(matches!(
        respond(&request, addr),
        Err(Error::UnsupportedFamily(ATTR_FAMILY_IPV6))
    ));
}

#[test]
pub fn test_demux_replies_to_stun() {
    let demux = Demultiplexer::new();
    let buf = Packet::binding_request(TRANS_ID).pack().unwrap();

    let (data, to) = match demux.on_datagram(buf, sender()).unwrap() {
        Action::Reply { data, to } => (data, to),
        other => panic!("expected reply, got {:?}", other),
    };

    assert_eq!(to, sender());
    let response = Packet::unpack(data).unwrap();
    assert_eq!(response.header.class, MessageClass::SuccessResponse);
    assert_eq!(response.header.trans_id, TRANS_ID);
}

#[test]
pub fn test_demux_passes_other_unchanged() {
    let demux = Demultiplexer::new();
    let buf = quic_initial();

    let action = demux.on_datagram(buf.clone(), sender()).unwrap();
    assert_eq!(
        action,
        Action::Pass {
            data: buf,
            from: sender()
        }
    );
}

#[test]
pub fn test_demux_malformed_stun() {
    let demux = Demultiplexer::new();

    // classifies as a binding request but claims 8 bytes of attributes it does not carry
    let mut buf = BytesMut::from(&Packet::binding_request(TRANS_ID).pack().unwrap()[..]);
    buf[3] = 8;

    assert!(matches!(
        demux.on_datagram(buf.freeze(), sender()),
        Err(Error::Malformed(_))
    ));
}

#[test]
pub fn test_demux_stage_order() {
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = seen.clone();

    let demux = Demultiplexer::new()
        .with_stage(move |_data: &Bytes, _from: SocketAddr| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Outcome::Next)
        })
        .with_stage(|data: &Bytes, from: SocketAddr| {
            if data.starts_with(b"ping") {
                return Ok(Outcome::Handled(Action::Reply {
                    data: Bytes::from_static(b"pong"),
                    to: from,
                }));
            }
            Ok(Outcome::Next)
        });

    // stun stage answers first, later stages never run
    let stun = Packet::binding_request(TRANS_ID).pack().unwrap();
    assert!(matches!(
        demux.on_datagram(stun, sender()).unwrap(),
        Action::Reply { .. }
    ));
    assert_eq!(seen.load(Ordering::SeqCst), 0);

    let action = demux
        .on_datagram(Bytes::from_static(b"ping"), sender())
        .unwrap();
    assert_eq!(
        action,
        Action::Reply {
            data: Bytes::from_static(b"pong"),
            to: sender()
        }
    );
    assert_eq!(seen.load(Ordering::SeqCst), 1);

    let action = demux
        .on_datagram(Bytes::from_static(b"other"), sender())
        .unwrap();
    assert!(matches!(action, Action::Pass { .. }));
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

#[test]
pub fn test_empty_demux_passes_everything() {
    let demux = Demultiplexer::empty();
    let buf = Packet::binding_request(TRANS_ID).pack().unwrap();

    assert!(matches!(
        demux.on_datagram(buf, sender()).unwrap(),
        Action::Pass { .. }
    ));
}
