use std::net::SocketAddr;

use bytes::Bytes;
use log::{debug, error};
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};

// demux 不处理的包都交给它 (quic, http/3)
pub trait Transport: Send + Sync {
    fn on_datagram(&self, data: Bytes, sender: SocketAddr);
}

pub struct DiscardTransport;

impl Transport for DiscardTransport {
    fn on_datagram(&self, data: Bytes, sender: SocketAddr) {
        debug!("no transport attached, drop {} bytes from {}", data.len(), sender);
    }
}

// remote addr, recv data
pub type Datagram = (Bytes, SocketAddr);

pub struct ChannelTransport {
    tx: Sender<Datagram>,
}

impl ChannelTransport {
    pub fn new(capacity: usize) -> (Self, Receiver<Datagram>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl Transport for ChannelTransport {
    fn on_datagram(&self, data: Bytes, sender: SocketAddr) {
        // 不能阻塞 demux, 队列满了直接丢
        match self.tx.try_send((data, sender)) {
            Ok(_) => {}
            Err(TrySendError::Full((data, _))) => {
                error!("transport queue full, drop {} bytes from {}", data.len(), sender);
            }
            Err(TrySendError::Closed(_)) => {
                error!("transport closed, drop datagram from {}", sender);
            }
        }
    }
}
