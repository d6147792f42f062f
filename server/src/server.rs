/*
一个 socket, stun 和其他协议共用
recv 任务把数据放进 mpsc 队列, 记录源地址, 数据buf=32k
process 任务逐个交给 demux: stun 从同一个 socket 回包, 其他的交给 transport
一个退出watch
*/

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::watch::Receiver as WatchReceiver;

use bytes::Bytes;
use log::{debug, error, info};
use stun_mux::demux::{Action, Demultiplexer};
use stun_mux::util::print_bytes;

use crate::transport::{Datagram, Transport};

pub struct Server {
    socket: Arc<UdpSocket>,
    demux: Arc<Demultiplexer>,
    transport: Arc<dyn Transport>,
    signal_rx: WatchReceiver<u8>,
    queue_tx: Sender<Datagram>,
    queue_rx: Receiver<Datagram>,
}

impl Server {
    pub async fn bind(
        listen: SocketAddr,
        demux: Demultiplexer,
        transport: Arc<dyn Transport>,
        queue_size: usize,
        signal_rx: WatchReceiver<u8>,
    ) -> io::Result<Self> {
        let (queue_tx, queue_rx) = mpsc::channel::<Datagram>(queue_size);
        let socket = UdpSocket::bind(listen).await?;
        debug!("listening: {:?}", socket.local_addr());

        Ok(Self {
            socket: Arc::new(socket),
            demux: Arc::new(demux),
            transport,
            signal_rx,
            queue_tx,
            queue_rx,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub async fn run(self) {
        let local_addr = match self.socket.local_addr() {
            Ok(v) => v,
            Err(e) => {
                error!("error, local_addr, {:?}", e);
                return;
            }
        };
        info!("serving stun on {}", local_addr);

        let recv_handle = tokio::spawn(recv_udp(
            self.socket.clone(),
            local_addr,
            self.queue_tx,
            self.signal_rx.clone(),
        ));

        let process_handle = tokio::spawn(process_udp(
            self.queue_rx,
            self.signal_rx,
            self.socket,
            self.demux,
            self.transport,
        ));

        let _ = recv_handle.await;
        let _ = process_handle.await;
        info!("server on {} stopped", local_addr);
    }
}

//--------------------------------------------------

async fn recv_udp(
    socket: Arc<UdpSocket>,
    local_addr: SocketAddr,
    sender: Sender<Datagram>,
    mut signal_rx: WatchReceiver<u8>,
) {
    let mut buf = vec![0u8; 32 * 1024];

    loop {
        tokio::select! {
            res = socket.recv_from(&mut buf) => {
                let (len, remote_addr) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        // windows 上对端关闭会报 ConnectionReset, 继续收
                        debug!("error, recv_udp, {}, {:?}", local_addr, e);
                        continue;
                    }
                };
                let data = Bytes::copy_from_slice(&buf[..len]);

                debug!("{} <--- {}, len: {}\n{}", local_addr, remote_addr, len, print_bytes(&data, " ", 8));

                if let Err(e) = sender.send((data, remote_addr)).await {
                    error!("error, recv_udp, {}, {:?}", local_addr, e);
                    break;
                }
            },
            _ = signal_rx.changed() => {
                debug!("recv signal, recv_udp, {} will exit.", local_addr);
                break;
            }
        }
    }
}

async fn process_udp(
    mut receiver: Receiver<Datagram>,
    mut signal_rx: WatchReceiver<u8>,
    socket: Arc<UdpSocket>,
    demux: Arc<Demultiplexer>,
    transport: Arc<dyn Transport>,
) {
    loop {
        tokio::select! {
            input = receiver.recv() => {
                match input {
                    Some(input) => process_one(input, &socket, &demux, transport.as_ref()).await,
                    None => break,
                }
            },
            _ = signal_rx.changed() => {
                debug!("recv signal, process_udp, will exit.");
                break;
            }
        }
    }
}

async fn process_one(
    input: Datagram,
    socket: &UdpSocket,
    demux: &Demultiplexer,
    transport: &dyn Transport,
) {
    let (data, remote_addr) = input;

    match demux.on_datagram(data, remote_addr) {
        Ok(Action::Reply { data, to }) => send_reply(socket, &data, to).await,
        Ok(Action::Pass { data, from }) => transport.on_datagram(data, from),
        Err(e) => {
            // 坏包只丢弃, 不影响 socket
            error!("drop datagram from {}, {}", remote_addr, e);
        }
    }
}

async fn send_reply(socket: &UdpSocket, data: &[u8], dst_addr: SocketAddr) {
    match socket.send_to(data, dst_addr).await {
        Ok(v) => {
            debug!("---> {}, sent: {}\n{}", dst_addr, v, print_bytes(data, " ", 8));
        }
        Err(e) => {
            error!("error, ---> {}, {:?}", dst_addr, e);
        }
    };
}
