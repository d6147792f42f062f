// ./stun-mux-server --listen 0.0.0.0:3478

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::anyhow;
use clap::builder::ValueParser;
use clap::{Arg, Command};
use log::{debug, info};

use server::server::Server;
use server::signal::shutdown_channel;
use server::transport::DiscardTransport;
use stun_mux::demux::Demultiplexer;

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

fn parse_listen(s: &str) -> Result<SocketAddr, String> {
    let addr = match s.parse::<SocketAddr>() {
        Ok(v) => v,
        Err(e) => {
            return Err(format!("{}", e));
        }
    };

    if addr.is_ipv6() {
        return Err("ipv6 not support".to_string());
    }

    Ok(addr)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let app = Command::new(APP_NAME)
        .version(APP_VERSION)
        .about("a stun server sharing its udp port with another transport")
        .arg(
            Arg::new("listen")
                .long("listen")
                .takes_value(true)
                .default_value("0.0.0.0:3478")
                .help("listen address")
                .value_parser(ValueParser::new(parse_listen)),
        )
        .arg(
            Arg::new("queue")
                .long("queue")
                .takes_value(true)
                .default_value("1024")
                .help("max datagrams waiting to be processed")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .get_matches();

    let listen: SocketAddr = *app
        .get_one("listen")
        .ok_or_else(|| anyhow!("missing listen address"))?;
    let queue: u32 = *app
        .get_one("queue")
        .ok_or_else(|| anyhow!("missing queue size"))?;

    debug!("listen: {}, queue: {}", listen, queue);

    let signal_rx = shutdown_channel();

    let server = Server::bind(
        listen,
        Demultiplexer::new(),
        Arc::new(DiscardTransport),
        queue as usize,
        signal_rx,
    )
    .await?;

    info!("start server on {} ...", server.local_addr()?);
    server.run().await;

    info!("end.");
    Ok(())
}
