// ./stun-mux-client --server stun.l.google.com:19302 --timeout 3000

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::anyhow;
use clap::builder::ValueParser;
use clap::{Arg, Command};
use client::client::BindingClient;
use log::debug;
use tokio::net::lookup_host;

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

fn parse_addr(s: &str) -> Result<SocketAddr, String> {
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
        .about("a stun client printing the public address of this host")
        .arg(
            Arg::new("server")
                .long("server")
                .takes_value(true)
                .default_value("stun.l.google.com:19302")
                .help("stun server, host:port")
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            Arg::new("local")
                .long("local")
                .takes_value(true)
                .default_value("0.0.0.0:0")
                .help("local bind address")
                .value_parser(ValueParser::new(parse_addr)),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .takes_value(true)
                .default_value("5000")
                .help("response timeout in milliseconds")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .get_matches();

    let server: &String = app
        .get_one("server")
        .ok_or_else(|| anyhow!("missing server"))?;
    let local: SocketAddr = *app
        .get_one("local")
        .ok_or_else(|| anyhow!("missing local address"))?;
    let timeout: u64 = *app
        .get_one("timeout")
        .ok_or_else(|| anyhow!("missing timeout"))?;

    // 只用 ipv4 地址
    let server_addr = lookup_host(server.as_str())
        .await?
        .find(|x| x.is_ipv4())
        .ok_or_else(|| anyhow!("no ipv4 address for {}", server))?;
    debug!("server: {} -> {}, local: {}", server, server_addr, local);

    let client = BindingClient::new(local);
    let public_addr = client
        .discover(server_addr, Duration::from_millis(timeout))
        .await?;

    println!("public address: {}", public_addr);
    Ok(())
}
