use std::net::SocketAddr;

use bytes::Bytes;
use log::debug;

use crate::classify::{classify, Classification};
use crate::error::Result;
use crate::packet::Packet;
use crate::responder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // 从同一个 socket 回包
    Reply { data: Bytes, to: SocketAddr },
    // 不是 stun, 原样交给外部 transport
    Pass { data: Bytes, from: SocketAddr },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Handled(Action),
    Next,
}

pub type Stage = Box<dyn Fn(&Bytes, SocketAddr) -> Result<Outcome> + Send + Sync>;

pub struct Demultiplexer {
    stages: Vec<Stage>,
}

impl Default for Demultiplexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Demultiplexer {
    pub fn new() -> Self {
        Self::empty().with_stage(stun_stage)
    }

    pub fn empty() -> Self {
        Self { stages: vec![] }
    }

    // 按添加顺序执行
    pub fn with_stage<F>(mut self, stage: F) -> Self
    where
        F: Fn(&Bytes, SocketAddr) -> Result<Outcome> + Send + Sync + 'static,
    {
        self.stages.push(Box::new(stage));
        self
    }

    // 返回错误时调用方直接丢包
    pub fn on_datagram(&self, data: Bytes, sender: SocketAddr) -> Result<Action> {
        for stage in self.stages.iter() {
            if let Outcome::Handled(action) = stage(&data, sender)? {
                return Ok(action);
            }
        }

        Ok(Action::Pass { data, from: sender })
    }
}

pub fn stun_stage(data: &Bytes, sender: SocketAddr) -> Result<Outcome> {
    if classify(data) == Classification::Other {
        return Ok(Outcome::Next);
    }

    let request = Packet::unpack(data.clone())?;
    let response = responder::respond(&request, sender)?;
    debug!("binding request from {}, {} attrs", sender, request.attrs.len());

    Ok(Outcome::Handled(Action::Reply {
        data: response.pack()?,
        to: sender,
    }))
}
