pub mod attrs;
pub mod classify;
pub mod constants;
pub mod demux;
pub mod error;
pub mod header;
pub mod packet;
pub mod responder;
pub mod util;

pub use error::{Error, Result};
