//! Data models shared by the gateway and the maintenance services

mod reports;
mod storage;

pub use reports::*;
pub use storage::*;
