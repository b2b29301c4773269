//! LuCI RPC module
//!
//! Session management and UCI calls against an OpenWRT router.

pub mod jsonrpc;
pub mod session;
pub mod uci;

// Public re-exports
pub use session::Session;
pub use uci::{UciClient, UciMethod};
