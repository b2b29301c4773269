//! VPN instance module
//!
//! Registry of OpenVPN sections per router and the polling that keeps it
//! current.

pub mod instance;
pub mod registry;
pub mod router;

// Public re-exports
pub use instance::VpnInstance;
pub use registry::{get_enabled, set_enabled, RegistryEvent, VpnRegistry};
pub use router::{run_poller, Router, Routers};
