//! virt-passwd library exports.
//!
//! The binary in `main.rs` is thin glue; everything with logic lives here
//! so integration tests can drive it through a fake command runner.

pub mod config;
pub mod customize;
pub mod domain;
pub mod preflight;
pub mod process;
pub mod resolve;
pub mod virsh;
