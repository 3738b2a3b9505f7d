//! End-to-end handshake scenarios.

pub mod gateway_flows;
pub mod redirect_flows;
