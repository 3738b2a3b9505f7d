//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API the HTTP boundary uses
//! - **Outbound (Driven)**: collaborators the handshake needs

pub mod inbound;
pub mod outbound;
