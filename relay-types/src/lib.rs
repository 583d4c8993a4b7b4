//! # relay-types
//!
//! Wire format types for the GreenHost provisioning relay protocol.
//!
//! This crate provides the foundational types used across the relay crates:
//! - [`RequestId`] - correlation identifiers for asynchronous responses
//! - [`RequestEnvelope`], [`EncryptedEnvelope`], [`ResponseEnvelope`] - the
//!   envelope wire format
//! - [`PollReply`], [`ServerStatus`] - poll and status endpoint bodies
//! - [`ProtocolError`] - error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod envelope;
mod error;
mod ids;
mod status;

pub use envelope::{EncryptedEnvelope, Method, PollReply, RequestEnvelope, ResponseEnvelope};
pub use error::ProtocolError;
pub use ids::RequestId;
pub use status::ServerStatus;
