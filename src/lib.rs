//! # moqt-rs: Media over QUIC Transport
//!
//! An implementation of `draft-ietf-moq-transport-15`, the IETF Media over QUIC
//! Transport protocol, built on top of any [web_transport_trait::Session].
//!
//! ## API
//!
//! - [`Session::connect`] / [`Session::accept`] perform the setup handshake and
//!   return a [`Session`] handle.
//! - [`Session::subscribe`] / [`Session::publish`] / [`Session::fetch`] / the
//!   `*_namespace` methods issue requests and await the peer's reply.
//! - [`Session::next_event`] surfaces inbound requests (SUBSCRIBE, PUBLISH,
//!   namespace announcements, GOAWAY) from the peer.
//!
//! The control-plane request/response bookkeeping lives in [ietf]; data-plane
//! fan-out for a relay deployment lives in [relay].

mod config;
mod error;
mod relay;
mod session;
mod stats;

pub mod coding;
pub mod ietf;

pub use config::*;
pub use error::*;
pub use relay::*;
pub use session::*;
pub use stats::*;
