//! The root error type returned by every fallible operation in this crate.

use std::sync::Arc;

use crate::coding::DecodeError;

/// Blanket trait so [Error::Transport] can hold any transport-layer error
/// without a generic parameter leaking through the whole API.
pub trait SendSyncError: std::error::Error + Send + Sync + 'static {}
impl<T: std::error::Error + Send + Sync + 'static> SendSyncError for T {}

#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
	#[error("transport error: {0}")]
	Transport(Arc<dyn SendSyncError>),

	#[error("decode error: {0}")]
	Decode(#[from] DecodeError),

	#[error("{0}")]
	Request(#[from] crate::ietf::RequestFailed),

	#[error("cancelled")]
	Cancel,

	#[error("invalid role for this operation")]
	InvalidRole,

	#[error("not found")]
	NotFound,

	#[error("duplicate")]
	Duplicate,

	#[error("unsupported")]
	Unsupported,

	#[error("no common version: offered {offered:?}, supported {supported:?}")]
	Version { offered: Vec<u64>, supported: Vec<u64> },

	#[error("stale request, already superseded")]
	Old,

	#[error("wrong size")]
	WrongSize,

	#[error("unexpected stream")]
	UnexpectedStream,

	#[error("unexpected message")]
	UnexpectedMessage,

	#[error("request id exceeds the peer's advertised maximum")]
	TooManyRequests,

	#[error("duplicate track alias")]
	DuplicateTrackAlias,

	#[error("protocol violation")]
	ProtocolViolation,
}

impl Error {
	/// Map this error to a QUIC/WebTransport application error code, per the
	/// `ErrorCode` values used on the wire for session-level close reasons.
	pub fn to_code(&self) -> u32 {
		match self {
			Error::Transport(_) => 0x00,
			Error::Decode(_) => 0x03,
			Error::Request(_) => 0x03,
			Error::Cancel => 0x00,
			Error::InvalidRole => 0x02,
			Error::NotFound => 0x01,
			Error::Duplicate => 0x04,
			Error::Unsupported => 0x03,
			Error::Version { .. } => 0x03,
			Error::Old => 0x03,
			Error::WrongSize => 0x03,
			Error::UnexpectedStream => 0x03,
			Error::UnexpectedMessage => 0x03,
			Error::TooManyRequests => 0x03,
			Error::DuplicateTrackAlias => 0x04,
			Error::ProtocolViolation => 0x03,
		}
	}
}
