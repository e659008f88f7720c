//! MoQT session-level control messages: GOAWAY and request-ID flow control.

use std::borrow::Cow;

use crate::{
	coding::*,
	ietf::{Message, Version},
};

/// Goaway message (0x10). Tells the peer to re-establish the session elsewhere,
/// draining outstanding requests on the current one first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Goaway<'a> {
	pub new_session_uri: Cow<'a, str>,
}

impl Message for Goaway<'_> {
	const ID: u64 = 0x10;

	fn encode_msg<W: bytes::BufMut>(&self, w: &mut W, version: Version) {
		self.new_session_uri.encode(w, version);
	}

	fn decode_msg<R: bytes::Buf>(r: &mut R, version: Version) -> Result<Self, DecodeError> {
		let new_session_uri = Cow::<str>::decode(r, version)?;
		Ok(Self { new_session_uri })
	}
}

/// MaxRequestId message (0x15). Raises the peer's request-ID ceiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaxRequestId {
	pub request_id: u64,
}

impl Message for MaxRequestId {
	const ID: u64 = 0x15;

	fn encode_msg<W: bytes::BufMut>(&self, w: &mut W, version: Version) {
		self.request_id.encode(w, version);
	}

	fn decode_msg<R: bytes::Buf>(r: &mut R, version: Version) -> Result<Self, DecodeError> {
		let request_id = u64::decode(r, version)?;
		Ok(Self { request_id })
	}
}

/// RequestsBlocked message (0x1a). Sent when the sender wants to issue a new
/// request but is blocked by the peer's current MAX_REQUEST_ID.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestsBlocked {
	pub maximum_request_id: u64,
}

impl Message for RequestsBlocked {
	const ID: u64 = 0x1a;

	fn encode_msg<W: bytes::BufMut>(&self, w: &mut W, version: Version) {
		self.maximum_request_id.encode(w, version);
	}

	fn decode_msg<R: bytes::Buf>(r: &mut R, version: Version) -> Result<Self, DecodeError> {
		let maximum_request_id = u64::decode(r, version)?;
		Ok(Self { maximum_request_id })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bytes::BytesMut;

	fn roundtrip<M: Message + Clone + PartialEq + std::fmt::Debug>(msg: M) -> M {
		let mut buf = BytesMut::new();
		msg.encode_msg(&mut buf, Version::Draft15);
		let mut r = buf.freeze();
		M::decode_msg(&mut r, Version::Draft15).unwrap()
	}

	#[test]
	fn goaway_round_trip() {
		let msg = Goaway {
			new_session_uri: "https://relay.example/moq".into(),
		};
		assert_eq!(roundtrip(msg.clone()), msg);
	}

	#[test]
	fn goaway_empty_uri_means_same_session() {
		let msg = Goaway { new_session_uri: "".into() };
		assert_eq!(roundtrip(msg.clone()), msg);
	}

	#[test]
	fn max_request_id_round_trip() {
		let msg = MaxRequestId { request_id: 1000 };
		assert_eq!(roundtrip(msg), msg);
	}

	#[test]
	fn requests_blocked_round_trip() {
		let msg = RequestsBlocked { maximum_request_id: 42 };
		assert_eq!(roundtrip(msg), msg);
	}
}
