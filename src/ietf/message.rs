use std::borrow::Cow;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{
	coding::*,
	ietf::{RequestId, Version},
};

/// Write a single framed control message directly to a stream.
///
/// The blanket [Encode] impl below only covers the length+payload; the leading
/// type-ID varint is never part of it, so any caller writing a [Message] outside
/// of [crate::ietf::Control] (namely the setup handshake) must add it manually.
pub async fn write_framed<S, T>(writer: &mut Writer<S, Version>, msg: &T, version: Version) -> Result<(), crate::Error>
where
	S: web_transport_trait::SendStream,
	T: Message,
{
	let mut buf = Vec::new();
	T::ID.encode(&mut buf, version);
	msg.encode(&mut buf, version);
	writer.write_all(&mut bytes::Bytes::from(buf)).await
}

/// Read a single framed control message, checking that its type-ID matches `T`.
pub async fn read_framed<S, T>(reader: &mut Reader<S, Version>, version: Version) -> Result<T, crate::Error>
where
	S: web_transport_trait::RecvStream,
	T: Message,
{
	let id: u64 = reader.decode().await?;
	if id != T::ID {
		return Err(crate::Error::UnexpectedMessage);
	}
	reader.decode().await
}

/// The maximum payload size of a single control message, per the 16-bit length prefix.
pub const MAX_CONTROL_PAYLOAD: usize = u16::MAX as usize;

/// A control-stream message: a type tag, a 16-bit length, and a version-specific payload.
///
/// [Message] types only implement [Message::encode_msg]/[Message::decode_msg] (the raw
/// payload); the blanket [Encode]/[Decode] impls below add the length-prefix framing,
/// so callers can treat any [Message] as a a self-delimiting value on the wire.
pub trait Message: Sized + std::fmt::Debug {
	const ID: u64;

	fn encode_msg<W: bytes::BufMut>(&self, w: &mut W, version: Version);
	fn decode_msg<R: bytes::Buf>(r: &mut R, version: Version) -> Result<Self, DecodeError>;
}

impl<T: Message> Encode<Version> for T {
	fn encode<W: bytes::BufMut>(&self, w: &mut W, version: Version) {
		let mut payload = Vec::new();
		self.encode_msg(&mut payload, version);

		assert!(
			payload.len() <= MAX_CONTROL_PAYLOAD,
			"control message payload exceeds 65535 bytes"
		);

		(payload.len() as u16).encode(w, version);
		w.put_slice(&payload);
	}
}

impl<T: Message> Decode<Version> for T {
	fn decode<R: bytes::Buf>(r: &mut R, version: Version) -> Result<Self, DecodeError> {
		let len = u16::decode(r, version)? as usize;
		if r.remaining() < len {
			return Err(DecodeError::Short);
		}

		let mut payload = r.copy_to_bytes(len);
		let msg = T::decode_msg(&mut payload, version)?;

		if payload.has_remaining() {
			return Err(DecodeError::ExpectedEnd);
		}

		Ok(msg)
	}
}

/// Control-stream message type tags, as dispatched off the leading varint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u64)]
pub enum MessageType {
	SubscribeUpdate = 0x02,
	Subscribe = 0x03,
	SubscribeOk = 0x04,
	RequestError = 0x05,
	PublishNamespace = 0x06,
	RequestOk = 0x07,
	TrackStatusOk = 0x0e,
	PublishNamespaceDone = 0x09,
	Unsubscribe = 0x0a,
	PublishDone = 0x0b,
	PublishNamespaceCancel = 0x0c,
	TrackStatus = 0x0d,
	Goaway = 0x10,
	SubscribeNamespace = 0x11,
	UnsubscribeNamespace = 0x14,
	MaxRequestId = 0x15,
	Fetch = 0x16,
	FetchCancel = 0x17,
	FetchOk = 0x18,
	FetchError = 0x19,
	RequestsBlocked = 0x1a,
	Publish = 0x1d,
	PublishOk = 0x1e,
	PublishError = 0x1f,
	ClientSetup = 0x20,
	ServerSetup = 0x21,
}

/// Error codes carried by [RequestError] and session-level GOAWAY/close reasons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u64)]
pub enum ErrorCode {
	NoError = 0x0,
	InternalError = 0x1,
	Unauthorized = 0x2,
	ProtocolViolation = 0x3,
	DuplicateTrackAlias = 0x4,
	ParameterLengthMismatch = 0x5,
	TooManySubscribers = 0x6,
	GoawayTimeout = 0x10,
}

/// The generic acceptance reply for requests that carry no extra response fields
/// (PUBLISH_NAMESPACE, SUBSCRIBE_NAMESPACE). SUBSCRIBE, PUBLISH, and FETCH keep
/// their own bespoke `_OK` messages because they return additional state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestOk {
	pub request_id: RequestId,
}

impl Message for RequestOk {
	const ID: u64 = 0x07;

	fn encode_msg<W: bytes::BufMut>(&self, w: &mut W, version: Version) {
		self.request_id.encode(w, version);
	}

	fn decode_msg<R: bytes::Buf>(r: &mut R, version: Version) -> Result<Self, DecodeError> {
		let request_id = RequestId::decode(r, version)?;
		Ok(Self { request_id })
	}
}

/// The generic rejection reply, sharing the same shape across request kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestError<'a> {
	pub request_id: RequestId,
	pub error_code: u64,
	pub reason_phrase: Cow<'a, str>,
}

impl Message for RequestError<'_> {
	const ID: u64 = 0x05;

	fn encode_msg<W: bytes::BufMut>(&self, w: &mut W, version: Version) {
		self.request_id.encode(w, version);
		self.error_code.encode(w, version);
		self.reason_phrase.encode(w, version);
	}

	fn decode_msg<R: bytes::Buf>(r: &mut R, version: Version) -> Result<Self, DecodeError> {
		let request_id = RequestId::decode(r, version)?;
		let error_code = u64::decode(r, version)?;
		let reason_phrase = Cow::<str>::decode(r, version)?;
		Ok(Self {
			request_id,
			error_code,
			reason_phrase,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bytes::BytesMut;

	#[test]
	fn framing_roundtrip() {
		let msg = RequestOk { request_id: RequestId(7) };

		let mut buf = BytesMut::new();
		msg.encode(&mut buf, Version::Draft15);

		// length prefix (u16) + one-byte varint payload
		assert_eq!(buf.len(), 3);

		let mut r = buf.freeze();
		let decoded = RequestOk::decode(&mut r, Version::Draft15).unwrap();
		assert_eq!(decoded, msg);
	}

	#[test]
	fn rejects_trailing_garbage() {
		let mut buf = BytesMut::new();
		// length = 2, but RequestOk only consumes 1 byte for request_id=0
		2u16.encode(&mut buf, Version::Draft15);
		buf.extend_from_slice(&[0x00, 0xff]);

		let mut r = buf.freeze();
		let result = RequestOk::decode(&mut r, Version::Draft15);
		assert!(matches!(result, Err(DecodeError::ExpectedEnd)));
	}
}
