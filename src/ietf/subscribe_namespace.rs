//! MoQT subscribe namespace messages

use crate::{
	coding::*,
	ietf::{Message, Parameters, RequestId, TrackNamespace, Version},
};

use super::namespace::{decode_namespace, encode_namespace};

/// SubscribeNamespace message (0x11)
#[derive(Clone, Debug)]
pub struct SubscribeNamespace {
	pub request_id: RequestId,
	pub namespace: TrackNamespace,
}

impl Message for SubscribeNamespace {
	const ID: u64 = 0x11;

	fn encode_msg<W: bytes::BufMut>(&self, w: &mut W, version: Version) {
		self.request_id.encode(w, version);
		encode_namespace(w, &self.namespace, version);
		0u8.encode(w, version); // no parameters
	}

	fn decode_msg<R: bytes::Buf>(r: &mut R, version: Version) -> Result<Self, DecodeError> {
		let request_id = RequestId::decode(r, version)?;
		let namespace = decode_namespace(r, version)?;

		// Ignore parameters, who cares.
		let _params = Parameters::decode(r, version)?;

		Ok(Self { namespace, request_id })
	}
}

/// UnsubscribeNamespace message (0x14)
#[derive(Clone, Debug)]
pub struct UnsubscribeNamespace {
	pub request_id: RequestId,
}

impl Message for UnsubscribeNamespace {
	const ID: u64 = 0x14;

	fn encode_msg<W: bytes::BufMut>(&self, w: &mut W, version: Version) {
		self.request_id.encode(w, version);
	}

	fn decode_msg<R: bytes::Buf>(r: &mut R, version: Version) -> Result<Self, DecodeError> {
		let request_id = RequestId::decode(r, version)?;
		Ok(Self { request_id })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ietf::{RequestError, RequestOk};
	use bytes::BytesMut;

	fn encode_message<M: Message>(msg: &M) -> Vec<u8> {
		let mut buf = BytesMut::new();
		msg.encode_msg(&mut buf, Version::Draft15);
		buf.to_vec()
	}

	fn decode_message<M: Message>(bytes: &[u8]) -> Result<M, DecodeError> {
		let mut buf = bytes::Bytes::from(bytes.to_vec());
		M::decode_msg(&mut buf, Version::Draft15)
	}

	fn namespace(parts: &[&str]) -> TrackNamespace {
		TrackNamespace::new(parts.iter().map(|p| p.as_bytes()))
	}

	#[test]
	fn test_subscribe_namespace_round_trip() {
		let msg = SubscribeNamespace {
			request_id: RequestId(5),
			namespace: namespace(&["conference", "room1"]),
		};

		let encoded = encode_message(&msg);
		let decoded: SubscribeNamespace = decode_message(&encoded).unwrap();

		assert_eq!(decoded.namespace, namespace(&["conference", "room1"]));
	}

	#[test]
	fn test_subscribe_namespace_uses_generic_request_ok() {
		let msg = RequestOk { request_id: RequestId(5) };
		let encoded = encode_message(&msg);
		let decoded: RequestOk = decode_message(&encoded).unwrap();
		assert_eq!(decoded, msg);
	}

	#[test]
	fn test_subscribe_namespace_uses_generic_request_error() {
		let msg = RequestError {
			request_id: RequestId(5),
			error_code: 6,
			reason_phrase: "TooManySubscribers".into(),
		};

		let encoded = encode_message(&msg);
		let decoded: RequestError = decode_message(&encoded).unwrap();

		assert_eq!(decoded.error_code, 6);
		assert_eq!(decoded.reason_phrase, "TooManySubscribers");
	}

	#[test]
	fn test_unsubscribe_namespace() {
		let msg = UnsubscribeNamespace {
			request_id: RequestId(77),
		};

		let encoded = encode_message(&msg);
		let decoded: UnsubscribeNamespace = decode_message(&encoded).unwrap();

		assert_eq!(decoded.request_id, RequestId(77));
	}
}
