//! MoQT publish namespace messages

use std::borrow::Cow;

use crate::{
	coding::*,
	ietf::{Message, Parameters, RequestId, TrackNamespace},
};

use super::namespace::{decode_namespace, encode_namespace};

/// PublishNamespace message (0x06)
/// Sent by the publisher to announce the availability of a namespace.
#[derive(Clone, Debug)]
pub struct PublishNamespace {
	pub request_id: RequestId,
	pub track_namespace: TrackNamespace,
}

impl Message for PublishNamespace {
	const ID: u64 = 0x06;

	fn encode_msg<W: bytes::BufMut>(&self, w: &mut W, version: Version) {
		self.request_id.encode(w, version);
		encode_namespace(w, &self.track_namespace, version);
		0u8.encode(w, version); // number of parameters
	}

	fn decode_msg<R: bytes::Buf>(r: &mut R, version: Version) -> Result<Self, DecodeError> {
		let request_id = RequestId::decode(r, version)?;
		let track_namespace = decode_namespace(r, version)?;

		// Ignore parameters, who cares.
		let _params = Parameters::decode(r, version)?;

		Ok(Self {
			request_id,
			track_namespace,
		})
	}
}

/// PublishNamespaceDone message (0x09)
#[derive(Clone, Debug)]
pub struct PublishNamespaceDone {
	pub track_namespace: TrackNamespace,
}

impl Message for PublishNamespaceDone {
	const ID: u64 = 0x09;

	fn encode_msg<W: bytes::BufMut>(&self, w: &mut W, version: Version) {
		encode_namespace(w, &self.track_namespace, version);
	}

	fn decode_msg<R: bytes::Buf>(r: &mut R, version: Version) -> Result<Self, DecodeError> {
		let track_namespace = decode_namespace(r, version)?;
		Ok(Self { track_namespace })
	}
}

/// PublishNamespaceCancel message (0x0c)
#[derive(Clone, Debug)]
pub struct PublishNamespaceCancel<'a> {
	pub track_namespace: TrackNamespace,
	pub error_code: u64,
	pub reason_phrase: Cow<'a, str>,
}

impl Message for PublishNamespaceCancel<'_> {
	const ID: u64 = 0x0c;

	fn encode_msg<W: bytes::BufMut>(&self, w: &mut W, version: Version) {
		encode_namespace(w, &self.track_namespace, version);
		self.error_code.encode(w, version);
		self.reason_phrase.encode(w, version);
	}

	fn decode_msg<R: bytes::Buf>(r: &mut R, version: Version) -> Result<Self, DecodeError> {
		let track_namespace = decode_namespace(r, version)?;
		let error_code = u64::decode(r, version)?;
		let reason_phrase = Cow::<str>::decode(r, version)?;
		Ok(Self {
			track_namespace,
			error_code,
			reason_phrase,
		})
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
	fn test_publish_namespace_round_trip() {
		let msg = PublishNamespace {
			request_id: RequestId(1),
			track_namespace: namespace(&["test", "broadcast"]),
		};

		let encoded = encode_message(&msg);
		let decoded: PublishNamespace = decode_message(&encoded).unwrap();

		assert_eq!(decoded.track_namespace, namespace(&["test", "broadcast"]));
	}

	#[test]
	fn test_publish_namespace_uses_generic_request_ok() {
		let msg = RequestOk { request_id: RequestId(1) };
		let encoded = encode_message(&msg);
		let decoded: RequestOk = decode_message(&encoded).unwrap();
		assert_eq!(decoded, msg);
	}

	#[test]
	fn test_publish_namespace_uses_generic_request_error() {
		let msg = RequestError {
			request_id: RequestId(1),
			error_code: 2,
			reason_phrase: "Unauthorized".into(),
		};

		let encoded = encode_message(&msg);
		let decoded: RequestError = decode_message(&encoded).unwrap();

		assert_eq!(decoded.error_code, 2);
		assert_eq!(decoded.reason_phrase, "Unauthorized");
	}

	#[test]
	fn test_publish_namespace_done() {
		let msg = PublishNamespaceDone {
			track_namespace: namespace(&["old", "stream"]),
		};

		let encoded = encode_message(&msg);
		let decoded: PublishNamespaceDone = decode_message(&encoded).unwrap();

		assert_eq!(decoded.track_namespace, namespace(&["old", "stream"]));
	}

	#[test]
	fn test_publish_namespace_cancel() {
		let msg = PublishNamespaceCancel {
			track_namespace: namespace(&["canceled"]),
			error_code: 1,
			reason_phrase: "Shutdown".into(),
		};

		let encoded = encode_message(&msg);
		let decoded: PublishNamespaceCancel = decode_message(&encoded).unwrap();

		assert_eq!(decoded.track_namespace, namespace(&["canceled"]));
		assert_eq!(decoded.error_code, 1);
		assert_eq!(decoded.reason_phrase, "Shutdown");
	}

	#[test]
	fn test_publish_namespace_rejects_parameters() {
		#[rustfmt::skip]
		let invalid_bytes = vec![
			0x01, // namespace length
			0x04, 0x74, 0x65, 0x73, 0x74, // "test"
			0x01, // INVALID: num_params = 1
		];

		let result: Result<PublishNamespace, _> = decode_message(&invalid_bytes);
		assert!(result.is_err());
	}
}
