//! MoQT setup handshake messages

use crate::{
	coding,
	coding::*,
	ietf::{Message, ParameterBytes, ParameterVarInt, Parameters, Version},
};

/// ClientSetup message (0x20). The client advertises the draft versions it
/// supports; the server picks one and replies with [ServerSetup].
#[derive(Clone, Debug)]
pub struct ClientSetup {
	pub versions: Vec<Version>,
	pub parameters: Parameters,
}

impl ClientSetup {
	pub fn path(&self) -> Option<&str> {
		self.parameters
			.get_bytes(ParameterBytes::Path)
			.and_then(|b| std::str::from_utf8(b).ok())
	}

	pub fn authority(&self) -> Option<&str> {
		self.parameters
			.get_bytes(ParameterBytes::Authority)
			.and_then(|b| std::str::from_utf8(b).ok())
	}

	pub fn max_request_id(&self) -> u64 {
		self.parameters.get_varint(ParameterVarInt::MaxRequestId).unwrap_or(0)
	}
}

impl Message for ClientSetup {
	const ID: u64 = 0x20;

	fn encode_msg<W: bytes::BufMut>(&self, w: &mut W, version: Version) {
		self.versions.len().encode(w, version);
		for v in &self.versions {
			v.coding().0.encode(w, version);
		}
		self.parameters.encode(w, version);
	}

	fn decode_msg<R: bytes::Buf>(r: &mut R, version: Version) -> Result<Self, DecodeError> {
		let count = u64::decode(r, version)? as usize;
		if count == 0 || count > 64 {
			return Err(DecodeError::TooMany);
		}

		let mut versions = Vec::with_capacity(count);
		for _ in 0..count {
			let raw = coding::Version(u64::decode(r, version)?);
			if let Ok(v) = Version::try_from(raw) {
				versions.push(v);
			}
		}

		let parameters = Parameters::decode(r, version)?;

		Ok(Self { versions, parameters })
	}
}

/// ServerSetup message (0x21). Confirms the negotiated draft version.
#[derive(Clone, Debug)]
pub struct ServerSetup {
	pub version: Version,
	pub parameters: Parameters,
}

impl ServerSetup {
	pub fn max_request_id(&self) -> u64 {
		self.parameters.get_varint(ParameterVarInt::MaxRequestId).unwrap_or(0)
	}
}

impl Message for ServerSetup {
	const ID: u64 = 0x21;

	fn encode_msg<W: bytes::BufMut>(&self, w: &mut W, version: Version) {
		self.version.coding().0.encode(w, version);
		self.parameters.encode(w, version);
	}

	fn decode_msg<R: bytes::Buf>(r: &mut R, version: Version) -> Result<Self, DecodeError> {
		let raw = coding::Version(u64::decode(r, version)?);
		let negotiated = Version::try_from(raw).map_err(|_| DecodeError::Unsupported)?;
		let parameters = Parameters::decode(r, version)?;

		Ok(Self {
			version: negotiated,
			parameters,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bytes::BytesMut;

	fn roundtrip<M: Message>(msg: M) -> M {
		let mut buf = BytesMut::new();
		msg.encode_msg(&mut buf, Version::Draft15);
		let mut r = buf.freeze();
		M::decode_msg(&mut r, Version::Draft15).unwrap()
	}

	#[test]
	fn client_setup_round_trip() {
		let mut parameters = Parameters::default();
		parameters.set_bytes(ParameterBytes::Path, b"/moq".to_vec());
		parameters.set_varint(ParameterVarInt::MaxRequestId, 100);

		let msg = ClientSetup {
			versions: vec![Version::Draft15],
			parameters,
		};

		let decoded = roundtrip(msg);
		assert_eq!(decoded.versions, vec![Version::Draft15]);
		assert_eq!(decoded.path(), Some("/moq"));
		assert_eq!(decoded.max_request_id(), 100);
	}

	#[test]
	fn server_setup_round_trip() {
		let mut parameters = Parameters::default();
		parameters.set_varint(ParameterVarInt::MaxRequestId, 50);

		let msg = ServerSetup {
			version: Version::Draft15,
			parameters,
		};

		let decoded = roundtrip(msg);
		assert_eq!(decoded.version, Version::Draft15);
		assert_eq!(decoded.max_request_id(), 50);
	}

	#[test]
	fn client_setup_rejects_empty_version_list() {
		let mut buf = BytesMut::new();
		0u8.encode(&mut buf, Version::Draft15);

		let mut r = buf.freeze();
		let result = ClientSetup::decode_msg(&mut r, Version::Draft15);
		assert!(result.is_err());
	}

	#[test]
	fn server_setup_rejects_unsupported_version() {
		let mut buf = BytesMut::new();
		0xdead_beefu64.encode(&mut buf, Version::Draft15);
		0u8.encode(&mut buf, Version::Draft15); // empty parameters

		let mut r = buf.freeze();
		let result = ServerSetup::decode_msg(&mut r, Version::Draft15);
		assert!(result.is_err());
	}
}
