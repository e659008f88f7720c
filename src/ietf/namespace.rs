use crate::coding::*;

const MAX_NAMESPACE_TUPLE: u64 = 32;

/// A track namespace: an ordered tuple of opaque byte strings.
///
/// Unlike a slash-joined path, each element is an independent length-prefixed byte string,
/// so a namespace element containing `/` round-trips unambiguously.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TrackNamespace(Vec<bytes::Bytes>);

impl TrackNamespace {
	pub fn new<I, T>(parts: I) -> Self
	where
		I: IntoIterator<Item = T>,
		T: Into<bytes::Bytes>,
	{
		Self(parts.into_iter().map(Into::into).collect())
	}

	pub fn parts(&self) -> &[bytes::Bytes] {
		&self.0
	}
}

impl std::fmt::Display for TrackNamespace {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for (i, part) in self.0.iter().enumerate() {
			if i > 0 {
				write!(f, "/")?;
			}
			write!(f, "{}", String::from_utf8_lossy(part))?;
		}
		Ok(())
	}
}

impl<S: Into<bytes::Bytes>> From<Vec<S>> for TrackNamespace {
	fn from(parts: Vec<S>) -> Self {
		Self::new(parts)
	}
}

pub fn encode_namespace<W: bytes::BufMut, V: Clone>(w: &mut W, namespace: &TrackNamespace, version: V) {
	namespace.0.len().encode(w, version.clone());
	for part in &namespace.0 {
		part.encode(w, version.clone());
	}
}

pub fn decode_namespace<R: bytes::Buf, V: Clone>(r: &mut R, version: V) -> Result<TrackNamespace, DecodeError> {
	let count = u64::decode(r, version.clone())?;
	if count > MAX_NAMESPACE_TUPLE {
		return Err(DecodeError::TooMany);
	}

	let mut parts = Vec::with_capacity(count as usize);
	for _ in 0..count {
		parts.push(bytes::Bytes::decode(r, version.clone())?);
	}

	Ok(TrackNamespace(parts))
}

#[cfg(test)]
mod tests {
	use super::*;
	use bytes::BytesMut;

	#[test]
	fn roundtrip() {
		let ns = TrackNamespace::new([&b"live"[..], b"cam1"]);
		let mut buf = BytesMut::new();
		encode_namespace(&mut buf, &ns, ());

		let mut r = buf.freeze();
		let decoded = decode_namespace(&mut r, ()).unwrap();
		assert_eq!(decoded, ns);
	}

	#[test]
	fn empty() {
		let ns = TrackNamespace::default();
		let mut buf = BytesMut::new();
		encode_namespace(&mut buf, &ns, ());
		assert_eq!(buf.to_vec(), vec![0x00]);
	}

	#[test]
	fn slash_in_element_is_preserved() {
		let ns = TrackNamespace::new([&b"a/b"[..]]);
		let mut buf = BytesMut::new();
		encode_namespace(&mut buf, &ns, ());
		let mut r = buf.freeze();
		let decoded = decode_namespace(&mut r, ()).unwrap();
		assert_eq!(decoded.parts()[0], &b"a/b"[..]);
	}
}
