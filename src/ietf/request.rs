use crate::coding::*;

/// A request identifier, allocated by the side that issues a request.
///
/// Clients allocate even IDs, servers allocate odd IDs, starting at 0/1 and increasing by 2.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl RequestId {
	/// Return the current value, then bump by 2 for the next allocation.
	pub fn increment(&mut self) -> Self {
		let id = *self;
		self.0 += 2;
		id
	}
}

impl<V> Decode<V> for RequestId {
	fn decode<R: bytes::Buf>(r: &mut R, version: V) -> Result<Self, DecodeError> {
		Ok(Self(u64::decode(r, version)?))
	}
}

impl<V> Encode<V> for RequestId {
	fn encode<W: bytes::BufMut>(&self, w: &mut W, version: V) {
		self.0.encode(w, version);
	}
}

impl std::fmt::Display for RequestId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.0.fmt(f)
	}
}
