use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::coding::*;

/// A (group, object) coordinate identifying a single object within a track.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
	pub group: u64,
	pub object: u64,
}

impl<V: Clone> Decode<V> for Location {
	fn decode<R: bytes::Buf>(r: &mut R, version: V) -> Result<Self, DecodeError> {
		let group = u64::decode(r, version.clone())?;
		let object = u64::decode(r, version)?;
		Ok(Self { group, object })
	}
}

impl<V: Clone> Encode<V> for Location {
	fn encode<W: bytes::BufMut>(&self, w: &mut W, version: V) {
		self.group.encode(w, version.clone());
		self.object.encode(w, version);
	}
}

/// The order in which groups are delivered to a subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u64)]
pub enum GroupOrder {
	Ascending = 0x1,
	Descending = 0x2,
}

impl<V> Encode<V> for GroupOrder {
	fn encode<W: bytes::BufMut>(&self, w: &mut W, version: V) {
		u64::from(*self).encode(w, version);
	}
}

impl<V> Decode<V> for GroupOrder {
	fn decode<R: bytes::Buf>(r: &mut R, version: V) -> Result<Self, DecodeError> {
		Self::try_from(u64::decode(r, version)?).map_err(|_| DecodeError::InvalidValue)
	}
}
