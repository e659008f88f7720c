//! MoQT track status messages

use std::borrow::Cow;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{
	coding::*,
	ietf::{FilterType, GroupOrder, Location, Message, Parameters, RequestId, TrackNamespace, Version},
};

use super::namespace::{decode_namespace, encode_namespace};

/// TrackStatus message (0x0d). A query for the current status of a track.
#[derive(Clone, Debug)]
pub struct TrackStatus<'a> {
	pub request_id: RequestId,
	pub track_namespace: TrackNamespace,
	pub track_name: Cow<'a, str>,
}

impl Message for TrackStatus<'_> {
	const ID: u64 = 0x0d;

	fn encode_msg<W: bytes::BufMut>(&self, w: &mut W, version: Version) {
		self.request_id.encode(w, version);
		encode_namespace(w, &self.track_namespace, version);
		self.track_name.encode(w, version);
		0u8.encode(w, version); // subscriber priority
		GroupOrder::Descending.encode(w, version);
		false.encode(w, version); // forward
		FilterType::LargestObject.encode(w, version); // filter type
		0u8.encode(w, version); // no parameters
	}

	fn decode_msg<R: bytes::Buf>(r: &mut R, version: Version) -> Result<Self, DecodeError> {
		let request_id = RequestId::decode(r, version)?;
		let track_namespace = decode_namespace(r, version)?;
		let track_name = Cow::<str>::decode(r, version)?;

		let _subscriber_priority = u8::decode(r, version)?;
		let _group_order = GroupOrder::decode(r, version)?;
		let _forward = bool::decode(r, version)?;
		let _filter_type = u64::decode(r, version)?;

		// Ignore parameters, who cares.
		let _params = Parameters::decode(r, version)?;

		Ok(Self {
			request_id,
			track_namespace,
			track_name,
		})
	}
}

/// The status of a track, as reported in [TrackStatusOk].
#[derive(Clone, Copy, Debug, TryFromPrimitive, IntoPrimitive)]
#[repr(u64)]
pub enum TrackStatusCode {
	InProgress = 0x00,
	NotFound = 0x01,
	NotAuthorized = 0x02,
	Ended = 0x03,
}

impl<V> Encode<V> for TrackStatusCode {
	fn encode<W: bytes::BufMut>(&self, w: &mut W, version: V) {
		u64::from(*self).encode(w, version);
	}
}

impl<V> Decode<V> for TrackStatusCode {
	fn decode<R: bytes::Buf>(r: &mut R, version: V) -> Result<Self, DecodeError> {
		Self::try_from(u64::decode(r, version)?).map_err(|_| DecodeError::InvalidValue)
	}
}

/// TrackStatusOk message (0x0e). The reply to [TrackStatus], carrying an explicit
/// status code and the largest known location for the track.
#[derive(Clone, Debug)]
pub struct TrackStatusOk {
	pub request_id: RequestId,
	pub status_code: TrackStatusCode,
	pub largest_location: Location,
}

impl Message for TrackStatusOk {
	const ID: u64 = 0x0e;

	fn encode_msg<W: bytes::BufMut>(&self, w: &mut W, version: Version) {
		self.request_id.encode(w, version);
		self.status_code.encode(w, version);
		self.largest_location.encode(w, version);
	}

	fn decode_msg<R: bytes::Buf>(r: &mut R, version: Version) -> Result<Self, DecodeError> {
		let request_id = RequestId::decode(r, version)?;
		let status_code = TrackStatusCode::decode(r, version)?;
		let largest_location = Location::decode(r, version)?;

		Ok(Self {
			request_id,
			status_code,
			largest_location,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bytes::BytesMut;

	fn roundtrip<M: Message + PartialEq + std::fmt::Debug>(msg: M) -> M {
		let mut buf = BytesMut::new();
		msg.encode_msg(&mut buf, Version::Draft15);
		let mut r = buf.freeze();
		M::decode_msg(&mut r, Version::Draft15).unwrap()
	}

	impl PartialEq for TrackStatusOk {
		fn eq(&self, other: &Self) -> bool {
			self.request_id == other.request_id
				&& self.status_code as u64 == other.status_code as u64
				&& self.largest_location == other.largest_location
		}
	}

	#[test]
	fn track_status_ok_round_trip() {
		let msg = TrackStatusOk {
			request_id: RequestId(9),
			status_code: TrackStatusCode::InProgress,
			largest_location: Location { group: 4, object: 2 },
		};

		let decoded = roundtrip(msg.clone());
		assert_eq!(decoded, msg);
	}
}
