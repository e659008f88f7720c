//! IETF draft-ietf-moq-transport-15 subscribe messages

use std::borrow::Cow;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{
	coding::*,
	ietf::{GroupOrder, Location, Message, Parameters, RequestId, RequestParameters, SubscriptionFilter, TrackNamespace, Version},
};

use super::namespace::{decode_namespace, encode_namespace};

#[derive(Clone, Copy, Debug, TryFromPrimitive, IntoPrimitive)]
#[repr(u64)]
pub enum FilterType {
	NextGroup = 0x01,
	LargestObject = 0x2,
	AbsoluteStart = 0x3,
	AbsoluteRange = 0x4,
}

impl<V> Encode<V> for FilterType {
	fn encode<W: bytes::BufMut>(&self, w: &mut W, version: V) {
		u64::from(*self).encode(w, version);
	}
}

impl<V> Decode<V> for FilterType {
	fn decode<R: bytes::Buf>(r: &mut R, version: V) -> Result<Self, DecodeError> {
		Self::try_from(u64::decode(r, version)?).map_err(|_| DecodeError::InvalidValue)
	}
}

/// Subscribe message (0x03)
/// Sent by the subscriber to request all future objects for the given track.
///
/// Wire layout is exactly `request_id, track_alias, namespace, track_name,
/// params`: the filter and group order carried by earlier drafts as inline
/// fields now live in the SUBSCRIPTION_FILTER and GROUP_ORDER parameters.
#[derive(Clone, Debug)]
pub struct Subscribe<'a> {
	pub request_id: RequestId,
	pub track_alias: u64,
	pub track_namespace: TrackNamespace,
	pub track_name: Cow<'a, str>,
	pub filter: SubscriptionFilter,
	pub group_order: Option<GroupOrder>,
}

impl Message for Subscribe<'_> {
	const ID: u64 = 0x03;

	fn decode_msg<R: bytes::Buf>(r: &mut R, version: Version) -> Result<Self, DecodeError> {
		let request_id = RequestId::decode(r, version)?;
		let track_alias = u64::decode(r, version)?;

		// Decode namespace (tuple of byte strings)
		let track_namespace = decode_namespace(r, version)?;

		let track_name = Cow::<str>::decode(r, version)?;

		let params = RequestParameters::decode(r, version)?;
		let filter = params.filter()?.unwrap_or(SubscriptionFilter::LargestObject);
		let group_order = params.group_order()?;

		Ok(Self {
			request_id,
			track_alias,
			track_namespace,
			track_name,
			filter,
			group_order,
		})
	}

	fn encode_msg<W: bytes::BufMut>(&self, w: &mut W, version: Version) {
		self.request_id.encode(w, version);
		self.track_alias.encode(w, version);
		encode_namespace(w, &self.track_namespace, version);
		self.track_name.encode(w, version);

		let mut params = RequestParameters::default();
		params.set_filter(self.filter);
		if let Some(group_order) = self.group_order {
			params.set_group_order(group_order);
		}
		params.encode(w, version);
	}
}

/// SubscribeOk message (0x04)
#[derive(Clone, Debug)]
pub struct SubscribeOk {
	pub request_id: RequestId,
	pub track_alias: u64,
}

impl Message for SubscribeOk {
	const ID: u64 = 0x04;

	fn encode_msg<W: bytes::BufMut>(&self, w: &mut W, version: Version) {
		self.request_id.encode(w, version);
		self.track_alias.encode(w, version);
		0u64.encode(w, version); // expires = 0
		GroupOrder::Descending.encode(w, version);
		false.encode(w, version); // no content
		0u8.encode(w, version); // no parameters
	}

	fn decode_msg<R: bytes::Buf>(r: &mut R, version: Version) -> Result<Self, DecodeError> {
		let request_id = RequestId::decode(r, version)?;
		let track_alias = u64::decode(r, version)?;

		let expires = u64::decode(r, version)?;
		if expires != 0 {
			return Err(DecodeError::Unsupported);
		}

		// Ignore group order, who cares.
		let _group_order = u8::decode(r, version)?;

		// TODO: We don't support largest group/object yet
		if bool::decode(r, version)? {
			let _group = u64::decode(r, version)?;
			let _object = u64::decode(r, version)?;
		}

		// Ignore parameters, who cares.
		let _params = Parameters::decode(r, version)?;

		Ok(Self {
			request_id,
			track_alias,
		})
	}
}

/// Unsubscribe message (0x0a)
#[derive(Clone, Debug)]
pub struct Unsubscribe {
	pub request_id: RequestId,
}

impl Message for Unsubscribe {
	const ID: u64 = 0x0a;

	fn encode_msg<W: bytes::BufMut>(&self, w: &mut W, version: Version) {
		self.request_id.encode(w, version);
	}

	fn decode_msg<R: bytes::Buf>(r: &mut R, version: Version) -> Result<Self, DecodeError> {
		let request_id = RequestId::decode(r, version)?;
		Ok(Self { request_id })
	}
}

/*
  Type (i) = 0x2,
  Length (16),
  Request ID (i),
  Subscription Request ID (i),
  Start Location (Location),
  End Group (i),
  Subscriber Priority (8),
  Forward (8),
  Number of Parameters (i),
  Parameters (..) ...
*/
#[derive(Debug)]
pub struct SubscribeUpdate {
	pub request_id: RequestId,
	pub subscription_request_id: RequestId,
	pub start_location: Location,
	pub end_group: u64,
	pub subscriber_priority: u8,
	pub forward: bool,
	// pub parameters: Parameters,
}

impl Message for SubscribeUpdate {
	const ID: u64 = 0x02;

	fn encode_msg<W: bytes::BufMut>(&self, w: &mut W, version: Version) {
		self.request_id.encode(w, version);
		self.subscription_request_id.encode(w, version);
		self.start_location.encode(w, version);
		self.end_group.encode(w, version);
		self.subscriber_priority.encode(w, version);
		self.forward.encode(w, version);
		0u8.encode(w, version); // no parameters
	}

	fn decode_msg<R: bytes::Buf>(r: &mut R, version: Version) -> Result<Self, DecodeError> {
		let request_id = RequestId::decode(r, version)?;
		let subscription_request_id = RequestId::decode(r, version)?;
		let start_location = Location::decode(r, version)?;
		let end_group = u64::decode(r, version)?;
		let subscriber_priority = u8::decode(r, version)?;
		let forward = bool::decode(r, version)?;
		let _parameters = Parameters::decode(r, version)?;

		Ok(Self {
			request_id,
			subscription_request_id,
			start_location,
			end_group,
			subscriber_priority,
			forward,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
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
	fn test_subscribe_round_trip() {
		let msg = Subscribe {
			request_id: RequestId(1),
			track_alias: 0,
			track_namespace: namespace(&["test"]),
			track_name: "video".into(),
			filter: SubscriptionFilter::LargestObject,
			group_order: Some(GroupOrder::Descending),
		};

		let encoded = encode_message(&msg);
		let decoded: Subscribe = decode_message(&encoded).unwrap();

		assert_eq!(decoded.request_id, RequestId(1));
		assert_eq!(decoded.track_namespace, namespace(&["test"]));
		assert_eq!(decoded.track_name, "video");
		assert_eq!(decoded.filter, SubscriptionFilter::LargestObject);
		assert_eq!(decoded.group_order, Some(GroupOrder::Descending));
	}

	#[test]
	fn test_subscribe_nested_namespace() {
		let msg = Subscribe {
			request_id: RequestId(100),
			track_alias: 0,
			track_namespace: namespace(&["conference", "room123"]),
			track_name: "audio".into(),
			filter: SubscriptionFilter::LargestObject,
			group_order: None,
		};

		let encoded = encode_message(&msg);
		let decoded: Subscribe = decode_message(&encoded).unwrap();

		assert_eq!(decoded.track_namespace, namespace(&["conference", "room123"]));
		assert_eq!(decoded.group_order, None);
	}

	#[test]
	fn test_subscribe_absolute_range_round_trip() {
		let msg = Subscribe {
			request_id: RequestId(2),
			track_alias: 7,
			track_namespace: namespace(&["live"]),
			track_name: "video".into(),
			filter: SubscriptionFilter::AbsoluteRange(Location { group: 3, object: 0 }, Location { group: 10, object: 0 }),
			group_order: Some(GroupOrder::Ascending),
		};

		let encoded = encode_message(&msg);
		let decoded: Subscribe = decode_message(&encoded).unwrap();

		assert_eq!(
			decoded.filter,
			SubscriptionFilter::AbsoluteRange(Location { group: 3, object: 0 }, Location { group: 10, object: 0 })
		);
	}

	#[test]
	fn test_subscribe_wire_layout_has_nothing_between_track_name_and_params() {
		let msg = Subscribe {
			request_id: RequestId(0),
			track_alias: 0,
			track_namespace: namespace(&["live", "cam1"]),
			track_name: "video".into(),
			filter: SubscriptionFilter::NextGroup,
			group_order: None,
		};

		let encoded = encode_message(&msg);

		// request_id, track_alias, namespace(count + 2 length-prefixed parts), track_name
		let header_len = 1 + 1 + 1 + (1 + 4) + (1 + 4) + (1 + 5);
		// params: count=1, kind=0x21, value length=1, value=NextGroup(0x01)
		assert_eq!(&encoded[header_len..], &[0x01, 0x21, 0x01, 0x01]);
	}

	#[test]
	fn test_subscribe_ok() {
		let msg = SubscribeOk {
			request_id: RequestId(42),
			track_alias: 42,
		};

		let encoded = encode_message(&msg);
		let decoded: SubscribeOk = decode_message(&encoded).unwrap();

		assert_eq!(decoded.request_id, RequestId(42));
	}

	#[test]
	fn test_unsubscribe() {
		let msg = Unsubscribe {
			request_id: RequestId(999),
		};

		let encoded = encode_message(&msg);
		let decoded: Unsubscribe = decode_message(&encoded).unwrap();

		assert_eq!(decoded.request_id, RequestId(999));
	}

	#[test]
	fn test_subscribe_rejects_invalid_filter_type() {
		#[rustfmt::skip]
		let invalid_bytes = vec![
			0x01, // request_id
			0x02, // track_alias
			0x01, // namespace length
			0x04, 0x74, 0x65, 0x73, 0x74, // "test"
			0x05, 0x76, 0x69, 0x64, 0x65, 0x6f, // "video"
			0x01, // num_params
			0x21, // SUBSCRIPTION_FILTER (odd)
			0x01, // value length
			0x99, // INVALID filter_type
		];

		let result: Result<Subscribe, _> = decode_message(&invalid_bytes);
		assert!(result.is_err());
	}

	#[test]
	fn test_subscribe_ok_rejects_non_zero_expires() {
		#[rustfmt::skip]
		let invalid_bytes = vec![
			0x01, // subscribe_id
			0x05, // INVALID: expires = 5
			0x02, // group_order
			0x00, // content_exists
			0x00, // num_params
		];

		let result: Result<SubscribeOk, _> = decode_message(&invalid_bytes);
		assert!(result.is_err());
	}
}
