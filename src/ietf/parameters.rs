use std::collections::{HashMap, hash_map};

use num_enum::{FromPrimitive, IntoPrimitive};

use crate::{
	coding::*,
	ietf::{FilterType, Location},
};

const MAX_PARAMS: u64 = 64;

/// Setup-handshake parameter ids (CLIENT_SETUP/SERVER_SETUP).
#[derive(Debug, Copy, Clone, FromPrimitive, IntoPrimitive, Eq, Hash, PartialEq)]
#[repr(u64)]
pub enum ParameterVarInt {
	MaxRequestId = 2,
	MaxAuthTokenCacheSize = 4,
	#[num_enum(catch_all)]
	Unknown(u64),
}

#[derive(Debug, Copy, Clone, FromPrimitive, IntoPrimitive, Eq, Hash, PartialEq)]
#[repr(u64)]
pub enum ParameterBytes {
	Path = 1,
	AuthorizationToken = 3,
	Authority = 5,
	Implementation = 7,
	#[num_enum(catch_all)]
	Unknown(u64),
}

/// Version-scoped parameter ids, carried on SUBSCRIBE/PUBLISH/FETCH rather
/// than the setup handshake. This is a separate registry from
/// [ParameterVarInt]/[ParameterBytes]: DELIVERY_TIMEOUT and MAX_REQUEST_ID
/// both use `2`, which only works because each lives in its own enum.
#[derive(Debug, Copy, Clone, FromPrimitive, IntoPrimitive, Eq, Hash, PartialEq)]
#[repr(u64)]
pub enum RequestParameterVarInt {
	DeliveryTimeout = 2,
	GroupOrder = 0x22,
	#[num_enum(catch_all)]
	Unknown(u64),
}

#[derive(Debug, Copy, Clone, FromPrimitive, IntoPrimitive, Eq, Hash, PartialEq)]
#[repr(u64)]
pub enum RequestParameterBytes {
	SubscriptionFilter = 0x21,
	#[num_enum(catch_all)]
	Unknown(u64),
}

/// Which objects of a track a SUBSCRIBE wants, carried as the
/// SUBSCRIPTION_FILTER parameter's value bytes: `filter_type` followed by
/// whatever bounds that filter type requires. A filter type that needs bounds
/// but whose bytes run out while decoding them fails with
/// [DecodeError::InvalidArgument] rather than the generic [DecodeError::Short] -
/// the parameter's bytes were present, just structurally incomplete.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SubscriptionFilter {
	NextGroup,
	LargestObject,
	AbsoluteStart(Location),
	AbsoluteRange(Location, Location),
}

impl SubscriptionFilter {
	pub fn filter_type(&self) -> FilterType {
		match self {
			Self::NextGroup => FilterType::NextGroup,
			Self::LargestObject => FilterType::LargestObject,
			Self::AbsoluteStart(_) => FilterType::AbsoluteStart,
			Self::AbsoluteRange(..) => FilterType::AbsoluteRange,
		}
	}
}

impl<V: Clone> Encode<V> for SubscriptionFilter {
	fn encode<W: bytes::BufMut>(&self, w: &mut W, version: V) {
		self.filter_type().encode(w, version.clone());
		match self {
			Self::NextGroup | Self::LargestObject => {}
			Self::AbsoluteStart(start) => start.encode(w, version),
			Self::AbsoluteRange(start, end) => {
				start.encode(w, version.clone());
				end.encode(w, version);
			}
		}
	}
}

impl<V: Clone> Decode<V> for SubscriptionFilter {
	fn decode<R: bytes::Buf>(r: &mut R, version: V) -> Result<Self, DecodeError> {
		let map_missing = |e| match e {
			DecodeError::Short => DecodeError::InvalidArgument,
			e => e,
		};

		Ok(match FilterType::decode(r, version.clone())? {
			FilterType::NextGroup => Self::NextGroup,
			FilterType::LargestObject => Self::LargestObject,
			FilterType::AbsoluteStart => {
				Self::AbsoluteStart(Location::decode(r, version).map_err(map_missing)?)
			}
			FilterType::AbsoluteRange => {
				let start = Location::decode(r, version.clone()).map_err(map_missing)?;
				let end = Location::decode(r, version).map_err(map_missing)?;
				Self::AbsoluteRange(start, end)
			}
		})
	}
}

/// A version-agnostic bag of wire parameters, generic over the numeric-id
/// registry a particular message kind draws from (see [ParameterVarInt] vs
/// [RequestParameterVarInt]). Even-typed entries carry an inline varint;
/// odd-typed entries carry a length-prefixed byte string.
#[derive(Debug, Clone)]
pub struct Parameters<VK = ParameterVarInt, BK = ParameterBytes> {
	vars: HashMap<VK, u64>,
	bytes: HashMap<BK, Vec<u8>>,
}

/// The version-scoped parameter bag carried by SUBSCRIBE and friends.
pub type RequestParameters = Parameters<RequestParameterVarInt, RequestParameterBytes>;

impl<VK, BK> Default for Parameters<VK, BK> {
	fn default() -> Self {
		Self {
			vars: HashMap::new(),
			bytes: HashMap::new(),
		}
	}
}

impl<V, VK, BK> Decode<V> for Parameters<VK, BK>
where
	V: Clone,
	VK: From<u64> + Copy + Eq + std::hash::Hash,
	BK: From<u64> + Copy + Eq + std::hash::Hash,
{
	fn decode<R: bytes::Buf>(mut r: &mut R, version: V) -> Result<Self, DecodeError> {
		let mut vars = HashMap::new();
		let mut bytes = HashMap::new();

		// I hate this encoding so much; let me encode my role and get on with my life.
		let count = u64::decode(r, version.clone())?;

		if count > MAX_PARAMS {
			return Err(DecodeError::TooMany);
		}

		for _ in 0..count {
			let kind = u64::decode(r, version.clone())?;

			if kind % 2 == 0 {
				let kind = VK::from(kind);
				match vars.entry(kind) {
					hash_map::Entry::Occupied(_) => return Err(DecodeError::Duplicate),
					hash_map::Entry::Vacant(entry) => entry.insert(u64::decode(&mut r, version.clone())?),
				};
			} else {
				let kind = BK::from(kind);
				match bytes.entry(kind) {
					hash_map::Entry::Occupied(_) => return Err(DecodeError::Duplicate),
					hash_map::Entry::Vacant(entry) => entry.insert(Vec::<u8>::decode(&mut r, version.clone())?),
				};
			}
		}

		Ok(Parameters { vars, bytes })
	}
}

impl<V, VK, BK> Encode<V> for Parameters<VK, BK>
where
	V: Clone,
	VK: Into<u64> + Copy,
	BK: Into<u64> + Copy,
{
	fn encode<W: bytes::BufMut>(&self, w: &mut W, version: V) {
		(self.vars.len() + self.bytes.len()).encode(w, version.clone());

		for (kind, value) in self.vars.iter() {
			u64::from(*kind).encode(w, version.clone());
			value.encode(w, version.clone());
		}

		for (kind, value) in self.bytes.iter() {
			u64::from(*kind).encode(w, version.clone());
			value.encode(w, version.clone());
		}
	}
}

impl<VK: Copy + Eq + std::hash::Hash, BK: Copy + Eq + std::hash::Hash> Parameters<VK, BK> {
	pub fn get_varint(&self, kind: VK) -> Option<u64> {
		self.vars.get(&kind).copied()
	}

	pub fn set_varint(&mut self, kind: VK, value: u64) {
		self.vars.insert(kind, value);
	}

	pub fn get_bytes(&self, kind: BK) -> Option<&[u8]> {
		self.bytes.get(&kind).map(|v| v.as_slice())
	}

	pub fn set_bytes(&mut self, kind: BK, value: Vec<u8>) {
		self.bytes.insert(kind, value);
	}
}

impl RequestParameters {
	/// The SUBSCRIPTION_FILTER parameter's decoded value, if present.
	pub fn filter(&self) -> Result<Option<SubscriptionFilter>, DecodeError> {
		self.get_bytes(RequestParameterBytes::SubscriptionFilter)
			.map(|mut raw| SubscriptionFilter::decode(&mut raw, ()))
			.transpose()
	}

	/// Set the SUBSCRIPTION_FILTER parameter's value.
	pub fn set_filter(&mut self, filter: SubscriptionFilter) {
		let mut buf = Vec::new();
		filter.encode(&mut buf, ());
		self.set_bytes(RequestParameterBytes::SubscriptionFilter, buf);
	}

	/// The GROUP_ORDER parameter's decoded value, if present.
	pub fn group_order(&self) -> Result<Option<crate::ietf::GroupOrder>, DecodeError> {
		self.get_varint(RequestParameterVarInt::GroupOrder)
			.map(|raw| crate::ietf::GroupOrder::try_from(raw).map_err(|_| DecodeError::InvalidValue))
			.transpose()
	}

	/// Set the GROUP_ORDER parameter's value.
	pub fn set_group_order(&mut self, order: crate::ietf::GroupOrder) {
		self.set_varint(RequestParameterVarInt::GroupOrder, order.into());
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bytes::BytesMut;

	fn roundtrip_filter(filter: SubscriptionFilter) -> SubscriptionFilter {
		let mut buf = BytesMut::new();
		filter.encode(&mut buf, ());
		let mut r = buf.freeze();
		SubscriptionFilter::decode(&mut r, ()).unwrap()
	}

	#[test]
	fn subscription_filter_largest_object_round_trip() {
		assert_eq!(roundtrip_filter(SubscriptionFilter::LargestObject), SubscriptionFilter::LargestObject);
	}

	#[test]
	fn subscription_filter_absolute_range_round_trip() {
		let filter = SubscriptionFilter::AbsoluteRange(Location { group: 3, object: 0 }, Location { group: 10, object: 5 });
		assert_eq!(roundtrip_filter(filter), filter);
	}

	#[test]
	fn subscription_filter_absolute_start_missing_location_is_invalid_argument() {
		let mut buf = BytesMut::new();
		FilterType::AbsoluteStart.encode(&mut buf, ());
		// no location bytes follow
		let mut r = buf.freeze();
		let result = SubscriptionFilter::decode(&mut r, ());
		assert!(matches!(result, Err(DecodeError::InvalidArgument)));
	}

	#[test]
	fn request_parameters_filter_and_group_order_round_trip() {
		let mut params = RequestParameters::default();
		params.set_filter(SubscriptionFilter::AbsoluteStart(Location { group: 1, object: 2 }));
		params.set_group_order(crate::ietf::GroupOrder::Descending);

		let mut buf = BytesMut::new();
		params.encode(&mut buf, ());
		let mut r = buf.freeze();
		let decoded = RequestParameters::decode(&mut r, ()).unwrap();

		assert_eq!(decoded.filter().unwrap(), Some(SubscriptionFilter::AbsoluteStart(Location { group: 1, object: 2 })));
		assert_eq!(decoded.group_order().unwrap(), Some(crate::ietf::GroupOrder::Descending));
	}

	#[test]
	fn setup_parameters_still_work_unparameterized() {
		let mut params = Parameters::default();
		params.set_varint(ParameterVarInt::MaxRequestId, 100);
		params.set_bytes(ParameterBytes::Path, b"/moq".to_vec());

		let mut buf = BytesMut::new();
		params.encode(&mut buf, ());
		let mut r = buf.freeze();
		let decoded: Parameters = Parameters::decode(&mut r, ()).unwrap();

		assert_eq!(decoded.get_varint(ParameterVarInt::MaxRequestId), Some(100));
		assert_eq!(decoded.get_bytes(ParameterBytes::Path), Some(&b"/moq"[..]));
	}
}
