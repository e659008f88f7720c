//! MoQT data-plane framing: object datagrams, subgroup streams, and fetch streams.

use std::collections::HashMap;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::coding::*;

/// The reason an object carries no payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u64)]
pub enum ObjectStatus {
	Normal = 0x0,
	DoesNotExist = 0x1,
	EndOfGroup = 0x3,
	EndOfTrack = 0x4,
}

impl<V> Encode<V> for ObjectStatus {
	fn encode<W: bytes::BufMut>(&self, w: &mut W, version: V) {
		u64::from(*self).encode(w, version);
	}
}

impl<V> Decode<V> for ObjectStatus {
	fn decode<R: bytes::Buf>(r: &mut R, version: V) -> Result<Self, DecodeError> {
		Self::try_from(u64::decode(r, version)?).map_err(|_| DecodeError::InvalidValue)
	}
}

/// Object Extension Headers, keyed by extension ID.
///
/// Even IDs carry an inline varint value; odd IDs carry a length-prefixed byte
/// string, mirroring the parity rule used by setup and version-specific parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectExtensions {
	headers: HashMap<u64, Vec<u8>>,
}

impl ObjectExtensions {
	pub fn is_empty(&self) -> bool {
		self.headers.is_empty()
	}

	pub fn get(&self, id: u64) -> Option<&[u8]> {
		self.headers.get(&id).map(|v| v.as_slice())
	}

	/// Set an even-ID extension carrying an inline varint value.
	pub fn set_varint(&mut self, id: u64, value: u64) {
		assert!(id % 2 == 0, "varint extensions must use an even id");
		let mut buf = Vec::new();
		value.encode(&mut buf, ());
		self.headers.insert(id, buf);
	}

	/// Set an odd-ID extension carrying an opaque byte string.
	pub fn set_bytes(&mut self, id: u64, value: Vec<u8>) {
		assert!(id % 2 == 1, "byte-string extensions must use an odd id");
		self.headers.insert(id, value);
	}

	pub fn get_varint(&self, id: u64) -> Option<u64> {
		let raw = self.headers.get(&id)?;
		let mut r = bytes::Bytes::copy_from_slice(raw);
		u64::decode(&mut r, ()).ok()
	}
}

impl<V: Copy> Encode<V> for ObjectExtensions {
	fn encode<W: bytes::BufMut>(&self, w: &mut W, version: V) {
		if self.headers.is_empty() {
			0u8.encode(w, version);
			return;
		}

		let mut body = Vec::new();
		for (id, value) in self.headers.iter() {
			id.encode(&mut body, version);
			if id % 2 == 1 {
				value.len().encode(&mut body, version);
			}
			body.extend_from_slice(value);
		}

		body.len().encode(w, version);
		w.put_slice(&body);
	}
}

impl<V: Copy> Decode<V> for ObjectExtensions {
	fn decode<R: bytes::Buf>(r: &mut R, version: V) -> Result<Self, DecodeError> {
		let len = u64::decode(r, version)? as usize;
		if r.remaining() < len {
			return Err(DecodeError::Short);
		}

		let mut body = r.copy_to_bytes(len);
		let mut headers = HashMap::new();

		while body.has_remaining() {
			let id = u64::decode(&mut body, version)?;
			let value = if id % 2 == 1 {
				Vec::<u8>::decode(&mut body, version)?
			} else {
				let start = body.clone();
				let _ = u64::decode(&mut body, version)?;
				let consumed = start.remaining() - body.remaining();
				start.slice(0..consumed).to_vec()
			};

			if headers.insert(id, value).is_some() {
				return Err(DecodeError::Duplicate);
			}
		}

		Ok(Self { headers })
	}
}

/// OBJECT_DATAGRAM type tag: which optional fields are present, and whether
/// this is the final object in its group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum DatagramType {
	ObjectIdPriorityPayload = 0x00,
	ObjectIdExtensionsPriorityPayload = 0x01,
	ObjectIdPriorityPayloadEndOfGroup = 0x02,
	ObjectIdExtensionsPriorityPayloadEndOfGroup = 0x03,
	NoObjectIdPriorityPayload = 0x04,
	NoObjectIdExtensionsPriorityPayload = 0x05,
	NoObjectIdPriorityPayloadEndOfGroup = 0x06,
	NoObjectIdExtensionsPriorityPayloadEndOfGroup = 0x07,
	ObjectIdNoPriorityPayload = 0x08,
	ObjectIdExtensionsNoPriorityPayload = 0x09,
	ObjectIdNoPriorityPayloadEndOfGroup = 0x0a,
	ObjectIdExtensionsNoPriorityPayloadEndOfGroup = 0x0b,
	NoObjectIdNoPriorityPayload = 0x0c,
	NoObjectIdExtensionsNoPriorityPayload = 0x0d,
	NoObjectIdNoPriorityPayloadEndOfGroup = 0x0e,
	NoObjectIdExtensionsNoPriorityPayloadEndOfGroup = 0x0f,
	ObjectIdPriorityStatus = 0x20,
	ObjectIdExtensionsPriorityStatus = 0x21,
	NoObjectIdPriorityStatus = 0x24,
	NoObjectIdExtensionsPriorityStatus = 0x25,
	ObjectIdNoPriorityStatus = 0x28,
	ObjectIdExtensionsNoPriorityStatus = 0x29,
	NoObjectIdNoPriorityStatus = 0x2c,
	NoObjectIdExtensionsNoPriorityStatus = 0x2d,
}

impl DatagramType {
	pub fn has_object_id(self) -> bool {
		!matches!(
			self as u8,
			0x04 | 0x05 | 0x06 | 0x07 | 0x24 | 0x25 | 0x0c | 0x0d | 0x0e | 0x0f | 0x2c | 0x2d
		)
	}

	pub fn has_extensions(self) -> bool {
		(self as u8) & 0x01 == 0x01
	}

	pub fn has_priority(self) -> bool {
		(self as u8) < 0x08 || (0x20..=0x25).contains(&(self as u8))
	}

	pub fn is_end_of_group(self) -> bool {
		matches!(self as u8, 0x02 | 0x03 | 0x06 | 0x07 | 0x0a | 0x0b | 0x0e | 0x0f)
	}

	pub fn has_status(self) -> bool {
		matches!(self as u8, 0x20 | 0x21 | 0x24 | 0x25 | 0x28 | 0x29 | 0x2c | 0x2d)
	}
}

impl<V> Encode<V> for DatagramType {
	fn encode<W: bytes::BufMut>(&self, w: &mut W, version: V) {
		u64::from(u8::from(*self)).encode(w, version);
	}
}

impl<V> Decode<V> for DatagramType {
	fn decode<R: bytes::Buf>(r: &mut R, version: V) -> Result<Self, DecodeError> {
		let raw = u64::decode(r, version)?;
		let raw: u8 = raw.try_into().map_err(|_| DecodeError::UnknownDatagramType)?;
		Self::try_from(raw).map_err(|_| DecodeError::UnknownDatagramType)
	}
}

/// A single object delivered unreliably over a QUIC datagram.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectDatagram {
	pub datagram_type: DatagramType,
	pub track_alias: u64,
	pub group_id: u64,
	pub object_id: u64,
	pub publisher_priority: Option<u8>,
	pub extensions: Option<ObjectExtensions>,
	pub object_status: Option<ObjectStatus>,
	pub payload: bytes::Bytes,
}

impl ObjectDatagram {
	pub fn is_end_of_group(&self) -> bool {
		self.datagram_type.is_end_of_group()
	}
}

impl<V: Copy> Encode<V> for ObjectDatagram {
	fn encode<W: bytes::BufMut>(&self, w: &mut W, version: V) {
		self.datagram_type.encode(w, version);
		self.track_alias.encode(w, version);
		self.group_id.encode(w, version);

		if self.datagram_type.has_object_id() {
			self.object_id.encode(w, version);
		}

		if self.datagram_type.has_priority() {
			w.put_u8(self.publisher_priority.unwrap_or(0));
		}

		if self.datagram_type.has_extensions() {
			self.extensions.clone().unwrap_or_default().encode(w, version);
		}

		if self.datagram_type.has_status() {
			u64::from(self.object_status.unwrap_or(ObjectStatus::Normal)).encode(w, version);
		} else {
			w.put_slice(&self.payload);
		}
	}
}

impl<V: Copy> Decode<V> for ObjectDatagram {
	fn decode<R: bytes::Buf>(r: &mut R, version: V) -> Result<Self, DecodeError> {
		let datagram_type = DatagramType::decode(r, version)?;
		let track_alias = u64::decode(r, version)?;
		let group_id = u64::decode(r, version)?;

		let object_id = if datagram_type.has_object_id() {
			u64::decode(r, version)?
		} else {
			0
		};

		let publisher_priority = if datagram_type.has_priority() {
			if !r.has_remaining() {
				return Err(DecodeError::Short);
			}
			Some(r.get_u8())
		} else {
			None
		};

		let extensions = if datagram_type.has_extensions() {
			Some(ObjectExtensions::decode(r, version)?)
		} else {
			None
		};

		let (object_status, payload) = if datagram_type.has_status() {
			(Some(ObjectStatus::decode(r, version)?), bytes::Bytes::new())
		} else {
			(None, r.copy_to_bytes(r.remaining()))
		};

		Ok(Self {
			datagram_type,
			track_alias,
			group_id,
			object_id,
			publisher_priority,
			extensions,
			object_status,
			payload,
		})
	}
}

/// How a SUBGROUP_HEADER's Subgroup ID field is determined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubgroupIdMode {
	Zero,
	FirstObject,
	Present,
}

/// SUBGROUP_HEADER type tag, written once at the start of a subgroup stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum SubgroupHeaderType {
	ZeroNoExtPriority = 0x10,
	ZeroExtPriority = 0x11,
	FirstObjectNoExtPriority = 0x12,
	FirstObjectExtPriority = 0x13,
	PresentNoExtPriority = 0x14,
	PresentExtPriority = 0x15,
	ZeroNoExtEndPriority = 0x18,
	ZeroExtEndPriority = 0x19,
	FirstObjectNoExtEndPriority = 0x1a,
	FirstObjectExtEndPriority = 0x1b,
	PresentNoExtEndPriority = 0x1c,
	PresentExtEndPriority = 0x1d,
	ZeroNoExtNoPriority = 0x30,
	ZeroExtNoPriority = 0x31,
	FirstObjectNoExtNoPriority = 0x32,
	FirstObjectExtNoPriority = 0x33,
	PresentNoExtNoPriority = 0x34,
	PresentExtNoPriority = 0x35,
	ZeroNoExtEndNoPriority = 0x38,
	ZeroExtEndNoPriority = 0x39,
	FirstObjectNoExtEndNoPriority = 0x3a,
	FirstObjectExtEndNoPriority = 0x3b,
	PresentNoExtEndNoPriority = 0x3c,
	PresentExtEndNoPriority = 0x3d,
}

impl SubgroupHeaderType {
	pub fn subgroup_id_mode(self) -> SubgroupIdMode {
		match (self as u8) & 0x0f {
			0x00 | 0x01 | 0x08 | 0x09 => SubgroupIdMode::Zero,
			0x02 | 0x03 | 0x0a | 0x0b => SubgroupIdMode::FirstObject,
			_ => SubgroupIdMode::Present,
		}
	}

	pub fn has_extensions(self) -> bool {
		(self as u8) & 0x01 == 0x01
	}

	pub fn has_priority(self) -> bool {
		(self as u8) < 0x30
	}

	pub fn contains_end_of_group(self) -> bool {
		(self as u8) & 0x0f >= 0x08
	}
}

impl<V> Encode<V> for SubgroupHeaderType {
	fn encode<W: bytes::BufMut>(&self, w: &mut W, version: V) {
		u64::from(u8::from(*self)).encode(w, version);
	}
}

impl<V> Decode<V> for SubgroupHeaderType {
	fn decode<R: bytes::Buf>(r: &mut R, version: V) -> Result<Self, DecodeError> {
		let raw = u64::decode(r, version)?;
		let raw: u8 = raw.try_into().map_err(|_| DecodeError::UnknownMessageType)?;
		Self::try_from(raw).map_err(|_| DecodeError::UnknownMessageType)
	}
}

/// The header written once at the start of each subgroup stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubgroupHeader {
	pub header_type: SubgroupHeaderType,
	pub track_alias: u64,
	pub group_id: u64,
	pub subgroup_id: Option<u64>,
	pub publisher_priority: Option<u8>,
}

impl<V: Copy> Encode<V> for SubgroupHeader {
	fn encode<W: bytes::BufMut>(&self, w: &mut W, version: V) {
		self.header_type.encode(w, version);
		self.track_alias.encode(w, version);
		self.group_id.encode(w, version);

		if self.header_type.subgroup_id_mode() == SubgroupIdMode::Present {
			self.subgroup_id.expect("Present mode requires a subgroup id").encode(w, version);
		}

		if self.header_type.has_priority() {
			w.put_u8(self.publisher_priority.unwrap_or(0));
		}
	}
}

impl<V: Copy> Decode<V> for SubgroupHeader {
	fn decode<R: bytes::Buf>(r: &mut R, version: V) -> Result<Self, DecodeError> {
		let header_type = SubgroupHeaderType::decode(r, version)?;
		let track_alias = u64::decode(r, version)?;
		let group_id = u64::decode(r, version)?;

		let subgroup_id = match header_type.subgroup_id_mode() {
			SubgroupIdMode::Zero => Some(0),
			SubgroupIdMode::Present => Some(u64::decode(r, version)?),
			SubgroupIdMode::FirstObject => None,
		};

		let publisher_priority = if header_type.has_priority() {
			if !r.has_remaining() {
				return Err(DecodeError::Short);
			}
			Some(r.get_u8())
		} else {
			None
		};

		Ok(Self {
			header_type,
			track_alias,
			group_id,
			subgroup_id,
			publisher_priority,
		})
	}
}

/// A single object within a subgroup stream, following the stream's [SubgroupHeader].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubgroupObject {
	pub object_id_delta: u64,
	pub extensions: Option<ObjectExtensions>,
	pub object_status: Option<ObjectStatus>,
	pub payload: bytes::Bytes,
}

impl SubgroupObject {
	pub fn encode_with<W: bytes::BufMut, V: Copy>(&self, w: &mut W, version: V, extensions_present: bool) {
		self.object_id_delta.encode(w, version);

		if extensions_present {
			self.extensions.clone().unwrap_or_default().encode(w, version);
		}

		match (&self.object_status, self.payload.len()) {
			(Some(status), 0) => {
				0u64.encode(w, version);
				u64::from(*status).encode(w, version);
			}
			_ => {
				self.payload.len().encode(w, version);
				w.put_slice(&self.payload);
			}
		}
	}

	pub fn decode_with<R: bytes::Buf, V: Copy>(
		r: &mut R,
		version: V,
		extensions_present: bool,
	) -> Result<Self, DecodeError> {
		let object_id_delta = u64::decode(r, version)?;

		let extensions = if extensions_present {
			Some(ObjectExtensions::decode(r, version)?)
		} else {
			None
		};

		let payload_length = u64::decode(r, version)? as usize;

		let (object_status, payload) = if payload_length == 0 {
			(Some(ObjectStatus::decode(r, version)?), bytes::Bytes::new())
		} else {
			if r.remaining() < payload_length {
				return Err(DecodeError::Short);
			}
			(None, r.copy_to_bytes(payload_length))
		};

		Ok(Self {
			object_id_delta,
			extensions,
			object_status,
			payload,
		})
	}
}

/// Reconstructs absolute object ids across a subgroup stream's delta-encoded
/// objects: the first object's `object_id_delta` is its absolute id outright
/// (when the header uses [SubgroupIdMode::FirstObject], that same value is
/// also the subgroup's id); every later object's absolute id is
/// `prior + 1 + delta`.
#[derive(Debug)]
pub struct SubgroupObjectAccumulator {
	extensions_present: bool,
	prior_object_id: Option<u64>,
}

impl SubgroupObjectAccumulator {
	pub fn new(header: &SubgroupHeader) -> Self {
		Self {
			extensions_present: header.header_type.has_extensions(),
			prior_object_id: None,
		}
	}

	/// Decode the next object on the stream, returning it alongside its
	/// reconstructed absolute object id.
	pub fn decode_next<R: bytes::Buf, V: Copy>(
		&mut self,
		r: &mut R,
		version: V,
	) -> Result<(u64, SubgroupObject), DecodeError> {
		let object = SubgroupObject::decode_with(r, version, self.extensions_present)?;

		let object_id = match self.prior_object_id {
			None => object.object_id_delta,
			Some(prior) => prior + 1 + object.object_id_delta,
		};

		self.prior_object_id = Some(object_id);
		Ok((object_id, object))
	}
}

/// Per-object flags on a FETCH stream, selecting which fields are carried
/// inline versus inherited from the previous object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FetchSerializationFlags(pub u8);

impl FetchSerializationFlags {
	pub const SUBGROUP_ZERO: u8 = 0x00;
	pub const SUBGROUP_PRIOR: u8 = 0x01;
	pub const SUBGROUP_PRIOR_PLUS_ONE: u8 = 0x02;
	pub const SUBGROUP_PRESENT: u8 = 0x03;
	pub const OBJECT_ID_PRESENT: u8 = 0x04;
	pub const GROUP_ID_PRESENT: u8 = 0x08;
	pub const PRIORITY_PRESENT: u8 = 0x10;
	pub const EXTENSIONS_PRESENT: u8 = 0x20;

	pub fn subgroup_mode(self) -> u8 {
		self.0 & 0x03
	}

	pub fn has(self, bit: u8) -> bool {
		self.0 & bit == bit
	}
}

/// Running decode state across a FETCH stream's stateful delta encoding.
#[derive(Clone, Copy, Debug, Default)]
pub struct FetchObjectState {
	pub group_id: u64,
	pub subgroup_id: u64,
	pub object_id: u64,
	pub publisher_priority: u8,
}

/// A single object within a fetch stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchObject {
	pub serialization_flags: FetchSerializationFlags,
	pub group_id: u64,
	pub subgroup_id: u64,
	pub object_id: u64,
	pub publisher_priority: u8,
	pub extensions: Option<ObjectExtensions>,
	pub object_status: Option<ObjectStatus>,
	pub payload: bytes::Bytes,
}

impl FetchObject {
	pub fn encode<W: bytes::BufMut, V: Copy>(&self, w: &mut W, version: V) {
		w.put_u8(self.serialization_flags.0);

		if self.serialization_flags.has(FetchSerializationFlags::GROUP_ID_PRESENT) {
			self.group_id.encode(w, version);
		}

		if self.serialization_flags.subgroup_mode() == FetchSerializationFlags::SUBGROUP_PRESENT {
			self.subgroup_id.encode(w, version);
		}

		if self.serialization_flags.has(FetchSerializationFlags::OBJECT_ID_PRESENT) {
			self.object_id.encode(w, version);
		}

		if self.serialization_flags.has(FetchSerializationFlags::PRIORITY_PRESENT) {
			w.put_u8(self.publisher_priority);
		}

		if self.serialization_flags.has(FetchSerializationFlags::EXTENSIONS_PRESENT) {
			self.extensions.clone().unwrap_or_default().encode(w, version);
		}

		match (&self.object_status, self.payload.len()) {
			(Some(status), 0) => {
				0u64.encode(w, version);
				u64::from(*status).encode(w, version);
			}
			_ => {
				self.payload.len().encode(w, version);
				w.put_slice(&self.payload);
			}
		}
	}

	/// Decode the next object of a fetch stream. `first` must be true only for
	/// the very first object; subsequent calls thread `state` through to resolve
	/// fields the stream omits via delta encoding.
	pub fn decode<R: bytes::Buf, V: Copy>(
		r: &mut R,
		version: V,
		first: bool,
		state: &FetchObjectState,
	) -> Result<Self, DecodeError> {
		if !r.has_remaining() {
			return Err(DecodeError::Short);
		}
		let serialization_flags = FetchSerializationFlags(r.get_u8());

		let group_id = if serialization_flags.has(FetchSerializationFlags::GROUP_ID_PRESENT) {
			u64::decode(r, version)?
		} else if first {
			return Err(DecodeError::InvalidValue);
		} else {
			state.group_id
		};

		let subgroup_id = match serialization_flags.subgroup_mode() {
			FetchSerializationFlags::SUBGROUP_ZERO => 0,
			FetchSerializationFlags::SUBGROUP_PRIOR => {
				if first {
					return Err(DecodeError::InvalidValue);
				}
				state.subgroup_id
			}
			FetchSerializationFlags::SUBGROUP_PRIOR_PLUS_ONE => {
				if first {
					return Err(DecodeError::InvalidValue);
				}
				state.subgroup_id + 1
			}
			_ => u64::decode(r, version)?,
		};

		let object_id = if serialization_flags.has(FetchSerializationFlags::OBJECT_ID_PRESENT) {
			u64::decode(r, version)?
		} else if first {
			return Err(DecodeError::InvalidValue);
		} else {
			state.object_id + 1
		};

		let publisher_priority = if serialization_flags.has(FetchSerializationFlags::PRIORITY_PRESENT) {
			if !r.has_remaining() {
				return Err(DecodeError::Short);
			}
			r.get_u8()
		} else if first {
			return Err(DecodeError::InvalidValue);
		} else {
			state.publisher_priority
		};

		let extensions = if serialization_flags.has(FetchSerializationFlags::EXTENSIONS_PRESENT) {
			Some(ObjectExtensions::decode(r, version)?)
		} else {
			None
		};

		let payload_length = u64::decode(r, version)? as usize;
		let (object_status, payload) = if payload_length == 0 {
			(Some(ObjectStatus::decode(r, version)?), bytes::Bytes::new())
		} else {
			if r.remaining() < payload_length {
				return Err(DecodeError::Short);
			}
			(None, r.copy_to_bytes(payload_length))
		};

		Ok(Self {
			serialization_flags,
			group_id,
			subgroup_id,
			object_id,
			publisher_priority,
			extensions,
			object_status,
			payload,
		})
	}

	pub fn next_state(&self) -> FetchObjectState {
		FetchObjectState {
			group_id: self.group_id,
			subgroup_id: self.subgroup_id,
			object_id: self.object_id,
			publisher_priority: self.publisher_priority,
		}
	}
}

/// LOC (Low Overhead Container) header extension IDs.
/// See draft-ietf-moq-loc.
pub mod loc {
	use super::*;

	pub const CAPTURE_TIMESTAMP: u64 = 2;
	pub const VIDEO_FRAME_MARKING: u64 = 4;
	pub const AUDIO_LEVEL: u64 = 6;
	pub const VIDEO_CONFIG: u64 = 13;

	/// Unix-epoch microsecond wall-clock capture time.
	#[derive(Clone, Copy, Debug, PartialEq, Eq)]
	pub struct CaptureTimestamp {
		pub microseconds: u64,
	}

	/// RFC 9626 video frame metadata, bit-packed into a single varint.
	#[derive(Clone, Copy, Debug, PartialEq, Eq)]
	pub struct VideoFrameMarking {
		pub independent: bool,
		pub discardable: bool,
		pub base_layer_sync: bool,
		pub temporal_id: u8,
		pub spatial_id: u8,
	}

	impl VideoFrameMarking {
		fn to_bits(self) -> u64 {
			let mut value = 0u64;
			if self.independent {
				value |= 0x01;
			}
			if self.discardable {
				value |= 0x02;
			}
			if self.base_layer_sync {
				value |= 0x04;
			}
			value |= u64::from(self.temporal_id & 0x07) << 3;
			value |= u64::from(self.spatial_id & 0x03) << 6;
			value
		}

		fn from_bits(value: u64) -> Self {
			Self {
				independent: value & 0x01 != 0,
				discardable: value & 0x02 != 0,
				base_layer_sync: value & 0x04 != 0,
				temporal_id: ((value >> 3) & 0x07) as u8,
				spatial_id: ((value >> 6) & 0x03) as u8,
			}
		}
	}

	/// RFC 6464 audio level, bit-packed into a single varint.
	#[derive(Clone, Copy, Debug, PartialEq, Eq)]
	pub struct AudioLevel {
		pub voice_activity: bool,
		pub level: u8,
	}

	impl AudioLevel {
		fn to_bits(self) -> u64 {
			let mut value = u64::from(self.level & 0x7f);
			if self.voice_activity {
				value |= 0x80;
			}
			value
		}

		fn from_bits(value: u64) -> Self {
			Self {
				voice_activity: value & 0x80 != 0,
				level: (value & 0x7f) as u8,
			}
		}
	}

	/// Codec-specific out-of-band config (e.g. an AVCDecoderConfigurationRecord).
	#[derive(Clone, Debug, PartialEq, Eq)]
	pub struct VideoConfig {
		pub codec_config: Vec<u8>,
	}

	/// The subset of LOC extensions present on a single object.
	#[derive(Clone, Debug, Default, PartialEq, Eq)]
	pub struct ParsedLocExtensions {
		pub capture_timestamp: Option<CaptureTimestamp>,
		pub video_config: Option<VideoConfig>,
		pub video_frame_marking: Option<VideoFrameMarking>,
		pub audio_level: Option<AudioLevel>,
	}

	/// Build an [ObjectExtensions] container carrying the given LOC fields.
	pub fn encode(parsed: &ParsedLocExtensions) -> ObjectExtensions {
		let mut extensions = ObjectExtensions::default();

		if let Some(ts) = parsed.capture_timestamp {
			extensions.set_varint(CAPTURE_TIMESTAMP, ts.microseconds);
		}
		if let Some(marking) = parsed.video_frame_marking {
			extensions.set_varint(VIDEO_FRAME_MARKING, marking.to_bits());
		}
		if let Some(level) = parsed.audio_level {
			extensions.set_varint(AUDIO_LEVEL, level.to_bits());
		}
		if let Some(config) = &parsed.video_config {
			extensions.set_bytes(VIDEO_CONFIG, config.codec_config.clone());
		}

		extensions
	}

	/// Extract the LOC fields present in an [ObjectExtensions] container.
	pub fn parse(extensions: &ObjectExtensions) -> ParsedLocExtensions {
		ParsedLocExtensions {
			capture_timestamp: extensions
				.get_varint(CAPTURE_TIMESTAMP)
				.map(|microseconds| CaptureTimestamp { microseconds }),
			video_frame_marking: extensions.get_varint(VIDEO_FRAME_MARKING).map(VideoFrameMarking::from_bits),
			audio_level: extensions.get_varint(AUDIO_LEVEL).map(AudioLevel::from_bits),
			video_config: extensions.get(VIDEO_CONFIG).map(|bytes| VideoConfig {
				codec_config: bytes.to_vec(),
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ietf::Version;
	use bytes::BytesMut;

	#[test]
	fn object_datagram_payload_round_trip() {
		let msg = ObjectDatagram {
			datagram_type: DatagramType::ObjectIdExtensionsPriorityPayload,
			track_alias: 7,
			group_id: 1,
			object_id: 3,
			publisher_priority: Some(200),
			extensions: Some(ObjectExtensions::default()),
			object_status: None,
			payload: bytes::Bytes::from_static(b"hello"),
		};

		let mut buf = BytesMut::new();
		msg.encode(&mut buf, Version::Draft15);
		let mut r = buf.freeze();
		let decoded = ObjectDatagram::decode(&mut r, Version::Draft15).unwrap();

		assert_eq!(decoded, msg);
		assert!(!decoded.is_end_of_group());
	}

	#[test]
	fn object_datagram_status_round_trip() {
		let msg = ObjectDatagram {
			datagram_type: DatagramType::NoObjectIdPriorityStatus,
			track_alias: 1,
			group_id: 9,
			object_id: 0,
			publisher_priority: Some(0),
			extensions: None,
			object_status: Some(ObjectStatus::EndOfTrack),
			payload: bytes::Bytes::new(),
		};

		let mut buf = BytesMut::new();
		msg.encode(&mut buf, Version::Draft15);
		let mut r = buf.freeze();
		let decoded = ObjectDatagram::decode(&mut r, Version::Draft15).unwrap();

		assert_eq!(decoded.object_status, Some(ObjectStatus::EndOfTrack));
	}

	#[test]
	fn subgroup_header_present_mode_round_trip() {
		let header = SubgroupHeader {
			header_type: SubgroupHeaderType::PresentExtPriority,
			track_alias: 5,
			group_id: 2,
			subgroup_id: Some(4),
			publisher_priority: Some(100),
		};

		let mut buf = BytesMut::new();
		header.encode(&mut buf, Version::Draft15);
		let mut r = buf.freeze();
		let decoded = SubgroupHeader::decode(&mut r, Version::Draft15).unwrap();

		assert_eq!(decoded, header);
		assert_eq!(decoded.header_type.subgroup_id_mode(), SubgroupIdMode::Present);
	}

	#[test]
	fn subgroup_header_zero_mode_has_no_wire_subgroup_id() {
		let header = SubgroupHeader {
			header_type: SubgroupHeaderType::ZeroNoExtPriority,
			track_alias: 5,
			group_id: 2,
			subgroup_id: Some(0),
			publisher_priority: Some(10),
		};

		let mut buf = BytesMut::new();
		header.encode(&mut buf, Version::Draft15);
		// type + alias + group_id + priority, no subgroup id varint
		assert_eq!(buf.len(), 1 + 1 + 1 + 1);
	}

	#[test]
	fn subgroup_object_with_extensions_round_trip() {
		let mut extensions = ObjectExtensions::default();
		extensions.set_varint(2, 1234);

		let obj = SubgroupObject {
			object_id_delta: 1,
			extensions: Some(extensions),
			object_status: None,
			payload: bytes::Bytes::from_static(b"frame"),
		};

		let mut buf = BytesMut::new();
		obj.encode_with(&mut buf, Version::Draft15, true);
		let mut r = buf.freeze();
		let decoded = SubgroupObject::decode_with(&mut r, Version::Draft15, true).unwrap();

		assert_eq!(decoded, obj);
	}

	#[test]
	fn subgroup_object_status_only_round_trip() {
		let obj = SubgroupObject {
			object_id_delta: 2,
			extensions: None,
			object_status: Some(ObjectStatus::EndOfGroup),
			payload: bytes::Bytes::new(),
		};

		let mut buf = BytesMut::new();
		obj.encode_with(&mut buf, Version::Draft15, false);
		let mut r = buf.freeze();
		let decoded = SubgroupObject::decode_with(&mut r, Version::Draft15, false).unwrap();

		assert_eq!(decoded.object_status, Some(ObjectStatus::EndOfGroup));
	}

	#[test]
	fn fetch_object_stateful_delta_decoding() {
		let first = FetchObject {
			serialization_flags: FetchSerializationFlags(
				FetchSerializationFlags::GROUP_ID_PRESENT
					| FetchSerializationFlags::SUBGROUP_PRESENT
					| FetchSerializationFlags::OBJECT_ID_PRESENT
					| FetchSerializationFlags::PRIORITY_PRESENT,
			),
			group_id: 1,
			subgroup_id: 0,
			object_id: 0,
			publisher_priority: 50,
			extensions: None,
			object_status: None,
			payload: bytes::Bytes::from_static(b"a"),
		};

		let mut buf = BytesMut::new();
		first.encode(&mut buf, Version::Draft15);

		let second = FetchObject {
			serialization_flags: FetchSerializationFlags(FetchSerializationFlags::SUBGROUP_PRIOR),
			group_id: 1,
			subgroup_id: 0,
			object_id: 1,
			publisher_priority: 50,
			extensions: None,
			object_status: None,
			payload: bytes::Bytes::from_static(b"b"),
		};
		second.encode(&mut buf, Version::Draft15);

		let mut r = buf.freeze();
		let state = FetchObjectState::default();
		let decoded_first = FetchObject::decode(&mut r, Version::Draft15, true, &state).unwrap();
		assert_eq!(decoded_first, first);

		let state = decoded_first.next_state();
		let decoded_second = FetchObject::decode(&mut r, Version::Draft15, false, &state).unwrap();
		assert_eq!(decoded_second.object_id, 1);
		assert_eq!(decoded_second.subgroup_id, 0);
		assert_eq!(decoded_second.payload, bytes::Bytes::from_static(b"b"));
	}

	#[test]
	fn subgroup_object_accumulator_reconstructs_absolute_ids() {
		let header = SubgroupHeader {
			header_type: SubgroupHeaderType::PresentNoExtPriority,
			track_alias: 5,
			group_id: 7,
			subgroup_id: Some(3),
			publisher_priority: Some(128),
		};

		let mut buf = BytesMut::new();
		for (delta, payload) in [(0u64, &b"a"[..]), (0, b"bb"), (1, b"ccc")] {
			let obj = SubgroupObject {
				object_id_delta: delta,
				extensions: None,
				object_status: None,
				payload: bytes::Bytes::copy_from_slice(payload),
			};
			obj.encode_with(&mut buf, Version::Draft15, false);
		}

		let mut r = buf.freeze();
		let mut acc = SubgroupObjectAccumulator::new(&header);

		let (id0, obj0) = acc.decode_next(&mut r, Version::Draft15).unwrap();
		let (id1, obj1) = acc.decode_next(&mut r, Version::Draft15).unwrap();
		let (id2, obj2) = acc.decode_next(&mut r, Version::Draft15).unwrap();

		assert_eq!((id0, id1, id2), (0, 1, 3));
		assert_eq!(obj0.payload, bytes::Bytes::from_static(b"a"));
		assert_eq!(obj1.payload, bytes::Bytes::from_static(b"bb"));
		assert_eq!(obj2.payload, bytes::Bytes::from_static(b"ccc"));
	}

	#[test]
	fn loc_extensions_round_trip() {
		let parsed = loc::ParsedLocExtensions {
			capture_timestamp: Some(loc::CaptureTimestamp { microseconds: 1_700_000 }),
			video_config: Some(loc::VideoConfig {
				codec_config: vec![1, 2, 3],
			}),
			video_frame_marking: Some(loc::VideoFrameMarking {
				independent: true,
				discardable: false,
				base_layer_sync: true,
				temporal_id: 3,
				spatial_id: 1,
			}),
			audio_level: Some(loc::AudioLevel {
				voice_activity: true,
				level: 42,
			}),
		};

		let extensions = loc::encode(&parsed);

		let mut buf = BytesMut::new();
		extensions.encode(&mut buf, Version::Draft15);
		let mut r = buf.freeze();
		let decoded = ObjectExtensions::decode(&mut r, Version::Draft15).unwrap();

		let reparsed = loc::parse(&decoded);
		assert_eq!(reparsed, parsed);
	}
}
