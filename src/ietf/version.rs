use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::coding;

/// The MoQT draft version(s) this module implements.
///
/// Only draft-ietf-moq-transport-15 is supported; other values are rejected during setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u64)]
pub enum Version {
	Draft15 = 0xff00_0000 | 0x0f,
}

impl Version {
	pub const ALPN: &'static str = "moqt-15";

	/// Convert to the generic wire version number used during handshake negotiation.
	pub const fn coding(self) -> coding::Version {
		coding::Version(self as u64)
	}
}

impl TryFrom<coding::Version> for Version {
	type Error = ();

	fn try_from(v: coding::Version) -> Result<Self, Self::Error> {
		Self::try_from(u64::from(v)).map_err(|_| ())
	}
}
