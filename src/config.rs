//! Relay-level knobs not dictated by the wire protocol itself.
//!
//! These don't correspond to any MOQT message; they configure the QUIC
//! transport and the initial request-ID ceiling a relay advertises to peers.

/// Configuration for a relay-facing session.
///
/// Defaults mirror typical `quinn` transport-config choices: a generous idle
/// timeout and enough concurrent streams that a busy fan-out doesn't stall on
/// flow control.
#[derive(Clone, Copy, Debug)]
pub struct RelayConfig {
	/// QUIC idle timeout, in milliseconds, before a session is considered dead.
	pub idle_timeout_ms: u64,

	/// Maximum concurrent unidirectional streams the peer may open (subgroup + fetch streams).
	pub max_concurrent_uni: u32,

	/// Maximum concurrent bidirectional streams the peer may open (only the control stream is expected).
	pub max_concurrent_bidi: u32,

	/// The initial `MAX_REQUEST_ID` advertised to the peer during setup.
	pub initial_max_request_id: u64,
}

impl Default for RelayConfig {
	fn default() -> Self {
		Self {
			idle_timeout_ms: 10_000,
			max_concurrent_uni: 1_000,
			max_concurrent_bidi: 10,
			initial_max_request_id: u32::MAX as u64,
		}
	}
}
