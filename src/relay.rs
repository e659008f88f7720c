//! Data-plane fan-out for a relay deployment.
//!
//! A relay sits between publishing and subscribing sessions. The control-plane
//! bookkeeping (who asked for what) lives in each session's [crate::ietf::Session];
//! this module is the one piece of state shared *across* sessions: a table
//! mapping each track to its publisher and subscribers, plus the glue that
//! copies inbound subgroup streams from a publisher out to every subscriber.

use std::{
	collections::{HashMap, hash_map::Entry},
	sync::{Arc, atomic::{AtomicU64, Ordering}},
};

use web_async::Lock;

use crate::{
	Error,
	coding::{Reader, Writer},
	ietf::{SubgroupHeader, SubgroupObject, TrackNamespace, Version},
};

/// Identifies a track by its namespace tuple and name: the relay's lookup key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TrackKey {
	pub namespace: TrackNamespace,
	pub name: String,
}

impl TrackKey {
	pub fn new(namespace: TrackNamespace, name: impl Into<String>) -> Self {
		Self { namespace, name: name.into() }
	}
}

/// Handle returned by [TrackTable::register_subscriber], used to unregister later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

struct Subscriber<S> {
	session: S,
}

struct TrackEntry<S> {
	publisher_alias: Option<u64>,
	subscribers: HashMap<SubscriberId, Subscriber<S>>,
}

impl<S> Default for TrackEntry<S> {
	fn default() -> Self {
		Self {
			publisher_alias: None,
			subscribers: HashMap::new(),
		}
	}
}

/// The relay's cross-session state: one entry per track, naming its current
/// publisher (if any) and its subscribers.
///
/// This is the only structure a relay shares across sessions; everything else
/// (request IDs, awaiters, per-session track aliases) stays local to a single
/// [crate::ietf::Session]. Mutations go through these methods rather than
/// exposing the lock, so callers on the hot forwarding path only ever take it
/// for the short snapshot in [forward_subgroup]. `S` only needs [Clone] here;
/// the transport bound is pulled in by the free functions that actually open
/// streams on it.
pub struct TrackTable<S> {
	tracks: Lock<HashMap<TrackKey, TrackEntry<S>>>,
	next_subscriber_id: AtomicU64,
}

impl<S> Default for TrackTable<S> {
	fn default() -> Self {
		Self {
			tracks: Default::default(),
			next_subscriber_id: AtomicU64::new(0),
		}
	}
}

impl<S: Clone> TrackTable<S> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record that `track_alias` on this publisher's session now serves `key`.
	///
	/// Call this when the publisher's [crate::ietf::SessionEvent::PublishRequested]
	/// is accepted.
	pub fn register_publisher(&self, key: TrackKey, track_alias: u64) {
		self.tracks.lock().entry(key).or_default().publisher_alias = Some(track_alias);
	}

	/// Forget a track's publisher, e.g. on PUBLISH_DONE or session close.
	///
	/// Drops the track entirely once it has no publisher and no subscribers left.
	pub fn remove_publisher(&self, key: &TrackKey) {
		let mut tracks = self.tracks.lock();
		if let Some(entry) = tracks.get_mut(key) {
			entry.publisher_alias = None;
			if entry.subscribers.is_empty() {
				tracks.remove(key);
			}
		}
	}

	/// Register a subscriber's session against a track, returning a handle to
	/// unregister it later.
	///
	/// Call this when a [crate::ietf::SessionEvent::SubscribeRequested] is accepted.
	pub fn register_subscriber(&self, key: TrackKey, session: S) -> SubscriberId {
		let id = SubscriberId(self.next_subscriber_id.fetch_add(1, Ordering::Relaxed));
		self.tracks.lock().entry(key).or_default().subscribers.insert(id, Subscriber { session });
		id
	}

	/// Unregister a subscriber, e.g. on UNSUBSCRIBE or session close.
	pub fn remove_subscriber(&self, key: &TrackKey, id: SubscriberId) {
		let mut tracks = self.tracks.lock();
		if let Some(entry) = tracks.get_mut(key) {
			entry.subscribers.remove(&id);
			if entry.subscribers.is_empty() && entry.publisher_alias.is_none() {
				tracks.remove(key);
			}
		}
	}

	/// The current publisher's track alias for `key`, if one is registered.
	pub fn publisher_alias(&self, key: &TrackKey) -> Option<u64> {
		self.tracks.lock().get(key).and_then(|entry| entry.publisher_alias)
	}

	fn subscriber_sessions(&self, key: &TrackKey) -> Vec<(SubscriberId, S)> {
		self.tracks
			.lock()
			.get(key)
			.map(|entry| entry.subscribers.iter().map(|(id, sub)| (*id, sub.session.clone())).collect())
			.unwrap_or_default()
	}
}

/// Accepts inbound unidirectional streams from a publisher's session and relays
/// each subgroup stream to `table`'s current subscribers for `aliases`.
///
/// `aliases` maps this session's track aliases (as seen in its own PUBLISH
/// requests) back to the relay-wide [TrackKey], so an inbound SUBGROUP_HEADER's
/// `track_alias` field can be resolved to the track it belongs to. One task per
/// stream is spawned so a slow subscriber on one subgroup can't stall another.
pub async fn relay_publisher_streams<S: web_transport_trait::Session>(
	table: Arc<TrackTable<S>>,
	session: S,
	aliases: Arc<Lock<HashMap<u64, TrackKey>>>,
) -> Result<(), Error> {
	loop {
		let recv = session.accept_uni().await.map_err(|e| Error::Transport(Arc::new(e)))?;
		let mut reader = Reader::new(recv, Version::Draft15);

		let table = table.clone();
		let aliases = aliases.clone();
		web_async::spawn(async move {
			if let Err(err) = relay_one_stream(&table, &aliases, &mut reader).await {
				tracing::debug!(%err, "dropped inbound relay stream");
			}
		});
	}
}

/// SUBGROUP_HEADER type codes occupy this range; anything else (FETCH_HEADER,
/// future stream types) isn't handled by this fan-out glue.
const SUBGROUP_HEADER_RANGE: std::ops::RangeInclusive<u64> = 0x10..=0x3d;

async fn relay_one_stream<S: web_transport_trait::Session>(
	table: &TrackTable<S>,
	aliases: &Lock<HashMap<u64, TrackKey>>,
	reader: &mut Reader<S::RecvStream, Version>,
) -> Result<(), Error> {
	let kind: u64 = reader.decode_peek().await?;
	if !SUBGROUP_HEADER_RANGE.contains(&kind) {
		return Err(Error::UnexpectedStream);
	}

	let header: SubgroupHeader = reader.decode().await?;
	let key = aliases.lock().get(&header.track_alias).cloned().ok_or(Error::NotFound)?;

	forward_subgroup(table, &key, header, reader).await
}

/// Copies one subgroup stream's objects out to every subscriber currently
/// registered for `key`.
///
/// Subscribers are snapshotted once, at the start of the subgroup: a
/// subscription that arrives mid-subgroup picks up starting with the next one.
/// Per subscriber, exactly one outbound stream is opened for this
/// (track_alias, group_id, subgroup_id) and reused for every object, so objects
/// from this subgroup are never interleaved with another on the wire.
pub async fn forward_subgroup<S: web_transport_trait::Session>(
	table: &TrackTable<S>,
	key: &TrackKey,
	header: SubgroupHeader,
	reader: &mut Reader<S::RecvStream, Version>,
) -> Result<(), Error> {
	let subscribers = table.subscriber_sessions(key);
	if subscribers.is_empty() {
		// Nobody to forward to; dropping `reader` discards the rest of the stream.
		return Ok(());
	}

	let extensions_present = header.header_type.has_extensions();
	let mut outbound: HashMap<SubscriberId, Writer<S::SendStream, Version>> = HashMap::new();

	loop {
		match reader.closed().await {
			Ok(()) => break,
			Err(Error::Decode(crate::coding::DecodeError::ExpectedEnd)) => {}
			Err(err) => return Err(err),
		}

		let object: SubgroupObject = reader
			.decode_fn(move |r, version| SubgroupObject::decode_with(r, version, extensions_present))
			.await?;

		let mut encoded = bytes::BytesMut::new();
		object.encode_with(&mut encoded, Version::Draft15, extensions_present);
		let mut encoded = encoded.freeze();

		for (id, session) in &subscribers {
			let writer = match outbound.entry(*id) {
				Entry::Occupied(entry) => entry.into_mut(),
				Entry::Vacant(entry) => match open_subgroup_stream(session, &header).await {
					Ok(writer) => entry.insert(writer),
					Err(err) => {
						tracing::debug!(%err, "failed opening outbound subgroup stream");
						continue;
					}
				},
			};

			if let Err(err) = writer.write_all(&mut encoded.clone()).await {
				tracing::debug!(%err, "failed forwarding object to subscriber");
				outbound.remove(id);
			}
		}
	}

	for (_, mut writer) in outbound {
		writer.finish().ok();
	}

	Ok(())
}

async fn open_subgroup_stream<S: web_transport_trait::Session>(
	session: &S,
	header: &SubgroupHeader,
) -> Result<Writer<S::SendStream, Version>, Error> {
	let send = session.open_uni().await.map_err(|e| Error::Transport(Arc::new(e)))?;
	let mut writer = Writer::new(send, Version::Draft15);
	writer.encode(header).await?;
	Ok(writer)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ietf::TrackNamespace;

	fn key(name: &str) -> TrackKey {
		TrackKey::new(TrackNamespace::from(vec!["live".to_string()]), name)
	}

	// TrackTable's bookkeeping only requires `S: Clone`; a real transport
	// session is only needed by the streaming free functions below, which
	// aren't exercised by these tests.
	#[derive(Clone)]
	struct FakeSession;

	#[test]
	fn publisher_then_subscriber_keeps_entry_until_both_gone() {
		let table: TrackTable<FakeSession> = TrackTable::new();
		let k = key("alice");

		table.register_publisher(k.clone(), 7);
		assert_eq!(table.publisher_alias(&k), Some(7));

		let sub = table.register_subscriber(k.clone(), FakeSession);
		assert_eq!(table.subscriber_sessions(&k).len(), 1);

		table.remove_publisher(&k);
		assert_eq!(table.publisher_alias(&k), None);
		// subscriber still registered, entry survives
		assert_eq!(table.subscriber_sessions(&k).len(), 1);

		table.remove_subscriber(&k, sub);
		assert_eq!(table.subscriber_sessions(&k).len(), 0);
	}

	#[test]
	fn subscriber_without_publisher_is_dropped_on_unsubscribe() {
		let table: TrackTable<FakeSession> = TrackTable::new();
		let k = key("bob");

		let sub = table.register_subscriber(k.clone(), FakeSession);
		assert!(table.publisher_alias(&k).is_none());
		assert_eq!(table.subscriber_sessions(&k).len(), 1);

		table.remove_subscriber(&k, sub);
		assert_eq!(table.subscriber_sessions(&k).len(), 0);
	}
}
