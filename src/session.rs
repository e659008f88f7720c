use std::{future::Future, pin::Pin, sync::Arc};

use crate::{Error, coding::Stream, ietf};

/// A MoQT session, wrapping a WebTransport connection.
///
/// Created via:
/// - [`Session::connect`] for clients.
/// - [`Session::accept`] for servers.
pub struct Session {
	transport: Arc<dyn TransportInner>,
	moqt: Arc<dyn MoqtInner>,
	events: async_channel::Receiver<ietf::SessionEvent>,
}

/// The single MoQT draft version this implementation speaks, and its ALPN.
pub const VERSIONS: [ietf::Version; 1] = [ietf::Version::Draft15];
pub const ALPN: &str = ietf::Version::ALPN;

impl Session {
	fn new<S: web_transport_trait::Session>(
		transport: S,
		moqt: ietf::Session<S>,
		events: async_channel::Receiver<ietf::SessionEvent>,
	) -> Self {
		Self {
			transport: Arc::new(transport),
			moqt: Arc::new(moqt),
			events,
		}
	}

	/// Perform the MoQT handshake as a client, negotiating the version.
	///
	/// The connection remains active until the session is closed.
	pub async fn connect<S: web_transport_trait::Session>(session: S) -> Result<Self, Error> {
		let mut stream = Stream::open(&session, ietf::Version::Draft15).await?;

		let mut parameters = ietf::Parameters::default();
		parameters.set_varint(ietf::ParameterVarInt::MaxRequestId, u32::MAX as u64);
		parameters.set_bytes(ietf::ParameterBytes::Implementation, b"moqt-rs".to_vec());

		let client = ietf::ClientSetup {
			versions: VERSIONS.into(),
			parameters,
		};

		tracing::trace!(?client, "sending client setup");
		ietf::write_framed(&mut stream.writer, &client, ietf::Version::Draft15).await?;

		let server: ietf::ServerSetup = ietf::read_framed(&mut stream.reader, ietf::Version::Draft15).await?;
		tracing::trace!(?server, "received server setup");

		let request_id_max = ietf::RequestId(server.max_request_id());
		let (moqt, events) = ietf::start(session.clone(), stream, request_id_max, true, server.version);

		tracing::debug!(version = ?server.version, "connected");

		Ok(Self::new(session, moqt, events))
	}

	/// Perform the MoQT handshake as a server.
	///
	/// The connection remains active until the session is closed.
	pub async fn accept<S: web_transport_trait::Session>(session: S) -> Result<Self, Error> {
		let mut stream = Stream::accept(&session, ietf::Version::Draft15).await?;
		let client: ietf::ClientSetup = ietf::read_framed(&mut stream.reader, ietf::Version::Draft15).await?;
		tracing::trace!(?client, "received client setup");

		let version = client
			.versions
			.iter()
			.find(|v| VERSIONS.contains(v))
			.copied()
			.ok_or_else(|| Error::Version {
				offered: client.versions.iter().map(|v| v.coding().0).collect(),
				supported: VERSIONS.iter().map(|v| v.coding().0).collect(),
			})?;

		let mut parameters = ietf::Parameters::default();
		parameters.set_varint(ietf::ParameterVarInt::MaxRequestId, u32::MAX as u64);
		parameters.set_bytes(ietf::ParameterBytes::Implementation, b"moqt-rs".to_vec());

		let server = ietf::ServerSetup { version, parameters };
		tracing::trace!(?server, "sending server setup");

		ietf::write_framed(&mut stream.writer, &server, version).await?;

		let request_id_max = ietf::RequestId(client.max_request_id());
		let (moqt, events) = ietf::start(session.clone(), stream, request_id_max, false, version);

		tracing::debug!(?version, "connected");

		Ok(Self::new(session, moqt, events))
	}

	/// Request a track from the peer, blocking until the peer replies.
	pub async fn subscribe(
		&self,
		track_namespace: ietf::TrackNamespace,
		track_name: String,
		filter: ietf::SubscriptionFilter,
		group_order: Option<ietf::GroupOrder>,
	) -> Result<ietf::SubscribeOutcome, Error> {
		self.moqt.subscribe(track_namespace, track_name, filter, group_order).await
	}

	/// Cancel a subscription previously created with [`Session::subscribe`].
	pub fn unsubscribe(&self, request_id: ietf::RequestId) -> Result<(), Error> {
		self.moqt.unsubscribe(request_id)
	}

	/// Offer a track to the peer, blocking until the peer replies.
	pub async fn publish(
		&self,
		track_namespace: ietf::TrackNamespace,
		track_name: String,
		group_order: ietf::GroupOrder,
		largest_location: Option<ietf::Location>,
	) -> Result<ietf::PublishOutcome, Error> {
		self.moqt.publish(track_namespace, track_name, group_order, largest_location).await
	}

	/// Tell the peer a previously offered track has ended.
	pub fn publish_done(&self, request_id: ietf::RequestId, status_code: u64, reason: String) -> Result<(), Error> {
		self.moqt.publish_done(request_id, status_code, reason)
	}

	/// Advertise a namespace of tracks to the peer.
	pub async fn publish_namespace(&self, track_namespace: ietf::TrackNamespace) -> Result<(), Error> {
		self.moqt.publish_namespace(track_namespace).await
	}

	/// Ask the peer to advertise a namespace of tracks as they become available.
	pub async fn subscribe_namespace(&self, namespace: ietf::TrackNamespace) -> Result<(), Error> {
		self.moqt.subscribe_namespace(namespace).await
	}

	/// Fetch a range of a track, either standalone or joining a live subscription.
	pub async fn fetch(
		&self,
		subscriber_priority: u8,
		group_order: ietf::GroupOrder,
		fetch_type: ietf::FetchType<'static>,
	) -> Result<ietf::FetchOutcome, Error> {
		self.moqt.fetch(subscriber_priority, group_order, fetch_type).await
	}

	/// Ask the peer to re-establish the session elsewhere.
	pub fn goaway(&self, new_session_uri: impl Into<String>) -> Result<(), Error> {
		self.moqt.goaway(new_session_uri.into())
	}

	/// Wait for the next inbound request (subscribe, publish, namespace announce, goaway).
	///
	/// Returns `None` once the session closes and no further events remain.
	pub async fn next_event(&self) -> Option<ietf::SessionEvent> {
		self.events.recv().await.ok()
	}

	/// Close the underlying transport session.
	pub fn close(self, err: Error) {
		self.transport.close(err.to_code(), err.to_string().as_ref());
	}

	/// Block until the transport session is closed.
	pub async fn closed(&self) -> Error {
		Error::Transport(self.transport.closed().await)
	}
}

// Wrapper traits that erase the `S: web_transport_trait::Session` generic so
// [Session] itself stays a plain, non-generic type.

trait TransportInner: Send + Sync {
	fn close(&self, code: u32, reason: &str);
	fn closed(&self) -> Pin<Box<dyn Future<Output = Arc<dyn crate::error::SendSyncError>> + Send + '_>>;
}

impl<S: web_transport_trait::Session> TransportInner for S {
	fn close(&self, code: u32, reason: &str) {
		S::close(self, code, reason);
	}

	fn closed(&self) -> Pin<Box<dyn Future<Output = Arc<dyn crate::error::SendSyncError>> + Send + '_>> {
		Box::pin(async move { Arc::new(S::closed(self).await) as Arc<dyn crate::error::SendSyncError> })
	}
}

trait MoqtInner: Send + Sync {
	fn subscribe<'a>(
		&'a self,
		track_namespace: ietf::TrackNamespace,
		track_name: String,
		filter: ietf::SubscriptionFilter,
		group_order: Option<ietf::GroupOrder>,
	) -> Pin<Box<dyn Future<Output = Result<ietf::SubscribeOutcome, Error>> + Send + 'a>>;

	fn unsubscribe(&self, request_id: ietf::RequestId) -> Result<(), Error>;

	fn publish<'a>(
		&'a self,
		track_namespace: ietf::TrackNamespace,
		track_name: String,
		group_order: ietf::GroupOrder,
		largest_location: Option<ietf::Location>,
	) -> Pin<Box<dyn Future<Output = Result<ietf::PublishOutcome, Error>> + Send + 'a>>;

	fn publish_done(&self, request_id: ietf::RequestId, status_code: u64, reason: String) -> Result<(), Error>;

	fn publish_namespace<'a>(
		&'a self,
		track_namespace: ietf::TrackNamespace,
	) -> Pin<Box<dyn Future<Output = Result<(), Error>> + Send + 'a>>;

	fn subscribe_namespace<'a>(
		&'a self,
		namespace: ietf::TrackNamespace,
	) -> Pin<Box<dyn Future<Output = Result<(), Error>> + Send + 'a>>;

	fn fetch<'a>(
		&'a self,
		subscriber_priority: u8,
		group_order: ietf::GroupOrder,
		fetch_type: ietf::FetchType<'static>,
	) -> Pin<Box<dyn Future<Output = Result<ietf::FetchOutcome, Error>> + Send + 'a>>;

	fn goaway(&self, new_session_uri: String) -> Result<(), Error>;
}

impl<S: web_transport_trait::Session> MoqtInner for ietf::Session<S> {
	fn subscribe<'a>(
		&'a self,
		track_namespace: ietf::TrackNamespace,
		track_name: String,
		filter: ietf::SubscriptionFilter,
		group_order: Option<ietf::GroupOrder>,
	) -> Pin<Box<dyn Future<Output = Result<ietf::SubscribeOutcome, Error>> + Send + 'a>> {
		Box::pin(ietf::Session::subscribe(self, track_namespace, track_name, filter, group_order))
	}

	fn unsubscribe(&self, request_id: ietf::RequestId) -> Result<(), Error> {
		ietf::Session::unsubscribe(self, request_id)
	}

	fn publish<'a>(
		&'a self,
		track_namespace: ietf::TrackNamespace,
		track_name: String,
		group_order: ietf::GroupOrder,
		largest_location: Option<ietf::Location>,
	) -> Pin<Box<dyn Future<Output = Result<ietf::PublishOutcome, Error>> + Send + 'a>> {
		Box::pin(ietf::Session::publish(self, track_namespace, track_name, group_order, largest_location))
	}

	fn publish_done(&self, request_id: ietf::RequestId, status_code: u64, reason: String) -> Result<(), Error> {
		ietf::Session::publish_done(self, request_id, status_code, reason)
	}

	fn publish_namespace<'a>(
		&'a self,
		track_namespace: ietf::TrackNamespace,
	) -> Pin<Box<dyn Future<Output = Result<(), Error>> + Send + 'a>> {
		Box::pin(ietf::Session::publish_namespace(self, track_namespace))
	}

	fn subscribe_namespace<'a>(
		&'a self,
		namespace: ietf::TrackNamespace,
	) -> Pin<Box<dyn Future<Output = Result<(), Error>> + Send + 'a>> {
		Box::pin(ietf::Session::subscribe_namespace(self, namespace))
	}

	fn fetch<'a>(
		&'a self,
		subscriber_priority: u8,
		group_order: ietf::GroupOrder,
		fetch_type: ietf::FetchType<'static>,
	) -> Pin<Box<dyn Future<Output = Result<ietf::FetchOutcome, Error>> + Send + 'a>> {
		Box::pin(ietf::Session::fetch(self, subscriber_priority, group_order, fetch_type))
	}

	fn goaway(&self, new_session_uri: String) -> Result<(), Error> {
		ietf::Session::goaway(self, new_session_uri)
	}
}
