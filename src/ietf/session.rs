//! The per-session MoQT state machine.
//!
//! Owns the request/response correlation table, the request-ID flow-control
//! state (delegated to [Control]), and the subscription/publication tables
//! indexed by both request id and track alias. This replaces the
//! producer/consumer broadcast pipeline with the plain request/reply model
//! the wire protocol actually describes; the data plane (subgroup streams,
//! datagrams, fan-out) is handled by [crate::relay].

use std::collections::HashMap;

use tokio::sync::oneshot;
use web_async::Lock;

use crate::{
	Error,
	coding::{Reader, Stream},
	ietf::{self, Control, Message, RequestId, TrackNamespace, Version},
};

/// Information about a live subscription or publication.
#[derive(Clone, Debug)]
pub struct TrackInfo {
	pub request_id: RequestId,
	pub track_alias: u64,
	pub track_namespace: TrackNamespace,
	pub track_name: String,
}

/// The outcome of a successful SUBSCRIBE.
#[derive(Clone, Copy, Debug)]
pub struct SubscribeOutcome {
	pub track_alias: u64,
}

/// The outcome of a successful PUBLISH.
#[derive(Clone, Copy, Debug)]
pub struct PublishOutcome {
	pub forward: bool,
	pub subscriber_priority: u8,
	pub group_order: ietf::GroupOrder,
}

/// The outcome of a successful FETCH.
#[derive(Clone, Copy, Debug)]
pub struct FetchOutcome {
	pub group_order: ietf::GroupOrder,
	pub end_of_track: bool,
	pub end_location: ietf::Location,
}

/// A REQUEST_ERROR (or one of its bespoke siblings), surfaced to the caller
/// that issued the original request.
#[derive(Clone, Debug)]
pub struct RequestFailed {
	pub error_code: u64,
	pub reason: String,
}

impl std::fmt::Display for RequestFailed {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "request failed (code {}): {}", self.error_code, self.reason)
	}
}

/// Events surfaced to the application as control messages change session state.
///
/// Delivered over an unbounded channel so the control-stream task never blocks
/// waiting on the application.
#[derive(Clone, Debug)]
pub enum SessionEvent {
	SubscribeRequested {
		request_id: RequestId,
		track_namespace: TrackNamespace,
		track_name: String,
		track_alias: u64,
	},
	PublishRequested {
		request_id: RequestId,
		track_namespace: TrackNamespace,
		track_name: String,
		track_alias: u64,
	},
	PublishNamespaceRequested {
		request_id: RequestId,
		track_namespace: TrackNamespace,
	},
	SubscribeNamespaceRequested {
		request_id: RequestId,
		track_namespace: TrackNamespace,
	},
	GoAway {
		new_session_uri: String,
	},
	Closed,
}

enum Awaiter {
	Subscribe(oneshot::Sender<Result<SubscribeOutcome, RequestFailed>>),
	Publish(oneshot::Sender<Result<PublishOutcome, RequestFailed>>),
	Fetch(oneshot::Sender<Result<FetchOutcome, RequestFailed>>),
	Generic(oneshot::Sender<Result<(), RequestFailed>>),
}

#[derive(Default)]
struct State {
	established: bool,
	goaway: bool,
	next_track_alias: u64,
	subscriptions: HashMap<RequestId, TrackInfo>,
	publications: HashMap<RequestId, TrackInfo>,
	alias_index: HashMap<u64, RequestId>,
	pending: HashMap<RequestId, Awaiter>,
}

/// The live MoQT session: request/response API plus the control dispatch loop.
#[derive(Clone)]
pub(crate) struct Session<S: web_transport_trait::Session> {
	session: S,
	control: Control,
	state: Lock<State>,
	events: async_channel::Sender<SessionEvent>,
	version: Version,
}

impl<S: web_transport_trait::Session> Session<S> {
	fn new(session: S, control: Control, events: async_channel::Sender<SessionEvent>, version: Version) -> Self {
		Self {
			session,
			control,
			state: Default::default(),
			events,
			version,
		}
	}

	fn next_track_alias(&self) -> u64 {
		let mut state = self.state.lock();
		let alias = state.next_track_alias;
		state.next_track_alias += 1;
		alias
	}

	/// Ask the peer for a track. Resolves once REQUEST_OK/REQUEST_ERROR-equivalent
	/// (here, SUBSCRIBE_OK/REQUEST_ERROR) arrives.
	pub async fn subscribe(
		&self,
		track_namespace: TrackNamespace,
		track_name: String,
		filter: ietf::SubscriptionFilter,
		group_order: Option<ietf::GroupOrder>,
	) -> Result<SubscribeOutcome, Error> {
		let request_id = self.control.next_request_id().await?;
		let track_alias = self.next_track_alias();

		let (tx, rx) = oneshot::channel();
		self.state.lock().pending.insert(request_id, Awaiter::Subscribe(tx));

		self.control.send(ietf::Subscribe {
			request_id,
			track_alias,
			track_namespace,
			track_name: track_name.into(),
			filter,
			group_order,
		})?;

		rx.await.map_err(|_| Error::Cancel)?.map_err(Error::from)
	}

	pub fn unsubscribe(&self, request_id: RequestId) -> Result<(), Error> {
		self.remove_subscription(request_id);
		self.control.send(ietf::Unsubscribe { request_id })
	}

	pub async fn publish(
		&self,
		track_namespace: TrackNamespace,
		track_name: String,
		group_order: ietf::GroupOrder,
		largest_location: Option<ietf::Location>,
	) -> Result<PublishOutcome, Error> {
		let request_id = self.control.next_request_id().await?;
		let track_alias = self.next_track_alias();

		let (tx, rx) = oneshot::channel();
		self.state.lock().pending.insert(request_id, Awaiter::Publish(tx));

		self.control.send(ietf::Publish {
			request_id,
			track_namespace,
			track_name: track_name.into(),
			track_alias,
			group_order,
			largest_location,
			forward: true,
		})?;

		rx.await.map_err(|_| Error::Cancel)?.map_err(Error::from)
	}

	pub fn publish_done(&self, request_id: RequestId, status_code: u64, reason: String) -> Result<(), Error> {
		self.remove_publication(request_id);
		self.control.send(ietf::PublishDone {
			request_id,
			status_code,
			stream_count: 0,
			reason_phrase: reason.into(),
		})
	}

	pub async fn publish_namespace(&self, track_namespace: TrackNamespace) -> Result<(), Error> {
		let request_id = self.control.next_request_id().await?;
		let (tx, rx) = oneshot::channel();
		self.state.lock().pending.insert(request_id, Awaiter::Generic(tx));

		self.control.send(ietf::PublishNamespace {
			request_id,
			track_namespace,
		})?;

		rx.await.map_err(|_| Error::Cancel)?.map_err(Error::from)
	}

	pub async fn subscribe_namespace(&self, namespace: TrackNamespace) -> Result<(), Error> {
		let request_id = self.control.next_request_id().await?;
		let (tx, rx) = oneshot::channel();
		self.state.lock().pending.insert(request_id, Awaiter::Generic(tx));

		self.control.send(ietf::SubscribeNamespace { request_id, namespace })?;

		rx.await.map_err(|_| Error::Cancel)?.map_err(Error::from)
	}

	pub async fn fetch(&self, subscriber_priority: u8, group_order: ietf::GroupOrder, fetch_type: ietf::FetchType<'static>) -> Result<FetchOutcome, Error> {
		let request_id = self.control.next_request_id().await?;
		let (tx, rx) = oneshot::channel();
		self.state.lock().pending.insert(request_id, Awaiter::Fetch(tx));

		self.control.send(ietf::Fetch {
			request_id,
			subscriber_priority,
			group_order,
			fetch_type,
		})?;

		rx.await.map_err(|_| Error::Cancel)?.map_err(Error::from)
	}

	pub fn goaway(&self, new_session_uri: impl Into<String>) -> Result<(), Error> {
		self.control.send(ietf::Goaway {
			new_session_uri: new_session_uri.into().into(),
		})
	}

	fn remove_subscription(&self, request_id: RequestId) {
		let mut state = self.state.lock();
		if let Some(track) = state.subscriptions.remove(&request_id) {
			state.alias_index.remove(&track.track_alias);
		}
	}

	fn remove_publication(&self, request_id: RequestId) {
		let mut state = self.state.lock();
		if let Some(track) = state.publications.remove(&request_id) {
			state.alias_index.remove(&track.track_alias);
		}
	}

	fn emit(&self, event: SessionEvent) {
		let _ = self.events.try_send(event);
	}

	// --- inbound request handlers (receiver side) ---

	fn recv_subscribe(&self, msg: ietf::Subscribe<'_>) -> Result<(), Error> {
		let request_id = msg.request_id;

		let mut state = self.state.lock();
		if state.alias_index.contains_key(&msg.track_alias) {
			drop(state);
			return self.control.send(ietf::RequestError {
				request_id,
				error_code: u64::from(ietf::ErrorCode::DuplicateTrackAlias),
				reason_phrase: "duplicate track alias".into(),
			});
		}

		state.subscriptions.insert(
			request_id,
			TrackInfo {
				request_id,
				track_alias: msg.track_alias,
				track_namespace: msg.track_namespace.clone(),
				track_name: msg.track_name.to_string(),
			},
		);
		state.alias_index.insert(msg.track_alias, request_id);
		drop(state);

		self.control.send(ietf::SubscribeOk {
			request_id,
			track_alias: msg.track_alias,
		})?;

		self.emit(SessionEvent::SubscribeRequested {
			request_id,
			track_namespace: msg.track_namespace,
			track_name: msg.track_name.to_string(),
			track_alias: msg.track_alias,
		});

		Ok(())
	}

	fn recv_subscribe_update(&self, _msg: ietf::SubscribeUpdate) -> Result<(), Error> {
		// Priority/forward updates to an existing subscription; nothing in our
		// tables needs to change since we don't track those fields yet.
		Ok(())
	}

	fn recv_unsubscribe(&self, msg: ietf::Unsubscribe) -> Result<(), Error> {
		self.remove_subscription(msg.request_id);
		Ok(())
	}

	fn recv_publish(&self, msg: ietf::Publish<'_>) -> Result<(), Error> {
		let request_id = msg.request_id;

		let mut state = self.state.lock();
		if state.alias_index.contains_key(&msg.track_alias) {
			drop(state);
			return self.control.send(ietf::PublishError {
				request_id,
				error_code: u64::from(ietf::ErrorCode::DuplicateTrackAlias),
				reason_phrase: "duplicate track alias".into(),
			});
		}

		state.publications.insert(
			request_id,
			TrackInfo {
				request_id,
				track_alias: msg.track_alias,
				track_namespace: msg.track_namespace.clone(),
				track_name: msg.track_name.to_string(),
			},
		);
		state.alias_index.insert(msg.track_alias, request_id);
		drop(state);

		self.control.send(ietf::PublishOk {
			request_id,
			forward: true,
			subscriber_priority: 0,
			group_order: msg.group_order,
			filter_type: ietf::FilterType::LargestObject,
		})?;

		self.emit(SessionEvent::PublishRequested {
			request_id,
			track_namespace: msg.track_namespace,
			track_name: msg.track_name.to_string(),
			track_alias: msg.track_alias,
		});

		Ok(())
	}

	fn recv_publish_done(&self, msg: ietf::PublishDone<'_>) -> Result<(), Error> {
		self.remove_publication(msg.request_id);
		Ok(())
	}

	fn recv_publish_namespace(&self, msg: ietf::PublishNamespace) -> Result<(), Error> {
		self.control.send(ietf::RequestOk {
			request_id: msg.request_id,
		})?;
		self.emit(SessionEvent::PublishNamespaceRequested {
			request_id: msg.request_id,
			track_namespace: msg.track_namespace,
		});
		Ok(())
	}

	fn recv_publish_namespace_done(&self, _msg: ietf::PublishNamespaceDone) -> Result<(), Error> {
		Ok(())
	}

	fn recv_publish_namespace_cancel(&self, _msg: ietf::PublishNamespaceCancel<'_>) -> Result<(), Error> {
		Ok(())
	}

	fn recv_subscribe_namespace(&self, msg: ietf::SubscribeNamespace) -> Result<(), Error> {
		self.control.send(ietf::RequestOk {
			request_id: msg.request_id,
		})?;
		self.emit(SessionEvent::SubscribeNamespaceRequested {
			request_id: msg.request_id,
			track_namespace: msg.namespace,
		});
		Ok(())
	}

	fn recv_unsubscribe_namespace(&self, _msg: ietf::UnsubscribeNamespace) -> Result<(), Error> {
		Ok(())
	}

	fn recv_track_status(&self, msg: ietf::TrackStatus<'_>) -> Result<(), Error> {
		self.control.send(ietf::TrackStatusOk {
			request_id: msg.request_id,
			status_code: ietf::TrackStatusCode::NotFound,
			largest_location: ietf::Location::default(),
		})
	}

	fn recv_fetch(&self, msg: ietf::Fetch<'_>) -> Result<(), Error> {
		// Historical fetch isn't backed by a real catalog here; reply with a
		// deterministic error rather than silently accepting. A relay wires
		// this up to its track table (see crate::relay).
		self.control.send(ietf::FetchError {
			request_id: msg.request_id,
			error_code: 3, // NOT_SUPPORTED
			reason_phrase: "fetch not backed by this session".into(),
		})
	}

	fn recv_fetch_cancel(&self, _msg: ietf::FetchCancel) -> Result<(), Error> {
		Ok(())
	}

	// --- inbound replies (correlate with a pending awaiter) ---

	fn resolve_subscribe(&self, request_id: RequestId, result: Result<SubscribeOutcome, RequestFailed>) {
		if let Some(Awaiter::Subscribe(tx)) = self.state.lock().pending.remove(&request_id) {
			let _ = tx.send(result);
		}
	}

	fn resolve_publish(&self, request_id: RequestId, result: Result<PublishOutcome, RequestFailed>) {
		if let Some(Awaiter::Publish(tx)) = self.state.lock().pending.remove(&request_id) {
			let _ = tx.send(result);
		}
	}

	fn resolve_fetch(&self, request_id: RequestId, result: Result<FetchOutcome, RequestFailed>) {
		if let Some(Awaiter::Fetch(tx)) = self.state.lock().pending.remove(&request_id) {
			let _ = tx.send(result);
		}
	}

	fn resolve_generic(&self, request_id: RequestId, result: Result<(), RequestFailed>) {
		if let Some(Awaiter::Generic(tx)) = self.state.lock().pending.remove(&request_id) {
			let _ = tx.send(result);
		}
	}

	fn recv_subscribe_ok(&self, msg: ietf::SubscribeOk) -> Result<(), Error> {
		self.resolve_subscribe(msg.request_id, Ok(SubscribeOutcome { track_alias: msg.track_alias }));
		Ok(())
	}

	fn recv_publish_ok(&self, msg: ietf::PublishOk) -> Result<(), Error> {
		self.resolve_publish(
			msg.request_id,
			Ok(PublishOutcome {
				forward: msg.forward,
				subscriber_priority: msg.subscriber_priority,
				group_order: msg.group_order,
			}),
		);
		Ok(())
	}

	fn recv_publish_error(&self, msg: ietf::PublishError<'_>) -> Result<(), Error> {
		self.resolve_publish(
			msg.request_id,
			Err(RequestFailed {
				error_code: msg.error_code,
				reason: msg.reason_phrase.to_string(),
			}),
		);
		Ok(())
	}

	fn recv_fetch_ok(&self, msg: ietf::FetchOk) -> Result<(), Error> {
		self.resolve_fetch(
			msg.request_id,
			Ok(FetchOutcome {
				group_order: msg.group_order,
				end_of_track: msg.end_of_track,
				end_location: msg.end_location,
			}),
		);
		Ok(())
	}

	fn recv_fetch_error(&self, msg: ietf::FetchError<'_>) -> Result<(), Error> {
		self.resolve_fetch(
			msg.request_id,
			Err(RequestFailed {
				error_code: msg.error_code,
				reason: msg.reason_phrase.to_string(),
			}),
		);
		Ok(())
	}

	fn recv_request_ok(&self, msg: ietf::RequestOk) -> Result<(), Error> {
		self.resolve_generic(msg.request_id, Ok(()));
		Ok(())
	}

	fn recv_request_error(&self, msg: ietf::RequestError<'_>) -> Result<(), Error> {
		// A REQUEST_ERROR could be replying to a SUBSCRIBE or PUBLISH too, since
		// they share the error shape on the wire even though their OK replies
		// don't. Try every awaiter kind in turn.
		let failed = RequestFailed {
			error_code: msg.error_code,
			reason: msg.reason_phrase.to_string(),
		};

		let awaiter = self.state.lock().pending.remove(&msg.request_id);
		match awaiter {
			Some(Awaiter::Subscribe(tx)) => {
				let _ = tx.send(Err(failed));
			}
			Some(Awaiter::Publish(tx)) => {
				let _ = tx.send(Err(failed));
			}
			Some(Awaiter::Fetch(tx)) => {
				let _ = tx.send(Err(failed));
			}
			Some(Awaiter::Generic(tx)) => {
				let _ = tx.send(Err(failed));
			}
			None => tracing::warn!(request_id = %msg.request_id, "request error for unknown request"),
		}

		Ok(())
	}

	fn recv_goaway(&self, msg: ietf::Goaway<'_>) -> Result<(), Error> {
		self.state.lock().goaway = true;
		self.emit(SessionEvent::GoAway {
			new_session_uri: msg.new_session_uri.to_string(),
		});
		Ok(())
	}

	fn recv_max_request_id(&self, msg: ietf::MaxRequestId) -> Result<(), Error> {
		self.control.max_request_id(RequestId(msg.request_id))
	}

	fn recv_requests_blocked(&self, msg: ietf::RequestsBlocked) {
		tracing::warn!(maximum_request_id = %msg.maximum_request_id, "peer reports requests blocked");
	}
}

/// Sets up request-ID flow control and the session-event channel, then spawns
/// the control dispatch loop in the background. Returns the handle the
/// application drives (subscribe/publish/...) and the event stream it can
/// poll for inbound requests, so neither is tied up waiting on the control task.
#[allow(clippy::too_many_arguments)]
pub(crate) fn start<S: web_transport_trait::Session>(
	session: S,
	control_stream: Stream<S, Version>,
	request_id_max: RequestId,
	client: bool,
	version: Version,
) -> (Session<S>, async_channel::Receiver<SessionEvent>) {
	let (ctrl_tx, ctrl_rx) = tokio::sync::mpsc::unbounded_channel();
	let control = Control::new(ctrl_tx, request_id_max, client, version);
	let (events_tx, events_rx) = async_channel::unbounded();

	let handle = Session::new(session.clone(), control.clone(), events_tx, version);
	handle.state.lock().established = true;

	let run_session = session.clone();
	let run_handle = handle.clone();
	web_async::spawn(async move {
		let result = tokio::select! {
			res = run_control_read(control_stream.reader, run_handle) => res,
			res = Control::run::<S>(control_stream.writer, ctrl_rx) => res,
		};

		match result {
			Err(Error::Transport(_)) => {
				tracing::info!("session terminated");
				run_session.close(1, "");
			}
			Err(err) => {
				tracing::warn!(%err, "session error");
				run_session.close(err.to_code(), err.to_string().as_ref());
			}
			_ => {
				tracing::info!("session closed");
				run_session.close(0, "");
			}
		}
	});

	(handle, events_rx)
}

async fn run_control_read<S: web_transport_trait::Session>(
	mut reader: Reader<S::RecvStream, Version>,
	session: Session<S>,
) -> Result<(), Error> {
	loop {
		let id: u64 = match reader.decode_maybe().await? {
			Some(id) => id,
			None => return Ok(()),
		};

		let size: u16 = reader.decode::<u16>().await?;
		tracing::trace!(id, size, "reading control message");

		let mut data = reader.read_exact(size as usize).await?;
		tracing::trace!(hex = %hex::encode(&data), "decoding control message");
		let version = session.version;

		match id {
			ietf::Subscribe::ID => {
				let msg = ietf::Subscribe::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_subscribe(msg)?;
			}
			ietf::SubscribeUpdate::ID => {
				let msg = ietf::SubscribeUpdate::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_subscribe_update(msg)?;
			}
			ietf::SubscribeOk::ID => {
				let msg = ietf::SubscribeOk::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_subscribe_ok(msg)?;
			}
			ietf::RequestError::ID => {
				let msg = ietf::RequestError::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_request_error(msg)?;
			}
			ietf::PublishNamespace::ID => {
				let msg = ietf::PublishNamespace::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_publish_namespace(msg)?;
			}
			ietf::RequestOk::ID => {
				let msg = ietf::RequestOk::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_request_ok(msg)?;
			}
			ietf::TrackStatusOk::ID => {
				// Shares nothing with REQUEST_OK; just log for now, no awaiter kind yet.
				let msg = ietf::TrackStatusOk::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message (track status ok)");
			}
			ietf::PublishNamespaceDone::ID => {
				let msg = ietf::PublishNamespaceDone::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_publish_namespace_done(msg)?;
			}
			ietf::Unsubscribe::ID => {
				let msg = ietf::Unsubscribe::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_unsubscribe(msg)?;
			}
			ietf::PublishDone::ID => {
				let msg = ietf::PublishDone::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_publish_done(msg)?;
			}
			ietf::PublishNamespaceCancel::ID => {
				let msg = ietf::PublishNamespaceCancel::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_publish_namespace_cancel(msg)?;
			}
			ietf::TrackStatus::ID => {
				let msg = ietf::TrackStatus::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_track_status(msg)?;
			}
			ietf::Goaway::ID => {
				let msg = ietf::Goaway::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_goaway(msg)?;
			}
			ietf::SubscribeNamespace::ID => {
				let msg = ietf::SubscribeNamespace::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_subscribe_namespace(msg)?;
			}
			ietf::UnsubscribeNamespace::ID => {
				let msg = ietf::UnsubscribeNamespace::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_unsubscribe_namespace(msg)?;
			}
			ietf::MaxRequestId::ID => {
				let msg = ietf::MaxRequestId::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_max_request_id(msg)?;
			}
			ietf::RequestsBlocked::ID => {
				let msg = ietf::RequestsBlocked::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_requests_blocked(msg);
			}
			ietf::Fetch::ID => {
				let msg = ietf::Fetch::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_fetch(msg)?;
			}
			ietf::FetchCancel::ID => {
				let msg = ietf::FetchCancel::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_fetch_cancel(msg)?;
			}
			ietf::FetchOk::ID => {
				let msg = ietf::FetchOk::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_fetch_ok(msg)?;
			}
			ietf::FetchError::ID => {
				let msg = ietf::FetchError::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_fetch_error(msg)?;
			}
			ietf::Publish::ID => {
				let msg = ietf::Publish::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_publish(msg)?;
			}
			ietf::PublishOk::ID => {
				let msg = ietf::PublishOk::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_publish_ok(msg)?;
			}
			ietf::PublishError::ID => {
				let msg = ietf::PublishError::decode_msg(&mut data, version)?;
				tracing::debug!(message = ?msg, "received control message");
				session.recv_publish_error(msg)?;
			}
			_ => return Err(Error::UnexpectedMessage),
		}

		if !data.is_empty() {
			return Err(Error::WrongSize);
		}
	}
}
