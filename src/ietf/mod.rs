//! An implementation of the IETF MoQ specification.
//!
//! Not all features are supported; just to provide compatibility with the crate API.
//!
//! You should not use this module directly; see [crate] for the high-level API.

mod control;
mod fetch;
mod goaway;
mod group;
mod location;
mod message;
mod namespace;
mod parameters;
mod publish;
mod publish_namespace;
mod request;
mod session;
mod setup;
mod subscribe;
mod subscribe_namespace;
mod track;
mod version;

use control::*;
pub use fetch::*;
pub use goaway::*;
pub use group::*;
pub use location::*;
pub use message::*;
pub use namespace::TrackNamespace;
pub use parameters::*;
pub use publish::*;
pub use publish_namespace::*;
pub use request::*;
pub(crate) use session::{Session, start};
pub use session::{FetchOutcome, PublishOutcome, RequestFailed, SessionEvent, SubscribeOutcome, TrackInfo};
pub use setup::*;
pub use subscribe::*;
pub use subscribe_namespace::*;
pub use track::*;
pub use version::*;
