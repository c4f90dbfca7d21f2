//! Error taxonomy of the curation client.

use thiserror::Error;

use crate::engine::ActionKind;
use crate::model::ItemId;

/// Errors raised by window loads, mutations and merges.
///
/// Everything except [`CleanGraphError::ReanchorFailed`] is recoverable: the
/// caller notifies the user and the view stays usable.
#[derive(Debug, Error)]
pub enum CleanGraphError {
	/// The request never produced a response (connection refused, CORS, ...).
	#[error("request to {endpoint} failed: {message}")]
	Network { endpoint: String, message: String },

	/// The backend answered with a non-success status.
	#[error("{endpoint} returned HTTP {status}")]
	Status { endpoint: String, status: u16 },

	/// The response body did not have the expected shape.
	#[error("unexpected response from {endpoint}: {message}")]
	Decode { endpoint: String, message: String },

	/// The backend answered but did not apply the change.
	#[error("{action} was not applied by the server")]
	Rejected { action: ActionKind },

	/// The same action is already in flight for this item.
	#[error("{action} is already in progress for {item}")]
	Busy { action: ActionKind, item: ItemId },

	/// A window payload broke the endpoint/neighbour invariants.
	#[error("subgraph window is inconsistent: {0}")]
	InconsistentWindow(String),

	/// The operation needs a loaded window and there is none.
	#[error("no subgraph window is loaded")]
	NoWindow,

	/// The item is not part of the loaded window.
	#[error("item {0} is not in the current window")]
	UnknownItem(ItemId),

	/// Merge was confirmed or cancelled with no conflict pending.
	#[error("no merge conflict is pending")]
	NoPendingMerge,

	/// An ontology class with this name already exists for the same kind.
	#[error("a class named {0:?} already exists")]
	ClassExists(String),

	/// The merge went through but the view could not be re-anchored on the merged node.
	#[error("nodes were merged but the view could not be reloaded around {node_id}: {source}")]
	ReanchorFailed {
		node_id: ItemId,
		#[source]
		source: Box<CleanGraphError>,
	},

	/// Client configuration is unusable.
	#[error("invalid configuration: {0}")]
	Config(String),
}

impl CleanGraphError {
	/// Fatal errors leave the view in a state only navigation can fix.
	pub fn is_fatal(&self) -> bool {
		matches!(self, Self::ReanchorFailed { .. })
	}
}

/// Result alias used throughout the crate.
pub type Result<T, E = CleanGraphError> = std::result::Result<T, E>;
