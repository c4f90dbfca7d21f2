use chrono::NaiveDateTime;

use crate::api::ItemPatch;
use crate::model::{GraphDetails, ItemId, ItemRef, OntologyClass, Settings, SubgraphSummary};
use crate::window::{Neighbours, SubgraphPayload};

/// Every state change the client can make, already confirmed by the backend
/// where a round trip is involved. Timestamps are supplied by the caller so
/// that applying an action is deterministic.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
	/// Graph metadata, ontology, subgraph list and settings.
	SetGraph(GraphDetails),
	/// Invalidates the window ahead of a fetch.
	BeginFetch {
		central: Option<ItemId>,
		page: usize,
		limit: usize,
	},
	/// Installs a fetched window if `generation` is still the newest fetch.
	SetSubgraph {
		generation: u64,
		payload: SubgraphPayload,
	},
	FetchFailed {
		generation: u64,
	},
	SetCurrentItem(Option<ItemRef>),
	ReviewItem {
		item: ItemRef,
		review_all: bool,
		neighbours: Option<Neighbours>,
		at: NaiveDateTime,
	},
	ToggleActivation {
		item: ItemRef,
		is_active: bool,
		updated_node_ids: Vec<ItemId>,
		updated_edge_ids: Vec<ItemId>,
		at: NaiveDateTime,
	},
	UpdateItem {
		item: ItemRef,
		patch: ItemPatch,
		at: NaiveDateTime,
	},
	DeleteProperty {
		item: ItemRef,
		property_id: ItemId,
	},
	Acknowledge {
		item: ItemRef,
		is_error: bool,
		diagnostic_id: ItemId,
		at: NaiveDateTime,
	},
	AddClass(OntologyClass),
	UpdateClass {
		is_node: bool,
		id: ItemId,
		name: String,
		color: String,
	},
	MergeNodes {
		old_node_ids: Vec<ItemId>,
		new_subgraph: SubgraphSummary,
	},
	UpdateSettings(Settings),
}

impl Action {
	pub fn name(&self) -> &'static str {
		match self {
			Self::SetGraph(_) => "SET_GRAPH",
			Self::BeginFetch { .. } => "BEGIN_FETCH",
			Self::SetSubgraph { .. } => "SET_SUBGRAPH",
			Self::FetchFailed { .. } => "FETCH_FAILED",
			Self::SetCurrentItem(_) => "SET_CURRENT_ITEM",
			Self::ReviewItem { .. } => "REVIEW_ITEM",
			Self::ToggleActivation { .. } => "TOGGLE_ITEM_ACTIVATION",
			Self::UpdateItem { .. } => "UPDATE_ITEM",
			Self::DeleteProperty { .. } => "DELETE_PROPERTY",
			Self::Acknowledge { .. } => "UPDATE_ACKNOWLEDGEMENT",
			Self::AddClass(_) => "ADD_CLASS_ITEM",
			Self::UpdateClass { .. } => "UPDATE_CLASS_ITEM",
			Self::MergeNodes { .. } => "MERGE_NODES",
			Self::UpdateSettings(_) => "UPDATE_SETTINGS",
		}
	}
}

/// What applying an action did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
	Changed,
	Unchanged,
	/// A window response arrived for a fetch that was superseded.
	Stale,
	/// A fetch was started; its response must carry this generation.
	FetchStarted(u64),
}

impl Transition {
	pub fn changed(self) -> bool {
		matches!(self, Self::Changed | Self::FetchStarted(_))
	}

	fn from_flag(changed: bool) -> Self {
		if changed { Self::Changed } else { Self::Unchanged }
	}
}

impl From<bool> for Transition {
	fn from(changed: bool) -> Self {
		Self::from_flag(changed)
	}
}
