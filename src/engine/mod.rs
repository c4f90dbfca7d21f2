//! Server round trips: window loads, confirmed mutations and merges.
//!
//! Each operation talks to a [`GraphApi`](crate::api::GraphApi) and, once the
//! server confirmed, dispatches the matching [`Action`](crate::store::Action).

mod loader;
mod loading;
mod merge;
mod mutation;


use std::fmt;
use std::rc::Rc;

use chrono::NaiveDateTime;

pub use loader::WindowLoader;
pub use loading::{LoadingFlags, LoadingGuard};
pub use merge::{MergeConflict, MergeResolver, MergeState};
pub use mutation::{MutationEngine, UpdateOutcome};

use crate::api::GraphApi;
use crate::store::Dispatch;

/// Mutation kinds tracked by the loading flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
	Review,
	Activation,
	ReverseEdgeDirection,
	Information,
	Properties,
	DeleteProperty,
	Acknowledge,
	Ontology,
	Merge,
}

impl ActionKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Review => "review",
			Self::Activation => "activation",
			Self::ReverseEdgeDirection => "reverseEdgeDirection",
			Self::Information => "information",
			Self::Properties => "properties",
			Self::DeleteProperty => "deleteProperty",
			Self::Acknowledge => "acknowledge",
			Self::Ontology => "ontology",
			Self::Merge => "merge",
		}
	}
}

impl fmt::Display for ActionKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Wall-clock stamp for confirmed changes.
pub(crate) fn now() -> NaiveDateTime {
	chrono::Utc::now().naive_utc()
}

/// The three engines over one backend and one store, sharing loading flags.
pub struct Engine<A, D> {
	pub loader: WindowLoader<A, D>,
	pub mutations: MutationEngine<A, D>,
	pub merges: MergeResolver<A, D>,
}

impl<A: GraphApi, D: Dispatch + Clone> Engine<A, D> {
	pub fn new(api: Rc<A>, store: D) -> Self {
		let loading = LoadingFlags::default();
		let loader = WindowLoader::new(api.clone(), store.clone());
		Self {
			mutations: MutationEngine::new(api.clone(), store.clone(), loading.clone()),
			merges: MergeResolver::new(api, store, loader.clone(), loading),
			loader,
		}
	}

	pub fn loading(&self) -> &LoadingFlags {
		self.mutations.loading()
	}
}

impl<A, D: Clone> Clone for Engine<A, D> {
	fn clone(&self) -> Self {
		Self {
			loader: self.loader.clone(),
			mutations: self.mutations.clone(),
			merges: self.merges.clone(),
		}
	}
}
