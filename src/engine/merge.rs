use std::cell::RefCell;
use std::rc::Rc;

use log::{error, info};

use super::{ActionKind, LoadingFlags, WindowLoader};
use crate::api::GraphApi;
use crate::error::{CleanGraphError, Result};
use crate::model::{GraphId, ItemId};
use crate::store::{Action, Dispatch};

/// A node edit refused because another node already has the requested name and type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeConflict {
	/// Node whose edit was refused; it disappears into the existing node on merge.
	pub item_id: ItemId,
	pub name: String,
	pub class_id: ItemId,
	/// Triples attached to the edited node.
	pub linked_triples: u64,
	pub existing_node_id: Option<ItemId>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MergeState {
	#[default]
	Idle,
	ConflictDetected(MergeConflict),
	Merged {
		new_node_id: ItemId,
	},
}

/// Drives a detected identity conflict to a merge or back to idle.
pub struct MergeResolver<A, D> {
	api: Rc<A>,
	store: D,
	loader: WindowLoader<A, D>,
	loading: LoadingFlags,
	state: Rc<RefCell<MergeState>>,
}

impl<A, D: Clone> Clone for MergeResolver<A, D> {
	fn clone(&self) -> Self {
		Self {
			api: self.api.clone(),
			store: self.store.clone(),
			loader: self.loader.clone(),
			loading: self.loading.clone(),
			state: self.state.clone(),
		}
	}
}

impl<A: GraphApi, D: Dispatch> MergeResolver<A, D> {
	pub fn new(api: Rc<A>, store: D, loader: WindowLoader<A, D>, loading: LoadingFlags) -> Self {
		Self {
			api,
			store,
			loader,
			loading,
			state: Rc::default(),
		}
	}

	pub fn state(&self) -> MergeState {
		self.state.borrow().clone()
	}

	pub fn pending(&self) -> Option<MergeConflict> {
		match &*self.state.borrow() {
			MergeState::ConflictDetected(conflict) => Some(conflict.clone()),
			_ => None,
		}
	}

	/// Records a conflict returned by an attribute patch, replacing any earlier one.
	pub fn detect(&self, conflict: MergeConflict) {
		*self.state.borrow_mut() = MergeState::ConflictDetected(conflict);
	}

	/// Discards the refused edit.
	pub fn cancel(&self) -> Result<MergeConflict> {
		let conflict = self.pending().ok_or(CleanGraphError::NoPendingMerge)?;
		info!("merge of {} discarded", conflict.item_id);
		*self.state.borrow_mut() = MergeState::Idle;
		Ok(conflict)
	}

	/// Merges the conflicting node into the existing one and re-anchors the
	/// window on the merged node.
	///
	/// A failed merge request keeps the conflict pending. Once the merge went
	/// through, a failed reload is [`CleanGraphError::ReanchorFailed`].
	pub async fn confirm(&self, graph: &GraphId) -> Result<ItemId> {
		let conflict = self.pending().ok_or(CleanGraphError::NoPendingMerge)?;
		let _guard = self.loading.acquire(ActionKind::Merge, &conflict.item_id)?;

		let response = self
			.api
			.merge_node(&conflict.item_id, &conflict.name, &conflict.class_id)
			.await?;
		if !response.item_modified {
			return Err(CleanGraphError::Rejected {
				action: ActionKind::Merge,
			});
		}

		let new_node_id = response.new_node.id.clone();
		info!(
			"merged {:?} into {new_node_id}",
			response.old_node_ids
		);
		self.store.dispatch(Action::MergeNodes {
			old_node_ids: response.old_node_ids,
			new_subgraph: response.new_subgraph,
		});
		*self.state.borrow_mut() = MergeState::Merged {
			new_node_id: new_node_id.clone(),
		};

		if !self.store.is_live() {
			return Ok(new_node_id);
		}
		let limit = self.store.read(|s| s.window.requested_limit());
		if let Err(source) = self
			.loader
			.load_subgraph(graph, Some(new_node_id.clone()), 0, limit)
			.await
		{
			error!("merged node {new_node_id} could not be loaded: {source}");
			return Err(CleanGraphError::ReanchorFailed {
				node_id: new_node_id,
				source: Box::new(source),
			});
		}
		Ok(new_node_id)
	}
}
