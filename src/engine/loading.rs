use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use log::debug;

use super::ActionKind;
use crate::error::{CleanGraphError, Result};
use crate::model::ItemId;

/// In-flight mutations keyed by action kind and item.
#[derive(Clone, Debug, Default)]
pub struct LoadingFlags(Rc<RefCell<HashSet<(ActionKind, ItemId)>>>);

impl LoadingFlags {
	/// Marks `action` as running on `item` until the guard drops.
	pub fn acquire(&self, action: ActionKind, item: &ItemId) -> Result<LoadingGuard> {
		let key = (action, item.clone());
		if !self.0.borrow_mut().insert(key.clone()) {
			debug!("{action} already running on {item}");
			return Err(CleanGraphError::Busy {
				action,
				item: item.clone(),
			});
		}
		Ok(LoadingGuard {
			flags: self.clone(),
			key,
		})
	}

	pub fn is_loading(&self, action: ActionKind, item: &ItemId) -> bool {
		self.0.borrow().contains(&(action, item.clone()))
	}

	/// True while `action` runs on any item.
	pub fn any(&self, action: ActionKind) -> bool {
		self.0.borrow().iter().any(|(kind, _)| *kind == action)
	}
}

pub struct LoadingGuard {
	flags: LoadingFlags,
	key: (ActionKind, ItemId),
}

impl Drop for LoadingGuard {
	fn drop(&mut self) {
		self.flags.0.borrow_mut().remove(&self.key);
	}
}
