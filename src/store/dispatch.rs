use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::{IsDisposed, RwSignal, Update, WithUntracked};

use super::action::{Action, Transition};
use super::state::GraphState;

/// Channel through which the engine reads and changes [`GraphState`].
pub trait Dispatch {
	fn dispatch(&self, action: Action) -> Transition;

	/// Reads the current state without subscribing to it.
	fn read<R>(&self, f: impl FnOnce(&GraphState) -> R) -> R;

	/// `false` once the view owning the state is gone; responses that arrive
	/// afterwards are dropped.
	fn is_live(&self) -> bool {
		true
	}
}

/// Non-reactive store, for tests and headless use.
#[derive(Clone, Debug, Default)]
pub struct LocalStore(Rc<RefCell<GraphState>>);

impl LocalStore {
	pub fn new(state: GraphState) -> Self {
		Self(Rc::new(RefCell::new(state)))
	}

	pub fn snapshot(&self) -> GraphState {
		self.0.borrow().clone()
	}
}

impl Dispatch for LocalStore {
	fn dispatch(&self, action: Action) -> Transition {
		self.0.borrow_mut().apply(action)
	}

	fn read<R>(&self, f: impl FnOnce(&GraphState) -> R) -> R {
		f(&self.0.borrow())
	}
}

/// The view's store: every applied action notifies the canvas and panels.
///
/// After the view unmounts, actions are ignored and reads see an empty state.
impl Dispatch for RwSignal<GraphState> {
	fn dispatch(&self, action: Action) -> Transition {
		self.try_update(|state| state.apply(action))
			.unwrap_or(Transition::Unchanged)
	}

	fn read<R>(&self, f: impl FnOnce(&GraphState) -> R) -> R {
		if self.is_disposed() {
			return f(&GraphState::default());
		}
		self.with_untracked(f)
	}

	fn is_live(&self) -> bool {
		!self.is_disposed()
	}
}
