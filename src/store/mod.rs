//! Projected client state and the transitions that change it.
//!
//! Every change goes through [`GraphState::apply`] with an [`Action`]; the
//! engine never touches state directly but dispatches through [`Dispatch`].

mod action;
mod dispatch;
mod state;


pub use action::{Action, Transition};
pub use dispatch::{Dispatch, LocalStore};
pub use state::{GraphMeta, GraphState};
