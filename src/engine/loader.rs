use std::rc::Rc;

use log::{debug, info, warn};

use crate::api::{DiagnosticListing, GraphApi};
use crate::error::Result;
use crate::model::{GraphId, ItemId};
use crate::store::{Action, Dispatch, Transition};
use crate::window::SubgraphPayload;

/// Fetches graph metadata and subgraph windows into the store.
pub struct WindowLoader<A, D> {
	api: Rc<A>,
	store: D,
}

impl<A, D: Clone> Clone for WindowLoader<A, D> {
	fn clone(&self) -> Self {
		Self {
			api: self.api.clone(),
			store: self.store.clone(),
		}
	}
}

impl<A: GraphApi, D: Dispatch> WindowLoader<A, D> {
	pub fn new(api: Rc<A>, store: D) -> Self {
		Self { api, store }
	}

	/// Loads metadata, ontology, subgraph list and settings of `graph`.
	pub async fn load_graph(&self, graph: &GraphId) -> Result<()> {
		info!("loading graph {graph}");
		let details = self.api.graph(graph).await?;
		self.store.dispatch(Action::SetGraph(details));
		Ok(())
	}

	/// Fetches one page of the window around `central`, or around the graph's
	/// default anchor when `central` is `None`.
	///
	/// Returns [`Transition::Stale`] when a newer fetch started meanwhile; the
	/// response is then dropped.
	pub async fn load_subgraph(
		&self,
		graph: &GraphId,
		central: Option<ItemId>,
		page: usize,
		limit: usize,
	) -> Result<Transition> {
		let started = self.store.dispatch(Action::BeginFetch {
			central: central.clone(),
			page,
			limit,
		});
		let Transition::FetchStarted(generation) = started else {
			return Ok(started);
		};

		let skip = page * limit;
		let fetched = self
			.api
			.window(graph, central.as_ref(), skip, limit)
			.await
			.and_then(SubgraphPayload::into_checked);

		if !self.store.is_live() {
			debug!("window #{generation} arrived after the view closed");
			return Ok(Transition::Stale);
		}
		match fetched {
			Ok(payload) => {
				let anchor = payload.central_node_id.clone();
				let transition = self.store.dispatch(Action::SetSubgraph {
					generation,
					payload,
				});
				if transition == Transition::Stale {
					warn!("window #{generation} around {anchor} arrived after a newer fetch");
				} else {
					info!("window #{generation} around {anchor}, page {page} of size {limit}");
				}
				Ok(transition)
			}
			Err(e) => {
				self.store.dispatch(Action::FetchFailed { generation });
				Err(e)
			}
		}
	}

	/// Re-fetches the requested anchor at `page`. While a re-anchor is in
	/// flight, that anchor wins over the one on screen.
	pub async fn change_page(&self, graph: &GraphId, page: usize) -> Result<Transition> {
		let (central, limit) = self
			.store
			.read(|s| (s.window.requested_central(), s.window.requested_limit()));
		self.load_subgraph(graph, central, page, limit).await
	}

	/// Re-fetches the requested anchor with a new page size, back on the first page.
	pub async fn change_limit(&self, graph: &GraphId, limit: usize) -> Result<Transition> {
		let central = self.store.read(|s| s.window.requested_central());
		self.load_subgraph(graph, central, 0, limit).await
	}

	pub async fn errors(&self, graph: &GraphId) -> Result<Vec<DiagnosticListing>> {
		self.api.errors(graph).await
	}

	pub async fn suggestions(&self, graph: &GraphId) -> Result<Vec<DiagnosticListing>> {
		self.api.suggestions(graph).await
	}
}
