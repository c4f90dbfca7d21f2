use std::future::Future;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::{use_navigate, use_params_map};
use log::{debug, error, info};

use crate::api::{DiagnosticListing, HttpGraphApi};
use crate::components::force_graph::{CanvasIntent, ForceGraphCanvas};
use crate::components::merge_dialog::MergeDialog;
use crate::components::notification::{Notice, Notifications};
use crate::components::panel::{FocusPanel, PanelIntent};
use crate::components::sidebar::{Sidebar, SidebarTab};
use crate::components::toolbar::Toolbar;
use crate::config::ClientConfig;
use crate::engine::{Engine, MergeConflict, UpdateOutcome};
use crate::error::{CleanGraphError, Result};
use crate::model::{GraphId, ItemId, ItemRef, Settings};
use crate::store::{Action, Dispatch, GraphState, Transition};

pub type GraphEngine = Engine<HttpGraphApi, RwSignal<GraphState>>;

/// Handles shared by the graph view's event handlers.
#[derive(Clone, Copy)]
struct Session {
	state: RwSignal<GraphState>,
	graph: StoredValue<GraphId>,
	engine: StoredValue<GraphEngine, LocalStorage>,
	merge: RwSignal<Option<MergeConflict>>,
	listings: RwSignal<Vec<DiagnosticListing>>,
	tab: RwSignal<SidebarTab>,
	notifications: Notifications,
}

impl Session {
	fn engine(&self) -> GraphEngine {
		self.engine.get_value()
	}

	fn report(&self, what: &str, e: &CleanGraphError) {
		error!("{what}: {e}");
		self.notifications.notify(Notice::failure(what, e));
	}

	fn sync_merge(&self) {
		let Some(pending) = self.engine.try_with_value(|e| e.merges.pending()) else {
			return;
		};
		if self.merge.try_get_untracked().is_some_and(|shown| shown != pending) {
			self.merge.try_set(pending);
		}
	}

	/// Runs an engine operation in the background, reporting failures.
	/// Results of operations that outlive the view are discarded.
	fn run<F, Fut>(self, what: &'static str, op: F)
	where
		F: FnOnce(GraphEngine, GraphId) -> Fut + 'static,
		Fut: Future<Output = Result<()>> + 'static,
	{
		let fut = op(self.engine(), self.graph.get_value());
		spawn_local(async move {
			let result = fut.await;
			if self.state.is_disposed() {
				debug!("{what} finished after the graph view closed");
				return;
			}
			if let Err(e) = result {
				self.report(what, &e);
			}
			self.sync_merge();
		});
	}

	fn limit(&self) -> usize {
		self.state.with_untracked(|s| s.window.requested_limit())
	}

	fn anchor(self, node: ItemId) {
		let limit = self.limit();
		self.run("loading subgraph", move |e, graph| async move {
			e.loader.load_subgraph(&graph, Some(node), 0, limit).await.map(|_| ())
		});
	}

	fn select(self, item: ItemRef) {
		let in_window = self.state.with_untracked(|s| s.window.contains(&item));
		if in_window {
			if !self.state.with_untracked(|s| s.is_focused(&item)) {
				self.engine().mutations.set_focus(Some(item));
			}
		} else if item.is_node {
			self.anchor(item.id);
		} else {
			self.notifications
				.notify(Notice::info(format!("{} is outside the current subgraph", item.id)));
		}
	}

	fn show_tab(self, tab: SidebarTab) {
		self.tab.set(tab);
		let listings = self.listings;
		match tab {
			SidebarTab::Subgraphs => {}
			SidebarTab::Errors => self.run("loading errors", move |e, graph| async move {
				listings.try_set(e.loader.errors(&graph).await?);
				Ok(())
			}),
			SidebarTab::Suggestions => self.run("loading suggestions", move |e, graph| async move {
				listings.try_set(e.loader.suggestions(&graph).await?);
				Ok(())
			}),
		}
	}

	fn on_canvas(self, intent: CanvasIntent) {
		match intent {
			CanvasIntent::Focus(item) => {
				self.engine().mutations.set_focus(item);
			}
			CanvasIntent::ToggleReview(item) => self.run("review", move |e, _| async move {
				e.mutations.toggle_review(&item, false, None).await
			}),
			CanvasIntent::ToggleActivation(item) => self.run("activation", move |e, _| async move {
				e.mutations.toggle_activation(&item).await.map(|_| ())
			}),
		}
	}

	fn on_panel(self, intent: PanelIntent) {
		match intent {
			PanelIntent::Update(item, patch) => self.run("saving changes", move |e, _| async move {
				if let UpdateOutcome::Conflict(conflict) = e.mutations.update_item(&item, patch).await? {
					e.merges.detect(conflict);
				}
				Ok(())
			}),
			PanelIntent::ToggleReview(item) => self.on_canvas(CanvasIntent::ToggleReview(item)),
			PanelIntent::ToggleActivation(item) => self.on_canvas(CanvasIntent::ToggleActivation(item)),
			PanelIntent::DeleteProperty(item, property) => {
				self.run("deleting property", move |e, _| async move {
					e.mutations.delete_property(&item, &property).await
				})
			}
			PanelIntent::Acknowledge {
				item,
				is_error,
				diagnostic_id,
			} => self.run("acknowledging", move |e, _| async move {
				e.mutations.acknowledge(&item, is_error, &diagnostic_id).await.map(|_| ())
			}),
			PanelIntent::Close => {
				self.engine().mutations.set_focus(None);
			}
		}
	}
}

/// Curation view of one graph, anchored on its default subgraph.
#[component]
fn GraphView(graph: GraphId) -> impl IntoView {
	let config = use_context::<ClientConfig>().unwrap_or_default();
	let notifications = use_context::<Notifications>().unwrap_or(Notifications(RwSignal::new(None)));
	let state = RwSignal::new(GraphState::default());
	let engine = Engine::new(Rc::new(HttpGraphApi::new(config.api_base_url.clone())), state);
	let session = Session {
		state,
		graph: StoredValue::new(graph.clone()),
		engine: StoredValue::new_local(engine),
		merge: RwSignal::new(None),
		listings: RwSignal::new(Vec::new()),
		tab: RwSignal::new(SidebarTab::default()),
		notifications,
	};

	let navigate = use_navigate();
	let default_limit = config.default_limit;
	let loader = session.engine().loader;
	spawn_local(async move {
		let loaded = async {
			loader.load_graph(&graph).await?;
			let Some(limit) = state.try_with_untracked(|s| s.settings.graph.limit) else {
				return Ok(Transition::Stale);
			};
			let limit = if limit == 0 { default_limit } else { limit };
			loader.load_subgraph(&graph, None, 0, limit).await
		}
		.await;
		if state.is_disposed() {
			return;
		}
		match loaded {
			Ok(_) => info!("graph {graph} opened"),
			Err(e) => {
				session.report("opening graph", &e);
				navigate("/", Default::default());
			}
		}
	});

	let on_canvas: Rc<dyn Fn(CanvasIntent)> = Rc::new(move |intent| session.on_canvas(intent));
	let on_panel = Callback::new(move |intent| session.on_panel(intent));
	let on_page = Callback::new(move |page: usize| {
		session.run("changing page", move |e, graph| async move {
			e.loader.change_page(&graph, page).await.map(|_| ())
		})
	});
	let on_limit = Callback::new(move |limit: usize| {
		session.run("changing page size", move |e, graph| async move {
			e.loader.change_limit(&graph, limit).await.map(|_| ())
		})
	});
	let on_review_all = Callback::new(move |()| {
		session.run("reviewing neighbourhood", |e, _| async move { e.mutations.review_central().await })
	});
	let on_settings = Callback::new(move |settings: Settings| {
		state.dispatch(Action::UpdateSettings(settings));
	});
	let on_anchor = Callback::new(move |node: ItemId| session.anchor(node));
	let on_select = Callback::new(move |item: ItemRef| session.select(item));
	let on_tab = Callback::new(move |tab: SidebarTab| session.show_tab(tab));

	let conflict = Signal::derive(move || {
		session.merge.get().map(|conflict| {
			let class_name = state.with(|s| {
				s.ontology
					.name_of(true, &conflict.class_id)
					.map_or_else(|| conflict.class_id.to_string(), str::to_owned)
			});
			(conflict, class_name)
		})
	});
	let on_confirm = Callback::new(move |()| {
		session.run("merging nodes", |e, graph| async move { e.merges.confirm(&graph).await.map(|_| ()) })
	});
	let on_cancel = Callback::new(move |()| {
		if let Err(e) = session.engine().merges.cancel() {
			session.report("cancelling merge", &e);
		}
		session.sync_merge();
	});

	view! {
		<div class="graph-page">
			<Toolbar state on_page on_limit on_review_all on_settings />
			<div class="graph-body">
				<Sidebar
					state
					tab=session.tab
					listings=session.listings
					on_anchor
					on_select
					on_tab
				/>
				<div class="graph-canvas-container">
					<ForceGraphCanvas
						state
						layout=config.layout.clone()
						arrow_rel_pos=config.arrow_rel_pos
						on_intent=on_canvas
					/>
					<Show when=move || !state.with(|s| s.window.loaded)>
						<div class="loading">"Loading..."</div>
					</Show>
				</div>
				<FocusPanel state on_intent=on_panel />
			</div>
			<MergeDialog conflict on_confirm on_cancel />
		</div>
	}
}

/// Route `/graph/:graph_id`; a new id starts a fresh session.
#[component]
pub fn GraphPage() -> impl IntoView {
	let params = use_params_map();
	let graph = Memo::new(move |_| params.with(|p| p.get("graph_id")).map(GraphId::from));

	move || graph.get().map(|graph| view! { <GraphView graph /> })
}
