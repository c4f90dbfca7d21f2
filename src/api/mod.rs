//! Backend REST surface consumed by the client.

mod http;
mod types;

use async_trait::async_trait;

pub use http::HttpGraphApi;
pub use types::{
	AcknowledgeRequest, AcknowledgeResponse, ActivationResponse, ClassRequest, ClassResponse,
	DeletePropertyResponse, DiagnosticListing, ItemPatch, MergeResponse, ReviewRequest,
	ReviewResponse, UpdateResponse,
};

use crate::error::Result;
use crate::model::{GraphDetails, GraphId, GraphListing, ItemId, ItemRef};
use crate::window::SubgraphPayload;

/// One method per backend endpoint the curation view talks to.
///
/// Futures are `?Send`: the client runs on the browser's single-threaded event loop.
#[async_trait(?Send)]
pub trait GraphApi {
	/// `GET /graph/?skip&limit`
	async fn graphs(&self, skip: usize, limit: usize) -> Result<Vec<GraphListing>>;

	/// `GET /graph/{graph}`
	async fn graph(&self, graph: &GraphId) -> Result<GraphDetails>;

	/// `GET /graph/sample/{graph}` without a central node, `GET /graph/{graph}/{node}` with one.
	async fn window(
		&self,
		graph: &GraphId,
		central: Option<&ItemId>,
		skip: usize,
		limit: usize,
	) -> Result<SubgraphPayload>;

	/// `PATCH /graph/{item}?item_type=node|edge`
	async fn update_item(&self, item: &ItemRef, patch: &ItemPatch) -> Result<UpdateResponse>;

	/// `PATCH /graph/merge/{node}?new_source_name&new_source_type`
	async fn merge_node(&self, node: &ItemId, name: &str, class_id: &ItemId)
	-> Result<MergeResponse>;

	/// `PATCH /graph/review/{item}?is_node`
	async fn review(&self, item: &ItemRef, request: &ReviewRequest) -> Result<ReviewResponse>;

	/// `PATCH /graph/activation/{item}?is_node`
	async fn toggle_activation(&self, item: &ItemRef) -> Result<ActivationResponse>;

	/// `DELETE /graph/property?item_id&is_node&property_id`
	async fn delete_property(
		&self,
		item: &ItemRef,
		property: &ItemId,
	) -> Result<DeletePropertyResponse>;

	/// `PATCH /graph/acknowledge`
	async fn acknowledge(&self, request: &AcknowledgeRequest) -> Result<AcknowledgeResponse>;

	/// `POST /graph/item-classes/{graph}`
	async fn add_class(&self, graph: &GraphId, request: &ClassRequest) -> Result<ClassResponse>;

	/// `PATCH /graph/item-classes/{graph}`
	async fn update_class(&self, graph: &GraphId, request: &ClassRequest)
	-> Result<ClassResponse>;

	/// `GET /errors/{graph}`
	async fn errors(&self, graph: &GraphId) -> Result<Vec<DiagnosticListing>>;

	/// `GET /suggestions/{graph}`
	async fn suggestions(&self, graph: &GraphId) -> Result<Vec<DiagnosticListing>>;
}
