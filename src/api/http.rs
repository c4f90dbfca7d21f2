use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use super::types::*;
use super::GraphApi;
use crate::error::{CleanGraphError, Result};
use crate::model::{GraphDetails, GraphId, GraphListing, ItemId, ItemRef};
use crate::window::SubgraphPayload;

/// [`GraphApi`] over HTTP, using the browser's fetch when compiled to wasm.
#[derive(Clone, Debug)]
pub struct HttpGraphApi {
	base_url: String,
	client: Client,
}

impl HttpGraphApi {
	pub fn new(base_url: impl Into<String>) -> Self {
		let base_url = base_url.into().trim_end_matches('/').to_owned();
		Self {
			base_url,
			client: Client::new(),
		}
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	async fn send<T: DeserializeOwned>(&self, endpoint: &str, request: RequestBuilder) -> Result<T> {
		debug!("-> {endpoint}");
		let response = request.send().await.map_err(|e| {
			error!("{endpoint}: {e}");
			CleanGraphError::Network {
				endpoint: endpoint.to_owned(),
				message: e.to_string(),
			}
		})?;

		let status = response.status();
		if !status.is_success() {
			error!("{endpoint}: HTTP {status}");
			return Err(CleanGraphError::Status {
				endpoint: endpoint.to_owned(),
				status: status.as_u16(),
			});
		}

		response.json::<T>().await.map_err(|e| CleanGraphError::Decode {
			endpoint: endpoint.to_owned(),
			message: e.to_string(),
		})
	}
}

#[async_trait(?Send)]
impl GraphApi for HttpGraphApi {
	async fn graphs(&self, skip: usize, limit: usize) -> Result<Vec<GraphListing>> {
		let request = self
			.client
			.get(self.url("/graph/"))
			.query(&[("skip", skip), ("limit", limit)]);
		self.send("/graph/", request).await
	}

	async fn graph(&self, graph: &GraphId) -> Result<GraphDetails> {
		let path = format!("/graph/{graph}");
		self.send(&path, self.client.get(self.url(&path))).await
	}

	async fn window(
		&self,
		graph: &GraphId,
		central: Option<&ItemId>,
		skip: usize,
		limit: usize,
	) -> Result<SubgraphPayload> {
		let path = match central {
			Some(node) => format!("/graph/{graph}/{node}"),
			None => format!("/graph/sample/{graph}"),
		};
		let request = self
			.client
			.get(self.url(&path))
			.query(&[("skip", skip), ("limit", limit)]);
		self.send(&path, request).await
	}

	async fn update_item(&self, item: &ItemRef, patch: &ItemPatch) -> Result<UpdateResponse> {
		let path = format!("/graph/{}", item.id);
		let request = self
			.client
			.patch(self.url(&path))
			.query(&[("item_type", item.item_type())])
			.json(patch);
		self.send(&path, request).await
	}

	async fn merge_node(
		&self,
		node: &ItemId,
		name: &str,
		class_id: &ItemId,
	) -> Result<MergeResponse> {
		let path = format!("/graph/merge/{node}");
		let request = self
			.client
			.patch(self.url(&path))
			.query(&[("new_source_name", name), ("new_source_type", class_id.as_str())]);
		self.send(&path, request).await
	}

	async fn review(&self, item: &ItemRef, request: &ReviewRequest) -> Result<ReviewResponse> {
		let path = format!("/graph/review/{}", item.id);
		let builder = self
			.client
			.patch(self.url(&path))
			.query(&[("is_node", item.is_node)])
			.json(request);
		self.send(&path, builder).await
	}

	async fn toggle_activation(&self, item: &ItemRef) -> Result<ActivationResponse> {
		let path = format!("/graph/activation/{}", item.id);
		let request = self
			.client
			.patch(self.url(&path))
			.query(&[("is_node", item.is_node)]);
		self.send(&path, request).await
	}

	async fn delete_property(
		&self,
		item: &ItemRef,
		property: &ItemId,
	) -> Result<DeletePropertyResponse> {
		let path = "/graph/property";
		let is_node = if item.is_node { "true" } else { "false" };
		let request = self.client.delete(self.url(path)).query(&[
			("item_id", item.id.as_str()),
			("is_node", is_node),
			("property_id", property.as_str()),
		]);
		self.send(path, request).await
	}

	async fn acknowledge(&self, request: &AcknowledgeRequest) -> Result<AcknowledgeResponse> {
		let path = "/graph/acknowledge";
		let builder = self.client.patch(self.url(path)).json(request);
		self.send(path, builder).await
	}

	async fn add_class(&self, graph: &GraphId, request: &ClassRequest) -> Result<ClassResponse> {
		let path = format!("/graph/item-classes/{graph}");
		let builder = self.client.post(self.url(&path)).json(request);
		self.send(&path, builder).await
	}

	async fn update_class(
		&self,
		graph: &GraphId,
		request: &ClassRequest,
	) -> Result<ClassResponse> {
		let path = format!("/graph/item-classes/{graph}");
		let builder = self.client.patch(self.url(&path)).json(request);
		self.send(&path, builder).await
	}

	async fn errors(&self, graph: &GraphId) -> Result<Vec<DiagnosticListing>> {
		let path = format!("/errors/{graph}");
		self.send(&path, self.client.get(self.url(&path))).await
	}

	async fn suggestions(&self, graph: &GraphId) -> Result<Vec<DiagnosticListing>> {
		let path = format!("/suggestions/{graph}");
		self.send(&path, self.client.get(self.url(&path))).await
	}
}
