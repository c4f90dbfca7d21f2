//! Client configuration: backend location, paging defaults and canvas layout.

use serde::{Deserialize, Serialize};

use crate::components::force_graph::LayoutConfig;
use crate::error::{CleanGraphError, Result};

/// Backend used when `CLEANGRAPH_API_URL` was not set at build time.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
	pub api_base_url: String,
	/// Triples per page when the graph settings do not say otherwise.
	pub default_limit: usize,
	/// Choices offered by the page-size selector.
	pub page_sizes: Vec<usize>,
	pub layout: LayoutConfig,
	/// Arrowhead position along a link, 0 at the source and 1 at the target.
	pub arrow_rel_pos: f64,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			api_base_url: option_env!("CLEANGRAPH_API_URL")
				.unwrap_or(DEFAULT_API_URL)
				.to_owned(),
			default_limit: 10,
			page_sizes: vec![5, 10, 25, 100],
			layout: LayoutConfig::default(),
			arrow_rel_pos: 1.0,
		}
	}
}

impl ClientConfig {
	/// Parses overrides on top of the defaults and validates the result.
	pub fn from_json(json: &str) -> Result<Self> {
		let config: Self =
			serde_json::from_str(json).map_err(|e| CleanGraphError::Config(e.to_string()))?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<()> {
		if self.api_base_url.trim().is_empty() {
			return Err(CleanGraphError::Config("api_base_url is empty".into()));
		}
		if self.default_limit == 0 {
			return Err(CleanGraphError::Config("default_limit must be positive".into()));
		}
		if self.page_sizes.contains(&0) {
			return Err(CleanGraphError::Config("page sizes must be positive".into()));
		}
		if !(0.0..=1.0).contains(&self.arrow_rel_pos) {
			return Err(CleanGraphError::Config(format!(
				"arrow_rel_pos {} is outside [0, 1]",
				self.arrow_rel_pos
			)));
		}
		Ok(())
	}

	/// Page sizes for the selector, always including `current`.
	pub fn page_sizes_with(&self, current: usize) -> Vec<usize> {
		let mut sizes = self.page_sizes.clone();
		if current > 0 && !sizes.contains(&current) {
			sizes.push(current);
		}
		sizes.sort_unstable();
		sizes.dedup();
		sizes
	}
}
