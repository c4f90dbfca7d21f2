use serde::{Deserialize, Serialize};

/// Node radius class chosen in the graph settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeSize {
	Small,
	#[default]
	Medium,
	Large,
}

impl NodeSize {
	pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

	/// Wire name, also used as the select option value.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Small => "small",
			Self::Medium => "medium",
			Self::Large => "large",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|size| size.as_str() == value)
	}

	/// Radius of a node with `value == 1`; larger values scale by the cube root.
	pub fn base_radius(self) -> f64 {
		match self {
			Self::Small => 30.0,
			Self::Medium => 40.0,
			Self::Large => 50.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
	pub display_edge_labels: bool,
	pub node_size: NodeSize,
	/// Triples per window page.
	pub limit: usize,
}

impl Default for DisplaySettings {
	fn default() -> Self {
		Self {
			display_edge_labels: true,
			node_size: NodeSize::Medium,
			limit: 10,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
	pub deactivated: String,
	pub reviewed: String,
	pub error: String,
	pub suggestion: String,
}

impl Default for ColorSettings {
	fn default() -> Self {
		Self {
			deactivated: "#f44336".into(),
			reviewed: "#009688".into(),
			error: "#ff9800".into(),
			suggestion: "#9c27b0".into(),
		}
	}
}

/// Per-graph display settings stored by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub display_errors: bool,
	pub display_suggestions: bool,
	pub graph: DisplaySettings,
	pub colors: ColorSettings,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			display_errors: true,
			display_suggestions: true,
			graph: DisplaySettings::default(),
			colors: ColorSettings::default(),
		}
	}
}

/// On/off display switch offered next to the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayToggle {
	Errors,
	Suggestions,
	EdgeLabels,
}

impl Settings {
	pub fn is_on(&self, toggle: DisplayToggle) -> bool {
		match toggle {
			DisplayToggle::Errors => self.display_errors,
			DisplayToggle::Suggestions => self.display_suggestions,
			DisplayToggle::EdgeLabels => self.graph.display_edge_labels,
		}
	}

	/// Copy with `toggle` flipped.
	pub fn toggled(&self, toggle: DisplayToggle) -> Self {
		let mut next = self.clone();
		let flag = match toggle {
			DisplayToggle::Errors => &mut next.display_errors,
			DisplayToggle::Suggestions => &mut next.display_suggestions,
			DisplayToggle::EdgeLabels => &mut next.graph.display_edge_labels,
		};
		*flag = !*flag;
		next
	}

	pub fn with_node_size(&self, node_size: NodeSize) -> Self {
		let mut next = self.clone();
		next.graph.node_size = node_size;
		next
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[test]
	fn partial_settings_fill_defaults() {
		let settings: Settings = serde_json::from_value(serde_json::json!({
			"display_errors": false,
			"graph": {"node_size": "large"}
		}))
		.unwrap();
		assert!(!settings.display_errors);
		assert!(settings.display_suggestions);
		assert_eq!(settings.graph.node_size, NodeSize::Large);
		assert_eq!(settings.graph.limit, 10);
		assert_eq!(settings.colors.error, "#ff9800");
	}

	#[rstest]
	#[case(DisplayToggle::Errors)]
	#[case(DisplayToggle::Suggestions)]
	#[case(DisplayToggle::EdgeLabels)]
	fn toggles_flip_one_flag(#[case] toggle: DisplayToggle) {
		let settings = Settings::default();
		let off = settings.toggled(toggle);
		assert!(settings.is_on(toggle));
		assert!(!off.is_on(toggle));
		assert_eq!(off.toggled(toggle), settings);

		let others = [DisplayToggle::Errors, DisplayToggle::Suggestions, DisplayToggle::EdgeLabels];
		for other in others.into_iter().filter(|t| *t != toggle) {
			assert!(off.is_on(other));
		}
	}

	#[test]
	fn node_size_select_values_round_trip() {
		for size in NodeSize::ALL {
			assert_eq!(NodeSize::parse(size.as_str()), Some(size));
		}
		assert_eq!(NodeSize::parse("huge"), None);

		let large = Settings::default().with_node_size(NodeSize::Large);
		assert_eq!(large.graph.node_size, NodeSize::Large);
		assert_eq!(large.graph.limit, 10);
	}
}
