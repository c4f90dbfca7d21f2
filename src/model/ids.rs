use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(String);

		impl $name {
			/// Wraps a backend identifier.
			pub fn new(value: impl Into<String>) -> Self {
				Self(value.into())
			}

			/// The raw identifier as sent on the wire.
			pub fn as_str(&self) -> &str {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}

		impl From<&str> for $name {
			fn from(value: &str) -> Self {
				Self(value.to_owned())
			}
		}

		impl From<String> for $name {
			fn from(value: String) -> Self {
				Self(value)
			}
		}
	};
}

string_id!(
	/// Identifier of a node, link, property, diagnostic or ontology class.
	///
	/// Backend ids are unique across collections, so a single id type is used for
	/// all items of one graph.
	ItemId
);

string_id!(
	/// Identifier of a whole graph project.
	GraphId
);

#[cfg(test)]
mod tests {
	use super::ItemId;

	#[test]
	fn ids_serialize_as_plain_strings() {
		let id = ItemId::from("64f0c0ffee");
		assert_eq!(serde_json::to_string(&id).unwrap(), "\"64f0c0ffee\"");
		let back: ItemId = serde_json::from_str("\"64f0c0ffee\"").unwrap();
		assert_eq!(back, id);
	}
}
