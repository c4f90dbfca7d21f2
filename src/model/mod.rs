//! Data types shared by the window, store, engine and renderer.

mod graph;
mod ids;
mod item;
mod ontology;
mod settings;
mod timestamp;

pub use graph::{GraphDetails, GraphListing, SubgraphSummary};
pub use ids::{GraphId, ItemId};
pub use item::{Diagnostic, ItemRef, ItemState, Link, Node, Property};
pub use ontology::{Ontology, OntologyClass};
pub use settings::{ColorSettings, DisplaySettings, DisplayToggle, NodeSize, Settings};
