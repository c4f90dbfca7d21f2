//! The client-held slice of the graph and its adjacency table.

mod neighbours;
mod subgraph;

pub use neighbours::{NeighborIndex, Neighbours};
pub use subgraph::{PendingFetch, SubgraphPayload, SubgraphWindow};
