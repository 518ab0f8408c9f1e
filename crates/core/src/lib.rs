pub mod cycle;
pub mod graph;
pub mod solver;
pub mod text;
pub mod traits;

pub use cycle::CycleFinder;
pub use graph::Graph;
pub use solver::{SPFASolver, ShortestPathEngine};
pub use traits::GraphSolver;
