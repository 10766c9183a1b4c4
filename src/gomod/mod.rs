pub mod graph;
pub mod modfile;
pub mod tool;
pub mod version;

pub use graph::{parse_graph_output, DepGraph};
pub use modfile::ModFile;
pub use tool::{ChainOracle, GoTool, GraphOracle, ManifestMutator};
pub use version::{is_major_bump, normalize_version};
