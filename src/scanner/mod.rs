pub mod discover;
pub mod filter;
pub mod trivy;

pub use discover::discover_manifests;
pub use filter::{filter_by_cvss, group_by_package, split_by_directness};
pub use trivy::{TrivyScanner, VulnScanner};
