pub mod generator;

pub use generator::{OpenVexDocument, Statement, VexGenerator};
