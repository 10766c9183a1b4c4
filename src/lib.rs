pub mod cli;
pub mod config;
pub mod errors;
pub mod gomod;
pub mod llm;
pub mod models;
pub mod resolver;
pub mod scanner;
pub mod vex;
