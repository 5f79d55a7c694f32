//! envgraph - development environment graph compiler
//!
//! Turns a declarative environment description (base image, GPU
//! toolkit, apt and pip packages, mirrors, VS Code extensions) into a
//! layered, content-addressed build definition.

pub mod cache;
pub mod cli;
pub mod compile;
pub mod config;
pub mod environment;
pub mod error;
pub mod layer;
pub mod llb;
pub mod shell;
pub mod vscode;

pub use compile::compile;
pub use environment::Environment;
pub use error::{EnvError, EnvResult};
