//! Low-level build graph
//!
//! States compose through run steps, file operations, `diff` and
//! `merge`. The graph is marshalled into a content-addressed
//! `Definition` that a build engine can execute.

mod backend;
mod definition;
#[cfg(test)]
pub(crate) mod fake;
mod state;

pub use backend::{Backend, Exec, FileAction};
pub use definition::{Definition, FileOp, Op, OpRecord, Platform};
pub use state::{LlbBackend, State};
