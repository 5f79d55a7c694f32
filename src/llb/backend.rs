//! Build graph capability
//!
//! The layer builders only need a handful of primitives from the build
//! engine: image and local sources, an empty filesystem, run steps,
//! file operations, and the `diff`/`merge` pair for isolating and
//! recombining layers. `Backend` captures exactly that so the graph
//! assembler can be driven against the real LLB graph or a recording
//! fake.

use crate::cache::CacheScope;
use serde::{Deserialize, Serialize};

/// A command run against a base state
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exec {
    /// argv, already split
    pub args: Vec<String>,
    pub cwd: String,
    /// Persistent cache scopes mounted for the duration of the run
    pub mounts: Vec<CacheScope>,
}

impl Exec {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            cwd: "/".to_string(),
            mounts: Vec::new(),
        }
    }

    /// Wrap a shell snippet as `sh -c <script>`
    pub fn shell(script: impl Into<String>) -> Self {
        Self::new(["sh".to_string(), "-c".to_string(), script.into()])
    }

    pub fn with_cache(mut self, scopes: impl IntoIterator<Item = CacheScope>) -> Self {
        self.mounts.extend(scopes);
        self
    }
}

/// A filesystem operation applied on top of a base state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileAction<S> {
    Mkdir {
        path: String,
        mode: u32,
        parents: bool,
    },
    Mkfile {
        path: String,
        mode: u32,
        data: String,
    },
    Copy {
        /// State the files are copied out of
        src: S,
        src_path: String,
        dest_path: String,
        create_dest_path: bool,
    },
}

impl<S> FileAction<S> {
    /// `mkdir -p` with the given mode
    pub fn mkdir(path: impl Into<String>, mode: u32) -> Self {
        Self::Mkdir {
            path: path.into(),
            mode,
            parents: true,
        }
    }

    pub fn mkfile(path: impl Into<String>, mode: u32, data: impl Into<String>) -> Self {
        Self::Mkfile {
            path: path.into(),
            mode,
            data: data.into(),
        }
    }

    /// Copy `src_path` out of `src`, creating parent directories of the destination
    pub fn copy(src: S, src_path: impl Into<String>, dest_path: impl Into<String>) -> Self {
        Self::Copy {
            src,
            src_path: src_path.into(),
            dest_path: dest_path.into(),
            create_dest_path: true,
        }
    }
}

/// Graph construction primitives
pub trait Backend {
    /// Handle to a node in the build graph
    type State: Clone;

    /// A registry image
    fn image(&self, reference: &str) -> Self::State;

    /// The empty filesystem
    fn scratch(&self) -> Self::State;

    /// A named local directory supplied at build time
    fn local(&self, name: &str) -> Self::State;

    /// Execute a command on top of `base`
    fn run(&self, base: &Self::State, exec: Exec) -> Self::State;

    fn file(&self, base: &Self::State, action: FileAction<Self::State>) -> Self::State;

    /// Only the filesystem changes that turn `lower` into `upper`
    fn diff(&self, lower: &Self::State, upper: &Self::State) -> Self::State;

    /// Union of `inputs`, applied in order
    fn merge(&self, inputs: Vec<Self::State>) -> Self::State;
}
