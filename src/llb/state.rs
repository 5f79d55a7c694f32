//! In-memory LLB graph
//!
//! `State` is an immutable handle to a graph vertex. Cloning is cheap
//! and shares the underlying node, so common ancestors (the apt stage,
//! for instance) are marshalled once no matter how many layers build on
//! them.

use crate::error::EnvResult;
use crate::llb::backend::{Backend, Exec, FileAction};
use crate::llb::definition::{Definition, FileOp, Op, OpRecord, Platform};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug)]
struct Node {
    op: Op,
    inputs: Vec<State>,
}

/// A vertex in the build graph
#[derive(Debug, Clone)]
pub struct State(Arc<Node>);

/// Expand short image names the way registries do
fn normalize_image(reference: &str) -> String {
    let first = reference.split('/').next().unwrap_or_default();
    let has_registry = reference.contains('/')
        && (first.contains('.') || first.contains(':') || first == "localhost");

    if has_registry {
        reference.to_string()
    } else if reference.contains('/') {
        format!("docker.io/{}", reference)
    } else {
        format!("docker.io/library/{}", reference)
    }
}

impl State {
    fn node(op: Op, inputs: Vec<State>) -> Self {
        Self(Arc::new(Node { op, inputs }))
    }

    pub fn image(reference: &str) -> Self {
        Self::node(
            Op::Source {
                identifier: format!("docker-image://{}", normalize_image(reference)),
            },
            Vec::new(),
        )
    }

    pub fn scratch() -> Self {
        Self::node(Op::Scratch, Vec::new())
    }

    pub fn local(name: &str) -> Self {
        Self::node(
            Op::Source {
                identifier: format!("local://{}", name),
            },
            Vec::new(),
        )
    }

    pub fn run(&self, exec: Exec) -> Self {
        Self::node(
            Op::Exec {
                args: exec.args,
                cwd: exec.cwd,
                mounts: exec.mounts,
            },
            vec![self.clone()],
        )
    }

    pub fn file(&self, action: FileAction<State>) -> Self {
        let (op, src) = match action {
            FileAction::Mkdir {
                path,
                mode,
                parents,
            } => (
                FileOp::Mkdir {
                    path,
                    mode,
                    parents,
                },
                None,
            ),
            FileAction::Mkfile { path, mode, data } => {
                (FileOp::Mkfile { path, mode, data }, None)
            }
            FileAction::Copy {
                src,
                src_path,
                dest_path,
                create_dest_path,
            } => (
                FileOp::Copy {
                    src_path,
                    dest_path,
                    create_dest_path,
                },
                Some(src),
            ),
        };

        let mut inputs = vec![self.clone()];
        inputs.extend(src);
        Self::node(Op::File { action: op }, inputs)
    }

    pub fn diff(lower: &State, upper: &State) -> Self {
        Self::node(Op::Diff, vec![lower.clone(), upper.clone()])
    }

    pub fn merge(inputs: Vec<State>) -> Self {
        Self::node(Op::Merge, inputs)
    }

    pub fn op(&self) -> &Op {
        &self.0.op
    }

    pub fn inputs(&self) -> &[State] {
        &self.0.inputs
    }

    /// Serialize the graph rooted at this state
    pub fn marshal(&self, platform: Platform) -> EnvResult<Definition> {
        let mut marshaler = Marshaler::default();
        let root = marshaler.visit(self)?;
        Ok(Definition {
            platform,
            ops: marshaler.ops,
            root,
        })
    }
}

#[derive(Default)]
struct Marshaler {
    digests: HashMap<*const Node, String>,
    emitted: HashSet<String>,
    ops: Vec<OpRecord>,
}

impl Marshaler {
    fn visit(&mut self, state: &State) -> EnvResult<String> {
        let key = Arc::as_ptr(&state.0);
        if let Some(digest) = self.digests.get(&key) {
            return Ok(digest.clone());
        }

        let inputs = state
            .inputs()
            .iter()
            .map(|input| self.visit(input))
            .collect::<EnvResult<Vec<_>>>()?;
        let digest = state.op().digest(&inputs)?;

        // Structurally equal nodes built separately collapse to one op
        if self.emitted.insert(digest.clone()) {
            self.ops.push(OpRecord {
                digest: digest.clone(),
                inputs,
                op: state.op().clone(),
            });
        }
        self.digests.insert(key, digest.clone());
        Ok(digest)
    }
}

/// Backend producing real LLB states
#[derive(Debug, Clone, Copy, Default)]
pub struct LlbBackend;

impl Backend for LlbBackend {
    type State = State;

    fn image(&self, reference: &str) -> State {
        State::image(reference)
    }

    fn scratch(&self) -> State {
        State::scratch()
    }

    fn local(&self, name: &str) -> State {
        State::local(name)
    }

    fn run(&self, base: &State, exec: Exec) -> State {
        base.run(exec)
    }

    fn file(&self, base: &State, action: FileAction<State>) -> State {
        base.file(action)
    }

    fn diff(&self, lower: &State, upper: &State) -> State {
        State::diff(lower, upper)
    }

    fn merge(&self, inputs: Vec<State>) -> State {
        State::merge(inputs)
    }
}
