//! Recording backend for graph assembly tests

use crate::llb::backend::{Backend, Exec, FileAction};
use std::cell::RefCell;

/// Structural build state; equal graphs compare equal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeState {
    Image(String),
    Scratch,
    Local(String),
    Run {
        base: Box<FakeState>,
        exec: Exec,
    },
    File {
        base: Box<FakeState>,
        action: Box<FileAction<FakeState>>,
    },
    Diff {
        lower: Box<FakeState>,
        upper: Box<FakeState>,
    },
    Merge(Vec<FakeState>),
}

impl FakeState {
    /// Inputs of a merge, or the state itself
    pub fn layers(&self) -> Vec<&FakeState> {
        match self {
            Self::Merge(inputs) => inputs.iter().collect(),
            other => vec![other],
        }
    }

    /// Every run step reachable from this state
    pub fn runs(&self) -> Vec<&Exec> {
        let mut out = Vec::new();
        self.collect_runs(&mut out);
        out
    }

    fn collect_runs<'a>(&'a self, out: &mut Vec<&'a Exec>) {
        match self {
            Self::Image(_) | Self::Scratch | Self::Local(_) => {}
            Self::Run { base, exec } => {
                base.collect_runs(out);
                out.push(exec);
            }
            Self::File { base, action } => {
                base.collect_runs(out);
                if let FileAction::Copy { src, .. } = action.as_ref() {
                    src.collect_runs(out);
                }
            }
            Self::Diff { lower, upper } => {
                lower.collect_runs(out);
                upper.collect_runs(out);
            }
            Self::Merge(inputs) => inputs.iter().for_each(|i| i.collect_runs(out)),
        }
    }

    /// Runs that happen above `lower` in a diff, i.e. the diff's own effect
    pub fn diff_runs(&self) -> Vec<&Exec> {
        match self {
            Self::Diff { lower, upper } => {
                let below = lower.runs();
                upper
                    .runs()
                    .into_iter()
                    .filter(|e| !below.contains(e))
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Backend that builds `FakeState` trees and logs each primitive call
#[derive(Debug, Default)]
pub struct RecordingBackend {
    log: RefCell<Vec<String>>,
}

impl RecordingBackend {
    pub fn calls(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    fn record(&self, entry: String) {
        self.log.borrow_mut().push(entry);
    }
}

impl Backend for RecordingBackend {
    type State = FakeState;

    fn image(&self, reference: &str) -> FakeState {
        self.record(format!("image {}", reference));
        FakeState::Image(reference.to_string())
    }

    fn scratch(&self) -> FakeState {
        self.record("scratch".to_string());
        FakeState::Scratch
    }

    fn local(&self, name: &str) -> FakeState {
        self.record(format!("local {}", name));
        FakeState::Local(name.to_string())
    }

    fn run(&self, base: &FakeState, exec: Exec) -> FakeState {
        self.record(format!("run {}", exec.args.join(" ")));
        FakeState::Run {
            base: Box::new(base.clone()),
            exec,
        }
    }

    fn file(&self, base: &FakeState, action: FileAction<FakeState>) -> FakeState {
        self.record("file".to_string());
        FakeState::File {
            base: Box::new(base.clone()),
            action: Box::new(action),
        }
    }

    fn diff(&self, lower: &FakeState, upper: &FakeState) -> FakeState {
        self.record("diff".to_string());
        FakeState::Diff {
            lower: Box::new(lower.clone()),
            upper: Box::new(upper.clone()),
        }
    }

    fn merge(&self, inputs: Vec<FakeState>) -> FakeState {
        self.record(format!("merge {}", inputs.len()));
        FakeState::Merge(inputs)
    }
}
