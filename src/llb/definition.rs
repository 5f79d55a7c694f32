//! Serialized build definitions
//!
//! A `Definition` is the portable form of a build graph: every op once,
//! dependencies before dependents, each addressed by the SHA256 of its
//! own JSON encoding plus the digests of its inputs. Two graphs with the
//! same structure always produce byte-identical definitions.

use crate::cache::CacheScope;
use crate::error::{EnvError, EnvResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Target platform for the definition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[default]
    #[serde(rename = "linux/amd64")]
    LinuxAmd64,
    #[serde(rename = "linux/arm64")]
    LinuxArm64,
}

impl Platform {
    pub fn os(&self) -> &'static str {
        "linux"
    }

    pub fn architecture(&self) -> &'static str {
        match self {
            Self::LinuxAmd64 => "amd64",
            Self::LinuxArm64 => "arm64",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os(), self.architecture())
    }
}

impl FromStr for Platform {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linux/amd64" | "linux/x86_64" => Ok(Self::LinuxAmd64),
            "linux/arm64" | "linux/aarch64" => Ok(Self::LinuxArm64),
            other => Err(EnvError::UnsupportedPlatform(other.to_string())),
        }
    }
}

/// File operation payload. `Copy` reads from the op's second input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileOp {
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
        src_path: String,
        dest_path: String,
        create_dest_path: bool,
    },
}

/// A single vertex of the build graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Op {
    /// `docker-image://...` or `local://...`
    Source { identifier: String },
    Scratch,
    Exec {
        args: Vec<String>,
        cwd: String,
        mounts: Vec<CacheScope>,
    },
    File { action: FileOp },
    /// inputs: `[lower, upper]`
    Diff,
    Merge,
}

impl Op {
    /// Content digest of this op given its input digests
    pub(crate) fn digest(&self, inputs: &[String]) -> EnvResult<String> {
        let encoded = serde_json::to_vec(&(self, inputs))?;
        let mut hasher = Sha256::new();
        hasher.update(&encoded);
        Ok(format!("sha256:{}", hex::encode(hasher.finalize())))
    }
}

/// An op with its identity and edges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpRecord {
    pub digest: String,
    pub inputs: Vec<String>,
    pub op: Op,
}

/// Engine-consumable build definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub platform: Platform,
    /// Topologically ordered, inputs first
    pub ops: Vec<OpRecord>,
    /// Digest of the final state
    pub root: String,
}

impl Definition {
    /// Look up an op by digest
    pub fn get(&self, digest: &str) -> Option<&OpRecord> {
        self.ops.iter().find(|r| r.digest == digest)
    }

    pub fn root_op(&self) -> Option<&OpRecord> {
        self.get(&self.root)
    }

    pub fn to_json(&self) -> EnvResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(content: &str) -> EnvResult<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
