//! JSONL trail operation envelope.
//!
//! Every engine mutation is recorded as a `TrailOperation` in
//! `{trail_dir}/{scope}.jsonl`, where `scope` is the judgment session the
//! mutation belongs to (or `registry` for records outside any session).
//!
//! The `v` field supports schema versioning: envelopes without a `v` field
//! deserialize with `v == 1` via `#[serde(default)]`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{EntityType, TrailOp};

/// Scope used for mutations that belong to no judgment session.
pub const REGISTRY_SCOPE: &str = "registry";

const fn default_trail_version() -> u32 {
    1
}

/// A single operation recorded in the JSONL trail.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TrailOperation {
    /// Schema version. Defaults to 1 when absent.
    #[serde(default = "default_trail_version")]
    pub v: u32,

    /// RFC 3339 timestamp of the operation.
    pub ts: String,

    /// Judgment session ID, or [`REGISTRY_SCOPE`].
    pub scope: String,

    pub op: TrailOp,

    pub entity: EntityType,

    /// ID of the affected entity.
    pub id: String,

    /// Operation payload. Full entity for `create`, changed state otherwise.
    pub data: serde_json::Value,
}
