//! JSONL operation trail.
//!
//! Per-scope JSONL files (one per judgment session, plus `registry`) record
//! every committed mutation. The trail is an export; the database stays the
//! source of truth.

pub mod writer;
