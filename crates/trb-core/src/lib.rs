//! # trb-core
//!
//! Core types, ID prefixes, and error types for Tribunal.
//!
//! This crate provides the foundational types shared across all Tribunal crates:
//! - Entity structs for the appeals domain (appeals, distributions, votes, votings)
//! - Status enums with state machine transitions
//! - Distribution carry-forward (rapporteur stability, reviewer accrual)
//! - Voting grouping keys and display labels
//! - Tally validation and the casting-vote rule
//! - ID prefix constants and formatting helpers
//! - Trail operation envelope for JSONL persistence
//! - Response types for the `trb` request surface

pub mod audit_detail;
pub mod carry;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod grouping;
pub mod ids;
pub mod responses;
pub mod tally;
pub mod trail;
