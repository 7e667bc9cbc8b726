//! Entity structs for all Tribunal domain objects.
//!
//! Each entity maps to a table in the libSQL database (see
//! `trb-db/migrations/001_initial.sql`). All structs derive `Serialize`,
//! `Deserialize`, and `JsonSchema` for JSON roundtrip and schema validation.

mod appeal;
mod appearance;
mod audit;
mod decision;
mod distribution;
mod judgment;
mod judgment_session;
mod member;
mod vote;
mod voting;

pub use appeal::Appeal;
pub use appearance::SessionAppearance;
pub use audit::AuditEntry;
pub use decision::Decision;
pub use distribution::Distribution;
pub use judgment::Judgment;
pub use judgment_session::JudgmentSession;
pub use member::Member;
pub use vote::Vote;
pub use voting::Voting;
