//! ID prefix constants.
//!
//! Every entity ID is `{prefix}-{8 hex chars}`, generated by the database
//! (`randomblob(4)`). The prefix makes IDs self-describing in logs and trails.

pub const PREFIX_MEMBER: &str = "mem";
pub const PREFIX_APPEAL: &str = "apl";
pub const PREFIX_JUDGMENT_SESSION: &str = "jss";
pub const PREFIX_DISTRIBUTION: &str = "dst";
pub const PREFIX_APPEARANCE: &str = "apr";
pub const PREFIX_VOTE: &str = "vot";
pub const PREFIX_VOTING: &str = "vtg";
pub const PREFIX_DECISION: &str = "dec";
pub const PREFIX_JUDGMENT: &str = "jdg";
pub const PREFIX_AUDIT: &str = "aud";

/// All known prefixes.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_MEMBER,
    PREFIX_APPEAL,
    PREFIX_JUDGMENT_SESSION,
    PREFIX_DISTRIBUTION,
    PREFIX_APPEARANCE,
    PREFIX_VOTE,
    PREFIX_VOTING,
    PREFIX_DECISION,
    PREFIX_JUDGMENT,
    PREFIX_AUDIT,
];

/// Format an ID from a prefix and a random hex suffix.
#[must_use]
pub fn format_id(prefix: &str, suffix: &str) -> String {
    format!("{prefix}-{suffix}")
}

/// Extract the prefix of an ID, if it has one.
#[must_use]
pub fn prefix_of(id: &str) -> Option<&str> {
    id.split_once('-').map(|(prefix, _)| prefix)
}
