use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::DecisionType;

/// Catalog entry referenced by votes and votings. Immutable reference data.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Decision {
    pub id: String,
    pub decision_type: DecisionType,
    pub identifier: String,
    pub accept_text: Option<String>,
    pub reject_text: Option<String>,
    pub body_text: Option<String>,
}
