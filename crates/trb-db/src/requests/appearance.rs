//! Appearance status change request.

use serde::{Deserialize, Serialize};

use trb_core::enums::AppearanceStatus;

use crate::error::EngineError;

/// Target status of an appearance, with the fields that status carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: AppearanceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_requested_member_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diligence_days_deadline: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes_text: Option<String>,
}

impl StatusChange {
    #[must_use]
    pub const fn to(status: AppearanceStatus) -> Self {
        Self {
            status,
            view_requested_member_id: None,
            diligence_days_deadline: None,
            minutes_text: None,
        }
    }

    /// A member asked to review the case (pedido de vista).
    #[must_use]
    pub fn recused_for_review(member_id: impl Into<String>) -> Self {
        Self {
            view_requested_member_id: Some(member_id.into()),
            ..Self::to(AppearanceStatus::RecusedForReview)
        }
    }

    /// The case goes back for inquiry with a deadline in days.
    #[must_use]
    pub fn under_inquiry(deadline_days: i64) -> Self {
        Self {
            diligence_days_deadline: Some(deadline_days),
            ..Self::to(AppearanceStatus::UnderInquiry)
        }
    }

    #[must_use]
    pub fn judged(minutes_text: Option<String>) -> Self {
        Self {
            minutes_text,
            ..Self::to(AppearanceStatus::Judged)
        }
    }

    /// Check the fields the target status needs and drop the ones it clears.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` when a required field is missing.
    pub fn normalized(mut self) -> Result<Self, EngineError> {
        match self.status {
            AppearanceStatus::RecusedForReview => {
                let member = self
                    .view_requested_member_id
                    .take()
                    .filter(|id| !id.trim().is_empty())
                    .ok_or_else(|| {
                        EngineError::Validation(
                            "recused_for_review requires view_requested_member_id".into(),
                        )
                    })?;
                self.view_requested_member_id = Some(member);
                self.diligence_days_deadline = None;
            }
            AppearanceStatus::UnderInquiry => {
                match self.diligence_days_deadline {
                    Some(days) if days > 0 => {}
                    _ => {
                        return Err(EngineError::Validation(
                            "under_inquiry requires a positive diligence_days_deadline".into(),
                        ));
                    }
                }
                self.view_requested_member_id = None;
            }
            AppearanceStatus::OnDocket | AppearanceStatus::Stayed => {
                self.view_requested_member_id = None;
                self.diligence_days_deadline = None;
            }
            AppearanceStatus::Judged => {}
        }
        self.minutes_text = if self.status == AppearanceStatus::Judged {
            self.minutes_text
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
        } else {
            None
        };
        Ok(self)
    }
}
