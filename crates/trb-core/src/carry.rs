//! Distribution carry-forward.
//!
//! A distribution is never edited. Each docket placement, and each reviewer
//! that joins through a vote, produces a new snapshot derived from the active
//! one. The rapporteur named by the first snapshot stays for the life of the
//! appeal and the reviewer list only grows.

use crate::entities::Distribution;

/// Fields of the next snapshot, before it is given an id and persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionDraft {
    pub session_id: String,
    pub rapporteur_id: String,
    pub distributed_to_id: String,
    pub reviewer_ids: Vec<String>,
    pub order: i64,
}

/// Snapshot for placing the appeal on `session_id` with `selected` presenting it.
#[must_use]
pub fn carry_forward(
    previous: Option<&Distribution>,
    session_id: &str,
    selected: &str,
) -> DistributionDraft {
    let Some(previous) = previous else {
        return DistributionDraft {
            session_id: session_id.to_string(),
            rapporteur_id: selected.to_string(),
            distributed_to_id: selected.to_string(),
            reviewer_ids: Vec::new(),
            order: 1,
        };
    };

    let mut reviewer_ids = previous.reviewer_ids.clone();
    if selected != previous.rapporteur_id && !previous.has_reviewer(selected) {
        reviewer_ids.push(selected.to_string());
    }
    DistributionDraft {
        session_id: session_id.to_string(),
        rapporteur_id: previous.rapporteur_id.clone(),
        distributed_to_id: selected.to_string(),
        reviewer_ids,
        order: previous.order + 1,
    }
}

/// Snapshot adding `member_id` as a reviewer, or `None` when nothing changes.
///
/// The rapporteur is never added to its own reviewer list.
#[must_use]
pub fn with_reviewer(previous: &Distribution, member_id: &str) -> Option<DistributionDraft> {
    if member_id == previous.rapporteur_id || previous.has_reviewer(member_id) {
        return None;
    }
    let mut reviewer_ids = previous.reviewer_ids.clone();
    reviewer_ids.push(member_id.to_string());
    Some(DistributionDraft {
        session_id: previous.session_id.clone(),
        rapporteur_id: previous.rapporteur_id.clone(),
        distributed_to_id: previous.distributed_to_id.clone(),
        reviewer_ids,
        order: previous.order + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn snapshot(draft: &DistributionDraft) -> Distribution {
        Distribution {
            id: format!("dst-{:08}", draft.order),
            appeal_id: "apl-1".into(),
            session_id: draft.session_id.clone(),
            rapporteur_id: draft.rapporteur_id.clone(),
            distributed_to_id: draft.distributed_to_id.clone(),
            reviewer_ids: draft.reviewer_ids.clone(),
            order: draft.order,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn first_placement_names_the_rapporteur() {
        let draft = carry_forward(None, "jss-1", "mem-1");
        assert_eq!(draft.rapporteur_id, "mem-1");
        assert_eq!(draft.distributed_to_id, "mem-1");
        assert!(draft.reviewer_ids.is_empty());
        assert_eq!(draft.order, 1);
    }

    #[test]
    fn later_placements_keep_rapporteur_and_accumulate_reviewers() {
        let first = snapshot(&carry_forward(None, "jss-1", "mem-1"));
        let second = snapshot(&carry_forward(Some(&first), "jss-2", "mem-2"));
        assert_eq!(second.rapporteur_id, "mem-1");
        assert_eq!(second.distributed_to_id, "mem-2");
        assert_eq!(second.reviewer_ids, vec!["mem-2".to_string()]);
        assert_eq!(second.order, 2);

        let third = snapshot(&carry_forward(Some(&second), "jss-3", "mem-3"));
        assert_eq!(third.reviewer_ids, vec!["mem-2".to_string(), "mem-3".to_string()]);

        // Back to the rapporteur: nothing is lost, nothing is added.
        let fourth = carry_forward(Some(&third), "jss-4", "mem-1");
        assert_eq!(fourth.rapporteur_id, "mem-1");
        assert_eq!(fourth.distributed_to_id, "mem-1");
        assert_eq!(fourth.reviewer_ids, third.reviewer_ids);
        assert_eq!(fourth.order, 4);
    }

    #[test]
    fn repeated_reviewer_is_not_duplicated() {
        let first = snapshot(&carry_forward(None, "jss-1", "mem-1"));
        let second = snapshot(&carry_forward(Some(&first), "jss-2", "mem-2"));
        let third = carry_forward(Some(&second), "jss-3", "mem-2");
        assert_eq!(third.reviewer_ids, vec!["mem-2".to_string()]);
    }

    #[test]
    fn with_reviewer_is_idempotent() {
        let first = snapshot(&carry_forward(None, "jss-1", "mem-1"));
        assert_eq!(with_reviewer(&first, "mem-1"), None);

        let added = with_reviewer(&first, "mem-9").unwrap();
        assert_eq!(added.session_id, "jss-1");
        assert_eq!(added.distributed_to_id, "mem-1");
        assert_eq!(added.reviewer_ids, vec!["mem-9".to_string()]);
        assert_eq!(added.order, 2);

        assert_eq!(with_reviewer(&snapshot(&added), "mem-9"), None);
    }
}
