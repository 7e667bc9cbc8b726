use serde::Serialize;
use trb_core::entities::Distribution;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct HistoryResponse {
    appeal_id: String,
    rapporteur_id: Option<String>,
    reviewer_ids: Vec<String>,
    distributions: Vec<Distribution>,
}

impl HistoryResponse {
    fn new(appeal_id: &str, distributions: Vec<Distribution>) -> Self {
        let active = distributions.iter().find(|d| d.is_active);
        Self {
            appeal_id: appeal_id.to_string(),
            rapporteur_id: active.map(|d| d.rapporteur_id.clone()),
            reviewer_ids: active.map(|d| d.reviewer_ids.clone()).unwrap_or_default(),
            distributions,
        }
    }
}

pub async fn run(appeal_id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let distributions = ctx.service.distribution_history(appeal_id).await?;
    output(&HistoryResponse::new(appeal_id, distributions), flags.format)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn snapshot(order: i64, reviewers: &[&str], is_active: bool) -> Distribution {
        Distribution {
            id: format!("dst-{order}"),
            appeal_id: "apl-1".into(),
            session_id: format!("jss-{order}"),
            rapporteur_id: "mem-1".into(),
            distributed_to_id: "mem-1".into(),
            reviewer_ids: reviewers.iter().map(ToString::to_string).collect(),
            order,
            is_active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn summary_comes_from_the_active_snapshot() {
        let response = HistoryResponse::new(
            "apl-1",
            vec![snapshot(1, &[], false), snapshot(2, &["mem-2"], true)],
        );
        assert_eq!(response.rapporteur_id.as_deref(), Some("mem-1"));
        assert_eq!(response.reviewer_ids, vec!["mem-2".to_string()]);
        assert_eq!(response.distributions.len(), 2);
    }

    #[test]
    fn empty_history_has_no_rapporteur() {
        let response = HistoryResponse::new("apl-1", Vec::new());
        assert_eq!(response.rapporteur_id, None);
        assert!(response.reviewer_ids.is_empty());
    }
}
