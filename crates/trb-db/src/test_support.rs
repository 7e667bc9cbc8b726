//! Shared test utilities for trb-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use chrono::NaiveDate;

    use trb_core::entities::{Appeal, Decision, JudgmentSession, Member, Vote};
    use trb_core::enums::{DecisionType, KnowledgeType, MemberRole};

    use crate::TribunalDb;
    use crate::requests::vote::NewVote;
    use crate::service::TribunalService;
    use crate::trail::writer::TrailWriter;

    /// An appeal placed on a session, with the ids tests usually need.
    pub struct Placement {
        pub appeal_id: String,
        pub session_id: String,
        pub appearance_id: String,
        pub rapporteur_id: String,
    }

    /// In-memory service with the trail disabled and no actor.
    pub async fn test_service() -> TribunalService {
        let db = TribunalDb::open_local(":memory:").await.unwrap();
        TribunalService::from_db(db, TrailWriter::disabled(), None)
    }

    /// In-memory service recording `actor` on audit entries.
    pub async fn test_service_as(actor: &str) -> TribunalService {
        let db = TribunalDb::open_local(":memory:").await.unwrap();
        TribunalService::from_db(db, TrailWriter::disabled(), Some(actor.to_string()))
    }

    /// In-memory service writing trail files under `trail_dir`.
    pub async fn test_service_with_trail(trail_dir: std::path::PathBuf) -> TribunalService {
        let db = TribunalDb::open_local(":memory:").await.unwrap();
        TribunalService::from_db(db, TrailWriter::new(trail_dir).unwrap(), None)
    }

    pub async fn seed_member(svc: &TribunalService, name: &str, role: MemberRole) -> Member {
        svc.create_member(name, role).await.unwrap()
    }

    pub async fn seed_appeal(svc: &TribunalService, protocol: &str) -> Appeal {
        svc.create_appeal(protocol).await.unwrap()
    }

    pub async fn seed_session(svc: &TribunalService, title: &str) -> JudgmentSession {
        svc.create_judgment_session(title, NaiveDate::from_ymd_opt(2026, 3, 12).unwrap())
            .await
            .unwrap()
    }

    pub async fn seed_decision(
        svc: &TribunalService,
        decision_type: DecisionType,
        identifier: &str,
    ) -> Decision {
        svc.create_decision(decision_type, identifier, None, None, None)
            .await
            .unwrap()
    }

    /// One appeal on one session, distributed to a fresh rapporteur.
    pub async fn seed_placement(svc: &TribunalService) -> Placement {
        let appeal = seed_appeal(svc, "2026/000001").await;
        let session = seed_session(svc, "1ª Sessão Ordinária").await;
        let rapporteur = seed_member(svc, "Relatora", MemberRole::Rapporteur).await;
        let placement = svc
            .place_on_docket(&appeal.id, &session.id, &rapporteur.id)
            .await
            .unwrap();
        Placement {
            appeal_id: appeal.id,
            session_id: session.id,
            appearance_id: placement.appearance.id,
            rapporteur_id: rapporteur.id,
        }
    }

    /// Record a knowledge vote for the "Provimento" merit decision.
    pub async fn cast_merit_vote(svc: &TribunalService, placement: &Placement, member_id: &str) -> Vote {
        let existing = svc
            .list_decisions(Some(DecisionType::Merit))
            .await
            .unwrap()
            .into_iter()
            .find(|d| d.identifier == "Provimento");
        let merit = match existing {
            Some(decision) => decision,
            None => seed_decision(svc, DecisionType::Merit, "Provimento").await,
        };
        svc.record_vote(
            NewVote::builder(&placement.appearance_id, member_id, KnowledgeType::Knowledge)
                .merit(Some(merit.id))
                .text("Dou provimento ao recurso.")
                .build(),
        )
        .await
        .unwrap()
    }
}
