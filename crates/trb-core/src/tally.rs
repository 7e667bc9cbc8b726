//! Vote counts frozen on a closed voting, and the casting-vote rule.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Counts reported by the session chair when closing a voting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Tally {
    pub total_votes: i64,
    pub votes_in_favor: i64,
    pub votes_against: i64,
    pub abstentions: i64,
}

impl Tally {
    #[must_use]
    pub const fn new(
        total_votes: i64,
        votes_in_favor: i64,
        votes_against: i64,
        abstentions: i64,
    ) -> Self {
        Self {
            total_votes,
            votes_in_favor,
            votes_against,
            abstentions,
        }
    }

    /// Counts must be non-negative and the positions cannot exceed the total.
    ///
    /// Members absent from the docket may still be counted by the chair, so
    /// the total is not compared against the number of recorded votes.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` describing the first bad count.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, value) in [
            ("total_votes", self.total_votes),
            ("votes_in_favor", self.votes_in_favor),
            ("votes_against", self.votes_against),
            ("abstentions", self.abstentions),
        ] {
            if value < 0 {
                return Err(CoreError::Validation(format!(
                    "{name} must not be negative (got {value})"
                )));
            }
        }
        let cast = self
            .votes_in_favor
            .checked_add(self.votes_against)
            .and_then(|sum| sum.checked_add(self.abstentions))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "positions overflow ({} in favor, {} against, {} abstentions)",
                    self.votes_in_favor, self.votes_against, self.abstentions
                ))
            })?;
        if cast > self.total_votes {
            return Err(CoreError::Validation(format!(
                "positions ({cast}) exceed total_votes ({})",
                self.total_votes
            )));
        }
        Ok(())
    }

    #[must_use]
    pub const fn is_tied(&self) -> bool {
        self.votes_in_favor == self.votes_against
    }
}

/// Member id to persist as the casting vote.
///
/// When `used` is false the supplied member is discarded, whatever it was.
///
/// # Errors
///
/// Returns `CoreError::Validation` when the vote is used without a member, and
/// `CoreError::QualityVoteWithoutTie` when the tally is not tied.
pub fn resolve_quality_vote(
    used: bool,
    member_id: Option<&str>,
    tally: &Tally,
) -> Result<Option<String>, CoreError> {
    if !used {
        return Ok(None);
    }
    let member_id = member_id.filter(|id| !id.trim().is_empty()).ok_or_else(|| {
        CoreError::Validation("quality_vote_member_id is required when the quality vote is used".into())
    })?;
    if !tally.is_tied() {
        return Err(CoreError::QualityVoteWithoutTie {
            in_favor: tally.votes_in_favor,
            against: tally.votes_against,
        });
    }
    Ok(Some(member_id.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn valid_tally_passes() {
        assert!(Tally::new(5, 3, 1, 1).validate().is_ok());
        assert!(Tally::new(7, 3, 1, 1).validate().is_ok());
        assert!(Tally::new(0, 0, 0, 0).validate().is_ok());
        assert!(Tally::new(i64::MAX, i64::MAX - 2, 1, 1).validate().is_ok());
    }

    #[test]
    fn overflowing_positions_are_a_validation_error() {
        let err = Tally::new(10, i64::MAX, 1, 0).validate().unwrap_err();
        assert!(matches!(&err, CoreError::Validation(msg) if msg.contains("overflow")));
    }

    #[rstest]
    #[case(Tally::new(-1, 0, 0, 0))]
    #[case(Tally::new(3, 2, 2, 0))]
    #[case(Tally::new(3, 0, 0, -1))]
    #[case(Tally::new(10, i64::MAX, 1, 0))]
    #[case(Tally::new(i64::MAX, i64::MAX, i64::MAX, i64::MAX))]
    #[case(Tally::new(i64::MAX, i64::MAX - 1, 1, 1))]
    fn invalid_tally_fails(#[case] tally: Tally) {
        assert!(matches!(tally.validate(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn unused_quality_vote_is_dropped() {
        let tally = Tally::new(3, 2, 1, 0);
        assert_eq!(resolve_quality_vote(false, Some("mem-1"), &tally), Ok(None));
    }

    #[test]
    fn used_quality_vote_needs_member() {
        let tally = Tally::new(4, 2, 2, 0);
        assert!(matches!(
            resolve_quality_vote(true, None, &tally),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            resolve_quality_vote(true, Some("  "), &tally),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn used_quality_vote_needs_tie() {
        let tally = Tally::new(3, 2, 1, 0);
        assert_eq!(
            resolve_quality_vote(true, Some("mem-1"), &tally),
            Err(CoreError::QualityVoteWithoutTie {
                in_favor: 2,
                against: 1
            })
        );
        let tied = Tally::new(4, 2, 2, 0);
        assert_eq!(
            resolve_quality_vote(true, Some(" mem-1 "), &tied),
            Ok(Some("mem-1".to_string()))
        );
        assert_eq!(
            resolve_quality_vote(true, Some("mem-1"), &tied),
            Ok(Some("mem-1".to_string()))
        );
    }
}
