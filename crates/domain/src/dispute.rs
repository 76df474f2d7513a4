// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::bracket::{Match, MatchId, SlotIndex};
use crate::error::DomainError;
use crate::types::{Entrant, ParticipantId};
use crate::validation::validate_scores;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A result as it was reported, before any dispute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedResult {
    /// Score of slot 1.
    pub score_p1: u32,
    /// Score of slot 2.
    pub score_p2: u32,
    /// The reported winner.
    pub winner: ParticipantId,
    /// Who reported it.
    pub reported_by: Option<Entrant>,
    /// When it was accepted.
    #[serde(with = "time::serde::rfc3339")]
    pub completed_at: OffsetDateTime,
}

impl ReportedResult {
    /// Captures the result currently recorded on a completed match.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMatchState` if the match has no complete result.
    pub fn capture(m: &Match) -> Result<Self, DomainError> {
        match (m.score_p1, m.score_p2, m.winner, m.completed_at) {
            (Some(score_p1), Some(score_p2), Some(winner), Some(completed_at)) => Ok(Self {
                score_p1,
                score_p2,
                winner,
                reported_by: m.reported_by.clone(),
                completed_at,
            }),
            _ => Err(DomainError::InvalidMatchState {
                match_id: m.id,
                status: m.status,
                operation: "dispute",
            }),
        }
    }
}

/// The organizer's decision on a dispute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeResolution {
    /// The organizer who decided.
    pub resolved_by: Entrant,
    /// The confirmed winner.
    pub final_winner: ParticipantId,
    /// Final score of slot 1.
    pub score_p1: u32,
    /// Final score of slot 2.
    pub score_p2: u32,
    /// Whether the reported winner was replaced.
    pub overturned: bool,
    /// When the decision was made.
    #[serde(with = "time::serde::rfc3339")]
    pub resolved_at: OffsetDateTime,
}

/// A contested result together with its eventual resolution.
///
/// Records are kept after resolution so the original report is never lost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeRecord {
    /// The contested match.
    pub match_id: MatchId,
    /// Who raised the dispute.
    pub raised_by: Entrant,
    /// Why.
    pub reason: String,
    /// When.
    #[serde(with = "time::serde::rfc3339")]
    pub raised_at: OffsetDateTime,
    /// The result as originally reported.
    pub original: ReportedResult,
    /// The decision, once made.
    pub resolution: Option<DisputeResolution>,
}

impl DisputeRecord {
    /// Opens a dispute record.
    #[must_use]
    pub const fn new(
        match_id: MatchId,
        raised_by: Entrant,
        reason: String,
        raised_at: OffsetDateTime,
        original: ReportedResult,
    ) -> Self {
        Self {
            match_id,
            raised_by,
            reason,
            raised_at,
            original,
            resolution: None,
        }
    }

    /// Returns whether the dispute still awaits a decision.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.resolution.is_none()
    }
}

/// Determines the final scores of a resolved dispute.
///
/// Corrected scores must be non-tied and favour the winner's slot. Without
/// them the original scores stand when upheld and are swapped when
/// overturned.
///
/// # Arguments
///
/// * `original` - The reported result
/// * `winner_slot` - The slot of the confirmed winner
/// * `overturned` - Whether the confirmed winner differs from the reported one
/// * `corrected` - Optional replacement scores `(score_p1, score_p2)`
///
/// # Errors
///
/// Returns `TiedScoreRejected` for tied corrected scores and `InvalidScores`
/// when they favour the other slot.
pub fn final_scores(
    original: &ReportedResult,
    winner_slot: SlotIndex,
    overturned: bool,
    corrected: Option<(u32, u32)>,
) -> Result<(u32, u32), DomainError> {
    let Some((score_p1, score_p2)) = corrected else {
        return Ok(if overturned {
            (original.score_p2, original.score_p1)
        } else {
            (original.score_p1, original.score_p2)
        });
    };
    validate_scores(score_p1, score_p2)?;
    let favours_first: bool = score_p1 > score_p2;
    if favours_first != (winner_slot == SlotIndex::First) {
        return Err(DomainError::InvalidScores(format!(
            "{score_p1}-{score_p2} does not favour the confirmed winner"
        )));
    }
    Ok((score_p1, score_p2))
}
