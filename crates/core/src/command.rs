// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use tourney_domain::{Entrant, MatchId, ParticipantId, TournamentStatus};

/// The party invoking an operation, as established by the identity system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    /// The caller's user or team reference.
    pub entrant: Entrant,
    /// Whether the caller organizes the tournament being acted on.
    #[serde(rename = "organizer", default)]
    pub is_organizer: bool,
}

impl Caller {
    /// Creates an organizer caller.
    #[must_use]
    pub const fn organizer(entrant: Entrant) -> Self {
        Self {
            entrant,
            is_organizer: true,
        }
    }

    /// Creates a competitor caller.
    #[must_use]
    pub const fn competitor(entrant: Entrant) -> Self {
        Self {
            entrant,
            is_organizer: false,
        }
    }
}

/// A command represents caller intent as data only.
///
/// Commands are the only way to request state changes on an existing tournament.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Move the tournament to the next lifecycle status.
    AdvanceStatus {
        /// The requested status.
        target: TournamentStatus,
        /// Close registration before `registration_closes_at`.
        force_close: bool,
    },
    /// Register a user or team.
    Register {
        /// Who is registering.
        entrant: Entrant,
    },
    /// Confirm attendance.
    CheckIn {
        /// The participant.
        participant_id: ParticipantId,
    },
    /// Leave the tournament; forfeits once a bracket exists.
    Withdraw {
        /// The participant.
        participant_id: ParticipantId,
    },
    /// Assign seeds from an external ranking or registration order.
    AssignSeeds {
        /// Ranked participants, best first. Unranked participants follow.
        ranking: Option<Vec<ParticipantId>>,
    },
    /// Clear all seeds.
    ResetSeeds,
    /// Build the bracket from the current participants.
    GenerateBracket {
        /// Destructively replace an existing bracket.
        force: bool,
    },
    /// Mark a ready match as being played.
    StartMatch {
        /// The match.
        match_id: MatchId,
    },
    /// Report a final score.
    ReportScore {
        /// The match.
        match_id: MatchId,
        /// Score of slot 1.
        score_p1: u32,
        /// Score of slot 2.
        score_p2: u32,
    },
    /// Contest a completed result.
    Dispute {
        /// The match.
        match_id: MatchId,
        /// Why the result is contested.
        reason: String,
    },
    /// Settle a contested result.
    ResolveDispute {
        /// The match.
        match_id: MatchId,
        /// The confirmed winner.
        final_winner: ParticipantId,
        /// Corrected `(score_p1, score_p2)`, if any.
        scores: Option<(u32, u32)>,
    },
}

impl Command {
    /// Returns the audit action name of this command.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AdvanceStatus { .. } => "AdvanceStatus",
            Self::Register { .. } => "Register",
            Self::CheckIn { .. } => "CheckIn",
            Self::Withdraw { .. } => "Withdraw",
            Self::AssignSeeds { .. } => "AssignSeeds",
            Self::ResetSeeds => "ResetSeeds",
            Self::GenerateBracket { .. } => "GenerateBracket",
            Self::StartMatch { .. } => "StartMatch",
            Self::ReportScore { .. } => "ReportScore",
            Self::Dispute { .. } => "Dispute",
            Self::ResolveDispute { .. } => "ResolveDispute",
        }
    }
}
