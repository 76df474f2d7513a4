// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Duration, OffsetDateTime};

/// Dispute window applied when a tournament is created without one (15 minutes).
pub const DEFAULT_DISPUTE_WINDOW_SECS: u64 = 900;

/// Identifier of a tournament, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TournamentId(u64);

impl TournamentId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TournamentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a participant, sequential within its tournament starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(u32);

impl ParticipantId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Who a participant is: an individual user or a team.
///
/// Identity is owned by an external system; the engine only stores the reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entrant {
    /// An individual user.
    User(String),
    /// A team.
    Team(String),
}

impl Entrant {
    /// Returns the referenced identifier without its kind.
    #[must_use]
    pub fn reference(&self) -> &str {
        match self {
            Self::User(id) | Self::Team(id) => id,
        }
    }
}

impl std::fmt::Display for Entrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Team(id) => write!(f, "team:{id}"),
        }
    }
}

/// The competition structure a tournament uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    /// One loss eliminates.
    SingleElimination,
    /// Two losses eliminate; includes a losers bracket and grand final.
    DoubleElimination,
    /// Everyone plays everyone once.
    RoundRobin,
}

impl TournamentFormat {
    /// Converts this format to its wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SingleElimination => "single_elimination",
            Self::DoubleElimination => "double_elimination",
            Self::RoundRobin => "round_robin",
        }
    }

    /// Returns whether losing matches removes participants from contention.
    #[must_use]
    pub const fn is_elimination(&self) -> bool {
        matches!(self, Self::SingleElimination | Self::DoubleElimination)
    }
}

impl FromStr for TournamentFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single_elimination" => Ok(Self::SingleElimination),
            "double_elimination" => Ok(Self::DoubleElimination),
            "round_robin" => Ok(Self::RoundRobin),
            _ => Err(DomainError::InvalidFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for TournamentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse lifecycle of a tournament.
///
/// Statuses only ever move forward, one step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Created, configuration may still change.
    #[default]
    Draft,
    /// Accepting registrations.
    Registration,
    /// Registrations closed; registered participants confirm attendance.
    CheckIn,
    /// Bracket generated, matches being played.
    InProgress,
    /// Champion decided. Read-only.
    Completed,
}

impl TournamentStatus {
    /// Converts this status to its wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Registration => "registration",
            Self::CheckIn => "check_in",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Returns the status that follows this one, if any.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Draft => Some(Self::Registration),
            Self::Registration => Some(Self::CheckIn),
            Self::CheckIn => Some(Self::InProgress),
            Self::InProgress => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    /// Checks if a transition from this status to another is valid.
    ///
    /// Valid transitions are:
    /// - Draft → Registration
    /// - Registration → `CheckIn`
    /// - `CheckIn` → `InProgress`
    /// - `InProgress` → Completed
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Draft, Self::Registration)
                | (Self::Registration, Self::CheckIn)
                | (Self::CheckIn, Self::InProgress)
                | (Self::InProgress, Self::Completed)
        )
    }
}

impl FromStr for TournamentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "registration" => Ok(Self::Registration),
            "check_in" => Ok(Self::CheckIn),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Round-robin ranking criteria applied, in order, to participants tied on wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tiebreaker {
    /// Wins in matches played among the tied participants.
    HeadToHead,
    /// Points scored minus points conceded.
    ScoreDifferential,
    /// Lower seed ranks higher.
    Seed,
}

/// Per-tournament settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentSettings {
    /// When registration may close without force. `None` means any time.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub registration_closes_at: Option<OffsetDateTime>,
    /// How long after completion a result may be disputed.
    #[serde(default = "default_dispute_window_secs")]
    pub dispute_window_secs: u64,
    /// Round-robin tiebreak order.
    #[serde(default = "default_tiebreakers")]
    pub tiebreakers: Vec<Tiebreaker>,
}

const fn default_dispute_window_secs() -> u64 {
    DEFAULT_DISPUTE_WINDOW_SECS
}

fn default_tiebreakers() -> Vec<Tiebreaker> {
    vec![Tiebreaker::HeadToHead, Tiebreaker::Seed]
}

impl Default for TournamentSettings {
    fn default() -> Self {
        Self {
            registration_closes_at: None,
            dispute_window_secs: DEFAULT_DISPUTE_WINDOW_SECS,
            tiebreakers: default_tiebreakers(),
        }
    }
}

impl TournamentSettings {
    /// Returns the dispute window as a duration.
    #[must_use]
    pub fn dispute_window(&self) -> Duration {
        Duration::seconds(i64::try_from(self.dispute_window_secs).unwrap_or(i64::MAX))
    }
}

/// A tournament's identity, configuration and coarse status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    /// Store-assigned identifier.
    pub id: TournamentId,
    /// Display name.
    pub name: String,
    /// Competition structure.
    pub format: TournamentFormat,
    /// Maximum number of active participants. Fixed at creation.
    pub max_participants: u32,
    /// Lifecycle status.
    pub status: TournamentStatus,
    /// Additional settings.
    pub settings: TournamentSettings,
    /// Creation time.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Where a participant stands in the tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    /// Registered, attendance not yet confirmed.
    Registered,
    /// Attendance confirmed.
    CheckedIn,
    /// Left the tournament voluntarily or as a no-show.
    Withdrawn,
    /// Knocked out.
    Eliminated,
}

impl ParticipantStatus {
    /// Returns whether the participant counts against capacity.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Registered | Self::CheckedIn)
    }

    /// Converts this status to its wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::CheckedIn => "checked_in",
            Self::Withdrawn => "withdrawn",
            Self::Eliminated => "eliminated",
        }
    }
}

impl std::fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered user or team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Identifier within the tournament.
    pub id: ParticipantId,
    /// The user or team.
    pub entrant: Entrant,
    /// Current status.
    pub status: ParticipantStatus,
    /// Seed number, unique within the tournament when present.
    pub seed: Option<u32>,
    /// Completed matches won.
    pub matches_won: u32,
    /// Completed matches lost.
    pub matches_lost: u32,
    /// Final placement, set on elimination or at completion.
    pub final_placement: Option<u32>,
    /// Registration time.
    #[serde(with = "time::serde::rfc3339")]
    pub registered_at: OffsetDateTime,
}

impl Participant {
    /// Creates a freshly registered participant.
    ///
    /// # Arguments
    ///
    /// * `id` - The identifier within the tournament
    /// * `entrant` - The user or team
    /// * `registered_at` - Registration time
    #[must_use]
    pub const fn new(id: ParticipantId, entrant: Entrant, registered_at: OffsetDateTime) -> Self {
        Self {
            id,
            entrant,
            status: ParticipantStatus::Registered,
            seed: None,
            matches_won: 0,
            matches_lost: 0,
            final_placement: None,
            registered_at,
        }
    }

    /// Returns whether the participant counts against capacity.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Clears all progression results (counters, placement, elimination).
    pub const fn reset_progress(&mut self) {
        self.matches_won = 0;
        self.matches_lost = 0;
        self.final_placement = None;
        if matches!(self.status, ParticipantStatus::Eliminated) {
            self.status = ParticipantStatus::CheckedIn;
        }
    }
}
