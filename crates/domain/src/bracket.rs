// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The bracket arena.
//!
//! A bracket is a flat list of matches sorted by `(round, number)`.
//! Matches reference each other through [`SlotRef`] values that name the
//! downstream match and the slot a winner (or, in double elimination, a
//! loser) is placed into. All lookups are binary searches over the sorted
//! list; there are no pointers between matches.

use crate::error::DomainError;
use crate::types::{Entrant, ParticipantId, TournamentFormat};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Identifies a match by its round and its position within the round.
///
/// Both values are 1-based. Ordering is by round, then number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchId {
    /// Round number, unique across all sides of the bracket.
    pub round: u32,
    /// Position within the round.
    pub number: u32,
}

impl MatchId {
    /// Creates a match identifier.
    #[must_use]
    pub const fn new(round: u32, number: u32) -> Self {
        Self { round, number }
    }
}

impl std::fmt::Display for MatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}M{}", self.round, self.number)
    }
}

/// One of the two slots of a match. `First` corresponds to `score_p1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotIndex {
    /// Slot 1.
    First,
    /// Slot 2.
    Second,
}

impl SlotIndex {
    /// Returns the array index of this slot.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    /// Returns the other slot.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }

    /// Slot fed by match `number` of the previous round: odd numbers fill slot 1.
    #[must_use]
    pub const fn by_parity(number: u32) -> Self {
        if number % 2 == 1 {
            Self::First
        } else {
            Self::Second
        }
    }
}

/// What occupies a match slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Awaiting the result of an earlier match.
    Empty,
    /// A concrete participant.
    Participant(ParticipantId),
    /// A permanent bye.
    Bye,
}

impl Slot {
    /// Returns the participant in this slot, if any.
    #[must_use]
    pub const fn participant(&self) -> Option<ParticipantId> {
        match self {
            Self::Participant(id) => Some(*id),
            Self::Empty | Self::Bye => None,
        }
    }

    /// Returns whether the slot no longer waits on another match.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        !matches!(self, Self::Empty)
    }
}

/// A reference to one slot of one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotRef {
    /// The downstream match.
    pub match_id: MatchId,
    /// The slot within it.
    pub slot: SlotIndex,
}

impl SlotRef {
    /// Creates a slot reference.
    #[must_use]
    pub const fn new(match_id: MatchId, slot: SlotIndex) -> Self {
        Self { match_id, slot }
    }
}

/// Per-match state.
///
/// `pending → ready → in_progress → {completed | disputed}`, `disputed →
/// completed` after resolution, and `pending → bye` when a slot holds a bye.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// At least one slot is still empty, or progression is frozen.
    Pending,
    /// Both participants are known.
    Ready,
    /// Being played.
    InProgress,
    /// A completed result is being contested.
    Disputed,
    /// Result confirmed.
    Completed,
    /// Resolved without play.
    Bye,
}

impl MatchStatus {
    /// Converts this status to its wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::InProgress => "in_progress",
            Self::Disputed => "disputed",
            Self::Completed => "completed",
            Self::Bye => "bye",
        }
    }

    /// Returns whether the match no longer needs a result.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Completed | Self::Bye)
    }

    /// Returns whether play has begun or finished on this match.
    #[must_use]
    pub const fn has_started(&self) -> bool {
        matches!(self, Self::InProgress | Self::Completed | Self::Disputed)
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which part of the bracket a match belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketSide {
    /// Winners bracket (the whole bracket in single elimination).
    Winners,
    /// Double-elimination losers bracket.
    Losers,
    /// Winners champion against losers champion.
    GrandFinal,
    /// Second grand final after the losers champion wins the first.
    GrandFinalReset,
    /// Round-robin pairing.
    RoundRobin,
}

/// A single match in the bracket arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Round and position.
    pub id: MatchId,
    /// Part of the bracket.
    pub side: BracketSide,
    /// The two slots.
    pub slots: [Slot; 2],
    /// Current state.
    pub status: MatchStatus,
    /// Score of slot 1, set when completed.
    pub score_p1: Option<u32>,
    /// Score of slot 2, set when completed.
    pub score_p2: Option<u32>,
    /// Set if and only if the match is completed.
    pub winner: Option<ParticipantId>,
    /// Where the winner advances. Absent for the final match.
    pub next_match_slot: Option<SlotRef>,
    /// Where the loser drops. Only used in double elimination.
    pub loser_match_slot: Option<SlotRef>,
    /// Who reported the result.
    pub reported_by: Option<Entrant>,
    /// When the result was accepted.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    /// The participant who forfeited this match, if it was decided by forfeit.
    pub forfeited_by: Option<ParticipantId>,
    /// Set while an upstream dispute freezes progression into this match.
    pub blocked: bool,
}

impl Match {
    /// Creates an empty pending match.
    #[must_use]
    pub const fn new(id: MatchId, side: BracketSide) -> Self {
        Self {
            id,
            side,
            slots: [Slot::Empty, Slot::Empty],
            status: MatchStatus::Pending,
            score_p1: None,
            score_p2: None,
            winner: None,
            next_match_slot: None,
            loser_match_slot: None,
            reported_by: None,
            completed_at: None,
            forfeited_by: None,
            blocked: false,
        }
    }

    /// Returns the participant in the given slot, if any.
    #[must_use]
    pub const fn participant(&self, slot: SlotIndex) -> Option<ParticipantId> {
        self.slots[slot.index()].participant()
    }

    /// Returns the slot the participant occupies in this match.
    #[must_use]
    pub fn slot_of(&self, participant_id: ParticipantId) -> Option<SlotIndex> {
        [SlotIndex::First, SlotIndex::Second]
            .into_iter()
            .find(|slot| self.participant(*slot) == Some(participant_id))
    }

    /// Returns whether the participant occupies one of the slots.
    #[must_use]
    pub fn involves(&self, participant_id: ParticipantId) -> bool {
        self.slot_of(participant_id).is_some()
    }

    /// Returns the completed match's loser.
    #[must_use]
    pub fn loser(&self) -> Option<ParticipantId> {
        let winner: ParticipantId = self.winner?;
        let winner_slot: SlotIndex = self.slot_of(winner)?;
        self.participant(winner_slot.other())
    }

    /// Returns the participant a bye match advanced, if any.
    #[must_use]
    pub fn bye_advancer(&self) -> Option<ParticipantId> {
        if self.status != MatchStatus::Bye {
            return None;
        }
        self.slots.iter().find_map(Slot::participant)
    }

    /// Clears any recorded result, leaving the slots untouched.
    pub fn clear_result(&mut self) {
        self.score_p1 = None;
        self.score_p2 = None;
        self.winner = None;
        self.reported_by = None;
        self.completed_at = None;
        self.forfeited_by = None;
    }
}

/// A generated competition structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    /// Mirrors the tournament format.
    pub bracket_type: TournamentFormat,
    /// Power of two for elimination formats, participant count for round robin.
    pub bracket_size: u32,
    /// Number of rounds, counting every side of the bracket.
    pub total_rounds: u32,
    /// Lowest round still being played. Never decreases, except when an
    /// overturned grand final removes the reset match and the value is
    /// clamped to the new `total_rounds`.
    pub current_round: u32,
    /// Set once a champion is decided or every round-robin match is played.
    pub completed: bool,
    /// Number of winners-bracket rounds (`total_rounds` for round robin).
    pub winners_rounds: u32,
    /// All matches, sorted by id.
    pub matches: Vec<Match>,
}

impl Bracket {
    /// Creates an empty bracket shell.
    #[must_use]
    pub const fn new(
        bracket_type: TournamentFormat,
        bracket_size: u32,
        total_rounds: u32,
        winners_rounds: u32,
    ) -> Self {
        Self {
            bracket_type,
            bracket_size,
            total_rounds,
            current_round: 1,
            completed: false,
            winners_rounds,
            matches: Vec::new(),
        }
    }

    fn position(&self, id: MatchId) -> Result<usize, DomainError> {
        self.matches
            .binary_search_by(|m| m.id.cmp(&id))
            .map_err(|_| DomainError::MatchNotFound(id))
    }

    /// Looks up a match.
    ///
    /// # Errors
    ///
    /// Returns `MatchNotFound` if no match has this id.
    pub fn get(&self, id: MatchId) -> Result<&Match, DomainError> {
        let idx: usize = self.position(id)?;
        Ok(&self.matches[idx])
    }

    /// Looks up a match for modification.
    ///
    /// # Errors
    ///
    /// Returns `MatchNotFound` if no match has this id.
    pub fn get_mut(&mut self, id: MatchId) -> Result<&mut Match, DomainError> {
        let idx: usize = self.position(id)?;
        Ok(&mut self.matches[idx])
    }

    /// Inserts a match, keeping the arena sorted.
    ///
    /// # Errors
    ///
    /// Returns `CorruptBracket` if a match with the same id exists.
    pub fn insert_match(&mut self, m: Match) -> Result<(), DomainError> {
        match self.matches.binary_search_by(|existing| existing.id.cmp(&m.id)) {
            Ok(_) => Err(DomainError::CorruptBracket(format!(
                "match {} already exists",
                m.id
            ))),
            Err(idx) => {
                self.matches.insert(idx, m);
                Ok(())
            }
        }
    }

    /// Removes a match from the arena.
    ///
    /// # Errors
    ///
    /// Returns `MatchNotFound` if no match has this id.
    pub fn remove_match(&mut self, id: MatchId) -> Result<Match, DomainError> {
        let idx: usize = self.position(id)?;
        Ok(self.matches.remove(idx))
    }

    /// Returns the matches of one round in number order.
    pub fn round(&self, round: u32) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(move |m| m.id.round == round)
    }

    /// Returns the match that decides the bracket (the highest-numbered match).
    #[must_use]
    pub fn final_match(&self) -> Option<&Match> {
        self.matches.last()
    }

    /// Counts bye slots among the first-round matches.
    #[must_use]
    pub fn initial_byes(&self) -> usize {
        self.round(1)
            .flat_map(|m| m.slots.iter())
            .filter(|slot| **slot == Slot::Bye)
            .count()
    }

    /// Places an occupant into an empty slot and settles the receiving match.
    ///
    /// # Errors
    ///
    /// Returns `CorruptBracket` if the slot is already occupied.
    pub fn place(&mut self, target: SlotRef, occupant: Slot) -> Result<(), DomainError> {
        let m: &mut Match = self.get_mut(target.match_id)?;
        if m.slots[target.slot.index()] != Slot::Empty {
            return Err(DomainError::CorruptBracket(format!(
                "slot {:?} of match {} is already occupied",
                target.slot, target.match_id
            )));
        }
        m.slots[target.slot.index()] = occupant;
        self.settle(target.match_id)
    }

    /// Resolves a pending match whose slots are both resolved.
    ///
    /// Two participants make the match ready. A participant facing a bye
    /// advances immediately and the loser destination receives a bye; two
    /// byes propagate a bye along both destinations. Blocked matches are
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns `CorruptBracket` if propagation hits an occupied slot.
    pub fn settle(&mut self, id: MatchId) -> Result<(), DomainError> {
        let m: &mut Match = self.get_mut(id)?;
        if m.status != MatchStatus::Pending || m.blocked {
            return Ok(());
        }
        let advancing: Slot = match m.slots {
            [Slot::Participant(_), Slot::Participant(_)] => {
                m.status = MatchStatus::Ready;
                return Ok(());
            }
            [Slot::Empty, _] | [_, Slot::Empty] => return Ok(()),
            [Slot::Participant(pid), Slot::Bye] | [Slot::Bye, Slot::Participant(pid)] => {
                Slot::Participant(pid)
            }
            [Slot::Bye, Slot::Bye] => Slot::Bye,
        };
        m.status = MatchStatus::Bye;
        let next: Option<SlotRef> = m.next_match_slot;
        let loser: Option<SlotRef> = m.loser_match_slot;
        if let Some(next) = next {
            self.place(next, advancing)?;
        }
        if let Some(loser) = loser {
            self.place(loser, Slot::Bye)?;
        }
        Ok(())
    }

    /// Settles every pending match in the arena in order.
    ///
    /// # Errors
    ///
    /// Returns `CorruptBracket` if propagation hits an occupied slot.
    pub fn settle_all(&mut self) -> Result<(), DomainError> {
        let ids: Vec<MatchId> = self.matches.iter().map(|m| m.id).collect();
        for id in ids {
            self.settle(id)?;
        }
        Ok(())
    }

    /// Empties a slot that an earlier result filled, undoing any bye
    /// advancement that followed from it.
    ///
    /// # Errors
    ///
    /// Returns `DownstreamMatchStarted` if the receiving match (or a match
    /// reached through byes) has already started.
    pub fn retract(&mut self, target: SlotRef) -> Result<(), DomainError> {
        let m: &Match = self.get(target.match_id)?;
        if m.status.has_started() {
            return Err(DomainError::DownstreamMatchStarted {
                match_id: target.match_id,
            });
        }
        if m.status == MatchStatus::Bye {
            let next: Option<SlotRef> = m.next_match_slot;
            let loser: Option<SlotRef> = m.loser_match_slot;
            if let Some(next) = next {
                self.retract(next)?;
            }
            if let Some(loser) = loser {
                self.retract(loser)?;
            }
        }
        let m: &mut Match = self.get_mut(target.match_id)?;
        m.status = MatchStatus::Pending;
        m.slots[target.slot.index()] = Slot::Empty;
        Ok(())
    }

    /// Returns the first match reachable from `target` (through byes) that has started.
    ///
    /// # Errors
    ///
    /// Returns `MatchNotFound` if the graph references a missing match.
    pub fn started_downstream(&self, target: SlotRef) -> Result<Option<MatchId>, DomainError> {
        let m: &Match = self.get(target.match_id)?;
        if m.status.has_started() {
            return Ok(Some(m.id));
        }
        if m.status == MatchStatus::Bye {
            for next in [m.next_match_slot, m.loser_match_slot].into_iter().flatten() {
                if let Some(found) = self.started_downstream(next)? {
                    return Ok(Some(found));
                }
            }
        }
        Ok(None)
    }

    /// Blocks the match at `target` and every match reached from it through byes.
    /// A ready match falls back to pending.
    ///
    /// # Errors
    ///
    /// Returns `MatchNotFound` if the graph references a missing match.
    pub fn freeze(&mut self, target: SlotRef) -> Result<(), DomainError> {
        let m: &mut Match = self.get_mut(target.match_id)?;
        m.blocked = true;
        if m.status == MatchStatus::Ready {
            m.status = MatchStatus::Pending;
        }
        if m.status == MatchStatus::Bye {
            let next: Option<SlotRef> = m.next_match_slot;
            let loser: Option<SlotRef> = m.loser_match_slot;
            for next in [next, loser].into_iter().flatten() {
                self.freeze(next)?;
            }
        }
        Ok(())
    }

    /// Unblocks the match at `target` and its bye successors, settling each.
    ///
    /// # Errors
    ///
    /// Returns `CorruptBracket` if settling hits an occupied slot.
    pub fn thaw(&mut self, target: SlotRef) -> Result<(), DomainError> {
        let m: &mut Match = self.get_mut(target.match_id)?;
        m.blocked = false;
        if m.status == MatchStatus::Bye {
            let next: Option<SlotRef> = m.next_match_slot;
            let loser: Option<SlotRef> = m.loser_match_slot;
            for next in [next, loser].into_iter().flatten() {
                self.thaw(next)?;
            }
        }
        self.settle(target.match_id)
    }

    /// Returns the first-to-last placement shared by every participant who
    /// is knocked out of the tournament in this match.
    ///
    /// Round robin has no bands and returns `None`.
    #[must_use]
    pub fn elimination_band(&self, id: MatchId) -> Option<u32> {
        let w: u32 = self.winners_rounds;
        match self.bracket_type {
            TournamentFormat::RoundRobin => None,
            TournamentFormat::SingleElimination => {
                let remaining: u32 = w.checked_sub(id.round)?;
                Some((1u32 << remaining) + 1)
            }
            TournamentFormat::DoubleElimination => {
                let m: &Match = self.get(id).ok()?;
                match m.side {
                    BracketSide::GrandFinal | BracketSide::GrandFinalReset => Some(2),
                    BracketSide::Losers => {
                        let k: u32 = id.round.checked_sub(w)?;
                        let later: u32 = (k + 1..=losers_round_count(w))
                            .map(|j| losers_round_size(self.bracket_size, j))
                            .sum();
                        Some(3 + later)
                    }
                    BracketSide::Winners => match m.loser_match_slot {
                        Some(target) => self.elimination_band(target.match_id),
                        None => Some(2),
                    },
                    BracketSide::RoundRobin => None,
                }
            }
        }
    }

    /// Raises `current_round` to the lowest round that still has an
    /// unresolved match, or to `total_rounds` when none remain.
    pub fn refresh_current_round(&mut self) {
        let lowest_open: u32 = self
            .matches
            .iter()
            .filter(|m| !m.status.is_resolved())
            .map(|m| m.id.round)
            .min()
            .unwrap_or(self.total_rounds);
        self.current_round = self.current_round.max(lowest_open);
    }

    /// Returns the decided champion of an elimination bracket.
    #[must_use]
    pub fn champion(&self) -> Option<ParticipantId> {
        let last: &Match = self.final_match()?;
        if last.next_match_slot.is_some() {
            return None;
        }
        match last.status {
            MatchStatus::Completed => last.winner,
            MatchStatus::Bye => last.bye_advancer(),
            _ => None,
        }
    }

    /// Returns whether every match has been resolved.
    #[must_use]
    pub fn all_resolved(&self) -> bool {
        self.matches.iter().all(|m| m.status.is_resolved())
    }
}

/// Number of losers-bracket rounds for `winners_rounds` winners rounds.
#[must_use]
pub const fn losers_round_count(winners_rounds: u32) -> u32 {
    2 * winners_rounds.saturating_sub(1)
}

/// Number of matches in losers round `k` (1-based) of a bracket of `size` slots.
#[must_use]
pub const fn losers_round_size(size: u32, k: u32) -> u32 {
    size >> (k.div_ceil(2) + 1)
}
