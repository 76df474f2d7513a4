// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

//! The tournament engine.
//!
//! Every mutation is a [`Command`] applied to an immutable
//! [`TournamentState`] by [`apply`], producing a new state, one audit event
//! and the notifications the transition triggered.

mod apply;
mod command;
mod dispute;
mod error;
mod lifecycle;
mod progression;
mod registry;
mod state;

#[cfg(test)]
mod tests;

pub use apply::{apply, create_tournament};
pub use command::{Caller, Command};
pub use error::CoreError;
pub use state::{EngineEvent, TournamentConfig, TournamentState, TransitionResult};
