//! Request and settings models for the tournament API.
//!
//! # Core Concepts
//!
//! - [`TournamentSettings`]: event title and what the overlay shows.
//! - Input types: JSON bodies accepted by the control panel endpoints. The
//!   bracket state itself lives in [`crate::tournament`].

mod bracket;
mod roster;
mod settings;

pub use bracket::*;
pub use roster::*;
pub use settings::*;
