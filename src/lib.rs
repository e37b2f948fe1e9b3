//! CardRoom State Library
//!
//! This crate provides room and ruleset state management for turn-based,
//! hidden-information card games.
//!
//! # Overview
//!
//! The state module provides:
//!
//! - **Room Engine** - A generic turn state machine (admission, round
//!   lifecycle, turn rotation, action dispatch) that works against any
//!   ruleset implementing the [`state::Ruleset`] trait.
//!
//! - **Court Ruleset** - The concrete Love-Letter-style court game: deck
//!   setup, per-turn draws, card effects, elimination, and end-of-round
//!   scoring.
//!
//! - **Room Registry** - Lazily created rooms keyed by identifier, with
//!   connection-scoped removal and idle-room reaping.
//!
//! - **View Projection** - Per-viewer redacted JSON snapshots; a viewer sees
//!   their own hand but only hand *counts* for everyone else.
//!
//! # Design Principles
//!
//! 1. **Validation before mutation** - Every operation either fails with a
//!    clear error before touching state, or completes in full.
//!
//! 2. **Rules behind a trait** - The engine never names a concrete game;
//!    card semantics live entirely in the ruleset implementation.
//!
//! 3. **No networking** - This crate is pure state, no WebSocket or HTTP.
//!    The transport adapter calls the operations and pushes the views.
//!
//! 4. **Serialization-ready** - Views and action catalogs are JSON values
//!    ready to send to clients.
//!
//! # Example
//!
//! ```rust
//! use cardroom_state::state::{CourtGame, Room};
//!
//! let mut room: Room<CourtGame> = Room::new("table-1".to_string());
//!
//! room.join("conn-a", Some("Alice")).unwrap();
//! room.join("conn-b", Some("Bob")).unwrap();
//! room.start().unwrap();
//!
//! // Two players: 4 cards burned, 2 dealt, first-turn draw leaves 9.
//! let view = room.view_for("conn-a");
//! assert_eq!(view["deck_count"], 9);
//! assert_eq!(view["players"].as_array().unwrap().len(), 2);
//! ```

pub mod state;

// Re-export everything from state module at crate root
pub use state::*;
