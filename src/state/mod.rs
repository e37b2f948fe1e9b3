//! State management module for CardRoom.
//!
//! This module provides the core state types:
//!
//! - `card` - The closed set of card kinds, deck composition, shuffling
//! - `log` - Bounded FIFO event log shown to players
//! - `ruleset` - The capability trait a game plugs into the room engine
//! - `room` - The generic room/turn state machine and the room registry
//! - `court` - The concrete court-game ruleset
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        RoomRegistry                              │
//! │                                                                  │
//! │   room_id → Room<R> (created lazily on first reference)          │
//! │                                                                  │
//! │   ┌──────────────────────────────────────────────────────────┐   │
//! │   │                      Room<R: Ruleset>                    │   │
//! │   │                                                          │   │
//! │   │  players: conn_id → PlayerInfo     (persistent identity) │   │
//! │   │  order:   [conn_id]                (turn rotation)       │   │
//! │   │  log:     EventLog                 (capped FIFO)         │   │
//! │   │  round:   R::Round                 (ruleset-owned state) │   │
//! │   │                                                          │   │
//! │   │  join / start / act / leave ──▶ R (setup, start_turn,    │   │
//! │   │                                    handle_action, ...)   │   │
//! │   │  view_for ──▶ R::build_view    (per-viewer redaction)    │   │
//! │   └──────────────────────────────────────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use cardroom_state::state::{CourtGame, PlayCard, RoomRegistry};
//!
//! let mut rooms: RoomRegistry<CourtGame> = RoomRegistry::new();
//!
//! let room = rooms.find_or_create("table-1");
//! room.join("conn-a", Some("Alice"))?;
//! room.join("conn-b", None)?; // defaults to "Player-2"
//! room.start()?;
//!
//! room.act("conn-a", &PlayCard {
//!     card_index: 0,
//!     target_id: Some("conn-b".to_string()),
//!     guess: Some(5),
//! })?;
//!
//! // Push a redacted view to every subscriber after each mutation.
//! for id in room.order().to_vec() {
//!     let _view = room.view_for(&id);
//! }
//! ```

pub mod card;
pub mod court;
pub mod log;
pub mod room;
pub mod ruleset;

// Re-export commonly used types
pub use card::{build_deck, shuffled_deck, Card, DECK_SIZE};
pub use court::{CourtGame, CourtRound, DiscardEntry, Peek, PlayCard, SeatState};
pub use log::EventLog;
pub use room::{ActOutcome, PlayerInfo, Room, RoomError, RoomRegistry};
pub use ruleset::{RoundVerdict, RulesCtx, Ruleset, TurnFlow, ViewCtx};
