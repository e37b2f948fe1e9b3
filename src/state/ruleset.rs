//! The capability trait a game implements to plug into the room engine.
//!
//! The engine owns admission, the round lifecycle, and turn rotation; the
//! ruleset owns everything card-specific behind this trait. The engine never
//! names a concrete game.

use std::collections::HashMap;

use crate::state::log::EventLog;
use crate::state::room::{PlayerInfo, RoomError};

/// Mutable borrow of the room state a ruleset may touch while resolving.
pub struct RulesCtx<'a, R> {
    /// Ruleset-owned round state.
    pub round: &'a mut R,

    /// Persistent identities by connection id.
    pub players: &'a HashMap<String, PlayerInfo>,

    /// Seating / turn rotation order.
    pub order: &'a [String],

    /// The connection whose turn it is, if any.
    pub current_player: Option<&'a str>,

    /// Player-visible event log.
    pub log: &'a mut EventLog,
}

/// Read-only borrow of room state for end checks and view projection.
pub struct ViewCtx<'a, R> {
    pub round: &'a R,
    pub players: &'a HashMap<String, PlayerInfo>,
    pub order: &'a [String],
    pub current_player: Option<&'a str>,
    pub started: bool,
    pub ended: bool,
    pub winner: Option<&'a str>,
    pub room_id: &'a str,
    pub log: &'a EventLog,
}

/// Whether the turn passes on after a resolved action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnFlow {
    /// Rotate to the next eligible player.
    Advance,
    /// The actor keeps the turn.
    Keep,
}

/// Outcome of an end-of-round check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundVerdict {
    /// The round goes on.
    Continue,
    /// The round is over; `winner` is empty when nobody survived.
    Ended { winner: Option<String> },
}

/// A game ruleset.
///
/// All methods are synchronous and must leave the round state consistent:
/// `handle_action` validates before mutating, and effect-level no-ops after
/// a card is committed are successes, not errors.
pub trait Ruleset {
    /// Per-round state owned by the ruleset (deck, hands, ...).
    type Round: Default;

    /// Decoded action payload.
    type Action;

    /// Fewest players a round can start with.
    fn min_players(&self) -> usize;

    /// Seat cap for the room.
    fn max_players(&self) -> usize;

    /// Create the round-scoped seat for a newly admitted player.
    fn seat(&self, round: &mut Self::Round, id: &str);

    /// Drop a departing player's seat.
    fn unseat(&self, round: &mut Self::Round, id: &str);

    /// Whether the player's seat exists and is knocked out of the round.
    fn is_eliminated(&self, round: &Self::Round, id: &str) -> bool;

    /// Whether the player may be handed the turn (seated, not eliminated).
    fn is_eligible(&self, round: &Self::Round, id: &str) -> bool;

    /// Reset the round state for a fresh round over the seated players.
    fn setup(&mut self, ctx: RulesCtx<'_, Self::Round>);

    /// Begin the current player's turn (clear transient state, draw, ...).
    fn start_turn(&mut self, ctx: RulesCtx<'_, Self::Round>);

    /// Resolve one action by the given actor.
    fn handle_action(
        &mut self,
        ctx: RulesCtx<'_, Self::Round>,
        actor: &str,
        action: &Self::Action,
    ) -> Result<TurnFlow, RoomError>;

    /// Decide whether the round is over and who won.
    fn check_end(&self, ctx: ViewCtx<'_, Self::Round>) -> RoundVerdict;

    /// Project the authoritative state into a viewer-specific redacted view.
    fn build_view(&self, ctx: ViewCtx<'_, Self::Round>, viewer: &str) -> serde_json::Value;

    /// Enumerate the viewer's currently legal actions. Empty for anyone who
    /// is not the player to move.
    fn legal_actions(&self, ctx: ViewCtx<'_, Self::Round>, viewer: &str) -> serde_json::Value;
}
