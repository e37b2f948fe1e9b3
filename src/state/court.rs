//! The court ruleset.
//!
//! A Love-Letter-style game of courtly intrigue for 2-4 players. Each player
//! holds one card; on their turn they draw a second and play one of the two.
//! Card effects eliminate rivals or reveal information, and the last player
//! standing (or the highest card once the deck runs dry) wins the round.
//!
//! Effect resolution follows a strict asymmetry: a play rejected before the
//! card leaves the hand is an error with no state change, while a legally
//! played card that finds no eligible target is a logged no-op and stays
//! consumed.

use std::collections::HashMap;
use std::mem;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::state::card::{shuffled_deck, Card};
use crate::state::log::EventLog;
use crate::state::room::{PlayerInfo, RoomError};
use crate::state::ruleset::{RoundVerdict, RulesCtx, Ruleset, TurnFlow, ViewCtx};

/// Fewest players a round can start with.
pub const MIN_PLAYERS: usize = 2;

/// Seat cap per room.
pub const MAX_PLAYERS: usize = 4;

/// Round-scoped state for one seated player.
#[derive(Debug, Clone, Default)]
pub struct SeatState {
    /// Held cards: one in the steady state, two while resolving a turn.
    pub hand: Vec<Card>,
    pub eliminated: bool,
    pub protected: bool,
}

impl SeatState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A played or forcibly discarded card, kept for the audit trail and the UI.
/// Rules decisions never consult this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscardEntry {
    pub card: Card,

    /// Display name of the player the card left.
    pub by: String,

    /// Declared target, when the play named one.
    pub target: Option<String>,

    /// Declared Guard guess, when the play carried one.
    pub guess: Option<u8>,
}

impl DiscardEntry {
    pub fn to_json(&self) -> Value {
        let mut entry = json!({
            "name": self.card.as_str(),
            "value": self.card.value(),
            "by": self.by,
        });
        if let Some(target) = &self.target {
            entry["target"] = json!(target);
        }
        if let Some(guess) = self.guess {
            entry["guess"] = json!(guess);
        }
        entry
    }
}

/// A private look at another player's card. At most one exists, overwritten
/// on each use and cleared when the next turn begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peek {
    pub viewer_id: String,
    pub target_id: String,
    pub card: Card,
}

/// Per-round game state.
#[derive(Debug, Clone, Default)]
pub struct CourtRound {
    /// Face-down draw pile; the end is the top.
    pub deck: Vec<Card>,

    /// Everything played or forcibly discarded, oldest first.
    pub discard: Vec<DiscardEntry>,

    /// Cards removed face down at setup, out of play for the round.
    pub burns: Vec<Card>,

    /// Seats by connection id.
    pub seats: HashMap<String, SeatState>,

    /// The round's single transient peek.
    pub last_peek: Option<Peek>,
}

/// One card play: the hand index to play plus its auxiliary inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayCard {
    pub card_index: usize,
    pub target_id: Option<String>,
    pub guess: Option<u8>,
}

/// The court ruleset. Owns the shuffle generator so rounds can be made
/// deterministic for testing.
#[derive(Debug, Clone)]
pub struct CourtGame {
    rng: ChaCha8Rng,
}

impl CourtGame {
    pub fn new() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// A ruleset whose shuffles are reproducible from `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Default for CourtGame {
    fn default() -> Self {
        Self::new()
    }
}

fn player_name<'a>(players: &'a HashMap<String, PlayerInfo>, id: &str) -> &'a str {
    players.get(id).map(|p| p.name.as_str()).unwrap_or("Unknown")
}

/// Draw the top card into a seat's hand. Tolerates an empty deck.
fn draw_card(round: &mut CourtRound, player_id: &str) -> Option<Card> {
    if round.deck.is_empty() {
        return None;
    }
    let seat = round.seats.get_mut(player_id)?;
    let card = round.deck.pop()?;
    seat.hand.push(card);
    Some(card)
}

fn eliminate(
    round: &mut CourtRound,
    players: &HashMap<String, PlayerInfo>,
    log: &mut EventLog,
    id: &str,
    reason: &str,
) {
    if let Some(seat) = round.seats.get_mut(id) {
        if !seat.eliminated {
            seat.eliminated = true;
            log.push(format!("{} is eliminated ({}).", player_name(players, id), reason));
        }
    }
}

/// Resolve the target of a hostile effect: present only when one was named,
/// it is not the actor, and its seat is alive and unprotected. Carries the
/// card the target holds, if any.
fn hostile_target(
    round: &CourtRound,
    actor: &str,
    target_id: Option<&str>,
) -> Option<(String, Option<Card>)> {
    let id = target_id.filter(|t| *t != actor)?;
    let seat = round.seats.get(id)?;
    if seat.protected || seat.eliminated {
        return None;
    }
    Some((id.to_string(), seat.hand.first().copied()))
}

impl Ruleset for CourtGame {
    type Round = CourtRound;
    type Action = PlayCard;

    fn min_players(&self) -> usize {
        MIN_PLAYERS
    }

    fn max_players(&self) -> usize {
        MAX_PLAYERS
    }

    fn seat(&self, round: &mut CourtRound, id: &str) {
        round.seats.insert(id.to_string(), SeatState::new());
    }

    fn unseat(&self, round: &mut CourtRound, id: &str) {
        round.seats.remove(id);
    }

    fn is_eliminated(&self, round: &CourtRound, id: &str) -> bool {
        round.seats.get(id).map(|s| s.eliminated).unwrap_or(false)
    }

    fn is_eligible(&self, round: &CourtRound, id: &str) -> bool {
        round.seats.get(id).map(|s| !s.eliminated).unwrap_or(false)
    }

    fn setup(&mut self, ctx: RulesCtx<'_, CourtRound>) {
        let RulesCtx { round, order, log, .. } = ctx;

        round.deck = shuffled_deck(&mut self.rng);
        round.discard.clear();
        round.burns.clear();
        round.last_peek = None;
        round.seats.clear();
        for id in order {
            round.seats.insert(id.clone(), SeatState::new());
        }
        log.push(format!("Starting a round with {} players.", order.len()));

        // Two-player rounds burn deeper so card counting stays honest.
        let burn_count = if order.len() == 2 { 4 } else { 1 };
        for _ in 0..burn_count {
            if let Some(card) = round.deck.pop() {
                round.burns.push(card);
            }
        }
        log.push(if burn_count == 1 {
            "Burned 1 card face down.".to_string()
        } else {
            format!("Burned {} cards face down.", burn_count)
        });

        for id in order {
            draw_card(round, id);
        }
    }

    fn start_turn(&mut self, ctx: RulesCtx<'_, CourtRound>) {
        let RulesCtx { round, players, current_player, log, .. } = ctx;

        round.last_peek = None;
        let current = match current_player {
            Some(id) => id,
            None => return,
        };
        match round.seats.get_mut(current) {
            Some(seat) if !seat.eliminated => seat.protected = false,
            _ => return,
        }
        match draw_card(round, current) {
            Some(_) => log.push(format!("{} drew a card.", player_name(players, current))),
            None => log.push("The deck is empty; the held cards decide the round."),
        }
    }

    fn handle_action(
        &mut self,
        ctx: RulesCtx<'_, CourtRound>,
        actor: &str,
        action: &PlayCard,
    ) -> Result<TurnFlow, RoomError> {
        let RulesCtx { round, players, log, .. } = ctx;

        let card = {
            let seat = round.seats.get_mut(actor).ok_or(RoomError::UnknownActor)?;
            let has_countess = seat.hand.contains(&Card::Countess);
            let has_royal = seat
                .hand
                .iter()
                .any(|c| matches!(c, Card::King | Card::Prince));
            if has_countess && has_royal && seat.hand.get(action.card_index) != Some(&Card::Countess)
            {
                return Err(RoomError::MustPlayCountess);
            }
            if action.card_index >= seat.hand.len() {
                return Err(RoomError::InvalidSelection);
            }
            seat.hand.remove(action.card_index)
        };

        let actor_name = player_name(players, actor).to_string();
        round.discard.push(DiscardEntry {
            card,
            by: actor_name.clone(),
            target: action.target_id.clone(),
            guess: action.guess,
        });
        log.push(format!("{} played the {}.", actor_name, card.as_str()));

        match card {
            Card::Guard => {
                match hostile_target(round, actor, action.target_id.as_deref()) {
                    None => log.push("The Guard had no effect."),
                    Some(_) if action.guess == Some(1) => {
                        log.push("A Guard cannot be named with the Guard.");
                    }
                    Some((target_id, held)) => {
                        if held.map(|c| c.value()) == action.guess {
                            eliminate(round, players, log, &target_id, "caught by the Guard");
                        } else {
                            log.push("The Guard's guess missed.");
                        }
                    }
                }
            }
            Card::Priest => {
                if let Some((target_id, Some(card))) =
                    hostile_target(round, actor, action.target_id.as_deref())
                {
                    log.push(format!(
                        "{} looked at {}'s card.",
                        actor_name,
                        player_name(players, &target_id)
                    ));
                    round.last_peek = Some(Peek {
                        viewer_id: actor.to_string(),
                        target_id,
                        card,
                    });
                }
            }
            Card::Baron => {
                if let Some((target_id, Some(target_card))) =
                    hostile_target(round, actor, action.target_id.as_deref())
                {
                    let my_value = round
                        .seats
                        .get(actor)
                        .and_then(|s| s.hand.first())
                        .map(|c| c.value())
                        .unwrap_or(0);
                    let target_value = target_card.value();
                    if my_value > target_value {
                        eliminate(round, players, log, &target_id, "lost the Baron duel");
                    } else if target_value > my_value {
                        eliminate(round, players, log, actor, "lost the Baron duel");
                    } else {
                        log.push("The Baron duel ties; no one is eliminated.");
                    }
                }
            }
            Card::Handmaid => {
                if let Some(seat) = round.seats.get_mut(actor) {
                    seat.protected = true;
                }
            }
            Card::Prince => {
                let victim_id = action
                    .target_id
                    .as_deref()
                    .filter(|t| !t.is_empty())
                    .unwrap_or(actor);
                let applies = round
                    .seats
                    .get(victim_id)
                    .map(|s| !s.eliminated && (!s.protected || victim_id == actor))
                    .unwrap_or(false);
                if applies {
                    let dumped = round.seats.get_mut(victim_id).and_then(|s| s.hand.pop());
                    if let Some(dumped) = dumped {
                        let victim_name = player_name(players, victim_id).to_string();
                        log.push(format!("{} discarded the {}.", victim_name, dumped.as_str()));
                        round.discard.push(DiscardEntry {
                            card: dumped,
                            by: victim_name,
                            target: None,
                            guess: None,
                        });
                        if dumped == Card::Princess {
                            eliminate(round, players, log, victim_id, "discarded the Princess");
                        } else {
                            draw_card(round, victim_id);
                        }
                    }
                } else {
                    log.push("The Prince had no effect.");
                }
            }
            Card::King => {
                if let Some((target_id, _)) =
                    hostile_target(round, actor, action.target_id.as_deref())
                {
                    // An ownership exchange, never a shared-reference swap.
                    let mut actor_hand = round
                        .seats
                        .get_mut(actor)
                        .map(|s| mem::take(&mut s.hand))
                        .unwrap_or_default();
                    if let Some(target_seat) = round.seats.get_mut(&target_id) {
                        mem::swap(&mut actor_hand, &mut target_seat.hand);
                    }
                    if let Some(actor_seat) = round.seats.get_mut(actor) {
                        actor_seat.hand = actor_hand;
                    }
                    log.push(format!(
                        "{} traded hands with {}.",
                        actor_name,
                        player_name(players, &target_id)
                    ));
                }
            }
            Card::Countess => {
                // No effect on play.
            }
            Card::Princess => {
                eliminate(round, players, log, actor, "played the Princess");
            }
        }

        Ok(TurnFlow::Advance)
    }

    fn check_end(&self, ctx: ViewCtx<'_, CourtRound>) -> RoundVerdict {
        let alive: Vec<&String> = ctx
            .order
            .iter()
            .filter(|id| {
                ctx.round
                    .seats
                    .get(*id)
                    .map(|s| !s.eliminated)
                    .unwrap_or(false)
            })
            .collect();

        if alive.len() == 1 {
            return RoundVerdict::Ended {
                winner: Some(alive[0].clone()),
            };
        }

        if ctx.round.deck.is_empty() {
            // Highest held card wins; the earliest seat keeps a tie.
            let mut winner = alive.first().map(|id| (*id).clone());
            let mut best = -1i32;
            for id in &alive {
                let value = ctx
                    .round
                    .seats
                    .get(*id)
                    .and_then(|s| s.hand.first())
                    .map(|c| i32::from(c.value()))
                    .unwrap_or(0);
                if value > best {
                    best = value;
                    winner = Some((*id).clone());
                }
            }
            return RoundVerdict::Ended { winner };
        }

        RoundVerdict::Continue
    }

    fn build_view(&self, ctx: ViewCtx<'_, CourtRound>, viewer: &str) -> Value {
        let round = ctx.round;

        let winner = ctx.winner.map(|id| {
            json!({
                "id": id,
                "name": ctx.players.get(id).map(|p| p.name.as_str()),
            })
        });

        let discard_tail = &round.discard[round.discard.len().saturating_sub(10)..];
        let discard: Vec<Value> = discard_tail.iter().map(DiscardEntry::to_json).collect();

        let you = ctx.players.get(viewer).map(|info| {
            let seat = round.seats.get(viewer);
            let peek = round
                .last_peek
                .as_ref()
                .filter(|p| p.viewer_id == viewer)
                .map(|p| json!({ "target_id": p.target_id, "card": p.card.to_json() }));
            json!({
                "id": info.id,
                "name": info.name,
                "hand": seat
                    .map(|s| s.hand.iter().map(|c| c.to_json()).collect::<Vec<_>>())
                    .unwrap_or_default(),
                "eliminated": seat.map(|s| s.eliminated).unwrap_or(false),
                "protected": seat.map(|s| s.protected).unwrap_or(false),
                "peek": peek,
            })
        });

        let players: Vec<Value> = ctx
            .order
            .iter()
            .map(|id| {
                let seat = round.seats.get(id);
                json!({
                    "id": id,
                    "name": player_name(ctx.players, id),
                    "hand_count": seat.map(|s| s.hand.len()).unwrap_or(0),
                    "eliminated": seat.map(|s| s.eliminated).unwrap_or(false),
                    "protected": seat.map(|s| s.protected).unwrap_or(false),
                    "is_you": id.as_str() == viewer,
                    "is_current": ctx.current_player == Some(id.as_str()),
                })
            })
            .collect();

        json!({
            "room_id": ctx.room_id,
            "started": ctx.started,
            "ended": ctx.ended,
            "winner": winner,
            "deck_count": round.deck.len(),
            "discard": discard,
            "current_player": ctx.current_player,
            "burns": if ctx.started { round.burns.len() } else { 0 },
            "you": you,
            "players": players,
            "log": ctx.log.tail(16),
        })
    }

    fn legal_actions(&self, ctx: ViewCtx<'_, CourtRound>, viewer: &str) -> Value {
        if !ctx.started || ctx.ended || ctx.current_player != Some(viewer) {
            return json!([]);
        }
        let seat = match ctx.round.seats.get(viewer) {
            Some(seat) if !seat.eliminated => seat,
            _ => return json!([]),
        };

        let has_countess = seat.hand.contains(&Card::Countess);
        let has_royal = seat
            .hand
            .iter()
            .any(|c| matches!(c, Card::King | Card::Prince));
        let forced = has_countess && has_royal;

        let rivals: Vec<&str> = ctx
            .order
            .iter()
            .filter(|id| id.as_str() != viewer)
            .filter(|id| {
                ctx.round
                    .seats
                    .get(*id)
                    .map(|s| !s.eliminated && !s.protected)
                    .unwrap_or(false)
            })
            .map(|id| id.as_str())
            .collect();

        let mut options = Vec::new();
        for (index, &card) in seat.hand.iter().enumerate() {
            if forced && card != Card::Countess {
                continue;
            }
            let mut option = json!({
                "card_index": index,
                "card": card.to_json(),
            });
            match card {
                Card::Guard => {
                    if rivals.is_empty() {
                        option["disabled"] = json!("No eligible target.");
                    } else {
                        option["targets"] = json!(rivals);
                        option["guess"] = json!({ "min": 2, "max": 8 });
                    }
                }
                Card::Priest | Card::Baron | Card::King => {
                    if rivals.is_empty() {
                        option["disabled"] = json!("No eligible target.");
                    } else {
                        option["targets"] = json!(rivals);
                    }
                }
                Card::Prince => {
                    let targets: Vec<&str> = ctx
                        .order
                        .iter()
                        .filter(|id| {
                            id.as_str() == viewer
                                || ctx
                                    .round
                                    .seats
                                    .get(*id)
                                    .map(|s| !s.eliminated && !s.protected)
                                    .unwrap_or(false)
                        })
                        .map(|id| id.as_str())
                        .collect();
                    option["targets"] = json!(targets);
                }
                Card::Handmaid | Card::Countess | Card::Princess => {}
            }
            options.push(option);
        }
        json!(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::room::Room;
    use pretty_assertions::assert_eq;

    /// Hand-built round state for driving the resolver directly.
    struct Fixture {
        rules: CourtGame,
        round: CourtRound,
        players: HashMap<String, PlayerInfo>,
        order: Vec<String>,
        log: EventLog,
    }

    impl Fixture {
        fn new(ids: &[&str]) -> Self {
            let mut players = HashMap::new();
            let mut round = CourtRound::default();
            let mut order = Vec::new();
            for id in ids {
                players.insert(
                    id.to_string(),
                    PlayerInfo {
                        id: id.to_string(),
                        name: id.to_uppercase(),
                    },
                );
                round.seats.insert(id.to_string(), SeatState::new());
                order.push(id.to_string());
            }
            Self {
                rules: CourtGame::seeded(1),
                round,
                players,
                order,
                log: EventLog::new(),
            }
        }

        fn hand(&mut self, id: &str, cards: &[Card]) {
            self.round.seats.get_mut(id).unwrap().hand = cards.to_vec();
        }

        fn seat(&self, id: &str) -> &SeatState {
            &self.round.seats[id]
        }

        fn play(&mut self, actor: &str, action: PlayCard) -> Result<TurnFlow, RoomError> {
            self.rules.handle_action(
                RulesCtx {
                    round: &mut self.round,
                    players: &self.players,
                    order: &self.order,
                    current_player: Some(actor),
                    log: &mut self.log,
                },
                actor,
                &action,
            )
        }

        fn begin_turn(&mut self, current: &str) {
            self.rules.start_turn(RulesCtx {
                round: &mut self.round,
                players: &self.players,
                order: &self.order,
                current_player: Some(current),
                log: &mut self.log,
            });
        }

        fn verdict(&self) -> RoundVerdict {
            self.rules.check_end(self.view_ctx())
        }

        fn view(&self, viewer: &str) -> Value {
            self.rules.build_view(self.view_ctx(), viewer)
        }

        fn actions(&self, viewer: &str) -> Value {
            self.rules.legal_actions(self.view_ctx(), viewer)
        }

        fn view_ctx(&self) -> ViewCtx<'_, CourtRound> {
            ViewCtx {
                round: &self.round,
                players: &self.players,
                order: &self.order,
                current_player: self.order.first().map(String::as_str),
                started: true,
                ended: false,
                winner: None,
                room_id: "room-1",
                log: &self.log,
            }
        }
    }

    fn target(id: &str) -> Option<String> {
        Some(id.to_string())
    }

    fn play_card(index: usize, target_id: Option<String>, guess: Option<u8>) -> PlayCard {
        PlayCard {
            card_index: index,
            target_id,
            guess,
        }
    }

    #[test]
    fn test_guard_correct_guess_eliminates() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Guard, Card::Baron]);
        fix.hand("b", &[Card::Prince]);

        fix.play("a", play_card(0, target("b"), Some(5))).unwrap();

        assert!(fix.seat("b").eliminated);
        assert_eq!(fix.round.discard.len(), 1);
        assert_eq!(fix.round.discard[0].card, Card::Guard);
        assert_eq!(fix.round.discard[0].target, Some("b".to_string()));
        assert_eq!(fix.round.discard[0].guess, Some(5));
    }

    #[test]
    fn test_guard_wrong_guess_misses() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Guard, Card::Baron]);
        fix.hand("b", &[Card::Prince]);

        fix.play("a", play_card(0, target("b"), Some(6))).unwrap();

        assert!(!fix.seat("b").eliminated);
        // The card is consumed even though nothing happened.
        assert_eq!(fix.seat("a").hand, vec![Card::Baron]);
    }

    #[test]
    fn test_guard_guess_of_one_always_rejected() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Guard, Card::Baron]);
        fix.hand("b", &[Card::Guard]);

        // Eligible target actually holding a Guard: still a no-op.
        fix.play("a", play_card(0, target("b"), Some(1))).unwrap();
        assert!(!fix.seat("b").eliminated);

        // Ineligible (protected) target: also a no-op.
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Guard, Card::Baron]);
        fix.hand("b", &[Card::Guard]);
        fix.round.seats.get_mut("b").unwrap().protected = true;
        fix.play("a", play_card(0, target("b"), Some(1))).unwrap();
        assert!(!fix.seat("b").eliminated);
    }

    #[test]
    fn test_guard_protected_target_is_noop() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Guard, Card::Baron]);
        fix.hand("b", &[Card::Prince]);
        fix.round.seats.get_mut("b").unwrap().protected = true;

        fix.play("a", play_card(0, target("b"), Some(5))).unwrap();

        assert!(!fix.seat("b").eliminated);
        assert_eq!(fix.round.discard.len(), 1);
    }

    #[test]
    fn test_guard_self_target_is_noop() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Guard, Card::Prince]);

        fix.play("a", play_card(0, target("a"), Some(5))).unwrap();

        assert!(!fix.seat("a").eliminated);
    }

    #[test]
    fn test_priest_records_peek_for_actor_only() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Priest, Card::Guard]);
        fix.hand("b", &[Card::King]);

        fix.play("a", play_card(0, target("b"), None)).unwrap();

        let peek = fix.round.last_peek.clone().unwrap();
        assert_eq!(peek.viewer_id, "a");
        assert_eq!(peek.target_id, "b");
        assert_eq!(peek.card, Card::King);

        // Only the actor's view carries the revelation.
        let view_a = fix.view("a");
        assert_eq!(view_a["you"]["peek"]["card"]["name"], "King");
        let view_b = fix.view("b");
        assert_eq!(view_b["you"]["peek"], Value::Null);
    }

    #[test]
    fn test_peek_cleared_when_next_turn_begins() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Priest, Card::Guard]);
        fix.hand("b", &[Card::King]);
        fix.round.deck = vec![Card::Guard];

        fix.play("a", play_card(0, target("b"), None)).unwrap();
        assert!(fix.round.last_peek.is_some());

        fix.begin_turn("b");
        assert!(fix.round.last_peek.is_none());
    }

    #[test]
    fn test_baron_higher_card_wins_duel() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Baron, Card::King]);
        fix.hand("b", &[Card::Prince]);

        fix.play("a", play_card(0, target("b"), None)).unwrap();

        assert!(fix.seat("b").eliminated);
        assert!(!fix.seat("a").eliminated);
    }

    #[test]
    fn test_baron_lower_card_loses_duel() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Baron, Card::Priest]);
        fix.hand("b", &[Card::Prince]);

        fix.play("a", play_card(0, target("b"), None)).unwrap();

        assert!(fix.seat("a").eliminated);
        assert!(!fix.seat("b").eliminated);
    }

    #[test]
    fn test_baron_tie_eliminates_no_one() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Baron, Card::Prince]);
        fix.hand("b", &[Card::Prince]);

        fix.play("a", play_card(0, target("b"), None)).unwrap();

        assert!(!fix.seat("a").eliminated);
        assert!(!fix.seat("b").eliminated);
    }

    #[test]
    fn test_handmaid_protects_actor() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Handmaid, Card::Guard]);

        fix.play("a", play_card(0, None, None)).unwrap();

        assert!(fix.seat("a").protected);
    }

    #[test]
    fn test_prince_forces_discard_and_redraw() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Prince, Card::Guard]);
        fix.hand("b", &[Card::Baron]);
        fix.round.deck = vec![Card::Priest];

        fix.play("a", play_card(0, target("b"), None)).unwrap();

        assert_eq!(fix.seat("b").hand, vec![Card::Priest]);
        assert!(fix.round.deck.is_empty());
        // Both the Prince and the forced discard land in the pile.
        assert_eq!(fix.round.discard.len(), 2);
        assert_eq!(fix.round.discard[1].card, Card::Baron);
        assert_eq!(fix.round.discard[1].by, "B");
    }

    #[test]
    fn test_prince_defaults_to_self() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Prince, Card::Handmaid]);
        fix.round.deck = vec![Card::Priest];

        fix.play("a", play_card(0, None, None)).unwrap();

        assert_eq!(fix.seat("a").hand, vec![Card::Priest]);
    }

    #[test]
    fn test_prince_self_allowed_while_protected() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Prince, Card::Handmaid]);
        fix.round.seats.get_mut("a").unwrap().protected = true;
        fix.round.deck = vec![Card::Priest];

        fix.play("a", play_card(0, target("a"), None)).unwrap();

        assert_eq!(fix.seat("a").hand, vec![Card::Priest]);
    }

    #[test]
    fn test_prince_protected_target_is_noop_but_card_consumed() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Prince, Card::Guard]);
        fix.hand("b", &[Card::Princess]);
        fix.round.seats.get_mut("b").unwrap().protected = true;

        fix.play("a", play_card(0, target("b"), None)).unwrap();

        assert_eq!(fix.seat("b").hand, vec![Card::Princess]);
        assert_eq!(fix.seat("a").hand, vec![Card::Guard]);
        assert_eq!(fix.round.discard.len(), 1);
        assert_eq!(fix.round.discard[0].card, Card::Prince);
    }

    #[test]
    fn test_prince_discarded_princess_eliminates() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Prince, Card::Guard]);
        fix.hand("b", &[Card::Princess]);
        fix.round.deck = vec![Card::Priest];

        fix.play("a", play_card(0, target("b"), None)).unwrap();

        assert!(fix.seat("b").eliminated);
        // No replacement is drawn for an eliminated victim.
        assert_eq!(fix.seat("b").hand, Vec::<Card>::new());
        assert_eq!(fix.round.deck, vec![Card::Priest]);
    }

    #[test]
    fn test_prince_with_empty_deck_skips_redraw() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Prince, Card::Guard]);
        fix.hand("b", &[Card::Baron]);

        fix.play("a", play_card(0, target("b"), None)).unwrap();

        assert!(fix.seat("b").hand.is_empty());
        assert!(!fix.seat("b").eliminated);
    }

    #[test]
    fn test_king_exchanges_hands() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::King, Card::Guard]);
        fix.hand("b", &[Card::Princess]);

        fix.play("a", play_card(0, target("b"), None)).unwrap();

        assert_eq!(fix.seat("a").hand, vec![Card::Princess]);
        assert_eq!(fix.seat("b").hand, vec![Card::Guard]);
    }

    #[test]
    fn test_countess_restricts_play_with_royal() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::King, Card::Countess]);

        let err = fix.play("a", play_card(0, target("b"), None)).unwrap_err();
        assert_eq!(err, RoomError::MustPlayCountess);
        // Rejected before the card left the hand: nothing changed.
        assert_eq!(fix.seat("a").hand, vec![Card::King, Card::Countess]);
        assert!(fix.round.discard.is_empty());

        fix.play("a", play_card(1, None, None)).unwrap();
        assert_eq!(fix.seat("a").hand, vec![Card::King]);
    }

    #[test]
    fn test_countess_gate_checked_before_index_bound() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Countess, Card::Prince]);

        let err = fix.play("a", play_card(9, None, None)).unwrap_err();
        assert_eq!(err, RoomError::MustPlayCountess);
    }

    #[test]
    fn test_countess_free_play_without_royal() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Countess, Card::Guard]);
        fix.hand("b", &[Card::Prince]);

        fix.play("a", play_card(1, target("b"), Some(5))).unwrap();
        assert!(fix.seat("b").eliminated);
    }

    #[test]
    fn test_princess_eliminates_actor() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Princess, Card::Guard]);

        fix.play("a", play_card(0, None, None)).unwrap();

        assert!(fix.seat("a").eliminated);
    }

    #[test]
    fn test_invalid_selection_leaves_hand_untouched() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Guard]);

        let err = fix.play("a", play_card(3, None, None)).unwrap_err();
        assert_eq!(err, RoomError::InvalidSelection);
        assert_eq!(fix.seat("a").hand, vec![Card::Guard]);
        assert!(fix.round.discard.is_empty());
    }

    #[test]
    fn test_unknown_actor() {
        let mut fix = Fixture::new(&["a", "b"]);
        let err = fix.play("ghost", play_card(0, None, None)).unwrap_err();
        assert_eq!(err, RoomError::UnknownActor);
    }

    #[test]
    fn test_end_last_player_standing() {
        let mut fix = Fixture::new(&["a", "b", "c"]);
        fix.round.deck = vec![Card::Guard];
        fix.round.seats.get_mut("a").unwrap().eliminated = true;
        fix.round.seats.get_mut("c").unwrap().eliminated = true;

        assert_eq!(
            fix.verdict(),
            RoundVerdict::Ended {
                winner: Some("b".to_string())
            }
        );
    }

    #[test]
    fn test_end_empty_deck_highest_card_wins() {
        let mut fix = Fixture::new(&["a", "b", "c"]);
        fix.hand("a", &[Card::Baron]);
        fix.hand("b", &[Card::King]);
        fix.hand("c", &[Card::Priest]);

        assert_eq!(
            fix.verdict(),
            RoundVerdict::Ended {
                winner: Some("b".to_string())
            }
        );
    }

    #[test]
    fn test_end_tie_goes_to_earliest_seat() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Baron]);
        fix.hand("b", &[Card::Baron]);

        assert_eq!(
            fix.verdict(),
            RoundVerdict::Ended {
                winner: Some("a".to_string())
            }
        );
    }

    #[test]
    fn test_end_continues_while_deck_holds() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Baron]);
        fix.hand("b", &[Card::King]);
        fix.round.deck = vec![Card::Guard];

        assert_eq!(fix.verdict(), RoundVerdict::Continue);
    }

    #[test]
    fn test_end_nobody_alive() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.round.seats.get_mut("a").unwrap().eliminated = true;
        fix.round.seats.get_mut("b").unwrap().eliminated = true;

        assert_eq!(fix.verdict(), RoundVerdict::Ended { winner: None });
    }

    #[test]
    fn test_view_hides_rival_hands() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Guard, Card::Baron]);
        fix.hand("b", &[Card::Princess]);

        let view = fix.view("a");
        assert_eq!(view["you"]["hand"][0]["name"], "Guard");
        assert_eq!(view["players"][1]["hand_count"], 1);
        assert_eq!(view["players"][1]["hand"], Value::Null);
        assert_eq!(view["players"][1]["is_you"], false);
        assert_eq!(view["players"][0]["is_current"], true);
    }

    #[test]
    fn test_view_for_outsider() {
        let fix = Fixture::new(&["a", "b"]);
        let view = fix.view("stranger");
        assert_eq!(view["you"], Value::Null);
        assert_eq!(view["players"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_legal_actions_guard_guess_range() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Guard, Card::Handmaid]);
        fix.hand("b", &[Card::Prince]);

        let actions = fix.actions("a");
        let options = actions.as_array().unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0]["card"]["name"], "Guard");
        assert_eq!(options[0]["targets"][0], "b");
        assert_eq!(options[0]["guess"]["min"], 2);
        assert_eq!(options[0]["guess"]["max"], 8);
        // The Handmaid needs no target.
        assert_eq!(options[1]["targets"], Value::Null);
    }

    #[test]
    fn test_legal_actions_disabled_without_targets() {
        let mut fix = Fixture::new(&["a", "b", "c"]);
        fix.hand("a", &[Card::Guard]);
        fix.round.seats.get_mut("b").unwrap().protected = true;
        fix.round.seats.get_mut("c").unwrap().eliminated = true;

        let actions = fix.actions("a");
        assert_eq!(actions[0]["disabled"], "No eligible target.");
        assert_eq!(actions[0]["targets"], Value::Null);
    }

    #[test]
    fn test_legal_actions_forced_countess() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Prince, Card::Countess]);

        let actions = fix.actions("a");
        let options = actions.as_array().unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0]["card_index"], 1);
        assert_eq!(options[0]["card"]["name"], "Countess");
    }

    #[test]
    fn test_legal_actions_prince_includes_self() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("a", &[Card::Prince]);
        fix.round.seats.get_mut("b").unwrap().protected = true;

        let actions = fix.actions("a");
        // Everyone else is shielded, but the Prince can always hit home.
        assert_eq!(actions[0]["targets"], json!(["a"]));
    }

    #[test]
    fn test_legal_actions_empty_for_non_current() {
        let mut fix = Fixture::new(&["a", "b"]);
        fix.hand("b", &[Card::Guard]);

        assert_eq!(fix.actions("b"), json!([]));
        assert_eq!(fix.actions("stranger"), json!([]));
    }

    // Engine-level scenarios exercising the resolver through a room.

    #[test]
    fn test_guard_elimination_stays_redacted_in_views() {
        let mut room = Room::with_rules("room-1".to_string(), CourtGame::seeded(5));
        for (id, name) in [("conn-a", "Alice"), ("conn-b", "Bob"), ("conn-c", "Cara")] {
            room.join(id, Some(name)).unwrap();
        }
        room.start().unwrap();

        room.round_mut().seats.get_mut("conn-a").unwrap().hand = vec![Card::Guard];
        room.round_mut().seats.get_mut("conn-b").unwrap().hand = vec![Card::Prince];

        room.act(
            "conn-a",
            &PlayCard {
                card_index: 0,
                target_id: Some("conn-b".to_string()),
                guess: Some(5),
            },
        )
        .unwrap();

        let view = room.view_for("conn-a");
        assert_eq!(view["players"][1]["eliminated"], true);
        assert_eq!(view["players"][1]["hand"], Value::Null);
        assert_eq!(view["players"][1]["hand_count"], 1);
    }

    #[test]
    fn test_king_against_protected_target_still_advances() {
        let mut room = Room::with_rules("room-1".to_string(), CourtGame::seeded(5));
        for id in ["conn-a", "conn-b", "conn-c"] {
            room.join(id, None).unwrap();
        }
        room.start().unwrap();

        room.round_mut().seats.get_mut("conn-a").unwrap().hand =
            vec![Card::King, Card::Guard];
        room.round_mut().seats.get_mut("conn-b").unwrap().hand = vec![Card::Princess];
        room.round_mut().seats.get_mut("conn-b").unwrap().protected = true;

        room.act(
            "conn-a",
            &PlayCard {
                card_index: 0,
                target_id: Some("conn-b".to_string()),
                guess: None,
            },
        )
        .unwrap();

        // Hands unchanged, the play still recorded, the turn still passed.
        assert_eq!(room.round().seats["conn-a"].hand, vec![Card::Guard]);
        assert!(room.round().seats["conn-b"]
            .hand
            .contains(&Card::Princess));
        let last = room.round().discard.last().unwrap().clone();
        assert_eq!(last.card, Card::King);
        assert_eq!(last.target, Some("conn-b".to_string()));
        assert_eq!(room.current_player.as_deref(), Some("conn-b"));
    }

    #[test]
    fn test_protection_clears_at_own_turn_start() {
        let mut room = Room::with_rules("room-1".to_string(), CourtGame::seeded(5));
        room.join("conn-a", None).unwrap();
        room.join("conn-b", None).unwrap();
        room.start().unwrap();

        room.round_mut().seats.get_mut("conn-a").unwrap().hand = vec![Card::Handmaid];
        room.act(
            "conn-a",
            &PlayCard {
                card_index: 0,
                target_id: None,
                guess: None,
            },
        )
        .unwrap();
        assert!(room.round().seats["conn-a"].protected);

        // A hostile play bounces off while the shield holds.
        room.round_mut().seats.get_mut("conn-b").unwrap().hand = vec![Card::Baron];
        room.act(
            "conn-b",
            &PlayCard {
                card_index: 0,
                target_id: Some("conn-a".to_string()),
                guess: None,
            },
        )
        .unwrap();
        assert!(!room.round().seats["conn-a"].eliminated);

        // The shield dropped the moment conn-a's own turn began.
        assert_eq!(room.current_player.as_deref(), Some("conn-a"));
        assert!(!room.round().seats["conn-a"].protected);
    }
}
