//! Room state management.
//!
//! A room hosts one game instance: persistent player identities, the seating
//! order, the round lifecycle, and turn rotation. Everything card-specific is
//! delegated to the room's [`Ruleset`].
//!
//! All operations are synchronous and validate before mutating; callers
//! serialize access per room (the crate provides no locking).

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::state::log::EventLog;
use crate::state::ruleset::{RoundVerdict, RulesCtx, Ruleset, TurnFlow, ViewCtx};

/// Persistent identity for one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerInfo {
    pub id: String,
    pub name: String,
}

/// Result of a successful action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActOutcome {
    /// True when the action ended the round.
    pub ended: bool,
}

/// Room errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    RoomFull,
    AlreadyStarted,
    NotEnoughPlayers,
    NotStarted,
    RoundEnded,
    NotYourTurn,
    EliminatedPlayer,
    UnknownActor,
    MustPlayCountess,
    InvalidSelection,
}

impl fmt::Display for RoomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoomFull => write!(f, "Room is full"),
            Self::AlreadyStarted => write!(f, "Game has already started"),
            Self::NotEnoughPlayers => write!(f, "Not enough players to start"),
            Self::NotStarted => write!(f, "Game not started"),
            Self::RoundEnded => write!(f, "Round already ended"),
            Self::NotYourTurn => write!(f, "It's not your turn"),
            Self::EliminatedPlayer => write!(f, "Eliminated players cannot act"),
            Self::UnknownActor => write!(f, "Unknown player"),
            Self::MustPlayCountess => {
                write!(f, "The Countess must be played while holding the King or Prince")
            }
            Self::InvalidSelection => write!(f, "Invalid card selection"),
        }
    }
}

impl std::error::Error for RoomError {}

/// One game room.
pub struct Room<R: Ruleset> {
    /// Room identifier.
    pub id: String,

    /// Identities by connection id.
    players: HashMap<String, PlayerInfo>,

    /// Seating / turn rotation order. Appended on first join, filtered on
    /// leave; the insertion order of `players` is never consulted.
    order: Vec<String>,

    /// The connection whose turn it is while a round runs.
    pub current_player: Option<String>,

    /// Round lifecycle flags.
    pub started: bool,
    pub ended: bool,
    pub winner: Option<String>,

    /// Player-visible event log.
    log: EventLog,

    /// Ruleset-owned round state.
    round: R::Round,

    /// The plugged-in ruleset.
    rules: R,

    /// When the room was created.
    pub created_at: DateTime<Utc>,

    /// When the current round started.
    pub started_at: Option<DateTime<Utc>>,

    /// Last successful operation; consulted by idle reaping.
    pub last_activity: DateTime<Utc>,
}

impl<R: Ruleset + Default> Room<R> {
    /// Create an empty room with the ruleset's default configuration.
    pub fn new(id: String) -> Self {
        Self::with_rules(id, R::default())
    }
}

impl<R: Ruleset> Room<R> {
    /// Create an empty room around a specific ruleset instance.
    pub fn with_rules(id: String, rules: R) -> Self {
        let now = Utc::now();
        Self {
            id,
            players: HashMap::new(),
            order: Vec::new(),
            current_player: None,
            started: false,
            ended: false,
            winner: None,
            log: EventLog::new(),
            round: R::Round::default(),
            rules,
            created_at: now,
            started_at: None,
            last_activity: now,
        }
    }

    /// Admit a connection, or rename it if already present.
    ///
    /// Returns the joiner's redacted view. A blank name defaults to
    /// `Player-N`.
    pub fn join(&mut self, conn_id: &str, name: Option<&str>) -> Result<serde_json::Value, RoomError> {
        let is_new = !self.players.contains_key(conn_id);
        if self.started && is_new {
            return Err(RoomError::AlreadyStarted);
        }
        if is_new && self.order.len() >= self.rules.max_players() {
            return Err(RoomError::RoomFull);
        }

        let name = name.map(str::trim).filter(|n| !n.is_empty());
        if is_new {
            let name = name
                .map(String::from)
                .unwrap_or_else(|| format!("Player-{}", self.order.len() + 1));
            tracing::debug!(room = %self.id, player = %conn_id, %name, "player joined");
            self.players.insert(
                conn_id.to_string(),
                PlayerInfo {
                    id: conn_id.to_string(),
                    name,
                },
            );
            self.order.push(conn_id.to_string());
            self.rules.seat(&mut self.round, conn_id);
        } else if let Some(name) = name {
            if let Some(info) = self.players.get_mut(conn_id) {
                info.name = name.to_string();
            }
        }

        self.touch();
        Ok(self.view_for(conn_id))
    }

    /// Start a round. A finished round may be restarted without losing
    /// membership.
    pub fn start(&mut self) -> Result<(), RoomError> {
        if self.started && !self.ended {
            return Err(RoomError::AlreadyStarted);
        }
        if self.order.len() < self.rules.min_players() {
            return Err(RoomError::NotEnoughPlayers);
        }

        self.ended = false;
        self.winner = None;
        self.rules.setup(RulesCtx {
            round: &mut self.round,
            players: &self.players,
            order: &self.order,
            current_player: self.current_player.as_deref(),
            log: &mut self.log,
        });
        self.started = true;
        self.started_at = Some(Utc::now());
        self.current_player = self.order.first().cloned();
        self.rules.start_turn(RulesCtx {
            round: &mut self.round,
            players: &self.players,
            order: &self.order,
            current_player: self.current_player.as_deref(),
            log: &mut self.log,
        });
        self.touch();
        tracing::info!(room = %self.id, players = self.order.len(), "round started");
        Ok(())
    }

    /// Resolve one action by the given connection.
    pub fn act(&mut self, conn_id: &str, action: &R::Action) -> Result<ActOutcome, RoomError> {
        if !self.started {
            return Err(RoomError::NotStarted);
        }
        if self.ended {
            return Err(RoomError::RoundEnded);
        }
        if self.current_player.as_deref() != Some(conn_id) {
            return Err(RoomError::NotYourTurn);
        }
        if self.rules.is_eliminated(&self.round, conn_id) {
            return Err(RoomError::EliminatedPlayer);
        }

        let flow = self.rules.handle_action(
            RulesCtx {
                round: &mut self.round,
                players: &self.players,
                order: &self.order,
                current_player: self.current_player.as_deref(),
                log: &mut self.log,
            },
            conn_id,
            action,
        )?;

        if let RoundVerdict::Ended { winner } = self.rules.check_end(self.view_ctx()) {
            self.ended = true;
            self.started = false;
            self.winner = winner;
            self.touch();
            tracing::info!(room = %self.id, winner = ?self.winner, "round ended");
            return Ok(ActOutcome { ended: true });
        }

        if flow == TurnFlow::Advance {
            self.next_player();
        }
        self.rules.start_turn(RulesCtx {
            round: &mut self.round,
            players: &self.players,
            order: &self.order,
            current_player: self.current_player.as_deref(),
            log: &mut self.log,
        });
        self.touch();
        Ok(ActOutcome { ended: false })
    }

    /// Remove a connection from the room.
    ///
    /// If the leaver held the turn, the new head of the order takes it and
    /// immediately begins a turn. Leaving never ends the round by itself;
    /// the next turn boundary settles that.
    pub fn leave(&mut self, conn_id: &str) {
        self.players.remove(conn_id);
        self.rules.unseat(&mut self.round, conn_id);
        let was_current = self.current_player.as_deref() == Some(conn_id);
        self.order.retain(|id| id != conn_id);

        if was_current {
            self.current_player = self.order.first().cloned();
            if self.current_player.is_some() {
                self.rules.start_turn(RulesCtx {
                    round: &mut self.round,
                    players: &self.players,
                    order: &self.order,
                    current_player: self.current_player.as_deref(),
                    log: &mut self.log,
                });
            }
        }
        self.touch();
        tracing::debug!(room = %self.id, player = %conn_id, "player left");
    }

    /// The viewer's redacted view. Pure projection, no mutation.
    pub fn view_for(&self, conn_id: &str) -> serde_json::Value {
        self.rules.build_view(self.view_ctx(), conn_id)
    }

    /// The viewer's currently legal actions.
    pub fn legal_actions_for(&self, conn_id: &str) -> serde_json::Value {
        self.rules.legal_actions(self.view_ctx(), conn_id)
    }

    /// Rotate the turn to the next eligible seat, scanning at most
    /// `order.len() + 1` hops. If nothing is eligible the current
    /// assignment is left untouched.
    fn next_player(&mut self) {
        if self.order.is_empty() {
            return;
        }
        let mut idx = self
            .current_player
            .as_deref()
            .and_then(|id| self.order.iter().position(|entry| entry == id));
        for _ in 0..=self.order.len() {
            let next = match idx {
                Some(i) => (i + 1) % self.order.len(),
                None => 0,
            };
            if self.rules.is_eligible(&self.round, &self.order[next]) {
                self.current_player = Some(self.order[next].clone());
                return;
            }
            idx = Some(next);
        }
    }

    fn view_ctx(&self) -> ViewCtx<'_, R::Round> {
        ViewCtx {
            round: &self.round,
            players: &self.players,
            order: &self.order,
            current_player: self.current_player.as_deref(),
            started: self.started,
            ended: self.ended,
            winner: self.winner.as_deref(),
            room_id: &self.id,
            log: &self.log,
        }
    }

    fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// Get a player's identity.
    pub fn get_player(&self, conn_id: &str) -> Option<&PlayerInfo> {
        self.players.get(conn_id)
    }

    /// Check if a connection is a member.
    pub fn has_player(&self, conn_id: &str) -> bool {
        self.players.contains_key(conn_id)
    }

    /// All identities, unordered.
    pub fn players(&self) -> impl Iterator<Item = &PlayerInfo> {
        self.players.values()
    }

    /// Connection ids in seating order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Member count.
    pub fn player_count(&self) -> usize {
        self.order.len()
    }

    /// The ruleset-owned round state.
    pub fn round(&self) -> &R::Round {
        &self.round
    }

    /// Mutable round state, for tooling and tests.
    pub fn round_mut(&mut self) -> &mut R::Round {
        &mut self.round
    }

    /// The player-visible event log.
    pub fn log(&self) -> &EventLog {
        &self.log
    }
}

/// Room registry - all live rooms, created lazily on first reference.
pub struct RoomRegistry<R: Ruleset> {
    rooms: HashMap<String, Room<R>>,
}

impl<R: Ruleset> Default for RoomRegistry<R> {
    fn default() -> Self {
        Self {
            rooms: HashMap::new(),
        }
    }
}

impl<R: Ruleset + Default> RoomRegistry<R> {
    /// Get a room, creating it on first reference.
    pub fn find_or_create(&mut self, room_id: &str) -> &mut Room<R> {
        self.rooms.entry(room_id.to_string()).or_insert_with(|| {
            tracing::debug!(room = %room_id, "room created");
            Room::new(room_id.to_string())
        })
    }
}

impl<R: Ruleset> RoomRegistry<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a room by id.
    pub fn get(&self, room_id: &str) -> Option<&Room<R>> {
        self.rooms.get(room_id)
    }

    /// Get a mutable room by id.
    pub fn get_mut(&mut self, room_id: &str) -> Option<&mut Room<R>> {
        self.rooms.get_mut(room_id)
    }

    /// Remove a room entirely.
    pub fn remove(&mut self, room_id: &str) -> Option<Room<R>> {
        self.rooms.remove(room_id)
    }

    /// Remove a connection from every room it occupies.
    ///
    /// Returns the affected room ids so the transport can re-broadcast.
    pub fn disconnect(&mut self, conn_id: &str) -> Vec<String> {
        let affected: Vec<String> = self
            .rooms
            .iter()
            .filter(|(_, room)| room.has_player(conn_id))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &affected {
            if let Some(room) = self.rooms.get_mut(id) {
                room.leave(conn_id);
            }
        }
        affected
    }

    /// Evict rooms with no activity for longer than `max_idle`.
    pub fn cleanup_idle(&mut self, max_idle: chrono::Duration) -> Vec<String> {
        let now = Utc::now();
        let idle: Vec<String> = self
            .rooms
            .iter()
            .filter(|(_, room)| now - room.last_activity > max_idle)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &idle {
            self.rooms.remove(id);
            tracing::info!(room = %id, "idle room evicted");
        }
        idle
    }

    /// Count rooms.
    pub fn count(&self) -> usize {
        self.rooms.len()
    }

    /// All room ids.
    pub fn room_ids(&self) -> impl Iterator<Item = &String> {
        self.rooms.keys()
    }
}
