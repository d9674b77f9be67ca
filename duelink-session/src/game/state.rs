use duelink_core::{CardInfo, GameCommand, GameType, TurnOwner};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Point-in-time copy of the store, published on a watch channel after every
/// mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub turn: TurnOwner,
    pub switching: bool,
    pub phase: String,
    pub life_own: i32,
    pub life_opponent: i32,
    pub opponent_card: Option<CardInfo>,
    pub time_left: Option<u32>,
}

/// What a local phase advance did.
#[derive(Debug, PartialEq)]
pub(crate) enum PhaseOutcome {
    /// Not our turn, or a switch is already in flight.
    Ignored,
    /// Moved to this phase (also the defensive reset when the current phase
    /// is missing from the table).
    Advanced(String),
    /// Last phase reached: the turn is being passed.
    TurnPassed { timestamp: u64 },
}

/// What applying a peer command did.
#[derive(Debug, PartialEq)]
pub(crate) enum RemoteOutcome {
    Ignored,
    PhaseSet(String),
    LifeSet(i32),
    CardSet(CardInfo),
    /// A fresh pass-turn was accepted; the caller schedules the flip.
    TurnPassed,
}

/// Pure turn/phase/life logic. All delays and I/O live in the store actor;
/// everything here is a synchronous state transition.
pub(crate) struct GameState {
    game_type: GameType,
    turn: TurnOwner,
    switching: bool,
    phase: String,
    life_own: i32,
    life_opponent: i32,
    /// Explicit high-water mark for pass-turn timestamps. Anything not
    /// strictly greater is a stale duplicate and is dropped.
    last_pass_turn_ts: u64,
    opponent_card: Option<CardInfo>,
    time_limit: Option<u32>,
    time_left: Option<u32>,
}

impl GameState {
    pub(crate) fn new(game_type: GameType, turn: TurnOwner, time_limit: Option<u32>) -> Self {
        Self {
            game_type,
            turn,
            switching: false,
            phase: game_type.first_phase().to_string(),
            life_own: game_type.starting_life(),
            life_opponent: game_type.starting_life(),
            last_pass_turn_ts: 0,
            opponent_card: None,
            time_limit,
            time_left: time_limit,
        }
    }

    pub(crate) fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            turn: self.turn,
            switching: self.switching,
            phase: self.phase.clone(),
            life_own: self.life_own,
            life_opponent: self.life_opponent,
            opponent_card: self.opponent_card.clone(),
            time_left: self.time_left,
        }
    }

    pub(crate) fn game_type(&self) -> GameType {
        self.game_type
    }

    pub(crate) fn advance_phase(&mut self) -> PhaseOutcome {
        if self.turn != TurnOwner::Yours || self.switching {
            return PhaseOutcome::Ignored;
        }

        let phases = self.game_type.phases();
        match phases.iter().position(|p| *p == self.phase) {
            Some(i) if i + 1 < phases.len() => {
                self.phase = phases[i + 1].to_string();
                PhaseOutcome::Advanced(self.phase.clone())
            }
            Some(_) => {
                // Last phase: the advance becomes a turn pass.
                if self.begin_switch() {
                    PhaseOutcome::TurnPassed {
                        timestamp: self.next_pass_timestamp(),
                    }
                } else {
                    PhaseOutcome::Ignored
                }
            }
            None => {
                debug!("phase '{}' not in table, resetting", self.phase);
                self.phase = self.game_type.first_phase().to_string();
                PhaseOutcome::Advanced(self.phase.clone())
            }
        }
    }

    pub(crate) fn pass_turn(&mut self) -> Option<u64> {
        if self.turn != TurnOwner::Yours || !self.begin_switch() {
            return None;
        }
        Some(self.next_pass_timestamp())
    }

    /// Enter the switch transition. Only one may be in flight; a request
    /// while switching is ignored, not queued.
    pub(crate) fn begin_switch(&mut self) -> bool {
        if self.switching {
            return false;
        }
        self.switching = true;
        true
    }

    /// The logical flip itself: a single atomic assignment, between the two
    /// presentation delays.
    pub(crate) fn complete_switch(&mut self) {
        self.turn = self.turn.flipped();
        self.phase = self.game_type.first_phase().to_string();
        self.time_left = self.time_limit;
    }

    pub(crate) fn finish_switch(&mut self) {
        self.switching = false;
    }

    pub(crate) fn set_life(&mut self, total: i32) -> i32 {
        self.life_own = total;
        self.life_own
    }

    pub(crate) fn adjust_life(&mut self, delta: i32) -> i32 {
        self.life_own += delta;
        self.life_own
    }

    pub(crate) fn apply_remote(&mut self, cmd: GameCommand) -> RemoteOutcome {
        match cmd {
            GameCommand::PhaseUpdate(phase) => {
                // A received phase update while it is locally our turn is a
                // stale broadcast from the opponent; our own phase control
                // wins.
                if self.turn == TurnOwner::Theirs && !self.switching {
                    self.phase = phase.clone();
                    RemoteOutcome::PhaseSet(phase)
                } else {
                    RemoteOutcome::Ignored
                }
            }
            GameCommand::LpUpdate(total) => {
                self.life_opponent = total;
                RemoteOutcome::LifeSet(total)
            }
            GameCommand::CardDeclared(card) => {
                self.opponent_card = Some(card.clone());
                RemoteOutcome::CardSet(card)
            }
            GameCommand::PassTurn { timestamp } => {
                if timestamp <= self.last_pass_turn_ts {
                    debug!(
                        "stale pass-turn {timestamp} (last {})",
                        self.last_pass_turn_ts
                    );
                    return RemoteOutcome::Ignored;
                }
                self.last_pass_turn_ts = timestamp;
                if self.turn == TurnOwner::Theirs && self.begin_switch() {
                    RemoteOutcome::TurnPassed
                } else {
                    RemoteOutcome::Ignored
                }
            }
        }
    }

    /// Unix millis, forced strictly past every timestamp seen or produced so
    /// far. Event names on the relay have no cross-sender ordering, so the
    /// timestamp is the only replay defence pass-turn has.
    pub(crate) fn next_pass_timestamp(&mut self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let ts = now.max(self.last_pass_turn_ts + 1);
        self.last_pass_turn_ts = ts;
        ts
    }

    /// One-second countdown while it is our turn. Returns true when the
    /// timer just expired.
    pub(crate) fn tick_second(&mut self) -> bool {
        if self.turn != TurnOwner::Yours || self.switching {
            return false;
        }
        match self.time_left {
            Some(left) if left > 1 => {
                self.time_left = Some(left - 1);
                false
            }
            Some(left) if left == 1 => {
                self.time_left = Some(0);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yugioh_yours() -> GameState {
        GameState::new(GameType::Yugioh, TurnOwner::Yours, None)
    }

    #[test]
    fn advance_walks_the_phase_table_in_order() {
        let mut state = yugioh_yours();
        let mut seen = vec![state.snapshot().phase];
        loop {
            match state.advance_phase() {
                PhaseOutcome::Advanced(p) => seen.push(p),
                PhaseOutcome::TurnPassed { .. } => break,
                PhaseOutcome::Ignored => panic!("advance ignored mid-walk"),
            }
        }
        let expected: Vec<String> = GameType::Yugioh
            .phases()
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(seen, expected);
        assert!(state.snapshot().switching);
    }

    #[test]
    fn advance_is_ignored_on_the_opponents_turn() {
        let mut state = GameState::new(GameType::Yugioh, TurnOwner::Theirs, None);
        assert_eq!(state.advance_phase(), PhaseOutcome::Ignored);
        assert_eq!(state.snapshot().phase, "Draw Phase");
    }

    #[test]
    fn unknown_phase_resets_to_the_first_entry() {
        let mut state = yugioh_yours();
        state.phase = "Scoop Phase".to_string();
        assert_eq!(
            state.advance_phase(),
            PhaseOutcome::Advanced("Draw Phase".to_string())
        );
    }

    #[test]
    fn switch_completes_with_flip_and_phase_reset() {
        let mut state = yugioh_yours();
        assert!(state.begin_switch());
        assert!(!state.begin_switch()); // second switch ignored while in flight
        state.phase = "End Phase".to_string();
        state.complete_switch();
        state.finish_switch();

        let snap = state.snapshot();
        assert_eq!(snap.turn, TurnOwner::Theirs);
        assert_eq!(snap.phase, "Draw Phase");
        assert!(!snap.switching);
    }

    #[test]
    fn stale_pass_turn_leaves_turn_state_unchanged() {
        let mut state = GameState::new(GameType::Yugioh, TurnOwner::Theirs, None);
        assert_eq!(
            state.apply_remote(GameCommand::PassTurn { timestamp: 100 }),
            RemoteOutcome::TurnPassed
        );
        state.complete_switch();
        state.finish_switch();
        assert_eq!(state.snapshot().turn, TurnOwner::Yours);

        // Late duplicate with an older timestamp: dropped outright.
        assert_eq!(
            state.apply_remote(GameCommand::PassTurn { timestamp: 50 }),
            RemoteOutcome::Ignored
        );
        assert_eq!(state.snapshot().turn, TurnOwner::Yours);
        assert!(!state.snapshot().switching);
    }

    #[test]
    fn equal_timestamp_is_a_duplicate_too() {
        let mut state = GameState::new(GameType::Yugioh, TurnOwner::Theirs, None);
        state.apply_remote(GameCommand::PassTurn { timestamp: 100 });
        assert_eq!(
            state.apply_remote(GameCommand::PassTurn { timestamp: 100 }),
            RemoteOutcome::Ignored
        );
    }

    #[test]
    fn remote_phase_update_is_ignored_on_our_own_turn() {
        let mut state = yugioh_yours();
        assert_eq!(
            state.apply_remote(GameCommand::PhaseUpdate("Battle Phase".into())),
            RemoteOutcome::Ignored
        );
        assert_eq!(state.snapshot().phase, "Draw Phase");

        let mut state = GameState::new(GameType::Yugioh, TurnOwner::Theirs, None);
        assert_eq!(
            state.apply_remote(GameCommand::PhaseUpdate("Battle Phase".into())),
            RemoteOutcome::PhaseSet("Battle Phase".into())
        );
    }

    #[test]
    fn lp_update_sets_opponent_life_to_exactly_the_carried_value() {
        let mut state = yugioh_yours();
        state.apply_remote(GameCommand::LpUpdate(7000));
        state.apply_remote(GameCommand::LpUpdate(7000)); // duplicate is a no-op
        assert_eq!(state.snapshot().life_opponent, 7000);
        assert_eq!(state.snapshot().life_own, 8000);
    }

    #[test]
    fn pass_timestamps_are_strictly_increasing() {
        let mut state = yugioh_yours();
        let a = state.next_pass_timestamp();
        let b = state.next_pass_timestamp();
        assert!(b > a);
    }

    #[test]
    fn countdown_only_runs_on_our_stable_turn() {
        let mut state = GameState::new(GameType::Yugioh, TurnOwner::Yours, Some(2));
        assert!(!state.tick_second());
        assert!(state.tick_second()); // expired
        assert_eq!(state.snapshot().time_left, Some(0));

        let mut state = GameState::new(GameType::Yugioh, TurnOwner::Theirs, Some(2));
        assert!(!state.tick_second());
        assert_eq!(state.snapshot().time_left, Some(2));
    }
}
