use crate::bus::CommandBus;
use crate::game::state::{GameState, PhaseOutcome, RemoteOutcome};
use crate::game::GameSnapshot;
use duelink_core::{CardInfo, GameCommand, GameType, TurnOwner};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, sleep};
use tracing::{debug, info};

const ACTION_CAPACITY: usize = 32;

/// Local user intents, fed in by the embedding UI.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AdvancePhase,
    PassTurn,
    SetLife(i32),
    AdjustLife(i32),
    DeclareCard(CardInfo),
}

#[derive(Debug, Clone)]
pub struct GameStoreConfig {
    /// Presentation delay before the logical turn flip.
    pub pre_flip_delay: Duration,
    /// Presentation delay after the flip, before the switch guard clears.
    pub post_flip_delay: Duration,
    /// Delay before rebroadcasting the canonical opening phase after an
    /// accepted pass-turn.
    pub opening_rebroadcast_delay: Duration,
    /// Per-turn countdown in seconds, from the room settings.
    pub turn_time_limit: Option<u32>,
}

impl Default for GameStoreConfig {
    fn default() -> Self {
        Self {
            pre_flip_delay: Duration::from_millis(600),
            post_flip_delay: Duration::from_millis(600),
            opening_rebroadcast_delay: Duration::from_millis(300),
            turn_time_limit: None,
        }
    }
}

impl GameStoreConfig {
    /// Zero presentation delays. What the tests run with.
    pub fn instant() -> Self {
        Self {
            pre_flip_delay: Duration::ZERO,
            post_flip_delay: Duration::ZERO,
            opening_rebroadcast_delay: Duration::ZERO,
            turn_time_limit: None,
        }
    }
}

/// Internal timer messages; the two-stage switch and the opening-phase
/// rebroadcast are sleeps that post back into the same event loop.
enum Tick {
    Flip { rebroadcast: bool },
    ClearSwitching,
    RebroadcastOpening,
}

/// Owns the [`GameState`] and serializes every mutation — local actions,
/// inbound peer commands, and timer ticks — through one select loop, the
/// event-driven equivalent of the single UI thread the protocol assumes.
pub struct GameStore {
    state: GameState,
    bus: CommandBus,
    actions_rx: mpsc::Receiver<Action>,
    inbound_rx: mpsc::Receiver<GameCommand>,
    ticks_tx: mpsc::Sender<Tick>,
    ticks_rx: mpsc::Receiver<Tick>,
    watch_tx: watch::Sender<GameSnapshot>,
    config: GameStoreConfig,
}

impl GameStore {
    /// Spawn the store loop; returns the action handle and the snapshot
    /// watch.
    pub fn spawn(
        game_type: GameType,
        starting_turn: TurnOwner,
        bus: CommandBus,
        inbound_rx: mpsc::Receiver<GameCommand>,
        config: GameStoreConfig,
    ) -> (mpsc::Sender<Action>, watch::Receiver<GameSnapshot>) {
        let state = GameState::new(game_type, starting_turn, config.turn_time_limit);
        let (actions_tx, actions_rx) = mpsc::channel(ACTION_CAPACITY);
        let (ticks_tx, ticks_rx) = mpsc::channel(ACTION_CAPACITY);
        let (watch_tx, watch_rx) = watch::channel(state.snapshot());

        let store = Self {
            state,
            bus,
            actions_rx,
            inbound_rx,
            ticks_tx,
            ticks_rx,
            watch_tx,
            config,
        };
        tokio::spawn(store.run());

        (actions_tx, watch_rx)
    }

    async fn run(mut self) {
        let mut countdown = interval(Duration::from_secs(1));
        countdown.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                action = self.actions_rx.recv() => {
                    match action {
                        Some(action) => self.handle_action(action).await,
                        None => {
                            debug!("action handle dropped, store loop ending");
                            break;
                        }
                    }
                }
                cmd = self.inbound_rx.recv() => {
                    match cmd {
                        Some(cmd) => self.handle_remote(cmd).await,
                        None => break,
                    }
                }
                Some(tick) = self.ticks_rx.recv() => {
                    self.handle_tick(tick).await;
                }
                _ = countdown.tick() => {
                    if self.state.tick_second() {
                        info!("turn timer expired, passing turn");
                        self.publish();
                        self.handle_action(Action::PassTurn).await;
                    } else {
                        self.publish();
                    }
                }
            }
        }
    }

    async fn handle_action(&mut self, action: Action) {
        match action {
            Action::AdvancePhase => match self.state.advance_phase() {
                PhaseOutcome::Advanced(phase) => {
                    self.publish();
                    self.bus.send(GameCommand::PhaseUpdate(phase)).await;
                }
                PhaseOutcome::TurnPassed { timestamp } => {
                    self.publish();
                    self.bus.send(GameCommand::PassTurn { timestamp }).await;
                    self.schedule_flip(false);
                }
                PhaseOutcome::Ignored => {}
            },
            Action::PassTurn => {
                if let Some(timestamp) = self.state.pass_turn() {
                    self.publish();
                    self.bus.send(GameCommand::PassTurn { timestamp }).await;
                    self.schedule_flip(false);
                }
            }
            Action::SetLife(total) => {
                let total = self.state.set_life(total);
                self.publish();
                self.bus.send(GameCommand::LpUpdate(total)).await;
            }
            Action::AdjustLife(delta) => {
                let total = self.state.adjust_life(delta);
                self.publish();
                self.bus.send(GameCommand::LpUpdate(total)).await;
            }
            Action::DeclareCard(card) => {
                self.bus.send(GameCommand::CardDeclared(card)).await;
            }
        }
    }

    async fn handle_remote(&mut self, cmd: GameCommand) {
        match self.state.apply_remote(cmd) {
            RemoteOutcome::PhaseSet(_)
            | RemoteOutcome::LifeSet(_)
            | RemoteOutcome::CardSet(_) => self.publish(),
            RemoteOutcome::TurnPassed => {
                self.publish();
                // The rebroadcast after the flip re-asserts the canonical
                // opening phase, converging both sides even if the resets
                // raced.
                self.schedule_flip(true);
            }
            RemoteOutcome::Ignored => {}
        }
    }

    async fn handle_tick(&mut self, tick: Tick) {
        match tick {
            Tick::Flip { rebroadcast } => {
                self.state.complete_switch();
                self.publish();
                self.schedule(Tick::ClearSwitching, self.config.post_flip_delay);
                if rebroadcast {
                    self.schedule(
                        Tick::RebroadcastOpening,
                        self.config.opening_rebroadcast_delay,
                    );
                }
            }
            Tick::ClearSwitching => {
                self.state.finish_switch();
                self.publish();
            }
            Tick::RebroadcastOpening => {
                let opening = self.state.game_type().first_phase().to_string();
                self.bus.send(GameCommand::PhaseUpdate(opening)).await;
            }
        }
    }

    fn schedule_flip(&self, rebroadcast: bool) {
        self.schedule(Tick::Flip { rebroadcast }, self.config.pre_flip_delay);
    }

    fn schedule(&self, tick: Tick, delay: Duration) {
        let ticks = self.ticks_tx.clone();
        tokio::spawn(async move {
            sleep(delay).await;
            let _ = ticks.send(tick).await;
        });
    }

    fn publish(&self) {
        self.watch_tx.send_replace(self.state.snapshot());
    }
}
