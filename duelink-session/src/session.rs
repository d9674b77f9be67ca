use crate::bus::CommandBus;
use crate::error::SessionError;
use crate::game::{Action, GameSnapshot, GameStore, GameStoreConfig};
use crate::media::LocalMedia;
use crate::peer::{PeerSession, PeerSessionConfig, SessionEvent};
use crate::signaling::RoomChannel;
use duelink_core::{ClientId, GameType, SignalEvent, TurnOwner};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

const SESSION_EVENT_CAPACITY: usize = 64;

/// Who this client is inside the room. The id is regenerated per process;
/// it exists only for the initiator tie-break.
#[derive(Debug, Clone)]
pub struct LocalIdentity {
    pub client_id: ClientId,
    pub username: String,
}

impl LocalIdentity {
    pub fn generate(username: impl Into<String>) -> Self {
        Self {
            client_id: ClientId::generate(),
            username: username.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameSessionConfig {
    pub peer: PeerSessionConfig,
    pub store: GameStoreConfig,
    pub game_type: GameType,
    /// Who takes the first turn; the original app settles this with a dice
    /// roll before the game view opens.
    pub starting_turn: TurnOwner,
}

impl Default for GameSessionConfig {
    fn default() -> Self {
        Self {
            peer: PeerSessionConfig::default(),
            store: GameStoreConfig::default(),
            game_type: GameType::Yugioh,
            starting_turn: TurnOwner::Yours,
        }
    }
}

/// A fully wired client session: negotiator, dual-transport command bus and
/// game store, assembled over one joined room channel. Everything the
/// embedding UI touches is a channel endpoint; there is no shared mutable
/// context.
pub struct GameSession {
    /// Local user intents.
    pub actions: mpsc::Sender<Action>,
    /// Latest game snapshot after every mutation.
    pub state: watch::Receiver<GameSnapshot>,
    /// Connection lifecycle events.
    pub events: mpsc::Receiver<SessionEvent>,
    shutdown_tx: mpsc::Sender<()>,
}

impl GameSession {
    /// Join a game on an already subscribed room channel. `signal_rx` is the
    /// inbound event stream returned by the relay's join.
    pub async fn connect(
        identity: LocalIdentity,
        signaling: Arc<dyn RoomChannel>,
        signal_rx: mpsc::Receiver<SignalEvent>,
        media: LocalMedia,
        config: GameSessionConfig,
    ) -> Result<Self, SessionError> {
        let (bus, inbound_rx) = CommandBus::new(Arc::clone(&signaling));
        let (events_tx, events_rx) = mpsc::channel(SESSION_EVENT_CAPACITY);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let negotiator = PeerSession::new(
            identity.client_id,
            identity.username,
            signaling,
            signal_rx,
            &media,
            bus.clone(),
            events_tx,
            shutdown_rx,
            config.peer,
        )
        .await?;
        tokio::spawn(negotiator.run());

        let (actions, state) = GameStore::spawn(
            config.game_type,
            config.starting_turn,
            bus,
            inbound_rx,
            config.store,
        );

        Ok(Self {
            actions,
            state,
            events: events_rx,
            shutdown_tx,
        })
    }

    /// Tear the session down: closes the peer transport and leaves the room
    /// topic. In-flight sends are not cancelled, only ignored.
    pub async fn leave(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}
