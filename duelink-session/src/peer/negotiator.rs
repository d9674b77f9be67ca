use crate::bus::CommandBus;
use crate::media::LocalMedia;
use crate::peer::candidate_buffer::CandidateBuffer;
use crate::peer::connection::{PeerConnection, PeerEvent};
use crate::peer::session_event::SessionEvent;
use crate::signaling::RoomChannel;
use anyhow::Result;
use duelink_core::{ClientId, GameCommand, IceCandidateInit, SessionDescription, SignalEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;

const PEER_EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct PeerSessionConfig {
    pub ice_servers: Vec<String>,
    pub channel_label: String,
}

impl Default for PeerSessionConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![
                "stun:stun.l.google.com:19302".to_string(),
                "stun:global.stun.twilio.com:3478".to_string(),
            ],
            channel_label: "game-events".to_string(),
        }
    }
}

impl PeerSessionConfig {
    /// No STUN: loopback host candidates only. What the tests run with.
    pub fn local_only() -> Self {
        Self {
            ice_servers: vec![],
            ..Self::default()
        }
    }
}

/// One connection attempt walks `Idle → Announced → {Offering |
/// AwaitingOffer} → DescriptionSet → Connected`; `Failed` is terminal and
/// only ever reported, never recovered (recovery is a fresh join).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Idle,
    Announced,
    Offering,
    AwaitingOffer,
    DescriptionSet,
    Connected,
    Failed,
}

/// The peer session negotiator: elects the offerer, exchanges descriptions
/// and candidates over the room topic, and hands the opened data channel to
/// the command bus. Runs as one event loop over the signaling stream and the
/// transport's own events.
pub struct PeerSession {
    client_id: ClientId,
    username: String,
    signaling: Arc<dyn RoomChannel>,
    signal_rx: mpsc::Receiver<SignalEvent>,
    peer: PeerConnection,
    peer_rx: mpsc::Receiver<PeerEvent>,
    bus: CommandBus,
    events_tx: mpsc::Sender<SessionEvent>,
    shutdown_rx: mpsc::Receiver<()>,
    config: PeerSessionConfig,
    state: NegotiationState,
    buffer: CandidateBuffer,
    channel_created: bool,
    remote_username: Option<String>,
}

impl PeerSession {
    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn new(
        client_id: ClientId,
        username: String,
        signaling: Arc<dyn RoomChannel>,
        signal_rx: mpsc::Receiver<SignalEvent>,
        media: &LocalMedia,
        bus: CommandBus,
        events_tx: mpsc::Sender<SessionEvent>,
        shutdown_rx: mpsc::Receiver<()>,
        config: PeerSessionConfig,
    ) -> Result<Self> {
        let (peer_tx, peer_rx) = mpsc::channel(PEER_EVENT_CAPACITY);
        let peer = PeerConnection::new(config.ice_servers.clone(), media, peer_tx).await?;

        Ok(Self {
            client_id,
            username,
            signaling,
            signal_rx,
            peer,
            peer_rx,
            bus,
            events_tx,
            shutdown_rx,
            config,
            state: NegotiationState::Idle,
            buffer: CandidateBuffer::new(),
            channel_created: false,
            remote_username: None,
        })
    }

    pub async fn run(mut self) {
        // Announce immediately; no ack exists or is awaited.
        self.signaling
            .send(SignalEvent::Ready {
                client_id: self.client_id.clone(),
                username: self.username.clone(),
            })
            .await;
        self.state = NegotiationState::Announced;
        info!("announced as {}", self.client_id);

        loop {
            tokio::select! {
                event = self.signal_rx.recv() => {
                    match event {
                        Some(event) => self.handle_signal(event).await,
                        None => {
                            debug!("signaling stream closed, ending session loop");
                            break;
                        }
                    }
                }
                event = self.peer_rx.recv() => {
                    match event {
                        Some(event) => self.handle_peer_event(event).await,
                        None => break,
                    }
                }
                _ = self.shutdown_rx.recv() => {
                    debug!("session shutdown requested");
                    break;
                }
            }
        }

        if let Err(e) = self.peer.close().await {
            debug!("teardown close: {e:#}");
        }
        self.signaling.leave().await;
    }

    async fn handle_signal(&mut self, event: SignalEvent) {
        match event {
            SignalEvent::Ready {
                client_id,
                username,
            } => self.on_ready(client_id, username).await,
            SignalEvent::Offer { offer, username } => self.on_offer(offer, username).await,
            SignalEvent::Answer { answer, username } => self.on_answer(answer, username).await,
            SignalEvent::IceCandidate(candidate) => self.on_remote_candidate(candidate).await,
            other => match other.into_game_command() {
                Ok(cmd) => self.bus.deliver(cmd).await,
                Err(event) => debug!("unhandled signal event {event:?}"),
            },
        }
    }

    /// Initiator tie-break. Only acted on while still Idle/Announced: later
    /// `ready`s are duplicates of an election that already happened.
    async fn on_ready(&mut self, their_id: ClientId, username: String) {
        self.set_remote_username(username).await;

        if !matches!(
            self.state,
            NegotiationState::Idle | NegotiationState::Announced
        ) {
            debug!("ignoring ready from {their_id} in state {:?}", self.state);
            return;
        }

        if self.client_id.wins_tiebreak(&their_id) {
            info!("{} elected offerer against {their_id}", self.client_id);
            if let Err(e) = self.start_offer().await {
                warn!("offer setup failed: {e:#}");
                self.fail(format!("offer setup failed: {e:#}")).await;
            }
        } else {
            // Our own announcement may have gone out before the peer
            // subscribed; repeat it so both sides agree on roles.
            info!("{} awaiting offer from {their_id}", self.client_id);
            self.signaling
                .send(SignalEvent::Ready {
                    client_id: self.client_id.clone(),
                    username: self.username.clone(),
                })
                .await;
            self.state = NegotiationState::AwaitingOffer;
        }
    }

    async fn start_offer(&mut self) -> Result<()> {
        // The offerer is the only side that ever creates the channel; the
        // answerer receives it through the channel-opened event.
        if !self.channel_created {
            self.peer
                .create_data_channel(&self.config.channel_label)
                .await?;
            self.channel_created = true;
        }

        let offer = self.peer.create_offer().await?;
        self.state = NegotiationState::Offering;
        self.signaling
            .send(SignalEvent::Offer {
                offer,
                username: self.username.clone(),
            })
            .await;
        Ok(())
    }

    async fn on_offer(&mut self, offer: SessionDescription, username: String) {
        self.set_remote_username(username).await;

        if self.peer.has_remote_description().await {
            debug!("duplicate offer ignored");
            return;
        }

        if let Err(e) = self.apply_remote_description(&offer).await {
            warn!("failed to apply offer: {e:#}");
            return;
        }

        match self.peer.create_answer().await {
            Ok(answer) => {
                self.signaling
                    .send(SignalEvent::Answer {
                        answer,
                        username: self.username.clone(),
                    })
                    .await;
            }
            Err(e) => {
                warn!("failed to create answer: {e:#}");
                self.fail(format!("failed to create answer: {e:#}")).await;
            }
        }
    }

    async fn on_answer(&mut self, answer: SessionDescription, username: String) {
        self.set_remote_username(username).await;

        if self.peer.has_remote_description().await {
            debug!("duplicate answer ignored");
            return;
        }

        if let Err(e) = self.apply_remote_description(&answer).await {
            warn!("failed to apply answer: {e:#}");
        }
    }

    /// Apply a remote description and flush every candidate that arrived
    /// before it, in receipt order.
    async fn apply_remote_description(&mut self, desc: &SessionDescription) -> Result<()> {
        self.peer.set_remote_description(desc).await?;
        self.state = NegotiationState::DescriptionSet;

        for candidate in self.buffer.drain() {
            if let Err(e) = self.peer.add_ice_candidate(candidate).await {
                warn!("buffered candidate rejected: {e:#}");
            }
        }
        Ok(())
    }

    async fn on_remote_candidate(&mut self, candidate: IceCandidateInit) {
        // The buffer is drained exactly when the remote description is
        // applied, so "bypassed" and "description present" coincide.
        if let Some(candidate) = self.buffer.push(candidate) {
            if let Err(e) = self.peer.add_ice_candidate(candidate).await {
                warn!("candidate rejected: {e:#}");
            }
        }
    }

    async fn handle_peer_event(&mut self, event: PeerEvent) {
        match event {
            PeerEvent::CandidateGenerated(candidate) => {
                self.signaling
                    .send(SignalEvent::IceCandidate(candidate))
                    .await;
            }
            PeerEvent::ChannelOpen(dc) => {
                info!("data channel '{}' ready", dc.label());
                self.bus.attach_channel(dc).await;
                self.emit(SessionEvent::ChannelOpen).await;
            }
            PeerEvent::ChannelMessage(text) => match serde_json::from_str::<GameCommand>(&text) {
                Ok(cmd) => self.bus.deliver(cmd).await,
                Err(e) => debug!("undecodable data channel frame dropped: {e}"),
            },
            PeerEvent::Track(track) => {
                if self.state != NegotiationState::Connected {
                    self.state = NegotiationState::Connected;
                    info!("connected, first inbound media from {:?}", self.remote_username);
                    self.emit(SessionEvent::Connected {
                        remote_username: self.remote_username.clone(),
                    })
                    .await;
                }
                self.emit(SessionEvent::RemoteTrack(track)).await;
            }
            PeerEvent::StateChanged(state) => {
                self.emit(SessionEvent::ConnectionState(state.to_string()))
                    .await;
            }
            PeerEvent::IceStateChanged(state) => {
                self.emit(SessionEvent::ConnectionState(state.to_string()))
                    .await;
                if matches!(
                    state,
                    RTCIceConnectionState::Failed | RTCIceConnectionState::Disconnected
                ) {
                    self.fail(format!("ice state {state}")).await;
                }
            }
        }
    }

    async fn set_remote_username(&mut self, username: String) {
        if username.is_empty() || self.remote_username.as_deref() == Some(&username) {
            return;
        }
        self.remote_username = Some(username.clone());
        self.emit(SessionEvent::RemoteUsername(username)).await;
    }

    async fn fail(&mut self, reason: String) {
        warn!("session failed: {reason}");
        self.state = NegotiationState::Failed;
        self.emit(SessionEvent::Failed(reason)).await;
    }

    async fn emit(&self, event: SessionEvent) {
        if self.events_tx.send(event).await.is_err() {
            debug!("session event dropped, listener gone");
        }
    }
}
