use crate::media::LocalMedia;
use anyhow::{Context, Result};
use duelink_core::{IceCandidateInit, SdpKind, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::track::track_remote::TrackRemote;

/// Events the transport pushes into the negotiator's select loop.
pub(crate) enum PeerEvent {
    CandidateGenerated(IceCandidateInit),
    ChannelOpen(Arc<RTCDataChannel>),
    ChannelMessage(String),
    Track(Arc<TrackRemote>),
    StateChanged(RTCPeerConnectionState),
    IceStateChanged(RTCIceConnectionState),
}

/// Thin wrapper around `RTCPeerConnection` that turns its callback soup into
/// a single mpsc of [`PeerEvent`]s, the same shape the negotiator's event
/// loop consumes for signaling traffic.
pub(crate) struct PeerConnection {
    pc: Arc<RTCPeerConnection>,
    event_tx: mpsc::Sender<PeerEvent>,
}

impl PeerConnection {
    pub(crate) async fn new(
        ice_servers: Vec<String>,
        media: &LocalMedia,
        event_tx: mpsc::Sender<PeerEvent>,
    ) -> Result<Self> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let ice_servers = if ice_servers.is_empty() {
            vec![]
        } else {
            vec![RTCIceServer {
                urls: ice_servers,
                ..Default::default()
            }]
        };

        let pc = Arc::new(
            api.new_peer_connection(RTCConfiguration {
                ice_servers,
                ..Default::default()
            })
            .await
            .context("failed to create peer connection")?,
        );

        for track in media.tracks() {
            pc.add_track(Arc::clone(track))
                .await
                .context("failed to attach local track")?;
        }

        let state_tx = event_tx.clone();
        pc.on_peer_connection_state_change(Box::new(move |state: RTCPeerConnectionState| {
            let tx = state_tx.clone();
            Box::pin(async move {
                let _ = tx.send(PeerEvent::StateChanged(state)).await;
            })
        }));

        let ice_state_tx = event_tx.clone();
        pc.on_ice_connection_state_change(Box::new(move |state: RTCIceConnectionState| {
            let tx = ice_state_tx.clone();
            Box::pin(async move {
                let _ = tx.send(PeerEvent::IceStateChanged(state)).await;
            })
        }));

        // Trickle ICE: every locally discovered candidate is handed to the
        // negotiator as it appears, no batching.
        let cand_tx = event_tx.clone();
        pc.on_ice_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
            let tx = cand_tx.clone();
            Box::pin(async move {
                let Some(candidate) = candidate else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let _ = tx
                    .send(PeerEvent::CandidateGenerated(from_rtc_init(init)))
                    .await;
            })
        }));

        // Answerer side: the channel arrives from the offerer.
        let dc_tx = event_tx.clone();
        pc.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let tx = dc_tx.clone();
            Box::pin(async move {
                debug!("inbound data channel '{}'", dc.label());
                wire_channel(&dc, tx);
            })
        }));

        let track_tx = event_tx.clone();
        pc.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();
                Box::pin(async move {
                    let _ = tx.send(PeerEvent::Track(track)).await;
                })
            },
        ));

        Ok(Self { pc, event_tx })
    }

    /// Offerer side only: create the reliable data channel before building
    /// the offer, so it is negotiated into the session.
    pub(crate) async fn create_data_channel(&self, label: &str) -> Result<Arc<RTCDataChannel>> {
        let dc = self
            .pc
            .create_data_channel(label, None)
            .await
            .context("failed to create data channel")?;
        wire_channel(&dc, self.event_tx.clone());
        Ok(dc)
    }

    pub(crate) async fn create_offer(&self) -> Result<SessionDescription> {
        let offer = self
            .pc
            .create_offer(None)
            .await
            .context("failed to create offer")?;
        self.pc
            .set_local_description(offer.clone())
            .await
            .context("failed to apply local offer")?;
        Ok(SessionDescription {
            kind: SdpKind::Offer,
            sdp: offer.sdp,
        })
    }

    pub(crate) async fn create_answer(&self) -> Result<SessionDescription> {
        let answer = self
            .pc
            .create_answer(None)
            .await
            .context("failed to create answer")?;
        self.pc
            .set_local_description(answer.clone())
            .await
            .context("failed to apply local answer")?;
        Ok(SessionDescription {
            kind: SdpKind::Answer,
            sdp: answer.sdp,
        })
    }

    pub(crate) async fn set_remote_description(&self, desc: &SessionDescription) -> Result<()> {
        let rtc_desc = match desc.kind {
            SdpKind::Offer => RTCSessionDescription::offer(desc.sdp.clone())?,
            SdpKind::Answer => RTCSessionDescription::answer(desc.sdp.clone())?,
        };
        self.pc
            .set_remote_description(rtc_desc)
            .await
            .context("failed to apply remote description")?;
        Ok(())
    }

    pub(crate) async fn has_remote_description(&self) -> bool {
        self.pc.remote_description().await.is_some()
    }

    pub(crate) async fn add_ice_candidate(&self, candidate: IceCandidateInit) -> Result<()> {
        self.pc
            .add_ice_candidate(to_rtc_init(candidate))
            .await
            .context("failed to add ICE candidate")?;
        Ok(())
    }

    pub(crate) async fn close(&self) -> Result<()> {
        self.pc.close().await.context("failed to close connection")
    }
}

/// Install open/message handlers on a data channel, whichever side produced
/// it. The open event carries the channel itself so the command bus can take
/// ownership of the send half.
fn wire_channel(dc: &Arc<RTCDataChannel>, event_tx: mpsc::Sender<PeerEvent>) {
    let open_tx = event_tx.clone();
    let dc_for_open = Arc::clone(dc);
    dc.on_open(Box::new(move || {
        let tx = open_tx.clone();
        let dc = Arc::clone(&dc_for_open);
        Box::pin(async move {
            debug!("data channel '{}' open", dc.label());
            let _ = tx.send(PeerEvent::ChannelOpen(dc)).await;
        })
    }));

    let msg_tx = event_tx;
    dc.on_message(Box::new(move |msg: DataChannelMessage| {
        let tx = msg_tx.clone();
        Box::pin(async move {
            match String::from_utf8(msg.data.to_vec()) {
                Ok(text) => {
                    let _ = tx.send(PeerEvent::ChannelMessage(text)).await;
                }
                Err(_) => debug!("dropping non-utf8 data channel frame"),
            }
        })
    }));
}

fn from_rtc_init(init: RTCIceCandidateInit) -> IceCandidateInit {
    IceCandidateInit {
        candidate: init.candidate,
        sdp_mid: init.sdp_mid,
        sdp_mline_index: init.sdp_mline_index,
        username_fragment: init.username_fragment,
    }
}

fn to_rtc_init(init: IceCandidateInit) -> RTCIceCandidateInit {
    RTCIceCandidateInit {
        candidate: init.candidate,
        sdp_mid: init.sdp_mid,
        sdp_mline_index: init.sdp_mline_index,
        username_fragment: init.username_fragment,
    }
}
