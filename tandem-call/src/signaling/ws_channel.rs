use crate::error::SignalingError;
use crate::signaling::channel::SignalingChannel;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tandem_core::model::{ClientEnvelope, ClientEvent, RoomName, ServerEnvelope, ServerEvent};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};

/// WebSocket client end of a relay. Outbound events are JSON envelopes
/// written by a dedicated writer task; inbound text frames are decoded
/// leniently and anything unrecognized is logged and dropped rather
/// than surfaced.
pub struct WsChannel {
    out_tx: mpsc::UnboundedSender<Message>,
}

impl WsChannel {
    pub async fn connect(
        url: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ServerEvent>), SignalingError> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| SignalingError::Transport(e.to_string()))?;
        info!("Connected to relay at {}", url);

        let (mut sink, mut source) = stream.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                if sink.send(msg).await.is_err() {
                    break;
                }
            }
        });

        tokio::spawn(async move {
            while let Some(Ok(msg)) = source.next().await {
                match msg {
                    Message::Text(text) => match ServerEnvelope::decode(&text) {
                        Ok(envelope) => {
                            if event_tx.send(envelope.event).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Ignoring unrecognized relay payload: {}", e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            info!("Relay connection closed");
        });

        Ok((Self { out_tx }, event_rx))
    }
}

#[async_trait]
impl SignalingChannel for WsChannel {
    async fn send(&self, room: &RoomName, event: ClientEvent) -> Result<(), SignalingError> {
        let text = ClientEnvelope::new(room.clone(), event).encode()?;
        self.out_tx
            .send(Message::Text(text.into()))
            .map_err(|_| SignalingError::Closed)
    }
}
