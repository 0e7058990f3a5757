use crate::error::{ClientError, Result};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, trace};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Events from the transport task to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// WebSocket handshake finished
    Opened,
    /// A text line was received
    Message(String),
    /// The connection failed; a `Closed` event follows
    Error(String),
    /// The connection is gone. Always the last event.
    Closed,
}

/// Commands from the client to the transport task
#[derive(Debug, Clone)]
enum TransportCommand {
    Send(String),
    Close,
}

/// Client side of one running transport task.
pub struct Connection {
    command_tx: mpsc::UnboundedSender<TransportCommand>,
    event_rx: mpsc::Receiver<TransportEvent>,
}

impl Connection {
    pub fn send(&self, text: String) -> Result<()> {
        self.command_tx
            .send(TransportCommand::Send(text))
            .map_err(|_| ClientError::ChannelClosed)
    }

    /// Asks the task to perform a graceful close.
    pub fn close(&self) -> Result<()> {
        self.command_tx
            .send(TransportCommand::Close)
            .map_err(|_| ClientError::ChannelClosed)
    }

    /// Next event, or `None` once the task has exited.
    pub async fn recv(&mut self) -> Option<TransportEvent> {
        self.event_rx.recv().await
    }
}

/// Builds the handshake request for `endpoint`, rejecting anything that is
/// not a `ws://` or `wss://` URL with a host.
pub fn request(endpoint: &str) -> Result<Request> {
    let request = endpoint
        .into_client_request()
        .map_err(|e| ClientError::Setup(e.to_string()))?;

    match request.uri().scheme_str() {
        Some("ws") | Some("wss") => Ok(request),
        other => Err(ClientError::Setup(format!(
            "unsupported URL scheme {:?} in {}",
            other.unwrap_or(""),
            endpoint
        ))),
    }
}

/// Spawns the transport task. The event channel exists before the task
/// starts, so the first event cannot be missed.
///
/// Must be called from within a tokio runtime.
pub fn open(request: Request) -> Connection {
    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let (command_tx, command_rx) = mpsc::unbounded_channel();

    tokio::spawn(run(request, command_rx, event_tx));

    Connection {
        command_tx,
        event_rx,
    }
}

async fn run(
    request: Request,
    command_rx: mpsc::UnboundedReceiver<TransportCommand>,
    event_tx: mpsc::Sender<TransportEvent>,
) {
    let uri = request.uri().to_string();

    if let Err(e) = connect_and_stream(request, command_rx, &event_tx).await {
        error!("WebSocket connection to {} failed: {}", uri, e);
        let _ = event_tx.send(TransportEvent::Error(e.to_string())).await;
    }

    info!("WebSocket connection to {} closed", uri);
    let _ = event_tx.send(TransportEvent::Closed).await;
}

async fn connect_and_stream(
    request: Request,
    mut command_rx: mpsc::UnboundedReceiver<TransportCommand>,
    event_tx: &mpsc::Sender<TransportEvent>,
) -> Result<()> {
    let (ws, _response) = connect_async(request).await?;
    debug!("WebSocket handshake complete");

    if event_tx.send(TransportEvent::Opened).await.is_err() {
        return Ok(());
    }

    let (mut writer, mut reader) = ws.split();
    let mut closing = false;

    loop {
        tokio::select! {
            command = command_rx.recv(), if !closing => {
                match command {
                    Some(TransportCommand::Send(text)) => {
                        trace!("Sending {} byte text frame", text.len());
                        writer.send(Message::Text(text)).await?;
                    }
                    // Dropped handle counts as a close request
                    Some(TransportCommand::Close) | None => {
                        debug!("Closing WebSocket connection");
                        closing = true;
                        writer.close().await?;
                    }
                }
            }

            frame = reader.next() => {
                let line = match frame {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Binary(bytes))) => String::from_utf8_lossy(&bytes).into_owned(),
                    Some(Ok(Message::Close(frame))) => {
                        debug!("Received close frame: {:?}", frame);
                        continue;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(WsError::ConnectionClosed)) | Some(Err(WsError::AlreadyClosed)) | None => break,
                    Some(Err(e)) => return Err(e.into()),
                };

                if closing {
                    trace!("Dropping message received while closing");
                    continue;
                }

                if event_tx.send(TransportEvent::Message(line)).await.is_err() {
                    break;
                }
            }
        }
    }

    Ok(())
}
