//! sway/i3 IPC adapter over a UNIX domain socket.
//!
//! # Streaming protocol
//!
//! A UNIX stream socket, like TCP, is a *stream*: a single `read()` may
//! return part of a frame or several frames at once.  Request/reply traffic
//! sidesteps this by reading exactly one header and then exactly one payload
//! ([`read_frame`]).  The event connection buffers bytes and calls
//! [`decode_message`] in a loop until it reports `InsufficientData`
//! ([`forward_events`]).
//!
//! # Socket discovery
//!
//! [`resolve_socket_path`] picks the configured `ipc.socket_path` (which the
//! `--socket` flag overrides), else `$SWAYSOCK`, else `$I3SOCK`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use tabletmap_core::protocol::{
    decode_event, decode_message, encode_json, encode_message, parse_payload, CommandOutcome,
    EventKind, InputReply, IpcMessage, MessageType, NodeReply, PayloadKind, ProtocolError,
    SubscribeReply, VersionReply, HEADER_SIZE,
};
use tabletmap_core::{CompositorEvent, InputDescriptor, WindowNode};

use super::{CompositorIpc, IpcError};

/// Size of each `read()` on the event connection.
const READ_CHUNK: usize = 4096;

// ── Socket discovery ──────────────────────────────────────────────────────────

/// Picks the compositor socket path.
///
/// # Errors
///
/// Returns [`IpcError::SocketNotFound`] when no source yields a path.
pub fn resolve_socket_path(configured: Option<&Path>) -> Result<PathBuf, IpcError> {
    resolve_socket_path_with(configured, |name| std::env::var_os(name))
}

fn resolve_socket_path_with(
    configured: Option<&Path>,
    env: impl Fn(&str) -> Option<OsString>,
) -> Result<PathBuf, IpcError> {
    let from_env = |name: &str| env(name).filter(|v| !v.is_empty()).map(PathBuf::from);

    configured
        .map(Path::to_path_buf)
        .or_else(|| from_env("SWAYSOCK"))
        .or_else(|| from_env("I3SOCK"))
        .ok_or(IpcError::SocketNotFound)
}

// ── Adapter ───────────────────────────────────────────────────────────────────

/// A connection to a running sway (or i3) instance.
///
/// The command connection sits behind a `tokio::sync::Mutex` so that a
/// request and its reply are never interleaved with another request, while
/// the trait methods still take `&self`.
pub struct SwayIpc {
    socket_path: PathBuf,
    commands: Mutex<UnixStream>,
    channel_capacity: usize,
}

impl SwayIpc {
    /// Opens the command connection to the socket at `socket_path`.
    ///
    /// `channel_capacity` bounds the event channel returned by
    /// [`CompositorIpc::subscribe`].
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::Connect`] if the socket cannot be reached (the
    /// compositor is not running, or the path is stale).
    pub async fn connect(
        socket_path: impl Into<PathBuf>,
        channel_capacity: usize,
    ) -> Result<Self, IpcError> {
        let socket_path = socket_path.into();
        let stream = open(&socket_path).await?;
        info!("connected to compositor at {}", socket_path.display());

        Ok(Self {
            socket_path,
            commands: Mutex::new(stream),
            channel_capacity: channel_capacity.max(1),
        })
    }

    /// Asks the compositor for its version.
    pub async fn version(&self) -> Result<VersionReply, IpcError> {
        let payload = self.request(MessageType::GetVersion, b"").await?;
        Ok(parse_payload(&payload)?)
    }

    /// Sends one request on the command connection and returns the reply body.
    async fn request(&self, msg_type: MessageType, payload: &[u8]) -> Result<Vec<u8>, IpcError> {
        let mut stream = self.commands.lock().await;
        stream.write_all(&encode_message(msg_type, payload)).await?;
        let reply = read_frame(&mut *stream).await?;
        expect_reply(msg_type, reply)
    }
}

#[async_trait]
impl CompositorIpc for SwayIpc {
    async fn get_tree(&self) -> Result<WindowNode, IpcError> {
        let payload = self.request(MessageType::GetTree, b"").await?;
        let root: NodeReply = parse_payload(&payload)?;
        Ok(root.into_window_node())
    }

    async fn get_inputs(&self) -> Result<Vec<InputDescriptor>, IpcError> {
        let payload = self.request(MessageType::GetInputs, b"").await?;
        let inputs: Vec<InputReply> = parse_payload(&payload)?;
        Ok(inputs.into_iter().map(InputDescriptor::from).collect())
    }

    async fn run_command(&self, command: &str) -> Result<(), IpcError> {
        debug!("run_command: {command}");
        let payload = self.request(MessageType::RunCommand, command.as_bytes()).await?;
        let outcomes: Vec<CommandOutcome> = parse_payload(&payload)?;

        match outcomes.into_iter().find(|o| !o.success) {
            None => Ok(()),
            Some(failed) => Err(IpcError::CommandFailed(
                failed.error.unwrap_or_else(|| "unknown error".to_string()),
            )),
        }
    }

    async fn subscribe(
        &self,
        kinds: &[EventKind],
    ) -> Result<mpsc::Receiver<CompositorEvent>, IpcError> {
        let mut stream = open(&self.socket_path).await?;

        let names: Vec<&str> = kinds.iter().map(|k| k.name()).collect();
        stream
            .write_all(&encode_json(MessageType::Subscribe, &names)?)
            .await?;

        // The reply precedes every event on this connection.
        let reply = expect_reply(MessageType::Subscribe, read_frame(&mut stream).await?)?;
        let reply: SubscribeReply = parse_payload(&reply)?;
        if !reply.success {
            return Err(IpcError::SubscribeRejected(kinds.to_vec()));
        }
        info!("subscribed to {names:?} events");

        let (tx, rx) = mpsc::channel(self.channel_capacity);
        tokio::spawn(forward_events(stream, tx));
        Ok(rx)
    }
}

// ── Frame I/O ─────────────────────────────────────────────────────────────────

async fn open(path: &Path) -> Result<UnixStream, IpcError> {
    UnixStream::connect(path)
        .await
        .map_err(|source| IpcError::Connect {
            path: path.to_path_buf(),
            source,
        })
}

/// Reads exactly one frame: the header first, then the payload it declares.
///
/// # Errors
///
/// Returns [`IpcError::Closed`] on EOF, [`IpcError::Io`] on other read
/// failures, and [`IpcError::Protocol`] for a malformed header.
pub(crate) async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<IpcMessage, IpcError> {
    let mut buf = vec![0u8; HEADER_SIZE];
    read_exact_or_closed(reader, &mut buf).await?;

    loop {
        match decode_message(&buf) {
            Ok((msg, _)) => return Ok(msg),
            Err(ProtocolError::InsufficientData { needed, .. }) => {
                let start = buf.len();
                buf.resize(needed, 0);
                read_exact_or_closed(reader, &mut buf[start..]).await?;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

async fn read_exact_or_closed<R: AsyncRead + Unpin>(
    reader: &mut R,
    buf: &mut [u8],
) -> Result<(), IpcError> {
    match reader.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(IpcError::Closed),
        Err(e) => Err(e.into()),
    }
}

fn expect_reply(expected: MessageType, msg: IpcMessage) -> Result<Vec<u8>, IpcError> {
    match msg.kind {
        PayloadKind::Reply(got) if got == expected => Ok(msg.payload),
        got => Err(IpcError::UnexpectedReply { expected, got }),
    }
}

/// Reads event frames from a subscribed connection and forwards the ones the
/// daemon cares about.
///
/// Returns when the compositor closes the connection, a frame cannot be
/// decoded, or the receiving side of `tx` is dropped.  Returning drops `tx`,
/// which closes the event channel.
pub(crate) async fn forward_events<R: AsyncRead + Unpin>(
    mut reader: R,
    tx: mpsc::Sender<CompositorEvent>,
) {
    let mut recv_buf: Vec<u8> = Vec::with_capacity(READ_CHUNK);
    let mut read_tmp = vec![0u8; READ_CHUNK];

    loop {
        let n = match reader.read(&mut read_tmp).await {
            Ok(0) => {
                debug!("compositor closed the event connection");
                return;
            }
            Ok(n) => n,
            Err(e) => {
                warn!("read from event connection failed: {e}");
                return;
            }
        };
        recv_buf.extend_from_slice(&read_tmp[..n]);

        loop {
            let (msg, consumed) = match decode_message(&recv_buf) {
                Ok(decoded) => decoded,
                Err(ProtocolError::InsufficientData { .. }) => break,
                Err(e) => {
                    warn!("undecodable frame on event connection: {e}");
                    return;
                }
            };
            recv_buf.drain(..consumed);

            let PayloadKind::Event(event_type) = msg.kind else {
                debug!("ignoring stray reply {:?} on event connection", msg.kind);
                continue;
            };

            match decode_event(event_type, &msg.payload) {
                Ok(Some(event)) => {
                    debug!("event: {event_type:?}");
                    if tx.send(event).await.is_err() {
                        debug!("event channel closed; stopping reader");
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("skipping malformed {event_type:?} event: {e}"),
            }
        }
    }
}
