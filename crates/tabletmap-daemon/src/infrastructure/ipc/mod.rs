//! Compositor IPC infrastructure.
//!
//! The daemon talks to sway (or i3) over the compositor's UNIX domain socket
//! using the i3 IPC protocol.  Two connections are used:
//!
//! - a **command connection** for request/reply traffic (`GET_TREE`,
//!   `GET_INPUTS`, `RUN_COMMAND`), and
//! - a **subscription connection** that, once subscribed, only ever carries
//!   events.  A background task decodes those frames into
//!   [`CompositorEvent`]s and forwards them over a bounded channel.
//!
//! # Testability
//!
//! The [`CompositorIpc`] trait allows the use cases to run against
//! [`mock::MockCompositor`], which serves a canned layout tree and input
//! list, records every command, and lets tests inject events.

use std::path::PathBuf;

use async_trait::async_trait;
use tabletmap_core::protocol::{EventKind, MessageType, PayloadKind, ProtocolError};
use tabletmap_core::{CompositorEvent, InputDescriptor, WindowNode};
use tokio::sync::mpsc;

pub mod mock;
pub mod sway;

/// Error type for compositor IPC operations.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// No socket path was given and neither `SWAYSOCK` nor `I3SOCK` is set.
    #[error("no compositor socket found: pass --socket or set SWAYSOCK / I3SOCK")]
    SocketNotFound,

    /// Connecting to the socket failed.
    #[error("failed to connect to compositor socket {path}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to an open connection failed.
    #[error("compositor socket I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame or its JSON payload could not be decoded.
    #[error("compositor protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The reply did not match the request that was sent.
    #[error("expected a {expected:?} reply, got {got:?}")]
    UnexpectedReply {
        expected: MessageType,
        got: PayloadKind,
    },

    /// The compositor parsed the command but reported a failure.
    #[error("compositor rejected command: {0}")]
    CommandFailed(String),

    /// The compositor refused the event subscription.
    #[error("compositor rejected subscription to {0:?}")]
    SubscribeRejected(Vec<EventKind>),

    /// The connection is gone.
    #[error("compositor connection closed")]
    Closed,
}

/// Trait abstracting the compositor connection.
///
/// The production implementation is [`sway::SwayIpc`]; tests use
/// [`mock::MockCompositor`] or the generated `MockCompositorIpc`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompositorIpc: Send + Sync {
    /// Fetches the full layout tree, converted to the domain model.
    async fn get_tree(&self) -> Result<WindowNode, IpcError>;

    /// Lists every input device the compositor knows about.
    async fn get_inputs(&self) -> Result<Vec<InputDescriptor>, IpcError>;

    /// Runs one compositor command.
    ///
    /// Returns [`IpcError::CommandFailed`] when the compositor reports that
    /// the command did not succeed.
    async fn run_command(&self, command: &str) -> Result<(), IpcError>;

    /// Subscribes to `kinds` and returns the stream of decoded events.
    ///
    /// The channel closes when the compositor closes the connection.
    async fn subscribe(
        &self,
        kinds: &[EventKind],
    ) -> Result<mpsc::Receiver<CompositorEvent>, IpcError>;
}
