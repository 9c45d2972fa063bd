//! Mock compositor for unit and integration testing.
//!
//! Serves a canned layout tree and input list, records every command it is
//! asked to run, and lets tests inject [`CompositorEvent`]s without a
//! running sway instance.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use tabletmap_core::protocol::EventKind;
use tabletmap_core::{CompositorEvent, InputDescriptor, WindowNode};

use super::{CompositorIpc, IpcError};

/// Capacity of the event channel handed out by [`MockCompositor::subscribe`].
const MOCK_CHANNEL_CAPACITY: usize = 64;

/// A mock implementation of [`CompositorIpc`].
///
/// All state sits behind `Arc<Mutex<..>>` so a test can keep a clone of the
/// handle after giving another clone to the use case.
#[derive(Clone, Default)]
pub struct MockCompositor {
    tree: Arc<Mutex<Option<WindowNode>>>,
    inputs: Arc<Mutex<Vec<InputDescriptor>>>,
    commands: Arc<Mutex<Vec<String>>>,
    failing_identifiers: Arc<Mutex<HashSet<String>>>,
    sender: Arc<Mutex<Option<mpsc::Sender<CompositorEvent>>>>,
    tree_fetches: Arc<Mutex<u32>>,
    subscriptions: Arc<Mutex<Vec<Vec<EventKind>>>>,
}

impl MockCompositor {
    /// Creates a mock with no tree (fetches fail) and no inputs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tree returned by `get_tree`.  `None` makes fetches fail with
    /// [`IpcError::Closed`].
    pub fn set_tree(&self, tree: Option<WindowNode>) {
        *self.tree.lock().expect("lock poisoned") = tree;
    }

    /// Sets the list returned by `get_inputs`.
    pub fn set_inputs(&self, inputs: Vec<InputDescriptor>) {
        *self.inputs.lock().expect("lock poisoned") = inputs;
    }

    /// Makes every command that names `identifier` fail with
    /// [`IpcError::CommandFailed`].  Failed commands are still recorded.
    pub fn fail_commands_for(&self, identifier: impl Into<String>) {
        self.failing_identifiers
            .lock()
            .expect("lock poisoned")
            .insert(identifier.into());
    }

    /// Returns every command received so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().expect("lock poisoned").clone()
    }

    /// Returns how many times `get_tree` was called.
    pub fn tree_fetch_count(&self) -> u32 {
        *self.tree_fetches.lock().expect("lock poisoned")
    }

    /// Returns the event kinds of every `subscribe` call.
    pub fn subscriptions(&self) -> Vec<Vec<EventKind>> {
        self.subscriptions.lock().expect("lock poisoned").clone()
    }

    /// Injects a synthetic event, as if pushed by the compositor.
    ///
    /// Panics if `subscribe()` has not been called, or after
    /// [`close_events`](Self::close_events).
    pub async fn inject_event(&self, event: CompositorEvent) {
        let sender = self
            .sender
            .lock()
            .expect("lock poisoned")
            .clone()
            .expect("MockCompositor::inject_event called before subscribe()");
        sender
            .send(event)
            .await
            .expect("receiver has been dropped");
    }

    /// Drops the event sender, as if the compositor hung up.
    pub fn close_events(&self) {
        *self.sender.lock().expect("lock poisoned") = None;
    }
}

#[async_trait]
impl CompositorIpc for MockCompositor {
    async fn get_tree(&self) -> Result<WindowNode, IpcError> {
        *self.tree_fetches.lock().expect("lock poisoned") += 1;
        self.tree
            .lock()
            .expect("lock poisoned")
            .clone()
            .ok_or(IpcError::Closed)
    }

    async fn get_inputs(&self) -> Result<Vec<InputDescriptor>, IpcError> {
        Ok(self.inputs.lock().expect("lock poisoned").clone())
    }

    async fn run_command(&self, command: &str) -> Result<(), IpcError> {
        self.commands
            .lock()
            .expect("lock poisoned")
            .push(command.to_string());

        let fails = self
            .failing_identifiers
            .lock()
            .expect("lock poisoned")
            .iter()
            .any(|id| command.split_whitespace().nth(1) == Some(id.as_str()));
        if fails {
            Err(IpcError::CommandFailed("Unknown input device".to_string()))
        } else {
            Ok(())
        }
    }

    async fn subscribe(
        &self,
        kinds: &[EventKind],
    ) -> Result<mpsc::Receiver<CompositorEvent>, IpcError> {
        let (tx, rx) = mpsc::channel(MOCK_CHANNEL_CAPACITY);
        *self.sender.lock().expect("lock poisoned") = Some(tx);
        self.subscriptions
            .lock()
            .expect("lock poisoned")
            .push(kinds.to_vec());
        Ok(rx)
    }
}
