//! i3/sway IPC message types and JSON payloads.
//!
//! Messages follow the i3 IPC wire format, which sway implements unchanged:
//! a fixed header followed by a UTF-8 JSON body.  Replies reuse the request's
//! type code; events set the high bit of the type code.

use serde::{Deserialize, Serialize};

use crate::domain::layout::{LayoutMode, Rect, WindowNode};
use crate::domain::tablet::InputDescriptor;

// ── Protocol constants ────────────────────────────────────────────────────────

/// Magic string opening every frame.
pub const MAGIC: &[u8; 6] = b"i3-ipc";

/// Total size of the frame header in bytes: magic (6) + length (4) + type (4).
pub const HEADER_SIZE: usize = 14;

/// Bit set on the type code of every event frame.
pub const EVENT_FLAG: u32 = 0x8000_0000;

/// Largest payload accepted from the socket.  Full layout trees of busy
/// sessions are a few hundred KiB.
pub const MAX_PAYLOAD: usize = 64 * 1024 * 1024;

// ── Message type codes ────────────────────────────────────────────────────────

/// Request (and reply) type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MessageType {
    RunCommand = 0,
    GetWorkspaces = 1,
    Subscribe = 2,
    GetOutputs = 3,
    GetTree = 4,
    GetMarks = 5,
    GetBarConfig = 6,
    GetVersion = 7,
    GetBindingModes = 8,
    GetConfig = 9,
    SendTick = 10,
    Sync = 11,
    GetBindingState = 12,
    GetInputs = 100,
    GetSeats = 101,
}

impl TryFrom<u32> for MessageType {
    type Error = ();

    fn try_from(value: u32) -> Result<Self, ()> {
        match value {
            0 => Ok(MessageType::RunCommand),
            1 => Ok(MessageType::GetWorkspaces),
            2 => Ok(MessageType::Subscribe),
            3 => Ok(MessageType::GetOutputs),
            4 => Ok(MessageType::GetTree),
            5 => Ok(MessageType::GetMarks),
            6 => Ok(MessageType::GetBarConfig),
            7 => Ok(MessageType::GetVersion),
            8 => Ok(MessageType::GetBindingModes),
            9 => Ok(MessageType::GetConfig),
            10 => Ok(MessageType::SendTick),
            11 => Ok(MessageType::Sync),
            12 => Ok(MessageType::GetBindingState),
            100 => Ok(MessageType::GetInputs),
            101 => Ok(MessageType::GetSeats),
            _ => Err(()),
        }
    }
}

/// Event type codes (high bit already set).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum EventType {
    Workspace = 0x8000_0000,
    Output = 0x8000_0001,
    Mode = 0x8000_0002,
    Window = 0x8000_0003,
    BarconfigUpdate = 0x8000_0004,
    Binding = 0x8000_0005,
    Shutdown = 0x8000_0006,
    Tick = 0x8000_0007,
    BarStateUpdate = 0x8000_0014,
    Input = 0x8000_0015,
}

impl TryFrom<u32> for EventType {
    type Error = ();

    fn try_from(value: u32) -> Result<Self, ()> {
        match value {
            0x8000_0000 => Ok(EventType::Workspace),
            0x8000_0001 => Ok(EventType::Output),
            0x8000_0002 => Ok(EventType::Mode),
            0x8000_0003 => Ok(EventType::Window),
            0x8000_0004 => Ok(EventType::BarconfigUpdate),
            0x8000_0005 => Ok(EventType::Binding),
            0x8000_0006 => Ok(EventType::Shutdown),
            0x8000_0007 => Ok(EventType::Tick),
            0x8000_0014 => Ok(EventType::BarStateUpdate),
            0x8000_0015 => Ok(EventType::Input),
            _ => Err(()),
        }
    }
}

/// What a decoded frame carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Reply to a request of this type.
    Reply(MessageType),
    /// Asynchronous event pushed on a subscribed connection.
    Event(EventType),
}

/// One decoded frame: its kind and raw JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpcMessage {
    pub kind: PayloadKind,
    pub payload: Vec<u8>,
}

// ── JSON payloads ─────────────────────────────────────────────────────────────

/// One entry of the array returned by `RUN_COMMAND`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reply to `SUBSCRIBE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeReply {
    pub success: bool,
}

/// Reply to `GET_VERSION`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionReply {
    pub major: i32,
    pub minor: i32,
    pub patch: i32,
    pub human_readable: String,
}

/// Name of the workspace holding scratchpad windows.  Its contents are never
/// shown, so the conversion drops it.
pub const SCRATCHPAD_WORKSPACE: &str = "__i3_scratch";

/// Node rectangle as sent by the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RectReply {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl From<RectReply> for Rect {
    fn from(r: RectReply) -> Self {
        Rect {
            x: r.x,
            y: r.y,
            width: u32::try_from(r.width).unwrap_or(0),
            height: u32::try_from(r.height).unwrap_or(0),
        }
    }
}

/// A node of the `GET_TREE` reply (and the `container` of window events).
///
/// Only the fields tabletmap reads are declared; serde ignores the rest.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeReply {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default)]
    pub layout: String,
    #[serde(default)]
    pub rect: RectReply,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub nodes: Vec<NodeReply>,
    #[serde(default)]
    pub floating_nodes: Vec<NodeReply>,
}

impl NodeReply {
    /// True for the hidden scratchpad workspace.
    pub fn is_scratchpad(&self) -> bool {
        self.node_type == "workspace" && self.name.as_deref() == Some(SCRATCHPAD_WORKSPACE)
    }

    /// Converts the compositor node into the domain tree.
    ///
    /// The scratchpad workspace and everything under it are dropped.
    /// Recursion depth is bounded by serde_json's own nesting limit on the
    /// payload this node was parsed from.
    pub fn into_window_node(self) -> WindowNode {
        let children = self
            .nodes
            .into_iter()
            .chain(self.floating_nodes)
            .filter(|child| !child.is_scratchpad())
            .map(NodeReply::into_window_node)
            .collect();

        WindowNode {
            app_id: self.app_id,
            layout: parse_layout(&self.layout),
            rect: self.rect.into(),
            children,
        }
    }
}

/// Maps a compositor layout string to [`LayoutMode`].
pub fn parse_layout(layout: &str) -> LayoutMode {
    match layout {
        "splith" | "splitv" => LayoutMode::Normal,
        "stacked" => LayoutMode::Stacked,
        "tabbed" => LayoutMode::Tabbed,
        _ => LayoutMode::Other,
    }
}

/// One entry of the `GET_INPUTS` reply (and the `input` of input events).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputReply {
    pub identifier: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vendor: u32,
    #[serde(default)]
    pub product: u32,
    #[serde(rename = "type")]
    pub input_type: String,
}

impl From<InputReply> for InputDescriptor {
    fn from(r: InputReply) -> Self {
        InputDescriptor {
            identifier: r.identifier,
            vendor_id: r.vendor,
            product_id: r.product,
            device_type: r.input_type,
        }
    }
}

/// Body of a `window` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowEventReply {
    pub change: String,
    pub container: NodeReply,
}

/// Body of an `input` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEventReply {
    pub change: String,
    pub input: InputReply,
}

/// Body of a `shutdown` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShutdownEventReply {
    pub change: String,
}
