//! Typed compositor events.
//!
//! The compositor pushes many kinds of event; tabletmap only reacts to the
//! ones that can move the target window or attach/detach a tablet.  Event
//! frames are decoded into [`CompositorEvent`] here, and everything else is
//! dropped (`Ok(None)`) before it reaches the controller.

use tracing::trace;

use crate::domain::layout::WindowNode;
use crate::domain::tablet::InputDescriptor;
use crate::protocol::codec::{parse_payload, ProtocolError};
use crate::protocol::messages::{EventType, InputEventReply, ShutdownEventReply, WindowEventReply};

/// Event families that can be subscribed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Window,
    Input,
    Shutdown,
}

impl EventKind {
    /// The name used in the `SUBSCRIBE` payload.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Window => "window",
            EventKind::Input => "input",
            EventKind::Shutdown => "shutdown",
        }
    }

    /// Every family the controller needs.
    pub const ALL: [EventKind; 3] = [EventKind::Window, EventKind::Input, EventKind::Shutdown];
}

/// An event the controller acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositorEvent {
    /// A window was mapped.
    WindowCreated(WindowNode),
    /// A window moved to another container, workspace, or output.
    WindowMoved(WindowNode),
    /// A window was closed.
    WindowClosed(WindowNode),
    /// A window switched between tiled and floating.
    WindowFloating(WindowNode),
    /// A window entered or left fullscreen.
    WindowFullscreen(WindowNode),
    /// An input device was attached.
    InputAdded(InputDescriptor),
    /// An input device was detached.
    InputRemoved(InputDescriptor),
    /// The compositor is exiting.
    Shutdown,
}

/// Decodes the JSON body of an event frame.
///
/// Returns `Ok(None)` for event types and changes tabletmap ignores
/// (focus, title, marks, keyboard layout changes, workspaces, ...).
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedPayload`] if a relevant event's body
/// does not parse.
pub fn decode_event(
    event_type: EventType,
    payload: &[u8],
) -> Result<Option<CompositorEvent>, ProtocolError> {
    match event_type {
        EventType::Window => {
            let body: WindowEventReply = parse_payload(payload)?;
            let make: fn(WindowNode) -> CompositorEvent = match body.change.as_str() {
                "new" => CompositorEvent::WindowCreated,
                "move" => CompositorEvent::WindowMoved,
                "close" => CompositorEvent::WindowClosed,
                "floating" => CompositorEvent::WindowFloating,
                "fullscreen_mode" => CompositorEvent::WindowFullscreen,
                other => {
                    trace!("ignoring window change {other:?}");
                    return Ok(None);
                }
            };
            Ok(Some(make(body.container.into_window_node())))
        }
        EventType::Input => {
            let body: InputEventReply = parse_payload(payload)?;
            let event = match body.change.as_str() {
                "added" => CompositorEvent::InputAdded(body.input.into()),
                "removed" => CompositorEvent::InputRemoved(body.input.into()),
                other => {
                    trace!("ignoring input change {other:?}");
                    return Ok(None);
                }
            };
            Ok(Some(event))
        }
        EventType::Shutdown => {
            // Validate the body even though only the type matters.
            let _body: ShutdownEventReply = parse_payload(payload)?;
            Ok(Some(CompositorEvent::Shutdown))
        }
        other => {
            trace!("ignoring {other:?} event");
            Ok(None)
        }
    }
}
