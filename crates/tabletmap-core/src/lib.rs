//! # tabletmap-core
//!
//! Shared library for tabletmap containing the layout-tree walker, the tablet
//! region mapper, the tablet size table, and the i3/sway IPC codec.
//!
//! This crate is used by the `tabletmap` daemon.  It has zero dependencies on
//! sockets, async runtimes, or the file system.
//!
//! # Architecture overview (for beginners)
//!
//! tabletmap keeps a graphics tablet's active area glued to one application
//! window (by default the Rnote drawing app) inside a tiling window manager.
//! Whenever the window moves or resizes, the tablet must be told which
//! on-screen rectangle its surface now corresponds to.
//!
//! This crate (`tabletmap-core`) is the pure foundation.  It defines:
//!
//! - **`domain`** – Business logic with no I/O.  The window-manager layout
//!   tree and the breadth-first walk that finds the target window, the
//!   physical tablet size table, and the overscan computation that produces
//!   the `map_to_region` rectangle.
//!
//! - **`protocol`** – How bytes travel over the i3/sway IPC socket.  Frames
//!   carry a 14-byte header (`i3-ipc` magic + length + type) followed by a
//!   JSON payload, which is decoded into typed Rust structs and events.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `tabletmap_core::WindowNode` instead of `tabletmap_core::domain::layout::WindowNode`.
pub use domain::layout::{find_target_window, LayoutMode, Rect, WindowNode};
pub use domain::region::{overscan, MappingRectangle};
pub use domain::tablet::{InputDescriptor, PhysicalSize, SizeTable, TabletDevice};
pub use protocol::codec::{decode_message, encode_message, ProtocolError};
pub use protocol::events::{CompositorEvent, EventKind};
