//! Infrastructure layer for the tabletmap daemon.
//!
//! Contains OS-facing adapters: the compositor IPC socket connection and
//! file-system configuration storage.
//!
//! **Dependency rule**: this layer may depend on `tabletmap_core`, but MUST
//! NOT reach into the `application` layer's use cases.

pub mod ipc;
pub mod storage;
