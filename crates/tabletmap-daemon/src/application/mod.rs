//! Application layer use cases for the tabletmap daemon.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure business rules) and the infrastructure (sockets, files, the OS).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil a user goal (e.g., "keep the
//!   tablet mapped onto the drawing window whenever that window moves").
//! - **Depend on abstractions** (traits) rather than concrete implementations,
//!   so the compositor connection can be swapped for a mock in tests.
//! - **Contain no socket I/O and no file system access**.
//!
//! # Sub-modules
//!
//! - **`manage_tablets`** – The in-memory registry of attached tablet-tool
//!   devices, updated from input attach/detach notifications.
//!
//! - **`sync_region`** – Consumes compositor events, finds the target window,
//!   and issues one `map_to_region` command per registered tablet.

pub mod manage_tablets;
pub mod sync_region;
