//! Domain entities for tabletmap.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Clean Architecture organises code into concentric layers.  The innermost
//! layer is called the **domain** (or "entities" layer).  Domain code:
//!
//! - Contains the core rules of the application.
//! - Has **no** imports from socket libraries, async runtimes, or the file
//!   system.
//! - Can be compiled and tested on any platform without a running compositor.
//!
//! Here the rules are: which window in the layout tree is the drawing window,
//! how large each tablet physically is, and which on-screen rectangle the
//! tablet surface should cover.

/// Window-manager layout tree and the target-window walker.
pub mod layout;

/// Overscan computation and the `map_to_region` command.
pub mod region;

/// Tablet devices, input descriptors, and the physical size table.
pub mod tablet;
