//! Tablet-to-window region mapping.
//!
//! A tablet surface and a window rarely share an aspect ratio.  Mapping the
//! tablet onto the full window would stretch pen motion along one axis, so
//! instead the tablet is mapped onto the largest rectangle with the tablet's
//! own aspect ratio that fits inside the window, anchored at the window's
//! top-left corner.
//!
//! # Why integer floor? (for beginners)
//!
//! The compositor's `map_to_region` command only accepts whole pixels.  All
//! divisions here are done on integers, which truncate toward zero, so the
//! resulting rectangle may be up to one pixel short of the exact ratio but
//! never overflows the window.

use std::fmt;

use crate::domain::layout::Rect;
use crate::domain::tablet::{PhysicalSize, TabletDevice};

/// The on-screen rectangle a tablet is mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingRectangle {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl MappingRectangle {
    /// Computes the mapping of a tablet of `tablet` size onto `window`.
    ///
    /// Returns `None` if either the window or the tablet has a zero dimension.
    pub fn for_window(tablet: PhysicalSize, window: Rect) -> Option<Self> {
        let (width, height) = overscan(tablet, (window.width, window.height))?;
        Some(Self {
            x: window.x,
            y: window.y,
            width,
            height,
        })
    }

    /// Builds the compositor command that maps `device` onto this rectangle.
    pub fn command_for<'a>(&self, device: &'a TabletDevice) -> MapToRegionCommand<'a> {
        MapToRegionCommand {
            identifier: &device.identifier,
            region: *self,
        }
    }
}

/// `input <identifier> map_to_region <x> <y> <width> <height>`.
///
/// Rendered through [`fmt::Display`]; use `.to_string()` for the wire text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapToRegionCommand<'a> {
    pub identifier: &'a str,
    pub region: MappingRectangle,
}

impl fmt::Display for MapToRegionCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "input {} map_to_region {} {} {} {}",
            self.identifier, self.region.x, self.region.y, self.region.width, self.region.height
        )
    }
}

/// Fits the tablet's aspect ratio into a `(width, height)` window.
///
/// With `r = tablet.width / tablet.height`:
///
/// 1. `width_from_height = floor(height * r)`
/// 2. if that exceeds the window width, the window is too narrow and the
///    result is `(width, floor(width / r))`
/// 3. otherwise the result is `(width_from_height, height)`
///
/// One axis always equals the window's, the other is no larger than it.
///
/// Returns `None` when any dimension is zero.
///
/// # Examples
///
/// ```rust
/// use tabletmap_core::{overscan, PhysicalSize};
///
/// // Wide window: height-bound.
/// assert_eq!(overscan(PhysicalSize::new(147, 91), (1920, 1080)), Some((1744, 1080)));
/// // Tall window: width-bound.
/// assert_eq!(overscan(PhysicalSize::new(212, 135), (800, 1000)), Some((800, 509)));
/// ```
pub fn overscan(tablet: PhysicalSize, window: (u32, u32)) -> Option<(u32, u32)> {
    let (window_width, window_height) = window;
    if tablet.width == 0 || tablet.height == 0 || window_width == 0 || window_height == 0 {
        return None;
    }

    let tablet_width = u64::from(tablet.width);
    let tablet_height = u64::from(tablet.height);

    // floor(H * tw / th) — exact in u64 for any u32 inputs.
    let width_from_height = u64::from(window_height) * tablet_width / tablet_height;

    if width_from_height > u64::from(window_width) {
        // floor(W * th / tw) < H here, so it fits in u32.
        let height_from_width = u64::from(window_width) * tablet_height / tablet_width;
        Some((window_width, height_from_width as u32))
    } else {
        Some((width_from_height as u32, window_height))
    }
}
