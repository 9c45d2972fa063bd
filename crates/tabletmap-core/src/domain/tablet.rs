//! Tablet devices and their physical active-area sizes.
//!
//! The compositor reports every input device with an opaque string
//! identifier (e.g. `1386:210:Wacom_Bamboo_Pen`), a USB vendor/product pair,
//! and a device type.  Only devices of type [`TABLET_TOOL`] take part in
//! region mapping.
//!
//! The compositor does not know how large a tablet's drawing surface is, so
//! the [`SizeTable`] carries that knowledge keyed by (vendor, product).  A
//! device missing from the table is an unknown model: it is skipped when
//! mapping, never guessed.

use std::collections::HashMap;

/// Device type string the compositor uses for pen/stylus surfaces.
pub const TABLET_TOOL: &str = "tablet_tool";

/// USB vendor ID of Wacom.
pub const WACOM_VENDOR_ID: u32 = 0x056a;
/// USB vendor ID of XP-Pen (Hanvon Ugee).
pub const XP_PEN_VENDOR_ID: u32 = 0x28bd;

/// Identity of an attached tablet tool.
///
/// Two devices are the same device only if all three fields match; the
/// compositor may expose several tools with one vendor/product pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabletDevice {
    /// Opaque compositor identifier, used verbatim in commands.
    pub identifier: String,
    /// USB vendor ID.
    pub vendor_id: u32,
    /// USB product ID.
    pub product_id: u32,
}

impl TabletDevice {
    pub fn new(identifier: impl Into<String>, vendor_id: u32, product_id: u32) -> Self {
        Self {
            identifier: identifier.into(),
            vendor_id,
            product_id,
        }
    }
}

/// An input device as enumerated by the compositor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDescriptor {
    pub identifier: String,
    pub vendor_id: u32,
    pub product_id: u32,
    /// Compositor device class (`keyboard`, `pointer`, `tablet_tool`, ...).
    pub device_type: String,
}

impl InputDescriptor {
    /// Returns `true` if this input is a tablet pen/stylus surface.
    pub fn is_tablet_tool(&self) -> bool {
        self.device_type == TABLET_TOOL
    }

    /// Returns the tablet identity if this input is a tablet tool.
    pub fn as_tablet(&self) -> Option<TabletDevice> {
        self.is_tablet_tool().then(|| {
            TabletDevice::new(self.identifier.clone(), self.vendor_id, self.product_id)
        })
    }
}

/// Physical active-area dimensions of a tablet, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

impl PhysicalSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Tablets recognised without any configuration: (vendor, product, size).
const BUILTIN_SIZES: &[(u32, u32, PhysicalSize)] = &[
    // Wacom 056a:00d2
    (WACOM_VENDOR_ID, 0x00d2, PhysicalSize::new(147, 91)),
    // XP-Pen 28bd:0918
    (XP_PEN_VENDOR_ID, 0x0918, PhysicalSize::new(212, 135)),
];

/// Lookup from (vendor, product) to [`PhysicalSize`].
///
/// Built once at startup from the built-in entries plus any configured
/// additions, then only read.
#[derive(Debug, Clone)]
pub struct SizeTable {
    sizes: HashMap<(u32, u32), PhysicalSize>,
}

impl SizeTable {
    /// Creates a table holding only the built-in tablet models.
    pub fn builtin() -> Self {
        let sizes = BUILTIN_SIZES
            .iter()
            .map(|&(vendor, product, size)| ((vendor, product), size))
            .collect();
        Self { sizes }
    }

    /// Creates a table with no entries at all.
    pub fn empty() -> Self {
        Self {
            sizes: HashMap::new(),
        }
    }

    /// Adds a model, replacing the size of an existing entry with the same key.
    pub fn insert(&mut self, vendor_id: u32, product_id: u32, size: PhysicalSize) {
        self.sizes.insert((vendor_id, product_id), size);
    }

    /// Returns the physical size for a model, or `None` for an unknown model.
    pub fn lookup(&self, vendor_id: u32, product_id: u32) -> Option<PhysicalSize> {
        self.sizes.get(&(vendor_id, product_id)).copied()
    }

    /// Number of known models.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl Default for SizeTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Extend<(u32, u32, PhysicalSize)> for SizeTable {
    fn extend<I: IntoIterator<Item = (u32, u32, PhysicalSize)>>(&mut self, iter: I) {
        for (vendor, product, size) in iter {
            self.insert(vendor, product, size);
        }
    }
}
