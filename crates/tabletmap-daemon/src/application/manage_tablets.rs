//! ManageTabletsUseCase: the registry of attached tablet-tool devices.
//!
//! The `TabletRegistry` is the daemon's in-memory record of every tablet
//! tool the compositor has reported.  Entries are keyed by the full identity
//! tuple `(identifier, vendor_id, product_id)`, so two physically identical
//! tablets with different identifiers are tracked separately.
//!
//! # Device lifecycle (for beginners)
//!
//! ```text
//!  startup GET_INPUTS ──┐
//!                       ├──►  registered  ──►  (input "removed")  ──►  gone
//!  input "added" ───────┘
//! ```
//!
//! Only devices whose input type is `tablet_tool` are ever registered; the
//! caller filters with [`InputDescriptor::as_tablet`].
//!
//! [`InputDescriptor::as_tablet`]: tabletmap_core::InputDescriptor::as_tablet

use std::collections::BTreeSet;

use tabletmap_core::TabletDevice;
use thiserror::Error;

/// Error type for registry operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A removal named a device that was never registered.
    #[error("tablet {identifier} ({vendor_id:04x}:{product_id:04x}) was not registered")]
    Unregistered {
        identifier: String,
        vendor_id: u32,
        product_id: u32,
    },
}

/// In-memory registry of attached tablet tools.
///
/// The registry is owned by the [`SyncRegionUseCase`] and mutated only from
/// its event loop, so it needs no lock.
///
/// # BTreeSet choice
///
/// A `BTreeSet<TabletDevice>` rejects duplicate identity tuples and iterates
/// in a stable order, so the commands of one mapping pass are always issued
/// in the same sequence.
///
/// [`SyncRegionUseCase`]: crate::application::sync_region::SyncRegionUseCase
#[derive(Debug, Default, Clone)]
pub struct TabletRegistry {
    tablets: BTreeSet<TabletDevice>,
}

impl TabletRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a device.  Returns `false` if it was already present.
    pub fn add(&mut self, device: TabletDevice) -> bool {
        self.tablets.insert(device)
    }

    /// Removes a device.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unregistered`] if the device was not present.
    /// The registry is left unchanged in that case.
    pub fn remove(&mut self, device: &TabletDevice) -> Result<(), RegistryError> {
        if self.tablets.remove(device) {
            Ok(())
        } else {
            Err(RegistryError::Unregistered {
                identifier: device.identifier.clone(),
                vendor_id: device.vendor_id,
                product_id: device.product_id,
            })
        }
    }

    /// Returns a snapshot of all registered devices, ordered by identity.
    ///
    /// The iterator owns its items: mutating the registry afterwards does not
    /// affect it, and cloning it restarts from the current position.
    pub fn all(&self) -> impl Iterator<Item = TabletDevice> + Clone {
        self.tablets.iter().cloned().collect::<Vec<_>>().into_iter()
    }

    pub fn contains(&self, device: &TabletDevice) -> bool {
        self.tablets.contains(device)
    }

    pub fn len(&self) -> usize {
        self.tablets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tablets.is_empty()
    }
}

impl Extend<TabletDevice> for TabletRegistry {
    fn extend<I: IntoIterator<Item = TabletDevice>>(&mut self, iter: I) {
        self.tablets.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wacom(identifier: &str) -> TabletDevice {
        TabletDevice::new(identifier, 1386, 210)
    }

    #[test]
    fn test_registry_starts_empty() {
        let registry = TabletRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.all().count(), 0);
    }

    #[test]
    fn test_add_registers_device() {
        let mut registry = TabletRegistry::new();

        let inserted = registry.add(wacom("1386:210:Wacom_One_Pen"));

        assert!(inserted);
        assert!(registry.contains(&wacom("1386:210:Wacom_One_Pen")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_add_same_tuple_twice_is_idempotent() {
        // Arrange
        let mut registry = TabletRegistry::new();
        registry.add(wacom("pen"));

        // Act
        let inserted_again = registry.add(wacom("pen"));

        // Assert
        assert!(!inserted_again);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_same_identifier_different_product_is_a_distinct_device() {
        let mut registry = TabletRegistry::new();
        registry.add(TabletDevice::new("pen", 1386, 210));
        registry.add(TabletDevice::new("pen", 1386, 211));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove_deletes_device() {
        let mut registry = TabletRegistry::new();
        registry.add(wacom("pen"));

        let result = registry.remove(&wacom("pen"));

        assert_eq!(result, Ok(()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_unregistered_reports_error_and_leaves_registry_unchanged() {
        // Arrange
        let mut registry = TabletRegistry::new();
        registry.add(wacom("pen"));

        // Act
        let result = registry.remove(&TabletDevice::new("ghost", 10429, 2328));

        // Assert
        assert_eq!(
            result,
            Err(RegistryError::Unregistered {
                identifier: "ghost".to_string(),
                vendor_id: 10429,
                product_id: 2328,
            })
        );
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&wacom("pen")));
    }

    #[test]
    fn test_all_iterates_in_identity_order() {
        let mut registry = TabletRegistry::new();
        registry.add(wacom("c-pen"));
        registry.add(wacom("a-pen"));
        registry.add(wacom("b-pen"));

        let ids: Vec<String> = registry.all().map(|d| d.identifier).collect();

        assert_eq!(ids, ["a-pen", "b-pen", "c-pen"]);
    }

    #[test]
    fn test_all_snapshot_is_unaffected_by_later_mutation() {
        // Arrange
        let mut registry = TabletRegistry::new();
        registry.add(wacom("a-pen"));
        registry.add(wacom("b-pen"));
        let snapshot = registry.all();

        // Act
        registry.remove(&wacom("a-pen")).unwrap();
        registry.add(wacom("z-pen"));

        // Assert
        let ids: Vec<String> = snapshot.map(|d| d.identifier).collect();
        assert_eq!(ids, ["a-pen", "b-pen"]);
    }

    #[test]
    fn test_all_snapshot_clone_restarts_iteration() {
        let mut registry = TabletRegistry::new();
        registry.add(wacom("a-pen"));
        registry.add(wacom("b-pen"));

        let first = registry.all();
        let second = first.clone();

        assert_eq!(first.count(), 2);
        assert_eq!(second.count(), 2);
    }

    #[test]
    fn test_extend_registers_many_devices_without_duplicates() {
        let mut registry = TabletRegistry::new();
        registry.extend([wacom("a"), wacom("b"), wacom("a")]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_registry_error_message_names_the_device() {
        let err = RegistryError::Unregistered {
            identifier: "pen".to_string(),
            vendor_id: 0x056a,
            product_id: 0x00d2,
        };
        assert_eq!(err.to_string(), "tablet pen (056a:00d2) was not registered");
    }
}
