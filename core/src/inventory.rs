//! Consumed inventory write interface.
//!
//! The real implementation lives behind the backend HTTP API; the engine only
//! needs existence checks and an idempotent add.

use std::collections::HashMap;

use crate::sensors::TagUid;

/// Everything the station knows about a spool at the moment the user presses
/// "Add Spool".
#[derive(Clone, Debug, PartialEq)]
pub struct AddSpoolRequest {
    pub tag_uid: TagUid,
    pub vendor: String,
    pub material: String,
    pub subtype: String,
    pub color_name: String,
    /// Packed `0xRRGGBBAA`.
    pub color_rgba: u32,
    /// Nominal full-spool weight in grams from the tag label, 0 if unknown.
    pub label_weight_g: i32,
    /// Weight on the scale right now, 0 when the scale is not ready.
    pub current_weight_g: i32,
    /// Where the record came from, e.g. `"nfc_scan"`.
    pub origin: String,
    pub tag_format: String,
}

/// Spool inventory operations consumed by the popup's add flow.
///
/// `add_spool` must be idempotent: retrying after a reported failure is safe.
pub trait Inventory {
    fn spool_exists(&self, uid: &TagUid) -> bool;

    /// Returns `true` on success. A failure leaves the inventory unchanged
    /// and the UI's Add button actionable.
    fn add_spool(&mut self, request: &AddSpoolRequest) -> bool;
}

/// In-memory [`Inventory`] used by the simulator and tests. Can be switched
/// into a rejecting mode to exercise the failure path.
#[derive(Default)]
pub struct MemoryInventory {
    spools: HashMap<TagUid, AddSpoolRequest>,
    reject_adds: bool,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_reject_adds(&mut self, reject: bool) {
        self.reject_adds = reject;
    }

    pub fn len(&self) -> usize {
        self.spools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spools.is_empty()
    }

    pub fn get(&self, uid: &TagUid) -> Option<&AddSpoolRequest> {
        self.spools.get(uid)
    }
}

impl Inventory for MemoryInventory {
    fn spool_exists(&self, uid: &TagUid) -> bool {
        self.spools.contains_key(uid)
    }

    fn add_spool(&mut self, request: &AddSpoolRequest) -> bool {
        if self.reject_adds {
            return false;
        }
        self.spools.insert(request.tag_uid.clone(), request.clone());
        true
    }
}
