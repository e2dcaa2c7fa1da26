//! Widget arena: generation-checked handles instead of a global object table.
//!
//! Every widget is a slot in one arena, indexed by a stable
//! `(layer, field-id)` pair. Lookups return `Option<WidgetHandle>`; a handle
//! that outlives its screen's teardown fails the generation check instead of
//! dangling.

use std::collections::HashMap;
use std::time::Instant;

use super::{FieldId, Layer, Surface, SurfaceOp};
use crate::screen::ScreenId;

/// How many printer summary cards the home screen shows.
pub const PRINTER_CARDS: u8 = 4;
/// AMS units and tray slots rendered on the overview screen.
pub const AMS_UNITS_SHOWN: u8 = 4;
pub const TRAYS_PER_UNIT: u8 = 4;

/// Stable, generation-checked reference to an arena slot.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct WidgetHandle {
    index: u32,
    generation: u32,
}

/// Leaf widget state the engine actually writes: label text and visibility.
#[derive(Clone, Debug, Default)]
pub struct Widget {
    pub text: String,
    pub visible: bool,
}

struct Slot {
    generation: u32,
    widget: Option<Widget>,
}

/// Arena of widgets across screen layers and the overlay.
#[derive(Default)]
pub struct WidgetArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    index: HashMap<(Layer, FieldId), WidgetHandle>,
}

impl WidgetArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a widget for a field on a layer and return its handle.
    pub fn insert(&mut self, layer: Layer, field: FieldId) -> WidgetHandle {
        let widget = Widget {
            text: String::new(),
            visible: true,
        };
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.widget = Some(widget);
                WidgetHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    widget: Some(widget),
                });
                WidgetHandle {
                    index,
                    generation: 0,
                }
            }
        };
        self.index.insert((layer, field), handle);
        handle
    }

    pub fn lookup(&self, layer: Layer, field: FieldId) -> Option<WidgetHandle> {
        self.index.get(&(layer, field)).copied()
    }

    pub fn get(&self, handle: WidgetHandle) -> Option<&Widget> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.widget.as_ref()
    }

    pub fn get_mut(&mut self, handle: WidgetHandle) -> Option<&mut Widget> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.widget.as_mut()
    }

    /// Tear down every widget of a layer. Slots are recycled with a bumped
    /// generation, so handles into the old layer go stale rather than alias.
    pub fn remove_layer(&mut self, layer: Layer) {
        let slots = &mut self.slots;
        let free = &mut self.free;
        self.index.retain(|(l, _), handle| {
            if *l != layer {
                return true;
            }
            let slot = &mut slots[handle.index as usize];
            slot.widget = None;
            slot.generation = slot.generation.wrapping_add(1);
            free.push(handle.index);
            false
        });
    }

    pub fn live_widgets(&self) -> usize {
        self.index.len()
    }
}

/// [`Surface`] backed by the widget arena, used by the simulator and tests.
/// Records structural ops so ordering invariants can be asserted.
pub struct ArenaSurface {
    arena: WidgetArena,
    shown: Option<ScreenId>,
    overlay_open: bool,
    ops: Vec<SurfaceOp>,
    frames: u64,
}

impl ArenaSurface {
    pub fn new() -> Self {
        Self {
            arena: WidgetArena::new(),
            shown: None,
            overlay_open: false,
            ops: Vec::new(),
            frames: 0,
        }
    }

    /// Field manifest per screen; the arena builder for each screen.
    fn screen_fields(id: ScreenId) -> Vec<FieldId> {
        match id {
            ScreenId::Home => {
                let mut fields = vec![
                    FieldId::WeightValue,
                    FieldId::WeightStable,
                    FieldId::NfcStatus,
                    FieldId::BackendStatus,
                ];
                for card in 0..PRINTER_CARDS {
                    fields.extend([
                        FieldId::PrinterName(card),
                        FieldId::PrinterStatus(card),
                        FieldId::PrinterProgress(card),
                        FieldId::PrinterRemaining(card),
                    ]);
                }
                fields
            }
            ScreenId::AmsOverview => {
                let mut fields = vec![FieldId::AmsPrinterName];
                for unit in 0..AMS_UNITS_SHOWN {
                    fields.push(FieldId::AmsHumidity(unit));
                    fields.push(FieldId::AmsTemperature(unit));
                    for slot in 0..TRAYS_PER_UNIT {
                        fields.push(FieldId::TrayMaterial { unit, slot });
                        fields.push(FieldId::TrayRemain { unit, slot });
                    }
                }
                fields
            }
            ScreenId::ScanResult => vec![
                FieldId::ScanUid,
                FieldId::ScanVendor,
                FieldId::ScanMaterial,
                FieldId::ScanColor,
                FieldId::ScanWeight,
            ],
            ScreenId::SpoolDetails => vec![
                FieldId::DetailTitle,
                FieldId::DetailMaterial,
                FieldId::DetailColor,
                FieldId::DetailWeight,
            ],
            ScreenId::Settings(_) => vec![FieldId::SettingsTitle, FieldId::SettingsBackend],
        }
    }

    const OVERLAY_FIELDS: [FieldId; 6] = [
        FieldId::PopupTitle,
        FieldId::PopupUid,
        FieldId::PopupWeight,
        FieldId::PopupInfo,
        FieldId::PopupCountdown,
        FieldId::PopupAddButton,
    ];

    fn field_layer(&self, field: FieldId) -> Option<Layer> {
        if field.is_overlay() {
            self.overlay_open.then_some(Layer::Overlay)
        } else {
            self.shown.map(Layer::Screen)
        }
    }

    /// Label text currently held by a field, resolved like `set_label`.
    pub fn label(&self, field: FieldId) -> Option<&str> {
        let layer = self.field_layer(field)?;
        let handle = self.arena.lookup(layer, field)?;
        self.arena.get(handle).map(|w| w.text.as_str())
    }

    pub fn is_visible(&self, field: FieldId) -> bool {
        self.field_layer(field)
            .and_then(|layer| self.arena.lookup(layer, field))
            .and_then(|handle| self.arena.get(handle))
            .is_some_and(|w| w.visible)
    }

    pub fn shown_screen(&self) -> Option<ScreenId> {
        self.shown
    }

    pub fn overlay_open(&self) -> bool {
        self.overlay_open
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Drain the recorded ops, for per-phase assertions.
    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn live_widgets(&self) -> usize {
        self.arena.live_widgets()
    }
}

impl Default for ArenaSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for ArenaSurface {
    fn run_timers(&mut self, _now: Instant) {
        self.frames += 1;
    }

    fn has_screen(&self, _id: ScreenId) -> bool {
        // Every ScreenId has a manifest here; hosts with partial layouts
        // return false for the screens they cannot build.
        true
    }

    fn build_screen(&mut self, id: ScreenId) {
        for field in Self::screen_fields(id) {
            self.arena.insert(Layer::Screen(id), field);
        }
        self.ops.push(SurfaceOp::Build(id));
    }

    fn destroy_screen(&mut self, id: ScreenId) {
        self.arena.remove_layer(Layer::Screen(id));
        if self.shown == Some(id) {
            self.shown = None;
        }
        self.ops.push(SurfaceOp::Destroy(id));
    }

    fn show_screen(&mut self, id: ScreenId) {
        self.shown = Some(id);
        self.ops.push(SurfaceOp::Show(id));
    }

    fn set_label(&mut self, field: FieldId, text: &str) {
        let Some(layer) = self.field_layer(field) else {
            tracing::trace!(?field, "set_label with no layer to draw on");
            return;
        };
        match self.arena.lookup(layer, field).and_then(|h| self.arena.get_mut(h)) {
            Some(widget) => widget.text = text.to_owned(),
            None => tracing::trace!(?field, ?layer, "set_label on unregistered field"),
        }
    }

    fn set_visible(&mut self, field: FieldId, visible: bool) {
        let Some(layer) = self.field_layer(field) else {
            return;
        };
        if let Some(widget) = self.arena.lookup(layer, field).and_then(|h| self.arena.get_mut(h)) {
            widget.visible = visible;
        }
    }

    fn create_overlay(&mut self) {
        if self.overlay_open {
            tracing::warn!("create_overlay while overlay already open");
            return;
        }
        self.overlay_open = true;
        for field in Self::OVERLAY_FIELDS {
            self.arena.insert(Layer::Overlay, field);
        }
        self.ops.push(SurfaceOp::CreateOverlay);
    }

    fn destroy_overlay(&mut self) {
        if !self.overlay_open {
            return;
        }
        self.arena.remove_layer(Layer::Overlay);
        self.overlay_open = false;
        self.ops.push(SurfaceOp::DestroyOverlay);
    }
}
