//! Produced rendering interface.
//!
//! The engine never touches the widget toolkit directly; it drives a
//! [`Surface`], which the firmware backs with the real toolkit and the
//! simulator/tests back with [`ArenaSurface`], a widget arena with typed
//! handles.

mod arena;

use std::time::Instant;

use crate::screen::ScreenId;

pub use arena::{
    AMS_UNITS_SHOWN, ArenaSurface, PRINTER_CARDS, TRAYS_PER_UNIT, Widget, WidgetArena,
    WidgetHandle,
};

/// Stable identifier for every label/indicator slot the engine can write.
/// Indexed variants address the repeated printer cards and AMS tray slots.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FieldId {
    // Home screen
    WeightValue,
    WeightStable,
    NfcStatus,
    BackendStatus,
    PrinterName(u8),
    PrinterStatus(u8),
    PrinterProgress(u8),
    PrinterRemaining(u8),
    // AMS overview
    AmsPrinterName,
    AmsHumidity(u8),
    AmsTemperature(u8),
    TrayMaterial { unit: u8, slot: u8 },
    TrayRemain { unit: u8, slot: u8 },
    // Scan result
    ScanUid,
    ScanVendor,
    ScanMaterial,
    ScanColor,
    ScanWeight,
    // Spool details
    DetailTitle,
    DetailMaterial,
    DetailColor,
    DetailWeight,
    // Settings
    SettingsTitle,
    SettingsBackend,
    // Tag popup (overlay layer)
    PopupTitle,
    PopupUid,
    PopupWeight,
    PopupInfo,
    PopupCountdown,
    PopupAddButton,
}

impl FieldId {
    /// Popup fields live on the overlay layer, everything else on the
    /// currently shown screen.
    pub fn is_overlay(self) -> bool {
        matches!(
            self,
            FieldId::PopupTitle
                | FieldId::PopupUid
                | FieldId::PopupWeight
                | FieldId::PopupInfo
                | FieldId::PopupCountdown
                | FieldId::PopupAddButton
        )
    }
}

/// Which widget layer a field belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Layer {
    Screen(ScreenId),
    Overlay,
}

/// Structural operation performed on a surface, recorded by [`ArenaSurface`]
/// so tests can assert ordering (teardown before build, single reopen).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SurfaceOp {
    Build(ScreenId),
    Destroy(ScreenId),
    Show(ScreenId),
    CreateOverlay,
    DestroyOverlay,
}

/// Rendering operations the engine produces.
///
/// All methods are synchronous and non-blocking; implementations draw from
/// already-fetched state only.
pub trait Surface {
    /// Service the toolkit's own timers/animations. First step of every tick.
    fn run_timers(&mut self, now: Instant);

    /// Whether a builder is registered for this screen. Navigation treats a
    /// missing builder as misuse: fatal in debug, no-op in release.
    fn has_screen(&self, id: ScreenId) -> bool;

    /// Construct the screen's widget tree. The outgoing screen's resources
    /// must already be released; screens are never simultaneously live.
    fn build_screen(&mut self, id: ScreenId);

    /// Tear down the screen's widget tree and release its resources.
    fn destroy_screen(&mut self, id: ScreenId);

    /// Make the (already built) screen the rendered one.
    fn show_screen(&mut self, id: ScreenId);

    fn set_label(&mut self, field: FieldId, text: &str);

    fn set_visible(&mut self, field: FieldId, visible: bool);

    /// Create the modal overlay above whichever screen is current.
    fn create_overlay(&mut self);

    fn destroy_overlay(&mut self);
}
