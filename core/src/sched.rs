//! Tick scheduler: the single re-entrant driver of the display core.
//!
//! Invoked at a fixed cadence by the host. Per tick, in order: toolkit
//! timers, queued UI actions, pending navigation, sensor sampling through the
//! debouncer into the popup, then the current screen's refresh. Navigation
//! runs before refresh, so a refresh always targets the new current screen,
//! never one mid-teardown. No step blocks on I/O; every input is a
//! pre-fetched snapshot.

use std::time::Instant;

use crate::actions::{ActionQueue, ActionSender, UiAction};
use crate::config::Config;
use crate::inventory::Inventory;
use crate::nav::NavController;
use crate::popup::PopupController;
use crate::remote::{DeviceReport, DeviceReportCell, SnapshotCache};
use crate::screen::{ScreenId, SettingsPanel};
use crate::sensors::SensorHub;
use crate::staging::{StagingEvent, TagDebouncer};
use crate::surface::{AMS_UNITS_SHOWN, FieldId, PRINTER_CARDS, Surface, TRAYS_PER_UNIT};

pub struct TickScheduler<S, I, U> {
    surface: U,
    sensors: S,
    inventory: I,
    nav: NavController,
    debouncer: TagDebouncer,
    popup: PopupController,
    cache: SnapshotCache,
    actions: ActionQueue,
    report: DeviceReportCell,
}

impl<S, I, U> TickScheduler<S, I, U>
where
    S: SensorHub,
    I: Inventory,
    U: Surface,
{
    /// Build the engine and show the home screen.
    pub fn new(
        cfg: &Config,
        mut surface: U,
        sensors: S,
        inventory: I,
        cache: SnapshotCache,
        report: DeviceReportCell,
    ) -> Self {
        let nav = NavController::new(ScreenId::Home, &mut surface);
        Self {
            surface,
            sensors,
            inventory,
            nav,
            debouncer: TagDebouncer::new(cfg.staging_ttl, cfg.tag_block),
            popup: PopupController::new(cfg.popup_close_delay),
            cache,
            actions: ActionQueue::new(),
            report,
        }
    }

    /// Producer handle for UI callbacks.
    pub fn actions(&self) -> ActionSender {
        self.actions.sender()
    }

    /// One scheduler tick. Synchronous, non-reentrant, never blocks.
    pub fn tick(&mut self, now: Instant) {
        self.surface.run_timers(now);

        let queued: Vec<UiAction> = self.actions.drain().collect();
        for action in queued {
            self.apply_action(action, now);
        }

        self.nav.tick(&mut self.surface);

        let raw_present = self.sensors.tag_present();
        let raw_uid = self.sensors.tag_uid();
        let event = self.debouncer.update(raw_present, raw_uid.as_ref(), now);
        if event != StagingEvent::Unchanged {
            self.popup
                .on_staging_event(&event, &mut self.surface, &self.sensors, &self.inventory);
        }
        self.popup
            .tick(now, &self.debouncer, &mut self.surface, &self.sensors);

        if let Some(refresh) = Self::refresh_for(self.nav.current()) {
            refresh(self, now);
        }

        self.publish_report();
    }

    fn apply_action(&mut self, action: UiAction, now: Instant) {
        tracing::debug!(?action, "applying ui action");
        match action {
            UiAction::Navigate(screen) => self.nav.request(screen),
            UiAction::Back => self.nav.back(),
            UiAction::ShowPopup => {
                self.popup
                    .show(&self.debouncer, &mut self.surface, &self.sensors, &self.inventory);
            }
            UiAction::DismissPopup => self.popup.dismiss(&mut self.surface),
            UiAction::AddSpool => {
                self.popup
                    .handle_add(now, &mut self.surface, &self.sensors, &mut self.inventory);
            }
            UiAction::ClearStaging => {
                if let Some(event) = self.debouncer.clear(now) {
                    self.popup
                        .on_staging_event(&event, &mut self.surface, &self.sensors, &self.inventory);
                }
            }
            UiAction::ConfigureAms => {
                self.popup.dismiss(&mut self.surface);
                self.nav.request(ScreenId::ScanResult);
            }
        }
    }

    /// Screen-specific refresh functions; navigation targets without one are
    /// left static between navigations.
    fn refresh_for(screen: ScreenId) -> Option<fn(&mut Self, Instant)> {
        match screen {
            ScreenId::Home => Some(Self::refresh_home),
            ScreenId::AmsOverview => Some(Self::refresh_ams),
            ScreenId::ScanResult => Some(Self::refresh_scan),
            ScreenId::SpoolDetails => Some(Self::refresh_details),
            ScreenId::Settings(_) => Some(Self::refresh_settings),
        }
    }

    fn refresh_home(&mut self, _now: Instant) {
        let scale = self.sensors.scale();
        if scale.ready {
            self.surface
                .set_label(FieldId::WeightValue, &format!("{:.1}g", scale.grams));
            self.surface
                .set_label(FieldId::WeightStable, if scale.stable { "stable" } else { "..." });
        } else {
            self.surface.set_label(FieldId::WeightValue, "N/A");
            self.surface.set_label(FieldId::WeightStable, "");
        }
        self.surface.set_label(
            FieldId::NfcStatus,
            if self.debouncer.is_staged() { "Tag staged" } else { "Ready" },
        );

        let snapshot = self.cache.get();
        self.surface.set_label(
            FieldId::BackendStatus,
            if snapshot.reachable { "Online" } else { "Offline" },
        );

        for card in 0..PRINTER_CARDS {
            let fields = [
                FieldId::PrinterName(card),
                FieldId::PrinterStatus(card),
                FieldId::PrinterProgress(card),
                FieldId::PrinterRemaining(card),
            ];
            let Some(printer) = snapshot.printers.get(card as usize) else {
                for field in fields {
                    self.surface.set_visible(field, false);
                }
                continue;
            };
            for field in fields {
                self.surface.set_visible(field, true);
            }
            let name = if printer.name.is_empty() { &printer.serial } else { &printer.name };
            self.surface.set_label(FieldId::PrinterName(card), name);
            let status = if printer.connected {
                printer.job_state.label()
            } else {
                "Disconnected"
            };
            self.surface.set_label(FieldId::PrinterStatus(card), status);
            if printer.connected && printer.is_printing() {
                self.surface
                    .set_label(FieldId::PrinterProgress(card), &format!("{}%", printer.progress));
                self.surface.set_label(
                    FieldId::PrinterRemaining(card),
                    &format_remaining(printer.remaining_min),
                );
            } else {
                self.surface.set_label(FieldId::PrinterProgress(card), "");
                self.surface.set_label(FieldId::PrinterRemaining(card), "");
            }
        }
    }

    fn refresh_ams(&mut self, _now: Instant) {
        let snapshot = self.cache.get();
        let printer = snapshot.active_printer();
        self.surface.set_label(
            FieldId::AmsPrinterName,
            printer.map_or("No printer", |p| {
                if p.name.is_empty() { &p.serial } else { &p.name }
            }),
        );

        for unit_idx in 0..AMS_UNITS_SHOWN {
            let unit = printer.and_then(|p| p.ams_units.get(unit_idx as usize));
            let unit_fields_visible = unit.is_some();
            self.surface
                .set_visible(FieldId::AmsHumidity(unit_idx), unit_fields_visible);
            self.surface
                .set_visible(FieldId::AmsTemperature(unit_idx), unit_fields_visible);
            if let Some(unit) = unit {
                self.surface
                    .set_label(FieldId::AmsHumidity(unit_idx), &format_percent(unit.humidity));
                self.surface.set_label(
                    FieldId::AmsTemperature(unit_idx),
                    &format_celsius(unit.temperature),
                );
            }
            for slot in 0..TRAYS_PER_UNIT {
                let tray = unit.and_then(|u| u.trays.get(slot as usize));
                let material = FieldId::TrayMaterial { unit: unit_idx, slot };
                let remain = FieldId::TrayRemain { unit: unit_idx, slot };
                match tray {
                    Some(tray) => {
                        self.surface.set_visible(material, true);
                        self.surface.set_visible(remain, true);
                        self.surface.set_label(
                            material,
                            if tray.material.is_empty() { "Empty" } else { &tray.material },
                        );
                        self.surface.set_label(remain, &format_percent(tray.remaining));
                    }
                    None => {
                        self.surface.set_visible(material, false);
                        self.surface.set_visible(remain, false);
                    }
                }
            }
        }
    }

    fn refresh_scan(&mut self, _now: Instant) {
        let Some(uid) = self.debouncer.staged_uid().cloned() else {
            self.surface.set_label(FieldId::ScanUid, "No tag");
            for field in [
                FieldId::ScanVendor,
                FieldId::ScanMaterial,
                FieldId::ScanColor,
                FieldId::ScanWeight,
            ] {
                self.surface.set_label(field, "--");
            }
            return;
        };
        let info = self.sensors.decoded_tag_info(&uid);
        self.surface.set_label(FieldId::ScanUid, uid.as_str());
        self.surface.set_label(FieldId::ScanVendor, info.vendor_label());
        self.surface.set_label(FieldId::ScanMaterial, info.material_label());
        self.surface.set_label(FieldId::ScanColor, info.color_label());
        let weight = if info.spool_weight_g > 0 {
            format!("{}g", info.spool_weight_g)
        } else {
            "--".to_owned()
        };
        self.surface.set_label(FieldId::ScanWeight, &weight);
    }

    fn refresh_details(&mut self, _now: Instant) {
        let Some(uid) = self.debouncer.staged_uid().cloned() else {
            self.surface.set_label(FieldId::DetailTitle, "No spool selected");
            for field in [FieldId::DetailMaterial, FieldId::DetailColor, FieldId::DetailWeight] {
                self.surface.set_label(field, "--");
            }
            return;
        };
        let info = self.sensors.decoded_tag_info(&uid);
        let scale = self.sensors.scale();
        self.surface.set_label(
            FieldId::DetailTitle,
            &format!("{} {}", info.vendor_label(), info.material_label()),
        );
        self.surface.set_label(FieldId::DetailMaterial, info.material_label());
        self.surface.set_label(FieldId::DetailColor, info.color_label());
        let weight = if scale.ready {
            format!("{:.1}g", scale.grams)
        } else {
            "--".to_owned()
        };
        self.surface.set_label(FieldId::DetailWeight, &weight);
    }

    fn refresh_settings(&mut self, _now: Instant) {
        let title = match self.nav.current() {
            ScreenId::Settings(SettingsPanel::Network) => "Network",
            ScreenId::Settings(SettingsPanel::Printers) => "Printers",
            ScreenId::Settings(SettingsPanel::Update) => "Firmware Update",
            _ => "Settings",
        };
        self.surface.set_label(FieldId::SettingsTitle, title);

        let snapshot = self.cache.get();
        let status = if snapshot.reachable {
            format!("Backend online, {} printer(s)", snapshot.printers.len())
        } else {
            "Backend offline".to_owned()
        };
        self.surface.set_label(FieldId::SettingsBackend, &status);
    }

    fn publish_report(&self) {
        let scale = self.sensors.scale();
        self.report.set(DeviceReport {
            weight: scale.grams,
            stable: scale.stable,
            tag_uid: self.debouncer.staged_uid().map(|uid| uid.as_str().to_owned()),
        });
    }

    pub fn current_screen(&self) -> ScreenId {
        self.nav.current()
    }

    pub fn popup(&self) -> &PopupController {
        &self.popup
    }

    pub fn debouncer(&self) -> &TagDebouncer {
        &self.debouncer
    }

    pub fn surface(&self) -> &U {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut U {
        &mut self.surface
    }

    pub fn sensors_mut(&mut self) -> &mut S {
        &mut self.sensors
    }

    pub fn inventory(&self) -> &I {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut I {
        &mut self.inventory
    }
}

fn format_remaining(minutes: i32) -> String {
    if minutes <= 0 {
        return String::new();
    }
    if minutes >= 60 {
        format!("{}h {}m left", minutes / 60, minutes % 60)
    } else {
        format!("{minutes}m left")
    }
}

fn format_percent(value: i32) -> String {
    if value < 0 { "--".to_owned() } else { format!("{value}%") }
}

fn format_celsius(value: i32) -> String {
    if value < 0 { "--".to_owned() } else { format!("{value}\u{b0}C") }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::inventory::MemoryInventory;
    use crate::remote::{AmsTray, AmsUnit, JobState, PrinterState};
    use crate::sensors::{DecodedTagInfo, StaticSensors, TagUid};
    use crate::surface::ArenaSurface;

    type TestScheduler = TickScheduler<StaticSensors, MemoryInventory, ArenaSurface>;

    fn engine() -> (TestScheduler, SnapshotCache) {
        let cache = SnapshotCache::new();
        let mut sensors = StaticSensors::new();
        sensors.set_scale(812.5, true, true);
        let engine = TickScheduler::new(
            &Config::default(),
            ArenaSurface::new(),
            sensors,
            MemoryInventory::new(),
            cache.clone(),
            DeviceReportCell::new(),
        );
        (engine, cache)
    }

    fn printing_printer() -> PrinterState {
        PrinterState {
            serial: "01S00C1".into(),
            name: "X1C Studio".into(),
            connected: true,
            job_state: JobState::Running,
            progress: 63,
            remaining_min: 107,
            ams_units: vec![AmsUnit {
                id: 0,
                humidity: 32,
                temperature: 28,
                extruder: 0,
                trays: vec![AmsTray {
                    material: "PLA".into(),
                    color_rgba: 0x2196_F3FF,
                    remaining: 85,
                }],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn starts_on_home_screen() {
        let (engine, _cache) = engine();
        assert_eq!(engine.current_screen(), ScreenId::Home);
        assert_eq!(engine.surface().shown_screen(), Some(ScreenId::Home));
    }

    #[test]
    fn home_refresh_pulls_scale_and_snapshot() {
        let (mut engine, cache) = engine();
        cache.store(vec![printing_printer()]);
        engine.tick(Instant::now());

        let surface = engine.surface();
        assert_eq!(surface.label(FieldId::WeightValue), Some("812.5g"));
        assert_eq!(surface.label(FieldId::BackendStatus), Some("Online"));
        assert_eq!(surface.label(FieldId::PrinterName(0)), Some("X1C Studio"));
        assert_eq!(surface.label(FieldId::PrinterStatus(0)), Some("Printing"));
        assert_eq!(surface.label(FieldId::PrinterProgress(0)), Some("63%"));
        assert_eq!(surface.label(FieldId::PrinterRemaining(0)), Some("1h 47m left"));
        assert!(!surface.is_visible(FieldId::PrinterName(1)));
    }

    #[test]
    fn unreachable_backend_shows_last_known_good() {
        let (mut engine, cache) = engine();
        cache.store(vec![printing_printer()]);
        cache.mark_unreachable();
        engine.tick(Instant::now());

        let surface = engine.surface();
        assert_eq!(surface.label(FieldId::BackendStatus), Some("Offline"));
        // Printer card still drawn from the retained snapshot.
        assert_eq!(surface.label(FieldId::PrinterName(0)), Some("X1C Studio"));
    }

    #[test]
    fn navigation_applies_before_refresh() {
        let (mut engine, _cache) = engine();
        let uid = TagUid::new("04:A1:B2:C3");
        engine.sensors_mut().place_tag(
            uid.clone(),
            Some(DecodedTagInfo {
                vendor: "Bambu Lab".into(),
                material: "PLA".into(),
                ..Default::default()
            }),
        );

        let t0 = Instant::now();
        engine.tick(t0);

        // Navigate to scan result; the same tick's refresh must fill the
        // scan screen, not the home screen it left.
        engine.actions().post(UiAction::Navigate(ScreenId::ScanResult));
        engine.tick(t0 + Duration::from_millis(8));

        assert_eq!(engine.current_screen(), ScreenId::ScanResult);
        let surface = engine.surface();
        assert_eq!(surface.label(FieldId::ScanUid), Some("04:A1:B2:C3"));
        assert_eq!(surface.label(FieldId::ScanVendor), Some("Bambu Lab"));
    }

    #[test]
    fn popup_opens_within_one_tick_of_staging() {
        let (mut engine, _cache) = engine();
        engine.sensors_mut().place_tag(TagUid::new("04:A1"), None);
        engine.tick(Instant::now());
        assert!(engine.popup().is_visible());
        assert!(engine.surface().overlay_open());
    }

    #[test]
    fn two_requests_one_navigation() {
        let (mut engine, _cache) = engine();
        let tx = engine.actions();
        tx.post(UiAction::Navigate(ScreenId::Settings(SettingsPanel::General)));
        tx.post(UiAction::Navigate(ScreenId::AmsOverview));
        engine.tick(Instant::now());
        assert_eq!(engine.current_screen(), ScreenId::AmsOverview);
    }

    #[test]
    fn clear_staging_action_closes_popup_and_unstages() {
        let (mut engine, _cache) = engine();
        engine.sensors_mut().place_tag(TagUid::new("04:A1"), None);
        let t0 = Instant::now();
        engine.tick(t0);
        assert!(engine.popup().is_visible());

        engine.actions().post(UiAction::ClearStaging);
        // Tag still on the reader, but it was just cleared: the block keeps
        // it from instantly re-staging.
        engine.tick(t0 + Duration::from_millis(8));
        assert!(!engine.popup().is_visible());
        assert!(!engine.debouncer().is_staged());
    }

    #[test]
    fn configure_ams_closes_popup_and_navigates() {
        let (mut engine, _cache) = engine();
        engine.sensors_mut().place_tag(TagUid::new("04:A1"), None);
        let t0 = Instant::now();
        engine.tick(t0);

        engine.actions().post(UiAction::ConfigureAms);
        engine.tick(t0 + Duration::from_millis(8));
        assert!(!engine.popup().is_visible());
        assert_eq!(engine.current_screen(), ScreenId::ScanResult);
    }

    #[test]
    fn ams_screen_renders_unit_and_trays() {
        let (mut engine, cache) = engine();
        cache.store(vec![printing_printer()]);
        engine.actions().post(UiAction::Navigate(ScreenId::AmsOverview));
        engine.tick(Instant::now());

        let surface = engine.surface();
        assert_eq!(surface.label(FieldId::AmsPrinterName), Some("X1C Studio"));
        assert_eq!(surface.label(FieldId::AmsHumidity(0)), Some("32%"));
        assert_eq!(surface.label(FieldId::AmsTemperature(0)), Some("28\u{b0}C"));
        assert_eq!(
            surface.label(FieldId::TrayMaterial { unit: 0, slot: 0 }),
            Some("PLA")
        );
        assert_eq!(
            surface.label(FieldId::TrayRemain { unit: 0, slot: 0 }),
            Some("85%")
        );
        assert!(!surface.is_visible(FieldId::AmsHumidity(1)));
    }

    #[test]
    fn device_report_tracks_scale_and_staged_tag() {
        let cell = DeviceReportCell::new();
        let mut sensors = StaticSensors::new();
        sensors.set_scale(900.0, false, true);
        let mut engine = TickScheduler::new(
            &Config::default(),
            ArenaSurface::new(),
            sensors,
            MemoryInventory::new(),
            SnapshotCache::new(),
            cell.clone(),
        );

        engine.sensors_mut().place_tag(TagUid::new("04:A1"), None);
        engine.tick(Instant::now());

        let report = cell.get();
        assert_eq!(report.weight, 900.0);
        assert!(!report.stable);
        assert_eq!(report.tag_uid.as_deref(), Some("04:A1"));
    }
}
