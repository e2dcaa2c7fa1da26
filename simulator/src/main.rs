//! SpoolStation PC Simulator
//!
//! Runs the display engine headless against scripted sensors and a canned
//! backend, logging every surface operation and label write. Useful for
//! eyeballing the tick pipeline without hardware.
//!
//! # Usage
//! ```bash
//! cargo run --release
//! RUST_LOG=spoolstation_core=debug cargo run
//! ```

use std::time::{Duration, Instant};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spoolstation_core::{
    ArenaSurface, Config, DecodedTagInfo, DeviceReport, DeviceReportCell, MemoryInventory,
    PollError, PrinterState, ScreenId, SnapshotCache, StaticSensors, TagUid, TickScheduler,
    UiAction,
    remote::{RemoteClient, parse_printer_list, spawn_poller},
};

/// Canned backend: serves a fixed printer list, with every fourth poll
/// failing to exercise the offline path.
struct ScriptedBackend {
    polls: usize,
}

impl RemoteClient for ScriptedBackend {
    fn fetch_snapshot(&mut self) -> Result<Vec<PrinterState>, PollError> {
        self.polls += 1;
        if self.polls % 4 == 0 {
            return Err(PollError::Unreachable("scripted outage".into()));
        }
        parse_printer_list(PRINTERS_JSON)
    }

    fn push_device_state(&mut self, report: &DeviceReport) {
        tracing::debug!(weight = report.weight, tag = ?report.tag_uid, "device state pushed");
    }
}

const PRINTERS_JSON: &str = r#"[{
    "serial": "01S00C960900001",
    "name": "Workshop X1C",
    "connected": true,
    "gcode_state": "RUNNING",
    "print_progress": 42,
    "mc_remaining_time": 95,
    "subtask_name": "bracket_v3",
    "tray_now": 1,
    "ams_units": [{
        "id": 0,
        "humidity": 31,
        "temperature": 27,
        "extruder": 0,
        "trays": [
            {"tray_type": "PLA", "tray_color": "2196F3FF", "remain": 81},
            {"tray_type": "PETG", "tray_color": "FF5722FF", "remain": 12}
        ]
    }]
}]"#;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spoolstation_simulator=info,spoolstation_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Config::from_env();
    let cache = SnapshotCache::new();
    let report = DeviceReportCell::new();
    let poller = spawn_poller(
        ScriptedBackend { polls: 0 },
        cache.clone(),
        report.clone(),
        Duration::from_millis(500),
    );

    let mut sensors = StaticSensors::new();
    sensors.set_scale(1012.4, true, true);
    let mut engine = TickScheduler::new(
        &cfg,
        ArenaSurface::new(),
        sensors,
        MemoryInventory::new(),
        cache,
        report,
    );
    let actions = engine.actions();

    // Ten seconds of scripted interaction: tag lands at 2s, its spool is
    // added at 4s, the user browses the AMS screen at 6s, clears at 8s.
    let start = Instant::now();
    let mut next_tick = start;
    let mut fired = [false; 4];
    tracing::info!("simulator started, 10s script");
    loop {
        let now = Instant::now();
        if now < next_tick {
            std::thread::sleep(next_tick - now);
        }
        next_tick += cfg.tick_period;
        let elapsed = start.elapsed();

        if elapsed >= Duration::from_secs(2) && !fired[0] {
            fired[0] = true;
            tracing::info!("script: tag placed on reader");
            engine.sensors_mut().place_tag(
                TagUid::new("04:9A:1C:F2"),
                Some(DecodedTagInfo {
                    vendor: "Polymaker".into(),
                    material: "PETG".into(),
                    color_name: "Teal".into(),
                    spool_weight_g: 1000,
                    tag_format: "openspool".into(),
                    ..Default::default()
                }),
            );
        }
        if elapsed >= Duration::from_secs(4) && !fired[1] {
            fired[1] = true;
            tracing::info!("script: add spool pressed");
            actions.post(UiAction::AddSpool);
        }
        if elapsed >= Duration::from_secs(6) && !fired[2] {
            fired[2] = true;
            tracing::info!("script: navigating to AMS overview");
            actions.post(UiAction::Navigate(ScreenId::AmsOverview));
        }
        if elapsed >= Duration::from_secs(8) && !fired[3] {
            fired[3] = true;
            tracing::info!("script: clearing staged tag");
            actions.post(UiAction::ClearStaging);
        }

        engine.tick(Instant::now());
        for op in engine.surface_mut().take_ops() {
            tracing::info!(?op, "surface op");
        }

        if elapsed >= Duration::from_secs(10) {
            break;
        }
    }

    tracing::info!(
        screen = %engine.current_screen(),
        widgets = engine.surface().live_widgets(),
        "simulator finished"
    );
    poller.stop();
}
