//! SpoolStation display core: the state-synchronization and navigation engine.
//!
//! The engine reconciles three independently-timed input sources (the NFC tag
//! reader, the weight scale, and a periodically-polled backend) into a single
//! consistent screen, and drives transitions between a fixed set of screens
//! plus one transient modal overlay.
//!
//! Everything here runs on one logical thread. Producers that block on I/O
//! (the backend poller) live on their own thread and hand results over as
//! complete, immutable snapshots; the UI thread never sees a partial write and
//! never blocks. The single driver is [`sched::TickScheduler::tick`], invoked
//! at a fixed cadence by the host (firmware main loop or the simulator).

pub mod actions;
pub mod config;
pub mod error;
pub mod inventory;
pub mod nav;
pub mod popup;
pub mod remote;
pub mod sched;
pub mod screen;
pub mod sensors;
pub mod staging;
pub mod surface;

pub use actions::{ActionSender, UiAction};
pub use config::Config;
pub use error::PollError;
pub use inventory::{AddSpoolRequest, Inventory, MemoryInventory};
pub use nav::NavController;
pub use popup::PopupController;
pub use remote::{
    AmsTray, AmsUnit, DeviceReport, DeviceReportCell, JobState, PollerHandle, PrinterState,
    RemoteClient, RemoteSnapshot, SnapshotCache,
};
pub use sched::TickScheduler;
pub use screen::{ScreenId, SettingsPanel};
pub use sensors::{DecodedTagInfo, ScaleReading, SensorHub, StaticSensors, TagUid};
pub use staging::{StagingEvent, TagDebouncer};
pub use surface::{ArenaSurface, FieldId, Surface, SurfaceOp};
