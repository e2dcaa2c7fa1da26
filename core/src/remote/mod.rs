//! Remote state: the backend snapshot data model, its parse contract, the
//! non-blocking cache the UI reads from, and the poller thread that refreshes
//! it.

mod cache;
mod model;
mod parse;
mod poller;

pub use cache::{RemoteSnapshot, SnapshotCache};
pub use model::{AmsTray, AmsUnit, JobState, PrinterState};
pub use parse::parse_printer_list;
pub use poller::{DeviceReport, DeviceReportCell, PollerHandle, spawn_poller};

use crate::error::PollError;

/// Transport to the backend, owned by the poller thread.
///
/// Implementations own their timeouts: a single stalled request must fail the
/// attempt, not block subsequent polls. Both methods may block; they are never
/// called from the tick thread.
pub trait RemoteClient {
    /// Fetch and parse the current printer list.
    fn fetch_snapshot(&mut self) -> Result<Vec<PrinterState>, PollError>;

    /// Best-effort telemetry push of the station's own state. Failures are
    /// logged and swallowed.
    fn push_device_state(&mut self, report: &DeviceReport);
}
