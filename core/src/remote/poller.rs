//! Backend poller thread.
//!
//! The only place in the core where blocking I/O happens. Each cycle fetches
//! a complete printer list, publishes it into the [`SnapshotCache`], and
//! pushes the station's own telemetry best-effort. Failures mark the cache
//! unreachable and are otherwise swallowed; a slow poll delays the next swap
//! but never the tick thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;

use super::{RemoteClient, cache::SnapshotCache};

/// Telemetry the station reports back: what is on the scale and on the
/// reader right now.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DeviceReport {
    pub weight: f32,
    pub stable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_uid: Option<String>,
}

/// Latest device report, written by the tick thread after each tick and read
/// by the poller on each cycle. Overwrite-only: the poller never needs
/// history, just the freshest value.
#[derive(Clone, Default)]
pub struct DeviceReportCell {
    inner: Arc<Mutex<DeviceReport>>,
}

impl DeviceReportCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, report: DeviceReport) {
        *self.inner.lock() = report;
    }

    pub fn get(&self) -> DeviceReport {
        self.inner.lock().clone()
    }
}

/// Owns the poller thread; signals shutdown and joins on drop.
pub struct PollerHandle {
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn stop(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                tracing::error!("poller thread panicked");
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}

/// Spawn the poller thread.
pub fn spawn_poller<C>(
    mut client: C,
    cache: SnapshotCache,
    report: DeviceReportCell,
    interval: Duration,
) -> PollerHandle
where
    C: RemoteClient + Send + 'static,
{
    let shutdown = Arc::new(AtomicBool::new(false));
    let stop = Arc::clone(&shutdown);

    let thread = thread::Builder::new()
        .name("backend-poller".into())
        .spawn(move || {
            tracing::info!(?interval, "backend poller started");
            while !stop.load(Ordering::Relaxed) {
                poll_once(&mut client, &cache, &report);
                sleep_interruptibly(interval, &stop);
            }
            tracing::info!("backend poller stopped");
        })
        .expect("spawn backend poller thread");

    PollerHandle {
        shutdown,
        thread: Some(thread),
    }
}

fn poll_once<C: RemoteClient>(client: &mut C, cache: &SnapshotCache, report: &DeviceReportCell) {
    match client.fetch_snapshot() {
        Ok(printers) => {
            tracing::debug!(printers = printers.len(), "snapshot updated");
            cache.store(printers);
        }
        Err(err) => {
            tracing::warn!(%err, "poll failed, serving last-known-good snapshot");
            cache.mark_unreachable();
        }
    }
    client.push_device_state(&report.get());
}

/// Sleep in short slices so shutdown is prompt even with long intervals.
fn sleep_interruptibly(total: Duration, stop: &AtomicBool) {
    const SLICE: Duration = Duration::from_millis(50);
    let mut remaining = total;
    while !remaining.is_zero() && !stop.load(Ordering::Relaxed) {
        let step = remaining.min(SLICE);
        thread::sleep(step);
        remaining -= step;
    }
}
