//! Screen navigation controller.
//!
//! A three-field state machine: the screen actually rendered, the previously
//! rendered screen (single-level back), and a pending request queued by UI
//! action handlers. `tick` consumes the request at most once, tears the
//! outgoing widget tree down before the target is built (screens are never
//! simultaneously live), and leaves `pending` empty no matter what.

use crate::screen::ScreenId;
use crate::surface::Surface;

pub struct NavController {
    current: ScreenId,
    previous: ScreenId,
    pending: Option<ScreenId>,
}

impl NavController {
    /// Build and show the initial screen.
    pub fn new(initial: ScreenId, surface: &mut impl Surface) -> Self {
        surface.build_screen(initial);
        surface.show_screen(initial);
        Self {
            current: initial,
            previous: initial,
            pending: None,
        }
    }

    /// Queue a navigation request for the next tick. The last request within
    /// one tick wins; there is no queue depth beyond one.
    pub fn request(&mut self, screen: ScreenId) {
        if let Some(replaced) = self.pending.replace(screen)
            && replaced != screen
        {
            tracing::debug!(?replaced, target = ?screen, "pending navigation replaced");
        }
    }

    /// Navigate to the previously active screen.
    pub fn back(&mut self) {
        self.request(self.previous);
    }

    /// Apply the pending request, if any. Returns whether a navigation
    /// happened. `pending` is `None` after this returns, always.
    pub fn tick(&mut self, surface: &mut impl Surface) -> bool {
        let Some(target) = self.pending.take() else {
            return false;
        };
        if target == self.current {
            return false;
        }
        if !surface.has_screen(target) {
            debug_assert!(false, "navigation request for unknown screen {target}");
            tracing::error!(%target, "ignoring navigation request for unknown screen");
            return false;
        }

        tracing::info!(from = %self.current, to = %target, "navigating");
        // Outgoing resources are released before the target is built, to
        // bound peak widget memory.
        surface.destroy_screen(self.current);
        surface.build_screen(target);
        surface.show_screen(target);

        self.previous = self.current;
        self.current = target;
        true
    }

    pub fn current(&self) -> ScreenId {
        self.current
    }

    pub fn previous(&self) -> ScreenId {
        self.previous
    }

    pub fn pending(&self) -> Option<ScreenId> {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::surface::{ArenaSurface, FieldId, SurfaceOp};

    fn setup() -> (NavController, ArenaSurface) {
        let mut surface = ArenaSurface::new();
        let nav = NavController::new(ScreenId::Home, &mut surface);
        surface.take_ops();
        (nav, surface)
    }

    #[test]
    fn pending_is_consumed_exactly_once() {
        let (mut nav, mut surface) = setup();
        nav.request(ScreenId::AmsOverview);
        assert_eq!(nav.pending(), Some(ScreenId::AmsOverview));

        assert!(nav.tick(&mut surface));
        assert_eq!(nav.pending(), None);
        assert_eq!(nav.current(), ScreenId::AmsOverview);

        // Second tick with nothing queued does not re-navigate.
        assert!(!nav.tick(&mut surface));
        assert_eq!(nav.pending(), None);
    }

    #[test]
    fn teardown_happens_before_build() {
        let (mut nav, mut surface) = setup();
        nav.request(ScreenId::ScanResult);
        nav.tick(&mut surface);
        assert_eq!(
            surface.take_ops(),
            vec![
                SurfaceOp::Destroy(ScreenId::Home),
                SurfaceOp::Build(ScreenId::ScanResult),
                SurfaceOp::Show(ScreenId::ScanResult),
            ]
        );
    }

    #[test]
    fn last_request_in_a_tick_wins() {
        let (mut nav, mut surface) = setup();
        nav.request(ScreenId::Settings(crate::screen::SettingsPanel::General));
        nav.request(ScreenId::AmsOverview);
        assert!(nav.tick(&mut surface));
        assert_eq!(nav.current(), ScreenId::AmsOverview);
        // Exactly one teardown/build pair.
        let ops = surface.take_ops();
        assert_eq!(
            ops.iter().filter(|op| matches!(op, SurfaceOp::Destroy(_))).count(),
            1
        );
        assert_eq!(
            ops.iter().filter(|op| matches!(op, SurfaceOp::Build(_))).count(),
            1
        );
    }

    #[test]
    fn back_returns_to_previous_screen() {
        let (mut nav, mut surface) = setup();
        nav.request(ScreenId::SpoolDetails);
        nav.tick(&mut surface);
        assert_eq!(nav.previous(), ScreenId::Home);

        nav.back();
        nav.tick(&mut surface);
        assert_eq!(nav.current(), ScreenId::Home);
        assert_eq!(nav.previous(), ScreenId::SpoolDetails);
    }

    #[test]
    fn navigating_to_current_screen_is_a_noop() {
        let (mut nav, mut surface) = setup();
        nav.request(ScreenId::Home);
        assert!(!nav.tick(&mut surface));
        assert_eq!(nav.pending(), None);
        assert!(surface.take_ops().is_empty());
    }

    #[test]
    fn screens_are_never_simultaneously_live() {
        let (mut nav, mut surface) = setup();
        let home_widgets = surface.live_widgets();
        nav.request(ScreenId::ScanResult);
        nav.tick(&mut surface);
        // Only the scan-result widgets remain.
        assert!(surface.live_widgets() < home_widgets);
        assert_eq!(surface.label(FieldId::WeightValue), None);
    }

    struct NoScanSurface(ArenaSurface);

    impl Surface for NoScanSurface {
        fn run_timers(&mut self, now: Instant) {
            self.0.run_timers(now);
        }
        fn has_screen(&self, id: ScreenId) -> bool {
            id != ScreenId::ScanResult
        }
        fn build_screen(&mut self, id: ScreenId) {
            self.0.build_screen(id);
        }
        fn destroy_screen(&mut self, id: ScreenId) {
            self.0.destroy_screen(id);
        }
        fn show_screen(&mut self, id: ScreenId) {
            self.0.show_screen(id);
        }
        fn set_label(&mut self, field: FieldId, text: &str) {
            self.0.set_label(field, text);
        }
        fn set_visible(&mut self, field: FieldId, visible: bool) {
            self.0.set_visible(field, visible);
        }
        fn create_overlay(&mut self) {
            self.0.create_overlay();
        }
        fn destroy_overlay(&mut self) {
            self.0.destroy_overlay();
        }
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn unknown_screen_is_ignored_in_release() {
        let mut surface = NoScanSurface(ArenaSurface::new());
        let mut nav = NavController::new(ScreenId::Home, &mut surface);
        nav.request(ScreenId::ScanResult);
        assert!(!nav.tick(&mut surface));
        assert_eq!(nav.current(), ScreenId::Home);
        assert_eq!(nav.pending(), None);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unknown screen")]
    fn unknown_screen_is_fatal_in_debug() {
        let mut surface = NoScanSurface(ArenaSurface::new());
        let mut nav = NavController::new(ScreenId::Home, &mut surface);
        nav.request(ScreenId::ScanResult);
        nav.tick(&mut surface);
    }
}
