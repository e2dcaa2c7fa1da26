//! Modal tag popup controller.
//!
//! Keyed entirely off the debouncer's staging events, independent of which
//! screen is underneath. At most one popup instance is live; a superseding
//! tag closes and reopens it with freshly fetched decode data rather than
//! updating fields in place, so stale and new fields never mix.

use std::time::{Duration, Instant};

use crate::inventory::{AddSpoolRequest, Inventory};
use crate::sensors::{DecodedTagInfo, SensorHub, TagUid};
use crate::staging::{StagingEvent, TagDebouncer};
use crate::surface::{FieldId, Surface};

/// State of the popup's Add-to-inventory button.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AddState {
    /// Actionable. Stays actionable after a failed add (retry is safe).
    Ready,
    /// This add succeeded; button disabled, auto-close scheduled.
    Added,
    /// The spool was already in the inventory when the popup opened.
    InLibrary,
}

struct OpenPopup {
    uid: TagUid,
    info: DecodedTagInfo,
    add_state: AddState,
    /// Set after a successful add: close the popup at this instant.
    close_at: Option<Instant>,
}

pub struct PopupController {
    open: Option<OpenPopup>,
    /// Suppresses automatic re-opening while this uid remains staged. Set on
    /// a completed add, cleared only by `Expired`/`Superseded`.
    dismissed_for: Option<TagUid>,
    close_delay: Duration,
}

impl PopupController {
    pub fn new(close_delay: Duration) -> Self {
        Self {
            open: None,
            dismissed_for: None,
            close_delay,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.open.is_some()
    }

    pub fn current_uid(&self) -> Option<&TagUid> {
        self.open.as_ref().map(|p| &p.uid)
    }

    pub fn add_state(&self) -> Option<AddState> {
        self.open.as_ref().map(|p| p.add_state)
    }

    /// React to one staging event from the debouncer.
    pub fn on_staging_event<U, S, I>(
        &mut self,
        event: &StagingEvent,
        surface: &mut U,
        sensors: &S,
        inventory: &I,
    ) where
        U: Surface,
        S: SensorHub,
        I: Inventory + ?Sized,
    {
        match event {
            StagingEvent::Unchanged => {}
            StagingEvent::Staged(uid) => {
                if self.dismissed_for.as_ref() == Some(uid) {
                    tracing::debug!(%uid, "popup suppressed, dismissed for this tag");
                    return;
                }
                self.open_for(uid.clone(), surface, sensors, inventory);
            }
            StagingEvent::Superseded { old, new } => {
                // New tag takes over cleanly: close, then open with fresh
                // decode data. Never update the open popup in place.
                self.dismissed_for = None;
                if self.open.is_some() {
                    self.close(surface);
                }
                tracing::info!(%old, %new, "popup reopened for superseding tag");
                self.open_for(new.clone(), surface, sensors, inventory);
            }
            StagingEvent::Expired(uid) => {
                self.dismissed_for = None;
                if self.open.is_some() {
                    tracing::info!(%uid, "popup closed, staging ended");
                    self.close(surface);
                }
            }
        }
    }

    /// Explicit re-open request (tapping the NFC card on the home screen).
    pub fn show<U, S, I>(
        &mut self,
        debouncer: &TagDebouncer,
        surface: &mut U,
        sensors: &S,
        inventory: &I,
    ) where
        U: Surface,
        S: SensorHub,
        I: Inventory + ?Sized,
    {
        if self.open.is_some() {
            return;
        }
        let Some(uid) = debouncer.staged_uid() else {
            return;
        };
        if self.dismissed_for.as_ref() == Some(uid) {
            return;
        }
        self.open_for(uid.clone(), surface, sensors, inventory);
    }

    /// Explicit close. Staging and the dismissed flag are untouched; the
    /// popup can be re-opened while the tag stays staged.
    pub fn dismiss(&mut self, surface: &mut impl Surface) {
        if self.open.is_some() {
            tracing::info!("popup dismissed");
            self.close(surface);
        }
    }

    /// Add the staged spool to the inventory. Called once per button press;
    /// safe to call again after a failure.
    pub fn handle_add<U, S, I>(&mut self, now: Instant, surface: &mut U, sensors: &S, inventory: &mut I)
    where
        U: Surface,
        S: SensorHub,
        I: Inventory + ?Sized,
    {
        let Some(popup) = self.open.as_mut() else {
            return;
        };
        if popup.add_state != AddState::Ready {
            return;
        }

        let scale = sensors.scale();
        let request = AddSpoolRequest {
            tag_uid: popup.uid.clone(),
            vendor: popup.info.vendor_label().to_owned(),
            material: popup.info.material_label().to_owned(),
            subtype: popup.info.subtype.clone(),
            color_name: popup.info.color_label().to_owned(),
            color_rgba: popup.info.color_rgba,
            label_weight_g: popup.info.spool_weight_g,
            current_weight_g: if scale.ready { scale.grams as i32 } else { 0 },
            origin: "nfc_scan".to_owned(),
            tag_format: popup.info.tag_format.clone(),
        };

        if inventory.add_spool(&request) {
            tracing::info!(uid = %popup.uid, "spool added to inventory");
            popup.add_state = AddState::Added;
            popup.close_at = Some(now + self.close_delay);
            self.dismissed_for = Some(popup.uid.clone());
            surface.set_label(FieldId::PopupAddButton, "Added");
        } else {
            // Button stays actionable; the add is idempotent and retryable.
            tracing::warn!(uid = %popup.uid, "inventory rejected add");
        }
    }

    /// Per-tick upkeep: pending auto-close, then live weight and countdown.
    pub fn tick<U, S>(
        &mut self,
        now: Instant,
        debouncer: &TagDebouncer,
        surface: &mut U,
        sensors: &S,
    ) where
        U: Surface,
        S: SensorHub,
    {
        if let Some(popup) = &self.open
            && popup.close_at.is_some_and(|at| now >= at)
        {
            tracing::debug!("popup auto-closed after add feedback");
            self.close(surface);
        }

        if self.open.is_none() {
            return;
        }
        surface.set_label(FieldId::PopupWeight, &weight_line(sensors.scale()));
        if let Some(remaining) = debouncer.remaining(now) {
            surface.set_label(
                FieldId::PopupCountdown,
                &format!("Clear ({}s)", remaining.as_secs()),
            );
        }
    }

    fn open_for<U, S, I>(&mut self, uid: TagUid, surface: &mut U, sensors: &S, inventory: &I)
    where
        U: Surface,
        S: SensorHub,
        I: Inventory + ?Sized,
    {
        let info = sensors.decoded_tag_info(&uid);
        let add_state = if inventory.spool_exists(&uid) {
            AddState::InLibrary
        } else {
            AddState::Ready
        };
        tracing::info!(%uid, decoded = info.is_decoded(), ?add_state, "popup opened");

        surface.create_overlay();
        surface.set_label(FieldId::PopupTitle, "NFC Tag Detected");
        surface.set_label(FieldId::PopupUid, &format!("Tag: {uid}"));
        surface.set_label(FieldId::PopupWeight, &weight_line(sensors.scale()));
        surface.set_label(FieldId::PopupInfo, &info_lines(&info));
        let button = match add_state {
            AddState::Ready => "Add Spool",
            AddState::InLibrary => "In Library",
            AddState::Added => "Added",
        };
        surface.set_label(FieldId::PopupAddButton, button);

        self.open = Some(OpenPopup {
            uid,
            info,
            add_state,
            close_at: None,
        });
    }

    fn close(&mut self, surface: &mut impl Surface) {
        surface.destroy_overlay();
        self.open = None;
    }
}

fn weight_line(scale: crate::sensors::ScaleReading) -> String {
    if scale.ready {
        format!("Weight: {:.1}g", scale.grams)
    } else {
        "Weight: N/A (scale not ready)".to_owned()
    }
}

fn info_lines(info: &DecodedTagInfo) -> String {
    if info.is_decoded() {
        format!(
            "Vendor: {}\nMaterial: {}\nColor: {}",
            info.vendor_label(),
            info.material_label(),
            info.color_label(),
        )
    } else {
        "Material: Unknown\nColor: Unknown\n(Tag not decoded)".to_owned()
    }
}
