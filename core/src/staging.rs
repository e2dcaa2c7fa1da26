//! Tag presence debouncer.
//!
//! The raw reader signal flickers: a tag sitting untouched on the antenna can
//! drop out for a few samples, and a read can report presence without
//! recovering a UID. The debouncer turns that into a stable, time-boxed
//! "staged" signal so the UI layer never has to debounce on its own.
//!
//! Policy:
//! - a confirmed read of the *same* UID does not reset the deadline; the
//!   countdown keeps running while the tag rests on the reader;
//! - a confirmed read of a *different* UID supersedes the staged tag and
//!   restarts the deadline;
//! - an absence sample never clears staging; only TTL expiry or an explicit
//!   clear does, and expiry fires even while the tag is still detected;
//! - an explicitly cleared UID is blocked for a short window so continuous
//!   re-detection cannot instantly re-stage the tag the user just dismissed.

use std::time::{Duration, Instant};

use crate::sensors::TagUid;

/// What one debouncer update meant for the rest of the system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StagingEvent {
    /// Nothing the UI needs to react to.
    Unchanged,
    /// A tag became staged from an empty state.
    Staged(TagUid),
    /// A different tag replaced the staged one in a single step.
    Superseded { old: TagUid, new: TagUid },
    /// Staging ended: TTL elapsed or the user cleared it.
    Expired(TagUid),
}

struct StagedTag {
    uid: TagUid,
    staged_since: Instant,
}

/// Debounces raw presence samples into the staged-tag signal.
pub struct TagDebouncer {
    staged: Option<StagedTag>,
    /// UID blocked after an explicit clear, and when the block lifts.
    blocked: Option<(TagUid, Instant)>,
    ttl: Duration,
    block: Duration,
}

impl TagDebouncer {
    pub fn new(ttl: Duration, block: Duration) -> Self {
        Self {
            staged: None,
            blocked: None,
            ttl,
            block,
        }
    }

    /// Feed one raw sample. Call once per tick.
    ///
    /// A `raw_present` sample without a UID is a flaky read and is treated as
    /// absence; staging persistence covers the gap.
    pub fn update(
        &mut self,
        raw_present: bool,
        raw_uid: Option<&TagUid>,
        now: Instant,
    ) -> StagingEvent {
        if let Some((uid, until)) = &self.blocked {
            if now >= *until {
                tracing::debug!(%uid, "tag block expired");
                self.blocked = None;
            }
        }

        // TTL runs from the instant the uid staged; a resident tag does not
        // hold its own staging open, so check expiry before the sample.
        if let Some(staged) = &self.staged
            && now.duration_since(staged.staged_since) >= self.ttl
        {
            let uid = self.staged.take().map(|s| s.uid).expect("staged checked above");
            tracing::info!(%uid, "staging expired");
            return StagingEvent::Expired(uid);
        }

        let confirmed = if raw_present { raw_uid } else { None };
        let confirmed = confirmed.filter(|uid| !self.is_blocked(uid));

        if let Some(uid) = confirmed {
            return match &mut self.staged {
                Some(staged) if staged.uid == *uid => {
                    // Same tag still on the reader: the countdown keeps
                    // running. Only a new tag restarts it.
                    StagingEvent::Unchanged
                }
                Some(_) => {
                    let old = self.staged.take().map(|s| s.uid).unwrap_or_else(|| uid.clone());
                    self.staged = Some(StagedTag {
                        uid: uid.clone(),
                        staged_since: now,
                    });
                    tracing::info!(%old, new = %uid, "staged tag superseded");
                    StagingEvent::Superseded {
                        old,
                        new: uid.clone(),
                    }
                }
                None => {
                    self.staged = Some(StagedTag {
                        uid: uid.clone(),
                        staged_since: now,
                    });
                    tracing::info!(%uid, "tag staged");
                    StagingEvent::Staged(uid.clone())
                }
            };
        }

        // Absent (or flaky, or blocked): staging persists until the TTL.
        StagingEvent::Unchanged
    }

    /// Explicit user clear. Emits `Expired` for the staged tag, if any, and
    /// blocks that UID for the configured window.
    pub fn clear(&mut self, now: Instant) -> Option<StagingEvent> {
        let staged = self.staged.take()?;
        tracing::info!(uid = %staged.uid, block = ?self.block, "staging cleared by user");
        self.blocked = Some((staged.uid.clone(), now + self.block));
        Some(StagingEvent::Expired(staged.uid))
    }

    pub fn staged_uid(&self) -> Option<&TagUid> {
        self.staged.as_ref().map(|s| &s.uid)
    }

    pub fn is_staged(&self) -> bool {
        self.staged.is_some()
    }

    /// Time left before the staged tag expires; `None` when nothing is staged.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let staged = self.staged.as_ref()?;
        Some(self.ttl.saturating_sub(now.duration_since(staged.staged_since)))
    }

    fn is_blocked(&self, uid: &TagUid) -> bool {
        self.blocked.as_ref().is_some_and(|(blocked, _)| blocked == uid)
    }
}
