//! Consumed sensor interface: NFC tag reader and weight scale.
//!
//! The low-level drivers live outside this crate; the engine only sees
//! non-blocking queries returning last-known values.

use std::collections::HashMap;
use std::fmt;

/// NFC tag UID, canonically formatted as colon-separated uppercase hex
/// (`"04:A1:B2:C3"`).
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct TagUid(String);

impl TagUid {
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    /// Format raw UID bytes from the reader into the canonical form.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut s = String::with_capacity(bytes.len() * 3);
        for (i, b) in bytes.iter().enumerate() {
            if i > 0 {
                s.push(':');
            }
            s.push_str(&format!("{b:02X}"));
        }
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoded tag payload. All fields stay empty until the tag decoder has run;
/// an undecoded tag is still stageable and addable with placeholder fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodedTagInfo {
    pub vendor: String,
    pub material: String,
    pub subtype: String,
    pub color_name: String,
    /// Packed `0xRRGGBBAA`.
    pub color_rgba: u32,
    /// Nominal spool weight in grams, 0 if unknown.
    pub spool_weight_g: i32,
    /// Tag format identifier, e.g. `"openspool"` or `"bambu"`.
    pub tag_format: String,
}

impl DecodedTagInfo {
    /// Whether the decoder produced anything at all for this tag.
    pub fn is_decoded(&self) -> bool {
        !self.vendor.is_empty()
    }

    pub fn vendor_label(&self) -> &str {
        non_empty_or(&self.vendor, "Unknown")
    }

    pub fn material_label(&self) -> &str {
        non_empty_or(&self.material, "Unknown")
    }

    pub fn color_label(&self) -> &str {
        non_empty_or(&self.color_name, "Unknown")
    }
}

fn non_empty_or<'a>(s: &'a str, fallback: &'a str) -> &'a str {
    if s.is_empty() { fallback } else { s }
}

/// One scale sample. `ready` is false until the driver has completed its
/// startup tare.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScaleReading {
    pub grams: f32,
    pub stable: bool,
    pub ready: bool,
}

/// Non-blocking queries over the station's local sensors.
pub trait SensorHub {
    /// Raw presence sample. May flicker; the debouncer absorbs that.
    fn tag_present(&self) -> bool;

    /// UID of the tag currently seen, `None` when absent or when the read was
    /// too flaky to recover a UID.
    fn tag_uid(&self) -> Option<TagUid>;

    /// Cached decode result for a UID. Returns an empty [`DecodedTagInfo`]
    /// when the payload could not be decoded.
    fn decoded_tag_info(&self, uid: &TagUid) -> DecodedTagInfo;

    /// Last-known scale sample.
    fn scale(&self) -> ScaleReading;
}

/// In-memory [`SensorHub`] with settable state, used by the simulator and the
/// engine tests to script tag-presence episodes.
#[derive(Default)]
pub struct StaticSensors {
    present: bool,
    uid: Option<TagUid>,
    decoded: HashMap<TagUid, DecodedTagInfo>,
    reading: ScaleReading,
}

impl StaticSensors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a tag on the reader, optionally with a decoded payload.
    pub fn place_tag(&mut self, uid: TagUid, info: Option<DecodedTagInfo>) {
        if let Some(info) = info {
            self.decoded.insert(uid.clone(), info);
        }
        self.present = true;
        self.uid = Some(uid);
    }

    /// Lift the tag off the reader.
    pub fn remove_tag(&mut self) {
        self.present = false;
        self.uid = None;
    }

    /// Simulate a flaky read: the reader reports presence but no UID.
    pub fn flaky_read(&mut self) {
        self.present = true;
        self.uid = None;
    }

    pub fn set_scale(&mut self, grams: f32, stable: bool, ready: bool) {
        self.reading = ScaleReading { grams, stable, ready };
    }
}

impl SensorHub for StaticSensors {
    fn tag_present(&self) -> bool {
        self.present
    }

    fn tag_uid(&self) -> Option<TagUid> {
        self.uid.clone()
    }

    fn decoded_tag_info(&self, uid: &TagUid) -> DecodedTagInfo {
        self.decoded.get(uid).cloned().unwrap_or_default()
    }

    fn scale(&self) -> ScaleReading {
        self.reading
    }
}
