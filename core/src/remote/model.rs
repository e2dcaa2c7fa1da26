//! Printer/AMS data model mirrored from the backend.
//!
//! Unknown numeric fields hold `-1`, unknown text fields are empty; the
//! screens render sentinels as "--" rather than failing.

use serde::Serialize;

/// Job state parsed from the backend's `gcode_state` string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Idle,
    Prepare,
    Running,
    Pause,
    Finish,
    Failed,
    #[default]
    Unknown,
}

impl JobState {
    pub fn from_gcode_state(raw: &str) -> Self {
        match raw {
            "IDLE" => JobState::Idle,
            "PREPARE" => JobState::Prepare,
            "RUNNING" => JobState::Running,
            "PAUSE" => JobState::Pause,
            "FINISH" => JobState::Finish,
            "FAILED" => JobState::Failed,
            _ => JobState::Unknown,
        }
    }

    /// Short label for the printer cards.
    pub fn label(self) -> &'static str {
        match self {
            JobState::Idle => "Idle",
            JobState::Prepare => "Preparing",
            JobState::Running => "Printing",
            JobState::Pause => "Paused",
            JobState::Finish => "Done",
            JobState::Failed => "Failed",
            JobState::Unknown => "--",
        }
    }
}

/// One filament slot of an AMS unit.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AmsTray {
    /// Material type, e.g. `"PLA"`; empty when the slot is unread.
    #[serde(rename = "tray_type")]
    pub material: String,
    /// Packed `0xRRGGBBAA`; 0 when unknown.
    #[serde(rename = "tray_color", serialize_with = "ser_color")]
    pub color_rgba: u32,
    /// Remaining filament percentage, `-1` when unknown.
    #[serde(rename = "remain")]
    pub remaining: i32,
}

/// One AMS unit with its 1-4 trays.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AmsUnit {
    /// Unit id: 0-3 regular, 128+ for high-temperature units.
    pub id: i32,
    /// Percent, `-1` when the unit reports none.
    pub humidity: i32,
    /// Degrees Celsius, `-1` when the unit reports none.
    pub temperature: i32,
    /// Which extruder this unit feeds, `-1` when unknown.
    pub extruder: i32,
    pub trays: Vec<AmsTray>,
}

/// Live state of one printer as of the last successful poll.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PrinterState {
    pub serial: String,
    pub name: String,
    pub connected: bool,
    #[serde(rename = "gcode_state", serialize_with = "ser_job_state")]
    pub job_state: JobState,
    /// Print progress percent, 0 when idle or unknown.
    #[serde(rename = "print_progress")]
    pub progress: i32,
    /// Current print stage id, `-1` when idle.
    #[serde(rename = "stg_cur")]
    pub stage_id: i32,
    #[serde(rename = "stg_cur_name")]
    pub stage_name: String,
    /// Minutes left in the current job, 0 when unknown.
    #[serde(rename = "mc_remaining_time")]
    pub remaining_min: i32,
    #[serde(rename = "subtask_name")]
    pub job_name: String,
    /// Tray currently feeding, `-1` when none.
    pub tray_now: i32,
    /// Active extruder hint, `-1` when unknown.
    pub active_extruder: i32,
    pub ams_units: Vec<AmsUnit>,
}

impl PrinterState {
    /// Whether the printer has a job worth showing progress for.
    pub fn is_printing(&self) -> bool {
        matches!(self.job_state, JobState::Prepare | JobState::Running | JobState::Pause)
    }
}

fn ser_color<S: serde::Serializer>(color: &u32, ser: S) -> Result<S::Ok, S::Error> {
    ser.serialize_str(&format!("{color:08X}"))
}

fn ser_job_state<S: serde::Serializer>(state: &JobState, ser: S) -> Result<S::Ok, S::Error> {
    let raw = match state {
        JobState::Idle => "IDLE",
        JobState::Prepare => "PREPARE",
        JobState::Running => "RUNNING",
        JobState::Pause => "PAUSE",
        JobState::Finish => "FINISH",
        JobState::Failed => "FAILED",
        JobState::Unknown => "",
    };
    ser.serialize_str(raw)
}
