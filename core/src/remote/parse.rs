//! Lenient field-by-field parsing of the backend's printer list.
//!
//! Contract: a missing or wrong-typed field takes its documented sentinel
//! (`-1` numeric, empty string text) instead of failing the poll. Only a body
//! that is not JSON, or whose top level is not an array, fails the attempt.

use serde_json::Value;

use super::model::{AmsTray, AmsUnit, JobState, PrinterState};
use crate::error::PollError;

/// Printers beyond this are ignored, matching the station's display capacity.
const MAX_PRINTERS: usize = 8;
const MAX_AMS_UNITS: usize = 8;
const MAX_TRAYS: usize = 4;

/// Parse the `GET /api/printers` response body.
pub fn parse_printer_list(payload: &str) -> Result<Vec<PrinterState>, PollError> {
    let root: Value = serde_json::from_str(payload)?;
    let Some(entries) = root.as_array() else {
        return Err(PollError::UnexpectedShape("printer list is not an array"));
    };

    Ok(entries
        .iter()
        .take(MAX_PRINTERS)
        .map(parse_printer)
        .collect())
}

fn parse_printer(v: &Value) -> PrinterState {
    PrinterState {
        serial: str_field(v, "serial"),
        name: str_field(v, "name"),
        connected: v["connected"].as_bool().unwrap_or(false),
        job_state: JobState::from_gcode_state(&str_field(v, "gcode_state")),
        progress: int_field(v, "print_progress", 0),
        stage_id: int_field(v, "stg_cur", -1),
        stage_name: str_field(v, "stg_cur_name"),
        remaining_min: int_field(v, "mc_remaining_time", 0),
        job_name: str_field(v, "subtask_name"),
        tray_now: int_field(v, "tray_now", -1),
        active_extruder: int_field(v, "active_extruder", -1),
        ams_units: array_field(v, "ams_units", MAX_AMS_UNITS, parse_ams_unit),
    }
}

fn parse_ams_unit(v: &Value) -> AmsUnit {
    AmsUnit {
        id: int_field(v, "id", -1),
        humidity: int_field(v, "humidity", -1),
        temperature: int_field(v, "temperature", -1),
        extruder: int_field(v, "extruder", -1),
        trays: array_field(v, "trays", MAX_TRAYS, parse_tray),
    }
}

fn parse_tray(v: &Value) -> AmsTray {
    AmsTray {
        material: str_field(v, "tray_type"),
        color_rgba: parse_color(&str_field(v, "tray_color")),
        remaining: int_field(v, "remain", -1),
    }
}

/// Parse a packed `RRGGBBAA` hex color string, with or without a leading `#`.
/// Unparseable colors come back as 0 (fully transparent black).
pub fn parse_color(raw: &str) -> u32 {
    let hex = raw.trim_start_matches('#');
    if hex.len() != 8 {
        return 0;
    }
    u32::from_str_radix(hex, 16).unwrap_or(0)
}

fn str_field(v: &Value, name: &str) -> String {
    v[name].as_str().unwrap_or_default().to_owned()
}

fn int_field(v: &Value, name: &str, sentinel: i32) -> i32 {
    v[name]
        .as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .unwrap_or(sentinel)
}

fn array_field<T>(v: &Value, name: &str, cap: usize, f: impl Fn(&Value) -> T) -> Vec<T> {
    v[name]
        .as_array()
        .map(|items| items.iter().take(cap).map(f).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_printer() {
        let payload = r##"[{
            "serial": "01S00C123400000",
            "name": "X1C Studio",
            "connected": true,
            "gcode_state": "RUNNING",
            "print_progress": 63,
            "stg_cur": 2,
            "stg_cur_name": "Printing",
            "mc_remaining_time": 47,
            "subtask_name": "benchy.3mf",
            "tray_now": 1,
            "active_extruder": 0,
            "ams_units": [{
                "id": 0,
                "humidity": 32,
                "temperature": 28,
                "extruder": 0,
                "trays": [
                    {"tray_type": "PLA", "tray_color": "2196F3FF", "remain": 85},
                    {"tray_type": "PETG", "tray_color": "#FF5722FF", "remain": 40}
                ]
            }]
        }]"##;

        let printers = parse_printer_list(payload).unwrap();
        assert_eq!(printers.len(), 1);
        let p = &printers[0];
        assert_eq!(p.name, "X1C Studio");
        assert_eq!(p.job_state, JobState::Running);
        assert_eq!(p.progress, 63);
        assert_eq!(p.remaining_min, 47);
        assert_eq!(p.ams_units[0].trays[0].color_rgba, 0x2196_F3FF);
        assert_eq!(p.ams_units[0].trays[1].color_rgba, 0xFF57_22FF);
        assert_eq!(p.ams_units[0].trays[1].remaining, 40);
    }

    #[test]
    fn missing_fields_take_sentinels() {
        let printers = parse_printer_list(r#"[{"serial": "X"}]"#).unwrap();
        let p = &printers[0];
        assert_eq!(p.serial, "X");
        assert_eq!(p.name, "");
        assert!(!p.connected);
        assert_eq!(p.job_state, JobState::Unknown);
        assert_eq!(p.progress, 0);
        assert_eq!(p.stage_id, -1);
        assert_eq!(p.tray_now, -1);
        assert_eq!(p.active_extruder, -1);
        assert!(p.ams_units.is_empty());
    }

    #[test]
    fn wrong_typed_fields_take_sentinels_too() {
        let payload = r#"[{
            "serial": 42,
            "connected": "yes",
            "print_progress": "a lot",
            "ams_units": [{"humidity": null, "trays": [{"remain": "low", "tray_color": "red"}]}]
        }]"#;
        let printers = parse_printer_list(payload).unwrap();
        let p = &printers[0];
        assert_eq!(p.serial, "");
        assert!(!p.connected);
        assert_eq!(p.progress, 0);
        assert_eq!(p.ams_units[0].humidity, -1);
        assert_eq!(p.ams_units[0].trays[0].remaining, -1);
        assert_eq!(p.ams_units[0].trays[0].color_rgba, 0);
    }

    #[test]
    fn non_array_payload_fails_the_poll() {
        assert!(matches!(
            parse_printer_list(r#"{"error": "teapot"}"#),
            Err(PollError::UnexpectedShape(_))
        ));
        assert!(matches!(
            parse_printer_list("not json"),
            Err(PollError::Malformed(_))
        ));
    }

    #[test]
    fn printer_overflow_is_truncated() {
        let payload = format!(
            "[{}]",
            (0..12).map(|i| format!(r#"{{"serial":"P{i}"}}"#)).collect::<Vec<_>>().join(",")
        );
        let printers = parse_printer_list(&payload).unwrap();
        assert_eq!(printers.len(), 8);
    }

    #[test]
    fn model_serialization_round_trips_through_parse() {
        let printer = PrinterState {
            serial: "S1".into(),
            name: "P1S".into(),
            connected: true,
            job_state: JobState::Pause,
            progress: 10,
            stage_id: 4,
            stage_name: "Paused by user".into(),
            remaining_min: 90,
            job_name: "lid.3mf".into(),
            tray_now: 2,
            active_extruder: -1,
            ams_units: vec![AmsUnit {
                id: 0,
                humidity: 40,
                temperature: 26,
                extruder: -1,
                trays: vec![AmsTray {
                    material: "ABS".into(),
                    color_rgba: 0x0000_00FF,
                    remaining: 12,
                }],
            }],
        };
        let payload = serde_json::to_string(&vec![printer.clone()]).unwrap();
        let parsed = parse_printer_list(&payload).unwrap();
        assert_eq!(parsed, vec![printer]);
    }
}
