//! The closed set of screens the station can display.

use std::fmt;

/// Detail panels within the settings screen.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SettingsPanel {
    General,
    Network,
    Printers,
    Update,
}

/// Identifier for every screen the navigation controller can target.
/// Screens are mutually exclusive: at most one is live at a time, with the
/// tag popup rendered on a separate overlay layer above it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ScreenId {
    /// Landing screen: scale card, NFC card, printer summary cards.
    Home,
    /// Per-unit AMS humidity/temperature/tray detail.
    AmsOverview,
    /// Decoded fields of the staged tag.
    ScanResult,
    /// Detail panel for a single spool.
    SpoolDetails,
    Settings(SettingsPanel),
}

impl ScreenId {
    /// Every constructible screen, for arena pre-registration and tests.
    pub fn all() -> impl Iterator<Item = ScreenId> {
        [
            ScreenId::Home,
            ScreenId::AmsOverview,
            ScreenId::ScanResult,
            ScreenId::SpoolDetails,
            ScreenId::Settings(SettingsPanel::General),
            ScreenId::Settings(SettingsPanel::Network),
            ScreenId::Settings(SettingsPanel::Printers),
            ScreenId::Settings(SettingsPanel::Update),
        ]
        .into_iter()
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreenId::Home => f.write_str("home"),
            ScreenId::AmsOverview => f.write_str("ams_overview"),
            ScreenId::ScanResult => f.write_str("scan_result"),
            ScreenId::SpoolDetails => f.write_str("spool_details"),
            ScreenId::Settings(SettingsPanel::General) => f.write_str("settings"),
            ScreenId::Settings(SettingsPanel::Network) => f.write_str("settings_network"),
            ScreenId::Settings(SettingsPanel::Printers) => f.write_str("settings_printers"),
            ScreenId::Settings(SettingsPanel::Update) => f.write_str("settings_update"),
        }
    }
}
