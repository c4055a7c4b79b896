//! Label colour selection.

use std::collections::BTreeMap;

/// Picks the colour of a newly created label.
pub trait ColourSelector: Send + Sync {
    /// Returns a six digit hex colour without the leading `#`.
    fn colour_for(&self, label: &str) -> String;
}

/// Colours handed out to labels without an explicit override.
const PALETTE: [&str; 12] = [
    "b60205", "d93f0b", "fbca04", "0e8a16", "006b75", "1d76db", "0052cc", "5319e7", "e99695",
    "f9d0c4", "c2e0c6", "bfd4f2",
];

/// Uses configured overrides, else a palette entry chosen by name hash.
///
/// The same name always gets the same colour.
#[derive(Debug, Clone, Default)]
pub struct PaletteColourSelector {
    overrides: BTreeMap<String, String>,
}

impl PaletteColourSelector {
    #[must_use]
    pub fn new(overrides: BTreeMap<String, String>) -> Self {
        Self { overrides }
    }
}

impl ColourSelector for PaletteColourSelector {
    fn colour_for(&self, label: &str) -> String {
        if let Some(colour) = self.overrides.get(label) {
            return colour.clone();
        }
        // FNV-1a
        let hash = label
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
                (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
            });
        PALETTE[(hash % PALETTE.len() as u64) as usize].to_string()
    }
}
