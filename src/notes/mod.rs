use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod catalog;
pub mod store;

pub const MIN_SIZE: i32 = 100;
pub const DEFAULT_SIZE: i32 = 200;
pub const DEFAULT_COLOR: &str = "#FFFF99";

const ID_FORMAT: &str = "%Y%m%d%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Derives an id from `now` at second granularity. When the candidate is
    /// already taken the timestamp is advanced one second at a time, so ids
    /// stay 14-digit timestamps and never collide.
    pub fn generate(now: NaiveDateTime, is_taken: impl Fn(&str) -> bool) -> Self {
        let mut candidate = now;
        loop {
            let raw = candidate.format(ID_FORMAT).to_string();
            if !is_taken(&raw) {
                return Self(raw);
            }
            candidate += Duration::seconds(1);
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The creation time encoded in the id, if it is a `YYYYMMDDHHMMSS` stamp.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        if self.0.len() != 14 || !self.0.chars().all(|ch| ch.is_ascii_digit()) {
            return None;
        }
        NaiveDateTime::parse_from_str(&self.0, ID_FORMAT).ok()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteColor(String);

impl NoteColor {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn from_rgb(rgb: [u8; 3]) -> Self {
        Self(format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2]))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Parses `#rrggbb` (or `#rgb`). Anything else is left to the caller to
    /// substitute.
    pub fn rgb(&self) -> Option<[u8; 3]> {
        let hex = self.0.trim().strip_prefix('#')?;
        if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            6 => {
                let channel = |at: usize| u8::from_str_radix(&hex[at..at + 2], 16).ok();
                Some([channel(0)?, channel(2)?, channel(4)?])
            }
            3 => {
                let channel = |at: usize| {
                    u8::from_str_radix(&hex[at..at + 1], 16)
                        .ok()
                        .map(|value| value * 17)
                };
                Some([channel(0)?, channel(1)?, channel(2)?])
            }
            _ => None,
        }
    }
}

impl Default for NoteColor {
    fn default() -> Self {
        Self(DEFAULT_COLOR.to_string())
    }
}

impl fmt::Display for NoteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Editable state of a note, shared by live windows and persisted records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSnapshot {
    pub id: NoteId,
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub color: NoteColor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: NoteId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default = "default_size")]
    pub width: i32,
    #[serde(default = "default_size")]
    pub height: i32,
    #[serde(default)]
    pub color: NoteColor,
    #[serde(default)]
    pub is_open: bool,
    #[serde(default)]
    pub was_open: bool,
}

fn default_size() -> i32 {
    DEFAULT_SIZE
}

impl NoteRecord {
    pub fn new(id: NoteId, x: i32, y: i32) -> Self {
        Self {
            id,
            text: String::new(),
            x,
            y,
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            color: NoteColor::default(),
            is_open: false,
            was_open: false,
        }
    }

    pub fn snapshot(&self) -> NoteSnapshot {
        NoteSnapshot {
            id: self.id.clone(),
            text: self.text.clone(),
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            color: self.color.clone(),
        }
    }

    /// Overwrites content and placement from a live window. The open flags
    /// are left to the caller.
    pub fn apply_snapshot(&mut self, snapshot: &NoteSnapshot) {
        self.text = snapshot.text.clone();
        self.x = snapshot.x;
        self.y = snapshot.y;
        self.width = snapshot.width;
        self.height = snapshot.height;
        self.color = snapshot.color.clone();
        self.normalize();
    }

    pub fn mark_open(&mut self) {
        self.is_open = true;
        self.was_open = true;
    }

    pub fn mark_closed(&mut self) {
        self.is_open = false;
        self.was_open = true;
    }

    /// Enforces the minimum window size.
    pub(crate) fn normalize(&mut self) {
        self.width = self.width.max(MIN_SIZE);
        self.height = self.height.max(MIN_SIZE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|date| date.and_hms_opt(h, m, s))
            .expect("fixture time should be valid")
    }

    #[test]
    fn generate_formats_timestamp_to_the_second() {
        let id = NoteId::generate(at(8, 5, 7), |_| false);
        assert_eq!(id.as_str(), "20240309080507");
    }

    #[test]
    fn generate_skips_ids_created_in_the_same_second() {
        let taken = ["20240309235959", "20240310000000"];
        let id = NoteId::generate(at(23, 59, 59), |raw| taken.contains(&raw));
        assert_eq!(id.as_str(), "20240310000001");
    }

    #[test]
    fn timestamp_requires_fourteen_digits() {
        assert_eq!(NoteId::from("20240309080507").timestamp(), Some(at(8, 5, 7)));
        assert!(NoteId::from("2024030908050").timestamp().is_none());
        assert!(NoteId::from("2024030908050x").timestamp().is_none());
        assert!(NoteId::from("20241399080507").timestamp().is_none());
    }

    #[test]
    fn color_parses_short_and_long_hex() {
        assert_eq!(NoteColor::default().rgb(), Some([0xFF, 0xFF, 0x99]));
        assert_eq!(NoteColor::new("#0f8").rgb(), Some([0x00, 0xFF, 0x88]));
        assert!(NoteColor::new("yellow").rgb().is_none());
        assert_eq!(NoteColor::from_rgb([1, 2, 255]).as_str(), "#0102ff");
    }

    #[test]
    fn applying_a_snapshot_keeps_flags_and_minimum_size() {
        let mut record = NoteRecord::new(NoteId::from("a"), 0, 0);
        record.mark_open();
        let mut snapshot = record.snapshot();
        snapshot.text = "moved".to_string();
        snapshot.x = 40;
        snapshot.width = 20;

        record.apply_snapshot(&snapshot);

        assert_eq!(record.text, "moved");
        assert_eq!(record.x, 40);
        assert_eq!(record.width, MIN_SIZE);
        assert!(record.is_open && record.was_open);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let record: NoteRecord =
            serde_json::from_str(r#"{"id":"20240309080507"}"#).expect("minimal record should parse");
        assert_eq!(record.width, DEFAULT_SIZE);
        assert_eq!(record.color, NoteColor::default());
        assert!(!record.is_open && !record.was_open);
    }
}
