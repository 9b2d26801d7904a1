use crate::notes::catalog::NoteCatalog;
use crate::notes::{NoteColor, NoteId, NoteRecord};
use std::fmt;
use thiserror::Error;

pub const PREVIEW_CHARS: usize = 80;
pub const ELLIPSIS: &str = "...";
pub const EMPTY_PREVIEW: &str = "(no content)";

const DATE_DISPLAY_FORMAT: &str = "%Y/%m/%d %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteStatus {
    Open,
    Closed,
}

impl NoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRow {
    pub id: NoteId,
    pub date: String,
    pub preview: String,
    pub status: NoteStatus,
}

impl NoteRow {
    pub fn from_record(record: &NoteRecord) -> Self {
        Self {
            id: record.id.clone(),
            date: display_date(&record.id),
            preview: single_line_preview(&record.text),
            status: if record.is_open {
                NoteStatus::Open
            } else {
                NoteStatus::Closed
            },
        }
    }
}

pub fn display_date(id: &NoteId) -> String {
    match id.timestamp() {
        Some(stamp) => stamp.format(DATE_DISPLAY_FORMAT).to_string(),
        None => id.to_string(),
    }
}

pub fn single_line_preview(text: &str) -> String {
    let flattened = text.trim().replace(['\r', '\n'], " ");
    if flattened.is_empty() {
        return EMPTY_PREVIEW.to_string();
    }
    if flattened.chars().count() > PREVIEW_CHARS {
        let mut truncated: String = flattened.chars().take(PREVIEW_CHARS).collect();
        truncated.push_str(ELLIPSIS);
        truncated
    } else {
        flattened
    }
}

pub fn matches(record: &NoteRecord, search: &str) -> bool {
    let needle = search.to_lowercase();
    needle.is_empty()
        || record.id.as_str().to_lowercase().contains(&needle)
        || record.text.to_lowercase().contains(&needle)
}

/// Rows for every record matching `search`, in catalog order.
pub fn filter_rows(catalog: &NoteCatalog, search: &str) -> Vec<NoteRow> {
    catalog
        .iter()
        .filter(|record| matches(record, search))
        .map(NoteRow::from_record)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Preview {
    #[default]
    Cleared,
    Note { text: String, color: NoteColor },
}

pub fn preview(catalog: &NoteCatalog, selected: Option<&str>) -> Preview {
    selected
        .and_then(|id| catalog.get(id))
        .map(|record| Preview::Note {
            text: record.text.clone(),
            color: record.color.clone(),
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    Open,
    Delete,
    Recolor,
}

impl ListAction {
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Delete => "delete",
            Self::Recolor => "recolor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("select a note to {}", .0.verb())]
    NoSelection(ListAction),
}

/// Resolves the selected row for a list action that needs one.
pub fn require_selection(
    catalog: &NoteCatalog,
    selected: Option<&NoteId>,
    action: ListAction,
) -> Result<NoteId, SelectionError> {
    selected
        .filter(|id| catalog.contains(id.as_str()))
        .cloned()
        .ok_or(SelectionError::NoSelection(action))
}
