use crate::notes::{NoteColor, NoteId};

/// Emitted by note windows while rendering and applied by the app once the
/// frame's windows have been drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteEvent {
    Edited(NoteId),
    FocusLost(NoteId),
    SaveRequested(NoteId),
    CloseRequested(NoteId),
    ColorChanged { id: NoteId, color: NoteColor },
}

impl NoteEvent {
    pub fn id(&self) -> &NoteId {
        match self {
            Self::Edited(id)
            | Self::FocusLost(id)
            | Self::SaveRequested(id)
            | Self::CloseRequested(id) => id,
            Self::ColorChanged { id, .. } => id,
        }
    }

    /// Whether applying the event should be followed by writing the notes file.
    pub fn persists(&self) -> bool {
        !matches!(self, Self::Edited(_))
    }

    pub fn to_log_line(&self) -> String {
        match self {
            Self::Edited(id) => format!("note_edited id={id}"),
            Self::FocusLost(id) => format!("note_focus_lost id={id}"),
            Self::SaveRequested(id) => format!("note_save_requested id={id}"),
            Self::CloseRequested(id) => format!("note_close_requested id={id}"),
            Self::ColorChanged { id, color } => format!("note_color_changed id={id} color={color}"),
        }
    }
}
