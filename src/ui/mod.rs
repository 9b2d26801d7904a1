pub mod list;
pub mod note_window;
