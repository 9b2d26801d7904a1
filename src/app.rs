use crate::config::AppConfig;
use crate::event::NoteEvent;
use crate::notes::store;
use crate::notes::{NoteColor, NoteId};
use crate::sync::{NoteSync, WindowHost};
use crate::theme::Theme;
use crate::ui::list::{self, ListAction, NoteStatus, Preview, SelectionError};
use crate::ui::note_window::ViewportHost;
use eframe::egui::widgets::color_picker;
use eframe::egui::{self, Align2, Color32, RichText, ScrollArea};

enum Dialog {
    Message { title: &'static str, body: String },
    ConfirmDelete(NoteId),
    PickColor { id: NoteId, color: Color32 },
}

enum ManagerAction {
    New,
    Open,
    Delete,
    Recolor,
    Refresh,
    Select(NoteId),
}

/// The list/catalog window. Note windows are children of this app and are
/// drawn from its update loop.
pub struct StickiesApp<H: WindowHost = ViewportHost> {
    sync: NoteSync<H>,
    config: AppConfig,
    theme: Theme,
    search: String,
    selected: Option<NoteId>,
    status: String,
    dialog: Option<Dialog>,
}

impl StickiesApp<ViewportHost> {
    pub fn new(config: AppConfig, theme: Theme) -> Self {
        let host = ViewportHost::new(theme.clone());
        let mut app = Self::with_host(host, config, theme);
        app.load();
        app
    }
}

impl<H: WindowHost> StickiesApp<H> {
    fn with_host(host: H, config: AppConfig, theme: Theme) -> Self {
        let sync = NoteSync::new(host, config.spawn_area);
        Self {
            sync,
            config,
            theme,
            search: String::new(),
            selected: None,
            status: "Ready".to_string(),
            dialog: None,
        }
    }

    fn load(&mut self) {
        let path = self.config.notes_file.clone();
        match store::load(&path) {
            Ok(records) if records.is_empty() && !path.exists() => {
                self.status = format!("No saved notes, {} will be created", path.display());
            }
            Ok(records) => {
                let count = records.len();
                let reopened = self.sync.restore_session(records);
                self.status = format!("Loaded {count} notes ({reopened} reopened)");
            }
            Err(err) => {
                log::error!("{err}");
                self.sync.restore_session(Vec::new());
                self.status = "Failed to load notes".to_string();
                self.dialog = Some(Dialog::Message {
                    title: "Error",
                    body: format!("Could not load notes: {err}"),
                });
            }
        }
    }

    /// Writes the catalog. On failure the error dialog is raised and `false`
    /// is returned.
    fn save(&mut self) -> bool {
        let records = self.sync.prepare_save();
        let count = records.len();
        match store::save(&self.config.notes_file, records) {
            Ok(()) => {
                self.status = format!("Saved {count} notes");
                true
            }
            Err(err) => {
                log::error!("{err}");
                self.status = "Failed to save notes".to_string();
                self.dialog = Some(Dialog::Message {
                    title: "Error",
                    body: format!("Could not save notes: {err}"),
                });
                false
            }
        }
    }

    fn report(&mut self, err: SelectionError) {
        log::debug!("list action rejected: {err}");
        self.dialog = Some(Dialog::Message {
            title: "Information",
            body: format!("Please {err}."),
        });
    }

    fn selection(&self, action: ListAction) -> Result<NoteId, SelectionError> {
        list::require_selection(self.sync.catalog(), self.selected.as_ref(), action)
    }

    fn create_note(&mut self) {
        let id = self.sync.create_window(None);
        self.selected = Some(id.clone());
        self.save();
        self.status = format!("Created note {id}");
    }

    fn open_selected(&mut self) {
        match self.selection(ListAction::Open) {
            Ok(id) => {
                self.sync.open_record(id.as_str());
                self.status = format!("Editing note {id}");
            }
            Err(err) => self.report(err),
        }
    }

    fn request_delete(&mut self) {
        match self.selection(ListAction::Delete) {
            Ok(id) => self.dialog = Some(Dialog::ConfirmDelete(id)),
            Err(err) => self.report(err),
        }
    }

    fn delete(&mut self, id: &NoteId) {
        if self.sync.delete_record(id.as_str()).is_none() {
            return;
        }
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        self.save();
        self.status = format!("Deleted note {id}");
    }

    fn request_recolor(&mut self) {
        match self.selection(ListAction::Recolor) {
            Ok(id) => {
                let color = self
                    .sync
                    .catalog()
                    .get(id.as_str())
                    .map(|record| self.theme.note_fill(&record.color))
                    .unwrap_or(Color32::WHITE);
                self.dialog = Some(Dialog::PickColor { id, color });
            }
            Err(err) => self.report(err),
        }
    }

    fn recolor(&mut self, id: &NoteId, color: Color32) {
        let [r, g, b, _] = color.to_array();
        if !self.sync.on_color_changed(id.as_str(), NoteColor::from_rgb([r, g, b])) {
            return;
        }
        self.save();
        self.status = format!("Changed color of note {id}");
    }

    fn apply_action(&mut self, action: ManagerAction) {
        match action {
            ManagerAction::New => self.create_note(),
            ManagerAction::Open => self.open_selected(),
            ManagerAction::Delete => self.request_delete(),
            ManagerAction::Recolor => self.request_recolor(),
            ManagerAction::Refresh => {
                self.sync.reconcile_all();
                self.status = format!("{} notes", self.sync.catalog().len());
            }
            ManagerAction::Select(id) => self.selected = Some(id),
        }
    }

    fn apply_event(&mut self, event: NoteEvent) {
        log::debug!("{}", event.to_log_line());
        let persists = event.persists();
        let id = event.id().clone();
        let applied = match event {
            NoteEvent::Edited(id) => self.sync.on_window_edit(id.as_str()),
            NoteEvent::FocusLost(id) | NoteEvent::SaveRequested(id) => {
                self.sync.on_window_focus_lost(id.as_str())
            }
            NoteEvent::CloseRequested(id) => self.sync.on_window_closed(id.as_str()),
            NoteEvent::ColorChanged { id, color } => self.sync.on_color_changed(id.as_str(), color),
        };
        if applied && persists {
            self.save();
            log::debug!("persisted after event for id={id}");
        }
    }

    /// Marks live notes for the next session and saves. Returns `false` when
    /// the save failed and the window should stay open.
    fn exit(&mut self) -> bool {
        self.sync.mark_session_exit();
        if !self.save() {
            log::warn!("exit cancelled, notes could not be saved");
            return false;
        }
        log::info!("session saved on exit");
        true
    }

    fn render_toolbar(&self, ui: &mut egui::Ui, actions: &mut Vec<ManagerAction>) {
        ui.horizontal(|ui| {
            if ui.button("New").clicked() {
                actions.push(ManagerAction::New);
            }
            if ui.button("Open").clicked() {
                actions.push(ManagerAction::Open);
            }
            if ui.button("Delete").clicked() {
                actions.push(ManagerAction::Delete);
            }
            if ui.button("Color").clicked() {
                actions.push(ManagerAction::Recolor);
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh").clicked() {
                    actions.push(ManagerAction::Refresh);
                }
            });
        });
    }

    fn render_search(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Search:");
            let clear_width = 28.0;
            ui.add(
                egui::TextEdit::singleline(&mut self.search)
                    .desired_width(ui.available_width() - clear_width - self.theme.spacing_8),
            );
            if ui.button("✕").clicked() {
                self.search.clear();
            }
        });
    }

    fn render_list(&self, ui: &mut egui::Ui, actions: &mut Vec<ManagerAction>) {
        let rows = list::filter_rows(self.sync.catalog(), &self.search);
        ScrollArea::vertical()
            .id_salt("note_list")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Grid::new("note_rows")
                    .num_columns(3)
                    .striped(true)
                    .spacing([self.theme.spacing_12, self.theme.spacing_4])
                    .show(ui, |ui| {
                        ui.strong("Date");
                        ui.strong("Content");
                        ui.strong("Status");
                        ui.end_row();

                        for row in rows {
                            let is_selected = self.selected.as_ref() == Some(&row.id);
                            let response = ui.selectable_label(is_selected, &row.date);
                            if response.clicked() || response.secondary_clicked() {
                                actions.push(ManagerAction::Select(row.id.clone()));
                            }
                            if response.double_clicked() {
                                actions.push(ManagerAction::Open);
                            }
                            response.context_menu(|ui| {
                                for (label, action) in [
                                    ("Open", ManagerAction::Open),
                                    ("Change color", ManagerAction::Recolor),
                                    ("Delete", ManagerAction::Delete),
                                ] {
                                    if ui.button(label).clicked() {
                                        actions.push(ManagerAction::Select(row.id.clone()));
                                        actions.push(action);
                                        ui.close_menu();
                                    }
                                }
                            });

                            ui.label(&row.preview);
                            let status_color = match row.status {
                                NoteStatus::Open => self.theme.success,
                                NoteStatus::Closed => self.theme.text_muted,
                            };
                            ui.label(RichText::new(row.status.to_string()).color(status_color));
                            ui.end_row();
                        }
                    });
            });
    }

    fn render_preview(&self, ui: &mut egui::Ui) {
        ui.label(RichText::new("Preview").strong());
        let selected = self.selected.as_ref().map(NoteId::as_str);
        let (text, fill) = match list::preview(self.sync.catalog(), selected) {
            Preview::Note { text, color } => (text, self.theme.note_fill(&color)),
            Preview::Cleared => (String::new(), self.theme.preview_empty),
        };
        self.theme.card_frame(fill).show(ui, |ui| {
            ui.set_min_size(ui.available_size());
            ScrollArea::vertical()
                .id_salt("note_preview")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.label(RichText::new(text).color(self.theme.note_ink));
                });
        });
    }

    fn render_dialog(&mut self, ctx: &egui::Context) {
        let Some(mut dialog) = self.dialog.take() else {
            return;
        };
        let mut keep = true;
        let mut delete: Option<NoteId> = None;
        let mut recolor: Option<(NoteId, Color32)> = None;

        let title = match &dialog {
            Dialog::Message { title, .. } => *title,
            Dialog::ConfirmDelete(_) => "Confirm",
            Dialog::PickColor { .. } => "Change color",
        };
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| match &mut dialog {
                Dialog::Message { body, .. } => {
                    ui.label(body.as_str());
                    if ui.button("OK").clicked() {
                        keep = false;
                    }
                }
                Dialog::ConfirmDelete(id) => {
                    ui.label("Delete the selected note permanently?");
                    ui.label(RichText::new("This cannot be undone.").color(self.theme.danger));
                    ui.horizontal(|ui| {
                        if ui.button("Delete").clicked() {
                            delete = Some(id.clone());
                            keep = false;
                        }
                        if ui.button("Cancel").clicked() {
                            keep = false;
                        }
                    });
                }
                Dialog::PickColor { id, color } => {
                    color_picker::color_picker_color32(ui, color, color_picker::Alpha::Opaque);
                    ui.horizontal(|ui| {
                        if ui.button("OK").clicked() {
                            recolor = Some((id.clone(), *color));
                            keep = false;
                        }
                        if ui.button("Cancel").clicked() {
                            keep = false;
                        }
                    });
                }
            });

        if keep {
            self.dialog = Some(dialog);
        }
        if let Some(id) = delete {
            self.delete(&id);
        }
        if let Some((id, color)) = recolor {
            self.recolor(&id, color);
        }
    }
}

impl eframe::App for StickiesApp<ViewportHost> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync.reconcile_all();

        let mut actions = Vec::new();
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(self.theme.spacing_4);
            self.render_toolbar(ui, &mut actions);
            self.render_search(ui);
        });
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.label(RichText::new(self.status.as_str()).small());
        });
        egui::TopBottomPanel::bottom("preview_panel")
            .resizable(true)
            .default_height(140.0)
            .show(ctx, |ui| self.render_preview(ui));
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("All notes");
            self.render_list(ui, &mut actions);
        });
        self.render_dialog(ctx);

        for action in actions {
            self.apply_action(action);
        }

        let mut events = Vec::new();
        self.sync.host_mut().render(ctx, &mut events);
        for event in events {
            self.apply_event(event);
        }

        if ctx.input(|i| i.viewport().close_requested()) && !self.exit() {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Dialog, ManagerAction, StickiesApp};
    use crate::config::AppConfig;
    use crate::event::NoteEvent;
    use crate::notes::{store, NoteColor, NoteId};
    use crate::sync::tests::MemoryHost;
    use crate::sync::WindowHost;
    use crate::theme::Theme;
    use std::fs;

    fn app(dir: &tempfile::TempDir) -> StickiesApp<MemoryHost> {
        let config = AppConfig {
            notes_file: dir.path().join("sticky_notes.json"),
            ..AppConfig::default()
        };
        StickiesApp::with_host(MemoryHost::default(), config, Theme::default())
    }

    fn saved_ids(dir: &tempfile::TempDir) -> Vec<String> {
        store::load(&dir.path().join("sticky_notes.json"))
            .expect("notes file should load")
            .into_iter()
            .map(|record| record.id.to_string())
            .collect()
    }

    #[test]
    fn new_note_is_persisted_immediately() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let mut app = app(&dir);
        app.apply_action(ManagerAction::New);

        let saved = store::load(&app.config.notes_file).expect("notes file should load");
        assert_eq!(saved.len(), 1);
        assert!(saved[0].is_open && saved[0].was_open);
    }

    #[test]
    fn focus_loss_saves_typed_text() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let mut app = app(&dir);
        app.apply_action(ManagerAction::New);
        let id = app.selected.clone().expect("new note should be selected");

        app.sync
            .host_mut()
            .edit(id.as_str(), |window| window.text = "hello".to_string());
        app.apply_event(NoteEvent::Edited(id.clone()));
        app.apply_event(NoteEvent::FocusLost(id.clone()));

        let saved = store::load(&app.config.notes_file).expect("notes file should load");
        assert_eq!(saved[0].text, "hello");
    }

    #[test]
    fn closing_a_note_keeps_it_listed_as_closed() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let mut app = app(&dir);
        app.apply_action(ManagerAction::New);
        let id = app.selected.clone().expect("new note should be selected");

        app.apply_event(NoteEvent::CloseRequested(id.clone()));

        let saved = store::load(&app.config.notes_file).expect("notes file should load");
        assert!(!saved[0].is_open);
        assert!(saved[0].was_open);
        assert!(!app.sync.host().is_live(id.as_str()));
    }

    #[test]
    fn actions_without_selection_show_information() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let mut app = app(&dir);
        app.apply_action(ManagerAction::Delete);

        match app.dialog {
            Some(Dialog::Message { title, ref body }) => {
                assert_eq!(title, "Information");
                assert!(body.contains("delete"));
            }
            _ => panic!("expected an information message"),
        }
    }

    #[test]
    fn deleted_notes_are_not_resurrected_on_reload() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let mut app = app(&dir);
        app.apply_action(ManagerAction::New);
        app.apply_action(ManagerAction::New);
        let doomed = app.selected.clone().expect("new note should be selected");

        app.apply_action(ManagerAction::Delete);
        assert!(matches!(app.dialog, Some(Dialog::ConfirmDelete(_))));
        app.dialog = None;
        app.delete(&doomed);

        assert!(app.selected.is_none());
        assert!(!app.sync.host().is_live(doomed.as_str()));
        assert!(!saved_ids(&dir).contains(&doomed.to_string()));

        let mut reloaded = self::app(&dir);
        reloaded.load();
        assert!(reloaded.sync.catalog().get(doomed.as_str()).is_none());
        assert_eq!(reloaded.sync.host().live_ids().len(), 1);
    }

    #[test]
    fn recolor_from_list_updates_closed_note() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let mut app = app(&dir);
        app.apply_action(ManagerAction::New);
        let id = app.selected.clone().expect("new note should be selected");
        app.apply_event(NoteEvent::CloseRequested(id.clone()));

        app.recolor(&id, eframe::egui::Color32::from_rgb(0xAA, 0xCC, 0xFF));

        let saved = store::load(&app.config.notes_file).expect("notes file should load");
        assert_eq!(saved[0].color, NoteColor::new("#aaccff"));
    }

    #[test]
    fn corrupt_file_starts_empty_with_an_error_message() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        fs::write(dir.path().join("sticky_notes.json"), "not json").expect("fixture should write");
        let mut app = app(&dir);
        app.load();

        assert!(app.sync.catalog().is_empty());
        assert!(matches!(
            app.dialog,
            Some(Dialog::Message { title: "Error", .. })
        ));
    }

    #[test]
    fn exit_marks_live_notes_for_the_next_session() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let mut app = app(&dir);
        app.apply_action(ManagerAction::New);
        let id: NoteId = app.selected.clone().expect("new note should be selected");
        app.exit();

        let mut next = self::app(&dir);
        next.load();
        assert_eq!(next.sync.host().live_ids(), vec![id]);
    }

    #[test]
    fn recolor_from_note_window_saves_and_repaints_it() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let mut app = app(&dir);
        app.apply_action(ManagerAction::New);
        let id = app.selected.clone().expect("new note should be selected");

        app.apply_event(NoteEvent::ColorChanged {
            id: id.clone(),
            color: NoteColor::new("#aaccff"),
        });

        let saved = store::load(&app.config.notes_file).expect("notes file should load");
        assert_eq!(saved[0].color, NoteColor::new("#aaccff"));
        assert!(saved[0].is_open);
        let window = app
            .sync
            .host()
            .snapshot(id.as_str())
            .expect("window should stay live");
        assert_eq!(window.color, NoteColor::new("#aaccff"));
    }

    #[test]
    fn failed_exit_save_keeps_the_error_visible() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").expect("fixture should write");
        let config = AppConfig {
            notes_file: blocker.join("sticky_notes.json"),
            ..AppConfig::default()
        };
        let mut app = StickiesApp::with_host(MemoryHost::default(), config, Theme::default());
        app.create_note();
        app.dialog = None;

        assert!(!app.exit());
        assert!(matches!(
            app.dialog,
            Some(Dialog::Message { title: "Error", .. })
        ));
    }

    #[test]
    fn successful_exit_allows_the_window_to_close() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let mut app = app(&dir);
        assert!(app.exit());
        assert!(app.dialog.is_none());
    }
}
