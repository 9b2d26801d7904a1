use crate::event::NoteEvent;
use crate::notes::{NoteColor, NoteId, NoteSnapshot, MIN_SIZE};
use crate::sync::WindowHost;
use crate::theme::Theme;
use eframe::egui::viewport::{ResizeDirection, WindowLevel};
use eframe::egui::widgets::color_picker;
use eframe::egui::{
    self, Align, Color32, CursorIcon, Key, Layout, Modifiers, RichText, Sense, ViewportCommand,
    ViewportId,
};
use std::collections::BTreeMap;

const GRIP_SIZE: f32 = 15.0;

/// One on-screen note: the editable snapshot plus the viewport bookkeeping
/// egui needs to keep it alive across frames.
struct NoteWindow {
    snapshot: NoteSnapshot,
    viewport_id: ViewportId,
    origin: [f32; 2],
    size: [f32; 2],
    focused: bool,
    focus_requested: bool,
    color_draft: Color32,
}

impl NoteWindow {
    fn new(snapshot: NoteSnapshot, theme: &Theme) -> Self {
        Self {
            viewport_id: ViewportId::from_hash_of(("sticky-note", snapshot.id.as_str())),
            origin: [snapshot.x as f32, snapshot.y as f32],
            size: [snapshot.width as f32, snapshot.height as f32],
            focused: false,
            focus_requested: true,
            color_draft: theme.note_fill(&snapshot.color),
            snapshot,
        }
    }

    fn builder(&self) -> egui::ViewportBuilder {
        egui::ViewportBuilder::default()
            .with_title(format!("Sticky note {}", self.snapshot.id))
            .with_position(self.origin)
            .with_inner_size(self.size)
            .with_min_inner_size([MIN_SIZE as f32, MIN_SIZE as f32])
            .with_decorations(false)
            .with_resizable(true)
            .with_window_level(WindowLevel::AlwaysOnTop)
    }

    fn show(&mut self, ctx: &egui::Context, theme: &Theme, events: &mut Vec<NoteEvent>) {
        let builder = self.builder();
        ctx.show_viewport_immediate(self.viewport_id, builder, |ctx, _class| {
            self.render(ctx, theme, events);
        });
    }

    fn track_geometry(&mut self, ctx: &egui::Context) -> (bool, bool) {
        let (outer, inner, focused, close_requested) = ctx.input(|i| {
            let viewport = i.viewport();
            (
                viewport.outer_rect,
                viewport.inner_rect,
                i.focused,
                viewport.close_requested(),
            )
        });
        if let Some(outer) = outer {
            self.snapshot.x = outer.min.x.round() as i32;
            self.snapshot.y = outer.min.y.round() as i32;
        }
        if let Some(inner) = inner {
            self.snapshot.width = inner.width().round() as i32;
            self.snapshot.height = inner.height().round() as i32;
        }
        (focused, close_requested)
    }

    fn render(&mut self, ctx: &egui::Context, theme: &Theme, events: &mut Vec<NoteEvent>) {
        let id = self.snapshot.id.clone();
        let (focused, mut close) = self.track_geometry(ctx);

        if self.focus_requested {
            ctx.send_viewport_cmd(ViewportCommand::Focus);
            self.focus_requested = false;
        }

        let fill = theme.note_fill(&self.snapshot.color);
        let mut menu_open = false;

        egui::TopBottomPanel::top(egui::Id::new(("note-header", id.as_str())))
            .frame(theme.note_frame(fill, 2))
            .show_separator_line(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let handle = ui.add(
                        egui::Label::new(RichText::new("≡").color(theme.note_chrome).strong())
                            .sense(Sense::drag()),
                    );
                    if handle.drag_started() {
                        ui.ctx().send_viewport_cmd(ViewportCommand::StartDrag);
                    }
                    handle.on_hover_cursor(CursorIcon::Grab);

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let close_button = ui.add(
                            egui::Label::new(RichText::new("×").color(theme.note_chrome).strong())
                                .sense(Sense::click()),
                        );
                        if close_button.clicked() {
                            close = true;
                        }
                        let settings =
                            ui.menu_button(RichText::new("⚙").color(theme.note_chrome), |ui| {
                                self.menu(ui, theme, events, &mut close);
                            });
                        menu_open |= settings.inner.is_some();
                    });
                });
            });

        egui::CentralPanel::default()
            .frame(theme.note_frame(fill, 5))
            .show(ctx, |ui| {
                let area = ui.available_size();
                let response = ui.add_sized(
                    area,
                    egui::TextEdit::multiline(&mut self.snapshot.text)
                        .frame(false)
                        .text_color(theme.note_ink)
                        .background_color(fill),
                );
                if response.changed() {
                    events.push(NoteEvent::Edited(id.clone()));
                }
                menu_open |= response
                    .context_menu(|ui| self.menu(ui, theme, events, &mut close))
                    .is_some();

                let corner = ui.max_rect().right_bottom();
                let grip = egui::Rect::from_min_max(
                    corner - egui::vec2(GRIP_SIZE, GRIP_SIZE),
                    corner,
                );
                let grip_response = ui
                    .interact(grip, ui.id().with("resize-grip"), Sense::drag())
                    .on_hover_cursor(CursorIcon::ResizeSouthEast);
                if grip_response.drag_started() {
                    ctx.send_viewport_cmd(ViewportCommand::BeginResize(ResizeDirection::SouthEast));
                }
            });

        if !menu_open {
            self.discard_color_draft(theme);
        }

        if ctx.input_mut(|i| i.consume_key(Modifiers::COMMAND, Key::S)) {
            events.push(NoteEvent::SaveRequested(id.clone()));
        }

        if close {
            events.push(NoteEvent::CloseRequested(id));
        } else if self.focused && !focused {
            events.push(NoteEvent::FocusLost(id));
        }
        self.focused = focused;
    }

    fn menu(
        &mut self,
        ui: &mut egui::Ui,
        theme: &Theme,
        events: &mut Vec<NoteEvent>,
        close: &mut bool,
    ) {
        ui.label("Change color");
        color_picker::color_picker_color32(ui, &mut self.color_draft, color_picker::Alpha::Opaque);
        ui.horizontal(|ui| {
            if ui.button("Apply").clicked() {
                events.extend(self.commit_color_draft());
                ui.close_menu();
            }
            if ui.button("Cancel").clicked() {
                self.discard_color_draft(theme);
                ui.close_menu();
            }
        });
        ui.separator();
        if ui.button("Close").clicked() {
            *close = true;
            ui.close_menu();
        }
    }

    /// Turns the picked color into a single change event, or nothing when the
    /// draft matches the current color.
    fn commit_color_draft(&mut self) -> Option<NoteEvent> {
        let [r, g, b, _] = self.color_draft.to_array();
        let color = NoteColor::from_rgb([r, g, b]);
        if self.snapshot.color.rgb() == Some([r, g, b]) {
            return None;
        }
        Some(NoteEvent::ColorChanged {
            id: self.snapshot.id.clone(),
            color,
        })
    }

    fn discard_color_draft(&mut self, theme: &Theme) {
        self.color_draft = theme.note_fill(&self.snapshot.color);
    }
}

/// Window factory backed by egui immediate viewports. Each live note is drawn
/// every frame from [`ViewportHost::render`]; destroying it simply stops
/// drawing it, which closes the native window.
pub struct ViewportHost {
    theme: Theme,
    windows: BTreeMap<NoteId, NoteWindow>,
}

impl ViewportHost {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            windows: BTreeMap::new(),
        }
    }

    pub fn render(&mut self, ctx: &egui::Context, events: &mut Vec<NoteEvent>) {
        for window in self.windows.values_mut() {
            window.show(ctx, &self.theme, events);
        }
    }
}

impl WindowHost for ViewportHost {
    fn open(&mut self, snapshot: NoteSnapshot) {
        let window = NoteWindow::new(snapshot, &self.theme);
        self.windows.insert(window.snapshot.id.clone(), window);
    }

    fn snapshot(&self, id: &str) -> Option<NoteSnapshot> {
        self.windows
            .get(&NoteId::from(id))
            .map(|window| window.snapshot.clone())
    }

    fn live_ids(&self) -> Vec<NoteId> {
        self.windows.keys().cloned().collect()
    }

    fn focus(&mut self, id: &str) -> bool {
        match self.windows.get_mut(&NoteId::from(id)) {
            Some(window) => {
                window.focus_requested = true;
                true
            }
            None => false,
        }
    }

    fn recolor(&mut self, id: &str, color: &NoteColor) -> bool {
        match self.windows.get_mut(&NoteId::from(id)) {
            Some(window) => {
                window.color_draft = self.theme.note_fill(color);
                window.snapshot.color = color.clone();
                true
            }
            None => false,
        }
    }

    fn destroy(&mut self, id: &str) -> bool {
        self.windows.remove(&NoteId::from(id)).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::{NoteWindow, ViewportHost};
    use crate::event::NoteEvent;
    use crate::notes::{NoteColor, NoteId, NoteRecord};
    use crate::sync::WindowHost;
    use crate::theme::Theme;
    use eframe::egui::Color32;

    #[test]
    fn host_tracks_open_recolor_and_destroy() {
        let mut host = ViewportHost::new(Theme::default());
        let record = NoteRecord::new(NoteId::from("20240309080507"), 12, 34);
        host.open(record.snapshot());

        assert!(host.is_live("20240309080507"));
        assert!(host.focus("20240309080507"));
        assert!(host.recolor("20240309080507", &NoteColor::new("#123456")));
        let snapshot = host.snapshot("20240309080507").expect("window should be live");
        assert_eq!(snapshot.color.as_str(), "#123456");
        assert_eq!((snapshot.x, snapshot.y), (12, 34));

        assert!(host.destroy("20240309080507"));
        assert!(!host.destroy("20240309080507"));
        assert!(host.live_ids().is_empty());
    }

    #[test]
    fn picking_a_color_emits_one_change_only_on_apply() {
        let theme = Theme::default();
        let record = NoteRecord::new(NoteId::from("20240309080507"), 0, 0);
        let mut window = NoteWindow::new(record.snapshot(), &theme);

        assert!(window.commit_color_draft().is_none());

        window.color_draft = Color32::from_rgb(0x30, 0x80, 0xFF);
        assert_eq!(window.snapshot.color, NoteColor::default());

        assert_eq!(
            window.commit_color_draft(),
            Some(NoteEvent::ColorChanged {
                id: NoteId::from("20240309080507"),
                color: NoteColor::new("#3080ff"),
            })
        );
    }

    #[test]
    fn discarding_the_draft_restores_the_note_color() {
        let theme = Theme::default();
        let mut record = NoteRecord::new(NoteId::from("20240309080507"), 0, 0);
        record.color = NoteColor::new("#aaccff");
        let mut window = NoteWindow::new(record.snapshot(), &theme);

        window.color_draft = Color32::from_rgb(1, 2, 3);
        window.discard_color_draft(&theme);

        assert_eq!(window.color_draft, Color32::from_rgb(0xAA, 0xCC, 0xFF));
        assert!(window.commit_color_draft().is_none());
    }
}
