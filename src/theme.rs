use crate::notes::{NoteColor, DEFAULT_COLOR};
use eframe::egui::{self, Color32, CornerRadius, FontId, Frame, Margin, Stroke, TextStyle};

#[derive(Debug, Clone)]
pub struct Theme {
    pub surface_0: Color32,
    pub surface_1: Color32,
    pub surface_2: Color32,
    pub accent_primary: Color32,
    pub accent_muted: Color32,
    pub success: Color32,
    pub danger: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
    pub note_ink: Color32,
    pub note_chrome: Color32,
    pub preview_empty: Color32,
    pub spacing_4: f32,
    pub spacing_8: f32,
    pub spacing_12: f32,
    pub radius_8: u8,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            surface_0: Color32::from_rgb(0xF0, 0xF0, 0xF0),
            surface_1: Color32::from_rgb(0xFA, 0xFA, 0xFA),
            surface_2: Color32::from_rgb(0xE1, 0xE1, 0xE1),
            accent_primary: Color32::from_rgb(0x3B, 0x82, 0xF6),
            accent_muted: Color32::from_rgb(0xC8, 0xDA, 0xF8),
            success: Color32::from_rgb(0x16, 0xA3, 0x4A),
            danger: Color32::from_rgb(0xDC, 0x26, 0x26),
            text_primary: Color32::from_rgb(0x1F, 0x23, 0x28),
            text_muted: Color32::from_rgb(0x6B, 0x72, 0x80),
            note_ink: Color32::from_rgb(0x22, 0x22, 0x22),
            note_chrome: Color32::from_rgb(0x55, 0x55, 0x55),
            preview_empty: Color32::WHITE,
            spacing_4: 4.0,
            spacing_8: 8.0,
            spacing_12: 12.0,
            radius_8: 8,
        }
    }
}

impl Theme {
    pub fn apply_visuals(&self, ctx: &egui::Context) {
        let mut visuals = egui::Visuals::light();
        visuals.panel_fill = self.surface_0;
        visuals.override_text_color = Some(self.text_primary);
        visuals.widgets.inactive.bg_fill = self.surface_2;
        visuals.widgets.inactive.weak_bg_fill = self.surface_2;
        visuals.widgets.hovered.bg_fill = self.accent_muted;
        visuals.widgets.active.bg_fill = self.accent_muted;
        visuals.selection.bg_fill = self.accent_muted;
        visuals.selection.stroke = Stroke::new(1.0, self.accent_primary);
        visuals.window_fill = self.surface_1;
        visuals.window_corner_radius = CornerRadius::same(self.radius_8);
        let mut style = (*ctx.style()).clone();
        style.visuals = visuals;
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.spacing.button_padding = egui::vec2(10.0, 4.0);
        style.text_styles.insert(TextStyle::Heading, FontId::proportional(15.0));
        style.text_styles.insert(TextStyle::Body, FontId::proportional(13.0));
        style.text_styles.insert(TextStyle::Button, FontId::proportional(13.0));
        style.text_styles.insert(TextStyle::Small, FontId::proportional(11.0));
        ctx.set_style(style);
    }

    /// Fill for a note; unparsable stored colors fall back to the default yellow.
    pub fn note_fill(&self, color: &NoteColor) -> Color32 {
        let [r, g, b] = color
            .rgb()
            .or_else(|| NoteColor::new(DEFAULT_COLOR).rgb())
            .unwrap_or([0xFF, 0xFF, 0x99]);
        Color32::from_rgb(r, g, b)
    }

    pub fn note_frame(&self, fill: Color32, inner_padding: i8) -> Frame {
        Frame::new()
            .fill(fill)
            .inner_margin(Margin::same(inner_padding))
            .stroke(Stroke::NONE)
    }

    pub fn card_frame(&self, fill: Color32) -> Frame {
        Frame::new()
            .fill(fill)
            .inner_margin(Margin::same(self.spacing_8 as i8))
            .corner_radius(CornerRadius::same(self.radius_8))
            .stroke(Stroke::new(1.0, self.surface_2))
    }
}

#[cfg(test)]
mod tests {
    use super::Theme;
    use crate::notes::NoteColor;
    use eframe::egui::Color32;

    #[test]
    fn note_fill_falls_back_to_default_yellow() {
        let theme = Theme::default();
        assert_eq!(
            theme.note_fill(&NoteColor::new("not a color")),
            Color32::from_rgb(0xFF, 0xFF, 0x99)
        );
        assert_eq!(
            theme.note_fill(&NoteColor::new("#102030")),
            Color32::from_rgb(0x10, 0x20, 0x30)
        );
    }
}
