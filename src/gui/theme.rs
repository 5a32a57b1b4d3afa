//! テーマ設定 - ダークテーマ

use egui::{Color32, CornerRadius, Stroke, Style, Visuals};

/// カラーパレット
pub struct Colors;

impl Colors {
    pub const BG_DARK: Color32 = Color32::from_rgb(3, 6, 10);
    pub const BG_CARD: Color32 = Color32::from_rgb(13, 17, 23);
    pub const BG_HOVER: Color32 = Color32::from_rgb(10, 34, 40);
    pub const BG_INSET: Color32 = Color32::from_rgb(6, 9, 14);
    pub const ACCENT: Color32 = Color32::from_rgb(34, 211, 238);
    pub const ACCENT_ALT: Color32 = Color32::from_rgb(52, 211, 153);
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(255, 255, 255);
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(148, 163, 184);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(100, 116, 139);
    pub const SUCCESS: Color32 = Color32::from_rgb(52, 211, 153);
    pub const ERROR: Color32 = Color32::from_rgb(248, 113, 113);
    pub const BORDER: Color32 = Color32::from_rgb(38, 44, 54);
}

/// ダークテーマのスタイルを作成
pub fn dark_theme() -> Style {
    let mut style = Style::default();

    let mut visuals = Visuals::dark();

    visuals.panel_fill = Colors::BG_DARK;
    visuals.window_fill = Colors::BG_CARD;
    visuals.extreme_bg_color = Colors::BG_INSET;
    visuals.faint_bg_color = Colors::BG_CARD;

    // ウィジェットのスタイル
    visuals.widgets.noninteractive.bg_fill = Colors::BG_CARD;
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, Colors::TEXT_SECONDARY);
    visuals.widgets.noninteractive.corner_radius = CornerRadius::same(12);

    visuals.widgets.inactive.bg_fill = Colors::BG_CARD;
    visuals.widgets.inactive.weak_bg_fill = Colors::BG_CARD;
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, Colors::TEXT_PRIMARY);
    visuals.widgets.inactive.corner_radius = CornerRadius::same(12);

    visuals.widgets.hovered.bg_fill = Colors::BG_HOVER;
    visuals.widgets.hovered.weak_bg_fill = Colors::BG_HOVER;
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, Colors::ACCENT);
    visuals.widgets.hovered.corner_radius = CornerRadius::same(12);

    visuals.widgets.active.bg_fill = Colors::ACCENT;
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, Colors::BG_DARK);
    visuals.widgets.active.corner_radius = CornerRadius::same(12);

    visuals.selection.bg_fill = Colors::ACCENT.gamma_multiply(0.3);
    visuals.selection.stroke = Stroke::new(1.0, Colors::ACCENT);

    style.visuals = visuals;

    style
}
