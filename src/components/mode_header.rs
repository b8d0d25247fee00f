use artbox::{
    Alignment as ArtAlignment, Color as ArtColor, ColorStop, Fill, LinearGradient, Renderer,
    fonts, integrations::ratatui::ArtBox,
};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::Component;
use crate::action::Action;
use crate::state::{DisplayMode, SPINNER_CYCLE_TICKS};

pub const SPINNER: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

pub struct ModeHeader;

pub struct ModeHeaderProps {
    pub mode: DisplayMode,
    pub count: usize,
    pub is_loading: bool,
    pub tick_count: u32,
}

fn mode_colors(mode: DisplayMode) -> (ArtColor, ArtColor) {
    match mode {
        DisplayMode::History => (
            ArtColor::rgb(180, 160, 255), // Lavender
            ArtColor::rgb(120, 200, 255), // Sky
        ),
        DisplayMode::LiveSearch => (
            ArtColor::rgb(100, 200, 150), // Green
            ArtColor::rgb(255, 220, 100), // Yellow
        ),
    }
}

/// Two-stop gradient that slides sideways while `phase` advances.
fn make_gradient(colors: (ArtColor, ArtColor), phase: f32) -> Fill {
    let phase = phase.rem_euclid(1.0);
    let shift = if phase < 0.5 { phase * 2.0 } else { (1.0 - phase) * 2.0 };
    let start = colors.0.interpolate(colors.1, shift);
    let end = colors.1.interpolate(colors.0, shift);
    Fill::Linear(LinearGradient::new(
        5.0,
        vec![ColorStop::new(0.0, start), ColorStop::new(1.0, end)],
    ))
}

fn animated_phase(tick_count: u32) -> f32 {
    let steps = SPINNER_CYCLE_TICKS.max(1);
    (tick_count % steps) as f32 / steps as f32
}

pub fn status_text(props: &ModeHeaderProps) -> String {
    if props.is_loading {
        let frame = SPINNER[props.tick_count as usize % SPINNER.len()];
        return format!("{frame} loading…");
    }
    match (props.mode, props.count) {
        (DisplayMode::History, 0) => "no recent locations".to_string(),
        (DisplayMode::LiveSearch, 0) => "nothing found".to_string(),
        (_, 1) => "1 location".to_string(),
        (_, n) => format!("{n} locations"),
    }
}

impl Component<Action> for ModeHeader {
    type Props<'a> = ModeHeaderProps;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let chunks = Layout::vertical([
            Constraint::Fill(1),   // Mode title, FIGlet when it fits
            Constraint::Length(1), // Status / spinner
        ])
        .split(area);

        let phase = if props.is_loading {
            animated_phase(props.tick_count)
        } else {
            0.0
        };
        let renderer = Renderer::new(fonts::stack(&["miniwi"]))
            .with_plain_fallback()
            .with_alignment(ArtAlignment::Center)
            .with_fill(make_gradient(mode_colors(props.mode), phase));
        frame.render_widget(ArtBox::new(&renderer, props.mode.title()), chunks[0]);

        let color = if props.is_loading {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        let status = Line::from(vec![Span::styled(
            status_text(&props),
            Style::default().fg(color),
        )])
        .centered();
        frame.render_widget(Paragraph::new(status), chunks[1]);
    }
}
