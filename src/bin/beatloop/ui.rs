//! Player widgets - transport bar, voice activity, status line.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use beatloop::engine::MonitorFrame;
use beatloop::io::GenerateRequest;
use beatloop::voices::VoiceKind;

pub struct View<'a> {
    pub frame: &'a MonitorFrame,
    pub ready: bool,
    pub request: &'a GenerateRequest,
    pub status: &'a str,
    pub filename: Option<&'a str>,
}

pub fn render(frame: &mut Frame, view: &View) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(frame.area());

    render_transport(frame, rows[0], view);
    render_voices(frame, rows[1], view);
    render_status(frame, rows[2], view);
}

fn render_transport(frame: &mut Frame, area: Rect, view: &View) {
    let block = Block::default().title(" beatloop ").borders(Borders::ALL);

    let play_state = if view.frame.is_playing {
        Span::styled("▶ Playing", Style::default().fg(Color::Green))
    } else if view.ready {
        Span::styled("⏸ Stopped", Style::default().fg(Color::Yellow))
    } else {
        Span::styled("– Not ready", Style::default().fg(Color::Red))
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} @ {} bpm  ", view.request.style, view.request.bpm),
            Style::default().fg(Color::Cyan),
        ),
        play_state,
        Span::styled(
            format!(
                "  {:>5.2}s / {:.2}s",
                view.frame.position_secs, view.frame.loop_end_secs
            ),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("  {}", view.filename.unwrap_or("")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_voices(frame: &mut Frame, area: Rect, view: &View) {
    let block = Block::default().title(" voices ").borders(Borders::ALL);

    let lines: Vec<Line> = VoiceKind::ALL
        .iter()
        .map(|kind| {
            let active = view.frame.active(*kind);
            let meter = "█".repeat(active as usize);
            Line::from(vec![
                Span::styled(
                    format!(" {:<7}", kind.name()),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    meter,
                    Style::default().fg(if active > 0 {
                        Color::Magenta
                    } else {
                        Color::DarkGray
                    }),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status(frame: &mut Frame, area: Rect, view: &View) {
    let block = Block::default().borders(Borders::ALL);
    let line = Line::from(vec![
        Span::styled(
            format!(" {}  ", view.status),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(
            "space play/stop · g regenerate · d save · q quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), area);
}
