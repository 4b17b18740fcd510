//! Player application: session wiring and the key/draw loop.

use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use beatloop::engine::{MonitorFrame, MonitorRx, SessionManager};
use beatloop::io::{FileSource, GenerateRequest, StylePreset};

use super::ui;

pub struct Player {
    session: SessionManager,
    source: FileSource,
    request: GenerateRequest,
    monitor: Option<MonitorRx>,
    status: String,
}

impl Player {
    pub fn new(path: String, style: Option<StylePreset>) -> Self {
        let style = style.unwrap_or(StylePreset::BoomBap);
        let request = GenerateRequest {
            style,
            bpm: style.default_bpm(),
            ..GenerateRequest::default()
        };

        Self {
            session: SessionManager::new(),
            source: FileSource::new(path),
            request,
            monitor: None,
            status: String::from("generating..."),
        }
    }

    pub fn run(mut self) -> EyreResult<()> {
        // First generation before the TUI takes over the terminal; a
        // failure shows up in the status line with controls disabled.
        self.regenerate();

        let mut terminal = ratatui::init();
        let result = self.event_loop(&mut terminal);
        ratatui::restore();
        result
    }

    fn event_loop(&mut self, terminal: &mut ratatui::DefaultTerminal) -> EyreResult<()> {
        let mut frame = MonitorFrame::default();

        loop {
            if let Some(rx) = self.monitor.as_mut() {
                if let Some(latest) = rx.latest() {
                    frame = latest;
                }
            }

            let view = ui::View {
                frame: &frame,
                ready: self.session.is_ready(),
                request: &self.request,
                status: &self.status,
                filename: self.session.download().map(|a| a.filename.as_str()),
            };
            terminal.draw(|f| ui::render(f, &view))?;

            if !event::poll(Duration::from_millis(33))? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char(' ') => self.toggle_playback(),
                KeyCode::Char('g') => self.regenerate(),
                KeyCode::Char('d') => self.download(),
                _ => {}
            }
        }

        self.session.dispose();
        Ok(())
    }

    fn toggle_playback(&mut self) {
        if self.session.is_playing() {
            self.session.stop();
        } else {
            self.session.play();
        }
    }

    fn regenerate(&mut self) {
        match self.session.generate(&mut self.source, &self.request) {
            Ok(()) => {
                self.status = String::from("ready");
                if self.monitor.is_none() {
                    self.monitor = self.session.take_monitor();
                }
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn download(&mut self) {
        let Some(artifact) = self.session.download() else {
            self.status = String::from("nothing to save yet");
            return;
        };
        match std::fs::write(&artifact.filename, &artifact.bytes) {
            Ok(()) => self.status = format!("saved {}", artifact.filename),
            Err(err) => self.status = format!("save failed: {err}"),
        }
    }
}
