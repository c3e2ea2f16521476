//! State behind the full-screen watch view: the stream session, the input
//! line, and the output pane's scroll position.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::style::{Modifier, Style};
use tui_textarea::{Input as TAInput, TextArea};

use crate::core::renderer::{RenderUpdate, StreamState};
use crate::core::session::StreamSession;
use crate::core::topic_stream::{StreamMessage, StreamParams};
use crate::ui::renderer::INPUT_HEIGHT;
use crate::utils::scroll::ScrollCalculator;

/// Terminal dimensions the key handlers need for paging and clamping.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewContext {
    pub term_width: u16,
    pub term_height: u16,
}

impl ViewContext {
    /// Width and height of the output pane below its title row.
    pub fn output_area(&self) -> (u16, u16) {
        let height = self
            .term_height
            .saturating_sub(INPUT_HEIGHT)
            .saturating_sub(1);
        (self.term_width, height)
    }
}

pub struct WatchApp {
    pub session: StreamSession,
    pub input: TextArea<'static>,
    pub scroll_offset: u16,
    pub follow_output: bool,
    pub exit_requested: bool,
}

impl WatchApp {
    pub fn new(session: StreamSession) -> Self {
        let mut input = TextArea::default();
        input.set_cursor_line_style(Style::default());
        input.set_placeholder_text("Type a topic and press Enter");
        input.set_cursor_style(Style::default().add_modifier(Modifier::REVERSED));
        Self {
            session,
            input,
            scroll_offset: 0,
            follow_output: true,
            exit_requested: false,
        }
    }

    pub fn input_text(&self) -> String {
        self.input.lines().join(" ")
    }

    pub fn state(&self) -> StreamState {
        self.session.state()
    }

    pub fn output_rows(&self, width: u16) -> Vec<String> {
        ScrollCalculator::prewrap_text(self.session.text(), width)
    }

    /// The offset actually used for drawing: pinned to the bottom while
    /// following the stream, clamped to the content otherwise.
    pub fn effective_scroll_offset(&self, width: u16, height: u16) -> u16 {
        let rows = self.output_rows(width).len();
        let max = ScrollCalculator::max_scroll_offset(rows, height);
        if self.follow_output {
            max
        } else {
            self.scroll_offset.min(max)
        }
    }

    /// Handle one key press. Returns the parameters of a new stream when the
    /// key submitted a non-empty topic.
    pub fn handle_key(&mut self, key: KeyEvent, ctx: ViewContext) -> Option<StreamParams> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        let (width, height) = ctx.output_area();
        match key.code {
            KeyCode::Esc => {
                self.exit_requested = true;
                None
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.exit_requested = true;
                None
            }
            KeyCode::Enter => {
                let params = self.session.submit(&self.input_text())?;
                self.scroll_offset = 0;
                self.follow_output = true;
                Some(params)
            }
            KeyCode::Up => {
                self.scroll_by(-1, width, height);
                None
            }
            KeyCode::Down => {
                self.scroll_by(1, width, height);
                None
            }
            KeyCode::PageUp => {
                self.scroll_by(-i32::from(height.max(1)), width, height);
                None
            }
            KeyCode::PageDown => {
                self.scroll_by(i32::from(height.max(1)), width, height);
                None
            }
            KeyCode::End if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.follow_output = true;
                None
            }
            _ => {
                self.input.input(TAInput::from(key));
                None
            }
        }
    }

    fn scroll_by(&mut self, delta: i32, width: u16, height: u16) {
        let current = i32::from(self.effective_scroll_offset(width, height));
        let max = ScrollCalculator::max_scroll_offset(self.output_rows(width).len(), height);
        let next = (current + delta).clamp(0, i32::from(max));
        self.scroll_offset = u16::try_from(next).unwrap_or(max);
        self.follow_output = self.scroll_offset >= max;
    }

    pub fn handle_stream_message(&mut self, message: StreamMessage, stream_id: u64) -> bool {
        match self.session.handle_message(message, stream_id) {
            RenderUpdate::Ignored => false,
            RenderUpdate::Appended => {
                self.follow_output = true;
                true
            }
            RenderUpdate::Completed | RenderUpdate::Failed => true,
        }
    }
}
