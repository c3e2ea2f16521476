use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::renderer::StreamState;
use crate::ui::app::WatchApp;

/// Input box height including its borders.
pub const INPUT_HEIGHT: u16 = 3;

pub fn ui(f: &mut Frame, app: &WatchApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(INPUT_HEIGHT)])
        .split(f.area());

    let output_area = chunks[0];
    let available_height = output_area.height.saturating_sub(1); // title row
    let rows = app.output_rows(output_area.width);
    let scroll_offset = app.effective_scroll_offset(output_area.width, available_height);

    let lines: Vec<Line> = rows.into_iter().map(Line::from).collect();
    let output = Paragraph::new(lines)
        .block(Block::default().title(title_line(app.state())))
        .scroll((scroll_offset, 0));
    f.render_widget(output, output_area);

    let mut input = app.input.clone();
    input.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title("Topic (Enter to submit, ↑/↓ PgUp/PgDn to scroll, Esc to quit)"),
    );
    f.render_widget(&input, chunks[1]);
}

fn title_line(state: StreamState) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("topicstream v{} • ", env!("CARGO_PKG_VERSION"))),
        Span::styled(state.label(), state_style(state)),
    ])
}

fn state_style(state: StreamState) -> Style {
    let color = match state {
        StreamState::Idle | StreamState::Superseded => Color::DarkGray,
        StreamState::Open => Color::Yellow,
        StreamState::Receiving => Color::Cyan,
        StreamState::Completed => Color::Green,
        StreamState::Failed => Color::Red,
    };
    let style = Style::default().fg(color);
    if state.is_live() {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::StreamSession;
    use crate::core::topic_stream::StreamMessage;
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &WatchApp, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("terminal");
        terminal.draw(|f| ui(f, app)).expect("draw");
        let buffer = terminal.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..height {
            for x in 0..width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn title_shows_stream_state() {
        let mut app = WatchApp::new(StreamSession::new("http://localhost:5000"));
        assert!(render(&app, 60, 8).contains("idle"));

        let params = app.session.submit("tides").expect("params");
        assert!(render(&app, 60, 8).contains("connecting"));

        app.handle_stream_message(StreamMessage::Chunk("partial text".into()), params.stream_id);
        app.handle_stream_message(StreamMessage::Failed("reset".into()), params.stream_id);
        let screen = render(&app, 60, 8);
        assert!(screen.contains("connection lost"));
        assert!(screen.contains("partial text"));
        assert!(screen.contains("[Connection lost]"));
    }

    #[test]
    fn follows_newest_output_when_it_overflows() {
        let mut app = WatchApp::new(StreamSession::new("http://localhost:5000"));
        let params = app.session.submit("counting").expect("params");
        let body = (0..20).map(|i| format!("row {i:02}\n")).collect::<String>();
        app.handle_stream_message(StreamMessage::Chunk(body), params.stream_id);
        app.handle_stream_message(StreamMessage::Chunk("last".into()), params.stream_id);

        let screen = render(&app, 30, 9);
        assert!(screen.contains("last"));
        assert!(!screen.contains("row 00"));
    }

    #[test]
    fn state_colours_distinguish_outcomes() {
        assert_eq!(state_style(StreamState::Completed).fg, Some(Color::Green));
        assert_eq!(state_style(StreamState::Failed).fg, Some(Color::Red));
        assert!(state_style(StreamState::Receiving)
            .add_modifier
            .contains(Modifier::BOLD));
    }
}
