use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Handles scroll-related calculations for the output pane
pub struct ScrollCalculator;

impl ScrollCalculator {
    /// Pre-wrap text to a specific width at word boundaries, breaking tokens
    /// wider than the pane. Rendering the result without ratatui's own
    /// wrapping keeps row counts and scroll offsets in agreement.
    pub fn prewrap_text(text: &str, width: u16) -> Vec<String> {
        text.split('\n')
            .flat_map(|line| Self::wrap_line(line, width as usize))
            .collect()
    }

    fn wrap_line(line: &str, width: usize) -> Vec<String> {
        if width == 0 {
            return vec![line.to_string()];
        }

        let mut rows = Vec::new();
        let mut current = String::new();
        let mut current_width = 0usize;

        for word in line.split_inclusive(' ') {
            let visible_width = UnicodeWidthStr::width(word.trim_end_matches(' '));
            if current_width > 0 && current_width + visible_width > width {
                rows.push(Self::finish_row(&mut current));
                current_width = 0;
            }

            if visible_width > width {
                for ch in word.chars() {
                    let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
                    if current_width > 0 && current_width + ch_width > width && ch != ' ' {
                        rows.push(Self::finish_row(&mut current));
                        current_width = 0;
                    }
                    current.push(ch);
                    current_width += ch_width;
                }
            } else {
                current.push_str(word);
                current_width += UnicodeWidthStr::width(word);
            }
        }

        rows.push(Self::finish_row(&mut current));
        rows
    }

    fn finish_row(current: &mut String) -> String {
        let row = current.trim_end_matches(' ').to_string();
        current.clear();
        row
    }

    /// Largest offset that still fills the viewport.
    pub fn max_scroll_offset(total_rows: usize, available_height: u16) -> u16 {
        let total = u16::try_from(total_rows).unwrap_or(u16::MAX);
        total.saturating_sub(available_height)
    }
}
