pub mod charting;

use std::ops::Range;

use keysprint::{
    controller::Phase,
    score_store::best_label,
    session::{CharState, Cursor, SessionState, Word},
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
/// Word rows visible at once; the cursor row is always the first.
const VISIBLE_LINES: usize = 3;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.controller.phase() {
            Phase::Idle | Phase::Running => render_board(self, area, buf),
            Phase::Finished => render_results(self, area, buf),
        }
    }
}

fn bold_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold_style() -> Style {
    bold_style().add_modifier(Modifier::DIM)
}

fn render_board(app: &App, area: Rect, buf: &mut Buffer) {
    let ctl = &app.controller;
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1), // hud
            Constraint::Length(1),
            Constraint::Length(VISIBLE_LINES as u16),
            Constraint::Length(1),
            Constraint::Length(1), // status / hint
            Constraint::Min(0),
        ])
        .split(area);

    let metrics = ctl.metrics();
    let hud = Paragraph::new(Line::from(vec![
        Span::styled(format!("{}s", ctl.time_left().as_secs_f64().ceil()), bold_style()),
        Span::raw("   "),
        Span::styled(format!("{} wpm", metrics.wpm), bold_style()),
        Span::raw("   "),
        Span::styled(format!("{}% acc", metrics.accuracy), bold_style()),
        Span::raw("   "),
        Span::styled(
            format!("best {}", best_label(app.best.as_ref())),
            dim_bold_style(),
        ),
    ]))
    .alignment(Alignment::Center);
    hud.render(chunks[1], buf);

    let width = chunks[3].width as usize;
    let lines = word_lines(ctl.state().words(), width);
    let first = line_of(&lines, ctl.state().cursor().word);
    let text: Vec<Line> = lines
        .iter()
        .skip(first)
        .take(VISIBLE_LINES)
        .map(|range| styled_line(ctl.state(), range.clone()))
        .collect();
    Paragraph::new(text).render(chunks[3], buf);

    let footer = match (&app.status, ctl.phase()) {
        (Some(status), _) => Span::styled(status.clone(), Style::default().fg(Color::Yellow)),
        (None, Phase::Idle) => Span::styled(
            "press enter to start / (tab) reset / (ctrl+n) new words / (esc)ape",
            italic_style,
        ),
        (None, _) => Span::styled("(tab) reset / (esc)ape", italic_style),
    };
    Paragraph::new(footer)
        .alignment(Alignment::Center)
        .render(chunks[5], buf);
}

/// Greedily pack whole words into rows of at most `width` columns.
/// A word wider than a row gets a row of its own.
pub fn word_lines(words: &[Word], width: usize) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut used = 0;

    for (idx, word) in words.iter().enumerate() {
        // trailing space so the cursor can sit after the last char
        let w = word.to_string().width() + 1;
        if used > 0 && used + w > width {
            lines.push(start..idx);
            start = idx;
            used = 0;
        }
        used += w;
    }
    if start < words.len() {
        lines.push(start..words.len());
    }
    lines
}

fn line_of(lines: &[Range<usize>], word: usize) -> usize {
    lines
        .iter()
        .position(|range| range.contains(&word))
        .unwrap_or(0)
}

fn styled_line(state: &SessionState, words: Range<usize>) -> Line<'static> {
    let green_bold_style = bold_style().fg(Color::Green);
    let red_bold_style = bold_style().fg(Color::Red);
    let cursor = state.cursor();

    let mut spans = Vec::new();
    for idx in words {
        for (pos, (c, char_state)) in state.words()[idx]
            .chars()
            .iter()
            .zip(state.word_states(idx))
            .enumerate()
        {
            let style = match char_state {
                CharState::Correct => green_bold_style,
                CharState::Incorrect => red_bold_style,
                CharState::Pending => dim_bold_style(),
            };
            let style = if cursor == Cursor::new(idx, pos) {
                style.add_modifier(Modifier::UNDERLINED)
            } else {
                style
            };
            spans.push(Span::styled(c.to_string(), style));
        }

        let at_word_end = cursor.word == idx && cursor.char >= state.words()[idx].len();
        spans.push(if at_word_end {
            Span::styled(" ", dim_bold_style().add_modifier(Modifier::UNDERLINED))
        } else {
            Span::raw(" ")
        });
    }
    Line::from(spans)
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let ctl = &app.controller;
    let Some(outcome) = ctl.outcome() else {
        return;
    };
    let magenta_style = Style::default().fg(Color::Magenta);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // headline
            Constraint::Length(1), // high score banner
            Constraint::Length(2), // character summary
            Constraint::Length(1), // status
            Constraint::Length(1), // legend
        ])
        .split(area);

    let tuples: Vec<(f64, f64)> = ctl
        .wpm_trace()
        .points()
        .iter()
        .map(|&p| p.into())
        .collect();
    let (overall_duration, highest_wpm) =
        charting::compute_chart_params(&tuples, ctl.config().duration());

    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(magenta_style)
        .graph_type(GraphType::Line)
        .data(&tuples)];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([1.0, overall_duration])
                .labels(vec![
                    Span::styled("1", bold_style()),
                    Span::styled(charting::format_label(overall_duration), bold_style()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", bold_style()),
                    Span::styled(charting::format_label(highest_wpm), bold_style()),
                ]),
        );
    chart.render(chunks[0], buf);

    Paragraph::new(Span::styled(
        format!(
            "{} WPM • {}% accuracy",
            outcome.record.wpm, outcome.record.accuracy
        ),
        bold_style(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let banner = if outcome.is_new_high {
        Span::styled(
            "new high score saved!",
            bold_style().fg(Color::Yellow),
        )
    } else {
        Span::styled(
            format!("high score unchanged ({})", best_label(Some(&outcome.best))),
            dim_bold_style(),
        )
    };
    Paragraph::new(banner)
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let summary = outcome.summary;
    Paragraph::new(format!(
        "words typed: {} • correct chars: {} • incorrect chars: {} • total chars: {}",
        summary.words_typed, summary.correct_chars, summary.incorrect_chars, summary.total_chars
    ))
    .style(Style::default().fg(Color::Gray))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .render(chunks[3], buf);

    if let Some(status) = &app.status {
        Paragraph::new(Span::styled(status.clone(), Style::default().fg(Color::Yellow)))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);
    }

    Paragraph::new(Span::styled(
        "(enter) retry / (tab) back / (ctrl+x) reset high score / (esc)ape",
        italic_style,
    ))
    .render(chunks[5], buf);
}
