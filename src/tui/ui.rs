use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus};
use crate::geo::{LocateError, LocateFailure};
use crate::models::{GenerationStatus, ReadingLength, TimeRangeKind};
use crate::selection::{DateSlot, ResolutionState, SearchState};

use super::Theme;

pub fn draw(frame: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(12), // Location + Topics
            Constraint::Length(9),  // Time range + Reading length
            Constraint::Length(3),  // Generate bar
            Constraint::Min(0),     // Results
            Constraint::Length(1),  // Status line
        ])
        .split(frame.area());

    let top = halves(rows[0]);
    let middle = halves(rows[1]);

    render_location(frame, app, top[0]);
    render_topics(frame, app, top[1]);
    render_time_range(frame, app, middle[0]);
    render_reading(frame, app, middle[1]);
    render_generate_bar(frame, app, rows[2]);
    render_results(frame, app, rows[3]);
    render_status(frame, app, rows[4]);

    if app.show_help {
        render_help(frame, &app.theme);
    }
}

fn halves(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(area)
}

fn panel<'a>(title: &'a str, focused: bool, theme: &Theme) -> Block<'a> {
    let color = if focused { theme.focus } else { theme.accent };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
}

fn input_line(value: &str, focused: bool, placeholder: &str, theme: &Theme) -> Line<'static> {
    if value.is_empty() && !focused {
        return Line::from(Span::styled(
            placeholder.to_string(),
            Style::default().fg(theme.muted),
        ));
    }
    let cursor = if focused { "_" } else { "" };
    Line::from(Span::styled(
        format!("> {value}{cursor}"),
        Style::default().fg(theme.text),
    ))
}

fn render_location(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let resolver = &app.resolver;
    let focused = app.focus == Focus::Location;

    let title = if resolver.is_locating() {
        " Location (locating...) "
    } else {
        " Location (F2: use current) "
    };
    let block = panel(title, focused, theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Search input
            Constraint::Length(2), // Status / error
            Constraint::Min(0),    // Dropdown or selection
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(input_line(
            resolver.query(),
            focused,
            "Search city, state, or country...",
            theme,
        )),
        chunks[0],
    );

    let status: Text = match resolver.state() {
        ResolutionState::Locating => Line::from(Span::styled(
            format!("{} Getting your location...", app.spinner()),
            Style::default().fg(theme.warning),
        ))
        .into(),
        ResolutionState::Error(e) => {
            let mut lines = vec![Line::from(Span::styled(
                e.message(),
                Style::default().fg(theme.error),
            ))];
            if matches!(e, LocateFailure::Position(LocateError::PermissionDenied)) {
                lines.push(Line::from(Span::styled(
                    "Check that gpsd is readable by your user, or set a fixed position in config.",
                    Style::default().fg(theme.muted),
                )));
            }
            Text::from(lines)
        }
        _ => match resolver.committed() {
            Some(location) => Line::from(vec![
                Span::styled("Selected: ", Style::default().fg(theme.muted)),
                Span::styled(
                    location.to_string(),
                    Style::default().fg(theme.ok).add_modifier(Modifier::BOLD),
                ),
            ])
            .into(),
            None => Line::from(Span::styled(
                "No location selected",
                Style::default().fg(theme.muted),
            ))
            .into(),
        },
    };
    frame.render_widget(Paragraph::new(status).wrap(Wrap { trim: true }), chunks[1]);

    if !resolver.is_dropdown_open() {
        return;
    }

    let placeholder = match resolver.search_state() {
        SearchState::Pending | SearchState::Searching => {
            Some(format!("{} Searching cities...", app.spinner()))
        }
        _ if resolver.results().is_empty() => Some(if resolver.query().chars().count() < 2 {
            "Type at least 2 characters...".to_string()
        } else {
            "No cities found".to_string()
        }),
        _ => None,
    };

    if let Some(text) = placeholder {
        frame.render_widget(
            Paragraph::new(text).style(Style::default().fg(theme.muted)),
            chunks[2],
        );
        return;
    }

    let items: Vec<ListItem> = resolver
        .results()
        .iter()
        .map(|location| {
            ListItem::new(Line::from(vec![
                Span::styled(location.city.clone(), Style::default().fg(theme.text)),
                Span::styled(
                    format!("  {}", location.region_line()),
                    Style::default().fg(theme.muted),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(Style::default().bg(theme.highlight_bg).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(resolver.highlighted()));
    frame.render_stateful_widget(list, chunks[2], &mut state);
}

fn render_topics(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let picker = &app.topics;
    let focused = app.focus == Focus::Topics;

    let block = panel(" Topics ", focused, theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Filter input
            Constraint::Length(2), // Selected chips
            Constraint::Min(0),    // Candidates
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(input_line(
            picker.query(),
            focused,
            "Search topics... (e.g., AI, stocks, politics)",
            theme,
        )),
        chunks[0],
    );

    let selected = picker.selection().as_slice();
    let chips = if selected.is_empty() {
        Line::from(Span::styled(
            "No topics selected",
            Style::default().fg(theme.muted),
        ))
    } else {
        Line::from(
            selected
                .iter()
                .map(|t| {
                    Span::styled(
                        format!("[{} {}] ", t.icon, t.name),
                        Style::default().fg(theme.ok),
                    )
                })
                .collect::<Vec<_>>(),
        )
    };
    frame.render_widget(Paragraph::new(chips).wrap(Wrap { trim: true }), chunks[1]);

    let candidates = picker.candidates();
    if candidates.is_empty() {
        frame.render_widget(
            Paragraph::new("No topics found").style(Style::default().fg(theme.muted)),
            chunks[2],
        );
        return;
    }

    let items: Vec<ListItem> = candidates
        .iter()
        .map(|topic| {
            let mark = if picker.selection().contains(&topic.id) {
                " ✓"
            } else {
                ""
            };
            ListItem::new(format!("{} {}{mark}", topic.icon, topic.name))
        })
        .collect();

    let title = if selected.is_empty() && picker.query().is_empty() {
        "POPULAR TOPICS"
    } else {
        ""
    };
    let list = List::new(items)
        .block(Block::default().title(title))
        .highlight_style(Style::default().bg(theme.highlight_bg).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if focused {
        state.select(Some(picker.highlighted()));
    }
    frame.render_stateful_widget(list, chunks[2], &mut state);
}

fn render_time_range(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let picker = &app.time_range;
    let range = picker.range();

    let block = panel(" Time Range ", app.focus == Focus::TimeRange, theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = TimeRangeKind::ALL
        .iter()
        .map(|kind| {
            let chosen = *kind == range.kind;
            let marker = if chosen { "● " } else { "○ " };
            let style = if chosen {
                Style::default().fg(theme.ok).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text)
            };
            Line::from(vec![
                Span::styled(format!("{marker}{}", kind.label()), style),
                Span::styled(
                    format!("  {}", kind.description()),
                    Style::default().fg(theme.muted),
                ),
            ])
        })
        .collect();

    if picker.is_custom() {
        let show = |date: Option<chrono::NaiveDate>, slot: DateSlot| match date {
            _ if picker.slot() == slot && !picker.date_input().is_empty() => {
                format!("{}_", picker.date_input())
            }
            Some(d) => d.to_string(),
            None if picker.slot() == slot => "YYYY-MM-DD_".to_string(),
            None => "----------".to_string(),
        };
        lines.push(Line::from(format!(
            "From {}  To {}",
            show(range.start_date, DateSlot::Start),
            show(range.end_date, DateSlot::End)
        )));
        if let Some(err) = picker.date_error() {
            lines.push(Line::from(Span::styled(
                err.to_string(),
                Style::default().fg(theme.error),
            )));
        }
    } else {
        lines.push(Line::from(Span::styled(
            range.summary(),
            Style::default().fg(theme.muted),
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_reading(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let block = panel(" Article Length ", app.focus == Focus::Reading, theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = ReadingLength::ALL
        .iter()
        .map(|length| {
            let chosen = *length == app.reading;
            let marker = if chosen { "● " } else { "○ " };
            let style = if chosen {
                Style::default().fg(theme.ok).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text)
            };
            Line::from(vec![
                Span::styled(format!("{marker}{}", length.label()), style),
                Span::styled(
                    format!("  {} | {}", length.duration(), length.word_count()),
                    Style::default().fg(theme.muted),
                ),
            ])
        })
        .collect();

    let note = if app.reading == ReadingLength::All {
        "Showing articles of all lengths".to_string()
    } else {
        format!(
            "Filtering for {} articles ({})",
            app.reading.duration(),
            app.reading.word_count()
        )
    };
    lines.push(Line::from(Span::styled(note, Style::default().fg(theme.muted))));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_generate_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let fields = app.field_state();

    let (text, color) = if app.generation.is_in_flight() {
        (
            format!("{} Searching across the web...", app.spinner()),
            theme.warning,
        )
    } else if let Some(notice) = app.generation.missing() {
        let missing: Vec<_> = notice.fields.iter().map(|f| f.label()).collect();
        (
            format!(
                "Please select all fields above to generate news. Missing: {}",
                missing.join(", ")
            ),
            theme.error,
        )
    } else if fields.all_ready() {
        ("✓ Ready. Press F5 to generate news".to_string(), theme.ok)
    } else {
        ("Fill in the fields above, then press F5".to_string(), theme.muted)
    };

    let block = Block::default()
        .title(" Generate News ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    frame.render_widget(
        Paragraph::new(text).block(block).style(Style::default().fg(color)),
        area,
    );
}

fn render_results(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let focused = app.focus == Focus::Results;

    let title = match app.generation.result() {
        Some(r) => format!(" Articles ({}) ", r.total_count),
        None => " Articles ".to_string(),
    };
    let block = panel(&title, focused, theme);

    let placeholder = match app.generation.status() {
        GenerationStatus::Idle => Some("No news generated yet.".to_string()),
        GenerationStatus::InFlight => Some(format!(
            "{} Scanning sources and analyzing content...",
            app.spinner()
        )),
        GenerationStatus::Failed => Some("Failed to fetch news. Press F5 to retry.".to_string()),
        GenerationStatus::Ready if app.articles().is_empty() => {
            let message = app
                .generation
                .result()
                .map(|r| r.message.as_str())
                .filter(|m| !m.is_empty())
                .unwrap_or("No articles found for your search criteria");
            Some(format!("{message}\n0 articles"))
        }
        GenerationStatus::Ready => None,
    };

    if let Some(text) = placeholder {
        frame.render_widget(
            Paragraph::new(text)
                .block(block)
                .style(Style::default().fg(theme.muted)),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = app
        .articles()
        .iter()
        .enumerate()
        .map(|(i, article)| {
            let title = if article.title.is_empty() {
                "No title"
            } else {
                article.title.as_str()
            };
            let source = if article.source.is_empty() {
                "Unknown"
            } else {
                article.source.as_str()
            };

            let mut lines = vec![
                Line::from(Span::styled(
                    title.to_string(),
                    Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("{source} · {}", article.published_at),
                    Style::default().fg(theme.muted),
                )),
            ];
            if app.expanded_article == Some(i) {
                let body = if article.summary.is_empty() {
                    &article.content
                } else {
                    &article.summary
                };
                lines.extend(body.lines().map(|l| Line::from(l.to_string())));
                if !article.url.is_empty() {
                    lines.push(Line::from(Span::styled(
                        article.url.clone(),
                        Style::default().fg(theme.accent),
                    )));
                }
            }
            ListItem::new(Text::from(lines))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(theme.highlight_bg))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.selected_article));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let hints = match app.focus {
        Focus::Location => "type:search  ↑/↓:pick  Enter:select  Esc:close",
        Focus::Topics => "type:filter  Enter:add  Del:remove  Bksp:drop last",
        Focus::TimeRange => "↑/↓:range  custom: type date, Enter to set",
        Focus::Reading => "↑/↓:length",
        Focus::Results => "j/k:nav  Enter:expand  o:open",
    };
    let status = format!("{hints}  |  Tab:next  F5:generate  F1:help  Ctrl-C:quit");

    let paragraph = Paragraph::new(status).style(Style::default().fg(app.theme.muted));
    frame.render_widget(paragraph, area);
}

fn render_help(frame: &mut Frame, theme: &Theme) {
    let area = centered_rect(50, 60, frame.area());

    let help_text = [
        "",
        " Navigation:",
        "   Tab / Shift-Tab   Next / previous panel",
        "   ↑ / ↓             Move within panel",
        "   Enter             Select / confirm",
        "",
        " Actions:",
        "   F2                Use current location",
        "   F3                Toggle dark mode",
        "   F5                Generate news",
        "   Del               Remove highlighted topic",
        "   o                 Open article in browser",
        "",
        " General:",
        "   F1                Show this help",
        "   Ctrl-C            Quit",
        "",
        " Press any key to close",
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent));

    let paragraph = Paragraph::new(help_text.join("\n"))
        .block(block)
        .style(Style::default().fg(theme.text));

    frame.render_widget(ratatui::widgets::Clear, area);
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use crate::config::Config;

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn missing_fields_notice_is_rendered() {
        let config = Config {
            geocoder_url: "http://127.0.0.1:1".to_string(),
            backend_url: "http://127.0.0.1:1".to_string(),
            ..Config::default()
        };
        let mut app = App::new(&config).unwrap();
        app.handle_action(crate::tui::AppAction::GenerateNews, std::time::Instant::now());

        let text = screen(&app);
        assert!(text.contains("Missing: Location, Topics"), "{text}");
        assert!(text.contains("No news generated yet."));
    }
}
