//! TUI rendering using ratatui.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Block, Borders, Cell, Chart, Clear, Dataset, Gauge, GraphType, Paragraph, Row, Table,
    Tabs, Wrap,
};

use mealwise_core::chat::markup::{self, Block as MarkupBlock, Span as MarkupSpan};
use mealwise_core::chat::{ChatRole, UNAVAILABLE};
use mealwise_core::notify::Level;
use mealwise_core::plan::GeneratedPlan;
use mealwise_core::progress::ChartView;
use mealwise_core::wizard::{Step, Tab};

use super::app::{App, Field, FieldKind, PROGRESS_FIELDS};

const TERMS_TEXT: &str = "The plan and the chat answers are produced by an AI model. They are \
    general wellbeing suggestions, not medical advice. Talk to a health professional before \
    changing your diet, especially if you take medication or have a medical condition.";

fn heading(text: &str) -> Span<'_> {
    Span::styled(
        text,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
}

/// Render the current view.
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // progress / tabs
            Constraint::Min(3),    // main content
            Constraint::Length(1), // status bar
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);

    match app.wizard.step() {
        Step::Personal | Step::Body | Step::Lifestyle | Step::Terms => {
            render_form(f, app, chunks[1])
        }
        Step::Processing => render_processing(f, chunks[1]),
        Step::Result => match app.wizard.tab() {
            Tab::Home => render_overview(f, app, chunks[1]),
            Tab::Plan => render_plan(f, app, chunks[1]),
            Tab::Chat => render_chat(f, app, chunks[1]),
            Tab::Progress => render_progress(f, app, chunks[1]),
        },
    }

    render_toasts(f, app, chunks[1]);
    render_status_bar(f, app, chunks[2]);

    if app.show_help {
        render_help(f, app, f.area());
    }
    if let Some(kind) = app.wizard.pending_reset() {
        render_confirm(f, kind.confirmation_prompt(), f.area());
    }
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let step = app.wizard.step();
    match step {
        Step::Result => {
            let titles = Tab::ALL.iter().map(|t| Line::from(format!(" {} ", t.label())));
            let selected = Tab::ALL
                .iter()
                .position(|t| *t == app.wizard.tab())
                .unwrap_or(0);
            let tabs = Tabs::new(titles)
                .select(selected)
                .highlight_style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
                .block(Block::default().borders(Borders::ALL).title(" Mealwise "));
            f.render_widget(tabs, area);
        }
        _ => {
            let label = match step.index() {
                Some(i) => format!("Step {} of {}: {}", i + 1, Step::INPUT.len(), step.title()),
                None => step.title().to_string(),
            };
            let percent = if step == Step::Processing {
                100
            } else {
                u16::from(app.wizard.completion_percent())
            };
            let gauge = Gauge::default()
                .block(Block::default().borders(Borders::ALL).title(" Mealwise "))
                .gauge_style(Style::default().fg(Color::Green))
                .percent(percent)
                .label(label);
            f.render_widget(gauge, area);
        }
    }
}

// ---------------------------------------------------------------------------
// Wizard steps
// ---------------------------------------------------------------------------

fn field_value(app: &App, field: Field, focused: bool) -> String {
    let profile = app.wizard.profile();
    match field.kind() {
        FieldKind::Number if focused => match &app.number_input {
            Some(buffer) => format!("{buffer}_"),
            None => field.display(profile, app.wizard.terms_accepted()),
        },
        FieldKind::Text if focused => format!("{}_", field.display(profile, false)),
        FieldKind::Choice if focused => format!("< {} >", field.display(profile, false)),
        _ => field.display(profile, app.wizard.terms_accepted()),
    }
}

fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let step = app.wizard.step();
    let extra_height = if step == Step::Terms { 8 } else { 3 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(extra_height)])
        .split(area);

    let rows = app.fields().iter().enumerate().map(|(i, field)| {
        let focused = i == app.selected_field;
        let style = if focused {
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Row::new(vec![
            Cell::from(field.label()),
            Cell::from(field_value(app, *field, focused)),
        ])
        .style(style)
    });

    let table = Table::new(rows, [Constraint::Length(28), Constraint::Min(10)]).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", step.title())),
    );
    f.render_widget(table, chunks[0]);

    let mut lines = Vec::new();
    if step == Step::Terms {
        if let Some(error) = app.wizard.error() {
            lines.push(Line::from(Span::styled(
                error,
                Style::default().fg(Color::White).bg(Color::Red),
            )));
        }
        lines.push(Line::from(TERMS_TEXT));
        lines.push(Line::from(""));
        lines.push(Line::from("Space: accept   Enter: generate my plan"));
    } else {
        lines.push(Line::from(
            "Enter: next   Shift+Tab: back   Left/Right: change option",
        ));
    }
    let hint = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(hint, chunks[1]);
}

fn render_processing(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(heading("  Building your weekly plan...")),
        Line::from(""),
        Line::from("  Balancing calories, protein and your restrictions. This can take a little while."),
    ];
    let p = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(" Working "));
    f.render_widget(p, area);
}

// ---------------------------------------------------------------------------
// Result tabs
// ---------------------------------------------------------------------------

fn render_missing_plan(f: &mut Frame, area: Rect) {
    let p = Paragraph::new(UNAVAILABLE).block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

fn render_overview(f: &mut Frame, app: &App, area: Rect) {
    let Some(plan) = app.wizard.plan() else {
        return render_missing_plan(f, area);
    };
    let name = app.wizard.profile().name.trim();
    let greeting = if name.is_empty() {
        "Hello!".to_string()
    } else {
        format!("Hello, {name}!")
    };

    let mut lines = vec![
        Line::from(heading(&greeting)),
        Line::from(plan.summary.as_str()),
        Line::from(""),
        Line::from(format!(
            "Average daily target: {} kcal over {} days",
            plan.average_daily_calories(),
            plan.daily_plans.len()
        )),
        Line::from(""),
        Line::from(heading("Nutritional strategy")),
    ];
    lines.push(Line::from(plan.nutritional_strategy.as_str()));
    lines.push(Line::from(""));
    lines.push(Line::from(heading("Wellbeing tips")));
    lines.push(Line::from(plan.side_effect_management.as_str()));

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0))
        .block(Block::default().borders(Borders::ALL).title(" Overview "));
    f.render_widget(p, area);
}

fn render_plan(f: &mut Frame, app: &App, area: Rect) {
    let Some(plan) = app.wizard.plan() else {
        return render_missing_plan(f, area);
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Min(3),
        ])
        .split(area);

    render_day_selector(f, app, plan, chunks[0]);

    let Some(day) = plan.daily_plans.get(app.selected_day) else {
        return;
    };

    let header_cells = ["Meal", "Dish", "kcal", "Protein"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
    let header = Row::new(header_cells).height(1);
    let rows = day.meals().map(|(slot, meal)| {
        Row::new(vec![
            Cell::from(slot.label()),
            Cell::from(meal.name.clone()),
            Cell::from(meal.calories.to_string()),
            Cell::from(meal.protein.clone()),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Min(20),
            Constraint::Length(6),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(format!(
        " {} - {} ({} kcal) ",
        day.day, day.theme, day.total_calories
    )));
    f.render_widget(table, chunks[1]);

    let mut lines = Vec::new();
    for (slot, meal) in day.meals() {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{}: ", slot.label()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(meal.description.as_str()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Hydration: ", Style::default().fg(Color::Cyan)),
        Span::raw(day.hydration_tip.as_str()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Exercise: ", Style::default().fg(Color::Green)),
        Span::raw(day.exercise_suggestion.as_str()),
    ]));

    let details = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0))
        .block(Block::default().borders(Borders::ALL).title(" Details "));
    f.render_widget(details, chunks[2]);
}

fn render_day_selector(f: &mut Frame, app: &App, plan: &GeneratedPlan, area: Rect) {
    let titles = plan
        .daily_plans
        .iter()
        .map(|d| Line::from(d.day.chars().take(3).collect::<String>()));
    let tabs = Tabs::new(titles)
        .select(app.selected_day)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Days (Left/Right) "),
        );
    f.render_widget(tabs, area);
}

/// Convert the assistant's light markup into styled lines.
fn markup_lines<'a>(text: &'a str) -> Vec<Line<'a>> {
    let styled = |spans: Vec<MarkupSpan<'a>>| -> Vec<Span<'a>> {
        spans
            .into_iter()
            .map(|s| match s {
                MarkupSpan::Plain(t) => Span::raw(t),
                MarkupSpan::Bold(t) => {
                    Span::styled(t, Style::default().add_modifier(Modifier::BOLD))
                }
            })
            .collect()
    };

    markup::parse(text)
        .into_iter()
        .map(|block| match block {
            MarkupBlock::Blank => Line::from(""),
            MarkupBlock::Paragraph(spans) => Line::from(styled(spans)),
            MarkupBlock::ListItem(spans) => {
                let mut line = vec![Span::raw("  \u{2022} ")];
                line.extend(styled(spans));
                Line::from(line)
            }
        })
        .collect()
}

fn render_chat(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    if app.wizard.plan().is_none() {
        return render_missing_plan(f, area);
    }

    let mut lines = Vec::new();
    for message in app.chat.transcript() {
        let (who, color) = match message.role {
            ChatRole::User => ("You", Color::Cyan),
            ChatRole::Assistant => ("Assistant", Color::Green),
        };
        lines.push(Line::from(Span::styled(
            who,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        lines.extend(markup_lines(&message.text));
        lines.push(Line::from(""));
    }
    if app.chat.is_waiting() {
        lines.push(Line::from(Span::styled(
            "Assistant is typing...",
            Style::default().fg(Color::DarkGray),
        )));
    }

    // Keep the newest messages in view; Up/Down scroll back.
    let visible = chunks[0].height.saturating_sub(2);
    let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let offset = total.saturating_sub(visible).saturating_sub(app.scroll);

    let transcript = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((offset, 0))
        .block(Block::default().borders(Borders::ALL).title(" Nutrition assistant "));
    f.render_widget(transcript, chunks[0]);

    let input = Paragraph::new(format!("> {}_", app.chat_input)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Ask about your plan (Enter to send) "),
    );
    f.render_widget(input, chunks[1]);
}

fn render_progress(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Min(5)])
        .split(area);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    render_weight_chart(f, app, chunks[0]);
    render_history(f, app, bottom[0]);
    render_progress_form(f, app, bottom[1]);
}

fn render_weight_chart(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Weight trend ");
    match app.progress.chart() {
        ChartView::Empty { message } => {
            let p = Paragraph::new(Span::styled(message, Style::default().fg(Color::DarkGray)))
                .block(block);
            f.render_widget(p, area);
        }
        ChartView::Series {
            points,
            y_min,
            y_max,
        } => {
            let data: Vec<(f64, f64)> = points
                .iter()
                .enumerate()
                .map(|(i, p)| (i as f64, p.weight))
                .collect();
            let x_max = (points.len() - 1) as f64;
            let x_labels = vec![
                points.first().map(|p| p.label.clone()).unwrap_or_default(),
                points.last().map(|p| p.label.clone()).unwrap_or_default(),
            ];
            let dataset = Dataset::default()
                .name("kg")
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Green))
                .data(&data);
            let chart = Chart::new(vec![dataset])
                .block(block)
                .x_axis(Axis::default().bounds([0.0, x_max]).labels(x_labels))
                .y_axis(Axis::default().bounds([y_min, y_max]).labels(vec![
                    format!("{y_min:.1}"),
                    format!("{y_max:.1}"),
                ]));
            f.render_widget(chart, area);
        }
    }
}

fn render_history(f: &mut Frame, app: &App, area: Rect) {
    let header_cells = ["Date", "Weight", "Photos", "Notes"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
    let header = Row::new(header_cells).height(1);

    let rows = app.progress.history().map(|entry| {
        let photos = entry
            .photos
            .as_ref()
            .map(|p| p.attached().join(","))
            .unwrap_or_else(|| "-".to_string());
        Row::new(vec![
            Cell::from(entry.date.clone()),
            Cell::from(format!("{:.1} kg", entry.weight)),
            Cell::from(photos),
            Cell::from(entry.notes.clone().unwrap_or_default()),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(15),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(" History "));
    f.render_widget(table, area);
}

fn render_progress_form(f: &mut Frame, app: &App, area: Rect) {
    let form = &app.progress_form;
    let rows = PROGRESS_FIELDS.iter().enumerate().map(|(i, label)| {
        let focused = i == form.selected;
        let value = if focused {
            format!("{}_", form.value(i))
        } else {
            form.value(i).to_string()
        };
        let style = if focused {
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Row::new(vec![Cell::from(*label), Cell::from(value)]).style(style)
    });

    let title = if app.photos_pending {
        " New entry (compressing photos...) "
    } else {
        " New entry (Enter to save) "
    };
    let table = Table::new(rows, [Constraint::Length(12), Constraint::Min(10)])
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(table, area);
}

// ---------------------------------------------------------------------------
// Overlays
// ---------------------------------------------------------------------------

/// A rectangle of `width` x `height` centered in `area`, clamped to it.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_toasts(f: &mut Frame, app: &App, area: Rect) {
    let width = 48.min(area.width);
    let mut y = area.y + 1;
    for toast in app.toasts.iter().rev().take(3) {
        if y + 3 > area.y + area.height {
            break;
        }
        let color = match toast.level {
            Level::Success => Color::Green,
            Level::Error => Color::Red,
            Level::Info => Color::Blue,
        };
        let rect = Rect {
            x: area.x + area.width - width,
            y,
            width,
            height: 3,
        };
        f.render_widget(Clear, rect);
        let p = Paragraph::new(toast.message.as_str())
            .style(Style::default().fg(Color::White))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            );
        f.render_widget(p, rect);
        y += 3;
    }
}

fn render_help(f: &mut Frame, app: &App, area: Rect) {
    let mut text = vec![Line::from(""), Line::from(heading("  This step"))];
    for line in app.wizard.help().lines() {
        text.push(Line::from(format!("    {line}")));
    }
    text.extend([
        Line::from(""),
        Line::from(heading("  Keys")),
        Line::from("    Enter       Next step / submit / send"),
        Line::from("    Shift+Tab   Previous step / previous tab"),
        Line::from("    Tab         Next field / next tab"),
        Line::from("    Left/Right  Change option / change day"),
        Line::from("    Ctrl+E      Export the plan as PDF"),
        Line::from("    Ctrl+L      Clear the form"),
        Line::from("    Ctrl+R      Start over (erases progress)"),
        Line::from("    Esc         Quit"),
        Line::from(""),
    ]);

    let rect = centered(area, 72, 22);
    f.render_widget(Clear, rect);
    let help = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Help "));
    f.render_widget(help, rect);
}

fn render_confirm(f: &mut Frame, prompt: &str, area: Rect) {
    let rect = centered(area, 60, 6);
    f.render_widget(Clear, rect);
    let text = vec![
        Line::from(prompt),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(": confirm   "),
            Span::styled("n", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(": cancel"),
        ]),
    ];
    let p = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Confirm "));
    f.render_widget(p, rect);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let view_name = match app.wizard.step() {
        Step::Result => app.wizard.tab().label(),
        step => step.title(),
    };

    let status_msg = app.status_message.as_deref().unwrap_or("");
    let entries = app.progress.len();

    let bar = Line::from(vec![
        Span::styled(
            format!(" {view_name} "),
            Style::default().bg(Color::Blue).fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{entries} progress entries"),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  "),
        Span::styled(status_msg, Style::default().fg(Color::Green)),
        Span::raw("  Esc:quit  F1:help"),
    ]);

    f.render_widget(Paragraph::new(bar), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use mealwise_core::progress::{EMPTY_CHART_MESSAGE, NewEntry, ProgressLog};
    use mealwise_core::wizard::Tab;
    use mealwise_test_utils::{MemoryStore, ScriptedChat, ScriptedGateway, sample_plan};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn first_step_shows_progress_and_fields() {
        let (app, _rx) = App::new(
            Arc::new(ScriptedGateway::succeeding(sample_plan())),
            Arc::new(ScriptedChat::new()),
            ProgressLog::load(Box::new(MemoryStore::new())),
            "English",
        );
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Step 1 of 4: About you"));
        assert!(text.contains("Name"));
        assert!(text.contains("Gender"));
    }

    /// An app showing the Progress tab with `weights` already logged.
    fn progress_app(weights: &[f64]) -> App {
        let mut log = ProgressLog::load(Box::new(MemoryStore::new()));
        for weight in weights {
            log.record(NewEntry {
                weight: *weight,
                ..NewEntry::default()
            })
            .unwrap();
        }
        let (mut app, _rx) = App::new(
            Arc::new(ScriptedGateway::succeeding(sample_plan())),
            Arc::new(ScriptedChat::new()),
            log,
            "English",
        );

        for _ in 0..3 {
            app.wizard.next().unwrap();
        }
        app.wizard.set_terms_accepted(true);
        let ticket = app.wizard.begin_submit().unwrap();
        app.wizard.finish_submit(ticket, Ok(sample_plan()));
        app.wizard.select_tab(Tab::Progress).unwrap();
        app
    }

    fn braille_cells(text: &str) -> usize {
        text.chars()
            .filter(|c| ('\u{2801}'..='\u{28FF}').contains(c))
            .count()
    }

    #[test]
    fn progress_tab_shows_message_below_two_entries() {
        for weights in [&[][..], &[80.0][..]] {
            let app = progress_app(weights);
            let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
            terminal.draw(|f| render(f, &app)).unwrap();

            let text = buffer_text(&terminal);
            assert!(text.contains(EMPTY_CHART_MESSAGE), "{text}");
            assert_eq!(braille_cells(&text), 0);
        }
    }

    #[test]
    fn progress_tab_draws_line_for_two_entries() {
        let app = progress_app(&[80.0, 78.0]);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(!text.contains(EMPTY_CHART_MESSAGE));
        assert!(braille_cells(&text) > 0, "{text}");
        // Axis bounds pad the lowest and highest points by 2 kg.
        assert!(text.contains("76.0"));
        assert!(text.contains("82.0"));
        assert!(text.contains("78.0 kg"));
        assert!(text.contains("80.0 kg"));
    }

    #[test]
    fn markup_bold_is_styled() {
        let lines = markup_lines("**Tip** here\n- one");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans[0].content, "Tip");
        assert!(lines[0].spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(lines[1].spans[1].content, "one");
    }

    #[test]
    fn centered_rect_is_clamped() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered(area, 60, 6);
        assert_eq!(rect.width, 40);
        assert_eq!(rect.y, 2);
    }
}
