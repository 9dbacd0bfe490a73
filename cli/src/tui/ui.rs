use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap};
use tui_textarea::TextArea;

use super::app::{App, Focus, GenerationState, SAVE_FIELD_LABELS, SaveDialog, Tab};

pub fn render(frame: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let selected = Tab::ALL
        .iter()
        .position(|tab| *tab == app.tab())
        .unwrap_or(0);
    let titles = Tab::ALL
        .iter()
        .map(|tab| format!(" {} ", tab.label()))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(titles)
        .block(Block::default().title("cookbook").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    match app.tab() {
        Tab::Generate => render_generate(frame, app, layout[1]),
        Tab::Book => render_book(frame, app, layout[1]),
    }

    let status = Paragraph::new(status_text(app)).style(Style::default().fg(Color::Yellow));
    frame.render_widget(status, layout[2]);

    if let Some(dialog) = &app.save_dialog {
        render_save_dialog(frame, dialog);
    }
    if let Some(notice) = &app.notice {
        let area = centered_rect(50, 25, frame.area());
        frame.render_widget(Clear, area);
        let popup = Paragraph::new(format!("{notice}\n\nenter/esc to dismiss"))
            .wrap(Wrap { trim: false })
            .block(Block::default().title("Notice").borders(Borders::ALL));
        frame.render_widget(popup, area);
    }
}

fn render_generate(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let title = match app.generation {
        GenerationState::Idle => "Output",
        GenerationState::Generating => "Output (generating...)",
    };
    let output = Paragraph::new(app.output.as_str())
        .wrap(Wrap { trim: false })
        .scroll((app.output_scroll, 0))
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(output, layout[0]);

    render_input(frame, &app.prompt, "Prompt", app.focus == Focus::Prompt, layout[1]);
}

fn render_book(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(10),
        ])
        .split(area);

    let filters = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(layout[0]);
    render_input(frame, &app.search, "Search", app.focus == Focus::Search, filters[0]);
    render_input(
        frame,
        &app.max_calories,
        "Max calories",
        app.focus == Focus::MaxCalories,
        filters[1],
    );

    let rows = app.recipes.iter().map(|r| {
        Row::new(vec![
            Cell::from(r.name.clone()),
            Cell::from(r.calories.to_string()),
        ])
    });
    let table = Table::new(rows, [Constraint::Min(10), Constraint::Length(10)])
        .header(
            Row::new(vec!["Recipe Name", "Calories"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(focused_block("Recipes", app.focus == Focus::List))
        .row_highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    let mut state = TableState::default().with_selected(app.selected);
    frame.render_stateful_widget(table, layout[1], &mut state);

    let detail = Paragraph::new(app.detail.as_str())
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Details").borders(Borders::ALL));
    frame.render_widget(detail, layout[2]);
}

fn render_save_dialog(frame: &mut Frame<'_>, dialog: &SaveDialog) {
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);
    let block = Block::default().title("Save Recipe").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(inner);

    for (i, (field, label)) in dialog.fields.iter().zip(SAVE_FIELD_LABELS).enumerate() {
        render_input(frame, field, label, dialog.focus == i, layout[i]);
    }
    let help = Paragraph::new("enter save | esc cancel | tab next field")
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(help, layout[3]);
}

fn render_input(frame: &mut Frame<'_>, input: &TextArea<'_>, title: &str, focused: bool, area: Rect) {
    let block = focused_block(title, focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(input, inner);
}

fn focused_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(style)
}

fn status_text(app: &App) -> String {
    let keys = match app.focus {
        Focus::Prompt => match app.generation {
            GenerationState::Idle => "enter generate | ctrl-s save | pgup/pgdn scroll",
            GenerationState::Generating => "generating... | pgup/pgdn scroll",
        },
        Focus::Search | Focus::MaxCalories | Focus::List => {
            "type to filter | up/down select | ctrl-d delete"
        }
    };
    format!("{keys} | tab next | ctrl-q quit")
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
