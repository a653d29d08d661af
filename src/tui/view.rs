// File: src/tui/view.rs
use crate::color_utils::{self, Rgb};
use crate::dispatch::{Dispatcher, NoticeLevel};
use crate::model::Priority;
use crate::store::RowStore;
use crate::tui::state::{AppState, FormField, InputMode};
use crate::view::ViewRow;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

fn rgb((r, g, b): Rgb) -> Color {
    Color::Rgb(r, g, b)
}

pub fn draw<S: RowStore>(f: &mut Frame, state: &mut AppState, dispatcher: &Dispatcher<S>) {
    let full_help_text = vec![
        Line::from(vec![
            Span::styled(
                " TASKS ",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" a:Add  Space:Toggle Done  d:Delete  n:Notes"),
        ]),
        Line::from(vec![
            Span::styled(
                " VIEW ",
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" j/k:Up/Down  f:Filter by date  r:Refresh  ?:Help  q:Quit"),
        ]),
        Line::from(vec![
            Span::styled(
                " FORMS ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Tab:Next field  Left/Right:Priority  Enter:Save  Esc:Cancel"),
        ]),
    ];

    let footer_height = if state.show_full_help {
        Constraint::Length(full_help_text.len() as u16 + 2)
    } else {
        Constraint::Length(3)
    };

    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), footer_height])
        .split(f.area());

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(v_chunks[1]);

    let view = dispatcher.view();
    state.sync_list_states(view);

    // --- Header ---
    let filter_label = match dispatcher.filter() {
        Some(d) => format!(" [{}]", d),
        None => " [all dates]".to_string(),
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "TaskFlow",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(filter_label, Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled(view.summary(), Style::default().fg(Color::Gray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", state.clock))
            .title_alignment(Alignment::Right),
    );
    f.render_widget(header, v_chunks[0]);

    // --- Task lists ---
    let width = main_chunks[0].width.saturating_sub(2) as usize;
    let pending_items: Vec<ListItem> = view.pending.iter().map(|r| task_item(r, width)).collect();
    let done_items: Vec<ListItem> = view.done.iter().map(|r| task_item(r, width)).collect();

    let pending_title = if state.busy {
        " Tasks (Syncing...) ".to_string()
    } else {
        format!(" Tasks ({}) ", view.pending.len())
    };
    let pending = List::new(pending_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(pending_title)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::Green)
                .fg(Color::Black),
        );
    f.render_stateful_widget(pending, main_chunks[0], &mut state.pending_state);

    let done = List::new(done_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Completed ({}) ", view.done.len())),
        )
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::Blue)
                .fg(Color::White),
        );
    f.render_stateful_widget(done, main_chunks[1], &mut state.done_state);

    // --- Footer ---
    let footer_area = v_chunks[2];
    f.render_widget(Clear, footer_area);

    if state.mode == InputMode::Filtering {
        let input = Paragraph::new(format!("/ {}", state.filter_input))
            .style(Style::default().fg(Color::Green))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Filter by date (YYYY-MM-DD, empty = all) "),
            );
        f.render_widget(input, footer_area);
        let cursor_x = footer_area.x + 3 + state.filter_input.chars().count() as u16;
        if cursor_x < footer_area.right().saturating_sub(1) {
            f.set_cursor_position((cursor_x, footer_area.y + 1));
        }
    } else if state.show_full_help {
        let h_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(footer_area);
        let p = Paragraph::new(full_help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Keyboard Shortcuts (Press ? to minimize) ")
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(p, h_chunks[0]);
        f.render_widget(status_paragraph(dispatcher), h_chunks[1]);
    } else {
        let f_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(footer_area);
        let help = Paragraph::new("a:Add Spc:Done d:Del n:Notes f:Filter ?:Help")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Right)
            .block(
                Block::default()
                    .borders(Borders::RIGHT | Borders::TOP | Borders::BOTTOM)
                    .title(" Actions "),
            );
        f.render_widget(status_paragraph(dispatcher), f_chunks[0]);
        f.render_widget(help, f_chunks[1]);
    }

    // --- Popups ---
    if let InputMode::Adding(field) = state.mode {
        draw_form(f, dispatcher, field);
    }
    if let Some(editor) = dispatcher.editor() {
        let area = centered_rect(60, 30, f.area());
        let p = Paragraph::new(format!("{}_", editor.text))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", editor.title))
                    .title_bottom(" Enter:Save  Esc:Close ")
                    .border_style(Style::default().fg(Color::Blue)),
            );
        f.render_widget(Clear, area);
        f.render_widget(p, area);
    }
}

fn task_item(row: &ViewRow, width: usize) -> ListItem<'static> {
    let t = &row.task;
    let checkbox = if t.status.is_done() { "[x]" } else { "[ ]" };
    let note_mark = if t.note.trim().is_empty() { "" } else { " *" };

    let left_text = format!(" {} {}{}", checkbox, t.task, note_mark);
    let right_text = if t.created_time.is_empty() {
        format!("{} ", t.date)
    } else {
        format!("{}  {} ", t.date, t.created_time)
    };

    let total_len = 1 + left_text.chars().count() + right_text.chars().count();
    let padding = " ".repeat(width.saturating_sub(total_len));

    ListItem::new(Line::from(vec![
        Span::styled("▌", Style::default().fg(rgb(row.color))),
        Span::raw(left_text),
        Span::raw(padding),
        Span::styled(right_text, Style::default().fg(Color::DarkGray)),
    ]))
}

fn status_paragraph<S: RowStore>(dispatcher: &Dispatcher<S>) -> Paragraph<'static> {
    let (text, color) = match dispatcher.notice() {
        Some(n) if n.level == NoticeLevel::Error => (n.text.clone(), Color::LightRed),
        Some(n) => (n.text.clone(), Color::Cyan),
        None => (String::new(), Color::Cyan),
    };
    Paragraph::new(text).style(Style::default().fg(color)).block(
        Block::default()
            .borders(Borders::LEFT | Borders::TOP | Borders::BOTTOM)
            .title(" Status "),
    )
}

fn draw_form<S: RowStore>(f: &mut Frame, dispatcher: &Dispatcher<S>, field: FormField) {
    let form = &dispatcher.form;
    let area = centered_rect(60, 40, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Create Task ")
        .title_bottom(" Tab:Next  Enter:Add  Esc:Cancel ")
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    let field_block = |title: &'static str, active: bool| {
        let style = if active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(style)
    };

    f.render_widget(
        Paragraph::new(form.task.as_str()).block(field_block(" Task Name ", field == FormField::Task)),
        rows[0],
    );
    f.render_widget(
        Paragraph::new(form.date.as_str())
            .block(field_block(" Date (YYYY-MM-DD) ", field == FormField::Date)),
        rows[1],
    );

    let choices: Vec<Span> = Priority::ALL
        .iter()
        .map(|p| {
            let color = color_utils::priority_color(Some(*p));
            let label = format!(" {} ", p);
            if *p == form.priority {
                let fg = if color_utils::is_dark(color) {
                    Color::White
                } else {
                    Color::Black
                };
                Span::styled(
                    label,
                    Style::default()
                        .bg(rgb(color))
                        .fg(fg)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(label, Style::default().fg(rgb(color)))
            }
        })
        .collect();
    f.render_widget(
        Paragraph::new(Line::from(choices))
            .alignment(Alignment::Center)
            .block(field_block(" Priority ", field == FormField::Priority)),
        rows[2],
    );

    let (cursor_row, text) = match field {
        FormField::Task => (rows[0], &form.task),
        FormField::Date => (rows[1], &form.date),
        FormField::Priority => return,
    };
    let cursor_x = cursor_row.x + 1 + text.chars().count() as u16;
    if cursor_x < cursor_row.right().saturating_sub(1) {
        f.set_cursor_position((cursor_x, cursor_row.y + 1));
    }
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
