use std::io;

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Wrap;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::CategoryFilter;
use crate::domain::models::Event;
use crate::domain::models::Role;
use crate::domain::services::events::EventsService;
use crate::domain::services::list_offset;
use crate::domain::services::AppState;
use crate::domain::services::ChatLine;
use crate::domain::services::ConversationEngine;
use crate::domain::services::Focus;
use crate::domain::services::ProductGridView;
use crate::domain::services::Renderer;
use crate::domain::services::SelectedListView;
use crate::domain::services::INFO_AFFORDANCE_WIDTH;
use crate::infrastructure::storage::StorageManager;

pub fn help_text() -> String {
    let text = r#"
KEYS:
- Tab: Move focus between categories, products, selected items and chat.
- Up/Down: Move the cursor, or scroll the chat.
- Enter: Pick the category, toggle the product, or remove the selected item.
- d: Show the description of the product under the cursor.
- x/Delete: Remove the selected item under the cursor.
- c: Clear all selected products.
- g: Generate a routine for the selected products.
- i: Ask a follow-up question. Enter submits, Esc leaves the input.
- Ctrl+U/Ctrl+D: Scroll the chat a page up or down.
- Ctrl+C: Quit.

MOUSE:
- Click a product to toggle it, or its (i) to read the description.
- Click [x] on a selected item to remove it.
- Click outside the description box to close it.
    "#;

    return text.trim().to_string();
}

fn pane<'a>(title: &'a str, focused: bool) -> Block<'a> {
    let mut border_style = Style::default();
    if focused {
        border_style = border_style.fg(Color::Yellow);
    }

    return Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .title(title);
}

fn cursor_style(active: bool, focused: bool) -> Style {
    if !active {
        return Style::default();
    }
    if focused {
        return Style::default().add_modifier(Modifier::REVERSED);
    }

    return Style::default().add_modifier(Modifier::BOLD);
}

/// Left part truncated and padded so the right part sits on the edge.
fn row_with_affordance(left: &str, right: &str, width: u16) -> (String, String) {
    let left_width = usize::from(width.saturating_sub(INFO_AFFORDANCE_WIDTH));
    let mut left = left.chars().take(left_width).collect::<String>();
    let padding = left_width.saturating_sub(left.chars().count());
    left.push_str(&" ".repeat(padding));

    return (left, format!("{right:^width$}", width = usize::from(INFO_AFFORDANCE_WIDTH)));
}

fn draw_categories(frame: &mut Frame, rect: Rect, app_state: &mut AppState) {
    let focused = app_state.focus == Focus::Categories;
    let block = pane("Categories", focused);
    let inner = block.inner(rect);
    app_state.rects.categories = inner;

    let offset = list_offset(app_state.category_cursor, inner.height);
    let lines = app_state
        .categories
        .iter()
        .enumerate()
        .skip(offset)
        .map(|(idx, category)| {
            let mut marker = "  ";
            if app_state.filter == CategoryFilter::Category(category.to_string()) {
                marker = "> ";
            }
            return Line::from(Span::styled(
                format!("{marker}{category}"),
                cursor_style(idx == app_state.category_cursor, focused),
            ));
        })
        .collect::<Vec<Line>>();

    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

fn draw_products(frame: &mut Frame, rect: Rect, app_state: &mut AppState) {
    let focused = app_state.focus == Focus::Products;
    let title = match &app_state.filter {
        CategoryFilter::None => "Products".to_string(),
        filter => format!("Products: {filter}"),
    };
    let block = pane(&title, focused);
    let inner = block.inner(rect);
    app_state.rects.products = inner;

    let view = Renderer::product_grid(
        &app_state.visible,
        &app_state.filter,
        app_state.selection.selection(),
    );

    let cards = match view {
        ProductGridView::Placeholder(text) => {
            frame.render_widget(
                Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray)))
                    .block(block)
                    .wrap(Wrap { trim: true }),
                rect,
            );
            return;
        }
        ProductGridView::Cards(cards) => cards,
    };

    let offset = list_offset(app_state.product_cursor, inner.height);
    let lines = cards
        .iter()
        .enumerate()
        .skip(offset)
        .map(|(idx, card)| {
            let mut check = "[ ]";
            let mut style = cursor_style(idx == app_state.product_cursor, focused);
            if card.selected {
                check = "[x]";
                style = style.fg(Color::Green);
            }

            let (left, right) = row_with_affordance(
                &format!("{check} {} - {}", card.name, card.brand),
                "(i)",
                inner.width,
            );
            return Line::from(vec![
                Span::styled(left, style),
                Span::styled(right, Style::default().fg(Color::Cyan)),
            ]);
        })
        .collect::<Vec<Line>>();

    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

fn draw_selected(frame: &mut Frame, rect: Rect, app_state: &mut AppState) {
    let focused = app_state.focus == Focus::Selected;
    let title = format!("Selected ({})", app_state.selection.selection().len());
    let block = pane(&title, focused);
    let inner = block.inner(rect);
    app_state.rects.selected = inner;

    let items = match Renderer::selected_list(app_state.selection.selection()) {
        SelectedListView::Placeholder(text) => {
            frame.render_widget(
                Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray)))
                    .block(block),
                rect,
            );
            return;
        }
        SelectedListView::Items(items) => items,
    };

    let offset = list_offset(app_state.selected_cursor, inner.height);
    let lines = items
        .iter()
        .enumerate()
        .skip(offset)
        .map(|(idx, item)| {
            let (left, right) = row_with_affordance(
                &format!("{} - {}", item.name, item.brand),
                "[x]",
                inner.width,
            );
            return Line::from(vec![
                Span::styled(left, cursor_style(idx == app_state.selected_cursor, focused)),
                Span::styled(right, Style::default().fg(Color::Red)),
            ]);
        })
        .collect::<Vec<Line>>();

    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

fn chat_line(line: ChatLine) -> Line<'static> {
    match line {
        ChatLine::Author(Role::Assistant) => {
            return Line::from(Span::styled(
                "Assistant",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        ChatLine::Author(role) => {
            let name = match role {
                Role::User => "You",
                _ => "System",
            };
            return Line::from(Span::styled(
                name,
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            ));
        }
        ChatLine::Text(text) => return Line::from(text),
        ChatLine::Blank => return Line::from(""),
        ChatLine::Pending => {
            return Line::from(Span::styled(
                "Thinking...",
                Style::default().add_modifier(Modifier::ITALIC),
            ));
        }
        ChatLine::Notice(text) => {
            return Line::from(Span::styled(text, Style::default().fg(Color::Red)));
        }
        ChatLine::Placeholder(text) => {
            return Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)));
        }
    }
}

fn draw_chat(frame: &mut Frame, rect: Rect, input: Rect, app_state: &mut AppState) {
    let block = pane("Routine", false);
    let inner = block.inner(rect);
    app_state.rects.chat = inner;
    app_state.rects.input = input;

    let lines = Renderer::chat(
        app_state.conversation.transcript(),
        app_state.conversation.is_pending(),
        app_state.notice.as_deref(),
        usize::from(inner.width),
    )
    .into_iter()
    .map(chat_line)
    .collect::<Vec<Line>>();

    let lines_len = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    app_state.scroll.set_state(lines_len, inner.height);

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .scroll((app_state.scroll.position, 0)),
        rect,
    );
    frame.render_widget(app_state.textarea.widget(), input);
}

fn centered_rect(percent_x: u16, percent_y: u16, rect: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(rect);

    return Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1];
}

fn draw_description(frame: &mut Frame, app_state: &mut AppState) {
    let Some(product) = app_state.description.current() else {
        app_state.rects.overlay = Rect::default();
        app_state.rects.overlay_content = Rect::default();
        return;
    };

    let overlay = frame.size();
    let content = centered_rect(60, 50, overlay);

    let mut lines = vec![
        Line::from(Span::styled(
            product.brand.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            product.category.to_string(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];
    lines.push(Line::from(product.description.to_string()));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Esc or click outside to close",
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Cyan))
        .title(product.name.to_string());

    frame.render_widget(Clear, content);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        content,
    );

    app_state.rects.overlay = overlay;
    app_state.rects.overlay_content = content;
}

fn draw(frame: &mut Frame, app_state: &mut AppState) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Min(1), Constraint::Length(1)])
        .split(frame.size());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage(20),
            Constraint::Percentage(40),
            Constraint::Percentage(40),
        ])
        .split(layout[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Percentage(30),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(columns[2]);

    draw_categories(frame, columns[0], app_state);
    draw_products(frame, columns[1], app_state);
    draw_selected(frame, right[0], app_state);
    draw_chat(frame, right[1], right[2], app_state);

    frame.render_widget(
        Paragraph::new(Span::styled(
            "Tab focus | Enter pick | d details | c clear | g generate | i ask | Ctrl+C quit",
            Style::default().fg(Color::DarkGray),
        )),
        layout[1],
    );

    draw_description(frame, app_state);
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState<'_>,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut events = EventsService::new(rx);
    app_state.start(&tx)?;

    loop {
        if app_state.needs_render {
            terminal.draw(|frame| {
                draw(frame, app_state);
            })?;
            app_state.needs_render = false;
        }

        let event = events.next().await?;
        if app_state.handle_event(event, &tx)? {
            break;
        }
    }

    return Ok(());
}

pub fn destruct_terminal_for_panic() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
    let _ = crossterm::execute!(io::stdout(), cursor::Show);
}

pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    let mut app_state = AppState::new(
        StorageManager::get(&Config::get(ConfigKey::StateDir)),
        ConversationEngine::with_topics(&Config::get(ConfigKey::AllowedTopics)),
    );

    start_loop(&mut terminal, &mut app_state, tx, rx).await?;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    return Ok(());
}
