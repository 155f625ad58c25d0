use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Clear, Padding, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Wrap,
    },
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, InputMode, NoticeKind, PaneFocus};
use crate::markdown::render_markdown;
use crate::theme::{colors, spinner_frame, styles};
use crate::transcript::Turn;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
    // Clear with background color
    let bg_block = Block::default().style(Style::default().bg(colors::BG_DARK));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(1),    // Panes
            Constraint::Length(5), // Input
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30), // Catalog
            Constraint::Percentage(24), // Selection
            Constraint::Min(1),         // Chat
        ])
        .split(chunks[0]);

    draw_products(frame, app, panes[0]);
    draw_selected(frame, app, panes[1]);
    draw_chat(frame, app, panes[2]);
    draw_input(frame, app, chunks[1]);
    draw_status_bar(frame, app, chunks[2]);

    // Draw command palette if in command mode
    if app.input_mode() == InputMode::Command {
        draw_command_palette(frame, app);
    }
}

fn pane_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(colors::PRIMARY)
    } else {
        Style::default().fg(colors::TEXT_MUTED)
    }
}

fn draw_products(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus() == PaneFocus::Products;
    let category = app.filter().category().unwrap_or("all").to_string();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(pane_border(focused))
        .padding(Padding::horizontal(1))
        .title(Line::from(vec![Span::styled(
            format!(" Products · {category} "),
            Style::default()
                .fg(colors::TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )]))
        .title_bottom(
            Line::from(vec![
                Span::styled("space", styles::key_highlight()),
                Span::styled(" toggle  ", styles::key_hint()),
                Span::styled("c", styles::key_highlight()),
                Span::styled(" category ", styles::key_hint()),
            ])
            .alignment(Alignment::Right),
        );

    if let Some(err) = app.catalog_error() {
        let message = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "Could not load the product catalog.",
                Style::default().fg(colors::RED),
            )),
            Line::from(""),
            Line::from(Span::styled(
                err.to_string(),
                Style::default().fg(colors::TEXT_MUTED),
            )),
        ])
        .wrap(Wrap { trim: false })
        .block(block);
        frame.render_widget(message, area);
        return;
    }

    let inner = block.inner(area);
    let visible = app.visible_products();

    if visible.is_empty() {
        let message = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No products match the current filter.",
                Style::default().fg(colors::TEXT_MUTED),
            )),
        ])
        .wrap(Wrap { trim: false })
        .block(block);
        frame.render_widget(message, area);
        return;
    }

    // Reserve the bottom of the pane for the focused product's description.
    let detail_height = inner.height.min(4);
    let list_height = inner.height.saturating_sub(detail_height) as usize;

    let cursor = app.product_cursor().min(visible.len().saturating_sub(1));
    let first = cursor.saturating_sub(list_height.saturating_sub(1));

    let mut lines: Vec<Line> = Vec::new();
    for (index, product) in visible.iter().enumerate().skip(first).take(list_height) {
        let selected = app.selection().contains(product.id);
        let marker = if selected { "✓ " } else { "  " };

        let row_style = if focused && index == cursor {
            styles::cursor_row()
        } else {
            Style::default()
        };

        lines.push(Line::from(vec![
            Span::styled(marker, styles::selected_marker()),
            Span::styled(
                product.name.clone(),
                row_style.fg(colors::TEXT_PRIMARY),
            ),
            Span::styled(
                format!(" · {}", product.brand),
                row_style.fg(colors::TEXT_MUTED),
            ),
        ]));
    }

    // Detail area for the product under the cursor.
    if let Some(product) = visible.get(cursor) {
        lines.push(Line::from(Span::styled(
            "─".repeat(inner.width as usize),
            Style::default().fg(colors::TEXT_MUTED),
        )));
        lines.push(Line::from(vec![
            Span::styled(
                product.category.clone(),
                Style::default().fg(colors::PEACH),
            ),
            Span::styled(
                format!("  {}", product.description),
                Style::default().fg(colors::TEXT_SECONDARY),
            ),
        ]));
    }

    let list = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
    frame.render_widget(list, area);
}

fn draw_selected(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus() == PaneFocus::Selected;
    let count = app.selection().len();

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(pane_border(focused))
        .padding(Padding::horizontal(1))
        .title(Line::from(vec![Span::styled(
            format!(" Selected ({count}) "),
            Style::default()
                .fg(colors::TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )]));

    // Remove/clear affordances only make sense once something is selected.
    if !app.selection().is_empty() {
        block = block.title_bottom(
            Line::from(vec![
                Span::styled("d", styles::key_highlight()),
                Span::styled(" remove  ", styles::key_hint()),
                Span::styled("D", styles::key_highlight()),
                Span::styled(" clear  ", styles::key_hint()),
                Span::styled("r", styles::key_highlight()),
                Span::styled(" routine ", styles::key_hint()),
            ])
            .alignment(Alignment::Right),
        );
    }

    if app.selection().is_empty() {
        let message = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No products selected yet.",
                Style::default().fg(colors::TEXT_MUTED),
            )),
        ])
        .wrap(Wrap { trim: false })
        .block(block);
        frame.render_widget(message, area);
        return;
    }

    let cursor = app.selected_cursor().min(count.saturating_sub(1));
    let mut lines: Vec<Line> = Vec::new();

    for (index, product) in app.selection().all().iter().enumerate() {
        let row_style = if focused && index == cursor {
            styles::cursor_row()
        } else {
            Style::default()
        };

        lines.push(Line::from(vec![
            Span::styled("• ", Style::default().fg(colors::PRIMARY)),
            Span::styled(
                product.name.clone(),
                row_style.fg(colors::TEXT_PRIMARY),
            ),
            Span::styled(
                format!(" · {}", product.brand),
                row_style.fg(colors::TEXT_MUTED),
            ),
        ]));
    }

    let list = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
    frame.render_widget(list, area);
}

fn draw_chat(frame: &mut Frame, app: &mut App, area: Rect) {
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(colors::TEXT_MUTED))
        .padding(Padding::horizontal(1))
        .title(Line::from(vec![Span::styled(
            " Routine ",
            Style::default()
                .fg(colors::TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )]));

    // Show welcome screen while the conversation is untouched
    if app.transcript().visible_count() == 0 && !app.is_pending() && app.notice().is_none() {
        app.update_scroll_max(0);
        let welcome = create_welcome_screen();
        frame.render_widget(welcome.block(chat_block), area);
        return;
    }

    // Build chat content
    let mut lines: Vec<Line> = Vec::new();
    let mut turn_count = 0;

    // Helper to render a single turn
    fn render_turn(turn: &Turn, lines: &mut Vec<Line>, turn_count: &mut usize) {
        // Add spacing between turns (except first)
        if *turn_count > 0 {
            lines.push(Line::from(""));
            lines.push(Line::from(""));
        }
        *turn_count += 1;

        let (icon, name, name_style) = match turn {
            Turn::System(_) => (
                "●",
                "System",
                Style::default()
                    .fg(colors::TEXT_MUTED)
                    .add_modifier(Modifier::BOLD),
            ),
            Turn::User(_) => ("▶", "You", styles::user_name()),
            Turn::Assistant(_) => ("◆", "Glow", styles::assistant_name()),
        };

        let header_line = Line::from(vec![
            Span::styled(format!(" {icon} "), name_style),
            Span::styled(name, name_style),
        ]);
        lines.push(header_line);
        lines.push(Line::from("")); // Space after header

        let content_style = match turn {
            Turn::System(_) => Style::default().fg(colors::TEXT_MUTED),
            Turn::User(_) => Style::default().fg(colors::TEXT_PRIMARY),
            Turn::Assistant(_) => Style::default().fg(colors::TEXT_SECONDARY),
        };

        let rendered = render_markdown(turn.content(), content_style);
        lines.extend(rendered);
    }

    for turn in app.transcript().visible() {
        render_turn(turn, &mut lines, &mut turn_count);
    }

    // Animated placeholder while a completion is in flight
    if app.is_pending() {
        if turn_count > 0 {
            lines.push(Line::from(""));
            lines.push(Line::from(""));
        }

        let header_line = Line::from(vec![
            Span::styled(" ◆ ", styles::assistant_name()),
            Span::styled("Glow", styles::assistant_name()),
        ]);
        lines.push(header_line);
        lines.push(Line::from(""));

        let spinner = spinner_frame(app.tick_count());
        lines.push(Line::from(vec![
            Span::raw("    "),
            Span::styled(spinner, Style::default().fg(colors::PRIMARY)),
            Span::styled(
                " Generating response...",
                Style::default().fg(colors::TEXT_MUTED),
            ),
        ]));
    }

    // Inline notice at the conversation surface
    if let Some(notice) = app.notice() {
        if turn_count > 0 || app.is_pending() {
            lines.push(Line::from(""));
        }
        let (prefix, style) = match notice.kind {
            NoticeKind::Info => ("System: ", Style::default().fg(colors::YELLOW)),
            NoticeKind::Error => ("Error: ", Style::default().fg(colors::RED)),
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {prefix}"), style.add_modifier(Modifier::BOLD)),
            Span::styled(notice.text.clone(), style),
        ]));
    }

    // Calculate content height and visible height for scrolling
    let inner = chat_block.inner(area);
    let total_lines = wrapped_line_count(&lines, inner.width);
    let visible_height = inner.height;

    let max_scroll = total_lines.saturating_sub(visible_height);
    app.update_scroll_max(max_scroll);
    let scroll_offset = app.scroll_offset_from_top();

    let chat = Paragraph::new(lines)
        .block(chat_block)
        .wrap(Wrap { trim: false })
        .scroll((scroll_offset, 0));

    frame.render_widget(chat, area);

    // Render scrollbar
    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("↑"))
        .end_symbol(Some("↓"))
        .track_symbol(Some("│"))
        .thumb_symbol("█")
        .style(Style::default().fg(colors::TEXT_MUTED));

    let mut scrollbar_state =
        ScrollbarState::new(total_lines as usize).position(scroll_offset as usize);

    frame.render_stateful_widget(
        scrollbar,
        area.inner(Margin {
            vertical: 1,
            horizontal: 0,
        }),
        &mut scrollbar_state,
    );
}

fn wrapped_line_count(lines: &[Line], width: u16) -> u16 {
    let width = width.max(1) as usize;
    let mut total: u16 = 0;

    for line in lines {
        let line_width = line.width();
        let rows = if line_width == 0 {
            1
        } else {
            ((line_width - 1) / width) + 1
        };
        total = total.saturating_add(rows as u16);
    }

    total
}

pub(crate) fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let mode = app.input_mode();
    let command_line = if mode == InputMode::Command {
        app.command_text()
    } else {
        None
    };

    let (mode_text, mode_style, border_style, prompt_char) = match mode {
        InputMode::Browse => (
            " BROWSE ",
            styles::mode_browse(),
            Style::default().fg(colors::TEXT_MUTED),
            "│",
        ),
        InputMode::Insert => (
            " ASK ",
            styles::mode_insert(),
            Style::default().fg(colors::GREEN),
            "❯",
        ),
        InputMode::Command => (
            " COMMAND ",
            styles::mode_command(),
            Style::default().fg(colors::YELLOW),
            ":",
        ),
    };

    // Build input content with prompt
    let input_content = match mode {
        InputMode::Insert | InputMode::Browse => vec![
            Span::styled(
                format!(" {prompt_char} "),
                Style::default().fg(colors::PRIMARY),
            ),
            Span::styled(app.draft_text(), Style::default().fg(colors::TEXT_PRIMARY)),
        ],
        InputMode::Command => {
            let Some(command_line) = command_line else {
                return;
            };
            vec![
                Span::styled(" : ", Style::default().fg(colors::YELLOW)),
                Span::styled(command_line, Style::default().fg(colors::TEXT_PRIMARY)),
            ]
        }
    };

    // Key hints based on mode
    let hints = match mode {
        InputMode::Browse => vec![
            Span::styled("i", styles::key_highlight()),
            Span::styled(" ask  ", styles::key_hint()),
            Span::styled("r", styles::key_highlight()),
            Span::styled(" routine  ", styles::key_hint()),
            Span::styled(":", styles::key_highlight()),
            Span::styled(" command  ", styles::key_hint()),
            Span::styled("q", styles::key_highlight()),
            Span::styled(" quit ", styles::key_hint()),
        ],
        InputMode::Insert => vec![
            Span::styled("Enter", styles::key_highlight()),
            Span::styled(" send  ", styles::key_hint()),
            Span::styled("Esc", styles::key_highlight()),
            Span::styled(" browse ", styles::key_hint()),
        ],
        InputMode::Command => vec![
            Span::styled("Enter", styles::key_highlight()),
            Span::styled(" execute  ", styles::key_hint()),
            Span::styled("Esc", styles::key_highlight()),
            Span::styled(" cancel ", styles::key_hint()),
        ],
    };

    let input = Paragraph::new(Line::from(input_content)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(Line::from(vec![Span::styled(mode_text, mode_style)]))
            .title_bottom(Line::from(hints).alignment(Alignment::Right))
            .padding(Padding::vertical(1)),
    );

    frame.render_widget(input, area);

    // Show cursor in insert mode
    if mode == InputMode::Insert {
        // Calculate cursor position using display width (handles Unicode properly)
        let text_before_cursor: String =
            app.draft_text().chars().take(app.draft_cursor()).collect();
        let cursor_x = area.x + 4 + text_before_cursor.width() as u16;
        let cursor_y = area.y + 2;
        frame.set_cursor_position((cursor_x, cursor_y));
    } else if mode == InputMode::Command {
        let Some(command_line) = command_line else {
            return;
        };
        let cursor_x = area.x + 4 + command_line.width() as u16;
        let cursor_y = area.y + 2;
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

pub(crate) fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (status_text, status_style) = if let Some(msg) = app.status_message() {
        (msg.to_string(), Style::default().fg(colors::YELLOW))
    } else if app.is_pending() {
        let spinner = spinner_frame(app.tick_count());
        (
            format!("{spinner} Generating response..."),
            Style::default().fg(colors::PRIMARY),
        )
    } else {
        (
            format!(
                "● {} products │ {} selected",
                app.catalog().len(),
                app.selection().len()
            ),
            Style::default().fg(colors::GREEN),
        )
    };

    // Active filter indicator on the right side
    let category = app.filter().category().unwrap_or("all");
    let filter_str = if app.filter().search().is_empty() {
        category.to_string()
    } else {
        format!("{category} · \"{}\"", app.filter().search())
    };

    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(status_text, status_style),
    ]));

    let filter_width = filter_str.width() as u16 + 2;
    let status_area = Rect {
        x: area.x,
        y: area.y,
        width: area.width.saturating_sub(filter_width),
        height: area.height,
    };
    let filter_area = Rect {
        x: area.x + area.width.saturating_sub(filter_width),
        y: area.y,
        width: filter_width,
        height: area.height,
    };

    frame.render_widget(status, status_area);

    let filter_widget = Paragraph::new(Line::from(vec![
        Span::styled(filter_str, Style::default().fg(colors::PEACH)),
        Span::raw(" "),
    ]))
    .alignment(Alignment::Right);

    frame.render_widget(filter_widget, filter_area);
}

fn draw_command_palette(frame: &mut Frame, _app: &App) {
    let area = frame.area();

    // Center the palette
    let palette_width = 52.min(area.width.saturating_sub(4));
    let palette_height = 9;

    let palette_area = Rect {
        x: (area.width - palette_width) / 2,
        y: area.height / 3,
        width: palette_width,
        height: palette_height,
    };

    // Clear background
    frame.render_widget(Clear, palette_area);

    let commands = vec![
        ("q, quit", "Exit the application"),
        ("clear", "Reset the conversation"),
        ("category <name|all>", "Filter by category"),
        ("search <keyword>", "Search products"),
        ("routine", "Generate a routine"),
    ];

    let mut lines: Vec<Line> = vec![Line::from("")];

    for (cmd, desc) in commands {
        lines.push(Line::from(vec![
            Span::styled(format!("  :{cmd}"), Style::default().fg(colors::PEACH)),
            Span::styled(format!("  {desc}"), Style::default().fg(colors::TEXT_MUTED)),
        ]));
    }

    let palette = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(colors::PRIMARY))
            .style(Style::default().bg(colors::BG_PANEL))
            .title(Line::from(vec![Span::styled(
                " Commands ",
                Style::default()
                    .fg(colors::TEXT_PRIMARY)
                    .add_modifier(Modifier::BOLD),
            )])),
    );

    frame.render_widget(palette, palette_area);
}

fn create_welcome_screen() -> Paragraph<'static> {
    let lines = vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            "  ╭─────────────────────────────────────╮",
            Style::default().fg(colors::PRIMARY_DIM),
        )]),
        Line::from(vec![
            Span::styled("  │", Style::default().fg(colors::PRIMARY_DIM)),
            Span::styled(
                "     ✨ Glow Routine Builder ✨        ",
                Style::default()
                    .fg(colors::PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("│", Style::default().fg(colors::PRIMARY_DIM)),
        ]),
        Line::from(vec![
            Span::styled("  │", Style::default().fg(colors::PRIMARY_DIM)),
            Span::styled(
                "     Pick products, get a routine      ",
                Style::default().fg(colors::TEXT_SECONDARY),
            ),
            Span::styled("│", Style::default().fg(colors::PRIMARY_DIM)),
        ]),
        Line::from(vec![Span::styled(
            "  ╰─────────────────────────────────────╯",
            Style::default().fg(colors::PRIMARY_DIM),
        )]),
        Line::from(""),
        Line::from(""),
        Line::from(vec![Span::styled(
            "  Quick Start:",
            Style::default()
                .fg(colors::TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "    Space",
                Style::default()
                    .fg(colors::GREEN)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "  Toggle the product under the cursor",
                Style::default().fg(colors::TEXT_SECONDARY),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                "    Tab",
                Style::default()
                    .fg(colors::GREEN)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "  Switch between catalog and selection",
                Style::default().fg(colors::TEXT_SECONDARY),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                "    r",
                Style::default()
                    .fg(colors::PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "  Generate a routine from your selection",
                Style::default().fg(colors::TEXT_SECONDARY),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                "    i",
                Style::default()
                    .fg(colors::YELLOW)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "  Ask a follow-up question",
                Style::default().fg(colors::TEXT_SECONDARY),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                "    :",
                Style::default()
                    .fg(colors::PEACH)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "  Open command palette",
                Style::default().fg(colors::TEXT_SECONDARY),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                "    q",
                Style::default()
                    .fg(colors::RED)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  Quit", Style::default().fg(colors::TEXT_SECONDARY)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Tip: ", Style::default().fg(colors::TEXT_MUTED)),
            Span::styled(":search serum", Style::default().fg(colors::PEACH)),
            Span::styled(
                " narrows the catalog by keyword",
                Style::default().fg(colors::TEXT_MUTED),
            ),
        ]),
    ];

    Paragraph::new(lines).alignment(Alignment::Left)
}
