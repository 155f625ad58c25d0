use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::app::{App, InputMode};

/// Handle terminal events
/// Returns true if the app should quit
pub async fn handle_events(app: &mut App) -> Result<bool> {
    // Poll for events with a timeout
    if event::poll(Duration::from_millis(100))?
        && let Event::Key(key) = event::read()?
    {
        // Only handle key press events (not release) - important for Windows
        if key.kind != KeyEventKind::Press {
            return Ok(app.should_quit());
        }

        // Handle Ctrl+C globally
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(true);
        }

        match app.input_mode() {
            InputMode::Browse => handle_browse_mode(app, key),
            InputMode::Insert => handle_insert_mode(app, key),
            InputMode::Command => handle_command_mode(app, key),
        }
    }

    Ok(app.should_quit())
}

fn handle_browse_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => {
            app.request_quit();
        }
        // Ask a follow-up question
        KeyCode::Char('i') => {
            app.enter_insert_mode();
            app.clear_status();
        }
        // Enter command mode
        KeyCode::Char(':') => {
            app.enter_command_mode();
        }
        // Switch between catalog and selection panes
        KeyCode::Tab => {
            app.toggle_focus();
        }
        // Cursor movement
        KeyCode::Char('j') | KeyCode::Down => {
            app.move_cursor_down();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.move_cursor_up();
        }
        // Toggle (catalog) or remove (selection) the focused product
        KeyCode::Enter | KeyCode::Char(' ') => {
            app.activate_cursor();
        }
        // Remove the focused entry from the selection
        KeyCode::Char('d') => {
            app.remove_selected_at_cursor();
        }
        // Clear the whole selection
        KeyCode::Char('D') => {
            app.clear_selection();
        }
        // Cycle through categories
        KeyCode::Char('c') => {
            app.cycle_category();
        }
        // Generate a routine from the selection
        KeyCode::Char('r') => {
            app.generate_routine();
        }
        // Chat scrolling
        KeyCode::PageUp => {
            app.scroll_up();
        }
        KeyCode::PageDown => {
            app.scroll_down();
        }
        KeyCode::Char('g') => {
            app.scroll_to_top();
        }
        KeyCode::Char('G') => {
            app.scroll_to_bottom();
        }
        _ => {}
    }
}

fn handle_insert_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // Exit insert mode
        KeyCode::Esc => {
            app.enter_browse_mode();
        }
        // Submit question
        KeyCode::Enter => {
            let Some(token) = app.insert_token() else {
                return;
            };
            app.insert_mode(token).submit();
        }
        _ => {
            let Some(token) = app.insert_token() else {
                return;
            };
            let mut insert = app.insert_mode(token);

            match key.code {
                // Delete character
                KeyCode::Backspace => {
                    insert.delete_char();
                }
                // Move cursor left
                KeyCode::Left => {
                    insert.move_cursor_left();
                }
                // Move cursor right
                KeyCode::Right => {
                    insert.move_cursor_right();
                }
                // Move to start
                KeyCode::Home => {
                    insert.reset_cursor();
                }
                // Move to end
                KeyCode::End => {
                    insert.move_cursor_end();
                }
                // Clear line
                KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    insert.clear_line();
                }
                // Insert character
                KeyCode::Char(c) => {
                    insert.enter_char(c);
                }
                _ => {}
            }
        }
    }
}

fn handle_command_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // Exit command mode
        KeyCode::Esc => {
            app.enter_browse_mode();
        }
        // Execute command
        KeyCode::Enter => {
            let Some(token) = app.command_token() else {
                return;
            };
            let command_mode = app.command_mode(token);
            let Some(command) = command_mode.take_command() else {
                return;
            };

            app.process_command(command);
        }
        _ => {
            let Some(token) = app.command_token() else {
                return;
            };
            let mut command_mode = app.command_mode(token);

            match key.code {
                // Delete character
                KeyCode::Backspace => {
                    command_mode.backspace();
                }
                // Insert character
                KeyCode::Char(c) => {
                    command_mode.push_char(c);
                }
                _ => {}
            }
        }
    }
}
