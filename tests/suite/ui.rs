//! Rendering tests against an in-memory terminal backend

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use tempfile::tempdir;

use glow::app::App;
use glow::ui;

use crate::common::test_config;

/// Render one frame and flatten the buffer to a string.
fn render_to_string(app: &mut App, width: u16, height: u16) -> String {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).expect("create terminal");

    terminal
        .draw(|frame| ui::draw(frame, app))
        .expect("draw frame");

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
fn empty_selection_shows_placeholder_and_no_remove_hints() {
    let dir = tempdir().expect("tempdir");
    let mut app = App::new(test_config("http://127.0.0.1:9", dir.path()));

    let screen = render_to_string(&mut app, 160, 48);

    assert!(screen.contains("No products selected yet."));
    assert!(!screen.contains("clear"));
    assert!(!screen.contains("remove"));
}

#[test]
fn non_empty_selection_shows_remove_and_clear_hints() {
    let dir = tempdir().expect("tempdir");
    let mut app = App::new(test_config("http://127.0.0.1:9", dir.path()));
    app.toggle_product(1);

    let screen = render_to_string(&mut app, 160, 48);

    assert!(!screen.contains("No products selected yet."));
    assert!(screen.contains("remove"));
    assert!(screen.contains("clear"));
    assert!(screen.contains("Selected (1)"));
}
