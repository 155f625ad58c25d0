//! Markdown to ratatui rendering
//!
//! Assistant replies arrive with lightweight markup (bold, links, lists, line
//! breaks). This renders them to styled lines for the chat pane.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use crate::theme::colors;

/// Render markdown content to ratatui Lines
pub fn render_markdown(content: &str, base_style: Style) -> Vec<Line<'static>> {
    let renderer = MarkdownRenderer::new(base_style);
    renderer.render(content)
}

struct MarkdownRenderer {
    base_style: Style,
    lines: Vec<Line<'static>>,
    current_spans: Vec<Span<'static>>,

    bold: bool,
    italic: bool,

    // List state
    list_depth: usize,
    list_index: Option<u64>,

    // Link destination captured at Start(Link), emitted at End(Link)
    link_dest: Option<String>,
}

impl MarkdownRenderer {
    fn new(base_style: Style) -> Self {
        Self {
            base_style,
            lines: Vec::new(),
            current_spans: Vec::new(),
            bold: false,
            italic: false,
            list_depth: 0,
            list_index: None,
            link_dest: None,
        }
    }

    fn render(mut self, content: &str) -> Vec<Line<'static>> {
        let parser = Parser::new_ext(content, Options::empty());

        for event in parser {
            self.handle_event(event);
        }

        self.flush_line();
        self.lines
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.handle_text(&text),
            Event::Code(code) => self.handle_inline_code(&code),
            Event::SoftBreak => self.current_spans.push(Span::raw(" ")),
            Event::HardBreak => self.flush_line(),
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Heading { .. } | Tag::Strong => {
                self.bold = true;
            }
            Tag::Emphasis => {
                self.italic = true;
            }
            Tag::List(start) => {
                self.flush_line();
                self.list_depth += 1;
                self.list_index = start;
            }
            Tag::Item => {
                let indent = "    ".repeat(self.list_depth.saturating_sub(1));
                let marker = if let Some(ref mut idx) = self.list_index {
                    let m = format!("{indent}{idx}. ");
                    *idx += 1;
                    m
                } else {
                    format!("{indent}• ")
                };
                self.current_spans
                    .push(Span::styled(marker, self.base_style));
            }
            Tag::Link { dest_url, .. } => {
                self.link_dest = Some(dest_url.to_string());
            }
            Tag::Paragraph => {
                if !self.lines.is_empty() && self.list_depth == 0 {
                    self.lines.push(Line::from(""));
                }
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.bold = false;
                self.flush_line();
                self.lines.push(Line::from(""));
            }
            TagEnd::Strong => {
                self.bold = false;
            }
            TagEnd::Emphasis => {
                self.italic = false;
            }
            TagEnd::List(_) => {
                self.list_depth = self.list_depth.saturating_sub(1);
                if self.list_depth == 0 {
                    self.list_index = None;
                }
            }
            TagEnd::Item | TagEnd::Paragraph => {
                self.flush_line();
            }
            TagEnd::Link => {
                if let Some(dest) = self.link_dest.take() {
                    self.current_spans.push(Span::styled(
                        format!(" <{dest}>"),
                        Style::default().fg(colors::PEACH),
                    ));
                }
            }
            _ => {}
        }
    }

    fn handle_text(&mut self, text: &str) {
        let style = self.current_style();
        self.current_spans
            .push(Span::styled(text.to_string(), style));
    }

    fn handle_inline_code(&mut self, code: &str) {
        let style = Style::default()
            .fg(colors::PEACH)
            .add_modifier(Modifier::BOLD);
        self.current_spans
            .push(Span::styled(format!("`{code}`"), style));
    }

    fn current_style(&self) -> Style {
        let mut style = self.base_style;

        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.italic {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.link_dest.is_some() {
            style = style.add_modifier(Modifier::UNDERLINED);
        }

        style
    }

    fn flush_line(&mut self) {
        if !self.current_spans.is_empty() {
            let mut spans = vec![Span::raw("    ")]; // Indent
            spans.append(&mut self.current_spans);
            self.lines.push(Line::from(spans));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered_text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn plain_text_renders_one_line() {
        let lines = render_markdown("Hello world", Style::default());
        assert_eq!(lines.len(), 1);
        assert!(rendered_text(&lines).contains("Hello world"));
    }

    #[test]
    fn ordered_list_keeps_numbering() {
        let lines = render_markdown("1. Cleanser\n2. Toner", Style::default());
        let text = rendered_text(&lines);
        assert!(text.contains("1. Cleanser"));
        assert!(text.contains("2. Toner"));
    }

    #[test]
    fn link_emits_destination() {
        let lines = render_markdown("see [docs](https://example.test)", Style::default());
        assert!(rendered_text(&lines).contains("<https://example.test>"));
    }

    #[test]
    fn hard_break_splits_lines() {
        let lines = render_markdown("first  \nsecond", Style::default());
        assert_eq!(lines.len(), 2);
    }
}
