//! Terminal markdown rendering for replies.
//!
//! Replies are plain text from the endpoint but often carry light markdown
//! (lists, bold); `termimad` renders it for the terminal.

use console::style;
use termimad::MadSkin;

use talentchat_types::chat::{Message, MessageRole};

pub struct ChatRenderer {
    skin: MadSkin,
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);
        Self { skin }
    }

    pub fn render(&self, markdown: &str) -> String {
        self.skin.term_text(markdown).to_string()
    }

    /// Print an assistant reply, indented under the prompt.
    pub fn print_reply(&self, text: &str) {
        println!();
        for line in self.render(text).trim_end().lines() {
            println!("  {line}");
        }
        println!();
    }

    /// Print the canned error reply, styled as a warning.
    pub fn print_error_reply(&self, text: &str) {
        println!();
        println!("  {} {}", style("!").yellow().bold(), style(text).yellow());
        println!();
    }

    /// Print the whole conversation, one labelled entry per message.
    pub fn print_history(&self, messages: &[Message], visitor: &str) {
        println!();
        for message in messages {
            let label = match message.role {
                MessageRole::User => style(visitor.to_string()).green().bold(),
                MessageRole::Assistant => style("Candidate".to_string()).cyan().bold(),
            };
            let preview = preview(&message.text, 100);
            println!("  {label} {preview}");
        }
        println!();
    }
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// First `max` characters of `text` on one line, with an ellipsis if cut.
fn preview(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > max {
        let cut: String = flat.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_keeps_short_text() {
        assert_eq!(preview("hola", 10), "hola");
    }

    #[test]
    fn preview_cuts_on_char_boundaries() {
        let text = "¡Hola Ana! Bienvenido(a) a nuestro chat.";
        let out = preview(text, 10);
        assert_eq!(out, "¡Hola A...");
    }

    #[test]
    fn preview_flattens_newlines() {
        assert_eq!(preview("a\nb", 10), "a b");
    }

    #[test]
    fn render_plain_text_keeps_words() {
        let renderer = ChatRenderer::new();
        let out = renderer.render("5 years of **Rust**");
        assert!(out.contains("5 years of"));
        assert!(out.contains("Rust"));
    }
}
