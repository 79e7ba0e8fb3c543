//! Utility functions for the interactive UI

use ratatui::style::{Color, Style};

use crate::messages::MessageType;

/// Parse a `#rrggbb` string into a terminal color; anything else is white
pub fn hex_color(hex: &str) -> Color {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Color::White;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => Color::White,
    }
}

/// Get style for message type
pub fn get_message_style(message_type: MessageType) -> Style {
    match message_type {
        MessageType::Info => Style::default().fg(Color::Cyan),
        MessageType::Success => Style::default().fg(Color::Green),
        MessageType::Warning => Style::default().fg(Color::Yellow),
        MessageType::Error => Style::default().fg(Color::Red),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color("#476f95"), Color::Rgb(0x47, 0x6f, 0x95));
        assert_eq!(hex_color("fb6f92"), Color::Rgb(0xfb, 0x6f, 0x92));
        assert_eq!(hex_color("#zzzzzz"), Color::White);
        assert_eq!(hex_color("#fff"), Color::White);
    }
}
