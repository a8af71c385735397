//! Terminal output styling
//!
//! Plain text whenever NO_COLOR is set, stdout is not a terminal, or
//! `[ui] fancy = false`. Glyphs additionally need a UTF-8 locale.

use pods_common::UiSettings;
use std::env;
use std::io::IsTerminal;

#[derive(Debug, Clone, Copy, Default)]
pub struct Style {
    pub color: bool,
    pub emoji: bool,
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Heading,
    Good,
    Caution,
    Failure,
}

impl Tone {
    fn ansi(self) -> &'static str {
        match self {
            Tone::Heading => "\x1b[1;36m",
            Tone::Good => "\x1b[1;32m",
            Tone::Caution => "\x1b[1;33m",
            Tone::Failure => "\x1b[1;31m",
        }
    }

    fn glyph(self) -> char {
        match self {
            Tone::Heading => '⚙',
            Tone::Good => '✅',
            Tone::Caution => '⚠',
            Tone::Failure => '✖',
        }
    }
}

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

pub fn detect_style(ui: &UiSettings) -> Style {
    let glyphs = ui.fancy && utf8_locale();
    let color = ui.fancy && env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal();
    Style {
        color,
        emoji: glyphs,
    }
}

fn utf8_locale() -> bool {
    ["LC_ALL", "LC_CTYPE", "LANG"]
        .iter()
        .find_map(|key| env::var(key).ok())
        .map(|val| {
            let val = val.to_ascii_uppercase();
            val.contains("UTF-8") || val.contains("UTF8")
        })
        .unwrap_or(false)
}

fn paint(style: &Style, tone: Tone, text: &str) -> String {
    let glyph = if style.emoji {
        format!("{} ", tone.glyph())
    } else {
        String::new()
    };
    if style.color {
        format!("{glyph}{}{text}{RESET}", tone.ansi())
    } else {
        format!("{glyph}{text}")
    }
}

pub fn head(style: &Style, title: &str) -> String {
    paint(style, Tone::Heading, title)
}

pub fn ok(style: &Style, text: &str) -> String {
    paint(style, Tone::Good, text)
}

pub fn warn(style: &Style, text: &str) -> String {
    paint(style, Tone::Caution, text)
}

pub fn err(style: &Style, text: &str) -> String {
    paint(style, Tone::Failure, text)
}

/// Indented list item for service names and chain entries
pub fn bullet(style: &Style, text: &str) -> String {
    let mark = if style.emoji { '•' } else { '-' };
    format!("  {mark} {text}")
}

pub fn kv(style: &Style, key: &str, value: &str) -> String {
    if style.color {
        format!("{BOLD}{key}{RESET}: {value}")
    } else {
        format!("{key}: {value}")
    }
}
