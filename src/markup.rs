//! Markup-to-[`Text`] conversion.
//!
//! Two dialects are understood. The bracketed-tag dialect (`<red>x</red>`) is
//! chosen whenever the input contains `<`; everything else goes through the
//! legacy ampersand dialect (`&cx`). Hosts with their own renderer implement
//! [`MarkupFormatter`] and hand it to the service instead.

use crate::text::{NamedColor, Style, Text};

pub trait MarkupFormatter: Send + Sync {
    fn parse(&self, input: &str) -> Text;
}

/// Default formatter handling both marker dialects.
#[derive(Clone, Copy, Debug, Default)]
pub struct DialectFormatter;

impl MarkupFormatter for DialectFormatter {
    fn parse(&self, input: &str) -> Text {
        if input.contains('<') {
            parse_tags(input)
        } else {
            parse_legacy(input)
        }
    }
}

const LEGACY_MARKER: char = '&';

struct RunBuilder {
    root: Text,
    buffer: String,
}

impl RunBuilder {
    fn new() -> Self {
        Self {
            root: Text::empty(),
            buffer: String::new(),
        }
    }

    fn flush(&mut self, style: Style) {
        if self.buffer.is_empty() {
            return;
        }
        let content = std::mem::take(&mut self.buffer);
        self.root.children.push(Text::styled(content, style));
    }

    fn finish(mut self, style: Style) -> Text {
        self.flush(style);
        self.root
    }
}

/// Legacy `&`-code dialect. Colors reset decorations, `&r` resets everything,
/// unknown codes are kept literally.
pub fn parse_legacy(input: &str) -> Text {
    let mut runs = RunBuilder::new();
    let mut style = Style::default();
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != LEGACY_MARKER {
            runs.buffer.push(ch);
            continue;
        }
        let Some(&code) = chars.peek() else {
            runs.buffer.push(ch);
            continue;
        };
        let next = apply_legacy_code(style, code);
        match next {
            Some(updated) => {
                chars.next();
                runs.flush(style);
                style = updated;
            }
            None => runs.buffer.push(ch),
        }
    }
    runs.finish(style)
}

fn apply_legacy_code(current: Style, code: char) -> Option<Style> {
    if let Some(color) = NamedColor::from_code(code) {
        return Some(Style::color(color));
    }
    let mut style = current;
    match code.to_ascii_lowercase() {
        'k' => style.obfuscated = true,
        'l' => style.bold = true,
        'm' => style.strikethrough = true,
        'n' => style.underlined = true,
        'o' => style.italic = true,
        'r' => style = Style::default(),
        _ => return None,
    }
    Some(style)
}

enum Tag {
    Open(String, Style),
    Close(String),
    Reset,
    Newline,
}

fn classify_tag(body: &str) -> Option<Tag> {
    let body = body.trim();
    if let Some(name) = body.strip_prefix('/') {
        let name = name.trim().to_ascii_lowercase();
        return (!name.is_empty()).then_some(Tag::Close(name));
    }
    let name = body.to_ascii_lowercase();
    let mut style = Style::default();
    match name.as_str() {
        "reset" => return Some(Tag::Reset),
        "newline" | "br" => return Some(Tag::Newline),
        "bold" | "b" => style.bold = true,
        "italic" | "i" | "em" => style.italic = true,
        "underlined" | "u" => style.underlined = true,
        "strikethrough" | "st" => style.strikethrough = true,
        "obfuscated" | "obf" => style.obfuscated = true,
        other => style.color = Some(NamedColor::from_name(other)?),
    }
    Some(Tag::Open(name, style))
}

/// Bracketed-tag dialect. Unknown tags and stray brackets stay literal.
pub fn parse_tags(input: &str) -> Text {
    let mut runs = RunBuilder::new();
    let mut stack: Vec<(String, Style)> = Vec::new();
    let mut rest = input;

    while let Some(open) = rest.find('<') {
        runs.buffer.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('>') else {
            runs.buffer.push('<');
            rest = after;
            continue;
        };
        let body = &after[..close];
        let current = effective_style(&stack);
        match classify_tag(body) {
            Some(Tag::Open(name, style)) => {
                runs.flush(current);
                stack.push((name, style));
            }
            Some(Tag::Close(name)) if stack.iter().any(|(open, _)| *open == name) => {
                runs.flush(current);
                while let Some((open, _)) = stack.pop() {
                    if open == name {
                        break;
                    }
                }
            }
            Some(Tag::Reset) => {
                runs.flush(current);
                stack.clear();
            }
            Some(Tag::Newline) => runs.buffer.push('\n'),
            Some(Tag::Close(_)) | None => {
                runs.buffer.push('<');
                runs.buffer.push_str(body);
                runs.buffer.push('>');
            }
        }
        rest = &after[close + 1..];
    }
    runs.buffer.push_str(rest);
    runs.finish(effective_style(&stack))
}

fn effective_style(stack: &[(String, Style)]) -> Style {
    stack
        .iter()
        .fold(Style::default(), |parent, (_, style)| style.inherit(&parent))
}
