//! Rich message model returned by every command.
//!
//! A [`Text`] is a tree: each node carries its own content and style plus
//! children that inherit the parent's style, hover text and click action
//! unless they set their own. Hosts walk [`Text::segments`] to render, or
//! serialize the tree as JSON.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

const COLOR_TABLE: [(char, &str, NamedColor); 16] = [
    ('0', "black", NamedColor::Black),
    ('1', "dark_blue", NamedColor::DarkBlue),
    ('2', "dark_green", NamedColor::DarkGreen),
    ('3', "dark_aqua", NamedColor::DarkAqua),
    ('4', "dark_red", NamedColor::DarkRed),
    ('5', "dark_purple", NamedColor::DarkPurple),
    ('6', "gold", NamedColor::Gold),
    ('7', "gray", NamedColor::Gray),
    ('8', "dark_gray", NamedColor::DarkGray),
    ('9', "blue", NamedColor::Blue),
    ('a', "green", NamedColor::Green),
    ('b', "aqua", NamedColor::Aqua),
    ('c', "red", NamedColor::Red),
    ('d', "light_purple", NamedColor::LightPurple),
    ('e', "yellow", NamedColor::Yellow),
    ('f', "white", NamedColor::White),
];

impl NamedColor {
    /// Legacy single-character code (`&a` -> green). Case-insensitive.
    pub fn from_code(code: char) -> Option<Self> {
        let code = code.to_ascii_lowercase();
        COLOR_TABLE
            .iter()
            .find(|(c, _, _)| *c == code)
            .map(|(_, _, color)| *color)
    }

    /// Tag name (`green`, `dark_gray`; `grey` spellings accepted).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase().replace("grey", "gray");
        COLOR_TABLE
            .iter()
            .find(|(_, n, _)| *n == name)
            .map(|(_, _, color)| *color)
    }

    pub fn as_str(&self) -> &'static str {
        COLOR_TABLE
            .iter()
            .find(|(_, _, color)| color == self)
            .map(|(_, name, _)| *name)
            .unwrap_or("white")
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Style {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<NamedColor>,
    #[serde(skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub underlined: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub obfuscated: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl Style {
    pub fn color(color: NamedColor) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }

    /// Effective style of a child: its own color if set, decorations accumulate.
    pub fn inherit(&self, parent: &Style) -> Style {
        Style {
            color: self.color.or(parent.color),
            bold: self.bold || parent.bold,
            italic: self.italic || parent.italic,
            underlined: self.underlined || parent.underlined,
            strikethrough: self.strikethrough || parent.strikethrough,
            obfuscated: self.obfuscated || parent.obfuscated,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum ClickAction {
    RunCommand(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Text {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(skip_serializing_if = "Style::is_plain")]
    pub style: Style,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover: Option<Box<Text>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click: Option<ClickAction>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Text>,
}

/// One flattened run of text with everything it inherited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment<'a> {
    pub content: &'a str,
    pub style: Style,
    pub hover: Option<&'a Text>,
    pub click: Option<&'a ClickAction>,
}

impl Text {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn colored(content: impl Into<String>, color: NamedColor) -> Self {
        Self::styled(content, Style::color(color))
    }

    pub fn styled(content: impl Into<String>, style: Style) -> Self {
        Self {
            content: content.into(),
            style,
            ..Self::default()
        }
    }

    pub fn newline() -> Self {
        Self::plain("\n")
    }

    pub fn append(mut self, child: Text) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_hover(mut self, hover: Text) -> Self {
        self.hover = Some(Box::new(hover));
        self
    }

    pub fn with_click(mut self, click: ClickAction) -> Self {
        self.click = Some(click);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.children.iter().all(Text::is_empty)
    }

    /// Concatenated content with all styling dropped.
    pub fn to_plain(&self) -> String {
        let mut out = String::new();
        self.write_plain(&mut out);
        out
    }

    fn write_plain(&self, out: &mut String) {
        out.push_str(&self.content);
        for child in &self.children {
            child.write_plain(out);
        }
    }

    /// Depth-first runs of non-empty content with inherited style and events.
    pub fn segments(&self) -> Vec<Segment<'_>> {
        let mut acc = Vec::new();
        self.collect_segments(&Style::default(), None, None, &mut acc);
        acc
    }

    fn collect_segments<'a>(
        &'a self,
        parent_style: &Style,
        parent_hover: Option<&'a Text>,
        parent_click: Option<&'a ClickAction>,
        acc: &mut Vec<Segment<'a>>,
    ) {
        let style = self.style.inherit(parent_style);
        let hover = self.hover.as_deref().or(parent_hover);
        let click = self.click.as_ref().or(parent_click);
        if !self.content.is_empty() {
            acc.push(Segment {
                content: &self.content,
                style,
                hover,
                click,
            });
        }
        for child in &self.children {
            child.collect_segments(&style, hover, click, acc);
        }
    }
}
