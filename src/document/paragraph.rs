//! Paragraphs, runs, and inline pictures of the laid-out document.

/// One line-wrapped block: a title line, an option, a question prefix, a rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    /// Runs and pictures, in reading order
    pub content: Vec<InlineContent>,

    /// Paragraph-level properties
    pub style: ParagraphStyle,
}

impl Paragraph {
    /// An empty body paragraph (also used as a spacer).
    pub fn new() -> Self {
        Self::default()
    }

    /// A body paragraph holding one unstyled run.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_text(text);
        p
    }

    /// A section or title heading. Levels outside 1..=2 are clamped.
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        let mut p = Self::with_text(text);
        p.style.heading_level = Some(level.clamp(1, 2));
        p
    }

    /// An empty paragraph whose bottom border draws a horizontal rule.
    pub fn rule(color: impl Into<String>) -> Self {
        Self {
            content: Vec::new(),
            style: ParagraphStyle {
                bottom_border: Some(color.into()),
                ..ParagraphStyle::default()
            },
        }
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.style.alignment = alignment;
        self
    }

    /// Indent from the left margin, in twips.
    pub fn indent(mut self, twips: u32) -> Self {
        self.style.indent_left = Some(twips);
        self
    }

    pub fn add_text(&mut self, text: impl Into<String>) {
        self.add_run(TextRun::new(text));
    }

    pub fn add_run(&mut self, run: TextRun) {
        self.content.push(InlineContent::Text(run));
    }

    pub fn add_image(&mut self, image: ImageRun) {
        self.content.push(InlineContent::Image(image));
    }

    /// Text of every run; pictures appear as `[image: name]`.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for item in &self.content {
            match item {
                InlineContent::Text(run) => out.push_str(&run.text),
                InlineContent::Image(image) => {
                    out.push_str("[image: ");
                    out.push_str(&image.name);
                    out.push(']');
                }
            }
        }
        out
    }

    pub fn is_heading(&self) -> bool {
        self.style.heading_level.is_some()
    }

    /// Whether this is a content-free rule paragraph.
    pub fn is_rule(&self) -> bool {
        self.content.is_empty() && self.style.bottom_border.is_some()
    }
}

/// Inline item of a paragraph.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineContent {
    Text(TextRun),
    Image(ImageRun),
}

/// Text sharing one set of run properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub style: TextStyle,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self::styled(text, TextStyle::default())
    }

    pub fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self::styled(text, TextStyle::marked(true, false, false))
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self::styled(text, TextStyle::marked(false, true, false))
    }

    /// Override the document font size (points).
    pub fn sized(mut self, points: u32) -> Self {
        self.style.font_size = Some(points);
        self
    }

    /// Colour as six hex digits, e.g. `"C00000"`.
    pub fn colored(mut self, hex: impl Into<String>) -> Self {
        self.style.color = Some(hex.into());
        self
    }
}

/// Run properties. Unset fields inherit from the style sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,

    /// Points
    pub font_size: Option<u32>,

    /// `RRGGBB`
    pub color: Option<String>,
}

impl TextStyle {
    /// Style carrying only the three editor marks.
    pub fn marked(bold: bool, italic: bool, underline: bool) -> Self {
        Self {
            bold,
            italic,
            underline,
            ..Self::default()
        }
    }
}

/// A picture placed inline, already scaled for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRun {
    /// Index into [`ExamDocument::media`](super::ExamDocument)
    pub media: usize,

    /// Asset name, written as the picture description
    pub name: String,

    pub width_emu: u64,
    pub height_emu: u64,
}

/// Paragraph properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphStyle {
    /// `Heading1`/`Heading2` style, or a body paragraph
    pub heading_level: Option<u8>,

    pub alignment: Alignment,

    /// Twips
    pub indent_left: Option<u32>,

    /// Colour of a single bottom border (`RRGGBB`)
    pub bottom_border: Option<String>,
}

/// Horizontal alignment. The exam layout only centres or left-aligns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
}
