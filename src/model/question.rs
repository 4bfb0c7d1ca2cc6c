//! Question variants.

use super::ContentTree;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Number of options a freshly created MCQ gets.
pub const DEFAULT_OPTION_COUNT: usize = 4;

/// Generate a fresh opaque question/paper identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// The closed set of question kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    /// Free-form rich text
    Text,
    /// Multiple choice
    Mcq,
    /// Rich text built around a table
    Table,
    /// Uploaded image with caption
    Image,
}

impl QuestionKind {
    /// All kinds, in display order.
    pub const ALL: [QuestionKind; 4] = [
        QuestionKind::Text,
        QuestionKind::Mcq,
        QuestionKind::Table,
        QuestionKind::Image,
    ];

    /// Interchange tag.
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::Text => "text",
            QuestionKind::Mcq => "mcq",
            QuestionKind::Table => "table",
            QuestionKind::Image => "image",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        QuestionKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::validation(format!(
                    "Invalid question kind: '{}'. Valid options: text, mcq, table, image",
                    s
                ))
            })
    }
}

/// One option of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqOption {
    /// Single uppercase letter, unique within the question
    pub label: String,

    /// Option text
    #[serde(default)]
    pub text: String,

    /// Whether this is the correct answer
    #[serde(default)]
    pub is_correct: bool,
}

impl McqOption {
    /// Create an option that is not marked correct.
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
            is_correct: false,
        }
    }
}

/// Label for the option at `index` (A, B, C, ...).
pub fn option_label(index: usize) -> String {
    let offset = u8::try_from(index % 26).unwrap_or(0);
    char::from(b'A' + offset).to_string()
}

/// Variant-specific payload of a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestionBody {
    /// Free-form rich text
    Text {
        /// Question content
        content: ContentTree,
    },

    /// Multiple choice
    Mcq {
        /// Question stem
        stem: ContentTree,
        /// Options in display order
        options: Vec<McqOption>,
    },

    /// Rich text built around a table
    Table {
        /// Question content
        content: ContentTree,
    },

    /// Uploaded image with caption
    Image {
        /// Asset filename (empty until uploaded)
        #[serde(default)]
        filename: String,
        /// Caption shown under the image
        #[serde(default)]
        caption: String,
    },
}

impl QuestionBody {
    /// Kind of this payload.
    pub fn kind(&self) -> QuestionKind {
        match self {
            QuestionBody::Text { .. } => QuestionKind::Text,
            QuestionBody::Mcq { .. } => QuestionKind::Mcq,
            QuestionBody::Table { .. } => QuestionKind::Table,
            QuestionBody::Image { .. } => QuestionKind::Image,
        }
    }
}

/// A question: shared metadata plus a variant payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Opaque identifier, fixed at creation
    #[serde(default = "new_id")]
    pub id: String,

    /// Grouping label (may be empty)
    #[serde(default)]
    pub section: String,

    /// Point value
    #[serde(default)]
    pub marks: u32,

    /// Variant payload
    #[serde(flatten)]
    pub body: QuestionBody,
}

impl Question {
    /// Create a question with a fresh id around a payload.
    pub fn new(body: QuestionBody) -> Self {
        Self {
            id: new_id(),
            section: String::new(),
            marks: 0,
            body,
        }
    }

    /// Create a minimally valid question of the given kind.
    pub fn new_default(kind: QuestionKind) -> Self {
        let body = match kind {
            QuestionKind::Text => QuestionBody::Text {
                content: ContentTree::empty(),
            },
            QuestionKind::Mcq => QuestionBody::Mcq {
                stem: ContentTree::empty(),
                options: (0..DEFAULT_OPTION_COUNT)
                    .map(|i| McqOption::new(option_label(i), ""))
                    .collect(),
            },
            QuestionKind::Table => QuestionBody::Table {
                content: ContentTree::empty(),
            },
            QuestionKind::Image => QuestionBody::Image {
                filename: String::new(),
                caption: String::new(),
            },
        };
        Self::new(body)
    }

    /// Create a text question.
    pub fn text(content: ContentTree) -> Self {
        Self::new(QuestionBody::Text { content })
    }

    /// Create a table question.
    pub fn table(content: ContentTree) -> Self {
        Self::new(QuestionBody::Table { content })
    }

    /// Create a multiple-choice question.
    pub fn mcq(stem: ContentTree, options: Vec<McqOption>) -> Self {
        Self::new(QuestionBody::Mcq { stem, options })
    }

    /// Create an image question.
    pub fn image(filename: impl Into<String>, caption: impl Into<String>) -> Self {
        Self::new(QuestionBody::Image {
            filename: filename.into(),
            caption: caption.into(),
        })
    }

    /// Kind of this question.
    pub fn kind(&self) -> QuestionKind {
        self.body.kind()
    }

    /// Copy with a different section label.
    pub fn with_section(&self, section: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            ..self.clone()
        }
    }

    /// Copy with a different point value. Negative values are rejected.
    pub fn with_marks(&self, marks: i64) -> Result<Self> {
        let marks = u32::try_from(marks).map_err(|_| {
            Error::validation(format!("marks must be a non-negative integer, got {}", marks))
        })?;
        Ok(Self {
            marks,
            ..self.clone()
        })
    }

    /// Copy with a new identifier (used when seeding papers from templates).
    pub fn with_fresh_id(&self) -> Self {
        Self {
            id: new_id(),
            ..self.clone()
        }
    }

    /// Options of an MCQ question.
    pub fn options(&self) -> Option<&[McqOption]> {
        match &self.body {
            QuestionBody::Mcq { options, .. } => Some(options),
            _ => None,
        }
    }

    /// The option marked correct, if any.
    pub fn correct_option(&self) -> Option<&McqOption> {
        self.options()?.iter().find(|o| o.is_correct)
    }

    /// Mark the option at `index` correct and every other option not correct.
    ///
    /// This is the only mutation that touches correctness, which keeps at most
    /// one correct option per question.
    pub fn set_correct_option(&self, index: usize) -> Result<Self> {
        let QuestionBody::Mcq { stem, options } = &self.body else {
            return Err(Error::validation(format!(
                "question {} is a {} question; only mcq questions have options",
                self.id,
                self.kind()
            )));
        };
        if index >= options.len() {
            return Err(Error::validation(format!(
                "option index {} out of range (question has {} options)",
                index,
                options.len()
            )));
        }

        let options = options
            .iter()
            .enumerate()
            .map(|(i, opt)| McqOption {
                is_correct: i == index,
                ..opt.clone()
            })
            .collect();
        Ok(Self {
            body: QuestionBody::Mcq {
                stem: stem.clone(),
                options,
            },
            ..self.clone()
        })
    }

    /// Replace the text of the option at `index`.
    pub fn with_option_text(&self, index: usize, text: impl Into<String>) -> Result<Self> {
        let QuestionBody::Mcq { stem, options } = &self.body else {
            return Err(Error::validation(format!(
                "question {} has no options",
                self.id
            )));
        };
        if index >= options.len() {
            return Err(Error::validation(format!(
                "option index {} out of range (question has {} options)",
                index,
                options.len()
            )));
        }

        let mut options = options.clone();
        options[index].text = text.into();
        Ok(Self {
            body: QuestionBody::Mcq {
                stem: stem.clone(),
                options,
            },
            ..self.clone()
        })
    }

    /// Check variant invariants and every content tree of the question.
    ///
    /// `location` is used as the prefix of error messages.
    pub fn validate(&self, location: &str) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::validation(format!("{}: empty question id", location)));
        }

        match &self.body {
            QuestionBody::Text { content } | QuestionBody::Table { content } => {
                content.validate_at(&format!("{} content", location))
            }
            QuestionBody::Mcq { stem, options } => {
                stem.validate_at(&format!("{} stem", location))?;
                validate_options(options, location)
            }
            // An empty or dangling filename is a missing asset, reported at render time.
            QuestionBody::Image { .. } => Ok(()),
        }
    }
}

fn validate_options(options: &[McqOption], location: &str) -> Result<()> {
    if options.is_empty() {
        return Err(Error::validation(format!(
            "{}: multiple-choice question has no options",
            location
        )));
    }

    let mut seen = HashSet::new();
    for opt in options {
        let mut chars = opt.label.chars();
        let single_upper = matches!(
            (chars.next(), chars.next()),
            (Some(c), None) if c.is_ascii_uppercase()
        );
        if !single_upper {
            return Err(Error::validation(format!(
                "{}: option label '{}' must be a single uppercase letter",
                location, opt.label
            )));
        }
        if !seen.insert(opt.label.as_str()) {
            return Err(Error::validation(format!(
                "{}: duplicate option label '{}'",
                location, opt.label
            )));
        }
    }

    let correct = options.iter().filter(|o| o.is_correct).count();
    if correct > 1 {
        return Err(Error::validation(format!(
            "{}: {} options marked correct (at most one allowed)",
            location, correct
        )));
    }
    Ok(())
}
