//! Editable exam paper model.
//!
//! Papers, questions, and content trees are immutable values: every edit
//! returns a new value built from the old one. This keeps any snapshot handed
//! to the renderer stable while editing carries on elsewhere.

mod content;
mod paper;
mod question;
mod style;
mod template;

pub use content::{ContentTree, Mark, MarkKind, Node, NodeKind};
pub use paper::{Paper, PaperSummary};
pub use question::{
    new_id, option_label, McqOption, Question, QuestionBody, QuestionKind, DEFAULT_OPTION_COUNT,
};
pub use style::{FontFamily, PaperHeader, PaperStyle, FONT_SIZE_RANGE, MARGIN_RANGE};
pub use template::{Template, TemplateSummary};
