//! Reusable paper templates.

use super::question::new_id;
use super::{Paper, PaperHeader, PaperStyle, Question};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named seed (header, questions, style) for new papers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Opaque identifier
    #[serde(default = "new_id")]
    pub id: String,

    /// Display name
    pub name: String,

    /// Creation time
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Header copied into new papers
    #[serde(default)]
    pub header: PaperHeader,

    /// Questions copied into new papers
    #[serde(default)]
    pub questions: Vec<Question>,

    /// Style copied into new papers
    #[serde(default)]
    pub style: PaperStyle,
}

impl Template {
    /// Create an empty template.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            created_at: Utc::now(),
            header: PaperHeader::default(),
            questions: Vec::new(),
            style: PaperStyle::default(),
        }
    }

    /// Capture the structure and styling of an existing paper.
    pub fn from_paper(name: impl Into<String>, paper: &Paper) -> Self {
        Self {
            header: paper.header.clone(),
            questions: paper.questions.clone(),
            style: paper.style.clone(),
            ..Self::new(name)
        }
    }

    /// Start a new paper from this template.
    ///
    /// The paper and each of its questions get fresh identifiers, so papers
    /// seeded from the same template never share question ids.
    pub fn instantiate(&self) -> Paper {
        Paper {
            header: self.header.clone(),
            questions: self.questions.iter().map(Question::with_fresh_id).collect(),
            style: self.style.clone(),
            ..Paper::new()
        }
    }

    /// Lightweight listing view.
    pub fn summary(&self) -> TemplateSummary {
        TemplateSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
        }
    }
}

/// Listing view of a stored template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSummary {
    /// Template id
    pub id: String,
    /// Display name
    pub name: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionKind;

    #[test]
    fn test_instantiate_gives_fresh_ids() {
        let paper = Paper::new()
            .with_header(PaperHeader::titled("Weekly Quiz"))
            .push_question(Question::new_default(QuestionKind::Mcq))
            .unwrap();
        let template = Template::from_paper("Quiz", &paper);
        let seeded = template.instantiate();

        assert_ne!(seeded.id, paper.id);
        assert_eq!(seeded.header.title, "Weekly Quiz");
        assert_eq!(seeded.question_count(), 1);
        assert_ne!(seeded.questions[0].id, paper.questions[0].id);
        assert_eq!(seeded.questions[0].body, paper.questions[0].body);
    }

    #[test]
    fn test_summary() {
        let template = Template::new("Finals");
        let summary = template.summary();
        assert_eq!(summary.name, "Finals");
        assert_eq!(summary.id, template.id);
    }
}
