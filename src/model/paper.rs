//! The paper aggregate.

use super::question::new_id;
use super::{PaperHeader, PaperStyle, Question};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A complete exam paper: header, ordered questions, and style.
///
/// Every edit returns a new `Paper`; the receiver is never modified, so a
/// snapshot handed to the renderer stays stable while editing continues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    /// Opaque identifier
    #[serde(default = "new_id")]
    pub id: String,

    /// Creation time
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last save time
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,

    /// Title block metadata
    #[serde(default)]
    pub header: PaperHeader,

    /// Questions in display order
    #[serde(default)]
    pub questions: Vec<Question>,

    /// Page styling
    #[serde(default)]
    pub style: PaperStyle,
}

impl Paper {
    /// Create an empty paper with a fresh id and current timestamps.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            created_at: now,
            updated_at: now,
            header: PaperHeader::default(),
            questions: Vec::new(),
            style: PaperStyle::default(),
        }
    }

    /// Number of questions.
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Find a question by id.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Position of a question by id.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.questions.iter().position(|q| q.id == id)
    }

    /// Question ids in order.
    pub fn question_ids(&self) -> Vec<&str> {
        self.questions.iter().map(|q| q.id.as_str()).collect()
    }

    /// Sum of the marks of every question (the header total is author-entered).
    pub fn marks_sum(&self) -> u64 {
        self.questions.iter().map(|q| u64::from(q.marks)).sum()
    }

    /// Whether any MCQ has an option marked correct.
    pub fn has_marked_answers(&self) -> bool {
        self.questions.iter().any(|q| q.correct_option().is_some())
    }

    /// Copy with a different header.
    pub fn with_header(&self, header: PaperHeader) -> Self {
        Self {
            header,
            ..self.clone()
        }
    }

    /// Copy with a different style.
    pub fn with_style(&self, style: PaperStyle) -> Self {
        Self {
            style,
            ..self.clone()
        }
    }

    /// Copy with `updated_at` set to now, as done on every save.
    pub fn touched(&self) -> Self {
        Self {
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Insert a question at `position` (0..=len).
    pub fn insert_question(&self, question: Question, position: usize) -> Result<Self> {
        if position > self.questions.len() {
            return Err(Error::validation(format!(
                "insert position {} out of range (paper has {} questions)",
                position,
                self.questions.len()
            )));
        }
        if self.question(&question.id).is_some() {
            return Err(Error::validation(format!(
                "duplicate question id {}",
                question.id
            )));
        }

        let mut questions = self.questions.clone();
        questions.insert(position, question);
        Ok(Self {
            questions,
            ..self.clone()
        })
    }

    /// Append a question at the end.
    pub fn push_question(&self, question: Question) -> Result<Self> {
        self.insert_question(question, self.questions.len())
    }

    /// Remove the question with the given id.
    pub fn remove_question(&self, id: &str) -> Result<Self> {
        let index = self
            .position_of(id)
            .ok_or_else(|| Error::NotFound(format!("question {}", id)))?;

        let mut questions = self.questions.clone();
        questions.remove(index);
        Ok(Self {
            questions,
            ..self.clone()
        })
    }

    /// Replace the question that has the same id as `question`.
    pub fn replace_question(&self, question: Question) -> Result<Self> {
        let index = self
            .position_of(&question.id)
            .ok_or_else(|| Error::NotFound(format!("question {}", question.id)))?;

        let mut questions = self.questions.clone();
        questions[index] = question;
        Ok(Self {
            questions,
            ..self.clone()
        })
    }

    /// Move the question at `from` so that it ends up at index `to`.
    ///
    /// The element is removed first and `to` indexes the shortened list, which
    /// is the same as the final position in the result.
    pub fn move_question(&self, from: usize, to: usize) -> Result<Self> {
        let len = self.questions.len();
        if from >= len || to >= len {
            return Err(Error::validation(format!(
                "cannot move question {} to {} (paper has {} questions)",
                from, to, len
            )));
        }

        let mut questions = self.questions.clone();
        let question = questions.remove(from);
        questions.insert(to, question);
        Ok(Self {
            questions,
            ..self.clone()
        })
    }

    /// Check the whole paper: style, id uniqueness, and every question.
    pub fn validate(&self) -> Result<()> {
        self.style.validate()?;

        let mut seen = HashSet::new();
        for (i, question) in self.questions.iter().enumerate() {
            if !seen.insert(question.id.as_str()) {
                return Err(Error::validation(format!(
                    "question {}: duplicate id {}",
                    i + 1,
                    question.id
                )));
            }
            question.validate(&format!("question {}", i + 1))?;
        }
        Ok(())
    }

    /// Lightweight listing view.
    pub fn summary(&self) -> PaperSummary {
        PaperSummary {
            id: self.id.clone(),
            title: self.header.title.clone(),
            subject: self.header.subject.clone(),
            updated_at: self.updated_at,
        }
    }
}

impl Default for Paper {
    fn default() -> Self {
        Self::new()
    }
}

/// Listing view of a stored paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperSummary {
    /// Paper id
    pub id: String,
    /// Header title
    pub title: String,
    /// Header subject
    pub subject: String,
    /// Last save time
    pub updated_at: DateTime<Utc>,
}
