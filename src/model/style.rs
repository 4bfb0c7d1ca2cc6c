//! Paper header metadata and the per-paper style sheet.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::OnceLock;

/// Allowed body font sizes in points.
pub const FONT_SIZE_RANGE: RangeInclusive<u32> = 8..=16;

/// Allowed page margins in inches.
pub const MARGIN_RANGE: RangeInclusive<f64> = 0.5..=3.0;

/// Institutional header block of a paper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperHeader {
    /// School or institution name
    pub institution: String,

    /// Exam title (also drives the export filename)
    pub title: String,

    /// Subject
    pub subject: String,

    /// Exam date (free text)
    pub date: String,

    /// Duration (free text, e.g. "2 hours")
    pub duration: String,

    /// Total marks as entered by the author
    pub total_marks: u32,
}

impl PaperHeader {
    /// Header with only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// The details row: subject, date, duration, and total marks that are set.
    pub fn details(&self) -> Vec<String> {
        let mut details = Vec::new();
        if !self.subject.is_empty() {
            details.push(format!("Subject: {}", self.subject));
        }
        if !self.date.is_empty() {
            details.push(format!("Date: {}", self.date));
        }
        if !self.duration.is_empty() {
            details.push(format!("Duration: {}", self.duration));
        }
        if self.total_marks > 0 {
            details.push(format!("Total Marks: {}", self.total_marks));
        }
        details
    }
}

/// Font families offered for exam papers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FontFamily {
    /// Times New Roman (default)
    #[default]
    TimesNewRoman,
    /// Arial
    Arial,
    /// Calibri
    Calibri,
    /// Georgia
    Georgia,
    /// Helvetica
    Helvetica,
    /// Not in the offered set; rejected by validation
    Other(String),
}

impl FontFamily {
    /// The supported families.
    pub const SUPPORTED: [FontFamily; 5] = [
        FontFamily::TimesNewRoman,
        FontFamily::Arial,
        FontFamily::Calibri,
        FontFamily::Georgia,
        FontFamily::Helvetica,
    ];

    /// Font name as written into the document.
    pub fn name(&self) -> &str {
        match self {
            FontFamily::TimesNewRoman => "Times New Roman",
            FontFamily::Arial => "Arial",
            FontFamily::Calibri => "Calibri",
            FontFamily::Georgia => "Georgia",
            FontFamily::Helvetica => "Helvetica",
            FontFamily::Other(name) => name,
        }
    }

    /// Whether the family belongs to the supported set.
    pub fn is_supported(&self) -> bool {
        !matches!(self, FontFamily::Other(_))
    }
}

impl From<String> for FontFamily {
    fn from(s: String) -> Self {
        FontFamily::SUPPORTED
            .into_iter()
            .find(|f| f.name() == s)
            .unwrap_or(FontFamily::Other(s))
    }
}

impl From<FontFamily> for String {
    fn from(family: FontFamily) -> Self {
        family.name().to_string()
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Page styling for a paper or template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperStyle {
    /// Body font family
    pub font_family: FontFamily,

    /// Body font size in points
    pub font_size: u32,

    /// Logo asset shown above the title block
    pub logo_filename: Option<String>,

    /// Text repeated in the page header
    pub header_text: String,

    /// Text repeated in the page footer
    pub footer_text: String,

    /// Top margin in inches
    pub margin_top: f64,

    /// Bottom margin in inches
    pub margin_bottom: f64,

    /// Left margin in inches
    pub margin_left: f64,

    /// Right margin in inches
    pub margin_right: f64,

    /// Accent colour (`#RRGGBB`) for headings and rules
    pub accent_color: String,
}

impl Default for PaperStyle {
    fn default() -> Self {
        Self {
            font_family: FontFamily::default(),
            font_size: 12,
            logo_filename: None,
            header_text: String::new(),
            footer_text: String::new(),
            margin_top: 1.0,
            margin_bottom: 1.0,
            margin_left: 1.25,
            margin_right: 1.25,
            accent_color: "#000000".to_string(),
        }
    }
}

impl PaperStyle {
    /// Logo asset name, if one is set.
    pub fn logo(&self) -> Option<&str> {
        self.logo_filename.as_deref().filter(|s| !s.is_empty())
    }

    /// Accent colour as six uppercase hex digits without `#`.
    pub fn accent_hex(&self) -> String {
        self.accent_color.trim_start_matches('#').to_ascii_uppercase()
    }

    /// Margins as (top, bottom, left, right).
    pub fn margins(&self) -> [(&'static str, f64); 4] {
        [
            ("margin_top", self.margin_top),
            ("margin_bottom", self.margin_bottom),
            ("margin_left", self.margin_left),
            ("margin_right", self.margin_right),
        ]
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<()> {
        if !self.font_family.is_supported() {
            return Err(Error::validation(format!(
                "unsupported font family '{}'",
                self.font_family
            )));
        }
        if !FONT_SIZE_RANGE.contains(&self.font_size) {
            return Err(Error::validation(format!(
                "font size {} outside {}-{} pt",
                self.font_size,
                FONT_SIZE_RANGE.start(),
                FONT_SIZE_RANGE.end()
            )));
        }
        for (name, value) in self.margins() {
            if !MARGIN_RANGE.contains(&value) {
                return Err(Error::validation(format!(
                    "{} {} outside {}-{} inches",
                    name,
                    value,
                    MARGIN_RANGE.start(),
                    MARGIN_RANGE.end()
                )));
            }
        }
        if !color_regex().is_match(&self.accent_color) {
            return Err(Error::validation(format!(
                "accent color '{}' is not of the form #RRGGBB",
                self.accent_color
            )));
        }
        Ok(())
    }
}

fn color_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color pattern"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style_is_valid() {
        let style = PaperStyle::default();
        assert!(style.validate().is_ok());
        assert_eq!(style.font_family.name(), "Times New Roman");
        assert_eq!(style.accent_hex(), "000000");
        assert!(style.logo().is_none());
    }

    #[test]
    fn test_font_size_bounds() {
        let mut style = PaperStyle::default();
        style.font_size = 7;
        assert!(matches!(style.validate(), Err(Error::Validation(_))));
        style.font_size = 16;
        assert!(style.validate().is_ok());
        style.font_size = 17;
        assert!(style.validate().is_err());
    }

    #[test]
    fn test_margin_bounds() {
        let mut style = PaperStyle::default();
        style.margin_left = 0.25;
        assert!(style.validate().is_err());
        style.margin_left = 3.0;
        assert!(style.validate().is_ok());
        style.margin_top = f64::NAN;
        assert!(style.validate().is_err());
    }

    #[test]
    fn test_accent_color_format() {
        let mut style = PaperStyle::default();
        style.accent_color = "#1a2B3c".into();
        assert!(style.validate().is_ok());
        assert_eq!(style.accent_hex(), "1A2B3C");
        style.accent_color = "blue".into();
        assert!(style.validate().is_err());
    }

    #[test]
    fn test_unknown_font_is_kept_but_rejected() {
        let style: PaperStyle = serde_json::from_str(r#"{"font_family":"Comic Sans MS"}"#).unwrap();
        assert_eq!(style.font_family, FontFamily::Other("Comic Sans MS".into()));
        assert!(style.validate().is_err());

        let json = serde_json::to_value(&style).unwrap();
        assert_eq!(json["font_family"], "Comic Sans MS");
    }

    #[test]
    fn test_empty_logo_means_none() {
        let style = PaperStyle {
            logo_filename: Some(String::new()),
            ..Default::default()
        };
        assert!(style.logo().is_none());
    }

    #[test]
    fn test_header_details() {
        let header = PaperHeader {
            subject: "Biology".into(),
            duration: "2 hours".into(),
            total_marks: 100,
            ..Default::default()
        };
        assert_eq!(
            header.details(),
            ["Subject: Biology", "Duration: 2 hours", "Total Marks: 100"]
        );
        assert!(PaperHeader::default().details().is_empty());
    }
}
