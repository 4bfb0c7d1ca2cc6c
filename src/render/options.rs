//! Rendering options and configuration.

/// Which variant of the paper to lay out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderMode {
    /// The paper as handed to candidates
    #[default]
    Full,
    /// The paper with correct options marked
    AnswerKey,
}

impl RenderMode {
    /// Whether correct-option markers are drawn.
    pub fn marks_answers(self) -> bool {
        matches!(self, RenderMode::AnswerKey)
    }

    /// Suffix added to the export file stem.
    pub fn filename_suffix(self) -> &'static str {
        match self {
            RenderMode::Full => "",
            RenderMode::AnswerKey => "_answer_key",
        }
    }
}

/// Options for laying out a paper.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Full paper or answer key
    pub mode: RenderMode,

    /// Bounding box (width, height) in inches for image questions
    pub image_box: (f64, f64),

    /// Maximum width and height in inches for images inside rich text
    pub inline_image_size: f64,

    /// Maximum width and height in inches for the logo
    pub logo_size: f64,

    /// Left indentation of MCQ options in inches
    pub option_indent: f64,

    /// Marker drawn after the correct option in answer keys
    pub answer_marker: String,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for an answer key with otherwise default settings.
    pub fn answer_key() -> Self {
        Self::new().with_mode(RenderMode::AnswerKey)
    }

    /// Set the render mode.
    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the image question bounding box in inches.
    pub fn with_image_box(mut self, width: f64, height: f64) -> Self {
        self.image_box = (width.max(0.1), height.max(0.1));
        self
    }

    /// Set the inline image size limit in inches.
    pub fn with_inline_image_size(mut self, inches: f64) -> Self {
        self.inline_image_size = inches.max(0.1);
        self
    }

    /// Set the logo size limit in inches.
    pub fn with_logo_size(mut self, inches: f64) -> Self {
        self.logo_size = inches.max(0.1);
        self
    }

    /// Set the answer marker text.
    pub fn with_answer_marker(mut self, marker: impl Into<String>) -> Self {
        self.answer_marker = marker.into();
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            mode: RenderMode::Full,
            image_box: (4.0, 4.0),
            inline_image_size: 3.0,
            logo_size: 1.5,
            option_indent: 0.5,
            answer_marker: "\u{2714}".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .with_mode(RenderMode::AnswerKey)
            .with_image_box(5.0, 2.0)
            .with_logo_size(0.0);

        assert_eq!(options.mode, RenderMode::AnswerKey);
        assert_eq!(options.image_box, (5.0, 2.0));
        assert_eq!(options.logo_size, 0.1);
    }

    #[test]
    fn test_defaults() {
        let options = RenderOptions::default();
        assert_eq!(options.mode, RenderMode::Full);
        assert_eq!(options.image_box, (4.0, 4.0));
        assert_eq!(options.inline_image_size, 3.0);
        assert_eq!(options.logo_size, 1.5);
        assert_eq!(options.answer_marker, "✔");
    }

    #[test]
    fn test_mode_suffix() {
        assert_eq!(RenderMode::Full.filename_suffix(), "");
        assert_eq!(RenderMode::AnswerKey.filename_suffix(), "_answer_key");
        assert!(RenderOptions::answer_key().mode.marks_answers());
    }
}
