//! Block-level types and page geometry.

use super::{Paragraph, Table};

/// Twips (1/20 point) per inch.
pub const TWIPS_PER_INCH: f64 = 1440.0;

/// Page geometry, all values in twips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSetup {
    /// Page width
    pub width: u32,

    /// Page height
    pub height: u32,

    /// Top margin
    pub margin_top: u32,

    /// Bottom margin
    pub margin_bottom: u32,

    /// Left margin
    pub margin_left: u32,

    /// Right margin
    pub margin_right: u32,
}

impl PageSetup {
    /// US Letter (8.5 x 11 inches) with one-inch margins.
    pub fn letter() -> Self {
        Self {
            width: 12240,
            height: 15840,
            margin_top: 1440,
            margin_bottom: 1440,
            margin_left: 1440,
            margin_right: 1440,
        }
    }

    /// Set the four margins from inches and return self.
    pub fn with_margins_inches(mut self, top: f64, bottom: f64, left: f64, right: f64) -> Self {
        self.margin_top = inches_to_twips(top);
        self.margin_bottom = inches_to_twips(bottom);
        self.margin_left = inches_to_twips(left);
        self.margin_right = inches_to_twips(right);
        self
    }

    /// Width available between the left and right margins.
    pub fn text_width(&self) -> u32 {
        self.width
            .saturating_sub(self.margin_left)
            .saturating_sub(self.margin_right)
    }
}

impl Default for PageSetup {
    fn default() -> Self {
        Self::letter()
    }
}

/// Convert inches to twips, rounding to the nearest twip.
pub fn inches_to_twips(inches: f64) -> u32 {
    (inches * TWIPS_PER_INCH).round().max(0.0) as u32
}

/// A content block of the document body, header, or a table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// A paragraph of text
    Paragraph(Paragraph),

    /// A table
    Table(Table),
}

impl Block {
    /// Get plain text content of the block.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Paragraph(p) => p.plain_text(),
            Block::Table(t) => t.plain_text(),
        }
    }

    /// Whether this block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }
}

impl From<Paragraph> for Block {
    fn from(p: Paragraph) -> Self {
        Block::Paragraph(p)
    }
}

impl From<Table> for Block {
    fn from(t: Table) -> Self {
        Block::Table(t)
    }
}
