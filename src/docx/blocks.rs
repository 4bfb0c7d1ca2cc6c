//! Conversion of document blocks into `docx-rs` elements.

use crate::document::{Alignment, Block, ImageRun, InlineContent, Media, Paragraph, Table, TextRun};
use crate::error::{Error, Result};
use docx_rs::{
    AlignmentType, BorderType, BreakType, ParagraphBorder, ParagraphBorderPosition, Pic, Run,
    Shading, WidthType,
};

/// Cell margins (left + right) taken out of a column before nesting content, in twips.
const CELL_MARGINS: u32 = 216;

/// Background of header-row cells.
const HEADER_FILL: &str = "F2F2F2";

/// A top-level element of a story (body, header, or footer).
pub enum Element {
    Paragraph(docx_rs::Paragraph),
    Table(docx_rs::Table),
}

/// Builds `docx-rs` elements for one package.
///
/// Paragraph and picture ids come from counters owned by the builder, so two
/// builds of the same document produce the same ids.
pub struct BlockBuilder<'a> {
    media: &'a [Media],
    paragraphs: u32,
    pictures: u32,
}

impl<'a> BlockBuilder<'a> {
    pub fn new(media: &'a [Media]) -> Self {
        Self {
            media,
            paragraphs: 0,
            pictures: 0,
        }
    }

    pub fn blocks(&mut self, blocks: &[Block], width: u32) -> Result<Vec<Element>> {
        blocks
            .iter()
            .filter(|block| !matches!(block, Block::Table(t) if t.is_empty()))
            .map(|block| match block {
                Block::Paragraph(p) => self.paragraph(p).map(Element::Paragraph),
                Block::Table(t) => Ok(Element::Table(self.table(t, width)?)),
            })
            .collect()
    }

    /// A story that must hold plain paragraphs; tables collapse to their text.
    pub fn paragraphs(&mut self, blocks: &[Block]) -> Result<Vec<docx_rs::Paragraph>> {
        blocks
            .iter()
            .map(|block| match block {
                Block::Paragraph(p) => self.paragraph(p),
                Block::Table(t) => self.paragraph(&Paragraph::with_text(t.plain_text())),
            })
            .collect()
    }

    fn next_paragraph_id(&mut self) -> String {
        self.paragraphs += 1;
        format!("{:08X}", self.paragraphs)
    }

    pub fn paragraph(&mut self, p: &Paragraph) -> Result<docx_rs::Paragraph> {
        let mut out = docx_rs::Paragraph::new().id(self.next_paragraph_id());

        let style = &p.style;
        if let Some(level) = style.heading_level {
            out = out.style(&format!("Heading{}", level));
        }
        if let Some(ref color) = style.bottom_border {
            out.property = out.property.set_border(
                ParagraphBorder::new(ParagraphBorderPosition::Bottom)
                    .val(BorderType::Single)
                    .size(6)
                    .space(1)
                    .color(color.as_str()),
            );
        }
        if let Some(indent) = style.indent_left {
            out = out.indent(Some(indent as i32), None, None, None);
        }
        if style.alignment == Alignment::Center {
            out = out.align(AlignmentType::Center);
        }

        for item in &p.content {
            match item {
                InlineContent::Text(run) if run.text.is_empty() => {}
                InlineContent::Text(run) => out = out.add_run(text_run(run)),
                InlineContent::Image(image) => out = out.add_run(self.picture(image)?),
            }
        }
        Ok(out)
    }

    fn picture(&mut self, image: &ImageRun) -> Result<Run> {
        let media = self
            .media
            .get(image.media)
            .ok_or_else(|| Error::MissingAsset(image.name.clone()))?;

        // Every drawing gets its own part so repeated images never collide
        self.pictures += 1;
        let pic = Pic::new_with_dimensions(media.data.clone(), media.width_px, media.height_px)
            .id(format!("image{}", self.pictures))
            .size(image.width_emu as u32, image.height_emu as u32);
        Ok(Run::new().add_image(pic))
    }

    fn table(&mut self, table: &Table, width: u32) -> Result<docx_rs::Table> {
        let columns = table.column_count();
        let col_width = width / columns.max(1) as u32;

        let mut rows = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            let mut cells = Vec::with_capacity(columns);
            let header = row.is_header();
            for i in 0..columns {
                // Ragged rows are padded with empty cells
                let content = row.cells.get(i).map(|c| c.content.as_slice()).unwrap_or(&[]);
                let mut cell =
                    docx_rs::TableCell::new().width(col_width as usize, WidthType::Dxa);
                if header {
                    cell = cell.shading(Shading::new().fill(HEADER_FILL));
                }
                for element in self.blocks(content, col_width.saturating_sub(CELL_MARGINS))? {
                    cell = match element {
                        Element::Paragraph(p) => cell.add_paragraph(p),
                        Element::Table(t) => cell.add_table(t),
                    };
                }
                // A cell must end with a paragraph
                if !matches!(content.last(), Some(Block::Paragraph(_))) {
                    cell = cell.add_paragraph(self.paragraph(&Paragraph::new())?);
                }
                cells.push(cell);
            }
            rows.push(docx_rs::TableRow::new(cells));
        }

        Ok(docx_rs::Table::new(rows).set_grid(vec![col_width as usize; columns]))
    }
}

fn text_run(run: &TextRun) -> Run {
    let mut out = Run::new();
    let s = &run.style;
    if s.bold {
        out = out.bold();
    }
    if s.italic {
        out = out.italic();
    }
    if let Some(ref color) = s.color {
        out = out.color(color.as_str());
    }
    if let Some(size) = s.font_size {
        // half-points
        out = out.size(size as usize * 2);
    }
    if s.underline {
        out = out.underline("single");
    }

    for (i, line) in run.text.split('\n').enumerate() {
        if i > 0 {
            out = out.add_break(BreakType::TextWrapping);
        }
        for (j, piece) in line.split('\t').enumerate() {
            if j > 0 {
                out = out.add_tab();
            }
            if !piece.is_empty() {
                out = out.add_text(piece);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{TableCell, TableRow};

    fn runs(p: &docx_rs::Paragraph) -> usize {
        p.children
            .iter()
            .filter(|c| matches!(c, docx_rs::ParagraphChild::Run(_)))
            .count()
    }

    #[test]
    fn test_paragraph_ids_are_sequential() {
        let mut builder = BlockBuilder::new(&[]);
        let first = builder.paragraph(&Paragraph::with_text("a")).unwrap();
        let second = builder.paragraph(&Paragraph::with_text("b")).unwrap();
        assert_eq!(first.id, "00000001");
        assert_eq!(second.id, "00000002");

        let mut again = BlockBuilder::new(&[]);
        assert_eq!(again.paragraph(&Paragraph::with_text("a")).unwrap().id, first.id);
    }

    #[test]
    fn test_empty_runs_are_skipped() {
        let mut p = Paragraph::new();
        p.add_text("");
        p.add_run(TextRun::bold("Q1."));
        let out = BlockBuilder::new(&[]).paragraph(&p).unwrap();
        assert_eq!(runs(&out), 1);
    }

    #[test]
    fn test_missing_media_index() {
        let mut p = Paragraph::new();
        p.add_image(ImageRun {
            media: 3,
            name: "fig.png".to_string(),
            width_emu: 10,
            height_emu: 10,
        });
        let err = BlockBuilder::new(&[]).paragraph(&p).unwrap_err();
        assert!(matches!(err, Error::MissingAsset(ref name) if name == "fig.png"));
    }

    #[test]
    fn test_ragged_table_is_padded() {
        let mut table = Table::new();
        table.add_row(TableRow::new(vec![TableCell::header(vec![
            Paragraph::with_text("h").into()
        ])]));
        table.add_row(TableRow::new(vec![TableCell::new(vec![]), TableCell::new(vec![])]));

        let out = BlockBuilder::new(&[]).table(&table, 9000).unwrap();
        assert_eq!(out.rows.len(), 2);
        assert_eq!(out.grid, vec![4500, 4500]);
    }
}
