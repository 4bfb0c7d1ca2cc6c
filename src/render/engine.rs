//! Lays out a paper as an [`ExamDocument`].
//!
//! Rendering is a pure function of the paper, the options, and the asset
//! store contents. The paper is validated in full before anything is laid
//! out, so a failed render never yields a partial document.

use super::{RenderMode, RenderOptions};
use crate::assets::AssetStore;
use crate::document::{
    inches_to_twips, Alignment, Block, ExamDocument, ImageRun, InlineContent, Media, Metadata,
    PageSetup, Paragraph, Table, TableCell, TableRow, TextRun, TextStyle,
};
use crate::error::{Error, Result};
use crate::model::{ContentTree, MarkKind, McqOption, Node, NodeKind, Paper, Question, QuestionBody};
use log::{debug, warn};

/// Lay out `paper` according to `options`, resolving images through `assets`.
pub fn render(paper: &Paper, options: &RenderOptions, assets: &dyn AssetStore) -> Result<ExamDocument> {
    paper.validate()?;
    debug!(
        "Rendering paper {} ({} questions, {:?})",
        paper.id,
        paper.questions.len(),
        options.mode
    );

    if options.mode == RenderMode::AnswerKey && !paper.has_marked_answers() {
        warn!("Answer key for paper {} has no marked answers", paper.id);
    }

    let mut renderer = Renderer::new(paper, options, assets);
    renderer.shell();
    renderer.title_block()?;
    debug!("Title block done, {} blocks", renderer.doc.body.len());
    renderer.questions()?;
    debug!(
        "Questions done, {} blocks and {} media",
        renderer.doc.body.len(),
        renderer.doc.media.len()
    );

    Ok(renderer.doc)
}

struct Renderer<'a> {
    paper: &'a Paper,
    options: &'a RenderOptions,
    assets: &'a dyn AssetStore,
    accent: String,
    doc: ExamDocument,
}

impl<'a> Renderer<'a> {
    fn new(paper: &'a Paper, options: &'a RenderOptions, assets: &'a dyn AssetStore) -> Self {
        Self {
            paper,
            options,
            assets,
            accent: paper.style.accent_hex(),
            doc: ExamDocument::new(),
        }
    }

    /// Page geometry, fonts, metadata, and page header/footer.
    fn shell(&mut self) {
        let paper = self.paper;
        let style = &paper.style;
        let header = &paper.header;

        self.doc.page = PageSetup::letter().with_margins_inches(
            style.margin_top,
            style.margin_bottom,
            style.margin_left,
            style.margin_right,
        );
        self.doc.font_family = style.font_family.name().to_string();
        self.doc.font_size = style.font_size;
        self.doc.accent_color = self.accent.clone();

        self.doc.metadata = Metadata {
            title: non_empty(&header.title),
            subject: non_empty(&header.subject),
            creator: non_empty(&header.institution),
            created: Some(paper.created_at),
            modified: Some(paper.updated_at),
        };

        if !style.header_text.is_empty() {
            self.doc.header =
                vec![Paragraph::with_text(style.header_text.as_str()).align(Alignment::Center).into()];
        }
        if !style.footer_text.is_empty() {
            self.doc.footer =
                vec![Paragraph::with_text(style.footer_text.as_str()).align(Alignment::Center).into()];
        }
    }

    /// Logo, institution, title, details row, rule, spacer.
    fn title_block(&mut self) -> Result<()> {
        let paper = self.paper;
        let style = &paper.style;
        let header = &paper.header;

        if let Some(logo) = style.logo() {
            let size = self.options.logo_size;
            let image = self.image_run(logo, size, size)?;
            let mut p = Paragraph::new().align(Alignment::Center);
            p.add_image(image);
            self.doc.push(p);
        }

        if !header.institution.is_empty() {
            let mut p = Paragraph::new().align(Alignment::Center);
            p.add_run(TextRun::bold(header.institution.as_str()).sized(style.font_size + 4));
            self.doc.push(p);
        }

        if !header.title.is_empty() {
            let mut p = Paragraph::new().align(Alignment::Center);
            p.add_run(TextRun::bold(header.title.as_str()).sized(style.font_size + 2));
            self.doc.push(p);
        }

        let details = header.details();
        if !details.is_empty() {
            self.doc
                .push(Paragraph::with_text(details.join("   |   ")).align(Alignment::Center));
        }

        self.doc.push(Paragraph::rule(self.accent.as_str()));
        self.doc.push(Paragraph::new());
        Ok(())
    }

    fn questions(&mut self) -> Result<()> {
        let paper = self.paper;
        let mut current_section = "";

        for (i, question) in paper.questions.iter().enumerate() {
            let number = i + 1;
            if question.section != current_section {
                current_section = &question.section;
                if !current_section.is_empty() {
                    self.doc.push(Paragraph::heading(current_section, 2));
                }
            }
            self.question(number, question)?;
            self.doc.push(Paragraph::new());
        }
        Ok(())
    }

    fn question(&mut self, number: usize, question: &Question) -> Result<()> {
        let location = format!("question {}", number);
        self.doc.push(question_prefix(number, question.marks));

        match &question.body {
            QuestionBody::Text { content } | QuestionBody::Table { content } => {
                let blocks = self.tree(content, &location)?;
                self.doc.body.extend(blocks);
            }
            QuestionBody::Mcq { stem, options } => {
                let blocks = self.tree(stem, &location)?;
                self.doc.body.extend(blocks);
                for option in options {
                    let p = self.option(option);
                    self.doc.push(p);
                }
            }
            QuestionBody::Image { filename, caption } => {
                if filename.is_empty() {
                    return Err(Error::MissingAsset(format!("{} has no image", location)));
                }
                let (w, h) = self.options.image_box;
                let image = self.image_run(filename, w, h)?;
                let mut p = Paragraph::new().align(Alignment::Center);
                p.add_image(image);
                self.doc.push(p);

                if !caption.is_empty() {
                    let mut cap = Paragraph::new().align(Alignment::Center);
                    cap.add_run(TextRun::italic(caption.as_str()));
                    self.doc.push(cap);
                }
            }
        }
        Ok(())
    }

    fn option(&self, option: &McqOption) -> Paragraph {
        let mut p = Paragraph::with_text(format!("({}) {}", option.label, option.text))
            .indent(inches_to_twips(self.options.option_indent));
        if self.options.mode.marks_answers() && option.is_correct {
            p.add_run(
                TextRun::bold(format!("  {}", self.options.answer_marker)).colored(self.accent.as_str()),
            );
        }
        p
    }

    /// Resolve an asset and size it to fit the box (inches).
    fn image_run(&mut self, name: &str, max_width: f64, max_height: f64) -> Result<ImageRun> {
        let index = match self.doc.media_index(name) {
            Some(index) => index,
            None => {
                let asset = self
                    .assets
                    .retrieve(name)?
                    .ok_or_else(|| Error::MissingAsset(name.to_string()))?;
                self.doc.add_media(Media::from_bytes(name, asset.data)?)
            }
        };
        let (width_emu, height_emu) = self.doc.media[index].display_size(max_width, max_height);
        Ok(ImageRun {
            media: index,
            name: name.to_string(),
            width_emu,
            height_emu,
        })
    }

    fn tree(&mut self, tree: &ContentTree, location: &str) -> Result<Vec<Block>> {
        let root = tree.root();
        self.blocks(&root.content, &root.kind, location)
    }

    fn blocks(&mut self, nodes: &[Node], parent: &NodeKind, location: &str) -> Result<Vec<Block>> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node.kind {
                NodeKind::Paragraph => out.push(self.paragraph(node, location)?.into()),
                NodeKind::Table => {
                    if let Some(table) = self.table(node, location)? {
                        out.push(table.into());
                    }
                }
                _ => return Err(unsupported(node, parent, location)),
            }
        }
        Ok(out)
    }

    fn paragraph(&mut self, node: &Node, location: &str) -> Result<Paragraph> {
        let mut p = Paragraph::new();
        for child in &node.content {
            match child.kind {
                NodeKind::Text => p.add_run(text_run(child)),
                NodeKind::Image => {
                    let name = child
                        .image_filename()
                        .ok_or_else(|| Error::MissingAsset(format!("{}: image without source", location)))?;
                    let size = self.options.inline_image_size;
                    let image = self.image_run(name, size, size)?;
                    p.add_image(image);
                }
                _ => return Err(unsupported(child, &node.kind, location)),
            }
        }
        Ok(p)
    }

    fn table(&mut self, node: &Node, location: &str) -> Result<Option<Table>> {
        let mut table = Table::new();
        for row in &node.content {
            if row.kind != NodeKind::TableRow {
                return Err(unsupported(row, &node.kind, location));
            }
            let mut cells = Vec::with_capacity(row.content.len());
            for cell in &row.content {
                let mut content = self.blocks(&cell.content, &cell.kind, location)?;
                match cell.kind {
                    NodeKind::TableCell => cells.push(TableCell::new(content)),
                    NodeKind::TableHeader => {
                        embolden(&mut content);
                        cells.push(TableCell::header(content));
                    }
                    _ => return Err(unsupported(cell, &row.kind, location)),
                }
            }
            table.add_row(TableRow::new(cells));
        }

        if table.is_empty() {
            debug!("{}: skipping empty table", location);
            return Ok(None);
        }
        Ok(Some(table))
    }
}

fn question_prefix(number: usize, marks: u32) -> Paragraph {
    let mut p = Paragraph::new();
    p.add_run(TextRun::bold(format!("Q{}.", number)));
    if marks > 0 {
        let unit = if marks == 1 { "mark" } else { "marks" };
        p.add_run(TextRun::italic(format!("  [{} {}]", marks, unit)));
    }
    p
}

fn text_run(node: &Node) -> TextRun {
    let style = TextStyle::marked(
        node.has_mark(&MarkKind::Bold),
        node.has_mark(&MarkKind::Italic),
        node.has_mark(&MarkKind::Underline),
    );
    TextRun::styled(node.text.clone().unwrap_or_default(), style)
}

fn embolden(blocks: &mut [Block]) {
    for block in blocks {
        match block {
            Block::Paragraph(p) => {
                for item in &mut p.content {
                    if let InlineContent::Text(run) = item {
                        run.style.bold = true;
                    }
                }
            }
            Block::Table(t) => {
                for row in &mut t.rows {
                    for cell in &mut row.cells {
                        embolden(&mut cell.content);
                    }
                }
            }
        }
    }
}

fn unsupported(node: &Node, parent: &NodeKind, location: &str) -> Error {
    Error::UnsupportedNode {
        node: node.kind.to_string(),
        parent: parent.to_string(),
        location: location.to_string(),
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssetStore;
    use crate::document::media::tests::png_header;
    use crate::model::{PaperHeader, QuestionKind};

    fn paper_with(questions: Vec<Question>) -> Paper {
        let mut paper = Paper::new().with_header(PaperHeader::titled("Midterm"));
        paper.questions = questions;
        paper
    }

    fn texts(doc: &ExamDocument) -> Vec<String> {
        doc.body.iter().map(Block::plain_text).collect()
    }

    #[test]
    fn test_title_block() {
        let mut header = PaperHeader::titled("Midterm");
        header.institution = "Springfield High".to_string();
        header.subject = "Maths".to_string();
        header.total_marks = 50;
        let paper = Paper::new().with_header(header);

        let doc = render(&paper, &RenderOptions::default(), &MemoryAssetStore::new()).unwrap();
        let lines = texts(&doc);
        assert_eq!(lines[0], "Springfield High");
        assert_eq!(lines[1], "Midterm");
        assert_eq!(lines[2], "Subject: Maths   |   Total Marks: 50");
        match &doc.body[3] {
            Block::Paragraph(p) => assert_eq!(p.style.bottom_border.as_deref(), Some("000000")),
            other => panic!("expected rule, got {:?}", other),
        }
        assert_eq!(doc.metadata.title.as_deref(), Some("Midterm"));
    }

    #[test]
    fn test_question_prefix_marks() {
        assert_eq!(question_prefix(1, 0).plain_text(), "Q1.");
        assert_eq!(question_prefix(2, 1).plain_text(), "Q2.  [1 mark]");
        assert_eq!(question_prefix(3, 5).plain_text(), "Q3.  [5 marks]");
    }

    #[test]
    fn test_section_headings() {
        let questions = ["", "", "Algebra", "Algebra"]
            .iter()
            .map(|s| Question::text(ContentTree::from_text("x")).with_section(*s))
            .collect();
        let doc = render(&paper_with(questions), &RenderOptions::default(), &MemoryAssetStore::new())
            .unwrap();

        let headings: Vec<_> = doc
            .body
            .iter()
            .enumerate()
            .filter(|(_, b)| matches!(b, Block::Paragraph(p) if p.is_heading()))
            .collect();
        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].1.plain_text(), "Algebra");
        let next = &doc.body[headings[0].0 + 1];
        assert!(next.plain_text().starts_with("Q3."));
    }

    #[test]
    fn test_section_repeats_after_unsectioned_question() {
        let questions = ["A", "", "A"]
            .iter()
            .map(|s| Question::text(ContentTree::from_text("x")).with_section(*s))
            .collect();
        let doc = render(&paper_with(questions), &RenderOptions::default(), &MemoryAssetStore::new())
            .unwrap();

        let headings: Vec<(usize, String)> = doc
            .body
            .iter()
            .enumerate()
            .filter(|(_, b)| matches!(b, Block::Paragraph(p) if p.is_heading()))
            .map(|(i, b)| (i, b.plain_text()))
            .collect();
        assert_eq!(headings.len(), 2);
        assert!(headings.iter().all(|(_, text)| text == "A"));
        assert!(doc.body[headings[0].0 + 1].plain_text().starts_with("Q1."));
        assert!(doc.body[headings[1].0 + 1].plain_text().starts_with("Q3."));
    }

    #[test]
    fn test_answer_key_marks_only_correct_option() {
        let q = Question::new_default(QuestionKind::Mcq)
            .set_correct_option(1)
            .unwrap();
        let paper = paper_with(vec![q]);
        let assets = MemoryAssetStore::new();

        let full = render(&paper, &RenderOptions::default(), &assets).unwrap();
        let key = render(&paper, &RenderOptions::answer_key(), &assets).unwrap();

        let full_lines = texts(&full);
        let key_lines = texts(&key);
        assert_eq!(full_lines.len(), key_lines.len());
        assert!(full_lines.iter().all(|l| !l.contains('✔')));
        let marked: Vec<_> = key_lines.iter().filter(|l| l.contains('✔')).collect();
        assert_eq!(marked, vec!["(B)   ✔"]);
    }

    #[test]
    fn test_answer_key_without_answers_matches_full() {
        let paper = paper_with(vec![Question::new_default(QuestionKind::Mcq)]);
        let assets = MemoryAssetStore::new();
        let full = render(&paper, &RenderOptions::default(), &assets).unwrap();
        let key = render(&paper, &RenderOptions::answer_key(), &assets).unwrap();
        assert_eq!(full, key);
    }

    #[test]
    fn test_missing_image() {
        let paper = paper_with(vec![Question::image("ghost.png", "")]);
        let err = render(&paper, &RenderOptions::default(), &MemoryAssetStore::new()).unwrap_err();
        assert!(matches!(err, Error::MissingAsset(ref name) if name == "ghost.png"));

        let paper = paper_with(vec![Question::new_default(QuestionKind::Image)]);
        let err = render(&paper, &RenderOptions::default(), &MemoryAssetStore::new()).unwrap_err();
        assert!(matches!(err, Error::MissingAsset(_)));
    }

    #[test]
    fn test_missing_logo() {
        let mut paper = paper_with(Vec::new());
        paper.style.logo_filename = Some("logo.png".to_string());
        let err = render(&paper, &RenderOptions::default(), &MemoryAssetStore::new()).unwrap_err();
        assert!(matches!(err, Error::MissingAsset(_)));
    }

    #[test]
    fn test_image_question_with_caption() {
        let assets = MemoryAssetStore::new()
            .with_asset("diagram.png", png_header(960, 480))
            .unwrap();
        let paper = paper_with(vec![Question::image("diagram.png", "Figure 1")]);
        let doc = render(&paper, &RenderOptions::default(), &assets).unwrap();

        assert_eq!(doc.media.len(), 1);
        let image = doc
            .body
            .iter()
            .find_map(|b| match b {
                Block::Paragraph(p) => p.content.iter().find_map(|c| match c {
                    InlineContent::Image(img) => Some(img.clone()),
                    _ => None,
                }),
                _ => None,
            })
            .unwrap();
        // 960 px = 10 in, shrunk to the 4 in box
        assert_eq!(image.width_emu, 4 * 914_400);
        assert_eq!(image.height_emu, 2 * 914_400);
        assert!(texts(&doc).contains(&"Figure 1".to_string()));
    }

    #[test]
    fn test_table_header_cells_are_bold() {
        let tree = ContentTree::new(Node::doc(vec![Node::table(vec![
            Node::row(vec![Node::header_cell(vec![Node::paragraph(vec![Node::text("Name")])])]),
            Node::row(vec![Node::cell(vec![Node::paragraph(vec![Node::text("Ada")])])]),
        ])]));
        let doc = render(
            &paper_with(vec![Question::table(tree)]),
            &RenderOptions::default(),
            &MemoryAssetStore::new(),
        )
        .unwrap();

        let table = doc
            .body
            .iter()
            .find_map(|b| match b {
                Block::Table(t) => Some(t),
                _ => None,
            })
            .unwrap();
        assert!(table.rows[0].is_header());
        assert!(!table.rows[1].is_header());
        match &table.rows[0].cells[0].content[0] {
            Block::Paragraph(p) => match &p.content[0] {
                InlineContent::Text(run) => assert!(run.style.bold),
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_invalid_paper_is_rejected_before_layout() {
        let mut paper = paper_with(Vec::new());
        paper.style.font_size = 30;
        let err = render(&paper, &RenderOptions::default(), &MemoryAssetStore::new()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
