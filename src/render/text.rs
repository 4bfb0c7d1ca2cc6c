//! Plain text rendering of laid-out documents.

use crate::document::{Block, ExamDocument, Paragraph};

const RULE_WIDTH: usize = 40;

/// Convert a laid-out document to plain text.
///
/// Headings are underlined, indented paragraphs keep a four-space indent,
/// table cells are tab-separated, and images appear as `[image: name]`.
pub fn to_text(doc: &ExamDocument) -> String {
    let mut lines: Vec<String> = Vec::new();

    for block in &doc.header {
        lines.push(block.plain_text());
    }
    if doc.has_header() {
        lines.push(String::new());
    }

    for block in &doc.body {
        match block {
            Block::Paragraph(p) => paragraph_lines(p, &mut lines),
            Block::Table(t) => lines.extend(t.plain_text().lines().map(str::to_string)),
        }
    }

    if doc.has_footer() {
        lines.push(String::new());
        for block in &doc.footer {
            lines.push(block.plain_text());
        }
    }

    let mut output = lines.join("\n").trim_end().to_string();
    output.push('\n');
    output
}

fn paragraph_lines(p: &Paragraph, lines: &mut Vec<String>) {
    if p.is_rule() {
        lines.push("-".repeat(RULE_WIDTH));
        return;
    }
    let text = p.plain_text();
    if p.is_heading() {
        let width = text.chars().count();
        lines.push(text);
        lines.push("=".repeat(width));
        return;
    }
    if p.style.indent_left.is_some() {
        lines.push(format!("    {}", text));
    } else {
        lines.push(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Table, TableCell, TableRow};

    #[test]
    fn test_to_text() {
        let mut doc = ExamDocument::new();
        doc.push(Paragraph::with_text("Midterm"));
        doc.push(Paragraph::heading("Algebra", 2));
        doc.push(Paragraph::with_text("(A) 4").indent(720));

        let text = to_text(&doc);
        assert_eq!(text, "Midterm\nAlgebra\n=======\n    (A) 4\n");
    }

    #[test]
    fn test_rule_and_table() {
        let mut doc = ExamDocument::new();
        doc.push(Paragraph::rule("000000"));

        let mut table = Table::new();
        table.add_row(TableRow::new(vec![
            TableCell::new(vec![Paragraph::with_text("x").into()]),
            TableCell::new(vec![Paragraph::with_text("y").into()]),
        ]));
        doc.push(table);

        let text = to_text(&doc);
        assert!(text.starts_with(&"-".repeat(RULE_WIDTH)));
        assert!(text.contains("x\ty"));
    }

    #[test]
    fn test_header_and_footer() {
        let mut doc = ExamDocument::new();
        doc.header.push(Paragraph::with_text("Confidential").into());
        doc.footer.push(Paragraph::with_text("Page footer").into());
        doc.push(Paragraph::with_text("Q1."));

        assert_eq!(to_text(&doc), "Confidential\n\nQ1.\n\nPage footer\n");
    }
}
