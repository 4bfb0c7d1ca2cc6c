//! Rich-text content trees.
//!
//! A content tree is the interchange form produced by the question editor: a
//! tagged-node tree (`{"type": "doc", "content": [...]}`) holding paragraphs,
//! styled text runs, inline images, and tables. Trees are plain values. Edits
//! build a new tree, and the renderer only ever borrows them.
//!
//! The grammar is closed:
//!
//! ```text
//! doc        := block*
//! block      := paragraph | table
//! paragraph  := inline*
//! inline     := text | image
//! table      := tableRow*
//! tableRow   := (tableCell | tableHeader)*
//! tableCell  := block*
//! ```
//!
//! Unknown kinds still deserialize (and serialize back unchanged) so a tree
//! can be loaded, inspected, and reported on; [`ContentTree::validate`] is what
//! rejects them.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Kind tag of a content node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    /// Root of every tree
    Doc,
    /// Block of inline content
    Paragraph,
    /// Leaf text run
    Text,
    /// Inline image referencing a stored asset
    Image,
    /// Table of rows
    Table,
    /// Row of cells
    TableRow,
    /// Body cell
    TableCell,
    /// Header cell
    TableHeader,
    /// Anything outside the grammar (kept verbatim)
    Other(String),
}

impl NodeKind {
    /// The interchange tag for this kind.
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Doc => "doc",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Text => "text",
            NodeKind::Image => "image",
            NodeKind::Table => "table",
            NodeKind::TableRow => "tableRow",
            NodeKind::TableCell => "tableCell",
            NodeKind::TableHeader => "tableHeader",
            NodeKind::Other(s) => s,
        }
    }

    /// Whether the kind may appear where a block is expected.
    pub fn is_block(&self) -> bool {
        matches!(self, NodeKind::Paragraph | NodeKind::Table)
    }

    /// Whether the kind may appear inside a paragraph.
    pub fn is_inline(&self) -> bool {
        matches!(self, NodeKind::Text | NodeKind::Image)
    }

    /// Whether the kind is a table cell of either flavour.
    pub fn is_cell(&self) -> bool {
        matches!(self, NodeKind::TableCell | NodeKind::TableHeader)
    }
}

impl From<String> for NodeKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "doc" => NodeKind::Doc,
            "paragraph" => NodeKind::Paragraph,
            "text" => NodeKind::Text,
            "image" => NodeKind::Image,
            "table" => NodeKind::Table,
            "tableRow" => NodeKind::TableRow,
            "tableCell" => NodeKind::TableCell,
            "tableHeader" => NodeKind::TableHeader,
            _ => NodeKind::Other(s),
        }
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind tag of a text mark.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarkKind {
    /// Bold
    Bold,
    /// Italic
    Italic,
    /// Underline
    Underline,
    /// Unsupported mark (kept verbatim)
    Other(String),
}

impl MarkKind {
    /// The interchange tag for this mark.
    pub fn as_str(&self) -> &str {
        match self {
            MarkKind::Bold => "bold",
            MarkKind::Italic => "italic",
            MarkKind::Underline => "underline",
            MarkKind::Other(s) => s,
        }
    }
}

impl From<String> for MarkKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "bold" => MarkKind::Bold,
            "italic" => MarkKind::Italic,
            "underline" => MarkKind::Underline,
            _ => MarkKind::Other(s),
        }
    }
}

impl From<MarkKind> for String {
    fn from(kind: MarkKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A style mark applied to a text run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    /// Mark kind
    #[serde(rename = "type")]
    pub kind: MarkKind,

    /// Extra attributes (preserved, not interpreted)
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attrs: Map<String, Value>,
}

impl Mark {
    /// Create a mark without attributes.
    pub fn new(kind: MarkKind) -> Self {
        Self {
            kind,
            attrs: Map::new(),
        }
    }
}

/// A node of a content tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node kind
    #[serde(rename = "type")]
    pub kind: NodeKind,

    /// Literal text (text nodes only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Style marks (text nodes only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,

    /// Node attributes, e.g. `src` for images
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attrs: Map<String, Value>,

    /// Child nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,
}

impl Node {
    /// Create a node of the given kind with children.
    pub fn new(kind: NodeKind, content: Vec<Node>) -> Self {
        Self {
            kind,
            text: None,
            marks: Vec::new(),
            attrs: Map::new(),
            content,
        }
    }

    /// Create a `doc` root.
    pub fn doc(blocks: Vec<Node>) -> Self {
        Self::new(NodeKind::Doc, blocks)
    }

    /// Create a paragraph.
    pub fn paragraph(inlines: Vec<Node>) -> Self {
        Self::new(NodeKind::Paragraph, inlines)
    }

    /// Create an unstyled text run.
    pub fn text(text: impl Into<String>) -> Self {
        let mut node = Self::new(NodeKind::Text, Vec::new());
        node.text = Some(text.into());
        node
    }

    /// Create a text run with marks.
    pub fn styled_text(text: impl Into<String>, marks: &[MarkKind]) -> Self {
        let mut node = Self::text(text);
        node.marks = marks.iter().cloned().map(Mark::new).collect();
        node
    }

    /// Create an inline image pointing at an asset.
    pub fn image(src: impl Into<String>) -> Self {
        let mut node = Self::new(NodeKind::Image, Vec::new());
        node.attrs.insert("src".to_string(), Value::String(src.into()));
        node
    }

    /// Create a table.
    pub fn table(rows: Vec<Node>) -> Self {
        Self::new(NodeKind::Table, rows)
    }

    /// Create a table row.
    pub fn row(cells: Vec<Node>) -> Self {
        Self::new(NodeKind::TableRow, cells)
    }

    /// Create a body cell.
    pub fn cell(blocks: Vec<Node>) -> Self {
        Self::new(NodeKind::TableCell, blocks)
    }

    /// Create a header cell.
    pub fn header_cell(blocks: Vec<Node>) -> Self {
        Self::new(NodeKind::TableHeader, blocks)
    }

    /// Whether the node carries the given mark.
    pub fn has_mark(&self, kind: &MarkKind) -> bool {
        self.marks.iter().any(|m| &m.kind == kind)
    }

    /// Raw `src` attribute of an image node.
    pub fn src(&self) -> Option<&str> {
        self.attrs.get("src").and_then(Value::as_str)
    }

    /// Asset filename referenced by an image node.
    ///
    /// Editors store either a bare filename or an upload URL such as
    /// `/api/uploads/<name>`; the last path segment is the asset name.
    pub fn image_filename(&self) -> Option<&str> {
        let src = self.src()?;
        let name = src.rsplit('/').next().unwrap_or(src);
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(ref text) = self.text {
            out.push_str(text);
        }
        for child in &self.content {
            child.collect_text(out);
        }
    }
}

/// A validated-on-demand rich-text document rooted at a `doc` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentTree {
    root: Node,
}

impl ContentTree {
    /// Wrap a root node. The root is checked by [`ContentTree::validate`].
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// A document holding a single empty paragraph.
    pub fn empty() -> Self {
        Self::new(Node::doc(vec![Node::paragraph(Vec::new())]))
    }

    /// A document holding one paragraph of plain text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(Node::doc(vec![Node::paragraph(vec![Node::text(text)])]))
    }

    /// The root node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Top-level blocks.
    pub fn blocks(&self) -> &[Node] {
        &self.root.content
    }

    /// Plain text of the whole tree, paragraphs joined by newlines.
    pub fn plain_text(&self) -> String {
        self.root
            .content
            .iter()
            .map(Node::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Asset filenames of every image node, in document order.
    pub fn image_refs(&self) -> Vec<&str> {
        fn walk<'a>(node: &'a Node, out: &mut Vec<&'a str>) {
            if node.kind == NodeKind::Image {
                if let Some(name) = node.image_filename() {
                    out.push(name);
                }
            }
            for child in &node.content {
                walk(child, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.root, &mut out);
        out
    }

    /// Check the tree against the content grammar.
    pub fn validate(&self) -> Result<()> {
        self.validate_at("content")
    }

    /// Check the tree, reporting errors relative to `location`.
    pub fn validate_at(&self, location: &str) -> Result<()> {
        if self.root.kind != NodeKind::Doc {
            return Err(unsupported(&self.root.kind, "root", location));
        }
        check_bare(&self.root, location)?;
        check_children(&self.root, Slot::Block, location)
    }

    /// Serialize to the JSON interchange form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from the JSON interchange form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for ContentTree {
    fn default() -> Self {
        Self::empty()
    }
}

/// Which kinds a parent admits as children.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Block,
    Inline,
    Row,
    Cell,
}

impl Slot {
    fn admits(self, kind: &NodeKind) -> bool {
        match self {
            Slot::Block => kind.is_block(),
            Slot::Inline => kind.is_inline(),
            Slot::Row => *kind == NodeKind::TableRow,
            Slot::Cell => kind.is_cell(),
        }
    }
}

fn check_children(node: &Node, slot: Slot, path: &str) -> Result<()> {
    for (i, child) in node.content.iter().enumerate() {
        let child_path = format!("{}/{}[{}]", path, child.kind, i);
        if !slot.admits(&child.kind) {
            return Err(unsupported(&child.kind, node.kind.as_str(), &child_path));
        }
        check_node(child, &child_path)?;
    }
    Ok(())
}

fn check_node(node: &Node, path: &str) -> Result<()> {
    match &node.kind {
        NodeKind::Text => {
            if node.text.is_none() {
                return Err(Error::validation(format!("{}: text node without text", path)));
            }
            if let Some(child) = node.content.first() {
                return Err(unsupported(&child.kind, "text", path));
            }
            for mark in &node.marks {
                if let MarkKind::Other(name) = &mark.kind {
                    return Err(Error::UnsupportedNode {
                        node: format!("{} mark", name),
                        parent: "text".to_string(),
                        location: path.to_string(),
                    });
                }
            }
            Ok(())
        }
        NodeKind::Image => {
            check_bare(node, path)?;
            if let Some(child) = node.content.first() {
                return Err(unsupported(&child.kind, "image", path));
            }
            if node.image_filename().is_none() {
                return Err(Error::validation(format!("{}: image node without src", path)));
            }
            Ok(())
        }
        NodeKind::Paragraph => {
            check_bare(node, path)?;
            check_children(node, Slot::Inline, path)
        }
        NodeKind::Table => {
            check_bare(node, path)?;
            check_children(node, Slot::Row, path)
        }
        NodeKind::TableRow => {
            check_bare(node, path)?;
            check_children(node, Slot::Cell, path)
        }
        NodeKind::TableCell | NodeKind::TableHeader => {
            check_bare(node, path)?;
            check_children(node, Slot::Block, path)
        }
        // Callers only reach here through a slot, and no slot admits these.
        NodeKind::Doc | NodeKind::Other(_) => Err(unsupported(&node.kind, "content", path)),
    }
}

/// Non-text nodes carry neither text nor marks.
fn check_bare(node: &Node, path: &str) -> Result<()> {
    if let Some(mark) = node.marks.first() {
        return Err(Error::UnsupportedNode {
            node: format!("{} mark", mark.kind.as_str()),
            parent: node.kind.to_string(),
            location: path.to_string(),
        });
    }
    if node.text.is_some() {
        return Err(Error::validation(format!(
            "{}: '{}' node cannot hold text",
            path, node.kind
        )));
    }
    Ok(())
}

fn unsupported(kind: &NodeKind, parent: &str, location: &str) -> Error {
    Error::UnsupportedNode {
        node: kind.to_string(),
        parent: parent.to_string(),
        location: location.to_string(),
    }
}
