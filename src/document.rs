//! The document tree produced by a parse.
//!
//! A render turns raw markup into one [`Document`]: an owned tree of
//! [`Block`]s whose leaves are [`InlineNode`]s, plus the table of contents,
//! the collected footnotes, category tags, and an optional redirect target.
//! The tree is rebuilt on every render and never mutated in place.

/// A fully parsed document.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    /// Top-level blocks in source order.
    pub blocks: Vec<Block>,
    /// All headings, in document order, independent of collapse state.
    pub toc: Vec<TocEntry>,
    /// Footnotes in first-occurrence order (ids are 1-based).
    pub footnotes: Vec<Footnote>,
    /// Category tags (`[[분류:...]]`), consumed by the indexing layer.
    pub categories: Vec<String>,
    /// Target of a leading `#redirect` directive, if any.
    pub redirect: Option<LinkTarget>,
}

/// A block-level element.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Block {
    /// `= Title =` .. `====== Title ======`, optionally collapse-marked.
    Heading {
        /// Heading level, 1-6.
        level: usize,
        /// Dotted section number with trailing dot (`"2.1."`), if numbered.
        number: Option<String>,
        /// Anchor id (`"s-2.1"`), present iff `number` is.
        id: Option<String>,
        /// Whether the section is currently collapsed.
        collapsed: bool,
        /// Inline-parsed heading title.
        text: Vec<InlineNode>,
    },
    /// `* item`, depth taken from leading-space count.
    ListItem { depth: usize, content: Vec<InlineNode> },
    /// A `||`-grid.
    Table(Table),
    /// `> quoted line`.
    BlockQuote(Vec<InlineNode>),
    /// Four or more `-` alone on a line.
    HorizontalRule,
    /// `{{{#!raw ...}}}` region, content verbatim.
    RawBlock(String),
    /// `{{{#!wiki style="..." ...}}}` region with nested blocks.
    StyledContainer {
        /// CSS declarations from the `style="..."` attribute.
        style: Vec<(String, String)>,
        children: Vec<Block>,
    },
    /// `{{{#!folding title ...}}}` collapsible region.
    FoldingSection { summary: String, children: Vec<Block> },
    /// `[목차]` site where the TOC box renders.
    TocPlaceholder,
    /// `[clearfix]`.
    ClearFix,
    /// `#redirect target` line.
    RedirectDirective { target: LinkTarget, exists: bool },
    /// Any other non-empty line, inline-parsed.
    Paragraph(Vec<InlineNode>),
    /// An empty source line (renders as a line break).
    Blank,
}

/// An inline-level node. Self-similar: most variants own child nodes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InlineNode {
    /// Plain text.
    Text(String),
    /// `'''bold'''`
    Bold(Vec<InlineNode>),
    /// `''italic''`
    Italic(Vec<InlineNode>),
    /// `__underline__`
    Underline(Vec<InlineNode>),
    /// `~~strike~~` or `--strike--`
    Strike(Vec<InlineNode>),
    /// `^^superscript^^`
    Superscript(Vec<InlineNode>),
    /// `,,subscript,,`
    Subscript(Vec<InlineNode>),
    /// `{{{#color ...}}}`, color already normalized.
    ColoredSpan { color: String, children: Vec<InlineNode> },
    /// `{{{+1 ...}}}` .. `{{{-5 ...}}}`; step is -5..=+5, never 0.
    SizedSpan { step: i8, children: Vec<InlineNode> },
    /// `{{{#!raw ...}}}` used inline; content verbatim.
    RawSpan(String),
    /// `[br]`
    LineBreak,
    /// `[[slug#anchor|label]]` to a wiki page.
    InternalLink {
        target: LinkTarget,
        /// Whether the target slug was in the render's existing-slug set.
        exists: bool,
        /// Label nodes; defaults to the target text when no `|label`.
        label: Vec<InlineNode>,
    },
    /// `[[https://...|label]]` or a `!NW:` cross-wiki link.
    ExternalLink { url: String, label: Vec<InlineNode> },
    /// `[[파일:name.png|width=..|align=..]]`
    Image {
        filename: String,
        width: Option<String>,
        align: ImageAlign,
    },
    /// `[* content]` / `[*label content]`; content lives in
    /// [`Document::footnotes`] under the same id.
    FootnoteRef { id: usize, label: String },
    /// `[youtube(id, width=.., height=..)]`
    YoutubeEmbed {
        video_id: String,
        width: String,
        height: String,
    },
    /// `[include(slug, key=value, ...)]`, resolved or failed.
    Include(Include),
    /// Block content embedded in inline flow (`{{{#!wiki}}}` or
    /// `{{{#!folding}}}` inside a line or table cell).
    Embedded(Box<Block>),
}

/// A slug plus optional `#anchor`, split on the first `#`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkTarget {
    pub slug: String,
    pub anchor: Option<String>,
}

impl LinkTarget {
    /// Split `slug#anchor` on the first `#`.
    pub fn split(raw: &str) -> Self {
        match raw.split_once('#') {
            Some((slug, anchor)) => Self {
                slug: slug.trim().to_string(),
                anchor: Some(anchor.to_string()),
            },
            None => Self {
                slug: raw.trim().to_string(),
                anchor: None,
            },
        }
    }
}

/// Image alignment from the `align=` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImageAlign {
    #[default]
    Inline,
    Left,
    Center,
    Right,
}

/// The outcome of one inclusion directive.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Include {
    /// An ordinary transclusion, recursively parsed.
    Document { slug: String, blocks: Vec<Block> },
    /// `틀:상세 내용` — "see also" cross-reference line.
    Detail { target: String, exists: bool },
    /// `틀:상위 문서` — "parent document" line.
    Parent { target: String, exists: bool },
    /// `틀:다른 뜻` — disambiguation list.
    Disambiguation { entries: Vec<DisambigEntry> },
    /// The fetch returned no content.
    Failed { slug: String },
    /// Depth limit reached or cycle detected; renders nothing.
    Skipped { slug: String },
}

/// One disambiguation line: "for <description>, see <target>".
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisambigEntry {
    pub description: String,
    pub target: String,
    pub exists: bool,
}

/// One table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    /// Anchor id, e.g. `"s-2.1"`.
    pub id: String,
    /// Raw heading text (not inline-parsed).
    pub text: String,
    /// Heading level, 1-6.
    pub level: usize,
    /// Dotted number string with trailing dot, e.g. `"2.1."`.
    pub number: String,
}

/// A collected footnote.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Footnote {
    /// 1-based id in first-occurrence order.
    pub id: usize,
    /// Display label: custom text, or the id rendered as decimal.
    pub label: String,
    /// Inline-parsed footnote body.
    pub content: Vec<InlineNode>,
}

/// A parsed table: grid of styled cells plus table-wide and per-column
/// style contributions.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    pub rows: Vec<TableRow>,
    /// Column-scoped styles by cell index; sparse entries stay default.
    pub columns: Vec<StripeStyle>,
    pub style: TableStyle,
}

/// One table row: its cells plus the row-scoped style contribution.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    pub style: StripeStyle,
}

/// One table cell.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableCell {
    pub content: Vec<InlineNode>,
    /// `<-N>`, clamped to >= 1.
    pub col_span: u32,
    /// `<|N>` / `<^|N>` / `<v|N>`, clamped to >= 1.
    pub row_span: u32,
    pub style: CellStyle,
}

/// Style owned by a single cell. Wins over row and column styles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellStyle {
    pub background: Option<String>,
    pub foreground: Option<String>,
    pub align: Option<TextAlign>,
    pub vertical_align: Option<VerticalAlign>,
    pub width: Option<String>,
    pub height: Option<String>,
    /// `<nopad>`
    pub no_padding: bool,
}

/// Row- or column-scoped style contribution (`<rowbgcolor=..>` family).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StripeStyle {
    pub background: Option<String>,
    pub foreground: Option<String>,
}

impl StripeStyle {
    pub fn is_empty(&self) -> bool {
        self.background.is_none() && self.foreground.is_none()
    }

    /// Overlay `other` on top of `self`, field-wise.
    pub fn merge_from(&mut self, other: &StripeStyle) {
        if other.background.is_some() {
            self.background = other.background.clone();
        }
        if other.foreground.is_some() {
            self.foreground = other.foreground.clone();
        }
    }
}

/// Table-wide style; contributions from any cell apply to the whole table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableStyle {
    pub border_color: Option<String>,
    pub background: Option<String>,
    pub width: Option<String>,
    pub align: Option<TableAlign>,
}

impl TableStyle {
    /// Overlay `other` on top of `self`, field-wise.
    pub fn merge_from(&mut self, other: &TableStyle) {
        if other.border_color.is_some() {
            self.border_color = other.border_color.clone();
        }
        if other.background.is_some() {
            self.background = other.background.clone();
        }
        if other.width.is_some() {
            self.width = other.width.clone();
        }
        if other.align.is_some() {
            self.align = other.align;
        }
    }
}

/// Horizontal cell alignment (`<(>` / `<:>` / `<)>` or inferred from
/// flanking spaces).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Vertical cell alignment (`<^|N>` / `<|N>` / `<v|N>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VerticalAlign {
    Top,
    Middle,
    Bottom,
}

/// Whole-table placement (`<tablealign=..>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TableAlign {
    Left,
    Center,
    Right,
}

impl InlineNode {
    /// Plain-text convenience constructor.
    pub fn text(s: impl Into<String>) -> Self {
        InlineNode::Text(s.into())
    }

    /// Whether this node or any descendant is an [`InlineNode::Image`].
    /// External links drop their glyph when the label embeds an image.
    pub fn embeds_image(&self) -> bool {
        match self {
            InlineNode::Image { .. } => true,
            InlineNode::Bold(children)
            | InlineNode::Italic(children)
            | InlineNode::Underline(children)
            | InlineNode::Strike(children)
            | InlineNode::Superscript(children)
            | InlineNode::Subscript(children)
            | InlineNode::ColoredSpan { children, .. }
            | InlineNode::SizedSpan { children, .. }
            | InlineNode::InternalLink { label: children, .. }
            | InlineNode::ExternalLink { label: children, .. } => {
                children.iter().any(InlineNode::embeds_image)
            }
            _ => false,
        }
    }
}
