//! HTML rendering over the document tree.
//!
//! The renderer is the reference consumer of every node type. Output is
//! semantic HTML with `wiki-*` classes; colors, sizes, and alignment ride
//! in `style` attributes since they come from the markup itself. Nothing
//! here feeds back into parsing.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::document::{
    Block, CellStyle, Document, ImageAlign, Include, InlineNode, LinkTarget, StripeStyle, Table,
    TableAlign, TextAlign, VerticalAlign,
};

/// `encodeURIComponent`-compatible escape set for slug URLs.
pub const COMPONENT_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Font-size factors for `{{{+N ...}}}` / `{{{-N ...}}}` spans.
const SIZE_EM: [(i8, &str); 10] = [
    (1, "1.28889em"),
    (2, "1.38889em"),
    (3, "1.48144em"),
    (4, "1.57400em"),
    (5, "1.66667em"),
    (-1, "0.92589em"),
    (-2, "0.83333em"),
    (-3, "0.74067em"),
    (-4, "0.64811em"),
    (-5, "0.62222em"),
];

fn size_em(step: i8) -> &'static str {
    SIZE_EM
        .iter()
        .find(|(candidate, _)| *candidate == step)
        .map(|(_, em)| *em)
        .unwrap_or("1em")
}

/// HTML output writer with a pre-sized, append-only buffer.
pub struct HtmlWriter {
    out: String,
}

impl HtmlWriter {
    /// Create with capacity based on expected input size.
    #[inline]
    pub fn with_capacity_for(input_len: usize) -> Self {
        Self {
            out: String::with_capacity(input_len + input_len / 2),
        }
    }

    /// Write a raw string without escaping.
    #[inline]
    pub fn raw(&mut self, s: &str) {
        self.out.push_str(s);
    }

    /// Write text content, HTML-escaped.
    #[inline]
    pub fn text(&mut self, s: &str) {
        html_escape::encode_text_to_string(s, &mut self.out);
    }

    /// Write an attribute value, escaped for a double-quoted attribute.
    #[inline]
    pub fn attr(&mut self, s: &str) {
        html_escape::encode_double_quoted_attribute_to_string(s, &mut self.out);
    }

    /// Consume the writer, returning the HTML.
    pub fn into_string(self) -> String {
        self.out
    }
}

/// Render a parsed document to HTML, footnote list included.
pub fn render(doc: &Document) -> String {
    let mut w = HtmlWriter::with_capacity_for(1024);
    for block in &doc.blocks {
        render_block(block, doc, &mut w);
    }
    render_footnotes(doc, &mut w);
    w.into_string()
}

fn render_block(block: &Block, doc: &Document, w: &mut HtmlWriter) {
    match block {
        Block::Heading {
            level,
            number,
            id,
            collapsed,
            text,
        } => {
            w.raw(&format!("<h{level}"));
            if let Some(id) = id {
                w.raw(" id=\"");
                w.attr(id);
                w.raw("\"");
            }
            w.raw(" class=\"wiki-heading");
            if *collapsed {
                w.raw(" wiki-heading-collapsed");
            }
            w.raw("\">");
            if let (Some(number), Some(id)) = (number, id) {
                w.raw("<a class=\"wiki-section-number\" href=\"#");
                w.attr(id);
                w.raw("\">");
                w.text(number);
                w.raw("</a> ");
            }
            render_inline_all(text, doc, w);
            w.raw(&format!("</h{level}>\n"));
        }
        Block::ListItem { depth, content } => {
            w.raw(&format!(
                "<div class=\"wiki-list-item\" style=\"margin-left:{}px\"><span class=\"wiki-bullet\"></span>",
                depth * 20
            ));
            render_inline_all(content, doc, w);
            w.raw("</div>\n");
        }
        Block::Table(table) => render_table(table, doc, w),
        Block::BlockQuote(content) => {
            w.raw("<blockquote class=\"wiki-quote\">");
            render_inline_all(content, doc, w);
            w.raw("</blockquote>\n");
        }
        Block::HorizontalRule => w.raw("<hr>\n"),
        Block::RawBlock(content) => {
            w.raw("<pre class=\"wiki-raw\">");
            w.text(content);
            w.raw("</pre>\n");
        }
        Block::StyledContainer { style, children } => {
            w.raw("<div class=\"wiki-block\"");
            write_css_style(style, w);
            w.raw(">\n");
            for child in children {
                render_block(child, doc, w);
            }
            w.raw("</div>\n");
        }
        Block::FoldingSection { summary, children } => {
            w.raw("<details class=\"wiki-folding\"><summary>");
            w.text(summary);
            w.raw("</summary>\n");
            for child in children {
                render_block(child, doc, w);
            }
            w.raw("</details>\n");
        }
        Block::TocPlaceholder => render_toc(doc, w),
        Block::ClearFix => w.raw("<div style=\"clear:both\"></div>\n"),
        Block::RedirectDirective { target, exists } => {
            w.raw("<div class=\"wiki-paragraph\">#redirect ");
            render_internal_link(target, *exists, None, doc, w);
            w.raw("</div>\n");
        }
        Block::Paragraph(content) => {
            w.raw("<div class=\"wiki-paragraph\">");
            render_inline_all(content, doc, w);
            w.raw("</div>\n");
        }
        Block::Blank => w.raw("<br>\n"),
    }
}

fn render_toc(doc: &Document, w: &mut HtmlWriter) {
    if doc.toc.is_empty() {
        return;
    }
    w.raw("<div class=\"wiki-toc\">\n<div class=\"wiki-toc-heading\">목차</div>\n");
    for entry in &doc.toc {
        w.raw(&format!(
            "<div class=\"wiki-toc-item\" style=\"padding-left:{}px\"><a href=\"#",
            entry.level.saturating_sub(1) * 15
        ));
        w.attr(&entry.id);
        w.raw("\">");
        w.text(&entry.number);
        w.raw("</a> ");
        w.text(&entry.text);
        w.raw("</div>\n");
    }
    w.raw("</div>\n");
}

fn render_footnotes(doc: &Document, w: &mut HtmlWriter) {
    if doc.footnotes.is_empty() {
        return;
    }
    w.raw("<div class=\"wiki-footnotes\">\n");
    for footnote in &doc.footnotes {
        w.raw(&format!(
            "<div class=\"wiki-footnote\" id=\"fn-{}\"><a href=\"#r-{}\">[",
            footnote.id, footnote.id
        ));
        w.text(&footnote.label);
        w.raw("]</a> ");
        render_inline_all(&footnote.content, doc, w);
        w.raw("</div>\n");
    }
    w.raw("</div>\n");
}

fn render_inline_all(nodes: &[InlineNode], doc: &Document, w: &mut HtmlWriter) {
    for node in nodes {
        render_inline(node, doc, w);
    }
}

fn render_inline(node: &InlineNode, doc: &Document, w: &mut HtmlWriter) {
    match node {
        InlineNode::Text(text) => w.text(text),
        InlineNode::Bold(children) => wrap_tag("b", children, doc, w),
        InlineNode::Italic(children) => wrap_tag("i", children, doc, w),
        InlineNode::Underline(children) => wrap_tag("u", children, doc, w),
        InlineNode::Strike(children) => wrap_tag("del", children, doc, w),
        InlineNode::Superscript(children) => wrap_tag("sup", children, doc, w),
        InlineNode::Subscript(children) => wrap_tag("sub", children, doc, w),
        InlineNode::ColoredSpan { color, children } => {
            w.raw("<span style=\"color:");
            w.attr(color);
            w.raw("\">");
            render_inline_all(children, doc, w);
            w.raw("</span>");
        }
        InlineNode::SizedSpan { step, children } => {
            w.raw(&format!("<span style=\"font-size:{}\">", size_em(*step)));
            render_inline_all(children, doc, w);
            w.raw("</span>");
        }
        InlineNode::RawSpan(text) => {
            w.raw("<span class=\"wiki-raw\" style=\"white-space:pre-wrap\">");
            w.text(text);
            w.raw("</span>");
        }
        InlineNode::LineBreak => w.raw("<br>"),
        InlineNode::InternalLink {
            target,
            exists,
            label,
        } => render_internal_link(target, *exists, Some(label.as_slice()), doc, w),
        InlineNode::ExternalLink { url, label } => {
            w.raw("<a class=\"wiki-link-external\" href=\"");
            w.attr(url);
            w.raw("\" target=\"_blank\" rel=\"noreferrer\">");
            if !label.iter().any(InlineNode::embeds_image) {
                w.raw("<span class=\"wiki-external-icon\"></span>");
            }
            render_inline_all(label, doc, w);
            w.raw("</a>");
        }
        InlineNode::Image {
            filename,
            width,
            align,
        } => {
            let align_class = match align {
                ImageAlign::Inline => "",
                ImageAlign::Left => " wiki-image-left",
                ImageAlign::Center => " wiki-image-center",
                ImageAlign::Right => " wiki-image-right",
            };
            w.raw(&format!("<span class=\"wiki-image{align_class}\"><img src=\"/uploads/"));
            w.raw(&utf8_percent_encode(filename, COMPONENT_ENCODE).to_string());
            w.raw("\" alt=\"");
            w.attr(filename);
            w.raw("\"");
            if let Some(width) = width {
                w.raw(" style=\"width:");
                w.attr(width);
                w.raw("\"");
            }
            w.raw("></span>");
        }
        InlineNode::FootnoteRef { id, label } => {
            w.raw(&format!(
                "<sup class=\"wiki-footnote-ref\"><a id=\"r-{id}\" href=\"#fn-{id}\">["
            ));
            w.text(label);
            w.raw("]</a></sup>");
        }
        InlineNode::YoutubeEmbed {
            video_id,
            width,
            height,
        } => {
            w.raw("<iframe class=\"wiki-youtube\" src=\"https://www.youtube.com/embed/");
            w.attr(video_id);
            w.raw("\" width=\"");
            w.attr(width.trim_end_matches("px"));
            w.raw("\" height=\"");
            w.attr(height.trim_end_matches("px"));
            w.raw("\" allowfullscreen></iframe>");
        }
        InlineNode::Include(include) => render_include(include, doc, w),
        InlineNode::Embedded(block) => render_block(block, doc, w),
    }
}

fn wrap_tag(tag: &str, children: &[InlineNode], doc: &Document, w: &mut HtmlWriter) {
    w.raw(&format!("<{tag}>"));
    render_inline_all(children, doc, w);
    w.raw(&format!("</{tag}>"));
}

fn render_internal_link(
    target: &LinkTarget,
    exists: bool,
    label: Option<&[InlineNode]>,
    doc: &Document,
    w: &mut HtmlWriter,
) {
    let class = if exists {
        "wiki-link"
    } else {
        "wiki-link wiki-link-missing"
    };
    w.raw(&format!("<a class=\"{class}\" href=\"/w/"));
    w.raw(&utf8_percent_encode(&target.slug, COMPONENT_ENCODE).to_string());
    if let Some(anchor) = &target.anchor {
        w.raw("#");
        w.attr(anchor);
    }
    w.raw("\" title=\"");
    w.attr(&target.slug);
    w.raw("\">");
    match label {
        Some(label) => render_inline_all(label, doc, w),
        None => w.text(&target.slug),
    }
    w.raw("</a>");
}

fn render_include(include: &Include, doc: &Document, w: &mut HtmlWriter) {
    match include {
        Include::Document { blocks, .. } => {
            w.raw("<span class=\"wiki-include\">");
            for block in blocks {
                render_block(block, doc, w);
            }
            w.raw("</span>");
        }
        Include::Detail { target, exists } => {
            w.raw("<div class=\"wiki-template wiki-template-detail\">자세한 내용은 ");
            render_internal_link(&LinkTarget::split(target), *exists, None, doc, w);
            w.raw(" 문서를 참고하십시오.</div>");
        }
        Include::Parent { target, exists } => {
            w.raw("<div class=\"wiki-template wiki-template-parent\">상위 문서: ");
            render_internal_link(&LinkTarget::split(target), *exists, None, doc, w);
            w.raw("</div>");
        }
        Include::Disambiguation { entries } => {
            if entries.is_empty() {
                return;
            }
            w.raw("<div class=\"wiki-template wiki-template-disambig\">");
            for entry in entries {
                w.raw("<div>");
                w.text(&entry.description);
                w.raw("에 대한 내용은 ");
                render_internal_link(&LinkTarget::split(&entry.target), entry.exists, None, doc, w);
                w.raw(" 문서를 참고하십시오.</div>");
            }
            w.raw("</div>");
        }
        Include::Failed { slug } => {
            w.raw("<span class=\"wiki-include-error\">[Include Error: ");
            w.text(slug);
            w.raw("]</span>");
        }
        Include::Skipped { .. } => {}
    }
}

fn render_table(table: &Table, doc: &Document, w: &mut HtmlWriter) {
    let align_class = match table.style.align {
        Some(TableAlign::Left) => " wiki-table-left",
        Some(TableAlign::Right) => " wiki-table-right",
        Some(TableAlign::Center) => " wiki-table-center",
        None => "",
    };
    w.raw(&format!("<div class=\"wiki-table-wrap{align_class}\">\n<table class=\"wiki-table\""));

    let mut table_css = String::new();
    if let Some(color) = &table.style.border_color {
        push_css(&mut table_css, "border-color", color);
    }
    if let Some(color) = &table.style.background {
        push_css(&mut table_css, "background-color", color);
    }
    if let Some(width) = &table.style.width {
        push_css(&mut table_css, "width", width);
    }
    if !table_css.is_empty() {
        w.raw(" style=\"");
        w.attr(&table_css);
        w.raw("\"");
    }
    w.raw(">\n");

    if !table.columns.is_empty() {
        w.raw("<colgroup>");
        for column in &table.columns {
            let mut css = String::new();
            if let Some(color) = &column.background {
                push_css(&mut css, "background-color", color);
            }
            if let Some(color) = &column.foreground {
                push_css(&mut css, "color", color);
            }
            if css.is_empty() {
                w.raw("<col>");
            } else {
                w.raw("<col style=\"");
                w.attr(&css);
                w.raw("\">");
            }
        }
        w.raw("</colgroup>\n");
    }

    for row in &table.rows {
        w.raw("<tr");
        let mut row_css = String::new();
        if let Some(color) = &row.style.background {
            push_css(&mut row_css, "background-color", color);
        }
        if let Some(color) = &row.style.foreground {
            push_css(&mut row_css, "color", color);
        }
        if !row_css.is_empty() {
            w.raw(" style=\"");
            w.attr(&row_css);
            w.raw("\"");
        }
        w.raw(">");
        for (cell_index, cell) in row.cells.iter().enumerate() {
            w.raw("<td");
            if cell.col_span > 1 {
                w.raw(&format!(" colspan=\"{}\"", cell.col_span));
            }
            if cell.row_span > 1 {
                w.raw(&format!(" rowspan=\"{}\"", cell.row_span));
            }
            let column = table.columns.get(cell_index);
            let css = cell_css(column, &row.style, &cell.style);
            if !css.is_empty() {
                w.raw(" style=\"");
                w.attr(&css);
                w.raw("\"");
            }
            w.raw(">");
            render_inline_all(&cell.content, doc, w);
            w.raw("</td>");
        }
        w.raw("</tr>\n");
    }
    w.raw("</table>\n</div>\n");
}

/// Merge column < row < cell styles into one declaration string.
fn cell_css(column: Option<&StripeStyle>, row: &StripeStyle, cell: &CellStyle) -> String {
    let mut background = column.and_then(|column| column.background.as_deref());
    let mut foreground = column.and_then(|column| column.foreground.as_deref());
    if let Some(color) = row.background.as_deref() {
        background = Some(color);
    }
    if let Some(color) = row.foreground.as_deref() {
        foreground = Some(color);
    }
    if let Some(color) = cell.background.as_deref() {
        background = Some(color);
    }
    if let Some(color) = cell.foreground.as_deref() {
        foreground = Some(color);
    }

    let mut css = String::new();
    if let Some(color) = background {
        push_css(&mut css, "background-color", color);
    }
    if let Some(color) = foreground {
        push_css(&mut css, "color", color);
    }
    if let Some(align) = cell.align {
        let value = match align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        };
        push_css(&mut css, "text-align", value);
    }
    if let Some(valign) = cell.vertical_align {
        let value = match valign {
            VerticalAlign::Top => "top",
            VerticalAlign::Middle => "middle",
            VerticalAlign::Bottom => "bottom",
        };
        push_css(&mut css, "vertical-align", value);
    }
    if let Some(width) = &cell.width {
        push_css(&mut css, "width", width);
    }
    if let Some(height) = &cell.height {
        push_css(&mut css, "height", height);
    }
    if cell.no_padding {
        push_css(&mut css, "padding", "0");
    }
    css
}

fn push_css(css: &mut String, key: &str, value: &str) {
    if !css.is_empty() {
        css.push(';');
    }
    css.push_str(key);
    css.push(':');
    css.push_str(value);
}

fn write_css_style(style: &[(String, String)], w: &mut HtmlWriter) {
    if style.is_empty() {
        return;
    }
    let mut css = String::new();
    for (key, value) in style {
        push_css(&mut css, key, value);
    }
    w.raw(" style=\"");
    w.attr(&css);
    w.raw("\"");
}
