//! Absolute placement of a composed will on fixed-size pages.
//!
//! Coordinates are millimetres measured from the top-left corner; `y` is the
//! text baseline. A single cursor walks down the page and a page-boundary
//! check runs after every block.

use serde::Serialize;
use textwrap::core::Fragment;
use textwrap::wrap_algorithms::wrap_first_fit;

use super::metrics::text_width;
use super::outline::{Block, ComposedWill};

/// Page constants in millimetres; sizes in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub break_threshold: f64,
    pub list_indent: f64,
    pub list_item_gap: f64,
    pub footer_anchor: f64,
    pub signature_rule_width: f64,
    /// Millimetres of vertical advance per point of font size.
    pub line_height_factor: f64,
}

impl PageGeometry {
    /// US Letter portrait.
    pub const LETTER: Self = Self {
        width: 215.9,
        height: 279.4,
        margin: 20.0,
        break_threshold: 250.0,
        list_indent: 15.0,
        list_item_gap: 3.0,
        footer_anchor: 220.0,
        signature_rule_width: 80.0,
        line_height_factor: 0.6,
    };

    pub fn content_width(&self) -> f64 {
        self.width - self.margin * 2.0
    }

    pub fn line_height(&self, size_pt: f64) -> f64 {
        size_pt * self.line_height_factor
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::LETTER
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FontFace {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
}

mod size {
    pub const TITLE: f64 = 16.0;
    pub const GRANTED_BY: f64 = 12.0;
    pub const HEADER_ID: f64 = 11.0;
    pub const HEADING: f64 = 13.0;
    pub const BODY: f64 = 11.0;
    pub const SIGNATURE: f64 = 10.0;
    pub const DISCLAIMER_LABEL: f64 = 9.0;
    pub const DISCLAIMER: f64 = 8.0;
    pub const STAMP: f64 = 7.0;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Text {
        x: f64,
        y: f64,
        size: f64,
        face: FontFace,
        text: String,
    },
    Rule {
        x1: f64,
        x2: f64,
        y: f64,
        thickness: f64,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            DrawOp::Rule { .. } => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginatedWill {
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

impl PaginatedWill {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Concatenated text of every page in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(Page::texts)
    }
}

#[derive(Debug)]
struct Word<'a> {
    text: &'a str,
    width: f64,
    whitespace: f64,
}

impl Fragment for Word<'_> {
    fn width(&self) -> f64 {
        self.width
    }

    fn whitespace_width(&self) -> f64 {
        self.whitespace
    }

    fn penalty_width(&self) -> f64 {
        0.0
    }
}

/// Cuts a token wider than `max_width` at character boundaries. Each piece
/// except the last fills its own line.
fn split_long_word<'a>(
    word: &'a str,
    max_width: f64,
    size_pt: f64,
    face: FontFace,
    space: f64,
    out: &mut Vec<Word<'a>>,
) {
    let mut start = 0;
    let mut width = 0.0;
    for (index, ch) in word.char_indices() {
        let advance = text_width(ch.encode_utf8(&mut [0; 4]), size_pt, face);
        if index > start && width + advance > max_width {
            out.push(Word {
                text: &word[start..index],
                width,
                whitespace: 0.0,
            });
            start = index;
            width = 0.0;
        }
        width += advance;
    }
    out.push(Word {
        text: &word[start..],
        width,
        whitespace: space,
    });
}

/// First-fit wrap of `text` into lines no wider than `max_width` millimetres.
/// Tokens wider than a line are broken inside the word.
pub fn wrap_lines(text: &str, max_width: f64, size_pt: f64, face: FontFace) -> Vec<String> {
    let space = text_width(" ", size_pt, face);
    let mut words: Vec<Word<'_>> = Vec::new();
    for word in text.split_whitespace() {
        let width = text_width(word, size_pt, face);
        if width > max_width {
            split_long_word(word, max_width, size_pt, face, space, &mut words);
        } else {
            words.push(Word {
                text: word,
                width,
                whitespace: space,
            });
        }
    }

    wrap_first_fit(&words, &[max_width])
        .into_iter()
        .map(|line| {
            line.iter()
                .map(|word| word.text)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

struct Cursor {
    geometry: PageGeometry,
    pages: Vec<Page>,
    y: f64,
}

impl Cursor {
    fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![Page::default()],
            y: geometry.margin,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = self.geometry.margin;
    }

    fn check_page(&mut self) {
        if self.y > self.geometry.break_threshold {
            self.new_page();
        }
    }

    fn space(&mut self, millimetres: f64) {
        self.y += millimetres;
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn text_line(&mut self, x: f64, size: f64, face: FontFace, text: String) {
        // A single block taller than the remaining page still never draws below the margin.
        if self.y > self.geometry.height - self.geometry.margin {
            self.new_page();
        }
        self.push(DrawOp::Text {
            x,
            y: self.y,
            size,
            face,
            text,
        });
        self.y += self.geometry.line_height(size);
    }

    fn text_block(&mut self, text: &str, size: f64, face: FontFace, align: Align) {
        let width = self.geometry.content_width();
        self.wrapped(text, self.geometry.margin, width, size, face, align);
    }

    fn wrapped(&mut self, text: &str, left: f64, width: f64, size: f64, face: FontFace, align: Align) {
        for line in wrap_lines(text, width, size, face) {
            let x = match align {
                Align::Left => left,
                Align::Center => (self.geometry.width - text_width(&line, size, face)) / 2.0,
            };
            self.text_line(x, size, face, line);
        }
    }

    /// Draws at the cursor without advancing past the last line; continuation
    /// lines of a wrapped text move down one line height each.
    fn centered(&mut self, text: &str, size: f64, face: FontFace) {
        let lines = wrap_lines(text, self.geometry.content_width(), size, face);
        for (index, line) in lines.into_iter().enumerate() {
            if index > 0 {
                self.y += self.geometry.line_height(size);
            }
            let x = (self.geometry.width - text_width(&line, size, face)) / 2.0;
            self.push(DrawOp::Text {
                x,
                y: self.y,
                size,
                face,
                text: line,
            });
        }
    }

    fn rule(&mut self, x1: f64, x2: f64, thickness: f64) {
        self.push(DrawOp::Rule {
            x1,
            x2,
            y: self.y,
            thickness,
        });
    }

    fn list_item(&mut self, text: &str) {
        let indent = self.geometry.list_indent;
        let left = self.geometry.margin + indent;
        let width = self.geometry.content_width() - indent;
        self.wrapped(text, left, width, size::BODY, FontFace::Regular, Align::Left);
        self.space(self.geometry.list_item_gap);
    }
}

pub fn paginate(will: &ComposedWill, geometry: PageGeometry) -> PaginatedWill {
    let mut cursor = Cursor::new(geometry);
    let margin = geometry.margin;

    cursor.text_block(&will.header.title, size::TITLE, FontFace::Bold, Align::Center);
    cursor.space(4.0);
    cursor.rule(margin, geometry.width - margin, 0.5);
    cursor.space(10.0);
    cursor.text_block(
        &will.header.granted_by,
        size::GRANTED_BY,
        FontFace::Regular,
        Align::Center,
    );
    cursor.text_block(
        &will.header.national_id,
        size::HEADER_ID,
        FontFace::Regular,
        Align::Center,
    );
    cursor.space(15.0);

    let last_section = will.sections.len().saturating_sub(1);
    for (index, section) in will.sections.iter().enumerate() {
        cursor.text_block(&section.heading(), size::HEADING, FontFace::Bold, Align::Left);
        cursor.space(7.0);

        let mut blocks = section.blocks.iter().peekable();
        while let Some(block) = blocks.next() {
            match block {
                Block::Paragraph { text } => {
                    cursor.text_block(text, size::BODY, FontFace::Regular, Align::Left);
                }
                Block::Clause { ordinal, text } => {
                    cursor.text_block(
                        &Block::clause_label(ordinal),
                        size::BODY,
                        FontFace::Bold,
                        Align::Left,
                    );
                    cursor.space(-2.0);
                    cursor.text_block(text, size::BODY, FontFace::Regular, Align::Left);
                }
                Block::ListItem { text } => cursor.list_item(text),
            }
            if !matches!(block, Block::ListItem { .. }) && blocks.peek().is_some() {
                cursor.space(6.0);
            }
            cursor.check_page();
        }

        cursor.space(if index == last_section { 18.0 } else { 12.0 });
        cursor.check_page();
    }

    let signature = &will.signature;
    // Closing line, rule and caption stay on one page.
    let line_count = |text: &str, size: f64, face: FontFace| {
        wrap_lines(text, geometry.content_width(), size, face).len() as f64
    };
    let continuation_lines = [
        line_count(&signature.name, size::SIGNATURE, FontFace::Bold),
        line_count(&signature.national_id, size::SIGNATURE, FontFace::Regular),
        line_count(&signature.caption, size::SIGNATURE, FontFace::Regular),
    ]
    .iter()
    .map(|lines| (lines - 1.0).max(0.0))
    .sum::<f64>();
    let signature_height = line_count(&signature.closing, size::BODY, FontFace::Regular)
        * geometry.line_height(size::BODY)
        + 46.0
        + (1.0 + continuation_lines) * geometry.line_height(size::SIGNATURE);
    if cursor.y + signature_height > geometry.height - geometry.margin {
        cursor.new_page();
    }
    cursor.text_block(&signature.closing, size::BODY, FontFace::Regular, Align::Center);
    cursor.space(30.0);
    let rule_left = (geometry.width - geometry.signature_rule_width) / 2.0;
    cursor.rule(rule_left, rule_left + geometry.signature_rule_width, 0.3);
    cursor.space(6.0);
    cursor.centered(&signature.name, size::SIGNATURE, FontFace::Bold);
    cursor.space(5.0);
    cursor.centered(&signature.national_id, size::SIGNATURE, FontFace::Regular);
    cursor.space(5.0);
    cursor.centered(&signature.caption, size::SIGNATURE, FontFace::Regular);

    if cursor.y < geometry.footer_anchor {
        cursor.y = geometry.footer_anchor;
    } else {
        cursor.new_page();
        cursor.y = geometry.footer_anchor;
    }

    let disclaimer = &will.disclaimer;
    cursor.rule(margin, geometry.width - margin, 0.2);
    cursor.space(5.0);
    cursor.centered(&disclaimer.label, size::DISCLAIMER_LABEL, FontFace::Bold);
    cursor.space(4.0);
    cursor.text_block(&disclaimer.text, size::DISCLAIMER, FontFace::Regular, Align::Center);
    cursor.space(2.0);
    cursor.text_block(&disclaimer.stamp, size::STAMP, FontFace::Regular, Align::Center);

    PaginatedWill {
        geometry,
        pages: cursor.pages,
    }
}
