//! Minimal PDF 1.4 writer for paginated wills.
//!
//! Only the two standard Times faces are referenced, so no font programs are
//! embedded. Text is WinAnsi-encoded with non-ASCII bytes written as octal
//! escapes, which keeps every content stream plain ASCII.

use super::layout::{DrawOp, FontFace, PaginatedWill};

const POINTS_PER_MM: f64 = 72.0 / 25.4;

const CATALOG: usize = 1;
const PAGES: usize = 2;
const FONT_REGULAR: usize = 3;
const FONT_BOLD: usize = 4;
const FIRST_PAGE: usize = 5;

fn pt(mm: f64) -> f64 {
    mm * POINTS_PER_MM
}

/// WinAnsi code for `c`; unmapped characters become `?`.
fn win_ansi(c: char) -> u8 {
    match c {
        '\u{20}'..='\u{7e}' => c as u8,
        '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        _ => b'?',
    }
}

/// PDF literal string body for `text`.
pub(crate) fn encode_text(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len() + 8);
    for byte in text.chars().map(win_ansi) {
        match byte {
            b'(' | b')' | b'\\' => {
                encoded.push('\\');
                encoded.push(byte as char);
            }
            0x20..=0x7e => encoded.push(byte as char),
            other => encoded.push_str(&format!("\\{other:03o}")),
        }
    }
    encoded
}

fn font_resource(face: FontFace) -> &'static str {
    match face {
        FontFace::Regular => "F1",
        FontFace::Bold => "F2",
    }
}

fn content_stream(ops: &[DrawOp], page_height_mm: f64) -> String {
    let mut stream = String::new();
    for op in ops {
        match op {
            DrawOp::Text {
                x,
                y,
                size,
                face,
                text,
            } => {
                stream.push_str(&format!(
                    "BT /{} {size:.1} Tf {:.2} {:.2} Td ({}) Tj ET\n",
                    font_resource(*face),
                    pt(*x),
                    pt(page_height_mm - y),
                    encode_text(text)
                ));
            }
            DrawOp::Rule {
                x1,
                x2,
                y,
                thickness,
            } => {
                let y = pt(page_height_mm - y);
                stream.push_str(&format!(
                    "{:.2} w {:.2} {y:.2} m {:.2} {y:.2} l S\n",
                    pt(*thickness),
                    pt(*x1),
                    pt(*x2)
                ));
            }
        }
    }
    stream
}

/// Object bodies are appended in id order; offsets feed the xref table.
struct PdfBuilder {
    bytes: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfBuilder {
    fn new() -> Self {
        let mut bytes = Vec::with_capacity(16 * 1024);
        bytes.extend_from_slice(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n");
        Self {
            bytes,
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, body: &str) {
        self.offsets.push(self.bytes.len());
        let id = self.offsets.len();
        self.bytes
            .extend_from_slice(format!("{id} 0 obj\n{body}\nendobj\n").as_bytes());
    }

    fn stream(&mut self, content: &str) {
        self.object(&format!(
            "<< /Length {} >>\nstream\n{content}endstream",
            content.len()
        ));
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_offset = self.bytes.len();
        let count = self.offsets.len() + 1;
        let mut xref = format!("xref\n0 {count}\n0000000000 65535 f \n");
        for offset in &self.offsets {
            xref.push_str(&format!("{offset:010} 00000 n \n"));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {count} /Root {CATALOG} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
        ));
        self.bytes.extend_from_slice(xref.as_bytes());
        self.bytes
    }
}

pub fn write_pdf(will: &PaginatedWill) -> Vec<u8> {
    let geometry = will.geometry;
    let page_ids: Vec<usize> = (0..will.pages.len())
        .map(|index| FIRST_PAGE + index * 2)
        .collect();

    let mut pdf = PdfBuilder::new();
    pdf.object(&format!("<< /Type /Catalog /Pages {PAGES} 0 R >>"));
    let kids: Vec<String> = page_ids.iter().map(|id| format!("{id} 0 R")).collect();
    pdf.object(&format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        page_ids.len()
    ));
    pdf.object(
        "<< /Type /Font /Subtype /Type1 /BaseFont /Times-Roman /Encoding /WinAnsiEncoding >>",
    );
    pdf.object(
        "<< /Type /Font /Subtype /Type1 /BaseFont /Times-Bold /Encoding /WinAnsiEncoding >>",
    );

    for (page, id) in will.pages.iter().zip(&page_ids) {
        pdf.object(&format!(
            "<< /Type /Page /Parent {PAGES} 0 R /MediaBox [0 0 {:.2} {:.2}] \
             /Resources << /Font << /F1 {FONT_REGULAR} 0 R /F2 {FONT_BOLD} 0 R >> >> \
             /Contents {} 0 R >>",
            pt(geometry.width),
            pt(geometry.height),
            id + 1
        ));
        pdf.stream(&content_stream(&page.ops, geometry.height));
    }

    pdf.finish()
}
