//! Single document composer shared by preview, submission and download flows.

mod html;
mod layout;
mod metrics;
mod outline;
mod pdf;

pub use html::render_html;
pub use layout::{
    paginate, wrap_lines, DrawOp, FontFace, Page, PageGeometry, PaginatedWill,
};
pub use metrics::text_width;
pub use outline::{
    compose, list_entries, Block, ComposedWill, Disclaimer, Header, Section, SectionKind,
    SignatureBlock, DISCLAIMER, DISCLAIMER_LABEL, SIGNATURE_CAPTION, TITLE,
};
pub use pdf::write_pdf;

use serde::{Deserialize, Serialize};
use std::fmt;

use super::domain::{Testator, WillDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OutputMode {
    /// Marked-up single flow for on-screen review and browser printing.
    #[serde(rename = "html")]
    Preview,
    /// Hard-paginated PDF.
    #[default]
    #[serde(rename = "pdf")]
    Printable,
}

impl OutputMode {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Preview => "html",
            Self::Printable => "pdf",
        }
    }

    pub fn content_type(self) -> mime::Mime {
        match self {
            Self::Preview => mime::TEXT_HTML_UTF_8,
            Self::Printable => mime::APPLICATION_PDF,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "html" | "preview" => Some(Self::Preview),
            "pdf" | "printable" => Some(Self::Printable),
            _ => None,
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedWill {
    pub mode: OutputMode,
    pub content_type: mime::Mime,
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// `testamento-<nombre>-<apellido>.<ext>`, always a single path component.
pub fn download_filename(testator: &Testator, mode: OutputMode) -> String {
    format!(
        "testamento-{}-{}.{}",
        filename_part(&testator.given_names),
        filename_part(&testator.surnames),
        mode.extension()
    )
}

fn filename_part(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

pub fn render_preview(document: &WillDocument) -> String {
    render_html(&compose(document))
}

pub fn render_printable(document: &WillDocument) -> Vec<u8> {
    write_pdf(&paginate(&compose(document), PageGeometry::LETTER))
}

pub fn render(document: &WillDocument, mode: OutputMode) -> RenderedWill {
    let bytes = match mode {
        OutputMode::Preview => render_preview(document).into_bytes(),
        OutputMode::Printable => render_printable(document),
    };
    RenderedWill {
        mode,
        content_type: mode.content_type(),
        filename: download_filename(&document.testator, mode),
        bytes,
    }
}
