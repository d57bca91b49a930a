//! Times glyph advance widths used to measure text before wrapping.

use super::layout::FontFace;

const MM_PER_POINT: f64 = 25.4 / 72.0;
const BOLD_WIDENING: f64 = 1.05;
const DEFAULT_ADVANCE: u16 = 500;

/// Times-Roman advances (1/1000 em) for ASCII 32..=126.
const TIMES_ROMAN_ASCII: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278, // ' '../
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444, // 0..?
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, // @..O
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500, // P.._
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, // `..o
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541, // p..~
];

fn advance(c: char) -> u16 {
    if (' '..='~').contains(&c) {
        return TIMES_ROMAN_ASCII[c as usize - 32];
    }
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'é' | 'è' | 'ê' | 'ë' | 'ç' | '¿' => 444,
        'í' | 'ì' | 'î' | 'ï' => 278,
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ú' | 'ù' | 'û' | 'ü' | 'ñ' | '°' => 500,
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' | 'Ú' | 'Ù' | 'Û' | 'Ü' | 'Ñ' => 722,
        'É' | 'È' | 'Ê' | 'Ë' => 611,
        'Í' | 'Ì' | 'Î' | 'Ï' | '¡' => 333,
        'º' => 310,
        'ª' => 276,
        '\u{a0}' => 250,
        _ => DEFAULT_ADVANCE,
    }
}

/// Rendered width of `text` in millimetres.
pub fn text_width(text: &str, size_pt: f64, face: FontFace) -> f64 {
    let units: u32 = text.chars().map(|c| u32::from(advance(c))).sum();
    let width = f64::from(units) / 1000.0 * size_pt * MM_PER_POINT;
    match face {
        FontFace::Regular => width,
        FontFace::Bold => width * BOLD_WIDENING,
    }
}
