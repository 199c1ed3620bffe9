//! A small PDF 1.4 writer for text-and-rule documents.
//!
//! Supports A4 pages, the two standard Helvetica faces, RGB text colour and
//! straight lines. Coordinates are in millimetres from the top-left corner,
//! as used by the plan layout; they are converted to PDF points measured
//! from the bottom-left on output. Content streams are left uncompressed so
//! [`extract_text`] can read them back.

use std::fmt::Write as _;

use thiserror::Error;

pub const A4_WIDTH_MM: f64 = 210.0;
pub const A4_HEIGHT_MM: f64 = 297.0;

const PT_PER_MM: f64 = 72.0 / 25.4;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("not a PDF document")]
    NotPdf,

    #[error("malformed PDF: {0}")]
    Malformed(&'static str),

    #[error("failed to write PDF: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    fn operands(self) -> String {
        let c = |v: u8| format_number(f64::from(v) / 255.0);
        format!("{} {} {}", c(self.0), c(self.1), c(self.2))
    }
}

fn format_number(v: f64) -> String {
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn to_pt_x(x_mm: f64) -> String {
    format_number(x_mm * PT_PER_MM)
}

fn to_pt_y(y_mm: f64) -> String {
    format_number((A4_HEIGHT_MM - y_mm) * PT_PER_MM)
}

/// WinAnsiEncoding code points in 0x80-0x9F that differ from Latin-1.
const WIN_ANSI_HIGH: [(u8, char); 27] = [
    (0x80, '\u{20AC}'),
    (0x82, '\u{201A}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'),
    (0x8A, '\u{0160}'),
    (0x8B, '\u{2039}'),
    (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'),
    (0x99, '\u{2122}'),
    (0x9A, '\u{0161}'),
    (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'),
    (0x9E, '\u{017E}'),
    (0x9F, '\u{0178}'),
];

/// The WinAnsi byte for `ch`, if the standard fonts can show it.
fn win_ansi_byte(ch: char) -> Option<u8> {
    match u32::from(ch) {
        0xA0..=0xFF => u8::try_from(u32::from(ch)).ok(),
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|(_, c)| *c == ch)
            .map(|(byte, _)| *byte),
    }
}

/// The character a WinAnsi byte stands for.
fn win_ansi_char(byte: u8) -> char {
    WIN_ANSI_HIGH
        .iter()
        .find(|(b, _)| *b == byte)
        .map_or(char::from(byte), |(_, c)| *c)
}

/// Escape `text` as a PDF literal string body in WinAnsi encoding.
/// Characters WinAnsi cannot represent become `?`.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            ' '..='~' => out.push(ch),
            '\t' | '\n' | '\r' => out.push(' '),
            c => match win_ansi_byte(c) {
                Some(byte) => {
                    let _ = write!(out, "\\{byte:03o}");
                }
                None => out.push('?'),
            },
        }
    }
    out
}

/// Approximate Helvetica advance width of `ch`, in em.
fn char_width(ch: char) -> f64 {
    match ch {
        'i' | 'j' | 'l' | '.' | ',' | '\'' | '!' | '|' | ':' | ';' => 0.25,
        ' ' | 'f' | 't' | 'r' | 'I' | '(' | ')' | '-' => 0.33,
        'm' | 'w' | 'M' | 'W' => 0.85,
        c if c.is_ascii_uppercase() => 0.68,
        _ => 0.55,
    }
}

/// Rendered width of `text` at `size_pt`, in millimetres.
pub fn text_width_mm(text: &str, size_pt: f64) -> f64 {
    let em: f64 = text.chars().map(char_width).sum();
    em * size_pt / PT_PER_MM
}

/// Greedy word wrap to `max_width_mm`. Words wider than a line are kept
/// whole on their own line. Explicit newlines start a new line.
pub fn wrap_text(text: &str, max_width_mm: f64, size_pt: f64) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if text_width_mm(&candidate, size_pt) > max_width_mm {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            } else {
                current = candidate;
            }
        }
        lines.push(current);
    }
    lines
}

/// An in-memory document under construction.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pages: Vec<String>,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    /// A document with one empty page.
    pub fn new() -> Self {
        Self {
            pages: vec![String::new()],
        }
    }

    pub fn add_page(&mut self) {
        self.pages.push(String::new());
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current(&mut self) -> &mut String {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Draw a single-line text run with its baseline at `(x_mm, y_mm)`.
    pub fn text(&mut self, x_mm: f64, y_mm: f64, size_pt: f64, font: Font, color: Rgb, text: &str) {
        let op = format!(
            "BT /{} {} Tf {} rg {} {} Td ({}) Tj ET\n",
            font.resource(),
            format_number(size_pt),
            color.operands(),
            to_pt_x(x_mm),
            to_pt_y(y_mm),
            escape_text(text)
        );
        self.current().push_str(&op);
    }

    pub fn line(&mut self, x1_mm: f64, y1_mm: f64, x2_mm: f64, y2_mm: f64, color: Rgb) {
        let op = format!(
            "{} RG 0.5 w {} {} m {} {} l S\n",
            color.operands(),
            to_pt_x(x1_mm),
            to_pt_y(y1_mm),
            to_pt_x(x2_mm),
            to_pt_y(y2_mm)
        );
        self.current().push_str(&op);
    }

    /// Serialize the document.
    pub fn to_bytes(&self) -> Vec<u8> {
        // Object layout: 1 catalog, 2 page tree, 3-4 fonts, then a
        // (page, content) pair per page.
        let page_ids: Vec<usize> = (0..self.pages.len()).map(|i| 5 + i * 2).collect();
        let mut objects: Vec<String> = Vec::with_capacity(4 + self.pages.len() * 2);

        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
        let kids: Vec<String> = page_ids.iter().map(|id| format!("{id} 0 R")).collect();
        objects.push(format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            self.pages.len()
        ));
        for base in ["Helvetica", "Helvetica-Bold"] {
            objects.push(format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{base} /Encoding /WinAnsiEncoding >>"
            ));
        }
        for (content, page_id) in self.pages.iter().zip(&page_ids) {
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                format_number(A4_WIDTH_MM * PT_PER_MM),
                format_number(A4_HEIGHT_MM * PT_PER_MM),
                page_id + 1
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}endstream",
                content.len(),
                content
            ));
        }

        let mut out: Vec<u8> = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }

        let xref_at = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = writeln!(xref, "{offset:010} 00000 n ");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1
        );
        out.extend_from_slice(xref.as_bytes());
        out
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Recover the text runs of a document written by [`PdfDocument`], in
/// drawing order.
pub fn extract_text(bytes: &[u8]) -> Result<Vec<String>, PdfError> {
    if !bytes.starts_with(b"%PDF-") {
        return Err(PdfError::NotPdf);
    }

    let mut runs = Vec::new();
    let mut rest = bytes;
    while let Some(start) = find(rest, b"stream\n") {
        let body = &rest[start + b"stream\n".len()..];
        let end = find(body, b"endstream").ok_or(PdfError::Malformed("unterminated stream"))?;
        runs.extend(text_runs(&body[..end])?);
        rest = &body[end + b"endstream".len()..];
    }
    Ok(runs)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Literal strings immediately followed by `Tj`.
fn text_runs(content: &[u8]) -> Result<Vec<String>, PdfError> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < content.len() {
        if content[i] != b'(' {
            i += 1;
            continue;
        }
        let (text, next) = read_literal(content, i + 1)?;
        i = next;
        let tail = &content[i..];
        let trimmed = tail
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .map_or(tail, |p| &tail[p..]);
        if trimmed.starts_with(b"Tj") {
            runs.push(text);
        }
    }
    Ok(runs)
}

/// Decode a literal string starting after its opening parenthesis.
/// Returns the text and the index after the closing parenthesis.
fn read_literal(content: &[u8], mut i: usize) -> Result<(String, usize), PdfError> {
    let mut text = String::new();
    let mut depth = 0usize;
    while i < content.len() {
        match content[i] {
            b'\\' => {
                let esc = *content
                    .get(i + 1)
                    .ok_or(PdfError::Malformed("dangling escape"))?;
                if esc.is_ascii_digit() {
                    let digits: Vec<u8> = content[i + 1..]
                        .iter()
                        .take(3)
                        .take_while(|b| (b'0'..=b'7').contains(b))
                        .copied()
                        .collect();
                    let code = digits
                        .iter()
                        .fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                    text.push(u8::try_from(code).map_or('?', win_ansi_char));
                    i += 1 + digits.len();
                } else {
                    text.push(match esc {
                        b'n' => '\n',
                        b'r' => '\r',
                        b't' => '\t',
                        other => char::from(other),
                    });
                    i += 2;
                }
            }
            b'(' => {
                depth += 1;
                text.push('(');
                i += 1;
            }
            b')' if depth > 0 => {
                depth -= 1;
                text.push(')');
                i += 1;
            }
            b')' => return Ok((text, i + 1)),
            byte => {
                text.push(win_ansi_char(byte));
                i += 1;
            }
        }
    }
    Err(PdfError::Malformed("unterminated string"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_delimiters_and_latin1() {
        assert_eq!(escape_text(r"a(b)c\d"), r"a\(b\)c\\d");
        assert_eq!(escape_text("café"), r"caf\351");
        assert_eq!(escape_text("emoji 🙂"), "emoji ?");
    }

    #[test]
    fn typographic_punctuation_uses_win_ansi_slots() {
        assert_eq!(escape_text("a \u{2013} b"), r"a \226 b");
        assert_eq!(escape_text("\u{201C}hi\u{201D}"), r"\223hi\224");
        assert_eq!(escape_text("5\u{20AC}"), r"5\200");
    }

    #[test]
    fn win_ansi_table_round_trips() {
        for (byte, ch) in WIN_ANSI_HIGH {
            assert_eq!(win_ansi_byte(ch), Some(byte));
            assert_eq!(win_ansi_char(byte), ch);
        }
        assert_eq!(win_ansi_byte('\u{041F}'), None);
    }

    #[test]
    fn document_structure() {
        let mut doc = PdfDocument::new();
        doc.text(15.0, 20.0, 12.0, Font::Regular, Rgb::BLACK, "hello");
        doc.add_page();
        doc.line(15.0, 30.0, 195.0, 30.0, Rgb(200, 200, 200));
        let bytes = doc.to_bytes();
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.contains("/Count 2"));
        assert!(text.trim_end().ends_with("%%EOF"));
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let mut doc = PdfDocument::new();
        doc.text(10.0, 10.0, 10.0, Font::Bold, Rgb::BLACK, "x");
        let bytes = doc.to_bytes();
        let text = String::from_utf8_lossy(&bytes).into_owned();

        let xref = text.find("xref\n").unwrap();
        let entries: Vec<usize> = text[xref..]
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().unwrap())
            .collect();
        assert_eq!(entries.len(), 6);
        for (i, offset) in entries.iter().enumerate() {
            let expected = format!("{} 0 obj", i + 1);
            assert_eq!(&bytes[*offset..*offset + expected.len()], expected.as_bytes());
        }
    }

    #[test]
    fn extract_round_trips_runs() {
        let mut doc = PdfDocument::new();
        doc.text(15.0, 20.0, 12.0, Font::Regular, Rgb::BLACK, "Total: 1650 kcal");
        doc.text(15.0, 26.0, 12.0, Font::Bold, Rgb::BLACK, "Oats (porridge) à la carte");
        doc.add_page();
        doc.text(15.0, 20.0, 12.0, Font::Regular, Rgb::BLACK, r"back\slash");

        let runs = extract_text(&doc.to_bytes()).unwrap();
        assert_eq!(
            runs,
            vec!["Total: 1650 kcal", "Oats (porridge) à la carte", r"back\slash"]
        );
    }

    #[test]
    fn extract_round_trips_typographic_punctuation() {
        let samples = [
            "Monday \u{2013} Reset",
            "Chef\u{2019}s \u{201C}green\u{201D} omelette",
            "Rest \u{2014} then stretch\u{2026}",
            "\u{2022} 2\u{20AC} smoothie\u{2122}",
        ];
        let mut doc = PdfDocument::new();
        for (i, text) in samples.iter().enumerate() {
            doc.text(15.0, 20.0 + 6.0 * i as f64, 10.0, Font::Regular, Rgb::BLACK, text);
        }

        assert_eq!(extract_text(&doc.to_bytes()).unwrap(), samples);
    }

    #[test]
    fn extract_rejects_non_pdf() {
        assert!(matches!(extract_text(b"hello"), Err(PdfError::NotPdf)));
    }

    #[test]
    fn wrap_respects_width() {
        let text = "word ".repeat(100);
        let lines = wrap_text(&text, 60.0, 10.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_mm(line, 10.0) <= 60.0, "{line}");
        }
        assert_eq!(lines.join(" ").split_whitespace().count(), 100);
    }

    #[test]
    fn wrap_keeps_explicit_breaks_and_long_words() {
        let lines = wrap_text("a\nb", 100.0, 10.0);
        assert_eq!(lines, vec!["a", "b"]);
        let long = "x".repeat(200);
        assert_eq!(wrap_text(&long, 20.0, 10.0), vec![long]);
    }

    #[test]
    fn numbers_are_compact() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(0.0), "0");
    }
}
