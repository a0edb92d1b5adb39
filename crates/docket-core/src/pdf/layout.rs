//! Positioned text recovery from PDF content streams.
//!
//! Walks the text operators of a page and emits one [`TextElement`] per
//! horizontal run of text. Glyph widths are approximated from the font size
//! since font metrics are not consulted; this is enough for same-line,
//! left-to-right proximity checks.

use lopdf::Object;
use lopdf::content::Operation;

use super::TextElement;

/// Affine matrix `[a b c d e f]` as used by PDF.
type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Average glyph advance as a fraction of the font size.
const GLYPH_WIDTH: f32 = 0.5;

/// TJ adjustments below this (thousandths of an em) are treated as a space.
const TJ_SPACE_THRESHOLD: f32 = -200.0;

fn multiply(m1: &Matrix, m2: &Matrix) -> Matrix {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

fn translate(tx: f32, ty: f32) -> Matrix {
    [1.0, 0.0, 0.0, 1.0, tx, ty]
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn numbers<const N: usize>(operands: &[Object]) -> Option<[f32; N]> {
    if operands.len() < N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, obj) in out.iter_mut().zip(operands) {
        *slot = number(obj)?;
    }
    Some(out)
}

/// Decode a PDF string operand. UTF-16BE strings carry a BOM; everything else
/// is read as Latin-1, which matches the standard encodings for ASCII text.
fn decode_string(bytes: &[u8]) -> String {
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes
        .iter()
        .map(|&b| b as char)
        .filter(|c| !c.is_control())
        .collect()
}

#[derive(Debug, Clone)]
struct TextState {
    ctm: Matrix,
    tm: Matrix,
    tlm: Matrix,
    font_size: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            ctm: IDENTITY,
            tm: IDENTITY,
            tlm: IDENTITY,
            font_size: 12.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn next_line(&mut self, tx: f32, ty: f32) {
        self.tlm = multiply(&translate(tx, ty), &self.tlm);
        self.tm = self.tlm;
    }
}

struct Collector {
    page: u32,
    elements: Vec<TextElement>,
}

impl Collector {
    /// Record a run of text and advance the text matrix past it.
    fn show(&mut self, state: &mut TextState, text: &str) {
        let glyphs = text.chars().count() as f32;
        if glyphs == 0.0 {
            return;
        }

        let trm = multiply(&state.tm, &state.ctm);
        let scale_x = (trm[0] * trm[0] + trm[1] * trm[1]).sqrt();
        let scale_y = (trm[2] * trm[2] + trm[3] * trm[3]).sqrt();
        let advance = glyphs * state.font_size * GLYPH_WIDTH;

        let x0 = trm[4];
        let y0 = trm[5];
        let x1 = x0 + advance * scale_x;
        let y1 = y0 + state.font_size * scale_y;
        let size = state.font_size * scale_y;

        state.tm = multiply(&translate(advance, 0.0), &state.tm);

        if text.trim().is_empty() {
            return;
        }

        // Continue the previous run when it ends right where this one starts.
        if let Some(last) = self.elements.last_mut() {
            let gap = x0 - last.x1;
            if (last.y0 - y0).abs() < 1.0 && gap > -size && gap < size * 0.6 {
                if gap > size * 0.15 && !last.text.ends_with(' ') {
                    last.text.push(' ');
                }
                last.text.push_str(text);
                last.x1 = x1;
                last.y1 = last.y1.max(y1);
                return;
            }
        }

        self.elements.push(TextElement::new(text, x0, y0, x1, y1, self.page));
    }

    fn finish(self) -> Vec<TextElement> {
        self.elements
            .into_iter()
            .map(|mut e| {
                e.text = e.text.trim().to_string();
                e
            })
            .filter(|e| !e.text.is_empty())
            .collect()
    }
}

/// Recover positioned text elements from the decoded operations of one page.
pub(crate) fn elements_from_operations(operations: &[Operation], page: u32) -> Vec<TextElement> {
    let mut state = TextState::default();
    let mut stack: Vec<Matrix> = Vec::new();
    let mut collector = Collector {
        page,
        elements: Vec::new(),
    };

    for op in operations {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            "q" => stack.push(state.ctm),
            "Q" => {
                if let Some(ctm) = stack.pop() {
                    state.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = numbers::<6>(operands) {
                    state.ctm = multiply(&m, &state.ctm);
                }
            }
            "BT" => {
                state.tm = IDENTITY;
                state.tlm = IDENTITY;
            }
            "Tf" => {
                if let Some(size) = operands.get(1).and_then(number) {
                    state.font_size = size.abs();
                }
            }
            "TL" => {
                if let Some([leading]) = numbers::<1>(operands) {
                    state.leading = leading;
                }
            }
            "Td" => {
                if let Some([tx, ty]) = numbers::<2>(operands) {
                    state.next_line(tx, ty);
                }
            }
            "TD" => {
                if let Some([tx, ty]) = numbers::<2>(operands) {
                    state.leading = -ty;
                    state.next_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = numbers::<6>(operands) {
                    state.tm = m;
                    state.tlm = m;
                }
            }
            "T*" => {
                let leading = state.leading;
                state.next_line(0.0, -leading);
            }
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    collector.show(&mut state, &decode_string(bytes));
                }
            }
            "'" => {
                let leading = state.leading;
                state.next_line(0.0, -leading);
                if let Some(Object::String(bytes, _)) = operands.first() {
                    collector.show(&mut state, &decode_string(bytes));
                }
            }
            "\"" => {
                let leading = state.leading;
                state.next_line(0.0, -leading);
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    collector.show(&mut state, &decode_string(bytes));
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let mut run = String::new();
                    for item in items {
                        match item {
                            Object::String(bytes, _) => run.push_str(&decode_string(bytes)),
                            other => {
                                if number(other).is_some_and(|n| n < TJ_SPACE_THRESHOLD)
                                    && !run.ends_with(' ')
                                {
                                    run.push(' ');
                                }
                            }
                        }
                    }
                    collector.show(&mut state, &run);
                }
            }
            _ => {}
        }
    }

    collector.finish()
}
