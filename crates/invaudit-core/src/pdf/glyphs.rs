//! Glyph sampling by walking page content streams.
//!
//! Text inside form XObjects is followed up to [`MAX_FORM_DEPTH`] levels.
//! The effective size combines the font size with the text matrix and the
//! current transformation matrix (`cm`, saved and restored by `q`/`Q`).

use std::collections::HashMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace};

use super::{GlyphSample, Result};
use crate::error::PdfError;

/// Nesting limit for form XObjects.
const MAX_FORM_DEPTH: usize = 8;

/// Affine matrix `[a b c d e f]` in PDF operand order.
type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// `m` applied first, then `n`.
fn multiply(m: &Matrix, n: &Matrix) -> Matrix {
    [
        m[0] * n[0] + m[1] * n[2],
        m[0] * n[1] + m[1] * n[3],
        m[2] * n[0] + m[3] * n[2],
        m[2] * n[1] + m[3] * n[3],
        m[4] * n[0] + m[5] * n[2] + n[4],
        m[4] * n[1] + m[5] * n[3] + n[5],
    ]
}

fn matrix_from(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let mut m = IDENTITY;
    for (slot, operand) in m.iter_mut().zip(operands) {
        *slot = operand.as_float().ok()?;
    }
    Some(m)
}

/// A font resource as far as glyph sampling cares.
struct FontResource {
    base_font: String,
    /// Composite (Type0) fonts use two-byte character codes.
    bytes_per_glyph: usize,
}

impl FontResource {
    fn from_dict(dict: &Dictionary) -> Self {
        let base_font = dict
            .get(b"BaseFont")
            .and_then(|o| o.as_name())
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .unwrap_or_else(|_| "Unknown".to_string());

        let composite = dict
            .get(b"Subtype")
            .and_then(|o| o.as_name())
            .map(|s| s == b"Type0")
            .unwrap_or(false);

        Self {
            base_font,
            bytes_per_glyph: if composite { 2 } else { 1 },
        }
    }
}

type FontMap = HashMap<Vec<u8>, FontResource>;

/// Fonts declared in a resource dictionary.
fn resource_fonts(doc: &Document, resources: &Dictionary) -> FontMap {
    let Ok(fonts) = resources
        .get(b"Font")
        .and_then(|o| doc.dereference(o))
        .and_then(|(_, o)| o.as_dict())
    else {
        return FontMap::new();
    };

    fonts
        .iter()
        .filter_map(|(name, obj)| {
            let (_, font) = doc.dereference(obj).ok()?;
            Some((name.clone(), FontResource::from_dict(font.as_dict().ok()?)))
        })
        .collect()
}

/// Resource dictionary of a page, inherited from the page tree if needed.
fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    loop {
        if let Ok(resources) = node.get(b"Resources") {
            if let Ok((_, Object::Dictionary(dict))) = doc.dereference(resources) {
                return Some(dict);
            }
        }
        let parent = node.get(b"Parent").and_then(|p| p.as_reference()).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
}

fn xobjects<'d>(doc: &'d Document, resources: Option<&'d Dictionary>) -> Option<&'d Dictionary> {
    resources?
        .get(b"XObject")
        .and_then(|o| doc.dereference(o))
        .and_then(|(_, o)| o.as_dict())
        .ok()
}

/// Text state tracked between operators.
struct TextState<'a> {
    font: Option<&'a FontResource>,
    font_size: f32,
    text_matrix: Matrix,
    ctm: Matrix,
    saved: Vec<Matrix>,
}

impl<'a> TextState<'a> {
    fn new(ctm: Matrix) -> Self {
        Self {
            font: None,
            font_size: 0.0,
            text_matrix: IDENTITY,
            ctm,
            saved: Vec::new(),
        }
    }

    fn show(&self, bytes: &[u8], out: &mut Vec<GlyphSample>) {
        let Some(font) = self.font else {
            trace!("Text shown without a selected font, skipping {} bytes", bytes.len());
            return;
        };

        let m = multiply(&self.text_matrix, &self.ctm);
        let size = (self.font_size * m[2].hypot(m[3])).abs();
        let count = bytes.len() / font.bytes_per_glyph;
        out.extend((0..count).map(|_| GlyphSample {
            font: font.base_font.clone(),
            size,
        }));
    }
}

struct Sampler<'d> {
    doc: &'d Document,
    page: u32,
    glyphs: Vec<GlyphSample>,
}

impl<'d> Sampler<'d> {
    fn content_error(&self, reason: String) -> PdfError {
        PdfError::Content {
            page: self.page,
            reason,
        }
    }

    fn run(
        &mut self,
        operations: &[Operation],
        fonts: &FontMap,
        xobjects: Option<&'d Dictionary>,
        ctm: Matrix,
        depth: usize,
    ) -> Result<()> {
        let mut state = TextState::new(ctm);

        for op in operations {
            match op.operator.as_str() {
                "q" => state.saved.push(state.ctm),
                "Q" => {
                    if let Some(ctm) = state.saved.pop() {
                        state.ctm = ctm;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_from(&op.operands) {
                        state.ctm = multiply(&m, &state.ctm);
                    }
                }
                "BT" => state.text_matrix = IDENTITY,
                "Tm" => {
                    if let Some(m) = matrix_from(&op.operands) {
                        state.text_matrix = m;
                    }
                }
                "Tf" => {
                    if let [name, size, ..] = op.operands.as_slice() {
                        state.font = name.as_name().ok().and_then(|n| fonts.get(n));
                        state.font_size = size.as_float().unwrap_or(0.0);
                    }
                }
                "Tj" | "'" | "\"" => {
                    if let Some(Object::String(bytes, _)) = op.operands.last() {
                        state.show(bytes, &mut self.glyphs);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(parts)) = op.operands.first() {
                        for part in parts {
                            if let Object::String(bytes, _) = part {
                                state.show(bytes, &mut self.glyphs);
                            }
                        }
                    }
                }
                "Do" => {
                    if let Some(name) = op.operands.first().and_then(|o| o.as_name().ok()) {
                        self.form(name, fonts, xobjects, state.ctm, depth)?;
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Sample a form XObject drawn with `Do`. Image XObjects are ignored.
    fn form(
        &mut self,
        name: &[u8],
        fonts: &FontMap,
        xobjects: Option<&'d Dictionary>,
        ctm: Matrix,
        depth: usize,
    ) -> Result<()> {
        let doc = self.doc;
        let Some(stream) = xobjects
            .and_then(|x| x.get(name).ok())
            .and_then(|o| doc.dereference(o).ok())
            .and_then(|(_, o)| o.as_stream().ok())
        else {
            return Ok(());
        };

        let is_form = stream
            .dict
            .get(b"Subtype")
            .and_then(|o| o.as_name())
            .map(|s| s == b"Form")
            .unwrap_or(false);
        if !is_form {
            return Ok(());
        }
        if depth >= MAX_FORM_DEPTH {
            debug!("Page {}: form nesting deeper than {}, skipping", self.page, MAX_FORM_DEPTH);
            return Ok(());
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        let content = Content::decode(&data).map_err(|e| self.content_error(e.to_string()))?;

        let matrix = stream
            .dict
            .get(b"Matrix")
            .and_then(|o| o.as_array())
            .ok()
            .and_then(|a| matrix_from(a))
            .unwrap_or(IDENTITY);

        // A form without its own resources uses those of the page.
        let resources = stream
            .dict
            .get(b"Resources")
            .and_then(|o| doc.dereference(o))
            .and_then(|(_, o)| o.as_dict())
            .ok();

        match resources {
            Some(resources) => {
                let form_fonts = resource_fonts(doc, resources);
                let form_xobjects = self::xobjects(doc, Some(resources));
                self.run(
                    &content.operations,
                    &form_fonts,
                    form_xobjects,
                    multiply(&matrix, &ctm),
                    depth + 1,
                )
            }
            None => self.run(
                &content.operations,
                fonts,
                xobjects,
                multiply(&matrix, &ctm),
                depth + 1,
            ),
        }
    }
}

/// Sample every glyph drawn on one page.
pub(crate) fn page_glyphs(doc: &Document, page: u32, page_id: ObjectId) -> Result<Vec<GlyphSample>> {
    let content_error = |reason: String| PdfError::Content { page, reason };

    let fonts: FontMap = doc
        .get_page_fonts(page_id)
        .map_err(|e| content_error(e.to_string()))?
        .into_iter()
        .map(|(name, dict)| (name, FontResource::from_dict(dict)))
        .collect();

    let data = doc
        .get_page_content(page_id)
        .map_err(|e| content_error(e.to_string()))?;
    let content = Content::decode(&data).map_err(|e| content_error(e.to_string()))?;

    let mut sampler = Sampler {
        doc,
        page,
        glyphs: Vec::new(),
    };
    let page_xobjects = xobjects(doc, page_resources(doc, page_id));
    sampler.run(&content.operations, &fonts, page_xobjects, IDENTITY, 0)?;

    trace!("Page {}: {} glyphs from {} fonts", page, sampler.glyphs.len(), fonts.len());
    Ok(sampler.glyphs)
}
