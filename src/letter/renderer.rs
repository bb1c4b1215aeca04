//! Lays a composed letter out on A4 pages with printpdf.
//!
//! Coordinates are tracked top-down in millimetres and flipped on output,
//! since PDF user space starts at the bottom-left corner.

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use log::{debug, warn};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point,
};

use super::composer::{wrap, LetterContent, BODY_WRAP};
use crate::error_handling::types::LetterError;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const LEFT: f32 = 20.0;
const RIGHT_COLUMN: f32 = 130.0;
const LINE_STEP: f32 = 7.0;
const PAGE_BREAK_AT: f32 = 260.0;
const SIGNATURE_WIDTH: f32 = 40.0;
const SIGNATURE_HEIGHT: f32 = 15.0;
const SIGNATURE_DPI: f32 = 300.0;

/// Raw signature images handed to the renderer. Undecodable bytes are skipped.
#[derive(Debug, Clone, Default)]
pub struct LetterImages {
    pub lead_signature: Option<Vec<u8>>,
    pub approver_signature: Option<Vec<u8>>,
}

struct Canvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    pages: usize,
}

impl Canvas {
    fn new(title: &str) -> Result<Self, LetterError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::TimesRoman)
            .map_err(|e| LetterError::FontUnavailable(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::TimesBold)
            .map_err(|e| LetterError::FontUnavailable(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self { doc, layer, regular, bold, pages: 1 })
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.pages += 1;
    }

    fn text(&self, text: &str, size: f32, x: f32, top: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(PAGE_HEIGHT - top), font);
    }

    /// Approximate centring: Times averages half an em per glyph.
    fn centered(&self, text: &str, size: f32, top: f32, bold: bool) {
        let width_mm = text.chars().count() as f32 * size * 0.5 * 0.3528;
        let x = ((PAGE_WIDTH - width_mm) / 2.0).max(LEFT);
        self.text(text, size, x, top, bold);
    }

    fn rule(&self, from_x: f32, to_x: f32, top: f32) {
        let y = Mm(PAGE_HEIGHT - top);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(from_x), y), false),
                (Point::new(Mm(to_x), y), false),
            ],
            is_closed: false,
        });
    }

    fn set_color(&self, r: f32, g: f32, b: f32) {
        self.layer
            .set_fill_color(Color::Rgb(printpdf::Rgb::new(r, g, b, None)));
    }

    fn signature(&self, image: &DynamicImage, x: f32, top: f32) {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return;
        }
        let native_width = width as f32 / SIGNATURE_DPI * 25.4;
        let native_height = height as f32 / SIGNATURE_DPI * 25.4;
        Image::from_dynamic_image(image).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(Mm(PAGE_HEIGHT - top - SIGNATURE_HEIGHT)),
                scale_x: Some(SIGNATURE_WIDTH / native_width),
                scale_y: Some(SIGNATURE_HEIGHT / native_height),
                dpi: Some(SIGNATURE_DPI),
                ..Default::default()
            },
        );
    }
}

/// Decode a signature and flatten any transparency onto white.
fn decode_signature(bytes: &[u8], whose: &str) -> Option<DynamicImage> {
    match image::load_from_memory(bytes) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let mut flat = RgbImage::new(rgba.width(), rgba.height());
            for (x, y, pixel) in rgba.enumerate_pixels() {
                let [r, g, b, a] = pixel.0;
                let alpha = a as f32 / 255.0;
                let blend = |c: u8| (c as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
                flat.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
            }
            Some(DynamicImage::ImageRgb8(flat))
        }
        Err(e) => {
            warn!("Skipping {} signature, image could not be decoded: {}", whose, e);
            None
        }
    }
}

/// Render `content` into PDF bytes.
pub fn render(content: &LetterContent, images: &LetterImages) -> Result<Vec<u8>, LetterError> {
    let mut canvas = Canvas::new(&content.title)?;

    canvas.centered(&content.institution_name, 14.0, 15.0, true);
    canvas.centered(&content.institution_address, 10.0, 20.0, true);
    canvas.rule(LEFT, PAGE_WIDTH - LEFT, 23.0);

    let mut y = 35.0;
    canvas.text("From:", 12.0, LEFT, y, false);
    y += LINE_STEP;
    for group in &content.from_groups {
        canvas.text(&format!("{}:", group.year_label), 12.0, LEFT, y, true);
        y += LINE_STEP;
        for line in wrap(&group.names, BODY_WRAP) {
            canvas.text(&line, 12.0, LEFT, y, false);
            y += LINE_STEP;
        }
    }
    for line in &content.from_address {
        canvas.text(line, 12.0, LEFT, y, false);
        y += LINE_STEP;
    }
    y += 8.0;

    canvas.text("To:", 12.0, LEFT, y, false);
    y += LINE_STEP;
    for line in &content.to_lines {
        canvas.text(line, 12.0, LEFT, y, false);
        y += LINE_STEP;
    }
    y += 8.0;

    for line in wrap(&content.subject, BODY_WRAP) {
        canvas.text(&line, 12.0, LEFT, y, true);
        y += LINE_STEP;
    }
    y += 10.0;

    canvas.text(&content.salutation, 12.0, LEFT, y, false);
    y += 12.0;

    for line in wrap(&content.body, BODY_WRAP) {
        if y > PAGE_BREAK_AT {
            canvas.new_page();
            y = 20.0;
        }
        canvas.text(&line, 12.0, LEFT, y, false);
        y += LINE_STEP;
    }
    y += 15.0;

    for line in &content.closing {
        if y > PAGE_BREAK_AT {
            canvas.new_page();
            y = 20.0;
        }
        canvas.text(line, 12.0, LEFT, y, false);
        y += 10.0;
    }

    if y > PAGE_BREAK_AT {
        canvas.new_page();
        y = 20.0;
    }
    let signatures_top = y;
    if let Some(img) = images
        .lead_signature
        .as_deref()
        .and_then(|bytes| decode_signature(bytes, "lead"))
    {
        canvas.signature(&img, LEFT, y);
    }
    canvas.rule(LEFT, LEFT + 55.0, y + 20.0);
    canvas.text(&format!("{} (Lead)", content.lead_name), 12.0, LEFT, y + 25.0, false);

    if let Some(ref approval) = content.approval {
        if let Some(img) = images
            .approver_signature
            .as_deref()
            .and_then(|bytes| decode_signature(bytes, "approver"))
        {
            canvas.signature(&img, RIGHT_COLUMN, signatures_top);
        }
        canvas.rule(RIGHT_COLUMN, RIGHT_COLUMN + 55.0, signatures_top + 20.0);
        canvas.text(&approval.signer_name, 12.0, RIGHT_COLUMN, signatures_top + 25.0, false);
        canvas.text(&approval.caption, 10.0, RIGHT_COLUMN, signatures_top + 30.0, false);
        canvas.set_color(0.0, 100.0 / 255.0, 0.0);
        canvas.centered("APPROVED", 16.0, signatures_top + 42.0, true);
        canvas.set_color(0.0, 0.0, 0.0);
    }
    y += 35.0;
    if content.approval.is_some() {
        y += 15.0;
    }

    for member in &content.member_names {
        if y > PAGE_BREAK_AT {
            canvas.new_page();
            y = 20.0;
        }
        canvas.rule(LEFT, LEFT + 55.0, y + 20.0);
        canvas.text(&format!("{} (Member)", member), 12.0, LEFT, y + 25.0, false);
        y += 35.0;
    }

    canvas.set_color(150.0 / 255.0, 150.0 / 255.0, 150.0 / 255.0);
    canvas.centered(&content.footer, 8.0, 285.0, false);

    let pages = canvas.pages;
    let bytes = canvas
        .doc
        .save_to_bytes()
        .map_err(|e| LetterError::RenderFailed(e.to_string()))?;
    debug!("Rendered letter '{}' ({} page(s), {} bytes)", content.title, pages, bytes.len());
    Ok(bytes)
}
