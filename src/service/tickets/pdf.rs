//! Single-page A4 ticket composed directly with `lopdf`.
//!
//! Text uses the built-in Helvetica faces with WinAnsi encoding; images are embedded as raw
//! 8-bit XObjects and the whole document is flate-compressed on save.

use crate::error::GvError;
use image::{GrayImage, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 60.0;
const BANNER_HEIGHT: f32 = 180.0;
const QR_SIZE: f32 = 220.0;
const QR_BOTTOM: f32 = 120.0;
const BADGE_COLOR: [f32; 3] = [0.16, 0.62, 0.36];

pub(crate) struct TicketLayout<'a> {
    pub event_title: Option<&'a str>,
    pub name: &'a str,
    pub company: &'a str,
    pub title: &'a str,
    pub email: Option<&'a str>,
    pub issued_at: &'a str,
    pub qr: &'a GrayImage,
    pub banner: Option<&'a RgbImage>,
    pub banner_color: [f32; 3],
}

pub(crate) fn render_ticket(layout: &TicketLayout<'_>) -> Result<Vec<u8>, GvError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(font("Helvetica"));
    let bold = doc.add_object(font("Helvetica-Bold"));
    let qr_id = doc.add_object(gray_image(layout.qr));
    let mut xobjects = dictionary! { "Qr" => qr_id };
    if let Some(banner) = layout.banner {
        let banner_id = doc.add_object(rgb_image(banner));
        xobjects.set("Banner", banner_id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => regular, "F2" => bold },
        "XObject" => xobjects,
    });

    let content = Content {
        operations: page_operations(layout),
    };
    let encoded = content
        .encode()
        .map_err(|e| GvError::Render(format!("PDF content encoding failed: {e}")))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::from(page_id)],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

fn page_operations(layout: &TicketLayout<'_>) -> Vec<Operation> {
    let mut ops = Vec::new();
    let banner_bottom = PAGE_HEIGHT - BANNER_HEIGHT;

    // Banner: solid fill first so letterboxed images keep a colored background.
    let [r, g, b] = layout.banner_color;
    fill_rect(&mut ops, [r, g, b], 0.0, banner_bottom, PAGE_WIDTH, BANNER_HEIGHT);
    if let Some(banner) = layout.banner {
        let (x, y, w, h) = fit_centered(banner.width(), banner.height(), PAGE_WIDTH, BANNER_HEIGHT);
        draw_image(&mut ops, "Banner", x, banner_bottom + y, w, h);
    } else if let Some(event) = layout.event_title {
        text(&mut ops, "F2", 26.0, [1.0, 1.0, 1.0], MARGIN, banner_bottom + 70.0, event);
    }

    let mut y = banner_bottom - 50.0;
    fill_rect(&mut ops, BADGE_COLOR, MARGIN, y - 10.0, 230.0, 32.0);
    text(&mut ops, "F2", 14.0, [1.0, 1.0, 1.0], MARGIN + 14.0, y, "ENTRADA CONFIRMADA");

    y -= 60.0;
    if let Some(event) = layout.event_title {
        text(&mut ops, "F2", 18.0, [0.1, 0.1, 0.1], MARGIN, y, event);
        y -= 40.0;
    }
    text(&mut ops, "F2", 22.0, [0.0, 0.0, 0.0], MARGIN, y, layout.name);
    y -= 28.0;
    for line in [layout.company, layout.title]
        .into_iter()
        .chain(layout.email)
        .filter(|l| !l.is_empty())
    {
        text(&mut ops, "F1", 14.0, [0.25, 0.25, 0.25], MARGIN, y, line);
        y -= 22.0;
    }

    let qr_left = (PAGE_WIDTH - QR_SIZE) / 2.0;
    draw_image(&mut ops, "Qr", qr_left, QR_BOTTOM, QR_SIZE, QR_SIZE);
    text(
        &mut ops,
        "F1",
        11.0,
        [0.35, 0.35, 0.35],
        MARGIN,
        QR_BOTTOM - 30.0,
        "Presenta este código QR en el acceso al evento.",
    );
    text(
        &mut ops,
        "F1",
        9.0,
        [0.5, 0.5, 0.5],
        MARGIN,
        QR_BOTTOM - 48.0,
        &format!("Emitida: {}", layout.issued_at),
    );

    ops
}

fn font(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn gray_image(img: &GrayImage) -> Stream {
    image_stream(img.width(), img.height(), "DeviceGray", img.as_raw().clone())
}

fn rgb_image(img: &RgbImage) -> Stream {
    image_stream(img.width(), img.height(), "DeviceRGB", img.as_raw().clone())
}

fn image_stream(width: u32, height: u32, color_space: &str, raw: Vec<u8>) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
        },
        raw,
    )
}

fn fill_rect(ops: &mut Vec<Operation>, rgb: [f32; 3], x: f32, y: f32, w: f32, h: f32) {
    ops.push(Operation::new("rg", rgb.iter().map(|c| (*c).into()).collect()));
    ops.push(Operation::new("re", vec![x.into(), y.into(), w.into(), h.into()]));
    ops.push(Operation::new("f", vec![]));
}

/// Largest `(x, y, w, h)` placement of an image inside a `box_w` x `box_h` box that keeps its
/// aspect ratio, centered on the free axis.
#[allow(clippy::cast_precision_loss)]
fn fit_centered(img_w: u32, img_h: u32, box_w: f32, box_h: f32) -> (f32, f32, f32, f32) {
    if img_w == 0 || img_h == 0 {
        return (0.0, 0.0, box_w, box_h);
    }
    let scale = (box_w / img_w as f32).min(box_h / img_h as f32);
    let (w, h) = (img_w as f32 * scale, img_h as f32 * scale);
    ((box_w - w) / 2.0, (box_h - h) / 2.0, w, h)
}

fn draw_image(ops: &mut Vec<Operation>, name: &str, x: f32, y: f32, w: f32, h: f32) {
    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new(
        "cm",
        vec![w.into(), 0.into(), 0.into(), h.into(), x.into(), y.into()],
    ));
    ops.push(Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]));
    ops.push(Operation::new("Q", vec![]));
}

fn text(
    ops: &mut Vec<Operation>,
    font: &str,
    size: f32,
    rgb: [f32; 3],
    x: f32,
    y: f32,
    value: &str,
) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("rg", rgb.iter().map(|c| (*c).into()).collect()));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(font.as_bytes().to_vec()), size.into()],
    ));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(win_ansi(value), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

/// WinAnsi matches Latin-1 for the accented letters used in Spanish; anything else becomes `?`.
fn win_ansi(value: &str) -> Vec<u8> {
    value
        .chars()
        .map(|c| match u32::from(c) {
            code @ 0x20..=0x7e | code @ 0xa0..=0xff => code as u8,
            _ => b'?',
        })
        .collect()
}

/// `#rrggbb` to PDF color components.
pub(crate) fn parse_hex_color(raw: &str) -> Option<[f32; 3]> {
    let hex = raw.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .ok()
            .map(|v| f32::from(v) / 255.0)
    };
    Some([channel(0)?, channel(2)?, channel(4)?])
}
