//! Report document compilation: A4 page layout plus PDF serialization.
//!
//! Layout is computed first as pure data so pagination is testable
//! without touching the PDF writer. Every captured surface gets a 14pt
//! title and a full-content-width image; a surface that would not fit
//! on the remaining page (with its title and trailing gap) moves to a
//! fresh page.

use chrono::{DateTime, Local, NaiveDate};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfLayerReference,
};

use crate::error::{ReportError, ReportResult};
use crate::services::capture::CapturedSurface;

pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PAGE_HEIGHT_MM: f64 = 297.0;
pub const MARGIN_MM: f64 = 20.0;
pub const CONTENT_WIDTH_MM: f64 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;

const HEADER_TITLE_PT: f64 = 20.0;
const SECTION_TITLE_PT: f64 = 14.0;
const TIMESTAMP_PT: f64 = 10.0;
/// Vertical advance from a section title to its image.
const TITLE_ADVANCE_MM: f64 = 15.0;
/// Gap after each placed image.
const IMAGE_GAP_MM: f64 = 20.0;
/// Space a section needs beyond its image height to stay on the page.
const SECTION_RESERVE_MM: f64 = 30.0;
/// First-page cursor, below the document header.
const FIRST_CURSOR_MM: f64 = MARGIN_MM + 35.0;

/// One placed element. Vertical positions measure down from the top of
/// the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    Text {
        text: String,
        size_pt: f64,
        bold: bool,
        y_mm: f64,
    },
    Image {
        /// Index into the captured-surface list.
        index: usize,
        y_mm: f64,
        width_mm: f64,
        height_mm: f64,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub placements: Vec<Placement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub title: String,
    pub pages: Vec<Page>,
}

/// Scaled image size: full content width, aspect ratio preserved.
fn scaled_height(width_px: u32, height_px: u32) -> f64 {
    if width_px == 0 {
        return 0.0;
    }
    CONTENT_WIDTH_MM * height_px as f64 / width_px as f64
}

/// Paginate the captured surfaces under the given document title.
pub fn compile_layout(
    title: &str,
    generated_at: DateTime<Local>,
    surfaces: &[CapturedSurface],
) -> DocumentLayout {
    let mut pages = vec![Page::default()];
    let first = &mut pages[0];
    first.placements.push(Placement::Text {
        text: title.to_string(),
        size_pt: HEADER_TITLE_PT,
        bold: true,
        y_mm: MARGIN_MM,
    });
    first.placements.push(Placement::Text {
        text: format!("Generated on: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        size_pt: TIMESTAMP_PT,
        bold: false,
        y_mm: MARGIN_MM + 10.0,
    });

    let mut cursor = FIRST_CURSOR_MM;
    for (index, surface) in surfaces.iter().enumerate() {
        let height = scaled_height(surface.image.width, surface.image.height);
        if cursor + height + SECTION_RESERVE_MM > PAGE_HEIGHT_MM - MARGIN_MM {
            pages.push(Page::default());
            cursor = MARGIN_MM;
        }
        let page = pages.last_mut().expect("at least one page");
        page.placements.push(Placement::Text {
            text: surface.title.clone(),
            size_pt: SECTION_TITLE_PT,
            bold: true,
            y_mm: cursor,
        });
        cursor += TITLE_ADVANCE_MM;
        page.placements.push(Placement::Image {
            index,
            y_mm: cursor,
            width_mm: CONTENT_WIDTH_MM,
            height_mm: height,
        });
        cursor += height + IMAGE_GAP_MM;
    }

    DocumentLayout {
        title: title.to_string(),
        pages,
    }
}

/// Report file name for the given date.
pub fn report_filename(date: NaiveDate) -> String {
    format!("WIL_Report_{}.pdf", date.format("%Y-%m-%d"))
}

fn place_text(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    size_pt: f64,
    y_mm: f64,
) {
    // printpdf's origin is the bottom-left corner.
    let baseline = PAGE_HEIGHT_MM - y_mm;
    layer.use_text(
        text,
        size_pt as f32,
        Mm(MARGIN_MM as f32),
        Mm(baseline as f32),
        font,
    );
}

fn place_image(
    layer: &PdfLayerReference,
    surface: &CapturedSurface,
    y_mm: f64,
    width_mm: f64,
    height_mm: f64,
) -> ReportResult<()> {
    let rgb = printpdf::image_crate::RgbImage::from_raw(
        surface.image.width,
        surface.image.height,
        surface.image.rgb_bytes(),
    )
    .ok_or_else(|| ReportError::Pdf("surface pixel buffer has wrong length".to_string()))?;
    let image = Image::from_dynamic_image(&printpdf::image_crate::DynamicImage::ImageRgb8(rgb));

    // Images embed at their pixel size over dpi; scale to the laid-out
    // millimetre box.
    let dpi = 300.0_f64;
    let natural_width_mm = surface.image.width as f64 * 25.4 / dpi;
    let natural_height_mm = surface.image.height as f64 * 25.4 / dpi;
    let bottom = PAGE_HEIGHT_MM - y_mm - height_mm;
    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(MARGIN_MM as f32)),
            translate_y: Some(Mm(bottom as f32)),
            scale_x: Some((width_mm / natural_width_mm) as f32),
            scale_y: Some((height_mm / natural_height_mm) as f32),
            dpi: Some(dpi as f32),
            ..Default::default()
        },
    );
    Ok(())
}

/// Serialize a layout and its captured surfaces into PDF bytes.
pub fn render_pdf(layout: &DocumentLayout, surfaces: &[CapturedSurface]) -> ReportResult<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        &layout.title,
        Mm(PAGE_WIDTH_MM as f32),
        Mm(PAGE_HEIGHT_MM as f32),
        "content",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|err| ReportError::Pdf(err.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|err| ReportError::Pdf(err.to_string()))?;

    for (page_index, page) in layout.pages.iter().enumerate() {
        let layer = if page_index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_ref, layer_ref) = doc.add_page(
                Mm(PAGE_WIDTH_MM as f32),
                Mm(PAGE_HEIGHT_MM as f32),
                "content",
            );
            doc.get_page(page_ref).get_layer(layer_ref)
        };
        for placement in &page.placements {
            match placement {
                Placement::Text {
                    text,
                    size_pt,
                    bold: is_bold,
                    y_mm,
                } => {
                    let font = if *is_bold { &bold } else { &regular };
                    place_text(&layer, font, text, *size_pt, *y_mm);
                }
                Placement::Image {
                    index,
                    y_mm,
                    width_mm,
                    height_mm,
                } => {
                    let surface = surfaces.get(*index).ok_or_else(|| {
                        ReportError::Pdf(format!("layout references missing surface {index}"))
                    })?;
                    place_image(&layer, surface, *y_mm, *width_mm, *height_mm)?;
                }
            }
        }
    }

    doc.save_to_bytes()
        .map_err(|err| ReportError::Pdf(err.to_string()))
}

/// Compile and serialize in one step.
pub fn compile_pdf(
    title: &str,
    generated_at: DateTime<Local>,
    surfaces: &[CapturedSurface],
) -> ReportResult<Vec<u8>> {
    let layout = compile_layout(title, generated_at, surfaces);
    render_pdf(&layout, surfaces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RasterImage;
    use chrono::TimeZone;

    fn surface(title: &str, width: u32, height: u32) -> CapturedSurface {
        CapturedSurface {
            title: title.to_string(),
            image: RasterImage {
                width,
                height,
                rgba: vec![255; (width * height * 4) as usize],
            },
            sequence_index: 0,
        }
    }

    fn date() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 14, 9, 30, 5).unwrap()
    }

    #[test]
    fn filename_embeds_the_date() {
        assert_eq!(
            report_filename(date().date_naive()),
            "WIL_Report_2025-03-14.pdf"
        );
    }

    #[test]
    fn header_carries_title_and_generation_timestamp() {
        let layout = compile_layout("WIL Report", date(), &[]);
        assert_eq!(layout.pages.len(), 1);
        assert_eq!(
            layout.pages[0].placements[0],
            Placement::Text {
                text: "WIL Report".to_string(),
                size_pt: 20.0,
                bold: true,
                y_mm: 20.0,
            }
        );
        assert_eq!(
            layout.pages[0].placements[1],
            Placement::Text {
                text: "Generated on: 2025-03-14 09:30:05".to_string(),
                size_pt: 10.0,
                bold: false,
                y_mm: 30.0,
            }
        );
    }

    #[test]
    fn canonical_capture_scales_to_half_content_width() {
        // 1200x600 at 170mm wide is 85mm tall.
        let layout = compile_layout("WIL Report", date(), &[surface("Chart", 1200, 600)]);
        match &layout.pages[0].placements[3] {
            Placement::Image {
                width_mm,
                height_mm,
                y_mm,
                ..
            } => {
                assert_eq!(*width_mm, 170.0);
                assert_eq!(*height_mm, 85.0);
                // Header cursor (55) plus the title advance.
                assert_eq!(*y_mm, 70.0);
            }
            other => panic!("expected image placement, got {other:?}"),
        }
    }

    #[test]
    fn two_canonical_captures_share_the_first_page() {
        let surfaces = vec![surface("A", 1200, 600), surface("B", 1200, 600)];
        let layout = compile_layout("WIL Report", date(), &surfaces);
        // 55 + 15 + 85 + 20 = 175; 175 + 85 + 30 = 290 > 277 breaks.
        assert_eq!(layout.pages.len(), 2);
        assert_eq!(layout.pages[0].placements.len(), 4);
        assert_eq!(layout.pages[1].placements.len(), 2);
    }

    #[test]
    fn tall_captures_get_one_page_each() {
        // 170mm wide at a 1:0.907 ratio is ~154mm tall, too tall to
        // stack two on any page.
        let surfaces = vec![
            surface("A", 1000, 907),
            surface("B", 1000, 907),
            surface("C", 1000, 907),
        ];
        let layout = compile_layout("WIL Report", date(), &surfaces);
        assert_eq!(layout.pages.len(), 3);
        for page in &layout.pages {
            let images = page
                .placements
                .iter()
                .filter(|p| matches!(p, Placement::Image { .. }))
                .count();
            assert_eq!(images, 1);
        }
    }

    #[test]
    fn image_indices_stay_in_capture_order() {
        let surfaces = vec![
            surface("A", 1200, 600),
            surface("B", 1200, 600),
            surface("C", 1200, 600),
        ];
        let layout = compile_layout("WIL Report", date(), &surfaces);
        let indices: Vec<usize> = layout
            .pages
            .iter()
            .flat_map(|p| &p.placements)
            .filter_map(|p| match p {
                Placement::Image { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn renders_pdf_bytes() {
        let surfaces = vec![surface("Chart", 120, 60)];
        let bytes = compile_pdf("WIL Report", date(), &surfaces).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
