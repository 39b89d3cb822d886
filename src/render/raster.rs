//! SVG to RGBA rasterization.

use std::sync::Arc;

use once_cell::sync::Lazy;
use usvg::fontdb;

use super::{RasterImage, RenderError};

/// System font database, loaded once. Chart text uses generic families
/// so whatever the host provides resolves.
static FONTS: Lazy<Arc<fontdb::Database>> = Lazy::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    Arc::new(db)
});

/// Rasterize SVG markup onto an opaque white pixmap of the given size.
pub fn rasterize_svg(svg: &str, width: u32, height: u32) -> Result<RasterImage, RenderError> {
    let options = usvg::Options {
        fontdb: Arc::clone(&FONTS),
        ..usvg::Options::default()
    };
    let tree =
        usvg::Tree::from_str(svg, &options).map_err(|err| RenderError::InvalidSvg(err.to_string()))?;

    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or(RenderError::ZeroSize)?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    Ok(RasterImage {
        width,
        height,
        rgba: pixmap.take(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rasterizes_a_rect_onto_white() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"><rect x="0" y="0" width="2" height="2" fill="black"/></svg>"#;
        let image = rasterize_svg(svg, 4, 4).unwrap();
        assert_eq!(image.rgba.len(), 4 * 4 * 4);
        // Top-left pixel painted, bottom-right stays white.
        assert_eq!(&image.rgba[0..3], &[0, 0, 0]);
        assert_eq!(&image.rgba[image.rgba.len() - 4..][..3], &[255, 255, 255]);
    }

    #[test]
    fn invalid_markup_is_reported() {
        assert!(matches!(
            rasterize_svg("not svg", 4, 4),
            Err(RenderError::InvalidSvg(_))
        ));
    }

    #[test]
    fn zero_size_is_rejected() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"/>"#;
        assert!(matches!(
            rasterize_svg(svg, 0, 10),
            Err(RenderError::ZeroSize)
        ));
    }
}
