//! Page geometry and pagination.
//!
//! The container is rasterized as one tall image. Pagination maps the image
//! onto the printable width of an A4 page and cuts it into bands of the
//! printable height. Each band becomes one page; band `k` starts exactly
//! where band `k - 1` ends, so content flows across pages without gaps or
//! overlap.

/// A4 width in millimetres.
pub const A4_WIDTH_MM: f64 = 210.0;
/// A4 height in millimetres.
pub const A4_HEIGHT_MM: f64 = 297.0;
/// Default page margin in millimetres.
pub const DEFAULT_MARGIN_MM: f64 = 10.0;
/// Logical layout width in CSS pixels (A4 width at 96 DPI).
pub const LAYOUT_WIDTH_PX: u32 = 794;
/// Oversampling factor applied when rasterizing.
pub const RASTER_SCALE: f32 = 2.0;

const MM_PER_INCH: f64 = 25.4;
const POINTS_PER_INCH: f64 = 72.0;

/// Leftover band height below which no further page is started.
const BAND_EPSILON_MM: f64 = 1e-6;

/// Page size, margins and raster parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub margin_mm: f64,
    /// Viewport width the container is laid out at.
    pub layout_width_px: u32,
    /// Rasterization zoom factor.
    pub scale: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_width_mm: A4_WIDTH_MM,
            page_height_mm: A4_HEIGHT_MM,
            margin_mm: DEFAULT_MARGIN_MM,
            layout_width_px: LAYOUT_WIDTH_PX,
            scale: RASTER_SCALE,
        }
    }
}

impl PageLayout {
    /// A4 layout with the given margin.
    #[must_use]
    pub fn with_margin(margin_mm: f64) -> Self {
        Self {
            margin_mm,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn printable_width_mm(&self) -> f64 {
        self.page_width_mm - 2.0 * self.margin_mm
    }

    #[must_use]
    pub fn printable_height_mm(&self) -> f64 {
        self.page_height_mm - 2.0 * self.margin_mm
    }

    /// Height in millimetres of a raster scaled to the printable width.
    #[must_use]
    pub fn image_height_mm(&self, raster_width_px: u32, raster_height_px: u32) -> f64 {
        if raster_width_px == 0 {
            return 0.0;
        }
        f64::from(raster_height_px) * self.printable_width_mm() / f64::from(raster_width_px)
    }

    /// Vertical offset in millimetres of each page band from the raster top.
    #[must_use]
    pub fn page_offsets(&self, raster_width_px: u32, raster_height_px: u32) -> Vec<f64> {
        page_offsets(
            self.image_height_mm(raster_width_px, raster_height_px),
            self.printable_height_mm(),
        )
    }
}

/// Cut an image `image_height_mm` tall into bands `band_height_mm` tall.
///
/// The first page is always emitted, even for an empty image. Further pages
/// are added while content remains below the previous band, so an image
/// that is exactly `n` bands tall yields exactly `n` pages.
#[must_use]
pub fn page_offsets(image_height_mm: f64, band_height_mm: f64) -> Vec<f64> {
    let mut offsets = vec![0.0];
    if band_height_mm <= 0.0 {
        return offsets;
    }

    let mut remaining = image_height_mm - band_height_mm;
    while remaining > BAND_EPSILON_MM {
        let next = offsets.len();
        #[allow(clippy::cast_precision_loss)]
        offsets.push(next as f64 * band_height_mm);
        remaining -= band_height_mm;
    }
    offsets
}

/// Convert millimetres to PDF points.
#[must_use]
pub fn mm_to_pt(mm: f64) -> f64 {
    mm / MM_PER_INCH * POINTS_PER_INCH
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_printable_area() {
        let layout = PageLayout::default();
        assert_eq!(layout.printable_width_mm(), 190.0);
        assert_eq!(layout.printable_height_mm(), 277.0);
    }

    #[test]
    fn test_exact_multiple_gives_exact_page_count() {
        for n in 1..=5_u32 {
            let offsets = page_offsets(f64::from(n) * 277.0, 277.0);
            assert_eq!(offsets.len(), n as usize, "n = {n}");
        }
    }

    #[test]
    fn test_exact_multiple_through_raster_scaling() {
        let layout = PageLayout::default();
        // 1900 px wide maps to 190 mm, so 10 px per mm
        let offsets = layout.page_offsets(1900, 5540);
        assert_eq!(layout.image_height_mm(1900, 5540), 554.0);
        assert_eq!(offsets, vec![0.0, 277.0]);
    }

    #[test]
    fn test_partial_last_page() {
        assert_eq!(page_offsets(277.5, 277.0).len(), 2);
        assert_eq!(page_offsets(276.9, 277.0).len(), 1);
    }

    #[test]
    fn test_empty_image_gives_one_page() {
        assert_eq!(page_offsets(0.0, 277.0), vec![0.0]);
        assert_eq!(PageLayout::default().page_offsets(0, 0), vec![0.0]);
    }

    #[test]
    fn test_offsets_are_contiguous() {
        let offsets = page_offsets(1000.0, 277.0);
        assert_eq!(offsets.len(), 4);
        for pair in offsets.windows(2) {
            assert_eq!(pair[1] - pair[0], 277.0);
        }
    }

    #[test]
    fn test_margin_changes_printable_area() {
        let layout = PageLayout::with_margin(20.0);
        assert_eq!(layout.printable_width_mm(), 170.0);
        assert_eq!(layout.printable_height_mm(), 257.0);
    }

    #[test]
    fn test_mm_to_pt() {
        assert!((mm_to_pt(25.4) - 72.0).abs() < 1e-9);
        assert!((mm_to_pt(A4_WIDTH_MM) - 595.275_590_551).abs() < 1e-6);
    }
}
