//! Frequency charts rendered as PNG images.
//!
//! The pipeline only hands rankings to a [`ChartRenderer`] and stores the
//! returned bytes; it never draws anything itself. Text is drawn with the
//! `font8x8` bitmap glyphs (Basic Latin and Latin-1), scaled up.

use std::f64::consts::TAU;
use std::io::Cursor;

use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use image::{ImageFormat, Rgb, RgbImage};

use crate::error::ChartError;

/// Number of tokens shown in the frequency chart.
pub const CHART_TOKENS: usize = 15;
/// Number of categories shown in the category chart.
pub const CHART_CATEGORIES: usize = 6;

/// Turns rankings into encoded images.
pub trait ChartRenderer: Send + Sync {
    /// Bar chart of the most frequent tokens of document `id`, most frequent
    /// first.
    fn frequency_chart(&self, id: &str, ranking: &[(&str, usize)]) -> Result<Vec<u8>, ChartError>;

    /// Pie chart of category shares of document `id`.
    fn category_chart(&self, id: &str, ranking: &[(&str, usize)]) -> Result<Vec<u8>, ChartError>;
}

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([60, 60, 60]);
const INK: Rgb<u8> = Rgb([20, 20, 20]);

// Side of one unscaled glyph, in pixels.
const GLYPH: u32 = 8;

// Bar chart frame: title above, token labels left, counts right, axis label below.
const BAR_TOP: u32 = 50;
const BAR_BOTTOM: u32 = 50;
const BAR_LEFT: u32 = 220;
const BAR_RIGHT: u32 = 70;

// Anchors of the viridis colormap, interpolated linearly.
const VIRIDIS: [[u8; 3]; 9] = [
    [68, 1, 84],
    [71, 44, 122],
    [59, 81, 139],
    [44, 113, 142],
    [33, 144, 141],
    [39, 173, 129],
    [92, 200, 99],
    [170, 220, 50],
    [253, 231, 37],
];

const TAB10: [[u8; 3]; 10] = [
    [31, 119, 180],
    [255, 127, 14],
    [44, 160, 44],
    [214, 39, 40],
    [148, 103, 189],
    [140, 86, 75],
    [227, 119, 194],
    [127, 127, 127],
    [188, 189, 34],
    [23, 190, 207],
];

/// Rasterises charts with the `image` crate.
#[derive(Debug, Clone)]
pub struct PngChartRenderer {
    pub bar_size: (u32, u32),
    pub pie_size: u32,
    /// Where the first wedge starts, in degrees counter-clockwise from 3 o'clock.
    pub start_angle: f64,
    /// Glyph magnification for titles and labels.
    pub text_scale: u32,
}

impl Default for PngChartRenderer {
    fn default() -> Self {
        PngChartRenderer {
            bar_size: (1000, 600),
            pie_size: 600,
            start_angle: 140.0,
            text_scale: 2,
        }
    }
}

impl ChartRenderer for PngChartRenderer {
    fn frequency_chart(&self, id: &str, ranking: &[(&str, usize)]) -> Result<Vec<u8>, ChartError> {
        let max = ranking.iter().map(|(_, c)| *c).max().unwrap_or(0);
        if max == 0 {
            return Err(ChartError::Empty);
        }
        let (width, height) = self.bar_size;
        let mut img = RgbImage::from_pixel(width, height, WHITE);
        let plot_w = width.saturating_sub(BAR_LEFT + BAR_RIGHT);
        let plot_h = height.saturating_sub(BAR_TOP + BAR_BOTTOM);
        let slot = (plot_h / ranking.len() as u32).max(1);
        let bar_h = (slot * 4 / 5).max(1);
        let label_scale = self.text_scale.min((bar_h / GLYPH).max(1));
        let label_chars = (BAR_LEFT.saturating_sub(2 * GLYPH) / (GLYPH * label_scale)) as usize;

        let title = format!("{} mots les plus fréquents : {id}", ranking.len());
        self.centred_title(&mut img, &title);

        // One horizontal bar per token, top to bottom in rank order.
        for (i, (token, count)) in ranking.iter().enumerate() {
            let len = (plot_w as u64 * *count as u64 / max as u64) as u32;
            let top = BAR_TOP + i as u32 * slot + (slot - bar_h) / 2;
            fill_rect(&mut img, BAR_LEFT, top, len, bar_h, viridis(i, ranking.len()));

            let text_y = (top + bar_h / 2).saturating_sub(GLYPH * label_scale / 2);
            let label = truncate(token, label_chars);
            let label_x =
                BAR_LEFT.saturating_sub(GLYPH + text_width(&label, label_scale));
            draw_text(&mut img, label_x, text_y, &label, label_scale, INK);
            draw_text(
                &mut img,
                BAR_LEFT + len + GLYPH,
                text_y,
                &count.to_string(),
                label_scale,
                INK,
            );
        }
        fill_rect(&mut img, BAR_LEFT, BAR_TOP, 1, plot_h, AXIS);
        fill_rect(&mut img, BAR_LEFT, BAR_TOP + plot_h, plot_w, 1, AXIS);

        let axis_label = "Fréquence";
        let x = BAR_LEFT + plot_w.saturating_sub(text_width(axis_label, self.text_scale)) / 2;
        let y = BAR_TOP + plot_h + (BAR_BOTTOM.saturating_sub(GLYPH * self.text_scale)) / 2;
        draw_text(&mut img, x, y, axis_label, self.text_scale, INK);
        encode(&img)
    }

    fn category_chart(&self, id: &str, ranking: &[(&str, usize)]) -> Result<Vec<u8>, ChartError> {
        let total: usize = ranking.iter().map(|(_, c)| c).sum();
        if total == 0 {
            return Err(ChartError::Empty);
        }
        let size = self.pie_size;
        let mut img = RgbImage::from_pixel(size, size, WHITE);
        let centre = size as f64 / 2.0;
        let radius = centre * 0.7;

        // Cumulative wedge boundaries as fractions of the full turn.
        let mut bounds = Vec::with_capacity(ranking.len());
        let mut acc = 0usize;
        for (_, count) in ranking {
            acc += count;
            bounds.push(acc as f64 / total as f64);
        }
        let start = self.start_angle.to_radians();

        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let dx = x as f64 + 0.5 - centre;
            let dy = centre - (y as f64 + 0.5);
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            let angle = (dy.atan2(dx) - start).rem_euclid(TAU) / TAU;
            let wedge = bounds
                .iter()
                .position(|b| angle < *b)
                .unwrap_or(bounds.len() - 1);
            let [r, g, b] = TAB10[wedge % TAB10.len()];
            *pixel = Rgb([r, g, b]);
        }

        // Category name outside each wedge, its share inside, both at mid-angle.
        let mut from = 0.0;
        for ((label, count), to) in ranking.iter().zip(&bounds) {
            let mid = start + (from + to) / 2.0 * TAU;
            from = *to;
            let share = format!("{:.1}%", *count as f64 * 100.0 / total as f64);
            self.text_at(&mut img, centre, mid, radius * 0.6, &share);
            self.text_at(&mut img, centre, mid, radius * 1.18, label);
        }

        let title = format!("Catégories grammaticales principales : {id}");
        self.centred_title(&mut img, &title);
        encode(&img)
    }
}

impl PngChartRenderer {
    /// Title centred at the top, shrunk to fit the image width.
    fn centred_title(&self, img: &mut RgbImage, title: &str) {
        let width = img.width();
        let scale = if text_width(title, self.text_scale) + 2 * GLYPH <= width {
            self.text_scale
        } else {
            1
        };
        let max_chars = (width.saturating_sub(2 * GLYPH) / (GLYPH * scale)) as usize;
        let title = truncate(title, max_chars);
        let x = width.saturating_sub(text_width(&title, scale)) / 2;
        draw_text(img, x, GLYPH * 2, &title, scale, INK);
    }

    /// Text centred on the point at `angle` and `distance` from the centre.
    fn text_at(&self, img: &mut RgbImage, centre: f64, angle: f64, distance: f64, text: &str) {
        let x = centre + distance * angle.cos() - text_width(text, self.text_scale) as f64 / 2.0;
        let y = centre - distance * angle.sin() - (GLYPH * self.text_scale) as f64 / 2.0;
        draw_text(img, x.max(0.0) as u32, y.max(0.0) as u32, text, self.text_scale, INK);
    }
}

fn viridis(i: usize, n: usize) -> Rgb<u8> {
    let t = if n <= 1 { 0.0 } else { i as f64 / (n - 1) as f64 };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let lo = scaled.floor() as usize;
    let hi = (lo + 1).min(VIRIDIS.len() - 1);
    let frac = scaled - lo as f64;
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    Rgb([
        mix(VIRIDIS[lo][0], VIRIDIS[hi][0]),
        mix(VIRIDIS[lo][1], VIRIDIS[hi][1]),
        mix(VIRIDIS[lo][2], VIRIDIS[hi][2]),
    ])
}

fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, colour: Rgb<u8>) {
    let x1 = x0.saturating_add(w).min(img.width());
    let y1 = y0.saturating_add(h).min(img.height());
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, colour);
        }
    }
}

/// Bitmap for `c`, `?` when the font has no glyph for it.
fn glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH * scale
}

/// At most `max_chars` characters, the last one replaced by `.` when cut.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('.');
    cut
}

/// Draws `text` with its top-left corner at `(x, y)`; clipped at the edges.
fn draw_text(img: &mut RgbImage, x: u32, y: u32, text: &str, scale: u32, colour: Rgb<u8>) {
    for (i, c) in text.chars().enumerate() {
        let gx = x.saturating_add(i as u32 * GLYPH * scale);
        // Row bytes top to bottom, bit 0 is the leftmost pixel.
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH {
                if bits & (1 << col) != 0 {
                    let px = gx.saturating_add(col * scale);
                    let py = y.saturating_add(row as u32 * scale);
                    fill_rect(img, px, py, scale, scale, colour);
                }
            }
        }
    }
}

fn encode(img: &RgbImage) -> Result<Vec<u8>, ChartError> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// Angle in radians, counter-clockwise from 3 o'clock, of pixel `(x, y)`
/// relative to the centre of a `size`-pixel square image.
#[cfg(test)]
fn pixel_angle(x: u32, y: u32, size: u32) -> f64 {
    let c = size as f64 / 2.0;
    (c - (y as f64 + 0.5)).atan2(x as f64 + 0.5 - c).rem_euclid(TAU)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn decode(bytes: &[u8]) -> RgbImage {
        image::load_from_memory(bytes).unwrap().to_rgb8()
    }

    fn has_ink(img: &RgbImage, x0: u32, y0: u32, x1: u32, y1: u32) -> bool {
        (y0..y1).any(|y| (x0..x1).any(|x| *img.get_pixel(x, y) == INK))
    }

    #[test]
    fn frequency_chart_is_png() {
        let bytes = PngChartRenderer::default()
            .frequency_chart("fable", &[("le", 3), ("chat", 2), ("dort", 1)])
            .unwrap();
        assert!(bytes.starts_with(PNG_MAGIC));
        let img = decode(&bytes);
        assert_eq!(img.dimensions(), (1000, 600));
        // Longest bar reaches the right edge of the plot area; the shortest does not.
        let plot_right = 1000 - BAR_RIGHT;
        let slot = (600 - BAR_TOP - BAR_BOTTOM) / 3;
        let first_row = BAR_TOP + slot / 2;
        let last_row = BAR_TOP + 2 * slot + slot / 2;
        assert_ne!(*img.get_pixel(plot_right - 5, first_row), WHITE);
        assert_eq!(*img.get_pixel(plot_right - 5, last_row), WHITE);
    }

    #[test]
    fn frequency_chart_has_title_labels_and_axis_name() {
        let img = decode(
            &PngChartRenderer::default()
                .frequency_chart("fable", &[("le", 3), ("chat", 2)])
                .unwrap(),
        );
        assert!(has_ink(&img, 0, 0, 1000, BAR_TOP), "title missing");
        assert!(has_ink(&img, 0, BAR_TOP, BAR_LEFT, 600 - BAR_BOTTOM), "token labels missing");
        assert!(has_ink(&img, BAR_LEFT, 600 - BAR_BOTTOM + 1, 1000, 600), "axis label missing");
    }

    #[test]
    fn category_chart_is_png() {
        let bytes = PngChartRenderer::default()
            .category_chart("fable", &[("NOUN", 3), ("DET", 1)])
            .unwrap();
        let img = decode(&bytes);
        assert_eq!(img.dimensions(), (600, 600));
        assert_eq!(*img.get_pixel(0, 0), WHITE);
        assert!(has_ink(&img, 0, 0, 600, 40), "title missing");
    }

    #[test]
    fn wedges_carry_percentages() {
        let img = decode(
            &PngChartRenderer::default()
                .category_chart("d", &[("A", 1), ("B", 1)])
                .unwrap(),
        );
        // Share of the first wedge, drawn at 0.6 radius on its mid-angle (230 deg).
        let a = 230f64.to_radians();
        let (x, y) = (300.0 + 126.0 * a.cos(), 300.0 - 126.0 * a.sin());
        let (x, y) = (x as u32, y as u32);
        assert!(has_ink(&img, x - 40, y - 10, x + 40, y + 10));
    }

    #[test]
    fn first_wedge_starts_at_start_angle() {
        let renderer = PngChartRenderer::default();
        let bytes = renderer.category_chart("d", &[("A", 1), ("B", 1)]).unwrap();
        let img = decode(&bytes);
        // Just counter-clockwise of 140 degrees lies the first wedge, just
        // clockwise of it the last one.
        let probe = |deg: f64| {
            let r = 180.0;
            let a = deg.to_radians();
            let x = (300.0 + r * a.cos()) as u32;
            let y = (300.0 - r * a.sin()) as u32;
            assert!((pixel_angle(x, y, 600).to_degrees() - deg).abs() < 1.0);
            *img.get_pixel(x, y)
        };
        let [r, g, b] = TAB10[0];
        assert_eq!(probe(150.0), Rgb([r, g, b]));
        let [r, g, b] = TAB10[1];
        assert_eq!(probe(130.0), Rgb([r, g, b]));
    }

    #[test]
    fn empty_rankings_are_rejected() {
        let renderer = PngChartRenderer::default();
        assert!(matches!(renderer.frequency_chart("d", &[]), Err(ChartError::Empty)));
        assert!(matches!(renderer.category_chart("d", &[]), Err(ChartError::Empty)));
    }

    #[test]
    fn glyphs_cover_french_letters() {
        assert_ne!(glyph('é'), glyph('?'));
        assert_ne!(glyph('ç'), glyph('?'));
        assert_eq!(glyph('\u{2603}'), glyph('?'));
    }

    #[test]
    fn long_labels_are_cut() {
        assert_eq!(truncate("anticonstitutionnellement", 6), "antic.");
        assert_eq!(truncate("chat", 6), "chat");
    }

    #[test]
    fn viridis_endpoints() {
        assert_eq!(viridis(0, 15), Rgb([68, 1, 84]));
        assert_eq!(viridis(14, 15), Rgb([253, 231, 37]));
        assert_eq!(viridis(0, 1), Rgb([68, 1, 84]));
    }
}
