//! Image drawing with Unicode `▀` half-blocks (2 pixels per cell).
//!
//! Each cell shows one pixel wide by two pixels tall: the upper half is the
//! foreground colour and the lower half the background.

use image::imageops::FilterType;
use image::RgbaImage;
use ratatui::{buffer::Buffer, layout::Position, layout::Rect, style::Color};

use super::layout::Placement;

/// Stretch `thumb` over the whole placement, drawing only the part that
/// falls inside `clip`.  Cards are laid out with the photo's own aspect
/// ratio, so stretching keeps proportions.
pub fn render_fill(thumb: &RgbaImage, placement: Placement, clip: Rect, buf: &mut Buffer) {
    if placement.width == 0 || placement.height == 0 || thumb.width() == 0 || thumb.height() == 0 {
        return;
    }
    let rgba = image::imageops::resize(
        thumb,
        placement.width as u32,
        placement.height as u32 * 2,
        FilterType::Triangle,
    );
    paint(&rgba, placement.x, placement.y, clip, buf);
}

/// Fit `thumb` inside the placement, preserving aspect ratio and centring
/// it, drawing only the part that falls inside `clip`.
pub fn render_fit(thumb: &RgbaImage, placement: Placement, clip: Rect, buf: &mut Buffer) {
    if placement.width == 0 || placement.height == 0 || thumb.width() == 0 || thumb.height() == 0 {
        return;
    }

    // Available pixels: each column = 1 px wide, each row = 2 px tall.
    let max_px_w = placement.width as f64;
    let max_px_h = (placement.height as f64) * 2.0;

    let src_w = thumb.width() as f64;
    let src_h = thumb.height() as f64;

    let scale = (max_px_w / src_w).min(max_px_h / src_h);
    let fit_w = (src_w * scale).round().max(1.0) as u32;
    let fit_h = (src_h * scale).round().max(1.0) as u32;

    let rgba = image::imageops::resize(thumb, fit_w, fit_h, FilterType::Triangle);
    let col_offset = (placement.width.saturating_sub(rgba.width() as u16)) / 2;
    let row_offset = (placement.height.saturating_sub(rgba.height().div_ceil(2) as u16)) / 2;
    paint(
        &rgba,
        placement.x + col_offset as i32,
        placement.y + row_offset as i32,
        clip,
        buf,
    );
}

fn paint(rgba: &RgbaImage, x0: i32, y0: i32, clip: Rect, buf: &mut Buffer) {
    let (iw, ih) = (rgba.width(), rgba.height());
    for row in 0..ih.div_ceil(2) {
        let y = y0 + row as i32;
        if y < clip.y as i32 || y >= clip.bottom() as i32 {
            continue;
        }
        let yt = row * 2;
        let yb = yt + 1;
        for col in 0..iw {
            let x = x0 + col as i32;
            if x < clip.x as i32 || x >= clip.right() as i32 {
                continue;
            }
            let t = rgba.get_pixel(col, yt);
            let fg = Color::Rgb(t[0], t[1], t[2]);
            let bg = if yb < ih {
                let b = rgba.get_pixel(col, yb);
                Color::Rgb(b[0], b[1], b[2])
            } else {
                Color::Reset
            };
            if let Some(cell) = buf.cell_mut(Position::new(x as u16, y as u16)) {
                cell.set_char('▀').set_fg(fg).set_bg(bg);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, rgb: [u8; 3]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, image::Rgba([rgb[0], rgb[1], rgb[2], 255]))
    }

    #[test]
    fn fill_respects_the_clip() {
        let area = Rect::new(0, 0, 10, 4);
        let mut buf = Buffer::empty(area);
        let placement = Placement { x: -2, y: 0, width: 6, height: 2 };
        render_fill(&solid(6, 4, [200, 0, 0]), placement, area, &mut buf);

        assert_eq!(buf[(0, 0)].symbol(), "▀");
        assert_eq!(buf[(3, 1)].fg, Color::Rgb(200, 0, 0));
        // Past the placement's right edge.
        assert_eq!(buf[(4, 0)].symbol(), " ");
        // Below it.
        assert_eq!(buf[(0, 2)].symbol(), " ");
    }

    #[test]
    fn fit_centres_horizontally() {
        let area = Rect::new(0, 0, 10, 2);
        let mut buf = Buffer::empty(area);
        render_fit(&solid(4, 4, [0, 0, 255]), Placement::from(area), area, &mut buf);
        // A square 4x4 image fits as 4 columns by 2 rows, centred at col 3.
        assert_eq!(buf[(2, 0)].symbol(), " ");
        assert_eq!(buf[(3, 0)].symbol(), "▀");
        assert_eq!(buf[(6, 1)].bg, Color::Rgb(0, 0, 255));
        assert_eq!(buf[(7, 0)].symbol(), " ");
    }
}
