use crate::image::{Image, Rect};

/// Result of comparing two successive captured images.
///
/// `Full` and `Empty` carry no data beyond the variant itself; `Partial`
/// carries the tightest bounding rectangle of the pixels that changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDiff {
    Empty,
    Full,
    Partial(Rect),
}

/// Compare `prev` against `cur` and decide what kind of frame to emit.
///
/// Pure function: given `prev` and `cur`, the result depends on nothing
/// else. `prev` absent or a dimension mismatch both force `Full`, since
/// there is nothing meaningful to diff against.
#[must_use]
pub fn diff(prev: Option<&Image>, cur: &Image) -> FrameDiff {
    let Some(prev) = prev else {
        return FrameDiff::Full;
    };

    if prev.dimensions() != cur.dimensions() {
        return FrameDiff::Full;
    }

    if prev.pixels == cur.pixels {
        return FrameDiff::Empty;
    }

    FrameDiff::Partial(bounding_rect(prev, cur))
}

/// Tightest axis-aligned bounding rectangle of the pixels that differ
/// between two same-size images.
///
/// `prev` and `cur` are assumed identical in dimensions and known to
/// differ somewhere (callers only reach this after the fast equality
/// check in [`diff`] fails).
fn bounding_rect(prev: &Image, cur: &Image) -> Rect {
    let width = cur.width;
    let height = cur.height;
    let stride = width as usize * 4;

    let mut min_x = width;
    let mut max_x = 0u32;
    let mut min_y = height;
    let mut max_y = 0u32;

    for y in 0..height {
        let row_start = y as usize * stride;
        let row_end = row_start + stride;
        let prev_row = &prev.pixels[row_start..row_end];
        let cur_row = &cur.pixels[row_start..row_end];

        if prev_row == cur_row {
            continue;
        }

        let mut row_min_x = None;
        let mut row_max_x = 0u32;
        for x in 0..width {
            let px = x as usize * 4;
            if prev_row[px..px + 4] != cur_row[px..px + 4] {
                if row_min_x.is_none() {
                    row_min_x = Some(x);
                }
                row_max_x = x;
            }
        }

        if let Some(row_min_x) = row_min_x {
            min_x = min_x.min(row_min_x);
            max_x = max_x.max(row_max_x);
            min_y = min_y.min(y);
            max_y = y;
        }
    }

    Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_with_pixel(width: u32, height: u32, x: u32, y: u32, color: [u8; 4]) -> Image {
        let mut img = Image::blank(width, height);
        let idx = (y as usize * width as usize + x as usize) * 4;
        img.pixels[idx..idx + 4].copy_from_slice(&color);
        img
    }

    #[test]
    fn no_prev_is_full() {
        let cur = Image::blank(4, 4);
        assert_eq!(diff(None, &cur), FrameDiff::Full);
    }

    #[test]
    fn dimension_mismatch_is_full() {
        let prev = Image::blank(4, 4);
        let cur = Image::blank(8, 4);
        assert_eq!(diff(Some(&prev), &cur), FrameDiff::Full);
    }

    #[test]
    fn identical_pixels_is_empty() {
        let prev = Image::blank(10, 10);
        let cur = Image::blank(10, 10);
        assert_eq!(diff(Some(&prev), &cur), FrameDiff::Empty);
    }

    #[test]
    fn single_pixel_change_is_tight_rect() {
        let prev = Image::blank(10, 10);
        let cur = image_with_pixel(10, 10, 3, 4, [0xFF, 0, 0, 0xFF]);
        assert_eq!(
            diff(Some(&prev), &cur),
            FrameDiff::Partial(Rect::new(3, 4, 1, 1))
        );
    }

    #[test]
    fn rect_is_tightest_bounding_box() {
        let prev = Image::blank(10, 10);
        let mut cur = Image::blank(10, 10);
        // Two corners of a square change; the bbox must cover both.
        let top_left = (2u32, 2u32);
        let bottom_right = (6u32, 5u32);
        for &(x, y) in &[top_left, bottom_right] {
            let idx = (y as usize * 10 + x as usize) * 4;
            cur.pixels[idx..idx + 4].copy_from_slice(&[9, 9, 9, 0xFF]);
        }

        match diff(Some(&prev), &cur) {
            FrameDiff::Partial(rect) => {
                assert_eq!(rect, Rect::new(2, 2, 5, 4));
            }
            other => panic!("expected Partial, got {other:?}"),
        }
    }

    #[test]
    fn diff_is_deterministic() {
        let prev = image_with_pixel(6, 6, 1, 1, [1, 2, 3, 4]);
        let cur = image_with_pixel(6, 6, 4, 5, [5, 6, 7, 8]);
        assert_eq!(diff(Some(&prev), &cur), diff(Some(&prev), &cur));
    }
}
