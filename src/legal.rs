// Copyright 2020-2021 bd_
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions: The above copyright
// notice and this permission notice shall be included in all copies or
// substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Imposes a desk page four times on a legal sheet for tent-fold printing:
//! two copies upright on top, two turned 180 degrees below, with dashed
//! cut guides along the seams.

use anyhow::Result;

use cairo::ImageSurface;
use tracing::debug;

use crate::config::{CUT_GUIDE_FRACTION, CUT_GUIDE_MIN_PX, DEFAULT_DPI, RGB_CUT_GUIDE, RGB_WHITE};
use crate::layout::{DESK_HEIGHT, DESK_WIDTH};
use crate::render_prims::{render_surface, RenderGroup, RenderableEx, Separator, SwapXY};

/// Pixels per inch of a desk page, judged from its pixel size. Width and
/// height each give an estimate; their mean is used.
pub fn derive_ppi(width: i32, height: i32) -> u32 {
    let ppi = (width as f64 / DESK_WIDTH + height as f64 / DESK_HEIGHT) / 2.0;
    if ppi.is_finite() && ppi >= 1.0 {
        ppi.round() as u32
    } else {
        DEFAULT_DPI
    }
}

/// Pixel size of one desk page at `ppi`.
pub fn tile_size(ppi: u32) -> (i32, i32) {
    (
        (DESK_WIDTH * ppi as f64).round() as i32,
        (DESK_HEIGHT * ppi as f64).round() as i32,
    )
}

fn cut_guide(length: f64, ppi: u32) -> Separator {
    let dash = (CUT_GUIDE_FRACTION * ppi as f64).round().max(CUT_GUIDE_MIN_PX);
    let thickness = (ppi as f64 / 150.0).round().max(1.0);
    // Centered on whole pixels just past the seam.
    Separator {
        color: RGB_CUT_GUIDE.into(),
        width: length,
        thickness,
        dash,
        gap: dash,
        margin: thickness / 2.0,
    }
}

/// The 14in x 8.5in sheet for `page`, and the ppi it was laid out at.
///
/// The cut guides are drawn last, over the first pixel row of the bottom
/// tiles and the first pixel column of the right-hand tiles. Everywhere
/// else each quadrant is pixel-identical to the tile, or to the tile turned
/// 180 degrees in the bottom row.
#[tracing::instrument(skip(page), fields(w = page.width(), h = page.height()))]
pub fn impose(page: &ImageSurface) -> Result<(ImageSurface, u32)> {
    let ppi = derive_ppi(page.width(), page.height());
    let (tw, th) = tile_size(ppi);

    let tile = if (page.width(), page.height()) == (tw, th) {
        page.clone()
    } else {
        debug!(ppi, tw, th, "resizing page to tile");
        let scaled = page
            .clone()
            .scale_by(tw as f64 / page.width() as f64, th as f64 / page.height() as f64);
        render_surface(tw, th, None, &scaled)?
    };

    let (w, h) = (tw as f64, th as f64);
    let mut sheet = RenderGroup::new();
    sheet.push(tile.clone());
    sheet.push(tile.clone().offset(w, 0.0));
    sheet.push(tile.clone().rotate_180().offset(0.0, h));
    sheet.push(tile.rotate_180().offset(w, h));
    sheet.push(cut_guide(2.0 * w, ppi).offset(0.0, h));
    sheet.push(SwapXY::new(cut_guide(2.0 * h, ppi)).offset(w, 0.0));

    let out = render_surface(2 * tw, 2 * th, Some(RGB_WHITE.into()), &sheet)?;
    Ok((out, ppi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{pixel_rgba, surface_to_rgba};
    use crate::render_prims::{rgb, FillRect};

    const GUIDE: [u8; 4] = [RGB_CUT_GUIDE.0, RGB_CUT_GUIDE.1, RGB_CUT_GUIDE.2, 255];

    /// Blue, with a red square top-left and a green bar top-right so that
    /// mirroring and transposing are told apart from rotation.
    fn marked_page(ppi: u32) -> Result<ImageSurface> {
        let (w, h) = tile_size(ppi);
        let mut group = RenderGroup::new();
        group.push(FillRect::rect(rgb(0xFF0000).into(), 10.0, 10.0));
        group.push(FillRect::rect(rgb(0x00FF00).into(), 20.0, 5.0).offset(w as f64 - 20.0, 0.0));
        render_surface(w, h, Some(rgb(0x0000FF).into()), &group)
    }

    fn px(rgba: &[u8], width: usize, x: usize, y: usize) -> [u8; 4] {
        let o = (y * width + x) * 4;
        [rgba[o], rgba[o + 1], rgba[o + 2], rgba[o + 3]]
    }

    #[test]
    fn ppi_comes_from_pixel_size() {
        assert_eq!(derive_ppi(2100, 1275), 300);
        assert_eq!(derive_ppi(700, 425), 100);
        assert_eq!(derive_ppi(0, 0), DEFAULT_DPI);
    }

    #[test]
    fn guide_dash_scales_with_ppi() {
        let low = cut_guide(100.0, 40);
        assert_eq!((low.dash, low.gap, low.thickness), (6.0, 6.0, 1.0));

        let high = cut_guide(100.0, 400);
        assert_eq!((high.dash, high.gap, high.thickness), (12.0, 12.0, 3.0));
    }

    #[test]
    fn sheet_is_double_in_both_directions() -> Result<()> {
        let (sheet, ppi) = impose(&marked_page(40)?)?;
        assert_eq!(ppi, 40);
        assert_eq!((sheet.width(), sheet.height()), (560, 340));
        Ok(())
    }

    #[test]
    fn quadrants_match_the_tile_off_seam() -> Result<()> {
        let page = marked_page(40)?;
        let (sheet, _) = impose(&page)?;
        let (tw, th) = tile_size(40);
        let (tw, th) = (tw as usize, th as usize);

        let tile = surface_to_rgba(&page)?;
        let out = surface_to_rgba(&sheet)?;
        let sw = 2 * tw;

        for y in 0..th {
            for x in 0..tw {
                let upright = px(&tile, tw, x, y);
                let turned = px(&tile, tw, tw - 1 - x, th - 1 - y);

                assert_eq!(px(&out, sw, x, y), upright, "top left {},{}", x, y);
                if x > 0 {
                    assert_eq!(px(&out, sw, tw + x, y), upright, "top right {},{}", x, y);
                }
                if y > 0 {
                    assert_eq!(px(&out, sw, x, th + y), turned, "bottom left {},{}", x, y);
                    if x > 0 {
                        assert_eq!(px(&out, sw, tw + x, th + y), turned, "bottom right {},{}", x, y);
                    }
                }
            }
        }
        Ok(())
    }

    #[test]
    fn seams_carry_dashed_guides() -> Result<()> {
        let ppi = 40;
        let (sheet, _) = impose(&marked_page(ppi)?)?;
        let (tw, th) = tile_size(ppi);
        let dash = (CUT_GUIDE_FRACTION * ppi as f64).round().max(CUT_GUIDE_MIN_PX) as i32;
        let on = |i: i32| (i / dash) % 2 == 0;

        for x in (0..2 * tw).filter(|&x| x != tw) {
            let guide = pixel_rgba(&sheet, x, th)? == GUIDE;
            assert_eq!(guide, on(x), "row {} at x {}", th, x);
        }
        for y in (0..2 * th).filter(|&y| y != th) {
            let guide = pixel_rgba(&sheet, tw, y)? == GUIDE;
            assert_eq!(guide, on(y), "column {} at y {}", tw, y);
        }
        Ok(())
    }

    #[test]
    fn guides_stay_on_the_seams() -> Result<()> {
        let (sheet, _) = impose(&marked_page(40)?)?;
        let (tw, th) = tile_size(40);

        // The two guides cross each other; skip that seam.
        for x in (0..2 * tw).filter(|&x| x != tw) {
            for y in [th - 1, th + 1] {
                assert_ne!(pixel_rgba(&sheet, x, y)?, GUIDE, "{},{}", x, y);
            }
        }
        for y in (0..2 * th).filter(|&y| y != th) {
            for x in [tw - 1, tw + 1] {
                assert_ne!(pixel_rgba(&sheet, x, y)?, GUIDE, "{},{}", x, y);
            }
        }
        Ok(())
    }

    #[test]
    fn mismatched_input_is_resized_first() -> Result<()> {
        // 701 x 424 derives to 100 ppi, one pixel off the 700 x 425 tile.
        let odd = render_surface(701, 424, Some(rgb(0x00FF00).into()), &RenderGroup::new())?;
        let (sheet, ppi) = impose(&odd)?;
        assert_eq!(ppi, 100);
        assert_eq!((sheet.width(), sheet.height()), (1400, 850));
        assert_eq!(pixel_rgba(&sheet, 350, 200)?, [0, 255, 0, 255]);
        Ok(())
    }
}
