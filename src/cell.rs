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

//! Composition of one day cell on a month grid.

use anyhow::Result;

use tracing::trace;

use crate::calendar::Day;
use crate::config::*;
use crate::draw::{Draw, Mask, ShapeStyle, TextOptions};
use crate::fonts::{Align, Anchor, Font};
use crate::geometry::BBox;
use crate::moon;
use crate::raster::load_image_surface;
use crate::render_prims::Color;

/// Draws `day` into `pos` (in the unit of `draw`).
///
/// Text over a photo gets a translucent dark band behind it and is drawn in
/// white; text on a bare cell is drawn dark with no band. Returns the band,
/// when one was drawn.
pub fn draw_cell(draw: &Draw, day: &Day, pos: BBox) -> Result<Option<BBox>> {
    let img = pos.shrink(CELL_IMAGE_INSET);

    let has_photo = match &day.photo {
        Some(path) => {
            let photo = load_image_surface(path)?;
            draw.paste_cover(&photo, img, Mask::Opaque)?;
            true
        }
        None => false,
    };

    if let Some(number) = day.day {
        let font = Font::new(FONT_DAY_NUMBER, draw.res());
        let at = BBox::new(CELL_NUMBER_INSET, CELL_NUMBER_INSET, CELL_NUMBER_SIZE, CELL_NUMBER_SIZE)
            .move_by(img.x(), img.y());
        draw.text(
            &number.to_string(),
            at.origin(),
            &font,
            &TextOptions::new(RGB_BLACK.into(), Anchor::LEFT_TOP),
        )?;
    }

    if let Some(phase) = day.moon_phase {
        let at = BBox::new(
            img.width() - MOON_ICON_SIZE - MOON_ICON_MARGIN,
            MOON_ICON_MARGIN,
            MOON_ICON_SIZE,
            MOON_ICON_SIZE,
        )
        .move_by(img.x(), img.y());
        let icon = moon::icon(phase, draw.res().to_pt(&MOON_ICON_SIZE))?;
        draw.paste(&icon, at.origin(), Mask::OwnAlpha)?;
    }

    let text = match &day.text {
        Some(text) if !text.is_empty() => text,
        _ => return Ok(None),
    };

    let font = Font::new(FONT_DAY_TEXT, draw.res());
    let wrapped = draw.get_multiline_text(text, pos.width(), &font);
    let x = pos.center().0;

    if !has_photo {
        let opts = TextOptions::new(RGB_BLACK.into(), Anchor::MIDDLE_BOTTOM).align(Align::Center);
        draw.text(&wrapped, (x, pos.bottom - PLAIN_TEXT_LIFT), &font, &opts)?;
        return Ok(None);
    }

    let opts = TextOptions::new(RGB_WHITE.into(), Anchor::MIDDLE_BOTTOM).align(Align::Center);
    let text_box = draw.textbbox(&wrapped, (x, pos.bottom), &font, &opts)?;
    let band = BBox::from_edges(
        (text_box.left - TEXT_BAND_MARGIN).max(pos.left),
        (text_box.top - TEXT_BAND_MARGIN).max(pos.top),
        (text_box.right + TEXT_BAND_MARGIN).min(pos.right),
        pos.bottom,
    );
    trace!(?band, "text band");

    draw.rectangle(band, &ShapeStyle::filled(Color::rgba(RGB_TEXT_BAND, TEXT_BAND_ALPHA)))?;
    draw.text(&wrapped, (x, pos.bottom), &font, &opts)?;

    Ok(Some(band))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::Page;
    use crate::moon::MoonPhase;
    use crate::raster::pixel_rgba;
    use crate::render_prims::rgb;
    use crate::units::Resolution;

    fn photo(dir: &std::path::Path) -> Result<std::path::PathBuf> {
        let path = dir.join("green.png");
        let green = image::RgbaImage::from_pixel(8, 8, image::Rgba([0, 200, 0, 255]));
        green.save(&path)?;
        Ok(path)
    }

    fn cell_page() -> Result<Page> {
        Page::new(2.0, 2.0, Resolution::inches(96), Some(rgb(0xFFFFFF).into()))
    }

    #[test]
    fn bare_cell_text_has_no_band() -> Result<()> {
        let page = cell_page()?;
        let day = Day {
            day: Some(14),
            text: Some("Valentine's".into()),
            ..Default::default()
        };
        let band = draw_cell(&page.draw()?, &day, BBox::new(0.0, 0.0, 2.0, 2.0))?;
        assert!(band.is_none());

        // The bottom edge stays white: nothing is drawn under the lifted text.
        assert_eq!(pixel_rgba(page.surface(), 96, 190)?, [255, 255, 255, 255]);
        Ok(())
    }

    #[test]
    fn photo_cell_text_gets_a_band() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let page = cell_page()?;
        let day = Day {
            day: Some(14),
            photo: Some(photo(dir.path())?),
            text: Some("Valentine's".into()),
            ..Default::default()
        };
        let pos = BBox::new(0.0, 0.0, 2.0, 2.0);
        let band = draw_cell(&page.draw()?, &day, pos)?;

        let band = band.unwrap_or_default();
        assert!(band.width() > 0.0 && band.width() < pos.width());
        assert_eq!(band.bottom, pos.bottom);

        // Photo shows through, darkened, inside the band; untouched outside.
        let inside = pixel_rgba(page.surface(), (band.left * 96.0) as i32 + 1, 190)?;
        let outside = pixel_rgba(page.surface(), 3, 100)?;
        assert_eq!(outside, [0, 200, 0, 255]);
        assert!(inside[1] < 200 && inside[1] > 60, "{:?}", inside);
        assert_eq!(inside[0], 0);
        Ok(())
    }

    /// Pixels of the box the wrapped text occupies, rounded inward.
    fn text_pixels(draw: &Draw, text: &str, pos: BBox, photo: bool) -> Result<Vec<(i32, i32)>> {
        let font = Font::new(FONT_DAY_TEXT, draw.res());
        let wrapped = draw.get_multiline_text(text, pos.width(), &font);
        let y = if photo { pos.bottom } else { pos.bottom - PLAIN_TEXT_LIFT };
        let opts = TextOptions::new(RGB_BLACK.into(), Anchor::MIDDLE_BOTTOM).align(Align::Center);
        let b = draw.res().to_pt(&draw.textbbox(&wrapped, (pos.center().0, y), &font, &opts)?);

        let (x0, x1) = (b.left.ceil() as i32, (b.right.floor() as i32).min(190));
        let (y0, y1) = (b.top.ceil() as i32, (b.bottom.floor() as i32).min(190));
        Ok((y0..y1).flat_map(|y| (x0..x1).map(move |x| (x, y))).collect())
    }

    /// Share of `pixels` still showing `background`, and their mean level.
    fn behind_text(page: &Page, pixels: &[(i32, i32)], background: [u8; 4]) -> Result<(f64, f64)> {
        let mut untouched = 0;
        let mut sum = 0.0;
        for &(x, y) in pixels {
            let p = pixel_rgba(page.surface(), x, y)?;
            if p == background {
                untouched += 1;
            }
            sum += (p[0] as f64 + p[1] as f64 + p[2] as f64) / 3.0;
        }
        let n = pixels.len().max(1) as f64;
        Ok((untouched as f64 / n, sum / n))
    }

    #[test]
    fn text_background_follows_photo() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let pos = BBox::new(0.0, 0.0, 2.0, 2.0);
        let text = "Valentine's";

        let bare = cell_page()?;
        let bare_day = Day {
            day: Some(14),
            text: Some(text.into()),
            ..Default::default()
        };
        let draw = bare.draw()?;
        draw_cell(&draw, &bare_day, pos)?;
        let region = text_pixels(&draw, text, pos, false)?;
        assert!(!region.is_empty());
        let (bare_share, bare_mean) = behind_text(&bare, &region, [255, 255, 255, 255])?;

        let shaded = cell_page()?;
        let photo_day = Day {
            photo: Some(photo(dir.path())?),
            ..bare_day
        };
        let draw = shaded.draw()?;
        draw_cell(&draw, &photo_day, pos)?;
        let region = text_pixels(&draw, text, pos, true)?;
        assert!(!region.is_empty());
        let (photo_share, photo_mean) = behind_text(&shaded, &region, [0, 200, 0, 255])?;

        // Bare text sits on the untouched page; over a photo every pixel
        // behind the text is covered by the band.
        assert!(bare_share > 0.5, "{}", bare_share);
        assert_eq!(photo_share, 0.0);
        assert!(bare_mean > photo_mean + 50.0, "{} vs {}", bare_mean, photo_mean);
        Ok(())
    }

    #[test]
    fn moon_icon_sits_top_right() -> Result<()> {
        let page = cell_page()?;
        let day = Day {
            day: Some(1),
            moon_phase: Some(MoonPhase::Full),
            ..Default::default()
        };
        draw_cell(&page.draw()?, &day, BBox::new(0.0, 0.0, 2.0, 2.0))?;

        // Icon center: x = 2 - .01 - .05 - .1, y = .01 + .05 + .1 inches.
        let center = pixel_rgba(page.surface(), 177, 15)?;
        assert_ne!(center, [255, 255, 255, 255]);
        assert_eq!(pixel_rgba(page.surface(), 100, 100)?, [255, 255, 255, 255]);
        Ok(())
    }
}
