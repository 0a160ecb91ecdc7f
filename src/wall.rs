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

//! Letter-landscape wall calendar: a cover, then an artwork page and a
//! month grid page for every month.

use anyhow::Result;

use tracing::{debug, info_span};

use crate::calendar::{Calendar, CalendarArt, FrontPage, Month};
use crate::cell::draw_cell;
use crate::config::*;
use crate::decoder::{unexpected, Decoded, ImageDecoder, Model, ModelKind};
use crate::draw::{Mask, ShapeStyle, TextOptions};
use crate::fonts::{Align, Anchor, Font};
use crate::layout::{ArtLayout, FrontLayout, GridLayout};
use crate::raster::load_image_surface;
use crate::units::Length;

/// Pages per wall calendar: the cover plus two per month.
pub const PAGE_COUNT: usize = 1 + 12 * 2;

const ART_TITLE_INDENT: f64 = 0.5;
const ART_TITLE_SPACING: f64 = 0.05;

/// A decoder with every wall page handler registered.
pub fn decoder(dpi: u32) -> ImageDecoder {
    let mut dec = ImageDecoder::new(dpi);
    dec.register(ModelKind::FrontPage, draw_front_page);
    dec.register(ModelKind::CalendarArt, draw_art);
    dec.register(ModelKind::Month, draw_month);
    dec.register(ModelKind::Calendar, draw_calendar);
    dec
}

fn front_page(dec: &ImageDecoder, page: &FrontPage) -> Result<cairo::ImageSurface> {
    let layout = FrontLayout::wall();
    let out = layout.page.new_page(dec.res(), Some(RGB_BLACK.into()))?;
    let draw = out.draw()?;

    if let Some(path) = page.image() {
        let image = load_image_surface(path)?;
        draw.paste_cover(&image, layout.image_bbox(), Mask::Opaque)?;
    }

    let spec = page
        .title_font()
        .map_or(FONT_COVER_TITLE, |family| FONT_COVER_TITLE.with_family(family));
    let font = Font::new(spec, dec.res());
    let opts = TextOptions::new(RGB_WHITE.into(), Anchor::CENTER).align(Align::Center);
    draw.text(page.title(), layout.title_bbox().center(), &font, &opts)?;

    drop(draw);
    Ok(out.into_surface())
}

fn art(dec: &ImageDecoder, art: &CalendarArt) -> Result<cairo::ImageSurface> {
    let layout = ArtLayout::wall();
    let out = layout.page.new_page(dec.res(), Some(RGB_WHITE.into()))?;
    let draw = out.draw()?;

    if let Some(path) = art.image() {
        let image = load_image_surface(path)?;
        draw.paste_cover(&image, layout.image_bbox(), Mask::Opaque)?;
    }

    let font = Font::new(FONT_WALL_ART_TITLE, dec.res());
    let info = layout.info_bbox();
    let opts = TextOptions::new(RGB_BLACK.into(), Anchor::LEFT_TOP)
        .spacing(Length::from(ART_TITLE_SPACING));
    draw.text(
        art.title(),
        (info.x() + ART_TITLE_INDENT, info.y() + ART_TITLE_SPACING),
        &font,
        &opts,
    )?;

    drop(draw);
    Ok(out.into_surface())
}

fn month(dec: &ImageDecoder, month: &Month) -> Result<cairo::ImageSurface> {
    let _span = info_span!("wall_month", month = month.month()).entered();

    let layout = GridLayout::wall();
    let out = layout.page.new_page(dec.res(), Some(RGB_WHITE.into()))?;
    let draw = out.draw()?;

    let title_font = Font::new(FONT_WALL_MONTH_TITLE, dec.res());
    let title = layout.title_bbox();
    draw.text(
        &format!("{} {}", month.name().to_uppercase(), month.year()),
        (title.right, title.top),
        &title_font,
        &TextOptions::new(RGB_BLACK.into(), Anchor::RIGHT_TOP).align(Align::Right),
    )?;

    let (headers, weeks) = month.table();
    let header_font = Font::new(FONT_WALL_HEADER, dec.res());
    for (index, name) in headers.iter().enumerate() {
        let pos = layout.header_bbox(index);
        draw.text(
            name,
            (pos.center().0, pos.bottom),
            &header_font,
            &TextOptions::new(RGB_BLACK.into(), Anchor::MIDDLE_BOTTOM),
        )?;
    }

    let grid_line = ShapeStyle::outlined(RGB_GRID_LINE.into(), GRID_LINE_WIDTH);
    for (row, week) in weeks.iter().enumerate() {
        for (col, day) in week.iter().enumerate() {
            let pos = layout.cel_bbox(col, row);
            draw_cell(&draw, day, pos)?;
            draw.rectangle(pos, &grid_line)?;
        }
    }
    draw.rectangle(layout.cal_bbox().shrink(GRID_LINE_WIDTH), &grid_line)?;

    debug!("month page done");
    drop(draw);
    Ok(out.into_surface())
}

fn draw_front_page<'a>(dec: &'a ImageDecoder, model: Model<'a>) -> Result<Decoded<'a>> {
    match model {
        Model::FrontPage(page) => front_page(dec, page).map(Decoded::Single),
        other => Err(unexpected(other)),
    }
}

fn draw_art<'a>(dec: &'a ImageDecoder, model: Model<'a>) -> Result<Decoded<'a>> {
    match model {
        Model::CalendarArt(a) => art(dec, a).map(Decoded::Single),
        other => Err(unexpected(other)),
    }
}

fn draw_month<'a>(dec: &'a ImageDecoder, model: Model<'a>) -> Result<Decoded<'a>> {
    match model {
        Model::Month(m) => month(dec, m).map(Decoded::Single),
        other => Err(unexpected(other)),
    }
}

/// Cover, then art and grid for each month. Pages go back through the
/// registry, so a replaced page handler shows up here too.
fn draw_calendar<'a>(dec: &'a ImageDecoder, model: Model<'a>) -> Result<Decoded<'a>> {
    let cal: &'a Calendar = match model {
        Model::Calendar(cal) => cal,
        other => return Err(unexpected(other)),
    };

    let cover = std::iter::once_with(move || dec.render(cal.front_page()));
    let months = cal.pages().iter().flat_map(move |page| {
        std::iter::once_with(move || dec.render(&page.art))
            .chain(std::iter::once_with(move || dec.render(&page.month)))
    });

    Ok(Decoded::Sequence(Box::new(cover.chain(months))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventsManager;
    use crate::fonts::FontFamily;
    use crate::raster::pixel_rgba;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn cover_is_black_with_white_title() -> Result<()> {
        let dec = decoder(32);
        let page = dec.render(&FrontPage::new(None, "Calendar\n2025"))?;
        assert_eq!((page.width(), page.height()), (352, 272));
        assert_eq!(pixel_rgba(&page, 5, 5)?, [0, 0, 0, 255]);
        Ok(())
    }

    #[test]
    fn cover_title_font_can_be_swapped() -> Result<()> {
        let dec = decoder(32);
        let mut cover = FrontPage::new(None, "Calendar\n2025");
        cover.set_title_font(Some(FontFamily::from_name("no such family")));
        assert_eq!(cover.title_font(), Some(FontFamily::Arimo));

        let page = dec.render(&cover)?;
        assert_eq!((page.width(), page.height()), (352, 272));
        Ok(())
    }

    #[test]
    fn month_grid_has_lines() -> Result<()> {
        let dec = decoder(100);
        let month = Month::new(2025, 6, &EventsManager::empty())?;
        let page = dec.render(&month)?;
        assert_eq!((page.width(), page.height()), (1100, 850));

        let cell = GridLayout::wall().cel_bbox(3, 2);
        // Left edge line of a cell, halfway down.
        let x = (cell.left * 100.0) as i32;
        let y = (cell.center().1 * 100.0) as i32;
        assert_eq!(pixel_rgba(&page, x, y)?, [0, 0, 0, 255]);
        assert_eq!(pixel_rgba(&page, x + 40, y)?, [255, 255, 255, 255]);
        Ok(())
    }

    #[test]
    fn calendar_yields_cover_then_pairs() -> Result<()> {
        let dec = decoder(32);
        let cal = Calendar::new(2025, &EventsManager::empty())?;
        let sizes: Vec<(i32, i32)> = dec
            .draw(&cal)?
            .map(|p| p.map(|s| (s.width(), s.height())))
            .collect::<Result<_>>()?;

        assert_eq!(sizes.len(), PAGE_COUNT);
        assert!(sizes.iter().all(|&s| s == (352, 272)));
        Ok(())
    }

    static ARTS_DRAWN: AtomicUsize = AtomicUsize::new(0);

    fn counting_art<'a>(dec: &'a ImageDecoder, model: Model<'a>) -> Result<Decoded<'a>> {
        ARTS_DRAWN.fetch_add(1, Ordering::SeqCst);
        draw_art(dec, model)
    }

    #[test]
    fn pages_render_as_they_are_pulled() -> Result<()> {
        let mut dec = decoder(32);
        dec.register(ModelKind::CalendarArt, counting_art);
        let cal = Calendar::new(2025, &EventsManager::empty())?;

        let mut pages = dec.draw(&cal)?;
        assert_eq!(ARTS_DRAWN.load(Ordering::SeqCst), 0);

        pages.next().transpose()?;
        assert_eq!(ARTS_DRAWN.load(Ordering::SeqCst), 0);
        pages.next().transpose()?;
        pages.next().transpose()?;
        assert_eq!(ARTS_DRAWN.load(Ordering::SeqCst), 1);

        assert_eq!(pages.count(), PAGE_COUNT - 3);
        assert_eq!(ARTS_DRAWN.load(Ordering::SeqCst), 12);
        Ok(())
    }
}
