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

//! Tent-fold desk calendar: a cover, then one page per month combining
//! the artwork with a small month grid.

use anyhow::{anyhow, Result};

use crate::calendar::{Calendar, CalendarArt, FrontPage, Month};
use crate::config::*;
use crate::decoder::{unexpected, Decoded, ImageDecoder, Model, ModelKind};
use crate::draw::{Draw, Mask, TextOptions};
use crate::fonts::{Align, Anchor, Font};
use crate::layout::{ArtLayout, FrontLayout, GridLayout};
use crate::raster::load_image_surface;

/// Pages per desk calendar: the cover plus one per month.
pub const PAGE_COUNT: usize = 1 + 12;

pub fn decoder(dpi: u32) -> ImageDecoder {
    let mut dec = ImageDecoder::new(dpi);
    dec.register(ModelKind::FrontPage, draw_front_page);
    dec.register(ModelKind::CalendarArt, draw_art);
    dec.register(ModelKind::Month, draw_month);
    dec.register(ModelKind::Calendar, draw_calendar);
    dec
}

fn front_page(dec: &ImageDecoder, page: &FrontPage) -> Result<cairo::ImageSurface> {
    let layout = FrontLayout::desk();
    let out = layout.page.new_page(dec.res(), Some(RGB_WHITE.into()))?;
    let draw = out.draw()?;

    if let Some(path) = page.image() {
        let image = load_image_surface(path)?;
        draw.paste_cover(&image, layout.image_bbox(), Mask::Opaque)?;
    }

    let spec = page
        .title_font()
        .map_or(FONT_COVER_TITLE, |family| FONT_COVER_TITLE.with_family(family));
    let font = Font::new(spec, dec.res());
    let opts = TextOptions::new(RGB_BLACK.into(), Anchor::CENTER).align(Align::Center);
    draw.text(page.title(), layout.title_bbox().center(), &font, &opts)?;

    drop(draw);
    Ok(out.into_surface())
}

fn art(dec: &ImageDecoder, art: &CalendarArt) -> Result<cairo::ImageSurface> {
    let layout = ArtLayout::desk();
    let out = layout.page.new_page(dec.res(), Some(RGB_WHITE.into()))?;
    let draw = out.draw()?;

    if let Some(path) = art.image() {
        let image = load_image_surface(path)?;
        draw.paste_cover(&image, layout.image_bbox(), Mask::Opaque)?;
    }

    let font = Font::new(FONT_DESK_ART_TITLE, dec.res());
    let opts = TextOptions::new(RGB_BLACK.into(), Anchor::CENTER).align(Align::Center);
    draw.text(art.title(), layout.info_bbox().center(), &font, &opts)?;

    drop(draw);
    Ok(out.into_surface())
}

/// The small grid on its own page, sized for the art page inset.
fn month(dec: &ImageDecoder, month: &Month) -> Result<cairo::ImageSurface> {
    let layout = GridLayout::desk();
    let out = layout.page.new_page(dec.res(), Some(RGB_WHITE.into()))?;
    let draw = out.draw()?;
    let centered = TextOptions::new(RGB_BLACK.into(), Anchor::CENTER).align(Align::Center);

    let title_font = Font::new(FONT_DESK_MONTH_TITLE, dec.res());
    draw.text(
        &format!("{} {}", month.name(), month.year()),
        layout.title_bbox().center(),
        &title_font,
        &centered,
    )?;

    let (headers, weeks) = month.table();
    let header_font = Font::new(FONT_DESK_HEADER, dec.res());
    for (index, name) in headers.iter().enumerate() {
        let short: String = name.chars().take(3).collect();
        draw.text(&short, layout.header_bbox(index).center(), &header_font, &centered)?;
    }

    let day_font = Font::new(FONT_DESK_DAY, dec.res());
    for (row, week) in weeks.iter().enumerate() {
        for (col, day) in week.iter().enumerate() {
            if let Some(number) = day.day {
                let pos = layout.cel_bbox(col, row);
                draw.text(&number.to_string(), pos.center(), &day_font, &centered)?;
            }
        }
    }

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

/// The artwork page with the month grid pasted into its inset.
fn month_page(dec: &ImageDecoder, art: &CalendarArt, month: &Month) -> Result<cairo::ImageSurface> {
    let inset = ArtLayout::desk()
        .inset_bbox()
        .ok_or_else(|| anyhow!("desk art layout has no grid inset"))?;

    let page = dec.render(art)?;
    let grid = dec.render(month)?;

    let draw = Draw::new(&page, *dec.res())?;
    draw.paste_cover(&grid, inset, Mask::Opaque)?;
    drop(draw);

    page.flush();
    Ok(page)
}

fn draw_calendar<'a>(dec: &'a ImageDecoder, model: Model<'a>) -> Result<Decoded<'a>> {
    let cal: &'a Calendar = match model {
        Model::Calendar(cal) => cal,
        other => return Err(unexpected(other)),
    };

    let cover = std::iter::once_with(move || dec.render(cal.front_page()));
    let months = cal
        .pages()
        .iter()
        .map(move |page| month_page(dec, &page.art, &page.month));

    Ok(Decoded::Sequence(Box::new(cover.chain(months))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventsManager;
    use crate::raster::pixel_rgba;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn month_grid_is_inset_size() -> Result<()> {
        let dec = decoder(100);
        let grid = dec.render(&Month::new(2025, 2, &EventsManager::empty())?)?;
        assert_eq!((grid.width(), grid.height()), (260, 260));
        Ok(())
    }

    #[test]
    fn calendar_pages_are_composites() -> Result<()> {
        let dec = decoder(32);
        let cal = Calendar::new(2025, &EventsManager::empty())?;
        let mut pages = dec.draw(&cal)?;

        let cover = pages.next().ok_or_else(|| anyhow!("no cover"))??;
        assert_eq!((cover.width(), cover.height()), (224, 136));

        let rest: Vec<_> = pages.collect::<Result<_>>()?;
        assert_eq!(rest.len() + 1, PAGE_COUNT);
        for page in &rest {
            assert_eq!((page.width(), page.height()), (224, 136));
        }
        Ok(())
    }

    static MONTHS_DRAWN: AtomicUsize = AtomicUsize::new(0);

    fn counting_month<'a>(dec: &'a ImageDecoder, model: Model<'a>) -> Result<Decoded<'a>> {
        MONTHS_DRAWN.fetch_add(1, Ordering::SeqCst);
        draw_month(dec, model)
    }

    #[test]
    fn desk_pages_render_as_they_are_pulled() -> Result<()> {
        let mut dec = decoder(32);
        dec.register(ModelKind::Month, counting_month);
        let cal = Calendar::new(2025, &EventsManager::empty())?;

        let mut pages = dec.draw(&cal)?;
        assert_eq!(MONTHS_DRAWN.load(Ordering::SeqCst), 0);

        // Cover first, then one grid per composite page pulled.
        pages.next().transpose()?;
        assert_eq!(MONTHS_DRAWN.load(Ordering::SeqCst), 0);
        for pulled in 1..PAGE_COUNT {
            assert!(pages.next().transpose()?.is_some());
            assert_eq!(MONTHS_DRAWN.load(Ordering::SeqCst), pulled);
        }

        assert!(pages.next().is_none());
        assert_eq!(MONTHS_DRAWN.load(Ordering::SeqCst), 12);
        Ok(())
    }

    #[test]
    fn art_without_image_leaves_background() -> Result<()> {
        let dec = decoder(32);
        let page = dec.render(&CalendarArt::new(None, ""))?;
        assert_eq!(pixel_rgba(&page, 10, 60)?, [255, 255, 255, 255]);
        Ok(())
    }
}
