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

use anyhow::Result;
use chrono::{Datelike, NaiveDate};

use calendar_printer::calendar::{Calendar, Month};
use calendar_printer::decoder::ImageDecoder;
use calendar_printer::events::{Event, EventKind, EventsManager};
use calendar_printer::{desk, html, legal, wall, CalendarError};

fn valentines(date: NaiveDate) -> Vec<Event> {
    if (date.month(), date.day()) == (2, 14) {
        vec![Event::new(date, "Valentine's", EventKind::Birthday { image: None })]
    } else {
        vec![]
    }
}

#[test]
fn event_lands_in_its_own_cell_only() -> Result<()> {
    let month = Month::new(2025, 2, &valentines)?;

    let with_text: Vec<u32> = month
        .days()
        .filter(|d| d.text.is_some())
        .filter_map(|d| d.day)
        .collect();
    assert_eq!(with_text, vec![14]);

    // 2025-02-01 is a Saturday, so the 14th is the third row's Friday.
    assert_eq!(month.weeks()[2][5].day, Some(14));
    assert_eq!(month.weeks()[2][5].text.as_deref(), Some("Valentine's"));

    let doc = html::encoder().to_html(&month)?;
    assert_eq!(doc.matches("Valentine&#39;s").count(), 1);

    let page = wall::decoder(32).render(&month)?;
    assert_eq!((page.width(), page.height()), (352, 272));
    Ok(())
}

#[test]
fn wall_pages_are_produced_one_at_a_time() -> Result<()> {
    let mut cal = Calendar::new(2025, &EventsManager::new(2025, None))?;
    if let Some(art) = cal.art_mut(12) {
        art.set_image(Some("/nonexistent/december.jpg".into()));
    }

    let dec = wall::decoder(32);

    // The broken December art is never touched by the first few pages.
    let first: Vec<_> = dec.draw(&cal)?.take(3).collect::<Result<_>>()?;
    assert_eq!(first.len(), 3);

    let failed: Vec<usize> = dec
        .draw(&cal)?
        .enumerate()
        .filter(|(_, page)| page.is_err())
        .map(|(index, _)| index)
        .collect();
    assert_eq!(failed, vec![1 + 11 * 2]);
    assert_eq!(dec.draw(&cal)?.count(), wall::PAGE_COUNT);
    Ok(())
}

#[test]
fn desk_pages_tile_onto_legal() -> Result<()> {
    let cal = Calendar::new(2025, &EventsManager::new(2025, None))?;
    let dec = desk::decoder(32);

    let mut count = 0;
    for page in dec.draw(&cal)? {
        let page = page?;
        assert_eq!((page.width(), page.height()), (224, 136));
        count += 1;

        if count == 2 {
            let (sheet, ppi) = legal::impose(&page)?;
            assert_eq!(ppi, 32);
            assert_eq!((sheet.width(), sheet.height()), (448, 272));
        }
    }
    assert_eq!(count, desk::PAGE_COUNT);
    Ok(())
}

#[test]
fn empty_decoder_rejects_models() -> Result<()> {
    let month = Month::new(2025, 1, &EventsManager::empty())?;
    let err = ImageDecoder::new(32).render(&month).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CalendarError>(),
        Some(CalendarError::UnsupportedType(_))
    ));
    Ok(())
}
