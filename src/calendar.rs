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

//! The calendar being printed: a year of month grids, each paired with
//! its artwork, plus a cover.

use anyhow::{anyhow, Result};
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use crate::events::{EventKind, EventSource};
use crate::fonts::FontFamily;
use crate::layout::{GRID_COLUMNS, GRID_ROWS};
use crate::moon::MoonPhase;

pub const WEEKDAYS: [&str; GRID_COLUMNS] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// One grid cell. Padding cells have no `day`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Day {
    pub day: Option<u32>,
    pub photo: Option<PathBuf>,
    pub text: Option<String>,
    pub moon_phase: Option<MoonPhase>,
}

impl Day {
    fn build(date: NaiveDate, events: &dyn EventSource) -> Day {
        let mut photo = None;
        let mut lines = Vec::new();
        let mut moon_phase = None;

        for event in events.get(date) {
            match event.kind {
                EventKind::MoonPhase(phase) => {
                    if let Some(prev) = moon_phase.replace(phase) {
                        warn!(%date, ?prev, ?phase, "more than one moon phase, keeping the last");
                    }
                }
                EventKind::Birthday { image } => {
                    if image.is_some() {
                        photo = image;
                    }
                    lines.push(event.name);
                }
                EventKind::Plain => lines.push(event.name),
            }
        }

        Day {
            day: Some(date.day()),
            photo,
            text: if lines.is_empty() {
                None
            } else {
                Some(lines.join(";\n"))
            },
            moon_phase,
        }
    }

    pub fn is_padding(&self) -> bool {
        self.day.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Month {
    year: i32,
    month: u32,
    weeks: Vec<[Day; GRID_COLUMNS]>,
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(next.signed_duration_since(first).num_days() as u32)
}

impl Month {
    /// Builds the Sunday-first grid, always six weeks tall.
    pub fn new(year: i32, month: u32, events: &dyn EventSource) -> Result<Month> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| anyhow!("Invalid month {}-{}", year, month))?;
        let length = days_in_month(year, month)
            .ok_or_else(|| anyhow!("Invalid month {}-{}", year, month))?;
        let offset = first.weekday().num_days_from_sunday();

        let weeks = (0..GRID_ROWS as u32)
            .map(|row| {
                std::array::from_fn(|col| {
                    let index = row * GRID_COLUMNS as u32 + col as u32;
                    if index < offset || index - offset >= length {
                        return Day::default();
                    }
                    match first.with_day(index - offset + 1) {
                        Some(date) => Day::build(date, events),
                        None => Day::default(),
                    }
                })
            })
            .collect();

        debug!(year, month, "built month");
        Ok(Month { year, month, weeks })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn name(&self) -> &'static str {
        u8::try_from(self.month)
            .ok()
            .and_then(|m| chrono::Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("")
    }

    pub fn headers(&self) -> &'static [&'static str; GRID_COLUMNS] {
        &WEEKDAYS
    }

    pub fn weeks(&self) -> &[[Day; GRID_COLUMNS]] {
        &self.weeks
    }

    /// Weekday names and the 6 x 7 cells.
    pub fn table(&self) -> (&'static [&'static str; GRID_COLUMNS], &[[Day; GRID_COLUMNS]]) {
        (self.headers(), self.weeks())
    }

    pub fn days(&self) -> impl Iterator<Item = &Day> {
        self.weeks.iter().flatten()
    }
}

/// Cover page content. A missing image leaves its region blank.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FrontPage {
    image: Option<PathBuf>,
    title: String,
    title_font: Option<FontFamily>,
}

impl FrontPage {
    pub fn new(image: Option<PathBuf>, title: impl Into<String>) -> Self {
        FrontPage {
            image,
            title: title.into(),
            title_font: None,
        }
    }

    pub fn image(&self) -> Option<&PathBuf> {
        self.image.as_ref()
    }

    pub fn set_image(&mut self, image: Option<PathBuf>) {
        self.image = image;
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Family for the title; `None` keeps the layout's default.
    pub fn title_font(&self) -> Option<FontFamily> {
        self.title_font
    }

    pub fn set_title_font(&mut self, family: Option<FontFamily>) {
        self.title_font = family;
    }
}

/// Monthly artwork with its caption.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CalendarArt {
    image: Option<PathBuf>,
    title: String,
}

impl CalendarArt {
    pub fn new(image: Option<PathBuf>, title: impl Into<String>) -> Self {
        CalendarArt {
            image,
            title: title.into(),
        }
    }

    pub fn image(&self) -> Option<&PathBuf> {
        self.image.as_ref()
    }

    pub fn set_image(&mut self, image: Option<PathBuf>) {
        self.image = image;
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthPage {
    pub month: Month,
    pub art: CalendarArt,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Calendar {
    year: i32,
    front_page: FrontPage,
    pages: Vec<MonthPage>,
}

impl Calendar {
    #[tracing::instrument(skip(events))]
    pub fn new(year: i32, events: &dyn EventSource) -> Result<Calendar> {
        let pages = (1..=12)
            .map(|m| {
                Ok(MonthPage {
                    month: Month::new(year, m, events)?,
                    art: CalendarArt::default(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Calendar {
            year,
            front_page: FrontPage::new(None, format!("Calendar\n{}", year)),
            pages,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn front_page(&self) -> &FrontPage {
        &self.front_page
    }

    pub fn front_page_mut(&mut self) -> &mut FrontPage {
        &mut self.front_page
    }

    /// The twelve (month, artwork) pairs, January first.
    pub fn pages(&self) -> &[MonthPage] {
        &self.pages
    }

    pub fn art_mut(&mut self, month: u32) -> Option<&mut CalendarArt> {
        let index = (month as usize).checked_sub(1)?;
        self.pages.get_mut(index).map(|p| &mut p.art)
    }

    pub fn months(&self) -> impl Iterator<Item = &Month> {
        self.pages.iter().map(|p| &p.month)
    }

    pub fn arts(&self) -> impl Iterator<Item = &CalendarArt> {
        self.pages.iter().map(|p| &p.art)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Event, EventsManager};

    fn no_events() -> impl EventSource {
        |_: NaiveDate| Vec::<Event>::new()
    }

    #[test]
    fn every_month_is_six_by_seven() -> Result<()> {
        for year in [2024, 2025] {
            for m in 1..=12 {
                let month = Month::new(year, m, &no_events())?;
                let (headers, weeks) = month.table();
                assert_eq!(headers[0], "Sunday");
                assert_eq!(weeks.len(), GRID_ROWS);

                let days: Vec<u32> = month.days().filter_map(|d| d.day).collect();
                let expected: Vec<u32> = (1..=days_in_month(year, m).unwrap_or(0)).collect();
                assert_eq!(days, expected, "{}-{}", year, m);
            }
        }
        Ok(())
    }

    #[test]
    fn first_day_lands_on_its_weekday() -> Result<()> {
        // 1 Feb 2025 is a Saturday.
        let feb = Month::new(2025, 2, &no_events())?;
        assert_eq!(feb.weeks()[0][6].day, Some(1));
        assert!(feb.weeks()[0][5].is_padding());
        assert_eq!(feb.name(), "February");
        Ok(())
    }

    #[test]
    fn events_fill_cells() -> Result<()> {
        let events = |d: NaiveDate| {
            if d.day() == 3 {
                vec![
                    Event::new(d, "Ann", EventKind::Birthday { image: Some("ann.jpg".into()) }),
                    Event::new(d, "Picnic", EventKind::Plain),
                    Event::new(d, "New Moon", EventKind::MoonPhase(MoonPhase::New)),
                    Event::new(d, "Full Moon", EventKind::MoonPhase(MoonPhase::Full)),
                ]
            } else {
                vec![]
            }
        };
        let month = Month::new(2025, 3, &events)?;
        let day = month.days().find(|d| d.day == Some(3)).cloned().unwrap_or_default();

        assert_eq!(day.text.as_deref(), Some("Ann;\nPicnic"));
        assert_eq!(day.photo, Some(PathBuf::from("ann.jpg")));
        assert_eq!(day.moon_phase, Some(MoonPhase::Full));
        Ok(())
    }

    #[test]
    fn calendar_has_twelve_pages_in_order() -> Result<()> {
        let mut cal = Calendar::new(2025, &EventsManager::new(2025, None))?;
        let order: Vec<u32> = cal.months().map(|m| m.month()).collect();
        assert_eq!(order, (1..=12).collect::<Vec<_>>());

        cal.front_page_mut().set_title("Ours");
        if let Some(art) = cal.art_mut(12) {
            art.set_title("Snow");
        }
        assert_eq!(cal.front_page().title(), "Ours");
        assert_eq!(cal.pages()[11].art.title(), "Snow");
        assert!(cal.art_mut(13).is_none());
        Ok(())
    }
}
