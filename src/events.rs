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

//! Named events per date, gathered from any number of providers.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

use crate::birthdays::Birthdays;
use crate::holidays::UsHolidays;
use crate::moon::{MoonCalendar, MoonPhase};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum EventKind {
    /// Shown as cell text.
    Plain,
    /// Sets the cell's moon icon.
    MoonPhase(MoonPhase),
    /// Shown as cell text; its image becomes the cell photo.
    Birthday { image: Option<PathBuf> },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Event {
    pub date: NaiveDate,
    pub name: String,
    pub kind: EventKind,
}

impl Event {
    pub fn new(date: NaiveDate, name: impl Into<String>, kind: EventKind) -> Self {
        Event {
            date,
            name: name.into(),
            kind,
        }
    }
}

pub trait EventSource {
    fn get(&self, date: NaiveDate) -> Vec<Event>;
}

impl<F> EventSource for F
where
    F: Fn(NaiveDate) -> Vec<Event>,
{
    fn get(&self, date: NaiveDate) -> Vec<Event> {
        self(date)
    }
}

/// Holidays, then moon phases, then birthdays.
pub struct EventsManager {
    sources: Vec<Box<dyn EventSource>>,
}

impl EventsManager {
    pub fn new(year: i32, birthdays: Option<Birthdays>) -> Self {
        let mut manager = EventsManager::empty();
        manager.push(UsHolidays::default());
        manager.push(MoonCalendar::new(year));
        if let Some(birthdays) = birthdays {
            manager.push(birthdays);
        }
        manager
    }

    pub fn empty() -> Self {
        EventsManager { sources: vec![] }
    }

    pub fn push(&mut self, source: impl EventSource + 'static) {
        self.sources.push(Box::new(source));
    }
}

impl EventSource for EventsManager {
    fn get(&self, date: NaiveDate) -> Vec<Event> {
        self.sources.iter().flat_map(|s| s.get(date)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_are_concatenated_in_order() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();
        let mut manager = EventsManager::new(2025, None);
        manager.push(|d: NaiveDate| vec![Event::new(d, "Party", EventKind::Plain)]);

        let names: Vec<String> = manager.get(date).into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Full Moon".to_string(), "Party".to_string()]);
    }
}
