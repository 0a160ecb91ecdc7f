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

//! Yearly birthdays read from an iCalendar file.

use anyhow::{anyhow, bail, Context, Result};
use itertools::Itertools;

use std::{
    collections::HashMap,
    convert::TryFrom,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use chrono::{Datelike, NaiveDate};
use ical::parser::ical::component::IcalEvent;

use tracing::{info, warn};

use crate::error::CalendarError;
use crate::events::{Event, EventKind, EventSource};

const MAX_PARSE_ERRORS: usize = 10;

fn want_prop<'a>(
    map: &HashMap<&'a str, &'a ical::property::Property>,
    name: &'static str,
) -> Result<&'a str> {
    map.get(name)
        .and_then(|&p| p.value.as_ref())
        .map(|s| s.as_str())
        .ok_or(CalendarError::MissingProperty(name).into())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    // DATE values are 8 digits; DATE-TIME values carry a trailing time we ignore.
    let day = s.get(..8).ok_or_else(|| anyhow!("Date too short: {:?}", s))?;
    Ok(NaiveDate::parse_from_str(day, "%Y%m%d")?)
}

#[derive(Debug)]
struct ParsedEntry<'a> {
    dtstart: NaiveDate,
    summary: &'a str,
    image: Option<&'a str>,
}

impl<'a> TryFrom<&'a IcalEvent> for ParsedEntry<'a> {
    type Error = anyhow::Error;

    fn try_from(event: &'a IcalEvent) -> Result<Self, Self::Error> {
        let mut hm = HashMap::with_capacity(event.properties.len());

        for prop in event.properties.iter() {
            hm.insert(prop.name.as_str(), prop);
        }

        let dtstart = want_prop(&hm, "DTSTART")?;

        Ok(ParsedEntry {
            dtstart: parse_date(dtstart)
                .with_context(|| format!("Failed to parse date property {:?}", dtstart))?,
            summary: want_prop(&hm, "SUMMARY")?,
            image: hm
                .get("IMAGES")
                .and_then(|p| p.value.as_ref())
                .map(|s| s.as_str())
                .filter(|s| !s.is_empty()),
        })
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut iter = s.chars();

    while let Some(c) = iter.next() {
        if c == '\\' {
            match iter.next() {
                Some('n') | Some('N') => out.push('\n'),
                Some(c2) => out.push(c2),
                None => {}
            }
        } else {
            out.push(c);
        }
    }

    out
}

#[derive(Clone, Debug, PartialEq)]
pub struct Birthday {
    pub name: String,
    pub image: Option<PathBuf>,
    /// The date as written in the file; only month and day are used.
    pub born: NaiveDate,
}

/// Birthdays keyed by (month, day), repeating every year.
#[derive(Clone, Debug, Default)]
pub struct Birthdays {
    by_day: HashMap<(u32, u32), Vec<Birthday>>,
}

impl Birthdays {
    #[tracing::instrument]
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open birthdays file {}", path.display()))?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        info!("Parsing ical data...");

        let mut parser = ical::IcalParser::new(reader);
        let calendar = parser
            .next()
            .ok_or_else(|| anyhow!("No calendars parsed"))?
            .map_err(|e| CalendarError::IcsParse(e.to_string()))?;

        let mut entries = Vec::with_capacity(calendar.events.len());
        let mut parse_errors = 0;
        for event in calendar.events.iter() {
            match ParsedEntry::try_from(event) {
                Ok(e) => entries.push(Birthday {
                    name: unescape(e.summary),
                    image: e.image.map(|s| PathBuf::from(unescape(s))),
                    born: e.dtstart,
                }),
                Err(e) => {
                    warn!("Failed to parse event: {}; raw event: {:?}", e, event);
                    parse_errors += 1;
                    if parse_errors > MAX_PARSE_ERRORS {
                        bail!("Too many parse errors");
                    }
                }
            }
        }

        info!("Loaded {} birthdays", entries.len());
        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(entries: impl IntoIterator<Item = Birthday>) -> Self {
        Birthdays {
            by_day: entries
                .into_iter()
                .into_group_map_by(|b| (b.born.month(), b.born.day())),
        }
    }

    pub fn len(&self) -> usize {
        self.by_day.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_day.is_empty()
    }

    pub fn on(&self, date: NaiveDate) -> &[Birthday] {
        self.by_day
            .get(&(date.month(), date.day()))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

impl EventSource for Birthdays {
    fn get(&self, date: NaiveDate) -> Vec<Event> {
        self.on(date)
            .iter()
            .map(|b| {
                Event::new(
                    date,
                    b.name.clone(),
                    EventKind::Birthday {
                        image: b.image.clone(),
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ICS: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
DTSTART;VALUE=DATE:19900214\r\n\
SUMMARY:Alice\r\n\
IMAGES:/photos/alice.jpg\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
DTSTART;VALUE=DATE:20010704\r\n\
SUMMARY:Bob\\, Jr.\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:No date\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn loads_events_and_skips_broken_ones() -> Result<()> {
        let birthdays = Birthdays::from_reader(ICS.as_bytes())?;
        assert_eq!(birthdays.len(), 2);

        let alice = birthdays.get(ymd(2025, 2, 14));
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].name, "Alice");
        assert_eq!(
            alice[0].kind,
            EventKind::Birthday {
                image: Some(PathBuf::from("/photos/alice.jpg"))
            }
        );

        let bob = birthdays.get(ymd(2031, 7, 4));
        assert_eq!(bob[0].name, "Bob, Jr.");
        assert_eq!(bob[0].kind, EventKind::Birthday { image: None });

        assert!(birthdays.get(ymd(2025, 2, 15)).is_empty());
        Ok(())
    }

    #[test]
    fn missing_property_is_typed() {
        let mut event = IcalEvent::new();
        event.properties.push(ical::property::Property {
            name: "DTSTART".into(),
            params: None,
            value: Some("20200101".into()),
        });
        let err = ParsedEntry::try_from(&event).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CalendarError>(),
            Some(CalendarError::MissingProperty("SUMMARY"))
        ));
    }

    #[test]
    fn unescapes_text_values() {
        assert_eq!(unescape("a\\;b\\nc"), "a;b\nc");
    }
}
