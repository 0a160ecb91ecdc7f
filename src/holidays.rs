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

//! United States public holidays plus common unofficial and Christian
//! observances.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::events::{Event, EventKind, EventSource};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Public,
    Unofficial,
    Christian,
}

#[derive(Clone, Copy, Debug)]
enum Rule {
    Fixed { month: u32, day: u32 },
    /// The `nth` (1-based) `weekday` of the month; 0 means the last one.
    Nth { month: u32, weekday: Weekday, nth: u8 },
    /// Days relative to Easter Sunday.
    Easter(i64),
}

const RULES: &[(&str, Category, Rule)] = &[
    ("New Year's Day", Category::Public, Rule::Fixed { month: 1, day: 1 }),
    (
        "Martin Luther King Jr. Day",
        Category::Public,
        Rule::Nth { month: 1, weekday: Weekday::Mon, nth: 3 },
    ),
    (
        "Washington's Birthday",
        Category::Public,
        Rule::Nth { month: 2, weekday: Weekday::Mon, nth: 3 },
    ),
    (
        "Memorial Day",
        Category::Public,
        Rule::Nth { month: 5, weekday: Weekday::Mon, nth: 0 },
    ),
    (
        "Juneteenth National Independence Day",
        Category::Public,
        Rule::Fixed { month: 6, day: 19 },
    ),
    ("Independence Day", Category::Public, Rule::Fixed { month: 7, day: 4 }),
    (
        "Labor Day",
        Category::Public,
        Rule::Nth { month: 9, weekday: Weekday::Mon, nth: 1 },
    ),
    (
        "Columbus Day",
        Category::Public,
        Rule::Nth { month: 10, weekday: Weekday::Mon, nth: 2 },
    ),
    ("Veterans Day", Category::Public, Rule::Fixed { month: 11, day: 11 }),
    (
        "Thanksgiving",
        Category::Public,
        Rule::Nth { month: 11, weekday: Weekday::Thu, nth: 4 },
    ),
    ("Christmas Day", Category::Public, Rule::Fixed { month: 12, day: 25 }),
    ("Valentine's Day", Category::Unofficial, Rule::Fixed { month: 2, day: 14 }),
    ("Saint Patrick's Day", Category::Unofficial, Rule::Fixed { month: 3, day: 17 }),
    ("Halloween", Category::Unofficial, Rule::Fixed { month: 10, day: 31 }),
    ("Christmas Eve", Category::Unofficial, Rule::Fixed { month: 12, day: 24 }),
    ("New Year's Eve", Category::Unofficial, Rule::Fixed { month: 12, day: 31 }),
    ("Ash Wednesday", Category::Christian, Rule::Easter(-46)),
    ("Palm Sunday", Category::Christian, Rule::Easter(-7)),
    ("Good Friday", Category::Christian, Rule::Easter(-2)),
    ("Easter Sunday", Category::Christian, Rule::Easter(0)),
];

/// Western Easter Sunday by the anonymous Gregorian computus.
pub fn easter(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

fn resolve(rule: Rule, year: i32) -> Option<NaiveDate> {
    match rule {
        Rule::Fixed { month, day } => NaiveDate::from_ymd_opt(year, month, day),
        Rule::Nth { month, weekday, nth: 0 } => {
            let next = if month == 12 {
                NaiveDate::from_ymd_opt(year + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(year, month + 1, 1)
            }?;
            let last = next.pred_opt()?;
            let back = (7 + last.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
            last.checked_sub_signed(Duration::days(back as i64))
        }
        Rule::Nth { month, weekday, nth } => {
            NaiveDate::from_weekday_of_month_opt(year, month, weekday, nth)
        }
        Rule::Easter(offset) => easter(year)?.checked_add_signed(Duration::days(offset)),
    }
}

pub struct UsHolidays {
    categories: Vec<Category>,
}

impl Default for UsHolidays {
    fn default() -> Self {
        UsHolidays {
            categories: vec![Category::Public, Category::Unofficial, Category::Christian],
        }
    }
}

impl UsHolidays {
    pub fn new(categories: &[Category]) -> Self {
        UsHolidays {
            categories: categories.to_vec(),
        }
    }

    pub fn names_on(&self, date: NaiveDate) -> Vec<&'static str> {
        RULES
            .iter()
            .filter(|(_, cat, _)| self.categories.contains(cat))
            .filter(|(_, _, rule)| resolve(*rule, date.year()) == Some(date))
            .map(|(name, _, _)| *name)
            .collect()
    }
}

impl EventSource for UsHolidays {
    fn get(&self, date: NaiveDate) -> Vec<Event> {
        self.names_on(date)
            .into_iter()
            .map(|name| Event::new(date, name, EventKind::Plain))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn floating_holidays_2025() {
        let us = UsHolidays::default();
        assert_eq!(us.names_on(ymd(2025, 1, 20)), vec!["Martin Luther King Jr. Day"]);
        assert_eq!(us.names_on(ymd(2025, 5, 26)), vec!["Memorial Day"]);
        assert_eq!(us.names_on(ymd(2025, 11, 27)), vec!["Thanksgiving"]);
        assert_eq!(us.names_on(ymd(2025, 9, 1)), vec!["Labor Day"]);
    }

    #[test]
    fn easter_dates() {
        assert_eq!(easter(2024), Some(ymd(2024, 3, 31)));
        assert_eq!(easter(2025), Some(ymd(2025, 4, 20)));
        assert_eq!(UsHolidays::default().names_on(ymd(2025, 4, 18)), vec!["Good Friday"]);
    }

    #[test]
    fn categories_filter() {
        let public = UsHolidays::new(&[Category::Public]);
        assert!(public.names_on(ymd(2025, 2, 14)).is_empty());
        assert_eq!(
            UsHolidays::default().get(ymd(2025, 2, 14))[0].name,
            "Valentine's Day"
        );
    }
}
