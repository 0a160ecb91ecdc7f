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

//! Principal moon phases and their calendar icons.
//!
//! Phase instants follow the mean-lunation series with the main periodic
//! corrections (Meeus, *Astronomical Algorithms*, ch. 49), good to a few
//! minutes, then are dated in UTC.

use anyhow::Result;
use std::collections::HashMap;
use std::f64::consts::PI;

use chrono::{DateTime, Datelike, NaiveDate};
use serde::Serialize;

use crate::error::convert_err;
use crate::events::{Event, EventKind, EventSource};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum MoonPhase {
    #[serde(rename = "New Moon")]
    New,
    #[serde(rename = "First Quarter")]
    FirstQuarter,
    #[serde(rename = "Full Moon")]
    Full,
    #[serde(rename = "Third Quarter")]
    ThirdQuarter,
}

impl MoonPhase {
    pub const ALL: [MoonPhase; 4] = [
        MoonPhase::New,
        MoonPhase::FirstQuarter,
        MoonPhase::Full,
        MoonPhase::ThirdQuarter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MoonPhase::New => "New Moon",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::Full => "Full Moon",
            MoonPhase::ThirdQuarter => "Third Quarter",
        }
    }

    pub fn icon_name(self) -> &'static str {
        match self {
            MoonPhase::New => "new-moon.png",
            MoonPhase::FirstQuarter => "first-quarter.png",
            MoonPhase::Full => "full-moon.png",
            MoonPhase::ThirdQuarter => "third-quarter.png",
        }
    }

    fn fraction(self) -> f64 {
        match self {
            MoonPhase::New => 0.0,
            MoonPhase::FirstQuarter => 0.25,
            MoonPhase::Full => 0.5,
            MoonPhase::ThirdQuarter => 0.75,
        }
    }
}

const SYNODIC_MONTH: f64 = 29.530588861;
const UNIX_EPOCH_JD: f64 = 2440587.5;
/// TT - UTC for the 2020s.
const DELTA_T_DAYS: f64 = 69.0 / 86400.0;

fn sin_d(deg: f64) -> f64 {
    (deg * PI / 180.0).sin()
}

fn cos_d(deg: f64) -> f64 {
    (deg * PI / 180.0).cos()
}

/// Julian Ephemeris Day of the phase in lunation `k` (0 = Jan 2000).
fn phase_jde(lunation: i64, phase: MoonPhase) -> f64 {
    let k = lunation as f64 + phase.fraction();
    let t = k / 1236.85;
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;

    let jde = 2451550.09766 + SYNODIC_MONTH * k + 0.00015437 * t2 - 0.000000150 * t3
        + 0.00000000073 * t4;

    let e = 1.0 - 0.002516 * t - 0.0000074 * t2;
    let m = 2.5534 + 29.10535670 * k - 0.0000014 * t2 - 0.00000011 * t3;
    let mp = 201.5643 + 385.81693528 * k + 0.0107582 * t2 + 0.00001238 * t3 - 0.000000058 * t4;
    let f = 160.7108 + 390.67050284 * k - 0.0016118 * t2 - 0.00000227 * t3 + 0.000000011 * t4;
    let om = 124.7746 - 1.56375588 * k + 0.0020672 * t2 + 0.00000215 * t3;

    let correction = match phase {
        MoonPhase::New | MoonPhase::Full => {
            let (a, b, c, d, g, h, i) = if phase == MoonPhase::New {
                (-0.40720, 0.17241, 0.01608, 0.01039, 0.00739, -0.00514, 0.00208)
            } else {
                (-0.40614, 0.17302, 0.01614, 0.01043, 0.00734, -0.00515, 0.00209)
            };
            a * sin_d(mp) + b * e * sin_d(m) + c * sin_d(2.0 * mp) + d * sin_d(2.0 * f)
                + g * e * sin_d(mp - m)
                + h * e * sin_d(mp + m)
                + i * e * e * sin_d(2.0 * m)
                - 0.00111 * sin_d(mp - 2.0 * f)
                - 0.00057 * sin_d(mp + 2.0 * f)
                + 0.00056 * e * sin_d(2.0 * mp + m)
                - 0.00042 * sin_d(3.0 * mp)
                + 0.00042 * e * sin_d(m + 2.0 * f)
                + 0.00038 * e * sin_d(m - 2.0 * f)
                - 0.00024 * e * sin_d(2.0 * mp - m)
                - 0.00017 * sin_d(om)
        }
        MoonPhase::FirstQuarter | MoonPhase::ThirdQuarter => {
            let base = -0.62801 * sin_d(mp) + 0.17172 * e * sin_d(m)
                - 0.01183 * e * sin_d(mp + m)
                + 0.00862 * sin_d(2.0 * mp)
                + 0.00804 * sin_d(2.0 * f)
                + 0.00454 * e * sin_d(mp - m)
                + 0.00204 * e * e * sin_d(2.0 * m)
                - 0.00180 * sin_d(mp - 2.0 * f)
                - 0.00070 * sin_d(mp + 2.0 * f)
                - 0.00040 * sin_d(3.0 * mp)
                - 0.00034 * e * sin_d(2.0 * mp - m)
                + 0.00032 * e * sin_d(m + 2.0 * f)
                + 0.00032 * e * sin_d(m - 2.0 * f)
                - 0.00028 * e * e * sin_d(mp + 2.0 * m)
                + 0.00027 * e * sin_d(2.0 * mp + m)
                - 0.00017 * sin_d(om);
            let w = 0.00306 - 0.00038 * e * cos_d(m) + 0.00026 * cos_d(mp)
                - 0.00002 * cos_d(mp - m)
                + 0.00002 * cos_d(mp + m)
                + 0.00002 * cos_d(2.0 * f);
            if phase == MoonPhase::FirstQuarter {
                base + w
            } else {
                base - w
            }
        }
    };

    jde + correction
}

fn jde_to_utc_date(jde: f64) -> Option<NaiveDate> {
    let secs = ((jde - DELTA_T_DAYS - UNIX_EPOCH_JD) * 86400.0).round() as i64;
    DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}

/// Every principal phase falling in `year`, in date order.
pub fn phases_in_year(year: i32) -> Vec<(NaiveDate, MoonPhase)> {
    let first = ((year - 2000) as f64 * 12.3685).floor() as i64 - 1;

    let mut phases: Vec<(NaiveDate, MoonPhase)> = (first..first + 15)
        .flat_map(|k| MoonPhase::ALL.iter().map(move |&p| (k, p)))
        .filter_map(|(k, p)| jde_to_utc_date(phase_jde(k, p)).map(|d| (d, p)))
        .filter(|(d, _)| d.year() == year)
        .collect();

    phases.sort_by_key(|(d, _)| *d);
    phases
}

/// Reports moon phases as events.
pub struct MoonCalendar {
    year: i32,
    phases: HashMap<NaiveDate, MoonPhase>,
}

impl MoonCalendar {
    pub fn new(year: i32) -> Self {
        MoonCalendar {
            year,
            phases: phases_in_year(year).into_iter().collect(),
        }
    }

    pub fn phase_on(&self, date: NaiveDate) -> Option<MoonPhase> {
        if date.year() == self.year {
            self.phases.get(&date).copied()
        } else {
            phases_in_year(date.year())
                .into_iter()
                .find(|(d, _)| *d == date)
                .map(|(_, p)| p)
        }
    }
}

impl EventSource for MoonCalendar {
    fn get(&self, date: NaiveDate) -> Vec<Event> {
        self.phase_on(date)
            .map(|phase| Event::new(date, phase.name(), EventKind::MoonPhase(phase)))
            .into_iter()
            .collect()
    }
}

/// Draws the icon for `phase` on a transparent `size` x `size` surface.
pub fn icon(phase: MoonPhase, size: i32) -> Result<cairo::ImageSurface> {
    let size = size.max(1);
    let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, size, size)
        .map_err(convert_err)?;

    {
        let cr = cairo::Context::new(&surface).map_err(convert_err)?;
        let c = size as f64 / 2.0;
        let line = (size as f64 / 16.0).max(1.0);
        let r = c - line;

        const DARK: (f64, f64, f64) = (0.19, 0.19, 0.22);
        const LIGHT: (f64, f64, f64) = (0.96, 0.92, 0.78);

        let base = if phase == MoonPhase::Full { LIGHT } else { DARK };
        cr.arc(c, c, r, 0.0, 2.0 * PI);
        cr.set_source_rgb(base.0, base.1, base.2);
        cr.fill().map_err(convert_err)?;

        let lit_half = match phase {
            MoonPhase::FirstQuarter => Some((-PI / 2.0, PI / 2.0)),
            MoonPhase::ThirdQuarter => Some((PI / 2.0, 3.0 * PI / 2.0)),
            _ => None,
        };
        if let Some((from, to)) = lit_half {
            cr.new_path();
            cr.arc(c, c, r, from, to);
            cr.close_path();
            cr.set_source_rgb(LIGHT.0, LIGHT.1, LIGHT.2);
            cr.fill().map_err(convert_err)?;
        }

        cr.new_path();
        cr.arc(c, c, r, 0.0, 2.0 * PI);
        cr.set_line_width(line);
        cr.set_source_rgb(DARK.0 * 0.5, DARK.1 * 0.5, DARK.2 * 0.5);
        cr.stroke().map_err(convert_err)?;
    }

    surface.flush();
    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::pixel_rgba;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn january_2025_phases() {
        let moon = MoonCalendar::new(2025);
        assert_eq!(moon.phase_on(ymd(2025, 1, 13)), Some(MoonPhase::Full));
        assert_eq!(moon.phase_on(ymd(2025, 1, 29)), Some(MoonPhase::New));
        assert_eq!(moon.phase_on(ymd(2025, 1, 14)), None);
    }

    #[test]
    fn a_year_has_about_fifty_phases() {
        let phases = phases_in_year(2024);
        assert!((48..=51).contains(&phases.len()), "{}", phases.len());
        assert!(phases.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn phase_events_carry_their_kind() {
        let events = MoonCalendar::new(2025).get(ymd(2025, 1, 13));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Full Moon");
        assert_eq!(events[0].kind, EventKind::MoonPhase(MoonPhase::Full));
    }

    #[test]
    fn icons_are_transparent_outside_the_disk() -> Result<()> {
        let img = icon(MoonPhase::FirstQuarter, 32)?;
        assert_eq!(pixel_rgba(&img, 0, 0)?[3], 0);
        let right = pixel_rgba(&img, 22, 16)?;
        let left = pixel_rgba(&img, 9, 16)?;
        assert_eq!(right[3], 255);
        assert!(right[0] > left[0]);
        Ok(())
    }
}
