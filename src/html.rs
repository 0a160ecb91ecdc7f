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

//! A plain HTML rendition of a calendar, for previewing in a browser.

use anyhow::Result;
use std::fmt::Write;

use crate::calendar::Day;
use crate::decoder::{unexpected, HtmlEncoder, Model, ModelKind};

pub fn encoder() -> HtmlEncoder {
    let mut enc = HtmlEncoder::new();
    enc.register(ModelKind::FrontPage, front_page);
    enc.register(ModelKind::CalendarArt, art);
    enc.register(ModelKind::Month, month);
    enc.register(ModelKind::Day, day);
    enc.register(ModelKind::Calendar, calendar);
    enc
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("<br>"),
            c => out.push(c),
        }
    }
    out
}

fn image_tag(class: &str, path: Option<&std::path::PathBuf>) -> String {
    match path {
        Some(path) => format!(
            "<img class=\"{}\" src=\"{}\">",
            class,
            escape(&path.to_string_lossy())
        ),
        None => String::new(),
    }
}

fn front_page<'a>(_: &'a HtmlEncoder, model: Model<'a>) -> Result<String> {
    let Model::FrontPage(page) = model else {
        return Err(unexpected(model));
    };
    Ok(format!(
        "<section class=\"front-page\">{}<h1>{}</h1></section>",
        image_tag("cover", page.image()),
        escape(page.title())
    ))
}

fn art<'a>(_: &'a HtmlEncoder, model: Model<'a>) -> Result<String> {
    let Model::CalendarArt(art) = model else {
        return Err(unexpected(model));
    };
    Ok(format!(
        "<section class=\"art\">{}<p class=\"info\">{}</p></section>",
        image_tag("art", art.image()),
        escape(art.title())
    ))
}

fn day<'a>(enc: &'a HtmlEncoder, model: Model<'a>) -> Result<String> {
    let Model::Day(day) = model else {
        return Err(unexpected(model));
    };
    let Day {
        day: number,
        photo,
        text,
        moon_phase,
    } = day;

    let mut out = String::from("<td class=\"cell\">");
    out.push_str(&image_tag("cell-photo", photo.as_ref()));
    if let Some(number) = number {
        write!(out, "<span class=\"day\">{}</span>", number)?;
    }
    if let Some(phase) = moon_phase {
        out.push_str(&enc.to_html(*phase)?);
    }
    if let Some(text) = text {
        write!(out, "<p class=\"cell-text\">{}</p>", escape(text))?;
    }
    out.push_str("</td>");
    Ok(out)
}

fn month<'a>(enc: &'a HtmlEncoder, model: Model<'a>) -> Result<String> {
    let Model::Month(month) = model else {
        return Err(unexpected(model));
    };
    let (headers, weeks) = month.table();

    let mut out = String::new();
    write!(
        out,
        "<section class=\"month\"><h2>{} {}</h2><table><tr>",
        month.name(),
        month.year()
    )?;
    for name in headers.iter() {
        write!(out, "<th>{}</th>", name)?;
    }
    out.push_str("</tr>");
    for week in weeks {
        out.push_str("<tr>");
        for d in week.iter() {
            out.push_str(&enc.to_html(d)?);
        }
        out.push_str("</tr>");
    }
    out.push_str("</table></section>");
    Ok(out)
}

fn calendar<'a>(enc: &'a HtmlEncoder, model: Model<'a>) -> Result<String> {
    let Model::Calendar(cal) = model else {
        return Err(unexpected(model));
    };

    let mut out = String::new();
    write!(
        out,
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{}</title></head><body>",
        cal.year()
    )?;
    out.push_str(&enc.to_html(cal.front_page())?);
    for page in cal.pages() {
        out.push_str(&enc.to_html(&page.art)?);
        out.push_str(&enc.to_html(&page.month)?);
    }
    out.push_str("</body></html>\n");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{Calendar, Month};
    use crate::events::{Event, EventKind, EventsManager};
    use crate::moon::MoonPhase;
    use chrono::{Datelike, NaiveDate};

    #[test]
    fn month_lists_events_and_moon() -> Result<()> {
        let events = |d: NaiveDate| {
            if d.day() == 14 {
                vec![
                    Event::new(d, "Tom & Jerry", EventKind::Plain),
                    Event::new(d, "Full Moon", EventKind::MoonPhase(MoonPhase::Full)),
                ]
            } else {
                vec![]
            }
        };
        let month = Month::new(2025, 2, &events)?;
        let html = encoder().to_html(&month)?;

        assert!(html.contains("<h2>February 2025</h2>"));
        assert!(html.contains("Tom &amp; Jerry"));
        assert_eq!(html.matches("cell-moon-overlay").count(), 1);
        assert_eq!(html.matches("<td").count(), 42);
        Ok(())
    }

    #[test]
    fn calendar_is_one_document() -> Result<()> {
        let cal = Calendar::new(2025, &EventsManager::empty())?;
        let html = encoder().to_html(&cal)?;
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert_eq!(html.matches("class=\"month\"").count(), 12);
        assert_eq!(html.matches("class=\"art\"").count(), 12);
        assert!(html.contains("Calendar<br>2025"));
        Ok(())
    }
}
