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

//! Writes a calendar to disk as page images, an HTML preview or JSON.
//!
//! A page that fails to render is recorded and the export carries on with
//! the next one; any other failure ends the export but is still reported
//! through the returned [`ExportResult`] rather than as an error.

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde_json::{json, Map, Value};
use tracing::{info, instrument, warn};

use crate::calendar::Calendar;
use crate::config::{DEFAULT_DPI, DPI_CHOICES};
use crate::decoder::{ImageDecoder, PageIter};
use crate::error::CalendarError;
use crate::layout::{DESK_HEIGHT, DESK_WIDTH, WALL_HEIGHT, WALL_WIDTH};
use crate::raster::write_png;
use crate::{desk, html, legal, wall};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum CalendarKind {
    Wall,
    Desk,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Png,
    Html,
    Json,
}

impl fmt::Display for CalendarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CalendarKind::Wall => "wall",
            CalendarKind::Desk => "desk",
        })
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Png => "png",
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
        })
    }
}

#[derive(Clone, Copy, Debug)]
enum OptionKind {
    Choice(&'static [u32]),
    Flag,
    Text,
}

#[derive(Clone, Copy, Debug)]
struct OptionSpec {
    key: &'static str,
    kind: OptionKind,
}

const DPI: OptionSpec = OptionSpec {
    key: "dpi",
    kind: OptionKind::Choice(&DPI_CHOICES),
};
const SKIP_MONTHS: OptionSpec = OptionSpec {
    key: "skip_months",
    kind: OptionKind::Flag,
};
const GENERATE_EXPANDED: OptionSpec = OptionSpec {
    key: "generate_expanded",
    kind: OptionKind::Flag,
};
const FILENAME: OptionSpec = OptionSpec {
    key: "filename",
    kind: OptionKind::Text,
};

fn schema(format: ExportFormat, kind: CalendarKind) -> &'static [OptionSpec] {
    match (format, kind) {
        (ExportFormat::Png, CalendarKind::Wall) => &[DPI, SKIP_MONTHS],
        (ExportFormat::Png, CalendarKind::Desk) => &[DPI, GENERATE_EXPANDED],
        (ExportFormat::Html, _) | (ExportFormat::Json, _) => &[FILENAME],
    }
}

/// Validated export settings. Unset options keep their defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportOptions {
    pub dpi: u32,
    pub skip_months: bool,
    pub generate_expanded: bool,
    pub filename: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            dpi: DEFAULT_DPI,
            skip_months: false,
            generate_expanded: true,
            filename: None,
        }
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> anyhow::Error {
    CalendarError::InvalidOption {
        key: key.to_string(),
        reason: reason.into(),
    }
    .into()
}

impl ExportOptions {
    /// Checks `options` against what the (`format`, `kind`) exporter
    /// accepts. Unknown keys are logged and ignored.
    pub fn from_map(
        format: ExportFormat,
        kind: CalendarKind,
        options: &Map<String, Value>,
    ) -> Result<ExportOptions> {
        let specs = schema(format, kind);
        let mut out = ExportOptions::default();

        for (key, value) in options {
            let spec = match specs.iter().find(|s| s.key == key) {
                Some(spec) => spec,
                None => {
                    warn!(%key, %format, %kind, "ignoring unknown export option");
                    continue;
                }
            };

            match spec.kind {
                OptionKind::Choice(choices) => {
                    let n = value
                        .as_u64()
                        .ok_or_else(|| invalid(key, format!("expected a number, got {}", value)))?;
                    if !choices.iter().any(|&c| c as u64 == n) {
                        return Err(invalid(key, format!("{} is not one of {:?}", n, choices)));
                    }
                    out.dpi = n as u32;
                }
                OptionKind::Flag => {
                    let flag = value
                        .as_bool()
                        .ok_or_else(|| invalid(key, format!("expected true or false, got {}", value)))?;
                    match spec.key {
                        "skip_months" => out.skip_months = flag,
                        _ => out.generate_expanded = flag,
                    }
                }
                OptionKind::Text => {
                    let text = value
                        .as_str()
                        .filter(|s| !s.is_empty())
                        .ok_or_else(|| invalid(key, format!("expected a file name, got {}", value)))?;
                    out.filename = Some(text.to_string());
                }
            }
        }

        Ok(out)
    }
}

#[derive(Debug, Default)]
pub struct ExportResult {
    pub success: bool,
    pub files: Vec<PathBuf>,
    pub errors: Vec<String>,
    pub metadata: Map<String, Value>,
    pub duration: Duration,
}

impl ExportResult {
    fn new() -> Self {
        ExportResult {
            success: true,
            ..Default::default()
        }
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.success = false;
    }

    /// One line for the user once everything has been attempted.
    pub fn summary(&self) -> String {
        if self.errors.is_empty() {
            format!(
                "Exported {} files in {:.2}s",
                self.files.len(),
                self.duration.as_secs_f64()
            )
        } else {
            format!(
                "Exported {} files with {} errors: {}",
                self.files.len(),
                self.errors.len(),
                self.errors.join("; ")
            )
        }
    }
}

pub struct ExportContext<'a> {
    pub calendar: &'a Calendar,
    pub kind: CalendarKind,
    pub format: ExportFormat,
    pub output_dir: PathBuf,
    pub options: ExportOptions,
    progress: Option<Box<dyn FnMut(usize, usize, &str) + 'a>>,
}

impl<'a> ExportContext<'a> {
    pub fn new(
        calendar: &'a Calendar,
        kind: CalendarKind,
        format: ExportFormat,
        output_dir: impl Into<PathBuf>,
        options: ExportOptions,
    ) -> Self {
        ExportContext {
            calendar,
            kind,
            format,
            output_dir: output_dir.into(),
            options,
            progress: None,
        }
    }

    /// Called with (current, estimated total, message) once per page.
    pub fn on_progress(mut self, callback: impl FnMut(usize, usize, &str) + 'a) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    fn report_progress(&mut self, current: usize, total: usize, message: &str) {
        if let Some(cb) = self.progress.as_mut() {
            cb(current, total, message);
        }
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))
}

/// Runs the exporter matching the context's format and calendar kind.
#[instrument(skip(ctx), fields(kind = %ctx.kind, format = %ctx.format, dir = %ctx.output_dir.display()))]
pub fn export(ctx: &mut ExportContext) -> ExportResult {
    let start = Instant::now();
    let mut result = ExportResult::new();

    let outcome = create_dir(&ctx.output_dir).and_then(|_| match (ctx.format, ctx.kind) {
        (ExportFormat::Png, CalendarKind::Wall) => export_wall_png(ctx, &mut result),
        (ExportFormat::Png, CalendarKind::Desk) => export_desk_png(ctx, &mut result),
        (ExportFormat::Html, _) => export_html(ctx, &mut result),
        (ExportFormat::Json, _) => export_json(ctx, &mut result),
    });

    if let Err(e) = outcome {
        warn!("export failed: {:#}", e);
        result.add_error(format!("Export failed: {:#}", e));
    }

    result.duration = start.elapsed();
    info!("{}", result.summary());
    result
}

fn wall_pages<'a>(dec: &'a ImageDecoder, cal: &'a Calendar, skip_months: bool) -> Result<PageIter<'a>> {
    if !skip_months {
        return dec.draw(cal);
    }

    let cover = std::iter::once_with(move || dec.render(cal.front_page()));
    let arts = cal.arts().map(move |art| dec.render(art));
    Ok(Box::new(cover.chain(arts)))
}

fn export_wall_png(ctx: &mut ExportContext, result: &mut ExportResult) -> Result<()> {
    let dpi = ctx.options.dpi;
    let skip_months = ctx.options.skip_months;
    let dec = wall::decoder(dpi);
    let cal = ctx.calendar;

    let total = if skip_months { 1 + 12 } else { wall::PAGE_COUNT };
    let dir = ctx.output_dir.clone();

    for (index, page) in wall_pages(&dec, cal, skip_months)?.enumerate() {
        ctx.report_progress(index + 1, total, &format!("Saving page {}", index));

        let saved = page.and_then(|image| {
            let path = dir.join(format!("Page_{}.png", index));
            write_png(&image, &path, dpi)?;
            Ok(path)
        });
        match saved {
            Ok(path) => result.files.push(path),
            Err(e) => {
                warn!(index, "page failed: {:#}", e);
                result.add_error(format!("Page {}: {:#}", index, e));
            }
        }
    }

    result.metadata.insert("dpi".into(), json!(dpi));
    result.metadata.insert("total_pages".into(), json!(result.files.len()));
    result.metadata.insert(
        "page_size".into(),
        json!(format!("{}x{} in", WALL_WIDTH, WALL_HEIGHT)),
    );
    result.metadata.insert("skip_months".into(), json!(skip_months));
    Ok(())
}

fn export_desk_png(ctx: &mut ExportContext, result: &mut ExportResult) -> Result<()> {
    let dpi = ctx.options.dpi;
    let expanded = ctx.options.generate_expanded;
    let dec = desk::decoder(dpi);
    let cal = ctx.calendar;

    let desk_dir = ctx.output_dir.join("DeskCal");
    let ext_dir = ctx.output_dir.join("DeskCalExt");
    create_dir(&desk_dir)?;
    if expanded {
        create_dir(&ext_dir)?;
    }

    let mut pages = 0;
    let mut expanded_files = Vec::new();
    for (index, page) in dec.draw(cal)?.enumerate() {
        ctx.report_progress(index + 1, desk::PAGE_COUNT, &format!("Saving page {}", index));
        let name = format!("Page_{}.png", index);

        let saved = page.and_then(|image| {
            let path = desk_dir.join(&name);
            write_png(&image, &path, dpi)?;
            result.files.push(path);

            if expanded {
                let (sheet, ppi) = legal::impose(&image)?;
                let path = ext_dir.join(&name);
                write_png(&sheet, &path, ppi)?;
                expanded_files.push(path);
            }
            Ok(())
        });

        match saved {
            Ok(()) => pages += 1,
            Err(e) => {
                warn!(index, "page failed: {:#}", e);
                result.add_error(format!("Page {}: {:#}", index, e));
            }
        }
    }

    result.metadata.insert("dpi".into(), json!(dpi));
    result.metadata.insert("total_pages".into(), json!(pages));
    result.metadata.insert("expanded_files".into(), json!(expanded_files.len()));
    result.metadata.insert(
        "page_size_standard".into(),
        json!(format!("{}x{} in", DESK_WIDTH, DESK_HEIGHT)),
    );
    result.metadata.insert("page_size_expanded".into(), json!("14x8.5 in (legal landscape)"));
    result.metadata.insert("generate_expanded".into(), json!(expanded));
    result.files.extend(expanded_files);
    Ok(())
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

fn export_html(ctx: &mut ExportContext, result: &mut ExportResult) -> Result<()> {
    ctx.report_progress(1, 1, "Writing HTML");
    let doc = html::encoder().to_html(ctx.calendar)?;

    let name = ctx.options.filename.as_deref().unwrap_or("Calendar.html");
    let path = ctx.output_dir.join(name);
    write_text(&path, &doc)?;

    result.metadata.insert("bytes".into(), json!(doc.len()));
    result.files.push(path);
    Ok(())
}

fn export_json(ctx: &mut ExportContext, result: &mut ExportResult) -> Result<()> {
    ctx.report_progress(1, 1, "Writing JSON");
    let doc = serde_json::to_string_pretty(ctx.calendar)?;

    let name = ctx.options.filename.as_deref().unwrap_or("Calendar.json");
    let path = ctx.output_dir.join(name);
    write_text(&path, &doc)?;

    result.metadata.insert("bytes".into(), json!(doc.len()));
    result.files.push(path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn options_are_checked_against_the_schema() -> Result<()> {
        let ok = ExportOptions::from_map(
            ExportFormat::Png,
            CalendarKind::Desk,
            &opts(json!({ "dpi": 150, "generate_expanded": false, "bogus": 1 })),
        )?;
        assert_eq!(ok.dpi, 150);
        assert!(!ok.generate_expanded);

        let bad_dpi = ExportOptions::from_map(
            ExportFormat::Png,
            CalendarKind::Wall,
            &opts(json!({ "dpi": 200 })),
        )
        .unwrap_err();
        assert!(matches!(
            bad_dpi.downcast_ref::<CalendarError>(),
            Some(CalendarError::InvalidOption { key, .. }) if key == "dpi"
        ));

        let bad_flag = ExportOptions::from_map(
            ExportFormat::Png,
            CalendarKind::Wall,
            &opts(json!({ "skip_months": "yes" })),
        );
        assert!(bad_flag.is_err());
        Ok(())
    }

    #[test]
    fn options_for_another_exporter_are_ignored() -> Result<()> {
        // skip_months only applies to wall calendars.
        let o = ExportOptions::from_map(
            ExportFormat::Png,
            CalendarKind::Desk,
            &opts(json!({ "skip_months": true })),
        )?;
        assert_eq!(o, ExportOptions::default());
        Ok(())
    }

    #[test]
    fn summary_lists_errors() {
        let mut r = ExportResult::new();
        r.files.push("a.png".into());
        assert!(r.summary().starts_with("Exported 1 files in"));

        r.add_error("Page 3: boom");
        assert!(!r.success);
        assert_eq!(r.summary(), "Exported 1 files with 1 errors: Page 3: boom");
    }
}
