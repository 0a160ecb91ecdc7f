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

use anyhow::{anyhow, bail, Result};
use std::path::{Path, PathBuf};

use chrono::Datelike;
use clap::Parser;
use serde_json::Value;
use tracing::{info, span, Level};
use tracing_appender::non_blocking::WorkerGuard;

use calendar_printer::birthdays::Birthdays;
use calendar_printer::config::ProjectFile;
use calendar_printer::events::EventsManager;
use calendar_printer::fonts::FontFamily;
use calendar_printer::{export, Calendar, CalendarKind, ExportContext, ExportFormat, ExportOptions};

/// Renders a year of calendar pages for printing.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Opts {
    /// Calendar year; defaults to the project's year, then the current one.
    #[arg(short, long)]
    year: Option<i32>,

    /// JSON project file with artwork, titles and export options.
    #[arg(short, long)]
    project: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = ExportFormat::Png)]
    format: ExportFormat,

    #[arg(short, long, value_enum, default_value_t = CalendarKind::Wall)]
    kind: CalendarKind,

    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    #[arg(long)]
    dpi: Option<u32>,

    /// Wall calendars only: write the cover and artwork pages, no grids.
    #[arg(long)]
    skip_months: bool,

    /// Desk calendars only: skip the legal-size tiled copies.
    #[arg(long)]
    no_expanded: bool,

    /// iCalendar file of birthdays.
    #[arg(short, long)]
    birthdays: Option<PathBuf>,

    #[arg(long)]
    cover_image: Option<PathBuf>,

    #[arg(long)]
    title: Option<String>,

    /// Cover title font family, e.g. Roboto_Bold.
    #[arg(long)]
    title_font: Option<String>,

    /// Also write logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let name = path
                .file_name()
                .ok_or_else(|| anyhow!("--log-file needs a file name, got {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}

fn build_calendar(opts: &Opts, project: &ProjectFile) -> Result<Calendar> {
    let year = opts
        .year
        .or(project.year)
        .unwrap_or_else(|| chrono::Local::now().year());

    let birthdays = match opts.birthdays.as_ref().or(project.birthdays.as_ref()) {
        Some(path) => Some(Birthdays::load(path)?),
        None => None,
    };

    let mut cal = Calendar::new(year, &EventsManager::new(year, birthdays))?;

    let cover = cal.front_page_mut();
    if let Some(image) = opts.cover_image.clone().or_else(|| project.cover.image.clone()) {
        cover.set_image(Some(image));
    }
    if let Some(title) = opts.title.clone().or_else(|| project.cover.title.clone()) {
        cover.set_title(title);
    }
    let font = match &opts.title_font {
        Some(name) => Some(FontFamily::from_name(name)),
        None => project.cover.font_family(),
    };
    if font.is_some() {
        cover.set_title_font(font);
    }

    for (index, page) in project.months.iter().enumerate() {
        let art = cal
            .art_mut(index as u32 + 1)
            .ok_or_else(|| anyhow!("project lists more than 12 months"))?;
        art.set_image(page.image.clone());
        if let Some(title) = &page.title {
            art.set_title(title.clone());
        }
    }

    Ok(cal)
}

fn export_options(opts: &Opts, project: &ProjectFile) -> Result<ExportOptions> {
    let mut options = project.options.clone();
    if let Some(dpi) = opts.dpi {
        options.insert("dpi".into(), Value::from(dpi));
    }
    if opts.skip_months {
        options.insert("skip_months".into(), Value::Bool(true));
    }
    if opts.no_expanded {
        options.insert("generate_expanded".into(), Value::Bool(false));
    }
    ExportOptions::from_map(opts.format, opts.kind, &options)
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    let _guard = init_logging(opts.log_file.as_deref())?;

    let span = span!(Level::INFO, "calendar", kind = %opts.kind, format = %opts.format);
    let _enter = span.enter();
    info!("Starting calendar generation");

    let project = match &opts.project {
        Some(path) => ProjectFile::load(path)?,
        None => ProjectFile::default(),
    };

    let cal = build_calendar(&opts, &project)?;
    let options = export_options(&opts, &project)?;

    let mut ctx = ExportContext::new(&cal, opts.kind, opts.format, &opts.output, options)
        .on_progress(|current, total, message| info!(current, total, "{}", message));
    let result = export(&mut ctx);

    if !result.success {
        bail!(result.summary());
    }
    println!("{}", result.summary());
    Ok(())
}
