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

//! Tiles already-rendered desk calendar pages onto legal sheets.

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};

use calendar_printer::legal;
use calendar_printer::raster::{load_image_surface, write_png};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Opts {
    /// Desk pages (7in x 4.25in at any resolution).
    #[arg(required = true)]
    pages: Vec<PathBuf>,

    #[arg(short, long)]
    out: PathBuf,
}

fn impose_one(page: &PathBuf, opts: &Opts) -> Result<PathBuf> {
    let name = page
        .file_name()
        .ok_or_else(|| anyhow!("{} is not a file", page.display()))?;
    let out = opts.out.join(name).with_extension("png");

    let surface = load_image_surface(page)?;
    let (sheet, ppi) = legal::impose(&surface)?;
    write_png(&sheet, &out, ppi)?;

    info!(ppi, "wrote {}", out.display());
    Ok(out)
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    tracing_subscriber::fmt::init();

    std::fs::create_dir_all(&opts.out)
        .with_context(|| format!("Failed to create {}", opts.out.display()))?;

    let mut failed = 0;
    for page in &opts.pages {
        if let Err(e) = impose_one(page, &opts) {
            warn!("{}: {:#}", page.display(), e);
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(anyhow!("{} of {} pages failed", failed, opts.pages.len()));
    }
    Ok(())
}
