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

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::fonts::{FontFamily, FontSpec};
use crate::render_prims::{rgb, RGBInt};

pub const DEFAULT_DPI: u32 = 300;
pub const DPI_CHOICES: [u32; 7] = [32, 64, 96, 150, 300, 600, 1200];

pub const RGB_BLACK: RGBInt = rgb(0x000000);
pub const RGB_WHITE: RGBInt = rgb(0xFFFFFF);
pub const RGB_GRID_LINE: RGBInt = rgb(0x000000);
pub const RGB_CUT_GUIDE: RGBInt = rgb(0x808080);
/// Band behind cell text drawn over a photo.
pub const RGB_TEXT_BAND: RGBInt = rgb(0x000000);
pub const TEXT_BAND_ALPHA: u8 = 100;

pub const FONT_COVER_TITLE: FontSpec = FontSpec::new(FontFamily::EbGaramondBold, 36.0);
pub const FONT_WALL_ART_TITLE: FontSpec = FontSpec::new(FontFamily::Roboto, 14.0);
pub const FONT_WALL_MONTH_TITLE: FontSpec = FontSpec::new(FontFamily::Roboto, 40.0);
pub const FONT_WALL_HEADER: FontSpec = FontSpec::new(FontFamily::Roboto, 14.0);
pub const FONT_DAY_NUMBER: FontSpec = FontSpec::new(FontFamily::Roboto, 14.0);
pub const FONT_DAY_TEXT: FontSpec = FontSpec::new(FontFamily::Roboto, 10.0);

pub const FONT_DESK_ART_TITLE: FontSpec = FontSpec::new(FontFamily::EbGaramond, 14.0);
pub const FONT_DESK_MONTH_TITLE: FontSpec = FontSpec::new(FontFamily::HelveticaBold, 18.0);
pub const FONT_DESK_HEADER: FontSpec = FontSpec::new(FontFamily::HelveticaBold, 8.0);
pub const FONT_DESK_DAY: FontSpec = FontSpec::new(FontFamily::Helvetica, 8.0);

// Day cells, in inches.
pub const CELL_IMAGE_INSET: f64 = 0.01;
pub const CELL_NUMBER_INSET: f64 = 0.05;
pub const CELL_NUMBER_SIZE: f64 = 0.2;
pub const MOON_ICON_SIZE: f64 = 0.2;
pub const MOON_ICON_MARGIN: f64 = 0.05;
pub const TEXT_BAND_MARGIN: f64 = 0.01;
/// Height above the cell bottom for text without a band.
pub const PLAIN_TEXT_LIFT: f64 = 0.1;

pub const GRID_LINE_WIDTH: f64 = 0.01;

/// Cut guides: dash and gap are 3% of an inch, never under this many pixels.
pub const CUT_GUIDE_MIN_PX: f64 = 6.0;
pub const CUT_GUIDE_FRACTION: f64 = 0.03;

/// A calendar project as saved by the editor. Every field is optional;
/// command line flags fill in or override what is missing.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectFile {
    pub year: Option<i32>,
    pub cover: PageConfig,
    pub months: Vec<PageConfig>,
    pub birthdays: Option<PathBuf>,
    pub options: serde_json::Map<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub image: Option<PathBuf>,
    pub title: Option<String>,
    /// Title font family by name. Only the cover uses it; unknown names
    /// fall back to the default family.
    pub font: Option<String>,
}

impl PageConfig {
    pub fn font_family(&self) -> Option<FontFamily> {
        self.font.as_deref().map(FontFamily::from_name)
    }
}

impl ProjectFile {
    #[tracing::instrument]
    pub fn load(path: &Path) -> Result<ProjectFile> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read project file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Failed to parse project file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<ProjectFile> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_project() -> Result<()> {
        let project = ProjectFile::parse(
            r#"{
                "year": 2026,
                "cover": { "title": "Family\n2026", "font": "Roboto_Bold" },
                "months": [ { "image": "jan.jpg", "title": "Snow" } ],
                "options": { "dpi": 150 }
            }"#,
        )?;

        assert_eq!(project.year, Some(2026));
        assert_eq!(project.cover.title.as_deref(), Some("Family\n2026"));
        assert_eq!(project.cover.image, None);
        assert_eq!(project.months[0].image, Some(PathBuf::from("jan.jpg")));
        assert_eq!(project.options["dpi"], 150);
        assert!(project.birthdays.is_none());
        assert_eq!(project.cover.font_family(), Some(FontFamily::RobotoBold));
        assert_eq!(project.months[0].font_family(), None);
        Ok(())
    }

    #[test]
    fn unknown_font_falls_back() -> Result<()> {
        let project = ProjectFile::parse(r#"{ "cover": { "font": "Papyrus" } }"#)?;
        assert_eq!(project.cover.font_family(), Some(FontFamily::Arimo));
        Ok(())
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(ProjectFile::parse(r#"{ "yaer": 2026 }"#).is_err());
    }
}
