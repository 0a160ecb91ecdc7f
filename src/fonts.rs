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

//! Named font families and unit-aware text measurement.

use anyhow::{anyhow, Result};
use std::str::FromStr;

use pango::FontDescription;
use serde::Serialize;
use tracing::warn;

use crate::error::convert_err;
use crate::geometry::BBox;
use crate::units::Resolution;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum FontFamily {
    Arimo,
    ArimoBold,
    EbGaramond,
    EbGaramondBold,
    Roboto,
    RobotoBold,
    Helvetica,
    HelveticaBold,
}

impl FontFamily {
    pub const ALL: [FontFamily; 8] = [
        FontFamily::Arimo,
        FontFamily::ArimoBold,
        FontFamily::EbGaramond,
        FontFamily::EbGaramondBold,
        FontFamily::Roboto,
        FontFamily::RobotoBold,
        FontFamily::Helvetica,
        FontFamily::HelveticaBold,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FontFamily::Arimo => "Arimo",
            FontFamily::ArimoBold => "Arimo_Bold",
            FontFamily::EbGaramond => "EBGaramond",
            FontFamily::EbGaramondBold => "EBGaramond_Bold",
            FontFamily::Roboto => "Roboto",
            FontFamily::RobotoBold => "Roboto_Bold",
            FontFamily::Helvetica => "Helvetica",
            FontFamily::HelveticaBold => "Helvetica_Bold",
        }
    }

    /// Unknown names resolve to [`FontFamily::Arimo`].
    pub fn from_name(name: &str) -> FontFamily {
        FontFamily::ALL
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(name))
            .unwrap_or_else(|| {
                warn!(font = name, "unknown font family, using Arimo");
                FontFamily::Arimo
            })
    }

    fn family(self) -> &'static str {
        match self {
            FontFamily::Arimo | FontFamily::ArimoBold => "Arimo",
            FontFamily::EbGaramond | FontFamily::EbGaramondBold => "EB Garamond",
            FontFamily::Roboto | FontFamily::RobotoBold => "Roboto",
            FontFamily::Helvetica | FontFamily::HelveticaBold => "Helvetica",
        }
    }

    fn weight(self) -> pango::Weight {
        match self {
            FontFamily::ArimoBold
            | FontFamily::EbGaramondBold
            | FontFamily::RobotoBold
            | FontFamily::HelveticaBold => pango::Weight::Bold,
            _ => pango::Weight::Normal,
        }
    }
}

/// A family at a size in typographic points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontSpec {
    pub family: FontFamily,
    pub size: f64,
}

impl FontSpec {
    pub const fn new(family: FontFamily, size: f64) -> Self {
        FontSpec { family, size }
    }

    pub const fn with_family(self, family: FontFamily) -> Self {
        FontSpec { family, ..self }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HAnchor {
    Left,
    Middle,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VAnchor {
    /// Top of the first line.
    Ascender,
    Middle,
    /// Bottom of the last line.
    Descender,
}

/// Where `xy` sits relative to a block of text. Parses the two-letter form
/// `la`, `mm`, `md` etc.; `t` and `b` are accepted for `a` and `d`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Anchor {
    pub h: HAnchor,
    pub v: VAnchor,
}

impl Anchor {
    pub const LEFT_TOP: Anchor = Anchor {
        h: HAnchor::Left,
        v: VAnchor::Ascender,
    };
    pub const CENTER: Anchor = Anchor {
        h: HAnchor::Middle,
        v: VAnchor::Middle,
    };
    pub const MIDDLE_BOTTOM: Anchor = Anchor {
        h: HAnchor::Middle,
        v: VAnchor::Descender,
    };
    pub const RIGHT_TOP: Anchor = Anchor {
        h: HAnchor::Right,
        v: VAnchor::Ascender,
    };
}

impl Default for Anchor {
    fn default() -> Self {
        Anchor::LEFT_TOP
    }
}

impl FromStr for Anchor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        let h = match chars.next() {
            Some('l') => HAnchor::Left,
            Some('m') => HAnchor::Middle,
            Some('r') => HAnchor::Right,
            _ => return Err(anyhow!("Bad horizontal anchor in {:?}", s)),
        };
        let v = match chars.next() {
            Some('a') | Some('t') => VAnchor::Ascender,
            Some('m') => VAnchor::Middle,
            Some('d') | Some('b') => VAnchor::Descender,
            _ => return Err(anyhow!("Bad vertical anchor in {:?}", s)),
        };
        if chars.next().is_some() {
            return Err(anyhow!("Trailing characters in anchor {:?}", s));
        }

        Ok(Anchor { h, v })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl From<Align> for pango::Alignment {
    fn from(a: Align) -> Self {
        match a {
            Align::Left => pango::Alignment::Left,
            Align::Center => pango::Alignment::Center,
            Align::Right => pango::Alignment::Right,
        }
    }
}

/// A family and size resolved to device pixels for one [`Resolution`].
/// Cheap enough to build per draw call.
#[derive(Clone, Debug)]
pub struct Font {
    spec: FontSpec,
    desc: FontDescription,
    res: Resolution,
}

impl Font {
    pub fn new(spec: FontSpec, res: &Resolution) -> Font {
        let mut desc = FontDescription::new();
        desc.set_family(spec.family.family());
        desc.set_weight(spec.family.weight());
        desc.set_absolute_size(res.font_to_pt(spec.size) as f64 * pango::SCALE as f64);

        Font {
            spec,
            desc,
            res: *res,
        }
    }

    pub fn spec(&self) -> FontSpec {
        self.spec
    }

    pub fn description(&self) -> &FontDescription {
        &self.desc
    }

    pub fn size_px(&self) -> i32 {
        self.res.font_to_pt(self.spec.size)
    }

    /// Lays out `text` with `spacing_px` device pixels between lines.
    pub fn layout(
        &self,
        cr: &cairo::Context,
        text: &str,
        spacing_px: f64,
        align: Align,
    ) -> pango::Layout {
        let layout = pangocairo::functions::create_layout(cr);
        layout.set_font_description(Some(&self.desc));
        layout.set_spacing((spacing_px * pango::SCALE as f64) as i32);
        layout.set_alignment(align.into());
        layout.set_text(text);
        layout
    }

    /// Where a layout's origin goes so that `xy` lands on `anchor`, and the
    /// logical box it then covers. Both in device pixels.
    pub fn place(layout: &pango::Layout, xy: (f64, f64), anchor: Anchor) -> ((f64, f64), BBox) {
        let (_ink, logical) = layout.pixel_extents();
        let w = logical.width() as f64;
        let h = logical.height() as f64;

        let left = match anchor.h {
            HAnchor::Left => xy.0,
            HAnchor::Middle => xy.0 - w / 2.0,
            HAnchor::Right => xy.0 - w,
        };
        let top = match anchor.v {
            VAnchor::Ascender => xy.1,
            VAnchor::Middle => xy.1 - h / 2.0,
            VAnchor::Descender => xy.1 - h,
        };

        let origin = (left - logical.x() as f64, top - logical.y() as f64);
        (origin, BBox::new(left, top, w, h))
    }

    /// Box covered by single-spaced `text` drawn at the origin, in the
    /// resolution's unit.
    pub fn getbbox(&self, text: &str, anchor: Anchor) -> Result<BBox> {
        let scratch = cairo::ImageSurface::create(cairo::Format::ARgb32, 1, 1)
            .map_err(convert_err)?;
        let cr = cairo::Context::new(&scratch).map_err(convert_err)?;

        let layout = self.layout(&cr, text, 0.0, Align::Left);
        let (_, bbox) = Font::place(&layout, (0.0, 0.0), anchor);

        Ok(self.res.pt_to(&bbox))
    }
}
