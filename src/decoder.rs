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

//! Type-keyed dispatch from calendar model values to the functions that
//! render them.
//!
//! A [`DecoderBase`] maps a [`ModelKind`] to a handler. Lookup falls back
//! to the value rendering itself, and fails with
//! [`CalendarError::UnsupportedType`] when neither applies. Registering a
//! kind again replaces the previous handler.

use anyhow::{bail, Result};
use std::collections::HashMap;

use cairo::ImageSurface;
use serde::Serialize;
use tracing::trace;

use crate::calendar::{Calendar, CalendarArt, Day, FrontPage, Month};
use crate::config::MOON_ICON_SIZE;
use crate::error::CalendarError;
use crate::moon::{self, MoonPhase};
use crate::units::Resolution;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ModelKind {
    FrontPage,
    CalendarArt,
    Month,
    Calendar,
    Day,
    MoonPhase,
}

/// A borrowed model value of any kind.
#[derive(Clone, Copy, Debug)]
pub enum Model<'a> {
    FrontPage(&'a FrontPage),
    CalendarArt(&'a CalendarArt),
    Month(&'a Month),
    Calendar(&'a Calendar),
    Day(&'a Day),
    MoonPhase(MoonPhase),
}

impl<'a> Model<'a> {
    pub fn kind(&self) -> ModelKind {
        match self {
            Model::FrontPage(_) => ModelKind::FrontPage,
            Model::CalendarArt(_) => ModelKind::CalendarArt,
            Model::Month(_) => ModelKind::Month,
            Model::Calendar(_) => ModelKind::Calendar,
            Model::Day(_) => ModelKind::Day,
            Model::MoonPhase(_) => ModelKind::MoonPhase,
        }
    }

    fn draw_self(&self, res: &Resolution) -> Option<Result<ImageSurface>> {
        match self {
            Model::MoonPhase(phase) => Some(moon::icon(*phase, res.to_pt(&MOON_ICON_SIZE))),
            _ => None,
        }
    }

    fn html_self(&self) -> Option<String> {
        match self {
            Model::MoonPhase(phase) => Some(format!(
                "<img class=\"cell-moon-overlay\" src=\"{}\" alt=\"{}\">",
                phase.icon_name(),
                phase.name()
            )),
            _ => None,
        }
    }
}

macro_rules! model_from {
    ($($variant:ident),*) => {
        $(
            impl<'a> From<&'a $variant> for Model<'a> {
                fn from(value: &'a $variant) -> Self {
                    Model::$variant(value)
                }
            }
        )*
    };
}

model_from!(FrontPage, CalendarArt, Month, Calendar, Day);

impl<'a> From<MoonPhase> for Model<'a> {
    fn from(phase: MoonPhase) -> Self {
        Model::MoonPhase(phase)
    }
}

/// The handler table shared by every decoder flavor.
pub struct DecoderBase<H> {
    handlers: HashMap<ModelKind, H>,
}

impl<H> Default for DecoderBase<H> {
    fn default() -> Self {
        DecoderBase {
            handlers: HashMap::new(),
        }
    }
}

impl<H: Copy> DecoderBase<H> {
    /// Returns the handler this one replaced, if any.
    pub fn register(&mut self, kind: ModelKind, handler: H) -> Option<H> {
        self.handlers.insert(kind, handler)
    }

    pub fn handler(&self, kind: ModelKind) -> Option<H> {
        self.handlers.get(&kind).copied()
    }

    pub fn kinds(&self) -> impl Iterator<Item = ModelKind> + '_ {
        self.handlers.keys().copied()
    }
}

pub type PageIter<'a> = Box<dyn Iterator<Item = Result<ImageSurface>> + 'a>;

/// What an image handler produced: one page, or a lazily rendered run of
/// pages.
pub enum Decoded<'a> {
    Single(ImageSurface),
    Sequence(PageIter<'a>),
}

pub type ImageHandler = for<'a> fn(&'a ImageDecoder, Model<'a>) -> Result<Decoded<'a>>;

pub struct ImageDecoder {
    base: DecoderBase<ImageHandler>,
    res: Resolution,
}

impl ImageDecoder {
    /// An empty registry drawing in inches at `dpi`.
    pub fn new(dpi: u32) -> Self {
        ImageDecoder {
            base: DecoderBase::default(),
            res: Resolution::inches(dpi),
        }
    }

    pub fn res(&self) -> &Resolution {
        &self.res
    }

    pub fn dpi(&self) -> u32 {
        self.res.dpi()
    }

    pub fn set_dpi(&mut self, dpi: u32) {
        self.res.set_dpi(dpi);
    }

    pub fn register(&mut self, kind: ModelKind, handler: ImageHandler) -> Option<ImageHandler> {
        self.base.register(kind, handler)
    }

    pub fn decode<'a>(&'a self, model: Model<'a>) -> Result<Decoded<'a>> {
        let kind = model.kind();
        trace!(?kind, "decode");

        if let Some(handler) = self.base.handler(kind) {
            return handler(self, model);
        }

        match model.draw_self(&self.res) {
            Some(image) => image.map(Decoded::Single),
            None => Err(CalendarError::UnsupportedType(kind).into()),
        }
    }

    /// Every page `model` renders to, produced one at a time as the
    /// iterator is advanced. Each call starts a fresh run.
    pub fn draw<'a>(&'a self, model: impl Into<Model<'a>>) -> Result<PageIter<'a>> {
        let pages: PageIter<'a> = match self.decode(model.into())? {
            Decoded::Single(image) => Box::new(std::iter::once(Ok::<_, anyhow::Error>(image))),
            Decoded::Sequence(pages) => pages,
        };
        Ok(pages)
    }

    /// Renders a model that produces exactly one page.
    pub fn render<'a>(&'a self, model: impl Into<Model<'a>>) -> Result<ImageSurface> {
        let model = model.into();
        match self.decode(model)? {
            Decoded::Single(image) => Ok(image),
            Decoded::Sequence(_) => bail!("{:?} renders to more than one page", model.kind()),
        }
    }
}

pub type HtmlHandler = for<'a> fn(&'a HtmlEncoder, Model<'a>) -> Result<String>;

#[derive(Default)]
pub struct HtmlEncoder {
    base: DecoderBase<HtmlHandler>,
}

impl HtmlEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: ModelKind, handler: HtmlHandler) -> Option<HtmlHandler> {
        self.base.register(kind, handler)
    }

    pub fn to_html<'a>(&'a self, model: impl Into<Model<'a>>) -> Result<String> {
        let model = model.into();
        let kind = model.kind();

        if let Some(handler) = self.base.handler(kind) {
            return handler(self, model);
        }

        model
            .html_self()
            .ok_or_else(|| CalendarError::UnsupportedType(kind).into())
    }
}

/// The error a handler returns when the registry hands it the wrong kind.
pub fn unexpected(model: Model) -> anyhow::Error {
    anyhow::anyhow!("handler cannot render {:?}", model.kind())
}
