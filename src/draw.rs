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

//! Unit-aware drawing on top of a cairo context.
//!
//! Every coordinate and size passed to [`Draw`] is in the unit of its
//! [`Resolution`] and is converted to device pixels before it reaches cairo.

use anyhow::Result;
use std::f64::consts::{FRAC_PI_2, PI};

use cairo::ImageSurface;
use tracing::trace;

use crate::error::convert_err;
use crate::fonts::{Align, Anchor, Font};
use crate::geometry::BBox;
use crate::render_prims::{cover, render_surface, Color, RenderGroup, Renderable};
use crate::units::{Length, Resolution};

/// How a pasted image combines with what is already on the page.
#[derive(Clone, Copy, Debug)]
pub enum Mask<'a> {
    /// Replace the destination pixels, alpha included.
    Opaque,
    /// Blend using the image's own alpha.
    OwnAlpha,
    /// Blend through the alpha of another surface placed at the same spot.
    Stencil(&'a ImageSurface),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ShapeStyle {
    pub fill: Option<Color>,
    pub outline: Option<Color>,
    /// Outline thickness, drawn inside the box.
    pub width: f64,
}

impl ShapeStyle {
    pub fn filled(fill: Color) -> Self {
        ShapeStyle {
            fill: Some(fill),
            ..Default::default()
        }
    }

    pub fn outlined(outline: Color, width: f64) -> Self {
        ShapeStyle {
            outline: Some(outline),
            width,
            ..Default::default()
        }
    }

    fn translucent(&self) -> bool {
        self.fill.map_or(false, |c| !c.is_opaque()) || self.outline.map_or(false, |c| !c.is_opaque())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TextOptions {
    pub fill: Color,
    pub anchor: Anchor,
    /// Extra space between lines.
    pub spacing: Length,
    pub align: Align,
}

impl Default for TextOptions {
    fn default() -> Self {
        TextOptions {
            fill: Color::rgba((0, 0, 0), 0xFF),
            anchor: Anchor::default(),
            spacing: Length::device(4.0),
            align: Align::Left,
        }
    }
}

impl TextOptions {
    pub fn new(fill: Color, anchor: Anchor) -> Self {
        TextOptions {
            fill,
            anchor,
            ..Default::default()
        }
    }

    pub fn align(self, align: Align) -> Self {
        TextOptions { align, ..self }
    }

    pub fn spacing(self, spacing: Length) -> Self {
        TextOptions { spacing, ..self }
    }
}

enum Corners {
    All,
    RightOnly,
}

pub struct Draw {
    cr: cairo::Context,
    res: Resolution,
}

impl Draw {
    pub fn new(surface: &ImageSurface, res: Resolution) -> Result<Draw> {
        let cr = cairo::Context::new(surface).map_err(convert_err)?;
        Ok(Draw { cr, res })
    }

    pub fn res(&self) -> &Resolution {
        &self.res
    }

    pub fn context(&self) -> &cairo::Context {
        &self.cr
    }

    fn px(&self, v: f64) -> f64 {
        self.res.to_pt(&v) as f64
    }

    fn px_box(&self, bbox: BBox) -> BBox {
        self.res.to_pt(&bbox)
    }

    fn composite(&self, item: &dyn Renderable, origin: (f64, f64), mask: Mask) -> Result<()> {
        let cr = &self.cr;

        if let Mask::Stencil(stencil) = mask {
            let (w, h) = item.bounds();
            let flat = render_surface(w.ceil() as i32, h.ceil() as i32, None, item)?;

            cr.save().map_err(convert_err)?;
            cr.set_source_surface(&flat, origin.0, origin.1)
                .map_err(convert_err)?;
            let result = cr.mask_surface(stencil, origin.0, origin.1);
            cr.restore().map_err(convert_err)?;

            return result.map_err(convert_err);
        }

        cr.save().map_err(convert_err)?;
        if let Mask::Opaque = mask {
            cr.set_operator(cairo::Operator::Source);
        }
        let result = item.render_to(cr, origin);
        cr.restore().map_err(convert_err)?;

        result
    }

    /// Pastes `image` at its native pixel size with its top-left at `xy`.
    pub fn paste(&self, image: &ImageSurface, xy: (f64, f64), mask: Mask) -> Result<()> {
        let origin = (self.px(xy.0), self.px(xy.1));
        self.composite(image, origin, mask)
    }

    /// Scales `image` to exactly cover `bbox`, cropping the overflow evenly.
    pub fn paste_cover(&self, image: &ImageSurface, bbox: BBox, mask: Mask) -> Result<()> {
        let px = self.px_box(bbox);
        trace!(?px, "paste_cover");
        let item = cover(image.clone(), px.width(), px.height());
        self.composite(&item, px.origin(), mask)
    }

    fn shape(&self, bbox: BBox, radius: f64, corners: Corners, style: &ShapeStyle) -> Result<()> {
        let cr = &self.cr;
        let px = self.px_box(bbox);
        let radius = self.px(radius);
        let line = self.px(style.width);
        let translucent = style.translucent();

        cr.save().map_err(convert_err)?;
        if translucent {
            // Draw onto a transparent group and composite it through its own
            // alpha so the colors blend with the page instead of replacing it.
            cr.push_group();
            cr.set_operator(cairo::Operator::Source);
        }

        if let Some(fill) = style.fill {
            trace_shape(cr, px, radius, &corners);
            fill.set_source(cr);
            cr.fill().map_err(convert_err)?;
        }

        if let Some(outline) = style.outline {
            if line > 0.0 {
                let inset = px.shrink(line / 2.0);
                trace_shape(cr, inset, (radius - line / 2.0).max(0.0), &corners);
                outline.set_source(cr);
                cr.set_line_width(line);
                cr.stroke().map_err(convert_err)?;
            }
        }

        if translucent {
            cr.pop_group_to_source().map_err(convert_err)?;
            cr.set_operator(cairo::Operator::Over);
            cr.paint().map_err(convert_err)?;
        }
        cr.restore().map_err(convert_err)?;

        Ok(())
    }

    pub fn rectangle(&self, bbox: BBox, style: &ShapeStyle) -> Result<()> {
        self.shape(bbox, 0.0, Corners::All, style)
    }

    pub fn rounded_rectangle(&self, bbox: BBox, radius: f64, style: &ShapeStyle) -> Result<()> {
        self.shape(bbox, radius, Corners::All, style)
    }

    /// Only the two right-hand corners are rounded.
    pub fn rounded_rectangle_right(
        &self,
        bbox: BBox,
        radius: f64,
        style: &ShapeStyle,
    ) -> Result<()> {
        self.shape(bbox, radius, Corners::RightOnly, style)
    }

    fn spacing_px(&self, spacing: Length) -> f64 {
        self.res.to_pt(&spacing) as f64
    }

    pub fn text(&self, text: &str, xy: (f64, f64), font: &Font, opts: &TextOptions) -> Result<()> {
        let cr = &self.cr;
        let layout = font.layout(cr, text, self.spacing_px(opts.spacing), opts.align);
        let (origin, _) = Font::place(&layout, (self.px(xy.0), self.px(xy.1)), opts.anchor);

        cr.save().map_err(convert_err)?;
        cr.move_to(origin.0, origin.1);
        opts.fill.set_source(cr);
        pangocairo::functions::show_layout(cr, &layout);
        cr.restore().map_err(convert_err)?;

        Ok(())
    }

    /// The box `text` covers when drawn at `xy` with the same options.
    pub fn textbbox(
        &self,
        text: &str,
        xy: (f64, f64),
        font: &Font,
        opts: &TextOptions,
    ) -> Result<BBox> {
        let layout = font.layout(&self.cr, text, self.spacing_px(opts.spacing), opts.align);
        let (_, bbox) = Font::place(&layout, (self.px(xy.0), self.px(xy.1)), opts.anchor);

        Ok(self.res.pt_to(&bbox))
    }

    fn line_width_px(&self, line: &str, font: &Font) -> f64 {
        let layout = font.layout(&self.cr, line, 0.0, Align::Left);
        layout.pixel_extents().1.width() as f64
    }

    /// Greedy word wrap: each existing line is refilled word by word and a
    /// break is inserted before any word that would push it past
    /// `max_width`. Words are never split, so an over-long word gets a line
    /// of its own.
    pub fn get_multiline_text(&self, text: &str, max_width: f64, font: &Font) -> String {
        let limit = self.res.to_px(max_width) + 1e-6;
        let mut lines = Vec::new();

        for paragraph in text.split('\n') {
            let mut current = String::new();
            for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
                if current.is_empty() {
                    current.push_str(word);
                    continue;
                }

                let candidate = format!("{} {}", current, word);
                if self.line_width_px(&candidate, font) > limit {
                    lines.push(std::mem::replace(&mut current, word.to_string()));
                } else {
                    current = candidate;
                }
            }
            lines.push(current);
        }

        lines.join("\n")
    }
}

fn trace_shape(cr: &cairo::Context, b: BBox, radius: f64, corners: &Corners) {
    let r = radius.min(b.width() / 2.0).min(b.height() / 2.0).max(0.0);

    cr.new_path();
    if r <= 0.0 {
        cr.rectangle(b.left, b.top, b.width(), b.height());
        return;
    }

    match corners {
        Corners::All => {
            cr.arc(b.left + r, b.top + r, r, PI, 3.0 * FRAC_PI_2);
        }
        Corners::RightOnly => {
            cr.move_to(b.left, b.top);
        }
    }
    cr.arc(b.right - r, b.top + r, r, 3.0 * FRAC_PI_2, 2.0 * PI);
    cr.arc(b.right - r, b.bottom - r, r, 0.0, FRAC_PI_2);
    match corners {
        Corners::All => {
            cr.arc(b.left + r, b.bottom - r, r, FRAC_PI_2, PI);
        }
        Corners::RightOnly => {
            cr.line_to(b.left, b.bottom);
        }
    }
    cr.close_path();
}

/// A blank raster page of a fixed physical size.
pub struct Page {
    surface: ImageSurface,
    res: Resolution,
}

impl Page {
    /// `width` and `height` are in the unit of `res`.
    pub fn new(width: f64, height: f64, res: Resolution, background: Option<Color>) -> Result<Page> {
        let w = res.to_pt(&width);
        let h = res.to_pt(&height);

        let surface = render_surface(w, h, background, &RenderGroup::new())?;

        Ok(Page { surface, res })
    }

    pub fn res(&self) -> &Resolution {
        &self.res
    }

    pub fn draw(&self) -> Result<Draw> {
        Draw::new(&self.surface, self.res)
    }

    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    pub fn into_surface(self) -> ImageSurface {
        self.surface.flush();
        self.surface
    }
}
