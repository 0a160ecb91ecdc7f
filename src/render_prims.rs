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

//! Retained-mode building blocks composed into page-level images.

use anyhow::Result;

use cairo::Rectangle;

use crate::error::convert_err;

pub type RGBInt = (u8, u8, u8);

pub const fn rgb(col: u32) -> RGBInt {
    let r = (col >> 16) as u8;
    let g = (col >> 8) as u8;
    let b = col as u8;

    (r, g, b)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub fn rgba(rgb: RGBInt, alpha: u8) -> Self {
        Color {
            r: rgb.0 as f64 / 255.0,
            g: rgb.1 as f64 / 255.0,
            b: rgb.2 as f64 / 255.0,
            a: alpha as f64 / 255.0,
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    pub fn set_source(&self, cr: &cairo::Context) {
        cr.set_source_rgba(self.r, self.g, self.b, self.a);
    }
}

impl From<RGBInt> for Color {
    fn from(rgb: RGBInt) -> Self {
        Color::rgba(rgb, 0xFF)
    }
}

pub trait Renderable {
    fn render_internal(&self, cr: &cairo::Context) -> Result<()>;

    fn render(&self, cr: &cairo::Context) -> Result<()> {
        cr.save().map_err(convert_err)?;
        cr.move_to(0.0, 0.0);
        let result = self.render_internal(cr);
        cr.restore().map_err(convert_err)?;

        result
    }

    fn render_to(&self, cr: &cairo::Context, origin: (f64, f64)) -> Result<()> {
        cr.save().map_err(convert_err)?;
        cr.translate(origin.0, origin.1);

        let result = self.render(cr);

        cr.restore().map_err(convert_err)?;

        result
    }

    fn bounds(&self) -> (f64, f64);

    fn height(&self) -> f64 {
        self.bounds().1
    }
    fn width(&self) -> f64 {
        self.bounds().0
    }
}

impl Renderable for cairo::ImageSurface {
    fn render_internal(&self, cr: &cairo::Context) -> Result<()> {
        cr.set_source_surface(self, 0.0, 0.0).map_err(convert_err)?;
        let source = cr.source();
        source.set_filter(cairo::Filter::Good);
        source.set_extend(cairo::Extend::Pad);
        cr.new_path();
        cr.rectangle(0.0, 0.0, self.width() as f64, self.height() as f64);
        cr.fill().map_err(convert_err)?;

        Ok(())
    }

    fn bounds(&self) -> (f64, f64) {
        (self.width() as f64, self.height() as f64)
    }
}

pub struct RenderTranslate {
    pub inner: Box<dyn Renderable>,
    pub offset: (f64, f64),
}

impl Renderable for RenderTranslate {
    fn render_internal(&self, cr: &cairo::Context) -> Result<()> {
        self.inner.render_to(cr, (self.offset.0, self.offset.1))
    }
    fn bounds(&self) -> (f64, f64) {
        let (w, h) = self.inner.bounds();
        (w + self.offset.0, h + self.offset.1)
    }
}

pub trait RenderableEx: Renderable {
    fn clip_to(self, clip_bounds: Rectangle) -> Clip<Self>
    where
        Self: Sized,
    {
        Clip {
            inner: self,
            clip_bounds,
        }
    }

    fn scale_by(self, w: f64, h: f64) -> Scale<Self>
    where
        Self: Sized,
    {
        Scale::scale_by(self, w, h)
    }

    fn offset(self, x: f64, y: f64) -> RenderTranslate
    where
        Self: Sized + 'static,
    {
        RenderTranslate {
            inner: Box::new(self),
            offset: (x, y),
        }
    }

    fn rotate_180(self) -> Rotate180<Self>
    where
        Self: Sized,
    {
        Rotate180 { inner: self }
    }
}

impl<R: Renderable> RenderableEx for R {}

#[derive(Default)]
pub struct RenderGroup {
    pub items: Vec<Box<dyn Renderable>>,
}

impl RenderGroup {
    pub fn new() -> Self {
        Self { items: vec![] }
    }

    pub fn push(&mut self, item: impl Renderable + 'static) {
        self.items.push(Box::new(item));
    }
}

impl Renderable for RenderGroup {
    fn render_internal(&self, cr: &cairo::Context) -> Result<()> {
        for item in self.items.iter() {
            item.render(cr)?;
        }

        Ok(())
    }
    fn bounds(&self) -> (f64, f64) {
        let mut w = 0.0;
        let mut h = 0.0;

        for item in self.items.iter() {
            let (iw, ih) = item.bounds();

            if iw > w {
                w = iw;
            }
            if ih > h {
                h = ih;
            }
        }

        (w, h)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FillRect {
    pub bounds: Rectangle,
    pub color: Color,
}

impl FillRect {
    pub fn rect(color: Color, w: f64, h: f64) -> Self {
        Self {
            bounds: Rectangle::new(0.0, 0.0, w, h),
            color,
        }
    }
}

impl Renderable for FillRect {
    fn render_internal(&self, cr: &cairo::Context) -> Result<()> {
        self.color.set_source(cr);
        cr.new_path();
        cr.rectangle(
            self.bounds.x(),
            self.bounds.y(),
            self.bounds.width(),
            self.bounds.height(),
        );
        cr.fill().map_err(convert_err)?;
        Ok(())
    }

    fn bounds(&self) -> (f64, f64) {
        (
            self.bounds.x() + self.bounds.width(),
            self.bounds.y() + self.bounds.height(),
        )
    }
}

pub struct Scale<R: Renderable> {
    inner: R,
    scale: (f64, f64),
}

impl<R: Renderable> Renderable for Scale<R> {
    fn render_internal(&self, cr: &cairo::Context) -> Result<()> {
        cr.save().map_err(convert_err)?;

        cr.scale(self.scale.0, self.scale.1);

        let result = self.inner.render(cr);

        cr.restore().map_err(convert_err)?;

        result
    }

    fn bounds(&self) -> (f64, f64) {
        let (w, h) = self.inner.bounds();

        (f64::max(0.0, w * self.scale.0), f64::max(0.0, h * self.scale.1))
    }
}

impl<R: Renderable> Scale<R> {
    fn scale_by(inner: R, w: f64, h: f64) -> Self {
        Self {
            inner,
            scale: (w, h),
        }
    }
}

#[derive(Clone)]
pub struct SwapXY<R> {
    inner: R,
}

impl<R: Renderable> SwapXY<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Renderable> Renderable for SwapXY<R> {
    fn render_internal(&self, cr: &cairo::Context) -> Result<()> {
        cr.save().map_err(convert_err)?;

        cr.transform(cairo::Matrix::new(0.0, 1.0, 1.0, 0.0, 0.0, 0.0));
        let r = self.inner.render_internal(cr);

        cr.restore().map_err(convert_err)?;

        r
    }

    fn bounds(&self) -> (f64, f64) {
        let (w, h) = self.inner.bounds();
        (h, w)
    }
}

/// Turns the inner item half a revolution about the center of its bounds.
#[derive(Clone)]
pub struct Rotate180<R> {
    inner: R,
}

impl<R: Renderable> Renderable for Rotate180<R> {
    fn render_internal(&self, cr: &cairo::Context) -> Result<()> {
        let (w, h) = self.inner.bounds();

        cr.save().map_err(convert_err)?;

        cr.transform(cairo::Matrix::new(-1.0, 0.0, 0.0, -1.0, w, h));
        let r = self.inner.render(cr);

        cr.restore().map_err(convert_err)?;

        r
    }

    fn bounds(&self) -> (f64, f64) {
        self.inner.bounds()
    }
}

#[derive(Clone)]
pub struct Clip<R> {
    inner: R,
    clip_bounds: Rectangle,
}

impl<R: Renderable> Renderable for Clip<R> {
    fn render_internal(&self, cr: &cairo::Context) -> Result<()> {
        cr.save().map_err(convert_err)?;

        cr.translate(-self.clip_bounds.x(), -self.clip_bounds.y());
        cr.new_path();
        cr.rectangle(
            self.clip_bounds.x(),
            self.clip_bounds.y(),
            self.clip_bounds.width(),
            self.clip_bounds.height(),
        );
        cr.clip();
        cr.new_path();
        let result = self.inner.render(cr);

        cr.restore().map_err(convert_err)?;

        result
    }
    fn bounds(&self) -> (f64, f64) {
        (self.clip_bounds.width(), self.clip_bounds.height())
    }
}

/// A horizontal dashed rule `width` long, `margin` below the origin.
#[derive(Clone, Copy, Debug)]
pub struct Separator {
    pub color: Color,
    pub width: f64,
    pub thickness: f64,
    pub dash: f64,
    pub gap: f64,
    pub margin: f64,
}

impl Renderable for Separator {
    fn render_internal(&self, cr: &cairo::Context) -> Result<()> {
        cr.new_path();
        self.color.set_source(cr);
        cr.move_to(0.0, self.margin);
        cr.set_dash(&[self.dash, self.gap], 0.0);
        cr.set_line_width(self.thickness);
        cr.set_line_cap(cairo::LineCap::Butt);
        cr.line_to(self.width, self.margin);
        cr.stroke().map_err(convert_err)?;

        Ok(())
    }
    fn bounds(&self) -> (f64, f64) {
        (self.width, self.thickness + self.margin)
    }
}

/// Scales `image` to cover a `w` x `h` box and crops the overflow evenly
/// from both sides, like CSS `object-fit: cover`.
pub fn cover(image: cairo::ImageSurface, w: f64, h: f64) -> Clip<Scale<cairo::ImageSurface>> {
    let (iw, ih) = image.bounds();
    let scale = if iw > 0.0 && ih > 0.0 {
        f64::max(w / iw, h / ih)
    } else {
        1.0
    };

    let crop_x = ((iw * scale - w) / 2.0).max(0.0);
    let crop_y = ((ih * scale - h) / 2.0).max(0.0);

    image
        .scale_by(scale, scale)
        .clip_to(Rectangle::new(crop_x, crop_y, w, h))
}

/// Renders `layout` onto a fresh ARGB surface, optionally over a solid
/// background.
pub fn render_surface(
    width: i32,
    height: i32,
    background: Option<Color>,
    layout: &dyn Renderable,
) -> Result<cairo::ImageSurface> {
    let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width.max(1), height.max(1))
        .map_err(convert_err)?;

    {
        let cr = cairo::Context::new(&surface).map_err(convert_err)?;
        if let Some(bg) = background {
            FillRect::rect(bg, width as f64, height as f64).render(&cr)?;
        }
        layout.render_to(&cr, (0.0, 0.0))?;
    }

    surface.flush();
    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::pixel_rgba;

    fn quadrants() -> Result<cairo::ImageSurface> {
        let mut group = RenderGroup::new();
        group.push(FillRect::rect(rgb(0xFF0000).into(), 4.0, 4.0));
        group.push(FillRect::rect(rgb(0x0000FF).into(), 4.0, 4.0).offset(4.0, 4.0));
        render_surface(8, 8, Some(rgb(0xFFFFFF).into()), &group)
    }

    #[test]
    fn rotate_180_swaps_corners() -> Result<()> {
        let src = quadrants()?;
        let rotated = render_surface(8, 8, None, &src.rotate_180())?;

        assert_eq!(pixel_rgba(&rotated, 0, 0)?, [0, 0, 255, 255]);
        assert_eq!(pixel_rgba(&rotated, 7, 7)?, [255, 0, 0, 255]);
        assert_eq!(pixel_rgba(&rotated, 7, 0)?, [255, 255, 255, 255]);
        Ok(())
    }

    #[test]
    fn cover_crops_the_long_side() -> Result<()> {
        // 8x8 source into a 8x4 box: rows 2..6 survive.
        let src = quadrants()?;
        let out = render_surface(8, 4, None, &cover(src, 8.0, 4.0))?;

        assert_eq!(pixel_rgba(&out, 1, 0)?, [255, 0, 0, 255]);
        assert_eq!(pixel_rgba(&out, 6, 3)?, [0, 0, 255, 255]);
        assert_eq!(pixel_rgba(&out, 6, 0)?, [255, 255, 255, 255]);
        Ok(())
    }

    #[test]
    fn swap_xy_transposes_bounds() {
        let rect = FillRect::rect(rgb(0).into(), 3.0, 5.0);
        assert_eq!(SwapXY::new(rect).bounds(), (5.0, 3.0));
    }
}
