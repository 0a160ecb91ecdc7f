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

//! Moving pixels between image files and cairo surfaces.
//!
//! Cairo keeps ARGB32 as native-endian `u32`s with premultiplied alpha;
//! files on disk are straight RGBA.

use anyhow::{Context, Result};
use std::convert::TryFrom;
use std::path::Path;

use tracing::debug;

use crate::error::convert_err;

#[tracing::instrument]
pub fn load_image_surface(path: &Path) -> Result<cairo::ImageSurface> {
    let img = image::open(path)
        .with_context(|| format!("Loading image {:?}", path))?
        .to_rgba8();

    debug!(width = img.width(), height = img.height(), "decoded image");

    rgba_to_surface(img.width(), img.height(), img.as_raw())
}

pub fn rgba_to_surface(width: u32, height: u32, rgba: &[u8]) -> Result<cairo::ImageSurface> {
    let w = i32::try_from(width)?;
    let h = i32::try_from(height)?;
    let stride = cairo::Format::ARgb32
        .stride_for_width(width)
        .map_err(convert_err)?;
    let row_bytes = usize::try_from(stride)?;

    let mut data = vec![0u8; row_bytes * height as usize];
    for (src_row, dst_row) in rgba
        .chunks_exact(width as usize * 4)
        .zip(data.chunks_exact_mut(row_bytes))
    {
        for (src, dst) in src_row.chunks_exact(4).zip(dst_row.chunks_exact_mut(4)) {
            let a = src[3] as u32;
            let pm = |c: u8| (c as u32 * a + 127) / 255;
            let px = (a << 24) | (pm(src[0]) << 16) | (pm(src[1]) << 8) | pm(src[2]);
            dst.copy_from_slice(&px.to_ne_bytes());
        }
    }

    cairo::ImageSurface::create_for_data(data, cairo::Format::ARgb32, w, h, stride)
        .map_err(convert_err)
}

fn unpremultiply(px: u32) -> [u8; 4] {
    let a = px >> 24;
    if a == 0 {
        return [0, 0, 0, 0];
    }

    let un = |c: u32| ((c * 255 + a / 2) / a).min(255) as u8;
    [un((px >> 16) & 0xFF), un((px >> 8) & 0xFF), un(px & 0xFF), a as u8]
}

/// Straight RGBA rows with no padding.
pub fn surface_to_rgba(surface: &cairo::ImageSurface) -> Result<Vec<u8>> {
    surface.flush();

    let width = usize::try_from(surface.width())?;
    let height = usize::try_from(surface.height())?;
    let stride = usize::try_from(surface.stride())?;

    let mut out = Vec::with_capacity(width * height * 4);
    surface
        .with_data(|data| {
            for row in data.chunks(stride).take(height) {
                for px in row[..width * 4].chunks_exact(4) {
                    let px = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]);
                    out.extend_from_slice(&unpremultiply(px));
                }
            }
        })
        .map_err(convert_err)?;

    Ok(out)
}

pub fn pixel_rgba(surface: &cairo::ImageSurface, x: i32, y: i32) -> Result<[u8; 4]> {
    anyhow::ensure!(
        x >= 0 && y >= 0 && x < surface.width() && y < surface.height(),
        "Pixel ({}, {}) outside {}x{} surface",
        x,
        y,
        surface.width(),
        surface.height()
    );

    surface.flush();
    let offset = y as usize * surface.stride() as usize + x as usize * 4;
    let mut px = [0u8; 4];
    surface
        .with_data(|data| px.copy_from_slice(&data[offset..offset + 4]))
        .map_err(convert_err)?;

    Ok(unpremultiply(u32::from_ne_bytes(px)))
}

/// Writes `surface` as an RGBA PNG, recording `dpi` in the pHYs chunk.
#[tracing::instrument(skip(surface))]
pub fn write_png(surface: &cairo::ImageSurface, path: &Path, dpi: u32) -> Result<()> {
    let rgba = surface_to_rgba(surface)?;

    let f = std::fs::File::create(path).with_context(|| format!("Creating {:?}", path))?;
    let w = std::io::BufWriter::new(f);

    let mut encoder = png::Encoder::new(w, surface.width() as u32, surface.height() as u32);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let ppm = (dpi as f64 / 0.0254).round() as u32;
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: ppm,
        yppu: ppm,
        unit: png::Unit::Meter,
    }));

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&rgba)?;
    writer.finish()?;

    Ok(())
}

/// Reads the DPI recorded by [`write_png`], if any.
pub fn read_png_dpi(path: &Path) -> Result<Option<u32>> {
    let f = std::fs::File::open(path).with_context(|| format!("Opening {:?}", path))?;
    let reader = png::Decoder::new(std::io::BufReader::new(f)).read_info()?;

    Ok(reader.info().pixel_dims.and_then(|dims| match dims.unit {
        png::Unit::Meter => Some((dims.xppu as f64 * 0.0254).round() as u32),
        png::Unit::Unspecified => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_survives_surface() -> Result<()> {
        let rgba = [
            255, 0, 0, 255, //
            0, 255, 0, 255, //
            0, 0, 255, 255, //
            0, 0, 0, 0,
        ];
        let surface = rgba_to_surface(2, 2, &rgba)?;
        assert_eq!(surface_to_rgba(&surface)?, rgba.to_vec());
        assert_eq!(pixel_rgba(&surface, 1, 0)?, [0, 255, 0, 255]);
        Ok(())
    }

    #[test]
    fn png_records_dpi() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("page.png");
        let surface = rgba_to_surface(1, 1, &[10, 20, 30, 255])?;

        write_png(&surface, &path, 150)?;

        assert_eq!(read_png_dpi(&path)?, Some(150));
        let back = load_image_surface(&path)?;
        assert_eq!(pixel_rgba(&back, 0, 0)?, [10, 20, 30, 255]);
        Ok(())
    }
}
