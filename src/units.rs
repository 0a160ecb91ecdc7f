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

//! Conversion between physical lengths and device pixels.
//!
//! A [`Resolution`] is an explicit value carried by every page, canvas and
//! font. It pairs a DPI with the default [`Unit`] that bare numbers are
//! measured in. Device pixels are integers and conversions truncate toward
//! zero, so `pt_to(to_pt(x))` recovers `x` to within one pixel.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_DPI;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    In,
    Mm,
    Cm,
    /// CSS pixels, 96 to the inch.
    Px,
    /// Device pixels.
    Pt,
    /// Typographic points, 72 to the inch.
    Font,
    None,
}

impl Unit {
    pub fn from_suffix(suffix: &str) -> Option<Unit> {
        Some(match suffix {
            "in" => Unit::In,
            "mm" => Unit::Mm,
            "cm" => Unit::Cm,
            "px" => Unit::Px,
            "pt" => Unit::Pt,
            "font" => Unit::Font,
            "none" => Unit::None,
            _ => return None,
        })
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Unit::In => "in",
            Unit::Mm => "mm",
            Unit::Cm => "cm",
            Unit::Px => "px",
            Unit::Pt => "pt",
            Unit::Font => "font",
            Unit::None => "none",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// A number with an optional unit. Without a unit it is measured in the
/// resolution's default unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Length {
    pub value: f64,
    pub unit: Option<Unit>,
}

impl Length {
    pub const fn new(value: f64, unit: Unit) -> Self {
        Length {
            value,
            unit: Some(unit),
        }
    }

    pub const fn device(px: f64) -> Self {
        Length::new(px, Unit::Pt)
    }

    /// Parses `<number><letters>` from the start of `s`. Trailing text after
    /// the suffix is ignored, and an unrecognised suffix leaves the unit unset.
    pub fn parse(s: &str) -> Option<Length> {
        let bytes = s.as_bytes();
        let digits_from = |mut i: usize| {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            i
        };

        let mut end = 0;
        if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
            end = 1;
        }
        let int_end = digits_from(end);
        let has_int = int_end > end;
        end = int_end;

        if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
            end = digits_from(end + 1);
        } else if !has_int {
            return None;
        }

        let value: f64 = s[..end].parse().ok()?;

        let suffix_len = s[end..]
            .bytes()
            .take_while(|b| b.is_ascii_lowercase())
            .count();
        let unit = Unit::from_suffix(&s[end..end + suffix_len]);

        Some(Length { value, unit })
    }
}

impl From<f64> for Length {
    fn from(value: f64) -> Self {
        Length { value, unit: None }
    }
}

impl FromStr for Length {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Length::parse(s).ok_or_else(|| anyhow::anyhow!("Malformed length {:?}", s))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    dpi: u32,
    unit: Unit,
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution {
            dpi: DEFAULT_DPI,
            unit: Unit::None,
        }
    }
}

impl Resolution {
    pub fn new(dpi: u32, unit: Unit) -> Self {
        Resolution {
            dpi: dpi.max(1),
            unit,
        }
    }

    /// Page layouts are specified in inches.
    pub fn inches(dpi: u32) -> Self {
        Resolution::new(dpi, Unit::In)
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn set_dpi(&mut self, dpi: u32) {
        self.dpi = dpi.max(1);
    }

    pub fn set_unit(&mut self, unit: Unit) {
        self.unit = unit;
    }

    pub fn with_dpi(self, dpi: u32) -> Self {
        Resolution::new(dpi, self.unit)
    }

    /// Converts to device pixels without truncating.
    pub fn unit_to_px(&self, unit: Unit, value: f64) -> f64 {
        let dpi = self.dpi as f64;
        match unit {
            Unit::In => value * dpi,
            Unit::Mm => value * dpi / 25.4,
            Unit::Cm => value * dpi / 2.54,
            Unit::Px => value * dpi / 96.0,
            Unit::Font => value * dpi / 72.0,
            Unit::Pt | Unit::None => value,
        }
    }

    pub fn unit_to_pt(&self, unit: Unit, value: f64) -> i32 {
        self.unit_to_px(unit, value) as i32
    }

    pub fn pt_to_unit(&self, unit: Unit, pt: f64) -> f64 {
        let inches = pt / self.dpi as f64;
        match unit {
            Unit::In => inches,
            Unit::Mm => inches * 25.4,
            Unit::Cm => inches * 2.54,
            Unit::Px => inches * 96.0,
            Unit::Font => inches * 72.0,
            Unit::Pt | Unit::None => pt,
        }
    }

    pub fn font_to_pt(&self, size: f64) -> i32 {
        self.unit_to_pt(Unit::Font, size)
    }

    pub fn to_pt<T: ToPt + ?Sized>(&self, value: &T) -> T::Output {
        value.to_pt(self)
    }

    pub fn pt_to<T: PtTo + ?Sized>(&self, value: &T) -> T::Output {
        value.pt_to(self)
    }

    pub fn to_px(&self, value: f64) -> f64 {
        self.unit_to_px(self.unit, value)
    }
}

/// Shape-preserving conversion into device pixels.
pub trait ToPt {
    type Output;

    fn to_pt(&self, res: &Resolution) -> Self::Output;
}

/// Shape-preserving conversion from device pixels into a unit.
pub trait PtTo {
    type Output;

    fn pt_to(&self, res: &Resolution) -> Self::Output;
}

impl ToPt for f64 {
    type Output = i32;

    fn to_pt(&self, res: &Resolution) -> i32 {
        res.unit_to_pt(res.unit, *self)
    }
}

impl ToPt for i32 {
    type Output = i32;

    fn to_pt(&self, res: &Resolution) -> i32 {
        res.unit_to_pt(res.unit, *self as f64)
    }
}

impl ToPt for u32 {
    type Output = i32;

    fn to_pt(&self, res: &Resolution) -> i32 {
        res.unit_to_pt(res.unit, *self as f64)
    }
}

impl ToPt for Length {
    type Output = i32;

    fn to_pt(&self, res: &Resolution) -> i32 {
        res.unit_to_pt(self.unit.unwrap_or(res.unit), self.value)
    }
}

impl ToPt for str {
    type Output = i32;

    fn to_pt(&self, res: &Resolution) -> i32 {
        Length::parse(self).map(|l| l.to_pt(res)).unwrap_or(0)
    }
}

impl ToPt for String {
    type Output = i32;

    fn to_pt(&self, res: &Resolution) -> i32 {
        self.as_str().to_pt(res)
    }
}

impl<T: ToPt + ?Sized> ToPt for &T {
    type Output = T::Output;

    fn to_pt(&self, res: &Resolution) -> T::Output {
        (**self).to_pt(res)
    }
}

impl<A: ToPt, B: ToPt> ToPt for (A, B) {
    type Output = (A::Output, B::Output);

    fn to_pt(&self, res: &Resolution) -> Self::Output {
        (self.0.to_pt(res), self.1.to_pt(res))
    }
}

impl<A: ToPt, B: ToPt, C: ToPt, D: ToPt> ToPt for (A, B, C, D) {
    type Output = (A::Output, B::Output, C::Output, D::Output);

    fn to_pt(&self, res: &Resolution) -> Self::Output {
        (
            self.0.to_pt(res),
            self.1.to_pt(res),
            self.2.to_pt(res),
            self.3.to_pt(res),
        )
    }
}

impl<T: ToPt, const N: usize> ToPt for [T; N] {
    type Output = [T::Output; N];

    fn to_pt(&self, res: &Resolution) -> Self::Output {
        std::array::from_fn(|i| self[i].to_pt(res))
    }
}

impl<T: ToPt> ToPt for Vec<T> {
    type Output = Vec<T::Output>;

    fn to_pt(&self, res: &Resolution) -> Self::Output {
        self.iter().map(|v| v.to_pt(res)).collect()
    }
}

impl PtTo for i32 {
    type Output = f64;

    fn pt_to(&self, res: &Resolution) -> f64 {
        res.pt_to_unit(res.unit, *self as f64)
    }
}

impl PtTo for f64 {
    type Output = f64;

    fn pt_to(&self, res: &Resolution) -> f64 {
        res.pt_to_unit(res.unit, *self)
    }
}

impl PtTo for Length {
    type Output = f64;

    fn pt_to(&self, res: &Resolution) -> f64 {
        res.pt_to_unit(self.unit.unwrap_or(res.unit), self.value)
    }
}

/// A suffixed string names the unit to convert into: `"600in"` is two
/// inches at 300 dpi.
impl PtTo for str {
    type Output = f64;

    fn pt_to(&self, res: &Resolution) -> f64 {
        Length::parse(self).map(|l| l.pt_to(res)).unwrap_or(0.0)
    }
}

impl PtTo for String {
    type Output = f64;

    fn pt_to(&self, res: &Resolution) -> f64 {
        self.as_str().pt_to(res)
    }
}

impl<T: PtTo + ?Sized> PtTo for &T {
    type Output = T::Output;

    fn pt_to(&self, res: &Resolution) -> T::Output {
        (**self).pt_to(res)
    }
}

impl<A: PtTo, B: PtTo> PtTo for (A, B) {
    type Output = (A::Output, B::Output);

    fn pt_to(&self, res: &Resolution) -> Self::Output {
        (self.0.pt_to(res), self.1.pt_to(res))
    }
}

impl<A: PtTo, B: PtTo, C: PtTo, D: PtTo> PtTo for (A, B, C, D) {
    type Output = (A::Output, B::Output, C::Output, D::Output);

    fn pt_to(&self, res: &Resolution) -> Self::Output {
        (
            self.0.pt_to(res),
            self.1.pt_to(res),
            self.2.pt_to(res),
            self.3.pt_to(res),
        )
    }
}

impl<T: PtTo, const N: usize> PtTo for [T; N] {
    type Output = [T::Output; N];

    fn pt_to(&self, res: &Resolution) -> Self::Output {
        std::array::from_fn(|i| self[i].pt_to(res))
    }
}

impl<T: PtTo> PtTo for Vec<T> {
    type Output = Vec<T::Output>;

    fn pt_to(&self, res: &Resolution) -> Self::Output {
        self.iter().map(|v| v.pt_to(res)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNITS: [Unit; 7] = [
        Unit::In,
        Unit::Mm,
        Unit::Cm,
        Unit::Px,
        Unit::Pt,
        Unit::Font,
        Unit::None,
    ];

    #[test]
    fn round_trip_is_within_one_pixel() {
        for dpi in [32, 96, 150, 300, 1200] {
            for unit in UNITS {
                let res = Resolution::new(dpi, unit);
                let one_px = res.pt_to_unit(unit, 1.0);
                for x in [0.0, 1.0, 12.5, 300.0] {
                    let back = res.pt_to(&res.to_pt(&x));
                    assert!(
                        (back - x).abs() <= one_px + 1e-9,
                        "dpi={} unit={} x={} back={}",
                        dpi,
                        unit,
                        x,
                        back
                    );
                }
            }
        }
    }

    #[test]
    fn unit_factors() {
        let res = Resolution::new(300, Unit::None);
        assert_eq!(res.to_pt("2in"), 600);
        assert_eq!(res.to_pt("25.4mm"), 300);
        assert_eq!(res.to_pt("2.54cm"), 300);
        assert_eq!(res.to_pt("96px"), 300);
        assert_eq!(res.to_pt("72font"), 300);
        assert_eq!(res.to_pt("17pt"), 17);
        assert_eq!(res.font_to_pt(12.0), 50);
    }

    #[test]
    fn bare_numbers_use_default_unit() {
        let res = Resolution::inches(100);
        assert_eq!(res.to_pt(&1.5), 150);
        assert_eq!(res.to_pt("1.5"), 150);
        assert_eq!(res.to_pt("1.5furlongs"), 150);
        assert_eq!(res.to_pt(".5"), 50);
        assert_eq!(res.to_pt("-1in"), -100);
    }

    #[test]
    fn malformed_strings_are_zero() {
        let res = Resolution::inches(300);
        assert_eq!(res.to_pt("abc"), 0);
        assert_eq!(res.to_pt(""), 0);
        assert_eq!(res.to_pt("."), 0);
        assert_eq!(res.pt_to("in"), 0.0);
    }

    #[test]
    fn shapes_are_preserved() {
        let res = Resolution::inches(10);
        assert_eq!(res.to_pt(&(1.0, 2.0)), (10, 20));
        assert_eq!(res.to_pt(&[1.0, 2.0, 3.0]), [10, 20, 30]);
        assert_eq!(res.to_pt(&vec!["1in", "5mm"]), vec![10, 1]);
        assert_eq!(res.pt_to(&(10, 20)), (1.0, 2.0));
    }

    #[test]
    fn suffixed_pt_to_names_target_unit() {
        let res = Resolution::new(300, Unit::None);
        assert_eq!(res.pt_to("600in"), 2.0);
    }

    #[test]
    fn dpi_is_per_value() {
        let wall = Resolution::inches(300);
        let desk = wall.with_dpi(96);
        assert_eq!(wall.to_pt(&1.0), 300);
        assert_eq!(desk.to_pt(&1.0), 96);
    }
}
