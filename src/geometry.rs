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

use serde::Serialize;

use crate::units::{PtTo, Resolution, ToPt};

/// An axis-aligned box stored as its four edges.
///
/// Nothing enforces `left <= right` or `top <= bottom`. `shrink` by more
/// than half the smaller side yields an inverted box with negative width,
/// and callers are expected not to do that.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize)]
pub struct BBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BBox {
    pub const fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        BBox {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        BBox::from_edges(x, y, x + w, y + h)
    }

    pub fn x(&self) -> f64 {
        self.left
    }

    pub fn y(&self) -> f64 {
        self.top
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn center(&self) -> (f64, f64) {
        (
            self.left + self.width() / 2.0,
            self.top + self.height() / 2.0,
        )
    }

    pub fn origin(&self) -> (f64, f64) {
        (self.left, self.top)
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width(), self.height())
    }

    #[must_use]
    pub fn move_by(&self, dx: f64, dy: f64) -> Self {
        BBox::from_edges(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    #[must_use]
    pub fn shrink(&self, delta: f64) -> Self {
        BBox::from_edges(
            self.left + delta,
            self.top + delta,
            self.right - delta,
            self.bottom - delta,
        )
    }

    pub fn to_rectangle(&self) -> cairo::Rectangle {
        cairo::Rectangle::new(self.left, self.top, self.width(), self.height())
    }
}

impl From<(f64, f64, f64, f64)> for BBox {
    fn from(edges: (f64, f64, f64, f64)) -> Self {
        BBox::from_edges(edges.0, edges.1, edges.2, edges.3)
    }
}

/// Converts each edge into whole device pixels.
impl ToPt for BBox {
    type Output = BBox;

    fn to_pt(&self, res: &Resolution) -> BBox {
        BBox::from_edges(
            res.to_pt(&self.left) as f64,
            res.to_pt(&self.top) as f64,
            res.to_pt(&self.right) as f64,
            res.to_pt(&self.bottom) as f64,
        )
    }
}

impl PtTo for BBox {
    type Output = BBox;

    fn pt_to(&self, res: &Resolution) -> BBox {
        BBox::from_edges(
            res.pt_to(&self.left),
            res.pt_to(&self.top),
            res.pt_to(&self.right),
            res.pt_to(&self.bottom),
        )
    }
}
