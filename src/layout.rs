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

//! Physical page geometry, in inches.
//!
//! Each calendar variant is described by plain values built from the
//! constants below. Nothing here draws; the render handlers ask these
//! values where things go.

use anyhow::Result;

use crate::draw::Page;
use crate::geometry::BBox;
use crate::render_prims::Color;
use crate::units::Resolution;

pub const WALL_WIDTH: f64 = 11.0;
pub const WALL_HEIGHT: f64 = 8.5;
/// Strip left free for the binding.
pub const WALL_BIND: f64 = 0.35;

pub const WALL_TOP_BAR: f64 = 0.25;
pub const WALL_COVER_IMAGE_HEIGHT: f64 = 6.0;
pub const WALL_COVER_TITLE_HEIGHT: f64 = 1.5;

pub const WALL_INFO_HEIGHT: f64 = 0.55;

pub const WALL_GRID_TOP: f64 = WALL_BIND + 0.4;
pub const WALL_GRID_BORDER: f64 = 0.5;
pub const WALL_GRID_WIDTH: f64 = 10.0;
pub const WALL_GRID_HEIGHT: f64 = 6.25;
pub const WALL_GRID_HEADER_HEIGHT: f64 = 0.3;
pub const WALL_GRID_TITLE_HEIGHT: f64 = 0.7;

pub const DESK_WIDTH: f64 = 7.0;
pub const DESK_HEIGHT: f64 = 4.25;
pub const DESK_TOP_PADDING: f64 = 0.25;
pub const DESK_IMAGE_SIZE: f64 = 4.0;

pub const DESK_TITLE_WIDTH: f64 = 2.6;
pub const DESK_TITLE_HEIGHT: f64 = 0.5;
pub const DESK_TITLE_MARGIN: f64 = 0.2;

pub const DESK_GRID_SIZE: f64 = 2.6;
pub const DESK_GRID_TITLE_HEIGHT: f64 = 0.6;
pub const DESK_GRID_HEADER_HEIGHT: f64 = 0.2;
pub const DESK_GRID_CELL_WIDTH: f64 = 0.37;
pub const DESK_GRID_CELL_HEIGHT: f64 = 0.3;

pub const GRID_COLUMNS: usize = 7;
pub const GRID_ROWS: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Padding {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Padding {
    pub const fn top(top: f64) -> Self {
        Padding {
            left: 0.0,
            top,
            right: 0.0,
            bottom: 0.0,
        }
    }

    pub const fn bottom(bottom: f64) -> Self {
        Padding {
            left: 0.0,
            top: 0.0,
            right: 0.0,
            bottom,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub padding: Padding,
}

impl PageGeometry {
    pub fn main_bbox(&self) -> BBox {
        BBox::from_edges(
            self.padding.left,
            self.padding.top,
            self.width - self.padding.right,
            self.height - self.padding.bottom,
        )
    }

    /// Allocates the raster for one page. The size is converted to pixels
    /// here, once.
    pub fn new_page(&self, res: &Resolution, background: Option<Color>) -> Result<Page> {
        Page::new(self.width, self.height, *res, background)
    }
}

/// Cover page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrontLayout {
    pub page: PageGeometry,
    pub top_bar: BBox,
    pub image: BBox,
    pub title: BBox,
}

impl FrontLayout {
    pub fn wall() -> Self {
        let page = PageGeometry {
            width: WALL_WIDTH,
            height: WALL_HEIGHT,
            padding: Padding::top(WALL_BIND),
        };
        let top = page.padding.top;
        FrontLayout {
            page,
            top_bar: BBox::new(0.0, top, WALL_WIDTH, WALL_TOP_BAR),
            image: BBox::new(0.0, top + WALL_TOP_BAR, WALL_WIDTH, WALL_COVER_IMAGE_HEIGHT),
            title: BBox::new(
                0.0,
                top + WALL_TOP_BAR + WALL_COVER_IMAGE_HEIGHT,
                WALL_WIDTH,
                WALL_COVER_TITLE_HEIGHT,
            ),
        }
    }

    /// Photo on the left, title centered in the panel to its right.
    pub fn desk() -> Self {
        let page = PageGeometry {
            width: DESK_WIDTH,
            height: DESK_HEIGHT,
            padding: Padding::top(DESK_TOP_PADDING),
        };
        FrontLayout {
            page,
            top_bar: BBox::new(0.0, 0.0, DESK_WIDTH, DESK_TOP_PADDING),
            image: desk_image_bbox(),
            title: desk_info_bbox(),
        }
    }

    pub fn main_bbox(&self) -> BBox {
        self.page.main_bbox()
    }

    pub fn topbar_bbox(&self) -> BBox {
        self.top_bar
    }

    pub fn image_bbox(&self) -> BBox {
        self.image
    }

    pub fn title_bbox(&self) -> BBox {
        self.title
    }
}

/// Monthly artwork page. The desk variant also carries the spot where the
/// month grid is inset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArtLayout {
    pub page: PageGeometry,
    pub image: BBox,
    pub info: BBox,
    pub inset: Option<BBox>,
}

impl ArtLayout {
    /// Full-bleed artwork above a caption strip; the binding strip stays
    /// at the bottom.
    pub fn wall() -> Self {
        let page = PageGeometry {
            width: WALL_WIDTH,
            height: WALL_HEIGHT,
            padding: Padding::bottom(WALL_BIND),
        };
        let info_top = WALL_HEIGHT - WALL_BIND - WALL_INFO_HEIGHT;
        ArtLayout {
            page,
            image: BBox::new(0.0, 0.0, WALL_WIDTH, info_top),
            info: BBox::new(0.0, info_top, WALL_WIDTH, WALL_INFO_HEIGHT),
            inset: None,
        }
    }

    pub fn desk() -> Self {
        let page = PageGeometry {
            width: DESK_WIDTH,
            height: DESK_HEIGHT,
            padding: Padding::top(DESK_TOP_PADDING),
        };

        let right = DESK_WIDTH - DESK_TITLE_MARGIN;
        let bottom = DESK_HEIGHT - DESK_TITLE_MARGIN;

        // Month grid centered in the panel beside the photo.
        let info = desk_info_bbox();
        let inset = BBox::new(
            info.x() + (info.width() - DESK_GRID_SIZE) / 2.0,
            info.y() + (info.height() - DESK_GRID_SIZE) / 2.0,
            DESK_GRID_SIZE,
            DESK_GRID_SIZE,
        );

        ArtLayout {
            page,
            image: desk_image_bbox(),
            info: BBox::from_edges(
                right - DESK_TITLE_WIDTH,
                bottom - DESK_TITLE_HEIGHT,
                right,
                bottom,
            ),
            inset: Some(inset),
        }
    }

    pub fn main_bbox(&self) -> BBox {
        self.page.main_bbox()
    }

    pub fn image_bbox(&self) -> BBox {
        self.image
    }

    pub fn info_bbox(&self) -> BBox {
        self.info
    }

    pub fn inset_bbox(&self) -> Option<BBox> {
        self.inset
    }
}

/// A month grid: a title row, a weekday header row, then always 7 x 6
/// cells so every month page lines up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    pub page: PageGeometry,
    pub origin: (f64, f64),
    pub title_size: (f64, f64),
    pub header_size: (f64, f64),
    pub cell_size: (f64, f64),
}

impl GridLayout {
    pub fn wall() -> Self {
        let cell_w = WALL_GRID_WIDTH / GRID_COLUMNS as f64;
        GridLayout {
            page: PageGeometry {
                width: WALL_WIDTH,
                height: WALL_HEIGHT,
                padding: Padding::top(WALL_GRID_TOP),
            },
            origin: (WALL_GRID_BORDER, WALL_GRID_TOP),
            title_size: (WALL_GRID_WIDTH, WALL_GRID_TITLE_HEIGHT),
            header_size: (cell_w, WALL_GRID_HEADER_HEIGHT),
            cell_size: (cell_w, WALL_GRID_HEIGHT / GRID_ROWS as f64),
        }
    }

    /// The small grid rendered on its own page and inset into the desk
    /// artwork.
    pub fn desk() -> Self {
        GridLayout {
            page: PageGeometry {
                width: DESK_GRID_SIZE,
                height: DESK_GRID_SIZE,
                padding: Padding::default(),
            },
            origin: (0.0, 0.0),
            title_size: (DESK_GRID_SIZE, DESK_GRID_TITLE_HEIGHT),
            header_size: (DESK_GRID_CELL_WIDTH, DESK_GRID_HEADER_HEIGHT),
            cell_size: (DESK_GRID_CELL_WIDTH, DESK_GRID_CELL_HEIGHT),
        }
    }

    pub fn main_bbox(&self) -> BBox {
        self.page.main_bbox()
    }

    pub fn title_bbox(&self) -> BBox {
        BBox::new(self.origin.0, self.origin.1, self.title_size.0, self.title_size.1)
    }

    pub fn header_bbox(&self, column: usize) -> BBox {
        BBox::new(
            self.origin.0 + self.header_size.0 * column as f64,
            self.origin.1 + self.title_size.1,
            self.header_size.0,
            self.header_size.1,
        )
    }

    pub fn cel_bbox(&self, column: usize, row: usize) -> BBox {
        BBox::new(
            self.origin.0 + self.cell_size.0 * column as f64,
            self.origin.1 + self.title_size.1 + self.header_size.1 + self.cell_size.1 * row as f64,
            self.cell_size.0,
            self.cell_size.1,
        )
    }

    /// Spans the first cell to the last.
    pub fn cal_bbox(&self) -> BBox {
        let first = self.cel_bbox(0, 0);
        let last = self.cel_bbox(GRID_COLUMNS - 1, GRID_ROWS - 1);
        BBox::from_edges(first.left, first.top, last.right, last.bottom)
    }
}

fn desk_image_bbox() -> BBox {
    BBox::new(
        0.0,
        DESK_HEIGHT - DESK_IMAGE_SIZE,
        DESK_IMAGE_SIZE,
        DESK_IMAGE_SIZE,
    )
}

fn desk_info_bbox() -> BBox {
    BBox::new(
        DESK_IMAGE_SIZE,
        DESK_TOP_PADDING,
        DESK_WIDTH - DESK_IMAGE_SIZE,
        DESK_HEIGHT - DESK_TOP_PADDING,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn wall_grid_fits_the_page() {
        let grid = GridLayout::wall();
        let cal = grid.cal_bbox();

        assert!(close(cal.width(), WALL_GRID_WIDTH));
        assert!(close(cal.height(), WALL_GRID_HEIGHT));
        assert!(close(cal.left, WALL_GRID_BORDER));
        assert!(cal.bottom <= WALL_HEIGHT);
        assert!(close(grid.header_bbox(3).left, grid.cel_bbox(3, 0).left));
        assert!(close(grid.header_bbox(0).bottom, grid.cel_bbox(0, 0).top));
    }

    #[test]
    fn desk_grid_fills_its_inset() {
        let grid = GridLayout::desk();
        let cal = grid.cal_bbox();
        assert!(close(cal.bottom, DESK_GRID_SIZE));
        assert!(cal.right <= DESK_GRID_SIZE);

        let inset = ArtLayout::desk().inset_bbox().map(|b| (b.x(), b.y(), b.width()));
        let (x, y, w) = inset.unwrap_or_default();
        assert!(close(x, 4.2));
        assert!(close(y, 0.95));
        assert!(close(w, DESK_GRID_SIZE));
    }

    #[test]
    fn wall_cover_stacks_regions() {
        let front = FrontLayout::wall();
        assert!(close(front.image_bbox().top, front.topbar_bbox().bottom));
        assert!(close(front.title_bbox().top, front.image_bbox().bottom));
        assert!(front.title_bbox().bottom <= WALL_HEIGHT);
    }

    #[test]
    fn wall_art_leaves_binding_strip() {
        let art = ArtLayout::wall();
        assert!(close(art.info_bbox().bottom, art.main_bbox().bottom));
        assert!(close(art.image_bbox().bottom, art.info_bbox().top));
        assert!(art.inset_bbox().is_none());
    }
}
