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

//! Print layout and rendering for photo calendars.
//!
//! A [`calendar::Calendar`] model is turned into page images by an
//! [`decoder::ImageDecoder`] with the [`wall`] or [`desk`] handlers
//! registered, or into a preview document by [`html::encoder`]. The
//! [`export`] module writes either to disk.

pub mod birthdays;
pub mod calendar;
pub mod cell;
pub mod config;
pub mod decoder;
pub mod desk;
pub mod draw;
pub mod error;
pub mod events;
pub mod export;
pub mod fonts;
pub mod geometry;
pub mod holidays;
pub mod html;
pub mod layout;
pub mod legal;
pub mod moon;
pub mod raster;
pub mod render_prims;
pub mod units;
pub mod wall;

pub use calendar::Calendar;
pub use decoder::{HtmlEncoder, ImageDecoder};
pub use error::CalendarError;
pub use export::{export, CalendarKind, ExportContext, ExportFormat, ExportOptions, ExportResult};
