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

use thiserror::Error;

use crate::decoder::ModelKind;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),
    #[error("Surface data is borrowed: {0}")]
    Borrow(#[from] cairo::BorrowError),
    #[error("No handler registered for model type {0:?}")]
    UnsupportedType(ModelKind),
    #[error("Invalid export option {key:?}: {reason}")]
    InvalidOption { key: String, reason: String },
    #[error("Calendar failed to parse: {0}")]
    IcsParse(String),
    #[error("Event is missing property: {0}")]
    MissingProperty(&'static str),
}

pub fn convert_err<E>(err: E) -> anyhow::Error
where
    CalendarError: From<E>,
{
    CalendarError::from(err).into()
}
