// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Error types shared by every fallible operation in this crate.
//!
//! Command-line usage errors and file I/O errors are the responsibility of
//! the external driver binary that embeds this library; they are not
//! represented here. What this crate can itself raise is: malformed input
//! data handed to it (`Parse`), an invariant violation discovered while
//! assembling an `RcTree` (`Model`), and an internal assertion meant to
//! surface a bug in the engine or materializer rather than a user mistake
//! (`Internal`).

/// The error type returned by the fallible entry points of this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The caller handed us data that doesn't make sense (e.g. a
    /// technology file declaring zero or more than one buffer module).
    #[error("malformed input: {0}")]
    Parse(String),
    /// An invariant of the RC tree was violated while assembling it (e.g.
    /// a duplicate edge, a dangling node reference, or a missing root).
    #[error("invariant violation while assembling the tree: {0}")]
    Model(String),
    /// Something the engine or materializer assumed could never happen,
    /// happened. This is an assertion failure, not a user-facing error.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
