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

//! This module defines the Manhattan-grid geometry primitives used
//! throughout the rest of the crate: points, L1 distance, and the routines
//! that walk a routed polyline to enumerate candidate buffer positions.

use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// --- POINT --------------------------------------------------------------
// ----------------------------------------------------------------------------
/// An integer point on the Manhattan routing grid.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}
impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    /// The L1 (Manhattan) distance between two points.
    ///
    /// # Examples:
    /// ```
    /// # use ginneken_bufins::geometry::Point;
    /// assert_eq!(10, Point::new(0, 0).distance(Point::new(10, 0)));
    /// assert_eq!(7,  Point::new(2, 3).distance(Point::new(5, 7)));
    /// ```
    pub fn distance(self, other: Point) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}
impl From<(i32, i32)> for Point {
    fn from(value: (i32, i32)) -> Self {
        Point::new(value.0, value.1)
    }
}

/// The default spacing (in grid units) used to enumerate candidate buffer
/// positions along an edge when none is given explicitly.
pub const DEFAULT_STEP: u32 = 1;

/// Produces every integer point strictly between `a` and `b`, spaced `step`
/// apart along whichever single axis the two points differ on. `a` and `b`
/// must share exactly one coordinate (i.e. describe an axis-aligned
/// Manhattan segment); this is an invariant of the routed edges this crate
/// consumes, not something callers need to branch on.
pub fn split_segment(a: Point, b: Point, step: u32) -> Vec<Point> {
    let step = step.max(1) as i32;
    let mut out = Vec::new();
    if a.x != b.x {
        let dir = if b.x > a.x { step } else { -step };
        let n = (b.x - a.x) / dir;
        for cnt in 1..n {
            out.push(Point::new(a.x + cnt * dir, a.y));
        }
    } else {
        let dir = if b.y > a.y { step } else { -step };
        let n = (b.y - a.y) / dir;
        for cnt in 1..n {
            out.push(Point::new(a.x, a.y + cnt * dir));
        }
    }
    out
}

/// Walks a routed polyline from its last point (the child end) toward its
/// first point (the parent end), emitting every interior candidate position
/// on each segment followed, finally, by the polyline's own starting point.
///
/// The returned list is therefore ordered **frontier-first**: callers that
/// propagate Pareto solutions along the edge (§4.E.4) consume it in that
/// order so that each step only ever has to extend by the incremental
/// length to the next candidate.
///
/// A degenerate polyline whose first and last points coincide (a
/// zero-length edge) yields an empty list: no buffer can ever be placed on
/// it.
pub fn split_edge(polyline: &[Point], step: u32) -> Vec<Point> {
    if polyline.len() < 2 {
        return Vec::new();
    }
    let first = polyline[0];
    let last = *polyline.last().unwrap();
    if first == last {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    // Two-pointer walk over the reversed polyline: `lhs` trails `rhs` by one
    // as both sweep from the child end toward the parent end.
    for window in polyline.iter().rev().collect::<Vec<_>>().windows(2) {
        let lhs = *window[0];
        let rhs = *window[1];
        candidates.extend(split_segment(lhs, rhs, step));
    }
    candidates.push(first);
    candidates
}
