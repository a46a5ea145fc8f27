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

//! Candidates, Solutions and Pareto-pruned SolutionSets — the currency the
//! buffer-insertion engine trades in.
//!
//! A [`Candidate`] is one row of a [`Solution`] chain: a position on the
//! tree, the downstream load capacitance and required-arrival-time seen at
//! the chain's current frontier, the edge it lies on, and whether a
//! buffer is to be placed there. A [`SolutionSet`] is the unordered,
//! Pareto-non-dominated collection of `Solution`s live at a node during
//! the bottom-up traversal (§4.E).

use log::trace;

use crate::technology::Module;
use crate::tree::EdgeId;
use crate::geometry::Point;

// ----------------------------------------------------------------------------
// --- CANDIDATE -------------------------------------------------------------
// ----------------------------------------------------------------------------
/// One row of a solution chain.
///
/// `edge_id` is `None` for candidates standing for a branch point or sink
/// itself (no edge owns that position); it is `Some` for every candidate
/// produced by wire-extension or buffer-insertion along a specific edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub p: Point,
    pub capacity: f32,
    pub rat: f32,
    pub edge_id: Option<EdgeId>,
    pub has_buffer: bool,
}

/// Does `a` Pareto-dominate `b`, compared at these two frontier
/// candidates? Domination is non-strict in both directions (`>=` on
/// `rat`, `<=` on `capacity`): an exact tie has each side dominating the
/// other. This is deliberately preserved, not "fixed" — see §9 design
/// note 2 and [`redundancy_elimination`].
pub fn dominates(a: &Candidate, b: &Candidate) -> bool {
    a.rat >= b.rat && a.capacity <= b.capacity
}

// ----------------------------------------------------------------------------
// --- SOLUTION ----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// An ordered chain of candidates from a sink (or branch) up to the
/// current frontier. The frontier is always the last element.
pub type Solution = Vec<Candidate>;

/// The frontier (last) candidate of a solution chain.
pub fn frontier(solution: &Solution) -> &Candidate {
    solution.last().expect("a Solution is never empty")
}
fn frontier_mut(solution: &mut Solution) -> &mut Candidate {
    solution.last_mut().expect("a Solution is never empty")
}

/// An unordered, Pareto-non-dominated collection of solutions live at one
/// node of the tree.
pub type SolutionSet = Vec<Solution>;

// ----------------------------------------------------------------------------
// --- PRIMITIVE OPERATIONS (§4.E.1) ---------------------------------------------
// ----------------------------------------------------------------------------
/// Wire-extends every solution's frontier by Manhattan length `length` to
/// the new position `p` on edge `edge_id`, applying the Elmore delay of a
/// wire of that length loaded by the frontier's current downstream
/// capacitance.
pub fn wire_extend(
    solutions: &mut SolutionSet,
    length: u32,
    p: Point,
    edge_id: EdgeId,
    tech_unit_r: f32,
    tech_unit_c: f32,
) {
    let l = length as f32;
    for solution in solutions.iter_mut() {
        let last = frontier(solution);
        let capacity = last.capacity;
        let rat = last.rat;

        let new_capacity = capacity + tech_unit_c * l;
        let new_rat = rat - (tech_unit_r * tech_unit_c * l * l / 2.0 + tech_unit_r * l * capacity);

        solution.push(Candidate {
            p,
            capacity: new_capacity,
            rat: new_rat,
            edge_id: Some(edge_id),
            has_buffer: false,
        });
    }
}

/// Mutates the frontier of every solution in place to reflect inserting a
/// buffer there: downstream capacitance resets to the buffer's input
/// capacitance, and the RAT is charged with the buffer's intrinsic delay
/// plus its output resistance driving the previous downstream load.
pub fn buffer_insert(solutions: &mut SolutionSet, module: &Module) {
    for solution in solutions.iter_mut() {
        let c = frontier_mut(solution);
        let delay = module.k + module.r * c.capacity;
        c.rat -= delay;
        c.capacity = module.c;
        c.has_buffer = true;
    }
}

// ----------------------------------------------------------------------------
// --- PRUNING (§4.E.3) ---------------------------------------------------------
// ----------------------------------------------------------------------------
/// Drops every solution whose frontier is Pareto-dominated by another
/// solution's frontier in the set. Exact ties mutually dominate, so both
/// members of a tied pair are dropped — a deliberately preserved source
/// quirk (§9 design note 2), not a defect.
pub fn redundancy_elimination(solutions: SolutionSet) -> SolutionSet {
    let n = solutions.len();
    let mut redundant = vec![false; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let fi = frontier(&solutions[i]);
            let fj = frontier(&solutions[j]);
            if dominates(fi, fj) {
                redundant[j] = true;
            } else if dominates(fj, fi) {
                redundant[i] = true;
            }
        }
    }
    let kept = solutions
        .into_iter()
        .zip(redundant)
        .filter_map(|(s, red)| if red { None } else { Some(s) })
        .collect::<Vec<_>>();
    trace!("redundancy_elimination: {} -> {} solutions", n, kept.len());
    kept
}
