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

//! The van Ginneken-style dynamic-programming buffer-insertion engine: a
//! bottom-up traversal over the RC tree that, at every node, merges the
//! Pareto-optimal solutions of its children, propagates them along the
//! parent edge enumerating buffer placement alternatives at every
//! candidate position, and finally picks the single best solution at the
//! root.
//!
//! The traversal is post-order but implemented with an explicit work
//! stack rather than recursion (§4.E.7, §9): the RC tree can be
//! arbitrarily deep and nothing here should be bounded by the call stack.

use log::{debug, trace};

use crate::error::Error;
use crate::geometry::split_edge;
use crate::solution::{
    buffer_insert, dominates, frontier, redundancy_elimination, wire_extend, Candidate, Solution,
    SolutionSet,
};
use crate::technology::{Module, Technology};
use crate::tree::{NodeId, NodeKind, RcTree};

/// The spacing, in grid units, at which candidate buffer positions are
/// enumerated along an edge. Defaults to 1 (`spec.md` §4.A).
pub const DEFAULT_STEP: u32 = crate::geometry::DEFAULT_STEP;

// ----------------------------------------------------------------------------
// --- MERGE AT A NODE (§4.E.2) --------------------------------------------------
// ----------------------------------------------------------------------------
/// Merges the Pareto sets of a node's children into one SolutionSet for
/// the subtree rooted at that node.
///
/// - A sink (`Point`) node must have no children; it contributes a single
///   solution consisting of just its own candidate.
/// - A single child's set passes through unchanged.
/// - Two children are merged via the cartesian product of their sets.
/// - Three or more children are merged by a specific, non-associative
///   policy (§4.E.2, §9 design note 1): walking from the last child back
///   to the first, each step pairs that child's set with the **flat
///   concatenation** of all earlier children's sets (not the
///   progressively-merged result), and every such pairing is unioned into
///   the output. This is preserved verbatim, not "fixed" into a clean
///   left or right fold.
pub fn merge_at_node(node: &crate::tree::Node, children: &[SolutionSet]) -> SolutionSet {
    if matches!(node.kind, NodeKind::Point) {
        assert!(children.is_empty(), "a sink node cannot have children");
        return vec![vec![Candidate {
            p: node.p,
            capacity: node.capacity,
            rat: node.rat,
            edge_id: None,
            has_buffer: false,
        }]];
    }

    match children.len() {
        0 => unreachable!(
            "a non-sink node ({:?}) with no children violates the tree's reachability invariant",
            node.kind
        ),
        1 => children[0].clone(),
        2 => merge_two(&children[0], &children[1], node.p),
        _ => {
            let mut out = SolutionSet::new();
            for i in (1..children.len()).rev() {
                let current = &children[i];
                let mut earlier = SolutionSet::new();
                for earlier_set in &children[..i] {
                    earlier.extend(earlier_set.iter().cloned());
                }
                out.extend(merge_two(current, &earlier, node.p));
            }
            out
        }
    }
}

/// The cartesian product of two children's solution sets: every pair
/// concatenates into one chain topped with a new frontier candidate at
/// `position` whose capacity is the sum of both loads and whose RAT is
/// the minimum of both (the later of the two arrival times governs).
fn merge_two(lhs: &SolutionSet, rhs: &SolutionSet, position: crate::geometry::Point) -> SolutionSet {
    let mut out = SolutionSet::with_capacity(lhs.len() * rhs.len());
    for l in lhs {
        for r in rhs {
            let lf = frontier(l);
            let rf = frontier(r);
            let mut chain = Solution::with_capacity(l.len() + r.len() + 1);
            chain.extend(l.iter().cloned());
            chain.extend(r.iter().cloned());
            chain.push(Candidate {
                p: position,
                capacity: lf.capacity + rf.capacity,
                rat: lf.rat.min(rf.rat),
                edge_id: None,
                has_buffer: false,
            });
            out.push(chain);
        }
    }
    out
}

// ----------------------------------------------------------------------------
// --- PROPAGATION ALONG AN EDGE (§4.E.4) ---------------------------------------
// ----------------------------------------------------------------------------
/// Propagates a merged SolutionSet along its parent edge, enumerating
/// every candidate buffer position at the configured `step` spacing:
/// wire-extend to the position, prune, then union in a buffered copy of
/// the (pruned) frontier and prune again. Doing this at every split point
/// is what generates all the buffer-placement alternatives along the
/// edge.
pub fn propagate_along_edge(
    tree: &RcTree,
    mut solutions: SolutionSet,
    edge_id: crate::tree::EdgeId,
    step: u32,
    technology: &Technology,
    module: &Module,
) -> SolutionSet {
    let points = split_edge(&tree.edge(edge_id).segments, step);
    for p in points {
        let last_p = frontier(&solutions[0]).p;
        let length = last_p.distance(p);

        wire_extend(&mut solutions, length, p, edge_id, technology.unit_r, technology.unit_c);
        solutions = redundancy_elimination(solutions);

        let mut with_buffer = solutions.clone();
        buffer_insert(&mut with_buffer, module);

        solutions.extend(with_buffer);
        solutions = redundancy_elimination(solutions);
    }
    solutions
}

// ----------------------------------------------------------------------------
// --- TRAVERSAL (§4.E.7) -------------------------------------------------------
// ----------------------------------------------------------------------------
/// Runs the buffer-insertion engine over the whole tree and returns the
/// single best solution chain chosen at the root (§4.E.5, §4.E.6).
///
/// Uses an explicit work stack for the post-order DFS: a node is only
/// popped and finalized once every child's SolutionSet has already been
/// memoized, otherwise its unresolved children are pushed and it is left
/// on the stack to be revisited.
pub fn run(
    tree: &RcTree,
    technology: &Technology,
    module: &Module,
    step: u32,
) -> Result<Solution, Error> {
    let root = tree
        .root()
        .ok_or_else(|| Error::Model("tree has no root".to_string()))?;

    let mut memo: Vec<Option<SolutionSet>> = vec![None; tree.node_capacity()];
    let mut stack = vec![root];

    while let Some(&top) = stack.last() {
        let child_nodes: Vec<NodeId> = tree
            .children(top)
            .iter()
            .map(|&e| tree.edge_last_node(e))
            .collect();

        let mut children_sets = Vec::with_capacity(child_nodes.len());
        let mut missing = Vec::new();
        for &child in &child_nodes {
            match &memo[child.index()] {
                Some(set) => children_sets.push(set.clone()),
                None => missing.push(child),
            }
        }
        if !missing.is_empty() {
            stack.extend(missing);
            continue;
        }

        let node = tree.node(top);
        let mut solutions = merge_at_node(node, &children_sets);
        solutions = redundancy_elimination(solutions);
        debug!(
            "node {}: merged {} children into {} solutions",
            top,
            children_sets.len(),
            solutions.len()
        );

        if top == root {
            // §4.E.5: the driver's own resistance/intrinsic delay is
            // charged to the downstream RAT, but the driver itself is not
            // a repeater to be reported as inserted.
            buffer_insert(&mut solutions, module);
            for solution in solutions.iter_mut() {
                solution.last_mut().unwrap().has_buffer = false;
            }
            memo[top.index()] = Some(solutions);
            stack.pop();
            break;
        }

        let edge_id = tree
            .parent_edge(top)
            .expect("non-root node always has a parent edge");
        solutions = propagate_along_edge(tree, solutions, edge_id, step, technology, module);
        trace!("node {}: {} solutions after propagation", top, solutions.len());

        memo[top.index()] = Some(solutions);
        stack.pop();
    }

    let final_set = memo[root.index()]
        .take()
        .ok_or_else(|| Error::Internal("root was never resolved by the traversal".to_string()))?;

    select_best(final_set)
}

// ----------------------------------------------------------------------------
// --- ROOT SELECTION (§4.E.6) ---------------------------------------------------
// ----------------------------------------------------------------------------
/// Reduces a SolutionSet to the single solution with maximal frontier
/// RAT, the first such maximum in iteration order winning ties.
fn select_best(solutions: SolutionSet) -> Result<Solution, Error> {
    let mut best: Option<Solution> = None;
    for solution in solutions {
        let replace = match &best {
            None => true,
            Some(current) => frontier(&solution).rat > frontier(current).rat,
        };
        if replace {
            best = Some(solution);
        }
    }
    best.ok_or_else(|| Error::Internal("root solution set was empty".to_string()))
}

/// The candidates in `solution` for which a buffer is to be spliced in,
/// in their original chain order (sink to root).
pub fn chosen_buffers(solution: &Solution) -> Vec<Candidate> {
    solution.iter().filter(|c| c.has_buffer).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::tree::{Edge, Node};

    fn tech() -> Technology {
        Technology { unit_r: 1.0, unit_c: 1.0 }
    }
    fn module() -> Module {
        Module { name: "BUF".into(), r: 0.1, c: 0.5, k: 0.2 }
    }

    #[test]
    fn s1_single_wire_inserts_a_buffer_and_raises_rat() {
        let mut t = RcTree::new();
        let root = t.add_node(Node::buffer("b", Point::new(0, 0), 0.0, 0.0));
        let sink = t.add_node(Node::sink("t", Point::new(10, 0), 1.0, 100.0));
        t.add_edge(root, sink, Edge::new(vec![Point::new(0, 0), Point::new(10, 0)])).unwrap();
        t.set_root(root);

        let solution = run(&t, &tech(), &module(), 1).unwrap();
        let buffers = chosen_buffers(&solution);
        assert!(!buffers.is_empty(), "expected at least one inserted buffer");
        assert!(frontier(&solution).rat > 40.0);
    }

    #[test]
    fn s2_branch_merge_combines_capacity_and_min_rat() {
        let mut t = RcTree::new();
        let root = t.add_node(Node::buffer("b", Point::new(0, 0), 0.0, 0.0));
        let s = t.add_node(Node::steiner("s", Point::new(5, 0)));
        let t1 = t.add_node(Node::sink("t1", Point::new(5, 5), 2.0, 50.0));
        let t2 = t.add_node(Node::sink("t2", Point::new(10, 0), 2.0, 50.0));
        t.add_edge(root, s, Edge::new(vec![Point::new(0, 0), Point::new(5, 0)])).unwrap();
        t.add_edge(s, t1, Edge::new(vec![Point::new(5, 0), Point::new(5, 5)])).unwrap();
        t.add_edge(s, t2, Edge::new(vec![Point::new(5, 0), Point::new(10, 0)])).unwrap();

        let t1_set = merge_at_node(t.node(t1), &[]);
        let t2_set = merge_at_node(t.node(t2), &[]);
        let merged = merge_at_node(t.node(s), &[t1_set, t2_set]);
        assert_eq!(1, merged.len());
        let f = frontier(&merged[0]);
        assert_eq!(4.0, f.capacity);
        assert_eq!(50.0, f.rat);
    }

    #[test]
    fn s5_zero_length_edge_gets_no_buffer_candidates() {
        let mut t = RcTree::new();
        let root = t.add_node(Node::buffer("b", Point::new(4, 4), 0.0, 0.0));
        let sink = t.add_node(Node::sink("t", Point::new(4, 4), 1.0, 100.0));
        let edge = t
            .add_edge(root, sink, Edge::new(vec![Point::new(4, 4), Point::new(4, 4)]))
            .unwrap();
        t.set_root(root);

        let sink_set = merge_at_node(t.node(sink), &[]);
        let after = propagate_along_edge(&t, sink_set.clone(), edge, 1, &tech(), &module());
        assert_eq!(sink_set, after);
    }

    #[test]
    fn s6_no_buffer_alternative_leaves_materialization_a_no_op() {
        // A technology with zero wire RC never benefits from a buffer:
        // the "no buffer" alternative always Pareto-dominates (equal or
        // better RAT, equal or lower downstream capacitance).
        let flat_tech = Technology { unit_r: 0.0, unit_c: 0.0 };
        let costly_module = Module { name: "BUF".into(), r: 1.0, c: 100.0, k: 1000.0 };

        let mut t = RcTree::new();
        let root = t.add_node(Node::buffer("b", Point::new(0, 0), 0.0, 0.0));
        let sink = t.add_node(Node::sink("t", Point::new(10, 0), 1.0, 100.0));
        t.add_edge(root, sink, Edge::new(vec![Point::new(0, 0), Point::new(10, 0)])).unwrap();
        t.set_root(root);

        let solution = run(&t, &flat_tech, &costly_module, 1).unwrap();
        assert!(chosen_buffers(&solution).is_empty());
    }

    #[test]
    fn merge_cardinality_is_product_before_pruning() {
        // Invariant 4
        fn sol(rat: f32, cap: f32) -> Solution {
            vec![Candidate { p: Point::new(0, 0), capacity: cap, rat, edge_id: None, has_buffer: false }]
        }
        let lhs: SolutionSet = vec![sol(10.0, 1.0), sol(9.0, 2.0), sol(8.0, 3.0)];
        let rhs: SolutionSet = vec![sol(5.0, 1.0), sol(4.0, 2.0)];
        let merged = merge_two(&lhs, &rhs, Point::new(0, 0));
        assert_eq!(lhs.len() * rhs.len(), merged.len());
    }

    #[test]
    fn three_child_merge_uses_flat_concatenation_of_earlier_children() {
        // §9 design note 1: pins the non-associative three-or-more-child
        // policy rather than a clean reduce-with-merge.
        fn sol(rat: f32, cap: f32) -> Solution {
            vec![Candidate { p: Point::new(0, 0), capacity: cap, rat, edge_id: None, has_buffer: false }]
        }
        let c0: SolutionSet = vec![sol(10.0, 1.0)];
        let c1: SolutionSet = vec![sol(20.0, 2.0)];
        let c2: SolutionSet = vec![sol(30.0, 3.0)];

        let node = Node::steiner("s", Point::new(0, 0));
        let merged = merge_at_node(&node, &[c0.clone(), c1.clone(), c2.clone()]);

        // step i=2: pair c2 with flat(c0, c1) -> 1*2 = 2 chains
        // step i=1: pair c1 with flat(c0)     -> 1*1 = 1 chain
        assert_eq!(3, merged.len());
    }
}
