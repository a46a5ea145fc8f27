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

//! The solution materializer: rewrites the RC tree so that every chosen
//! buffer candidate becomes a real `Buffer` node spliced into the edge it
//! was placed on.

use std::collections::BTreeMap;

use log::info;

use crate::error::Error;
use crate::geometry::Point;
use crate::solution::Candidate;
use crate::technology::Module;
use crate::tree::{Edge, Node, NodeId, RcTree};

/// Splices every `has_buffer` candidate of `chosen` into the tree as a
/// fresh `Buffer` node, replacing the edge it lies on with a chain of
/// sub-edges. Candidates with `has_buffer == false` are ignored; an empty
/// `chosen` list is a no-op (§8 invariant: S6).
pub fn materialize(tree: &mut RcTree, module: &Module, chosen: &[Candidate]) -> Result<(), Error> {
    let mut grouped: BTreeMap<crate::tree::EdgeId, Vec<Candidate>> = BTreeMap::new();
    for candidate in chosen {
        if !candidate.has_buffer {
            continue;
        }
        let edge_id = candidate.edge_id.ok_or_else(|| {
            Error::Internal("a chosen buffer candidate has no owning edge".to_string())
        })?;
        grouped.entry(edge_id).or_default().push(*candidate);
    }

    let mut inserted = 0usize;
    let edges_touched = grouped.len();
    for (edge_id, mut candidates) in grouped {
        let edge = tree.edge(edge_id).clone();
        let start = edge.first();
        candidates.sort_by_key(|c| start.distance(c.p));

        // Every original vertex of the polyline, plus every chosen buffer
        // position, keyed by distance from the edge's first point so
        // that a buffer landing exactly on an existing vertex overrides
        // it (§4.F step 3).
        let mut records: BTreeMap<u32, (Point, Option<usize>)> = BTreeMap::new();
        for p in &edge.segments {
            let d = start.distance(*p);
            records.entry(d).or_insert((*p, None));
        }
        for (i, c) in candidates.iter().enumerate() {
            let d = start.distance(c.p);
            records.insert(d, (c.p, Some(i)));
        }

        let (first_node, last_node) = tree.edge_endpoints(edge_id);
        let mut chain_nodes: Vec<NodeId> = vec![first_node];
        let mut sub_polylines: Vec<Vec<Point>> = Vec::new();
        let mut current: Vec<Point> = Vec::new();

        for (p, buffer_idx) in records.into_values() {
            current.push(p);
            if let Some(idx) = buffer_idx {
                sub_polylines.push(std::mem::take(&mut current));
                current.push(p);

                let c = &candidates[idx];
                let node = Node::buffer(module.name.clone(), c.p, c.capacity, c.rat);
                chain_nodes.push(tree.add_node(node));
                inserted += 1;
            }
        }
        sub_polylines.push(current);
        chain_nodes.push(last_node);

        tree.remove_edge(edge_id);
        for i in 0..sub_polylines.len() {
            tree.add_edge(chain_nodes[i], chain_nodes[i + 1], Edge::new(sub_polylines[i].clone()))?;
        }
    }

    info!("materialized {inserted} buffer(s) across {edges_touched} edge(s)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module() -> Module {
        Module { name: "BUF".into(), r: 0.1, c: 0.5, k: 0.2 }
    }

    #[test]
    fn s4_materializer_orders_sub_edges_by_distance() {
        let mut t = RcTree::new();
        let u = t.add_node(Node::buffer("b", Point::new(0, 0), 0.0, 0.0));
        let v = t.add_node(Node::sink("t", Point::new(0, 10), 1.0, 100.0));
        let edge = t
            .add_edge(u, v, Edge::new(vec![Point::new(0, 0), Point::new(0, 10)]))
            .unwrap();

        let chosen = vec![
            Candidate { p: Point::new(0, 3), capacity: 0.5, rat: 10.0, edge_id: Some(edge), has_buffer: true },
            Candidate { p: Point::new(0, 7), capacity: 0.5, rat: 20.0, edge_id: Some(edge), has_buffer: true },
        ];
        materialize(&mut t, &module(), &chosen).unwrap();

        let children: Vec<_> = t.children(u).to_vec();
        assert_eq!(1, children.len());
        let b1_edge = children[0];
        assert_eq!(
            vec![Point::new(0, 0), Point::new(0, 3)],
            t.edge(b1_edge).segments
        );
        let b1 = t.edge_last_node(b1_edge);
        let b2_edge = t.children(b1)[0];
        assert_eq!(
            vec![Point::new(0, 3), Point::new(0, 7)],
            t.edge(b2_edge).segments
        );
        let b2 = t.edge_last_node(b2_edge);
        let last_edge = t.children(b2)[0];
        assert_eq!(
            vec![Point::new(0, 7), Point::new(0, 10)],
            t.edge(last_edge).segments
        );
        assert_eq!(v, t.edge_last_node(last_edge));
    }

    #[test]
    fn empty_chosen_list_is_a_no_op() {
        // Invariant S6
        let mut t = RcTree::new();
        let u = t.add_node(Node::buffer("b", Point::new(0, 0), 0.0, 0.0));
        let v = t.add_node(Node::sink("t", Point::new(0, 10), 1.0, 100.0));
        t.add_edge(u, v, Edge::new(vec![Point::new(0, 0), Point::new(0, 10)])).unwrap();

        materialize(&mut t, &module(), &[]).unwrap();

        assert_eq!(1, t.children(u).len());
        assert_eq!(v, t.edge_last_node(t.children(u)[0]));
    }

    #[test]
    fn every_sink_still_reachable_after_materialization() {
        // Invariant 5
        let mut t = RcTree::new();
        let root = t.add_node(Node::buffer("b", Point::new(0, 0), 0.0, 0.0));
        let s = t.add_node(Node::steiner("s", Point::new(5, 0)));
        let t1 = t.add_node(Node::sink("t1", Point::new(5, 5), 2.0, 50.0));
        let t2 = t.add_node(Node::sink("t2", Point::new(10, 0), 2.0, 50.0));
        t.add_edge(root, s, Edge::new(vec![Point::new(0, 0), Point::new(5, 0)])).unwrap();
        let e1 = t.add_edge(s, t1, Edge::new(vec![Point::new(5, 0), Point::new(5, 5)])).unwrap();
        t.add_edge(s, t2, Edge::new(vec![Point::new(5, 0), Point::new(10, 0)])).unwrap();

        let chosen = vec![Candidate {
            p: Point::new(5, 2),
            capacity: 0.5,
            rat: 10.0,
            edge_id: Some(e1),
            has_buffer: true,
        }];
        materialize(&mut t, &module(), &chosen).unwrap();

        // walk from root down to every original sink, following children.
        fn reaches(t: &RcTree, from: NodeId, target: NodeId) -> bool {
            if from == target {
                return true;
            }
            t.children(from).iter().any(|&e| reaches(t, t.edge_last_node(e), target))
        }
        assert!(reaches(&t, root, t1));
        assert!(reaches(&t, root, t2));
    }
}
