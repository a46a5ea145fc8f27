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

//! Ties the engine and the materializer together over an already-built
//! [`RcTree`]: run the buffer-insertion DP, splice the winning buffers into
//! the tree, and hand back a [`BufferReport`] with everything an external
//! exporter or CLI needs to print or serialize.
//!
//! Reading the technology/tree JSON, parsing `argv`, writing the buffered
//! tree back out and printing a report to stdout are all left to that
//! external caller; this module only produces the data.

use std::time::{Duration, Instant};

use log::info;

use crate::engine::{self, chosen_buffers};
use crate::error::Error;
use crate::geometry::Point;
use crate::solution::frontier;
use crate::technology::{Module, Technology};
use crate::tree::{EdgeId, RcTree};

/// One buffer the engine decided to splice in, as it stood right before
/// materialization rewrote the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferRecord {
    pub p: Point,
    pub rat: f32,
    pub capacity: f32,
    pub edge_id: EdgeId,
}

/// Everything an external exporter needs after a buffer-insertion run:
/// the inserted buffers in chain order, the final root RAT, and how long
/// the engine took.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferReport {
    pub buffers: Vec<BufferRecord>,
    pub root_rat: f32,
    pub duration: Duration,
}

/// Runs the buffer-insertion engine over `tree` and materializes the
/// winning solution in place, returning a report of what was inserted.
///
/// `tree` must already have its root set (§4.B); `technology` and
/// `module` come from an already-parsed [`crate::technology::TechnologyFile`].
pub fn run(
    tree: &mut RcTree,
    technology: &Technology,
    module: &Module,
    step: u32,
) -> Result<BufferReport, Error> {
    let start = Instant::now();

    let solution = engine::run(tree, technology, module, step)?;
    let root_rat = frontier(&solution).rat;
    let chosen = chosen_buffers(&solution);

    let buffers: Vec<BufferRecord> = chosen
        .iter()
        .map(|c| BufferRecord {
            p: c.p,
            rat: c.rat,
            capacity: c.capacity,
            edge_id: c.edge_id.expect("a chosen buffer candidate always lies on an edge"),
        })
        .collect();

    crate::materializer::materialize(tree, module, &chosen)?;

    let duration = start.elapsed();
    info!(
        "buffer insertion done in {:?}: {} buffer(s), root rat {}",
        duration,
        buffers.len(),
        root_rat
    );

    Ok(BufferReport { buffers, root_rat, duration })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Edge, Node};

    fn tech() -> Technology {
        Technology { unit_r: 1.0, unit_c: 1.0 }
    }
    fn module() -> Module {
        Module { name: "BUF_X1".into(), r: 0.1, c: 0.5, k: 0.2 }
    }

    #[test]
    fn driver_materializes_the_chosen_buffers_into_the_tree() {
        let mut t = RcTree::new();
        let root = t.add_node(Node::buffer("drv", Point::new(0, 0), 0.0, 0.0));
        let sink = t.add_node(Node::sink("t", Point::new(10, 0), 1.0, 100.0));
        t.add_edge(root, sink, Edge::new(vec![Point::new(0, 0), Point::new(10, 0)])).unwrap();
        t.set_root(root);

        let report = run(&mut t, &tech(), &module(), 1).unwrap();
        assert!(!report.buffers.is_empty());
        assert!(report.root_rat > 0.0);

        // every inserted buffer record should now correspond to a real
        // Buffer node somewhere in the rewritten tree.
        fn collect_buffer_positions(t: &RcTree, id: crate::tree::NodeId, out: &mut Vec<Point>) {
            let n = t.node(id);
            if n.kind == crate::tree::NodeKind::Buffer && n.name == module().name {
                out.push(n.p);
            }
            for &e in t.children(id) {
                collect_buffer_positions(t, t.edge_last_node(e), out);
            }
        }
        let mut positions = Vec::new();
        collect_buffer_positions(&t, t.root().unwrap(), &mut positions);
        // the driver node itself is named "drv", so this only picks up the
        // buffers materialization actually inserted.
        for record in &report.buffers {
            assert!(positions.contains(&record.p));
        }
        assert_eq!(report.buffers.len(), positions.len());
    }

    #[test]
    fn driver_is_a_no_op_rewrite_when_no_buffer_is_chosen() {
        let flat_tech = Technology { unit_r: 0.0, unit_c: 0.0 };
        let costly_module = Module { name: "BUF".into(), r: 1.0, c: 100.0, k: 1000.0 };

        let mut t = RcTree::new();
        let root = t.add_node(Node::buffer("drv", Point::new(0, 0), 0.0, 0.0));
        let sink = t.add_node(Node::sink("t", Point::new(10, 0), 1.0, 100.0));
        t.add_edge(root, sink, Edge::new(vec![Point::new(0, 0), Point::new(10, 0)])).unwrap();
        t.set_root(root);

        let report = run(&mut t, &flat_tech, &costly_module, 1).unwrap();
        assert!(report.buffers.is_empty());
        assert_eq!(sink, t.edge_last_node(t.children(root)[0]));
    }
}
