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

//! This example shows how to assemble a small RC tree by hand, hand it to
//! the buffer-insertion driver and read back the report. It does not read
//! a technology/tree file from disk or parse any command-line arguments:
//! wiring those up is an exporter's job, outside this crate's scope.

use ginneken_bufins::driver;
use ginneken_bufins::geometry::Point;
use ginneken_bufins::technology::{Module, Technology};
use ginneken_bufins::tree::{Edge, Node, RcTree};

fn main() {
    env_logger::init();

    // A driver feeding a Steiner point that fans out to two sinks.
    let mut tree = RcTree::new();
    let drv = tree.add_node(Node::buffer("drv", Point::new(0, 0), 0.0, 0.0));
    let steiner = tree.add_node(Node::steiner("s", Point::new(40, 0)));
    let sink_a = tree.add_node(Node::sink("t1", Point::new(40, 30), 2.0, 120.0));
    let sink_b = tree.add_node(Node::sink("t2", Point::new(80, 0), 2.0, 150.0));

    tree.add_edge(drv, steiner, Edge::new(vec![Point::new(0, 0), Point::new(40, 0)])).unwrap();
    tree.add_edge(steiner, sink_a, Edge::new(vec![Point::new(40, 0), Point::new(40, 30)])).unwrap();
    tree.add_edge(steiner, sink_b, Edge::new(vec![Point::new(40, 0), Point::new(80, 0)])).unwrap();
    tree.set_root(drv);

    let technology = Technology { unit_r: 0.5, unit_c: 0.5 };
    let module = Module { name: "BUF_X1".to_string(), r: 0.1, c: 0.5, k: 0.2 };

    let report = driver::run(&mut tree, &technology, &module, 1).expect("buffer insertion failed");

    println!("root rat after insertion: {}", report.root_rat);
    println!("engine duration: {:?}", report.duration);
    println!("inserted {} buffer(s):", report.buffers.len());
    for b in &report.buffers {
        println!(
            "  {} at ({}, {}), rat = {}, capacity = {}",
            module.name, b.p.x, b.p.y, b.rat, b.capacity
        );
    }
}
