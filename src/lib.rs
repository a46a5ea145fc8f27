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


//! # ginneken-bufins
//! A van Ginneken-style dynamic-programming buffer-insertion engine for RC
//! interconnect trees. Given a routed Manhattan tree (a driver, Steiner
//! branch points, and sink leaves annotated with load capacitance and
//! required arrival time) and a technology/buffer description, the engine
//! computes where along the tree's wires to splice repeaters so as to
//! maximize the worst-case required arrival time seen at the driver,
//! exactly reproducing (including its deliberate quirks, see [`engine`]
//! and [`solution`]) the classic van Ginneken dynamic program.
//!
//! ## Quick example
//! The following assembles a two-sink tree by hand, runs the engine, and
//! inspects which buffers it decided to insert.
//! ```
//! use ginneken_bufins::geometry::Point;
//! use ginneken_bufins::technology::{Module, Technology};
//! use ginneken_bufins::tree::{Edge, Node, RcTree};
//! use ginneken_bufins::driver;
//!
//! let mut tree = RcTree::new();
//! let driver_node = tree.add_node(Node::buffer("drv", Point::new(0, 0), 0.0, 0.0));
//! let sink = tree.add_node(Node::sink("t", Point::new(20, 0), 1.0, 100.0));
//! tree.add_edge(driver_node, sink, Edge::new(vec![Point::new(0, 0), Point::new(20, 0)]))
//!     .unwrap();
//! tree.set_root(driver_node);
//!
//! let technology = Technology { unit_r: 1.0, unit_c: 1.0 };
//! let module = Module { name: "BUF_X1".to_string(), r: 0.1, c: 0.5, k: 0.2 };
//!
//! let report = driver::run(&mut tree, &technology, &module, 1).unwrap();
//! println!("inserted {} buffer(s), root rat = {}", report.buffers.len(), report.root_rat);
//! ```
//!
//! ## Module overview
//! - [`geometry`]: the Manhattan-grid primitives (`Point`, segment/edge
//!   splitting) every other module builds on.
//! - [`error`]: the crate-wide `Error`/`Result` types.
//! - [`technology`]: the technology/buffer configuration, including the
//!   serde DTOs that match the technology JSON schema.
//! - [`tree`]: the arena-backed RC tree store (`RcTree`, `Node`, `Edge`).
//! - [`solution`]: candidates, solution chains, and Pareto pruning.
//! - [`engine`]: the bottom-up dynamic-programming traversal.
//! - [`materializer`]: rewrites the tree to splice in the chosen buffers.
//! - [`driver`]: composes the above into a single `run` entry point.

pub mod geometry;
pub mod error;
pub mod technology;
pub mod tree;
pub mod solution;
pub mod engine;
pub mod materializer;
pub mod driver;

pub use error::{Error, Result};
