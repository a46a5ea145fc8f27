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

//! This example shows the shape an external technology/tree-file importer
//! and exporter would deserialize/serialize, using the crate's own DTOs
//! (`TechnologyFile`, `TreeFile`) directly on in-memory JSON strings. A
//! real command-line front end would read these from disk and write the
//! result back out as `<stem>_out.json`; that file I/O and argument
//! parsing are not part of this crate (`spec.md` §1's Non-goals).

use ginneken_bufins::driver;
use ginneken_bufins::technology::TechnologyFile;
use ginneken_bufins::tree::TreeFile;

const TECHNOLOGY_JSON: &str = r#"{
    "module": [ { "name": "BUF_X1",
                  "input": [ { "C": 0.5, "R": 0.1, "intrinsic_delay": 0.2 } ] } ],
    "technology": {
        "unit_wire_resistance": 1.0,
        "unit_wire_resistance_comment0": "ohm per grid unit",
        "unit_wire_capacitance": 1.0,
        "unit_wire_capacitance_comment0": "farad per grid unit"
    }
}"#;

const TREE_JSON: &str = r#"{
    "node": [
        { "id": 0, "x": 0,  "y": 0,  "type": "b", "name": "drv" },
        { "id": 1, "x": 40, "y": 0,  "type": "s", "name": "s" },
        { "id": 2, "x": 40, "y": 30, "type": "t", "name": "t1", "capacitance": 2.0, "rat": 120.0 },
        { "id": 3, "x": 80, "y": 0,  "type": "t", "name": "t2", "capacitance": 2.0, "rat": 150.0 }
    ],
    "edge": [
        { "vertices": [0, 1], "segments": [[0, 0], [40, 0]] },
        { "vertices": [1, 2], "segments": [[40, 0], [40, 30]] },
        { "vertices": [1, 3], "segments": [[40, 0], [80, 0]] }
    ]
}"#;

fn main() {
    env_logger::init();

    let technology_file: TechnologyFile =
        serde_json::from_str(TECHNOLOGY_JSON).expect("malformed technology json");
    let (technology, module) = technology_file.into_config().expect("invalid technology file");

    let tree_file: TreeFile = serde_json::from_str(TREE_JSON).expect("malformed tree json");
    let mut tree = tree_file.into_tree().expect("invalid tree file");

    let report = driver::run(&mut tree, &technology, &module, 1).expect("buffer insertion failed");
    println!("root rat after insertion: {}", report.root_rat);
    println!("inserted {} buffer(s)", report.buffers.len());

    let out = tree.to_tree_file();
    let out_json = serde_json::to_string_pretty(&out).expect("tree serializes");
    println!("{out_json}");
}
