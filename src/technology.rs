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

//! The technology/module configuration consumed by the buffer-insertion
//! engine: unit wire resistance/capacitance, and the electrical
//! characteristics of the single buffer module this crate is allowed to
//! insert (§1's Non-goals rule out non-identical buffers and multiple
//! libraries).
//!
//! [`TechnologyFile`] is the serde-friendly shape that matches `spec.md`
//! §6's JSON schema bit-for-bit; reading and writing the actual file is an
//! external collaborator's job; this crate only needs to agree on field
//! names and validate the parsed content into the plain value bags
//! ([`Technology`], [`Module`]) the engine actually works with.

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ----------------------------------------------------------------------------
// --- TECHNOLOGY ---------------------------------------------------------------
// ----------------------------------------------------------------------------
/// Per-unit-length wire resistance and capacitance of the routing grid.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Technology {
    pub unit_r: f32,
    pub unit_c: f32,
}

// ----------------------------------------------------------------------------
// --- MODULE (BUFFER) ---------------------------------------------------------
// ----------------------------------------------------------------------------
/// The repeater/buffer that the engine is allowed to splice into wires:
/// its name (round-tripped onto inserted nodes), output resistance `r`,
/// input capacitance `c`, and intrinsic delay `k`.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub r: f32,
    pub c: f32,
    pub k: f32,
}

// ----------------------------------------------------------------------------
// --- JSON SHAPE ---------------------------------------------------------------
// ----------------------------------------------------------------------------
/// One entry of a module's `"input"` array in the technology JSON (§6).
/// Every module in the file is expected to carry exactly one such entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleInput {
    #[serde(rename = "C")]
    pub c: f32,
    #[serde(rename = "R")]
    pub r: f32,
    pub intrinsic_delay: f32,
}

/// One entry of the technology JSON's `"module"` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub name: String,
    pub input: Vec<ModuleInput>,
}

/// The `"technology"` object of the technology JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnologyEntry {
    pub unit_wire_resistance: f32,
    #[serde(default)]
    pub unit_wire_resistance_comment0: String,
    pub unit_wire_capacitance: f32,
    #[serde(default)]
    pub unit_wire_capacitance_comment0: String,
}

/// The full shape of a technology JSON file, matching `spec.md` §6
/// verbatim. This is the DTO an external reader deserializes into; the
/// comment fields are round-tripped but never consulted by the engine
/// (§9 design note 3: the JSON field *names* are authoritative, whatever
/// the in-memory struct happens to call them).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnologyFile {
    pub module: Vec<ModuleEntry>,
    pub technology: TechnologyEntry,
}

impl TechnologyFile {
    /// Validates that exactly one module is declared (§6: "Exactly one
    /// module, treated as the buffer module") and converts into the plain
    /// [`Technology`]/[`Module`] value bags the engine consumes.
    pub fn into_config(self) -> Result<(Technology, Module), Error> {
        if self.module.len() != 1 {
            return Err(Error::Parse(format!(
                "expected exactly one module in technology file, found {}",
                self.module.len()
            )));
        }
        let module = self.module.into_iter().next().unwrap();
        let input = module.input.into_iter().next().ok_or_else(|| {
            Error::Parse(format!("module {:?} has no input entry", module.name))
        })?;

        let technology = Technology {
            unit_r: self.technology.unit_wire_resistance,
            unit_c: self.technology.unit_wire_capacitance,
        };
        let module = Module {
            name: module.name,
            r: input.r,
            c: input.c,
            k: input.intrinsic_delay,
        };
        Ok((technology, module))
    }
}
