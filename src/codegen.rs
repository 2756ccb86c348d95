//! C emission for one inferred model.
//!
//! Output order is fixed: preamble, record declarations (dependency order),
//! the root initializer, OSC accessors, and the sync routine. Everything is
//! rendered into memory first; a failing model produces no text at all.
mod accessors;
mod decls;
mod init;
mod sync;

pub use init::render as render_initializer;

use std::fmt::Write;

use crate::error::Result;
use crate::{topo, Model};

#[derive(Clone, Debug)]
pub struct CodegenOptions {
    /// Name of the global holding the initialized root record.
    pub root_var: String,
    /// Header declaring `tosc_writeMessage`.
    pub protocol_header: String,
    /// Default for `OSC_BUF_SIZE` (address buffer) unless the includer sets it.
    pub address_capacity: usize,
    /// Name of the generated sync routine.
    pub sync_fn: String,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            root_var: "config".to_string(),
            protocol_header: "tinyosc.h".to_string(),
            address_capacity: 128,
            sync_fn: "sync_all".to_string(),
        }
    }
}

pub struct Codegen {
    options: CodegenOptions,
    out: String,
}

impl Codegen {
    pub fn new(options: CodegenOptions) -> Self {
        Self { options, out: String::new() }
    }

    pub fn emit(&mut self, model: &Model) -> Result<()> {
        let order = topo::order(&model.registry)?;
        self.preamble();
        decls::emit(&mut self.out, &model.registry, &order);
        init::emit(&mut self.out, &model.root_type, &self.options.root_var, &model.root);
        accessors::emit(&mut self.out, &model.bindings, &self.options.root_var);
        sync::emit(&mut self.out, &model.bindings, &self.options.sync_fn);
        Ok(())
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn preamble(&mut self) {
        let out = &mut self.out;
        for header in ["stdbool.h", "stddef.h", "stdint.h", "stdio.h", "string.h"] {
            writeln!(out, "#include <{header}>").unwrap();
        }
        writeln!(out, "#include \"{}\"", self.options.protocol_header).unwrap();
        writeln!(out).unwrap();
        writeln!(out, "#ifndef OSC_BUF_SIZE").unwrap();
        writeln!(out, "#define OSC_BUF_SIZE {}", self.options.address_capacity).unwrap();
        writeln!(out, "#endif").unwrap();
        writeln!(out).unwrap();
        writeln!(out, "typedef void (*osc_publish_fn)(const char *buf, uint32_t n, void *ctx);").unwrap();
        writeln!(out).unwrap();
        writeln!(out, "static inline void osc_emit(const char *buf, uint32_t n, osc_publish_fn publish, void *ctx) {{").unwrap();
        writeln!(out, "  if (n > 0 && publish != NULL) publish(buf, n, ctx);").unwrap();
        writeln!(out, "}}").unwrap();
        writeln!(out).unwrap();
    }
}
