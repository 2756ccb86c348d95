//! CLI: one JSON document in, C source (or the schema view) out.
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;

use json_osc::codegen::{Codegen, CodegenOptions};
use json_osc::error::GenError;
use json_osc::inference::{CollisionPolicy, InferOptions};
use json_osc::{bindings, jq_exec, path_de, schema, Model};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate C record declarations, an initializer and OSC get/set/sync bindings from a JSON document
#[derive(Parser, Debug)]
#[command(version)]
pub struct CommandLineInterface {
    /// input .json document
    input: PathBuf,

    /// what to emit
    #[arg(long, value_enum, default_value_t = Format::C)]
    format: Format,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// root record type name; also the prefix of every derived type name
    #[arg(long, default_value = "Config")]
    root_type: String,

    /// name of the initialized global
    #[arg(long, default_value = "config")]
    root_var: String,

    /// header declaring `tosc_writeMessage`
    #[arg(long, default_value = "tinyosc.h")]
    protocol_header: String,

    /// default OSC_BUF_SIZE for address buffers
    #[arg(long, default_value_t = 128)]
    address_capacity: usize,

    /// name of the generated sync routine
    #[arg(long, default_value = "sync_all")]
    sync_fn: String,

    /// fail on arrays whose elements don't match element 0
    #[arg(long, default_value_t = false)]
    strict_arrays: bool,

    /// what to do when two positions derive the same type name
    #[arg(long, value_enum, default_value_t = CollisionPolicy::LastWriteWins)]
    collisions: CollisionPolicy,

    /// JSON Pointer to the sub-document to generate from (e.g. /data/config)
    #[arg(long)]
    pointer: Option<String>,

    /// jq filter applied to the document; must yield exactly one value
    #[arg(long)]
    jq: Option<String>,

    /// print progress to stderr
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// C declarations, initializer and bindings
    C,
    /// JSON view of the inferred types and leaf table
    Schema,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        let document = self.load_document()?;
        self.progress(format!("parsed {}", self.input.display()));

        let model = Model::build(&document, &self.infer_options())
            .with_context(|| format!("cannot generate from {}", self.input.display()))?;
        for c in model.registry.collisions() {
            eprintln!(
                "{} type `{}` derived from both `{}` and `{}`; keeping the fields of `{}`",
                "warning:".yellow().bold(),
                c.type_name,
                c.previous,
                c.replacement,
                c.replacement,
            );
        }
        for name in bindings::duplicate_names(&model.bindings) {
            eprintln!(
                "{} several paths produce accessor `get_{name}`/`set_{name}`; the C output will not compile",
                "warning:".yellow().bold(),
            );
        }
        self.progress(format!("inferred {} types", model.registry.len()));

        let src = match self.format {
            Format::C => {
                let mut cg = Codegen::new(self.codegen_options());
                cg.emit(&model)?;
                self.progress(format!("emitted {} bindings", model.bindings.len()));
                cg.into_string()
            }
            Format::Schema => schema::render(&model)?,
        };

        match self.out.as_ref() {
            Some(out) => {
                if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("cannot create {}", parent.display()))?;
                }
                std::fs::write(out, &src).with_context(|| format!("cannot write {}", out.display()))?;
                self.progress(format!("wrote {}", out.display()));
            }
            None => print!("{src}"),
        }
        Ok(())
    }

    fn load_document(&self) -> Result<serde_json::Value> {
        let source = std::fs::read_to_string(&self.input)
            .map_err(|source| GenError::InputNotFound { path: self.input.clone(), source })?;
        let mut document = path_de::parse_document(&source)
            .with_context(|| format!("failed to parse {}", self.input.display()))?;
        if let Some(pointer) = self.pointer.as_deref() {
            document = jq_exec::select_pointer(pointer, &document)?;
        }
        if let Some(filter) = self.jq.as_deref() {
            document = jq_exec::select(filter, &document)?;
        }
        Ok(document)
    }

    fn infer_options(&self) -> InferOptions {
        InferOptions {
            root_type: self.root_type.clone(),
            strict_arrays: self.strict_arrays,
            collisions: self.collisions,
        }
    }

    fn codegen_options(&self) -> CodegenOptions {
        CodegenOptions {
            root_var: self.root_var.clone(),
            protocol_header: self.protocol_header.clone(),
            address_capacity: self.address_capacity,
            sync_fn: self.sync_fn.clone(),
        }
    }

    fn progress(&self, msg: String) {
        if self.verbose {
            eprintln!("{} {}", "›".dimmed(), msg.dimmed());
        }
    }
}
