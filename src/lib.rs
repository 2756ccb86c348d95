//! Generate C declarations, a literal initializer, OSC accessors and a sync
//! routine from one JSON document.
//!
//! Pipeline: [`path_de`] parse → optional selection ([`jq_exec`]) →
//! [`inference`] → [`bindings`] leaf table → [`codegen`] (or [`schema`]).
pub mod bindings;
pub mod codegen;
pub mod error;
pub mod inference;
pub mod ir;
pub mod jq_exec;
pub mod naming;
pub mod path_de;
pub mod schema;
pub mod topo;

use serde_json::Value;

use crate::bindings::Binding;
use crate::codegen::{Codegen, CodegenOptions};
use crate::error::Result;
use crate::inference::{InferOptions, Registry};
use crate::ir::Node;

/// Everything the emitters read: the type registry, the annotated value tree
/// and the leaf table derived from it.
#[derive(Clone, Debug)]
pub struct Model {
    pub registry: Registry,
    pub root_type: String,
    pub root: Node,
    pub bindings: Vec<Binding>,
}

impl Model {
    pub fn build(document: &Value, options: &InferOptions) -> Result<Self> {
        let inferred = inference::infer_document(document, options)?;
        let bindings = bindings::collect(&inferred.root);
        Ok(Self {
            registry: inferred.registry,
            root_type: inferred.root_type,
            root: inferred.root,
            bindings,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct Settings {
    pub infer: InferOptions,
    pub codegen: CodegenOptions,
}

/// Render the full C artifact for `document`.
pub fn generate(document: &Value, settings: &Settings) -> Result<String> {
    let model = Model::build(document, &settings.infer)?;
    let mut cg = Codegen::new(settings.codegen.clone());
    cg.emit(&model)?;
    Ok(cg.into_string())
}
