//! JSON debug view of a model: record types in declaration order plus the leaf
//! table, for inspecting what the C output will contain.
use serde::Serialize;

use crate::bindings::{Binding, Leaf};
use crate::error::Result;
use crate::{topo, Model};

#[derive(Debug, Serialize)]
pub struct SchemaView {
    pub root: String,
    pub types: Vec<TypeView>,
    pub bindings: Vec<BindingView>,
}

#[derive(Debug, Serialize)]
pub struct TypeView {
    pub name: String,
    pub fields: Vec<FieldView>,
}

#[derive(Debug, Serialize)]
pub struct FieldView {
    pub name: String,
    pub kind: &'static str,
    pub declaration: String,
}

#[derive(Debug, Serialize)]
pub struct BindingView {
    pub name: String,
    pub address: String,
    pub params: Vec<String>,
    pub leaf: Leaf,
}

pub fn view(model: &Model) -> Result<SchemaView> {
    let order = topo::order(&model.registry)?;
    let types = order
        .iter()
        .filter_map(|name| {
            let fields = model.registry.get(name)?;
            Some(TypeView {
                name: name.clone(),
                fields: fields
                    .iter()
                    .map(|(field, ty)| FieldView {
                        name: field.clone(),
                        kind: ty.kind_name(),
                        declaration: ty.declare(field),
                    })
                    .collect(),
            })
        })
        .collect();
    let bindings = model.bindings.iter().map(binding_view).collect();
    Ok(SchemaView { root: model.root_type.clone(), types, bindings })
}

fn binding_view(binding: &Binding) -> BindingView {
    BindingView {
        name: binding.name(),
        address: binding.address_pattern(),
        params: binding.index_vars().map(str::to_string).collect(),
        leaf: binding.leaf.clone(),
    }
}

/// Pretty-printed [`view`].
pub fn render(model: &Model) -> Result<String> {
    let view = view(model)?;
    Ok(serde_json::to_string_pretty(&view)?)
}
