//! Leaf table: one entry per addressable leaf of the annotated tree.
//!
//! Path and index-variable stack are worked out here once; the accessor and
//! sync emitters only read the table, so they always agree on names,
//! parameters and address layout.
use serde::Serialize;

use crate::ir::{Node, Scalar, Ty};

/// One open dimension a caller must supply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Dim {
    pub var: String,
    /// Path position whose segment introduced this dimension; the address
    /// placeholder sits right after that segment.
    pub segment: usize,
    pub extent: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Leaf {
    /// Single value.
    Scalar { scalar: Scalar },
    /// Whole primitive array, sent as one message.
    Vector { elem: Scalar, len: usize },
    /// One matrix cell; the last two dims are row and column.
    Cell { elem: Scalar },
    /// Representative element of an array (or matrix) of records: its direct
    /// scalar fields in one message, whole-element writes.
    Element { type_name: String, scalars: Vec<(String, Scalar)> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub path: Vec<String>,
    pub dims: Vec<Dim>,
    pub leaf: Leaf,
}

impl Binding {
    /// Accessor stem: `send_lut_Y`.
    pub fn name(&self) -> String {
        self.path.join("_")
    }

    /// `snprintf` pattern: `/send/%d/lut/Y`.
    pub fn address_pattern(&self) -> String {
        let mut out = String::new();
        for (i, segment) in self.path.iter().enumerate() {
            out.push('/');
            out.push_str(segment);
            for _ in self.dims_at(i) {
                out.push_str("/%d");
            }
        }
        out
    }

    /// C lvalue of the bound storage: `config.send[send_idx].lut.Y`.
    pub fn storage(&self, root_var: &str) -> String {
        let mut out = root_var.to_string();
        for (i, segment) in self.path.iter().enumerate() {
            out.push('.');
            out.push_str(segment);
            for dim in self.dims_at(i) {
                out.push_str(&format!("[{}]", dim.var));
            }
        }
        out
    }

    pub fn index_vars(&self) -> impl Iterator<Item = &str> {
        self.dims.iter().map(|d| d.var.as_str())
    }

    fn dims_at(&self, segment: usize) -> impl Iterator<Item = &Dim> {
        self.dims.iter().filter(move |d| d.segment == segment)
    }
}

/// Accessor names produced by more than one path (`a_b` and `a.b` both give
/// `a_b`), each listed once in table order.
pub fn duplicate_names(bindings: &[Binding]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for name in bindings.iter().map(Binding::name) {
        if !seen.insert(name.clone()) && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

/// Walk the annotated tree from its root record.
pub fn collect(root: &Node) -> Vec<Binding> {
    let mut walker = Walker::default();
    walker.visit(root, &mut Vec::new(), &mut Vec::new());
    walker.out
}

#[derive(Default)]
struct Walker {
    out: Vec<Binding>,
}

impl Walker {
    fn visit(&mut self, node: &Node, path: &mut Vec<String>, dims: &mut Vec<Dim>) {
        match node {
            Node::Record { fields, .. } => {
                for (name, child) in fields {
                    path.push(name.clone());
                    self.visit(child, path, dims);
                    path.pop();
                }
            }
            Node::Scalar(lit) => self.emit(path, dims, Leaf::Scalar { scalar: lit.scalar() }),
            Node::Array { elem: Ty::Scalar(s), items } => {
                self.emit(path, dims, Leaf::Vector { elem: *s, len: items.len() });
            }
            Node::Array { items, .. } => {
                let Some(first) = items.first() else { return };
                let base = format!("{}_idx", last(path));
                self.open(path, dims, &base, items.len());
                self.representative(first, path, dims);
                dims.pop();
            }
            Node::Matrix { elem: Ty::Scalar(s), rows } => {
                let cols = rows.first().map_or(0, Vec::len);
                self.open(path, dims, "row", rows.len());
                self.open(path, dims, "col", cols);
                self.emit(path, dims, Leaf::Cell { elem: *s });
                dims.truncate(dims.len() - 2);
            }
            Node::Matrix { rows, .. } => {
                let Some(first) = rows.first().and_then(|r| r.first()) else { return };
                let cols = rows[0].len();
                let seg = last(path).to_string();
                self.open(path, dims, &format!("{seg}_row"), rows.len());
                self.open(path, dims, &format!("{seg}_col"), cols);
                self.representative(first, path, dims);
                dims.truncate(dims.len() - 2);
            }
        }
    }

    // arrays of records bind the element first, then recurse into one
    // element's shape ("one representative times N")
    fn representative(&mut self, first: &Node, path: &mut Vec<String>, dims: &mut Vec<Dim>) {
        if let Node::Record { type_name, fields } = first {
            let scalars = fields
                .iter()
                .filter_map(|(name, v)| match v {
                    Node::Scalar(lit) => Some((name.clone(), lit.scalar())),
                    _ => None,
                })
                .collect();
            self.emit(path, dims, Leaf::Element { type_name: type_name.clone(), scalars });
        }
        self.visit(first, path, dims);
    }

    fn open(&mut self, path: &[String], dims: &mut Vec<Dim>, base: &str, extent: usize) {
        let mut var = base.to_string();
        let mut n = 2;
        while dims.iter().any(|d| d.var == var) {
            var = format!("{base}{n}");
            n += 1;
        }
        dims.push(Dim { var, segment: path.len().saturating_sub(1), extent });
    }

    fn emit(&mut self, path: &[String], dims: &[Dim], leaf: Leaf) {
        self.out.push(Binding { path: path.to_vec(), dims: dims.to_vec(), leaf });
    }
}

fn last(path: &[String]) -> &str {
    path.last().map_or("", String::as_str)
}
