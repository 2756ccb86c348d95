//! Single-pass schema inference (single document).
//!
//! Walk one JSON document, classify every node, and produce two artifacts
//! from the same recursion so they can never disagree:
//! - a [`Registry`] of record type definitions,
//! - an annotated value tree ([`Node`]) carrying the literal values.
//!
//! Classification precedence per keyed map is fixed: dense `row_col` matrix,
//! then dense integer-keyed array, then record.
pub mod registry;
pub mod scalar;
pub mod shape;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{GenError, Result};
use crate::ir::{Literal, Node, Scalar, Ty};
use crate::naming;

pub use registry::{Collision, Fields, Registry};

// ------------------------------- Policy ---------------------------------- //

/// What to do when two structural positions derive the same type name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum CollisionPolicy {
    /// Keep the field list of the last definition and report the collision.
    #[default]
    LastWriteWins,
    /// Fail the run.
    Reject,
}

#[derive(Clone, Debug)]
pub struct InferOptions {
    /// Hint for the root record; also the first segment of every type name.
    pub root_type: String,
    /// Fail on arrays whose elements don't share element 0's type.
    pub strict_arrays: bool,
    pub collisions: CollisionPolicy,
}

impl Default for InferOptions {
    fn default() -> Self {
        Self {
            root_type: "Config".to_string(),
            strict_arrays: false,
            collisions: CollisionPolicy::default(),
        }
    }
}

// ------------------------------- Cursor ---------------------------------- //

/// Where the recursion stands: the type-name hint and a JSON pointer for errors.
#[derive(Clone, Debug)]
struct Cursor {
    hint: Vec<String>,
    pointer: String,
}

impl Cursor {
    fn root(root_type: &str) -> Self {
        Self { hint: vec![root_type.to_string()], pointer: String::new() }
    }

    fn field(&self, key: &str, sanitized: &str) -> Self {
        let mut hint = self.hint.clone();
        hint.push(sanitized.to_string());
        Self { hint, pointer: format!("{}/{}", self.pointer, escape_pointer(key)) }
    }

    // elements share their container's hint
    fn element(&self, index: usize) -> Self {
        Self { hint: self.hint.clone(), pointer: format!("{}/{index}", self.pointer) }
    }

    fn cell(&self, row: usize, col: usize) -> Self {
        Self { hint: self.hint.clone(), pointer: format!("{}/{row}_{col}", self.pointer) }
    }

    fn location(&self) -> String {
        if self.pointer.is_empty() { "/".to_string() } else { self.pointer.clone() }
    }

    fn origin(&self) -> String {
        self.hint.join(".")
    }
}

fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

// ------------------------------ Inference -------------------------------- //

/// Result of inferring one document.
#[derive(Clone, Debug)]
pub struct Inferred {
    pub registry: Registry,
    pub root_type: String,
    pub root: Node,
}

pub struct Inference {
    options: InferOptions,
    registry: Registry,
}

impl Inference {
    pub fn new(options: InferOptions) -> Self {
        Self { options, registry: Registry::new() }
    }

    /// Infer a whole document. The root must classify as a record.
    pub fn infer_document(mut self, document: &Value) -> Result<Inferred> {
        if !document.is_object() {
            return Err(GenError::RootNotRecord { kind: json_kind(document) });
        }
        let cursor = Cursor::root(&self.options.root_type);
        let (ty, mut root) = self.infer(document, &cursor)?;
        let Ty::Record(root_type) = ty else {
            return Err(GenError::RootNotRecord { kind: ty.kind_name() });
        };
        conform(&mut root, &self.registry);
        Ok(Inferred { registry: self.registry, root_type, root })
    }

    fn infer(&mut self, value: &Value, cursor: &Cursor) -> Result<(Ty, Node)> {
        match value {
            Value::Null => Ok(absent()),
            Value::Bool(b) => Ok(literal(Literal::Bool(*b))),
            Value::String(s) => Ok(literal(Literal::Text(s.clone()))),
            Value::Number(n) => match scalar::number_literal(n) {
                Some(lit) => Ok(literal(lit)),
                None => Err(GenError::UnsupportedValueKind {
                    path: cursor.location(),
                    kind: format!("integer {n} exceeds the 64-bit signed range"),
                }),
            },
            Value::Array(xs) if xs.is_empty() => Ok(absent()),
            Value::Array(xs) => self.infer_sequence(xs.iter().collect(), cursor),
            Value::Object(map) => {
                if let Some(cells) = shape::matrix_cells(map) {
                    self.infer_matrix(cells, cursor)
                } else if let Some(items) = shape::array_items(map) {
                    self.infer_sequence(items, cursor)
                } else {
                    self.infer_record(map, cursor)
                }
            }
        }
    }

    fn infer_sequence(&mut self, items: Vec<&Value>, cursor: &Cursor) -> Result<(Ty, Node)> {
        let mut tys = Vec::with_capacity(items.len());
        let mut nodes = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            let (ty, node) = self.infer(item, &cursor.element(i))?;
            tys.push(ty);
            nodes.push(node);
        }
        let elem = tys[0].clone();
        self.check_uniform(&tys, &nodes.iter().collect::<Vec<_>>(), cursor)?;

        // a list of primitive arrays is a matrix
        if let Ty::Array { elem: inner, len } = &elem {
            if matches!(**inner, Ty::Scalar(_)) {
                let rows: Vec<Vec<Node>> = nodes
                    .into_iter()
                    .map(|n| match n {
                        Node::Array { items, .. } => items,
                        other => vec![other],
                    })
                    .collect();
                let ty = Ty::Matrix { elem: inner.clone(), rows: rows.len(), cols: *len };
                return Ok((ty, Node::Matrix { elem: (**inner).clone(), rows }));
            }
        }

        let ty = Ty::Array { elem: Box::new(elem.clone()), len: nodes.len() };
        Ok((ty, Node::Array { elem, items: nodes }))
    }

    fn infer_matrix(&mut self, cells: Vec<Vec<&Value>>, cursor: &Cursor) -> Result<(Ty, Node)> {
        let mut tys = Vec::new();
        let mut rows = Vec::with_capacity(cells.len());
        for (r, row) in cells.into_iter().enumerate() {
            let mut out = Vec::with_capacity(row.len());
            for (c, cell) in row.into_iter().enumerate() {
                let (ty, node) = self.infer(cell, &cursor.cell(r, c))?;
                tys.push(ty);
                out.push(node);
            }
            rows.push(out);
        }
        let elem = tys[0].clone();
        self.check_uniform(&tys, &rows.iter().flatten().collect::<Vec<_>>(), cursor)?;
        let ty = Ty::Matrix { elem: Box::new(elem.clone()), rows: rows.len(), cols: rows[0].len() };
        Ok((ty, Node::Matrix { elem, rows }))
    }

    fn infer_record(&mut self, map: &Map<String, Value>, cursor: &Cursor) -> Result<(Ty, Node)> {
        let type_name = naming::type_name(&cursor.hint);
        self.registry.reserve(&type_name);

        let mut fields = Fields::new();
        let mut values = IndexMap::new();
        for (key, value) in map {
            let name = naming::sanitize(key);
            let (ty, node) = self.infer(value, &cursor.field(key, &name))?;
            fields.insert(name.clone(), ty);
            values.insert(name, node);
        }

        if let Some(collision) = self.registry.define(&type_name, &cursor.origin(), fields) {
            if self.options.collisions == CollisionPolicy::Reject {
                return Err(GenError::TypeNameCollision {
                    type_name: collision.type_name,
                    previous: collision.previous,
                    replacement: collision.replacement,
                });
            }
        }
        Ok((Ty::Record(type_name.clone()), Node::Record { type_name, fields: values }))
    }

    // strict mode: every element must match element 0 in type and layout,
    // down to the field lists of records it contains
    fn check_uniform(&self, tys: &[Ty], nodes: &[&Node], cursor: &Cursor) -> Result<()> {
        if !self.options.strict_arrays {
            return Ok(());
        }
        let mismatch = tys
            .iter()
            .zip(nodes)
            .position(|(ty, node)| *ty != tys[0] || !same_layout(nodes[0], node));
        match mismatch {
            Some(index) => Err(GenError::HeterogeneousArray { path: cursor.location(), index }),
            None => Ok(()),
        }
    }
}

/// Same classification all the way down: scalar kinds, record field names in
/// order, array lengths and matrix extents.
fn same_layout(a: &Node, b: &Node) -> bool {
    match (a, b) {
        (Node::Scalar(x), Node::Scalar(y)) => x.scalar() == y.scalar(),
        (Node::Record { type_name: n, fields: f }, Node::Record { type_name: m, fields: g }) => {
            n == m && f.len() == g.len() && f.iter().zip(g).all(|((k, x), (l, y))| k == l && same_layout(x, y))
        }
        (Node::Array { elem: e, items: xs }, Node::Array { elem: d, items: ys }) => {
            e == d && xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same_layout(x, y))
        }
        (Node::Matrix { elem: e, rows: r }, Node::Matrix { elem: d, rows: q }) => {
            e == d
                && r.len() == q.len()
                && r.iter().zip(q).all(|(x, y)| x.len() == y.len() && x.iter().zip(y).all(|(u, v)| same_layout(u, v)))
        }
        _ => false,
    }
}

/// Drop record values whose field the registry no longer declares: later
/// array elements with extra keys, and positions that lost a type-name
/// collision. Every emitter then reads one consistent tree.
fn conform(node: &mut Node, registry: &Registry) {
    match node {
        Node::Scalar(_) => {}
        Node::Record { type_name, fields } => {
            if let Some(layout) = registry.get(type_name) {
                fields.retain(|name, _| layout.contains_key(name));
            }
            for child in fields.values_mut() {
                conform(child, registry);
            }
        }
        Node::Array { items, .. } => {
            for item in items {
                conform(item, registry);
            }
        }
        Node::Matrix { rows, .. } => {
            for cell in rows.iter_mut().flatten() {
                conform(cell, registry);
            }
        }
    }
}

fn literal(lit: Literal) -> (Ty, Node) {
    (Ty::Scalar(lit.scalar()), Node::Scalar(lit))
}

fn absent() -> (Ty, Node) {
    (Ty::Scalar(Scalar::Absent), Node::Scalar(Literal::Absent))
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

// ------------------------------- Front API -------------------------------- //

pub fn infer_document(document: &Value, options: &InferOptions) -> Result<Inferred> {
    Inference::new(options.clone()).infer_document(document)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn infer(v: Value) -> Inferred {
        infer_document(&v, &InferOptions::default()).expect("inference")
    }

    fn field<'a>(inf: &'a Inferred, ty: &str, name: &str) -> &'a Ty {
        inf.registry.get(ty).and_then(|f| f.get(name)).expect("field present")
    }

    fn int() -> Box<Ty> {
        Box::new(Ty::Scalar(Scalar::Int))
    }

    #[test]
    fn scalars_map_to_fixed_width_types() {
        let inf = infer(json!({"b": true, "i": 3, "d": 0.5, "s": "x", "n": null, "e": []}));
        assert_eq!(field(&inf, "Config", "b"), &Ty::Scalar(Scalar::Bool));
        assert_eq!(field(&inf, "Config", "i"), &Ty::Scalar(Scalar::Int));
        assert_eq!(field(&inf, "Config", "d"), &Ty::Scalar(Scalar::Double));
        assert_eq!(field(&inf, "Config", "s"), &Ty::Scalar(Scalar::Text));
        assert_eq!(field(&inf, "Config", "n"), &Ty::Scalar(Scalar::Absent));
        assert_eq!(field(&inf, "Config", "e"), &Ty::Scalar(Scalar::Absent));
    }

    #[test]
    fn matrix_detection_is_exact() {
        let inf = infer(json!({"m": {"0_0": 1, "0_1": 2, "1_0": 3, "1_1": 4}}));
        assert_eq!(field(&inf, "Config", "m"), &Ty::Matrix { elem: int(), rows: 2, cols: 2 });

        let inf = infer(json!({"m": {"0_0": 1, "0_1": 2, "1_0": 3}}));
        assert_eq!(field(&inf, "Config", "m"), &Ty::Record("ConfigM".into()));
        let names: Vec<_> = inf.registry.get("ConfigM").unwrap().keys().cloned().collect();
        assert_eq!(names, vec!["_0_0", "_0_1", "_1_0"]);
    }

    #[test]
    fn sparse_integer_keys_fall_back_to_record() {
        let inf = infer(json!({"a": {"0": 1, "2": 3}}));
        assert_eq!(field(&inf, "Config", "a"), &Ty::Record("ConfigA".into()));

        let inf = infer(json!({"a": {"1": 10, "0": 20}}));
        assert_eq!(field(&inf, "Config", "a"), &Ty::Array { elem: int(), len: 2 });
        let Node::Record { fields, .. } = &inf.root else { panic!("root record") };
        let Node::Array { items, .. } = &fields["a"] else { panic!("array") };
        assert_eq!(items[0], Node::Scalar(Literal::Int(20)));
    }

    #[test]
    fn list_of_lists_is_matrix() {
        let inf = infer(json!({"g": [[1, 2, 3], [4, 5, 6]]}));
        assert_eq!(field(&inf, "Config", "g"), &Ty::Matrix { elem: int(), rows: 2, cols: 3 });
    }

    #[test]
    fn records_are_named_from_hint_and_share_across_elements() {
        let inf = infer(json!({"pts": {"0": {"v": 1}, "1": {"v": 2}}}));
        assert_eq!(
            field(&inf, "Config", "pts"),
            &Ty::Array { elem: Box::new(Ty::Record("ConfigPts".into())), len: 2 }
        );
        assert_eq!(inf.registry.len(), 2);
        assert!(inf.registry.collisions().is_empty());
    }

    #[test]
    fn first_element_decides_array_type() {
        let inf = infer(json!({"xs": [1, "two", 3.0]}));
        assert_eq!(field(&inf, "Config", "xs"), &Ty::Array { elem: int(), len: 3 });
    }

    #[test]
    fn strict_arrays_reject_mixed_elements() {
        let opts = InferOptions { strict_arrays: true, ..InferOptions::default() };
        let err = infer_document(&json!({"xs": [1, "two"]}), &opts).unwrap_err();
        match err {
            GenError::HeterogeneousArray { path, index } => {
                assert_eq!(path, "/xs");
                assert_eq!(index, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn uneven_record_elements_follow_element_zero() {
        let inf = infer(json!({"pts": [{"v": 1}, {"w": 2, "v": 3}]}));
        let layout: Vec<_> = inf.registry.get("ConfigPts").unwrap().keys().cloned().collect();
        assert_eq!(layout, vec!["v"]);

        let Node::Record { fields, .. } = &inf.root else { panic!("root record") };
        let Node::Array { items, .. } = &fields["pts"] else { panic!("array") };
        let Node::Record { fields: second, .. } = &items[1] else { panic!("record element") };
        assert_eq!(second.keys().collect::<Vec<_>>(), vec!["v"]);
        assert_eq!(second["v"], Node::Scalar(Literal::Int(3)));
    }

    #[test]
    fn strict_arrays_compare_record_fields() {
        let opts = InferOptions { strict_arrays: true, ..InferOptions::default() };
        for doc in [
            json!({"pts": [{"v": 1}, {"w": 2}]}),
            json!({"pts": [{"v": 1}, {"v": 2, "w": 3}]}),
            json!({"pts": [{"a": {"v": 1}}, {"a": {"w": 1}}]}),
        ] {
            match infer_document(&doc, &opts).unwrap_err() {
                GenError::HeterogeneousArray { path, index } => {
                    assert_eq!(path, "/pts");
                    assert_eq!(index, 1);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
        assert!(infer_document(&json!({"pts": [{"v": 1}, {"v": 2}]}), &opts).is_ok());
    }

    #[test]
    fn strict_matrices_compare_record_fields() {
        let opts = InferOptions { strict_arrays: true, ..InferOptions::default() };
        let doc = json!({"g": {"0_0": {"on": true}, "0_1": {"off": false}}});
        assert!(matches!(
            infer_document(&doc, &opts),
            Err(GenError::HeterogeneousArray { index: 1, .. })
        ));
        let inf = infer(doc);
        let layout: Vec<_> = inf.registry.get("ConfigG").unwrap().keys().cloned().collect();
        assert_eq!(layout, vec!["on"]);
    }

    #[test]
    fn losing_collision_origin_drops_its_values() {
        let inf = infer(json!({"a_b": {"x": 1, "y": 2}, "a": {"b": {"z": 3}}}));
        let Node::Record { fields, .. } = &inf.root else { panic!("root record") };
        let Node::Record { fields: lost, .. } = &fields["a_b"] else { panic!("record") };
        assert!(lost.is_empty());
    }

    #[test]
    fn collisions_are_last_write_wins_by_default() {
        // `a_b` and `a.b` both derive ConfigAB
        let inf = infer(json!({"a_b": {"x": 1, "y": 2}, "a": {"b": {"z": 3}}}));
        let fields: Vec<_> = inf.registry.get("ConfigAB").unwrap().keys().cloned().collect();
        assert_eq!(fields, vec!["z"]);
        assert_eq!(inf.registry.collisions().len(), 1);
    }

    #[test]
    fn collisions_can_be_rejected() {
        let opts = InferOptions { collisions: CollisionPolicy::Reject, ..InferOptions::default() };
        let err = infer_document(&json!({"a_b": {"x": 1}, "a": {"b": {"z": 3}}}), &opts).unwrap_err();
        assert!(matches!(err, GenError::TypeNameCollision { .. }));
    }

    #[test]
    fn unsupported_number_names_its_path() {
        let err = infer_document(&json!({"a": {"big": u64::MAX}}), &InferOptions::default()).unwrap_err();
        match err {
            GenError::UnsupportedValueKind { path, .. } => assert_eq!(path, "/a/big"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn root_must_be_a_record() {
        let opts = InferOptions::default();
        assert!(matches!(
            infer_document(&json!([1, 2]), &opts),
            Err(GenError::RootNotRecord { kind: "list" })
        ));
        assert!(matches!(
            infer_document(&json!({"0": 1, "1": 2}), &opts),
            Err(GenError::RootNotRecord { kind: "array" })
        ));
    }

    #[test]
    fn fresh_inference_starts_empty() {
        let doc = json!({"a": {"b": 1}});
        let first = infer(doc.clone());
        let second = infer(doc);
        assert_eq!(first.root, second.root);
        assert_eq!(
            first.registry.names().collect::<Vec<_>>(),
            second.registry.names().collect::<Vec<_>>()
        );
    }
}
