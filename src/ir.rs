// Typed model shared by inference, the leaf table and the C emitters.
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scalar {
    Bool,
    Int,    // fits i32
    Int64,  // fits i64 only
    Double,
    Text,
    Absent, // null or empty list
}

impl Scalar {
    pub fn c_type(self) -> &'static str {
        match self {
            Scalar::Bool => "bool",
            Scalar::Int => "int",
            Scalar::Int64 => "int64_t",
            Scalar::Double => "double",
            Scalar::Text => "const char*",
            Scalar::Absent => "void*",
        }
    }
}

/// Field type descriptor, as stored in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ty {
    Scalar(Scalar),
    Record(String),
    Array { elem: Box<Ty>, len: usize },
    Matrix { elem: Box<Ty>, rows: usize, cols: usize },
}

impl Ty {
    /// Innermost non-array type.
    pub fn base(&self) -> &Ty {
        match self {
            Ty::Array { elem, .. } | Ty::Matrix { elem, .. } => elem.base(),
            other => other,
        }
    }

    /// Every fixed extent, outermost first.
    pub fn extents(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cur = self;
        loop {
            match cur {
                Ty::Array { elem, len } => {
                    out.push(*len);
                    cur = elem.as_ref();
                }
                Ty::Matrix { elem, rows, cols } => {
                    out.push(*rows);
                    out.push(*cols);
                    cur = elem.as_ref();
                }
                _ => return out,
            }
        }
    }

    /// Name of the record this descriptor depends on, if any.
    pub fn record_name(&self) -> Option<&str> {
        match self.base() {
            Ty::Record(name) => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn base_c_type(&self) -> &str {
        match self.base() {
            Ty::Scalar(s) => s.c_type(),
            Ty::Record(name) => name.as_str(),
            Ty::Array { .. } | Ty::Matrix { .. } => unreachable!("base() strips array layers"),
        }
    }

    /// C declarator for a field of this type: `double y[2]`.
    pub fn declare(&self, field: &str) -> String {
        let mut out = format!("{} {field}", self.base_c_type());
        for extent in self.extents() {
            out.push_str(&format!("[{extent}]"));
        }
        out
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Ty::Scalar(_) => "scalar",
            Ty::Record(_) => "record",
            Ty::Array { .. } => "array",
            Ty::Matrix { .. } => "matrix",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Text(String),
    Absent,
}

impl Literal {
    pub fn scalar(&self) -> Scalar {
        match self {
            Literal::Bool(_) => Scalar::Bool,
            Literal::Int(i) if i32::try_from(*i).is_ok() => Scalar::Int,
            Literal::Int(_) => Scalar::Int64,
            Literal::Float(_) => Scalar::Double,
            Literal::Text(_) => Scalar::Text,
            Literal::Absent => Scalar::Absent,
        }
    }

    /// C literal form. Strings are wrapped, not escaped.
    pub fn c_literal(&self) -> String {
        match self {
            Literal::Bool(b) => b.to_string(),
            Literal::Int(i) => i.to_string(),
            // Debug keeps a decimal point or exponent (`60.0`, `1e-7`)
            Literal::Float(f) => format!("{:?}", f.0),
            Literal::Text(s) => format!("\"{s}\""),
            Literal::Absent => "NULL".to_string(),
        }
    }
}

/// Annotated value tree: the document's values in the shape the registry declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Scalar(Literal),
    Record {
        type_name: String,
        fields: IndexMap<String, Node>, // sanitized name → value
    },
    Array {
        elem: Ty,
        items: Vec<Node>,
    },
    Matrix {
        elem: Ty,
        rows: Vec<Vec<Node>>,
    },
}

impl Node {
    pub fn is_scalar(&self) -> bool {
        matches!(self, Node::Scalar(_))
    }
}
