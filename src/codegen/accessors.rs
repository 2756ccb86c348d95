//! OSC read/write bindings, one pair per leaf-table entry.
use std::fmt::Write;

use crate::bindings::{Binding, Leaf};
use crate::ir::Scalar;

pub(super) fn emit(out: &mut String, bindings: &[Binding], root_var: &str) {
    writeln!(out, "// Generated OSC getters/setters").unwrap();
    for binding in bindings {
        emit_getter(out, binding, root_var);
        emit_setter(out, binding, root_var);
    }
}

/// One OSC type-tag slot.
enum Tag {
    Fixed(char),
    /// `T`/`F` picked from the value at run time; carries no argument.
    Truth(String),
}

/// Tag plus the argument expression (if the tag consumes one) per value.
fn message_parts(binding: &Binding, storage: &str) -> Vec<(Tag, Option<String>)> {
    match &binding.leaf {
        Leaf::Scalar { scalar } => vec![part(*scalar, storage.to_string())],
        Leaf::Cell { elem } => vec![part(*elem, storage.to_string())],
        Leaf::Vector { elem, len } => (0..*len).map(|k| part(*elem, format!("{storage}[{k}]"))).collect(),
        Leaf::Element { scalars, .. } => scalars
            .iter()
            .map(|(field, scalar)| part(*scalar, format!("{storage}.{field}")))
            .collect(),
    }
}

fn part(scalar: Scalar, expr: String) -> (Tag, Option<String>) {
    match scalar {
        Scalar::Bool => (Tag::Truth(expr), None),
        Scalar::Int => (Tag::Fixed('i'), Some(expr)),
        Scalar::Int64 => (Tag::Fixed('h'), Some(expr)),
        Scalar::Double => (Tag::Fixed('f'), Some(expr)),
        Scalar::Text => (Tag::Fixed('s'), Some(expr)),
        Scalar::Absent => (Tag::Fixed('N'), None),
    }
}

fn emit_getter(out: &mut String, binding: &Binding, root_var: &str) {
    let name = binding.name();
    let storage = binding.storage(root_var);
    let parts = message_parts(binding, &storage);

    let mut params = vec!["char *buf".to_string(), "int len".to_string()];
    params.extend(binding.index_vars().map(|v| format!("int {v}")));
    let snprintf_args: String = binding.index_vars().map(|v| format!(", {v}")).collect();

    writeln!(out, "/*\n** {name}\n*/").unwrap();
    writeln!(out, "uint32_t get_{name}({}) {{", params.join(", ")).unwrap();
    writeln!(out, "  char address[OSC_BUF_SIZE];").unwrap();
    writeln!(out, "  snprintf(address, OSC_BUF_SIZE - 1, \"{}\"{snprintf_args});", binding.address_pattern()).unwrap();

    let format = if parts.iter().any(|(tag, _)| matches!(tag, Tag::Truth(_))) {
        let chars: Vec<String> = parts
            .iter()
            .map(|(tag, _)| match tag {
                Tag::Fixed(c) => format!("'{c}'"),
                Tag::Truth(expr) => format!("{expr} ? 'T' : 'F'"),
            })
            .chain(std::iter::once("'\\0'".to_string()))
            .collect();
        writeln!(out, "  const char fmt[] = {{ {} }};", chars.join(", ")).unwrap();
        "fmt".to_string()
    } else {
        let tags: String = parts
            .iter()
            .map(|(tag, _)| match tag {
                Tag::Fixed(c) => *c,
                Tag::Truth(_) => unreachable!("handled above"),
            })
            .collect();
        format!("\"{tags}\"")
    };

    let args: Vec<&String> = parts.iter().filter_map(|(_, arg)| arg.as_ref()).collect();
    match args.as_slice() {
        [] => writeln!(out, "  return tosc_writeMessage(buf, len, address, {format});").unwrap(),
        [one] => writeln!(out, "  return tosc_writeMessage(buf, len, address, {format}, {one});").unwrap(),
        many => {
            writeln!(out, "  return tosc_writeMessage(buf, len, address, {format},").unwrap();
            for (i, arg) in many.iter().enumerate() {
                let comma = if i + 1 < many.len() { "," } else { "" };
                writeln!(out, "    {arg}{comma}").unwrap();
            }
            writeln!(out, "  );").unwrap();
        }
    }
    writeln!(out, "}}").unwrap();
}

fn emit_setter(out: &mut String, binding: &Binding, root_var: &str) {
    let name = binding.name();
    let storage = binding.storage(root_var);
    let mut params: Vec<String> = binding.index_vars().map(|v| format!("int {v}")).collect();
    let body = match &binding.leaf {
        Leaf::Scalar { scalar } | Leaf::Cell { elem: scalar } => {
            params.push(value_param(*scalar));
            format!("{storage} = v;")
        }
        Leaf::Vector { elem, len } => {
            params.push(format!("{} const *v", elem.c_type()));
            format!("memcpy({storage}, v, sizeof({}) * {len});", elem.c_type())
        }
        Leaf::Element { type_name, .. } => {
            params.push(format!("const {type_name} *v"));
            format!("{storage} = *v;")
        }
    };
    writeln!(out, "void set_{name}({}) {{ {body} }}", params.join(", ")).unwrap();
}

fn value_param(scalar: Scalar) -> String {
    match scalar {
        Scalar::Text => "const char *v".to_string(),
        Scalar::Absent => "void *v".to_string(),
        other => format!("{} v", other.c_type()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings;
    use crate::inference::{infer_document, InferOptions};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn generated(doc: serde_json::Value) -> String {
        let inf = infer_document(&doc, &InferOptions::default()).unwrap();
        let mut out = String::new();
        emit(&mut out, &bindings::collect(&inf.root), "config");
        out
    }

    #[test]
    fn scalar_under_array_of_records() {
        let out = generated(json!({"send": [{"gain": 0.5}, {"gain": 1.0}]}));
        assert!(out.contains(
            "\
/*
** send_gain
*/
uint32_t get_send_gain(char *buf, int len, int send_idx) {
  char address[OSC_BUF_SIZE];
  snprintf(address, OSC_BUF_SIZE - 1, \"/send/%d/gain\", send_idx);
  return tosc_writeMessage(buf, len, address, \"f\", config.send[send_idx].gain);
}
void set_send_gain(int send_idx, double v) { config.send[send_idx].gain = v; }
"
        ));
    }

    #[test]
    fn element_binding_for_array_of_records() {
        let out = generated(json!({"send": [{"gain": 0.5, "name": "a"}]}));
        assert!(out.contains("uint32_t get_send(char *buf, int len, int send_idx) {"));
        assert!(out.contains("snprintf(address, OSC_BUF_SIZE - 1, \"/send/%d\", send_idx);"));
        assert!(out.contains("return tosc_writeMessage(buf, len, address, \"fs\",\n    config.send[send_idx].gain,\n    config.send[send_idx].name\n  );"));
        assert!(out.contains("void set_send(int send_idx, const ConfigSend *v) { config.send[send_idx] = *v; }"));
    }

    #[test]
    fn whole_vector_at_top_level() {
        let out = generated(json!({"y": [1.5, 2.5]}));
        assert_eq!(
            out,
            "\
// Generated OSC getters/setters
/*
** y
*/
uint32_t get_y(char *buf, int len) {
  char address[OSC_BUF_SIZE];
  snprintf(address, OSC_BUF_SIZE - 1, \"/y\");
  return tosc_writeMessage(buf, len, address, \"ff\",
    config.y[0],
    config.y[1]
  );
}
void set_y(double const *v) { memcpy(config.y, v, sizeof(double) * 2); }
"
        );
    }

    #[test]
    fn matrix_cell_takes_row_and_col() {
        let out = generated(json!({"m": {"0_0": 1.0, "0_1": 0.0, "1_0": 0.0, "1_1": 1.0}}));
        assert!(out.contains("uint32_t get_m(char *buf, int len, int row, int col) {"));
        assert!(out.contains("snprintf(address, OSC_BUF_SIZE - 1, \"/m/%d/%d\", row, col);"));
        assert!(out.contains("\"f\", config.m[row][col]);"));
        assert!(out.contains("void set_m(int row, int col, double v) { config.m[row][col] = v; }"));
    }

    #[test]
    fn tags_follow_scalar_kind() {
        let out = generated(json!({"i": 1, "w": 5_000_000_000i64, "s": "x", "n": null, "b": true}));
        assert!(out.contains("\"i\", config.i);"));
        assert!(out.contains("\"h\", config.w);"));
        assert!(out.contains("\"s\", config.s);"));
        assert!(out.contains("return tosc_writeMessage(buf, len, address, \"N\");"));
        assert!(out.contains("const char fmt[] = { config.b ? 'T' : 'F', '\\0' };"));
        assert!(out.contains("return tosc_writeMessage(buf, len, address, fmt);"));
        assert!(out.contains("void set_s(const char *v) { config.s = v; }"));
        assert!(out.contains("void set_w(int64_t v) { config.w = v; }"));
        assert!(out.contains("void set_n(void *v) { config.n = v; }"));
        assert!(out.contains("void set_b(bool v) { config.b = v; }"));
    }

    #[test]
    fn text_vector_setter_copies_pointers() {
        let out = generated(json!({"names": ["a", "b", "c"]}));
        assert!(out.contains("void set_names(const char* const *v) { memcpy(config.names, v, sizeof(const char*) * 3); }"));
    }

    #[test]
    fn no_leaves_no_bindings() {
        assert_eq!(generated(json!({})), "// Generated OSC getters/setters\n");
    }
}
