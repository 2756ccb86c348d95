use std::fmt::Write;

use crate::bindings::Binding;

/// Publish every binding once per index combination.
pub(super) fn emit(out: &mut String, bindings: &[Binding], sync_fn: &str) {
    writeln!(out).unwrap();
    writeln!(out, "// Generated {sync_fn} routine").unwrap();
    writeln!(out, "void {sync_fn}(char *buf, int len, osc_publish_fn publish, void *ctx) {{").unwrap();
    for binding in bindings {
        let name = binding.name();
        writeln!(out, "  // sync {name}").unwrap();
        let mut indent = "  ".to_string();
        for dim in &binding.dims {
            writeln!(out, "{indent}for (int {v} = 0; {v} < {n}; ++{v}) {{", v = dim.var, n = dim.extent).unwrap();
            indent.push_str("  ");
        }
        let args: String = binding.index_vars().map(|v| format!(", {v}")).collect();
        writeln!(out, "{indent}osc_emit(buf, get_{name}(buf, len{args}), publish, ctx);").unwrap();
        for _ in &binding.dims {
            indent.truncate(indent.len() - 2);
            writeln!(out, "{indent}}}").unwrap();
        }
    }
    writeln!(out, "}}").unwrap();
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
        emit(&mut out, &bindings::collect(&inf.root), "sync_all");
        out
    }

    #[test]
    fn loops_cover_every_dimension() {
        let out = generated(json!({
            "gain": 0.5,
            "send": [{"m": {"0_0": 1, "0_1": 0, "1_0": 0, "1_1": 1}}, {"m": {"0_0": 1, "0_1": 0, "1_0": 0, "1_1": 1}}]
        }));
        assert_eq!(
            out,
            "
// Generated sync_all routine
void sync_all(char *buf, int len, osc_publish_fn publish, void *ctx) {
  // sync gain
  osc_emit(buf, get_gain(buf, len), publish, ctx);
  // sync send
  for (int send_idx = 0; send_idx < 2; ++send_idx) {
    osc_emit(buf, get_send(buf, len, send_idx), publish, ctx);
  }
  // sync send_m
  for (int send_idx = 0; send_idx < 2; ++send_idx) {
    for (int row = 0; row < 2; ++row) {
      for (int col = 0; col < 2; ++col) {
        osc_emit(buf, get_send_m(buf, len, send_idx, row, col), publish, ctx);
      }
    }
  }
}
"
        );
    }

    #[test]
    fn empty_model_has_an_empty_body() {
        assert_eq!(
            generated(json!({})),
            "\n// Generated sync_all routine\nvoid sync_all(char *buf, int len, osc_publish_fn publish, void *ctx) {\n}\n"
        );
    }
}
