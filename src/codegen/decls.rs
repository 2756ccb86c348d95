use std::fmt::Write;

use crate::inference::Registry;

/// `typedef struct` blocks in the given order.
pub(super) fn emit(out: &mut String, registry: &Registry, order: &[String]) {
    for name in order {
        let Some(fields) = registry.get(name) else { continue };
        writeln!(out, "typedef struct {name} {{").unwrap();
        for (field, ty) in fields {
            writeln!(out, "  {};", ty.declare(field)).unwrap();
        }
        writeln!(out, "}} {name};").unwrap();
        writeln!(out).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{infer_document, InferOptions};
    use crate::topo;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn declarations_follow_dependency_order() {
        let inf = infer_document(
            &json!({
                "analog_format": {"resolution": "1920x1080", "color_matrix": {"0_0": 1.0, "0_1": 0.0, "1_0": 0.0, "1_1": 1.0}},
                "send": [{"source": 1, "lut": {"Y": [-1.0, 1.0]}}]
            }),
            &InferOptions::default(),
        )
        .unwrap();
        let order = topo::order(&inf.registry).unwrap();
        let mut out = String::new();
        emit(&mut out, &inf.registry, &order);
        assert_eq!(
            out,
            "\
typedef struct ConfigAnalogFormat {
  const char* resolution;
  double color_matrix[2][2];
} ConfigAnalogFormat;

typedef struct ConfigSendLut {
  double Y[2];
} ConfigSendLut;

typedef struct ConfigSend {
  int source;
  ConfigSendLut lut;
} ConfigSend;

typedef struct Config {
  ConfigAnalogFormat analog_format;
  ConfigSend send[1];
} Config;

"
        );
    }
}
