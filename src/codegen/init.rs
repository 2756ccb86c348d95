use std::fmt::Write;

use crate::ir::Node;

pub(super) fn emit(out: &mut String, root_type: &str, root_var: &str, root: &Node) {
    writeln!(out, "{root_type} {root_var} =").unwrap();
    writeln!(out, "{};", render(root, 0)).unwrap();
    writeln!(out).unwrap();
}

/// Render `node` as a C initializer. The first line carries no indentation
/// (the caller places it); nested lines are indented two spaces per level.
pub fn render(node: &Node, level: usize) -> String {
    let indent = "  ".repeat(level);
    match node {
        Node::Scalar(lit) => lit.c_literal(),
        Node::Record { fields, .. } => {
            let mut lines = vec!["{".to_string()];
            for (i, (name, value)) in fields.iter().enumerate() {
                let comma = if i + 1 < fields.len() { "," } else { "" };
                lines.push(format!("{indent}  .{name} = {}{comma}", render(value, level + 1)));
            }
            lines.push(format!("{indent}}}"));
            lines.join("\n")
        }
        Node::Array { items, .. } => render_seq(items, level),
        Node::Matrix { rows, .. } => {
            let mut lines = vec!["{".to_string()];
            for (i, row) in rows.iter().enumerate() {
                let comma = if i + 1 < rows.len() { "," } else { "" };
                lines.push(format!("{indent}  {}{comma}", render_seq(row, level + 1)));
            }
            lines.push(format!("{indent}}}"));
            lines.join("\n")
        }
    }
}

fn render_seq(items: &[Node], level: usize) -> String {
    if items.iter().all(Node::is_scalar) {
        let values: Vec<String> = items.iter().map(|n| render(n, level)).collect();
        return format!("{{ {} }}", values.join(", "));
    }
    let indent = "  ".repeat(level);
    let mut lines = vec!["{".to_string()];
    for (i, item) in items.iter().enumerate() {
        let comma = if i + 1 < items.len() { "," } else { "" };
        lines.push(format!("{indent}  {}{comma}", render(item, level + 1)));
    }
    lines.push(format!("{indent}}}"));
    lines.join("\n")
}
