use ordered_float::OrderedFloat;
use serde_json::Number;

use crate::ir::Literal;

/// Narrowest literal for a JSON number; `None` when it fits no supported width.
pub fn number_literal(n: &Number) -> Option<Literal> {
    if let Some(i) = n.as_i64() {
        return Some(Literal::Int(i));
    }
    if n.is_u64() {
        // above i64::MAX: no fixed-width C slot we declare can hold it
        return None;
    }
    n.as_f64().map(|f| Literal::Float(OrderedFloat(f)))
}
