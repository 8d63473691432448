//! Attribute filtering
//!
//! Extract features whose attribute value satisfies a comparison,
//! producing a new layer. Features missing the field, or with a value
//! that cannot be compared, are dropped.

use schoolsite_core::{AttributeValue, Layer};

/// Comparison operator for attribute extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Extract features of `layer` where `field <op> value`.
///
/// Numeric comparisons apply when both sides are numeric; `Eq`/`Ne`
/// also compare strings. Anything else fails the predicate.
pub fn extract_by_attribute(
    layer: &Layer,
    field: &str,
    op: FilterOp,
    value: &AttributeValue,
) -> Layer {
    let mut out = Layer::new(layer.name.clone(), layer.crs.clone());
    for feature in layer.iter() {
        let Some(actual) = feature.get_property(field) else {
            continue;
        };
        if matches(actual, op, value) {
            out.push(feature.clone());
        }
    }
    out
}

fn matches(actual: &AttributeValue, op: FilterOp, expected: &AttributeValue) -> bool {
    if let (Some(a), Some(b)) = (actual.as_f64(), expected.as_f64()) {
        return match op {
            FilterOp::Eq => a == b,
            FilterOp::Ne => a != b,
            FilterOp::Gt => a > b,
            FilterOp::Gte => a >= b,
            FilterOp::Lt => a < b,
            FilterOp::Lte => a <= b,
        };
    }

    if let (Some(a), Some(b)) = (actual.as_str(), expected.as_str()) {
        return match op {
            FilterOp::Eq => a == b,
            FilterOp::Ne => a != b,
            _ => false,
        };
    }

    false
}
