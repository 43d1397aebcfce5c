//! Unification and substitution over `FactMetadata`, following the usual
//! SLD-resolution substitution-threading shape.

use nesy_kb::{ArgValue, FactMetadata};
use std::collections::HashMap;

pub type Substitution = HashMap<String, ArgValue>;

pub fn apply_subst_arg(arg: &ArgValue, subst: &Substitution) -> ArgValue {
    match arg {
        ArgValue::Hole(h) => subst.get(h).cloned().unwrap_or_else(|| arg.clone()),
        ArgValue::List(items) => ArgValue::List(items.iter().map(|a| apply_subst_arg(a, subst)).collect()),
        ArgValue::Compound(op, items) => {
            ArgValue::Compound(op.clone(), items.iter().map(|a| apply_subst_arg(a, subst)).collect())
        }
        other => other.clone(),
    }
}

pub fn apply_subst(meta: &FactMetadata, subst: &Substitution) -> FactMetadata {
    FactMetadata {
        operator: meta.operator.clone(),
        args: meta.args.iter().map(|a| apply_subst_arg(a, subst)).collect(),
        source: meta.source.clone(),
        inner_operator: meta.inner_operator.clone(),
        inner_args: meta
            .inner_args
            .as_ref()
            .map(|args| args.iter().map(|a| apply_subst_arg(a, subst)).collect()),
        parts: meta.parts.as_ref().map(|args| args.iter().map(|a| apply_subst_arg(a, subst)).collect()),
        condition: meta.condition.as_ref().map(|c| Box::new(apply_subst(c, subst))),
        conclusion: meta.conclusion.as_ref().map(|c| Box::new(apply_subst(c, subst))),
        body: meta.body.as_ref().map(|b| b.iter().map(|m| apply_subst(m, subst)).collect()),
        variable: meta.variable.clone(),
    }
}

fn unify_arg(pattern: &ArgValue, value: &ArgValue, subst: &mut Substitution) -> bool {
    match (pattern, value) {
        (ArgValue::Hole(h), _) => {
            if let Some(bound) = subst.get(h) {
                bound == value
            } else {
                subst.insert(h.clone(), value.clone());
                true
            }
        }
        (_, ArgValue::Hole(h)) => {
            if let Some(bound) = subst.get(h) {
                bound == pattern
            } else {
                subst.insert(h.clone(), pattern.clone());
                true
            }
        }
        (ArgValue::Name(a), ArgValue::Name(b)) => a == b,
        (ArgValue::Literal(a), ArgValue::Literal(b)) => a == b,
        (ArgValue::List(a), ArgValue::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| unify_arg(x, y, subst))
        }
        (ArgValue::Compound(op_a, a), ArgValue::Compound(op_b, b)) => {
            op_a == op_b && a.len() == b.len() && a.iter().zip(b).all(|(x, y)| unify_arg(x, y, subst))
        }
        _ => false,
    }
}

/// Unifies `pattern` (may contain `Hole`s) against ground-or-patterned
/// `value`, threading bindings through `subst`. Returns `false` (leaving
/// `subst` partially populated — caller must clone before attempting) on
/// mismatch.
pub fn unify(pattern: &FactMetadata, value: &FactMetadata, subst: &mut Substitution) -> bool {
    if pattern.operator != value.operator || pattern.args.len() != value.args.len() {
        return false;
    }
    pattern.args.iter().zip(&value.args).all(|(p, v)| unify_arg(p, v, subst))
}

pub fn try_unify(pattern: &FactMetadata, value: &FactMetadata, base: &Substitution) -> Option<Substitution> {
    let mut subst = base.clone();
    if unify(pattern, value, &mut subst) {
        Some(subst)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unifies_hole_with_ground_value() {
        let pattern = FactMetadata::simple("isA", vec![ArgValue::Hole("x".into()), ArgValue::Name("Lorpus".into())]);
        let value = FactMetadata::simple("isA", vec![ArgValue::Name("Max".into()), ArgValue::Name("Lorpus".into())]);
        let subst = try_unify(&pattern, &value, &Substitution::new()).unwrap();
        assert_eq!(subst.get("x"), Some(&ArgValue::Name("Max".into())));
    }

    #[test]
    fn rejects_operator_mismatch() {
        let pattern = FactMetadata::simple("isA", vec![ArgValue::Hole("x".into())]);
        let value = FactMetadata::simple("can", vec![ArgValue::Name("Max".into())]);
        assert!(try_unify(&pattern, &value, &Substitution::new()).is_none());
    }

    #[test]
    fn apply_subst_rewrites_holes() {
        let meta = FactMetadata::simple("isA", vec![ArgValue::Hole("x".into()), ArgValue::Name("Lorpus".into())]);
        let mut subst = Substitution::new();
        subst.insert("x".to_string(), ArgValue::Name("Max".into()));
        let rewritten = apply_subst(&meta, &subst);
        assert_eq!(rewritten.args[0], ArgValue::Name("Max".into()));
    }
}
