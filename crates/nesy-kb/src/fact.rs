//! `Fact`/`Rule` data model.

use nesy_vector::Vector;
use serde::{Deserialize, Serialize};

/// Canonical, structured argument representation. Rendering a `Fact`'s
/// metadata back to DSL text and reparsing it must round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArgValue {
    Name(String),
    Literal(String),
    Hole(String),
    List(Vec<ArgValue>),
    Compound(String, Vec<ArgValue>),
}

impl ArgValue {
    pub fn render(&self) -> String {
        match self {
            ArgValue::Name(n) => n.clone(),
            ArgValue::Literal(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            ArgValue::Hole(h) => format!("?{h}"),
            ArgValue::List(items) => {
                format!("[{}]", items.iter().map(ArgValue::render).collect::<Vec<_>>().join(", "))
            }
            ArgValue::Compound(op, items) => {
                format!("({op} {})", items.iter().map(ArgValue::render).collect::<Vec<_>>().join(" "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FactMetadata {
    pub operator: String,
    pub args: Vec<ArgValue>,
    pub source: Option<String>,
    pub inner_operator: Option<String>,
    pub inner_args: Option<Vec<ArgValue>>,
    pub parts: Option<Vec<ArgValue>>,
    pub condition: Option<Box<FactMetadata>>,
    pub conclusion: Option<Box<FactMetadata>>,
    pub body: Option<Vec<FactMetadata>>,
    pub variable: Option<String>,
}

impl FactMetadata {
    pub fn simple(operator: impl Into<String>, args: Vec<ArgValue>) -> Self {
        Self {
            operator: operator.into(),
            args,
            ..Default::default()
        }
    }

    pub fn arg0(&self) -> Option<&ArgValue> {
        self.args.first()
    }

    pub fn arg1(&self) -> Option<&ArgValue> {
        self.args.get(1)
    }

    /// Renders back to DSL text. Bijective up to whitespace with the parser.
    pub fn render(&self) -> String {
        if self.operator == "Implies" {
            if let (Some(cond), Some(concl)) = (&self.condition, &self.conclusion) {
                return format!("Implies {} {}", cond.render(), concl.render());
            }
        }
        let mut out = self.operator.clone();
        for a in &self.args {
            out.push(' ');
            out.push_str(&a.render());
        }
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
    pub id: u64,
    pub vector: Vector,
    pub name: Option<String>,
    pub metadata: FactMetadata,
}

/// `Implies(cond, concl)` — vector and structured metadata for both sides,
/// free variables extracted by walking `Hole` nodes, and `has_variables`
/// distinguishing ground rules from schema rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: u64,
    pub vector: Vector,
    pub condition: FactMetadata,
    pub conclusion: FactMetadata,
    pub variables: Vec<String>,
    pub has_variables: bool,
}

impl Rule {
    pub fn new(id: u64, vector: Vector, condition: FactMetadata, conclusion: FactMetadata) -> Self {
        let mut variables = Vec::new();
        collect_holes_metadata(&condition, &mut variables);
        collect_holes_metadata(&conclusion, &mut variables);
        variables.sort();
        variables.dedup();
        let has_variables = !variables.is_empty();
        Self {
            id,
            vector,
            condition,
            conclusion,
            variables,
            has_variables,
        }
    }
}

fn collect_holes_arg(arg: &ArgValue, out: &mut Vec<String>) {
    match arg {
        ArgValue::Hole(h) => out.push(h.clone()),
        ArgValue::List(items) | ArgValue::Compound(_, items) => {
            for item in items {
                collect_holes_arg(item, out);
            }
        }
        _ => {}
    }
}

pub fn collect_holes_metadata(meta: &FactMetadata, out: &mut Vec<String>) {
    for a in &meta.args {
        collect_holes_arg(a, out);
    }
    if let Some(c) = &meta.condition {
        collect_holes_metadata(c, out);
    }
    if let Some(c) = &meta.conclusion {
        collect_holes_metadata(c, out);
    }
    if let Some(body) = &meta.body {
        for b in body {
            collect_holes_metadata(b, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_simple_fact() {
        let m = FactMetadata::simple("isA", vec![ArgValue::Name("Socrates".into()), ArgValue::Name("Human".into())]);
        assert_eq!(m.render(), "isA Socrates Human");
    }

    #[test]
    fn rule_extracts_free_variables() {
        let cond = FactMetadata::simple("isA", vec![ArgValue::Hole("x".into()), ArgValue::Name("Lorpus".into())]);
        let concl = FactMetadata::simple("isA", vec![ArgValue::Hole("x".into()), ArgValue::Name("Impus".into())]);
        let rule = Rule::new(1, dummy_vector(), cond, concl);
        assert_eq!(rule.variables, vec!["x".to_string()]);
        assert!(rule.has_variables);
    }

    fn dummy_vector() -> Vector {
        use nesy_vector::HdcAlgebra;
        nesy_vector::Strategy::from_id(nesy_vector::StrategyId::Exact)
            .create_random(64, 1)
            .unwrap()
    }
}
