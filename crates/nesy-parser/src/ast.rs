//! AST node types for the DSL: `operator arg*` statements, macros, graphs,
//! and solve blocks.

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    Reference(String),
    Hole(String),
    Str(String),
    Number(f64),
    List(Vec<Expr>),
    Compound(String, Vec<Expr>),
}

impl Expr {
    /// Walks the expression tree collecting every `Hole` name — how rules
    /// discover their free variables.
    pub fn collect_holes(&self, out: &mut Vec<String>) {
        match self {
            Expr::Hole(name) => out.push(name.clone()),
            Expr::List(items) | Expr::Compound(_, items) => {
                for item in items {
                    item.collect_holes(out);
                }
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    pub name: String,
    pub persist: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigEntry {
    KeyValue(String, Expr),
    KeyFrom(String, String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assert {
        dest: Option<Destination>,
        operator: Expr,
        args: Vec<Expr>,
        comment: Option<String>,
        line: u32,
        col: u32,
    },
    Macro {
        dest: Destination,
        params: Vec<String>,
        body: Vec<Statement>,
        line: u32,
        col: u32,
    },
    Graph {
        dest: Destination,
        params: Vec<String>,
        body: Vec<Statement>,
        ret: Option<Expr>,
        line: u32,
        col: u32,
    },
    Solve {
        dest: Destination,
        kind: String,
        config: Vec<ConfigEntry>,
        line: u32,
        col: u32,
    },
}

impl Statement {
    pub fn line(&self) -> u32 {
        match self {
            Statement::Assert { line, .. }
            | Statement::Macro { line, .. }
            | Statement::Graph { line, .. }
            | Statement::Solve { line, .. } => *line,
        }
    }
}

pub type Program = Vec<Statement>;
