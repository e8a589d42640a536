//! Exported symbol names
//!
//! Every wrapper name is a pure function of the configured prefix and the
//! declaration's catalog id, so foreign-side loaders can compute them.

use crate::core::{BindingUnit, FuncDecl, StructDecl};

#[derive(Debug, Clone, Copy)]
pub struct SymbolScheme<'a> {
    prefix: &'a str,
}

impl<'a> SymbolScheme<'a> {
    pub fn new(prefix: &'a str) -> Self {
        Self { prefix }
    }

    pub fn unit(&self, unit: &BindingUnit<'_>) -> String {
        let p = self.prefix;
        match unit {
            BindingUnit::Function(f) => self.function(f),
            BindingUnit::Method { method, .. } => self.function(method),
            BindingUnit::StructConstructor(s) => format!("{}{}_new", p, s.id),
            BindingUnit::FieldAccessor {
                structure,
                field_index,
                is_getter,
            } => {
                let kind = if *is_getter { "getter" } else { "setter" };
                format!("{}{}_{}_{}", p, structure.id, kind, field_index + 1)
            }
            BindingUnit::VariableAccessor { var, is_getter: true } => format!("{}get_{}", p, var.id),
            BindingUnit::VariableAccessor { var, is_getter: false } => format!("{}set_{}", p, var.id),
            BindingUnit::ConstantAccessor(c) => format!("{}get_{}", p, c.id),
        }
    }

    pub fn function(&self, f: &FuncDecl) -> String {
        format!("{}{}", self.prefix, f.id)
    }

    /// Alias naming a struct's handle type
    pub fn struct_handle(&self, s: &StructDecl) -> String {
        format!("{}{}", self.prefix, s.id)
    }

    /// `#[repr(C)]` carrier for multi-result wrappers
    pub fn results_struct(&self, symbol: &str) -> String {
        format!("{}_Result", symbol)
    }

    pub fn init(&self) -> String {
        format!("{}init", self.prefix)
    }
}

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Local identifier for a wrapper parameter
pub fn local_ident(name: &str) -> String {
    if is_keyword(name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

/// Host item or member name as it must be spelled in Rust
pub fn host_ident(name: &str) -> String {
    match name {
        "self" | "Self" | "super" | "crate" => format!("{}_", name),
        _ if is_keyword(name) => format!("r#{}", name),
        _ => name.to_string(),
    }
}

/// Parameter identifiers: unnamed ones become `argN`, collisions get the index appended
pub fn param_idents<'p>(names: impl Iterator<Item = &'p str>, reserved: &[&str]) -> Vec<String> {
    let mut taken: Vec<String> = reserved.iter().map(|r| r.to_string()).collect();
    let mut idents = Vec::new();

    for (i, name) in names.enumerate() {
        let mut ident = if name.is_empty() || name == "_" {
            format!("arg{}", i)
        } else {
            local_ident(name)
        };
        if taken.contains(&ident) {
            ident = format!("{}_{}", ident, i);
        }
        taken.push(ident.clone());
        idents.push(ident);
    }

    idents
}
