//! Normalized declaration catalog
//!
//! The catalog is produced upstream from parsed host sources. Identifiers
//! (`id`) are already unique and safe to embed in exported symbol names.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::types::TypeShape;
use crate::errors::BindError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Short name used to qualify host items (`shapes`)
    pub name: String,
    /// Full import path, informational
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    #[serde(default)]
    pub name: String,
    pub shape: TypeShape,
}

impl Param {
    pub fn new(name: &str, shape: TypeShape) -> Self {
        Self {
            name: name.to_string(),
            shape,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub results: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(default = "default_true")]
    pub exported: bool,
    pub shape: TypeShape,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructDecl {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub methods: Vec<FuncDecl>,
    /// Package-level functions returning this struct
    #[serde(default)]
    pub ctors: Vec<FuncDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarDecl {
    pub id: String,
    pub name: String,
    pub shape: TypeShape,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstDecl {
    pub id: String,
    pub name: String,
    pub shape: TypeShape,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub package: PackageInfo,
    #[serde(default)]
    pub structs: Vec<StructDecl>,
    #[serde(default)]
    pub funcs: Vec<FuncDecl>,
    #[serde(default)]
    pub consts: Vec<ConstDecl>,
    #[serde(default)]
    pub vars: Vec<VarDecl>,
}

fn default_true() -> bool { true }

impl Catalog {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            package: PackageInfo {
                name: name.to_string(),
                path: path.to_string(),
            },
            structs: Vec::new(),
            funcs: Vec::new(),
            consts: Vec::new(),
            vars: Vec::new(),
        }
    }

    /// Load a catalog, picking the format from the extension (`.toml` or JSON)
    pub fn load(path: &Path) -> Result<Self, BindError> {
        let content = fs::read_to_string(path).map_err(|e| BindError::Catalog {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let parsed = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        };
        parsed.map_err(|err| match err {
            BindError::Catalog { reason, .. } => BindError::Catalog {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self, BindError> {
        serde_json::from_str(content).map_err(|e| BindError::Catalog {
            path: "<json>".to_string(),
            reason: e.to_string(),
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, BindError> {
        toml::from_str(content).map_err(|e| BindError::Catalog {
            path: "<toml>".to_string(),
            reason: e.to_string(),
        })
    }

    /// Every exposed declaration, in emission order
    pub fn binding_units(&self) -> Vec<BindingUnit<'_>> {
        let mut units = Vec::new();

        for s in &self.structs {
            for (index, field) in s.fields.iter().enumerate() {
                if !field.exported {
                    continue;
                }
                for is_getter in [true, false] {
                    units.push(BindingUnit::FieldAccessor {
                        structure: s,
                        field_index: index,
                        is_getter,
                    });
                }
            }
            for m in &s.methods {
                units.push(BindingUnit::Method {
                    receiver: s,
                    method: m,
                });
            }
            units.push(BindingUnit::StructConstructor(s));
        }

        // Declared constructors are exposed at package level
        for s in &self.structs {
            units.extend(s.ctors.iter().map(BindingUnit::Function));
        }
        units.extend(self.funcs.iter().map(BindingUnit::Function));
        units.extend(self.consts.iter().map(BindingUnit::ConstantAccessor));

        for v in &self.vars {
            for is_getter in [true, false] {
                units.push(BindingUnit::VariableAccessor { var: v, is_getter });
            }
        }

        units
    }
}

/// Where a type appears within a binding unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteRole {
    Param { index: usize, name: String },
    Result { index: usize },
    Field { name: String },
    Variable,
    Constant,
}

impl std::fmt::Display for SiteRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Param { name, .. } if !name.is_empty() => write!(f, "parameter '{}'", name),
            Self::Param { index, .. } => write!(f, "parameter #{}", index + 1),
            Self::Result { index } => write!(f, "result #{}", index + 1),
            Self::Field { name } => write!(f, "field '{}'", name),
            Self::Variable => write!(f, "variable"),
            Self::Constant => write!(f, "constant"),
        }
    }
}

/// A type crossing the boundary at one position of a unit
#[derive(Debug, Clone)]
pub struct Site<'a> {
    pub role: SiteRole,
    pub shape: &'a TypeShape,
}

/// One exposed declaration
#[derive(Debug, Clone, Copy)]
pub enum BindingUnit<'a> {
    Function(&'a FuncDecl),
    Method {
        receiver: &'a StructDecl,
        method: &'a FuncDecl,
    },
    StructConstructor(&'a StructDecl),
    FieldAccessor {
        structure: &'a StructDecl,
        field_index: usize,
        is_getter: bool,
    },
    VariableAccessor {
        var: &'a VarDecl,
        is_getter: bool,
    },
    ConstantAccessor(&'a ConstDecl),
}

impl<'a> BindingUnit<'a> {
    /// Human-readable declaration name for diagnostics
    pub fn describe(&self, package: &str) -> String {
        match self {
            Self::Function(f) => format!("func {}.{}", package, f.name),
            Self::Method { receiver, method } => {
                format!("method {}.{}.{}", package, receiver.name, method.name)
            }
            Self::StructConstructor(s) => format!("constructor of {}.{}", package, s.name),
            Self::FieldAccessor {
                structure,
                field_index,
                is_getter,
            } => {
                let field = &structure.fields[*field_index];
                let kind = if *is_getter { "getter" } else { "setter" };
                format!("{} of field {}.{}.{}", kind, package, structure.name, field.name)
            }
            Self::VariableAccessor { var, is_getter } => {
                let kind = if *is_getter { "getter" } else { "setter" };
                format!("{} of var {}.{}", kind, package, var.name)
            }
            Self::ConstantAccessor(c) => format!("const {}.{}", package, c.name),
        }
    }

    /// Every crossing type of this unit, parameters first
    pub fn sites(&self) -> Vec<Site<'a>> {
        match *self {
            Self::Function(f) | Self::Method { method: f, .. } => func_sites(f),
            Self::StructConstructor(_) => Vec::new(),
            Self::FieldAccessor {
                structure,
                field_index,
                ..
            } => {
                let field = &structure.fields[field_index];
                vec![Site {
                    role: SiteRole::Field {
                        name: field.name.clone(),
                    },
                    shape: &field.shape,
                }]
            }
            Self::VariableAccessor { var, .. } => vec![Site {
                role: SiteRole::Variable,
                shape: &var.shape,
            }],
            Self::ConstantAccessor(c) => vec![Site {
                role: SiteRole::Constant,
                shape: &c.shape,
            }],
        }
    }
}

fn func_sites(f: &FuncDecl) -> Vec<Site<'_>> {
    let params = f.params.iter().enumerate().map(|(index, p)| Site {
        role: SiteRole::Param {
            index,
            name: p.name.clone(),
        },
        shape: &p.shape,
    });
    let results = f.results.iter().enumerate().map(|(index, r)| Site {
        role: SiteRole::Result { index },
        shape: &r.shape,
    });
    params.chain(results).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::BasicKind;

    fn sample() -> Catalog {
        let mut catalog = Catalog::new("shapes", "example.com/shapes");
        catalog.structs.push(StructDecl {
            id: "shapes_S".to_string(),
            name: "S".to_string(),
            fields: vec![
                FieldDecl {
                    name: "F".to_string(),
                    exported: true,
                    shape: TypeShape::basic(BasicKind::Int64),
                },
                FieldDecl {
                    name: "hidden".to_string(),
                    exported: false,
                    shape: TypeShape::basic(BasicKind::Int64),
                },
            ],
            methods: vec![FuncDecl {
                id: "shapes_S_Len".to_string(),
                name: "Len".to_string(),
                params: Vec::new(),
                results: vec![Param::new("", TypeShape::basic(BasicKind::Int))],
            }],
            ctors: Vec::new(),
        });
        catalog.vars.push(VarDecl {
            id: "shapes_Origin".to_string(),
            name: "Origin".to_string(),
            shape: TypeShape::named_struct("shapes", "S"),
        });
        catalog
    }

    #[test]
    fn test_units_skip_unexported_fields() {
        let catalog = sample();
        let units = catalog.binding_units();

        let accessors = units
            .iter()
            .filter(|u| matches!(u, BindingUnit::FieldAccessor { .. }))
            .count();
        assert_eq!(accessors, 2);
        // getter, setter, method, constructor, var getter, var setter
        assert_eq!(units.len(), 6);
    }

    #[test]
    fn test_describe_names_declaration() {
        let catalog = sample();
        let units = catalog.binding_units();
        assert_eq!(units[0].describe("shapes"), "getter of field shapes.S.F");
        assert_eq!(units[2].describe("shapes"), "method shapes.S.Len");
        assert_eq!(units[3].describe("shapes"), "constructor of shapes.S");
    }

    #[test]
    fn test_json_roundtrip_shape() {
        let catalog = sample();
        let json = serde_json::to_string(&catalog).unwrap();
        let back = Catalog::from_json_str(&json).unwrap();
        assert_eq!(back, catalog);
    }

    #[test]
    fn test_bad_catalog_reports_error() {
        let err = Catalog::from_json_str("{\"package\": 3}").unwrap_err();
        assert!(matches!(err, BindError::Catalog { .. }));
    }
}
