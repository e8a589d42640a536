use serde::{Deserialize, Serialize};
use std::fmt;

/// Basic (predeclared) kinds that cross the boundary by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    String,
}

impl BasicKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uintptr => "uintptr",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::String => "string",
        }
    }

    /// Scalar type used on both sides of the C ABI (strings excluded).
    pub fn rust_scalar(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "isize",
            Self::Int8 => "i8",
            Self::Int16 => "i16",
            Self::Int32 => "i32",
            Self::Int64 => "i64",
            Self::Uint | Self::Uintptr => "usize",
            Self::Uint8 => "u8",
            Self::Uint16 => "u16",
            Self::Uint32 => "u32",
            Self::Uint64 => "u64",
            Self::Float32 => "f32",
            Self::Float64 => "f64",
            Self::String => "String",
        }
    }

    pub fn is_string(self) -> bool {
        matches!(self, Self::String)
    }
}

impl fmt::Display for BasicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field of an unnamed struct shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeField {
    pub name: String,
    pub shape: TypeShape,
}

/// Raw structural shape of a type, as reported by the catalog builder.
///
/// A `Named` type referenced from inside another declaration may carry a
/// shallow underlying shape (e.g. a struct with no fields listed); only the
/// kind of the underlying shape matters for classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeShape {
    Basic(BasicKind),
    Named {
        #[serde(default)]
        package: Option<String>,
        name: String,
        underlying: Box<TypeShape>,
    },
    Pointer(Box<TypeShape>),
    Struct {
        #[serde(default)]
        fields: Vec<ShapeField>,
    },
    Interface {
        #[serde(default)]
        methods: Vec<String>,
    },
    Slice(Box<TypeShape>),
    Array {
        len: u64,
        elem: Box<TypeShape>,
    },
    Map {
        key: Box<TypeShape>,
        value: Box<TypeShape>,
    },
    Func {
        #[serde(default)]
        params: Vec<TypeShape>,
        #[serde(default)]
        results: Vec<TypeShape>,
    },
    Chan(Box<TypeShape>),
}

impl TypeShape {
    pub fn basic(kind: BasicKind) -> Self {
        Self::Basic(kind)
    }

    pub fn named(package: Option<&str>, name: &str, underlying: TypeShape) -> Self {
        Self::Named {
            package: package.map(str::to_string),
            name: name.to_string(),
            underlying: Box::new(underlying),
        }
    }

    pub fn named_struct(package: &str, name: &str) -> Self {
        Self::named(Some(package), name, Self::Struct { fields: Vec::new() })
    }

    pub fn named_interface(package: &str, name: &str) -> Self {
        Self::named(Some(package), name, Self::Interface { methods: Vec::new() })
    }

    /// The predeclared `error` interface.
    pub fn error() -> Self {
        Self::named(
            None,
            "error",
            Self::Interface {
                methods: vec!["Error() string".to_string()],
            },
        )
    }

    pub fn pointer(inner: TypeShape) -> Self {
        Self::Pointer(Box::new(inner))
    }

    pub fn slice(elem: TypeShape) -> Self {
        Self::Slice(Box::new(elem))
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic(kind) => write!(f, "{}", kind),
            Self::Named { package: Some(pkg), name, .. } => write!(f, "{}.{}", pkg, name),
            Self::Named { package: None, name, .. } => write!(f, "{}", name),
            Self::Pointer(inner) => write!(f, "*{}", inner),
            Self::Struct { fields } => {
                write!(f, "struct{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{} {}", field.name, field.shape)?;
                }
                write!(f, "}}")
            }
            Self::Interface { methods } => write!(f, "interface{{{}}}", methods.join("; ")),
            Self::Slice(elem) => write!(f, "[]{}", elem),
            Self::Array { len, elem } => write!(f, "[{}]{}", len, elem),
            Self::Map { key, value } => write!(f, "map[{}]{}", key, value),
            Self::Func { params, results } => {
                let params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
                let results: Vec<String> = results.iter().map(|r| r.to_string()).collect();
                match results.len() {
                    0 => write!(f, "func({})", params.join(", ")),
                    1 => write!(f, "func({}) {}", params.join(", "), results[0]),
                    _ => write!(f, "func({}) ({})", params.join(", "), results.join(", ")),
                }
            }
            Self::Chan(elem) => write!(f, "chan {}", elem),
        }
    }
}

/// Qualified name of a named host type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypePath {
    pub package: Option<String>,
    pub name: String,
}

impl TypePath {
    pub fn new(package: Option<&str>, name: &str) -> Self {
        Self {
            package: package.map(str::to_string),
            name: name.to_string(),
        }
    }

    /// Path of the type inside the host crate, e.g. `shapes::Point`.
    pub fn rust_path(&self) -> String {
        match &self.package {
            Some(pkg) => format!("{}::{}", pkg.replace(['/', '.', '-'], "_"), self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.package {
            Some(pkg) => write!(f, "{}.{}", pkg, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Structural classification input, derived from a [`TypeShape`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// Basic kind, possibly behind a named type (`type Celsius float64`)
    Primitive {
        kind: BasicKind,
        path: Option<TypePath>,
    },
    /// Named type whose underlying shape is a struct, or a pointer to one
    NamedStruct { path: TypePath },
    Interface {
        path: Option<TypePath>,
        is_error_convention: bool,
    },
    Other { shape: TypeShape },
}

impl TypeDescriptor {
    /// Derive the descriptor from the underlying shape, never from the name.
    pub fn of(shape: &TypeShape) -> Self {
        match shape {
            TypeShape::Basic(kind) => Self::Primitive {
                kind: *kind,
                path: None,
            },
            TypeShape::Named {
                package,
                name,
                underlying,
            } => {
                let path = TypePath::new(package.as_deref(), name);
                match underlying.as_ref() {
                    TypeShape::Basic(kind) => Self::Primitive {
                        kind: *kind,
                        path: Some(path),
                    },
                    TypeShape::Struct { .. } => Self::NamedStruct { path },
                    TypeShape::Interface { .. } => Self::Interface {
                        is_error_convention: package.is_none() && name == "error",
                        path: Some(path),
                    },
                    TypeShape::Named { .. }
                    | TypeShape::Pointer(_)
                    | TypeShape::Slice(_)
                    | TypeShape::Array { .. }
                    | TypeShape::Map { .. }
                    | TypeShape::Func { .. }
                    | TypeShape::Chan(_) => Self::Other {
                        shape: shape.clone(),
                    },
                }
            }
            TypeShape::Pointer(inner) => match Self::of(inner) {
                named @ Self::NamedStruct { .. } => named,
                Self::Primitive { .. } | Self::Interface { .. } | Self::Other { .. } => {
                    Self::Other {
                        shape: shape.clone(),
                    }
                }
            },
            TypeShape::Interface { .. } => Self::Interface {
                path: None,
                is_error_convention: false,
            },
            TypeShape::Struct { .. }
            | TypeShape::Slice(_)
            | TypeShape::Array { .. }
            | TypeShape::Map { .. }
            | TypeShape::Func { .. }
            | TypeShape::Chan(_) => Self::Other {
                shape: shape.clone(),
            },
        }
    }

    /// Named host type a handle of this descriptor refers to.
    pub fn handle_target(&self) -> Option<&TypePath> {
        match self {
            Self::NamedStruct { path } => Some(path),
            Self::Interface { path, .. } => path.as_ref(),
            Self::Primitive { .. } | Self::Other { .. } => None,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive { kind, path: None } => write!(f, "{}", kind),
            Self::Primitive { kind, path: Some(path) } => write!(f, "{} ({})", path, kind),
            Self::NamedStruct { path } => write!(f, "{} (struct)", path),
            Self::Interface { path: Some(path), .. } => write!(f, "{} (interface)", path),
            Self::Interface { path: None, .. } => write!(f, "interface{{...}}"),
            Self::Other { shape } => write!(f, "{}", shape),
        }
    }
}
