//! Core data model
//!
//! Type shapes as the catalog builder reports them, the structural
//! descriptors derived from them, and the declaration catalog itself.

pub mod catalog;
pub mod types;

pub use catalog::{
    BindingUnit, Catalog, ConstDecl, FieldDecl, FuncDecl, PackageInfo, Param, Site, SiteRole,
    StructDecl, VarDecl,
};
pub use types::{BasicKind, ShapeField, TypeDescriptor, TypePath, TypeShape};
