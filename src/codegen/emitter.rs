//! Binding emitter - turns a catalog into wrapper source
//!
//! Design: every binding unit is classified before anything is printed. A
//! unit with any unclassifiable site is skipped whole and its errors are
//! collected; the walk always covers the full catalog so one run reports
//! every incompatibility.
//!
//! The acquire call only ever appears where a handle result is returned to
//! the foreign side. Arguments and setters resolve, they never acquire or
//! release.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, info_span};

use super::naming::{host_ident, param_idents, SymbolScheme};
use super::printer::Printer;
use super::render::Renderer;
use crate::analysis::{Decision, WrapTable};
use crate::core::{BindingUnit, Catalog, FuncDecl, SiteRole, StructDecl, TypeDescriptor};
use crate::errors::{BindError, ErrorCollector, ErrorList};
use crate::frontend::BindConfig;

/// Result of one generation run
#[derive(Debug, Clone)]
pub struct Generated {
    /// Wrapper source; complete even when some units were skipped
    pub source: String,
    pub errors: ErrorList,
    pub emitted_units: usize,
    pub skipped_units: usize,
    /// Errors past the configured cap, counted but not kept
    pub dropped_errors: usize,
}

impl Generated {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// The source, or every collected error
    pub fn into_result(self) -> Result<String, ErrorList> {
        if self.errors.is_empty() {
            Ok(self.source)
        } else {
            Err(self.errors)
        }
    }
}

/// Generate wrappers for every declaration in `catalog`.
pub fn generate(catalog: &Catalog, config: &BindConfig) -> Generated {
    let span = info_span!("generate", package = %catalog.package.name);
    let _enter = span.enter();

    let generated = BindingEmitter::new(catalog, config).run();

    info!(
        emitted = generated.emitted_units,
        skipped = generated.skipped_units,
        errors = generated.errors.len() + generated.dropped_errors,
        "generation finished"
    );
    generated
}

/// Which side of an accessor pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Get,
    Set,
}

impl Access {
    fn of(is_getter: bool) -> Self {
        if is_getter {
            Self::Get
        } else {
            Self::Set
        }
    }
}

pub struct BindingEmitter<'c> {
    catalog: &'c Catalog,
    config: &'c BindConfig,
    symbols: SymbolScheme<'c>,
    render: Renderer<'c>,
    table: WrapTable,
    errors: ErrorCollector,
    /// Exported function symbol -> declaration that claimed it
    exported: HashMap<String, String>,
    /// Generated type names (handle aliases, result carriers)
    types: HashMap<String, String>,
    aliased: HashSet<&'c str>,
    out: Printer,
    emitted: usize,
    skipped: usize,
}

impl<'c> BindingEmitter<'c> {
    pub fn new(catalog: &'c Catalog, config: &'c BindConfig) -> Self {
        let package = catalog.package.name.as_str();
        Self {
            catalog,
            config,
            symbols: SymbolScheme::new(&config.output.symbol_prefix),
            render: Renderer::new(package, config.host_crate(package)),
            table: WrapTable::new(),
            errors: ErrorCollector::with_max(config.errors.max_errors),
            exported: HashMap::new(),
            types: HashMap::new(),
            aliased: HashSet::new(),
            out: Printer::new(),
            emitted: 0,
            skipped: 0,
        }
    }

    pub fn run(mut self) -> Generated {
        self.emit_preamble();

        let catalog = self.catalog;
        for unit in catalog.binding_units() {
            if let Some(structure) = owning_struct(&unit) {
                self.emit_struct_alias(structure);
            }
            self.emit_unit(unit);
        }

        debug!(distinct_types = self.table.distinct(), "wrap decisions");
        let dropped_errors = self.errors.dropped();
        Generated {
            source: self.out.finish(),
            errors: self.errors.into_list(),
            emitted_units: self.emitted,
            skipped_units: self.skipped,
            dropped_errors,
        }
    }

    fn emit_preamble(&mut self) {
        let package = &self.catalog.package;
        let runtime = &self.config.output.runtime_crate;

        let origin = if package.path.is_empty() {
            package.name.clone()
        } else {
            format!("{} ({})", package.name, package.path)
        };
        self.out.line(&format!(
            "// Code generated by pinbridge for package {}. DO NOT EDIT.",
            origin
        ));
        self.out.blank();
        self.out.line(
            "#![allow(non_snake_case, non_camel_case_types, unused_imports, unused_unsafe, clippy::all)]",
        );
        self.out.blank();
        self.out.line("use std::os::raw::c_char;");
        self.out.blank();
        self.out.line(&format!(
            "use {}::{{ffi, host_ref, registry, Handle, HostRef}};",
            runtime
        ));

        if self.config.output.emit_init {
            let symbol = self.symbols.init();
            self.exported.insert(symbol.clone(), "init entry".to_string());
            self.out.blank();
            self.out.line(&format!(
                "/// {} must run before any other wrapper in this library.",
                symbol
            ));
            self.out.line("#[no_mangle]");
            self.out.line(&format!("pub extern \"C\" fn {}() {{", symbol));
            self.out.indent();
            self.out.line(&format!("{}::init();", runtime));
            self.out.outdent();
            self.out.line("}");
        }
    }

    fn emit_struct_alias(&mut self, structure: &'c StructDecl) {
        if !self.aliased.insert(structure.id.as_str()) {
            return;
        }
        let decl = format!("struct {}.{}", self.catalog.package.name, structure.name);
        let alias = self.symbols.struct_handle(structure);
        if let Err(err) = self.claim_type(&alias, &decl) {
            self.errors.add(err);
            return;
        }
        self.out.blank();
        self.out.line(&format!(
            "/// Handle to a {}.",
            self.render.host_item(&structure.name)
        ));
        self.out.line(&format!("pub type {} = Handle;", alias));
    }

    fn emit_unit(&mut self, unit: BindingUnit<'c>) {
        let decl = unit.describe(&self.catalog.package.name);
        let symbol = self.symbols.unit(&unit);

        let decisions = match self.classify_unit(&unit, &decl) {
            Some(decisions) => decisions,
            None => {
                self.skip(&decl, "unclassifiable type");
                return;
            }
        };

        if let Err(err) = self.claim_symbol(&symbol, &decl) {
            self.errors.add(err);
            self.skip(&decl, "duplicate symbol");
            return;
        }

        match unit {
            BindingUnit::Function(f) => self.emit_function(&symbol, f, None, &decisions, &decl),
            BindingUnit::Method { receiver, method } => {
                self.emit_function(&symbol, method, Some(receiver), &decisions, &decl)
            }
            BindingUnit::StructConstructor(s) => self.emit_constructor(&symbol, s),
            BindingUnit::FieldAccessor {
                structure,
                field_index,
                is_getter,
            } => self.emit_field_accessor(
                &symbol,
                structure,
                &structure.fields[field_index].name,
                Access::of(is_getter),
                &decisions[0],
            ),
            BindingUnit::VariableAccessor { var, is_getter } => {
                self.emit_variable_accessor(&symbol, &var.name, Access::of(is_getter), &decisions[0])
            }
            BindingUnit::ConstantAccessor(c) => self.emit_constant(&symbol, &c.name, &decisions[0]),
        }

        self.emitted += 1;
        debug!(decl = %decl, symbol = %symbol, "emitted");
    }

    /// Decide every site of `unit`, recording an error for each failure.
    fn classify_unit(&mut self, unit: &BindingUnit<'c>, decl: &str) -> Option<Vec<Decision>> {
        let mut decisions = Vec::new();
        let mut failed = false;

        for site in unit.sites() {
            let decided = match site.role {
                SiteRole::Constant => self.table.decide_constant(site.shape),
                SiteRole::Param { .. }
                | SiteRole::Result { .. }
                | SiteRole::Field { .. }
                | SiteRole::Variable => self.table.decide(site.shape),
            };
            match decided {
                Ok(decision) => decisions.push(decision),
                Err(unclassifiable) => {
                    failed = true;
                    let err = match site.role {
                        SiteRole::Constant => BindError::UnclassifiableConstant {
                            decl: decl.to_string(),
                            shape: site.shape.to_string(),
                        },
                        _ => BindError::Unclassifiable {
                            decl: decl.to_string(),
                            site: site.role.to_string(),
                            shape: unclassifiable.to_string(),
                        },
                    };
                    self.errors.add(err);
                }
            }
        }

        (!failed).then_some(decisions)
    }

    fn claim_symbol(&mut self, symbol: &str, decl: &str) -> Result<(), BindError> {
        claim(&mut self.exported, symbol, decl)
    }

    fn claim_type(&mut self, name: &str, decl: &str) -> Result<(), BindError> {
        claim(&mut self.types, name, decl)
    }

    fn skip(&mut self, decl: &str, reason: &str) {
        self.skipped += 1;
        debug!(decl = %decl, reason, "skipped");
    }

    fn begin_wrapper(&mut self, symbol: &str, doc: &str, params: &[String], ret: Option<&str>) {
        self.out.blank();
        self.out.line(&format!("/// {} wraps {}.", symbol, doc));
        self.out.line("#[no_mangle]");
        let ret = ret.map(|r| format!(" -> {}", r)).unwrap_or_default();
        self.out.line(&format!(
            "pub extern \"C\" fn {}({}){} {{",
            symbol,
            params.join(", "),
            ret
        ));
        self.out.indent();
    }

    fn end_wrapper(&mut self) {
        self.out.outdent();
        self.out.line("}");
    }

    fn emit_function(
        &mut self,
        symbol: &str,
        f: &FuncDecl,
        receiver: Option<&StructDecl>,
        decisions: &[Decision],
        decl: &str,
    ) {
        let (param_decisions, result_decisions) = decisions.split_at(f.params.len());

        let result_temps: Vec<String> = (0..f.results.len()).map(|i| format!("_r{}", i)).collect();
        let mut reserved: Vec<&str> = result_temps.iter().map(String::as_str).collect();
        if receiver.is_some() {
            reserved.extend(["self_", "recv"]);
        }
        let idents = param_idents(f.params.iter().map(|p| p.name.as_str()), &reserved);

        let mut params = Vec::new();
        if receiver.is_some() {
            params.push("self_: Handle".to_string());
        }
        for (ident, decision) in idents.iter().zip(param_decisions) {
            params.push(format!("{}: {}", ident, self.render.param_type(decision)));
        }

        let carrier = (f.results.len() > 1).then(|| self.symbols.results_struct(symbol));
        if let Some(carrier) = &carrier {
            if let Err(err) = self.claim_type(carrier, decl) {
                // The wrapper itself is already claimed; report and keep going.
                self.errors.add(err);
            }
            self.emit_results_struct(carrier, result_decisions);
        }

        let ret = match (result_decisions, &carrier) {
            ([], _) => None,
            ([single], None) => Some(self.render.result_type(single)),
            (_, Some(carrier)) => Some(carrier.clone()),
            (_, None) => None,
        };

        let doc = match receiver {
            Some(s) => format!("{}::{}", self.render.host_item(&s.name), f.name),
            None => self.render.host_item(&f.name),
        };
        self.begin_wrapper(symbol, &doc, &params, ret.as_deref());

        if let Some(s) = receiver {
            self.out.line(&format!(
                "let recv = registry().resolve::<{}>(self_);",
                self.render.host_item(&s.name)
            ));
        }
        for (ident, decision) in idents.iter().zip(param_decisions) {
            if let Some(lowered) = self.render.lower(ident, decision) {
                self.out.line(&format!("let {} = {};", ident, lowered));
            }
        }

        // Methods get the shared receiver, not a guard: the host locks as it
        // needs, so the receiver may also arrive as an argument.
        let (callee, mut args) = match receiver {
            Some(s) => (
                format!("{}::{}", self.render.host_item(&s.name), host_ident(&f.name)),
                vec!["&recv".to_string()],
            ),
            None => (self.render.host_item(&f.name), Vec::new()),
        };
        args.extend(idents.iter().cloned());
        let call = format!("{}({})", callee, args.join(", "));

        match result_temps.as_slice() {
            [] => self.out.line(&format!("{};", call)),
            [only] => {
                self.out.line(&format!("let {} = {};", only, call));
                let raised = self.render.raise(only, &result_decisions[0]);
                self.out.line(&raised);
            }
            temps => {
                self.out
                    .line(&format!("let ({}) = {};", temps.join(", "), call));
                let mut fields = Vec::new();
                for (i, (temp, decision)) in temps.iter().zip(result_decisions).enumerate() {
                    self.out.line(&format!(
                        "let r{} = {};",
                        i,
                        self.render.raise(temp, decision)
                    ));
                    fields.push(format!("r{}", i));
                }
                if let Some(carrier) = &carrier {
                    self.out
                        .line(&format!("{} {{ {} }}", carrier, fields.join(", ")));
                }
            }
        }

        self.end_wrapper();
    }

    fn emit_results_struct(&mut self, name: &str, decisions: &[Decision]) {
        self.out.blank();
        self.out.line("#[repr(C)]");
        self.out.line(&format!("pub struct {} {{", name));
        self.out.indent();
        for (i, decision) in decisions.iter().enumerate() {
            self.out
                .line(&format!("pub r{}: {},", i, self.render.result_type(decision)));
        }
        self.out.outdent();
        self.out.line("}");
    }

    fn emit_constructor(&mut self, symbol: &str, s: &StructDecl) {
        let host = self.render.host_item(&s.name);
        self.begin_wrapper(symbol, &format!("{}::default", host), &[], Some("Handle"));
        self.out.line(&format!(
            "let obj: HostRef<{}> = host_ref({}::default());",
            host, host
        ));
        self.out.line("registry().wrap(obj)");
        self.end_wrapper();
    }

    fn emit_field_accessor(
        &mut self,
        symbol: &str,
        s: &StructDecl,
        field: &str,
        access: Access,
        decision: &Decision,
    ) {
        let host = self.render.host_item(&s.name);
        let member = host_ident(field);
        let doc = format!("{}.{}", host, member);

        match access {
            Access::Get => {
                let ret = self.render.result_type(decision);
                self.begin_wrapper(symbol, &doc, &["self_: Handle".to_string()], Some(ret.as_str()));
                self.out
                    .line(&format!("let recv = registry().resolve::<{}>(self_);", host));
                self.out
                    .line(&format!("let ret = recv.read().{}.clone();", member));
                let raised = self.render.raise("ret", decision);
                self.out.line(&raised);
            }
            Access::Set => {
                let params = vec![
                    "self_: Handle".to_string(),
                    format!("val: {}", self.render.param_type(decision)),
                ];
                self.begin_wrapper(symbol, &doc, &params, None);
                self.out
                    .line(&format!("let recv = registry().resolve::<{}>(self_);", host));
                if let Some(lowered) = self.render.lower("val", decision) {
                    self.out.line(&format!("let val = {};", lowered));
                }
                self.out.line(&format!("recv.write().{} = val;", member));
            }
        }

        self.end_wrapper();
    }

    fn emit_variable_accessor(&mut self, symbol: &str, name: &str, access: Access, decision: &Decision) {
        let host = self.render.host_item(name);

        match access {
            Access::Get => {
                let ret = self.render.result_type(decision);
                self.begin_wrapper(symbol, &host, &[], Some(ret.as_str()));
                self.out.line(&format!("let ret = {}.read().clone();", host));
                let raised = self.render.raise("ret", decision);
                self.out.line(&raised);
            }
            Access::Set => {
                let params = vec![format!("val: {}", self.render.param_type(decision))];
                self.begin_wrapper(symbol, &host, &params, None);
                if let Some(lowered) = self.render.lower("val", decision) {
                    self.out.line(&format!("let val = {};", lowered));
                }
                self.out.line(&format!("*{}.write() = val;", host));
            }
        }

        self.end_wrapper();
    }

    fn emit_constant(&mut self, symbol: &str, name: &str, decision: &Decision) {
        let host = self.render.host_item(name);
        let ret = self.render.result_type(decision);
        self.begin_wrapper(symbol, &host, &[], Some(ret.as_str()));

        let value = match &decision.descriptor {
            TypeDescriptor::Primitive { kind, .. } if kind.is_string() => {
                format!("String::from({})", host)
            }
            _ => host,
        };
        let raised = self.render.raise(&value, decision);
        self.out.line(&raised);
        self.end_wrapper();
    }
}

fn claim(names: &mut HashMap<String, String>, name: &str, decl: &str) -> Result<(), BindError> {
    match names.get(name) {
        Some(previous) => Err(BindError::DuplicateSymbol {
            decl: decl.to_string(),
            symbol: name.to_string(),
            previous: previous.clone(),
        }),
        None => {
            names.insert(name.to_string(), decl.to_string());
            Ok(())
        }
    }
}

fn owning_struct<'c>(unit: &BindingUnit<'c>) -> Option<&'c StructDecl> {
    match *unit {
        BindingUnit::Method { receiver, .. } => Some(receiver),
        BindingUnit::StructConstructor(s) => Some(s),
        BindingUnit::FieldAccessor { structure, .. } => Some(structure),
        BindingUnit::Function(_)
        | BindingUnit::VariableAccessor { .. }
        | BindingUnit::ConstantAccessor(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BasicKind, FieldDecl, Param, TypeShape, VarDecl};

    fn int() -> TypeShape {
        TypeShape::basic(BasicKind::Int)
    }

    fn func(id: &str, name: &str, params: Vec<Param>, results: Vec<Param>) -> FuncDecl {
        FuncDecl {
            id: id.to_string(),
            name: name.to_string(),
            params,
            results,
        }
    }

    /// Text of the wrapper named `symbol`, from its doc line to the closing brace
    fn wrapper<'s>(source: &'s str, symbol: &str) -> &'s str {
        let marker = format!("pub extern \"C\" fn {}(", symbol);
        let start = source
            .find(&marker)
            .unwrap_or_else(|| panic!("no wrapper {symbol} in:\n{source}"));
        let end = source[start..].find("\n}\n").map(|i| start + i + 3).unwrap();
        &source[start..end]
    }

    #[test]
    fn test_method_resolves_receiver_and_acquires_result() {
        let mut catalog = Catalog::new("shapes", "");
        catalog.structs.push(StructDecl {
            id: "shapes_S".to_string(),
            name: "S".to_string(),
            fields: Vec::new(),
            methods: vec![func(
                "shapes_S_Child",
                "Child",
                vec![Param::new("other", TypeShape::pointer(TypeShape::named_struct("shapes", "S")))],
                vec![Param::new("", TypeShape::pointer(TypeShape::named_struct("shapes", "S")))],
            )],
            ctors: Vec::new(),
        });

        let generated = generate(&catalog, &BindConfig::default());
        assert!(generated.is_clean(), "{}", generated.errors);

        let body = wrapper(&generated.source, "Bridge_shapes_S_Child");
        assert!(body.contains("(self_: Handle, other: Handle) -> Handle"));
        assert!(body.contains("let recv = registry().resolve::<shapes::S>(self_);"));
        assert!(body.contains("let other = registry().resolve::<shapes::S>(other);"));
        assert!(body.contains("let _r0 = shapes::S::Child(&recv, other);"));
        assert!(!body.contains("recv.write()"));
        assert_eq!(body.matches("registry().wrap(").count(), 1);
    }

    #[test]
    fn test_multi_result_uses_carrier() {
        let mut catalog = Catalog::new("calc", "");
        catalog.funcs.push(func(
            "calc_Div",
            "Div",
            vec![Param::new("a", int()), Param::new("b", int())],
            vec![Param::new("", int()), Param::new("", TypeShape::error())],
        ));

        let source = generate(&catalog, &BindConfig::default()).into_result().unwrap();
        assert!(source.contains("#[repr(C)]\npub struct Bridge_calc_Div_Result {"));
        assert!(source.contains("    pub r0: isize,\n    pub r1: *mut c_char,\n"));

        let body = wrapper(&source, "Bridge_calc_Div");
        assert!(body.contains("let (_r0, _r1) = calc::Div(a, b);"));
        assert!(body.contains("let r1 = ffi::error_into_raw(_r1);"));
        assert!(body.contains("Bridge_calc_Div_Result { r0, r1 }"));
    }

    #[test]
    fn test_setter_never_acquires() {
        let mut catalog = Catalog::new("shapes", "");
        catalog.structs.push(StructDecl {
            id: "shapes_S".to_string(),
            name: "S".to_string(),
            fields: vec![FieldDecl {
                name: "P".to_string(),
                exported: true,
                shape: TypeShape::pointer(TypeShape::named_struct("shapes", "T")),
            }],
            methods: Vec::new(),
            ctors: Vec::new(),
        });

        let source = generate(&catalog, &BindConfig::default()).source;
        let setter = wrapper(&source, "Bridge_shapes_S_setter_1");
        assert!(setter.contains("let val = registry().resolve::<shapes::T>(val);"));
        assert!(setter.contains("recv.write().P = val;"));
        assert!(!setter.contains("registry().wrap("));

        let getter = wrapper(&source, "Bridge_shapes_S_getter_1");
        assert!(getter.contains("registry().wrap(ret)"));
    }

    #[test]
    fn test_duplicate_symbol_skips_later_unit() {
        let mut catalog = Catalog::new("p", "");
        catalog.funcs.push(func("p_F", "F", Vec::new(), Vec::new()));
        catalog.funcs.push(func("p_F", "G", Vec::new(), Vec::new()));

        let generated = generate(&catalog, &BindConfig::default());
        assert_eq!(generated.emitted_units, 1);
        assert_eq!(generated.skipped_units, 1);
        match &generated.errors.errors()[0] {
            BindError::DuplicateSymbol { decl, previous, .. } => {
                assert_eq!(decl, "func p.G");
                assert_eq!(previous, "func p.F");
            }
            other => panic!("unexpected error {other}"),
        }
        assert!(!generated.source.contains("p::G("));
    }

    #[test]
    fn test_variable_accessors_and_constant() {
        let mut catalog = Catalog::new("cfg", "");
        catalog.vars.push(VarDecl {
            id: "cfg_Name".to_string(),
            name: "Name".to_string(),
            shape: TypeShape::basic(BasicKind::String),
        });
        catalog.consts.push(crate::core::ConstDecl {
            id: "cfg_Version".to_string(),
            name: "Version".to_string(),
            shape: TypeShape::basic(BasicKind::String),
        });

        let source = generate(&catalog, &BindConfig::default()).into_result().unwrap();
        let get = wrapper(&source, "Bridge_get_cfg_Name");
        assert!(get.contains("let ret = cfg::Name.read().clone();"));
        assert!(get.contains("ffi::string_into_raw(ret)"));

        let set = wrapper(&source, "Bridge_set_cfg_Name");
        assert!(set.contains("(val: *const c_char)"));
        assert!(set.contains("*cfg::Name.write() = val;"));

        let constant = wrapper(&source, "Bridge_get_cfg_Version");
        assert!(constant.contains("ffi::string_into_raw(String::from(cfg::Version))"));
    }

    #[test]
    fn test_error_field_and_variable_cross_by_value() {
        let mut catalog = Catalog::new("io2", "");
        catalog.structs.push(StructDecl {
            id: "io2_Job".to_string(),
            name: "Job".to_string(),
            fields: vec![FieldDecl {
                name: "Err".to_string(),
                exported: true,
                shape: TypeShape::error(),
            }],
            methods: Vec::new(),
            ctors: Vec::new(),
        });
        catalog.vars.push(VarDecl {
            id: "io2_EOF".to_string(),
            name: "EOF".to_string(),
            shape: TypeShape::error(),
        });

        let source = generate(&catalog, &BindConfig::default()).into_result().unwrap();

        let getter = wrapper(&source, "Bridge_io2_Job_getter_1");
        assert!(getter.contains("(self_: Handle) -> *mut c_char"));
        assert!(getter.contains("ffi::error_into_raw(ret)"));
        let setter = wrapper(&source, "Bridge_io2_Job_setter_1");
        assert!(setter.contains("let val = unsafe { ffi::error_from_raw(val) };"));

        let var = wrapper(&source, "Bridge_get_io2_EOF");
        assert!(var.contains("let ret = io2::EOF.read().clone();"));
        assert!(var.contains("ffi::error_into_raw(ret)"));
        // Only the constructor acquires
        assert_eq!(source.matches("registry().wrap(").count(), 1);
    }

    #[test]
    fn test_no_init_when_disabled() {
        let mut config = BindConfig::default();
        config.output.emit_init = false;
        let source = generate(&Catalog::new("p", ""), &config).source;
        assert!(!source.contains("Bridge_init"));
        assert!(source.starts_with("// Code generated by pinbridge for package p. DO NOT EDIT."));
    }
}
