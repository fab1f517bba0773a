//! Interface method sets.
//!
//! Resolution walks the interface declaration and every embedded interface
//! depth-first. Method types are not copied: each one is kept as a
//! [`TypeRef`] pointing back into the arena together with the scope it was
//! written in, so the renderer can qualify names from the right imports.

use std::fmt;
use std::rc::Rc;

use goimpl_syntax::ast::{
    AstArena, CommentGroupId, FieldId, InterfaceElem, ListRef, Results, SignatureId, Symbol,
    Type, TypeId,
};
use goimpl_syntax::{parse_type, parse_type_list};
use tracing::{debug, trace};

use crate::error::{ImplError, Result};
use crate::loader::{Loader, PackageId, PackageSource, TypeDecl};
use crate::receiver::{is_identifier, ReceiverSpec};

/// Interface reference as given on the command line: `io.Reader`,
/// `golang.org/x/net/html.Node`, `Store`, `Container[int]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub package_path: Option<String>,
    pub identifier: String,
    /// Text between the brackets of an explicit instantiation.
    pub type_args: Option<String>,
}

impl QualifiedName {
    pub fn parse(input: &str) -> Result<Self> {
        let fail = |reason: &str| ImplError::invalid_interface(input, reason);
        let s = input.trim();

        let (base, type_args) = match s.find('[') {
            Some(open) => {
                let inner = s[open + 1..]
                    .strip_suffix(']')
                    .ok_or_else(|| fail("unterminated type argument list"))?
                    .trim();
                if inner.is_empty() {
                    return Err(fail("empty type argument list"));
                }
                (&s[..open], Some(inner.to_string()))
            }
            None => (s, None),
        };

        let (package_path, identifier) = match base.rsplit_once('.') {
            Some((path, ident)) => {
                if path.is_empty() {
                    return Err(fail("missing package path"));
                }
                (Some(path.to_string()), ident)
            }
            None => (None, base),
        };
        if !is_identifier(identifier) {
            return Err(fail("missing or invalid type name"));
        }

        Ok(Self {
            package_path,
            identifier: identifier.to_string(),
            type_args,
        })
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.package_path {
            write!(f, "{p}.")?;
        }
        f.write_str(&self.identifier)?;
        if let Some(args) = &self.type_args {
            write!(f, "[{args}]")?;
        }
        Ok(())
    }
}

/// Where a type expression was written.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    /// `None` for predeclared declarations.
    pub package: Option<PackageId>,
    /// Declaring file, whose imports qualify `pkg.Name` references. `None`
    /// searches every file of the package.
    pub file: Option<usize>,
    /// Type parameters in scope that render as written.
    pub type_params: Vec<Symbol>,
    /// Type parameters bound to arguments.
    pub subst: Vec<(Symbol, TypeRef)>,
}

impl Scope {
    pub fn binding(&self, name: Symbol) -> Option<&TypeRef> {
        self.subst.iter().find(|(s, _)| *s == name).map(|(_, t)| t)
    }

    pub fn is_type_param(&self, name: Symbol) -> bool {
        self.type_params.contains(&name)
    }
}

#[derive(Debug, Clone)]
pub struct TypeRef {
    pub ty: TypeId,
    pub scope: Rc<Scope>,
}

/// One entry of a parameter or result list, grouping kept.
#[derive(Debug, Clone)]
pub struct Param {
    /// Empty when anonymous.
    pub names: Vec<String>,
    pub ty: TypeRef,
    pub variadic: bool,
}

#[derive(Debug, Clone)]
pub struct MethodSignature {
    pub name: String,
    /// Type parameters of the interface the method set was resolved for.
    pub type_params: Vec<String>,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    /// Doc comment lines, markers included.
    pub doc: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InterfaceMethodSet {
    pub type_params: Vec<String>,
    pub methods: Vec<MethodSignature>,
}

impl InterfaceMethodSet {
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.methods.iter().map(|m| m.name.as_str())
    }
}

/// Resolves `iface` to its flattened method set.
///
/// Type parameters of the interface are bound to explicit type arguments
/// when given; otherwise to the receiver's type parameters when the counts
/// agree; otherwise they stay unbound.
pub fn resolve_interface<S: PackageSource>(
    loader: &mut Loader<S>,
    home: PackageId,
    iface: &QualifiedName,
    recv: &ReceiverSpec,
) -> Result<InterfaceMethodSet> {
    let mut pkg = match &iface.package_path {
        None => home,
        Some(q) => {
            let path = loader.resolve_qualifier(home, None, q);
            debug!(qualifier = %q, %path, "interface package");
            loader.load_import(&path)?
        }
    };

    if iface.package_path.is_none() {
        let sym = loader.arena.symbols.get(&iface.identifier);
        if !sym.is_some_and(|sym| loader.package(home).declares(sym)) {
            let dot = match sym {
                Some(sym) => loader.dot_import_declaring(home, None, sym)?,
                None => None,
            };
            match dot {
                Some(path) => pkg = loader.load_import(&path)?,
                None => return universe_interface(loader, home, iface),
            }
        }
    }

    let decl = lookup(loader, pkg, &iface.identifier)?;
    let spec = loader.arena.type_specs[decl.spec];
    let params = loader.arena.type_param_names(spec.type_params);

    let home_scope = Scope {
        package: Some(home),
        ..Scope::default()
    };
    let args: Vec<TypeRef> = if let Some(text) = &iface.type_args {
        let ids = parse_type_list(&mut loader.arena, text).map_err(|f| {
            ImplError::invalid_interface(&iface.to_string(), f.to_string())
        })?;
        if ids.len() != params.len() {
            return Err(ImplError::invalid_interface(
                &iface.to_string(),
                format!(
                    "got {} type arguments, {} declares {}",
                    ids.len(),
                    iface.identifier,
                    params.len()
                ),
            ));
        }
        let scope = Rc::new(home_scope);
        ids.into_iter()
            .map(|ty| TypeRef {
                ty,
                scope: scope.clone(),
            })
            .collect()
    } else if !params.is_empty() && recv.type_params.len() == params.len() {
        let mut scope = home_scope;
        for name in recv.type_param_names() {
            let sym = loader.arena.intern(name);
            scope.type_params.push(sym);
        }
        let scope = Rc::new(scope);
        recv.type_param_names()
            .map(|name| {
                let ty = parse_type(&mut loader.arena, name).map_err(|f| {
                    ImplError::invalid_receiver(&recv.to_string(), f.to_string())
                })?;
                Ok(TypeRef {
                    ty,
                    scope: scope.clone(),
                })
            })
            .collect::<Result<_>>()?
    } else {
        if !params.is_empty() {
            debug!(interface = %iface, "type parameters left unbound");
        }
        Vec::new()
    };

    let type_params = params
        .iter()
        .map(|p| loader.arena.name(*p).to_string())
        .collect();

    let mut r = Resolver {
        loader,
        stack: Vec::new(),
        methods: Vec::new(),
        type_params,
    };
    let label = format!("{}.{}", r.loader.package(pkg).name, iface.identifier);
    r.declared(pkg, decl, &label, args)?;

    debug!(interface = %iface, methods = r.methods.len(), "resolved method set");
    Ok(InterfaceMethodSet {
        type_params: r.type_params,
        methods: r.methods,
    })
}

/// Method set of a predeclared identifier named as the interface.
fn universe_interface<S: PackageSource>(
    loader: &mut Loader<S>,
    home: PackageId,
    iface: &QualifiedName,
) -> Result<InterfaceMethodSet> {
    let scope = Scope {
        package: Some(home),
        ..Scope::default()
    };
    let mut r = Resolver {
        loader,
        stack: Vec::new(),
        methods: Vec::new(),
        type_params: Vec::new(),
    };
    r.predeclared(&iface.identifier, &iface.identifier, &scope)?;
    if iface.type_args.is_some() {
        return Err(ImplError::invalid_interface(
            &iface.to_string(),
            format!("{} has no type parameters", iface.identifier),
        ));
    }
    debug!(interface = %iface, methods = r.methods.len(), "resolved predeclared interface");
    Ok(InterfaceMethodSet {
        type_params: Vec::new(),
        methods: r.methods,
    })
}

fn lookup<S: PackageSource>(loader: &Loader<S>, pkg: PackageId, name: &str) -> Result<TypeDecl> {
    let package = loader.package(pkg);
    loader
        .arena
        .symbols
        .get(name)
        .and_then(|sym| package.lookup(sym))
        .ok_or_else(|| ImplError::Undeclared {
            name: name.to_string(),
            package: package.display_name().to_string(),
        })
}

/// Predeclared identifiers that name non-interface types.
pub(crate) const PREDECLARED_TYPES: [&str; 19] = [
    "bool",
    "byte",
    "complex64",
    "complex128",
    "float32",
    "float64",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "rune",
    "string",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
];

struct Resolver<'l, S> {
    loader: &'l mut Loader<S>,
    /// Declarations being expanded, with their display names.
    stack: Vec<(PackageId, TypeDecl, String)>,
    methods: Vec<MethodSignature>,
    type_params: Vec<String>,
}

impl<S: PackageSource> Resolver<'_, S> {
    fn arena(&self) -> &AstArena {
        &self.loader.arena
    }

    /// Expands the declaration `decl` of `pkg` with its type parameters bound
    /// to `args` (unbound when `args` is empty).
    fn declared(
        &mut self,
        pkg: PackageId,
        decl: TypeDecl,
        label: &str,
        args: Vec<TypeRef>,
    ) -> Result<()> {
        if self
            .stack
            .iter()
            .any(|(p, d, _)| *p == pkg && d.spec == decl.spec)
        {
            let mut chain: Vec<String> = self.stack.iter().map(|(_, _, n)| n.clone()).collect();
            chain.push(label.to_string());
            return Err(ImplError::Cycle { chain });
        }

        let spec = self.arena().type_specs[decl.spec];
        let params = self.arena().type_param_names(spec.type_params);
        let mut scope = Scope {
            package: Some(pkg),
            file: Some(decl.file),
            ..Scope::default()
        };
        if args.len() == params.len() {
            scope.subst = params.into_iter().zip(args).collect();
        } else {
            scope.type_params = params;
        }

        trace!(%label, "expanding");
        self.stack.push((pkg, decl, label.to_string()));
        let res = self.flatten(
            TypeRef {
                ty: spec.typ,
                scope: Rc::new(scope),
            },
            label,
        );
        self.stack.pop();
        res
    }

    fn flatten(&mut self, tref: TypeRef, label: &str) -> Result<()> {
        let node = self.arena().types[tref.ty];
        match node {
            Type::Paren { typ } => self.flatten(
                TypeRef {
                    ty: typ,
                    scope: tref.scope,
                },
                label,
            ),
            Type::Interface { elems } => {
                let elems = self.arena().interface_elems(elems).to_vec();
                for elem in elems {
                    match elem {
                        InterfaceElem::Method { doc, name, sig, .. } => {
                            self.method(name, sig, doc, &tref.scope);
                        }
                        InterfaceElem::TypeElem(te) => {
                            // Unions, `~T` terms and non-interface types only
                            // constrain the type set.
                            if let Some(ty) = te.single_type(self.arena()) {
                                let inner = TypeRef {
                                    ty,
                                    scope: tref.scope.clone(),
                                };
                                match self.embedded(inner, label) {
                                    Err(ImplError::NotAnInterface { name }) => {
                                        trace!(%name, "constraint term skipped");
                                    }
                                    res => res?,
                                }
                            }
                        }
                    }
                }
                Ok(())
            }
            Type::Named { .. } => self.embedded(tref, label),
            _ => Err(ImplError::NotAnInterface {
                name: label.to_string(),
            }),
        }
    }

    /// Expands a type reference found in an interface body or alias.
    fn embedded(&mut self, tref: TypeRef, label: &str) -> Result<()> {
        let node = self.arena().types[tref.ty];
        let Type::Named {
            pkg, name, args, ..
        } = node
        else {
            return self.flatten(tref, label);
        };
        let scope = tref.scope;
        if pkg.is_none() {
            if let Some(bound) = scope.binding(name).cloned() {
                return self.flatten(bound, label);
            }
            if scope.is_type_param(name) {
                return Ok(());
            }
        }

        let ident = self.arena().name(name).to_string();
        let target = match (pkg, scope.package) {
            (None, Some(p)) if self.loader.package(p).declares(name) => p,
            (None, Some(p)) => match self.loader.dot_import_declaring(p, scope.file, name)? {
                Some(path) => self.loader.load_import(&path)?,
                None => return self.predeclared(&ident, label, &scope),
            },
            (None, None) => return self.predeclared(&ident, label, &scope),
            (Some(q), Some(p)) => {
                let q = self.arena().name(q).to_string();
                let path = self.loader.resolve_qualifier(p, scope.file, &q);
                self.loader.load_import(&path)?
            }
            (Some(q), None) => {
                return Err(ImplError::Undeclared {
                    name: format!("{}.{ident}", self.arena().name(q)),
                    package: "universe".to_string(),
                })
            }
        };

        let args: Vec<TypeRef> = self
            .arena()
            .types_list(args)
            .iter()
            .map(|ty| TypeRef {
                ty: *ty,
                scope: scope.clone(),
            })
            .collect();
        let decl = lookup(self.loader, target, &ident)?;
        let label = format!("{}.{ident}", self.loader.package(target).name);
        self.declared(target, decl, &label, args)
    }

    fn predeclared(&mut self, ident: &str, label: &str, scope: &Scope) -> Result<()> {
        match ident {
            "any" | "comparable" => Ok(()),
            "error" => {
                let ty = parse_type(&mut self.loader.arena, "interface{ Error() string }")
                    .map_err(|f| ImplError::Internal(format!("predeclared error: {f}")))?;
                self.flatten(
                    TypeRef {
                        ty,
                        scope: Rc::new(Scope::default()),
                    },
                    "error",
                )
            }
            _ if PREDECLARED_TYPES.contains(&ident) => Err(ImplError::NotAnInterface {
                name: label.to_string(),
            }),
            _ => Err(ImplError::Undeclared {
                name: ident.to_string(),
                package: scope
                    .package
                    .map(|p| self.loader.package(p).display_name().to_string())
                    .unwrap_or_else(|| "universe".to_string()),
            }),
        }
    }

    fn method(
        &mut self,
        name: Symbol,
        sig: SignatureId,
        doc: Option<CommentGroupId>,
        scope: &Rc<Scope>,
    ) {
        let a = self.arena();
        let name = a.name(name).to_string();
        if self.methods.iter().any(|m| m.name == name) {
            trace!(method = %name, "shadowed by earlier method");
            return;
        }

        let sig = a.signatures[sig];
        let inputs = params(a, sig.params.fields, scope);
        let results = match sig.results {
            None => Vec::new(),
            Some(Results::Type(ty)) => vec![Param {
                names: Vec::new(),
                ty: TypeRef {
                    ty,
                    scope: scope.clone(),
                },
                variadic: false,
            }],
            Some(Results::Params(list)) => params(a, list.fields, scope),
        };
        let doc = doc
            .map(|g| a.comment_text(g).into_iter().map(str::to_string).collect())
            .unwrap_or_default();

        let m = MethodSignature {
            name,
            type_params: self.type_params.clone(),
            params: inputs,
            results,
            doc,
        };
        self.methods.push(m);
    }
}

fn params(a: &AstArena, fields: ListRef<FieldId>, scope: &Rc<Scope>) -> Vec<Param> {
    a.fields_list(fields)
        .iter()
        .map(|id| {
            let f = &a.fields[*id];
            Param {
                names: a
                    .ident_names(f.names)
                    .iter()
                    .map(|n| a.name(n.sym).to_string())
                    .collect(),
                ty: TypeRef {
                    ty: f.typ,
                    scope: scope.clone(),
                },
                variadic: f.ellipsis_pos.is_some(),
            }
        })
        .collect()
}
