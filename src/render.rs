//! Method stub rendering.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write as _;
use std::rc::Rc;

use goimpl_syntax::ast::{
    ArrayLen, ChanDir, FieldId, IdentName, InterfaceElem, ListRef, Results, Signature, Symbol,
    Type, TypeTerm,
};
use tracing::{debug, trace};

use crate::emit::ImportLine;
use crate::loader::{guess_package_name, ImportAlias, Loader, PackageId, PackageSource};
use crate::receiver::{ReceiverSpec, KEYWORDS};
use crate::resolve::{MethodSignature, Scope, TypeRef};

const PANIC_BODY: &str = "{\n\tpanic(\"not implemented\") // TODO: Implement\n}";

/// Renders stubs for one receiver and records the imports they need.
pub struct Renderer<'l, 'r, S> {
    loader: &'l mut Loader<S>,
    home: PackageId,
    recv: &'r ReceiverSpec,
    /// Names an alias must not take.
    reserved: BTreeSet<String>,
    /// Import path → chosen import.
    imports: BTreeMap<String, ImportLine>,
    /// Aliases referenced by the signature being rendered.
    sig_aliases: BTreeSet<String>,
}

impl<'l, 'r, S: PackageSource> Renderer<'l, 'r, S> {
    pub fn new(loader: &'l mut Loader<S>, home: PackageId, recv: &'r ReceiverSpec) -> Self {
        let package = loader.package(home);
        let mut reserved = package.top_level_names(&loader.arena);
        for f in &package.files {
            for imp in &f.imports {
                if imp.alias == ImportAlias::Default {
                    reserved.insert(guess_package_name(&imp.path));
                }
            }
        }
        reserved.insert(recv.type_name.clone());
        Self {
            loader,
            home,
            recv,
            reserved,
            imports: BTreeMap::new(),
            sig_aliases: BTreeSet::new(),
        }
    }

    /// Imports used so far, sorted by path.
    pub fn into_imports(self) -> Vec<ImportLine> {
        self.imports.into_values().collect()
    }

    /// Full stub for `m`: doc comment, declaration and placeholder body.
    pub fn method(&mut self, m: &MethodSignature) -> String {
        self.sig_aliases.clear();

        let mut params: Vec<(Vec<String>, String, bool)> = m
            .params
            .iter()
            .map(|p| (p.names.clone(), self.type_string(&p.ty), p.variadic))
            .collect();
        let mut results: Vec<(Vec<String>, String)> = m
            .results
            .iter()
            .map(|p| (p.names.clone(), self.type_string(&p.ty)))
            .collect();

        let mut taken: BTreeSet<String> = BTreeSet::new();
        taken.insert(self.recv.var_name.clone());
        taken.extend(self.recv.type_param_names().map(str::to_string));
        taken.extend(m.type_params.iter().cloned());
        taken.extend(self.sig_aliases.iter().cloned());
        for (names, ty, _) in &params {
            taken.extend(names.iter().filter(|n| *n != "_").cloned());
            taken.extend(idents(ty));
        }
        for (names, ty) in &results {
            taken.extend(names.iter().filter(|n| *n != "_").cloned());
            taken.extend(idents(ty));
        }

        let receiver: BTreeSet<String> = std::iter::once(self.recv.var_name.clone())
            .chain(self.recv.type_param_names().map(str::to_string))
            .filter(|n| n != "_")
            .collect();
        for (names, _, _) in &mut params {
            bump_clashing(names, &receiver, &mut taken);
        }
        for (names, _) in &mut results {
            bump_clashing(names, &receiver, &mut taken);
        }

        let letters: Vec<Option<char>> = m
            .params
            .iter()
            .map(|p| p.names.is_empty().then(|| self.letter(&p.ty)))
            .collect();
        let synthesized = synthesize_names(&letters, &taken);

        let mut out = String::new();
        for line in &m.doc {
            out.push_str(line);
            out.push('\n');
        }
        let _ = write!(out, "func ({}) {}(", self.recv, m.name);
        for (i, ((names, ty, variadic), synth)) in params.iter().zip(&synthesized).enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            match synth {
                Some(n) => out.push_str(n),
                None => out.push_str(&names.join(", ")),
            }
            out.push(' ');
            if *variadic {
                out.push_str("...");
            }
            out.push_str(ty);
        }
        out.push(')');

        if !results.is_empty() {
            out.push(' ');
            let anonymous = results.iter().all(|(names, _)| names.is_empty());
            if anonymous && results.len() == 1 {
                out.push_str(&results[0].1);
            } else {
                out.push('(');
                for (i, (names, ty)) in results.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    if !names.is_empty() {
                        out.push_str(&names.join(", "));
                        out.push(' ');
                    }
                    out.push_str(ty);
                }
                out.push(')');
            }
            out.push(' ');
            out.push_str(PANIC_BODY);
        } else {
            out.push_str(" {}");
        }
        out
    }

    /// First letter of the type's base name, used for anonymous parameters.
    fn letter(&self, t: &TypeRef) -> char {
        let a = &self.loader.arena;
        let mut t = t.clone();
        loop {
            match a.types[t.ty] {
                Type::Pointer { elem, .. }
                | Type::Slice { elem }
                | Type::Array { elem, .. }
                | Type::Chan { elem, .. }
                | Type::Paren { typ: elem } => t.ty = elem,
                Type::Map { .. } => return 'm',
                Type::Func { .. } => return 'f',
                Type::Struct { .. } => return 's',
                Type::Interface { .. } => return 'i',
                Type::Named { pkg, name, .. } => {
                    let bound = pkg.is_none().then(|| t.scope.binding(name).cloned()).flatten();
                    if let Some(bound) = bound {
                        t = bound;
                        continue;
                    }
                    return a
                        .name(name)
                        .chars()
                        .next()
                        .and_then(|c| c.to_lowercase().next())
                        .filter(|c| c.is_alphabetic())
                        .unwrap_or('v');
                }
            }
        }
    }

    fn type_string(&mut self, t: &TypeRef) -> String {
        let mut out = String::new();
        self.ty(t, &mut out);
        out
    }

    fn ty(&mut self, t: &TypeRef, out: &mut String) {
        let scope = &t.scope;
        let sub = |ty| TypeRef {
            ty,
            scope: scope.clone(),
        };
        let node = self.loader.arena.types[t.ty];
        match node {
            Type::Named {
                pkg, name, args, ..
            } => {
                if pkg.is_none() {
                    if let Some(bound) = scope.binding(name).cloned() {
                        self.ty(&bound, out);
                        return;
                    }
                }
                let ident = self.loader.arena.name(name).to_string();
                let qual = pkg.map(|q| self.loader.arena.name(q).to_string());
                if let Some(alias) = self.qualifier(scope, qual, name) {
                    out.push_str(&alias);
                    out.push('.');
                }
                out.push_str(&ident);

                let args = self.loader.arena.types_list(args).to_vec();
                if !args.is_empty() {
                    out.push('[');
                    for (i, a) in args.into_iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        self.ty(&sub(a), out);
                    }
                    out.push(']');
                }
            }
            Type::Pointer { elem, .. } => {
                out.push('*');
                self.ty(&sub(elem), out);
            }
            Type::Array { len, elem } => {
                match len {
                    ArrayLen::Expr(text) => {
                        let _ = write!(out, "[{}]", self.loader.arena.name(text));
                    }
                    ArrayLen::Ellipsis(_) => out.push_str("[...]"),
                }
                self.ty(&sub(elem), out);
            }
            Type::Slice { elem } => {
                out.push_str("[]");
                self.ty(&sub(elem), out);
            }
            Type::Map { key, val } => {
                out.push_str("map[");
                self.ty(&sub(key), out);
                out.push(']');
                self.ty(&sub(val), out);
            }
            Type::Chan { dir, elem } => {
                out.push_str(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                self.ty(&sub(elem), out);
            }
            Type::Struct { fields } => {
                let fields = self.loader.arena.fields_list(fields).to_vec();
                if fields.is_empty() {
                    out.push_str("struct{}");
                    return;
                }
                out.push_str("struct{ ");
                for (i, f) in fields.into_iter().enumerate() {
                    if i > 0 {
                        out.push_str("; ");
                    }
                    let field = self.loader.arena.fields[f];
                    let names = self.names(field.names);
                    if !names.is_empty() {
                        out.push_str(&names);
                        out.push(' ');
                    }
                    self.ty(&sub(field.typ), out);
                    if let Some(tag) = field.tag {
                        out.push(' ');
                        out.push_str(&quote_tag(self.loader.arena.name(tag.value)));
                    }
                }
                out.push_str(" }");
            }
            Type::Interface { elems } => {
                let elems = self.loader.arena.interface_elems(elems).to_vec();
                if elems.is_empty() {
                    out.push_str("interface{}");
                    return;
                }
                out.push_str("interface{ ");
                for (i, e) in elems.into_iter().enumerate() {
                    if i > 0 {
                        out.push_str("; ");
                    }
                    match e {
                        InterfaceElem::Method { name, sig, .. } => {
                            out.push_str(self.loader.arena.name(name));
                            let sig = self.loader.arena.signatures[sig];
                            self.signature(&sig, scope, out);
                        }
                        InterfaceElem::TypeElem(te) => {
                            let terms = self.loader.arena.type_terms(te.terms).to_vec();
                            for (j, term) in terms.into_iter().enumerate() {
                                if j > 0 {
                                    out.push_str(" | ");
                                }
                                match term {
                                    TypeTerm::Tilde { typ, .. } => {
                                        out.push('~');
                                        self.ty(&sub(typ), out);
                                    }
                                    TypeTerm::Type { typ } => self.ty(&sub(typ), out),
                                }
                            }
                        }
                    }
                }
                out.push_str(" }");
            }
            Type::Func { sig } => {
                out.push_str("func");
                let sig = self.loader.arena.signatures[sig];
                self.signature(&sig, scope, out);
            }
            Type::Paren { typ } => {
                out.push('(');
                self.ty(&sub(typ), out);
                out.push(')');
            }
        }
    }

    /// Parameters and results of a nested signature, names as written.
    fn signature(&mut self, sig: &Signature, scope: &Rc<Scope>, out: &mut String) {
        self.field_list(sig.params.fields, scope, out);
        match sig.results {
            None => {}
            Some(Results::Type(ty)) => {
                out.push(' ');
                let t = TypeRef {
                    ty,
                    scope: scope.clone(),
                };
                self.ty(&t, out);
            }
            Some(Results::Params(list)) => {
                out.push(' ');
                self.field_list(list.fields, scope, out);
            }
        }
    }

    fn field_list(&mut self, fields: ListRef<FieldId>, scope: &Rc<Scope>, out: &mut String) {
        out.push('(');
        let fields = self.loader.arena.fields_list(fields).to_vec();
        for (i, f) in fields.into_iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let field = self.loader.arena.fields[f];
            let names = self.names(field.names);
            if !names.is_empty() {
                out.push_str(&names);
                out.push(' ');
            }
            if field.ellipsis_pos.is_some() {
                out.push_str("...");
            }
            let t = TypeRef {
                ty: field.typ,
                scope: scope.clone(),
            };
            self.ty(&t, out);
        }
        out.push(')');
    }

    fn names(&self, names: ListRef<IdentName>) -> String {
        let a = &self.loader.arena;
        a.ident_names(names)
            .iter()
            .map(|n| a.name(n.sym))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Alias to prefix a named type with, or `None` when it renders bare.
    fn qualifier(
        &mut self,
        scope: &Scope,
        pkg: Option<String>,
        name: Symbol,
    ) -> Option<String> {
        let from = scope.package?;
        let (path, hint) = match pkg {
            None => {
                if scope.is_type_param(name) {
                    return None;
                }
                let package = self.loader.package(from);
                if package.declares(name) {
                    if from == self.home {
                        return None;
                    }
                    let path = package.import_path.clone()?;
                    (path, Some(package.name.clone()))
                } else {
                    match self.loader.dot_import_declaring(from, scope.file, name) {
                        Ok(Some(path)) => (path, None),
                        Ok(None) => return None,
                        Err(err) => {
                            debug!(%err, "dot import unavailable");
                            return None;
                        }
                    }
                }
            }
            Some(q) => {
                let path = self.loader.resolve_qualifier(from, scope.file, &q);
                let unaliased = self.loader.package(from).files.iter().enumerate().any(|(i, f)| {
                    scope.file.map_or(true, |fi| fi == i)
                        && f.imports
                            .iter()
                            .any(|imp| imp.path == path && imp.alias == ImportAlias::Default)
                });
                (path, unaliased.then_some(q))
            }
        };

        if self.loader.package(self.home).import_path.as_deref() == Some(path.as_str()) {
            return None;
        }
        let alias = self.alias_for(&path, hint);
        self.sig_aliases.insert(alias.clone());
        Some(alias)
    }

    fn alias_for(&mut self, path: &str, hint: Option<String>) -> String {
        if let Some(line) = self.imports.get(path) {
            return line.alias.clone();
        }

        let name = self
            .loader
            .package_name(path)
            .or(hint)
            .unwrap_or_else(|| guess_package_name(path));

        let home_alias = self.loader.package(self.home).files.iter().find_map(|f| {
            f.imports.iter().find_map(|imp| match &imp.alias {
                _ if imp.path != path => None,
                ImportAlias::Named(n) => Some(n.clone()),
                ImportAlias::Default => Some(name.clone()),
                ImportAlias::Dot | ImportAlias::Blank => None,
            })
        });

        let alias = match home_alias {
            Some(a) => a,
            None => {
                let taken = |c: &str| {
                    self.reserved.contains(c)
                        || KEYWORDS.contains(&c)
                        || self.imports.values().any(|l| l.alias == c)
                };
                let mut alias = name.clone();
                let mut n = 2;
                while taken(&alias) {
                    alias = format!("{name}{n}");
                    n += 1;
                }
                alias
            }
        };

        trace!(%path, %alias, "chose import alias");
        self.imports.insert(
            path.to_string(),
            ImportLine {
                path: path.to_string(),
                alias: alias.clone(),
                name,
            },
        );
        alias
    }
}

/// Renames parameters that reuse a receiver name, numbering from 1 past
/// anything in `taken`.
fn bump_clashing(names: &mut [String], receiver: &BTreeSet<String>, taken: &mut BTreeSet<String>) {
    for name in names.iter_mut().filter(|n| receiver.contains(n.as_str())) {
        let mut n = 1;
        while taken.contains(&format!("{name}{n}")) {
            n += 1;
        }
        let renamed = format!("{name}{n}");
        debug!(from = %name, to = %renamed, "renamed parameter clashing with receiver");
        taken.insert(renamed.clone());
        *name = renamed;
    }
}

/// Names for anonymous parameters (`None` entries of `letters` stay `None`).
///
/// A letter shared by several parameters is numbered from 1; a name found
/// in `taken` moves to the next free number.
fn synthesize_names(letters: &[Option<char>], taken: &BTreeSet<String>) -> Vec<Option<String>> {
    let mut counts: HashMap<char, usize> = HashMap::new();
    for c in letters.iter().flatten() {
        *counts.entry(*c).or_default() += 1;
    }

    let mut next: HashMap<char, usize> = HashMap::new();
    let mut used: BTreeSet<String> = BTreeSet::new();
    letters
        .iter()
        .map(|l| {
            let c = (*l)?;
            let shared = counts[&c] > 1;
            let n = next.entry(c).or_insert(if shared { 1 } else { 0 });
            let mut name = if *n == 0 { c.to_string() } else { format!("{c}{n}") };
            while taken.contains(&name) || used.contains(&name) || KEYWORDS.contains(&name.as_str()) {
                *n += 1;
                name = format!("{c}{n}");
            }
            *n += 1;
            used.insert(name.clone());
            Some(name)
        })
        .collect()
}

/// Identifiers appearing in rendered type text.
fn idents(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| w.starts_with(|c: char| c.is_alphabetic() || c == '_'))
        .map(str::to_string)
}

fn quote_tag(value: &str) -> String {
    if value.contains('`') || value.contains('\n') || value.contains('\r') {
        format!("{value:?}")
    } else {
        format!("`{value}`")
    }
}
