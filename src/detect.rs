//! Methods the receiver type already declares.

use std::collections::BTreeSet;

use goimpl_syntax::ast::{AstArena, DeclId, FuncDeclId, Type, TypeId};
use goimpl_syntax::Visitor;

use crate::loader::Package;
use crate::resolve::InterfaceMethodSet;

/// Method-set names declared on the receiver type.
pub type ExclusionSet = BTreeSet<String>;

/// Collects names of methods declared on one receiver base type.
struct MethodCollector<'a> {
    type_name: &'a str,
    methods: BTreeSet<String>,
}

impl<'ast> Visitor<'ast> for MethodCollector<'_> {
    fn visit_decl(&mut self, _a: &'ast AstArena, _id: DeclId) {}

    fn visit_func_decl(&mut self, a: &'ast AstArena, id: FuncDeclId) {
        let func = &a.funcs[id];
        let Some(recv) = func.recv else {
            return;
        };
        if base_type_name(a, recv.typ) == Some(self.type_name) {
            self.methods.insert(a.name(func.name).to_string());
        }
    }
}

/// `T` for receivers `T`, `*T`, `(*T)`, `T[K, V]` and `*T[K]`.
fn base_type_name(a: &AstArena, mut ty: TypeId) -> Option<&str> {
    loop {
        match a.types[ty] {
            Type::Pointer { elem, .. } => ty = elem,
            Type::Paren { typ } => ty = typ,
            Type::Named {
                pkg: None, name, ..
            } => return Some(a.name(name)),
            _ => return None,
        }
    }
}

/// Names in `set` that `pkg` declares as methods of `type_name`, value and
/// pointer receivers alike. Promoted methods are not considered.
pub fn existing_methods(
    a: &AstArena,
    pkg: &Package,
    type_name: &str,
    set: &InterfaceMethodSet,
) -> ExclusionSet {
    let mut collector = MethodCollector {
        type_name,
        methods: BTreeSet::new(),
    };
    for f in &pkg.files {
        collector.visit_source_file(a, &f.ast);
    }
    set.names()
        .filter(|n| collector.methods.contains(*n))
        .map(str::to_string)
        .collect()
}
