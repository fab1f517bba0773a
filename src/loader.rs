//! Package loading.
//!
//! A [`PackageSource`] maps import paths to directories and lists the Go
//! files in a directory. The [`Loader`] parses those files into one shared
//! [`AstArena`] and builds a per-package table of type declarations.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use goimpl_syntax::ast::{
    AstArena, Decl, GenDeclKind, ImportName, Spec, SourceFile, Symbol, TopLevelDecl, TypeSpecId,
};
use goimpl_syntax::parse_file;
use tracing::{debug, trace};

use crate::config::GoEnv;
use crate::error::{ImplError, Result};
use crate::gomod::{escape_module_path, within_module, GoMod};
use crate::receiver::is_identifier;

/// One Go source file as read from a [`PackageSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub path: PathBuf,
    pub text: String,
}

/// Where packages come from.
pub trait PackageSource {
    /// Directory holding the package `import_path`, if it can be found.
    fn resolve(&self, import_path: &str) -> Option<PathBuf>;

    /// Non-test Go files of `dir`, sorted by file name.
    fn list_files(&self, dir: &Path) -> Result<Vec<SourceText>>;

    /// Import path of the package in `dir`, when known.
    fn import_path_of(&self, _dir: &Path) -> Option<String> {
        None
    }
}

fn is_go_source(name: &str) -> bool {
    name.ends_with(".go") && !name.ends_with("_test.go")
}

fn join_import(base: &Path, rest: &str) -> PathBuf {
    rest.split('/')
        .filter(|s| !s.is_empty())
        .fold(base.to_path_buf(), |p, s| p.join(s))
}

// =============================================================================
// Filesystem source
// =============================================================================

#[derive(Debug, Clone)]
struct Module {
    root: PathBuf,
    gomod: GoMod,
}

/// Packages on disk: the enclosing module, its vendor directory, `replace`
/// targets, the module cache, `GOROOT` and `GOPATH`.
#[derive(Debug, Clone)]
pub struct FsSource {
    env: GoEnv,
    module: Option<Module>,
}

impl FsSource {
    /// Uses the nearest `go.mod` at or above `home`.
    pub fn new(home: &Path, env: GoEnv) -> Result<Self> {
        let mut module = None;
        for dir in home.ancestors() {
            let candidate = dir.join("go.mod");
            if !candidate.is_file() {
                continue;
            }
            let text =
                fs::read_to_string(&candidate).map_err(|e| ImplError::io(&candidate, e))?;
            let gomod = GoMod::parse(&text);
            debug!(root = %dir.display(), module = %gomod.module, "found go.mod");
            module = Some(Module {
                root: dir.to_path_buf(),
                gomod,
            });
            break;
        }
        Ok(Self { env, module })
    }

    fn existing(&self, step: &str, dir: PathBuf) -> Option<PathBuf> {
        if dir.is_dir() {
            debug!(step, dir = %dir.display(), "resolved import");
            Some(dir)
        } else {
            trace!(step, dir = %dir.display(), "no such directory");
            None
        }
    }

    fn resolve_in_module(&self, m: &Module, path: &str) -> Option<PathBuf> {
        if let Some(rest) = within_module(path, &m.gomod.module) {
            if let Some(dir) = self.existing("module", join_import(&m.root, rest)) {
                return Some(dir);
            }
        }

        if let Some(dir) = self.existing("vendor", join_import(&m.root.join("vendor"), path)) {
            return Some(dir);
        }

        let modcache = self.env.modcache();
        for r in &m.gomod.replaces {
            let Some(rest) = within_module(path, &r.old) else {
                continue;
            };
            let base = if r.is_local() {
                m.root.join(&r.new)
            } else {
                match (&modcache, &r.new_version) {
                    (Some(cache), Some(v)) => {
                        cache.join(format!("{}@{v}", escape_module_path(&r.new)))
                    }
                    _ => continue,
                }
            };
            if let Some(dir) = self.existing("replace", join_import(&base, rest)) {
                return Some(dir);
            }
        }

        let cache = modcache?;
        let (req, rest) = m
            .gomod
            .requires
            .iter()
            .filter_map(|r| within_module(path, &r.path).map(|rest| (r, rest)))
            .max_by_key(|(r, _)| r.path.len())?;
        let base = cache.join(format!(
            "{}@{}",
            escape_module_path(&req.path),
            req.version
        ));
        self.existing("modcache", join_import(&base, rest))
    }
}

impl PackageSource for FsSource {
    fn resolve(&self, import_path: &str) -> Option<PathBuf> {
        if let Some(dir) = self
            .module
            .as_ref()
            .and_then(|m| self.resolve_in_module(m, import_path))
        {
            return Some(dir);
        }

        if let Some(root) = &self.env.goroot {
            let src = root.join("src");
            if let Some(dir) = self.existing("goroot", join_import(&src, import_path)) {
                return Some(dir);
            }
            if let Some(dir) =
                self.existing("goroot vendor", join_import(&src.join("vendor"), import_path))
            {
                return Some(dir);
            }
        }

        self.env.gopath.iter().find_map(|gp| {
            self.existing("gopath", join_import(&gp.join("src"), import_path))
        })
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<SourceText>> {
        let entries = fs::read_dir(dir).map_err(|e| ImplError::io(dir, e))?;
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ImplError::io(dir, e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if is_go_source(name) && entry.path().is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort();

        paths
            .into_iter()
            .map(|path| {
                let text = fs::read_to_string(&path).map_err(|e| ImplError::io(&path, e))?;
                Ok(SourceText { path, text })
            })
            .collect()
    }

    fn import_path_of(&self, dir: &Path) -> Option<String> {
        let import_path = |base: &str, rel: &Path| -> Option<String> {
            let mut out = base.to_string();
            for c in rel.components() {
                let part = c.as_os_str().to_str()?;
                if !out.is_empty() {
                    out.push('/');
                }
                out.push_str(part);
            }
            Some(out)
        };

        if let Some(m) = &self.module {
            if let Ok(rel) = dir.strip_prefix(&m.root) {
                return import_path(&m.gomod.module, rel);
            }
        }
        self.env.gopath.iter().find_map(|gp| {
            let rel = dir.strip_prefix(gp.join("src")).ok()?;
            import_path("", rel)
        })
    }
}

// =============================================================================
// In-memory source
// =============================================================================

/// Packages held in memory, keyed by import path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    dirs: BTreeMap<PathBuf, Vec<SourceText>>,
    paths: BTreeMap<String, PathBuf>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory used for the package `import_path`.
    pub fn dir_of(import_path: &str) -> PathBuf {
        join_import(Path::new("/mem"), import_path)
    }

    /// Adds a package; `files` are `(file name, source)` pairs.
    pub fn with_package(mut self, import_path: &str, files: &[(&str, &str)]) -> Self {
        let dir = Self::dir_of(import_path);
        let entry = self.dirs.entry(dir.clone()).or_default();
        for (name, text) in files {
            entry.push(SourceText {
                path: dir.join(name),
                text: text.to_string(),
            });
        }
        entry.sort_by(|a, b| a.path.cmp(&b.path));
        self.paths.insert(import_path.to_string(), dir);
        self
    }
}

impl PackageSource for MemorySource {
    fn resolve(&self, import_path: &str) -> Option<PathBuf> {
        self.paths.get(import_path).cloned()
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<SourceText>> {
        let files = self.dirs.get(dir).ok_or_else(|| {
            ImplError::io(dir, io::Error::new(io::ErrorKind::NotFound, "no such package"))
        })?;
        Ok(files
            .iter()
            .filter(|f| {
                f.path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(is_go_source)
            })
            .cloned()
            .collect())
    }

    fn import_path_of(&self, dir: &Path) -> Option<String> {
        self.paths
            .iter()
            .find(|(_, d)| d.as_path() == dir)
            .map(|(p, _)| p.clone())
    }
}

// =============================================================================
// Loaded packages
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportAlias {
    /// `import "path"`
    Default,
    Named(String),
    Dot,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileImport {
    pub alias: ImportAlias,
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub ast: SourceFile,
    pub imports: Vec<FileImport>,
}

/// A type declared at package level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDecl {
    pub spec: TypeSpecId,
    /// Index into [`Package::files`].
    pub file: usize,
}

#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub import_path: Option<String>,
    pub dir: PathBuf,
    pub files: Vec<LoadedFile>,
    types: HashMap<Symbol, TypeDecl>,
}

impl Package {
    pub fn lookup(&self, name: Symbol) -> Option<TypeDecl> {
        self.types.get(&name).copied()
    }

    pub fn declares(&self, name: Symbol) -> bool {
        self.types.contains_key(&name)
    }

    /// Display name for messages: the import path, else the package name.
    pub fn display_name(&self) -> &str {
        self.import_path.as_deref().unwrap_or(&self.name)
    }

    /// Every package-level identifier, plus the local names of imports.
    pub fn top_level_names(&self, arena: &AstArena) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for f in &self.files {
            for d in arena.top_decls(f.ast.decls) {
                match d {
                    TopLevelDecl::Func(id) => {
                        let func = &arena.funcs[*id];
                        if func.recv.is_none() {
                            out.insert(arena.name(func.name).to_string());
                        }
                    }
                    TopLevelDecl::Decl(id) => {
                        let Decl::Gen(g) = &arena.decls[*id];
                        for s in arena.specs_list(g.specs) {
                            match s {
                                Spec::Type(ts) => {
                                    out.insert(arena.name(arena.type_specs[*ts].name).to_string());
                                }
                                Spec::Value(v) => {
                                    out.extend(
                                        arena
                                            .ident_names(v.names)
                                            .iter()
                                            .map(|n| arena.name(n.sym).to_string()),
                                    );
                                }
                                Spec::Import(_) => {}
                            }
                        }
                    }
                }
            }
            for imp in &f.imports {
                if let ImportAlias::Named(n) = &imp.alias {
                    out.insert(n.clone());
                }
            }
        }
        out
    }
}

/// Package name Go would most likely declare for `import_path`.
///
/// Drops a `/vN` major-version element, a `.vN` suffix and a `go-` prefix,
/// and keeps only identifier characters.
pub fn guess_package_name(import_path: &str) -> String {
    let mut elems = import_path.rsplit('/');
    let mut last = elems.next().unwrap_or(import_path);
    if is_major_version(last) {
        last = elems.next().unwrap_or(last);
    }
    if let Some((base, suffix)) = last.rsplit_once('.') {
        if is_major_version(suffix) {
            last = base;
        }
    }
    let last = last.strip_prefix("go-").unwrap_or(last);
    let last = last.strip_suffix("-go").unwrap_or(last);
    let name: String = last
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) || name.is_empty() {
        format!("pkg{name}")
    } else {
        name
    }
}

fn is_major_version(s: &str) -> bool {
    s.strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Reports whether build constraints in `file`'s header exclude it
/// unconditionally (`//go:build ignore`).
fn build_ignored(arena: &AstArena, file: &SourceFile) -> bool {
    let Some(header) = file.header else {
        return false;
    };
    arena.comment_text(header).iter().any(|c| {
        let expr = c
            .strip_prefix("//go:build")
            .or_else(|| c.strip_prefix("// +build"));
        expr.is_some_and(|e| {
            e.split(|c: char| c.is_whitespace() || "()&|,".contains(c))
                .any(|t| t == "ignore")
        })
    })
}

/// Parses packages on demand and keeps them for the rest of the run.
pub struct Loader<S> {
    pub arena: AstArena,
    source: S,
    packages: Vec<Package>,
    by_dir: HashMap<PathBuf, PackageId>,
    by_path: HashMap<String, PackageId>,
}

impl<S: PackageSource> Loader<S> {
    pub fn new(source: S) -> Self {
        Self {
            arena: AstArena::new(),
            source,
            packages: Vec::new(),
            by_dir: HashMap::new(),
            by_path: HashMap::new(),
        }
    }

    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.0 as usize]
    }

    /// Loads the package the stubs are generated for. A directory without
    /// Go files is accepted and named after the directory.
    pub fn load_home(&mut self, dir: &Path) -> Result<PackageId> {
        let import_path = self.source.import_path_of(dir);
        self.load_dir(dir, import_path, true)
    }

    /// Loads the package with the given import path.
    pub fn load_import(&mut self, import_path: &str) -> Result<PackageId> {
        if let Some(id) = self.by_path.get(import_path) {
            return Ok(*id);
        }
        let dir = self
            .source
            .resolve(import_path)
            .ok_or_else(|| ImplError::PackageNotFound {
                path: import_path.to_string(),
            })?;
        let id = self.load_dir(&dir, Some(import_path.to_string()), false)?;
        self.by_path.insert(import_path.to_string(), id);
        Ok(id)
    }

    fn load_dir(
        &mut self,
        dir: &Path,
        import_path: Option<String>,
        allow_empty: bool,
    ) -> Result<PackageId> {
        if let Some(id) = self.by_dir.get(dir) {
            return Ok(*id);
        }

        let sources = self.source.list_files(dir)?;
        let mut name: Option<String> = None;
        let mut files = Vec::new();

        for src in sources {
            let ast = parse_file(&mut self.arena, &src.text)
                .map_err(|f| ImplError::parse(&src.path, &src.text, f))?;
            let pkg_name = self.arena.name(ast.name).to_string();

            if pkg_name.ends_with("_test") || build_ignored(&self.arena, &ast) {
                trace!(file = %src.path.display(), "skipping file");
                continue;
            }
            match &name {
                Some(n) if *n != pkg_name => {
                    debug!(file = %src.path.display(), package = %pkg_name, expected = %n,
                        "skipping file from another package");
                    continue;
                }
                Some(_) => {}
                None => name = Some(pkg_name),
            }

            trace!(file = %src.path.display(), "parsed");
            let imports = self.file_imports(&ast);
            files.push(LoadedFile {
                path: src.path,
                ast,
                imports,
            });
        }

        let name = match name {
            Some(n) => n,
            None if allow_empty => dir_package_name(dir),
            None => return Err(ImplError::load(dir, "no Go files")),
        };

        let mut types = HashMap::new();
        for (fi, f) in files.iter().enumerate() {
            for d in self.arena.top_decls(f.ast.decls) {
                let TopLevelDecl::Decl(id) = d else {
                    continue;
                };
                let Decl::Gen(g) = &self.arena.decls[*id];
                if g.kind != GenDeclKind::Type {
                    continue;
                }
                for s in self.arena.specs_list(g.specs) {
                    if let Spec::Type(ts) = s {
                        types
                            .entry(self.arena.type_specs[*ts].name)
                            .or_insert(TypeDecl { spec: *ts, file: fi });
                    }
                }
            }
        }

        debug!(dir = %dir.display(), package = %name, files = files.len(), types = types.len(),
            "loaded package");

        let id = PackageId(self.packages.len() as u32);
        if let Some(p) = &import_path {
            self.by_path.insert(p.clone(), id);
        }
        self.by_dir.insert(dir.to_path_buf(), id);
        self.packages.push(Package {
            name,
            import_path,
            dir: dir.to_path_buf(),
            files,
            types,
        });
        Ok(id)
    }

    fn file_imports(&self, ast: &SourceFile) -> Vec<FileImport> {
        self.arena
            .imports(ast)
            .map(|i| FileImport {
                alias: match i.name {
                    None => ImportAlias::Default,
                    Some(ImportName::Dot(_)) => ImportAlias::Dot,
                    Some(ImportName::Blank(_)) => ImportAlias::Blank,
                    Some(ImportName::Name(sym, _)) => {
                        ImportAlias::Named(self.arena.name(sym).to_string())
                    }
                },
                path: self.arena.name(i.path.value).to_string(),
            })
            .collect()
    }

    /// Package name for `import_path`, loading the package if needed.
    pub fn package_name(&mut self, import_path: &str) -> Option<String> {
        match self.load_import(import_path) {
            Ok(id) => Some(self.package(id).name.clone()),
            Err(err) => {
                debug!(%import_path, %err, "package name unavailable");
                None
            }
        }
    }

    /// Import path that qualifier `q` refers to inside `pkg`.
    ///
    /// `file` selects one file's imports; `None` searches every file of the
    /// package. A qualifier no import matches is taken as a full path.
    pub fn resolve_qualifier(&mut self, pkg: PackageId, file: Option<usize>, q: &str) -> String {
        let package = self.package(pkg);
        let imports: Vec<FileImport> = match file {
            Some(f) => package.files[f].imports.clone(),
            None => package
                .files
                .iter()
                .flat_map(|f| f.imports.iter().cloned())
                .collect(),
        };

        if let Some(i) = imports
            .iter()
            .find(|i| matches!(&i.alias, ImportAlias::Named(n) if n == q))
        {
            return i.path.clone();
        }

        let defaults: Vec<&FileImport> = imports
            .iter()
            .filter(|i| i.alias == ImportAlias::Default)
            .collect();
        if let Some(i) = defaults.iter().find(|i| guess_package_name(&i.path) == q) {
            return i.path.clone();
        }
        for i in defaults {
            if self.package_name(&i.path).as_deref() == Some(q) {
                return i.path.clone();
            }
        }
        q.to_string()
    }

    /// Import path of a dot import in `pkg` whose package declares type
    /// `name`. `file` selects imports as in [`Loader::resolve_qualifier`].
    pub fn dot_import_declaring(
        &mut self,
        pkg: PackageId,
        file: Option<usize>,
        name: Symbol,
    ) -> Result<Option<String>> {
        let paths: Vec<String> = self
            .package(pkg)
            .files
            .iter()
            .enumerate()
            .filter(|(i, _)| file.map_or(true, |f| f == *i))
            .flat_map(|(_, f)| f.imports.iter())
            .filter(|i| i.alias == ImportAlias::Dot)
            .map(|i| i.path.clone())
            .collect();
        for path in paths {
            let id = self.load_import(&path)?;
            if self.package(id).declares(name) {
                trace!(%path, "found through dot import");
                return Ok(Some(path));
            }
        }
        Ok(None)
    }
}

fn dir_package_name(dir: &Path) -> String {
    dir.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| is_identifier(n))
        .map_or_else(|| "main".to_string(), str::to_string)
}
