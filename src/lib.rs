//! Method stubs for implementing a Go interface.
//!
//! Given a receiver (`f *File`) and an interface reference (`io.ReadWriter`),
//! [`generate`] loads the home package from source, resolves the interface's
//! method set across packages, drops the methods the receiver already
//! declares and renders the rest as Go declarations with placeholder bodies.

pub mod config;
pub mod detect;
pub mod emit;
pub mod error;
pub mod gomod;
pub mod loader;
pub mod receiver;
pub mod render;
pub mod resolve;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

pub use config::GoEnv;
pub use error::{ImplError, Result};
pub use loader::{FsSource, Loader, MemorySource, PackageSource};
pub use receiver::ReceiverSpec;
pub use resolve::{resolve_interface, InterfaceMethodSet, QualifiedName};

use render::Renderer;

#[derive(Debug, Clone)]
pub struct Options {
    /// Directory of the package the stubs are for.
    pub dir: PathBuf,
    /// Emit the `package` clause and imports before the stubs.
    pub preamble: bool,
    pub env: GoEnv,
}

impl Options {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            preamble: true,
            env: GoEnv::from_env(),
        }
    }
}

/// Generates stubs from the Go sources on disk.
pub fn generate(recv: &str, iface: &str, opts: &Options) -> Result<String> {
    let recv = ReceiverSpec::parse(recv)?;
    let iface = QualifiedName::parse(iface)?;
    let dir = fs::canonicalize(&opts.dir).map_err(|e| ImplError::io(&opts.dir, e))?;
    let source = FsSource::new(&dir, opts.env.clone())?;
    run(source, &dir, &recv, &iface, opts.preamble)
}

/// Generates stubs with packages taken from `source`.
pub fn generate_with<S: PackageSource>(
    source: S,
    home_dir: &Path,
    recv: &str,
    iface: &str,
    preamble: bool,
) -> Result<String> {
    let recv = ReceiverSpec::parse(recv)?;
    let iface = QualifiedName::parse(iface)?;
    run(source, home_dir, &recv, &iface, preamble)
}

fn run<S: PackageSource>(
    source: S,
    home_dir: &Path,
    recv: &ReceiverSpec,
    iface: &QualifiedName,
    preamble: bool,
) -> Result<String> {
    let mut loader = Loader::new(source);
    let home = loader.load_home(home_dir)?;
    let set = resolve_interface(&mut loader, home, iface, recv)?;

    let existing = detect::existing_methods(
        &loader.arena,
        loader.package(home),
        &recv.type_name,
        &set,
    );
    debug!(receiver = %recv, existing = existing.len(), "existing methods");

    let package = loader.package(home).name.clone();
    let mut renderer = Renderer::new(&mut loader, home, recv);
    let stubs: Vec<String> = set
        .methods
        .iter()
        .filter(|m| !existing.contains(&m.name))
        .map(|m| renderer.method(m))
        .collect();
    let imports = renderer.into_imports();

    Ok(emit::emit(&package, &imports, &stubs, preamble))
}
