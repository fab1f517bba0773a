use std::fs;
use std::path::{Path, PathBuf};

use goimpl::{generate, GoEnv, ImplError, Options};
use tempfile::TempDir;

const PANIC: &str = "{\n\tpanic(\"not implemented\") // TODO: Implement\n}";

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

/// A module `example.com/app` with a vendored package, a local replacement,
/// a module-cache dependency, a fake GOROOT and a GOPATH.
struct Tree {
    _tmp: TempDir,
    root: PathBuf,
}

impl Tree {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().to_path_buf();

        write(
            &root,
            "app/go.mod",
            "module example.com/app\n\ngo 1.22\n\n\
             require (\n\tgithub.com/Acme/kv v1.2.0\n\texample.com/shared v0.0.0\n)\n\n\
             replace example.com/shared => ../shared\n",
        );
        write(&root, "app/main.go", "package main\n\ntype Server struct{}\n");
        write(
            &root,
            "app/store/store.go",
            "package store\n\ntype Store interface {\n\tGet(key string) ([]byte, error)\n}\n",
        );
        write(
            &root,
            "app/vendor/github.com/vend/api/api.go",
            "package api\n\ntype Request struct{}\n\ntype Handler interface {\n\tHandle(req *Request)\n}\n",
        );
        write(
            &root,
            "shared/shared.go",
            "package shared\n\ntype Pinger interface {\n\tPing() error\n}\n",
        );
        write(
            &root,
            "gopath/pkg/mod/github.com/!acme/kv@v1.2.0/kv.go",
            "package kv\n\ntype Iterator interface {\n\tNext() bool\n}\n",
        );
        write(
            &root,
            "goroot/src/io/io.go",
            "package io\n\ntype Closer interface {\n\tClose() error\n}\n",
        );
        write(
            &root,
            "gopath/src/legacy.org/old/old.go",
            "package old\n\ntype Resetter interface {\n\tReset()\n}\n",
        );

        Self { _tmp: tmp, root }
    }

    fn options(&self, dir: &str) -> Options {
        Options {
            dir: self.root.join(dir),
            preamble: true,
            env: GoEnv {
                goroot: Some(self.root.join("goroot")),
                gopath: vec![self.root.join("gopath")],
                gomodcache: None,
            },
        }
    }

    fn run(&self, recv: &str, iface: &str) -> String {
        match generate(recv, iface, &self.options("app")) {
            Ok(out) => out,
            Err(e) => panic!("{iface}: {e}"),
        }
    }
}

#[test]
fn package_inside_module() {
    let t = Tree::new();
    assert_eq!(
        t.run("s *Server", "example.com/app/store.Store"),
        format!("package main\n\nfunc (s *Server) Get(key string) ([]byte, error) {PANIC}\n")
    );
}

#[test]
fn vendored_package() {
    let t = Tree::new();
    assert_eq!(
        t.run("s *Server", "github.com/vend/api.Handler"),
        "package main\n\nimport \"github.com/vend/api\"\n\n\
         func (s *Server) Handle(req *api.Request) {}\n"
    );
}

#[test]
fn local_replacement() {
    let t = Tree::new();
    let out = t.run("s *Server", "example.com/shared.Pinger");
    assert!(out.contains("func (s *Server) Ping() error {"), "{out}");
}

#[test]
fn module_cache_with_escaped_path() {
    let t = Tree::new();
    let out = t.run("s *Server", "github.com/Acme/kv.Iterator");
    assert!(out.contains("func (s *Server) Next() bool {"), "{out}");
}

#[test]
fn standard_library_and_gopath() {
    let t = Tree::new();
    assert!(t.run("s Server", "io.Closer").contains("func (s Server) Close() error {"));
    assert!(t
        .run("s Server", "legacy.org/old.Resetter")
        .contains("func (s Server) Reset() {}"));
}

#[test]
fn test_files_and_ignored_files_are_skipped() {
    let t = Tree::new();
    write(
        &t.root,
        "app/main_test.go",
        "package main\n\nfunc (s *Server) Close() error { return nil }\n",
    );
    write(
        &t.root,
        "app/tools.go",
        "//go:build ignore\n\npackage tools\n\nfunc (s *Server) Close() error { return nil }\n",
    );
    assert!(t.run("s *Server", "io.Closer").contains("func (s *Server) Close() error {"));

    write(
        &t.root,
        "app/close.go",
        "package main\n\nfunc (s *Server) Close() error { return nil }\n",
    );
    assert_eq!(t.run("s *Server", "io.Closer"), "");
}

#[test]
fn directory_without_go_files_is_named_after_it() {
    let t = Tree::new();
    fs::create_dir_all(t.root.join("app/empty")).unwrap();
    let out = generate("e *Empty", "io.Closer", &t.options("app/empty")).unwrap();
    assert!(out.starts_with("package empty\n\n"), "{out}");
}

#[test]
fn missing_package_is_reported() {
    let t = Tree::new();
    let err = generate("s *Server", "example.com/app/nope.Store", &t.options("app")).unwrap_err();
    assert!(matches!(err, ImplError::PackageNotFound { .. }), "{err}");
    assert!(!err.is_usage());
}

#[test]
fn missing_home_directory_is_an_io_error() {
    let t = Tree::new();
    let err = generate("s *Server", "io.Closer", &t.options("app/nowhere")).unwrap_err();
    assert!(matches!(err, ImplError::Io { .. }), "{err}");
}
