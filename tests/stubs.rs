use goimpl::{generate_with, ImplError, MemorySource};

const HOME: &str = "example.com/home";

const IO: &str = r#"package io

// Reader is the interface that wraps the basic Read method.
type Reader interface {
	// Read reads up to len(p) bytes into p.
	Read(p []byte) (n int, err error)
}

type Writer interface {
	Write(p []byte) (n int, err error)
}

type Closer interface {
	Close() error
}

type ReadCloser interface {
	Reader
	Closer
}

type ReadWriteCloser interface {
	Reader
	Writer
	Closer
}
"#;

fn home(src: &str) -> MemorySource {
    MemorySource::new()
        .with_package("io", &[("io.go", IO)])
        .with_package(HOME, &[("home.go", src)])
}

fn gen(src: MemorySource, recv: &str, iface: &str) -> String {
    match generate_with(src, &MemorySource::dir_of(HOME), recv, iface, true) {
        Ok(out) => out,
        Err(e) => panic!("generate {recv:?} {iface:?}: {e}"),
    }
}

fn gen_err(src: MemorySource, recv: &str, iface: &str) -> ImplError {
    match generate_with(src, &MemorySource::dir_of(HOME), recv, iface, true) {
        Ok(out) => panic!("expected an error, got:\n{out}"),
        Err(e) => e,
    }
}

fn stub_names(out: &str) -> Vec<String> {
    out.lines()
        .filter_map(|l| l.strip_prefix("func ("))
        .filter_map(|l| {
            let rest = &l[l.find(") ")? + 2..];
            Some(rest[..rest.find('(')?].to_string())
        })
        .collect()
}

#[test]
fn reader_stub() {
    let out = gen(
        home("package home\n\ntype MyReader struct{}\n"),
        "r *MyReader",
        "io.Reader",
    );
    assert_eq!(
        out,
        "package home\n\n\
         // Read reads up to len(p) bytes into p.\n\
         func (r *MyReader) Read(p []byte) (n int, err error) {\n\
         \tpanic(\"not implemented\") // TODO: Implement\n\
         }\n"
    );
}

#[test]
fn declared_method_produces_no_output() {
    let src = home(
        "package home\n\ntype MyReader struct{}\n\n\
         func (r *MyReader) Read(p []byte) (int, error) {\n\treturn 0, nil\n}\n",
    );
    assert_eq!(gen(src, "r *MyReader", "io.Reader"), "");
}

#[test]
fn value_and_pointer_receivers_both_count() {
    let src = home(
        "package home\n\ntype F struct{}\n\n\
         func (f F) Close() error { return nil }\n\
         func (f *F) Write(p []byte) (int, error) { return len(p), nil }\n",
    );
    let out = gen(src, "f *F", "io.ReadWriteCloser");
    assert_eq!(stub_names(&out), vec!["Read"]);
}

#[test]
fn methods_are_flattened_in_embedding_order() {
    let out = gen(home("package home\n\ntype F struct{}\n"), "f F", "io.ReadWriteCloser");
    assert_eq!(stub_names(&out), vec!["Read", "Write", "Close"]);
    assert!(out.contains("func (f F) Close() error {\n"));
}

#[test]
fn first_embedded_declaration_wins() {
    let src = home(
        r#"package home

import "io"

type Shutdowner interface {
	Close(force bool) error
}

type Both interface {
	io.Closer
	Shutdowner
}

type T struct{}
"#,
    );
    let out = gen(src, "t *T", "Both");
    assert_eq!(stub_names(&out), vec!["Close"]);
    assert!(out.contains("func (t *T) Close() error {"), "{out}");
}

#[test]
fn outer_method_shadows_embedded_one() {
    let src = home(
        r#"package home

import "io"

type Source interface {
	Read(buf []byte) (int, error)
	io.Reader
}

type T struct{}
"#,
    );
    let out = gen(src, "t *T", "Source");
    assert_eq!(stub_names(&out), vec!["Read"]);
    assert!(out.contains("func (t *T) Read(buf []byte) (int, error) {"), "{out}");
}

#[test]
fn anonymous_parameters_get_distinct_names() {
    let src = home(
        r#"package home

type Store interface {
	Put(string, int, string) error
	Log(...string)
	Walk(func(string) error, map[string]int, <-chan int)
}

type S struct{}
"#,
    );
    let out = gen(src, "db *S", "Store");
    assert!(
        out.contains("func (db *S) Put(s1 string, i int, s2 string) error {"),
        "{out}"
    );
    assert!(out.contains("func (db *S) Log(s ...string) {}"), "{out}");
    assert!(
        out.contains("func (db *S) Walk(f func(string) error, m map[string]int, i <-chan int) {}"),
        "{out}"
    );
}

#[test]
fn synthesized_names_avoid_the_receiver() {
    let src = home("package home\n\ntype Srv interface { Serve(string) }\n");
    let out = gen(src, "s *Srv", "Srv");
    assert!(out.contains("func (s *Srv) Serve(s1 string) {}"), "{out}");
}

#[test]
fn grouping_and_blank_names_are_kept() {
    let src = home(
        "package home\n\ntype Copier interface {\n\tCopy(dst, src []byte, _ bool) (n, m int)\n}\n",
    );
    let out = gen(src, "c C", "Copier");
    assert!(
        out.contains("func (c C) Copy(dst, src []byte, _ bool) (n, m int) {"),
        "{out}"
    );
}

#[test]
fn error_contributes_error_method() {
    let src = home("package home\n\ntype Coded interface {\n\terror\n\tCode() int\n}\n");
    let out = gen(src, "e *E", "Coded");
    assert_eq!(stub_names(&out), vec!["Error", "Code"]);
    assert!(out.contains("func (e *E) Error() string {"));
}

#[test]
fn constraint_elements_contribute_nothing() {
    let src = home(
        "package home\n\ntype Num interface {\n\t~int | ~float64\n\tcomparable\n\tany\n\tString() string\n}\n",
    );
    let out = gen(src, "n N", "Num");
    assert_eq!(stub_names(&out), vec!["String"]);
}

#[test]
fn non_interface_terms_only_constrain() {
    let src = home(
        r#"package home

type S struct{}

type Bytes = []byte

type C interface {
	int
	String() string
}

type D interface {
	S
	M()
}

type E interface {
	[]byte
	Bytes
	N()
}
"#,
    );
    assert_eq!(stub_names(&gen(src.clone(), "x X", "C")), vec!["String"]);
    assert_eq!(stub_names(&gen(src.clone(), "x X", "D")), vec!["M"]);
    assert_eq!(stub_names(&gen(src, "x X", "E")), vec!["N"]);
}

#[test]
fn predeclared_error_interface() {
    let src = home("package home\n\ntype MyErr struct{}\n");
    assert_eq!(
        gen(src.clone(), "e *MyErr", "error"),
        "package home\n\n\
         func (e *MyErr) Error() string {\n\
         \tpanic(\"not implemented\") // TODO: Implement\n\
         }\n"
    );
    assert_eq!(gen(src.clone(), "e *MyErr", "any"), "");
    assert!(matches!(
        gen_err(src.clone(), "e *MyErr", "int"),
        ImplError::NotAnInterface { .. }
    ));
    assert!(gen_err(src, "e *MyErr", "error[int]").is_usage());
}

#[test]
fn dot_imported_names_resolve_and_are_qualified() {
    let src = home(
        r#"package home

import . "io"

type Flusher interface {
	Reader
	Flush(w Writer) error
}

type F struct{}
"#,
    );
    assert_eq!(
        gen(src.clone(), "f *F", "Flusher"),
        "package home\n\n\
         import \"io\"\n\n\
         // Read reads up to len(p) bytes into p.\n\
         func (f *F) Read(p []byte) (n int, err error) {\n\
         \tpanic(\"not implemented\") // TODO: Implement\n\
         }\n\n\
         func (f *F) Flush(w io.Writer) error {\n\
         \tpanic(\"not implemented\") // TODO: Implement\n\
         }\n"
    );
    assert_eq!(stub_names(&gen(src, "f *F", "Closer")), vec!["Close"]);
}

#[test]
fn named_params_reusing_the_receiver_are_renamed() {
    let src = home(
        "package home\n\nimport \"io\"\n\ntype Named interface {\n\tRead(r io.Reader, t int)\n}\n\ntype T struct{}\n",
    );
    assert_eq!(
        gen(src, "r *T", "Named"),
        "package home\n\nimport \"io\"\n\nfunc (r *T) Read(r1 io.Reader, t int) {}\n"
    );
}

#[test]
fn foreign_types_are_qualified_and_imported() {
    let lib = r#"package lib

import "time"

type Key string

type Item struct{}

type Store interface {
	Get(Key) (*Item, error)
	Expire(k Key, after time.Duration) <-chan time.Time
}
"#;
    let src = home("package home\n\ntype Cache struct{}\n")
        .with_package("example.com/lib", &[("lib.go", lib)])
        .with_package("time", &[("time.go", "package time\n\ntype Duration int64\n\ntype Time struct{}\n")]);
    let out = gen(src, "c *Cache", "example.com/lib.Store");
    assert_eq!(
        out,
        "package home\n\n\
         import (\n\t\"example.com/lib\"\n\t\"time\"\n)\n\n\
         func (c *Cache) Get(k lib.Key) (*lib.Item, error) {\n\
         \tpanic(\"not implemented\") // TODO: Implement\n\
         }\n\n\
         func (c *Cache) Expire(k lib.Key, after time.Duration) <-chan time.Time {\n\
         \tpanic(\"not implemented\") // TODO: Implement\n\
         }\n"
    );
}

#[test]
fn home_import_alias_is_reused() {
    let lib = "package lib\n\ntype Item struct{}\n\ntype Getter interface { Get() Item }\n";
    let src = home("package home\n\nimport l \"example.com/lib\"\n\nvar _ l.Item\n\ntype G struct{}\n")
        .with_package("example.com/lib", &[("lib.go", lib)]);
    let out = gen(src, "g G", "l.Getter");
    assert!(out.starts_with("package home\n\nimport l \"example.com/lib\"\n\n"), "{out}");
    assert!(out.contains("func (g G) Get() l.Item {"), "{out}");
}

#[test]
fn alias_colliding_with_home_identifier_is_numbered() {
    let lib = "package lib\n\ntype Item struct{}\n\ntype Getter interface { Get() Item }\n";
    let src = home("package home\n\nvar lib = 1\n\ntype G struct{}\n")
        .with_package("example.com/lib", &[("lib.go", lib)]);
    let out = gen(src, "g G", "example.com/lib.Getter");
    assert!(out.contains("import lib2 \"example.com/lib\"\n"), "{out}");
    assert!(out.contains("func (g G) Get() lib2.Item {"), "{out}");
}

#[test]
fn home_types_render_unqualified() {
    let lib = "package lib\n\ntype Box[T any] interface { Put(T) }\n";
    let src = home("package home\n\nimport \"example.com/lib\"\n\ntype Item struct{}\n\ntype B struct{}\n")
        .with_package("example.com/lib", &[("lib.go", lib)]);
    let out = gen(src, "b *B", "lib.Box[*Item]");
    assert_eq!(
        out,
        "package home\n\nfunc (b *B) Put(i *Item) {}\n"
    );
}

const CONTAINER: &str = r#"package home

type Container[T any] interface {
	Add(T)
	All() []T
}
"#;

#[test]
fn receiver_type_parameters_substitute_by_position() {
    let out = gen(home(CONTAINER), "b *Bag[E any]", "Container");
    assert!(out.contains("func (b *Bag[E]) Add(e E) {}"), "{out}");
    assert!(out.contains("func (b *Bag[E]) All() []E {"), "{out}");
}

#[test]
fn explicit_type_arguments_win() {
    let out = gen(home(CONTAINER), "b *Bag[E any]", "Container[int]");
    assert!(out.contains("func (b *Bag[E]) Add(i int) {}"), "{out}");
    assert!(out.contains("func (b *Bag[E]) All() []int {"), "{out}");
}

#[test]
fn count_mismatch_leaves_parameters_unsubstituted() {
    let out = gen(home(CONTAINER), "p *Pair[K, V any]", "Container");
    assert!(out.contains("func (p *Pair[K, V]) Add(t T) {}"), "{out}");
    assert!(out.contains("func (p *Pair[K, V]) All() []T {"), "{out}");
}

#[test]
fn embedded_instantiation_binds_arguments() {
    let src = home(
        r#"package home

type Container[T any] interface {
	Add(T)
}

type Strings interface {
	Container[string]
	Len() int
}
"#,
    );
    let out = gen(src, "s *Set", "Strings");
    assert!(out.contains("func (s *Set) Add(s1 string) {}"), "{out}");
    assert!(out.contains("func (s *Set) Len() int {"), "{out}");
}

#[test]
fn aliases_and_defined_interfaces_are_followed() {
    let src = home(
        "package home\n\nimport \"io\"\n\ntype RC = io.ReadCloser\n\ntype Closer io.Closer\n",
    );
    assert_eq!(stub_names(&gen(src.clone(), "x X", "RC")), vec!["Read", "Close"]);
    assert_eq!(stub_names(&gen(src, "x X", "Closer")), vec!["Close"]);
}

#[test]
fn embedding_cycle_is_reported() {
    let src = home("package home\n\ntype A interface { B }\n\ntype B interface { A }\n");
    match gen_err(src, "x X", "A") {
        ImplError::Cycle { chain } => assert_eq!(chain, vec!["home.A", "home.B", "home.A"]),
        e => panic!("unexpected error: {e}"),
    }
}

#[test]
fn resolution_errors() {
    let src = home("package home\n\ntype Thing struct{}\n\ntype Num int\n");
    assert!(matches!(
        gen_err(src.clone(), "x X", "Thing"),
        ImplError::NotAnInterface { .. }
    ));
    assert!(matches!(
        gen_err(src.clone(), "x X", "Num"),
        ImplError::NotAnInterface { .. }
    ));
    assert!(matches!(
        gen_err(src.clone(), "x X", "Missing"),
        ImplError::Undeclared { .. }
    ));
    assert!(matches!(
        gen_err(src, "x X", "example.com/nowhere.Iface"),
        ImplError::PackageNotFound { .. }
    ));
}

#[test]
fn malformed_receiver_is_a_usage_error() {
    for recv in ["*T", "r", "r *", "r T[", "r T junk", "func T"] {
        let err = gen_err(home("package home\n"), recv, "io.Reader");
        assert!(err.is_usage(), "{recv:?}: {err}");
    }
}

#[test]
fn unparsable_package_is_a_load_error() {
    let src = home("package home\n\ntype T struct {\n");
    match gen_err(src, "t T", "io.Reader") {
        ImplError::Load { path, diags, .. } => {
            assert!(path.ends_with("home.go"));
            assert!(!diags.is_empty());
        }
        e => panic!("unexpected error: {e}"),
    }
}

#[test]
fn preamble_can_be_disabled() {
    let src = home("package home\n");
    let out = generate_with(src, &MemorySource::dir_of(HOME), "c C", "io.Closer", false).unwrap();
    assert_eq!(
        out,
        "func (c C) Close() error {\n\tpanic(\"not implemented\") // TODO: Implement\n}\n"
    );
}

#[test]
fn output_is_deterministic() {
    let run = || gen(home("package home\n"), "f *F", "io.ReadWriteCloser");
    assert_eq!(run(), run());
}
