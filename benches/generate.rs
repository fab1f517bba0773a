use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use goimpl::{generate_with, MemorySource};
use goimpl_syntax::lexer::Lexer;
use goimpl_syntax::{parse_file, AstArena};
use std::fmt::Write as _;
use std::hint::black_box as bb;

// =============================================================================
// Corpus
// =============================================================================

const HOME: &str = "example.com/bench";

const IO: &str = r#"
package io

type Reader interface {
    Read(p []byte) (n int, err error)
}

type Writer interface {
    Write(p []byte) (n int, err error)
}

type Closer interface {
    Close() error
}

type ReadWriteCloser interface {
    Reader
    Writer
    Closer
}
"#;

const SERVICE: &str = r#"
package bench

import (
    "context"
    "io"
)

type Key string

// Store persists values by key.
type Store[V any] interface {
    io.Closer

    // Get returns the value stored under key.
    Get(ctx context.Context, key Key) (V, error)
    Put(context.Context, Key, V) error
    Scan(ctx context.Context, prefix Key, fn func(Key, V) bool) error
    Watch(ctx context.Context) (<-chan Key, error)
}

type memStore struct {
    data map[Key][]byte
}

func (m *memStore) Close() error {
    for k := range m.data {
        delete(m.data, k)
    }
    return nil
}
"#;

const CONTEXT: &str = r#"
package context

type Context interface {
    Done() <-chan struct{}
    Err() error
    Value(key any) any
}
"#;

/// A package with `n` interfaces of eight methods each, chained by embedding.
fn wide_package(n: usize) -> String {
    let mut src = String::from("package bench\n\n");
    for i in 0..n {
        let _ = writeln!(src, "type I{i} interface {{");
        if i > 0 {
            let _ = writeln!(src, "\tI{}", i - 1);
        }
        for m in 0..8 {
            let _ = writeln!(src, "\tM{i}_{m}(string, int, []byte) (int, error)");
        }
        src.push_str("}\n\n");
    }
    src
}

fn source(home: &str) -> MemorySource {
    MemorySource::new()
        .with_package("io", &[("io.go", IO)])
        .with_package("context", &[("context.go", CONTEXT)])
        .with_package(HOME, &[("bench.go", home)])
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, input) in [("service", SERVICE.to_string()), ("wide_64", wide_package(64))] {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::new("lex", name), &input, |b, input| {
            b.iter(|| {
                let mut n = 0usize;
                for t in Lexer::new(bb(input)) {
                    bb(&t);
                    n += 1;
                }
                bb(n)
            })
        });
        group.bench_with_input(BenchmarkId::new("parse_file", name), &input, |b, input| {
            b.iter(|| {
                let mut arena = AstArena::new();
                bb(parse_file(&mut arena, bb(input)).is_ok())
            })
        });
    }
    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    group.bench_function("generic_store", |b| {
        b.iter(|| {
            let out = generate_with(
                source(SERVICE),
                &MemorySource::dir_of(HOME),
                "m *memStore",
                "Store[[]byte]",
                true,
            );
            bb(out.map(|s| s.len()).unwrap_or(0))
        })
    });

    for depth in [8usize, 64] {
        let src = wide_package(depth);
        let iface = format!("I{}", depth - 1);
        group.throughput(Throughput::Elements((depth * 8) as u64));
        group.bench_with_input(BenchmarkId::new("embedded_chain", depth), &src, |b, src| {
            b.iter(|| {
                let out = generate_with(
                    source(src),
                    &MemorySource::dir_of(HOME),
                    "w *Wide",
                    &iface,
                    true,
                );
                bb(out.map(|s| s.len()).unwrap_or(0))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_generate);
criterion_main!(benches);
