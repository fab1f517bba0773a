use std::fmt::Write as _;

use goimpl::{generate_with, MemorySource};
use proptest::prelude::*;

const HOME: &str = "example.com/prop";

/// Interface `Big` with `n` methods `M0..Mn`, and a type `T` declaring the
/// methods whose bit is set in `mask`.
fn package(n: usize, mask: u32, params: &[&str]) -> String {
    let mut src = String::from("package prop\n\ntype Big interface {\n");
    for i in 0..n {
        let _ = writeln!(src, "\tM{i}({}) error", params.join(", "));
    }
    src.push_str("}\n\ntype T struct{}\n");
    for i in 0..n {
        if mask & (1 << i) != 0 {
            let _ = writeln!(src, "\nfunc (t *T) M{i}() error {{ return nil }}");
        }
    }
    src
}

fn run(src: &str) -> String {
    let source = MemorySource::new().with_package(HOME, &[("prop.go", src)]);
    generate_with(source, &MemorySource::dir_of(HOME), "t *T", "Big", true).unwrap()
}

proptest! {
    #[test]
    fn stubs_cover_exactly_the_missing_methods(n in 1usize..12, mask in any::<u32>()) {
        let mask = mask & ((1 << n) - 1);
        let out = run(&package(n, mask, &[]));

        let stubs: Vec<&str> = out.lines().filter(|l| l.starts_with("func (")).collect();
        prop_assert_eq!(stubs.len(), n - mask.count_ones() as usize);
        for i in 0..n {
            let declared = mask & (1 << i) != 0;
            let stubbed = stubs.iter().any(|l| l.starts_with(&format!("func (t *T) M{i}(")));
            prop_assert_eq!(declared, !stubbed, "M{}", i);
        }
        prop_assert_eq!(out.is_empty(), mask.count_ones() as usize == n);
    }

    #[test]
    fn synthesized_names_are_unique(
        params in prop::collection::vec(
            prop::sample::select(vec!["string", "int", "[]string", "*T", "map[int]int", "error"]),
            1..8,
        ),
    ) {
        let out = run(&package(1, 0, &params));
        let line = out.lines().find(|l| l.starts_with("func (t *T) M0(")).unwrap();
        let inner = &line["func (t *T) M0(".len()..line.find(") error").unwrap()];
        let names: Vec<&str> = inner
            .split(", ")
            .map(|p| p.split(' ').next().unwrap())
            .collect();
        let mut uniq = names.clone();
        uniq.sort_unstable();
        uniq.dedup();
        prop_assert_eq!(uniq.len(), names.len(), "{}", line);
        prop_assert!(!names.contains(&"t"), "{}", line);
    }

    #[test]
    fn generation_is_deterministic(n in 1usize..6, mask in any::<u32>()) {
        let src = package(n, mask & ((1 << n) - 1), &["string", "int"]);
        prop_assert_eq!(run(&src), run(&src));
    }
}
