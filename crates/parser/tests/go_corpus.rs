use goimpl_syntax::{parse_file, AstArena};
use walkdir::WalkDir;

#[test]
fn parses_go_corpus_if_configured() {
    let Some(root) = std::env::var_os("GOIMPL_CORPUS") else {
        eprintln!("GOIMPL_CORPUS not set; skipping corpus test");
        return;
    };

    let mut total = 0usize;
    let mut arena = AstArena::new();

    for entry in WalkDir::new(&root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("go") {
            continue;
        }
        // testdata holds deliberately broken sources.
        if path.components().any(|c| c.as_os_str() == "testdata") {
            continue;
        }

        let Ok(src) = std::fs::read_to_string(path) else {
            continue;
        };
        total += 1;

        if let Err(f) = parse_file(&mut arena, &src) {
            eprintln!("FAILED: {}", path.display());
            for d in f.diags.iter().take(8) {
                let (line, col) = f.first_position(&src).unwrap_or((0, 0));
                eprintln!("  {line}:{col} {:?}: {}", d.kind, d.message);
            }
            panic!("Go corpus parse failed after {total} files");
        }
    }

    eprintln!("Parsed {total} Go files successfully.");
}
