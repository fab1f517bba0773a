// fuzz_targets/parse.rs
#![no_main]

use goimpl_syntax::lexer::{Lexer, Tok};
use goimpl_syntax::{parse_file, parse_type, AstArena};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    let mut last_real_end = 0usize;
    for (start, tok, end) in Lexer::new(&s) {
        assert!(start <= end && end <= s.len());
        if !(matches!(tok, Tok::Semi) && start == end) {
            assert!(start >= last_real_end);
            last_real_end = end;
        }
    }

    let mut arena = AstArena::new();
    if let Err(failure) = parse_file(&mut arena, &s) {
        assert!(!failure.diags.is_empty());
        for d in &failure.diags {
            assert!(d.span.start <= d.span.end);
            assert!(d.span.end as usize <= s.len());
        }
    }
    let _ = parse_type(&mut arena, &s);
});
