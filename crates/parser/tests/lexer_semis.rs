use goimpl_syntax::lexer::{Lexer, Tok};

fn tok_name(t: &Tok<'_>) -> &'static str {
    match t {
        Tok::Ident(_) => "IDENT",
        Tok::IntLit(_) => "INT",
        Tok::FloatLit(_) => "FLOAT",
        Tok::ImagLit(_) => "IMAG",
        Tok::RuneLit(_) => "CHAR",
        Tok::StringLit(_) | Tok::RawStringLit(_) => "STRING",
        Tok::Semi => ";",
        Tok::Star => "*",
        Tok::Inc => "++",
        Tok::Dec => "--",
        Tok::Arrow => "<-",
        Tok::Ellipsis => "...",
        Tok::LParen => "(",
        Tok::RParen => ")",
        Tok::LBrack => "[",
        Tok::RBrack => "]",
        Tok::LBrace => "{",
        Tok::RBrace => "}",
        Tok::Comma => ",",
        Tok::Dot => ".",
        Tok::KwBreak => "break",
        Tok::KwContinue => "continue",
        Tok::KwFallthrough => "fallthrough",
        Tok::KwReturn => "return",
        Tok::KwFunc => "func",
        Tok::KwType => "type",
        Tok::KwInterface => "interface",
        Tok::KwChan => "chan",
        Tok::Error => "ERROR",
        _ => "OTHER",
    }
}

fn lex_names(input: &str) -> String {
    Lexer::new(input)
        .map(|(_, t, _)| tok_name(&t))
        .collect::<Vec<_>>()
        .join(" ")
}

fn injected_semis(input: &str) -> Vec<usize> {
    Lexer::new(input)
        .filter_map(|(s, t, e)| (matches!(t, Tok::Semi) && s == e).then_some(s))
        .collect()
}

struct SemiCase {
    input: &'static str,
    want: &'static str,
}

#[rustfmt::skip]
const SEMICOLON_TESTS: &[SemiCase] = &[
    SemiCase { input: "", want: "" },
    SemiCase { input: "\u{FEFF};", want: ";" },
    SemiCase { input: ";", want: ";" },

    SemiCase { input: "foo\n", want: "IDENT ;" },
    SemiCase { input: "123\n", want: "INT ;" },
    SemiCase { input: "1.2\n", want: "FLOAT ;" },
    SemiCase { input: "2i\n", want: "IMAG ;" },
    SemiCase { input: "'x'\n", want: "CHAR ;" },
    SemiCase { input: "\"x\"\n", want: "STRING ;" },
    SemiCase { input: "`x`\n", want: "STRING ;" },

    SemiCase { input: "*\n", want: "*" },
    SemiCase { input: "<-\n", want: "<-" },
    SemiCase { input: "...\n", want: "..." },
    SemiCase { input: "++\n", want: "++ ;" },
    SemiCase { input: "--\n", want: "-- ;" },

    SemiCase { input: "(\n", want: "(" },
    SemiCase { input: "[\n", want: "[" },
    SemiCase { input: "{\n", want: "{" },
    SemiCase { input: ",\n", want: "," },
    SemiCase { input: ".\n", want: "." },
    SemiCase { input: ")\n", want: ") ;" },
    SemiCase { input: "]\n", want: "] ;" },
    SemiCase { input: "}\n", want: "} ;" },

    SemiCase { input: "break\n", want: "break ;" },
    SemiCase { input: "continue\n", want: "continue ;" },
    SemiCase { input: "fallthrough\n", want: "fallthrough ;" },
    SemiCase { input: "return\n", want: "return ;" },
    SemiCase { input: "func\n", want: "func" },
    SemiCase { input: "type\n", want: "type" },
    SemiCase { input: "interface\n", want: "interface" },
    SemiCase { input: "chan\n", want: "chan" },

    SemiCase { input: "foo//comment\n", want: "IDENT ;" },
    SemiCase { input: "foo//comment", want: "IDENT ;" },
    SemiCase { input: "foo/*comment*/\n", want: "IDENT ;" },
    SemiCase { input: "foo/*\n*/", want: "IDENT ;" },
    SemiCase { input: "foo/*comment*/    \n", want: "IDENT ;" },
    SemiCase { input: "foo    /*\n*/    ", want: "IDENT ;" },

    SemiCase { input: "foo\n\n\n", want: "IDENT ;" },
    SemiCase { input: "foo\r\nbar\r\n", want: "IDENT ; IDENT ;" },
    SemiCase { input: "foo", want: "IDENT ;" },
    SemiCase { input: "Read(p []byte) (n int, err error)\n", want: "IDENT ( IDENT [ ] IDENT ) ( IDENT IDENT , IDENT IDENT ) ;" },
];

#[test]
fn semicolon_insertion_table() {
    for case in SEMICOLON_TESTS {
        let got = lex_names(case.input);
        assert_eq!(got, case.want, "input=<<{}>>", case.input.escape_debug());
    }
}

#[test]
fn injected_semis_sit_at_the_line_break() {
    assert_eq!(injected_semis("a\nb\n"), vec![1, 3]);
    assert_eq!(injected_semis("x /*\n*/"), vec![4]);
    assert_eq!(injected_semis("x"), vec![1]);
}

#[test]
fn explicit_semicolons_keep_their_width() {
    let toks: Vec<_> = Lexer::new("a;b").collect();
    assert_eq!(toks[1], (1, Tok::Semi, 2));
}

#[test]
fn misplaced_bom_is_an_error() {
    let mut lx = Lexer::new("a \u{FEFF}");
    let names: Vec<_> = lx.by_ref().map(|(_, t, _)| tok_name(&t)).collect();
    assert_eq!(names, vec!["IDENT", "ERROR"]);
    let diags = lx.take_diags();
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("byte order mark"));
}
