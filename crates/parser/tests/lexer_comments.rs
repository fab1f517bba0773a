use goimpl_syntax::ast::CommentKind;
use goimpl_syntax::lexer::{Lexer, Tok};

fn comments(src: &str) -> Vec<(CommentKind, &str)> {
    let mut lx = Lexer::new(src);
    lx.by_ref().for_each(drop);
    lx.take_comments()
        .into_iter()
        .map(|c| (c.kind, &src[c.span.start as usize..c.span.end as usize]))
        .collect()
}

#[test]
fn line_and_block_comments_are_kept() {
    let src = "// Package p.\npackage p /* inline */\n\n// Reader reads.\ntype Reader interface{}\n";
    assert_eq!(
        comments(src),
        vec![
            (CommentKind::Line, "// Package p."),
            (CommentKind::Block, "/* inline */"),
            (CommentKind::Line, "// Reader reads."),
        ]
    );
}

#[test]
fn line_comment_stops_before_carriage_return() {
    assert_eq!(
        comments("x // hi\r\ny"),
        vec![(CommentKind::Line, "// hi")]
    );
}

#[test]
fn comment_markers_inside_strings_are_not_comments() {
    assert!(comments(r#"x := "// not a comment""#).is_empty());
    assert!(comments("x := `/* nope */`").is_empty());
}

#[test]
fn build_constraint_is_a_line_comment() {
    let got = comments("//go:build ignore\n\npackage main\n");
    assert_eq!(got, vec![(CommentKind::Line, "//go:build ignore")]);
}

#[test]
fn unterminated_block_comment_reports_error() {
    let mut lx = Lexer::new("a /* open");
    let toks: Vec<_> = lx.by_ref().map(|(_, t, _)| t).collect();
    assert!(toks.contains(&Tok::Error));
    let diags = lx.take_diags();
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("unterminated comment"));
    assert_eq!(lx.take_comments().len(), 1);
}

#[test]
fn numbers_do_not_swallow_ellipsis_or_selectors() {
    let toks: Vec<_> = Lexer::new("[1...]").map(|(_, t, _)| t).collect();
    assert_eq!(toks[1], Tok::IntLit("1"));

    let toks: Vec<_> = Lexer::new("0x1p-2 1e+9 0b1010 1_000 .5").map(|(_, t, _)| t).collect();
    assert_eq!(
        toks,
        vec![
            Tok::FloatLit("0x1p-2"),
            Tok::FloatLit("1e+9"),
            Tok::IntLit("0b1010"),
            Tok::IntLit("1_000"),
            Tok::FloatLit(".5"),
            Tok::Semi,
        ]
    );
}
