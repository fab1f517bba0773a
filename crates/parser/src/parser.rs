//! Recursive-descent parser for the declaration level of Go source.
//!
//! Function bodies are skipped by brace matching and const/var specs keep
//! only their names, so everything below the declaration level is left
//! unparsed. The parser stops at the first syntax error.

use crate::ast::*;
use crate::error::{Diag, ParseFailure};
use crate::lexer::{LexComment, Lexer, Tok};
use std::ops::Range;

type Spanned<'src> = (usize, Tok<'src>, usize);

/// Marker for an already-reported syntax error.
struct Bail;

type PResult<T> = Result<T, Bail>;

/// Parses a complete Go source file into `arena`.
pub fn parse_file(arena: &mut AstArena, src: &str) -> Result<SourceFile, ParseFailure> {
    let mut p = Parser::new(arena, src);
    let res = p.source_file();
    p.finish(res)
}

/// Parses a standalone type expression such as `map[string]io.Reader`.
pub fn parse_type(arena: &mut AstArena, src: &str) -> Result<TypeId, ParseFailure> {
    let mut p = Parser::new(arena, src);
    let res = p.standalone(|p| p.typ());
    p.finish(res)
}

/// Parses a comma-separated list of types, as written between `[` and `]`
/// of a generic instantiation.
pub fn parse_type_list(arena: &mut AstArena, src: &str) -> Result<Vec<TypeId>, ParseFailure> {
    let mut p = Parser::new(arena, src);
    let res = p.standalone(|p| {
        let mut out = vec![p.typ()?];
        while p.eat(&Tok::Comma).is_some() {
            if p.peek().is_none() || p.at(&Tok::Semi) {
                break;
            }
            out.push(p.typ()?);
        }
        Ok(out)
    });
    p.finish(res)
}

fn starts_type(t: Option<&Tok<'_>>) -> bool {
    matches!(
        t,
        Some(
            Tok::Ident(_)
                | Tok::Star
                | Tok::LBrack
                | Tok::KwMap
                | Tok::KwChan
                | Tok::KwFunc
                | Tok::KwStruct
                | Tok::KwInterface
                | Tok::LParen
                | Tok::Arrow
        )
    )
}

fn is_blank(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_whitespace())
}

fn newlines(s: &str) -> usize {
    s.bytes().filter(|b| *b == b'\n').count()
}

/// Unquotes an interpreted or raw string literal.
fn unquote(lit: &str) -> String {
    if let Some(raw) = lit.strip_prefix('`').and_then(|s| s.strip_suffix('`')) {
        return raw.replace('\r', "");
    }
    let inner = lit
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(lit);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(c @ ('\\' | '"' | '\'')) => out.push(c),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// One entry of a parameter list before Go's grouping rule is applied.
enum ParamEntry {
    /// Lone identifier: a name when the list is named, a type otherwise.
    Bare(IdentName),
    Named(IdentName, Option<Span>, TypeId),
    Anon(Option<Span>, TypeId),
}

struct Parser<'src, 'a> {
    src: &'src str,
    toks: Vec<Spanned<'src>>,
    pos: usize,
    prev: Span,
    arena: &'a mut AstArena,
    diags: Vec<Diag>,
    comments: Vec<LexComment>,
    groups: Vec<Range<usize>>,
    group_ids: Vec<Option<CommentGroupId>>,
}

impl<'src, 'a> Parser<'src, 'a> {
    fn new(arena: &'a mut AstArena, src: &'src str) -> Self {
        let mut lexer = Lexer::new(src);
        let toks: Vec<_> = lexer.by_ref().collect();
        let diags = lexer.take_diags();
        let comments = lexer.take_comments();
        let groups = group_comments(src, &comments);
        let group_ids = vec![None; groups.len()];
        Self {
            src,
            toks,
            pos: 0,
            prev: Span::empty_at(0),
            arena,
            diags,
            comments,
            groups,
            group_ids,
        }
    }

    fn finish<T>(self, res: PResult<T>) -> Result<T, ParseFailure> {
        match res {
            Ok(v) if self.diags.is_empty() => Ok(v),
            _ => {
                let mut diags = self.diags;
                if diags.is_empty() {
                    diags.push(Diag::parse(
                        Span::empty_at(self.src.len()),
                        "syntax error",
                    ));
                }
                Err(ParseFailure { diags })
            }
        }
    }

    fn standalone<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let v = f(self)?;
        self.eat(&Tok::Semi);
        if self.peek().is_some() {
            return self.unexpected("end of input");
        }
        Ok(v)
    }

    // ---------------------------------------------------------------------
    // Token cursor
    // ---------------------------------------------------------------------

    #[inline]
    fn peek(&self) -> Option<&Tok<'src>> {
        self.peek_nth(0)
    }

    #[inline]
    fn peek_nth(&self, n: usize) -> Option<&Tok<'src>> {
        self.toks.get(self.pos + n).map(|t| &t.1)
    }

    #[inline]
    fn kind(&self) -> Option<Tok<'src>> {
        self.peek().cloned()
    }

    #[inline]
    fn at(&self, t: &Tok<'src>) -> bool {
        self.peek() == Some(t)
    }

    fn cur_span(&self) -> Span {
        match self.toks.get(self.pos) {
            Some((s, _, e)) => Span::new(*s, *e),
            None => Span::empty_at(self.src.len()),
        }
    }

    fn bump(&mut self) -> Span {
        let sp = self.cur_span();
        if self.pos < self.toks.len() {
            self.pos += 1;
            self.prev = sp;
        }
        sp
    }

    fn eat(&mut self, t: &Tok<'src>) -> Option<Span> {
        if self.at(t) {
            Some(self.bump())
        } else {
            None
        }
    }

    fn expect(&mut self, t: &Tok<'src>, what: &str) -> PResult<Span> {
        match self.eat(t) {
            Some(sp) => Ok(sp),
            None => self.unexpected(what),
        }
    }

    fn unexpected<T>(&mut self, what: &str) -> PResult<T> {
        let found = match self.peek() {
            Some(Tok::Semi) => "newline or `;`".to_string(),
            Some(t) => format!("`{t}`"),
            None => "EOF".to_string(),
        };
        let span = self.cur_span();
        self.diags
            .push(Diag::parse(span, format!("expected {what}, found {found}")));
        Err(Bail)
    }

    fn error<T>(&mut self, span: Span, msg: &str) -> PResult<T> {
        self.diags.push(Diag::parse(span, msg));
        Err(Bail)
    }

    fn ident(&mut self, what: &str) -> PResult<IdentName> {
        if let Some((s, Tok::Ident(name), e)) = self.toks.get(self.pos).cloned() {
            self.bump();
            let sym = self.arena.intern(name);
            return Ok(IdentName {
                sym,
                pos: Span::new(s, e),
            });
        }
        self.unexpected(what)
    }

    /// Token after the bracket that closes the one at `open`.
    fn after_matching(&self, open: usize) -> Option<&Tok<'src>> {
        let mut depth = 0usize;
        for (i, (_, t, _)) in self.toks.iter().enumerate().skip(open) {
            match t {
                Tok::LBrack | Tok::LParen | Tok::LBrace => depth += 1,
                Tok::RBrack | Tok::RParen | Tok::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return self.toks.get(i + 1).map(|t| &t.1);
                    }
                }
                _ => {}
            }
        }
        None
    }

    // ---------------------------------------------------------------------
    // Comments
    // ---------------------------------------------------------------------

    fn alloc_comment_group(&mut self, range: Range<usize>) -> Option<CommentGroupId> {
        if range.is_empty() {
            return None;
        }
        let src = self.src;
        let mut ids = Vec::with_capacity(range.len());
        let mut span: Option<Span> = None;
        for c in &self.comments[range] {
            let text = self
                .arena
                .intern(&src[c.span.start as usize..c.span.end as usize]);
            ids.push(
                self.arena
                    .comments
                    .alloc(Comment { kind: c.kind, text }, c.span),
            );
            span = Some(span.map_or(c.span, |s| s.to(c.span)));
        }
        let comments = self.arena.list_comment_ids(ids);
        let span = span.unwrap_or_default();
        Some(self.arena.comment_groups.alloc(CommentGroup { comments }, span))
    }

    /// Every comment above the package clause, as one group.
    fn header_group(&mut self, package_start: usize) -> Option<CommentGroupId> {
        let n = self
            .comments
            .partition_point(|c| (c.span.end as usize) <= package_start);
        self.alloc_comment_group(0..n)
    }

    /// Doc comment of the declaration starting at `pos`: the comment group
    /// ending on the line directly above, starting on a line of its own.
    fn doc_for(&mut self, pos: usize) -> Option<CommentGroupId> {
        let comments = &self.comments;
        let idx = self
            .groups
            .partition_point(|g| (comments[g.end - 1].span.end as usize) <= pos);
        let gi = idx.checked_sub(1)?;

        let group = self.groups[gi].clone();
        let first = self.comments[group.start].span.start as usize;
        let last = self.comments[group.end - 1].span.end as usize;
        let gap = self.src.get(last..pos)?;
        if !is_blank(gap) || newlines(gap) != 1 {
            return None;
        }
        let line_start = self.src[..first].rfind('\n').map_or(0, |i| i + 1);
        if !is_blank(&self.src[line_start..first]) {
            return None;
        }

        if let Some(id) = self.group_ids[gi] {
            return Some(id);
        }
        let id = self.alloc_comment_group(group);
        self.group_ids[gi] = id;
        id
    }

    // ---------------------------------------------------------------------
    // Declarations
    // ---------------------------------------------------------------------

    fn source_file(&mut self) -> PResult<SourceFile> {
        let package_pos = self.expect(&Tok::KwPackage, "`package`")?;
        let header = self.header_group(package_pos.start as usize);
        let name = self.ident("package name")?;
        self.end_decl()?;

        let mut decls = Vec::new();
        while let Some(tok) = self.kind() {
            let decl = match tok {
                Tok::Semi => {
                    self.bump();
                    continue;
                }
                Tok::KwImport => TopLevelDecl::Decl(self.gen_decl(GenDeclKind::Import)?),
                Tok::KwConst => TopLevelDecl::Decl(self.gen_decl(GenDeclKind::Const)?),
                Tok::KwVar => TopLevelDecl::Decl(self.gen_decl(GenDeclKind::Var)?),
                Tok::KwType => TopLevelDecl::Decl(self.gen_decl(GenDeclKind::Type)?),
                Tok::KwFunc => TopLevelDecl::Func(self.func_decl()?),
                _ => return self.unexpected("declaration"),
            };
            decls.push(decl);
            self.end_decl()?;
        }

        let decls = self.arena.list_top_decls(decls);
        Ok(SourceFile {
            package_pos,
            name: name.sym,
            decls,
            header,
        })
    }

    fn end_decl(&mut self) -> PResult<()> {
        if self.peek().is_none() || self.eat(&Tok::Semi).is_some() {
            Ok(())
        } else {
            self.unexpected("`;` or newline")
        }
    }

    fn gen_decl(&mut self, kind: GenDeclKind) -> PResult<DeclId> {
        let kw_pos = self.bump();
        let doc = self.doc_for(kw_pos.start as usize);

        let mut specs = Vec::new();
        let (l_paren, r_paren) = if let Some(l) = self.eat(&Tok::LParen) {
            while !self.at(&Tok::RParen) {
                specs.push(self.spec(kind, true)?);
                if self.eat(&Tok::Semi).is_none() {
                    break;
                }
            }
            let r = self.expect(&Tok::RParen, "`)`")?;
            (Some(l), Some(r))
        } else {
            specs.push(self.spec(kind, false)?);
            (None, None)
        };

        let specs = self.arena.list_specs(specs);
        let span = kw_pos.to(self.prev);
        Ok(self.arena.decls.alloc(
            Decl::Gen(GenDecl {
                doc,
                kw_pos,
                kind,
                l_paren,
                specs,
                r_paren,
            }),
            span,
        ))
    }

    fn spec(&mut self, kind: GenDeclKind, grouped: bool) -> PResult<Spec> {
        match kind {
            GenDeclKind::Import => self.import_spec().map(Spec::Import),
            GenDeclKind::Type => self.type_spec(grouped).map(Spec::Type),
            GenDeclKind::Const | GenDeclKind::Var => self.value_spec().map(Spec::Value),
        }
    }

    fn import_spec(&mut self) -> PResult<ImportSpec> {
        let name = match self.kind() {
            Some(Tok::Dot) => Some(ImportName::Dot(self.bump())),
            Some(Tok::Ident("_")) => Some(ImportName::Blank(self.bump())),
            Some(Tok::Ident(_)) => {
                let n = self.ident("import name")?;
                Some(ImportName::Name(n.sym, n.pos))
            }
            _ => None,
        };
        let path = self.string_lit("import path")?;
        Ok(ImportSpec { name, path })
    }

    fn string_lit(&mut self, what: &str) -> PResult<StringLit> {
        match self.kind() {
            Some(Tok::StringLit(s)) | Some(Tok::RawStringLit(s)) => {
                let raw = self.bump();
                let value = self.arena.intern(&unquote(s));
                Ok(StringLit { value, raw })
            }
            _ => self.unexpected(what),
        }
    }

    fn value_spec(&mut self) -> PResult<ValueSpec> {
        let start = self.cur_span();
        let mut names = vec![self.ident("identifier")?];
        while self.eat(&Tok::Comma).is_some() {
            names.push(self.ident("identifier")?);
        }

        // Type and initializer run up to the end of the declaration.
        let mut depth = 0usize;
        while let Some(t) = self.peek() {
            match t {
                Tok::LParen | Tok::LBrack | Tok::LBrace => depth += 1,
                Tok::RParen | Tok::RBrack | Tok::RBrace => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                Tok::Semi if depth == 0 => break,
                _ => {}
            }
            self.bump();
        }

        let names = self.arena.list_ident_names(names);
        Ok(ValueSpec {
            names,
            span: start.to(self.prev),
        })
    }

    fn type_spec(&mut self, grouped: bool) -> PResult<TypeSpecId> {
        let name = self.ident("type name")?;
        let doc = if grouped {
            self.doc_for(name.pos.start as usize)
        } else {
            None
        };
        let type_params = if self.at(&Tok::LBrack) && self.looks_like_type_params() {
            Some(self.type_params()?)
        } else {
            None
        };
        let assign_pos = self.eat(&Tok::Assign);
        let typ = self.typ()?;

        let span = name.pos.to(self.prev);
        Ok(self.arena.type_specs.alloc(
            TypeSpec {
                doc,
                name: name.sym,
                name_pos: name.pos,
                type_params,
                assign_pos,
                typ,
                alias: assign_pos.is_some(),
            },
            span,
        ))
    }

    /// Disambiguates `type T[P any] ...` from the array type `type T [N]E`.
    ///
    /// `[P *C]`, `[P (C)]` and `[P [2]C]` read as array lengths unless the
    /// brackets hold a top-level comma.
    fn looks_like_type_params(&self) -> bool {
        if !matches!(self.peek_nth(1), Some(Tok::Ident(_))) {
            return false;
        }
        match self.peek_nth(2) {
            Some(Tok::Star | Tok::LParen) => self.comma_inside(self.pos),
            Some(Tok::LBrack) => {
                matches!(self.peek_nth(3), Some(Tok::RBrack)) || self.comma_inside(self.pos)
            }
            Some(
                Tok::Ident(_)
                | Tok::Comma
                | Tok::Tilde
                | Tok::Arrow
                | Tok::KwInterface
                | Tok::KwFunc
                | Tok::KwMap
                | Tok::KwChan
                | Tok::KwStruct,
            ) => true,
            _ => false,
        }
    }

    /// Whether the bracket group opened at token `open` has a comma at its
    /// own nesting level.
    fn comma_inside(&self, open: usize) -> bool {
        let mut depth = 0usize;
        for (_, t, _) in self.toks.iter().skip(open) {
            match t {
                Tok::LBrack | Tok::LParen | Tok::LBrace => depth += 1,
                Tok::RBrack | Tok::RParen | Tok::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return false;
                    }
                }
                Tok::Comma if depth == 1 => return true,
                _ => {}
            }
        }
        false
    }

    fn type_params(&mut self) -> PResult<TypeParamsId> {
        let l_brack = self.expect(&Tok::LBrack, "`[`")?;
        let mut decls = Vec::new();
        let mut names = Vec::new();

        while !self.at(&Tok::RBrack) {
            names.push(self.ident("type parameter name")?);
            if self.eat(&Tok::Comma).is_some() {
                continue;
            }
            let constraint = self.type_elem()?;
            let span = names[0].pos.to(self.prev);
            let list = self.arena.list_ident_names(names.drain(..));
            decls.push(self.arena.type_param_decls.alloc(
                TypeParamDecl {
                    names: list,
                    constraint,
                },
                span,
            ));
            if self.eat(&Tok::Comma).is_none() {
                break;
            }
        }

        if let Some(last) = names.last() {
            let pos = last.pos;
            return self.error(pos, "missing type constraint");
        }
        if decls.is_empty() {
            let span = self.cur_span();
            return self.error(span, "empty type parameter list");
        }

        let r_brack = self.expect(&Tok::RBrack, "`]`")?;
        let params = self.arena.list_type_param_decl_ids(decls);
        Ok(self.arena.type_params.alloc(
            TypeParams {
                l_brack,
                params,
                r_brack,
            },
            l_brack.to(r_brack),
        ))
    }

    fn type_elem(&mut self) -> PResult<TypeElem> {
        let mut terms = vec![self.type_term()?];
        while self.eat(&Tok::Pipe).is_some() {
            terms.push(self.type_term()?);
        }
        Ok(TypeElem {
            terms: self.arena.list_type_terms(terms),
        })
    }

    fn type_term(&mut self) -> PResult<TypeTerm> {
        if let Some(tilde_pos) = self.eat(&Tok::Tilde) {
            let typ = self.typ()?;
            return Ok(TypeTerm::Tilde { tilde_pos, typ });
        }
        Ok(TypeTerm::Type { typ: self.typ()? })
    }

    fn func_decl(&mut self) -> PResult<FuncDeclId> {
        let func_pos = self.bump();
        let doc = self.doc_for(func_pos.start as usize);
        let recv = if self.at(&Tok::LParen) {
            Some(self.receiver()?)
        } else {
            None
        };
        let name = self.ident("function name")?;
        let type_params = if self.at(&Tok::LBrack) {
            Some(self.type_params()?)
        } else {
            None
        };
        let signature = self.signature()?;
        let body = if self.at(&Tok::LBrace) {
            Some(self.skip_block()?)
        } else {
            None
        };

        let span = func_pos.to(self.prev);
        Ok(self.arena.funcs.alloc(
            FuncDecl {
                doc,
                func_pos,
                recv,
                name: name.sym,
                name_pos: name.pos,
                type_params,
                signature,
                body,
            },
            span,
        ))
    }

    fn receiver(&mut self) -> PResult<Receiver> {
        let list = self.field_list()?;
        let ids = self.arena.fields_list(list.fields).to_vec();
        let field = match ids.as_slice() {
            [id] => self.arena.fields[*id],
            [] => return self.error(list.l_paren.to(list.r_paren), "method has no receiver"),
            _ => {
                return self.error(
                    list.l_paren.to(list.r_paren),
                    "method has multiple receivers",
                )
            }
        };
        let name = self.arena.ident_names(field.names).first().copied();
        if self.arena.ident_names(field.names).len() > 1 {
            return self.error(list.l_paren.to(list.r_paren), "method has multiple receivers");
        }
        Ok(Receiver {
            l_paren: list.l_paren,
            name,
            typ: field.typ,
            r_paren: list.r_paren,
        })
    }

    fn skip_block(&mut self) -> PResult<Span> {
        let open = self.expect(&Tok::LBrace, "`{`")?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.kind() {
                None => return self.error(open, "unclosed `{`"),
                Some(Tok::LBrace) => depth += 1,
                Some(Tok::RBrace) => depth -= 1,
                _ => {}
            }
            self.bump();
        }
        Ok(open.to(self.prev))
    }

    // ---------------------------------------------------------------------
    // Signatures and parameter lists
    // ---------------------------------------------------------------------

    fn signature(&mut self) -> PResult<SignatureId> {
        let start = self.cur_span();
        let params = self.field_list()?;
        let results = if self.at(&Tok::LParen) {
            Some(Results::Params(self.field_list()?))
        } else if starts_type(self.peek()) {
            Some(Results::Type(self.typ()?))
        } else {
            None
        };
        let span = start.to(self.prev);
        Ok(self
            .arena
            .signatures
            .alloc(Signature { params, results }, span))
    }

    fn field_list(&mut self) -> PResult<FieldList> {
        let l_paren = self.expect(&Tok::LParen, "`(`")?;
        let mut entries = Vec::new();
        while !self.at(&Tok::RParen) {
            entries.push(self.param_entry()?);
            if self.eat(&Tok::Comma).is_none() {
                break;
            }
        }
        let r_paren = self.expect(&Tok::RParen, "`)`")?;
        let fields = self.group_params(entries)?;
        Ok(FieldList {
            l_paren,
            fields: self.arena.list_fields(fields),
            r_paren,
        })
    }

    fn param_entry(&mut self) -> PResult<ParamEntry> {
        if let Some(Tok::Ident(_)) = self.peek() {
            let next = self.peek_nth(1).cloned();
            let named = match next.as_ref() {
                Some(Tok::Comma | Tok::RParen) => {
                    return Ok(ParamEntry::Bare(self.ident("parameter")?));
                }
                Some(Tok::Dot) => false,
                // `a []int` names a slice, `List[int]` instantiates a type.
                Some(Tok::LBrack) => !matches!(
                    self.after_matching(self.pos + 1),
                    Some(Tok::Comma | Tok::RParen) | None
                ),
                Some(Tok::Ellipsis) => true,
                t => starts_type(t),
            };
            if named {
                let name = self.ident("parameter name")?;
                let ellipsis = self.eat(&Tok::Ellipsis);
                let typ = self.typ()?;
                return Ok(ParamEntry::Named(name, ellipsis, typ));
            }
        }
        let ellipsis = self.eat(&Tok::Ellipsis);
        let typ = self.typ()?;
        Ok(ParamEntry::Anon(ellipsis, typ))
    }

    /// Applies Go's grouping rule: if any entry is `name Type`, lone
    /// identifiers are names sharing the next entry's type; otherwise
    /// every entry is a type.
    fn group_params(&mut self, entries: Vec<ParamEntry>) -> PResult<Vec<FieldId>> {
        let named = entries
            .iter()
            .any(|e| matches!(e, ParamEntry::Named(..)));
        let mut out = Vec::with_capacity(entries.len());
        let mut pending: Vec<IdentName> = Vec::new();

        for entry in entries {
            match (named, entry) {
                (false, ParamEntry::Bare(n)) => {
                    let typ = self.bare_named_type(n);
                    out.push(self.alloc_field(ListRef::EMPTY, n.pos, None, typ));
                }
                (false, ParamEntry::Anon(ellipsis, typ)) => {
                    let start = ellipsis.unwrap_or_else(|| self.arena.types.span(typ));
                    out.push(self.alloc_field(ListRef::EMPTY, start, ellipsis, typ));
                }
                (true, ParamEntry::Bare(n)) => pending.push(n),
                (_, ParamEntry::Named(n, ellipsis, typ)) => {
                    pending.push(n);
                    let start = pending[0].pos;
                    let names = self.arena.list_ident_names(pending.drain(..));
                    out.push(self.alloc_field(names, start, ellipsis, typ));
                }
                (true, ParamEntry::Anon(_, typ)) => {
                    let span = self.arena.types.span(typ);
                    return self.error(span, "mixed named and unnamed parameters");
                }
            }
        }

        if let Some(n) = pending.first() {
            let pos = n.pos;
            return self.error(pos, "missing parameter type");
        }
        Ok(out)
    }

    fn alloc_field(
        &mut self,
        names: ListRef<IdentName>,
        start: Span,
        ellipsis_pos: Option<Span>,
        typ: TypeId,
    ) -> FieldId {
        let span = start.to(self.arena.types.span(typ));
        self.arena.fields.alloc(
            Field {
                names,
                ellipsis_pos,
                typ,
                tag: None,
                is_embed: false,
            },
            span,
        )
    }

    fn bare_named_type(&mut self, n: IdentName) -> TypeId {
        self.arena.types.alloc(
            Type::Named {
                pkg: None,
                name: n.sym,
                name_pos: n.pos,
                args: ListRef::EMPTY,
            },
            n.pos,
        )
    }

    // ---------------------------------------------------------------------
    // Types
    // ---------------------------------------------------------------------

    fn typ(&mut self) -> PResult<TypeId> {
        let start = self.cur_span();
        let ty = match self.kind() {
            Some(Tok::Ident(_)) => return self.type_name(),
            Some(Tok::Star) => {
                let star_pos = self.bump();
                let elem = self.typ()?;
                Type::Pointer { star_pos, elem }
            }
            Some(Tok::LBrack) => {
                self.bump();
                if self.eat(&Tok::RBrack).is_some() {
                    Type::Slice { elem: self.typ()? }
                } else if let Some(sp) = self.eat(&Tok::Ellipsis) {
                    self.expect(&Tok::RBrack, "`]`")?;
                    Type::Array {
                        len: ArrayLen::Ellipsis(sp),
                        elem: self.typ()?,
                    }
                } else {
                    let len = self.array_len()?;
                    Type::Array {
                        len: ArrayLen::Expr(len),
                        elem: self.typ()?,
                    }
                }
            }
            Some(Tok::KwMap) => {
                self.bump();
                self.expect(&Tok::LBrack, "`[`")?;
                let key = self.typ()?;
                self.expect(&Tok::RBrack, "`]`")?;
                let val = self.typ()?;
                Type::Map { key, val }
            }
            Some(Tok::KwChan) => {
                self.bump();
                let dir = if self.eat(&Tok::Arrow).is_some() {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Type::Chan {
                    dir,
                    elem: self.typ()?,
                }
            }
            Some(Tok::Arrow) => {
                self.bump();
                self.expect(&Tok::KwChan, "`chan`")?;
                Type::Chan {
                    dir: ChanDir::Recv,
                    elem: self.typ()?,
                }
            }
            Some(Tok::KwFunc) => {
                self.bump();
                Type::Func {
                    sig: self.signature()?,
                }
            }
            Some(Tok::KwStruct) => self.struct_type()?,
            Some(Tok::KwInterface) => self.interface_type()?,
            Some(Tok::LParen) => {
                self.bump();
                let typ = self.typ()?;
                self.expect(&Tok::RParen, "`)`")?;
                Type::Paren { typ }
            }
            _ => return self.unexpected("type"),
        };
        Ok(self.arena.types.alloc(ty, start.to(self.prev)))
    }

    fn type_name(&mut self) -> PResult<TypeId> {
        let first = self.ident("type name")?;
        let (pkg, name) = if self.eat(&Tok::Dot).is_some() {
            (Some(first.sym), self.ident("type name")?)
        } else {
            (None, first)
        };
        let args = if self.at(&Tok::LBrack) {
            self.type_args()?
        } else {
            ListRef::EMPTY
        };
        Ok(self.arena.types.alloc(
            Type::Named {
                pkg,
                name: name.sym,
                name_pos: name.pos,
                args,
            },
            first.pos.to(self.prev),
        ))
    }

    fn type_args(&mut self) -> PResult<ListRef<TypeId>> {
        self.expect(&Tok::LBrack, "`[`")?;
        let mut args = Vec::new();
        while !self.at(&Tok::RBrack) {
            args.push(self.typ()?);
            if self.eat(&Tok::Comma).is_none() {
                break;
            }
        }
        if args.is_empty() {
            return self.unexpected("type argument");
        }
        self.expect(&Tok::RBrack, "`]`")?;
        Ok(self.arena.list_types(args))
    }

    /// Array length, kept as its source text. Consumes the closing `]`.
    fn array_len(&mut self) -> PResult<Symbol> {
        let start = self.cur_span();
        let mut depth = 0usize;
        loop {
            match self.kind() {
                None => return self.unexpected("`]`"),
                Some(Tok::LBrack | Tok::LParen | Tok::LBrace) => depth += 1,
                Some(Tok::RBrack) if depth == 0 => break,
                Some(Tok::RBrack | Tok::RParen | Tok::RBrace) => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.bump();
        }
        let src = self.src;
        let text = &src[start.start as usize..self.prev.end as usize];
        let sym = self.arena.intern(text);
        self.expect(&Tok::RBrack, "`]`")?;
        Ok(sym)
    }

    fn struct_type(&mut self) -> PResult<Type> {
        self.bump();
        self.expect(&Tok::LBrace, "`{`")?;
        let mut fields = Vec::new();
        while !self.at(&Tok::RBrace) {
            if self.eat(&Tok::Semi).is_some() {
                continue;
            }
            fields.push(self.struct_field()?);
            if self.eat(&Tok::Semi).is_none() {
                break;
            }
        }
        self.expect(&Tok::RBrace, "`}`")?;
        Ok(Type::Struct {
            fields: self.arena.list_fields(fields),
        })
    }

    fn struct_field(&mut self) -> PResult<FieldId> {
        let start = self.cur_span();
        let first = self.kind();
        let next = self.peek_nth(1).cloned();
        let embedded = match (first, next.as_ref()) {
            (Some(Tok::Star), _) => Some(true),
            (Some(Tok::Ident(_)), next) => Some(match next {
                None
                | Some(
                    Tok::Dot | Tok::Semi | Tok::RBrace | Tok::StringLit(_) | Tok::RawStringLit(_),
                ) => true,
                Some(Tok::LBrack) => matches!(
                    self.after_matching(self.pos + 1),
                    None | Some(
                        Tok::Semi | Tok::RBrace | Tok::StringLit(_) | Tok::RawStringLit(_)
                    )
                ),
                _ => false,
            }),
            _ => None,
        };
        let Some(embedded) = embedded else {
            return self.unexpected("field name or embedded type");
        };

        let (names, typ) = if embedded {
            (ListRef::EMPTY, self.typ()?)
        } else {
            let mut names = vec![self.ident("field name")?];
            while self.eat(&Tok::Comma).is_some() {
                names.push(self.ident("field name")?);
            }
            let typ = self.typ()?;
            (self.arena.list_ident_names(names), typ)
        };

        let tag = match self.peek() {
            Some(Tok::StringLit(_) | Tok::RawStringLit(_)) => Some(self.string_lit("tag")?),
            _ => None,
        };

        let span = start.to(self.prev);
        Ok(self.arena.fields.alloc(
            Field {
                names,
                ellipsis_pos: None,
                typ,
                tag,
                is_embed: embedded,
            },
            span,
        ))
    }

    fn interface_type(&mut self) -> PResult<Type> {
        self.bump();
        self.expect(&Tok::LBrace, "`{`")?;
        let mut elems = Vec::new();
        while !self.at(&Tok::RBrace) {
            if self.eat(&Tok::Semi).is_some() {
                continue;
            }
            elems.push(self.interface_elem()?);
            if self.eat(&Tok::Semi).is_none() {
                break;
            }
        }
        self.expect(&Tok::RBrace, "`}`")?;
        Ok(Type::Interface {
            elems: self.arena.list_interface_elems(elems),
        })
    }

    fn interface_elem(&mut self) -> PResult<InterfaceElem> {
        if matches!(
            (self.peek(), self.peek_nth(1)),
            (Some(Tok::Ident(_)), Some(Tok::LParen))
        ) {
            let name = self.ident("method name")?;
            let doc = self.doc_for(name.pos.start as usize);
            let sig = self.signature()?;
            return Ok(InterfaceElem::Method {
                doc,
                name: name.sym,
                name_pos: name.pos,
                sig,
            });
        }
        Ok(InterfaceElem::TypeElem(self.type_elem()?))
    }
}

/// Splits comments into groups of adjacent comments: at most one line
/// break and nothing but whitespace between neighbours.
fn group_comments(src: &str, comments: &[LexComment]) -> Vec<Range<usize>> {
    let mut groups = Vec::new();
    let mut start = 0;
    for i in 1..=comments.len() {
        let split = i == comments.len() || {
            let gap = src
                .get(comments[i - 1].span.end as usize..comments[i].span.start as usize)
                .unwrap_or("");
            !is_blank(gap) || newlines(gap) > 1
        };
        if split {
            groups.push(start..i);
            start = i;
        }
    }
    groups
}
