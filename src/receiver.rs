//! Receiver argument: `r *Thing`, `t Tree[K, V any]`.

use std::fmt;
use std::str::FromStr;

use crate::error::{ImplError, Result};

pub(crate) const KEYWORDS: [&str; 25] = [
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

fn is_ident_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

fn is_ident_continue(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

/// Reports whether `s` is a Go identifier that is not a keyword.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if is_ident_start(c))
        && chars.all(is_ident_continue)
        && !KEYWORDS.contains(&s)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    pub name: String,
    /// Constraint as written; `None` when omitted.
    pub constraint: Option<String>,
}

/// Parsed receiver argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverSpec {
    pub var_name: String,
    pub pointer: bool,
    pub type_name: String,
    pub type_params: Vec<TypeParam>,
}

impl ReceiverSpec {
    pub fn parse(input: &str) -> Result<Self> {
        Scanner::new(input).receiver()
    }

    pub fn type_param_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.type_params.iter().map(|p| p.name.as_str())
    }
}

impl FromStr for ReceiverSpec {
    type Err = ImplError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Formats the receiver clause contents, type parameters by name only:
/// `r *Thing[T, U]`.
impl fmt::Display for ReceiverSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.var_name)?;
        if self.pointer {
            f.write_str("*")?;
        }
        f.write_str(&self.type_name)?;
        if !self.type_params.is_empty() {
            f.write_str("[")?;
            for (i, p) in self.type_params.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                f.write_str(&p.name)?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_ws(&mut self) -> bool {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
        rest.len() != trimmed.len()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn fail<T>(&self, reason: impl Into<String>) -> Result<T> {
        Err(ImplError::invalid_receiver(self.input, reason))
    }

    fn ident(&mut self, what: &str) -> Result<&'a str> {
        let rest = self.rest();
        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, c)) if is_ident_start(c) => {}
            _ => return self.fail(format!("missing {what}")),
        }
        let end = chars
            .find(|(_, c)| !is_ident_continue(*c))
            .map_or(rest.len(), |(i, _)| i);
        let ident = &rest[..end];
        if KEYWORDS.contains(&ident) {
            return self.fail(format!("{what} {ident:?} is a reserved word"));
        }
        self.pos += end;
        Ok(ident)
    }

    fn receiver(mut self) -> Result<ReceiverSpec> {
        self.skip_ws();
        let var_name = self.ident("variable name")?.to_string();
        let spaced = self.skip_ws();
        let pointer = self.eat('*');
        self.skip_ws();
        if !spaced && !pointer {
            return self.fail("missing type name");
        }
        let type_name = self.ident("type name")?.to_string();

        self.skip_ws();
        let type_params = if self.eat('[') {
            self.type_params()?
        } else {
            Vec::new()
        };

        self.skip_ws();
        if !self.rest().is_empty() {
            return self.fail(format!("unexpected {:?}", self.rest()));
        }

        Ok(ReceiverSpec {
            var_name,
            pointer,
            type_name,
            type_params,
        })
    }

    /// Parses up to and including the closing `]`.
    fn type_params(&mut self) -> Result<Vec<TypeParam>> {
        let mut params: Vec<TypeParam> = Vec::new();
        // Names still waiting for the constraint of a later `name C` entry.
        let mut pending = 0usize;

        loop {
            self.skip_ws();
            if self.eat(']') {
                break;
            }
            let name = self.ident("type parameter name")?.to_string();
            if params.iter().any(|p| p.name == name) {
                return self.fail(format!("duplicate type parameter {name:?}"));
            }
            self.skip_ws();
            let constraint = self.constraint()?;
            let done = constraint.is_some();
            params.push(TypeParam { name, constraint });
            if done {
                let len = params.len();
                let shared = params[len - 1].constraint.clone();
                for p in &mut params[len - 1 - pending..len - 1] {
                    p.constraint = shared.clone();
                }
                pending = 0;
            } else {
                pending += 1;
            }

            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat(']') {
                break;
            }
            return self.fail("malformed type parameter list");
        }

        if params.is_empty() {
            return self.fail("empty type parameter list");
        }
        Ok(params)
    }

    /// Constraint text up to the next top-level `,` or `]`.
    fn constraint(&mut self) -> Result<Option<String>> {
        let rest = self.rest();
        let mut depth = 0usize;
        let mut end = None;
        for (i, c) in rest.char_indices() {
            match c {
                '[' | '(' | '{' => depth += 1,
                ']' if depth == 0 => {
                    end = Some(i);
                    break;
                }
                ']' | ')' | '}' => {
                    if depth == 0 {
                        return self.fail("unbalanced brackets");
                    }
                    depth -= 1;
                }
                ',' if depth == 0 => {
                    end = Some(i);
                    break;
                }
                _ => {}
            }
        }
        let Some(end) = end else {
            return self.fail("unclosed type parameter list");
        };
        self.pos += end;
        let text = rest[..end].trim();
        Ok((!text.is_empty()).then(|| text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(is_identifier("r"));
        assert!(is_identifier("_x1"));
        assert!(is_identifier("ñandú"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("func"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn display_lists_type_param_names() {
        let r = ReceiverSpec::parse("t *Tree[K comparable, V any]").unwrap();
        assert_eq!(r.to_string(), "t *Tree[K, V]");
    }
}
