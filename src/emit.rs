//! Final output text.

/// One import of the generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLine {
    pub path: String,
    /// Qualifier used by the stubs.
    pub alias: String,
    /// Name from the package clause, or the best guess at it.
    pub name: String,
}

impl ImportLine {
    fn spec(&self) -> String {
        if self.alias == self.name {
            format!("{:?}", self.path)
        } else {
            format!("{} {:?}", self.alias, self.path)
        }
    }
}

/// Joins `stubs` with blank lines behind an optional `package`/`import`
/// preamble. No stubs produce no output at all.
pub fn emit(package: &str, imports: &[ImportLine], stubs: &[String], preamble: bool) -> String {
    if stubs.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    if preamble {
        out.push_str("package ");
        out.push_str(package);
        out.push_str("\n\n");

        let mut imports: Vec<&ImportLine> = imports.iter().collect();
        imports.sort_by(|a, b| a.path.cmp(&b.path));
        match imports.as_slice() {
            [] => {}
            [one] => {
                out.push_str("import ");
                out.push_str(&one.spec());
                out.push_str("\n\n");
            }
            many => {
                out.push_str("import (\n");
                for i in many {
                    out.push('\t');
                    out.push_str(&i.spec());
                    out.push('\n');
                }
                out.push_str(")\n\n");
            }
        }
    }

    out.push_str(&stubs.join("\n\n"));
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import(path: &str, alias: &str, name: &str) -> ImportLine {
        ImportLine {
            path: path.into(),
            alias: alias.into(),
            name: name.into(),
        }
    }

    #[test]
    fn nothing_to_emit() {
        assert_eq!(emit("p", &[import("io", "io", "io")], &[], true), "");
    }

    #[test]
    fn single_import_is_unparenthesized() {
        let out = emit(
            "p",
            &[import("io", "io", "io")],
            &["func (t T) A() {}".into()],
            true,
        );
        assert_eq!(out, "package p\n\nimport \"io\"\n\nfunc (t T) A() {}\n");
    }

    #[test]
    fn block_is_sorted_and_aliases_differing_names() {
        let out = emit(
            "p",
            &[import("net/http", "http", "http"), import("example.com/x/v2", "x2", "x")],
            &["func (t T) A() {}".into(), "func (t T) B() {}".into()],
            true,
        );
        assert_eq!(
            out,
            "package p\n\nimport (\n\tx2 \"example.com/x/v2\"\n\t\"net/http\"\n)\n\n\
             func (t T) A() {}\n\nfunc (t T) B() {}\n"
        );
    }

    #[test]
    fn preamble_can_be_left_out() {
        let out = emit("p", &[import("io", "io", "io")], &["func (t T) A() {}".into()], false);
        assert_eq!(out, "func (t T) A() {}\n");
    }
}
