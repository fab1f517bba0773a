//! The parts of `go.mod` that matter for locating packages.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Require {
    pub path: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replace {
    pub old: String,
    pub old_version: Option<String>,
    pub new: String,
    pub new_version: Option<String>,
}

impl Replace {
    /// Reports whether the replacement points at a directory on disk.
    pub fn is_local(&self) -> bool {
        self.new.starts_with("./") || self.new.starts_with("../") || self.new.starts_with('/')
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoMod {
    pub module: String,
    pub requires: Vec<Require>,
    pub replaces: Vec<Replace>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    Require,
    Replace,
    Other,
}

impl GoMod {
    /// Lenient line-based parse; lines it does not understand are ignored.
    pub fn parse(src: &str) -> Self {
        let mut out = Self::default();
        let mut block = Block::None;

        for line in src.lines() {
            let line = strip_comment(line).trim();
            if line.is_empty() {
                continue;
            }
            if block != Block::None {
                if line == ")" {
                    block = Block::None;
                    continue;
                }
                let words = words(line);
                match block {
                    Block::Require => out.push_require(&words),
                    Block::Replace => out.push_replace(&words),
                    Block::None | Block::Other => {}
                }
                continue;
            }

            let words = words(line);
            let Some((verb, args)) = words.split_first() else {
                continue;
            };
            let opens = args.last().map(String::as_str) == Some("(");
            match verb.as_str() {
                "module" => {
                    if let Some(m) = args.first() {
                        out.module = m.clone();
                    }
                }
                "require" if opens => block = Block::Require,
                "replace" if opens => block = Block::Replace,
                "require" => out.push_require(args),
                "replace" => out.push_replace(args),
                _ if opens => block = Block::Other,
                _ => {}
            }
        }
        out
    }

    fn push_require(&mut self, words: &[String]) {
        if let [path, version, ..] = words {
            self.requires.push(Require {
                path: path.clone(),
                version: version.clone(),
            });
        }
    }

    fn push_replace(&mut self, words: &[String]) {
        let Some(arrow) = words.iter().position(|w| w == "=>") else {
            return;
        };
        let (lhs, rhs) = (&words[..arrow], &words[arrow + 1..]);
        let (Some(old), Some(new)) = (lhs.first(), rhs.first()) else {
            return;
        };
        self.replaces.push(Replace {
            old: old.clone(),
            old_version: lhs.get(1).cloned(),
            new: new.clone(),
            new_version: rhs.get(1).cloned(),
        });
    }

    /// Version required for the module `path`.
    pub fn required_version(&self, path: &str) -> Option<&str> {
        self.requires
            .iter()
            .find(|r| r.path == path)
            .map(|r| r.version.as_str())
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(i) => &line[..i],
        None => line,
    }
}

fn words(line: &str) -> Vec<String> {
    line.split_whitespace()
        .map(|w| w.trim_matches(|c| c == '"' || c == '`').to_string())
        .collect()
}

/// Module-cache path escaping: upper-case letters become `!` + lower-case.
pub fn escape_module_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            out.push('!');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Reports whether import path `path` lies inside module `module`.
pub fn within_module<'p>(path: &'p str, module: &str) -> Option<&'p str> {
    if path == module {
        return Some("");
    }
    path.strip_prefix(module)?.strip_prefix('/')
}
