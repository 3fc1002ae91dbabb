//! Static import specifier extraction for CommonJS and ES modules.

use std::sync::LazyLock;

use regex_lite::Regex;

/// `require('x')`, `import('x')`
static CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:require|import)\s*\(\s*(?:'([^'\n]*)'|"([^"\n]*)"|`([^`$\n]*)`)\s*\)"#)
        .expect("valid call regex")
});

/// `import x from 'x'`, `export { y } from 'x'`, `import 'x'`
static FROM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:\bfrom|\bimport)\s*(?:'([^'\n]*)'|"([^"\n]*)")"#).expect("valid from regex")
});

/// Returns every static string-literal specifier in `source`, in source order.
///
/// Computed specifiers (`require(name)`, interpolated template literals) are
/// not reported, nor is anything inside comments, regex literals, or
/// ordinary strings.
pub fn scan(source: &str) -> Vec<String> {
    let masked = mask(source);

    let mut found: Vec<(usize, String)> = Vec::new();
    for re in [&*CALL_RE, &*FROM_RE] {
        for caps in re.captures_iter(&masked) {
            let Some(m) = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)) else {
                continue;
            };
            let specifier = m.as_str().trim();
            if !specifier.is_empty() {
                found.push((m.start(), specifier.to_owned()));
            }
        }
    }

    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, spec)| spec).collect()
}

/// Keywords after which a `/` starts a regex literal rather than a division.
const REGEX_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

#[derive(Clone, Copy, PartialEq)]
enum State {
    Code,
    Str { quote: char, keep: bool },
    Template { keep: bool },
    Regex { in_class: bool },
    LineComment,
    BlockComment,
}

/// Blanks out everything an import scan must not look at.
///
/// Comments, regex literal bodies, and the contents of string and template
/// literals become spaces. A literal sitting where a module specifier goes
/// (`require(`, `import(`, `from`, `import`) keeps its contents. Newlines
/// and byte lengths are preserved, so match offsets line up with `source`.
fn mask(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut state = State::Code;
    let mut chars = source.chars().peekable();
    let mut brace_depth = 0usize;
    // brace depth at each open `${`
    let mut interpolations: Vec<usize> = Vec::new();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::BlockComment;
                }
                '/' if regex_allowed(&out) => {
                    out.push(c);
                    state = State::Regex { in_class: false };
                }
                '\'' | '"' => {
                    let keep = specifier_position(&out);
                    out.push(c);
                    state = State::Str { quote: c, keep };
                }
                '`' => {
                    let keep = specifier_position(&out);
                    out.push(c);
                    state = State::Template { keep };
                }
                '{' => {
                    brace_depth += 1;
                    out.push(c);
                }
                '}' if interpolations.last() == Some(&brace_depth) => {
                    interpolations.pop();
                    out.push(c);
                    state = State::Template { keep: false };
                }
                '}' => {
                    brace_depth = brace_depth.saturating_sub(1);
                    out.push(c);
                }
                _ => out.push(c),
            },
            State::Str { quote, keep } => {
                if c == '\\' {
                    emit(&mut out, c, keep);
                    if let Some(escaped) = chars.next() {
                        emit(&mut out, escaped, keep);
                    }
                } else if c == quote || c == '\n' {
                    out.push(c);
                    state = State::Code;
                } else {
                    emit(&mut out, c, keep);
                }
            }
            State::Template { keep } => {
                if c == '\\' {
                    emit(&mut out, c, keep);
                    if let Some(escaped) = chars.next() {
                        emit(&mut out, escaped, keep);
                    }
                } else if c == '`' {
                    out.push(c);
                    state = State::Code;
                } else if c == '$' && chars.peek() == Some(&'{') {
                    chars.next();
                    out.push_str("${");
                    interpolations.push(brace_depth);
                    state = State::Code;
                } else {
                    emit(&mut out, c, keep);
                }
            }
            State::Regex { in_class } => match c {
                '\n' => {
                    out.push(c);
                    state = State::Code;
                }
                '\\' => {
                    emit(&mut out, c, false);
                    match chars.next() {
                        Some('\n') => {
                            out.push('\n');
                            state = State::Code;
                        }
                        Some(escaped) => emit(&mut out, escaped, false),
                        None => {}
                    }
                }
                '[' => {
                    emit(&mut out, c, false);
                    state = State::Regex { in_class: true };
                }
                ']' => {
                    emit(&mut out, c, false);
                    state = State::Regex { in_class: false };
                }
                '/' if !in_class => {
                    out.push(c);
                    state = State::Code;
                }
                _ => emit(&mut out, c, false),
            },
            State::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    state = State::Code;
                } else {
                    emit(&mut out, c, false);
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = State::Code;
                } else {
                    emit(&mut out, c, false);
                }
            }
        }
    }

    out
}

/// Pushes `c`, or same-width blanks when it is masked. Newlines always survive.
fn emit(out: &mut String, c: char, keep: bool) {
    if keep || c == '\n' {
        out.push(c);
    } else {
        out.extend(std::iter::repeat_n(' ', c.len_utf8()));
    }
}

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Identifier or number immediately ending `code`, if any.
fn trailing_word(code: &str) -> &str {
    let start = code
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_ident(*c))
        .last()
        .map_or(code.len(), |(i, _)| i);
    &code[start..]
}

fn ends_with_keyword(code: &str, keyword: &str) -> bool {
    trailing_word(code) == keyword
}

/// Whether a literal opening after `code` is a module specifier.
fn specifier_position(code: &str) -> bool {
    let code = code.trim_end();
    match code.strip_suffix('(') {
        Some(callee) => {
            let callee = callee.trim_end();
            ends_with_keyword(callee, "require") || ends_with_keyword(callee, "import")
        }
        None => ends_with_keyword(code, "from") || ends_with_keyword(code, "import"),
    }
}

/// Whether a `/` following `code` opens a regex literal.
fn regex_allowed(code: &str) -> bool {
    let code = code.trim_end();
    match code.chars().next_back() {
        None => true,
        Some(')' | ']' | '\'' | '"' | '`') => false,
        Some(c) if is_ident(c) => REGEX_KEYWORDS.contains(&trailing_word(code)),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_require_calls() {
        let src = r#"
var a = require('./a');
const b = require("b-pkg");
"#;
        assert_eq!(scan(src), vec!["./a", "b-pkg"]);
    }

    #[test]
    fn finds_es_module_forms() {
        let src = r#"
import x from './x.js';
import { y } from "y";
import 'side-effect';
export * from './reexport';
const lazy = await import('./lazy');
"#;
        assert_eq!(
            scan(src),
            vec!["./x.js", "y", "side-effect", "./reexport", "./lazy"]
        );
    }

    #[test]
    fn ignores_commented_out_requires() {
        let src = r#"
// require('./dead');
/* require('./also-dead');
   require('more-dead') */
require('./live');
"#;
        assert_eq!(scan(src), vec!["./live"]);
    }

    #[test]
    fn keeps_comment_markers_inside_strings() {
        let src = r#"var url = "http://example.com"; require('./after-url');"#;
        assert_eq!(scan(src), vec!["./after-url"]);
    }

    #[test]
    fn ignores_computed_specifiers() {
        let src = r#"
require(name);
require('./prefix' + suffix);
require(`./${dynamic}`);
require(`./static-template`);
"#;
        assert_eq!(scan(src), vec!["./static-template"]);
    }

    #[test]
    fn preserves_duplicates() {
        let src = "require('x'); require('x');";
        assert_eq!(scan(src), vec!["x", "x"]);
    }

    #[test]
    fn regex_with_slashes_does_not_hide_later_imports() {
        let src = "if (/^https?:\\/\\//.test(u)) module.exports = require('./remote');\n";
        assert_eq!(scan(src), vec!["./remote"]);
    }

    #[test]
    fn regex_class_with_comment_opener_does_not_hide_later_imports() {
        let src = "var re = /[/*]/;\nvar b = require('./b');\nvar c = require('./c');\n";
        assert_eq!(scan(src), vec!["./b", "./c"]);
    }

    #[test]
    fn regex_after_keyword_is_not_division() {
        let src = "function f(s) { return /\\/\\*/.test(s); }\nrequire('./after');\n";
        assert_eq!(scan(src), vec!["./after"]);
    }

    #[test]
    fn division_is_not_a_regex() {
        let src = "var half = total / 2; var x = require('./x'); var y = (a + b) / c / d;\nrequire('./y');\n";
        assert_eq!(scan(src), vec!["./x", "./y"]);
    }

    #[test]
    fn ignores_import_text_inside_strings() {
        let src = r#"
console.log("require('aws-sdk')");
var msg = 'import x from "lodash"';
var t = `require('./in-template')`;
require('./real');
"#;
        assert_eq!(scan(src), vec!["./real"]);
    }

    #[test]
    fn finds_requires_inside_template_interpolation() {
        let src = "var s = `${require('./inner')} and ${ {a: 1}.a }`;\nrequire('./outer');\n";
        assert_eq!(scan(src), vec!["./inner", "./outer"]);
    }

    #[test]
    fn mask_preserves_offsets() {
        let src = "var é = 'ünïcode'; // ☃\n/* x */ require('./a');";
        let masked = mask(src);
        assert_eq!(masked.len(), src.len());
        assert_eq!(masked.find("require"), src.find("require"));
    }
}
