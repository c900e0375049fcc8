//! Lexical model of one C/C++ source file.
//!
//! Built once per file before any matcher runs and discarded afterwards.
//! Nothing here parses the language: the model knows lines, masked code,
//! preprocessor lines, `;`/`{`-terminated statements and brace blocks.

mod mask;
pub mod tokens;

pub use tokens::{class_name, namespace_names, tokenize, Token, TokenKind};

/// What kind of region a brace block (or the file itself) is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Top level of the file.
    File,
    /// `namespace` or `extern "C"` body.
    Namespace,
    /// `class`/`struct`/`union` body.
    Class,
    /// `enum` body.
    Enum,
    /// Function body.
    Function,
    /// Braced initializer (`= { ... }`, `x{1}`).
    Initializer,
    /// Any other block: control flow, lambdas, bare braces.
    Control,
}

/// How a statement ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// `;` at parenthesis depth zero.
    Semicolon,
    /// `{` opening a block of the given kind.
    OpenBrace(ScopeKind),
    /// `}` closing the enclosing block without a `;`.
    CloseBrace,
}

/// A logical statement: code up to `;`, `{` or `}` with labels stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Masked code text, whitespace-trimmed, lines joined by a space.
    pub text: String,
    /// How the statement ended.
    pub terminator: Terminator,
    /// Kind of the innermost enclosing block.
    pub scope: ScopeKind,
    /// Name of the innermost enclosing class, if any.
    pub class_name: Option<String>,
    lines: Vec<usize>,
}

impl Statement {
    /// Line (1-based) holding the byte at `offset` of [`Statement::text`].
    #[must_use]
    pub fn line_at(&self, offset: usize) -> usize {
        self.lines
            .get(offset)
            .or_else(|| self.lines.last())
            .copied()
            .unwrap_or(1)
    }

    /// First line of the statement.
    #[must_use]
    pub fn first_line(&self) -> usize {
        self.line_at(0)
    }
}

/// A `{ ... }` region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Block kind.
    pub kind: ScopeKind,
    /// Declared name for classes and namespaces.
    pub name: Option<String>,
    /// First line of the text that introduced the block.
    pub header_line: usize,
    /// Line of the `{`.
    pub open_line: usize,
    /// Line of the matching `}`; `None` if the file ends first.
    pub close_line: Option<usize>,
}

/// Per-file lexical state shared by all matchers.
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    raw: Vec<String>,
    code: Vec<String>,
    directives: Vec<bool>,
    statements: Vec<Statement>,
    blocks: Vec<Block>,
    stray_closes: Vec<usize>,
}

impl SourceFile {
    /// Builds the model from decoded file content.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let raw_lines: Vec<&str> = content.lines().collect();
        let code = mask::mask_lines(&raw_lines);
        let directives = directive_flags(&code);

        let mut builder = Builder::default();
        for (idx, line) in code.iter().enumerate() {
            if directives[idx] {
                continue;
            }
            builder.feed_line(line, idx + 1);
        }
        let (statements, blocks, stray_closes) = builder.finish();

        Self {
            raw: raw_lines.into_iter().map(String::from).collect(),
            code,
            directives,
            statements,
            blocks,
            stray_closes,
        }
    }

    /// Number of lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.raw.len()
    }

    /// Raw text of a 1-based line; empty when out of range.
    #[must_use]
    pub fn raw_line(&self, line: usize) -> &str {
        line.checked_sub(1)
            .and_then(|i| self.raw.get(i))
            .map_or("", String::as_str)
    }

    /// Masked code of a 1-based line; empty when out of range.
    #[must_use]
    pub fn code_line(&self, line: usize) -> &str {
        line.checked_sub(1)
            .and_then(|i| self.code.get(i))
            .map_or("", String::as_str)
    }

    /// True if the line belongs to a preprocessor directive.
    #[must_use]
    pub fn is_directive(&self, line: usize) -> bool {
        line.checked_sub(1)
            .and_then(|i| self.directives.get(i))
            .copied()
            .unwrap_or(false)
    }

    /// True if the line is non-blank but holds only comment text.
    #[must_use]
    pub fn is_comment_only(&self, line: usize) -> bool {
        !self.raw_line(line).trim().is_empty() && self.code_line(line).trim().is_empty()
    }

    /// Iterates `(line number, raw text, masked code)`.
    pub fn lines(&self) -> impl Iterator<Item = (usize, &str, &str)> {
        self.raw
            .iter()
            .zip(&self.code)
            .enumerate()
            .map(|(i, (raw, code))| (i + 1, raw.as_str(), code.as_str()))
    }

    /// Statements in source order.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Blocks in opening order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// First line where braces stop balancing, if any.
    #[must_use]
    pub fn first_unbalanced(&self) -> Option<usize> {
        let stray = self.stray_closes.first().copied();
        let unclosed = self
            .blocks
            .iter()
            .find(|b| b.close_line.is_none())
            .map(|b| b.open_line);
        match (stray, unclosed) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

fn directive_flags(code: &[String]) -> Vec<bool> {
    let mut flags = Vec::with_capacity(code.len());
    let mut continued = false;
    for line in code {
        let is_directive = continued || line.trim_start().starts_with('#');
        continued = is_directive && line.trim_end().ends_with('\\');
        flags.push(is_directive);
    }
    flags
}

#[derive(Debug)]
struct OpenBlock {
    block: usize,
    saved_paren: usize,
    /// Header text set aside while an embedded initializer is open.
    saved_header: Option<(String, Vec<usize>)>,
}

#[derive(Debug, Default)]
struct Builder {
    statements: Vec<Statement>,
    blocks: Vec<Block>,
    stack: Vec<OpenBlock>,
    stray_closes: Vec<usize>,
    buf: String,
    map: Vec<usize>,
    paren: usize,
}

impl Builder {
    fn feed_line(&mut self, line: &str, n: usize) {
        for c in line.chars() {
            match c {
                '(' => {
                    self.paren += 1;
                    self.push(c, n);
                }
                ')' => {
                    self.paren = self.paren.saturating_sub(1);
                    self.push(c, n);
                }
                ';' if self.paren == 0 => self.end_statement(Terminator::Semicolon),
                '{' => self.open(n),
                '}' => self.close(n),
                _ => self.push(c, n),
            }
        }
        if !self.buf.is_empty() {
            self.push(' ', n);
        }
    }

    fn push(&mut self, c: char, n: usize) {
        self.buf.push(c);
        self.map.extend(std::iter::repeat(n).take(c.len_utf8()));
    }

    fn scope(&self) -> ScopeKind {
        self.stack
            .last()
            .map_or(ScopeKind::File, |o| self.blocks[o.block].kind)
    }

    fn class_name(&self) -> Option<String> {
        self.stack
            .iter()
            .rev()
            .map(|o| &self.blocks[o.block])
            .find(|b| b.kind == ScopeKind::Class)
            .and_then(|b| b.name.clone())
    }

    /// Takes the pending text, trimmed and with leading labels removed.
    fn take_pending(&mut self) -> Option<(String, Vec<usize>)> {
        let buf = std::mem::take(&mut self.buf);
        let map = std::mem::take(&mut self.map);
        let start = label_end(&buf);
        let text = buf[start..].trim_end();
        let lead = text.len() - text.trim_start().len();
        let text = text.trim_start();
        if text.is_empty() {
            return None;
        }
        let from = start + lead;
        Some((text.to_string(), map[from..from + text.len()].to_vec()))
    }

    fn end_statement(&mut self, terminator: Terminator) {
        if let Some((text, lines)) = self.take_pending() {
            let scope = self.scope();
            let class_name = self.class_name();
            self.statements.push(Statement {
                text,
                terminator,
                scope,
                class_name,
                lines,
            });
        }
    }

    fn open(&mut self, n: usize) {
        let scope = self.scope();
        let pending = self.take_pending();
        let header = pending.as_ref().map_or("", |(t, _)| t.as_str());
        let kind = classify(header, scope);
        let name = match kind {
            ScopeKind::Class => class_name(header).map(|(name, _)| name),
            ScopeKind::Namespace => {
                let names = namespace_names(header);
                (!names.is_empty()).then(|| {
                    names
                        .into_iter()
                        .map(|(n, _)| n)
                        .collect::<Vec<_>>()
                        .join("::")
                })
            }
            _ => None,
        };
        let header_line = pending
            .as_ref()
            .and_then(|(_, lines)| lines.first().copied())
            .unwrap_or(n);

        let saved_header = if kind == ScopeKind::Initializer {
            // The initializer becomes part of the enclosing statement.
            pending
        } else {
            if let Some((text, lines)) = pending {
                let class_name = self.class_name();
                self.statements.push(Statement {
                    text,
                    terminator: Terminator::OpenBrace(kind),
                    scope,
                    class_name,
                    lines,
                });
            }
            None
        };

        self.blocks.push(Block {
            kind,
            name,
            header_line,
            open_line: n,
            close_line: None,
        });
        self.stack.push(OpenBlock {
            block: self.blocks.len() - 1,
            saved_paren: self.paren,
            saved_header,
        });
        self.paren = 0;
    }

    fn close(&mut self, n: usize) {
        let Some(open) = self.stack.last() else {
            self.stray_closes.push(n);
            self.buf.clear();
            self.map.clear();
            return;
        };
        let is_initializer = self.blocks[open.block].kind == ScopeKind::Initializer;
        self.end_statement(Terminator::CloseBrace);

        let Some(open) = self.stack.pop() else {
            return;
        };
        self.blocks[open.block].close_line = Some(n);
        self.paren = open.saved_paren;
        if is_initializer {
            if let Some((text, lines)) = open.saved_header {
                self.buf = text;
                self.map = lines;
            }
            self.push('{', n);
            self.push('}', n);
        }
    }

    fn finish(mut self) -> (Vec<Statement>, Vec<Block>, Vec<usize>) {
        // Text after the last terminator is not a statement.
        self.buf.clear();
        (self.statements, self.blocks, self.stray_closes)
    }
}

const ACCESS_LABELS: [&str; 3] = ["public", "private", "protected"];

/// Byte length of leading `public:`/`case x:`/`default:` labels.
fn label_end(text: &str) -> usize {
    let mut pos = 0;
    loop {
        let rest = &text[pos..];
        let trimmed = rest.trim_start();
        let ws = rest.len() - trimmed.len();
        let word_len = trimmed
            .find(|c: char| !mask::is_ident_char(c))
            .unwrap_or(trimmed.len());
        let word = &trimmed[..word_len];
        let after = &trimmed[word_len..];

        let skip = if ACCESS_LABELS.contains(&word) || word == "default" {
            let after_trim = after.trim_start();
            if after_trim.starts_with(':') && !after_trim.starts_with("::") {
                Some(word_len + (after.len() - after_trim.len()) + 1)
            } else {
                None
            }
        } else if word == "case" {
            single_colon(after).map(|i| word_len + i + 1)
        } else {
            None
        };

        match skip {
            Some(len) => pos += ws + len,
            None => return pos,
        }
    }
}

/// Index of the first `:` that is not part of `::`.
fn single_colon(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b':' {
            if bytes.get(i + 1) == Some(&b':') {
                i += 2;
                continue;
            }
            return Some(i);
        }
        i += 1;
    }
    None
}

const NON_DECLARATOR_WORDS: [&str; 11] = [
    "else", "do", "try", "const", "override", "final", "noexcept", "mutable", "volatile",
    "return", "requires",
];

/// Decides what kind of block a header introduces.
fn classify(header: &str, scope: ScopeKind) -> ScopeKind {
    if matches!(scope, ScopeKind::Initializer | ScopeKind::Enum) {
        return ScopeKind::Initializer;
    }

    let all = tokenize(header);
    let tokens = tokens::skip_template(&all);
    let Some(first) = tokens.first() else {
        return ScopeKind::Control;
    };

    if tokens.iter().any(|t| t.is_word("namespace"))
        || (first.is_word("extern") && tokens.get(1).is_some_and(|t| t.kind == TokenKind::Literal))
    {
        return ScopeKind::Namespace;
    }

    let lead = if first.is_word("typedef") { tokens.get(1) } else { Some(first) };
    if lead.is_some_and(|t| t.is_word("enum")) {
        return ScopeKind::Enum;
    }
    if lead.is_some_and(|t| t.is_word("class") || t.is_word("struct") || t.is_word("union")) {
        let paren = tokens.iter().position(|t| t.is_punct('('));
        let attribute_only = paren.map_or(true, |p| {
            p > 0
                && ["alignas", "__attribute__", "__declspec"]
                    .iter()
                    .any(|w| tokens[p - 1].is_word(w))
        });
        if attribute_only && !tokens.iter().any(|t| t.is_punct('=')) {
            return ScopeKind::Class;
        }
    }

    let has_paren = tokens.iter().any(|t| t.is_punct('('));
    let has_operator = tokens.iter().any(|t| t.is_word("operator"));

    if !has_operator {
        if let Some(eq) = top_level_assign(tokens) {
            let rhs = &tokens[eq + 1..];
            if rhs.iter().any(|t| t.is_punct('(') || t.is_punct('[')) {
                // `auto f = [..](..) {`
                return ScopeKind::Control;
            }
            return ScopeKind::Initializer;
        }
    }

    // `Type name{...}`, `: m_x{...}`, `return T{...}`
    let last = tokens[tokens.len() - 1];
    let trailing_arrow = tokens
        .windows(2)
        .any(|w| w[0].is_punct('-') && w[1].is_punct('>'));
    if (last.is_ident() || last.is_punct('>'))
        && !trailing_arrow
        && !NON_DECLARATOR_WORDS.iter().any(|w| last.is_word(w))
        && (!has_paren || ends_in_member_init(tokens))
    {
        return ScopeKind::Initializer;
    }
    if last.is_word("return") {
        return ScopeKind::Initializer;
    }

    if has_paren && matches!(scope, ScopeKind::File | ScopeKind::Namespace | ScopeKind::Class) {
        return ScopeKind::Function;
    }
    ScopeKind::Control
}

/// Position of an `=` at paren depth zero that is not a comparison.
fn top_level_assign(tokens: &[Token<'_>]) -> Option<usize> {
    let mut depth = 0usize;
    for (i, t) in tokens.iter().enumerate() {
        if t.is_punct('(') || t.is_punct('[') {
            depth += 1;
        } else if t.is_punct(')') || t.is_punct(']') {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && t.is_punct('=') {
            let prev = i.checked_sub(1).map(|p| tokens[p]);
            let next = tokens.get(i + 1);
            let compound = prev.is_some_and(|p| {
                p.kind == TokenKind::Punct && "=!<>+-*/%&|^".contains(p.text)
            }) || next.is_some_and(|n| n.is_punct('='));
            if !compound {
                return Some(i);
            }
        }
    }
    None
}

/// True when the header is a constructor initializer list whose last member
/// is brace-initialized: `Foo() : m_a(1), m_b`.
fn ends_in_member_init(tokens: &[Token<'_>]) -> bool {
    let Some(close) = tokens.iter().rposition(|t| t.is_punct(')')) else {
        return false;
    };
    let tail = &tokens[close + 1..];
    tail.iter().enumerate().any(|(i, t)| {
        t.is_punct(':')
            && !tail.get(i + 1).is_some_and(|n| n.is_punct(':'))
            && !(i > 0 && tail[i - 1].is_punct(':'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<ScopeKind> {
        SourceFile::parse(src).blocks().iter().map(|b| b.kind).collect()
    }

    #[test]
    fn masks_and_flags_directives() {
        let src = "#define X(a) \\\n  do { } while (0)\nint x; // {\n";
        let file = SourceFile::parse(src);
        assert_eq!(file.line_count(), 3);
        assert!(file.is_directive(1));
        assert!(file.is_directive(2));
        assert!(!file.is_directive(3));
        assert!(file.blocks().is_empty());
        assert_eq!(file.statements().len(), 1);
        assert_eq!(file.statements()[0].text, "int x");
    }

    #[test]
    fn brace_in_string_literal_keeps_balance() {
        let src = "void Print() {\n  const char* s = \"{\";\n  Log(s);\n}\n";
        let file = SourceFile::parse(src);
        assert_eq!(file.first_unbalanced(), None);
        let f = &file.blocks()[0];
        assert_eq!(f.kind, ScopeKind::Function);
        assert_eq!(f.header_line, 1);
        assert_eq!(f.close_line, Some(4));
    }

    #[test]
    fn brace_in_comment_and_char_keeps_balance() {
        let src = "int F() {\n  // }\n  char c = '}';\n  /* { */\n  return 0;\n}\n";
        let file = SourceFile::parse(src);
        assert_eq!(file.first_unbalanced(), None);
        assert_eq!(file.blocks()[0].close_line, Some(6));
    }

    #[test]
    fn classifies_blocks() {
        let src = "\
namespace app {
class Widget : public Base {
 public:
  Widget(int v) : m_v{v}, m_w(2) {
    if (v > 0) {
    }
  }
  enum class Mode { kA, kB };
};
int table[] = {1, 2};
extern \"C\" {
}
}
";
        assert_eq!(
            kinds(src),
            vec![
                ScopeKind::Namespace,
                ScopeKind::Class,
                ScopeKind::Initializer,
                ScopeKind::Function,
                ScopeKind::Control,
                ScopeKind::Enum,
                ScopeKind::Initializer,
                ScopeKind::Namespace,
            ]
        );
        let file = SourceFile::parse(src);
        assert_eq!(file.blocks()[0].name.as_deref(), Some("app"));
        assert_eq!(file.blocks()[1].name.as_deref(), Some("Widget"));
        assert_eq!(file.first_unbalanced(), None);
    }

    #[test]
    fn statements_carry_scope_and_class() {
        let src = "\
class Counter {
 private:
  int m_count;
};
void Run() {
  int total = 0;
}
";
        let file = SourceFile::parse(src);
        let member = file
            .statements()
            .iter()
            .find(|s| s.text == "int m_count")
            .unwrap();
        assert_eq!(member.scope, ScopeKind::Class);
        assert_eq!(member.class_name.as_deref(), Some("Counter"));
        assert_eq!(member.first_line(), 3);

        let local = file
            .statements()
            .iter()
            .find(|s| s.text.starts_with("int total"))
            .unwrap();
        assert_eq!(local.scope, ScopeKind::Function);
        assert_eq!(local.class_name, None);
    }

    #[test]
    fn multi_line_statement_maps_offsets_to_lines() {
        let src = "int Add(int a,\n        int b);\n";
        let file = SourceFile::parse(src);
        let stmt = &file.statements()[0];
        let b = stmt.text.find("int b").unwrap();
        assert_eq!(stmt.first_line(), 1);
        assert_eq!(stmt.line_at(b), 2);
    }

    #[test]
    fn braced_member_initializer_joins_statement() {
        let file = SourceFile::parse("struct S {\n  int m_x{0};\n};\n");
        assert!(file.statements().iter().any(|s| s.text == "int m_x{}"));
    }

    #[test]
    fn case_labels_are_stripped() {
        let src = "void F(int x) {\n  switch (x) {\n    case 1: int y = 2; break;\n    default: break;\n  }\n}\n";
        let file = SourceFile::parse(src);
        assert!(file.statements().iter().any(|s| s.text == "int y = 2"));
        assert!(file.statements().iter().all(|s| !s.text.starts_with("case")));
    }

    #[test]
    fn unbalanced_braces_are_recorded() {
        let file = SourceFile::parse("void F() {\n  if (x) {\n}\n");
        assert_eq!(file.first_unbalanced(), Some(1));
        let file = SourceFile::parse("}\nint x;\n");
        assert_eq!(file.first_unbalanced(), Some(1));
    }

    #[test]
    fn comment_only_lines() {
        let file = SourceFile::parse("// note\nint x; // trailing\n\n");
        assert!(file.is_comment_only(1));
        assert!(!file.is_comment_only(2));
        assert!(!file.is_comment_only(3));
    }
}
