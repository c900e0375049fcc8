//! A minimal tokenizer over masked statement text.

use super::mask::is_ident_char;

/// Token classes produced by [`tokenize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword.
    Ident,
    /// Numeric literal.
    Number,
    /// String or character literal (contents already masked).
    Literal,
    /// Any other single character.
    Punct,
}

/// A token with its byte offset in the tokenized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Token class.
    pub kind: TokenKind,
    /// Source text of the token.
    pub text: &'a str,
    /// Byte offset of the first character.
    pub offset: usize,
}

impl Token<'_> {
    /// True for an identifier spelled `word`.
    #[must_use]
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == word
    }

    /// True for the punctuation character `c`.
    #[must_use]
    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct && self.text.starts_with(c)
    }

    /// True for identifiers.
    #[must_use]
    pub fn is_ident(&self) -> bool {
        self.kind == TokenKind::Ident
    }
}

/// Splits masked code into tokens. Whitespace is dropped.
#[must_use]
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        let (kind, end) = if c.is_ascii_digit() {
            let mut end = start + c.len_utf8();
            while let Some(&(i, n)) = chars.peek() {
                if is_ident_char(n) || n == '.' || n == '\'' {
                    end = i + n.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            (TokenKind::Number, end)
        } else if is_ident_char(c) {
            let mut end = start + c.len_utf8();
            while let Some(&(i, n)) = chars.peek() {
                if is_ident_char(n) {
                    end = i + n.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            (TokenKind::Ident, end)
        } else if c == '"' || c == '\'' {
            let mut end = text.len();
            for (i, n) in chars.by_ref() {
                if n == c {
                    end = i + 1;
                    break;
                }
            }
            (TokenKind::Literal, end)
        } else {
            (TokenKind::Punct, start + c.len_utf8())
        };
        tokens.push(Token {
            kind,
            text: &text[start..end],
            offset: start,
        });
    }
    tokens
}

/// Skips leading `template <...>` parameter lists.
#[must_use]
pub fn skip_template<'t, 'a>(mut tokens: &'t [Token<'a>]) -> &'t [Token<'a>] {
    while tokens.first().is_some_and(|t| t.is_word("template"))
        && tokens.get(1).is_some_and(|t| t.is_punct('<'))
    {
        match matching_angle(tokens, 1) {
            Some(close) => tokens = &tokens[close + 1..],
            None => return &[],
        }
    }
    tokens
}

/// Index of the `>` that closes the `<` at `open`.
#[must_use]
pub fn matching_angle(tokens: &[Token<'_>], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut parens = 0usize;
    for (i, t) in tokens.iter().enumerate().skip(open) {
        if t.is_punct('(') {
            parens += 1;
        } else if t.is_punct(')') {
            parens = parens.saturating_sub(1);
        } else if parens == 0 && t.is_punct('<') {
            depth += 1;
        } else if parens == 0 && t.is_punct('>') {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Index of the `)` that closes the `(` at `open`.
#[must_use]
pub fn matching_paren(tokens: &[Token<'_>], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, t) in tokens.iter().enumerate().skip(open) {
        if t.is_punct('(') {
            depth += 1;
        } else if t.is_punct(')') {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

fn is_macro_like(name: &str) -> bool {
    name.len() > 1
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Extracts the declared name of a `class`/`struct`/`union` head.
///
/// Returns the name and its byte offset. Returns `None` for anonymous
/// types, template specializations and heads that cannot be read with
/// confidence.
#[must_use]
pub fn class_name(text: &str) -> Option<(String, usize)> {
    let tokens = tokenize(text);
    let mut rest = skip_template(&tokens);
    if rest.first().is_some_and(|t| t.is_word("typedef")) {
        rest = &rest[1..];
    }
    let keyword = rest.first()?;
    if !["class", "struct", "union"].iter().any(|k| keyword.is_word(k)) {
        return None;
    }

    // Each entry is the last segment of a possibly qualified name.
    let mut names: Vec<Token<'_>> = Vec::new();
    let mut i = 1;
    while let Some(t) = rest.get(i) {
        if t.is_punct(':') {
            if rest.get(i + 1).is_some_and(|n| n.is_punct(':')) {
                // Qualified name: replace the previous segment.
                names.pop();
                i += 2;
                continue;
            }
            break;
        }
        if t.is_punct('<') {
            return None;
        }
        if t.is_punct('[') {
            // [[attribute]]
            while rest.get(i).is_some_and(|t| !t.is_punct(']')) {
                i += 1;
            }
            i += 2;
            continue;
        }
        if t.is_ident() {
            if !t.is_word("final") {
                names.push(*t);
            }
        } else if t.is_punct('(') {
            // alignas(...) / __declspec(...)
            names.pop();
            i = matching_paren(rest, i)? + 1;
            continue;
        } else {
            return None;
        }
        i += 1;
    }

    let name = match names.as_slice() {
        [only] => only,
        [first, second] if is_macro_like(first.text) => second,
        _ => return None,
    };
    Some((name.text.to_string(), name.offset))
}

/// Extracts the segments of a `namespace` head with their byte offsets.
///
/// `namespace a::b` yields both segments; anonymous namespaces yield none.
#[must_use]
pub fn namespace_names(text: &str) -> Vec<(String, usize)> {
    let tokens = tokenize(text);
    let Some(pos) = tokens.iter().position(|t| t.is_word("namespace")) else {
        return Vec::new();
    };
    tokens[pos + 1..]
        .iter()
        .filter(|t| t.is_ident() && !t.is_word("inline"))
        .map(|t| (t.text.to_string(), t.offset))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_splits_words_numbers_and_punct() {
        let tokens = tokenize("int x = 1'000;");
        let texts: Vec<_> = tokens.iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["int", "x", "=", "1'000", ";"]);
        assert_eq!(tokens[1].offset, 4);
        assert_eq!(tokens[3].kind, TokenKind::Number);
    }

    #[test]
    fn tokenize_keeps_masked_literals_whole() {
        let tokens = tokenize(r#"f("   ", ' ')"#);
        assert_eq!(tokens[2].kind, TokenKind::Literal);
        assert_eq!(tokens[2].text, r#""   ""#);
        assert_eq!(tokens[4].kind, TokenKind::Literal);
    }

    #[test]
    fn class_name_plain_and_derived() {
        assert_eq!(class_name("class MyClass").unwrap().0, "MyClass");
        assert_eq!(
            class_name("class myClass : public Base").unwrap(),
            ("myClass".to_string(), 6)
        );
        assert_eq!(class_name("struct Point final").unwrap().0, "Point");
        assert_eq!(
            class_name("template <typename T> class Stack").unwrap().0,
            "Stack"
        );
    }

    #[test]
    fn class_name_handles_export_macros_and_qualifiers() {
        assert_eq!(class_name("class API_EXPORT Widget").unwrap().0, "Widget");
        assert_eq!(class_name("class outer::Inner").unwrap().0, "Inner");
        assert_eq!(class_name("struct alignas(16) Vec4").unwrap().0, "Vec4");
    }

    #[test]
    fn class_name_skips_uncertain_heads() {
        assert!(class_name("struct").is_none());
        assert!(class_name("template <> class Stack<int>").is_none());
        assert!(class_name("class two words").is_none());
        assert!(class_name("enum Color").is_none());
    }

    #[test]
    fn namespace_segments() {
        let names: Vec<_> = namespace_names("namespace a::Bc")
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["a", "Bc"]);
        assert!(namespace_names("namespace").is_empty());
        assert_eq!(namespace_names("inline namespace v1")[0].0, "v1");
    }
}
