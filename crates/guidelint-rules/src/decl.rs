//! Reads function signatures and variable declarations out of statement text.
//!
//! Everything here is a heuristic over tokens of masked code. When a
//! statement cannot be read with confidence the functions return `None`,
//! and callers skip the statement instead of guessing.

use guidelint_core::source::tokens::{matching_angle, matching_paren, skip_template};
use guidelint_core::source::{tokenize, Token, TokenKind};

/// What a parsed signature declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FunctionKind {
    /// Has a return type.
    Regular,
    /// Named after its class, no return type.
    Constructor,
    /// `~Name`.
    Destructor,
    /// `operator...`, including conversions.
    Operator,
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Param {
    /// Identifiers in the parameter, in order.
    pub words: Vec<String>,
    /// True if the parameter contains `&` (reference or rvalue reference).
    pub is_reference: bool,
    /// True if a default argument follows.
    pub has_default: bool,
}

/// A function declaration or definition head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Signature {
    /// Unqualified name (`operator==` for operators, without `~`).
    pub name: String,
    /// Byte offset of the name in the statement text.
    pub name_offset: usize,
    /// Kind of function.
    pub kind: FunctionKind,
    /// Declared parameters.
    pub params: Vec<Param>,
    /// `explicit` was written.
    pub is_explicit: bool,
    /// `= delete` was written.
    pub is_deleted: bool,
    /// `= default` was written.
    pub is_defaulted: bool,
}

/// A variable declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Declaration {
    /// Declared name.
    pub name: String,
    /// Byte offset of the name in the statement text.
    pub name_offset: usize,
    /// `constexpr`, or `const` on the object itself.
    pub is_constant: bool,
}

const SPECIFIERS: [&str; 9] = [
    "virtual",
    "static",
    "inline",
    "explicit",
    "constexpr",
    "consteval",
    "friend",
    "extern",
    "constinit",
];

const NOT_A_SIGNATURE: [&str; 20] = [
    "return", "new", "delete", "else", "throw", "case", "goto", "if", "while", "for", "switch",
    "do", "sizeof", "typedef", "using", "co_return", "co_await", "co_yield", "decltype",
    "static_assert",
];

const SIGNATURE_TAIL: [&str; 9] = [
    "const", "volatile", "override", "final", "noexcept", "throw", "try", "requires", "mutable",
];

/// Parses a function head such as `static int Foo::Bar(int a, int b = 2) const`.
///
/// `class_name` is the innermost enclosing class, used to recognise
/// constructors declared inside it.
pub(crate) fn parse_signature(text: &str, class_name: Option<&str>) -> Option<Signature> {
    let all = tokenize(text);
    let tokens = strip_attributes(skip_template(&all));

    let (name_start, name, name_offset, open) = find_name(&tokens)?;
    let close = matching_paren(&tokens, open)?;

    let mut is_explicit = false;
    let mut has_return_type = false;
    for t in &tokens[..name_start] {
        if t.is_ident() {
            if NOT_A_SIGNATURE.contains(&t.text) {
                return None;
            }
            if t.text == "explicit" {
                is_explicit = true;
            }
            if !SPECIFIERS.contains(&t.text) {
                has_return_type = true;
            }
        } else if t.kind == TokenKind::Punct {
            if !":<>*&,".contains(t.text) {
                return None;
            }
        } else {
            return None;
        }
    }

    let params = split_params(&tokens[open + 1..close])?;
    let tail = &tokens[close + 1..];
    if !tail_is_signature(tail) {
        return None;
    }
    let is_deleted = tail
        .windows(2)
        .any(|w| w[0].is_punct('=') && w[1].is_word("delete"));
    let is_defaulted = tail
        .windows(2)
        .any(|w| w[0].is_punct('=') && w[1].is_word("default"));

    let is_destructor = open >= 2 && tokens[open - 2].is_punct('~');
    let qualifier = qualifier_before(&tokens, name_start);

    let kind = if name.starts_with("operator") {
        FunctionKind::Operator
    } else if is_destructor {
        FunctionKind::Destructor
    } else if !has_return_type {
        let own_class = class_name.is_some_and(|c| c == name);
        let out_of_line = qualifier.is_some_and(|q| q == name);
        if !(own_class || out_of_line) {
            return None;
        }
        FunctionKind::Constructor
    } else {
        FunctionKind::Regular
    };

    Some(Signature {
        name,
        name_offset,
        kind,
        params,
        is_explicit,
        is_deleted,
        is_defaulted,
    })
}

/// Drops `[[...]]` attribute groups.
fn strip_attributes<'a>(tokens: &[Token<'a>]) -> Vec<Token<'a>> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].is_punct('[') && tokens.get(i + 1).is_some_and(|t| t.is_punct('[')) {
            let mut depth = 0usize;
            while let Some(t) = tokens.get(i) {
                if t.is_punct('[') {
                    depth += 1;
                } else if t.is_punct(']') {
                    depth = depth.saturating_sub(1);
                }
                i += 1;
                if depth == 0 {
                    break;
                }
            }
            continue;
        }
        out.push(tokens[i]);
        i += 1;
    }
    out
}

/// Locates the function name: returns where the (possibly qualified,
/// possibly `~`-prefixed) name starts, the bare name, its offset and the
/// index of the parameter list's `(`.
fn find_name(tokens: &[Token<'_>]) -> Option<(usize, String, usize, usize)> {
    if let Some(op) = tokens.iter().position(|t| t.is_word("operator")) {
        let mut i = op + 1;
        let mut symbol = String::new();
        if tokens.get(i).is_some_and(|t| t.is_punct('('))
            && tokens.get(i + 1).is_some_and(|t| t.is_punct(')'))
        {
            symbol.push_str("()");
            i += 2;
        }
        while let Some(t) = tokens.get(i) {
            if t.is_punct('(') {
                break;
            }
            if t.is_ident() && !symbol.ends_with(['*', '&', ':']) {
                // conversion operators: `operator bool`, `operator const char*`
                symbol.push(' ');
            }
            symbol.push_str(t.text);
            i += 1;
        }
        tokens.get(i)?;
        if symbol.is_empty() {
            return None;
        }
        let start = name_start(tokens, op);
        return Some((start, format!("operator{symbol}"), tokens[op].offset, i));
    }

    let mut angle = 0usize;
    let mut open = None;
    for (i, t) in tokens.iter().enumerate() {
        if t.is_punct('<') {
            angle += 1;
        } else if t.is_punct('>') {
            angle = angle.saturating_sub(1);
        } else if t.is_punct('(') && angle == 0 {
            open = Some(i);
            break;
        }
    }
    let open = open?;
    let name_idx = open.checked_sub(1)?;
    let name = tokens[name_idx];
    if !name.is_ident() {
        return None;
    }
    let start = name_start(tokens, name_idx);
    Some((start, name.text.to_string(), name.offset, open))
}

/// Walks back over `A::B::` qualifiers (and `~`) preceding `idx`.
fn name_start(tokens: &[Token<'_>], idx: usize) -> usize {
    let mut start = idx;
    if start > 0 && tokens[start - 1].is_punct('~') {
        start -= 1;
    }
    while start >= 3
        && tokens[start - 1].is_punct(':')
        && tokens[start - 2].is_punct(':')
        && tokens[start - 3].is_ident()
    {
        start -= 3;
    }
    start
}

/// Class name in `Class::Name(` when the name is qualified.
fn qualifier_before<'a>(tokens: &[Token<'a>], name_start: usize) -> Option<&'a str> {
    // name_start points at the first qualifier segment; find the last one.
    let mut i = name_start;
    let mut last = None;
    while tokens.get(i).is_some_and(Token::is_ident)
        && tokens.get(i + 1).is_some_and(|t| t.is_punct(':'))
        && tokens.get(i + 2).is_some_and(|t| t.is_punct(':'))
    {
        last = Some(tokens[i].text);
        i += 3;
    }
    last
}

fn tail_is_signature(tail: &[Token<'_>]) -> bool {
    let Some(first) = tail.first() else {
        return true;
    };
    if first.is_ident() {
        return SIGNATURE_TAIL.contains(&first.text);
    }
    first.is_punct('=')
        || first.is_punct(':')
        || first.is_punct('&')
        || (first.is_punct('-') && tail.get(1).is_some_and(|t| t.is_punct('>')))
}

/// Splits a parameter list on top-level commas.
///
/// Returns `None` when the list reads like call arguments.
fn split_params(tokens: &[Token<'_>]) -> Option<Vec<Param>> {
    if tokens.is_empty() || (tokens.len() == 1 && tokens[0].is_word("void")) {
        return Some(Vec::new());
    }

    let mut params = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for i in 0..=tokens.len() {
        let at_end = i == tokens.len();
        if !at_end {
            let t = tokens[i];
            if t.is_punct('(') || t.is_punct('<') || t.is_punct('[') || t.is_punct('{') {
                depth += 1;
                continue;
            }
            if t.is_punct(')') || t.is_punct('>') || t.is_punct(']') || t.is_punct('}') {
                depth = depth.saturating_sub(1);
                continue;
            }
            if !(t.is_punct(',') && depth == 0) {
                continue;
            }
        }
        params.push(read_param(&tokens[start..i])?);
        start = i + 1;
    }
    Some(params)
}

fn read_param(tokens: &[Token<'_>]) -> Option<Param> {
    let first = tokens.first()?;
    if first.kind == TokenKind::Number || first.kind == TokenKind::Literal {
        return None;
    }
    if first.kind == TokenKind::Punct && !first.is_punct(':') && !first.is_punct('.') {
        // `&x`, `-1`, `!ok`, `*p` are arguments, not parameters.
        return None;
    }
    let default_at = tokens.iter().position(|t| t.is_punct('='));
    let declared = &tokens[..default_at.unwrap_or(tokens.len())];
    Some(Param {
        words: declared
            .iter()
            .filter(|t| t.is_ident())
            .map(|t| t.text.to_string())
            .collect(),
        is_reference: declared.iter().any(|t| t.is_punct('&')),
        has_default: default_at.is_some(),
    })
}

const NOT_A_DECLARATION: [&str; 36] = [
    "return", "using", "typedef", "friend", "class", "struct", "union", "enum", "template",
    "if", "else", "for", "while", "do", "switch", "case", "goto", "break", "continue", "throw",
    "delete", "new", "namespace", "static_assert", "co_return", "co_yield", "co_await", "sizeof",
    "asm", "operator", "default", "public", "private", "protected", "typename", "decltype",
];

const DECL_SPECIFIERS: [&str; 10] = [
    "const",
    "constexpr",
    "static",
    "mutable",
    "inline",
    "extern",
    "volatile",
    "thread_local",
    "register",
    "constinit",
];

const BUILTIN_TYPE_WORDS: [&str; 15] = [
    "unsigned", "signed", "long", "short", "int", "char", "double", "float", "bool", "void",
    "auto", "wchar_t", "char8_t", "char16_t", "char32_t",
];

/// Parses a `;`-terminated statement as a variable declaration.
///
/// Every declarator of `int a, *b = f(1, 2), c[4]` is read. Function
/// prototypes, direct initialisation (`T x(1)`), expressions and qualified
/// definitions (`T C::x = ...`) yield `None`. A later declarator that cannot
/// be read ends the list without discarding the ones before it.
pub(crate) fn parse_declaration(text: &str) -> Option<Vec<Declaration>> {
    let all = tokenize(text);
    let tokens = strip_attributes(skip_template(&all));
    let first = tokens.first()?;
    if !first.is_ident() || NOT_A_DECLARATION.contains(&first.text) {
        return None;
    }

    let mut i = 0;
    let mut is_const = false;
    let mut is_constexpr = false;
    while let Some(t) = tokens.get(i) {
        if !t.is_ident() || !DECL_SPECIFIERS.contains(&t.text) {
            break;
        }
        match t.text {
            "const" => is_const = true,
            "constexpr" => is_constexpr = true,
            _ => {}
        }
        i += 1;
    }
    if tokens.get(i).is_some_and(|t| t.kind == TokenKind::Literal) {
        // extern "C" int x;
        return None;
    }

    i = read_type(&tokens, i)?;

    // cv right after the type applies to every declarator.
    while let Some(t) = tokens.get(i) {
        match t.text {
            "const" => is_const = true,
            "volatile" => {}
            _ => break,
        }
        i += 1;
    }

    let (first, mut next) = read_declarator(&tokens, i, is_const)?;
    let mut found = vec![first];
    while let Some(start) = next_declarator(&tokens, next) {
        let Some((decl, after)) = read_declarator(&tokens, start, is_const) else {
            break;
        };
        found.push(decl);
        next = after;
    }

    if is_constexpr {
        for decl in &mut found {
            decl.is_constant = true;
        }
    }
    Some(found)
}

/// Reads `*const name` style declarators at `i`; returns the declaration
/// and the index after the name.
fn read_declarator(
    tokens: &[Token<'_>],
    mut i: usize,
    base_const: bool,
) -> Option<(Declaration, usize)> {
    let mut is_const = base_const;
    let mut indirection = false;
    while let Some(t) = tokens.get(i) {
        match t.text {
            // `T* const p`: the object itself is const.
            "const" => {
                is_const = true;
                indirection = false;
            }
            "volatile" => {}
            "*" | "&" => indirection = true,
            _ => break,
        }
        i += 1;
    }

    let name = tokens.get(i)?;
    if !name.is_ident() || BUILTIN_TYPE_WORDS.contains(&name.text) || name.is_word("operator") {
        return None;
    }
    match tokens.get(i + 1) {
        None => {}
        Some(next) if next.is_punct(':') => {
            if tokens.get(i + 2).is_some_and(|t| t.is_punct(':')) {
                return None;
            }
        }
        Some(next) if ["=", "{", "[", ","].iter().any(|p| next.text == *p) => {}
        Some(_) => return None,
    }

    let decl = Declaration {
        name: name.text.to_string(),
        name_offset: name.offset,
        is_constant: is_const && !indirection,
    };
    Some((decl, i + 1))
}

/// Index just past the next comma outside brackets and template arguments.
fn next_declarator(tokens: &[Token<'_>], mut i: usize) -> Option<usize> {
    let mut depth = 0usize;
    while let Some(t) = tokens.get(i) {
        match t.text {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => depth = depth.saturating_sub(1),
            "<" if depth == 0 => {
                if let Some(close) = matching_angle(tokens, i) {
                    i = close + 1;
                    continue;
                }
            }
            "," if depth == 0 => return Some(i + 1),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Consumes a type name starting at `i`; returns the index after it.
fn read_type(tokens: &[Token<'_>], mut i: usize) -> Option<usize> {
    let first = tokens.get(i)?;
    if first.is_ident() && BUILTIN_TYPE_WORDS.contains(&first.text) {
        while tokens
            .get(i)
            .is_some_and(|t| t.is_ident() && BUILTIN_TYPE_WORDS.contains(&t.text))
        {
            i += 1;
        }
        return Some(i);
    }

    if tokens.get(i).is_some_and(|t| t.is_punct(':'))
        && tokens.get(i + 1).is_some_and(|t| t.is_punct(':'))
    {
        i += 2;
    }
    loop {
        if !tokens.get(i)?.is_ident() {
            return None;
        }
        i += 1;
        if tokens.get(i).is_some_and(|t| t.is_punct('<')) {
            i = matching_angle(tokens, i)? + 1;
        }
        if tokens.get(i).is_some_and(|t| t.is_punct(':'))
            && tokens.get(i + 1).is_some_and(|t| t.is_punct(':'))
        {
            i += 2;
            continue;
        }
        return Some(i);
    }
}
