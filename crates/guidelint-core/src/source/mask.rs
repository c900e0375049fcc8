//! Blanks out comments and literal contents, keeping columns intact.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    Str,
    Chr,
    Raw,
}

const RAW_PREFIXES: [&str; 5] = ["R", "u8R", "uR", "UR", "LR"];

/// Maximum raw-string delimiter length accepted by the language.
const RAW_DELIMITER_LIMIT: usize = 16;

pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Produces one masked line per input line.
///
/// Comment bodies become spaces; string, character and raw-string literals
/// keep their quotes with the contents replaced by spaces. Every output line
/// has the same number of characters as its input line.
pub(crate) fn mask_lines(lines: &[&str]) -> Vec<String> {
    let mut state = State::Code;
    let mut raw_delim: Vec<char> = Vec::new();
    let mut out = Vec::with_capacity(lines.len());

    for line in lines {
        // A line comment ending in a backslash swallows the next line.
        if state == State::LineComment {
            out.push(" ".repeat(line.chars().count()));
            if !line.ends_with('\\') {
                state = State::Code;
            }
            continue;
        }

        let chars: Vec<char> = line.chars().collect();
        let mut code = String::with_capacity(line.len());
        let mut in_number = false;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();
            match state {
                State::Code => {
                    if c == '/' && next == Some('/') {
                        code.extend(std::iter::repeat(' ').take(chars.len() - i));
                        if line.ends_with('\\') {
                            state = State::LineComment;
                        }
                        break;
                    }
                    if c == '/' && next == Some('*') {
                        code.push_str("  ");
                        state = State::BlockComment;
                        i += 2;
                        continue;
                    }
                    if c == '"' {
                        if let Some((delim, open)) = raw_string_start(&chars, i) {
                            code.push('"');
                            code.extend(std::iter::repeat(' ').take(open - i));
                            raw_delim = delim;
                            state = State::Raw;
                            i = open + 1;
                            continue;
                        }
                        code.push('"');
                        state = State::Str;
                        in_number = false;
                        i += 1;
                        continue;
                    }
                    if c == '\'' {
                        // Digit separator as in 1'000'000.
                        if in_number && next.is_some_and(|n| n.is_ascii_alphanumeric()) {
                            code.push('\'');
                            i += 1;
                            continue;
                        }
                        code.push('\'');
                        state = State::Chr;
                        in_number = false;
                        i += 1;
                        continue;
                    }
                    if c.is_ascii_digit() && (i == 0 || !is_ident_char(chars[i - 1])) {
                        in_number = true;
                    } else if !(is_ident_char(c) || c == '.') {
                        in_number = false;
                    }
                    code.push(c);
                }
                State::LineComment => code.push(' '),
                State::BlockComment => {
                    if c == '*' && next == Some('/') {
                        code.push_str("  ");
                        state = State::Code;
                        i += 2;
                        continue;
                    }
                    code.push(' ');
                }
                State::Str | State::Chr => {
                    let quote = if state == State::Str { '"' } else { '\'' };
                    if c == '\\' {
                        code.push(' ');
                        if next.is_some() {
                            code.push(' ');
                            i += 2;
                        } else {
                            i += 1;
                        }
                        continue;
                    }
                    if c == quote {
                        code.push(quote);
                        state = State::Code;
                    } else {
                        code.push(' ');
                    }
                }
                State::Raw => {
                    if c == ')' && closes_raw(&chars, i, &raw_delim) {
                        code.extend(std::iter::repeat(' ').take(raw_delim.len() + 1));
                        code.push('"');
                        state = State::Code;
                        i += raw_delim.len() + 2;
                        continue;
                    }
                    code.push(' ');
                }
            }
            i += 1;
        }

        // Ordinary literals end with the line unless it is continued.
        if matches!(state, State::Str | State::Chr) && !line.ends_with('\\') {
            state = State::Code;
        }
        out.push(code);
    }
    out
}

/// Detects `R"delim(` at `quote`, returning the delimiter and the index of `(`.
fn raw_string_start(chars: &[char], quote: usize) -> Option<(Vec<char>, usize)> {
    let mut start = quote;
    while start > 0 && is_ident_char(chars[start - 1]) {
        start -= 1;
    }
    let prefix: String = chars[start..quote].iter().collect();
    if !RAW_PREFIXES.contains(&prefix.as_str()) {
        return None;
    }
    let mut delim = Vec::new();
    for (offset, &c) in chars[quote + 1..].iter().enumerate() {
        if c == '(' {
            return Some((delim, quote + 1 + offset));
        }
        if c == ')' || c == '\\' || c.is_whitespace() || delim.len() >= RAW_DELIMITER_LIMIT {
            return None;
        }
        delim.push(c);
    }
    None
}

fn closes_raw(chars: &[char], paren: usize, delim: &[char]) -> bool {
    let end = paren + 1 + delim.len();
    chars.len() > end && chars[paren + 1..end] == *delim && chars[end] == '"'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(src: &str) -> Vec<String> {
        let lines: Vec<&str> = src.lines().collect();
        mask_lines(&lines)
    }

    #[test]
    fn line_comment_is_blanked() {
        let out = mask("int x; // new int");
        assert_eq!(out[0].trim_end(), "int x;");
        assert_eq!(out[0].len(), "int x; // new int".len());
    }

    #[test]
    fn line_comment_continues_after_backslash() {
        let out = mask("// note \\\n  {\\\n}\nint y;");
        assert_eq!(out[0].trim(), "");
        assert_eq!(out[1], "    ");
        assert_eq!(out[2], " ");
        assert_eq!(out[3], "int y;");
    }

    #[test]
    fn block_comment_spans_lines() {
        let out = mask("a /* {\n } */ b");
        assert_eq!(out[0].trim_end(), "a");
        assert_eq!(out[1].trim(), "b");
        assert_eq!(out[1].len(), " } */ b".len());
    }

    #[test]
    fn string_contents_are_blanked_keeping_quotes() {
        let out = mask(r#"s = "{ \" }";"#);
        assert!(out[0].starts_with("s = \""));
        assert!(out[0].ends_with("\";"));
        assert!(!out[0].contains('{'));
        assert!(!out[0].contains('}'));
        assert_eq!(mask("c = '{';"), vec!["c = ' ';"]);
    }

    #[test]
    fn raw_string_is_blanked() {
        let out = mask(r#"auto s = R"x(a "}" b)x"; int y;"#);
        assert_eq!(out[0].len(), r#"auto s = R"x(a "}" b)x"; int y;"#.len());
        assert!(out[0].starts_with("auto s = R\""));
        assert!(out[0].ends_with("\"; int y;"));
        assert!(!out[0].contains('}'));
    }

    #[test]
    fn raw_string_spans_lines() {
        let out = mask("auto s = R\"(\n{\n)\"; int y;");
        assert_eq!(out[1], " ");
        assert!(out[2].ends_with("; int y;"));
    }

    #[test]
    fn digit_separator_is_code() {
        assert_eq!(mask("int n = 1'000'000; char c = 'x';"), vec![
            "int n = 1'000'000; char c = ' ';"
        ]);
    }

    #[test]
    fn comment_markers_inside_strings_are_ignored() {
        let out = mask(r#"url = "http://x"; y;"#);
        assert!(out[0].ends_with("\"; y;"));
        assert!(!out[0].contains("//"));
    }
}
