//! End-of-block estimation.
//!
//! Every strategy takes the byte offset where a definition starts and
//! returns the exclusive byte offset where it ends. When no terminator is
//! found the definition runs to end of file. Returned offsets always lie on
//! a char boundary and never precede the start.

/// A line of source with its byte range.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    /// Line text without the trailing newline.
    pub text: &'a str,
    /// Offset of the first byte of the line.
    pub start: usize,
    /// Offset just past the trailing newline (or end of content).
    pub end: usize,
    /// Zero-based line number.
    pub index: usize,
}

impl<'a> Line<'a> {
    pub fn trimmed(&self) -> &'a str {
        self.text.trim()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Offset just past the last non-newline byte.
    pub fn text_end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// Iterate over lines with their byte offsets.
pub fn lines(content: &str) -> impl Iterator<Item = Line<'_>> {
    let mut offset = 0;
    content
        .split_inclusive('\n')
        .enumerate()
        .map(move |(index, raw)| {
            let start = offset;
            offset += raw.len();
            let text = raw.strip_suffix('\n').unwrap_or(raw);
            let text = text.strip_suffix('\r').unwrap_or(text);
            Line {
                text,
                start,
                end: offset,
                index,
            }
        })
}

/// Start offset of the line containing `offset`.
pub fn line_start(content: &str, offset: usize) -> usize {
    content[..offset.min(content.len())]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0)
}

/// Leading whitespace width; a tab counts as `tab_width` columns.
pub fn indent_width(text: &str, tab_width: usize) -> usize {
    text.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { tab_width } else { 1 })
        .sum()
}

/// Literal and comment syntax honored while counting braces.
#[derive(Debug, Clone, Copy)]
pub struct BraceStyle {
    /// `'` opens a character or string literal.
    pub single_quote: bool,
    /// Backtick opens a raw/template string.
    pub backtick: bool,
    /// Skip `//` and `/* */` comments.
    pub c_comments: bool,
    /// Skip `#` line comments.
    pub hash_comments: bool,
}

impl BraceStyle {
    /// C-family languages with character literals.
    pub const C: BraceStyle = BraceStyle {
        single_quote: true,
        backtick: false,
        c_comments: true,
        hash_comments: false,
    };

    /// Go: backtick raw strings, no single-quoted strings spanning braces.
    pub const GO: BraceStyle = BraceStyle {
        single_quote: true,
        backtick: true,
        c_comments: true,
        hash_comments: false,
    };

    /// JavaScript/TypeScript: template literals.
    pub const JS: BraceStyle = BraceStyle {
        single_quote: true,
        backtick: true,
        c_comments: true,
        hash_comments: false,
    };

    /// Rust and Swift: `'` also starts lifetimes and labels.
    pub const RUST: BraceStyle = BraceStyle {
        single_quote: false,
        backtick: false,
        c_comments: true,
        hash_comments: false,
    };

    /// PHP: `#` comments as well.
    pub const PHP: BraceStyle = BraceStyle {
        single_quote: true,
        backtick: false,
        c_comments: true,
        hash_comments: true,
    };
}

/// End of the brace-delimited block whose first `{` follows `start`.
pub fn brace_end(content: &str, start: usize, style: BraceStyle) -> usize {
    match content[start..].find('{') {
        Some(open) => matching_brace(content, start + open, style).unwrap_or(content.len()),
        None => content.len(),
    }
}

/// Offset just past the `}` matching the `{` at `open`.
pub fn matching_brace(content: &str, open: usize, style: BraceStyle) -> Option<usize> {
    let bytes = content.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open;

    while i < bytes.len() {
        let b = bytes[i];

        if let Some(q) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        match b {
            b'"' => quote = Some(b'"'),
            b'\'' if style.single_quote => quote = Some(b'\''),
            b'`' if style.backtick => quote = Some(b'`'),
            b'/' if style.c_comments && bytes.get(i + 1) == Some(&b'/') => {
                i = skip_line(bytes, i);
                continue;
            }
            b'#' if style.hash_comments => {
                i = skip_line(bytes, i);
                continue;
            }
            b'/' if style.c_comments && bytes.get(i + 1) == Some(&b'*') => {
                i = match content[i + 2..].find("*/") {
                    Some(close) => i + 2 + close + 2,
                    None => bytes.len(),
                };
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }

    None
}

/// Offset just past the delimiter closing the `(` or `[` at `open`.
/// Quoted text is skipped; other bracket kinds are not tracked.
pub fn matching_delimiter(content: &str, open: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    let (opener, closer) = match bytes.get(open)? {
        b'(' => (b'(', b')'),
        b'[' => (b'[', b']'),
        _ => return None,
    };
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
        } else if b == b'"' || b == b'`' {
            quote = Some(b);
        } else if b == opener {
            depth += 1;
        } else if b == closer {
            depth -= 1;
            if depth == 0 {
                return Some(i + 1);
            }
        }
        i += 1;
    }

    None
}

fn skip_line(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|p| from + p)
        .unwrap_or(bytes.len())
}

/// Arrow functions with an expression body end at the first `;` (inclusive)
/// or newline after the arrow; everything else is brace-matched.
pub fn arrow_or_brace_end(content: &str, start: usize) -> usize {
    let rest = &content[start..];
    let open = rest.find('{');
    let arrow = rest.find("=>");

    if let Some(arrow) = arrow.filter(|a| open.map_or(true, |o| *a < o)) {
        let after = &rest[arrow + 2..];
        if !after.trim_start().starts_with('{') {
            let base = start + arrow + 2;
            let newline = after.find('\n');
            return match after.find(';') {
                Some(semi) if newline.map_or(true, |n| semi < n) => base + semi + 1,
                _ => newline.map(|n| base + n).unwrap_or(content.len()),
            };
        }
    }

    brace_end(content, start, BraceStyle::JS)
}

/// Python-family rule: the definition ends before the next `def`, `async def`,
/// `class` or decorator line indented at or below the definition's own.
/// Other dedented text (string literal bodies, continuation lines) stays in
/// the block. Trailing blank and comment lines are left out of the range.
pub fn indentation_end(content: &str, start: usize) -> usize {
    let mut iter = lines(&content[start..]);
    let Some(header) = iter.next() else {
        return content.len();
    };
    let base = indent_width(header.text, 1);
    let mut last_body_end = start + header.end;

    for line in iter {
        let trimmed = line.trimmed();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if indent_width(line.text, 1) <= base && starts_definition(trimmed) {
            return last_body_end;
        }
        last_body_end = start + line.end;
    }

    content.len()
}

fn starts_definition(trimmed: &str) -> bool {
    trimmed.starts_with('@')
        || ["def ", "async def ", "class "]
            .iter()
            .any(|kw| trimmed.starts_with(kw))
}

/// Ruby-family rule: an `end` at or below the definition's indentation
/// closes it (the line is included); a `def`, `class` or `module` at or
/// below that indentation starts something new (excluded). Tabs count 2.
pub fn keyword_end(content: &str, start: usize) -> usize {
    let mut iter = lines(&content[start..]);
    let Some(header) = iter.next() else {
        return content.len();
    };
    let base = indent_width(header.text, 2);

    // One-line definitions: `def name; body; end`
    if header.trimmed().ends_with(" end") || header.trimmed().ends_with(";end") {
        return start + header.end;
    }

    for line in iter {
        let trimmed = line.trimmed();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let indent = indent_width(line.text, 2);
        if indent > base {
            continue;
        }
        if trimmed == "end" || trimmed.starts_with("end ") || trimmed.starts_with("end.") {
            return start + line.end;
        }
        if ["def ", "class ", "module "]
            .iter()
            .any(|kw| trimmed.starts_with(kw))
        {
            return start + line.start;
        }
    }

    content.len()
}

/// PHP top-level rule: the function runs until the next line that starts
/// with `function `.
pub fn next_function_end(content: &str, start: usize) -> usize {
    content[start..]
        .find("\nfunction ")
        .map(|i| start + i + 1)
        .unwrap_or(content.len())
}

/// End of a single-line item such as an expression-bodied function.
pub fn line_end(content: &str, start: usize) -> usize {
    content[start..]
        .find('\n')
        .map(|i| start + i + 1)
        .unwrap_or(content.len())
}
