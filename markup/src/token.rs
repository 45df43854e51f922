//! Marker token resolution for annotated show-output markup.
//!
//! A markup line is the example output re-typed with each extractable
//! value replaced by a marker. A marker is written
//! `X` CLASS [`(`pattern`)`] [`<`tag`>`] `X`, e.g. `XA<router-id>X` for
//! an address tagged `router-id`, or `XNX` for a number whose tag is
//! derived from the words preceding it on the line.
//!
//! Each token class resolves to a canonical capturing regex fragment;
//! the free-form class (`P`) carries its pattern explicitly.

/// Token classes recognized in markup markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `W` — a single word (`\w+`).
    Word,
    /// `N` — a decimal number.
    Number,
    /// `H` — a hex number, `0x` prefix optional.
    Hex,
    /// `A` — an IPv4 or IPv6 address literal.
    Address,
    /// `T` — an `HH:MM:SS` timestamp.
    Timestamp,
    /// `I` — an interface name (`GigabitEthernet0/0/0/1`, `Te0/1.100`).
    Interface,
    /// `F` — a comma-separated flag list.
    FlagList,
    /// `R` — the rest of the line.
    RestOfLine,
    /// `P` — free-form with an explicit pattern.
    Pattern,
}

impl TokenKind {
    /// Maps a marker class character to its token kind.
    pub fn from_class(class: char) -> Option<Self> {
        Some(match class {
            'W' => TokenKind::Word,
            'N' => TokenKind::Number,
            'H' => TokenKind::Hex,
            'A' => TokenKind::Address,
            'T' => TokenKind::Timestamp,
            'I' => TokenKind::Interface,
            'F' => TokenKind::FlagList,
            'R' => TokenKind::RestOfLine,
            'P' => TokenKind::Pattern,
            _ => return None,
        })
    }

    /// The canonical regex fragment for this class. The free-form class
    /// has no canonical fragment; its pattern lives on the token.
    pub fn fragment(&self) -> &'static str {
        match self {
            TokenKind::Word => r"\w+",
            TokenKind::Number => r"\d+",
            TokenKind::Hex => r"(?:0x)?[0-9A-Fa-f]+",
            TokenKind::Address => {
                r"(?:\d{1,3}(?:\.\d{1,3}){3}|[0-9A-Fa-f]{0,4}(?::[0-9A-Fa-f]{0,4}){2,7}(?:%\w+)?)"
            }
            TokenKind::Timestamp => r"\d{2}:\d{2}:\d{2}",
            TokenKind::Interface => r"[A-Za-z][-A-Za-z0-9._/:]*",
            TokenKind::FlagList => r"\w+(?:,\s*\w+)*",
            TokenKind::RestOfLine => r"[^\r\n]*",
            TokenKind::Pattern => "",
        }
    }
}

/// One marker scanned out of a markup line.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupToken {
    /// Token class.
    pub kind: TokenKind,
    /// Explicit tag, when the marker carried `<tag>`.
    pub tag: Option<String>,
    /// Explicit pattern for the free-form class.
    pub pattern: Option<String>,
    /// Byte span of the whole marker within the line.
    pub start: usize,
    /// Exclusive end of the marker.
    pub end: usize,
}

impl MarkupToken {
    /// The raw fragment this token matches.
    pub fn fragment(&self) -> &str {
        match &self.pattern {
            Some(pattern) => pattern,
            None => self.kind.fragment(),
        }
    }

    /// The fragment with exactly one reporting capture group. A free-form
    /// pattern that already contains a capture group is used verbatim (its
    /// first group reports); anything else is wrapped in one group.
    pub fn capturing_fragment(&self) -> String {
        let fragment = self.fragment();
        if self.kind == TokenKind::Pattern && has_capture_group(fragment) {
            fragment.to_string()
        } else {
            format!("({fragment})")
        }
    }

    /// The fragment with all capture groups suppressed, for markers that
    /// share a line with the reporting token.
    pub fn silent_fragment(&self) -> String {
        format!("(?:{})", suppress_capture_groups(self.fragment()))
    }
}

/// Returns `true` if `pattern` contains an unescaped capturing group
/// (a `(` not followed by `?`, outside character classes).
fn has_capture_group(pattern: &str) -> bool {
    let chars: Vec<char> = pattern.chars().collect();
    let mut in_class = false;
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '(' if !in_class => {
                if chars.get(i + 1) != Some(&'?') {
                    return true;
                }
            }
            _ => {}
        }
        i += 1;
    }
    false
}

/// Rewrites every unescaped capturing `(` as non-capturing `(?:`.
fn suppress_capture_groups(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut in_class = false;
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                out.push('\\');
                if let Some(&next) = chars.get(i + 1) {
                    out.push(next);
                    i += 1;
                }
            }
            '[' if !in_class => {
                in_class = true;
                out.push('[');
            }
            ']' if in_class => {
                in_class = false;
                out.push(']');
            }
            '(' if !in_class && chars.get(i + 1) != Some(&'?') => out.push_str("(?:"),
            ch => out.push(ch),
        }
        i += 1;
    }
    out
}

/// Scans a markup line for markers. Text that does not form a complete,
/// well-formed marker is left as literal content.
pub fn scan_markers(line: &str) -> Vec<MarkupToken> {
    let bytes = line.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'X' {
            if let Some(token) = scan_marker_at(line, i) {
                i = token.end;
                tokens.push(token);
                continue;
            }
        }
        i += 1;
    }
    tokens
}

fn scan_marker_at(line: &str, start: usize) -> Option<MarkupToken> {
    let bytes = line.as_bytes();
    let class = *bytes.get(start + 1)? as char;
    let kind = TokenKind::from_class(class)?;
    let mut i = start + 2;

    let pattern = if kind == TokenKind::Pattern {
        if bytes.get(i) != Some(&b'(') {
            return None;
        }
        let (pattern, after) = scan_balanced_parens(line, i)?;
        i = after;
        Some(pattern)
    } else {
        None
    };

    let tag = if bytes.get(i) == Some(&b'<') {
        let close = line[i + 1..].find('>').map(|p| i + 1 + p)?;
        let tag = &line[i + 1..close];
        if tag.is_empty() {
            return None;
        }
        i = close + 1;
        Some(tag.to_string())
    } else {
        None
    };

    if bytes.get(i) != Some(&b'X') {
        return None;
    }

    Some(MarkupToken {
        kind,
        tag,
        pattern,
        start,
        end: i + 1,
    })
}

/// Scans a `(`-delimited pattern with backslash escapes and nested
/// parens; returns the inner pattern and the index just past the `)`.
fn scan_balanced_parens(line: &str, open: usize) -> Option<(String, usize)> {
    let bytes = line.as_bytes();
    let mut depth = 1;
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((line[open + 1..i].to_string(), i + 1));
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Trailing filler words dropped from derived tags.
const TAG_STOPLIST: [&str; 2] = ["is", "are"];

/// Derives a tag for an untagged marker from the literal words between
/// `from` and the marker's start, lower-cased and joined with `join`.
/// Trailing filler words and punctuation are dropped, so
/// `"output flow control is "` yields `output_flow_control`.
pub fn derive_tag(line: &str, from: usize, marker_start: usize, join: char) -> Option<String> {
    let literal = &line[from..marker_start];
    let mut words: Vec<String> = Vec::new();

    for raw in literal.split_whitespace() {
        let trimmed = raw.trim_matches(|c: char| !c.is_alphanumeric());
        if trimmed.is_empty() {
            continue;
        }
        let mut word = String::with_capacity(trimmed.len());
        for ch in trimmed.chars() {
            if ch.is_alphanumeric() {
                word.extend(ch.to_lowercase());
            } else if !word.ends_with(join) {
                word.push(join);
            }
        }
        words.push(word);
    }

    while words
        .last()
        .is_some_and(|w| TAG_STOPLIST.contains(&w.as_str()))
    {
        words.pop();
    }

    if words.is_empty() {
        return None;
    }
    let separator = join.to_string();
    Some(words.join(separator.as_str()))
}
