use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegExpError {
    #[error("invalid regular expression flag '{0}'")]
    UnknownFlag(char),

    #[error("duplicate regular expression flag '{0}'")]
    DuplicateFlag(char),

    #[error("invalid regular expression /{pattern}/: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Flag letters in canonical order.
const FLAG_ORDER: &str = "dgimsuvy";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RegExpFlags {
    pub has_indices: bool,
    pub global: bool,
    pub ignore_case: bool,
    pub multiline: bool,
    pub dot_all: bool,
    pub unicode: bool,
    pub unicode_sets: bool,
    pub sticky: bool,
}

impl RegExpFlags {
    pub fn parse(flags: &str) -> Result<Self, RegExpError> {
        let mut out = RegExpFlags::default();
        for c in flags.chars() {
            let slot = match c {
                'd' => &mut out.has_indices,
                'g' => &mut out.global,
                'i' => &mut out.ignore_case,
                'm' => &mut out.multiline,
                's' => &mut out.dot_all,
                'u' => &mut out.unicode,
                'v' => &mut out.unicode_sets,
                'y' => &mut out.sticky,
                other => return Err(RegExpError::UnknownFlag(other)),
            };
            if *slot {
                return Err(RegExpError::DuplicateFlag(c));
            }
            *slot = true;
        }
        Ok(out)
    }

    fn is_set(&self, c: char) -> bool {
        match c {
            'd' => self.has_indices,
            'g' => self.global,
            'i' => self.ignore_case,
            'm' => self.multiline,
            's' => self.dot_all,
            'u' => self.unicode,
            'v' => self.unicode_sets,
            'y' => self.sticky,
            _ => false,
        }
    }
}

impl fmt::Display for RegExpFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in FLAG_ORDER.chars().filter(|&c| self.is_set(c)) {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
enum CompiledRegex {
    Fancy(fancy_regex::Regex),
    Standard(regex::Regex),
}

/// Pattern text plus flag set. Equality of two regexps is decided on these
/// two parts alone; the compiled matcher is only used by `test`.
#[derive(Clone, Debug)]
pub struct RegExp {
    source: String,
    flags: RegExpFlags,
    compiled: CompiledRegex,
}

impl RegExp {
    pub fn new(source: &str, flags: &str) -> Result<Self, RegExpError> {
        let flags = RegExpFlags::parse(flags)?;
        let compiled = build_regex(source, &flags)?;
        Ok(Self {
            source: source.to_string(),
            flags,
            compiled,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> RegExpFlags {
        self.flags
    }

    pub fn global(&self) -> bool {
        self.flags.global
    }

    pub fn ignore_case(&self) -> bool {
        self.flags.ignore_case
    }

    pub fn multiline(&self) -> bool {
        self.flags.multiline
    }

    pub fn test(&self, text: &str) -> bool {
        match &self.compiled {
            CompiledRegex::Fancy(r) => r.is_match(text).unwrap_or(false),
            CompiledRegex::Standard(r) => r.is_match(text),
        }
    }
}

impl fmt::Display for RegExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = if self.source.is_empty() {
            "(?:)"
        } else {
            &self.source
        };
        write!(f, "/{source}/{}", self.flags)
    }
}

fn translate_pattern(source: &str, flags: &RegExpFlags) -> String {
    let mut pattern = String::new();
    if flags.ignore_case {
        pattern.push_str("(?i)");
    }
    if flags.dot_all {
        pattern.push_str("(?s)");
    }
    if flags.multiline {
        pattern.push_str("(?m)");
    }
    let body = translate_syntax(source);
    if flags.sticky {
        pattern.push_str("\\A(?:");
        pattern.push_str(&body);
        pattern.push(')');
    } else {
        pattern.push_str(&body);
    }
    pattern
}

/// Rewrites pattern syntax that `regex` and `fancy-regex` spell differently
/// or not at all.
fn translate_syntax(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut in_class = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '[' if !in_class => match (chars.get(i + 1), chars.get(i + 2)) {
                // `[]` never matches, `[^]` matches any character
                (Some(']'), _) => {
                    out.push_str(r"[^\s\S]");
                    i += 2;
                    continue;
                }
                (Some('^'), Some(']')) => {
                    out.push_str(r"[\s\S]");
                    i += 3;
                    continue;
                }
                _ => {
                    in_class = true;
                    out.push('[');
                }
            },
            ']' if in_class => {
                in_class = false;
                out.push(']');
            }
            '(' if !in_class
                && chars.get(i + 1) == Some(&'?')
                && chars.get(i + 2) == Some(&'<')
                && !matches!(chars.get(i + 3), Some('=' | '!')) =>
            {
                out.push_str("(?P<");
                i += 3;
                continue;
            }
            '\\' if i + 1 < chars.len() => {
                i += 1 + translate_escape(&chars[i + 1..], &mut out);
                continue;
            }
            _ => out.push(c),
        }
        i += 1;
    }
    out
}

fn push_literal(out: &mut String, ch: char) {
    out.push_str(&regex::escape(ch.encode_utf8(&mut [0; 4])));
}

fn hex_char(digits: &[char]) -> Option<char> {
    if digits.is_empty() || !digits.iter().all(char::is_ascii_hexdigit) {
        return None;
    }
    let text: String = digits.iter().collect();
    u32::from_str_radix(&text, 16).ok().and_then(char::from_u32)
}

/// Translates the escape following a backslash; returns how many characters
/// of `rest` it used.
fn translate_escape(rest: &[char], out: &mut String) -> usize {
    match rest {
        ['c', letter, ..] if letter.is_ascii_alphabetic() => {
            push_literal(out, char::from(*letter as u8 % 32));
            2
        }
        ['0'] => {
            push_literal(out, '\0');
            1
        }
        ['0', next, ..] if !next.is_ascii_digit() => {
            push_literal(out, '\0');
            1
        }
        ['v', ..] => {
            push_literal(out, '\x0B');
            1
        }
        ['x', a, b, ..] if hex_char(&[*a, *b]).is_some() => {
            if let Some(ch) = hex_char(&[*a, *b]) {
                push_literal(out, ch);
            }
            3
        }
        ['u', '{', tail @ ..] => match tail.iter().position(|&c| c == '}') {
            Some(end) if hex_char(&tail[..end]).is_some() => {
                if let Some(ch) = hex_char(&tail[..end]) {
                    push_literal(out, ch);
                }
                end + 3
            }
            _ => {
                out.push_str("\\u");
                1
            }
        },
        ['u', a, b, c, d, ..] if hex_char(&[*a, *b, *c, *d]).is_some() => {
            if let Some(ch) = hex_char(&[*a, *b, *c, *d]) {
                push_literal(out, ch);
            }
            5
        }
        ['k', '<', tail @ ..] => match tail.iter().position(|&c| c == '>') {
            Some(end) => {
                out.push_str("(?P=");
                out.extend(&tail[..end]);
                out.push(')');
                end + 3
            }
            None => {
                out.push_str("\\k");
                1
            }
        },
        [next, ..] => {
            out.push('\\');
            out.push(*next);
            1
        }
        [] => 0,
    }
}

fn build_regex(source: &str, flags: &RegExpFlags) -> Result<CompiledRegex, RegExpError> {
    let pattern = translate_pattern(source, flags);
    match fancy_regex::Regex::new(&pattern) {
        Ok(r) => Ok(CompiledRegex::Fancy(r)),
        // Fallback to standard regex (no backreferences/lookaround but handles deep nesting)
        Err(_) => regex::Regex::new(&pattern)
            .map(CompiledRegex::Standard)
            .map_err(|e| RegExpError::InvalidPattern {
                pattern: source.to_string(),
                reason: e.to_string(),
            }),
    }
}
