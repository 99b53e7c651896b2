//! Tolerant parser for Steam's text KeyValues (VDF) format.
//!
//! Handles `libraryfolders.vdf` and `loginusers.vdf`. The format is a tree
//! of quoted keys mapping to either quoted strings or brace-delimited child
//! objects. Real-world files contain comments, unquoted tokens, and the
//! occasional malformed entry; single bad entries are skipped rather than
//! failing the whole parse.

use crate::SteamError;

/// A parsed VDF value: either a string or a nested object.
///
/// Objects preserve entry order and allow duplicate keys, matching the file
/// format itself.
#[derive(Debug, Clone, PartialEq)]
pub enum VdfValue {
    Str(String),
    Obj(Vec<(String, VdfValue)>),
}

impl VdfValue {
    /// Returns the string content, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            VdfValue::Str(s) => Some(s),
            VdfValue::Obj(_) => None,
        }
    }

    /// Returns the first child with the given key (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&VdfValue> {
        match self {
            VdfValue::Obj(entries) => entries
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v),
            VdfValue::Str(_) => None,
        }
    }

    /// Returns the child entries, or an empty slice for string values.
    pub fn entries(&self) -> &[(String, VdfValue)] {
        match self {
            VdfValue::Obj(entries) => entries,
            VdfValue::Str(_) => &[],
        }
    }
}

/// Parses a text VDF document into its root object.
pub fn parse_text_vdf(input: &str) -> Result<VdfValue, SteamError> {
    let tokens = tokenize(input)?;
    let mut pos = 0;
    let entries = parse_entries(&tokens, &mut pos);
    Ok(VdfValue::Obj(entries))
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open,
    Close,
    Str(String),
}

fn tokenize(input: &str) -> Result<Vec<Token>, SteamError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => tokens.push(Token::Open),
            '}' => tokens.push(Token::Close),
            '"' => {
                let mut s = String::new();
                let mut terminated = false;
                while let Some(c) = chars.next() {
                    match c {
                        '"' => {
                            terminated = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some('n') => s.push('\n'),
                            Some('t') => s.push('\t'),
                            Some(other) => s.push(other),
                            None => break,
                        },
                        other => s.push(other),
                    }
                }
                if !terminated {
                    return Err(SteamError::Vdf("unterminated quoted string".into()));
                }
                tokens.push(Token::Str(s));
            }
            '/' if chars.peek() == Some(&'/') => {
                // Line comment
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            c if c.is_whitespace() => {}
            c => {
                // Unquoted token (rare, but valid VDF)
                let mut s = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_whitespace() || next == '{' || next == '}' || next == '"' {
                        break;
                    }
                    s.push(next);
                    chars.next();
                }
                tokens.push(Token::Str(s));
            }
        }
    }

    Ok(tokens)
}

/// Parses key/value pairs until a closing brace or end of input.
///
/// Malformed entries (a key with no value, a stray brace) are skipped so one
/// bad entry cannot poison the rest of the document.
fn parse_entries(tokens: &[Token], pos: &mut usize) -> Vec<(String, VdfValue)> {
    let mut entries = Vec::new();

    while *pos < tokens.len() {
        match &tokens[*pos] {
            Token::Close => {
                *pos += 1;
                return entries;
            }
            Token::Open => {
                // Object without a key: consume and discard.
                *pos += 1;
                let _ = parse_entries(tokens, pos);
            }
            Token::Str(key) => {
                let key = key.clone();
                *pos += 1;
                match tokens.get(*pos) {
                    Some(Token::Str(val)) => {
                        entries.push((key, VdfValue::Str(val.clone())));
                        *pos += 1;
                    }
                    Some(Token::Open) => {
                        *pos += 1;
                        let children = parse_entries(tokens, pos);
                        entries.push((key, VdfValue::Obj(children)));
                    }
                    // Dangling key at end of input or before a close brace.
                    _ => {}
                }
            }
        }
    }

    entries
}

/// Scans raw file content for a `"key"  "value"` pair and returns the value.
///
/// This is the permissive two-field extraction used on appmanifest files:
/// the key and value must share a line, but any amount of whitespace may
/// separate them. Returns `None` when the key is absent.
pub fn extract_quoted_field(content: &str, key: &str) -> Option<String> {
    for line in content.lines() {
        let mut fields = quoted_fields(line);
        if let Some(first) = fields.next()
            && first.eq_ignore_ascii_case(key)
        {
            return fields.next();
        }
    }
    None
}

/// Iterates the quoted substrings of a single line.
fn quoted_fields(line: &str) -> impl Iterator<Item = String> + '_ {
    let mut rest = line;
    std::iter::from_fn(move || {
        let start = rest.find('"')?;
        let after = &rest[start + 1..];
        let end = after.find('"')?;
        let field = after[..end].to_string();
        rest = &after[end + 1..];
        Some(field)
    })
}
