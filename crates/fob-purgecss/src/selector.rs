//! Breaking serialized selectors into the parts that decide whether they are used
//!
//! Selectors are read from lightningcss' own serialization, so the scanner only
//! has to cope with well-formed output: identifiers may carry CSS escapes,
//! attribute values are quoted, and functional pseudo-classes have balanced
//! parentheses.

/// Attribute selector operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOperator {
    /// `=`
    Equal,
    /// `~=`
    Includes,
    /// `|=`
    DashMatch,
    /// `^=`
    Prefix,
    /// `$=`
    Suffix,
    /// `*=`
    Substring,
}

impl AttrOperator {
    fn parse(op: &str) -> Option<Self> {
        Some(match op {
            "=" => Self::Equal,
            "~=" => Self::Includes,
            "|=" => Self::DashMatch,
            "^=" => Self::Prefix,
            "$=" => Self::Suffix,
            "*=" => Self::Substring,
            _ => return None,
        })
    }

    /// Does `candidate` satisfy `[attr <op> value]`?
    pub fn matches(self, candidate: &str, value: &str) -> bool {
        match self {
            Self::Equal | Self::Includes => candidate == value,
            Self::DashMatch => {
                candidate == value
                    || candidate
                        .strip_prefix(value)
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            Self::Prefix => candidate.starts_with(value),
            Self::Suffix => candidate.ends_with(value),
            Self::Substring => candidate.contains(value),
        }
    }
}

/// One meaningful piece of a compound selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorPart {
    Class(String),
    Id(String),
    Tag(String),
    Attribute {
        name: String,
        operator: Option<AttrOperator>,
        value: Option<String>,
    },
}

impl SelectorPart {
    /// The bare name matched against candidates and whitelists
    pub fn name(&self) -> &str {
        match self {
            Self::Class(name) | Self::Id(name) | Self::Tag(name) => name,
            Self::Attribute { name, .. } => name,
        }
    }
}

/// Split a serialized selector list at its top-level commas
pub fn split_selector_list(list: &str) -> Vec<String> {
    let mut selectors = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = list.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                continue;
            }
            '"' | '\'' if quote == Some(c) => quote = None,
            '"' | '\'' if quote.is_none() => quote = Some(c),
            _ if quote.is_some() => {}
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                selectors.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }

    if !current.trim().is_empty() {
        selectors.push(current.trim().to_string());
    }
    selectors
}

/// Extract the class, id, tag and attribute parts of one selector
///
/// Pseudo-classes and pseudo-elements are skipped along with their
/// arguments, so `:not(.a)` contributes nothing.
pub fn selector_parts(selector: &str) -> Vec<SelectorPart> {
    let chars: Vec<char> = selector.chars().collect();
    let mut parts = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '.' | '#' => {
                let (ident, next) = read_ident(&chars, i + 1);
                i = next.max(i + 1);
                if !ident.is_empty() {
                    parts.push(if c == '.' {
                        SelectorPart::Class(ident)
                    } else {
                        SelectorPart::Id(ident)
                    });
                }
            }
            '[' => {
                let end = find_closing(&chars, i, '[', ']');
                let body: String = chars[i + 1..end.min(chars.len())].iter().collect();
                if let Some(part) = parse_attribute(&body) {
                    parts.push(part);
                }
                i = end + 1;
            }
            ':' => {
                while i < chars.len() && chars[i] == ':' {
                    i += 1;
                }
                let (_, next) = read_ident(&chars, i);
                i = next;
                if i < chars.len() && chars[i] == '(' {
                    i = find_closing(&chars, i, '(', ')') + 1;
                }
            }
            '(' => i = find_closing(&chars, i, '(', ')') + 1,
            '"' | '\'' => i = skip_string(&chars, i),
            _ if is_ident_start(c) => {
                let (ident, next) = read_ident(&chars, i);
                i = next.max(i + 1);
                if !ident.is_empty() {
                    parts.push(SelectorPart::Tag(ident));
                }
            }
            _ => i += 1,
        }
    }

    parts
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '-' || c == '\\' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

/// Read an identifier starting at `start`, resolving CSS escapes
fn read_ident(chars: &[char], start: usize) -> (String, usize) {
    let mut ident = String::new();
    let mut i = start;

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            i += 1;
            let Some(&next) = chars.get(i) else { break };
            if next.is_ascii_hexdigit() {
                let mut code = String::new();
                while i < chars.len() && code.len() < 6 && chars[i].is_ascii_hexdigit() {
                    code.push(chars[i]);
                    i += 1;
                }
                if i < chars.len() && chars[i].is_whitespace() {
                    i += 1;
                }
                let decoded = u32::from_str_radix(&code, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                ident.push(decoded);
            } else {
                ident.push(next);
                i += 1;
            }
        } else if is_ident_char(c) {
            ident.push(c);
            i += 1;
        } else {
            break;
        }
    }

    (ident, i)
}

/// Index of the bracket closing the one at `open_at`, or the end of input
fn find_closing(chars: &[char], open_at: usize, open: char, close: char) -> usize {
    let mut depth = 0usize;
    let mut i = open_at;

    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '"' | '\'' => {
                i = skip_string(chars, i);
                continue;
            }
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
        i += 1;
    }

    chars.len()
}

/// Index just past the string literal starting at `start`
fn skip_string(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

fn parse_attribute(body: &str) -> Option<SelectorPart> {
    let body = body.trim();
    let op_start = body.find(['=', '~', '|', '^', '$', '*']);

    let (raw_name, operator, raw_value) = match op_start {
        // `ns|attr` uses `|` as a namespace separator, not an operator
        Some(pos) if body[pos..].starts_with('|') && !body[pos..].starts_with("|=") => {
            return parse_attribute(&body[pos + 1..]);
        }
        Some(pos) => {
            let op_len = if body[pos..].starts_with('=') { 1 } else { 2 };
            let operator = AttrOperator::parse(body.get(pos..pos + op_len)?)?;
            (&body[..pos], Some(operator), Some(body[pos + op_len..].trim()))
        }
        None => (body, None, None),
    };

    let name = raw_name.trim().to_string();
    if name.is_empty() {
        return None;
    }

    let value = raw_value.map(|raw| {
        let mut chars = raw.chars();
        match chars.next() {
            Some(q @ ('"' | '\'')) => chars.take_while(|&c| c != q).collect(),
            _ => raw.split_whitespace().next().unwrap_or_default().to_string(),
        }
    });

    Some(SelectorPart::Attribute {
        name,
        operator,
        value,
    })
}
