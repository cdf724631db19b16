use super::error::TokenError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Single(u32),
    /// Inclusive, `start <= end`.
    Range { start: u32, end: u32 },
}

/// One comma-separated unit of a page specification, 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSpecToken {
    pub kind: TokenKind,
    /// The trimmed text the token was parsed from.
    pub raw: String,
}

impl PageSpecToken {
    pub fn single(page: u32) -> Self {
        PageSpecToken {
            kind: TokenKind::Single(page),
            raw: page.to_string(),
        }
    }

    pub fn range(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "inverted range {start}-{end}");
        PageSpecToken {
            kind: TokenKind::Range { start, end },
            raw: format!("{}-{}", start, end),
        }
    }

    pub fn first(&self) -> u32 {
        match self.kind {
            TokenKind::Single(page) => page,
            TokenKind::Range { start, .. } => start,
        }
    }

    pub fn last(&self) -> u32 {
        match self.kind {
            TokenKind::Single(page) => page,
            TokenKind::Range { end, .. } => end,
        }
    }
}

impl fmt::Display for PageSpecToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parse a single token like "5" or "7-9".
pub fn parse_token(raw: &str) -> Result<PageSpecToken, TokenError> {
    let raw = raw.trim();
    let malformed = || TokenError::malformed(raw);

    if raw.is_empty() {
        return Err(malformed());
    }

    let mut parts = raw.split('-');
    let first = parts.next().ok_or_else(malformed)?;

    let kind = match (parts.next(), parts.next()) {
        (None, _) => TokenKind::Single(parse_page_number(first).ok_or_else(malformed)?),
        (Some(second), None) => {
            let start = parse_page_number(first).ok_or_else(malformed)?;
            let end = parse_page_number(second).ok_or_else(malformed)?;
            if start > end {
                return Err(malformed());
            }
            TokenKind::Range { start, end }
        }
        // "1-2-3"
        (Some(_), Some(_)) => return Err(malformed()),
    };

    Ok(PageSpecToken {
        kind,
        raw: raw.to_string(),
    })
}

/// Parse a comma-separated page specification like "1-3,5,7-9".
///
/// Every piece is parsed independently so that all mistakes can be reported
/// at once. A blank specification yields no tokens at all.
pub fn parse_spec(input: &str) -> Vec<Result<PageSpecToken, TokenError>> {
    if input.trim().is_empty() {
        return Vec::new();
    }
    input.split(',').map(parse_token).collect()
}

// `str::parse::<u32>` accepts a leading '+', which is not a page number.
fn parse_page_number(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
