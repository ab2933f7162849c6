//! Structural pre-check of raw SGF text, run before the parser.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::SgfError;

/// Default ceiling for SGF content (1 MiB).
pub const DEFAULT_MAX_BYTES: usize = 1024 * 1024;

/// A node marker followed by an uppercase tag and an opening bracket.
static PROPERTY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r";\s*[A-Z][A-Za-z]*\s*\[").expect("property pattern is valid"));

/// Cheap checks that reject text which cannot be an SGF record.
///
/// Size is checked first so oversized input is never scanned.
pub fn check_text(content: &str, max_bytes: usize) -> Result<(), SgfError> {
    if content.len() > max_bytes {
        return Err(SgfError::TooLarge {
            size: content.len(),
            limit: max_bytes,
        });
    }

    // Same whitespace the parser skips; anything else before '(' is rejected here.
    let trimmed = content.trim_matches(|c: char| c.is_ascii_whitespace());
    if trimmed.is_empty() {
        return Err(SgfError::InvalidFormat("content is empty".into()));
    }
    if !trimmed.starts_with('(') {
        return Err(SgfError::InvalidFormat("content must start with '('".into()));
    }
    if !trimmed.ends_with(')') {
        return Err(SgfError::InvalidFormat("content must end with ')'".into()));
    }

    check_balance(trimmed)?;

    if !PROPERTY_RE.is_match(trimmed) {
        return Err(SgfError::InvalidFormat(
            "no properties found (expected at least one ';TAG[value]')".into(),
        ));
    }

    Ok(())
}

/// Parentheses outside of bracketed values must balance.
fn check_balance(text: &str) -> Result<(), SgfError> {
    let mut depth: usize = 0;
    let mut in_value = false;
    let mut escaped = false;

    for ch in text.chars() {
        if in_value {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                ']' => in_value = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '[' => in_value = true,
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    return Err(SgfError::InvalidFormat(
                        "unbalanced parentheses: unexpected ')'".into(),
                    ));
                }
                depth -= 1;
            }
            _ => {}
        }
    }

    if in_value {
        return Err(SgfError::InvalidFormat("unterminated property value".into()));
    }
    if depth != 0 {
        return Err(SgfError::InvalidFormat(format!(
            "unbalanced parentheses: {depth} unclosed '('"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn kind_of(content: &str) -> Option<ErrorKind> {
        check_text(content, DEFAULT_MAX_BYTES).err().map(|e| e.kind())
    }

    #[test]
    fn test_accepts_minimal_record() {
        assert!(check_text("(;FF[4]GM[1]SZ[19];B[dd];W[pd])", DEFAULT_MAX_BYTES).is_ok());
        assert!(check_text("  \n(;GM[1])\n", DEFAULT_MAX_BYTES).is_ok());
    }

    #[test]
    fn test_rejects_oversized_before_anything_else() {
        let err = check_text("not sgf at all", 4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileTooLarge);
    }

    #[test]
    fn test_non_ascii_whitespace_is_not_trimmed() {
        for lead in ["\u{3000}", "\u{00A0}", "\u{2028}"] {
            let content = format!("{lead}(;FF[4]GM[1]SZ[19];B[dd];W[pd])");
            assert_eq!(kind_of(&content), Some(ErrorKind::InvalidFormat), "{lead:?}");
        }
        assert!(check_text("\t\r\n(;GM[1])\n", DEFAULT_MAX_BYTES).is_ok());
    }

    #[test]
    fn test_rejects_missing_delimiters() {
        assert_eq!(kind_of("   "), Some(ErrorKind::InvalidFormat));
        assert_eq!(kind_of(";FF[4])"), Some(ErrorKind::InvalidFormat));
        assert_eq!(kind_of("(;FF[4]"), Some(ErrorKind::InvalidFormat));
    }

    #[test]
    fn test_rejects_without_properties() {
        assert_eq!(kind_of("(;)"), Some(ErrorKind::InvalidFormat));
        assert_eq!(kind_of("(hello)"), Some(ErrorKind::InvalidFormat));
    }

    #[test]
    fn test_parentheses_inside_values_are_ignored() {
        assert!(check_text("(;C[a smiley :)];B[aa])", DEFAULT_MAX_BYTES).is_ok());
        assert!(check_text(r"(;C[escaped \] then (];B[aa])", DEFAULT_MAX_BYTES).is_ok());
    }

    #[test]
    fn test_rejects_unbalanced() {
        assert_eq!(kind_of("(;B[aa](;W[bb])"), Some(ErrorKind::InvalidFormat));
        assert_eq!(kind_of("(;B[aa]))(;W[bb])"), Some(ErrorKind::InvalidFormat));
    }
}
