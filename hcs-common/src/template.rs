//! Metadata templating
//!
//! Expands patterns like `pre_\g<Plate>_post` against the metadata of the
//! current image set. A doubled backslash is an escaped literal backslash
//! and must be consumed *before* backreference tokens are matched, so that
//! `\\g<Plate>` comes out as the literal text `\g<Plate>` rather than a
//! substitution preceded by a backslash. The three stages below are the
//! contract; a regex engine's own backreference handling is deliberately
//! not involved.

use crate::error::{Error, Result};
use crate::store::{Store, IMAGE, METADATA_PREFIX};

impl Store {
    /// Expand every `\g<Name>` in the pattern with the current image set's
    /// `Metadata_Name` value. Fails with `Error::Template` when a
    /// referenced key has no value on the current image set.
    pub fn apply_metadata(&self, pattern: &str) -> Result<String> {
        expand(pattern, |name| {
            let feature = format!("{}{}", METADATA_PREFIX, name);
            self.get_current_measurement(IMAGE, &feature)
                .map(|v| v.to_string())
        })
    }
}

/// Three-stage substitution:
/// 1. freeze `\\` into a placeholder character not present in the pattern
/// 2. replace each remaining `\g<Name>` via the lookup
/// 3. thaw placeholders back to single backslashes
pub fn expand<F>(pattern: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let placeholder = pick_placeholder(pattern);
    let frozen = pattern.replace("\\\\", &placeholder.to_string());
    let substituted = substitute(&frozen, &lookup)?;
    Ok(substituted.replace(placeholder, "\\"))
}

/// Replace `\g<Name>` tokens. Malformed tokens (no `<`, an invalid name,
/// or a missing closing `>`) are copied through unchanged.
fn substitute<F>(pattern: &str, lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(pos) = rest.find("\\g<") {
        let (head, tail) = rest.split_at(pos);
        out.push_str(head);
        let body = &tail[3..];
        match parse_name(body) {
            Some((name, consumed)) => {
                let value = lookup(name).ok_or_else(|| {
                    Error::Template(format!(
                        "no metadata value for key \"{}\" on the current image set",
                        name
                    ))
                })?;
                out.push_str(&value);
                rest = &body[consumed..];
            }
            None => {
                out.push_str("\\g<");
                rest = body;
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

/// Parse an identifier followed by `>`; returns the name and the number of
/// bytes consumed including the closing bracket.
fn parse_name(body: &str) -> Option<(&str, usize)> {
    let end = body.find('>')?;
    let name = &body[..end];
    let mut chars = name.chars();
    let first = chars.next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some((name, end + 1))
}

/// First private-use character that does not occur in the pattern. The
/// pattern is finite, the private-use area is not, so this always finds one.
fn pick_placeholder(pattern: &str) -> char {
    ('\u{e000}'..='\u{f8ff}')
        .find(|c| !pattern.contains(*c))
        .unwrap_or('\u{e000}')
}
