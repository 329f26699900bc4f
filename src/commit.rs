use git2::Oid;

use crate::error::{Error, Result};

/// One ordered `key value` header line of a raw commit object.
///
/// Multi-line values (e.g. `gpgsig` blocks) keep their continuation lines
/// embedded in `value` as `\n` followed by the leading space, so that
/// serializing a field as `key SP value NL` reproduces the original bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    pub key: String,
    pub value: Vec<u8>,
}

/// A commit object split into its ordered header fields and free-text body.
///
/// The split is purely textual: the header is everything up to the first
/// blank line, the body everything after it. No field is interpreted beyond
/// what the rewrite needs (`parent` values), so signature blocks and unknown
/// headers survive untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommit {
    pub fields: Vec<HeaderField>,
    pub body: Vec<u8>,
}

impl RawCommit {
    /// Parse the raw bytes of a commit object.
    ///
    /// # Errors
    /// Returns [`Error::BadCommit`] if a header line has no key/value
    /// separator, a key is not UTF-8, or a continuation line appears before
    /// any field.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let (header, body) = match find_blank_line(data) {
            Some(pos) => (&data[..pos], &data[pos + 2..]),
            None => (data, &data[data.len()..]),
        };

        let mut fields: Vec<HeaderField> = Vec::new();
        for line in header.split(|&b| b == b'\n') {
            if line.is_empty() {
                continue;
            }
            if line[0] == b' ' {
                // Continuation of the previous field's value.
                let field = fields
                    .last_mut()
                    .ok_or_else(|| Error::bad_commit("continuation line before any header"))?;
                field.value.push(b'\n');
                field.value.extend_from_slice(line);
                continue;
            }
            let sep = line
                .iter()
                .position(|&b| b == b' ')
                .ok_or_else(|| Error::bad_commit("header line without separator"))?;
            let key = std::str::from_utf8(&line[..sep])
                .map_err(|_| Error::bad_commit("header key is not UTF-8"))?;
            fields.push(HeaderField {
                key: key.to_string(),
                value: line[sep + 1..].to_vec(),
            });
        }

        Ok(RawCommit {
            fields,
            body: body.to_vec(),
        })
    }

    /// Serialize back to raw object bytes.
    ///
    /// On every well-formed commit object this is the exact inverse of
    /// [`parse`](Self::parse), byte for byte, which is what makes digest
    /// reuse for unchanged commits possible.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.body.len() + 256);
        for field in &self.fields {
            out.extend_from_slice(field.key.as_bytes());
            out.push(b' ');
            out.extend_from_slice(&field.value);
            out.push(b'\n');
        }
        out.push(b'\n');
        out.extend_from_slice(&self.body);
        out
    }

    /// The parent commit ids, in header order.
    ///
    /// # Errors
    /// Returns [`Error::BadCommit`] if a `parent` value is not a valid
    /// object id.
    pub fn parent_ids(&self) -> Result<Vec<Oid>> {
        let mut out = Vec::new();
        for field in &self.fields {
            if field.key == "parent" {
                let hex = std::str::from_utf8(&field.value)
                    .map_err(|_| Error::bad_commit("parent id is not UTF-8"))?;
                let oid = Oid::from_str(hex.trim())
                    .map_err(|_| Error::bad_commit(format!("bad parent id: {}", hex)))?;
                out.push(oid);
            }
        }
        Ok(out)
    }

    /// First line of the body, lossily decoded. Empty if the body is empty.
    pub fn subject(&self) -> String {
        let line = self
            .body
            .split(|&b| b == b'\n')
            .next()
            .unwrap_or(&[]);
        String::from_utf8_lossy(line).trim().to_string()
    }
}

/// Find the offset of the first `\n\n` separator.
fn find_blank_line(data: &[u8]) -> Option<usize> {
    data.windows(2).position(|w| w == b"\n\n")
}

// ---------------------------------------------------------------------------
// Trailer helpers
// ---------------------------------------------------------------------------
//
// Trailers live in the final paragraph of the body ("Signed-off-by:",
// "Fixes:", ...). These helpers work on raw body bytes so programmatic
// rewrites go through the same path the editor does.

/// Split a body into lines, each without its trailing newline.
fn body_lines(body: &[u8]) -> Vec<&[u8]> {
    let mut lines: Vec<&[u8]> = body.split(|&b| b == b'\n').collect();
    // A trailing newline yields one empty tail element; drop it so the line
    // list round-trips through join + final newline.
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

fn join_lines(lines: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    for line in lines {
        out.extend_from_slice(line);
        out.push(b'\n');
    }
    out
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(|b| b.is_ascii_whitespace())
}

/// `true` if the final paragraph carries a `key:` trailer (case-insensitive).
pub fn has_trailer(body: &[u8], key: &str) -> bool {
    let lines = body_lines(body);
    let prefix = format!("{}:", key).to_ascii_lowercase();
    for line in lines.iter().rev() {
        if is_blank(line) {
            break;
        }
        let lower = line.to_ascii_lowercase();
        if lower.starts_with(prefix.as_bytes()) {
            return true;
        }
    }
    false
}

/// Insert `key: value` at the start of the final paragraph of `body`.
///
/// # Errors
/// Returns [`Error::BadCommit`] when the body has no paragraph break to
/// anchor a trailer block (e.g. a bare subject line).
pub fn append_trailer(body: &[u8], key: &str, value: &str) -> Result<Vec<u8>> {
    let mut lines = body_lines(body);
    let trailer = format!("{}: {}", key, value).into_bytes();

    let mut anchor = None;
    for lineno in (1..lines.len()).rev() {
        if is_blank(lines[lineno]) {
            anchor = Some(lineno + 1);
            break;
        }
    }
    match anchor {
        Some(at) => {
            lines.insert(at, &trailer);
            Ok(join_lines(&lines))
        }
        None => Err(Error::bad_commit(
            "body has no blank line to anchor a trailer",
        )),
    }
}

/// Remove `key:` trailer lines from the final paragraph of `body`.
pub fn remove_trailers(body: &[u8], key: &str) -> Vec<u8> {
    let mut lines = body_lines(body);
    let prefix = format!("{}:", key).to_ascii_lowercase();

    for lineno in (1..lines.len()).rev() {
        if is_blank(lines[lineno]) {
            break;
        }
        if lines[lineno].to_ascii_lowercase().starts_with(prefix.as_bytes()) {
            lines.remove(lineno);
        }
    }
    join_lines(&lines)
}
