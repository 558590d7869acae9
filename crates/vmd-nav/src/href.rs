//! URL-like reference parsing.
//!
//! Rendered markdown hands us whatever the author wrote in a link or image:
//! absolute URLs, `file:` URLs, relative paths, bare fragments, or paths
//! with a query string. [`Href::parse`] splits them into the three parts
//! the classifier cares about without resolving anything.

/// A parsed reference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Href {
    /// Lowercased scheme without the trailing `:`.
    pub protocol: Option<String>,
    /// Percent-decoded path. `None` when empty.
    pub pathname: Option<String>,
    /// Everything after the first `#`, possibly empty.
    pub fragment: Option<String>,
}

impl Href {
    pub fn parse(raw: &str) -> Self {
        let (before_fragment, fragment) = match raw.split_once('#') {
            Some((head, frag)) => (head, Some(frag.to_string())),
            None => (raw, None),
        };
        let without_query = before_fragment
            .split_once('?')
            .map_or(before_fragment, |(head, _)| head);

        let (protocol, rest) = split_scheme(without_query);
        let path_part = match protocol {
            Some(_) => strip_authority(rest),
            None => rest,
        };

        Self {
            protocol,
            pathname: (!path_part.is_empty()).then(|| percent_decode(path_part)),
            fragment,
        }
    }

    /// Whether the scheme is `file:`.
    pub fn is_file_url(&self) -> bool {
        self.protocol.as_deref() == Some("file")
    }

    /// A scheme other than `file:`.
    pub fn is_external(&self) -> bool {
        self.protocol.is_some() && !self.is_file_url()
    }

    /// `#fragment` with nothing before it.
    pub fn is_bare_fragment(&self) -> bool {
        self.fragment.is_some() && self.protocol.is_none() && self.pathname.is_none()
    }
}

/// Split `scheme:rest`. Single-letter schemes are Windows drive letters.
fn split_scheme(s: &str) -> (Option<String>, &str) {
    let Some(colon) = s.find(':') else {
        return (None, s);
    };
    let scheme = &s[..colon];
    let mut chars = scheme.chars();
    let valid = scheme.len() >= 2
        && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if valid {
        (Some(scheme.to_ascii_lowercase()), &s[colon + 1..])
    } else {
        (None, s)
    }
}

/// Drop `//authority` so `file:///a/b` and `file://host/a/b` yield `/a/b`.
fn strip_authority(rest: &str) -> &str {
    match rest.strip_prefix("//") {
        Some(after) => after.find('/').map_or("", |i| &after[i..]),
        None => rest,
    }
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decode `%XX` escapes. Malformed escapes pass through; a result that is
/// not UTF-8 falls back to the raw input.
fn percent_decode(input: &str) -> String {
    if !input.contains('%') {
        return input.to_string();
    }
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let (Some(hi), Some(lo)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2]))
        {
            out.push((hi << 4) | lo);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).unwrap_or_else(|_| input.to_string())
}
