//! Which paths the gate applies to.
//!
//! Internal framework routes, the backend API prefix and anything that looks
//! like a static file are handled upstream without evaluation.

const BYPASS_PREFIXES: &[&str] = &["api/", "_next/", "_static/", "_vercel"];

/// Returns `true` if requests to `path` must go through the gate.
pub fn is_gated(path: &str) -> bool {
    let rest = path.strip_prefix('/').unwrap_or(path);

    if BYPASS_PREFIXES.iter().any(|p| rest.starts_with(p)) {
        return false;
    }

    !rest.split('/').any(looks_like_file)
}

/// `[\w-]+\.\w+` anywhere in the segment.
fn looks_like_file(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'.'
            && i > 0
            && is_name_byte(bytes[i - 1])
            && bytes.get(i + 1).is_some_and(|&n| is_word_byte(n))
    })
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_name_byte(b: u8) -> bool {
    is_word_byte(b) || b == b'-'
}
