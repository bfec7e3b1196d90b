use anyhow::{bail, Result};

/// How many fresh names `store` tries before giving up on collisions.
pub const MAX_NAME_ATTEMPTS: usize = 8;

const TOKEN_LEN: usize = 7;
const TOKEN_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_EXT_LEN: usize = 16;
const MAX_NAME_LEN: usize = 255;

/// Extension of a client-supplied file name, including the leading dot.
///
/// Only the final path segment is considered (clients may send `C:\dir\x.png`).
/// A leading-dot-only name such as `.bashrc` has no extension, `a.` yields `.`.
/// Extensions that are not plain ASCII alphanumerics, or are longer than 16
/// characters, are dropped so the stored name remains a single safe segment.
pub fn extension_of(original_name: &str) -> String {
    let base = original_name.rsplit(['/', '\\']).next().unwrap_or("");
    let Some(dot) = base.rfind('.') else { return String::new() };
    if dot == 0 {
        return String::new();
    }
    let ext = &base[dot + 1..];
    if ext.len() > MAX_EXT_LEN || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return String::new();
    }
    format!(".{ext}")
}

/// 7 lowercase base-36 characters from OS randomness.
pub fn random_token() -> Result<String> {
    let mut out = String::with_capacity(TOKEN_LEN);
    let mut buf = [0u8; 16];
    while out.len() < TOKEN_LEN {
        if let Err(e) = getrandom::getrandom(&mut buf) {
            bail!("os randomness unavailable: {e}");
        }
        push_token_chars(&mut out, &buf);
    }
    Ok(out)
}

/// Largest multiple of the alphabet size that fits in a byte; bytes at or above it are skipped.
const UNBIASED_LIMIT: u8 = (256 / TOKEN_ALPHABET.len() * TOKEN_ALPHABET.len()) as u8;

/// Append alphabet characters for `bytes` until the token is full, rejecting
/// bytes that would bias the low characters.
fn push_token_chars(out: &mut String, bytes: &[u8]) {
    for b in bytes.iter().filter(|b| **b < UNBIASED_LIMIT) {
        if out.len() == TOKEN_LEN {
            break;
        }
        out.push(TOKEN_ALPHABET[(*b as usize) % TOKEN_ALPHABET.len()] as char);
    }
}

/// Build `<unix_millis>-<token><ext>` for an upload named `original_name`.
pub fn generate_stored_name(original_name: &str, unix_millis: i64) -> Result<String> {
    let token = random_token()?;
    Ok(format!("{}-{}{}", unix_millis, token, extension_of(original_name)))
}

/// Validate a name received from a client before it touches the backing store.
/// - non-empty, at most 255 bytes
/// - a single segment: no '/' or '\\', no NUL
/// - must not start with '.' (rules out ".", ".." and hidden files)
pub fn validate_stored_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("stored name cannot be empty");
    }
    if name.len() > MAX_NAME_LEN {
        bail!("stored name too long");
    }
    if name.chars().any(|c| c == '/' || c == '\\' || c == '\u{0000}') {
        bail!("stored name must be a single path segment");
    }
    if name.starts_with('.') {
        bail!("stored name cannot start with '.'");
    }
    Ok(())
}
