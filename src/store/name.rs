//! Filename sanitization
//!
//! Course and file titles come from the LMS and may carry characters that
//! are illegal in paths on at least one platform, or arrive percent-encoded.
//!
//! Windows reserved device names (`CON`, `PRN`, `AUX`, `NUL`, `COM1`-`COM9`,
//! `LPT1`-`LPT9`) and ASCII control characters 0-31 are not handled.

/// Characters replaced by a space
const PROHIBITED: [char; 9] = ['/', '\\', '<', '>', ':', '"', '|', '?', '*'];

/// Turns a free-text label into something usable as a single path component.
///
/// Percent-escapes are decoded first (repeatedly, until none are left), so a
/// decoded `%2F` cannot smuggle a slash past the replacement step. If any `%`
/// is not followed by two hex digits, or the decoded bytes are not UTF-8, the
/// escapes are left untouched. Prohibited characters then become spaces, runs
/// of spaces collapse to one, and the ends are trimmed.
///
/// ```
/// use lominus::store::sanitize_name;
///
/// assert_eq!(sanitize_name("CS1010: Intro/Notes?.pdf"), "CS1010 Intro Notes .pdf");
/// assert_eq!(sanitize_name("50%25off"), "50%off");
/// ```
pub fn sanitize_name(name: &str) -> String {
    let mut decoded = name.to_string();
    while let Some(next) = percent_decode(&decoded) {
        if next == decoded {
            break;
        }
        decoded = next;
    }

    let mut cleaned = String::with_capacity(decoded.len());
    let mut previous_space = false;
    for c in decoded.chars() {
        let c = if PROHIBITED.contains(&c) { ' ' } else { c };
        if c == ' ' && previous_space {
            continue;
        }
        previous_space = c == ' ';
        cleaned.push(c);
    }

    cleaned.trim().to_string()
}

/// Decodes every `%XX` escape, or returns `None` if there is nothing to
/// decode or the string is not a well-formed escape sequence
fn percent_decode(name: &str) -> Option<String> {
    if !name.contains('%') || !escapes_are_well_formed(name) {
        return None;
    }

    urlencoding::decode(name).ok().map(|decoded| decoded.into_owned())
}

fn escapes_are_well_formed(name: &str) -> bool {
    let bytes = name.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}
