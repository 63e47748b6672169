//! Plain-text cleanup for untrusted query and form values.

/// Strips markup, drops control characters, collapses whitespace runs and trims.
///
/// A `<` only opens a tag when followed by a letter, `/`, `!` or `?`; an unterminated tag swallows
/// the rest of the input.
pub(crate) fn sanitize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut pending_space = false;

    while let Some(ch) = chars.next() {
        if ch == '<'
            && chars
                .peek()
                .is_some_and(|next| next.is_alphabetic() || matches!(next, '/' | '!' | '?'))
        {
            for inner in chars.by_ref() {
                if inner == '>' {
                    break;
                }
            }
            pending_space = true;
            continue;
        }

        if ch.is_whitespace() || ch.is_control() {
            pending_space = true;
            continue;
        }

        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(ch);
    }

    out
}

/// Sanitized value, or `None` when nothing is left.
pub(crate) fn sanitize_opt(raw: Option<&str>) -> Option<String> {
    raw.map(sanitize_text).filter(|s| !s.is_empty())
}

const MAX_SLUG_CHARS: usize = 60;

/// ASCII file-name stem derived from a display name (`"José Pérez"` -> `"jose-perez"`).
pub(crate) fn file_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars().flat_map(char::to_lowercase) {
        let mapped = match ch {
            'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            c if c.is_ascii_alphanumeric() => c,
            _ => '-',
        };
        if mapped == '-' && (slug.is_empty() || slug.ends_with('-')) {
            continue;
        }
        slug.push(mapped);
        if slug.len() >= MAX_SLUG_CHARS {
            break;
        }
    }

    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "asistente".to_string()
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_collapses_whitespace() {
        assert_eq!(
            sanitize_text("  <b>Ana</b>\n\t Ruiz<script>alert(1)</script> "),
            "Ana Ruiz alert(1)"
        );
        assert_eq!(sanitize_text("a < b"), "a < b");
        assert_eq!(sanitize_text("Acme\u{0007}Corp"), "Acme Corp");
        assert_eq!(sanitize_text("open <div unterminated"), "open");
    }

    #[test]
    fn blank_values_become_none() {
        assert_eq!(sanitize_opt(Some("  <br/> ")), None);
        assert_eq!(sanitize_opt(None), None);
        assert_eq!(sanitize_opt(Some(" CTO ")).as_deref(), Some("CTO"));
    }

    #[test]
    fn slug_is_ascii_and_bounded() {
        assert_eq!(file_slug("José Pérez Núñez"), "jose-perez-nunez");
        assert_eq!(file_slug("  ../etc/passwd "), "etc-passwd");
        assert_eq!(file_slug("!!!"), "asistente");
        assert!(file_slug(&"x".repeat(200)).len() <= MAX_SLUG_CHARS);
    }
}
