//! Identifier and name normalization shared by the builder, the overlay and the handlers.

/// Lowercase, keep `[a-z0-9_-]`, collapse `-` runs, trim `-` at both ends.
pub fn sanitize_slug(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars().flat_map(char::to_lowercase) {
        match ch {
            'a'..='z' | '0'..='9' | '_' => out.push(ch),
            '-' if !out.ends_with('-') => out.push('-'),
            _ => {}
        }
    }
    out.trim_matches('-').to_string()
}

/// `American Football` -> `american-football`
pub fn normalize_category(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

/// Lowercase, collapse every non-alphanumeric run into one space, trim.
pub fn normalize_name(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            out.push(ch);
        } else if !out.is_empty() && !out.ends_with(' ') {
            out.push(' ');
        }
    }
    out.trim_end().to_string()
}

/// Name form used when joining teams across sources: [`normalize_name`] with `&` spelled
/// out and `saint` shortened, so `St. Louis` and `Saint Louis` agree.
pub fn join_name(value: &str) -> String {
    normalize_name(&value.replace('&', " and "))
        .split(' ')
        .map(|token| if token == "saint" { "st" } else { token })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split `Away vs Home` / `Away @ Home` titles. Separator match is case-insensitive.
pub fn split_matchup(title: &str) -> Option<(String, String)> {
    let lower = title.to_lowercase();
    for sep in [" vs. ", " vs ", " v ", " @ "] {
        if let Some(pos) = lower.find(sep) {
            // Lowercasing may change byte offsets for non-ASCII titles.
            if lower.len() != title.len() {
                break;
            }
            let away = title[..pos].trim();
            let home = title[pos + sep.len()..].trim();
            if !away.is_empty() && !home.is_empty() {
                return Some((away.to_string(), home.to_string()));
            }
        }
    }
    None
}
