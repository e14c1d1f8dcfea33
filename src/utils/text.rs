use unicode_normalization::UnicodeNormalization;

/// URL slug from free text: accents folded, ASCII alphanumerics kept,
/// everything else collapsed into single dashes.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.nfkd() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_ascii() || c.is_whitespace() {
            pending_dash = true;
        }
        // Non-ASCII combining marks left over from NFKD are dropped
    }

    slug
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Reading time at 200 words per minute, never below one minute.
pub fn reading_minutes(text: &str) -> i32 {
    let words = word_count(text);
    (words.div_ceil(200).max(1)) as i32
}

/// Cut `text` to at most `max` characters, ending with an ellipsis when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max - 1).collect();
    out = out.trim_end().to_string();
    out.push('…');
    out
}

/// Loose email sanity check: one `@`, non-empty local part, dotted domain.
pub fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    if email.len() > 254 || email.contains(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_http_url(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(u) => (u.scheme() == "http" || u.scheme() == "https") && u.host().is_some(),
        Err(_) => false,
    }
}

/// Decode a JSON array column into strings; bad data reads as empty.
pub fn json_list(value: &str) -> Vec<String> {
    serde_json::from_str(value).unwrap_or_default()
}

pub fn to_json_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// "sk-live-abcdef1234" -> "sk-l...1234"
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
