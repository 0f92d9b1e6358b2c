use ::url::Url;

/// Ensure a user-supplied string is a well-formed absolute URL.
///
/// Empty or whitespace-only input yields an empty string rather than an
/// error so callers can treat "nothing entered" as "nothing to do".
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    // Repair protocols mangled by path joining, e.g. https:/host or
    // https:///host, down to exactly two slashes.
    if let Some(repaired) = repair_scheme(trimmed) {
        return repaired;
    }

    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return trimmed.to_string();
    }

    format!("https://{}", trimmed)
}

fn repair_scheme(input: &str) -> Option<String> {
    let lower = input.to_ascii_lowercase();
    for scheme in ["https", "http"] {
        let prefix = format!("{}:", scheme);
        if !lower.starts_with(&prefix) {
            continue;
        }
        let rest = &input[prefix.len()..];
        let slashes = rest.chars().take_while(|&c| c == '/').count();
        if (1..=3).contains(&slashes) && slashes != 2 {
            let host = &rest[slashes..];
            if !host.is_empty() {
                // Keep the scheme exactly as the user typed it.
                return Some(format!("{}://{}", &input[..scheme.len()], host));
            }
        }
        return None;
    }
    None
}

/// A string is a valid target iff it normalizes to something that parses as
/// a URL with a non-empty host.
pub fn is_valid_url(input: &str) -> bool {
    let normalized = normalize_url(input);
    match Url::parse(&normalized) {
        Ok(parsed) => parsed.host_str().map_or(false, |host| !host.is_empty()),
        Err(_) => false,
    }
}

/// Resolve a deep-linked generation target from a catch-all route path.
///
/// The path arrives percent-encoded; query parameters the browser parsed off
/// the outer address are reattached to the decoded target. Existing keys are
/// never overwritten: outer parameters are appended after whatever query the
/// target already carries, duplicates included.
pub fn resolve_target_url(raw_path: &str, outer_params: &[(String, String)]) -> String {
    let decoded = match urlencoding::decode(raw_path) {
        Ok(decoded) => decoded.into_owned(),
        // Malformed escape sequences keep the raw path.
        Err(_) => raw_path.to_string(),
    };

    let normalized = normalize_url(&decoded);
    if outer_params.is_empty() {
        return normalized;
    }

    match Url::parse(&normalized) {
        Ok(mut url) => {
            {
                let mut pairs = url.query_pairs_mut();
                for (key, value) in outer_params {
                    pairs.append_pair(key, value);
                }
            }
            url.to_string()
        }
        // Unparseable target: drop the outer params rather than guessing.
        Err(_) => normalized,
    }
}
