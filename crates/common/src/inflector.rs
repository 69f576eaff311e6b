//! String inflection helpers
//!
//! Resource types arrive as plural, dash or snake separated identifiers
//! (`blog-posts`, `comments`). Component names, tag names and translation
//! replacements are derived from them with the helpers below.

const IRREGULAR: &[(&str, &str)] = &[
    ("people", "person"),
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("data", "datum"),
    ("criteria", "criterion"),
];

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "media",
    "metadata",
    "news",
    "series",
    "species",
    "feedback",
    "software",
];

/// Singularize the trailing word of an English plural
///
/// # Examples
/// ```
/// use jsonapi_openapi_common::inflector::singular;
///
/// assert_eq!(singular("articles"), "article");
/// assert_eq!(singular("blog-posts"), "blog-post");
/// assert_eq!(singular("categories"), "category");
/// ```
pub fn singular(word: &str) -> String {
    let split_at = word
        .rfind(|c: char| c == '-' || c == '_' || c == ' ')
        .map(|i| i + 1)
        .unwrap_or(0);
    let (head, tail) = word.split_at(split_at);
    let lower = tail.to_lowercase();

    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }

    for (plural, single) in IRREGULAR {
        if lower == *plural {
            return format!("{}{}", head, match_case(tail, single));
        }
    }

    let stem = if let Some(stem) = strip_suffix_ci(tail, "ies") {
        if stem.is_empty() {
            tail.to_string()
        } else {
            format!("{}y", stem)
        }
    } else if let Some(stem) = strip_suffix_ci(tail, "ves") {
        format!("{}f", stem)
    } else if ["sses", "shes", "ches", "xes", "zzes", "oes"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        tail[..tail.len() - 2].to_string()
    } else if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
        tail.to_string()
    } else if let Some(stem) = strip_suffix_ci(tail, "s") {
        stem.to_string()
    } else {
        tail.to_string()
    };

    format!("{}{}", head, stem)
}

/// Convert to camelCase (`blog-posts` → `blogPosts`)
pub fn camel(value: &str) -> String {
    let studly = studly(value);
    let mut chars = studly.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert to StudlyCase (`blog-posts` → `BlogPosts`)
pub fn studly(value: &str) -> String {
    value
        .split(|c: char| c == '-' || c == '_' || c == ' ')
        .filter(|part| !part.is_empty())
        .map(ucfirst)
        .collect()
}

/// Upper-case the first character
pub fn ucfirst(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert to snake_case (`currentPage` → `current_page`)
pub fn snake(value: &str) -> String {
    delimit(value, '_')
}

/// Convert to dash-case (`currentPage` → `current-page`)
pub fn dasherize(value: &str) -> String {
    delimit(value, '-')
}

fn delimit(s: &str, delimiter: char) -> String {
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            let boundary = i > 0
                && (chars[i - 1].is_lowercase()
                    || chars[i - 1].is_ascii_digit()
                    || (i + 1 < chars.len() && chars[i + 1].is_lowercase()));

            if boundary && !result.ends_with(delimiter) {
                result.push(delimiter);
            }
            result.extend(ch.to_lowercase());
        } else if ch == '-' || ch == '_' || ch == ' ' {
            if !result.is_empty() && !result.ends_with(delimiter) {
                result.push(delimiter);
            }
        } else {
            result.push(ch);
        }
    }

    result
}

fn strip_suffix_ci<'a>(value: &'a str, suffix: &str) -> Option<&'a str> {
    if value.len() >= suffix.len()
        && value.is_char_boundary(value.len() - suffix.len())
        && value[value.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
    {
        Some(&value[..value.len() - suffix.len()])
    } else {
        None
    }
}

fn match_case(original: &str, replacement: &str) -> String {
    if original.chars().next().is_some_and(char::is_uppercase) {
        ucfirst(replacement)
    } else {
        replacement.to_string()
    }
}
