use crate::domain::{DEFAULT_CATEGORY, MAX_OPTIONS};
use std::collections::HashSet;

const MAX_CATEGORY_CHARS: usize = 40;

/// Strips whitespace, one surrounding code fence and one pair of surrounding quotes.
pub fn clean_plain_reply(raw: &str) -> String {
    let text = strip_code_fence(raw.trim());
    strip_quotes(text.trim()).trim().to_string()
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.trim_end().strip_suffix("```") else {
        return text;
    };
    // Drop an optional language tag on the opening fence line.
    match body.split_once('\n') {
        Some((tag, inner)) if !tag.trim().contains(' ') => inner,
        _ => body,
    }
}

fn strip_quotes(text: &str) -> &str {
    const PAIRS: &[(char, char)] = &[('"', '"'), ('\'', '\''), ('“', '”'), ('‘', '’')];
    for (open, close) in PAIRS {
        if let Some(inner) = text
            .strip_prefix(*open)
            .and_then(|t| t.strip_suffix(*close))
        {
            return inner;
        }
    }
    text
}

/// Parses the options reply. Anything that is not a JSON array of strings becomes empty.
pub fn parse_options_reply(raw: &str, used_options: &[String]) -> Vec<String> {
    let text = strip_code_fence(raw.trim()).trim();
    let parsed: Vec<String> = match serde_json::from_str(text) {
        Ok(options) => options,
        Err(e) => {
            tracing::warn!("Model returned malformed options JSON ({}): {}", e, raw);
            return Vec::new();
        }
    };

    let mut seen: HashSet<String> = used_options.iter().map(|o| o.trim().to_lowercase()).collect();
    parsed
        .into_iter()
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .filter(|o| seen.insert(o.to_lowercase()))
        .take(MAX_OPTIONS)
        .collect()
}

pub fn parse_refined_reply(raw: &str, original: &str) -> String {
    let refined = clean_plain_reply(raw);
    if refined.is_empty() {
        original.to_string()
    } else {
        refined
    }
}

pub fn parse_category_reply(raw: &str) -> String {
    let cleaned = clean_plain_reply(raw);
    let first_line = cleaned.lines().next().unwrap_or_default();
    let label: String = strip_quotes(first_line.trim().trim_end_matches('.'))
        .chars()
        .take(MAX_CATEGORY_CHARS)
        .collect();
    let label = label.trim();
    if label.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_options_give_empty_list() {
        assert!(parse_options_reply("Sure! Here are some options: Apple, Pear", &[]).is_empty());
        assert!(parse_options_reply("[1, 2, 3]", &[]).is_empty());
        assert!(parse_options_reply("", &[]).is_empty());
    }

    #[test]
    fn test_options_in_code_fence_are_parsed() {
        let raw = "```json\n[\"Pizza\", \"Sushi\", \"Tacos\", \"Curry\"]\n```";
        assert_eq!(parse_options_reply(raw, &[]), vec!["Pizza", "Sushi", "Tacos", "Curry"]);
    }

    #[test]
    fn test_used_and_duplicate_options_dropped() {
        let raw = r#"["Pizza", "pizza", "Sushi", " ", "Tacos", "A", "B", "C", "D"]"#;
        let options = parse_options_reply(raw, &["SUSHI".to_string()]);
        assert_eq!(options, vec!["Pizza", "Tacos", "A", "B", "C", "D"]);
    }

    #[test]
    fn test_plain_reply_strips_quotes_and_fences() {
        assert_eq!(clean_plain_reply("  \"What is your favourite colour?\"  "), "What is your favourite colour?");
        assert_eq!(clean_plain_reply("“Best pet?”"), "Best pet?");
        assert_eq!(clean_plain_reply("```\nBest pet?\n```"), "Best pet?");
    }

    #[test]
    fn test_refine_falls_back_to_original() {
        assert_eq!(parse_refined_reply("  \"\" ", "orig?"), "orig?");
        assert_eq!(parse_refined_reply("Better?", "orig?"), "Better?");
    }

    #[test]
    fn test_category_fallback_and_first_line() {
        assert_eq!(parse_category_reply(""), "Uncategorized");
        assert_eq!(parse_category_reply("\"Food\"\nBecause it is about food."), "Food");
        assert_eq!(parse_category_reply("Technology."), "Technology");
    }
}
