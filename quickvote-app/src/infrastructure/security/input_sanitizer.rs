use quickvote_errors::AppError;
use std::sync::OnceLock;

const MAX_QUESTION_LENGTH: usize = 500;
const MAX_POLL_ID_LENGTH: usize = 64;
const BLOCKED_PHRASES: &[&str] = &[
    "ignore previous",
    "ignore all",
    "disregard",
    "forget your",
    "new instructions",
    "system prompt",
    "you are now",
    "pretend to be",
    "jailbreak",
    "developer mode",
];

pub struct InputSanitizer;

fn blocked_phrase_regex() -> Option<&'static regex_lite::Regex> {
    static RE: OnceLock<Option<regex_lite::Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        let alternation = BLOCKED_PHRASES
            .iter()
            .map(|p| regex_lite::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        regex_lite::Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).ok()
    })
    .as_ref()
}

impl InputSanitizer {
    /// Trimmed question text, or the error the AI endpoints answer with.
    pub fn validate_question(question: &str) -> Result<String, AppError> {
        let question = question.trim();

        if question.is_empty() {
            return Err(AppError::validation("Invalid question input"));
        }

        if question.chars().count() > MAX_QUESTION_LENGTH {
            return Err(AppError::validation("Question is too long"));
        }

        Ok(question.to_string())
    }

    pub fn validate_poll_id(id: &str) -> Result<&str, AppError> {
        let valid = !id.is_empty()
            && id.len() <= MAX_POLL_ID_LENGTH
            && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if valid {
            Ok(id)
        } else {
            Err(AppError::NotFound)
        }
    }

    /// Replaces prompt-injection phrases before user text is embedded in a prompt.
    pub fn filter_injection(content: &str) -> String {
        match blocked_phrase_regex() {
            Some(re) => re.replace_all(content, "[FILTERED]").to_string(),
            None => content.to_string(),
        }
    }

    pub fn contains_injection_attempt(input: &str) -> bool {
        let lower = input.to_lowercase();
        BLOCKED_PHRASES.iter().any(|phrase| lower.contains(phrase))
    }
}
