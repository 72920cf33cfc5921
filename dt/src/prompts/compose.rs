//! Request composition

/// Speaker label placed before the user text
pub const USER_LABEL: &str = "사용자: ";

/// Trailing marker the model continues from
pub const RESPONSE_LABEL: &str = "응답:";

/// Merge the system prompt with the latest user text into one request
///
/// The system prompt is kept verbatim so the model sees the same persona
/// instructions every turn.
pub fn compose(system_prompt: &str, user_text: &str) -> String {
    format!("{system_prompt}\n\n{USER_LABEL}{user_text}\n\n{RESPONSE_LABEL}")
}
