//! Pulling assistant text out of completion responses

use crate::types::CompletionResponse;

/// Text of the first choice, or an empty string when there is none.
///
/// Never fails: an empty `choices` array or a choice without a message both
/// yield `""`.
pub fn extract_text(response: &CompletionResponse) -> String {
    response
        .choices
        .first()
        .and_then(|choice| choice.message.as_ref())
        .map(|message| message.content.clone())
        .unwrap_or_default()
}
