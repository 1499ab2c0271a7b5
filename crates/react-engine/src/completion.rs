//! Completion-keyword classifier (§4.9 step 3): when the LLM replies with
//! no tool call, its prose is checked against this fixed phrase list before
//! the engine decides whether the task is done or the model just forgot to
//! call a tool.

const COMPLETION_KEYWORDS: &[&str] = &[
    "task complete",
    "completed successfully",
    "finished",
    "done",
    "i cannot",
    "unable to",
    "impossible",
];

/// Returns the matched phrase (lowercase) if `text` contains one of the
/// completion keywords, case-insensitively.
pub fn classify_completion(text: &str) -> Option<&'static str> {
    let lowered = text.to_ascii_lowercase();
    COMPLETION_KEYWORDS.iter().find(|phrase| lowered.contains(*phrase)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_case_insensitively() {
        assert_eq!(classify_completion("Task Complete! The form was submitted."), Some("task complete"));
        assert_eq!(classify_completion("I'm DONE with this."), Some("done"));
    }

    #[test]
    fn no_match_for_plain_prose() {
        assert_eq!(classify_completion("Let me look at the page more closely."), None);
    }

    #[test]
    fn matches_refusal_phrases() {
        assert_eq!(classify_completion("I cannot access that file."), Some("i cannot"));
        assert_eq!(classify_completion("That would be impossible given the constraints."), Some("impossible"));
    }
}
