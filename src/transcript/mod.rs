//! Vision transcript parsing
//!
//! The vision provider replies in a fixed free-text convention:
//!
//! ```text
//! I saw: <conversational recap of history>
//! I see:
//! - <checklist item text>
//! I say: <spoken feedback>
//! ```
//!
//! Only "I see:" and "I say:" are parsed back; "I saw:" exists to give the
//! model conversational memory and is ignored here. The sentinel strings are
//! part of the wire contract with the prompts in `vision::prompt` and must
//! stay in sync with them.

/// Marker preceding the currently-observed item list
pub const SEE_MARKER: &str = "I see:";

/// Marker preceding the spoken feedback text
pub const SAY_MARKER: &str = "I say:";

/// Structured sections extracted from one provider reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptSections {
    /// Items the provider currently observes (dash-prefixed lines, stripped)
    pub seen_items: Vec<String>,
    /// Feedback to speak aloud, if any
    pub spoken_text: Option<String>,
}

/// Parse a provider reply into its sections.
///
/// Returns `None` when the "I see:" marker is absent. That is a no-update
/// signal, not an empty observation: the caller must leave all checklist
/// state untouched. An "I see:" section with no dash lines parses to
/// `Some` with empty `seen_items` and means the provider looked and saw
/// none of the items.
pub fn parse(transcript: &str) -> Option<TranscriptSections> {
    let see_start = transcript.find(SEE_MARKER)? + SEE_MARKER.len();
    let rest = &transcript[see_start..];

    let (see_section, say_section) = match rest.find(SAY_MARKER) {
        Some(idx) => (&rest[..idx], Some(&rest[idx + SAY_MARKER.len()..])),
        None => (rest, None),
    };

    let seen_items = see_section
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('-'))
        .map(|line| line[1..].trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    let spoken_text = say_section
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Some(TranscriptSections {
        seen_items,
        spoken_text,
    })
}
