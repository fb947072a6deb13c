use uuid::Uuid;

pub const TITLE_MAX_CHARS: usize = 50;
pub const TITLE_ELLIPSIS: &str = "...";

/// Derive a chat title from its first user message: the first
/// `TITLE_MAX_CHARS` characters, with an ellipsis when cut.
pub fn truncate_title(text: &str) -> String {
    match text.char_indices().nth(TITLE_MAX_CHARS) {
        Some((boundary, _)) => format!("{}{}", &text[..boundary], TITLE_ELLIPSIS),
        None => text.to_string(),
    }
}

/// Random v4 ids stay unique however many entities are created per tick.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
