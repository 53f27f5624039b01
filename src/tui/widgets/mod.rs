//! Reusable console widgets

mod spinner;
mod text_input;

pub use spinner::{Spinner, BRAILLE_SPINNER};
pub use text_input::TextInput;

/// Common widget utilities
pub mod utils {
    /// Truncate to `max_chars` characters with an ellipsis
    pub fn truncate(s: &str, max_chars: usize) -> String {
        if s.chars().count() <= max_chars {
            s.to_string()
        } else if max_chars <= 1 {
            s.chars().take(max_chars).collect()
        } else {
            let head: String = s.chars().take(max_chars - 1).collect();
            format!("{}…", head)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::utils::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello w…");
        assert_eq!(truncate("déjà vu", 4), "déj…");
    }
}
