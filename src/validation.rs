//! Player name normalization.
//!
//! Names are keys in the `name,value` tables, so they must survive a round trip
//! through a comma-separated row on a single line.

/// Normalize a player-supplied name.
///
/// Commas and control characters (including line breaks) become spaces and the
/// result is trimmed. Interior spacing is kept as typed, since names are exact keys.
/// A blank result yields `default_name`.
pub fn normalize_player_name(raw: &str, default_name: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| if c == ',' || c.is_control() { ' ' } else { c })
        .collect();
    let cleaned = replaced.trim();
    if cleaned.is_empty() {
        default_name.to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_use_default() {
        assert_eq!(normalize_player_name("", "Adventurer"), "Adventurer");
        assert_eq!(normalize_player_name("   \t", "Adventurer"), "Adventurer");
        assert_eq!(normalize_player_name(",,", "Adventurer"), "Adventurer");
    }

    #[test]
    fn commas_and_newlines_become_spaces() {
        assert_eq!(normalize_player_name("Ann,Marie\n", "x"), "Ann Marie");
        assert_eq!(normalize_player_name("Ann\tMarie", "x"), "Ann Marie");
        assert_eq!(normalize_player_name("  Bo  ", "x"), "Bo");
    }

    #[test]
    fn interior_spacing_is_kept() {
        assert_eq!(normalize_player_name("  Ann  Marie ", "x"), "Ann  Marie");
        assert_ne!(
            normalize_player_name("Ann  Marie", "x"),
            normalize_player_name("Ann Marie", "x")
        );
    }

    #[test]
    fn case_is_preserved() {
        assert_eq!(normalize_player_name("aNN", "x"), "aNN");
    }
}
