//! Canonical map name resolution.
//!
//! A fixed, ordered alias table maps the many circulating variants of
//! well-known map titles onto one canonical short name; a match also means
//! historical stats lookups work for that map. Anything else falls back to
//! trimming and stripping a trailing version suffix, with stats flagged
//! unavailable.

use once_cell::sync::Lazy;
use regex::Regex;

// Patterns are string literals; compilation cannot fail at runtime.
#[allow(clippy::expect_used)]
fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("pattern literal compiles")
}

/// Ordered alias rules; first match wins.
static ALIAS_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)HLW", "HLW"),
        (r"(?i)pyro\s*td\s*league", "Pyro TD"),
        (r"(?i)vampirism\s*fire", "Vampirism Fire"),
        (r"(?i)footmen.*vs.*grunts", "Footmen Vs Grunts"),
        (r"(?i)Broken.*Alliances", "Broken Alliances"),
        (r"(?i)Reforged.*Footmen", "Reforged Footmen Frenzy"),
        (r"(?i)Direct.*Strike.*Reforged", "Direct Strike"),
        (r"(?i)WW3.*Diplomacy", "WW3 Diplomacy"),
        (r"(?i)Legion.*TD", "Legion TD"),
        (r"(?i)Tree.*Tag", "Tree Tag"),
        (r"(?i)Battleships.*Crossfire", "Battleships Crossfire"),
    ]
    .into_iter()
    .map(|(re, canonical)| (pattern(re), canonical))
    .collect()
});

/// Trailing version token such as `v1.3`, `1.30`, `10.2d` or `.4b`.
static VERSION_SUFFIX: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)\s*v?\.?(\d+\.)?(\*|\d+)\w*\s*$"));

/// Result of [`normalize`]: the canonical name and whether stats lookups
/// are known to work for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMapName {
    pub name: String,
    pub stats_available: bool,
}

/// Normalize a raw map title into its canonical display name.
///
/// Total and pure: malformed input degrades to the trimmed input with
/// `stats_available = false`, never an error.
pub fn normalize(raw: &str) -> NormalizedMapName {
    for (regex, canonical) in ALIAS_RULES.iter() {
        if regex.is_match(raw) {
            return NormalizedMapName {
                name: (*canonical).to_string(),
                stats_available: true,
            };
        }
    }
    NormalizedMapName {
        name: VERSION_SUFFIX.replace_all(raw.trim(), "").into_owned(),
        stats_available: false,
    }
}

/// Reduce a map path to its filename component.
pub fn map_file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    #[test]
    fn known_map_resolves_to_canonical_name_with_stats() {
        let result = normalize("Legion TD 10.2d");
        assert_eq!(result.name, "Legion TD");
        assert!(result.stats_available);
    }

    #[test]
    fn alias_rules_are_case_insensitive() {
        assert_eq!(normalize("hlw 8.3").name, "HLW");
        assert_eq!(normalize("PYRO TD LEAGUE").name, "Pyro TD");
        assert_eq!(normalize("vampirism  fire v4").name, "Vampirism Fire");
    }

    #[test]
    fn unknown_map_is_trimmed_and_stripped_of_version() {
        let result = normalize("My Custom Map v1.3");
        assert_eq!(result.name, "My Custom Map");
        assert!(!result.stats_available);
    }

    #[test]
    fn unknown_map_without_version_passes_through_trimmed() {
        let result = normalize("  Uncharted Waters  ");
        assert_eq!(result.name, "Uncharted Waters");
        assert!(!result.stats_available);
    }

    #[test]
    fn version_suffix_variants_are_stripped() {
        assert_eq!(normalize("Azeroth Wars 2.14b").name, "Azeroth Wars");
        assert_eq!(normalize("Island Troll Tribes v3.0").name, "Island Troll Tribes");
    }

    #[test]
    fn map_file_name_strips_directories() {
        assert_eq!(
            map_file_name("maps/frozenthrone/community/legiontd.w3x"),
            "legiontd.w3x"
        );
        assert_eq!(map_file_name("legiontd.w3x"), "legiontd.w3x");
    }
}
