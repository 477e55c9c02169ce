//! Declarative payload validation.
//!
//! Payload shapes are described as plain constraint tables (field path →
//! constraint list) interpreted against a [`serde_json::Value`], rather than
//! as hand-written per-type validators. The tables below mirror the game
//! client's payload contract: numeric ranges, string lengths, battle-tag
//! patterns and enum memberships.
//!
//! Validation is strictly read-only: [`Schema::validate`] borrows the value
//! under test and can never normalize or rewrite it, so content that passes
//! validation is byte-identical to what was submitted.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

/// Battle-tag style player name: 3–12 name characters (Latin or Cyrillic,
/// not starting with a digit) followed by `#` and 4–8 digits.
pub static BATTLE_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    pattern(
        "^(?:[A-Za-zÀ-ú][A-Za-zÀ-ú0-9]{2,11}|[а-яёА-ЯЁÀ-ú][а-яёА-ЯЁ0-9À-ú]{2,11})#[0-9]{4,8}$",
    )
});

/// Region codes a slot payload may carry; the empty string marks a slot
/// with no bound player identity (open, closed or AI).
pub const SLOT_REGION_CODES: &[&str] = &["us", "eu", "usw", "kr", ""];

const TEAM_TYPES: &[&str] = &["otherTeams", "specTeams", "playerTeams"];

const OBSERVER_SETTINGS: &[&str] = &[
    "No Observers",
    "Observers on Defeat",
    "Referees",
    "Full Observers",
];

const VISIBILITY_SETTINGS: &[&str] =
    &["Default", "Hide Terrain", "Map Explored", "Always Visible"];

// Patterns are string literals; compilation cannot fail at runtime.
#[allow(clippy::expect_used)]
fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("pattern literal compiles")
}

// ── Violations ──────────────────────────────────────────────────────

/// A single constraint violation reported by [`Schema::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path of the offending field, with concrete array indices.
    pub path: String,
    /// Human-readable constraint message.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Re-root a batch of violations under `prefix` (used when one value is
/// validated as part of a larger aggregate, e.g. `slots.7.handicap`).
pub fn prefix_violations(prefix: &str, violations: Vec<Violation>) -> Vec<Violation> {
    violations
        .into_iter()
        .map(|v| Violation {
            path: if v.path.is_empty() {
                prefix.to_string()
            } else {
                format!("{prefix}.{}", v.path)
            },
            message: v.message,
        })
        .collect()
}

// ── Constraints ─────────────────────────────────────────────────────

/// JSON value kinds a [`Constraint::Kind`] rule can demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Number,
    String,
    Object,
    Array,
}

impl ValueKind {
    fn name(self) -> &'static str {
        match self {
            ValueKind::Bool => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Object => "object",
            ValueKind::Array => "array",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            ValueKind::Bool => value.is_boolean(),
            ValueKind::Number => value.is_number(),
            ValueKind::String => value.is_string(),
            ValueKind::Object => value.is_object(),
            ValueKind::Array => value.is_array(),
        }
    }
}

/// One declarative constraint on a field.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// The field must be present (and non-null).
    Required,
    /// The field must be of the given JSON kind.
    Kind(ValueKind),
    /// Numeric value must fall within `min..=max`.
    Range { min: f64, max: f64 },
    /// String length (in characters) must fall within `min..=max`.
    Length { min: usize, max: usize },
    /// String must match the regex in full.
    Pattern(Regex),
    /// String must be one of the listed values.
    OneOf(&'static [&'static str]),
}

/// A field path paired with its constraint list.
///
/// Path segments are joined with `.`; a segment ending in `[]` expands over
/// the elements of an array at that position.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub path: String,
    pub constraints: Vec<Constraint>,
}

fn rule(path: impl Into<String>, constraints: Vec<Constraint>) -> FieldRule {
    FieldRule {
        path: path.into(),
        constraints,
    }
}

// ── Schema interpreter ──────────────────────────────────────────────

/// An ordered set of [`FieldRule`]s interpreted against a JSON value.
#[derive(Debug, Clone)]
pub struct Schema {
    rules: Vec<FieldRule>,
}

impl Schema {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    /// Check `value` against every rule and return all violations found.
    ///
    /// An empty result means the value is accepted. The value is never
    /// modified.
    pub fn validate(&self, value: &Value) -> Vec<Violation> {
        let mut violations = Vec::new();
        for field in &self.rules {
            let segments: Vec<&str> = field.path.split('.').collect();
            let mut resolved = Vec::new();
            resolve(value, &segments, String::new(), &mut resolved);
            for (path, target) in resolved {
                apply_constraints(&path, target, &field.constraints, &mut violations);
            }
        }
        violations
    }
}

/// Walk `value` along `segments`, expanding `[]` segments over array
/// elements, and collect every endpoint (present or missing).
fn resolve<'a>(
    value: &'a Value,
    segments: &[&str],
    base: String,
    out: &mut Vec<(String, Option<&'a Value>)>,
) {
    let Some((segment, rest)) = segments.split_first() else {
        out.push((base, Some(value)));
        return;
    };
    if let Some(key) = segment.strip_suffix("[]") {
        let path = join_path(&base, key);
        match value.get(key) {
            Some(Value::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    resolve(item, rest, format!("{path}.{index}"), out);
                }
            }
            Some(_) => out.push((path, None)),
            None => out.push((missing_path(&path, rest), None)),
        }
    } else {
        let path = join_path(&base, segment);
        match value.get(*segment) {
            Some(child) if !child.is_null() => resolve(child, rest, path, out),
            _ => out.push((missing_path(&path, rest), None)),
        }
    }
}

fn join_path(base: &str, segment: &str) -> String {
    if base.is_empty() {
        segment.to_string()
    } else {
        format!("{base}.{segment}")
    }
}

fn missing_path(base: &str, rest: &[&str]) -> String {
    rest.iter().fold(base.to_string(), |acc, s| format!("{acc}.{s}"))
}

fn apply_constraints(
    path: &str,
    target: Option<&Value>,
    constraints: &[Constraint],
    violations: &mut Vec<Violation>,
) {
    let Some(value) = target else {
        if constraints
            .iter()
            .any(|c| matches!(c, Constraint::Required))
        {
            violations.push(Violation {
                path: path.to_string(),
                message: "is required".to_string(),
            });
        }
        return;
    };
    for constraint in constraints {
        let message = match constraint {
            Constraint::Required => None,
            Constraint::Kind(kind) => (!kind.matches(value))
                .then(|| format!("must be a {}", kind.name())),
            Constraint::Range { min, max } => match value.as_f64() {
                Some(n) if n >= *min && n <= *max => None,
                Some(_) => Some(format!("must be between {min} and {max}")),
                None => Some("must be a number".to_string()),
            },
            Constraint::Length { min, max } => match value.as_str() {
                Some(s) => {
                    let len = s.chars().count();
                    (len < *min || len > *max)
                        .then(|| format!("length must be between {min} and {max}"))
                }
                None => Some("must be a string".to_string()),
            },
            Constraint::Pattern(regex) => match value.as_str() {
                Some(s) if regex.is_match(s) => None,
                Some(_) => Some("does not match the required pattern".to_string()),
                None => Some("must be a string".to_string()),
            },
            Constraint::OneOf(allowed) => match value.as_str() {
                Some(s) if allowed.contains(&s) => None,
                Some(s) => Some(format!("{s:?} is not one of {allowed:?}")),
                None => Some("must be a string".to_string()),
            },
        };
        if let Some(message) = message {
            violations.push(Violation {
                path: path.to_string(),
                message,
            });
            // Further constraints on the same field would only cascade.
            break;
        }
    }
}

/// Serialize a typed value and validate it against `schema`.
pub fn check<T: Serialize>(schema: &Schema, value: &T) -> Vec<Violation> {
    match serde_json::to_value(value) {
        Ok(json) => schema.validate(&json),
        Err(err) => vec![Violation {
            path: String::new(),
            message: err.to_string(),
        }],
    }
}

// ── Constraint tables ───────────────────────────────────────────────

use Constraint::{Kind, Length, OneOf, Pattern, Range, Required};

fn required_bool(path: &str) -> FieldRule {
    rule(path, vec![Required, Kind(ValueKind::Bool)])
}

/// Slot payload rules, optionally re-rooted under `prefix` (used both
/// standalone and expanded over `players[]`).
fn slot_rules(prefix: &str) -> Vec<FieldRule> {
    let p = |field: &str| {
        if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        }
    };
    vec![
        rule(p("slotStatus"), vec![Required, Range { min: 0.0, max: 2.0 }]),
        rule(p("slot"), vec![Required, Range { min: 0.0, max: 23.0 }]),
        rule(p("team"), vec![Required, Range { min: 0.0, max: 24.0 }]),
        rule(p("slotType"), vec![Required, Range { min: 0.0, max: 1.0 }]),
        required_bool(&p("isObserver")),
        required_bool(&p("isSelf")),
        required_bool(&p("slotTypeChangeEnabled")),
        rule(p("id"), vec![Required, Range { min: 0.0, max: 255.0 }]),
        rule(p("name"), vec![Length { min: 0, max: 32 }]),
        rule(p("playerRegion"), vec![OneOf(SLOT_REGION_CODES)]),
        rule(p("playerGateway"), vec![Required, Kind(ValueKind::Number)]),
        rule(p("color"), vec![Required, Range { min: 0.0, max: 23.0 }]),
        required_bool(&p("colorChangeEnabled")),
        required_bool(&p("teamChangeEnabled")),
        rule(p("race"), vec![Required, Range { min: 0.0, max: 32.0 }]),
        required_bool(&p("raceChangeEnabled")),
        rule(
            p("handicap"),
            vec![Required, Range { min: 50.0, max: 100.0 }],
        ),
        required_bool(&p("handicapChangeEnabled")),
    ]
}

fn lobby_static_rules() -> Vec<FieldRule> {
    vec![
        required_bool("isHost"),
        rule(
            "playerHost",
            vec![Required, Pattern(BATTLE_TAG_REGEX.clone())],
        ),
        rule("maxTeams", vec![Required, Range { min: 1.0, max: 24.0 }]),
        required_bool("isCustomForces"),
        required_bool("isCustomPlayers"),
        rule(
            "mapData.mapSize",
            vec![Required, Length { min: 4, max: 32 }],
        ),
        rule(
            "mapData.mapSpeed",
            vec![Required, Length { min: 4, max: 32 }],
        ),
        rule(
            "mapData.mapName",
            vec![Required, Length { min: 2, max: 48 }],
        ),
        rule(
            "mapData.mapPath",
            vec![Required, Length { min: 4, max: 127 }],
        ),
        rule(
            "mapData.mapAuthor",
            vec![Required, Length { min: 1, max: 32 }],
        ),
        rule(
            "mapData.description",
            vec![Required, Length { min: 1, max: 255 }],
        ),
        rule(
            "mapData.suggested_players",
            vec![Required, Length { min: 1, max: 32 }],
        ),
        rule("lobbyName", vec![Required, Length { min: 1, max: 32 }]),
        required_bool("mapFlags.flagLockTeams"),
        required_bool("mapFlags.flagPlaceTeamsTogether"),
        required_bool("mapFlags.flagFullSharedUnitControl"),
        required_bool("mapFlags.flagRandomRaces"),
        required_bool("mapFlags.flagRandomHero"),
        rule(
            "mapFlags.settingObservers",
            vec![Required, OneOf(OBSERVER_SETTINGS)],
        ),
        rule(
            "mapFlags.typeObservers",
            vec![Required, Kind(ValueKind::Number)],
        ),
        rule(
            "mapFlags.settingVisibility",
            vec![Required, OneOf(VISIBILITY_SETTINGS)],
        ),
        rule(
            "mapFlags.typeVisibility",
            vec![Required, Range { min: 0.0, max: 3.0 }],
        ),
    ]
}

fn stats_rules(prefix: &str) -> Vec<FieldRule> {
    ["played", "wins", "losses", "rating", "lastChange", "rank"]
        .into_iter()
        .map(|field| {
            let path = if prefix.is_empty() {
                field.to_string()
            } else {
                format!("{prefix}.{field}")
            };
            rule(path, vec![Kind(ValueKind::Number)])
        })
        .collect()
}

/// Incoming chat message: battle-tag sender, 1–255 character body.
pub static CHAT_MESSAGE_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(vec![
        rule(
            "name",
            vec![Required, Pattern(BATTLE_TAG_REGEX.clone())],
        ),
        rule("message", vec![Required, Length { min: 1, max: 255 }]),
        rule(
            "time",
            vec![Range {
                min: 0.0,
                max: f64::MAX,
            }],
        ),
    ])
});

/// Historical stats patch attached to a player record.
pub static PLAYER_STATS_SCHEMA: Lazy<Schema> = Lazy::new(|| Schema::new(stats_rules("")));

/// A single slot payload.
pub static SLOT_PAYLOAD_SCHEMA: Lazy<Schema> = Lazy::new(|| Schema::new(slot_rules("")));

/// Static lobby metadata (host, map data, flags).
pub static LOBBY_STATIC_SCHEMA: Lazy<Schema> =
    Lazy::new(|| Schema::new(lobby_static_rules()));

/// The full first-contact client payload: static metadata, team summary
/// and every player slot.
pub static LOBBY_PAYLOAD_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    let mut rules = lobby_static_rules();
    rules.extend([
        rule(
            "teamData.teams[].name",
            vec![Required, Length { min: 1, max: 32 }],
        ),
        rule(
            "teamData.teams[].team",
            vec![Required, Range { min: 0.0, max: 24.0 }],
        ),
        rule(
            "teamData.teams[].filledSlots",
            vec![Required, Range { min: 0.0, max: 24.0 }],
        ),
        rule(
            "teamData.teams[].totalSlots",
            vec![Required, Range { min: 1.0, max: 25.0 }],
        ),
        rule(
            "teamData.playableSlots",
            vec![Required, Range { min: 0.0, max: 24.0 }],
        ),
        rule(
            "teamData.filledPlayableSlots",
            vec![Required, Range { min: 1.0, max: 25.0 }],
        ),
        rule(
            "teamData.observerSlotsRemaining",
            vec![Required, Range { min: 0.0, max: 24.0 }],
        ),
    ]);
    rules.extend(slot_rules("players[]"));
    Schema::new(rules)
});

/// One `teamListLookup` entry of an exported snapshot.
pub static TEAM_INFO_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(vec![
        rule("type", vec![Required, OneOf(TEAM_TYPES)]),
        rule("name", vec![Required, Length { min: 0, max: 32 }]),
    ])
});

/// One `playerData` record of an exported snapshot.
pub static PLAYER_RECORD_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    let mut rules = vec![
        rule("joinedAt", vec![Required, Kind(ValueKind::Number)]),
        rule("cleared", vec![Kind(ValueKind::Bool)]),
    ];
    rules.extend(stats_rules("extra"));
    Schema::new(rules)
});

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
    use serde_json::json;

    #[test]
    fn missing_required_field_is_reported() {
        let schema = Schema::new(vec![rule(
            "name",
            vec![Required, Kind(ValueKind::String)],
        )]);
        let violations = schema.validate(&json!({}));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "name");
        assert_eq!(violations[0].message, "is required");
    }

    #[test]
    fn missing_optional_field_is_accepted() {
        let schema = Schema::new(vec![rule("rank", vec![Kind(ValueKind::Number)])]);
        assert!(schema.validate(&json!({})).is_empty());
    }

    #[test]
    fn range_violation_names_the_bounds() {
        let schema = Schema::new(vec![rule(
            "handicap",
            vec![Required, Range { min: 50.0, max: 100.0 }],
        )]);
        let violations = schema.validate(&json!({ "handicap": 30 }));
        assert_eq!(violations[0].message, "must be between 50 and 100");
    }

    #[test]
    fn nested_path_resolves_through_objects() {
        let schema = Schema::new(vec![rule(
            "mapData.mapName",
            vec![Required, Length { min: 2, max: 48 }],
        )]);
        let violations = schema.validate(&json!({ "mapData": { "mapName": "x" } }));
        assert_eq!(violations[0].path, "mapData.mapName");
    }

    #[test]
    fn array_segment_expands_with_concrete_indices() {
        let schema = Schema::new(vec![rule(
            "teams[].name",
            vec![Required, Length { min: 1, max: 32 }],
        )]);
        let violations = schema.validate(&json!({
            "teams": [{ "name": "Team 1" }, { "name": "" }]
        }));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "teams.1.name");
    }

    #[test]
    fn battle_tag_pattern_accepts_and_rejects() {
        assert!(BATTLE_TAG_REGEX.is_match("Trenchguns#1800"));
        assert!(BATTLE_TAG_REGEX.is_match("Игрок#12345"));
        assert!(!BATTLE_TAG_REGEX.is_match("no-discriminator"));
        assert!(!BATTLE_TAG_REGEX.is_match("ab#1234"));
        assert!(!BATTLE_TAG_REGEX.is_match("Trenchguns#123"));
    }

    #[test]
    fn enum_membership_is_enforced() {
        let schema = Schema::new(vec![rule(
            "type",
            vec![Required, OneOf(TEAM_TYPES)],
        )]);
        assert!(schema.validate(&json!({ "type": "specTeams" })).is_empty());
        let violations = schema.validate(&json!({ "type": "ghostTeams" }));
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn first_failing_constraint_short_circuits_the_field() {
        let schema = Schema::new(vec![rule(
            "name",
            vec![
                Required,
                Kind(ValueKind::String),
                Length { min: 1, max: 4 },
            ],
        )]);
        // Kind fails; Length must not add a second violation for the field.
        let violations = schema.validate(&json!({ "name": 7 }));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, "must be a string");
    }

    #[test]
    fn prefix_violations_reroots_paths() {
        let violations = prefix_violations(
            "slots.7",
            vec![Violation {
                path: "handicap".into(),
                message: "must be between 50 and 100".into(),
            }],
        );
        assert_eq!(violations[0].path, "slots.7.handicap");
    }

    #[test]
    fn validation_does_not_alter_the_value() {
        let original = json!({ "name": "Trenchguns#1800", "message": " padded  " });
        let copy = original.clone();
        let _ = CHAT_MESSAGE_SCHEMA.validate(&copy);
        assert_eq!(original, copy);
    }
}
