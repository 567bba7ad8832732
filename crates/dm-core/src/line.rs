use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    #[default]
    Dialogue,
    Mutation,
}

/// Whether a caller blocks until an inline mutation completes before it
/// receives the next line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MutationBehaviour {
    #[default]
    Wait,
    DoNotWait,
    Skip,
}

/// Opaque mutation payload; the bridge routes it to the engine unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct MutationDescriptor(pub serde_json::Value);

/// Immutable snapshot of one narrative step, deserialized from a single
/// engine response. Read-only after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DialogueLine {
    pub id: String,
    pub kind: LineKind,
    pub next_id: String,
    pub character: String,
    pub text: String,
    pub translation_key: String,
    pub responses: Vec<DialogueResponse>,
    pub concurrent_lines: Vec<DialogueLine>,
    pub inline_mutations: Vec<MutationDescriptor>,
    pub tags: Vec<String>,
    pub pauses: BTreeMap<usize, f64>,
    pub speeds: BTreeMap<usize, f64>,
    pub display_time: Option<String>,
}

impl DialogueLine {
    pub fn has_tag(&self, name: &str) -> bool {
        tag_value(&self.tags, name).is_some()
    }

    pub fn get_tag_value(&self, name: &str) -> Option<&str> {
        tag_value(&self.tags, name)
    }
}

impl fmt::Display for DialogueLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LineKind::Mutation => write!(f, "(mutation -> {})", self.next_id),
            LineKind::Dialogue if self.character.is_empty() => write!(f, "{}", self.text),
            LineKind::Dialogue => write!(f, "{}: {}", self.character, self.text),
        }
    }
}

/// One available choice; always a child of exactly one [`DialogueLine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueResponse {
    pub next_id: String,
    pub is_allowed: bool,
    pub text: String,
    pub translation_key: String,
    pub condition_as_text: Option<String>,
    pub tags: Vec<String>,
}

impl Default for DialogueResponse {
    fn default() -> Self {
        Self {
            next_id: String::new(),
            is_allowed: true,
            text: String::new(),
            translation_key: String::new(),
            condition_as_text: None,
            tags: Vec::new(),
        }
    }
}

impl DialogueResponse {
    pub fn has_tag(&self, name: &str) -> bool {
        tag_value(&self.tags, name).is_some()
    }

    pub fn get_tag_value(&self, name: &str) -> Option<&str> {
        tag_value(&self.tags, name)
    }
}

// Tags are flat "name=value" strings; the first match wins and duplicates
// are not an error.
fn tag_value<'a>(tags: &'a [String], name: &str) -> Option<&'a str> {
    let prefix = format!("{name}=");
    tags.iter()
        .find_map(|tag| tag.strip_prefix(prefix.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn line_with_tags(tags: &[&str]) -> DialogueLine {
        DialogueLine {
            tags: tags.iter().map(|tag| (*tag).to_string()).collect(),
            ..DialogueLine::default()
        }
    }

    #[test]
    fn first_matching_tag_wins() {
        let line = line_with_tags(&["speed=0.5", "speed=2.0"]);
        assert_eq!(line.get_tag_value("speed"), Some("0.5"));
    }

    #[test]
    fn bare_tag_without_equals_does_not_count() {
        let line = line_with_tags(&["voice"]);
        assert!(!line.has_tag("voice"));

        let line = line_with_tags(&["voice=alto"]);
        assert!(line.has_tag("voice"));
        assert!(!line.has_tag("voi"));
    }

    #[test]
    fn empty_tag_value_still_matches() {
        let line = line_with_tags(&["mood="]);
        assert!(line.has_tag("mood"));
        assert_eq!(line.get_tag_value("mood"), Some(""));
    }

    #[test]
    fn deserializes_engine_response_with_defaults() {
        let line: DialogueLine = serde_json::from_value(json!({
            "id": "5",
            "next_id": "6",
            "character": "Coco",
            "text": "Are you sure?",
            "responses": [
                { "text": "Yes", "next_id": "7" },
                { "text": "No", "next_id": "8", "is_allowed": false }
            ],
            "tags": ["speed=0.5"],
            "pauses": { "4": 0.25 }
        }))
        .expect("line should deserialize");

        assert_eq!(line.kind, LineKind::Dialogue);
        assert_eq!(line.responses.len(), 2);
        assert!(line.responses[0].is_allowed);
        assert!(!line.responses[1].is_allowed);
        assert_eq!(line.pauses.get(&4), Some(&0.25));
        assert!(line.concurrent_lines.is_empty());
        assert_eq!(line.display_time, None);
    }

    #[test]
    fn mutation_kind_deserializes() {
        let line: DialogueLine = serde_json::from_value(json!({
            "id": "2",
            "kind": "mutation",
            "next_id": "3",
            "inline_mutations": [["set", "health", 4]]
        }))
        .expect("line should deserialize");

        assert_eq!(line.kind, LineKind::Mutation);
        assert_eq!(line.inline_mutations.len(), 1);
    }

    #[test]
    fn display_reads_like_a_script_line() {
        let mut line = DialogueLine {
            character: "Coco".to_string(),
            text: "Hello.".to_string(),
            ..DialogueLine::default()
        };
        assert_eq!(line.to_string(), "Coco: Hello.");

        line.character.clear();
        assert_eq!(line.to_string(), "Hello.");
    }
}
