//! Shared domain models.

use serde::{Deserialize, Deserializer, Serialize};

/// One catalogue entry as published in the games document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier within the catalogue.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Long-form description shown in cards and the preview panel.
    pub description: String,
    /// Optional one-line tagline used by the scroll list.
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Optional decorative glyph shown before the name.
    #[serde(default)]
    pub emoji: Option<String>,
    /// Optional author credit.
    #[serde(default)]
    pub author: Option<String>,
    /// Preview asset reference, relative to the presentation layer's asset root.
    pub preview: String,
    /// Launch target. Items without one are browsable but not launchable.
    #[serde(default)]
    pub url: Option<String>,
    /// Category tags, de-duplicated in first-seen order.
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
}

impl Item {
    /// Returns `true` when the item carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }

    /// Line shown under the name in the scroll list.
    pub fn subtitle_or_description(&self) -> &str {
        match self.subtitle.as_deref() {
            Some(subtitle) if !subtitle.is_empty() => subtitle,
            _ => &self.description,
        }
    }

    /// Name prefixed with the emoji, when there is one.
    pub fn display_name(&self) -> String {
        match self.emoji.as_deref() {
            Some(emoji) if !emoji.is_empty() => format!("{emoji} {}", self.name),
            _ => self.name.clone(),
        }
    }
}

/// Wire shape of the catalogue document: `{ "games": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogueDocument {
    /// Items in publication order.
    pub games: Vec<Item>,
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<String>> = Option::deserialize(deserializer)?;
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.unwrap_or_default() {
        let tag = tag.trim().to_string();
        if tag.is_empty() || tags.contains(&tag) {
            continue;
        }
        tags.push(tag);
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_default_and_tags_dedupe() {
        let item: Item = serde_json::from_str(
            r#"{
                "id": "snake",
                "name": "Snake",
                "description": "Eat apples",
                "preview": "snake.png",
                "tags": ["arcade", "classic", "arcade", " "]
            }"#,
        )
        .expect("item parses");

        assert_eq!(item.tags, vec!["arcade".to_string(), "classic".to_string()]);
        assert!(item.has_tag("classic"));
        assert!(!item.has_tag("puzzle"));
        assert_eq!(item.url, None);
        assert_eq!(item.subtitle_or_description(), "Eat apples");
        assert_eq!(item.display_name(), "Snake");
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let result = serde_json::from_str::<Item>(
            r#"{ "id": "x", "name": "X", "preview": "x.png" }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn subtitle_wins_over_description() {
        let item = Item {
            id: "tetra".into(),
            name: "Tetra".into(),
            description: "Falling blocks".into(),
            subtitle: Some("Stack them".into()),
            emoji: Some("🧱".into()),
            author: None,
            preview: "tetra.png".into(),
            url: None,
            tags: Vec::new(),
        };
        assert_eq!(item.subtitle_or_description(), "Stack them");
        assert_eq!(item.display_name(), "🧱 Tetra");
    }
}
