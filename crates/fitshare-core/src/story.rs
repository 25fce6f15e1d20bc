use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::Entity;

pub const DEFAULT_DURATION_MINUTES: u32 = 30;
pub const MAX_DURATION_MINUTES: u32 = 120;
pub const DURATION_STEP_MINUTES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intensity {
    #[serde(rename = "No Efforts")]
    No,
    #[serde(rename = "Mid Efforts")]
    Mid,
    #[serde(rename = "Moderate Efforts")]
    Moderate,
    #[serde(rename = "Severe Efforts")]
    Severe,
    #[serde(rename = "Maximal Efforts")]
    Maximal,
}

impl Intensity {
    pub const ALL: &[Intensity] = &[
        Intensity::No,
        Intensity::Mid,
        Intensity::Moderate,
        Intensity::Severe,
        Intensity::Maximal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::No => "No Efforts",
            Intensity::Mid => "Mid Efforts",
            Intensity::Moderate => "Moderate Efforts",
            Intensity::Severe => "Severe Efforts",
            Intensity::Maximal => "Maximal Efforts",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Intensity::No => "No",
            Intensity::Mid => "Mid",
            Intensity::Moderate => "Moderate",
            Intensity::Severe => "Severe",
            Intensity::Maximal => "Maximal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "No Efforts" => Some(Intensity::No),
            "Mid Efforts" => Some(Intensity::Mid),
            "Moderate Efforts" => Some(Intensity::Moderate),
            "Severe Efforts" => Some(Intensity::Severe),
            "Maximal Efforts" => Some(Intensity::Maximal),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Self::from_str(s).ok_or_else(|| CoreError::UnknownIntensity(s.to_string()))
    }

    /// Cycle forward for pickers; wraps around.
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|i| i == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let idx = Self::ALL.iter().position(|i| i == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Category {
    pub const ALL: &[Category] = &[
        Category::Beginner,
        Category::Intermediate,
        Category::Advanced,
        Category::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Beginner => "Beginner",
            Category::Intermediate => "Intermediate",
            Category::Advanced => "Advanced",
            Category::Expert => "Expert",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Beginner" => Some(Category::Beginner),
            "Intermediate" => Some(Category::Intermediate),
            "Advanced" => Some(Category::Advanced),
            "Expert" => Some(Category::Expert),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Self::from_str(s).ok_or_else(|| CoreError::UnknownCategory(s.to_string()))
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let idx = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutStory {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exercise_type: String,
    #[serde(default = "default_duration")]
    pub time_duration: u32,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub intensity: Option<Intensity>,
    #[serde(default, deserialize_with = "blank_category_as_default")]
    pub category: Category,
    #[serde(default, deserialize_with = "blank_string_as_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutStoryInput {
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exercise_type: String,
    #[serde(default = "default_duration")]
    pub time_duration: u32,
    #[serde(default)]
    pub intensity: Option<Intensity>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub image: Option<String>,
}

impl WorkoutStory {
    pub fn from_input(id: impl Into<String>, input: WorkoutStoryInput) -> Self {
        Self {
            id: id.into(),
            user_id: input.user_id,
            title: input.title,
            description: input.description,
            timestamp: input.timestamp,
            exercise_type: input.exercise_type,
            time_duration: input.time_duration,
            intensity: input.intensity,
            category: input.category,
            image: input.image,
        }
    }
}

impl Entity for WorkoutStory {
    const COLLECTION: &'static str = "WorkoutStories";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_MINUTES
}

// Stories written by older clients send "" for unset enum fields.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<Intensity>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Intensity::parse(s)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn blank_category_as_default<'de, D>(deserializer: D) -> Result<Category, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(Category::default()),
        Some(s) => Category::parse(s).map_err(serde::de::Error::custom),
    }
}

fn blank_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intensity_wire_strings() {
        for &i in Intensity::ALL {
            assert_eq!(Intensity::from_str(i.as_str()), Some(i));
            let json = serde_json::to_string(&i).unwrap();
            assert_eq!(json, format!("\"{}\"", i.as_str()));
        }
        assert!(Intensity::parse("Extreme").is_err());
    }

    #[test]
    fn enum_cycling_wraps() {
        assert_eq!(Intensity::Maximal.next(), Intensity::No);
        assert_eq!(Intensity::No.prev(), Intensity::Maximal);
        assert_eq!(Category::Expert.next(), Category::Beginner);
        assert_eq!(Category::Beginner.prev(), Category::Expert);
    }

    #[test]
    fn deserializes_full_story() {
        let json = r#"{
            "id": "s1",
            "userId": "u1",
            "title": "Leg day",
            "description": "Squats",
            "timestamp": "2024-05-01T10:00:00.000Z",
            "exerciseType": "Strength",
            "timeDuration": 45,
            "intensity": "Severe Efforts",
            "category": "Advanced",
            "image": "https://cdn/x.png"
        }"#;
        let story: WorkoutStory = serde_json::from_str(json).unwrap();
        assert_eq!(story.intensity, Some(Intensity::Severe));
        assert_eq!(story.category, Category::Advanced);
        assert_eq!(story.time_duration, 45);
        assert!(story.timestamp.is_some());
    }

    #[test]
    fn blank_enum_fields_deserialize_as_unset() {
        let json = r#"{"id":"s2","intensity":"","category":"","image":""}"#;
        let story: WorkoutStory = serde_json::from_str(json).unwrap();
        assert_eq!(story.intensity, None);
        assert_eq!(story.category, Category::Beginner);
        assert_eq!(story.image, None);
        assert_eq!(story.time_duration, DEFAULT_DURATION_MINUTES);
    }

    #[test]
    fn input_serializes_camel_case() {
        let input = WorkoutStoryInput {
            user_id: "u1".into(),
            title: "Run".into(),
            description: String::new(),
            timestamp: None,
            exercise_type: "Cardio".into(),
            time_duration: 20,
            intensity: Some(Intensity::Mid),
            category: Category::Beginner,
            image: None,
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["exerciseType"], "Cardio");
        assert_eq!(value["timeDuration"], 20);
        assert_eq!(value["intensity"], "Mid Efforts");
        assert_eq!(value["userId"], "u1");
    }
}
