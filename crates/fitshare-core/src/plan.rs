use serde::{Deserialize, Serialize};

use crate::progress::Progress;
use crate::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlan {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub plan_name: String,
    #[serde(default)]
    pub description: String,
    /// Free-text meal details.
    #[serde(default)]
    pub goal: String,
    /// Comma-delimited routine labels.
    #[serde(default)]
    pub routines: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_items: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_items: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Body of both create and full-replace update requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanInput {
    pub user_id: String,
    pub plan_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub routines: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_items: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_items: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl MealPlan {
    pub fn progress(&self) -> Progress {
        Progress::from_counts(self.completed_items, self.total_items)
    }

    pub fn routine_tags(&self) -> Vec<String> {
        routine_tags(&self.routines)
    }

    /// Materialize a record from an input, as a backend would on create.
    pub fn from_input(id: impl Into<String>, input: MealPlanInput) -> Self {
        Self {
            id: id.into(),
            user_id: input.user_id,
            plan_name: input.plan_name,
            description: input.description,
            goal: input.goal,
            routines: input.routines,
            completed_items: input.completed_items,
            total_items: input.total_items,
            last_updated: input.last_updated,
            category: input.category,
        }
    }
}

impl Entity for MealPlan {
    const COLLECTION: &'static str = "MealPlans";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

/// Split a comma-delimited routine string into trimmed, non-empty tags.
pub fn routine_tags(routines: &str) -> Vec<String> {
    routines
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub fn join_routines(tags: &[String]) -> String {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routine_tags_split_and_trim() {
        assert_eq!(
            routine_tags("Monday: Cardio, Wednesday: Upper Body ,Friday: Yoga"),
            vec!["Monday: Cardio", "Wednesday: Upper Body", "Friday: Yoga"]
        );
    }

    #[test]
    fn routine_tags_drop_empty_segments() {
        assert!(routine_tags("").is_empty());
        assert_eq!(routine_tags(" , Legs,, "), vec!["Legs"]);
    }

    #[test]
    fn join_routines_is_inverse_of_split() {
        let tags = routine_tags("Push, Pull, Legs");
        assert_eq!(join_routines(&tags), "Push, Pull, Legs");
    }

    #[test]
    fn deserializes_camel_case_wire_format() {
        let json = r#"{
            "id": "p1",
            "userId": "u1",
            "planName": "Cut",
            "description": "Lean out",
            "goal": "2000 kcal",
            "routines": "Run, Lift",
            "completedItems": 3,
            "totalItems": 4,
            "lastUpdated": "2024-05-01"
        }"#;
        let plan: MealPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.user_id, "u1");
        assert_eq!(plan.plan_name, "Cut");
        assert_eq!(plan.progress().percent(), 75);
        assert_eq!(plan.routine_tags(), vec!["Run", "Lift"]);
        assert_eq!(plan.last_updated.as_deref(), Some("2024-05-01"));
    }

    #[test]
    fn sparse_record_uses_defaults() {
        let plan: MealPlan = serde_json::from_str(r#"{"id":"p2"}"#).unwrap();
        assert!(plan.routines.is_empty());
        assert!(plan.progress().is_placeholder());
    }

    #[test]
    fn input_omits_absent_optionals() {
        let input = MealPlanInput {
            user_id: "u1".into(),
            plan_name: "Bulk".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["planName"], "Bulk");
        assert!(value.get("completedItems").is_none());
        assert!(value.get("id").is_none());
    }

    #[test]
    fn ownership_gate() {
        let plan = MealPlan::from_input(
            "p1",
            MealPlanInput {
                user_id: "u1".into(),
                ..Default::default()
            },
        );
        let owner = crate::User {
            uid: "u1".into(),
            username: "ana".into(),
            image: None,
        };
        let other = crate::User {
            uid: "u2".into(),
            ..owner.clone()
        };
        assert!(plan.is_owned_by(Some(&owner)));
        assert!(!plan.is_owned_by(Some(&other)));
        assert!(!plan.is_owned_by(None));
    }
}
