use serde::{Deserialize, Deserializer};

use crate::{error::ApiError, tasks::repo_types::TaskStatus};

pub const MAX_TITLE_LEN: usize = 255;

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    /// Absent leaves the description alone, `null` clears it.
    #[serde(default, deserialize_with = "explicit_null")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<String>,
}

fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Validated input for Task Store `create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
}

impl TryFrom<CreateTaskRequest> for NewTask {
    type Error = ApiError;

    fn try_from(req: CreateTaskRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: clean_title(req.title.as_deref())?,
            description: clean_description(req.description),
        })
    }
}

/// Validated, non-empty partial update for Task Store `update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPatch {
    title: Option<String>,
    description: Option<Option<String>>,
    status: Option<TaskStatus>,
}

impl TaskPatch {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<Option<&str>> {
        self.description.as_ref().map(|d| d.as_deref())
    }

    pub fn status(&self) -> Option<TaskStatus> {
        self.status
    }
}

impl TryFrom<UpdateTaskRequest> for TaskPatch {
    type Error = ApiError;

    fn try_from(req: UpdateTaskRequest) -> Result<Self, Self::Error> {
        if req.title.is_none() && req.description.is_none() && req.status.is_none() {
            return Err(ApiError::validation("No fields to update"));
        }
        let title = match req.title {
            Some(title) => Some(clean_title(Some(&title))?),
            None => None,
        };
        let status = match req.status {
            Some(raw) => Some(raw.parse::<TaskStatus>().map_err(ApiError::Validation)?),
            None => None,
        };
        Ok(Self {
            title,
            description: req.description.map(clean_description),
            status,
        })
    }
}

fn clean_title(raw: Option<&str>) -> Result<String, ApiError> {
    let title = raw.map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return Err(ApiError::validation("Task title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::validation(format!(
            "Task title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

fn clean_description(raw: Option<String>) -> Option<String> {
    raw.map(|d| d.trim().to_string()).filter(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(json: serde_json::Value) -> Result<TaskPatch, ApiError> {
        let req: UpdateTaskRequest = serde_json::from_value(json).unwrap();
        TaskPatch::try_from(req)
    }

    #[test]
    fn create_trims_fields() {
        let task = NewTask::try_from(CreateTaskRequest {
            title: Some("  Buy milk ".into()),
            description: Some("   ".into()),
        })
        .unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, None);
    }

    #[test]
    fn create_requires_title() {
        for title in [None, Some(""), Some("   ")] {
            let err = NewTask::try_from(CreateTaskRequest {
                title: title.map(String::from),
                description: None,
            })
            .unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)));
        }
        let long = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(NewTask::try_from(CreateTaskRequest { title: Some(long), description: None }).is_err());
    }

    #[test]
    fn update_needs_a_recognized_field() {
        assert!(matches!(update(serde_json::json!({})), Err(ApiError::Validation(_))));
        assert!(matches!(
            update(serde_json::json!({"priority": 3, "owner": 9})),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn update_validates_status() {
        let patch = update(serde_json::json!({"status": "in_progress"})).unwrap();
        assert_eq!(patch.status(), Some(TaskStatus::InProgress));
        assert!(matches!(update(serde_json::json!({"status": "done"})), Err(ApiError::Validation(_))));
    }

    #[test]
    fn update_distinguishes_null_from_absent_description() {
        let cleared = update(serde_json::json!({"description": null})).unwrap();
        assert_eq!(cleared.description(), Some(None));

        let untouched = update(serde_json::json!({"title": "x"})).unwrap();
        assert_eq!(untouched.description(), None);

        let set = update(serde_json::json!({"description": " notes "})).unwrap();
        assert_eq!(set.description(), Some(Some("notes")));
    }

    #[test]
    fn update_rejects_blank_title() {
        assert!(matches!(update(serde_json::json!({"title": "  "})), Err(ApiError::Validation(_))));
    }
}
