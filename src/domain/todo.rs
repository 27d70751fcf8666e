use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Todo identifier, derived from the creation time in epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TodoId(pub String);

impl TodoId {
    pub fn from_millis(millis: i64) -> Self { Self(millis.to_string()) }

    /// Next candidate when the timestamp-derived id is already taken.
    pub fn successor(&self) -> Option<Self> {
        self.0.parse::<i64>().ok().map(|m| Self::from_millis(m + 1))
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for TodoId {
    fn from(value: &str) -> Self { Self(value.to_string()) }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Normal,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self { Priority::High => "high", Priority::Normal => "normal" }
    }

    pub fn toggled(self) -> Self {
        match self { Priority::High => Priority::Normal, Priority::Normal => Priority::High }
    }
}

/// Reads an optional text field where a blank string means "no value".
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw.parse().map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

impl FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Priority::High),
            "normal" => Ok(Priority::Normal),
            other => Err(anyhow::anyhow!("unknown priority `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    pub assigned_to: String,
    pub assigned_to_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a create request. Required text fields default to empty so a
/// missing field surfaces as a validation error rather than a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub assigned_to: String,
    #[serde(default)]
    pub assigned_to_color: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_color: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl TodoPatch {
    pub fn completed(value: bool) -> Self { Self { completed: Some(value), ..Self::default() } }

    pub fn priority(value: Priority) -> Self { Self { priority: Some(value), ..Self::default() } }

    pub fn is_empty(&self) -> bool { *self == Self::default() }

    /// Coalesce-merge onto an existing record. Timestamps are left to the caller.
    pub fn apply_to(&self, todo: &mut Todo) {
        if let Some(t) = &self.title { todo.title = t.clone(); }
        if let Some(c) = self.completed { todo.completed = c; }
        if let Some(a) = &self.assigned_to { todo.assigned_to = a.clone(); }
        if let Some(c) = &self.assigned_to_color { todo.assigned_to_color = c.clone(); }
        if let Some(d) = self.due_date { todo.due_date = Some(d); }
        if let Some(p) = self.priority { todo.priority = p; }
        if let Some(c) = &self.category { todo.category = Some(c.clone()); }
    }
}
