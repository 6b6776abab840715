//! Response pipeline: raw API payload -> human-readable status lines.
//!
//! Every step is pure. The order of checks is fixed: payload type, `homeworks`
//! presence, `homeworks` type, then per-entry name/status mapping.

use std::{fmt, str::FromStr};

use serde_json::Value;

use crate::{Error, Result};

/// Review status of a submitted homework. The set is closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "approved",
            HomeworkStatus::Reviewing => "reviewing",
            HomeworkStatus::Rejected => "rejected",
        }
    }

    /// Display text shown to the student.
    pub fn verdict(self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            HomeworkStatus::Reviewing => "Работа взята на проверку ревьюером.",
            HomeworkStatus::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl FromStr for HomeworkStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "approved" => Ok(HomeworkStatus::Approved),
            "reviewing" => Ok(HomeworkStatus::Reviewing),
            "rejected" => Ok(HomeworkStatus::Rejected),
            other => Err(Error::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validated homework entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HomeworkRecord {
    pub name: String,
    pub status: HomeworkStatus,
}

impl HomeworkRecord {
    pub fn from_json(entry: &Value) -> Result<Self> {
        let Some(obj) = entry.as_object() else {
            return Err(Error::MalformedResponse(format!(
                "homework entry is not an object: {entry}"
            )));
        };

        // The API names the field `homework_name`; older payloads use `name`
        // or `lesson_name`.
        let name = ["homework_name", "name", "lesson_name"]
            .iter()
            .find_map(|k| obj.get(*k).filter(|v| !v.is_null()))
            .ok_or(Error::IncompleteResponse("homework_name"))?;
        let name = name
            .as_str()
            .ok_or_else(|| Error::MalformedResponse(format!("homework name is not a string: {name}")))?;
        if name.trim().is_empty() {
            return Err(Error::IncompleteResponse("homework_name"));
        }

        let status = match obj.get("status") {
            None | Some(Value::Null) => return Err(Error::IncompleteResponse("status")),
            Some(Value::String(s)) => s.parse::<HomeworkStatus>()?,
            Some(other) => {
                return Err(Error::MalformedResponse(format!(
                    "homework status is not a string: {other}"
                )))
            }
        };

        Ok(Self {
            name: name.to_string(),
            status,
        })
    }

    pub fn message(&self) -> String {
        format!(
            "Изменился статус проверки работы \"{}\". {}",
            self.name,
            self.status.verdict()
        )
    }
}

/// Validate the payload shape and return the `homeworks` list.
///
/// An empty list is valid: nothing changed since the cursor.
pub fn check_response(response: &Value) -> Result<&[Value]> {
    let Some(obj) = response.as_object() else {
        return Err(Error::MalformedResponse(format!(
            "API response is not an object: {}",
            type_name(response)
        )));
    };

    match obj.get("homeworks") {
        None | Some(Value::Null) => Err(Error::IncompleteResponse("homeworks")),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(other) => Err(Error::MalformedResponse(format!(
            "'homeworks' is not a list: {}",
            type_name(other)
        ))),
    }
}

/// Map one homework entry to its notification text.
pub fn parse_status(homework: &Value) -> Result<String> {
    HomeworkRecord::from_json(homework).map(|r| r.message())
}

/// `current_date` reported by the API, if any. Used to advance the cursor.
pub fn current_date(response: &Value) -> Option<i64> {
    response.get("current_date").and_then(Value::as_i64)
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
