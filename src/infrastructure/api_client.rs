use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::errors::ApiError;
use crate::domain::models::*;
use crate::utils::parsing::api_date;

/// The remote side of the timesheet: project catalog, day history, creation.
pub trait WorkTimeGateway: Send + Sync {
    fn fetch_simple_projects(&self) -> Result<Vec<Project>, ApiError>;

    fn fetch_day_entries(
        &self,
        date: NaiveDate,
        user_id: Option<i64>,
    ) -> Result<Vec<SubmittedEntry>, ApiError>;

    fn create_work_time(&self, work_time: &CreateWorkTime) -> Result<SubmitOutcome, ApiError>;
}

pub struct ApiClient {
    pub base_url: String,
    pub token: String,
    pub client: Client,
}

impl ApiClient {
    pub fn new(base_url: String, token: String) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(Duration::from_secs(15)).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        if self.token.is_empty() {
            request
        } else {
            request.bearer_auth(&self.token)
        }
    }

    fn send(&self, request: RequestBuilder, call_name: &str) -> Result<Response, ApiError> {
        let response = self.authorized(request).send()?;
        let status = response.status();
        debug!(call = call_name, status = status.as_u16(), "response");

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(ApiError::Unauthorized(status.as_u16()));
        }
        Ok(response)
    }

    fn get_list<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        call_name: &'static str,
        keys: &[&str],
    ) -> Result<Vec<T>, ApiError> {
        let response = self.send(request, call_name)?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: body.lines().next().unwrap_or("").to_string(),
            });
        }
        parse_list_from_body(&body, keys, call_name)
    }
}

impl WorkTimeGateway for ApiClient {
    fn fetch_simple_projects(&self) -> Result<Vec<Project>, ApiError> {
        let url = self.url("/api/projects/simple");
        debug!(%url, "fetching projects");
        let projects: Vec<Project> =
            self.get_list(self.client.get(url), "GET /api/projects/simple", &["projects", "data"])?;
        debug!(count = projects.len(), "projects fetched");
        Ok(projects)
    }

    fn fetch_day_entries(
        &self,
        date: NaiveDate,
        user_id: Option<i64>,
    ) -> Result<Vec<SubmittedEntry>, ApiError> {
        let url = self.url("/api/work_times");
        let mut request = self.client.get(url).query(&[("date", api_date(date))]);
        if let Some(user_id) = user_id {
            request = request.query(&[("user_id", user_id)]);
        }

        let mut entries: Vec<SubmittedEntry> =
            self.get_list(request, "GET /api/work_times", &["work_times", "data", "entries"])?;
        entries.sort_by_key(|entry| entry.starts_at);
        debug!(count = entries.len(), %date, "history fetched");
        Ok(entries)
    }

    fn create_work_time(&self, work_time: &CreateWorkTime) -> Result<SubmitOutcome, ApiError> {
        let url = self.url("/api/work_times");
        debug!(
            %url,
            project_id = work_time.project_id,
            user_id = ?work_time.user_id,
            starts_at = %work_time.starts_at,
            ends_at = %work_time.ends_at,
            "creating work time"
        );

        let request = self
            .client
            .post(url)
            .json(&CreateWorkTimeRequest { work_time });
        let response = self.send(request, "POST /api/work_times")?;
        let status = response.status().as_u16();
        let body = response.text()?;
        submit_outcome(status, &body)
    }
}

/// Maps the create response: 200 is the only success, 422 carries field
/// errors, anything else is a failure.
fn submit_outcome(status: u16, body: &str) -> Result<SubmitOutcome, ApiError> {
    match status {
        200 => {
            let entry = serde_json::from_str(body).map_err(|source| ApiError::Decode {
                what: "created work time",
                source,
            })?;
            Ok(SubmitOutcome::Created(entry))
        }
        422 => {
            warn!(%body, "work time rejected");
            Ok(SubmitOutcome::Rejected(parse_server_errors(body)))
        }
        other => {
            warn!(status = other, %body, "work time creation failed");
            Ok(SubmitOutcome::Failed(other))
        }
    }
}

/// Reads a 422 body. Accepts `{"errors": {...}}` or a bare field map; values
/// may be a list of messages or a single message.
pub fn parse_server_errors(body: &str) -> ServerErrors {
    let mut errors = ServerErrors::new();
    let value: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let map = match &value {
        Value::Object(map) => match map.get("errors") {
            Some(Value::Object(inner)) => Some(inner),
            _ => Some(map),
        },
        _ => None,
    };

    if let Some(map) = map {
        for (key, messages) in map {
            let messages: Vec<String> = match messages {
                Value::Array(items) => items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
                Value::String(message) => vec![message.clone()],
                _ => Vec::new(),
            };
            if !messages.is_empty() {
                errors.insert(key.clone(), messages);
            }
        }
    }

    if errors.is_empty() {
        errors.insert("base".to_string(), vec!["is invalid".to_string()]);
    }
    errors
}

fn parse_list_from_body<T: DeserializeOwned>(
    body: &str,
    keys: &[&str],
    what: &'static str,
) -> Result<Vec<T>, ApiError> {
    let value: Value =
        serde_json::from_str(body).map_err(|source| ApiError::Decode { what, source })?;

    let list = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => keys
            .iter()
            .find_map(|key| map.remove(*key).filter(Value::is_array))
            .unwrap_or(Value::Array(Vec::new())),
        _ => Value::Array(Vec::new()),
    };

    serde_json::from_value(list).map_err(|source| ApiError::Decode { what, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_from_wrapped_object() {
        let errors = parse_server_errors(
            r#"{"errors":{"starts_at":["overlaps with other entry"],"body":"too short"}}"#,
        );
        assert_eq!(errors["starts_at"], vec!["overlaps with other entry"]);
        assert_eq!(errors["body"], vec!["too short"]);
    }

    #[test]
    fn server_errors_from_bare_map() {
        let errors = parse_server_errors(r#"{"project_id":["can't be blank"]}"#);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["project_id"], vec!["can't be blank"]);
    }

    #[test]
    fn unreadable_rejection_falls_back_to_base() {
        let errors = parse_server_errors("<html>nope</html>");
        assert_eq!(errors["base"], vec!["is invalid"]);
    }

    #[test]
    fn list_body_may_be_bare_or_wrapped() {
        let bare: Vec<Project> =
            parse_list_from_body(r#"[{"id":1,"name":"Lunch","lunch":true}]"#, &["projects"], "p")
                .unwrap();
        assert_eq!(bare.len(), 1);
        assert!(bare[0].lunch);

        let wrapped: Vec<Project> = parse_list_from_body(
            r#"{"projects":[{"id":2,"name":"Internal","work_times_allows_task":true}]}"#,
            &["projects"],
            "p",
        )
        .unwrap();
        assert_eq!(wrapped[0].id, 2);
        assert!(wrapped[0].allows_task);
        assert!(!wrapped[0].count_duration);
    }

    #[test]
    fn submitted_entry_decodes_rails_timestamps() {
        let entry: SubmittedEntry = serde_json::from_str(
            r#"{"id":7,"user_id":3,"body":"review","project_id":4,
                "starts_at":"2024-03-07T09:00:00.000+01:00",
                "ends_at":"2024-03-07T10:30:00.000+01:00"}"#,
        )
        .unwrap();
        assert_eq!(entry.duration_minutes(), 90);
        assert_eq!(entry.project_name(), "Project 4");
    }

    #[test]
    fn only_200_counts_as_created() {
        let body = r#"{"id":7,"project_id":4,
            "starts_at":"2024-03-07T09:00:00+01:00","ends_at":"2024-03-07T10:00:00+01:00"}"#;
        assert!(matches!(
            submit_outcome(200, body),
            Ok(SubmitOutcome::Created(entry)) if entry.id == 7
        ));
        assert!(matches!(submit_outcome(201, body), Ok(SubmitOutcome::Failed(201))));
        assert!(matches!(submit_outcome(500, ""), Ok(SubmitOutcome::Failed(500))));
        assert!(matches!(
            submit_outcome(422, r#"{"body":["can't be blank"]}"#),
            Ok(SubmitOutcome::Rejected(errors)) if errors["body"] == vec!["can't be blank"]
        ));
    }

    #[test]
    fn create_request_wraps_work_time() {
        use chrono::TimeZone;
        let starts_at = chrono::Local.with_ymd_and_hms(2024, 3, 7, 9, 0, 0).unwrap();
        let work_time = CreateWorkTime {
            user_id: None,
            body: "standup".to_string(),
            task: String::new(),
            project_id: 5,
            starts_at,
            ends_at: starts_at + chrono::Duration::minutes(15),
        };
        let json = serde_json::to_value(CreateWorkTimeRequest {
            work_time: &work_time,
        })
        .unwrap();
        assert_eq!(json["work_time"]["project_id"], 5);
        assert_eq!(json["work_time"]["body"], "standup");
        assert!(json["work_time"].get("user_id").is_none());
        assert!(json["work_time"]["starts_at"].is_string());
    }
}
