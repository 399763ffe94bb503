//! The tool catalog.
//!
//! Each entry pairs a name and contract with a planner that turns validated arguments into a
//! [`RemoteCall`]. Planning is pure so request shaping can be tested without a network.

use crate::contract::{Field, FieldKind, input_schema};
use crate::error::{ToolError, ValidationError, Violation};
use jules_api::client::encode_path_segment;
use jules_api::source::normalize_source;
use jules_api::RemoteCall;
use rmcp::model::{Tool, ToolAnnotations};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// Upper bound for `pageSize` on top-level listings (`sources`, `sessions`).
pub const MAX_PAGE_SIZE: i64 = 1000;
/// Upper bound for `pageSize` on a session's activities.
pub const MAX_ACTIVITIES_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    ListSources,
    ListSessions,
    CreateSession,
    ApproveSessionPlan,
    ListActivities,
    SendSessionMessage,
}

#[derive(Debug, Clone, Copy)]
pub struct ToolDef {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub verb: Verb,
    pub fields: &'static [Field],
    pub kind: ToolKind,
}

/// A request ready to send, plus what to report if the API answers with an empty body.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedCall {
    pub call: RemoteCall,
    pub empty_response: Option<Value>,
}

const PAGE_TOKEN: Field = Field::optional(
    "pageToken",
    FieldKind::Text { allow_empty: false },
    "Token from a previous response's nextPageToken",
);

const SESSION_ID: Field = Field::required(
    "sessionId",
    FieldKind::Segment,
    "Session identifier (the part after `sessions/`)",
);

const LIST_FIELDS: &[Field] = &[
    Field::optional(
        "pageSize",
        FieldKind::Integer {
            min: 1,
            max: MAX_PAGE_SIZE,
        },
        "Maximum number of results to return",
    ),
    PAGE_TOKEN,
];

const REPO_CONTEXT_FIELDS: &[Field] = &[
    Field::optional(
        "startingBranch",
        FieldKind::Text { allow_empty: true },
        "Branch the session starts from",
    ),
    Field::optional(
        "featureBranch",
        FieldKind::Text { allow_empty: true },
        "Branch the session's changes are pushed to",
    ),
];

const CREATE_SESSION_FIELDS: &[Field] = &[
    Field::required(
        "prompt",
        FieldKind::Text { allow_empty: false },
        "Task description for the session",
    ),
    Field::required(
        "source",
        FieldKind::Text { allow_empty: false },
        "Repository: `sources/github/owner/repo`, `github/owner/repo`, `owner/repo` or a GitHub URL",
    ),
    Field::optional(
        "title",
        FieldKind::Text { allow_empty: false },
        "Optional session title",
    ),
    Field::optional(
        "requirePlanApproval",
        FieldKind::Boolean,
        "Wait for explicit plan approval before executing",
    ),
    Field::optional(
        "githubRepoContext",
        FieldKind::Object(REPO_CONTEXT_FIELDS),
        "Optional branch selection",
    ),
];

const APPROVE_PLAN_FIELDS: &[Field] = &[SESSION_ID];

const LIST_ACTIVITIES_FIELDS: &[Field] = &[
    SESSION_ID,
    Field::optional(
        "pageSize",
        FieldKind::Integer {
            min: 1,
            max: MAX_ACTIVITIES_PAGE_SIZE,
        },
        "Maximum number of activities to return",
    ),
    PAGE_TOKEN,
];

const SEND_MESSAGE_FIELDS: &[Field] = &[
    SESSION_ID,
    Field::required(
        "prompt",
        FieldKind::Text { allow_empty: false },
        "Message to send to the session",
    ),
];

pub static CATALOG: &[ToolDef] = &[
    ToolDef {
        name: "list-sources",
        title: "List Sources",
        description: "List Jules sources available to the authenticated user.",
        verb: Verb::Get,
        fields: LIST_FIELDS,
        kind: ToolKind::ListSources,
    },
    ToolDef {
        name: "create-session",
        title: "Create Session",
        description: "Create a Jules session for a given source and prompt.",
        verb: Verb::Post,
        fields: CREATE_SESSION_FIELDS,
        kind: ToolKind::CreateSession,
    },
    ToolDef {
        name: "list-sessions",
        title: "List Sessions",
        description: "List Jules sessions.",
        verb: Verb::Get,
        fields: LIST_FIELDS,
        kind: ToolKind::ListSessions,
    },
    ToolDef {
        name: "approve-session-plan",
        title: "Approve Session Plan",
        description: "Approve the latest plan for a Jules session that requires approval.",
        verb: Verb::Post,
        fields: APPROVE_PLAN_FIELDS,
        kind: ToolKind::ApproveSessionPlan,
    },
    ToolDef {
        name: "list-activities",
        title: "List Session Activities",
        description: "List activities that have occurred in a Jules session.",
        verb: Verb::Get,
        fields: LIST_ACTIVITIES_FIELDS,
        kind: ToolKind::ListActivities,
    },
    ToolDef {
        name: "send-session-message",
        title: "Send Session Message",
        description: "Send a user message to a Jules session.",
        verb: Verb::Post,
        fields: SEND_MESSAGE_FIELDS,
        kind: ToolKind::SendSessionMessage,
    },
];

#[must_use]
pub fn find(name: &str) -> Option<&'static ToolDef> {
    CATALOG.iter().find(|t| t.name == name)
}

/// The MCP `Tool`s advertised in `tools/list`.
#[must_use]
pub fn list_tools() -> Vec<Tool> {
    CATALOG
        .iter()
        .map(|def| {
            let mut tool = Tool::new(
                def.name,
                def.description,
                Arc::new(input_schema(def.fields)),
            );
            tool.annotations = Some(annotations_for(def));
            tool
        })
        .collect()
}

/// MCP hints from the HTTP verb a tool issues. Every tool talks to a remote system.
#[must_use]
pub fn annotations_for(def: &ToolDef) -> ToolAnnotations {
    let read_only = def.verb == Verb::Get;
    ToolAnnotations {
        title: Some(def.title.to_string()),
        read_only_hint: Some(read_only),
        destructive_hint: Some(false),
        idempotent_hint: Some(read_only),
        open_world_hint: Some(true),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageArgs {
    page_size: Option<Value>,
    page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionArgs {
    prompt: String,
    source: String,
    title: Option<String>,
    require_plan_approval: Option<bool>,
    github_repo_context: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionArgs {
    session_id: String,
    #[serde(flatten)]
    page: PageArgs,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageArgs {
    session_id: String,
    prompt: String,
}

/// Turn validated arguments into a request.
///
/// # Errors
///
/// Returns a validation error if the arguments cannot be decoded for this tool or the
/// `source` of a new session is blank.
pub fn plan(def: &ToolDef, arguments: &Value) -> Result<PlannedCall, ToolError> {
    let planned = match def.kind {
        ToolKind::ListSources => list_call("sources", decode::<PageArgs>(arguments)?),
        ToolKind::ListSessions => list_call("sessions", decode::<PageArgs>(arguments)?),
        ToolKind::CreateSession => create_session_call(decode(arguments)?)?,
        ToolKind::ApproveSessionPlan => {
            let args: SessionArgs = decode(arguments)?;
            PlannedCall {
                call: RemoteCall::post(session_action(&args.session_id, "approvePlan"), json!({})),
                empty_response: Some(json!({ "status": "Plan approved" })),
            }
        }
        ToolKind::ListActivities => {
            let args: SessionArgs = decode(arguments)?;
            let path = format!("sessions/{}/activities", encode_path_segment(&args.session_id));
            list_call(&path, args.page)
        }
        ToolKind::SendSessionMessage => {
            let args: SendMessageArgs = decode(arguments)?;
            PlannedCall {
                call: RemoteCall::post(
                    session_action(&args.session_id, "sendMessage"),
                    json!({ "prompt": args.prompt }),
                ),
                empty_response: Some(json!({ "status": "Message sent" })),
            }
        }
    };
    Ok(planned)
}

fn list_call(path: &str, page: PageArgs) -> PlannedCall {
    PlannedCall {
        call: RemoteCall::get(path)
            .query("pageSize", page.page_size.as_ref().and_then(whole_number))
            .query("pageToken", page.page_token),
        empty_response: None,
    }
}

fn create_session_call(args: CreateSessionArgs) -> Result<PlannedCall, ToolError> {
    let mut source_context = Map::new();
    source_context.insert("source".to_string(), json!(normalize_source(&args.source)?));

    if let Some(ctx) = args.github_repo_context {
        let compact: Map<String, Value> = ctx
            .into_iter()
            .filter(|(_, v)| !matches!(v, Value::Null) && v.as_str() != Some(""))
            .collect();
        if !compact.is_empty() {
            source_context.insert("githubRepoContext".to_string(), Value::Object(compact));
        }
    }

    let mut body = Map::new();
    body.insert("prompt".to_string(), json!(args.prompt));
    body.insert("sourceContext".to_string(), Value::Object(source_context));
    if let Some(title) = args.title.filter(|t| !t.is_empty()) {
        body.insert("title".to_string(), json!(title));
    }
    if let Some(require) = args.require_plan_approval {
        body.insert("requirePlanApproval".to_string(), json!(require));
    }

    Ok(PlannedCall {
        call: RemoteCall::post("sessions", Value::Object(body)),
        empty_response: None,
    })
}

/// Validation admits `10.0` for an integer field; the query string carries `10`.
#[allow(clippy::cast_possible_truncation)]
fn whole_number(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
}

/// `sessions/{id}:{action}` with the id percent-encoded.
fn session_action(session_id: &str, action: &str) -> String {
    format!("sessions/{}:{action}", encode_path_segment(session_id))
}

fn decode<T: DeserializeOwned>(arguments: &Value) -> Result<T, ToolError> {
    let value = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => strip_nulls(other),
    };
    serde_json::from_value(value).map_err(|e| {
        ToolError::from(ValidationError::new(vec![Violation::constraint(
            "",
            format!("arguments could not be decoded: {e}"),
        )]))
    })
}

/// Drop top-level `null`s so they read as absent.
fn strip_nulls(arguments: &Value) -> Value {
    match arguments {
        Value::Object(obj) => Value::Object(
            obj.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}
