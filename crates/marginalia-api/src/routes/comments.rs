//! Routes for the comment thread context.
//!
//! The functions are method-agnostic, like their serverless counterparts:
//! commands read a JSON body, `get-comments` reads the query string.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::{MethodRouter, any};
use axum::{Json, Router};
use serde_json::{Map, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use marginalia_comments::application::{command_handlers, query_handlers};
use marginalia_comments::domain::aggregates::CommentAggregate;
use marginalia_comments::domain::commands::{AddComment, DeleteComment, EditComment, GetComments};
use marginalia_comments::domain::events::{CommentDeleted, CommentEdited};
use marginalia_core::command::Command;
use marginalia_core::error::{DomainError, IssueCode, ValidationIssue};

use crate::error::ApiError;
use crate::policy::{self, HandlerPolicy};
use crate::state::AppState;

const ADD_COMMENT_FAILED: &str = "Cannot add comments at this time, please try again later.";
const EDIT_COMMENT_FAILED: &str = "Cannot edit comments at this time, please try again later.";

/// Reads a request body as JSON. An empty body counts as `{}`.
fn parse_body(body: &Bytes) -> Result<Value, DomainError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(|e| {
        DomainError::Validation(vec![ValidationIssue::root(
            IssueCode::InvalidType,
            format!("Request body is not valid JSON: {e}"),
        )])
    })
}

/// Reports a query string the extractor could not decode as a root
/// validation issue.
fn invalid_query(rejection: &QueryRejection) -> DomainError {
    DomainError::Validation(vec![ValidationIssue::root(
        IssueCode::InvalidType,
        rejection.body_text(),
    )])
}

/// add-comment
#[instrument(skip_all)]
async fn add_comment(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CommentAggregate>, ApiError> {
    let command = AddComment::parse(Uuid::new_v4(), &parse_body(&body)?, &state.limits)?;

    info!(
        correlation_id = %command.correlation_id(),
        blog_id = %command.blog_id,
        "handling {} command",
        command.command_type()
    );

    let aggregate = command_handlers::handle_add_comment(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(aggregate))
}

/// edit-comment
#[instrument(skip_all)]
async fn edit_comment(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CommentEdited>, ApiError> {
    let command = EditComment::parse(Uuid::new_v4(), &parse_body(&body)?, &state.limits)?;

    info!(
        correlation_id = %command.correlation_id(),
        blog_id = %command.blog_id,
        comment_id = command.comment_id,
        "handling {} command",
        command.command_type()
    );

    let edited = command_handlers::handle_edit_comment(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(edited))
}

/// delete-comment
#[instrument(skip_all)]
async fn delete_comment(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CommentDeleted>, ApiError> {
    let command = DeleteComment::parse(Uuid::new_v4(), &parse_body(&body)?, &state.limits)?;

    info!(
        correlation_id = %command.correlation_id(),
        blog_id = %command.blog_id,
        comment_id = command.comment_id,
        "handling {} command",
        command.command_type()
    );

    let deleted = command_handlers::handle_delete_comment(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(deleted))
}

/// get-comments
#[instrument(skip_all)]
async fn get_comments(
    State(state): State<AppState>,
    params: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<Json<Vec<CommentAggregate>>, ApiError> {
    let Query(params) = params.map_err(|rejection| invalid_query(&rejection))?;
    let input: Map<String, Value> = params
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();
    let query = GetComments::parse(&Value::Object(input), &state.limits)?;

    let comments = query_handlers::get_comments(&query, &*state.event_repository).await?;

    Ok(Json(comments))
}

/// Returns the router for the comment functions, with their policies and
/// CORS headers applied.
pub fn router(state: &AppState) -> Router<AppState> {
    let functions: [(&str, MethodRouter<AppState>); 4] = [
        (
            "add-comment",
            HandlerPolicy::new("add-comment")
                .feature_flag("add-comment")
                .rate_limit(state.add_comment_rate_limit)
                .error_message(ADD_COMMENT_FAILED)
                .wrap(state, any(add_comment)),
        ),
        (
            "edit-comment",
            HandlerPolicy::new("edit-comment")
                .error_message(EDIT_COMMENT_FAILED)
                .wrap(state, any(edit_comment)),
        ),
        (
            "delete-comment",
            HandlerPolicy::new("delete-comment").wrap(state, any(delete_comment)),
        ),
        (
            "get-comments",
            HandlerPolicy::new("get-comments").wrap(state, any(get_comments)),
        ),
    ];

    let mut router = Router::new();
    for (name, function) in functions {
        router = router
            .route(&format!("/{name}"), function.clone())
            .route(&format!("/.netlify/functions/{name}"), function);
    }
    policy::with_cors(router)
}
