//! Commands for the comment thread context.
//!
//! Commands are built from untrusted JSON. Each `parse` constructor checks
//! shape and length bounds and collects every problem it finds into a single
//! `DomainError::Validation`, so nothing is written for a bad request.

use marginalia_core::command::Command;
use marginalia_core::error::{DomainError, IssueCode, ValidationIssue};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Length bounds applied to free-text fields. Lengths are counted in
/// characters after trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentLimits {
    /// Maximum blog id length.
    pub blog_id_max: usize,
    /// Maximum author name length.
    pub author_max: usize,
    /// Maximum comment body length.
    pub comment_max: usize,
}

impl Default for CommentLimits {
    fn default() -> Self {
        Self {
            blog_id_max: 128,
            author_max: 50,
            comment_max: 3000,
        }
    }
}

/// Collects field-level issues while reading a JSON object.
struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    issues: Vec<ValidationIssue>,
}

impl<'a> FieldReader<'a> {
    fn new(input: &'a Value) -> Result<Self, DomainError> {
        match input {
            Value::Object(object) => Ok(Self {
                object,
                issues: Vec::new(),
            }),
            other => Err(DomainError::Validation(vec![ValidationIssue::root(
                IssueCode::InvalidType,
                format!("Expected object, received {}", type_name(other)),
            )])),
        }
    }

    /// Reads a required string, trims it and checks `1..=max` characters.
    fn text(&mut self, field: &str, max: usize) -> Option<String> {
        let value = match self.object.get(field) {
            Some(Value::String(s)) => s.trim(),
            Some(other) => {
                self.issues.push(ValidationIssue::field(
                    field,
                    IssueCode::InvalidType,
                    format!("Expected string, received {}", type_name(other)),
                ));
                return None;
            }
            None => {
                self.issues
                    .push(ValidationIssue::field(field, IssueCode::InvalidType, "Required"));
                return None;
            }
        };

        let length = value.chars().count();
        if length == 0 {
            self.issues.push(ValidationIssue::field(
                field,
                IssueCode::TooSmall,
                "String must contain at least 1 character(s)",
            ));
            return None;
        }
        if length > max {
            self.issues.push(ValidationIssue::field(
                field,
                IssueCode::TooBig,
                format!("String must contain at most {max} character(s)"),
            ));
            return None;
        }
        Some(value.to_owned())
    }

    /// Reads a required positive integer id.
    fn id(&mut self, field: &str) -> Option<u64> {
        match self.object.get(field) {
            Some(value) => match value.as_u64() {
                Some(0) => {
                    self.issues.push(ValidationIssue::field(
                        field,
                        IssueCode::TooSmall,
                        "Number must be greater than 0",
                    ));
                    None
                }
                Some(id) => Some(id),
                None => {
                    self.issues.push(ValidationIssue::field(
                        field,
                        IssueCode::InvalidType,
                        format!("Expected positive integer, received {}", type_name(value)),
                    ));
                    None
                }
            },
            None => {
                self.issues
                    .push(ValidationIssue::field(field, IssueCode::InvalidType, "Required"));
                None
            }
        }
    }

    fn into_error(self) -> DomainError {
        DomainError::Validation(self.issues)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Command to add a comment to a blog post.
#[derive(Debug, Clone)]
pub struct AddComment {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The blog post the comment belongs to.
    pub blog_id: String,
    /// Display name of the author.
    pub author: String,
    /// Comment body.
    pub comment: String,
}

impl AddComment {
    /// Validates `{blogId, author, comment}`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` listing every invalid field.
    pub fn parse(
        correlation_id: Uuid,
        input: &Value,
        limits: &CommentLimits,
    ) -> Result<Self, DomainError> {
        let mut reader = FieldReader::new(input)?;
        let blog_id = reader.text("blogId", limits.blog_id_max);
        let author = reader.text("author", limits.author_max);
        let comment = reader.text("comment", limits.comment_max);

        match (blog_id, author, comment) {
            (Some(blog_id), Some(author), Some(comment)) => Ok(Self {
                correlation_id,
                blog_id,
                author,
                comment,
            }),
            _ => Err(reader.into_error()),
        }
    }
}

impl Command for AddComment {
    fn command_type(&self) -> &'static str {
        "comments.add_comment"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to replace the text of an existing comment.
#[derive(Debug, Clone)]
pub struct EditComment {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The blog post the comment belongs to.
    pub blog_id: String,
    /// The comment to edit.
    pub comment_id: u64,
    /// Replacement body.
    pub comment: String,
}

impl EditComment {
    /// Validates `{blogId, commentId, comment}`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` listing every invalid field.
    pub fn parse(
        correlation_id: Uuid,
        input: &Value,
        limits: &CommentLimits,
    ) -> Result<Self, DomainError> {
        let mut reader = FieldReader::new(input)?;
        let blog_id = reader.text("blogId", limits.blog_id_max);
        let comment_id = reader.id("commentId");
        let comment = reader.text("comment", limits.comment_max);

        match (blog_id, comment_id, comment) {
            (Some(blog_id), Some(comment_id), Some(comment)) => Ok(Self {
                correlation_id,
                blog_id,
                comment_id,
                comment,
            }),
            _ => Err(reader.into_error()),
        }
    }
}

impl Command for EditComment {
    fn command_type(&self) -> &'static str {
        "comments.edit_comment"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to remove a comment from a thread.
#[derive(Debug, Clone)]
pub struct DeleteComment {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The blog post the comment belongs to.
    pub blog_id: String,
    /// The comment to delete.
    pub comment_id: u64,
}

impl DeleteComment {
    /// Validates `{blogId, commentId}`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` listing every invalid field.
    pub fn parse(
        correlation_id: Uuid,
        input: &Value,
        limits: &CommentLimits,
    ) -> Result<Self, DomainError> {
        let mut reader = FieldReader::new(input)?;
        let blog_id = reader.text("blogId", limits.blog_id_max);
        let comment_id = reader.id("commentId");

        match (blog_id, comment_id) {
            (Some(blog_id), Some(comment_id)) => Ok(Self {
                correlation_id,
                blog_id,
                comment_id,
            }),
            _ => Err(reader.into_error()),
        }
    }
}

impl Command for DeleteComment {
    fn command_type(&self) -> &'static str {
        "comments.delete_comment"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Query for the current comment thread of a blog post.
#[derive(Debug, Clone)]
pub struct GetComments {
    /// The blog post whose thread is requested.
    pub blog_id: String,
}

impl GetComments {
    /// Validates `{blogId}`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` listing every invalid field.
    pub fn parse(input: &Value, limits: &CommentLimits) -> Result<Self, DomainError> {
        let mut reader = FieldReader::new(input)?;
        match reader.text("blogId", limits.blog_id_max) {
            Some(blog_id) => Ok(Self { blog_id }),
            None => Err(reader.into_error()),
        }
    }
}
