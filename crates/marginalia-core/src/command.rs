//! Write-side requests.

use uuid::Uuid;

/// A validated request to change a comment thread.
///
/// Every add, edit and delete request is given a fresh correlation id when
/// it is parsed. The API logs it next to the command type, so one request
/// can be followed through validation, the store round trips and the
/// response.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Dotted name logged for this command, e.g. `comments.add_comment`.
    fn command_type(&self) -> &'static str;

    /// Id assigned when the request body was parsed.
    fn correlation_id(&self) -> Uuid;
}
