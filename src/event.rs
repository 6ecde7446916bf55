use crate::error::SubmissionError;

pub type RequestId = u64;

/// Result of one request: the `sql_query` text when the service produced a
/// usable one, `None` when the field was absent or empty.
pub type SubmissionOutcome = Result<Option<String>, SubmissionError>;

#[derive(Debug)]
pub enum AppEvent {
    SqlResponse {
        request_id: RequestId,
        outcome: SubmissionOutcome,
    },
}
