use crate::conversation::attachments::AttachmentRegistry;
use crate::conversation::{ConversationLog, Message, FETCH_FAILED, NO_SQL_GENERATED};
use crate::event::{RequestId, SubmissionOutcome};
use crate::sql::GenerateSqlRequest;
use log::{debug, error, info, warn};
use std::collections::BTreeSet;

/// Hands a request to whatever performs the network call. Implementations
/// must not block; the result comes back later through [`SubmissionController::reconcile`].
pub trait RequestDispatcher {
    fn dispatch(&self, request_id: RequestId, request: GenerateSqlRequest);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendTrigger {
    EnterKey,
    SendButton,
}

impl SendTrigger {
    fn as_str(self) -> &'static str {
        match self {
            Self::EnterKey => "enter",
            Self::SendButton => "send button",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatState {
    pub attachments: AttachmentRegistry,
    pub log: ConversationLog,
    pub pending_input: String,
}

impl ChatState {
    /// Moves the draft into the log and builds the outbound request. Returns
    /// `None` and leaves everything untouched when the draft is blank.
    pub fn begin_submission(&mut self) -> Option<GenerateSqlRequest> {
        if self.pending_input.trim().is_empty() {
            return None;
        }

        let user_prompt = std::mem::take(&mut self.pending_input);
        self.log.append(Message::user(user_prompt.clone()));

        Some(GenerateSqlRequest {
            schema_files: self.attachments.snapshot(),
            user_prompt,
        })
    }
}

pub fn reply_text(outcome: &SubmissionOutcome) -> &str {
    match outcome {
        Ok(Some(sql)) => sql,
        Ok(None) => NO_SQL_GENERATED,
        Err(_) => FETCH_FAILED,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    Sql,
    NoSql,
    Failed(String),
    Stray,
}

pub struct SubmissionController<D> {
    dispatcher: D,
    state: ChatState,
    next_request_id: RequestId,
    in_flight: BTreeSet<RequestId>,
}

impl<D: RequestDispatcher> SubmissionController<D> {
    pub fn new(dispatcher: D) -> Self {
        Self {
            dispatcher,
            state: ChatState::default(),
            next_request_id: 1,
            in_flight: BTreeSet::new(),
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn pending_input_mut(&mut self) -> &mut String {
        &mut self.state.pending_input
    }

    pub fn add_attachments<I, S>(&mut self, file_names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.attachments.add(file_names);
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn send(&mut self, trigger: SendTrigger) -> Option<RequestId> {
        let request = self.state.begin_submission()?;

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.in_flight.insert(request_id);

        debug!("request {request_id} submitted via {}", trigger.as_str());
        self.dispatcher.dispatch(request_id, request);
        Some(request_id)
    }

    /// Appends the bot reply for a finished request at the end of the log as
    /// it stands now. Replies from overlapping requests land in completion order.
    pub fn reconcile(&mut self, request_id: RequestId, outcome: SubmissionOutcome) -> Reconciliation {
        if !self.in_flight.remove(&request_id) {
            warn!("ignoring response for unknown request {request_id}");
            return Reconciliation::Stray;
        }

        self.state.log.append(Message::bot(reply_text(&outcome)));

        match outcome {
            Ok(Some(_)) => {
                info!("request {request_id} produced SQL");
                Reconciliation::Sql
            }
            Ok(None) => {
                info!("request {request_id} returned no sql_query");
                Reconciliation::NoSql
            }
            Err(err) => {
                error!("request {request_id} failed: {err}");
                Reconciliation::Failed(err.to_string())
            }
        }
    }
}
