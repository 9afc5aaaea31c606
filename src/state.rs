use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::{Format, RecordId, ReservationRecord};
use crate::services::render::DetailBody;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    edit_id: Option<RecordId>,
}

impl SessionState {
    pub fn editing(id: RecordId) -> Self {
        Self { edit_id: Some(id) }
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_id.is_some()
    }

    pub fn edit_id(&self) -> Option<&RecordId> {
        self.edit_id.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPhase {
    Idle,
    Validating,
    Submitting,
    Success,
    Failed,
}

impl SubmitPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmitPhase::Idle => "idle",
            SubmitPhase::Validating => "validating",
            SubmitPhase::Submitting => "submitting",
            SubmitPhase::Success => "success",
            SubmitPhase::Failed => "failed",
        }
    }

    pub fn in_flight(&self) -> bool {
        matches!(self, SubmitPhase::Validating | SubmitPhase::Submitting)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub id: RecordId,
    pub format: Format,
    pub body: DetailBody,
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub rows: Vec<ReservationRecord>,
    pub detail: Option<DetailView>,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    List,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    kind: RequestKind,
    generation: u64,
}

// Only the holder of the latest ticket may write its response into the view.
#[derive(Debug, Default)]
pub struct RequestGenerations {
    list: AtomicU64,
    detail: AtomicU64,
}

impl RequestGenerations {
    fn counter(&self, kind: RequestKind) -> &AtomicU64 {
        match kind {
            RequestKind::List => &self.list,
            RequestKind::Detail => &self.detail,
        }
    }

    pub fn issue(&self, kind: RequestKind) -> Ticket {
        let generation = self.counter(kind).fetch_add(1, Ordering::SeqCst) + 1;
        Ticket { kind, generation }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.counter(ticket.kind).load(Ordering::SeqCst) == ticket.generation
    }
}
