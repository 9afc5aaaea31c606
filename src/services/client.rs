use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Deserialize;

use crate::errors::ClientError;
use crate::models::reservation::sort_newest_first;
use crate::models::{Field, FormState, Format, HealthReport, RecordId, ReservationRecord};
use crate::services::confirm::Confirm;
use crate::services::encoding;
use crate::services::render::DetailBody;
use crate::services::transport::{ApiRequest, ApiResponse, Endpoints, Transport};
use crate::services::validation::{self, ValidationWarning};
use crate::state::{
    DetailView, Notice, RequestGenerations, RequestKind, SessionState, SubmitPhase, ViewState,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAction {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub action: SubmitAction,
    pub id: Option<RecordId>,
    pub warnings: Vec<ValidationWarning>,
}

impl SubmitOutcome {
    pub fn message(&self) -> String {
        match (self.action, &self.id) {
            (SubmitAction::Created, _) => "Reservation created successfully".to_string(),
            (SubmitAction::Updated, Some(id)) => format!("Reservation #{id} updated successfully"),
            (SubmitAction::Updated, None) => "Reservation updated successfully".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: T,
    pub applied: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { message: String },
    Declined,
}

// Marks an abandoned submission as failed so a dropped future cannot leave
// the client stuck in `Submitting`.
struct PhaseGuard<'a> {
    phase: &'a Mutex<SubmitPhase>,
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        let mut phase = lock(self.phase);
        if phase.in_flight() {
            tracing::warn!(phase = phase.as_str(), "submission abandoned");
            *phase = SubmitPhase::Failed;
        }
    }
}

#[derive(Deserialize)]
struct DeleteBody {
    message: Option<String>,
}

pub struct ReservationClient {
    transport: Box<dyn Transport>,
    confirm: Box<dyn Confirm>,
    endpoints: Endpoints,
    display_format: Mutex<Format>,
    form: Mutex<FormState>,
    session: Mutex<SessionState>,
    view: Mutex<ViewState>,
    phase: Mutex<SubmitPhase>,
    generations: RequestGenerations,
}

impl ReservationClient {
    pub fn new(transport: Box<dyn Transport>, confirm: Box<dyn Confirm>, endpoints: Endpoints) -> Self {
        Self {
            transport,
            confirm,
            endpoints,
            display_format: Mutex::new(Format::default()),
            form: Mutex::new(FormState::new()),
            session: Mutex::new(SessionState::default()),
            view: Mutex::new(ViewState::default()),
            phase: Mutex::new(SubmitPhase::Idle),
            generations: RequestGenerations::default(),
        }
    }

    pub fn with_display_format(self, format: Format) -> Self {
        *lock(&self.display_format) = format;
        self
    }

    // ── State accessors ──

    pub fn display_format(&self) -> Format {
        *lock(&self.display_format)
    }

    pub fn set_display_format(&self, format: Format) {
        *lock(&self.display_format) = format;
    }

    pub fn session(&self) -> SessionState {
        lock(&self.session).clone()
    }

    pub fn form(&self) -> FormState {
        lock(&self.form).clone()
    }

    pub fn view(&self) -> ViewState {
        lock(&self.view).clone()
    }

    pub fn notice(&self) -> Option<Notice> {
        lock(&self.view).notice.clone()
    }

    pub fn submit_phase(&self) -> SubmitPhase {
        *lock(&self.phase)
    }

    pub fn set_field(&self, field: Field, value: impl Into<String>) {
        lock(&self.form).set(field, value);
    }

    pub fn collect_form_data(&self) -> ReservationRecord {
        lock(&self.form).collect()
    }

    fn set_notice(&self, notice: Notice) {
        lock(&self.view).notice = Some(notice);
    }

    fn set_phase(&self, phase: SubmitPhase) {
        tracing::debug!(phase = phase.as_str(), "submit phase");
        *lock(&self.phase) = phase;
    }

    fn reset_edit(&self) {
        *lock(&self.session) = SessionState::default();
        lock(&self.form).reset();
    }

    async fn send_checked(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let method = request.method.clone();
        let target = request.target();
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            tracing::warn!(%method, %target, status = response.status, "request failed");
            return Err(ClientError::Http {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response)
    }

    // ── Operations ──

    pub async fn start(&self) -> Result<Fetched<Vec<ReservationRecord>>, ClientError> {
        self.reset_edit();
        self.load_reservations(None, self.display_format()).await
    }

    pub async fn submit(&self, format: Format) -> Result<SubmitOutcome, ClientError> {
        {
            let mut phase = lock(&self.phase);
            if phase.in_flight() {
                return Err(ClientError::Busy);
            }
            *phase = SubmitPhase::Validating;
        }
        let _guard = PhaseGuard { phase: &self.phase };

        let record = self.collect_form_data();
        let warnings = match validation::validate(&record) {
            Ok(warnings) => warnings,
            Err(e) => {
                tracing::info!(field = %e.field, "submission blocked by validation");
                return Err(self.fail_submit(e.into()));
            }
        };
        let body = match encoding::encode(&record, format) {
            Ok(body) => body,
            Err(e) => return Err(self.fail_submit(e)),
        };

        let session = self.session();
        let request = match session.edit_id() {
            Some(id) => self.endpoints.update(id, body, format),
            None => self.endpoints.create(body, format),
        };

        self.set_phase(SubmitPhase::Submitting);
        let response = match self.send_checked(request).await {
            Ok(response) => response,
            Err(e) => return Err(self.fail_submit(e)),
        };

        let outcome = match session.edit_id() {
            Some(id) => SubmitOutcome {
                action: SubmitAction::Updated,
                id: Some(id.clone()),
                warnings,
            },
            None => SubmitOutcome {
                action: SubmitAction::Created,
                id: encoding::decode_record(&response.body, format)
                    .ok()
                    .and_then(|r| r.id),
                warnings,
            },
        };
        tracing::info!(
            action = ?outcome.action,
            id = outcome.id.as_ref().map(RecordId::as_str).unwrap_or("-"),
            %format,
            "reservation saved"
        );

        self.reset_edit();
        self.set_phase(SubmitPhase::Success);

        let notice = match self.load_reservations(None, self.display_format()).await {
            Ok(_) => Notice::success(outcome.message()),
            Err(e) => Notice::warning(format!(
                "{}, but the list could not be refreshed: {e}",
                outcome.message()
            )),
        };
        self.set_notice(notice);
        Ok(outcome)
    }

    fn fail_submit(&self, err: ClientError) -> ClientError {
        self.set_phase(SubmitPhase::Failed);
        self.set_notice(Notice::error(err.to_string()));
        err
    }

    pub async fn load_reservations(
        &self,
        query: Option<&str>,
        format: Format,
    ) -> Result<Fetched<Vec<ReservationRecord>>, ClientError> {
        let ticket = self.generations.issue(RequestKind::List);
        let request = self.endpoints.list(query, format);

        let result = match self.send_checked(request).await {
            Ok(response) => encoding::decode_list(&response.body, format),
            Err(e) => Err(e),
        };
        let applied = self.generations.is_current(ticket);

        match result {
            Ok(mut records) => {
                sort_newest_first(&mut records);
                if applied {
                    lock(&self.view).rows = records.clone();
                } else {
                    tracing::debug!("discarding superseded listing");
                }
                tracing::info!(count = records.len(), %format, "loaded reservations");
                Ok(Fetched {
                    value: records,
                    applied,
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load reservations");
                if applied {
                    self.set_notice(Notice::error(format!("Failed to load reservations: {e}")));
                }
                Err(e)
            }
        }
    }

    pub async fn view_reservation(
        &self,
        id: &RecordId,
        format: Format,
    ) -> Result<Fetched<DetailView>, ClientError> {
        let ticket = self.generations.issue(RequestKind::Detail);
        let request = self.endpoints.get(id, format);

        let result = match self.send_checked(request).await {
            Ok(response) => Self::detail_body(&response.body, format),
            Err(e) => Err(e),
        };
        let applied = self.generations.is_current(ticket);

        match result {
            Ok(body) => {
                let detail = DetailView {
                    id: id.clone(),
                    format,
                    body,
                };
                if applied {
                    lock(&self.view).detail = Some(detail.clone());
                } else {
                    tracing::debug!(id = %id, "discarding superseded detail");
                }
                Ok(Fetched {
                    value: detail,
                    applied,
                })
            }
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "failed to load reservation");
                if applied {
                    let mut view = lock(&self.view);
                    view.detail = None;
                    view.notice = Some(Notice::error(format!(
                        "Failed to load reservation #{id}: {e}"
                    )));
                }
                Err(e)
            }
        }
    }

    fn detail_body(body: &str, format: Format) -> Result<DetailBody, ClientError> {
        if format == Format::Xml {
            // Well-formedness check only; the view shows the server's text.
            encoding::decode_record(body, format)?;
        }
        DetailBody::from_response(body, format)
    }

    pub async fn begin_edit(&self, id: &RecordId) -> Result<ReservationRecord, ClientError> {
        let request = self.endpoints.get(id, Format::Json);
        let result = match self.send_checked(request).await {
            Ok(response) => encoding::decode_record(&response.body, Format::Json),
            Err(e) => Err(e),
        };

        match result {
            Ok(record) => {
                lock(&self.form).populate(&record);
                *lock(&self.session) = SessionState::editing(id.clone());
                tracing::info!(id = %id, "editing reservation");
                self.set_notice(Notice::info(format!("Editing reservation #{id}")));
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "failed to load reservation for editing");
                self.set_notice(Notice::error(format!(
                    "Failed to load reservation #{id} for editing: {e}"
                )));
                Err(e)
            }
        }
    }

    pub fn cancel_edit(&self) {
        self.reset_edit();
        self.set_phase(SubmitPhase::Idle);
        self.set_notice(Notice::info("Edit cancelled"));
    }

    pub async fn delete_reservation(&self, id: &RecordId) -> Result<DeleteOutcome, ClientError> {
        if !self
            .confirm
            .confirm(&format!("Delete reservation #{id}? This cannot be undone."))
        {
            tracing::info!(id = %id, "delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        let response = match self.transport.send(self.endpoints.delete(id)).await {
            Ok(response) => response,
            Err(e) => {
                self.set_notice(Notice::error(format!("Failed to delete reservation #{id}: {e}")));
                return Err(e);
            }
        };

        if !response.is_success() {
            let message = encoding::extract_error_message(&response.body)
                .unwrap_or_else(|| format!("HTTP {}", response.status));
            tracing::warn!(id = %id, status = response.status, "delete rejected");
            self.set_notice(Notice::error(format!(
                "Failed to delete reservation #{id}: {message}"
            )));
            return Err(ClientError::Rejected {
                status: response.status,
                message,
            });
        }

        let message = serde_json::from_str::<DeleteBody>(&response.body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| format!("Reservation #{id} deleted successfully"));
        tracing::info!(id = %id, "reservation deleted");

        let notice = match self.load_reservations(None, self.display_format()).await {
            Ok(_) => Notice::success(message.clone()),
            Err(e) => Notice::warning(format!("{message}, but the list could not be refreshed: {e}")),
        };
        self.set_notice(notice);
        Ok(DeleteOutcome::Deleted { message })
    }

    pub async fn health(&self) -> Result<HealthReport, ClientError> {
        let response = self.send_checked(self.endpoints.health()).await?;
        serde_json::from_str(&response.body).map_err(|e| ClientError::parse(Format::Json, e))
    }
}
