//! State machine for the users page.
//!
//! [`RosterState::update`] is the only way state changes. It never does I/O:
//! it returns an [`Effect`] naming the request the caller should make next,
//! and the caller feeds the response back in as another [`RosterEvent`].

use super::draft::{Draft, DraftField, NewUser, ValidationError};
use super::user::{Snapshot, User, UserId};
use crate::service::{CreateError, Created, FetchError};

/// Identifies one `fetch_all` request so late responses can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Nothing typed since the last successful submission.
    Idle,
    Editing,
    Submitting(Submission),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub request: NewUser,
    pub stage: SubmitStage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStage {
    /// Waiting for the service to acknowledge the create.
    Creating,
    /// Create acknowledged; waiting for the follow-up fetch.
    Reconciling { ticket: FetchTicket, created: Created },
}

#[derive(Debug, Clone)]
pub enum RosterEvent {
    FieldChanged(DraftField, String),
    Submit,
    CreateFinished(Result<Created, CreateError>),
    RefreshRequested,
    FetchFinished(FetchTicket, Result<Snapshot, FetchError>),
    Inspect(UserId),
    InspectFinished(UserId, Result<User, FetchError>),
    /// The client now points at a different service; the list held so far
    /// belongs to the old one.
    ServiceChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Create(NewUser),
    FetchAll(FetchTicket),
    FetchOne(UserId),
    /// A submission went through and the snapshot has been reconciled.
    /// Carries the created user when it could be identified.
    Submitted(Option<User>),
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RosterError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a submission is already in progress")]
    Busy,
    #[error(transparent)]
    Create(#[from] CreateError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("the user was created but the list could not be refreshed: {0}")]
    Reconcile(#[source] FetchError),
}

#[derive(Debug, Clone)]
pub struct RosterState {
    phase: Phase,
    draft: Draft,
    snapshot: Snapshot,
    selected: Option<User>,
    inspecting: Option<UserId>,
    next_ticket: u64,
    /// Fetches older than this ticket are stale. Set when a result is
    /// applied to `snapshot` and when the service changes.
    applied_ticket: Option<FetchTicket>,
    pending_fetches: usize,
}

impl Default for RosterState {
    fn default() -> Self {
        Self::new()
    }
}

impl RosterState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            draft: Draft::default(),
            snapshot: Snapshot::default(),
            selected: None,
            inspecting: None,
            next_ticket: 0,
            applied_ticket: None,
            pending_fetches: 0,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn selected(&self) -> Option<&User> {
        self.selected.as_ref()
    }

    /// The user currently being looked up, if any.
    pub fn inspecting(&self) -> Option<&UserId> {
        self.inspecting.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, Phase::Submitting(_))
    }

    /// Whether any collection fetch is still outstanding.
    pub fn is_fetching(&self) -> bool {
        self.pending_fetches > 0
    }

    pub fn update(&mut self, event: RosterEvent) -> Result<Effect, RosterError> {
        match event {
            RosterEvent::FieldChanged(field, value) => self.field_changed(field, value),
            RosterEvent::Submit => self.submit(),
            RosterEvent::CreateFinished(result) => self.create_finished(result),
            RosterEvent::RefreshRequested => Ok(Effect::FetchAll(self.issue_ticket())),
            RosterEvent::FetchFinished(ticket, result) => self.fetch_finished(ticket, result),
            RosterEvent::Inspect(id) => {
                // Show the listed copy until the lookup answers.
                self.selected = self.snapshot.find(&id).cloned();
                self.inspecting = Some(id.clone());
                Ok(Effect::FetchOne(id))
            }
            RosterEvent::InspectFinished(id, result) => self.inspect_finished(id, result),
            RosterEvent::ServiceChanged => Ok(self.service_changed()),
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.inspecting = None;
    }

    fn service_changed(&mut self) -> Effect {
        let ticket = self.issue_ticket();
        log::debug!("Service changed, dropping fetches before {:?}", ticket);
        self.snapshot = Snapshot::default();
        self.applied_ticket = Some(ticket);
        self.clear_selection();
        Effect::FetchAll(ticket)
    }

    fn field_changed(&mut self, field: DraftField, value: String) -> Result<Effect, RosterError> {
        if self.is_submitting() {
            return Err(RosterError::Busy);
        }
        self.draft.set(field, value);
        self.phase = Phase::Editing;
        Ok(Effect::None)
    }

    fn submit(&mut self) -> Result<Effect, RosterError> {
        if self.is_submitting() {
            log::debug!("Ignoring submit while another is in flight");
            return Err(RosterError::Busy);
        }

        // Phase is left alone on validation failure: the draft is still
        // whatever the user typed.
        let request = self.draft.validate()?;
        log::debug!("Submitting new user {}", request.email);

        self.phase = Phase::Submitting(Submission {
            request: request.clone(),
            stage: SubmitStage::Creating,
        });
        Ok(Effect::Create(request))
    }

    fn create_finished(&mut self, result: Result<Created, CreateError>) -> Result<Effect, RosterError> {
        let request = match &self.phase {
            Phase::Submitting(Submission {
                request,
                stage: SubmitStage::Creating,
            }) => request.clone(),
            other => {
                log::warn!("Create response arrived in unexpected phase {:?}", other);
                return Ok(Effect::None);
            }
        };

        match result {
            Ok(created) => {
                // The refresh is only issued now, after the service has
                // acknowledged the create, so it observes the new user.
                let ticket = self.issue_ticket();
                self.phase = Phase::Submitting(Submission {
                    request,
                    stage: SubmitStage::Reconciling { ticket, created },
                });
                Ok(Effect::FetchAll(ticket))
            }
            Err(e) => {
                log::warn!("Creating {} failed: {}", request.email, e);
                self.phase = Phase::Editing;
                Err(RosterError::Create(e))
            }
        }
    }

    fn fetch_finished(
        &mut self,
        ticket: FetchTicket,
        result: Result<Snapshot, FetchError>,
    ) -> Result<Effect, RosterError> {
        self.pending_fetches = self.pending_fetches.saturating_sub(1);

        let reconciling = matches!(
            &self.phase,
            Phase::Submitting(Submission {
                stage: SubmitStage::Reconciling { ticket: t, .. },
                ..
            }) if *t == ticket
        );
        if reconciling {
            return self.reconcile(ticket, result);
        }

        if self.applied_ticket.is_some_and(|applied| ticket < applied) {
            log::debug!("Dropping stale fetch result {:?}", ticket);
            return Ok(Effect::None);
        }

        match result {
            Ok(snapshot) => {
                self.apply_snapshot(ticket, snapshot);
                Ok(Effect::None)
            }
            Err(e) => {
                log::warn!("Refreshing users failed, keeping previous list: {}", e);
                Err(RosterError::Fetch(e))
            }
        }
    }

    fn reconcile(
        &mut self,
        ticket: FetchTicket,
        result: Result<Snapshot, FetchError>,
    ) -> Result<Effect, RosterError> {
        let Phase::Submitting(submission) = std::mem::replace(&mut self.phase, Phase::Idle) else {
            unreachable!("reconcile is only entered while submitting");
        };
        let SubmitStage::Reconciling { created, .. } = submission.stage else {
            unreachable!("reconcile is only entered while reconciling");
        };

        // The user exists on the service either way, so the draft goes.
        self.draft.clear();

        match result {
            Ok(snapshot) => {
                // A refresh issued after the create may already have landed.
                if !self.applied_ticket.is_some_and(|applied| applied > ticket) {
                    self.apply_snapshot(ticket, snapshot);
                }
                let user = match created {
                    Created::User(user) => Some(user),
                    Created::Acknowledged { .. } => self
                        .snapshot
                        .find_by_email(&submission.request.email)
                        .cloned(),
                };
                if user.is_none() {
                    log::warn!(
                        "Created user {} is missing from the refreshed list",
                        submission.request.email
                    );
                }
                Ok(Effect::Submitted(user))
            }
            Err(e) => {
                log::warn!("User created but refresh failed: {}", e);
                Err(RosterError::Reconcile(e))
            }
        }
    }

    fn inspect_finished(&mut self, id: UserId, result: Result<User, FetchError>) -> Result<Effect, RosterError> {
        if self.inspecting.as_ref() != Some(&id) {
            log::debug!("Dropping lookup of {} that is no longer wanted", id);
            return Ok(Effect::None);
        }
        self.inspecting = None;

        match result {
            Ok(user) => {
                self.selected = Some(user);
                Ok(Effect::None)
            }
            Err(e) => {
                self.selected = None;
                Err(RosterError::Fetch(e))
            }
        }
    }

    fn issue_ticket(&mut self) -> FetchTicket {
        self.next_ticket += 1;
        self.pending_fetches += 1;
        FetchTicket(self.next_ticket)
    }

    fn apply_snapshot(&mut self, ticket: FetchTicket, snapshot: Snapshot) {
        log::debug!("Applying {} users from {:?}", snapshot.len(), ticket);
        self.snapshot = snapshot;
        self.applied_ticket = Some(ticket);
    }
}
