use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::{self, Either};
use tracing::{debug, info, warn};

use crate::intake::{FailureReason, IntakeError, LeadIntake, SubmissionError};
use crate::schema::{Field, FieldError, FieldErrors, LeadFields};
use crate::submission::{LeadSubmission, VerificationToken};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_CONFIRMATION_HOLD: Duration = Duration::from_secs(5);

/// Source of delays, so the workflow runs on any executor.
#[async_trait(?Send)]
pub trait Timer {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub request_timeout: Duration,
    pub confirmation_hold: Duration,
    /// Sent along with each lead as ambient context.
    pub user_agent: Option<String>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        WorkflowConfig {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            confirmation_hold: DEFAULT_CONFIRMATION_HOLD,
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Submitting,
    Succeeded,
    Failed(FailureReason),
}

/// Form-level message that is not tied to a single input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Blocking: the challenge has to be (re)completed before sending.
    ChallengeRequired,
    /// Dismissible failure message.
    Alert(String),
}

/// Everything a rendering surface needs, handed to observers after each change.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSnapshot {
    pub state: WorkflowState,
    pub fields: LeadFields,
    pub errors: FieldErrors,
    pub notice: Option<Notice>,
    pub has_token: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverId(usize);

type Observer = Rc<dyn Fn(&WorkflowSnapshot)>;

struct Inner {
    state: WorkflowState,
    fields: LeadFields,
    errors: FieldErrors,
    notice: Option<Notice>,
    token: Option<VerificationToken>,
    successes: u64,
}

impl Inner {
    // Any new interaction moves a finished submission back to Idle.
    fn leave_outcome(&mut self) {
        match self.state {
            WorkflowState::Failed(_) => {
                self.state = WorkflowState::Idle;
                if matches!(self.notice, Some(Notice::Alert(_))) {
                    self.notice = None;
                }
            }
            WorkflowState::Succeeded => self.state = WorkflowState::Idle,
            WorkflowState::Idle | WorkflowState::Submitting => {}
        }
    }
}

/// Drives one contact form from first keystroke to confirmation.
///
/// Single-threaded by construction: state sits behind `RefCell` and methods take
/// `&self`, so a UI can hold the workflow in an `Rc` and call it from event
/// handlers while a submission is suspended on the network.
pub struct LeadWorkflow<I, T> {
    intake: I,
    timer: T,
    config: WorkflowConfig,
    inner: RefCell<Inner>,
    observers: RefCell<Vec<(ObserverId, Observer)>>,
    next_observer: Cell<usize>,
}

impl<I: LeadIntake, T: Timer> LeadWorkflow<I, T> {
    pub fn new(intake: I, timer: T, config: WorkflowConfig) -> Self {
        LeadWorkflow {
            intake,
            timer,
            config,
            inner: RefCell::new(Inner {
                state: WorkflowState::Idle,
                fields: LeadFields::default(),
                errors: FieldErrors::default(),
                notice: None,
                token: None,
                successes: 0,
            }),
            observers: RefCell::new(Vec::new()),
            next_observer: Cell::new(0),
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.inner.borrow().state.clone()
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        let inner = self.inner.borrow();
        WorkflowSnapshot {
            state: inner.state.clone(),
            fields: inner.fields.clone(),
            errors: inner.errors.clone(),
            notice: inner.notice.clone(),
            has_token: inner.token.is_some(),
        }
    }

    pub fn subscribe(&self, observer: impl Fn(&WorkflowSnapshot) + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer.get());
        self.next_observer.set(id.0 + 1);
        let observer: Observer = Rc::new(observer);
        self.observers.borrow_mut().push((id, observer));
        id
    }

    pub fn unsubscribe(&self, id: ObserverId) {
        self.observers.borrow_mut().retain(|(observer_id, _)| *observer_id != id);
    }

    pub fn set_field(&self, field: Field, value: impl Into<String>) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.leave_outcome();
            inner.fields.set(field, value.into());
            inner.errors.clear(field);
        }
        self.notify();
    }

    pub fn set_consent(&self, given: bool) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.leave_outcome();
            inner.fields.consent_given = given;
            inner.errors.clear(Field::Consent);
        }
        self.notify();
    }

    /// The challenge widget produced a fresh token.
    pub fn set_token(&self, token: VerificationToken) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.leave_outcome();
            inner.token = Some(token);
            if inner.notice == Some(Notice::ChallengeRequired) {
                inner.notice = None;
            }
        }
        self.notify();
    }

    /// The challenge widget reported expiry or an error; the held token is void.
    pub fn expire_token(&self) {
        let had_token = self.inner.borrow_mut().token.take().is_some();
        if had_token {
            debug!("verification token expired");
            self.notify();
        }
    }

    pub fn dismiss_alert(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            if matches!(inner.notice, Some(Notice::Alert(_))) {
                inner.notice = None;
            }
            inner.leave_outcome();
        }
        self.notify();
    }

    /// Clears the form. Returns `false` while a submission is in flight.
    pub fn reset(&self) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.state == WorkflowState::Submitting {
                return false;
            }
            inner.state = WorkflowState::Idle;
            inner.fields = LeadFields::default();
            inner.errors = FieldErrors::default();
            inner.notice = None;
        }
        self.notify();
        true
    }

    /// Validates, then sends the lead through the intake.
    ///
    /// Nothing leaves the browser unless every field passes, consent is given
    /// and a verification token is held. The token is consumed by the attempt
    /// whatever its outcome.
    pub async fn submit(&self) -> Result<(), SubmissionError> {
        let submission = {
            let mut inner = self.inner.borrow_mut();
            if inner.state == WorkflowState::Submitting {
                debug!("submit ignored, a submission is already in flight");
                return Err(SubmissionError::InFlight);
            }
            inner.leave_outcome();

            match LeadSubmission::prepare(
                &inner.fields,
                inner.token.as_ref(),
                Utc::now(),
                self.config.user_agent.clone(),
            ) {
                Ok(submission) => {
                    inner.token = None;
                    inner.errors = FieldErrors::default();
                    inner.notice = None;
                    inner.state = WorkflowState::Submitting;
                    Ok(submission)
                }
                Err(rejection) => {
                    inner.errors = rejection.errors.clone();
                    inner.notice = rejection
                        .challenge_missing
                        .then_some(Notice::ChallengeRequired);
                    Err(rejection)
                }
            }
        };
        self.notify();
        let submission = submission.map_err(SubmissionError::Invalid)?;

        info!(subject = %submission.subject, "submitting lead");
        let outcome = match future::select(
            self.intake.submit(&submission),
            self.timer.sleep(self.config.request_timeout),
        )
        .await
        {
            Either::Left((outcome, _)) => outcome,
            Either::Right(((), _)) => Err(IntakeError::Timeout(self.config.request_timeout)),
        };

        let result = {
            let mut inner = self.inner.borrow_mut();
            match outcome {
                Ok(receipt) => {
                    info!(reference = ?receipt.reference, "lead accepted");
                    inner.fields = LeadFields::default();
                    inner.errors = FieldErrors::default();
                    inner.notice = None;
                    inner.token = None;
                    inner.successes += 1;
                    inner.state = WorkflowState::Succeeded;
                    Ok(())
                }
                Err(err) => {
                    warn!(error = %err, "lead submission failed");
                    let reason = err.failure_reason();
                    match reason {
                        FailureReason::ConsentRequired => {
                            inner.errors.set(Field::Consent, FieldError::ConsentRequired);
                        }
                        FailureReason::ChallengeRejected => {
                            inner.notice = Some(Notice::ChallengeRequired);
                        }
                        _ => inner.notice = Some(Notice::Alert(reason.user_message())),
                    }
                    inner.state = WorkflowState::Failed(reason);
                    Err(SubmissionError::Intake(err))
                }
            }
        };
        self.notify();
        result
    }

    /// Keeps the confirmation up for the configured hold, then returns to `Idle`
    /// unless the visitor already moved on.
    pub async fn hold_confirmation(&self) {
        let success = {
            let inner = self.inner.borrow();
            if inner.state != WorkflowState::Succeeded {
                return;
            }
            inner.successes
        };

        self.timer.sleep(self.config.confirmation_hold).await;

        let expired = {
            let mut inner = self.inner.borrow_mut();
            let same = inner.state == WorkflowState::Succeeded && inner.successes == success;
            if same {
                inner.state = WorkflowState::Idle;
            }
            same
        };
        if expired {
            self.notify();
        }
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        let observers: Vec<Observer> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        for observer in observers {
            observer(&snapshot);
        }
    }
}
