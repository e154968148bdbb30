//! Lead capture for the Diffrenzz contact form.
//!
//! The browser drives a [`LeadWorkflow`] over an implementation of
//! [`LeadIntake`]; the backend reuses [`validate`] and the wire types to check
//! what arrives.

pub mod intake;
pub mod schema;
pub mod submission;
pub mod wire;
pub mod workflow;

pub use intake::{FailureReason, IntakeError, LeadIntake, SubmissionError};
pub use schema::{
    is_valid_email, validate, Field, FieldError, FieldErrors, LeadFields, Subject,
    FIELD_SCHEMA, MIN_MESSAGE_CHARS,
};
pub use submission::{LeadSubmission, Rejection, VerificationToken};
pub use wire::{ErrorCode, IntakeErrorBody, IntakePayload, IntakeReceipt};
pub use workflow::{
    LeadWorkflow, Notice, ObserverId, Timer, WorkflowConfig, WorkflowSnapshot, WorkflowState,
};
