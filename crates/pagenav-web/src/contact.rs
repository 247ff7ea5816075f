#![forbid(unsafe_code)]

//! Contact form submission flow.
//!
//! The form has three phases:
//!
//! ```text
//! Idle --begin_submit--> Submitting --finish_submit(Ok)--> Submitted --3s--> Idle
//!                            |
//!                            +--finish_submit(Err)--> Idle (fields kept)
//! ```
//!
//! Delivery itself is a host capability ([`MessageDelivery`]); this module only
//! builds the outbound payload and tracks the phase.

use core::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{ContactConfig, SUBMITTED_DISPLAY};

/// An editable form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Name,
    Email,
    Message,
}

/// Submission phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormPhase {
    #[default]
    Idle,
    Submitting,
    Submitted,
}

/// Contact flow error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    /// A submission is already in progress or its confirmation is showing.
    Busy,
    /// A delivery setting is unset; carries the variable name.
    MissingConfig(&'static str),
    /// The delivery capability reported a failure.
    Delivery(String),
}

impl core::fmt::Display for ContactError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Busy => f.write_str("a submission is already in progress"),
            Self::MissingConfig(name) => write!(f, "delivery setting {name} is not set"),
            Self::Delivery(reason) => write!(f, "delivery failed: {reason}"),
        }
    }
}

impl std::error::Error for ContactError {}

/// Template variables of an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateParams {
    pub from_name: String,
    pub from_email: String,
    pub message: String,
    pub to_email: String,
}

/// Payload handed to the delivery service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub service_id: String,
    pub template_id: String,
    /// Public key of the sending account.
    pub user_id: String,
    pub template_params: TemplateParams,
}

impl OutboundMessage {
    /// JSON request body.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Sends one message per call.
pub trait MessageDelivery {
    /// Deliver `message`, returning a human-readable reason on failure.
    fn deliver(&mut self, message: &OutboundMessage) -> Result<(), String>;
}

/// Contact form state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    name: String,
    email: String,
    message: String,
    phase: FormPhase,
    confirmation_left: Duration,
}

impl ContactForm {
    /// Empty, idle form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    /// Current value of `field`.
    #[must_use]
    pub fn field(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Email => &self.email,
            ContactField::Message => &self.message,
        }
    }

    /// Edit a field. Ignored while submitting; returns whether it applied.
    pub fn set_field(&mut self, field: ContactField, value: impl Into<String>) -> bool {
        if self.phase == FormPhase::Submitting {
            return false;
        }
        let slot = match field {
            ContactField::Name => &mut self.name,
            ContactField::Email => &mut self.email,
            ContactField::Message => &mut self.message,
        };
        *slot = value.into();
        true
    }

    /// Enter `Submitting` and build the payload for `config`.
    ///
    /// Fails without changing anything if the form is not idle or a delivery
    /// setting is missing.
    pub fn begin_submit(&mut self, config: &ContactConfig) -> Result<OutboundMessage, ContactError> {
        if self.phase != FormPhase::Idle {
            return Err(ContactError::Busy);
        }
        if let Some(name) = config.missing() {
            return Err(ContactError::MissingConfig(name));
        }
        self.phase = FormPhase::Submitting;
        debug!("contact submission started");
        Ok(OutboundMessage {
            service_id: config.service_id.clone(),
            template_id: config.template_id.clone(),
            user_id: config.public_key.clone(),
            template_params: TemplateParams {
                from_name: self.name.clone(),
                from_email: self.email.clone(),
                message: self.message.clone(),
                to_email: config.to_email.clone(),
            },
        })
    }

    /// Record the delivery outcome. Ignored unless submitting.
    pub fn finish_submit(&mut self, result: Result<(), ContactError>) -> bool {
        if self.phase != FormPhase::Submitting {
            return false;
        }
        match result {
            Ok(()) => {
                self.phase = FormPhase::Submitted;
                self.confirmation_left = SUBMITTED_DISPLAY;
                debug!("contact submission delivered");
            }
            Err(err) => {
                warn!(error = %err, "contact submission failed");
                self.phase = FormPhase::Idle;
            }
        }
        true
    }

    /// Build, deliver and record a submission in one call.
    pub fn submit<D: MessageDelivery + ?Sized>(
        &mut self,
        config: &ContactConfig,
        delivery: &mut D,
    ) -> Result<(), ContactError> {
        let message = self.begin_submit(config)?;
        let result = delivery.deliver(&message).map_err(ContactError::Delivery);
        self.finish_submit(result.clone());
        result
    }

    /// Advance the confirmation timer. Returns `true` when the form resets.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if self.phase != FormPhase::Submitted {
            return false;
        }
        self.confirmation_left = self.confirmation_left.saturating_sub(dt);
        if !self.confirmation_left.is_zero() {
            return false;
        }
        self.name.clear();
        self.email.clear();
        self.message.clear();
        self.phase = FormPhase::Idle;
        true
    }
}
