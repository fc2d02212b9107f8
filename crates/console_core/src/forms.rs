//! Validated inputs for complaint decisions and reason prompts.

use std::{fmt, mem};

use shared::{domain::ComplaintAction, protocol::ComplaintDecisionRequest};

use crate::error::ValidationError;

/// A trimmed, non-empty reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reason(String);

impl Reason {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingReason);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parses a refund field as typed by an operator. Blank means zero; the sign is
/// kept so negative amounts can be reported as such.
pub fn parse_refund_input(raw: &str) -> Result<i64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidRefund(trimmed.to_string()))
}

fn refund_amount(value: i64) -> Result<u64, ValidationError> {
    u64::try_from(value).map_err(|_| ValidationError::NegativeRefund)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptDraft {
    pub reason: String,
    pub user_refund_money: i64,
    pub astro_refund_money: i64,
}

impl AcceptDraft {
    pub fn from_inputs(
        reason: impl Into<String>,
        user_refund: &str,
        astro_refund: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            reason: reason.into(),
            user_refund_money: parse_refund_input(user_refund)?,
            astro_refund_money: parse_refund_input(astro_refund)?,
        })
    }

    pub fn validate(&self) -> Result<ComplaintDecisionRequest, ValidationError> {
        let user_refund_money = refund_amount(self.user_refund_money)?;
        let astro_refund_money = refund_amount(self.astro_refund_money)?;
        let reason = Reason::parse(&self.reason)?;
        Ok(ComplaintDecisionRequest {
            action: ComplaintAction::Accept,
            reason: reason.into_inner(),
            user_refund_money,
            astro_refund_money,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RejectDraft {
    pub reason: String,
}

impl RejectDraft {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Rejections never carry refunds.
    pub fn validate(&self) -> Result<ComplaintDecisionRequest, ValidationError> {
        let reason = Reason::parse(&self.reason)?;
        Ok(ComplaintDecisionRequest {
            action: ComplaintAction::Reject,
            reason: reason.into_inner(),
            user_refund_money: 0,
            astro_refund_money: 0,
        })
    }
}

/// Modal prompt collecting a reason for an action on `target`.
///
/// `Hidden -> Editing -> Submitting -> Hidden`, or back to `Editing` with the
/// error shown when the submission fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReasonForm<T> {
    Hidden,
    Editing {
        target: T,
        draft: String,
        error: Option<String>,
    },
    Submitting {
        target: T,
        reason: Reason,
    },
}

impl<T> Default for ReasonForm<T> {
    fn default() -> Self {
        Self::Hidden
    }
}

impl<T: Clone> ReasonForm<T> {
    pub fn open(&mut self, target: T) {
        *self = Self::Editing {
            target,
            draft: String::new(),
            error: None,
        };
    }

    pub fn edit(&mut self, text: impl Into<String>) {
        if let Self::Editing { draft, error, .. } = self {
            *draft = text.into();
            *error = None;
        }
    }

    pub fn target(&self) -> Option<&T> {
        match self {
            Self::Hidden => None,
            Self::Editing { target, .. } | Self::Submitting { target, .. } => Some(target),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Editing { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting { .. })
    }

    pub fn can_submit(&self) -> bool {
        matches!(self, Self::Editing { draft, .. } if !draft.trim().is_empty())
    }

    /// Validates the draft and moves to `Submitting`. A blank draft keeps the
    /// form open with the validation message attached.
    pub fn submit(&mut self) -> Result<(T, Reason), ValidationError> {
        let Self::Editing { target, draft, error } = self else {
            return Err(ValidationError::FormNotOpen);
        };
        match Reason::parse(draft) {
            Ok(reason) => {
                let target = target.clone();
                *self = Self::Submitting {
                    target: target.clone(),
                    reason: reason.clone(),
                };
                Ok((target, reason))
            }
            Err(err) => {
                *error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Closes the form on success; on failure reopens it with the typed reason.
    pub fn complete(&mut self, failure: Option<String>) {
        match mem::take(self) {
            Self::Submitting { target, reason } if failure.is_some() => {
                *self = Self::Editing {
                    target,
                    draft: reason.into_inner(),
                    error: failure,
                };
            }
            Self::Submitting { .. } | Self::Hidden => {}
            other @ Self::Editing { .. } => *self = other,
        }
    }

    /// Dismisses the prompt. Returns `false` while a submission is pending.
    pub fn cancel(&mut self) -> bool {
        if self.is_submitting() {
            return false;
        }
        *self = Self::Hidden;
        true
    }
}

#[cfg(test)]
#[path = "tests/forms_tests.rs"]
mod tests;
