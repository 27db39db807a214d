//! Subscription status state machine.
//!
//! Mirrors the processor-side subscription lifecycle. Status moves only when
//! an authoritative webhook says so; the only structural rule enforced here
//! is that terminal states never move again.

use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};
use serde::{Deserialize, Serialize};

/// Locally mirrored subscription status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Mandate authorized, first charge not yet confirmed.
    Authenticated,

    /// Billing normally.
    Active,

    /// A charge failed and the processor is retrying.
    Pending,

    /// Retries exhausted. Billing stopped until the customer intervenes.
    Halted,

    /// Billing suspended on request.
    Paused,

    /// Ended by request. Terminal.
    Cancelled,

    /// All billing cycles consumed. Terminal.
    Completed,

    /// Ran past its end date without completing. Terminal.
    Expired,
}

impl SubscriptionStatus {
    pub const ALL: [SubscriptionStatus; 8] = [
        Self::Authenticated,
        Self::Active,
        Self::Pending,
        Self::Halted,
        Self::Paused,
        Self::Cancelled,
        Self::Completed,
        Self::Expired,
    ];

    /// Storage name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authenticated => "authenticated",
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Halted => "halted",
            Self::Paused => "paused",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                ValidationError::invalid_format("status", format!("unknown status '{}'", s))
            })
    }
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Cancelled | Completed | Expired => vec![],
            Authenticated | Active | Pending | Halted | Paused => Self::ALL.to_vec(),
        }
    }
}
