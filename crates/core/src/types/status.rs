//! Status enums for platform records.

use serde::{Deserialize, Serialize};

/// Callback request status.
///
/// The platform only ever writes `Completed`; anything else is still waiting
/// for a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CallbackStatus {
    Completed,
    #[default]
    #[serde(other)]
    Pending,
}

impl CallbackStatus {
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
        }
    }
}

/// Internship application status.
///
/// Missing or unknown values mean the application has not been reviewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InternshipStatus {
    #[serde(rename = "complete")]
    Selected,
    Rejected,
    #[default]
    #[serde(other)]
    Pending,
}

impl InternshipStatus {
    /// Selected applicants cannot be selected again; rejected ones can.
    #[must_use]
    pub const fn is_selected(self) -> bool {
        matches!(self, Self::Selected)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Selected => "Selected",
            Self::Rejected => "Rejected",
        }
    }
}
