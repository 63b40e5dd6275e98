//! UI/backend events and error modeling for the desktop controller.

use shared::domain::{FoundReport, LostReport, LostReportId};

/// RGBA photo decoded and downscaled by the backend worker; the UI thread
/// only uploads textures.
#[derive(Clone)]
pub struct PhotoImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    Lost,
    Found,
    FoundFromLost,
}

impl SubmissionKind {
    pub fn label(self) -> &'static str {
        match self {
            SubmissionKind::Lost => "lost-pet report",
            SubmissionKind::Found | SubmissionKind::FoundFromLost => "found-pet report",
        }
    }
}

pub enum UiEvent {
    /// Both listings arrived; replaces the two arrays atomically.
    ReportsLoaded {
        lost: Vec<LostReport>,
        found: Vec<FoundReport>,
    },
    /// Either listing failed; previous data stays visible.
    ReportsLoadFailed {
        reason: String,
    },
    MatchesLoaded {
        lost_id: LostReportId,
        matches: Vec<FoundReport>,
    },
    MatchesLoadFailed {
        lost_id: LostReportId,
        reason: String,
    },
    PhotoLoaded {
        path: String,
        image: PhotoImage,
    },
    PhotoLoadFailed {
        path: String,
        reason: String,
    },
    SubmitSucceeded {
        kind: SubmissionKind,
    },
    SubmitFailed {
        kind: SubmissionKind,
        error: UiError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Validation,
    NotFound,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    Submission,
    General,
}

pub fn classify_submission_failure(message: &str) -> String {
    let lower = message.to_ascii_lowercase();
    if lower.contains("failed to connect")
        || lower.contains("connection refused")
        || lower.contains("dns")
        || lower.contains("timed out")
    {
        "Server unreachable; check the server URL/network and resubmit.".to_string()
    } else {
        format!("Submission error: {message}")
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("404")
            || message_lower.contains("not_found")
            || message_lower.contains("not found")
            || message_lower.contains("no such")
        {
            UiErrorCategory::NotFound
        } else if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("required")
            || message_lower.contains("validation")
            || message_lower.contains("at most")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("dns")
            || message_lower.contains("unavailable")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::NotFound => "Not found",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_refused_connections_as_transport() {
        let err = UiError::from_message(
            UiErrorContext::Submission,
            "error sending request: connection refused",
        );
        assert_eq!(err.category(), UiErrorCategory::Transport);
    }

    #[test]
    fn classifies_photo_cap_violations_as_validation() {
        let err = UiError::from_message(
            UiErrorContext::Submission,
            "a lost report can carry at most 5 photos, got 6",
        );
        assert_eq!(err.category(), UiErrorCategory::Validation);
    }

    #[test]
    fn submission_failure_message_names_unreachable_servers() {
        let friendly = classify_submission_failure("tcp connect error: connection refused");
        assert!(friendly.contains("Server unreachable"));
    }
}
