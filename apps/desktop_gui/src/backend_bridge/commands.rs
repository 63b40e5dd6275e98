//! Backend commands queued from UI to backend worker.

use client_core::{NewFoundFromLost, NewFoundReport, NewLostReport};
use shared::domain::{FoundReportId, LostReportId};

pub enum BackendCommand {
    RefreshReports,
    FetchMatches {
        lost_id: LostReportId,
        candidate_ids: Vec<FoundReportId>,
    },
    FetchPhoto {
        /// Backend-relative photo path.
        path: String,
    },
    SubmitLostReport {
        draft: NewLostReport,
    },
    SubmitFoundReport {
        draft: NewFoundReport,
    },
    SubmitFoundFromLost {
        lost_id: LostReportId,
        draft: NewFoundFromLost,
    },
}
