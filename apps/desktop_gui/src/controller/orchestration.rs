//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) {
    let cmd_name = match &cmd {
        BackendCommand::RefreshReports => "refresh_reports",
        BackendCommand::FetchMatches { .. } => "fetch_matches",
        BackendCommand::FetchPhoto { .. } => "fetch_photo",
        BackendCommand::SubmitLostReport { .. } => "submit_lost_report",
        BackendCommand::SubmitFoundReport { .. } => "submit_found_report",
        BackendCommand::SubmitFoundFromLost { .. } => "submit_found_from_lost",
    };

    match cmd_tx.try_send(cmd) {
        Ok(()) => tracing::debug!(command = cmd_name, "queued ui->backend command"),
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
        }
        Err(TrySendError::Disconnected(_)) => {
            *status =
                "Backend worker disconnected (possible startup/runtime failure); restart the app"
                    .to_string();
        }
    }
}
