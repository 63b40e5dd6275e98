//! Backend worker: owns the tokio runtime and the HTTP client, drains the
//! UI command queue, and reports results back as events.

use std::thread;

use client_core::{ClientConfig, PetMapClient};
use crossbeam_channel::{Receiver, Sender};
use image::GenericImageView;
use tracing::{error, info, warn};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{PhotoImage, SubmissionKind, UiError, UiErrorContext, UiEvent};

/// Photos are downscaled in the worker so the UI thread only pays for a
/// texture upload.
const PHOTO_MAX_DIMENSION: f32 = 480.0;

pub fn launch(config: ClientConfig, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(err) => {
                error!(error = %err, "failed to build backend runtime");
                let _ = ui_tx.try_send(UiEvent::ReportsLoadFailed {
                    reason: format!("failed to build backend runtime: {err}"),
                });
                return;
            }
        };

        runtime.block_on(async move {
            let client = match PetMapClient::new(config) {
                Ok(client) => client,
                Err(err) => {
                    error!(error = %err, "backend worker startup failure");
                    let _ = ui_tx.try_send(UiEvent::ReportsLoadFailed {
                        reason: format!("backend worker startup failure: {err}"),
                    });
                    return;
                }
            };
            info!(server_url = %client.base_url(), "backend worker ready");

            while let Ok(cmd) = cmd_rx.recv() {
                handle_command(&client, &ui_tx, cmd).await;
            }
            info!("backend command queue closed; worker exiting");
        });
    });
}

async fn handle_command(client: &PetMapClient, ui_tx: &Sender<UiEvent>, cmd: BackendCommand) {
    match cmd {
        BackendCommand::RefreshReports => match client.fetch_reports().await {
            Ok((lost, found)) => {
                let _ = ui_tx.try_send(UiEvent::ReportsLoaded { lost, found });
            }
            Err(err) => {
                warn!(error = %err, "report refresh failed; keeping previous data");
                let _ = ui_tx.try_send(UiEvent::ReportsLoadFailed {
                    reason: err.to_string(),
                });
            }
        },
        BackendCommand::FetchMatches {
            lost_id,
            candidate_ids,
        } => match client.fetch_matches(&candidate_ids).await {
            Ok(matches) => {
                let _ = ui_tx.try_send(UiEvent::MatchesLoaded { lost_id, matches });
            }
            Err(err) => {
                warn!(lost_id = %lost_id, error = %err, "candidate match batch failed");
                let _ = ui_tx.try_send(UiEvent::MatchesLoadFailed {
                    lost_id,
                    reason: err.to_string(),
                });
            }
        },
        BackendCommand::FetchPhoto { path } => match client.download_photo(&path).await {
            Ok(bytes) => match decode_photo(&bytes) {
                Ok(image) => {
                    let _ = ui_tx.try_send(UiEvent::PhotoLoaded { path, image });
                }
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::PhotoLoadFailed {
                        path,
                        reason: format!("failed to decode photo: {err}"),
                    });
                }
            },
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::PhotoLoadFailed {
                    path,
                    reason: format!("failed to download photo: {err}"),
                });
            }
        },
        BackendCommand::SubmitLostReport { draft } => {
            submit(ui_tx, SubmissionKind::Lost, client.create_lost_report(&draft).await);
        }
        BackendCommand::SubmitFoundReport { draft } => {
            submit(
                ui_tx,
                SubmissionKind::Found,
                client.create_found_report(&draft).await,
            );
        }
        BackendCommand::SubmitFoundFromLost { lost_id, draft } => {
            submit(
                ui_tx,
                SubmissionKind::FoundFromLost,
                client.create_found_from_lost(&lost_id, &draft).await,
            );
        }
    }
}

fn submit<T>(ui_tx: &Sender<UiEvent>, kind: SubmissionKind, outcome: anyhow::Result<T>) {
    match outcome {
        Ok(_) => {
            let _ = ui_tx.try_send(UiEvent::SubmitSucceeded { kind });
        }
        Err(err) => {
            warn!(error = %err, "report submission failed");
            let _ = ui_tx.try_send(UiEvent::SubmitFailed {
                kind,
                error: UiError::from_message(UiErrorContext::Submission, err.to_string()),
            });
        }
    }
}

fn decode_photo(bytes: &[u8]) -> anyhow::Result<PhotoImage> {
    let decoded = image::load_from_memory(bytes)?;
    let (orig_w, orig_h) = decoded.dimensions();
    let scale = (PHOTO_MAX_DIMENSION / (orig_w.max(orig_h) as f32)).min(1.0);
    let resized = if scale < 1.0 {
        decoded.resize(
            (orig_w as f32 * scale).max(1.0) as u32,
            (orig_h as f32 * scale).max(1.0) as u32,
            image::imageops::FilterType::Triangle,
        )
    } else {
        decoded
    };
    let rgba = resized.to_rgba8();
    Ok(PhotoImage {
        width: rgba.width() as usize,
        height: rgba.height() as usize,
        rgba: rgba.into_raw(),
    })
}
