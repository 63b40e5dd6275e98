//! Application shell: owns all state, pumps backend events, and lays out
//! the map, side panels, and form modals.

use std::collections::HashMap;

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{FoundReport, LostReport, LostReportId};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{classify_submission_failure, err_label, PhotoImage, UiEvent};
use crate::controller::filter::{filter_reports, FilterCriteria};
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::reducer::{ActivePanel, Effect, InteractionState, Placement};
use crate::map::{MapResponse, MapView, MarkerId};
use crate::ui::forms::{
    self, ConvertFormDraft, FormAction, FoundFormDraft, LocalPhotoCache, LostFormDraft,
};
use crate::ui::panels::{self, FilterDraft, SidebarAction};

/// Asynchronously loaded candidate matches for one lost report.
pub enum MatchesState {
    Loading,
    Ready(Vec<FoundReport>),
    Error(String),
}

pub enum PhotoDisplay {
    Loading,
    Failed,
    Ready(egui::TextureHandle, egui::Vec2),
}

enum PhotoState {
    Loading,
    Ready {
        image: PhotoImage,
        texture: Option<egui::TextureHandle>,
    },
    Failed,
}

/// Backend photo states keyed by their backend-relative path. Fetches are
/// requested lazily the first time a panel asks for a path; textures are
/// uploaded on first display.
#[derive(Default)]
pub struct PhotoLibrary {
    states: HashMap<String, PhotoState>,
    requests: Vec<String>,
}

impl PhotoLibrary {
    pub fn display(&mut self, ctx: &egui::Context, path: &str) -> PhotoDisplay {
        if !self.states.contains_key(path) {
            self.states.insert(path.to_string(), PhotoState::Loading);
            self.requests.push(path.to_string());
            return PhotoDisplay::Loading;
        }
        let Some(state) = self.states.get_mut(path) else {
            return PhotoDisplay::Loading;
        };
        match state {
            PhotoState::Loading => PhotoDisplay::Loading,
            PhotoState::Failed => PhotoDisplay::Failed,
            PhotoState::Ready { image, texture } => {
                if texture.is_none() {
                    let color_image = egui::ColorImage::from_rgba_unmultiplied(
                        [image.width, image.height],
                        &image.rgba,
                    );
                    *texture = Some(ctx.load_texture(
                        format!("report-photo:{path}"),
                        color_image,
                        egui::TextureOptions::LINEAR,
                    ));
                }
                match texture {
                    Some(handle) => PhotoDisplay::Ready(
                        handle.clone(),
                        egui::vec2(image.width as f32, image.height as f32),
                    ),
                    None => PhotoDisplay::Loading,
                }
            }
        }
    }

    fn insert_loaded(&mut self, path: String, image: PhotoImage) {
        self.states.insert(
            path,
            PhotoState::Ready {
                image,
                texture: None,
            },
        );
    }

    fn insert_failed(&mut self, path: String) {
        self.states.insert(path, PhotoState::Failed);
    }

    fn drain_requests(&mut self) -> Vec<String> {
        std::mem::take(&mut self.requests)
    }
}

#[derive(Clone)]
struct StatusBanner {
    message: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum NoticeKind {
    Success,
    Failure,
}

/// Blocking notice shown after a submission, before the success flow runs.
#[derive(Clone)]
struct Notice {
    kind: NoticeKind,
    title: String,
    message: String,
}

pub struct PetMapApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    lost_reports: Vec<LostReport>,
    found_reports: Vec<FoundReport>,
    loading_reports: bool,

    criteria: FilterCriteria,
    filter_draft: FilterDraft,

    interaction: InteractionState,
    map: MapView,

    photos: PhotoLibrary,
    matches: HashMap<LostReportId, MatchesState>,
    carousel_index: usize,

    lost_form: LostFormDraft,
    found_form: FoundFormDraft,
    convert_form: ConvertFormDraft,
    local_previews: LocalPhotoCache,

    notice: Option<Notice>,
    status: String,
    status_banner: Option<StatusBanner>,
}

impl PetMapApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            lost_reports: Vec::new(),
            found_reports: Vec::new(),
            loading_reports: false,
            criteria: FilterCriteria::default(),
            filter_draft: FilterDraft::default(),
            interaction: InteractionState::default(),
            map: MapView::new(),
            photos: PhotoLibrary::default(),
            matches: HashMap::new(),
            carousel_index: 0,
            lost_form: LostFormDraft::default(),
            found_form: FoundFormDraft::default(),
            convert_form: ConvertFormDraft::default(),
            local_previews: LocalPhotoCache::default(),
            notice: None,
            status: "Starting".to_string(),
            status_banner: None,
        };
        app.refresh_reports();
        app
    }

    fn refresh_reports(&mut self) {
        self.loading_reports = true;
        dispatch_backend_command(&self.cmd_tx, BackendCommand::RefreshReports, &mut self.status);
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::ReportsLoaded { lost, found } => {
                    self.loading_reports = false;
                    self.status = format!(
                        "{} lost / {} found reports loaded",
                        lost.len(),
                        found.len()
                    );
                    self.lost_reports = lost;
                    self.found_reports = found;
                }
                UiEvent::ReportsLoadFailed { reason } => {
                    self.loading_reports = false;
                    self.status = "Report refresh failed".to_string();
                    self.status_banner = Some(StatusBanner {
                        message: format!(
                            "Could not refresh reports: {reason}. Showing the last loaded data."
                        ),
                    });
                }
                UiEvent::MatchesLoaded { lost_id, matches } => {
                    self.matches.insert(lost_id, MatchesState::Ready(matches));
                }
                UiEvent::MatchesLoadFailed { lost_id, reason } => {
                    self.matches.insert(lost_id, MatchesState::Error(reason));
                }
                UiEvent::PhotoLoaded { path, image } => {
                    self.photos.insert_loaded(path, image);
                }
                UiEvent::PhotoLoadFailed { path, reason } => {
                    tracing::debug!(%path, %reason, "photo load failed");
                    self.photos.insert_failed(path);
                }
                UiEvent::SubmitSucceeded { kind } => {
                    self.clear_submitting_flags();
                    self.notice = Some(Notice {
                        kind: NoticeKind::Success,
                        title: "Report submitted".to_string(),
                        message: format!("Your {} was submitted successfully.", kind.label()),
                    });
                }
                UiEvent::SubmitFailed { kind: _, error } => {
                    tracing::warn!(context = ?error.context(), "submission failed: {}", error.message());
                    self.clear_submitting_flags();
                    self.status = format!("{} error during submission", err_label(error.category()));
                    self.notice = Some(Notice {
                        kind: NoticeKind::Failure,
                        title: "Submission failed".to_string(),
                        message: classify_submission_failure(error.message()),
                    });
                }
            }
        }
    }

    fn clear_submitting_flags(&mut self) {
        self.lost_form.submitting = false;
        self.found_form.submitting = false;
        self.convert_form.submitting = false;
    }

    fn reset_forms(&mut self) {
        self.lost_form.reset();
        self.found_form.reset();
        self.convert_form.reset();
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::RemoveTempMarker => self.map.remove_temp_marker(),
                Effect::ClearMarkerSelection => self.map.clear_selection(),
                Effect::FlyTo(coordinate) => self.map.fly_to(coordinate),
                Effect::RefreshReports => self.refresh_reports(),
            }
        }
    }

    fn request_matches(&mut self, report: &LostReport) {
        let Some(ids) = report
            .candidate_matches
            .clone()
            .filter(|ids| !ids.is_empty())
        else {
            return;
        };
        if self.matches.contains_key(&report.id) {
            return;
        }
        self.matches.insert(report.id.clone(), MatchesState::Loading);
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::FetchMatches {
                lost_id: report.id.clone(),
                candidate_ids: ids,
            },
            &mut self.status,
        );
    }

    fn handle_map_response(&mut self, response: MapResponse) {
        if let Some(marker) = response.clicked_marker {
            match marker {
                MarkerId::Lost(id) => {
                    let report = self.lost_reports.iter().find(|r| r.id == id).cloned();
                    if let Some(report) = report {
                        self.carousel_index = 0;
                        self.request_matches(&report);
                        let effects = self.interaction.lost_marker_clicked(report);
                        self.apply_effects(effects);
                    }
                }
                MarkerId::Found(id) => {
                    let report = self.found_reports.iter().find(|r| r.id == id).cloned();
                    if let Some(report) = report {
                        let effects = self.interaction.found_marker_clicked(report);
                        self.apply_effects(effects);
                    }
                }
            }
        }

        if let Some(coordinate) = response.placed_coordinate {
            let effects = self.interaction.marker_placed(coordinate);
            self.apply_effects(effects);
        }

        if response.fly_completed {
            let effects = self.interaction.fly_completed(&self.found_reports);
            self.apply_effects(effects);
        }
    }

    fn handle_form_action(&mut self, action: FormAction) {
        match action {
            FormAction::Close => {
                let effects = self.interaction.close_panel();
                self.apply_effects(effects);
                self.reset_forms();
            }
            FormAction::PickLocation => {
                let effects = self.interaction.pick_location_on_map();
                self.apply_effects(effects);
            }
            FormAction::SubmitLost(draft) => {
                dispatch_backend_command(
                    &self.cmd_tx,
                    BackendCommand::SubmitLostReport { draft },
                    &mut self.status,
                );
            }
            FormAction::SubmitFound(draft) => {
                dispatch_backend_command(
                    &self.cmd_tx,
                    BackendCommand::SubmitFoundReport { draft },
                    &mut self.status,
                );
            }
            FormAction::SubmitConvert(lost_id, draft) => {
                dispatch_backend_command(
                    &self.cmd_tx,
                    BackendCommand::SubmitFoundFromLost { lost_id, draft },
                    &mut self.status,
                );
            }
        }
    }

    fn handle_sidebar_action(&mut self, action: SidebarAction) {
        match action {
            SidebarAction::Close => {
                let effects = self.interaction.close_panel();
                self.apply_effects(effects);
            }
            SidebarAction::FoundThisPet => {
                self.convert_form.reset();
                let effects = self.interaction.found_this_pet();
                self.apply_effects(effects);
            }
            SidebarAction::MatchClicked(report) => {
                let effects = self.interaction.match_selected(&report);
                self.apply_effects(effects);
            }
        }
    }

    fn show_top_bar(&mut self, ui: &mut egui::Ui) {
        ui.add_space(4.0);
        ui.horizontal_wrapped(|ui| {
            ui.label(egui::RichText::new("🐾 Lost Pets Map").heading());
            ui.separator();

            let lost_armed = matches!(self.interaction.placing, Some(Placement::Lost));
            let found_armed = matches!(self.interaction.placing, Some(Placement::Found));
            let any_armed = self.interaction.placing.is_some();

            let lost_label = if lost_armed {
                "Click on the map…"
            } else {
                "Report lost pet"
            };
            if ui
                .add_enabled(!any_armed, egui::Button::new(lost_label))
                .clicked()
            {
                self.lost_form.reset();
                let effects = self.interaction.start_lost_placement();
                self.apply_effects(effects);
            }

            let found_label = if found_armed {
                "Click on the map…"
            } else {
                "Report found pet"
            };
            if ui
                .add_enabled(!any_armed, egui::Button::new(found_label))
                .clicked()
            {
                self.found_form.reset();
                let effects = self.interaction.start_found_placement();
                self.apply_effects(effects);
            }

            if self.loading_reports {
                ui.spinner();
                ui.weak("Loading reports…");
            }
        });

        panels::filter_bar(ui, &mut self.criteria, &mut self.filter_draft);
        self.show_status_banner(ui);
        ui.add_space(4.0);
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            egui::Frame::NONE
                .fill(egui::Color32::from_rgb(111, 53, 53))
                .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.status_banner = None;
                            }
                        });
                    });
                });
        }
    }

    fn show_panels(&mut self, ctx: &egui::Context) {
        let panel = self.interaction.panel.clone();
        match panel {
            ActivePanel::LostSidebar(report) => {
                let actions = panels::lost_sidebar(
                    ctx,
                    &report,
                    &mut self.carousel_index,
                    &mut self.photos,
                    self.matches.get(&report.id),
                    &mut self.status,
                );
                for action in actions {
                    self.handle_sidebar_action(action);
                }
            }
            ActivePanel::FoundSidebar(report) => {
                let actions =
                    panels::found_sidebar(ctx, &report, &mut self.photos, &mut self.status);
                for action in actions {
                    self.handle_sidebar_action(action);
                }
            }
            _ => {}
        }
    }

    fn show_modals(&mut self, ctx: &egui::Context) {
        let panel = self.interaction.panel.clone();
        let action = match panel {
            ActivePanel::LostModal(coordinate) => {
                forms::lost_modal(ctx, &mut self.lost_form, coordinate, &mut self.local_previews)
            }
            ActivePanel::FoundModal(coordinate) => forms::found_modal(
                ctx,
                &mut self.found_form,
                coordinate,
                &mut self.local_previews,
            ),
            ActivePanel::ConvertModal { source, coordinate } => forms::convert_modal(
                ctx,
                &mut self.convert_form,
                &source,
                coordinate,
                &mut self.local_previews,
                &mut self.photos,
            ),
            _ => None,
        };
        if let Some(action) = action {
            self.handle_form_action(action);
        }
    }

    fn show_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.notice.clone() else {
            return;
        };
        let mut dismissed = false;
        let modal = egui::Modal::new(egui::Id::new("submission_notice")).show(ctx, |ui| {
            ui.set_min_width(280.0);
            ui.heading(&notice.title);
            ui.add_space(4.0);
            ui.label(&notice.message);
            ui.add_space(8.0);
            ui.vertical_centered(|ui| {
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        });
        if modal.should_close() {
            dismissed = true;
        }
        if dismissed {
            self.notice = None;
            if notice.kind == NoticeKind::Success {
                let effects = self.interaction.submission_succeeded();
                self.apply_effects(effects);
                self.reset_forms();
            }
        }
    }
}

impl eframe::App for PetMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            self.show_top_bar(ui);
        });
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.small(&self.status);
        });

        self.show_panels(ctx);

        // Keep the widget's placing flag in lockstep with the controller;
        // the widget clears its own flag when a placement click lands.
        if self.interaction.placing.is_some() != self.map.placement_armed() {
            if self.interaction.placing.is_some() {
                self.map.arm_placement();
            } else {
                self.map.disarm_placement();
            }
        }

        let map_response = egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let (filtered_lost, filtered_found) =
                    filter_reports(&self.lost_reports, &self.found_reports, &self.criteria);
                self.map.show(ui, &filtered_lost, &filtered_found)
            })
            .inner;
        self.handle_map_response(map_response);

        self.show_modals(ctx);
        self.show_notice(ctx);

        let pending = self.photos.drain_requests();
        for path in pending {
            dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::FetchPhoto { path },
                &mut self.status,
            );
        }

        // Backend events arrive on a plain channel; poll for them even when
        // no input is coming in.
        ctx.request_repaint_after(std::time::Duration::from_millis(200));
    }
}
