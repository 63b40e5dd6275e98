//! Read-only report sidebars, candidate-match cards, and the filter bar.

use arboard::Clipboard;
use chrono::NaiveDate;
use eframe::egui;
use shared::domain::{calendar_date, FoundReport, LostReport, PetCategory};

use crate::controller::filter::{FilterCriteria, ReportKind};
use crate::ui::app::{MatchesState, PhotoDisplay, PhotoLibrary};

const SIDEBAR_WIDTH: f32 = 340.0;
const SIDEBAR_PHOTO_WIDTH: f32 = 300.0;
const MATCH_THUMB_HEIGHT: f32 = 56.0;

pub enum SidebarAction {
    Close,
    FoundThisPet,
    MatchClicked(FoundReport),
}

/// Raw text of the two date filter inputs; parsed on every change, and a
/// value that does not parse simply leaves that bound unset.
#[derive(Default)]
pub struct FilterDraft {
    pub start_text: String,
    pub end_text: String,
}

fn parse_bound(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    calendar_date::parse(trimmed).ok()
}

pub fn filter_bar(ui: &mut egui::Ui, criteria: &mut FilterCriteria, draft: &mut FilterDraft) {
    ui.horizontal_wrapped(|ui| {
        ui.label(egui::RichText::new("Filters").strong());

        egui::ComboBox::from_id_salt("filter_report_kind")
            .selected_text(criteria.kind.label())
            .show_ui(ui, |ui| {
                for kind in ReportKind::ALL {
                    ui.selectable_value(&mut criteria.kind, kind, kind.label());
                }
            });

        egui::ComboBox::from_id_salt("filter_category")
            .selected_text(criteria.category.map(PetCategory::label).unwrap_or("Any category"))
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut criteria.category, None, "Any category");
                for category in PetCategory::ALL {
                    ui.selectable_value(&mut criteria.category, Some(category), category.label());
                }
            });

        ui.label("From");
        let start_resp = ui.add(
            egui::TextEdit::singleline(&mut draft.start_text)
                .hint_text("YYYY-MM-DD")
                .desired_width(92.0),
        );
        if start_resp.changed() {
            criteria.start_date = parse_bound(&draft.start_text);
        }

        ui.label("to");
        let end_resp = ui.add(
            egui::TextEdit::singleline(&mut draft.end_text)
                .hint_text("YYYY-MM-DD")
                .desired_width(92.0),
        );
        if end_resp.changed() {
            criteria.end_date = parse_bound(&draft.end_text);
        }

        let clearable =
            !criteria.is_default() || !draft.start_text.is_empty() || !draft.end_text.is_empty();
        if ui.add_enabled(clearable, egui::Button::new("Clear")).clicked() {
            *criteria = FilterCriteria::default();
            draft.start_text.clear();
            draft.end_text.clear();
        }
    });
}

fn format_report_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn detail_row(ui: &mut egui::Ui, label: &str, value: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(label).strong());
        ui.label(value);
    });
}

fn copy_to_clipboard(text: &str, status: &mut String) {
    if let Ok(mut clipboard) = Clipboard::new() {
        if clipboard.set_text(text.to_string()).is_ok() {
            *status = "Contact copied to clipboard".to_string();
            return;
        }
    }
    *status = "Could not access the clipboard".to_string();
}

fn contact_row(ui: &mut egui::Ui, contact: &str, status: &mut String) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("Contact:").strong());
        ui.label(contact);
        if ui.small_button("📋").on_hover_text("Copy contact").clicked() {
            copy_to_clipboard(contact, status);
        }
    });
}

fn sidebar_photo(ui: &mut egui::Ui, photos: &mut PhotoLibrary, path: &str) {
    match photos.display(ui.ctx(), path) {
        PhotoDisplay::Ready(texture, size) => {
            let scale = (SIDEBAR_PHOTO_WIDTH / size.x).min(1.0);
            ui.image((texture.id(), size * scale));
        }
        PhotoDisplay::Loading => {
            ui.spinner();
        }
        PhotoDisplay::Failed => {
            ui.weak("Photo unavailable");
        }
    }
}

pub fn lost_sidebar(
    ctx: &egui::Context,
    report: &LostReport,
    carousel_index: &mut usize,
    photos: &mut PhotoLibrary,
    matches: Option<&MatchesState>,
    status: &mut String,
) -> Vec<SidebarAction> {
    let mut actions = Vec::new();

    egui::SidePanel::right("report_sidebar")
        .resizable(false)
        .exact_width(SIDEBAR_WIDTH)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(&report.name);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("✕").clicked() {
                        actions.push(SidebarAction::Close);
                    }
                });
            });
            ui.separator();

            egui::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
                if report.photos.is_empty() {
                    ui.weak("No photo available");
                } else {
                    let count = report.photos.len();
                    if *carousel_index >= count {
                        *carousel_index = 0;
                    }
                    sidebar_photo(ui, photos, &report.photos[*carousel_index]);
                    if count > 1 {
                        ui.horizontal(|ui| {
                            if ui.small_button("‹").clicked() {
                                // Wraps at both ends.
                                *carousel_index = (*carousel_index + count - 1) % count;
                            }
                            ui.label(format!("{} / {count}", *carousel_index + 1));
                            if ui.small_button("›").clicked() {
                                *carousel_index = (*carousel_index + 1) % count;
                            }
                        });
                    }
                }

                ui.add_space(8.0);
                detail_row(ui, "Category:", report.category.label());
                detail_row(ui, "Lost on:", &format_report_date(report.loss_date));
                detail_row(ui, "Location:", &report.location);
                contact_row(ui, &report.contact, status);
                if !report.description.is_empty() {
                    ui.label(egui::RichText::new("Description:").strong());
                    ui.label(&report.description);
                }

                ui.add_space(10.0);
                let found_button = egui::Button::new(
                    egui::RichText::new("I found this pet").strong(),
                )
                .fill(egui::Color32::from_rgb(46, 125, 90))
                .min_size(egui::vec2(ui.available_width(), 32.0));
                if ui.add(found_button).clicked() {
                    actions.push(SidebarAction::FoundThisPet);
                }

                ui.add_space(12.0);
                ui.separator();
                ui.label(egui::RichText::new("Possible matches").strong());
                match matches {
                    None => {
                        ui.weak("No candidate matches yet.");
                    }
                    Some(MatchesState::Loading) => {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.weak("Loading candidate matches…");
                        });
                    }
                    Some(MatchesState::Error(reason)) => {
                        ui.colored_label(
                            egui::Color32::from_rgb(235, 110, 110),
                            format!("Could not load matches: {reason}"),
                        );
                    }
                    Some(MatchesState::Ready(list)) if list.is_empty() => {
                        ui.weak("No candidate matches yet.");
                    }
                    Some(MatchesState::Ready(list)) => {
                        for candidate in list {
                            if match_card(ui, candidate, photos) {
                                actions.push(SidebarAction::MatchClicked(candidate.clone()));
                            }
                        }
                    }
                }
            });
        });

    actions
}

/// Clickable summary card for one candidate match.
fn match_card(ui: &mut egui::Ui, candidate: &FoundReport, photos: &mut PhotoLibrary) -> bool {
    let inner = egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.horizontal(|ui| {
            if let Some(path) = &candidate.photo {
                if let PhotoDisplay::Ready(texture, size) = photos.display(ui.ctx(), path) {
                    let scale = (MATCH_THUMB_HEIGHT / size.y).min(1.0);
                    ui.image((texture.id(), size * scale));
                }
            }
            ui.vertical(|ui| {
                ui.strong(format!("Found: {}", candidate.category.label()));
                ui.small(format_report_date(candidate.found_date));
                ui.small(&candidate.location);
            });
        });
    });
    inner
        .response
        .interact(egui::Sense::click())
        .on_hover_cursor(egui::CursorIcon::PointingHand)
        .clicked()
}

pub fn found_sidebar(
    ctx: &egui::Context,
    report: &FoundReport,
    photos: &mut PhotoLibrary,
    status: &mut String,
) -> Vec<SidebarAction> {
    let mut actions = Vec::new();

    egui::SidePanel::right("report_sidebar")
        .resizable(false)
        .exact_width(SIDEBAR_WIDTH)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Found pet");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("✕").clicked() {
                        actions.push(SidebarAction::Close);
                    }
                });
            });
            ui.separator();

            egui::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
                match &report.photo {
                    Some(path) => sidebar_photo(ui, photos, path),
                    None => {
                        ui.weak("No photo available");
                    }
                }

                ui.add_space(8.0);
                detail_row(ui, "Category:", report.category.label());
                detail_row(ui, "Found on:", &format_report_date(report.found_date));
                detail_row(ui, "Location:", &report.location);
                contact_row(ui, &report.contact, status);
                if let Some(description) = &report.description {
                    if !description.is_empty() {
                        ui.label(egui::RichText::new("Description:").strong());
                        ui.label(description);
                    }
                }

                if let Some(name) = &report.lost_pet_name {
                    ui.add_space(10.0);
                    ui.separator();
                    ui.label(egui::RichText::new("Originally reported lost").strong());
                    ui.label(format!("Name: {name}"));
                    if let Some(path) = report.lost_pet_photos.first() {
                        sidebar_photo(ui, photos, path);
                    }
                }
            });
        });

    actions
}
