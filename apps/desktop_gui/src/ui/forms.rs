//! Form modals for creating reports: lost, found, and lost-to-found
//! conversion. Validation is presence-only plus date sanity; everything
//! heavier is the backend's job.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{Local, NaiveDate};
use client_core::{NewFoundFromLost, NewFoundReport, NewLostReport, MAX_LOST_REPORT_PHOTOS};
use eframe::egui;
use image::GenericImageView;
use shared::domain::{calendar_date, Coordinate, LostReport, LostReportId, PetCategory};

use crate::ui::app::{PhotoDisplay, PhotoLibrary};

const LOCAL_PREVIEW_MAX_DIMENSION: f32 = 120.0;
const PHOTO_FILE_FILTER: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "bmp"];

pub enum FormAction {
    Close,
    PickLocation,
    SubmitLost(NewLostReport),
    SubmitFound(NewFoundReport),
    SubmitConvert(LostReportId, NewFoundFromLost),
}

#[derive(Default)]
pub struct LostFormDraft {
    pub name: String,
    pub category: Option<PetCategory>,
    pub contact: String,
    pub location: String,
    pub loss_date: String,
    pub description: String,
    pub photos: Vec<PathBuf>,
    pub error: Option<String>,
    pub submitting: bool,
}

impl LostFormDraft {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Default)]
pub struct FoundFormDraft {
    pub category: Option<PetCategory>,
    pub location: String,
    pub found_date: String,
    pub contact: String,
    pub description: String,
    pub photo: Option<PathBuf>,
    pub error: Option<String>,
    pub submitting: bool,
}

impl FoundFormDraft {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Default)]
pub struct ConvertFormDraft {
    pub location: String,
    pub found_date: String,
    pub contact: String,
    pub description: String,
    pub photo: Option<PathBuf>,
    pub error: Option<String>,
    pub submitting: bool,
}

impl ConvertFormDraft {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Preview cache for photos picked off the local filesystem, keyed by path
/// and mtime so re-picked files refresh.
#[derive(Default)]
pub struct LocalPhotoCache {
    cache: HashMap<(PathBuf, Option<SystemTime>), Option<(egui::TextureHandle, egui::Vec2)>>,
}

impl LocalPhotoCache {
    pub fn preview(
        &mut self,
        ctx: &egui::Context,
        path: &Path,
    ) -> Option<(egui::TextureHandle, egui::Vec2)> {
        let modified = std::fs::metadata(path).and_then(|meta| meta.modified()).ok();
        let key = (path.to_path_buf(), modified);
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }
        let loaded = load_local_preview(ctx, path);
        self.cache.insert(key, loaded.clone());
        loaded
    }
}

fn load_local_preview(
    ctx: &egui::Context,
    path: &Path,
) -> Option<(egui::TextureHandle, egui::Vec2)> {
    let bytes = std::fs::read(path).ok()?;
    let decoded = image::load_from_memory(&bytes).ok()?;
    let (orig_w, orig_h) = decoded.dimensions();
    let scale = (LOCAL_PREVIEW_MAX_DIMENSION / (orig_w.max(orig_h) as f32)).min(1.0);
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
    let size = [rgba.width() as usize, rgba.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
    let texture = ctx.load_texture(
        format!("local-photo:{}", path.display()),
        color_image,
        egui::TextureOptions::LINEAR,
    );
    Some((texture, egui::vec2(size[0] as f32, size[1] as f32)))
}

// ---------------------------------------------------------------------------
// Validation (pure, tested)
// ---------------------------------------------------------------------------

fn required(value: &str, label: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(format!("{label} is required"))
    } else {
        Ok(trimmed.to_string())
    }
}

fn parse_report_date(value: &str, label: &str) -> Result<NaiveDate, String> {
    let date = calendar_date::parse(value.trim())
        .map_err(|_| format!("{label} must be a YYYY-MM-DD date"))?;
    if date > Local::now().date_naive() {
        return Err(format!("{label} cannot be in the future"));
    }
    Ok(date)
}

pub fn validate_lost(draft: &LostFormDraft, coordinate: Coordinate) -> Result<NewLostReport, String> {
    let name = required(&draft.name, "Pet name")?;
    let category = draft.category.ok_or_else(|| "Category is required".to_string())?;
    let contact = required(&draft.contact, "Contact")?;
    let location = required(&draft.location, "Loss location")?;
    let loss_date = parse_report_date(&draft.loss_date, "Loss date")?;
    let description = required(&draft.description, "Description")?;
    if draft.photos.len() > MAX_LOST_REPORT_PHOTOS {
        return Err(format!("At most {MAX_LOST_REPORT_PHOTOS} photos are allowed"));
    }
    Ok(NewLostReport {
        name,
        category,
        contact,
        location,
        loss_date,
        description,
        coordinate,
        photos: draft.photos.clone(),
    })
}

pub fn validate_found(
    draft: &FoundFormDraft,
    coordinate: Coordinate,
) -> Result<NewFoundReport, String> {
    let category = draft.category.ok_or_else(|| "Category is required".to_string())?;
    let location = required(&draft.location, "Found location")?;
    let found_date = parse_report_date(&draft.found_date, "Found date")?;
    let contact = required(&draft.contact, "Contact")?;
    let photo = draft
        .photo
        .clone()
        .ok_or_else(|| "A photo of the found pet is required".to_string())?;
    Ok(NewFoundReport {
        category,
        location,
        found_date,
        contact,
        description: draft.description.trim().to_string(),
        coordinate,
        photo,
    })
}

pub fn validate_convert(
    draft: &ConvertFormDraft,
    coordinate: Option<Coordinate>,
) -> Result<NewFoundFromLost, String> {
    let coordinate = coordinate
        .ok_or_else(|| "Select the location where you found the pet on the map".to_string())?;
    let location = required(&draft.location, "Found location")?;
    let found_date = parse_report_date(&draft.found_date, "Found date")?;
    let contact = required(&draft.contact, "Contact")?;
    let photo = draft
        .photo
        .clone()
        .ok_or_else(|| "A photo of the found pet is required".to_string())?;
    Ok(NewFoundFromLost {
        location,
        found_date,
        contact,
        description: draft.description.trim().to_string(),
        coordinate,
        photo,
    })
}

// ---------------------------------------------------------------------------
// Widgets
// ---------------------------------------------------------------------------

fn modal_frame(ctx: &egui::Context) -> egui::Frame {
    egui::Frame::NONE
        .fill(ctx.style().visuals.window_fill)
        .stroke(egui::Stroke::new(
            1.0,
            ctx.style().visuals.window_stroke().color,
        ))
        .corner_radius(10.0)
        .inner_margin(egui::Margin::symmetric(16, 12))
}

fn modal_header(ui: &mut egui::Ui, title: &str) -> bool {
    let mut close_requested = false;
    ui.horizontal(|ui| {
        ui.heading(title);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("✕").clicked() {
                close_requested = true;
            }
        });
    });
    ui.separator();
    close_requested
}

fn labeled_field(ui: &mut egui::Ui, label: &str, hint: &str, value: &mut String) {
    ui.label(egui::RichText::new(label).strong());
    ui.add(
        egui::TextEdit::singleline(value)
            .hint_text(hint)
            .desired_width(f32::INFINITY),
    );
    ui.add_space(4.0);
}

fn category_combo(ui: &mut egui::Ui, id: &str, value: &mut Option<PetCategory>) {
    ui.label(egui::RichText::new("Category *").strong());
    egui::ComboBox::from_id_salt(id)
        .selected_text(value.map(PetCategory::label).unwrap_or("Select a category"))
        .show_ui(ui, |ui| {
            for category in PetCategory::ALL {
                ui.selectable_value(value, Some(category), category.label());
            }
        });
    ui.add_space(4.0);
}

fn description_field(ui: &mut egui::Ui, label: &str, hint: &str, value: &mut String) {
    ui.label(egui::RichText::new(label).strong());
    ui.add(
        egui::TextEdit::multiline(value)
            .hint_text(hint)
            .desired_rows(3)
            .desired_width(f32::INFINITY),
    );
    ui.add_space(4.0);
}

fn coordinate_readout(ui: &mut egui::Ui, coordinate: Coordinate) {
    ui.small(format!(
        "Coordinates: {:.6}, {:.6}",
        coordinate.lat, coordinate.lng
    ));
    ui.add_space(4.0);
}

fn validation_error(ui: &mut egui::Ui, error: &Option<String>) {
    if let Some(message) = error {
        ui.colored_label(egui::Color32::from_rgb(235, 110, 110), message);
        ui.add_space(4.0);
    }
}

fn submit_row(ui: &mut egui::Ui, submitting: bool) -> (bool, bool) {
    let mut cancel = false;
    let mut submit = false;
    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("Cancel").clicked() {
            cancel = true;
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let label = if submitting { "Submitting…" } else { "Submit report" };
            if ui.add_enabled(!submitting, egui::Button::new(label)).clicked() {
                submit = true;
            }
        });
    });
    (cancel, submit)
}

fn photo_thumbnail(
    ui: &mut egui::Ui,
    previews: &mut LocalPhotoCache,
    path: &Path,
) -> bool {
    let mut remove = false;
    ui.vertical(|ui| {
        match previews.preview(ui.ctx(), path) {
            Some((texture, size)) => {
                ui.image((texture.id(), size));
            }
            None => {
                ui.weak("preview unavailable");
            }
        }
        if ui.small_button("Remove").clicked() {
            remove = true;
        }
    });
    remove
}

pub fn lost_modal(
    ctx: &egui::Context,
    draft: &mut LostFormDraft,
    coordinate: Coordinate,
    previews: &mut LocalPhotoCache,
) -> Option<FormAction> {
    let mut action = None;
    egui::Window::new("lost_form_modal")
        .title_bar(false)
        .frame(modal_frame(ctx))
        .resizable(false)
        .default_width(400.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            if modal_header(ui, "Report a lost pet") {
                action = Some(FormAction::Close);
            }

            egui::ScrollArea::vertical().max_height(440.0).show(ui, |ui| {
                labeled_field(ui, "Pet name *", "e.g. Max", &mut draft.name);
                category_combo(ui, "lost_form_category", &mut draft.category);
                labeled_field(ui, "Contact *", "Phone or email", &mut draft.contact);
                labeled_field(
                    ui,
                    "Loss location *",
                    "e.g. Central Park, near the lake",
                    &mut draft.location,
                );
                coordinate_readout(ui, coordinate);
                labeled_field(ui, "Loss date *", "YYYY-MM-DD", &mut draft.loss_date);
                description_field(
                    ui,
                    "Description *",
                    "Color, size, distinguishing marks…",
                    &mut draft.description,
                );

                ui.label(egui::RichText::new(format!(
                    "Photos (up to {MAX_LOST_REPORT_PHOTOS})"
                ))
                .strong());
                let can_add = draft.photos.len() < MAX_LOST_REPORT_PHOTOS;
                if ui
                    .add_enabled(can_add, egui::Button::new("Add photos…"))
                    .clicked()
                {
                    if let Some(picked) = rfd::FileDialog::new()
                        .add_filter("Images", &PHOTO_FILE_FILTER)
                        .pick_files()
                    {
                        if draft.photos.len() + picked.len() > MAX_LOST_REPORT_PHOTOS {
                            draft.error = Some(format!(
                                "At most {MAX_LOST_REPORT_PHOTOS} photos are allowed"
                            ));
                        } else {
                            draft.photos.extend(picked);
                            draft.error = None;
                        }
                    }
                }
                if !draft.photos.is_empty() {
                    let mut remove_index = None;
                    ui.horizontal_wrapped(|ui| {
                        for (index, path) in draft.photos.iter().enumerate() {
                            if photo_thumbnail(ui, previews, path) {
                                remove_index = Some(index);
                            }
                        }
                    });
                    if let Some(index) = remove_index {
                        draft.photos.remove(index);
                    }
                }
            });

            validation_error(ui, &draft.error);
            let (cancel, submit) = submit_row(ui, draft.submitting);
            if cancel {
                action = Some(FormAction::Close);
            }
            if submit {
                match validate_lost(draft, coordinate) {
                    Ok(payload) => {
                        draft.error = None;
                        draft.submitting = true;
                        action = Some(FormAction::SubmitLost(payload));
                    }
                    Err(message) => draft.error = Some(message),
                }
            }
        });
    action
}

pub fn found_modal(
    ctx: &egui::Context,
    draft: &mut FoundFormDraft,
    coordinate: Coordinate,
    previews: &mut LocalPhotoCache,
) -> Option<FormAction> {
    let mut action = None;
    egui::Window::new("found_form_modal")
        .title_bar(false)
        .frame(modal_frame(ctx))
        .resizable(false)
        .default_width(400.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            if modal_header(ui, "Report a found pet") {
                action = Some(FormAction::Close);
            }

            egui::ScrollArea::vertical().max_height(440.0).show(ui, |ui| {
                category_combo(ui, "found_form_category", &mut draft.category);
                labeled_field(
                    ui,
                    "Found location *",
                    "e.g. Central Park, near the lake",
                    &mut draft.location,
                );
                coordinate_readout(ui, coordinate);
                labeled_field(ui, "Found date *", "YYYY-MM-DD", &mut draft.found_date);
                labeled_field(ui, "Contact *", "Phone or email", &mut draft.contact);
                description_field(
                    ui,
                    "Additional information",
                    "Condition of the pet, exact spot…",
                    &mut draft.description,
                );
                single_photo_picker(ui, "Photo of the found pet *", &mut draft.photo, previews);
            });

            validation_error(ui, &draft.error);
            let (cancel, submit) = submit_row(ui, draft.submitting);
            if cancel {
                action = Some(FormAction::Close);
            }
            if submit {
                match validate_found(draft, coordinate) {
                    Ok(payload) => {
                        draft.error = None;
                        draft.submitting = true;
                        action = Some(FormAction::SubmitFound(payload));
                    }
                    Err(message) => draft.error = Some(message),
                }
            }
        });
    action
}

pub fn convert_modal(
    ctx: &egui::Context,
    draft: &mut ConvertFormDraft,
    source: &LostReport,
    coordinate: Option<Coordinate>,
    previews: &mut LocalPhotoCache,
    photos: &mut PhotoLibrary,
) -> Option<FormAction> {
    let mut action = None;
    egui::Window::new("found_from_lost_modal")
        .title_bar(false)
        .frame(modal_frame(ctx))
        .resizable(false)
        .default_width(400.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            if modal_header(ui, "I found this pet!") {
                action = Some(FormAction::Close);
            }

            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    if let Some(path) = source.photos.first() {
                        if let PhotoDisplay::Ready(texture, size) = photos.display(ui.ctx(), path)
                        {
                            let scale = (56.0 / size.y).min(1.0);
                            ui.image((texture.id(), size * scale));
                        }
                    }
                    ui.vertical(|ui| {
                        ui.strong(format!("Lost pet: {}", source.name));
                        ui.small(format!("Category: {}", source.category.label()));
                    });
                });
            });
            ui.add_space(6.0);

            egui::ScrollArea::vertical().max_height(400.0).show(ui, |ui| {
                ui.label(egui::RichText::new("Where you found it *").strong());
                let location_label = match coordinate {
                    Some(coordinate) => format!(
                        "Location selected: {:.6}, {:.6}",
                        coordinate.lat, coordinate.lng
                    ),
                    None => "Select on the map".to_string(),
                };
                if ui.button(location_label).clicked() {
                    action = Some(FormAction::PickLocation);
                }
                ui.add_space(4.0);
                labeled_field(
                    ui,
                    "Found location *",
                    "e.g. Central Park, near the lake",
                    &mut draft.location,
                );
                labeled_field(ui, "Found date *", "YYYY-MM-DD", &mut draft.found_date);
                labeled_field(ui, "Your contact *", "Phone or email", &mut draft.contact);
                description_field(
                    ui,
                    "Additional information",
                    "Anything else we should know?",
                    &mut draft.description,
                );
                single_photo_picker(ui, "Photo of the found pet *", &mut draft.photo, previews);
            });

            validation_error(ui, &draft.error);
            let (cancel, submit) = submit_row(ui, draft.submitting);
            if cancel {
                action = Some(FormAction::Close);
            }
            if submit {
                match validate_convert(draft, coordinate) {
                    Ok(payload) => {
                        draft.error = None;
                        draft.submitting = true;
                        action = Some(FormAction::SubmitConvert(source.id.clone(), payload));
                    }
                    Err(message) => draft.error = Some(message),
                }
            }
        });
    action
}

fn single_photo_picker(
    ui: &mut egui::Ui,
    label: &str,
    photo: &mut Option<PathBuf>,
    previews: &mut LocalPhotoCache,
) {
    ui.label(egui::RichText::new(label).strong());
    if ui.button("Choose photo…").clicked() {
        if let Some(picked) = rfd::FileDialog::new()
            .add_filter("Images", &PHOTO_FILE_FILTER)
            .pick_file()
        {
            *photo = Some(picked);
        }
    }
    let mut remove = false;
    if let Some(path) = photo.as_deref() {
        remove = photo_thumbnail(ui, previews, path);
    }
    if remove {
        *photo = None;
    }
    ui.add_space(4.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord() -> Coordinate {
        Coordinate::new(-58.08, -32.31)
    }

    fn valid_lost_draft() -> LostFormDraft {
        LostFormDraft {
            name: "Max".to_string(),
            category: Some(PetCategory::Dog),
            contact: "555-1234".to_string(),
            location: "Central Park".to_string(),
            loss_date: "2024-01-10".to_string(),
            description: "Golden retriever".to_string(),
            photos: Vec::new(),
            error: None,
            submitting: false,
        }
    }

    fn valid_convert_draft() -> ConvertFormDraft {
        ConvertFormDraft {
            location: "North Plaza".to_string(),
            found_date: "2024-01-20".to_string(),
            contact: "555-9999".to_string(),
            description: String::new(),
            photo: Some(PathBuf::from("photo.jpg")),
            error: None,
            submitting: false,
        }
    }

    #[test]
    fn lost_draft_with_all_required_fields_passes() {
        let payload = validate_lost(&valid_lost_draft(), coord()).expect("valid");
        assert_eq!(payload.name, "Max");
        assert_eq!(payload.coordinate, coord());
    }

    #[test]
    fn missing_required_fields_are_rejected_with_the_field_name() {
        let mut draft = valid_lost_draft();
        draft.name = "  ".to_string();
        let err = validate_lost(&draft, coord()).expect_err("blank name");
        assert!(err.contains("Pet name"));

        let mut draft = valid_lost_draft();
        draft.category = None;
        let err = validate_lost(&draft, coord()).expect_err("no category");
        assert!(err.contains("Category"));
    }

    #[test]
    fn malformed_and_future_dates_are_rejected() {
        let mut draft = valid_lost_draft();
        draft.loss_date = "10/01/2024".to_string();
        assert!(validate_lost(&draft, coord()).is_err());

        let mut draft = valid_lost_draft();
        draft.loss_date = (Local::now().date_naive() + chrono::Days::new(2))
            .format("%Y-%m-%d")
            .to_string();
        let err = validate_lost(&draft, coord()).expect_err("future date");
        assert!(err.contains("future"));
    }

    #[test]
    fn more_than_five_photos_fail_validation() {
        let mut draft = valid_lost_draft();
        draft.photos = (0..MAX_LOST_REPORT_PHOTOS + 1)
            .map(|i| PathBuf::from(format!("photo-{i}.jpg")))
            .collect();
        let err = validate_lost(&draft, coord()).expect_err("over cap");
        assert!(err.contains("At most"));
    }

    #[test]
    fn found_draft_requires_a_photo() {
        let draft = FoundFormDraft {
            category: Some(PetCategory::Cat),
            location: "North Plaza".to_string(),
            found_date: "2024-01-20".to_string(),
            contact: "555-9999".to_string(),
            description: String::new(),
            photo: None,
            error: None,
            submitting: false,
        };
        let err = validate_found(&draft, coord()).expect_err("no photo");
        assert!(err.contains("photo"));
    }

    #[test]
    fn conversion_requires_a_map_coordinate() {
        let err = validate_convert(&valid_convert_draft(), None).expect_err("no coordinate");
        assert!(err.contains("map"));

        let payload = validate_convert(&valid_convert_draft(), Some(coord())).expect("valid");
        assert_eq!(payload.coordinate, coord());
    }
}
