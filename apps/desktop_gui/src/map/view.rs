//! Map view widget: camera pan/zoom over a graticule backdrop, report
//! markers with click hit-testing, marker-placement mode, and a fly-to
//! camera animation with an explicit completion signal.

use eframe::egui;
use shared::domain::{Coordinate, FoundReport, FoundReportId, LostReport, LostReportId};

const TILE_SIZE: f64 = 256.0;
pub const MIN_ZOOM: f64 = 3.0;
pub const MAX_ZOOM: f64 = 19.0;

/// Default view over the city the reports come from.
const DEFAULT_CENTER: Coordinate = Coordinate {
    lng: -58.080_409_861_510_55,
    lat: -32.316_942_990_880_7,
};
const DEFAULT_ZOOM: f64 = 14.0;

/// Zoom change per scroll point.
const WHEEL_ZOOM_RATE: f64 = 0.005;

/// Clicks within this many points of a marker select it instead of hitting
/// the map.
const MARKER_HIT_RADIUS: f32 = 14.0;

const MARKER_RADIUS: f32 = 7.0;
const LOST_COLOR: egui::Color32 = egui::Color32::from_rgb(233, 69, 96);
const FOUND_COLOR: egui::Color32 = egui::Color32::from_rgb(78, 204, 163);
const TEMP_COLOR: egui::Color32 = egui::Color32::from_rgb(245, 166, 35);
const BACKDROP_COLOR: egui::Color32 = egui::Color32::from_rgb(32, 36, 44);
const GRATICULE_COLOR: egui::Color32 = egui::Color32::from_rgba_premultiplied(255, 255, 255, 18);

/// Fixed fly-to animation parameters.
const FLY_DURATION_SECS: f32 = 1.2;
const FLY_TARGET_ZOOM: f64 = 15.0;

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerId {
    Lost(LostReportId),
    Found(FoundReportId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: Coordinate,
    pub zoom: f64,
}

impl Camera {
    fn clamped(mut self) -> Self {
        self.zoom = self.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.center.lat = self.center.lat.clamp(-85.0, 85.0);
        self.center.lng = self.center.lng.clamp(-180.0, 180.0);
        self
    }
}

struct FlyAnimation {
    from_center: Coordinate,
    to_center: Coordinate,
    from_zoom: f64,
    to_zoom: f64,
    progress: f32,
}

/// What happened on the map this frame.
#[derive(Default)]
pub struct MapResponse {
    /// A marker was clicked; marker hits take precedence over map clicks.
    pub clicked_marker: Option<MarkerId>,
    /// A placement click landed while the placement mode was armed.
    pub placed_coordinate: Option<Coordinate>,
    /// The fly-to animation finished this frame.
    pub fly_completed: bool,
}

pub struct MapView {
    camera: Camera,
    fly: Option<FlyAnimation>,
    placing_armed: bool,
    temp_marker: Option<Coordinate>,
    selected: Option<MarkerId>,
}

impl Default for MapView {
    fn default() -> Self {
        Self::new()
    }
}

impl MapView {
    pub fn new() -> Self {
        Self {
            camera: Camera {
                center: DEFAULT_CENTER,
                zoom: DEFAULT_ZOOM,
            },
            fly: None,
            placing_armed: false,
            temp_marker: None,
            selected: None,
        }
    }

    pub fn arm_placement(&mut self) {
        self.placing_armed = true;
    }

    pub fn disarm_placement(&mut self) {
        self.placing_armed = false;
    }

    pub fn placement_armed(&self) -> bool {
        self.placing_armed
    }

    pub fn remove_temp_marker(&mut self) {
        self.temp_marker = None;
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Smooth camera pan/zoom to a target; completion is reported on the
    /// widget response rather than a timer.
    pub fn fly_to(&mut self, target: Coordinate) {
        self.fly = Some(FlyAnimation {
            from_center: self.camera.center,
            to_center: target,
            from_zoom: self.camera.zoom,
            to_zoom: FLY_TARGET_ZOOM,
            progress: 0.0,
        });
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        lost: &[&LostReport],
        found: &[&FoundReport],
    ) -> MapResponse {
        let mut response = MapResponse::default();
        let (rect, widget) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let center_pos = rect.center();

        let mut fly_done = false;
        if let Some(fly) = &mut self.fly {
            // Input is ignored while the camera is in flight; the animation
            // is short and this removes the interact-mid-flight race.
            let dt = ui.input(|i| i.stable_dt).min(0.1);
            fly.progress = (fly.progress + dt / FLY_DURATION_SECS).min(1.0);
            let t = ease_in_out_cubic(fly.progress as f64);
            self.camera = Camera {
                center: Coordinate::new(
                    lerp(fly.from_center.lng, fly.to_center.lng, t),
                    lerp(fly.from_center.lat, fly.to_center.lat, t),
                ),
                zoom: lerp(fly.from_zoom, fly.to_zoom, t),
            };
            if fly.progress >= 1.0 {
                self.camera = Camera {
                    center: fly.to_center,
                    zoom: fly.to_zoom,
                };
                fly_done = true;
            }
            ui.ctx().request_repaint();
        } else {
            if widget.dragged() {
                let delta = widget.drag_delta();
                if delta != egui::Vec2::ZERO {
                    self.camera.center = unproject(self.camera, -delta);
                }
            }
            if widget.hovered() {
                let scroll = ui.input(|i| i.raw_scroll_delta.y);
                if scroll != 0.0 {
                    let cursor = widget
                        .hover_pos()
                        .map(|pos| pos - center_pos)
                        .unwrap_or(egui::Vec2::ZERO);
                    let new_zoom = self.camera.zoom + scroll as f64 * WHEEL_ZOOM_RATE;
                    self.camera = zoom_at_cursor(self.camera, cursor, new_zoom);
                }
            }
        }
        if fly_done {
            self.fly = None;
            response.fly_completed = true;
        }
        self.camera = self.camera.clamped();

        if self.placing_armed && widget.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
        }

        if widget.clicked() && self.fly.is_none() {
            if let Some(click_pos) = widget.interact_pointer_pos() {
                let lost_positions: Vec<egui::Pos2> = lost
                    .iter()
                    .map(|report| center_pos + project(self.camera, report.coordinate))
                    .collect();
                let found_positions: Vec<egui::Pos2> = found
                    .iter()
                    .map(|report| center_pos + project(self.camera, report.coordinate))
                    .collect();

                let lost_hit = nearest_within(&lost_positions, click_pos, MARKER_HIT_RADIUS)
                    .map(|(index, dist)| (MarkerId::Lost(lost[index].id.clone()), dist));
                let found_hit = nearest_within(&found_positions, click_pos, MARKER_HIT_RADIUS)
                    .map(|(index, dist)| (MarkerId::Found(found[index].id.clone()), dist));

                let hit = match (lost_hit, found_hit) {
                    (Some(a), Some(b)) => Some(if a.1 <= b.1 { a.0 } else { b.0 }),
                    (Some(a), None) => Some(a.0),
                    (None, Some(b)) => Some(b.0),
                    (None, None) => None,
                };

                if let Some(marker_id) = hit {
                    self.selected = Some(marker_id.clone());
                    response.clicked_marker = Some(marker_id);
                } else if self.placing_armed {
                    let coordinate = unproject(self.camera, click_pos - center_pos);
                    self.temp_marker = Some(coordinate);
                    self.placing_armed = false;
                    response.placed_coordinate = Some(coordinate);
                }
            }
        }

        painter.rect_filled(rect, 0.0, BACKDROP_COLOR);
        self.paint_graticule(&painter, rect);

        for report in lost {
            let selected = self.selected == Some(MarkerId::Lost(report.id.clone()));
            paint_marker(
                &painter,
                center_pos + project(self.camera, report.coordinate),
                LOST_COLOR,
                selected,
            );
        }
        for report in found {
            let selected = self.selected == Some(MarkerId::Found(report.id.clone()));
            paint_marker(
                &painter,
                center_pos + project(self.camera, report.coordinate),
                FOUND_COLOR,
                selected,
            );
        }
        if let Some(coordinate) = self.temp_marker {
            paint_marker(
                &painter,
                center_pos + project(self.camera, coordinate),
                TEMP_COLOR,
                false,
            );
        }

        response
    }

    fn paint_graticule(&self, painter: &egui::Painter, rect: egui::Rect) {
        let center_pos = rect.center();
        let north_west = unproject(self.camera, rect.min - center_pos);
        let south_east = unproject(self.camera, rect.max - center_pos);
        let step = graticule_step(south_east.lng - north_west.lng);
        let stroke = egui::Stroke::new(0.5, GRATICULE_COLOR);

        let mut lng = (north_west.lng / step).floor() * step;
        while lng <= south_east.lng {
            let x = center_pos.x
                + project(self.camera, Coordinate::new(lng, self.camera.center.lat)).x;
            painter.line_segment(
                [egui::pos2(x, rect.top()), egui::pos2(x, rect.bottom())],
                stroke,
            );
            lng += step;
        }

        // Latitudes run from south (bottom) to north (top).
        let mut lat = (south_east.lat / step).floor() * step;
        while lat <= north_west.lat {
            let y = center_pos.y
                + project(self.camera, Coordinate::new(self.camera.center.lng, lat)).y;
            painter.line_segment(
                [egui::pos2(rect.left(), y), egui::pos2(rect.right(), y)],
                stroke,
            );
            lat += step;
        }
    }
}

fn paint_marker(painter: &egui::Painter, pos: egui::Pos2, fill: egui::Color32, selected: bool) {
    painter.circle_filled(pos, MARKER_RADIUS, fill);
    painter.circle_stroke(pos, MARKER_RADIUS, egui::Stroke::new(1.5, egui::Color32::WHITE));
    if selected {
        painter.circle_stroke(
            pos,
            MARKER_RADIUS + 4.0,
            egui::Stroke::new(2.0, egui::Color32::WHITE),
        );
    }
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Horizontal pixels per degree of longitude at a zoom level.
fn pixels_per_degree(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom) / 360.0
}

/// Longitude degrees shrink with latitude; a local constant factor is fine
/// at city scale.
fn lon_shrink(camera: Camera) -> f64 {
    camera.center.lat.to_radians().cos().abs().max(0.01)
}

/// Screen offset of `coord` relative to the viewport center, in points.
fn project(camera: Camera, coord: Coordinate) -> egui::Vec2 {
    let scale = pixels_per_degree(camera.zoom);
    let shrink = lon_shrink(camera);
    egui::vec2(
        ((coord.lng - camera.center.lng) * scale * shrink) as f32,
        (-(coord.lat - camera.center.lat) * scale) as f32,
    )
}

/// Inverse of `project`.
fn unproject(camera: Camera, offset: egui::Vec2) -> Coordinate {
    let scale = pixels_per_degree(camera.zoom);
    let shrink = lon_shrink(camera);
    Coordinate::new(
        camera.center.lng + offset.x as f64 / (scale * shrink),
        camera.center.lat - offset.y as f64 / scale,
    )
}

/// New camera for a zoom step that keeps the geo point under `cursor` (an
/// offset from the viewport center) fixed on screen.
fn zoom_at_cursor(camera: Camera, cursor: egui::Vec2, new_zoom: f64) -> Camera {
    let anchor = unproject(camera, cursor);
    let zoomed = Camera {
        center: camera.center,
        zoom: new_zoom,
    }
    .clamped();
    let scale = pixels_per_degree(zoomed.zoom);
    let shrink = lon_shrink(zoomed);
    Camera {
        center: Coordinate::new(
            anchor.lng - cursor.x as f64 / (scale * shrink),
            anchor.lat + cursor.y as f64 / scale,
        ),
        zoom: zoomed.zoom,
    }
}

/// Index and distance of the nearest position within `threshold`.
fn nearest_within(
    positions: &[egui::Pos2],
    click: egui::Pos2,
    threshold: f32,
) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (index, pos) in positions.iter().enumerate() {
        let dist = pos.distance(click);
        if dist < threshold && best.map_or(true, |(_, best_dist)| dist < best_dist) {
            best = Some((index, dist));
        }
    }
    best
}

fn graticule_step(span_deg: f64) -> f64 {
    const STEPS: [f64; 10] = [0.0005, 0.001, 0.002, 0.005, 0.01, 0.02, 0.05, 0.1, 0.5, 1.0];
    for step in STEPS {
        if span_deg / step <= 14.0 {
            return step;
        }
    }
    5.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera {
            center: Coordinate::new(-58.08, -32.31),
            zoom: 14.0,
        }
    }

    #[test]
    fn pixels_per_degree_doubles_per_zoom_level() {
        let base = pixels_per_degree(10.0);
        assert!((pixels_per_degree(11.0) / base - 2.0).abs() < 1e-9);
    }

    #[test]
    fn project_unproject_round_trip() {
        let cam = camera();
        let coord = Coordinate::new(-58.074, -32.322);
        let back = unproject(cam, project(cam, coord));
        assert!((back.lng - coord.lng).abs() < 1e-6);
        assert!((back.lat - coord.lat).abs() < 1e-6);
    }

    #[test]
    fn projecting_the_center_lands_on_the_origin() {
        let cam = camera();
        let offset = project(cam, cam.center);
        assert_eq!(offset, egui::Vec2::ZERO);
    }

    #[test]
    fn zoom_at_cursor_keeps_the_anchor_point_fixed() {
        let cam = camera();
        let cursor = egui::vec2(120.0, -80.0);
        let anchor = unproject(cam, cursor);

        let zoomed = zoom_at_cursor(cam, cursor, cam.zoom + 1.0);
        let anchor_offset = project(zoomed, anchor);
        assert!((anchor_offset.x - cursor.x).abs() < 0.5);
        assert!((anchor_offset.y - cursor.y).abs() < 0.5);
    }

    #[test]
    fn zoom_is_clamped_to_the_supported_range() {
        let cam = camera();
        let zoomed = zoom_at_cursor(cam, egui::Vec2::ZERO, 99.0);
        assert_eq!(zoomed.zoom, MAX_ZOOM);
        let zoomed = zoom_at_cursor(cam, egui::Vec2::ZERO, -3.0);
        assert_eq!(zoomed.zoom, MIN_ZOOM);
    }

    #[test]
    fn nearest_within_respects_the_threshold_and_picks_the_closest() {
        let positions = vec![egui::pos2(100.0, 100.0), egui::pos2(110.0, 110.0)];
        let hit = nearest_within(&positions, egui::pos2(108.0, 108.0), 14.0);
        assert_eq!(hit.map(|(index, _)| index), Some(1));
        assert!(nearest_within(&positions, egui::pos2(200.0, 200.0), 14.0).is_none());
    }

    #[test]
    fn graticule_step_grows_with_the_visible_span() {
        assert!(graticule_step(0.01) < graticule_step(1.0));
        assert!(graticule_step(100.0) >= 5.0);
    }

    #[test]
    fn ease_curve_is_pinned_at_both_ends() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert!((ease_in_out_cubic(1.0) - 1.0).abs() < 1e-9);
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-9);
    }
}
