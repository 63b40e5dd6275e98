//! Reducer-like interaction state machine for placement modes, sidebars,
//! and form modals.
//!
//! The whole flow state lives in two fields: an optional placement mode and
//! a single `ActivePanel` tagged union, so "two panels open at once" or "a
//! conversion without its source report" cannot be represented. The
//! conversion target travels inside `Placement::FoundFromLost`.

use shared::domain::{Coordinate, FoundReport, FoundReportId, LostReport};

#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    Lost,
    Found,
    FoundFromLost(LostReport),
}

/// At most one sidebar or modal is visible at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ActivePanel {
    #[default]
    Closed,
    LostSidebar(LostReport),
    FoundSidebar(FoundReport),
    LostModal(Coordinate),
    FoundModal(Coordinate),
    ConvertModal {
        source: LostReport,
        coordinate: Option<Coordinate>,
    },
}

/// Side effects the app applies after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    RemoveTempMarker,
    ClearMarkerSelection,
    FlyTo(Coordinate),
    RefreshReports,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    pub placing: Option<Placement>,
    pub panel: ActivePanel,
    pending_reveal: Option<FoundReportId>,
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        self.placing.is_none()
            && self.panel == ActivePanel::Closed
            && self.pending_reveal.is_none()
    }

    pub fn pending_reveal(&self) -> Option<&FoundReportId> {
        self.pending_reveal.as_ref()
    }

    pub fn start_lost_placement(&mut self) -> Vec<Effect> {
        self.arm(Placement::Lost)
    }

    pub fn start_found_placement(&mut self) -> Vec<Effect> {
        self.arm(Placement::Found)
    }

    fn arm(&mut self, placement: Placement) -> Vec<Effect> {
        self.panel = ActivePanel::Closed;
        self.pending_reveal = None;
        self.placing = Some(placement);
        vec![Effect::ClearMarkerSelection]
    }

    /// A coordinate was placed on the map while a placement mode was armed.
    pub fn marker_placed(&mut self, coordinate: Coordinate) -> Vec<Effect> {
        match self.placing.take() {
            Some(Placement::Lost) => self.panel = ActivePanel::LostModal(coordinate),
            Some(Placement::Found) => self.panel = ActivePanel::FoundModal(coordinate),
            Some(Placement::FoundFromLost(source)) => {
                self.panel = ActivePanel::ConvertModal {
                    source,
                    coordinate: Some(coordinate),
                };
            }
            None => {}
        }
        Vec::new()
    }

    /// Selecting a report closes any other panel and any placement mode.
    pub fn lost_marker_clicked(&mut self, report: LostReport) -> Vec<Effect> {
        self.placing = None;
        self.pending_reveal = None;
        self.panel = ActivePanel::LostSidebar(report);
        vec![Effect::RemoveTempMarker]
    }

    pub fn found_marker_clicked(&mut self, report: FoundReport) -> Vec<Effect> {
        self.placing = None;
        self.pending_reveal = None;
        self.panel = ActivePanel::FoundSidebar(report);
        vec![Effect::RemoveTempMarker]
    }

    /// "I found this pet" on the lost sidebar: the sidebar's report becomes
    /// the conversion source and the modal opens directly; no placement is
    /// required until the user asks for one.
    pub fn found_this_pet(&mut self) -> Vec<Effect> {
        if let ActivePanel::LostSidebar(report) = std::mem::take(&mut self.panel) {
            self.panel = ActivePanel::ConvertModal {
                source: report,
                coordinate: None,
            };
        }
        vec![Effect::ClearMarkerSelection]
    }

    /// "Select location on map" on the conversion modal; the source report
    /// is preserved through the placement round-trip.
    pub fn pick_location_on_map(&mut self) -> Vec<Effect> {
        if let ActivePanel::ConvertModal { source, .. } = std::mem::take(&mut self.panel) {
            self.placing = Some(Placement::FoundFromLost(source));
        }
        Vec::new()
    }

    /// A candidate match was chosen in the lost sidebar: close it, fly the
    /// camera, and reveal the found sidebar once the animation reports
    /// completion.
    pub fn match_selected(&mut self, match_report: &FoundReport) -> Vec<Effect> {
        self.panel = ActivePanel::Closed;
        self.pending_reveal = Some(match_report.id.clone());
        vec![
            Effect::ClearMarkerSelection,
            Effect::FlyTo(match_report.coordinate),
        ]
    }

    /// The camera animation finished; a no-op unless a reveal is pending
    /// and the report is still in the store.
    pub fn fly_completed(&mut self, found: &[FoundReport]) -> Vec<Effect> {
        let Some(id) = self.pending_reveal.take() else {
            return Vec::new();
        };
        if let Some(report) = found.iter().find(|report| report.id == id) {
            self.panel = ActivePanel::FoundSidebar(report.clone());
        }
        Vec::new()
    }

    /// Closing any panel is an idempotent reset to idle.
    pub fn close_panel(&mut self) -> Vec<Effect> {
        self.placing = None;
        self.pending_reveal = None;
        self.panel = ActivePanel::Closed;
        vec![Effect::RemoveTempMarker, Effect::ClearMarkerSelection]
    }

    /// A submission went through: reset, then refresh the store.
    pub fn submission_succeeded(&mut self) -> Vec<Effect> {
        let mut effects = self.close_panel();
        effects.push(Effect::RefreshReports);
        effects
    }
}
