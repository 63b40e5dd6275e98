//! Pure filtering of the lost/found record sets.

use chrono::NaiveDate;
use shared::domain::{FoundReport, LostReport, PetCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportKind {
    Lost,
    Found,
    #[default]
    All,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [ReportKind::All, ReportKind::Lost, ReportKind::Found];

    pub fn label(self) -> &'static str {
        match self {
            ReportKind::Lost => "Lost",
            ReportKind::Found => "Found",
            ReportKind::All => "All",
        }
    }
}

/// Fully replaced on every UI change; last write wins.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterCriteria {
    pub category: Option<PetCategory>,
    /// Inclusive lower bound on the record's relevant date.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound.
    pub end_date: Option<NaiveDate>,
    pub kind: ReportKind,
}

impl FilterCriteria {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    fn category_matches(&self, category: PetCategory) -> bool {
        self.category.map_or(true, |wanted| wanted == category)
    }

    fn date_in_range(&self, date: NaiveDate) -> bool {
        if let Some(start) = self.start_date {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if date > end {
                return false;
            }
        }
        true
    }
}

/// Applies the criteria to both record sets independently. Predicates
/// AND-compose within a set; the report-kind selector empties the excluded
/// set regardless of the other filters.
pub fn filter_reports<'a>(
    lost: &'a [LostReport],
    found: &'a [FoundReport],
    criteria: &FilterCriteria,
) -> (Vec<&'a LostReport>, Vec<&'a FoundReport>) {
    let lost_out = if criteria.kind == ReportKind::Found {
        Vec::new()
    } else {
        lost.iter()
            .filter(|report| {
                criteria.category_matches(report.category)
                    && criteria.date_in_range(report.loss_date)
            })
            .collect()
    };

    let found_out = if criteria.kind == ReportKind::Lost {
        Vec::new()
    } else {
        found
            .iter()
            .filter(|report| {
                criteria.category_matches(report.category)
                    && criteria.date_in_range(report.found_date)
            })
            .collect()
    };

    (lost_out, found_out)
}
