use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(LostReportId);
id_newtype!(FoundReportId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PetCategory {
    Dog,
    Cat,
    Other,
}

impl PetCategory {
    pub const ALL: [PetCategory; 3] = [PetCategory::Dog, PetCategory::Cat, PetCategory::Other];

    /// Wire value expected by the backend.
    pub fn wire_name(self) -> &'static str {
        match self {
            PetCategory::Dog => "perro",
            PetCategory::Cat => "gato",
            PetCategory::Other => "otro",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PetCategory::Dog => "Dog",
            PetCategory::Cat => "Cat",
            PetCategory::Other => "Other",
        }
    }
}

impl Serialize for PetCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}

// The backend stores free-form category strings; anything unrecognized
// folds into `Other` so a single odd record cannot poison a list decode.
impl<'de> Deserialize<'de> for PetCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "perro" => PetCategory::Dog,
            "gato" => PetCategory::Cat,
            _ => PetCategory::Other,
        })
    }
}

/// Geographic coordinate, carried on the wire as a `[lng, lat]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lng: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(value: Coordinate) -> Self {
        [value.lng, value.lat]
    }
}

/// Calendar-date (de)serialization for report date fields.
///
/// The forms submit plain `YYYY-MM-DD`, but the backend echoes full ISO
/// datetimes back; only the calendar part is meaningful either way.
pub mod calendar_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    /// Accepts `YYYY-MM-DD` or any string with that as a prefix (ISO datetimes).
    pub fn parse(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
        NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), FORMAT)
    }
}

/// A missing-pet report created by its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LostReport {
    #[serde(rename = "_id")]
    pub id: LostReportId,
    #[serde(rename = "nombre")]
    pub name: String,
    /// Photo paths relative to the backend static root.
    #[serde(rename = "fotos_perdida", default)]
    pub photos: Vec<String>,
    #[serde(rename = "tipo_mascota")]
    pub category: PetCategory,
    #[serde(rename = "contacto")]
    pub contact: String,
    #[serde(rename = "ubicacion_perdida")]
    pub location: String,
    #[serde(rename = "fecha_perdida", with = "calendar_date")]
    pub loss_date: NaiveDate,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "coordenadas")]
    pub coordinate: Coordinate,
    /// Candidate found reports, computed server-side.
    #[serde(
        rename = "posibles_coincidencias",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub candidate_matches: Option<Vec<FoundReportId>>,
}

/// A found-pet report, optionally converted from (and linked to) a lost one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundReport {
    #[serde(rename = "_id")]
    pub id: FoundReportId,
    #[serde(rename = "foto_encontrada", default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(rename = "tipo_mascota")]
    pub category: PetCategory,
    #[serde(rename = "coordenadas")]
    pub coordinate: Coordinate,
    #[serde(rename = "ubicacion_encontrada")]
    pub location: String,
    #[serde(rename = "fecha_encontrada", with = "calendar_date")]
    pub found_date: NaiveDate,
    #[serde(rename = "contacto")]
    pub contact: String,
    #[serde(rename = "descripcion", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Back-reference to the originating lost report, when converted.
    #[serde(rename = "mascota_perdida_id", default, skip_serializing_if = "Option::is_none")]
    pub lost_report_id: Option<LostReportId>,
    #[serde(rename = "nombre_mascota", default, skip_serializing_if = "Option::is_none")]
    pub lost_pet_name: Option<String>,
    #[serde(rename = "fotos_mascota", default, skip_serializing_if = "Vec::is_empty")]
    pub lost_pet_photos: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_round_trips_as_lng_lat_pair() {
        let coord = Coordinate::new(-58.0804, -32.3169);
        let json = serde_json::to_string(&coord).expect("serialize");
        assert_eq!(json, "[-58.0804,-32.3169]");
        let back: Coordinate = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, coord);
    }

    #[test]
    fn calendar_date_accepts_plain_dates_and_iso_datetimes() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 20).expect("date");
        assert_eq!(calendar_date::parse("2024-01-20").expect("plain"), expected);
        assert_eq!(
            calendar_date::parse("2024-01-20T13:45:00.000Z").expect("datetime"),
            expected
        );
        assert!(calendar_date::parse("20/01/2024").is_err());
    }

    #[test]
    fn unknown_category_folds_into_other() {
        let parsed: PetCategory = serde_json::from_str("\"conejo\"").expect("decode");
        assert_eq!(parsed, PetCategory::Other);
        let parsed: PetCategory = serde_json::from_str("\"perro\"").expect("decode");
        assert_eq!(parsed, PetCategory::Dog);
    }

    #[test]
    fn lost_report_decodes_backend_payload() {
        let raw = r#"{
            "_id": "665f1c2e9b1d8c0012345678",
            "nombre": "Max",
            "fotos_perdida": ["uploads/max-1.jpg", "uploads/max-2.jpg"],
            "tipo_mascota": "perro",
            "contacto": "555-1234",
            "ubicacion_perdida": "Parque Central",
            "fecha_perdida": "2024-01-10T00:00:00.000Z",
            "descripcion": "Golden retriever, red collar",
            "coordenadas": [-58.08, -32.31],
            "posibles_coincidencias": ["665f1c2e9b1d8c0087654321"]
        }"#;
        let report: LostReport = serde_json::from_str(raw).expect("decode");
        assert_eq!(report.name, "Max");
        assert_eq!(report.category, PetCategory::Dog);
        assert_eq!(report.photos.len(), 2);
        assert_eq!(
            report.loss_date,
            NaiveDate::from_ymd_opt(2024, 1, 10).expect("date")
        );
        assert_eq!(
            report.candidate_matches.as_deref(),
            Some(&[FoundReportId("665f1c2e9b1d8c0087654321".to_string())][..])
        );
    }

    #[test]
    fn found_report_back_reference_is_optional() {
        let raw = r#"{
            "_id": "abc123",
            "tipo_mascota": "gato",
            "coordenadas": [-58.07, -32.30],
            "ubicacion_encontrada": "Plaza Norte",
            "fecha_encontrada": "2024-01-20",
            "contacto": "555-9999"
        }"#;
        let report: FoundReport = serde_json::from_str(raw).expect("decode");
        assert!(report.photo.is_none());
        assert!(report.description.is_none());
        assert!(report.lost_report_id.is_none());
        assert!(report.lost_pet_photos.is_empty());
    }
}
