use serde::{Deserialize, Serialize};

/// List endpoints wrap their payload under a `data` key; by-id endpoints
/// return the bare object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: T,
}

/// Multipart part names for the report submission endpoints.
pub mod multipart {
    pub const NAME: &str = "nombre";
    pub const CATEGORY: &str = "tipo_mascota";
    pub const CONTACT: &str = "contacto";
    pub const LOSS_LOCATION: &str = "ubicacion_perdida";
    pub const LOSS_DATE: &str = "fecha_perdida";
    pub const FOUND_LOCATION: &str = "ubicacion_encontrada";
    pub const FOUND_DATE: &str = "fecha_encontrada";
    pub const DESCRIPTION: &str = "descripcion";
    /// JSON-encoded `[lng, lat]` pair.
    pub const COORDINATE: &str = "coordenadas";
    pub const LOST_PHOTOS: &str = "fotos_perdida";
    pub const FOUND_PHOTO: &str = "foto_encontrada";
}

#[cfg(test)]
mod tests {
    use super::ApiEnvelope;
    use crate::domain::LostReport;

    #[test]
    fn list_payloads_unwrap_from_data_key() {
        let raw = r#"{"data": []}"#;
        let envelope: ApiEnvelope<Vec<LostReport>> = serde_json::from_str(raw).expect("decode");
        assert!(envelope.data.is_empty());
    }
}
