//pour les payloads et réponses structurées des places
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::places::{PlaceImage, PlaceStatus};

/// Localisation telle que soumise par le frontend: { lat, lng, address }
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LocationPayload {
    pub lat: f64,
    pub lng: f64,
    pub address: Option<String>,
}

/// Payload complet d'un pin (création ET édition: l'édition est un
/// remplacement intégral, la liste d'images soumise est la vérité terrain)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PlacePayload {
    #[validate(length(min = 3, message = "Title must be at least 3 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    pub status: PlaceStatus,

    #[validate(range(min = 0, max = 5, message = "Rating must be between 0 and 5"))]
    pub rating: Option<i32>,

    #[serde(rename = "visitDate")]
    pub visit_date: Option<chrono::NaiveDate>,

    #[validate(nested)]
    pub location: LocationPayload,

    #[serde(default)]
    pub images: Vec<PlaceImage>,
}
