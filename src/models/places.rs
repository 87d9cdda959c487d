// ============================================================================
// MODÈLE : PLACES
// ============================================================================
//
// Description:
//   Un pin du carnet de voyage: soit un lieu visité, soit un rêve bucket-list.
//   Les images sont hébergées chez Cloudinary; on ne stocke que {url, caption}
//   dans une colonne JSONB ordonnée.
//
// Colonnes de la table places:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - user_id (INTEGER, NOT NULL, FK vers users)
//   - title (VARCHAR, NOT NULL, min 3)
//   - description (TEXT, NOT NULL)
//   - status (VARCHAR, NOT NULL) - 'visited' ou 'bucket-list'
//   - rating (INTEGER, NULLABLE) - 0 à 5, pertinent seulement si visited
//   - visit_date (DATE, NULLABLE) - pertinent seulement si visited
//   - lat / lng (DOUBLE PRECISION, NOT NULL)
//   - address (VARCHAR, NULLABLE) - adresse lisible renvoyée par le geocoder
//   - images (JSONB, NOT NULL) - liste ordonnée de {url, caption}
//   - created_at / updated_at (TIMESTAMPTZ)
//
// Points d'attention:
//   - Invariant: status = bucket-list => rating et visit_date forcés à NULL,
//     même si le client en a soumis
//   - L'édition est un remplacement complet (pas de patch partiel): la liste
//     d'images soumise par le client est la vérité terrain
//
// ============================================================================

use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Une image attachée à un pin, hébergée à distance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct PlaceImage {
    pub url: String,
    #[serde(default)]
    pub caption: String,
}

/// Liste ordonnée d'images, stockée telle quelle en JSONB.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct PlaceImages(pub Vec<PlaceImage>);

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PlaceStatus {
    #[sea_orm(string_value = "visited")]
    #[serde(rename = "visited")]
    Visited,
    #[sea_orm(string_value = "bucket-list")]
    #[serde(rename = "bucket-list")]
    BucketList,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "places")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub title: String,

    pub description: String,

    pub status: PlaceStatus,

    pub rating: Option<i32>,

    pub visit_date: Option<Date>,

    pub lat: f64,

    pub lng: f64,

    pub address: Option<String>,

    #[sea_orm(column_type = "JsonBinary")]
    pub images: PlaceImages,

    pub created_at: Option<DateTimeUtc>,

    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
