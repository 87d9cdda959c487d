use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub username: String, // 3-20 caractères, PAS unique (plusieurs comptes peuvent partager un nom)
    #[sea_orm(unique)]
    pub email: String, // Unique: c'est l'email qui identifie le compte au login
    #[serde(skip_serializing)] // Ne jamais exposer le hash en JSON
    pub password: String, // Format: pbkdf2:sha256:iterations$salt$hash
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::places::Entity")]
    Places,
}

impl Related<super::places::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Places.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
