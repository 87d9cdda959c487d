// ============================================================================
// MODÈLE : OTPS
// ============================================================================
//
// Description:
//   Codes à usage unique (6 chiffres) envoyés par email pour prouver la
//   possession d'une adresse lors de l'inscription ou du reset password.
//
// Colonnes de la table otps:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - email (VARCHAR, NOT NULL) - PAS de FK: le code peut exister avant le user
//   - code (VARCHAR, NOT NULL) - 6 chiffres
//   - expires_at (TIMESTAMPTZ, NOT NULL) - created_at + 5 minutes
//
// Workflow:
//   1. User demande un code via POST /api/users/send-otp (ou forgot-password)
//   2. Backend génère un code 6 chiffres et l'insère avec expires_at = now + 5 min
//   3. Backend envoie l'email (fallback console si le transport échoue)
//   4. User soumet (email, code) via register ou reset-password
//   5. Backend cherche une ligne (email, code) avec expires_at > now
//   6. Si trouvée: opération validée, puis TOUS les codes de cet email supprimés
//
// Points d'attention:
//   - Plusieurs codes vivants par email sont permis (renvois successifs)
//   - L'expiration est appliquée au lookup (expires_at > now) et les lignes
//     périmées sont purgées à chaque insertion
//   - Un code expiré et un code inconnu produisent la même erreur InvalidCode
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "otps")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub email: String,

    pub code: String,

    pub expires_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
