// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table PostgreSQL avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - users : Utilisateurs (email unique, password hashé)
//   - otps : Codes à usage unique (inscription + reset password, TTL 5 min)
//   - places : Pins du carnet de voyage (visited / bucket-list, images JSONB)
//   - dto : Payloads de requête et réponses structurées
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - Un Place appartient à exactement un User (FK user_id)
//   - Les otps sont clés par email, pas par user_id: le code peut exister
//     avant le compte (flow d'inscription)
//
// ============================================================================

pub mod health;
pub mod users;
pub mod otps;
pub mod places;
pub mod dto;
