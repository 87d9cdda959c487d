use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use validator::Validate;

use crate::middleware::AuthUser;
use crate::models::dto::PlacePayload;
use crate::services::media_host::CloudinaryClient;
use crate::services::place_service::{PlaceError, PlaceService};

// Query string du listing: ?userId=...
#[derive(Deserialize)]
pub struct ListPlacesQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<i32>,
}

fn place_error_response(e: PlaceError) -> HttpResponse {
    match e {
        PlaceError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
            "error": e.to_string()
        })),
        PlaceError::Db(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {}", e)
        })),
    }
}

/// POST /api/places - Créer un pin (PROTÉGÉE)
/// Les images sont déjà uploadées chez Cloudinary par le frontend
#[post("")]
pub async fn create_place(
    auth_user: AuthUser,
    body: web::Json<PlacePayload>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    match PlaceService::create_place(db.get_ref(), auth_user.user_id, body.into_inner()).await {
        Ok(place) => HttpResponse::Created().json(place),
        Err(e) => place_error_response(e),
    }
}

/// GET /api/places?userId=... - Lister les pins d'un propriétaire (PUBLIC)
/// Sans userId: tableau vide, jamais les pins de tout le monde
#[get("")]
pub async fn get_places(
    query: web::Query<ListPlacesQuery>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match PlaceService::get_places(db.get_ref(), query.user_id).await {
        Ok(places) => HttpResponse::Ok().json(places),
        Err(e) => place_error_response(e),
    }
}

/// PUT /api/places/:id - Remplacement intégral + réconciliation images (PROTÉGÉE)
#[put("/{id}")]
pub async fn update_place(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<PlacePayload>,
    db: web::Data<DatabaseConnection>,
    media: web::Data<CloudinaryClient>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    match PlaceService::update_place(
        db.get_ref(),
        media.get_ref(),
        path.into_inner(),
        auth_user.user_id,
        body.into_inner(),
    )
    .await
    {
        Ok(place) => HttpResponse::Ok().json(place),
        Err(e) => place_error_response(e),
    }
}

/// DELETE /api/places/:id - Supprimer un pin + nettoyage images best-effort (PROTÉGÉE)
#[delete("/{id}")]
pub async fn delete_place(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    media: web::Data<CloudinaryClient>,
) -> HttpResponse {
    match PlaceService::delete_place(
        db.get_ref(),
        media.get_ref(),
        path.into_inner(),
        auth_user.user_id,
    )
    .await
    {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Pin deleted"
        })),
        Err(e) => place_error_response(e),
    }
}

pub fn places_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/places")
            .service(create_place)
            .service(get_places)
            .service(update_place)
            .service(delete_place)
    );
}
