use actix_web::{delete, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::middleware::AuthUser;
use crate::services::auth_service::{AuthError, AuthService};
use crate::services::mailer::Mailer;
use crate::services::media_host::CloudinaryClient;
use crate::services::place_service::{PlaceError, PlaceService};

// DTO pour la demande d'OTP d'inscription
#[derive(Deserialize)]
pub struct SendOtpRequest {
    pub email: String,
    pub username: Option<String>,
}

// DTO pour l'inscription
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub otp: String,
}

// DTO pour la connexion
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// DTO pour la demande de reset
#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

// DTO pour le reset par code
#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub otp: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

// DTO pour changer le mot de passe (connecté)
#[derive(Deserialize)]
pub struct UpdatePasswordRequest {
    #[serde(rename = "oldPassword")]
    pub old_password: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

// DTO pour changer le username
#[derive(Deserialize)]
pub struct UpdateUsernameRequest {
    #[serde(rename = "newUsername")]
    pub new_username: String,
}

/// Traduit une AuthError en réponse HTTP
/// InvalidCode et InvalidCredentials restent volontairement vagues
fn auth_error_response(e: AuthError) -> HttpResponse {
    match e {
        AuthError::Conflict => HttpResponse::Conflict().json(serde_json::json!({
            "error": e.to_string()
        })),
        AuthError::InvalidCode | AuthError::InvalidCredentials => {
            HttpResponse::Unauthorized().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
        AuthError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
            "error": e.to_string()
        })),
        AuthError::Hash(_) | AuthError::Token(_) | AuthError::Db(_) => {
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Server error: {}", e)
            }))
        }
    }
}

/// POST /api/users/send-otp - Démarrer une inscription (PUBLIC)
#[post("/send-otp")]
pub async fn send_otp(
    body: web::Json<SendOtpRequest>,
    db: web::Data<DatabaseConnection>,
    mailer: web::Data<Mailer>,
) -> HttpResponse {
    match AuthService::send_otp(
        db.get_ref(),
        mailer.get_ref(),
        &body.email,
        body.username.as_deref(),
    )
    .await
    {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "message": "OTP sent! (Check email or server console)"
        })),
        Err(e) => auth_error_response(e),
    }
}

/// POST /api/users/register - Vérifier le code et créer le compte (PUBLIC)
#[post("/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match AuthService::register(
        db.get_ref(),
        &body.username,
        &body.email,
        &body.password,
        &body.otp,
    )
    .await
    {
        Ok(user_id) => HttpResponse::Created().json(serde_json::json!({
            "userId": user_id
        })),
        Err(e) => auth_error_response(e),
    }
}

/// POST /api/users/login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match AuthService::login(db.get_ref(), &body.email, &body.password).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => auth_error_response(e),
    }
}

/// POST /api/users/forgot-password - Demander un code de reset (PUBLIC)
#[post("/forgot-password")]
pub async fn forgot_password(
    body: web::Json<ForgotPasswordRequest>,
    db: web::Data<DatabaseConnection>,
    mailer: web::Data<Mailer>,
) -> HttpResponse {
    match AuthService::forgot_password(db.get_ref(), mailer.get_ref(), &body.email).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "message": "OTP sent. (Check console if email fails)"
        })),
        Err(e) => auth_error_response(e),
    }
}

/// POST /api/users/reset-password - Vérifier le code, remplacer le mot de passe (PUBLIC)
#[post("/reset-password")]
pub async fn reset_password(
    body: web::Json<ResetPasswordRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match AuthService::reset_password(db.get_ref(), &body.email, &body.otp, &body.new_password)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Password updated!"
        })),
        Err(e) => auth_error_response(e),
    }
}

/// POST /api/users/update-password - Changer son mot de passe (PROTÉGÉE)
#[post("/update-password")]
pub async fn update_password(
    auth_user: AuthUser,
    body: web::Json<UpdatePasswordRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match AuthService::update_password(
        db.get_ref(),
        auth_user.user_id,
        &body.old_password,
        &body.new_password,
    )
    .await
    {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Password updated successfully!"
        })),
        Err(e) => auth_error_response(e),
    }
}

/// PUT /api/users/update-username - Écraser le username (PROTÉGÉE)
/// Pas de contrainte d'unicité: seul l'email est unique
#[put("/update-username")]
pub async fn update_username(
    auth_user: AuthUser,
    body: web::Json<UpdateUsernameRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match AuthService::update_username(db.get_ref(), auth_user.user_id, &body.new_username).await {
        Ok(user) => HttpResponse::Ok().json(serde_json::json!({
            "userId": user.id,
            "username": user.username
        })),
        Err(e) => auth_error_response(e),
    }
}

/// DELETE /api/users/delete-account/:id - Cascade compte entier (PROTÉGÉE)
/// Ordre: images (best-effort) → pins → user
#[delete("/delete-account/{id}")]
pub async fn delete_account(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    media: web::Data<CloudinaryClient>,
) -> HttpResponse {
    let target_id = path.into_inner();

    // On ne supprime que son propre compte
    if auth_user.user_id != target_id {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "You can only delete your own account"
        }));
    }

    match PlaceService::delete_account(db.get_ref(), media.get_ref(), target_id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Account deleted"
        })),
        Err(PlaceError::NotFound) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Account not found"
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Server error: {}", e)
        })),
    }
}

pub fn users_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(send_otp)
            .service(register)
            .service(login)
            .service(forgot_password)
            .service(reset_password)
            .service(update_password)
            .service(update_username)
            .service(delete_account)
    );
}
