// ============================================================================
// SERVICE : AUTH
// ============================================================================
//
// Description:
//   Cycle de vie des comptes: OTP d'inscription, création de compte, login,
//   reset et changement de mot de passe, changement de username.
//
// Points d'attention:
//   - Login: email inconnu et mauvais mot de passe renvoient EXACTEMENT la
//     même erreur (pas de signal distinctif pour un attaquant)
//   - L'envoi d'email est best-effort: un transport mail en panne ne bloque
//     jamais l'inscription (le code est loggé en fallback console)
//   - Un code expiré et un code inconnu sont indistinguables (InvalidCode)
//
// ============================================================================

use chrono::{Duration, Utc};
use sea_orm::*;
use thiserror::Error;

use crate::models::otps::{self, Entity as Otps};
use crate::models::users::{self, Entity as Users};
use crate::services::mailer::Mailer;
use crate::utils::{otp, password};

/// Durée de vie d'un code OTP (alignée sur l'expiration TTL du store)
const OTP_TTL_MINUTES: i64 = 5;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User already exists!")]
    Conflict,
    #[error("Invalid or expired OTP!")]
    InvalidCode,
    #[error("Wrong email or password!")]
    InvalidCredentials,
    #[error("User not found!")]
    NotFound,
    #[error("password processing failed: {0}")]
    Hash(String),
    #[error("token generation failed: {0}")]
    Token(String),
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Réponse de login: token de session + identité publique
#[derive(Debug, serde::Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i32,
    pub username: String,
    pub email: String,
}

pub struct AuthService;

impl AuthService {
    /// Génère et persiste un code OTP pour cet email, puis tente l'envoi.
    /// `Conflict` si un compte existe déjà avec cet email.
    pub async fn send_otp(
        db: &DatabaseConnection,
        mailer: &Mailer,
        email: &str,
        username: Option<&str>,
    ) -> Result<(), AuthError> {
        let existing = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await?;

        if existing.is_some() {
            return Err(AuthError::Conflict);
        }

        let code = Self::issue_otp(db, email).await?;

        let greeting = match username {
            Some(name) => format!("Welcome to TripTale, {}! 🌍", name),
            None => "Welcome to TripTale! 🌍".to_string(),
        };
        let message = format!(
            "<h3>{}</h3><p>Your verification code is: <b>{}</b></p>",
            greeting, code
        );
        mailer
            .send(email, "TripTale Verification Code", &message, &code)
            .await;

        Ok(())
    }

    /// Vérifie le code OTP puis crée le compte.
    /// Succès => TOUS les codes en attente pour cet email sont invalidés.
    pub async fn register(
        db: &DatabaseConnection,
        username: &str,
        email: &str,
        plain_password: &str,
        code: &str,
    ) -> Result<i32, AuthError> {
        Self::find_valid_otp(db, email, code)
            .await?
            .ok_or(AuthError::InvalidCode)?;

        let hash = password::hash_password(plain_password).map_err(AuthError::Hash)?;

        let new_user = users::ActiveModel {
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            password: Set(hash),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        };
        let user = new_user.insert(db).await?;

        // Invalider tous les codes restants de cet email, pas seulement celui-ci
        Self::clear_otps(db, email).await?;

        Ok(user.id)
    }

    /// Vérifie les identifiants et émet un token de session.
    /// Email inconnu et mauvais mot de passe => même InvalidCredentials.
    pub async fn login(
        db: &DatabaseConnection,
        email: &str,
        plain_password: &str,
    ) -> Result<LoginResponse, AuthError> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let is_valid = password::verify_password(plain_password, &user.password)
            .map_err(AuthError::Hash)?;
        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let token =
            crate::utils::jwt::generate_token(user.id, &user.username).map_err(AuthError::Token)?;

        Ok(LoginResponse {
            token,
            user_id: user.id,
            username: user.username,
            email: user.email,
        })
    }

    /// Génère un code de reset pour un compte existant.
    /// `NotFound` si aucun compte n'a cet email.
    pub async fn forgot_password(
        db: &DatabaseConnection,
        mailer: &Mailer,
        email: &str,
    ) -> Result<(), AuthError> {
        Users::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await?
            .ok_or(AuthError::NotFound)?;

        let code = Self::issue_otp(db, email).await?;

        let message = format!(
            "<h3>Password Reset Request</h3><p>Your reset code is: <b>{}</b></p>",
            code
        );
        mailer
            .send(email, "Reset Password - TripTale", &message, &code)
            .await;

        Ok(())
    }

    /// Vérifie le code de reset puis remplace le hash du mot de passe.
    pub async fn reset_password(
        db: &DatabaseConnection,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        Self::find_valid_otp(db, email, code)
            .await?
            .ok_or(AuthError::InvalidCode)?;

        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await?
            .ok_or(AuthError::NotFound)?;

        let hash = password::hash_password(new_password).map_err(AuthError::Hash)?;

        let mut active: users::ActiveModel = user.into();
        active.password = Set(hash);
        active.update(db).await?;

        Self::clear_otps(db, email).await?;

        Ok(())
    }

    /// Change le mot de passe après vérification de l'ancien.
    pub async fn update_password(
        db: &DatabaseConnection,
        user_id: i32,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = Users::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or(AuthError::NotFound)?;

        let is_valid =
            password::verify_password(old_password, &user.password).map_err(AuthError::Hash)?;
        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let hash = password::hash_password(new_password).map_err(AuthError::Hash)?;

        let mut active: users::ActiveModel = user.into();
        active.password = Set(hash);
        active.update(db).await?;

        Ok(())
    }

    /// Écrase le username, sans contrainte d'unicité (seul l'email est unique).
    pub async fn update_username(
        db: &DatabaseConnection,
        user_id: i32,
        new_username: &str,
    ) -> Result<users::Model, AuthError> {
        let user = Users::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or(AuthError::NotFound)?;

        let mut active: users::ActiveModel = user.into();
        active.username = Set(new_username.to_string());
        let updated = active.update(db).await?;

        Ok(updated)
    }

    /// Insère un nouveau code (TTL 5 min) et purge au passage les lignes périmées.
    async fn issue_otp(db: &DatabaseConnection, email: &str) -> Result<String, AuthError> {
        let now = Utc::now();

        // Purge opportuniste: équivalent SQL de l'index TTL du document store
        Otps::delete_many()
            .filter(otps::Column::ExpiresAt.lte(now))
            .exec(db)
            .await?;

        let code = otp::generate_otp();
        let new_otp = otps::ActiveModel {
            email: Set(email.to_string()),
            code: Set(code.clone()),
            expires_at: Set(now + Duration::minutes(OTP_TTL_MINUTES)),
            ..Default::default()
        };
        new_otp.insert(db).await?;

        Ok(code)
    }

    /// Cherche une ligne (email, code) encore vivante.
    /// L'expiration est appliquée ici: une ligne périmée est invisible.
    async fn find_valid_otp(
        db: &DatabaseConnection,
        email: &str,
        code: &str,
    ) -> Result<Option<otps::Model>, AuthError> {
        let found = Otps::find()
            .filter(otps::Column::Email.eq(email))
            .filter(otps::Column::Code.eq(code))
            .filter(otps::Column::ExpiresAt.gt(Utc::now()))
            .one(db)
            .await?;

        Ok(found)
    }

    async fn clear_otps(db: &DatabaseConnection, email: &str) -> Result<(), AuthError> {
        Otps::delete_many()
            .filter(otps::Column::Email.eq(email))
            .exec(db)
            .await?;

        Ok(())
    }
}
