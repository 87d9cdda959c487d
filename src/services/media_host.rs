// ============================================================================
// SERVICE : MEDIA HOST (Cloudinary)
// ============================================================================
//
// Description:
//   Adaptateur pour l'hébergeur d'images. Le frontend uploade directement
//   chez Cloudinary (upload preset non signé); le backend ne fait que
//   SUPPRIMER des images devenues orphelines. La suppression passe par
//   l'Admin API avec basic auth (api_key:api_secret).
//
// Points d'attention:
//   - La suppression est best-effort: les appelants (place_service) doivent
//     attraper MediaError et continuer, jamais bloquer l'opération principale
//   - Si l'URL n'a pas la forme attendue, extract_public_id retourne None et
//     la suppression est silencieusement sautée (traitée comme déjà absente)
//
// ============================================================================

use async_trait::async_trait;
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media host transport error: {0}")]
    Transport(String),
    #[error("media host rejected the request: {0}")]
    Remote(String),
}

//trait = Interface (permet d'injecter un double en test)
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Supprime l'image hébergée correspondant à cette URL.
    /// URL sans public_id reconnaissable => no-op réussi.
    async fn delete_image(&self, url: &str) -> Result<(), MediaError>;
}

/// Extrait le public_id Cloudinary depuis une URL hébergée.
/// Forme attendue: .../<dossier>/<public_id>.<extension>
/// Retourne None si le dernier segment n'a pas d'extension ou un stem vide.
pub fn extract_public_id(url: &str) -> Option<String> {
    // Ignorer query string et fragment
    let path = url.split(['?', '#']).next().unwrap_or(url);

    if !path.contains('/') {
        return None;
    }

    let last_segment = path.rsplit('/').next()?;
    let (stem, extension) = last_segment.split_once('.')?;

    if stem.is_empty() || extension.is_empty() {
        return None;
    }

    Some(stem.to_string())
}

/// Client Cloudinary réel (Admin API).
#[derive(Clone)]
pub struct CloudinaryClient {
    http: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryClient {
    pub fn new(http: reqwest::Client, cloud_name: String, api_key: String, api_secret: String) -> Self {
        Self { http, cloud_name, api_key, api_secret }
    }

    /// Construit le client depuis les variables d'environnement
    pub fn from_env(http: reqwest::Client) -> Result<Self, String> {
        let cloud_name = env::var("CLOUDINARY_CLOUD_NAME")
            .map_err(|_| "CLOUDINARY_CLOUD_NAME must be set in .env file".to_string())?;
        let api_key = env::var("CLOUDINARY_API_KEY")
            .map_err(|_| "CLOUDINARY_API_KEY must be set in .env file".to_string())?;
        let api_secret = env::var("CLOUDINARY_API_SECRET")
            .map_err(|_| "CLOUDINARY_API_SECRET must be set in .env file".to_string())?;

        Ok(Self::new(http, cloud_name, api_key, api_secret))
    }
}

#[async_trait]
impl MediaHost for CloudinaryClient {
    async fn delete_image(&self, url: &str) -> Result<(), MediaError> {
        // 1. Extraire le public_id; URL inconnue => rien à supprimer
        let public_id = match extract_public_id(url) {
            Some(id) => id,
            None => {
                println!("⏭️  Skipping delete, unrecognized image URL: {}", url);
                return Ok(());
            }
        };

        // 2. Appeler l'Admin API Cloudinary
        let endpoint = format!(
            "https://api.cloudinary.com/v1_1/{}/resources/image/upload",
            self.cloud_name
        );

        let response = self
            .http
            .delete(&endpoint)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .query(&[("public_ids[]", public_id.as_str())])
            .send()
            .await
            .map_err(|e| MediaError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MediaError::Remote(format!(
                "status {} for public_id {}",
                response.status(),
                public_id
            )));
        }

        println!("🗑️  Cloudinary deleted: {}", public_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_public_id_standard_url() {
        let url = "https://res.cloudinary.com/demo/image/upload/v1700000000/triptale/kyoto123.jpg";
        assert_eq!(extract_public_id(url), Some("kyoto123".to_string()));
    }

    #[test]
    fn test_extract_public_id_ignores_query_string() {
        let url = "https://res.cloudinary.com/demo/image/upload/abc.png?versionId=2";
        assert_eq!(extract_public_id(url), Some("abc".to_string()));
    }

    #[test]
    fn test_extract_public_id_no_extension() {
        assert_eq!(extract_public_id("https://example.com/some/segment"), None);
    }

    #[test]
    fn test_extract_public_id_not_a_url() {
        assert_eq!(extract_public_id("not-a-cloudinary-url"), None);
        assert_eq!(extract_public_id(""), None);
    }

    #[test]
    fn test_extract_public_id_empty_stem() {
        assert_eq!(extract_public_id("https://example.com/folder/.jpg"), None);
    }
}
