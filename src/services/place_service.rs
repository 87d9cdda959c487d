// ============================================================================
// SERVICE : PLACES (réconciliation pins / images hébergées)
// ============================================================================
//
// Description:
//   Garde le store de pins et l'ensemble des images vivantes chez l'hébergeur
//   cohérents à travers édition / suppression / suppression de compte.
//   Politique: best-effort at-least-once pour le nettoyage distant,
//   autoritaire pour les métadonnées locales.
//
// Points d'attention:
//   - L'édition est un remplacement intégral: la liste d'images soumise par
//     le client est la vérité terrain; toute URL stockée absente du payload
//     est orpheline et supprimée chez l'hébergeur
//   - Un échec de suppression distante ne bloque JAMAIS l'opération
//     principale (l'utilisateur ne doit pas être empêché de supprimer ses
//     données parce que l'hébergeur d'images est en panne)
//   - Ordre assumé: suppression distante PUIS écriture locale; un crash entre
//     les deux laisse une image supprimée encore référencée (fenêtre
//     acceptée, aucune passe de réparation)
//   - La cascade de compte est idempotente: un retry après crash partiel ne
//     doit pas échouer sur des lignes déjà absentes
//
// ============================================================================

use std::collections::HashSet;

use chrono::Utc;
use futures::future::join_all;
use sea_orm::*;
use thiserror::Error;

use crate::models::dto::PlacePayload;
use crate::models::places::{self, Entity as Places, PlaceImages, PlaceStatus};
use crate::models::users::Entity as Users;
use crate::services::media_host::{extract_public_id, MediaHost};

#[derive(Debug, Error)]
pub enum PlaceError {
    #[error("Pin not found!")]
    NotFound,
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Bilan d'un batch de suppressions distantes. Collecté pour l'observabilité:
/// l'opération parente réussit même si tout le batch a échoué.
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub attempted: usize,
    pub skipped: usize,
    pub failed: Vec<String>,
}

impl CleanupReport {
    fn log(&self, operation: &str) {
        if self.attempted == 0 && self.skipped == 0 {
            return;
        }
        println!(
            "🧹 Image cleanup ({}): {} attempted, {} skipped, {} failed",
            operation,
            self.attempted,
            self.skipped,
            self.failed.len()
        );
    }
}

pub struct PlaceService;

impl PlaceService {
    /// Crée un pin. Les images sont supposées déjà uploadées par le client;
    /// aucun rollback côté hébergeur si l'insertion échoue (non-but assumé).
    pub async fn create_place(
        db: &DatabaseConnection,
        owner_id: i32,
        payload: PlacePayload,
    ) -> Result<places::Model, PlaceError> {
        let (rating, visit_date) = effective_rating_and_date(&payload);
        let now = Utc::now();

        let new_place = places::ActiveModel {
            user_id: Set(owner_id),
            title: Set(payload.title),
            description: Set(payload.description),
            status: Set(payload.status),
            rating: Set(rating),
            visit_date: Set(visit_date),
            lat: Set(payload.location.lat),
            lng: Set(payload.location.lng),
            address: Set(payload.location.address),
            images: Set(PlaceImages(payload.images)),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        };

        let place = new_place.insert(db).await?;
        println!("✅ Pin saved for user {}: {}", place.user_id, place.title);

        Ok(place)
    }

    /// Liste les pins d'un propriétaire.
    /// Sans propriétaire: liste vide, jamais les pins des autres
    /// (défaut de confidentialité voulu, pas un oubli).
    pub async fn get_places(
        db: &DatabaseConnection,
        owner_id: Option<i32>,
    ) -> Result<Vec<places::Model>, PlaceError> {
        let Some(owner_id) = owner_id else {
            return Ok(Vec::new());
        };

        let found = Places::find()
            .filter(places::Column::UserId.eq(owner_id))
            .order_by_desc(places::Column::Id)
            .all(db)
            .await?;

        Ok(found)
    }

    /// Remplacement intégral d'un pin + réconciliation des images.
    /// 1. charge l'état courant (NotFound si absent ou pas au propriétaire)
    /// 2. diff: URLs stockées absentes du payload = orphelines
    /// 3. suppression distante best-effort des orphelines (concurrente)
    /// 4. écrase tous les champs déclarés avec le payload
    /// 5. status bucket-list => rating et visit_date forcés à NULL
    pub async fn update_place<M: MediaHost + ?Sized>(
        db: &DatabaseConnection,
        media: &M,
        place_id: i32,
        owner_id: i32,
        payload: PlacePayload,
    ) -> Result<places::Model, PlaceError> {
        let current = Places::find_by_id(place_id)
            .one(db)
            .await?
            .ok_or(PlaceError::NotFound)?;

        // Ne pas révéler l'existence d'un pin d'autrui
        if current.user_id != owner_id {
            return Err(PlaceError::NotFound);
        }

        let submitted: HashSet<&str> = payload.images.iter().map(|img| img.url.as_str()).collect();
        let orphaned: Vec<String> = current
            .images
            .0
            .iter()
            .filter(|img| !submitted.contains(img.url.as_str()))
            .map(|img| img.url.clone())
            .collect();

        let report = Self::delete_images_batch(media, &orphaned).await;
        report.log("edit");

        let (rating, visit_date) = effective_rating_and_date(&payload);

        let mut active: places::ActiveModel = current.into();
        active.title = Set(payload.title);
        active.description = Set(payload.description);
        active.status = Set(payload.status);
        active.rating = Set(rating);
        active.visit_date = Set(visit_date);
        active.lat = Set(payload.location.lat);
        active.lng = Set(payload.location.lng);
        active.address = Set(payload.location.address);
        active.images = Set(PlaceImages(payload.images));
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await?;

        Ok(updated)
    }

    /// Supprime un pin: tentative de suppression de chaque image référencée,
    /// puis suppression INCONDITIONNELLE de la ligne (même si tout le
    /// nettoyage distant a échoué).
    pub async fn delete_place<M: MediaHost + ?Sized>(
        db: &DatabaseConnection,
        media: &M,
        place_id: i32,
        owner_id: i32,
    ) -> Result<(), PlaceError> {
        let current = Places::find_by_id(place_id)
            .one(db)
            .await?
            .ok_or(PlaceError::NotFound)?;

        if current.user_id != owner_id {
            return Err(PlaceError::NotFound);
        }

        let urls: Vec<String> = current.images.0.iter().map(|img| img.url.clone()).collect();
        let report = Self::delete_images_batch(media, &urls).await;
        report.log("delete");

        Places::delete_by_id(place_id).exec(db).await?;
        println!("🗑️  Pin {} deleted", place_id);

        Ok(())
    }

    /// Cascade de suppression de compte:
    ///   images (best-effort, un seul batch aplati) → pins → user.
    /// Idempotente: un retry sur une cascade partiellement exécutée ne doit
    /// pas échouer sur les lignes déjà absentes.
    pub async fn delete_account<M: MediaHost + ?Sized>(
        db: &DatabaseConnection,
        media: &M,
        user_id: i32,
    ) -> Result<(), PlaceError> {
        let owned = Places::find()
            .filter(places::Column::UserId.eq(user_id))
            .all(db)
            .await?;

        let urls: Vec<String> = owned
            .iter()
            .flat_map(|place| place.images.0.iter().map(|img| img.url.clone()))
            .collect();

        let report = Self::delete_images_batch(media, &urls).await;
        report.log("account cascade");

        let deleted_places = Places::delete_many()
            .filter(places::Column::UserId.eq(user_id))
            .exec(db)
            .await?;

        // rows_affected peut être 0 sur un retry: accepté
        Users::delete_by_id(user_id).exec(db).await?;

        println!(
            "🧹 Account {} removed ({} pins, {} image deletions attempted)",
            user_id, deleted_places.rows_affected, report.attempted
        );

        Ok(())
    }

    /// Supprime un lot d'URLs chez l'hébergeur, en concurrence, et collecte
    /// les échecs sans les propager. Les URLs sans public_id reconnaissable
    /// sont sautées (traitées comme déjà absentes).
    async fn delete_images_batch<M: MediaHost + ?Sized>(media: &M, urls: &[String]) -> CleanupReport {
        let (deletable, skipped): (Vec<&String>, Vec<&String>) = urls
            .iter()
            .partition(|url| extract_public_id(url).is_some());

        for url in &skipped {
            println!("⏭️  Skipping unrecognized image URL: {}", url);
        }

        let outcomes = join_all(deletable.iter().map(|url| async move {
            (url.as_str(), media.delete_image(url).await)
        }))
        .await;

        let mut failed = Vec::new();
        for (url, outcome) in outcomes {
            if let Err(e) = outcome {
                eprintln!("⚠️  Failed to delete image {}: {}", url, e);
                failed.push(url.to_string());
            }
        }

        CleanupReport {
            attempted: deletable.len(),
            skipped: skipped.len(),
            failed,
        }
    }
}

/// Invariant bucket-list: rating et visit_date n'ont de sens que pour un
/// lieu visité; pour un rêve bucket-list ils sont forcés à NULL quoi que le
/// client ait soumis.
fn effective_rating_and_date(
    payload: &PlacePayload,
) -> (Option<i32>, Option<chrono::NaiveDate>) {
    match payload.status {
        PlaceStatus::Visited => (payload.rating, payload.visit_date),
        PlaceStatus::BucketList => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dto::LocationPayload;
    use crate::models::places::PlaceImage;
    use crate::services::media_host::MediaError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Mutex;

    /// Double de l'hébergeur d'images: enregistre les URLs reçues et peut
    /// simuler une panne transport
    struct RecordingMediaHost {
        deleted: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingMediaHost {
        fn new(fail: bool) -> Self {
            Self {
                deleted: Mutex::new(Vec::new()),
                fail,
            }
        }

        fn deleted_urls(&self) -> Vec<String> {
            self.deleted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MediaHost for RecordingMediaHost {
        async fn delete_image(&self, url: &str) -> Result<(), MediaError> {
            self.deleted.lock().unwrap().push(url.to_string());
            if self.fail {
                Err(MediaError::Transport("simulated outage".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn hosted_url(public_id: &str) -> String {
        format!(
            "https://res.cloudinary.com/demo/image/upload/v1/triptale/{}.jpg",
            public_id
        )
    }

    fn image(public_id: &str) -> PlaceImage {
        PlaceImage {
            url: hosted_url(public_id),
            caption: format!("caption for {}", public_id),
        }
    }

    fn place_fixture(id: i32, user_id: i32, images: Vec<PlaceImage>) -> places::Model {
        places::Model {
            id,
            user_id,
            title: "Kyoto".to_string(),
            description: "Autumn temples".to_string(),
            status: PlaceStatus::Visited,
            rating: Some(5),
            visit_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            lat: 35.0116,
            lng: 135.7681,
            address: Some("Kyoto, Japan".to_string()),
            images: PlaceImages(images),
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }

    fn payload(status: PlaceStatus, images: Vec<PlaceImage>) -> PlacePayload {
        PlacePayload {
            title: "Kyoto".to_string(),
            description: "Autumn temples".to_string(),
            status,
            rating: Some(4),
            visit_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            location: LocationPayload {
                lat: 35.0116,
                lng: 135.7681,
                address: Some("Kyoto, Japan".to_string()),
            },
            images,
        }
    }

    #[tokio::test]
    async fn test_edit_deletes_exactly_the_orphaned_urls() {
        // Stocké: [A, B]; soumis: [B, C] => une seule suppression, pour A
        let stored = place_fixture(1, 10, vec![image("aaa"), image("bbb")]);
        let submitted = vec![image("bbb"), image("ccc")];
        let expected = place_fixture(1, 10, submitted.clone());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored]])
            .append_query_results([vec![expected]])
            .into_connection();
        let media = RecordingMediaHost::new(false);

        let updated = PlaceService::update_place(
            &db,
            &media,
            1,
            10,
            payload(PlaceStatus::Visited, submitted.clone()),
        )
        .await
        .unwrap();

        assert_eq!(media.deleted_urls(), vec![hosted_url("aaa")]);
        assert_eq!(updated.images.0, submitted);
    }

    #[tokio::test]
    async fn test_edit_with_retained_images_calls_no_deletes() {
        let stored = place_fixture(1, 10, vec![image("aaa"), image("bbb")]);
        let kept = stored.images.0.clone();
        let expected = stored.clone();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored]])
            .append_query_results([vec![expected]])
            .into_connection();
        let media = RecordingMediaHost::new(false);

        PlaceService::update_place(&db, &media, 1, 10, payload(PlaceStatus::Visited, kept))
            .await
            .unwrap();

        assert!(media.deleted_urls().is_empty());
    }

    #[tokio::test]
    async fn test_edit_unknown_pin_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<places::Model>::new()])
            .into_connection();
        let media = RecordingMediaHost::new(false);

        let result =
            PlaceService::update_place(&db, &media, 99, 10, payload(PlaceStatus::Visited, vec![]))
                .await;
        assert!(matches!(result, Err(PlaceError::NotFound)));
    }

    #[tokio::test]
    async fn test_edit_someone_elses_pin_is_not_found() {
        let stored = place_fixture(1, 10, vec![image("aaa")]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored]])
            .into_connection();
        let media = RecordingMediaHost::new(false);

        let result =
            PlaceService::update_place(&db, &media, 1, 11, payload(PlaceStatus::Visited, vec![]))
                .await;

        assert!(matches!(result, Err(PlaceError::NotFound)));
        // Aucune suppression tentée pour un pin qui n'est pas au demandeur
        assert!(media.deleted_urls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_record_even_when_every_image_delete_fails() {
        let stored = place_fixture(3, 10, vec![image("aaa"), image("bbb")]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let media = RecordingMediaHost::new(true); // panne simulée

        let result = PlaceService::delete_place(&db, &media, 3, 10).await;

        assert!(result.is_ok());
        assert_eq!(media.deleted_urls().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_skips_unrecognized_url_but_still_removes_record() {
        let stored = place_fixture(
            4,
            10,
            vec![PlaceImage {
                url: "not-a-hosted-image".to_string(),
                caption: String::new(),
            }],
        );
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let media = RecordingMediaHost::new(false);

        let result = PlaceService::delete_place(&db, &media, 4, 10).await;

        assert!(result.is_ok());
        // public_id inextractible => aucune tentative distante
        assert!(media.deleted_urls().is_empty());
    }

    #[tokio::test]
    async fn test_account_cascade_survives_failing_media_host() {
        let owned = vec![
            place_fixture(1, 9, vec![image("aaa"), image("bbb")]),
            place_fixture(2, 9, vec![image("ccc")]),
        ];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([owned])
            .append_exec_results([
                MockExecResult { last_insert_id: 0, rows_affected: 2 }, // places
                MockExecResult { last_insert_id: 0, rows_affected: 1 }, // user
            ])
            .into_connection();
        let media = RecordingMediaHost::new(true);

        let result = PlaceService::delete_account(&db, &media, 9).await;

        assert!(result.is_ok());
        // Les 3 images du compte sont passées dans UN batch aplati
        assert_eq!(media.deleted_urls().len(), 3);
    }

    #[tokio::test]
    async fn test_account_cascade_retry_is_idempotent() {
        // Retry après cascade partielle: plus aucun pin, user déjà absent
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<places::Model>::new()])
            .append_exec_results([
                MockExecResult { last_insert_id: 0, rows_affected: 0 },
                MockExecResult { last_insert_id: 0, rows_affected: 0 },
            ])
            .into_connection();
        let media = RecordingMediaHost::new(false);

        let result = PlaceService::delete_account(&db, &media, 9).await;

        assert!(result.is_ok());
        assert!(media.deleted_urls().is_empty());
    }

    #[tokio::test]
    async fn test_listing_without_owner_returns_empty_never_all() {
        // Aucun résultat mocké: si le service interrogeait la base, le mock
        // échouerait
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let found = PlaceService::get_places(&db, None).await.unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_bucket_list_forces_null_rating_and_visit_date() {
        let p = payload(PlaceStatus::BucketList, vec![]);
        assert_eq!(effective_rating_and_date(&p), (None, None));

        let p = payload(PlaceStatus::Visited, vec![]);
        assert_eq!(
            effective_rating_and_date(&p),
            (Some(4), NaiveDate::from_ymd_opt(2024, 1, 1))
        );
    }
}
