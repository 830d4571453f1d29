use axum::{extract::State, http::StatusCode, Json};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::error::ApiError;
use super::forms::{self, FormDescriptor};
use gigboard_db::entities::{artist, show, venue};
use gigboard_db::listings::{assemble_show_listing, ShowListingEntry};
use gigboard_db::AppState;

#[derive(Debug, Deserialize)]
pub struct ShowPayload {
    pub venue_id: i32,
    pub artist_id: i32,
    pub start_time: chrono::DateTime<chrono::FixedOffset>,
}

#[derive(Debug, Serialize)]
pub struct ShowCreatedResponse {
    pub message: String,
    pub show: show::Model,
}

/// GET /shows — every show joined with both display names, ascending by time
pub async fn list_shows(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ShowListingEntry>>, ApiError> {
    let shows = show::Entity::find().all(&state.db).await?;
    if shows.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let venue_ids: Vec<i32> = shows.iter().map(|s| s.venue_id).collect();
    let artist_ids: Vec<i32> = shows.iter().map(|s| s.artist_id).collect();

    let venues_by_id: HashMap<i32, venue::Model> = venue::Entity::find()
        .filter(venue::Column::Id.is_in(venue_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|v| (v.id, v))
        .collect();
    let artists_by_id: HashMap<i32, artist::Model> = artist::Entity::find()
        .filter(artist::Column::Id.is_in(artist_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();

    Ok(Json(assemble_show_listing(
        shows,
        &venues_by_id,
        &artists_by_id,
    )))
}

/// GET /shows/create — form descriptor for the presentation layer
pub async fn create_show_form() -> Json<FormDescriptor> {
    Json(forms::show_form())
}

/// POST /shows/create
///
/// Both referenced ids are checked inside the transaction before the insert,
/// so a bad reference fails without leaving a row behind.
pub async fn create_show(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ShowPayload>,
) -> Result<(StatusCode, Json<ShowCreatedResponse>), ApiError> {
    let txn = state.db.begin().await?;

    venue::Entity::find_by_id(body.venue_id)
        .one(&txn)
        .await?
        .ok_or(ApiError::NotFound("Venue"))?;
    artist::Entity::find_by_id(body.artist_id)
        .one(&txn)
        .await?
        .ok_or(ApiError::NotFound("Artist"))?;

    let created = show::ActiveModel {
        venue_id: Set(body.venue_id),
        artist_id: Set(body.artist_id),
        start_time: Set(body.start_time),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(ShowCreatedResponse {
            message: "Show was successfully listed!".to_string(),
            show: created,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn make_payload() -> ShowPayload {
        ShowPayload {
            venue_id: 1,
            artist_id: 2,
            start_time: chrono::DateTime::parse_from_rfc3339("2025-06-20T21:30:00+00:00").unwrap(),
        }
    }

    fn make_venue_model() -> venue::Model {
        venue::Model {
            id: 1,
            name: "The Fillmore".into(),
            city: "SF".into(),
            state: "CA".into(),
            address: "1805 Geary St".into(),
            phone: "415-555-0100".into(),
            image_link: String::new(),
            facebook_link: String::new(),
            genres: "Rock n Roll".into(),
            website_link: String::new(),
            seeking_talent: false,
            seeking_description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_show_missing_venue_fails_before_insert() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<venue::Model>::new()])
            .into_connection();
        let state = Arc::new(AppState { db });

        let err = create_show(State(state.clone()), Json(make_payload()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound("Venue")));

        let state = Arc::try_unwrap(state).ok().unwrap();
        let log = format!("{:?}", state.db.into_transaction_log());
        assert!(!log.contains("INSERT"));
    }

    #[tokio::test]
    async fn test_create_show_missing_artist_fails_before_insert() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![make_venue_model()]])
            .append_query_results([Vec::<artist::Model>::new()])
            .into_connection();
        let state = Arc::new(AppState { db });

        let err = create_show(State(state.clone()), Json(make_payload()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound("Artist")));

        let state = Arc::try_unwrap(state).ok().unwrap();
        let log = format!("{:?}", state.db.into_transaction_log());
        assert!(!log.contains("INSERT"));
    }

    #[test]
    fn test_show_payload_deserialization() {
        let json = r#"{
            "venue_id": 1,
            "artist_id": 2,
            "start_time": "2025-06-20T21:30:00+00:00"
        }"#;
        let payload: ShowPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.venue_id, 1);
        assert_eq!(payload.artist_id, 2);
        assert_eq!(payload.start_time.to_rfc3339(), "2025-06-20T21:30:00+00:00");
    }

    #[test]
    fn test_show_payload_rejects_missing_start_time() {
        let json = r#"{"venue_id": 1, "artist_id": 2}"#;
        assert!(serde_json::from_str::<ShowPayload>(json).is_err());
    }

    #[test]
    fn test_show_created_response_serialization() {
        let resp = ShowCreatedResponse {
            message: "Show was successfully listed!".to_string(),
            show: show::Model {
                id: 3,
                venue_id: 1,
                artist_id: 2,
                start_time: chrono::DateTime::parse_from_rfc3339("2025-06-20T21:30:00+00:00")
                    .unwrap(),
            },
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["message"], "Show was successfully listed!");
        assert_eq!(json["show"]["venue_id"], 1);
    }
}
