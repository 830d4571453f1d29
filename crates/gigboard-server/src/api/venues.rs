use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{require_field, ApiError};
use super::forms::{self, FormDescriptor};
use super::SearchResults;
use gigboard_db::entities::{artist, show, venue};
use gigboard_db::listings::{
    self, count_upcoming_shows, group_venues_by_location, split_shows_by_time, LocationGroup,
    PartneredShow, VenueSummary,
};
use gigboard_db::{genres, AppState};

#[derive(Debug, Serialize)]
pub struct VenueResponse {
    pub id: i32,
    pub name: String,
    pub genres: Vec<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website: String,
    pub facebook_link: String,
    pub seeking_talent: bool,
    pub seeking_description: String,
    pub image_link: String,
}

impl From<venue::Model> for VenueResponse {
    fn from(v: venue::Model) -> Self {
        Self {
            id: v.id,
            name: v.name,
            genres: genres::decode(&v.genres),
            address: v.address,
            city: v.city,
            state: v.state,
            phone: v.phone,
            website: v.website_link,
            facebook_link: v.facebook_link,
            seeking_talent: v.seeking_talent,
            seeking_description: v.seeking_description,
            image_link: v.image_link,
        }
    }
}

/// A show on the venue detail page, seen from the venue's side.
#[derive(Debug, Serialize)]
pub struct ArtistShowEntry {
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: String,
    pub start_time: String,
}

impl From<listings::ShowEntry> for ArtistShowEntry {
    fn from(e: listings::ShowEntry) -> Self {
        Self {
            artist_id: e.partner_id,
            artist_name: e.partner_name,
            artist_image_link: e.partner_image_link,
            start_time: e.start_time,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VenueDetailResponse {
    #[serde(flatten)]
    pub venue: VenueResponse,
    pub past_shows: Vec<ArtistShowEntry>,
    pub upcoming_shows: Vec<ArtistShowEntry>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

/// Create/edit submission. Edit is a full overwrite of every editable field.
#[derive(Debug, Deserialize)]
pub struct VenuePayload {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    #[serde(default)]
    pub image_link: String,
    #[serde(default)]
    pub facebook_link: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub website_link: String,
    /// Checkbox contract: absent means unchecked
    #[serde(default)]
    pub seeking_talent: bool,
    #[serde(default)]
    pub seeking_description: String,
}

impl VenuePayload {
    fn validate(&self) -> Result<(), ApiError> {
        require_field("name", &self.name)?;
        require_field("city", &self.city)?;
        require_field("state", &self.state)?;
        require_field("address", &self.address)?;
        require_field("phone", &self.phone)?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct VenueCreatedResponse {
    pub message: String,
    pub venue: VenueResponse,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub search_term: String,
}

#[derive(Debug, Serialize)]
pub struct VenueEditFormResponse {
    pub form: FormDescriptor,
    pub venue: VenueResponse,
}

/// GET /venues — venues grouped by (city, state) with upcoming-show counts
pub async fn list_venues(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LocationGroup>>, ApiError> {
    let venues = venue::Entity::find()
        .order_by_asc(venue::Column::Id)
        .all(&state.db)
        .await?;
    let shows = show::Entity::find().all(&state.db).await?;

    let now = chrono::Utc::now().fixed_offset();
    Ok(Json(group_venues_by_location(venues, &shows, now)))
}

/// POST /venues/search — case-insensitive name substring search
pub async fn search_venues(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<SearchResults<VenueSummary>>, ApiError> {
    let pattern = super::like_pattern(&body.search_term);

    let venues = venue::Entity::find()
        .filter(Expr::col(venue::Column::Name).ilike(pattern.as_str()))
        .order_by_asc(venue::Column::Id)
        .all(&state.db)
        .await?;

    let ids: Vec<i32> = venues.iter().map(|v| v.id).collect();
    let shows = if ids.is_empty() {
        Vec::new()
    } else {
        show::Entity::find()
            .filter(show::Column::VenueId.is_in(ids))
            .all(&state.db)
            .await?
    };

    let now = chrono::Utc::now().fixed_offset();
    let data: Vec<VenueSummary> = venues
        .into_iter()
        .map(|v| {
            let venue_shows: Vec<show::Model> =
                shows.iter().filter(|s| s.venue_id == v.id).cloned().collect();
            VenueSummary {
                id: v.id,
                name: v.name,
                num_upcoming_shows: count_upcoming_shows(&venue_shows, now),
            }
        })
        .collect();

    Ok(Json(SearchResults {
        count: data.len(),
        data,
    }))
}

/// GET /venues/:id — detail plus past/upcoming show history
pub async fn get_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<VenueDetailResponse>, ApiError> {
    let venue_model = venue::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound("Venue"))?;

    let rows = show::Entity::find()
        .filter(show::Column::VenueId.eq(id))
        .find_also_related(artist::Entity)
        .all(&state.db)
        .await?;

    let partnered: Vec<PartneredShow> = rows
        .into_iter()
        .filter_map(|(show, artist)| match artist {
            Some(a) => Some(PartneredShow {
                partner_id: a.id,
                partner_name: a.name,
                partner_image_link: a.image_link,
                start_time: show.start_time,
            }),
            None => {
                tracing::warn!(show_id = show.id, "show has no artist, skipping");
                None
            }
        })
        .collect();

    let now = chrono::Utc::now().fixed_offset();
    let split = split_shows_by_time(partnered, now);

    Ok(Json(VenueDetailResponse {
        venue: VenueResponse::from(venue_model),
        past_shows_count: split.past.len(),
        upcoming_shows_count: split.upcoming.len(),
        past_shows: split.past.into_iter().map(ArtistShowEntry::from).collect(),
        upcoming_shows: split
            .upcoming
            .into_iter()
            .map(ArtistShowEntry::from)
            .collect(),
    }))
}

/// GET /venues/create — form descriptor for the presentation layer
pub async fn create_venue_form() -> Json<FormDescriptor> {
    Json(forms::venue_form())
}

/// POST /venues/create
pub async fn create_venue(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VenuePayload>,
) -> Result<(StatusCode, Json<VenueCreatedResponse>), ApiError> {
    body.validate()?;

    let txn = state.db.begin().await?;
    let created = venue::ActiveModel {
        name: Set(body.name),
        city: Set(body.city),
        state: Set(body.state),
        address: Set(body.address),
        phone: Set(body.phone),
        image_link: Set(body.image_link),
        facebook_link: Set(body.facebook_link),
        genres: Set(genres::encode(&body.genres)),
        website_link: Set(body.website_link),
        seeking_talent: Set(body.seeking_talent),
        seeking_description: Set(body.seeking_description),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    let message = format!("Venue {} was successfully listed!", created.name);
    Ok((
        StatusCode::CREATED,
        Json(VenueCreatedResponse {
            message,
            venue: VenueResponse::from(created),
        }),
    ))
}

/// DELETE /venues/:id — rejected while the venue still has booked shows
pub async fn delete_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let txn = state.db.begin().await?;

    let existing = venue::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(ApiError::NotFound("Venue"))?;

    let dependents = show::Entity::find()
        .filter(show::Column::VenueId.eq(id))
        .count(&txn)
        .await?;
    if dependents > 0 {
        return Err(ApiError::Conflict(format!(
            "Venue {} has {dependents} booked show(s) and cannot be deleted",
            existing.name
        )));
    }

    venue::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /venues/:id/edit — prefilled form descriptor
pub async fn edit_venue_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<VenueEditFormResponse>, ApiError> {
    let venue_model = venue::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound("Venue"))?;

    Ok(Json(VenueEditFormResponse {
        form: forms::venue_form(),
        venue: VenueResponse::from(venue_model),
    }))
}

/// POST /venues/:id/edit — full overwrite of every editable field
pub async fn edit_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(body): Json<VenuePayload>,
) -> Result<Json<VenueResponse>, ApiError> {
    body.validate()?;

    let txn = state.db.begin().await?;
    let existing = venue::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(ApiError::NotFound("Venue"))?;

    let mut active: venue::ActiveModel = existing.into();
    active.name = Set(body.name);
    active.city = Set(body.city);
    active.state = Set(body.state);
    active.address = Set(body.address);
    active.phone = Set(body.phone);
    active.image_link = Set(body.image_link);
    active.facebook_link = Set(body.facebook_link);
    active.genres = Set(genres::encode(&body.genres));
    active.website_link = Set(body.website_link);
    active.seeking_talent = Set(body.seeking_talent);
    active.seeking_description = Set(body.seeking_description);

    let updated = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(VenueResponse::from(updated)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    fn make_venue_model() -> venue::Model {
        venue::Model {
            id: 1,
            name: "The Fillmore".into(),
            city: "SF".into(),
            state: "CA".into(),
            address: "1805 Geary St".into(),
            phone: "415-555-0100".into(),
            image_link: "https://img.example.com/fillmore.jpg".into(),
            facebook_link: "https://facebook.com/fillmore".into(),
            genres: "Rock n Roll,Jazz".into(),
            website_link: "https://fillmore.example.com".into(),
            seeking_talent: false,
            seeking_description: String::new(),
        }
    }

    #[test]
    fn test_venue_response_decodes_genres() {
        let resp = VenueResponse::from(make_venue_model());
        assert_eq!(resp.genres, vec!["Rock n Roll", "Jazz"]);
        assert_eq!(resp.website, "https://fillmore.example.com");
    }

    #[test]
    fn test_venue_response_serialization() {
        let resp = VenueResponse::from(make_venue_model());
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["name"], "The Fillmore");
        assert_eq!(json["seeking_talent"], false);
        assert_eq!(json["genres"][0], "Rock n Roll");
    }

    #[test]
    fn test_venue_payload_defaults() {
        let json = r#"{
            "name": "The Fillmore",
            "city": "SF",
            "state": "CA",
            "address": "1805 Geary St",
            "phone": "415-555-0100"
        }"#;
        let payload: VenuePayload = serde_json::from_str(json).unwrap();
        assert!(payload.genres.is_empty());
        assert!(!payload.seeking_talent);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_venue_payload_rejects_blank_name() {
        let json = r#"{
            "name": " ",
            "city": "SF",
            "state": "CA",
            "address": "1805 Geary St",
            "phone": "415-555-0100"
        }"#;
        let payload: VenuePayload = serde_json::from_str(json).unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_venue_detail_flattens_venue_fields() {
        let detail = VenueDetailResponse {
            venue: VenueResponse::from(make_venue_model()),
            past_shows: vec![],
            upcoming_shows: vec![],
            past_shows_count: 0,
            upcoming_shows_count: 0,
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["name"], "The Fillmore");
        assert_eq!(json["upcoming_shows_count"], 0);
        assert!(json["past_shows"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_search_request_deserialization() {
        let req: SearchRequest = serde_json::from_str(r#"{"search_term": "fil"}"#).unwrap();
        assert_eq!(req.search_term, "fil");
    }

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    #[tokio::test]
    async fn test_delete_venue_with_booked_shows_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![make_venue_model()]])
            .append_query_results([vec![count_row(2)]])
            .into_connection();
        let state = Arc::new(AppState { db });

        let err = delete_venue(State(state.clone()), Path(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        let state = Arc::try_unwrap(state).ok().unwrap();
        let log = format!("{:?}", state.db.into_transaction_log());
        assert!(!log.contains("DELETE"));
    }

    #[tokio::test]
    async fn test_delete_venue_without_shows_succeeds() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![make_venue_model()]])
            .append_query_results([vec![count_row(0)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let state = Arc::new(AppState { db });

        let status = delete_venue(State(state.clone()), Path(1)).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let state = Arc::try_unwrap(state).ok().unwrap();
        let log = format!("{:?}", state.db.into_transaction_log());
        assert!(log.contains("DELETE"));
    }

    #[tokio::test]
    async fn test_delete_missing_venue_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<venue::Model>::new()])
            .into_connection();
        let state = Arc::new(AppState { db });

        let err = delete_venue(State(state.clone()), Path(42))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound("Venue")));
    }
}
