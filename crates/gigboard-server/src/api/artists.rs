use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{require_field, ApiError};
use super::forms::{self, FormDescriptor};
use super::venues::SearchRequest;
use super::SearchResults;
use gigboard_db::entities::{artist, show, venue};
use gigboard_db::listings::{self, split_shows_by_time, PartneredShow};
use gigboard_db::{genres, AppState};

#[derive(Debug, Serialize)]
pub struct ArtistResponse {
    pub id: i32,
    pub name: String,
    pub genres: Vec<String>,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website: String,
    pub facebook_link: String,
    pub seeking_venue: bool,
    pub seeking_description: String,
    pub image_link: String,
}

impl From<artist::Model> for ArtistResponse {
    fn from(a: artist::Model) -> Self {
        Self {
            id: a.id,
            name: a.name,
            genres: genres::decode(&a.genres),
            city: a.city,
            state: a.state,
            phone: a.phone,
            website: a.website_link,
            facebook_link: a.facebook_link,
            seeking_venue: a.seeking_venue,
            seeking_description: a.seeking_description,
            image_link: a.image_link,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArtistSummary {
    pub id: i32,
    pub name: String,
}

/// A show on the artist detail page, seen from the artist's side.
#[derive(Debug, Serialize)]
pub struct VenueShowEntry {
    pub venue_id: i32,
    pub venue_name: String,
    pub venue_image_link: String,
    pub start_time: String,
}

impl From<listings::ShowEntry> for VenueShowEntry {
    fn from(e: listings::ShowEntry) -> Self {
        Self {
            venue_id: e.partner_id,
            venue_name: e.partner_name,
            venue_image_link: e.partner_image_link,
            start_time: e.start_time,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArtistDetailResponse {
    #[serde(flatten)]
    pub artist: ArtistResponse,
    pub past_shows: Vec<VenueShowEntry>,
    pub upcoming_shows: Vec<VenueShowEntry>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

/// Create/edit submission. Edit is a full overwrite of every editable field.
#[derive(Debug, Deserialize)]
pub struct ArtistPayload {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub image_link: String,
    #[serde(default)]
    pub facebook_link: String,
    #[serde(default)]
    pub website_link: String,
    /// Checkbox contract: absent means unchecked
    #[serde(default)]
    pub seeking_venue: bool,
    #[serde(default)]
    pub seeking_description: String,
}

impl ArtistPayload {
    fn validate(&self) -> Result<(), ApiError> {
        require_field("name", &self.name)?;
        require_field("city", &self.city)?;
        require_field("state", &self.state)?;
        require_field("phone", &self.phone)?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ArtistCreatedResponse {
    pub message: String,
    pub artist: ArtistResponse,
}

#[derive(Debug, Serialize)]
pub struct ArtistEditFormResponse {
    pub form: FormDescriptor,
    pub artist: ArtistResponse,
}

/// GET /artists — flat id/name listing
pub async fn list_artists(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ArtistSummary>>, ApiError> {
    let artists = artist::Entity::find()
        .order_by_asc(artist::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(
        artists
            .into_iter()
            .map(|a| ArtistSummary {
                id: a.id,
                name: a.name,
            })
            .collect(),
    ))
}

/// POST /artists/search — case-insensitive name substring search
pub async fn search_artists(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<SearchResults<ArtistSummary>>, ApiError> {
    let pattern = super::like_pattern(&body.search_term);

    let artists = artist::Entity::find()
        .filter(Expr::col(artist::Column::Name).ilike(pattern.as_str()))
        .order_by_asc(artist::Column::Id)
        .all(&state.db)
        .await?;

    let data: Vec<ArtistSummary> = artists
        .into_iter()
        .map(|a| ArtistSummary {
            id: a.id,
            name: a.name,
        })
        .collect();

    Ok(Json(SearchResults {
        count: data.len(),
        data,
    }))
}

/// GET /artists/:id — detail plus past/upcoming show history
pub async fn get_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ArtistDetailResponse>, ApiError> {
    let artist_model = artist::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound("Artist"))?;

    let rows = show::Entity::find()
        .filter(show::Column::ArtistId.eq(id))
        .find_also_related(venue::Entity)
        .all(&state.db)
        .await?;

    let partnered: Vec<PartneredShow> = rows
        .into_iter()
        .filter_map(|(show, venue)| match venue {
            Some(v) => Some(PartneredShow {
                partner_id: v.id,
                partner_name: v.name,
                partner_image_link: v.image_link,
                start_time: show.start_time,
            }),
            None => {
                tracing::warn!(show_id = show.id, "show has no venue, skipping");
                None
            }
        })
        .collect();

    let now = chrono::Utc::now().fixed_offset();
    let split = split_shows_by_time(partnered, now);

    Ok(Json(ArtistDetailResponse {
        artist: ArtistResponse::from(artist_model),
        past_shows_count: split.past.len(),
        upcoming_shows_count: split.upcoming.len(),
        past_shows: split.past.into_iter().map(VenueShowEntry::from).collect(),
        upcoming_shows: split
            .upcoming
            .into_iter()
            .map(VenueShowEntry::from)
            .collect(),
    }))
}

/// GET /artists/create — form descriptor for the presentation layer
pub async fn create_artist_form() -> Json<FormDescriptor> {
    Json(forms::artist_form())
}

/// POST /artists/create
pub async fn create_artist(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ArtistPayload>,
) -> Result<(StatusCode, Json<ArtistCreatedResponse>), ApiError> {
    body.validate()?;

    let txn = state.db.begin().await?;
    let created = artist::ActiveModel {
        name: Set(body.name),
        city: Set(body.city),
        state: Set(body.state),
        phone: Set(body.phone),
        genres: Set(genres::encode(&body.genres)),
        image_link: Set(body.image_link),
        facebook_link: Set(body.facebook_link),
        website_link: Set(body.website_link),
        seeking_venue: Set(body.seeking_venue),
        seeking_description: Set(body.seeking_description),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    let message = format!("Artist {} was successfully listed!", created.name);
    Ok((
        StatusCode::CREATED,
        Json(ArtistCreatedResponse {
            message,
            artist: ArtistResponse::from(created),
        }),
    ))
}

/// GET /artists/:id/edit — prefilled form descriptor
pub async fn edit_artist_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ArtistEditFormResponse>, ApiError> {
    let artist_model = artist::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound("Artist"))?;

    Ok(Json(ArtistEditFormResponse {
        form: forms::artist_form(),
        artist: ArtistResponse::from(artist_model),
    }))
}

/// POST /artists/:id/edit — full overwrite of every editable field
pub async fn edit_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(body): Json<ArtistPayload>,
) -> Result<Json<ArtistResponse>, ApiError> {
    body.validate()?;

    let txn = state.db.begin().await?;
    let existing = artist::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(ApiError::NotFound("Artist"))?;

    let mut active: artist::ActiveModel = existing.into();
    active.name = Set(body.name);
    active.city = Set(body.city);
    active.state = Set(body.state);
    active.phone = Set(body.phone);
    active.genres = Set(genres::encode(&body.genres));
    active.image_link = Set(body.image_link);
    active.facebook_link = Set(body.facebook_link);
    active.website_link = Set(body.website_link);
    active.seeking_venue = Set(body.seeking_venue);
    active.seeking_description = Set(body.seeking_description);

    let updated = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(ArtistResponse::from(updated)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_artist_model() -> artist::Model {
        artist::Model {
            id: 1,
            name: "Jazz Trio".into(),
            city: "SF".into(),
            state: "CA".into(),
            phone: "415-555-0101".into(),
            genres: "Jazz,Blues".into(),
            image_link: "https://img.example.com/trio.jpg".into(),
            facebook_link: "https://facebook.com/trio".into(),
            website_link: "https://trio.example.com".into(),
            seeking_venue: true,
            seeking_description: "Looking for small clubs".into(),
        }
    }

    #[test]
    fn test_artist_response_decodes_genres() {
        let resp = ArtistResponse::from(make_artist_model());
        assert_eq!(resp.genres, vec!["Jazz", "Blues"]);
        assert!(resp.seeking_venue);
    }

    #[test]
    fn test_artist_detail_flattens_artist_fields() {
        let detail = ArtistDetailResponse {
            artist: ArtistResponse::from(make_artist_model()),
            past_shows: vec![],
            upcoming_shows: vec![],
            past_shows_count: 0,
            upcoming_shows_count: 0,
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["name"], "Jazz Trio");
        assert_eq!(json["past_shows_count"], 0);
    }

    #[test]
    fn test_artist_payload_defaults() {
        let json = r#"{
            "name": "Jazz Trio",
            "city": "SF",
            "state": "CA",
            "phone": "415-555-0101"
        }"#;
        let payload: ArtistPayload = serde_json::from_str(json).unwrap();
        assert!(payload.genres.is_empty());
        assert!(!payload.seeking_venue);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_artist_payload_rejects_blank_city() {
        let json = r#"{
            "name": "Jazz Trio",
            "city": "",
            "state": "CA",
            "phone": "415-555-0101"
        }"#;
        let payload: ArtistPayload = serde_json::from_str(json).unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_venue_show_entry_from_show_entry() {
        let entry = VenueShowEntry::from(listings::ShowEntry {
            partner_id: 7,
            partner_name: "The Fillmore".into(),
            partner_image_link: "https://img.example.com/fillmore.jpg".into(),
            start_time: "2025-06-20 21:30:00".into(),
        });
        assert_eq!(entry.venue_id, 7);
        assert_eq!(entry.venue_name, "The Fillmore");
        assert_eq!(entry.start_time, "2025-06-20 21:30:00");
    }
}
