//! Aggregation over materialized entity rows.
//!
//! Everything here is a pure function: callers fetch the rows they need and
//! pass the current instant in, so classification against "now" is
//! deterministic under test. A show with `start_time <= now` is past;
//! strictly later is upcoming.

use std::collections::HashMap;

use sea_orm::entity::prelude::DateTimeWithTimeZone;
use serde::Serialize;

use crate::entities::{artist, show, venue};

/// Render a start time the way the listing views display it.
pub fn format_start_time(t: &DateTimeWithTimeZone) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Count the shows that start strictly after `now`.
pub fn count_upcoming_shows(shows: &[show::Model], now: DateTimeWithTimeZone) -> i64 {
    shows.iter().filter(|s| s.start_time > now).count() as i64
}

#[derive(Debug, Serialize)]
pub struct VenueSummary {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: i64,
}

#[derive(Debug, Serialize)]
pub struct LocationGroup {
    pub city: String,
    pub state: String,
    pub venues: Vec<VenueSummary>,
}

/// Group venues by exact (city, state), annotating each venue with its
/// upcoming-show count.
///
/// Key comparison is case-sensitive. Groups appear in first-seen order over
/// the venue iteration order and venues keep that order within their group,
/// so a caller that fetches venues ordered by id gets a deterministic result.
pub fn group_venues_by_location(
    venues: Vec<venue::Model>,
    shows: &[show::Model],
    now: DateTimeWithTimeZone,
) -> Vec<LocationGroup> {
    let mut groups: Vec<LocationGroup> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for venue in venues {
        let venue_shows: Vec<show::Model> = shows
            .iter()
            .filter(|s| s.venue_id == venue.id)
            .cloned()
            .collect();
        let summary = VenueSummary {
            id: venue.id,
            name: venue.name,
            num_upcoming_shows: count_upcoming_shows(&venue_shows, now),
        };

        let key = (venue.city.clone(), venue.state.clone());
        match index.get(&key) {
            Some(&i) => groups[i].venues.push(summary),
            None => {
                index.insert(key, groups.len());
                groups.push(LocationGroup {
                    city: venue.city,
                    state: venue.state,
                    venues: vec![summary],
                });
            }
        }
    }

    groups
}

/// One show seen from a venue or artist detail page, already joined with the
/// counterpart entity's display fields.
#[derive(Debug, Clone)]
pub struct PartneredShow {
    pub partner_id: i32,
    pub partner_name: String,
    pub partner_image_link: String,
    pub start_time: DateTimeWithTimeZone,
}

/// A partnered show with the start time rendered for display.
#[derive(Debug, Clone)]
pub struct ShowEntry {
    pub partner_id: i32,
    pub partner_name: String,
    pub partner_image_link: String,
    pub start_time: String,
}

#[derive(Debug)]
pub struct ShowSplit {
    pub past: Vec<ShowEntry>,
    pub upcoming: Vec<ShowEntry>,
}

/// Partition one entity's shows into past and upcoming relative to `now`.
/// Both halves are sorted ascending by start time.
pub fn split_shows_by_time(mut shows: Vec<PartneredShow>, now: DateTimeWithTimeZone) -> ShowSplit {
    shows.sort_by_key(|s| s.start_time);

    let mut past = Vec::new();
    let mut upcoming = Vec::new();
    for show in shows {
        let entry = ShowEntry {
            partner_id: show.partner_id,
            partner_name: show.partner_name,
            partner_image_link: show.partner_image_link,
            start_time: format_start_time(&show.start_time),
        };
        if show.start_time > now {
            upcoming.push(entry);
        } else {
            past.push(entry);
        }
    }

    ShowSplit { past, upcoming }
}

#[derive(Debug, Serialize)]
pub struct ShowListingEntry {
    pub venue_id: i32,
    pub venue_name: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: String,
    pub start_time: String,
}

/// Join every show with both of its endpoints, ordered ascending by start
/// time. A show whose venue or artist is absent from the maps is a
/// referential-integrity fault: it is logged and excluded from the listing.
pub fn assemble_show_listing(
    mut shows: Vec<show::Model>,
    venues_by_id: &HashMap<i32, venue::Model>,
    artists_by_id: &HashMap<i32, artist::Model>,
) -> Vec<ShowListingEntry> {
    shows.sort_by_key(|s| s.start_time);

    let mut listing = Vec::with_capacity(shows.len());
    for show in shows {
        let (venue, artist) = match (
            venues_by_id.get(&show.venue_id),
            artists_by_id.get(&show.artist_id),
        ) {
            (Some(v), Some(a)) => (v, a),
            _ => {
                tracing::warn!(
                    show_id = show.id,
                    venue_id = show.venue_id,
                    artist_id = show.artist_id,
                    "show references a missing venue or artist, excluding from listing"
                );
                continue;
            }
        };

        listing.push(ShowListingEntry {
            venue_id: venue.id,
            venue_name: venue.name.clone(),
            artist_id: artist.id,
            artist_name: artist.name.clone(),
            artist_image_link: artist.image_link.clone(),
            start_time: format_start_time(&show.start_time),
        });
    }

    listing
}
