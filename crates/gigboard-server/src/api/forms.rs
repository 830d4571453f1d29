//! Form descriptors for the create/edit endpoints.
//!
//! Rendering is the presentation layer's job; these endpoints hand it the
//! field list and the genre choices it needs to draw the form.

use serde::Serialize;

pub const GENRE_CHOICES: &[&str] = &[
    "Alternative",
    "Blues",
    "Classical",
    "Country",
    "Electronic",
    "Folk",
    "Funk",
    "Hip-Hop",
    "Heavy Metal",
    "Instrumental",
    "Jazz",
    "Musical Theatre",
    "Pop",
    "Punk",
    "R&B",
    "Reggae",
    "Rock n Roll",
    "Soul",
    "Other",
];

#[derive(Debug, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub kind: &'static str,
    pub required: bool,
}

#[derive(Debug, Serialize)]
pub struct FormDescriptor {
    pub fields: Vec<FormField>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub genre_choices: &'static [&'static str],
}

fn text(name: &'static str, required: bool) -> FormField {
    FormField {
        name,
        kind: "text",
        required,
    }
}

pub fn venue_form() -> FormDescriptor {
    FormDescriptor {
        fields: vec![
            text("name", true),
            text("city", true),
            text("state", true),
            text("address", true),
            text("phone", true),
            text("image_link", false),
            text("facebook_link", false),
            FormField {
                name: "genres",
                kind: "multiselect",
                required: false,
            },
            text("website_link", false),
            FormField {
                name: "seeking_talent",
                kind: "checkbox",
                required: false,
            },
            text("seeking_description", false),
        ],
        genre_choices: GENRE_CHOICES,
    }
}

pub fn artist_form() -> FormDescriptor {
    FormDescriptor {
        fields: vec![
            text("name", true),
            text("city", true),
            text("state", true),
            text("phone", true),
            FormField {
                name: "genres",
                kind: "multiselect",
                required: false,
            },
            text("image_link", false),
            text("facebook_link", false),
            text("website_link", false),
            FormField {
                name: "seeking_venue",
                kind: "checkbox",
                required: false,
            },
            text("seeking_description", false),
        ],
        genre_choices: GENRE_CHOICES,
    }
}

pub fn show_form() -> FormDescriptor {
    FormDescriptor {
        fields: vec![
            FormField {
                name: "venue_id",
                kind: "integer",
                required: true,
            },
            FormField {
                name: "artist_id",
                kind: "integer",
                required: true,
            },
            FormField {
                name: "start_time",
                kind: "datetime",
                required: true,
            },
        ],
        genre_choices: &[],
    }
}
