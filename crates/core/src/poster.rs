//! Poster records and their create / patch DTOs.
//!
//! Every display field other than `name` is optional on input and defaults to
//! an empty string, so a sparse record never breaks rendering.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::PosterId;

/// Rendered in place of an empty poster reference.
pub const PLACEHOLDER_POSTER_URL: &str = "/placeholder-poster.png";

/// Rendered in place of an empty logo reference.
pub const PLACEHOLDER_LOGO_URL: &str = "/placeholder-logo.png";

/// Logo reference stored for uploads that came without a logo file.
pub const UPLOAD_PLACEHOLDER_LOGO_URL: &str = "https://placehold.co/400x150.png";

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// One movie poster entry as stored and displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosterRecord {
    pub id: PosterId,
    pub name: String,
    #[serde(default)]
    pub poster_url: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub starring: String,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub runtime: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub poster_ai_hint: String,
}

impl PosterRecord {
    /// Build a stored record from a create DTO and its final identifier.
    pub fn from_new(id: PosterId, new: NewPoster) -> Self {
        Self {
            id,
            name: new.name,
            poster_url: new.poster_url,
            logo_url: new.logo_url,
            description: new.description,
            starring: new.starring,
            director: new.director,
            runtime: new.runtime,
            genre: new.genre,
            rating: new.rating,
            poster_ai_hint: new.poster_ai_hint,
        }
    }

    /// Replace every field present in `patch`, leaving the rest untouched.
    pub fn apply_patch(&mut self, patch: &PosterPatch) {
        let fields: [(&mut String, &Option<String>); 10] = [
            (&mut self.name, &patch.name),
            (&mut self.poster_url, &patch.poster_url),
            (&mut self.logo_url, &patch.logo_url),
            (&mut self.description, &patch.description),
            (&mut self.starring, &patch.starring),
            (&mut self.director, &patch.director),
            (&mut self.runtime, &patch.runtime),
            (&mut self.genre, &patch.genre),
            (&mut self.rating, &patch.rating),
            (&mut self.poster_ai_hint, &patch.poster_ai_hint),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                *field = value.clone();
            }
        }
    }

    /// Poster image reference, or the placeholder when empty.
    pub fn poster_src(&self) -> &str {
        non_empty_or(&self.poster_url, PLACEHOLDER_POSTER_URL)
    }

    /// Logo image reference, or the placeholder when empty.
    pub fn logo_src(&self) -> &str {
        non_empty_or(&self.logo_url, PLACEHOLDER_LOGO_URL)
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for adding a poster. `id` is only set when the caller pre-assigns one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewPoster {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 128))]
    pub id: Option<PosterId>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub poster_url: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub starring: String,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub runtime: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub poster_ai_hint: String,
}

impl NewPoster {
    /// Minimal DTO carrying only a display name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// DTO for partially updating a poster. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PosterPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starring: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_ai_hint: Option<String>,
}

impl PosterPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == PosterPatch::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
