//! User-submitted reviews and the edit token that guards them.

use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{self, Document};
use crate::errors::ModelError;

pub const ID_PREFIX: &str = "testimonial";
pub const EDIT_TOKEN_FIELD: &str = "editToken";
pub const DEFAULT_NAME: &str = "Anonymous";
pub const DEFAULT_ROLE: &str = "Community Member";
pub const DEFAULT_AVATAR: &str = "😊";

const TOKEN_BYTES: usize = 32;

/// Bearer secret minted once per testimonial. Whoever holds it may edit or
/// delete that testimonial; it is never rotated.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditToken(String);

impl EditToken {
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for EditToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EditToken(***)")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
}

impl MediaItem {
    /// Locators that survive a page reload: stored uploads, inline data, remote URLs.
    pub fn is_persistent_locator(url: &str) -> bool {
        url.starts_with("/uploads/")
            || url.starts_with("data:")
            || url.starts_with("http://")
            || url.starts_with("https://")
    }

    fn normalized(mut self, index: usize) -> Result<Self, ModelError> {
        self.url = self.url.trim().to_string();
        if !Self::is_persistent_locator(&self.url) {
            return Err(ModelError::invalid(
                format!("media[{index}].url"),
                "must be an uploaded path, a data: URL or an http(s) URL",
            ));
        }
        Ok(self)
    }
}

fn normalize_media(media: Vec<MediaItem>) -> Result<Vec<MediaItem>, ModelError> {
    media
        .into_iter()
        .enumerate()
        .map(|(i, m)| m.normalized(i))
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 5;

    pub fn new(value: i64) -> Result<Self, ModelError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ModelError::invalid("rating", "must be between 1 and 5"));
        }
        Ok(Self(value as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self(5)
    }
}

/// A testimonial as stored, token included.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: String,
    pub edit_token: EditToken,
    pub name: String,
    pub role: String,
    pub text: String,
    pub avatar: String,
    pub rating: Rating,
    #[serde(default)]
    pub media: Vec<MediaItem>,
    #[serde(with = "document::millis")]
    pub created_at: DateTime<Utc>,
}

impl Testimonial {
    pub fn to_document(&self) -> Result<Document, ModelError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ModelError::Validation("testimonial did not serialize to an object".into())),
            Err(e) => Err(ModelError::Validation(e.to_string())),
        }
    }

    pub fn into_public(self) -> PublicTestimonial {
        PublicTestimonial {
            id: self.id,
            name: self.name,
            role: self.role,
            text: self.text,
            avatar: self.avatar,
            rating: self.rating,
            media: self.media,
            created_at: self.created_at,
        }
    }
}

fn default_name() -> String { DEFAULT_NAME.into() }
fn default_role() -> String { DEFAULT_ROLE.into() }
fn default_avatar() -> String { DEFAULT_AVATAR.into() }

/// The shape every read path returns. There is no token field, so a
/// document read through this type cannot leak one. Defaults let documents
/// written by older revisions of the site still load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicTestimonial {
    pub id: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_avatar")]
    pub avatar: String,
    #[serde(default)]
    pub rating: Rating,
    #[serde(default)]
    pub media: Vec<MediaItem>,
    #[serde(with = "document::millis")]
    pub created_at: DateTime<Utc>,
}

impl PublicTestimonial {
    pub fn from_document(doc: Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(doc))
    }
}

fn text_or_default(value: Option<String>, default: &str) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

fn required_text(value: Option<String>) -> Result<String, ModelError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ModelError::missing("text")),
    }
}

/// `POST /testimonials` body.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialInput {
    pub name: Option<String>,
    pub role: Option<String>,
    pub text: Option<String>,
    pub avatar: Option<String>,
    pub rating: Option<i64>,
    pub media: Option<Vec<MediaItem>>,
}

impl TestimonialInput {
    /// Validate, apply defaults and mint the id and edit token.
    pub fn into_testimonial(self) -> Result<Testimonial, ModelError> {
        let text = required_text(self.text)?;
        let rating = Rating::new(self.rating.ok_or_else(|| ModelError::missing("rating"))?)?;
        let media = normalize_media(self.media.unwrap_or_default())?;
        Ok(Testimonial {
            id: document::new_id(ID_PREFIX),
            edit_token: EditToken::generate(),
            name: text_or_default(self.name, DEFAULT_NAME),
            role: text_or_default(self.role, DEFAULT_ROLE),
            text,
            avatar: text_or_default(self.avatar, DEFAULT_AVATAR),
            rating,
            media,
            created_at: Utc::now(),
        })
    }
}

/// Fields an edit may change. `id`, `editToken` and `createdAt` are not here
/// and therefore can never be patched.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialPatch {
    pub name: Option<String>,
    pub role: Option<String>,
    pub text: Option<String>,
    pub avatar: Option<String>,
    pub rating: Option<i64>,
    pub media: Option<Vec<MediaItem>>,
}

impl TestimonialPatch {
    /// The `$set` document for the fields present, validated like a create.
    pub fn into_document(self) -> Result<Document, ModelError> {
        let mut set = Document::new();
        if let Some(name) = self.name {
            set.insert("name".into(), Value::String(text_or_default(Some(name), DEFAULT_NAME)));
        }
        if let Some(role) = self.role {
            set.insert("role".into(), Value::String(text_or_default(Some(role), DEFAULT_ROLE)));
        }
        if let Some(text) = self.text {
            set.insert("text".into(), Value::String(required_text(Some(text))?));
        }
        if let Some(avatar) = self.avatar {
            set.insert("avatar".into(), Value::String(text_or_default(Some(avatar), DEFAULT_AVATAR)));
        }
        if let Some(rating) = self.rating {
            set.insert("rating".into(), Value::from(Rating::new(rating)?.get()));
        }
        if let Some(media) = self.media {
            let media = normalize_media(media)?;
            let value = serde_json::to_value(media).map_err(|e| ModelError::Validation(e.to_string()))?;
            set.insert("media".into(), value);
        }
        Ok(set)
    }
}
