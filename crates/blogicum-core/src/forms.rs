//! Form input and validation.
//!
//! Forms are deserialized from request bodies, then `clean`ed into values the
//! handlers can persist. Checks that need storage (does the category exist,
//! is the username free) are looked up by the caller and passed in.
//!
//! None of the forms carry an author: ownership always comes from the
//! authenticated session.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::{Post, User};
use crate::error::FormErrors;

pub const TITLE_MAX_LENGTH: usize = 256;
pub const USERNAME_MAX_LENGTH: usize = 150;
pub const NAME_MAX_LENGTH: usize = 150;
pub const PASSWORD_MIN_LENGTH: usize = 8;

const REQUIRED: &str = "This field is required.";
const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";
const INVALID_DATETIME: &str = "Enter a valid date/time.";
const USERNAME_TAKEN: &str = "A user with that username already exists.";
const INVALID_USERNAME: &str =
    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";

fn too_long(max: usize, actual: usize) -> String {
    format!("Ensure this value has at most {max} characters (it has {actual}).")
}

fn required_text(errors: &mut FormErrors, field: &str, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    }
    value.to_string()
}

fn max_length(errors: &mut FormErrors, field: &str, value: &str, max: usize) {
    let actual = value.chars().count();
    if actual > max {
        errors.add(field, too_long(max, actual));
    }
}

fn validate_username(errors: &mut FormErrors, username: &str, taken: bool) {
    if username.is_empty() {
        return;
    }
    max_length(errors, "username", username, USERNAME_MAX_LENGTH);
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-');
    if !username.chars().all(allowed) {
        errors.add("username", INVALID_USERNAME);
    }
    if taken {
        errors.add("username", USERNAME_TAKEN);
    }
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

fn default_true() -> bool {
    true
}

/// A JSON scalar accepted where a form field holds free text.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

/// Read any scalar as text so a malformed value reaches `clean` as a field
/// error instead of failing the whole body.
fn scalar_as_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|value| match value {
        Scalar::Text(text) => text,
        Scalar::Integer(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Flag(b) => b.to_string(),
    }))
}

/// Blank input counts as missing.
fn non_blank(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// RFC 3339, or a naive `YYYY-MM-DD[ HH:MM[:SS]]` read as UTC.
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Resolve a submitted choice id. `Err` means present but not selectable.
fn parse_choice(raw: &Option<String>, exists: bool) -> Result<Option<Uuid>, ()> {
    match non_blank(raw) {
        None => Ok(None),
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(id) if exists => Ok(Some(id)),
            _ => Err(()),
        },
    }
}

/// Storage lookups a post form depends on.
#[derive(Debug, Clone, Copy)]
pub struct PostChoices {
    pub category_exists: bool,
    pub location_exists: bool,
}

/// Post create/edit form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, deserialize_with = "scalar_as_text")]
    pub pub_date: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_text")]
    pub location: Option<String>,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

impl Default for PostForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            text: String::new(),
            pub_date: None,
            category: None,
            location: None,
            is_published: true,
        }
    }
}

/// Validated post fields.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub category_id: Uuid,
    pub location_id: Option<Uuid>,
    pub is_published: bool,
}

impl PostForm {
    /// Pre-fill the form from an existing post.
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            text: post.text.clone(),
            pub_date: Some(post.pub_date.to_rfc3339()),
            category: Some(post.category_id.to_string()),
            location: post.location_id.map(|id| id.to_string()),
            is_published: post.is_published,
        }
    }

    pub fn clean(&self, choices: PostChoices) -> Result<PostDraft, FormErrors> {
        let mut errors = FormErrors::new();

        let title = required_text(&mut errors, "title", &self.title);
        max_length(&mut errors, "title", &title, TITLE_MAX_LENGTH);
        let text = required_text(&mut errors, "text", &self.text);

        let pub_date = match non_blank(&self.pub_date) {
            None => {
                errors.add("pub_date", REQUIRED);
                None
            }
            Some(raw) => {
                let parsed = parse_datetime(raw);
                if parsed.is_none() {
                    errors.add("pub_date", INVALID_DATETIME);
                }
                parsed
            }
        };

        let category_id = match parse_choice(&self.category, choices.category_exists) {
            Ok(None) => {
                errors.add("category", REQUIRED);
                None
            }
            Ok(id) => id,
            Err(()) => {
                errors.add("category", INVALID_CHOICE);
                None
            }
        };

        let location_id = parse_choice(&self.location, choices.location_exists).unwrap_or_else(|()| {
            errors.add("location", INVALID_CHOICE);
            None
        });

        match (pub_date, category_id) {
            (Some(pub_date), Some(category_id)) if errors.is_empty() => Ok(PostDraft {
                title,
                text,
                pub_date,
                category_id,
                location_id,
                is_published: self.is_published,
            }),
            _ => Err(errors),
        }
    }

    /// The submitted category, if it is a well-formed id.
    pub fn category_id(&self) -> Option<Uuid> {
        non_blank(&self.category).and_then(|raw| Uuid::parse_str(raw).ok())
    }

    /// The submitted location, if it is a well-formed id.
    pub fn location_id(&self) -> Option<Uuid> {
        non_blank(&self.location).and_then(|raw| Uuid::parse_str(raw).ok())
    }
}

impl PostDraft {
    /// Build a new post owned by `author_id`.
    pub fn into_post(self, author_id: Uuid) -> Post {
        Post::new(
            author_id,
            self.category_id,
            self.title,
            self.text,
            self.pub_date,
        )
        .with_location(self.location_id)
        .published(self.is_published)
    }

    /// Overwrite the editable fields of an existing post. The author is kept.
    pub fn apply_to(self, post: &mut Post) {
        post.title = self.title;
        post.text = self.text;
        post.pub_date = self.pub_date;
        post.category_id = self.category_id;
        post.location_id = self.location_id;
        post.is_published = self.is_published;
    }
}

/// Comment create/edit form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    pub fn clean(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::new();
        let text = required_text(&mut errors, "text", &self.text);
        errors.into_result()?;
        Ok(text)
    }
}

/// Account registration form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// Validated registration data; the password is still plain text.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
}

impl RegistrationForm {
    pub fn clean(&self, username_taken: bool) -> Result<Registration, FormErrors> {
        let mut errors = FormErrors::new();

        let username = required_text(&mut errors, "username", &self.username);
        validate_username(&mut errors, &username, username_taken);

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
        } else {
            if self.password2.chars().count() < PASSWORD_MIN_LENGTH {
                errors.add(
                    "password2",
                    format!(
                        "This password is too short. It must contain at least {PASSWORD_MIN_LENGTH} characters."
                    ),
                );
            }
            if self.password2.chars().all(|c| c.is_ascii_digit()) {
                errors.add("password2", "This password is entirely numeric.");
            }
        }

        errors.into_result()?;
        Ok(Registration {
            username,
            password: self.password1.clone(),
        })
    }
}

/// Login form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    pub fn clean(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        required_text(&mut errors, "username", &self.username);
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        errors.into_result()
    }
}

/// Profile edit form: only the identity fields, never the password.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Validated profile changes.
#[derive(Debug, Clone)]
pub struct ProfileChanges {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl ProfileForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }

    /// `username_taken` must be false when the name belongs to the editing user.
    pub fn clean(&self, username_taken: bool) -> Result<ProfileChanges, FormErrors> {
        let mut errors = FormErrors::new();

        let username = required_text(&mut errors, "username", &self.username);
        validate_username(&mut errors, &username, username_taken);

        let email = self.email.trim().to_string();
        if !email.is_empty() && !looks_like_email(&email) {
            errors.add("email", "Enter a valid email address.");
        }

        let first_name = self.first_name.trim().to_string();
        max_length(&mut errors, "first_name", &first_name, NAME_MAX_LENGTH);
        let last_name = self.last_name.trim().to_string();
        max_length(&mut errors, "last_name", &last_name, NAME_MAX_LENGTH);

        errors.into_result()?;
        Ok(ProfileChanges {
            username,
            email,
            first_name,
            last_name,
        })
    }
}

impl ProfileChanges {
    pub fn apply_to(self, user: &mut User) {
        user.username = self.username;
        user.email = self.email;
        user.first_name = self.first_name;
        user.last_name = self.last_name;
        user.updated_at = Utc::now();
    }
}
