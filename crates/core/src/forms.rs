//! Client-side form validation mirroring the backend's rules.
//!
//! Each form runs the declarative `validator` rules first, then the
//! conditional rules the derive cannot express (e.g. "price is required
//! unless the sound is free"). Failures come back as [`FieldErrors`] so
//! views can render them inline and refuse to submit.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::envelope::FieldErrors;
use crate::types::DbId;

pub const MSG_TITLE_REQUIRED: &str = "title required";
pub const MSG_PRICE_REQUIRED: &str = "price required";
pub const MSG_PRICE_POSITIVE: &str = "price must be a positive amount";
pub const MSG_CATEGORY_REQUIRED: &str = "category required";
pub const MSG_NAME_REQUIRED: &str = "name required";
pub const MSG_COLOR_FORMAT: &str = "color must be a hex code like #1DB954";
pub const MSG_REASON_REQUIRED: &str = "reason required";

/// Maximum length of a sound title.
pub const MAX_TITLE_LEN: u64 = 255;
/// Maximum length of a category name.
pub const MAX_CATEGORY_NAME_LEN: u64 = 100;
/// Maximum length of a rejection reason.
pub const MAX_REASON_LEN: u64 = 500;
/// Maximum number of tags on a sound.
pub const MAX_TAGS: u64 = 10;

// ---------------------------------------------------------------------------
// Shared rule functions
// ---------------------------------------------------------------------------

fn error_with(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn required_title(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error_with("required", MSG_TITLE_REQUIRED));
    }
    Ok(())
}

fn required_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error_with("required", MSG_NAME_REQUIRED));
    }
    Ok(())
}

fn required_reason(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error_with("required", MSG_REASON_REQUIRED));
    }
    Ok(())
}

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid regex"));

fn hex_color(value: &str) -> Result<(), ValidationError> {
    if HEX_COLOR.is_match(value) {
        Ok(())
    } else {
        Err(error_with("format", MSG_COLOR_FORMAT))
    }
}

/// Flatten `validator` output into [`FieldErrors`].
pub fn field_errors_from(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();
    for (field, errs) in errors.field_errors() {
        for err in errs.iter() {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| err.code.to_string());
            out.add(field.to_string(), message);
        }
    }
    out
}

fn run_derived<T: Validate>(form: &T) -> FieldErrors {
    match form.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => field_errors_from(&errors),
    }
}

/// Parse a user-typed amount, accepting a comma as decimal separator.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let normalized = raw.trim().replace(' ', "").replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Sound edit form
// ---------------------------------------------------------------------------

/// Fields of the edit-sound form, as typed by the artist.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct SoundForm {
    #[validate(
        custom(function = "required_title"),
        length(max = 255, message = "title is too long")
    )]
    pub title: String,
    #[validate(length(max = 2000, message = "description is too long"))]
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    #[validate(length(max = 10, message = "too many tags"))]
    pub tags: Vec<String>,
    pub is_free: bool,
    /// Raw text of the price input.
    pub price: String,
}

impl SoundForm {
    /// Run every rule. `Err` carries one entry per invalid field.
    pub fn check(&self) -> Result<(), FieldErrors> {
        let mut errors = run_derived(self);

        if self.category_id.is_none() {
            errors.add("category_id", MSG_CATEGORY_REQUIRED);
        }

        if !self.is_free {
            if self.price.trim().is_empty() {
                errors.add("price", MSG_PRICE_REQUIRED);
            } else if !parse_amount(&self.price).is_some_and(|p| p > 0.0) {
                errors.add("price", MSG_PRICE_POSITIVE);
            }
        }

        errors.into_result()
    }

    /// JSON body for `PUT /api/sounds/{id}`. Free sounds send a null price;
    /// an unset description is left out so the stored one is kept.
    pub fn to_payload(&self) -> Value {
        let price = if self.is_free {
            Value::Null
        } else {
            parse_amount(&self.price).map(Value::from).unwrap_or(Value::Null)
        };
        let tags: Vec<&str> = self
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();

        let mut payload = json!({
            "title": self.title.trim(),
            "category_id": self.category_id,
            "tags": tags,
            "is_free": self.is_free,
            "price": price,
        });
        if let (Some(description), Some(map)) = (&self.description, payload.as_object_mut()) {
            map.insert("description".into(), Value::from(description.trim()));
        }
        payload
    }
}

// ---------------------------------------------------------------------------
// Category form
// ---------------------------------------------------------------------------

/// Image attached to a category form, uploaded as a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Fields of the admin create/edit category modal.
#[derive(Debug, Clone, Validate)]
pub struct CategoryForm {
    #[validate(
        custom(function = "required_name"),
        length(max = 100, message = "name is too long")
    )]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom(function = "hex_color"))]
    pub color: String,
    pub icon: Option<String>,
    #[validate(range(min = 0, message = "sort order must not be negative"))]
    pub sort_order: i32,
    pub is_active: bool,
    pub image: Option<ImageUpload>,
}

impl Default for CategoryForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            color: "#1DB954".to_string(),
            icon: None,
            sort_order: 0,
            is_active: true,
            image: None,
        }
    }
}

impl CategoryForm {
    pub fn check(&self) -> Result<(), FieldErrors> {
        run_derived(self).into_result()
    }

    /// Text parts of the multipart body, in submission order.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("name", self.name.trim().to_string()),
            ("color", self.color.clone()),
            ("sort_order", self.sort_order.to_string()),
            ("is_active", if self.is_active { "1" } else { "0" }.to_string()),
        ];
        if let Some(description) = self.description.as_deref().map(str::trim) {
            fields.push(("description", description.to_string()));
        }
        if let Some(icon) = &self.icon {
            fields.push(("icon", icon.clone()));
        }
        fields
    }
}

// ---------------------------------------------------------------------------
// Rejection form
// ---------------------------------------------------------------------------

/// Reason typed by a moderator before rejecting a sound, clip or payment.
#[derive(Debug, Clone, Default, Validate)]
pub struct RejectionForm {
    #[validate(
        custom(function = "required_reason"),
        length(max = 500, message = "reason is too long")
    )]
    pub reason: String,
}

impl RejectionForm {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The reject button stays disabled until this is true.
    pub fn can_submit(&self) -> bool {
        self.check().is_ok()
    }

    pub fn check(&self) -> Result<(), FieldErrors> {
        run_derived(self).into_result()
    }

    pub fn to_payload(&self) -> Value {
        json!({ "reason": self.reason.trim() })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_sound() -> SoundForm {
        SoundForm {
            title: "Makossa Groove".into(),
            description: None,
            category_id: Some(5),
            tags: vec!["afro".into()],
            is_free: false,
            price: "2500".into(),
        }
    }

    #[test]
    fn paid_sound_without_price_is_blocked() {
        let form = SoundForm {
            price: "".into(),
            ..valid_sound()
        };
        let errors = form.check().unwrap_err();
        assert_eq!(errors.first("price"), Some(MSG_PRICE_REQUIRED));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn unset_description_is_left_out() {
        let payload = valid_sound().to_payload();
        assert!(payload.get("description").is_none());

        let form = SoundForm {
            description: Some(" Notes de pochette ".into()),
            ..valid_sound()
        };
        assert_eq!(form.to_payload()["description"], "Notes de pochette");
    }

    #[test]
    fn free_sound_ignores_price() {
        let form = SoundForm {
            is_free: true,
            price: "".into(),
            ..valid_sound()
        };
        assert!(form.check().is_ok());
        assert!(form.to_payload()["price"].is_null());
    }

    #[test]
    fn non_positive_price_rejected() {
        for raw in ["0", "-5", "abc"] {
            let form = SoundForm {
                price: raw.into(),
                ..valid_sound()
            };
            assert_eq!(
                form.check().unwrap_err().first("price"),
                Some(MSG_PRICE_POSITIVE),
                "price {raw:?}"
            );
        }
    }

    #[test]
    fn comma_decimal_price_accepted() {
        let form = SoundForm {
            price: "1 500,50".into(),
            ..valid_sound()
        };
        assert!(form.check().is_ok());
        assert_eq!(form.to_payload()["price"], 1500.5);
    }

    #[test]
    fn blank_title_and_missing_category_reported_together() {
        let form = SoundForm {
            title: "  ".into(),
            category_id: None,
            ..valid_sound()
        };
        let errors = form.check().unwrap_err();
        assert_eq!(errors.first("title"), Some(MSG_TITLE_REQUIRED));
        assert_eq!(errors.first("category_id"), Some(MSG_CATEGORY_REQUIRED));
    }

    #[test]
    fn category_color_must_be_hex() {
        let form = CategoryForm {
            name: "Afrobeat".into(),
            color: "green".into(),
            ..CategoryForm::default()
        };
        assert_eq!(form.check().unwrap_err().first("color"), Some(MSG_COLOR_FORMAT));

        let form = CategoryForm {
            name: "Afrobeat".into(),
            ..CategoryForm::default()
        };
        assert!(form.check().is_ok());
    }

    #[test]
    fn category_sort_order_not_negative() {
        let form = CategoryForm {
            name: "Afrobeat".into(),
            sort_order: -1,
            ..CategoryForm::default()
        };
        assert!(form.check().unwrap_err().contains("sort_order"));
    }

    #[test]
    fn category_text_fields_encode_flags() {
        let form = CategoryForm {
            name: " Zouk ".into(),
            is_active: false,
            ..CategoryForm::default()
        };
        let fields = form.text_fields();
        assert!(fields.contains(&("name", "Zouk".to_string())));
        assert!(fields.contains(&("is_active", "0".to_string())));
    }

    #[test]
    fn rejection_requires_non_blank_reason() {
        assert!(!RejectionForm::new("").can_submit());
        assert!(!RejectionForm::new("   ").can_submit());
        assert!(RejectionForm::new("Copyrighted sample").can_submit());
        assert_eq!(
            RejectionForm::new(" spam ").to_payload(),
            json!({"reason": "spam"})
        );
    }
}
