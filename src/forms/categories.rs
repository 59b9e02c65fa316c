use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::forms::{read_upload, sanitize_inline_text};
use crate::media::{MediaError, StoredFile, prepare_image};

/// Maximum length allowed for a category name.
pub(crate) const NAME_MAX_LEN: usize = 128;
pub(crate) const NAME_MAX_LEN_VALIDATOR: u64 = NAME_MAX_LEN as u64;

/// Media folder for category images.
pub const CATEGORY_IMAGE_FOLDER: &str = "categories";

/// Result type returned by the category form helpers.
pub type CategoryFormResult<T> = Result<T, CategoryFormError>;

/// Errors that can occur while processing category forms.
#[derive(Debug, Error)]
pub enum CategoryFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The provided name is empty after sanitization.
    #[error("category name cannot be empty")]
    EmptyName,
    /// The uploaded image is not usable.
    #[error("invalid image: {0}")]
    Image(#[from] MediaError),
    /// The uploaded file could not be read.
    #[error("failed to read the uploaded image: {0}")]
    Io(#[from] std::io::Error),
    /// Review action other than approve or reject.
    #[error("unknown review action `{0}`")]
    UnknownAction(String),
}

/// Multipart payload of the add and edit category forms.
#[derive(MultipartForm)]
pub struct CategoryForm {
    pub name: Text<String>,
    #[multipart(limit = "5MB")]
    pub image: Option<TempFile>,
}

#[derive(Debug, Validate)]
struct NameField {
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    name: String,
}

/// Validated name plus the optional replacement image.
#[derive(Debug)]
pub struct CatalogEntryInput {
    pub name: String,
    pub image: Option<StoredFile>,
}

impl CategoryForm {
    /// Validates the name and checks that the optional upload is an image.
    pub fn into_input(self) -> CategoryFormResult<CatalogEntryInput> {
        let CategoryForm { name, image } = self;
        let name = validate_name(name.0)?;
        let image = prepare_optional_image(image, CATEGORY_IMAGE_FOLDER)?;
        Ok(CatalogEntryInput { name, image })
    }
}

pub(crate) fn validate_name(raw: String) -> CategoryFormResult<String> {
    let field = NameField { name: raw };
    field.validate()?;

    let sanitized = sanitize_inline_text(&field.name);
    if sanitized.is_empty() {
        return Err(CategoryFormError::EmptyName);
    }
    Ok(sanitized)
}

pub(crate) fn prepare_optional_image(
    upload: Option<TempFile>,
    folder: &str,
) -> CategoryFormResult<Option<StoredFile>> {
    let Some(mut upload) = upload else {
        return Ok(None);
    };

    match read_upload(&mut upload)? {
        Some(bytes) => Ok(Some(prepare_image(folder, bytes)?)),
        None => Ok(None),
    }
}

/// Admin decision on a store-scoped category or subcategory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Approve,
    Reject,
}

/// Form posted from the pending approvals page.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub action: String,
}

impl ReviewForm {
    pub fn into_action(self) -> CategoryFormResult<ReviewAction> {
        match self.action.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(ReviewAction::Approve),
            "reject" => Ok(ReviewAction::Reject),
            _ => Err(CategoryFormError::UnknownAction(self.action)),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::{Seek, SeekFrom, Write};

    use tempfile::NamedTempFile;

    use super::*;
    use crate::archive::template::placeholder_png;

    pub(crate) fn upload(name: &str, bytes: &[u8]) -> TempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(bytes).expect("write upload");
        file.as_file_mut()
            .seek(SeekFrom::Start(0))
            .expect("rewind");

        TempFile {
            file,
            content_type: None,
            file_name: Some(name.to_string()),
            size: bytes.len(),
        }
    }

    #[test]
    fn category_form_sanitizes_name() {
        let form = CategoryForm {
            name: Text("  Home \t Audio ".to_string()),
            image: None,
        };

        let input = form.into_input().expect("valid form");

        assert_eq!(input.name, "Home Audio");
        assert!(input.image.is_none());
    }

    #[test]
    fn category_form_rejects_blank_name() {
        let form = CategoryForm {
            name: Text("   ".to_string()),
            image: None,
        };

        assert!(matches!(
            form.into_input(),
            Err(CategoryFormError::EmptyName)
        ));
    }

    #[test]
    fn category_form_rejects_long_name() {
        let form = CategoryForm {
            name: Text("x".repeat(NAME_MAX_LEN + 1)),
            image: None,
        };

        assert!(matches!(
            form.into_input(),
            Err(CategoryFormError::Validation(_))
        ));
    }

    #[test]
    fn category_form_prepares_image() {
        let png = placeholder_png(4, [1, 2, 3]).expect("png");
        let form = CategoryForm {
            name: Text("Shoes".to_string()),
            image: Some(upload("shoes.png", &png)),
        };

        let input = form.into_input().expect("valid form");
        let image = input.image.expect("image kept");

        assert!(image.path.starts_with("categories/"));
        assert_eq!(image.bytes, png);
    }

    #[test]
    fn empty_file_part_means_no_image() {
        let form = CategoryForm {
            name: Text("Shoes".to_string()),
            image: Some(upload("", b"")),
        };

        assert!(form.into_input().expect("valid form").image.is_none());
    }

    #[test]
    fn category_form_rejects_non_image() {
        let form = CategoryForm {
            name: Text("Shoes".to_string()),
            image: Some(upload("shoes.png", b"plain text")),
        };

        assert!(matches!(
            form.into_input(),
            Err(CategoryFormError::Image(MediaError::UnsupportedImage))
        ));
    }

    #[test]
    fn review_form_parses_actions() {
        let approve = ReviewForm {
            action: " Approve ".to_string(),
        };
        assert_eq!(approve.into_action().expect("approve"), ReviewAction::Approve);

        let unknown = ReviewForm {
            action: "ban".to_string(),
        };
        assert!(matches!(
            unknown.into_action(),
            Err(CategoryFormError::UnknownAction(action)) if action == "ban"
        ));
    }
}
