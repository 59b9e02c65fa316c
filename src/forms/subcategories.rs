use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};

use crate::forms::categories::{
    CatalogEntryInput, CategoryFormResult, prepare_optional_image, validate_name,
};

/// Media folder for subcategory images.
pub const SUBCATEGORY_IMAGE_FOLDER: &str = "subcategories";

/// Multipart payload of the add and edit subcategory forms.
#[derive(MultipartForm)]
pub struct SubCategoryForm {
    pub name: Text<String>,
    /// Parent category.
    pub category_id: Text<i32>,
    #[multipart(limit = "5MB")]
    pub image: Option<TempFile>,
}

#[derive(Debug)]
pub struct SubCategoryInput {
    pub category_id: i32,
    pub entry: CatalogEntryInput,
}

impl SubCategoryForm {
    pub fn into_input(self) -> CategoryFormResult<SubCategoryInput> {
        let SubCategoryForm {
            name,
            category_id,
            image,
        } = self;

        let name = validate_name(name.0)?;
        let image = prepare_optional_image(image, SUBCATEGORY_IMAGE_FOLDER)?;

        Ok(SubCategoryInput {
            category_id: category_id.0,
            entry: CatalogEntryInput { name, image },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::categories::CategoryFormError;

    #[test]
    fn subcategory_form_keeps_parent() {
        let form = SubCategoryForm {
            name: Text(" Headsets ".to_string()),
            category_id: Text(7),
            image: None,
        };

        let input = form.into_input().expect("valid form");

        assert_eq!(input.category_id, 7);
        assert_eq!(input.entry.name, "Headsets");
    }

    #[test]
    fn subcategory_form_rejects_blank_name() {
        let form = SubCategoryForm {
            name: Text("\t".to_string()),
            category_id: Text(7),
            image: None,
        };

        assert!(matches!(
            form.into_input(),
            Err(CategoryFormError::EmptyName)
        ));
    }
}
