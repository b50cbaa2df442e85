//! Category administration endpoints.
//!
//! Create and update are sent as multipart forms so an image can ride
//! along; updates use `POST` with a `_method=PUT` override because the
//! backend only parses multipart bodies on `POST`.

use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;

use sonique_core::forms::CategoryForm;
use sonique_core::models::Category;
use sonique_core::session::BearerToken;
use sonique_core::types::DbId;

use crate::api::MarketplaceApi;
use crate::error::ApiError;

impl MarketplaceApi {
    /// All categories, including inactive ones.
    pub async fn admin_list_categories(&self, token: &BearerToken) -> Result<Vec<Category>, ApiError> {
        Self::send_field(self.get("/api/admin/categories", Some(token)), "categories").await
    }

    pub async fn create_category(
        &self,
        token: &BearerToken,
        form: &CategoryForm,
    ) -> Result<Category, ApiError> {
        let builder = self
            .post("/api/admin/categories", Some(token))
            .multipart(category_multipart(form, false)?);
        let category: Category = Self::send_field(builder, "category").await?;
        tracing::info!(category_id = category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn update_category(
        &self,
        token: &BearerToken,
        id: DbId,
        form: &CategoryForm,
    ) -> Result<Category, ApiError> {
        let builder = self.update_category_request(token, id, form)?;
        let category: Category = Self::send_field(builder, "category").await?;
        tracing::info!(category_id = id, "Category updated");
        Ok(category)
    }

    fn update_category_request(
        &self,
        token: &BearerToken,
        id: DbId,
        form: &CategoryForm,
    ) -> Result<RequestBuilder, ApiError> {
        Ok(self
            .post(&format!("/api/admin/categories/{id}"), Some(token))
            .multipart(category_multipart(form, true)?))
    }

    pub async fn delete_category(&self, token: &BearerToken, id: DbId) -> Result<(), ApiError> {
        Self::send_action(self.delete(&format!("/api/admin/categories/{id}"), Some(token))).await?;
        tracing::info!(category_id = id, "Category deleted");
        Ok(())
    }

    pub async fn toggle_category_active(
        &self,
        token: &BearerToken,
        id: DbId,
    ) -> Result<Option<Category>, ApiError> {
        Self::send_field(
            self.post(&format!("/api/admin/categories/{id}/toggle-active"), Some(token)),
            "category",
        )
        .await
    }
}

/// Build the multipart body; `method_override` adds `_method=PUT`.
fn category_multipart(form: &CategoryForm, method_override: bool) -> Result<Form, ApiError> {
    let mut multipart = Form::new();
    for (name, value) in form.text_fields() {
        multipart = multipart.text(name, value);
    }
    if method_override {
        multipart = multipart.text("_method", "PUT");
    }
    if let Some(image) = &form.image {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.filename.clone())
            .mime_str(&image.mime)?;
        multipart = multipart.part("image", part);
    }
    Ok(multipart)
}

#[cfg(test)]
mod tests {
    use sonique_core::forms::ImageUpload;

    use crate::api::tests::api;

    use super::*;

    #[test]
    fn update_is_post_with_multipart_body() {
        let token = BearerToken::new("t");
        let form = CategoryForm {
            name: "Afrobeat".into(),
            ..CategoryForm::default()
        };
        let req = api()
            .update_category_request(&token, 4, &form)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(req.method(), reqwest::Method::POST);
        assert_eq!(req.url().path(), "/api/admin/categories/4");
        let content_type = req
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(content_type.starts_with("multipart/form-data"));
    }

    #[test]
    fn invalid_image_mime_is_an_error() {
        let form = CategoryForm {
            name: "Afrobeat".into(),
            image: Some(ImageUpload {
                filename: "cover.png".into(),
                mime: "not a mime".into(),
                bytes: vec![1, 2, 3],
            }),
            ..CategoryForm::default()
        };
        assert!(category_multipart(&form, false).is_err());
    }
}
