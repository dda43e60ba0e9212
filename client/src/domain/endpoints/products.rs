//! Product catalogue, categories and media upload.

use serde_json::Value;

use super::fetch_list;
use crate::domain::api_client::ApiClient;
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::models::{Category, Product, ProductDraft, ProductQuery};
use crate::domain::request::{FilePart, MultipartForm, RequestDescriptor};

pub(crate) const PRODUCTS_PATH: &str = "products/";
const MY_PRODUCTS_PATH: &str = "products/my-products/";
const SEARCH_PATH: &str = "products/search/";
const CATEGORIES_PATH: &str = "categories/";

fn product_path(id: u64) -> String {
    format!("products/{id}/")
}

/// Product endpoint group.
#[derive(Debug, Clone, Copy)]
pub struct ProductEndpoints<'a> {
    client: &'a ApiClient,
}

impl<'a> ProductEndpoints<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &ProductQuery) -> ApiResult<Vec<Product>> {
        fetch_list(self.client, query.apply(RequestDescriptor::get(PRODUCTS_PATH))).await
    }

    pub async fn get(&self, id: u64) -> ApiResult<Product> {
        self.client
            .send_json(RequestDescriptor::get(product_path(id)))
            .await
    }

    /// Products owned by the authenticated farmer.
    pub async fn mine(&self) -> ApiResult<Vec<Product>> {
        fetch_list(self.client, RequestDescriptor::get(MY_PRODUCTS_PATH)).await
    }

    pub async fn search(&self, term: &str) -> ApiResult<Vec<Product>> {
        fetch_list(
            self.client,
            RequestDescriptor::get(SEARCH_PATH).with_query("q", term),
        )
        .await
    }

    pub async fn categories(&self) -> ApiResult<Vec<Category>> {
        fetch_list(self.client, RequestDescriptor::get(CATEGORIES_PATH)).await
    }

    /// Create a product; drafts with images are sent as multipart forms.
    pub async fn create(&self, draft: &ProductDraft) -> ApiResult<Product> {
        let descriptor = with_draft(RequestDescriptor::post(PRODUCTS_PATH), draft)?;
        self.client.send_json(descriptor).await
    }

    pub async fn update(&self, id: u64, draft: &ProductDraft) -> ApiResult<Product> {
        let descriptor = with_draft(RequestDescriptor::patch(product_path(id)), draft)?;
        self.client.send_json(descriptor).await
    }

    pub async fn delete(&self, id: u64) -> ApiResult<()> {
        self.client
            .send_unit(RequestDescriptor::delete(product_path(id)))
            .await
    }

    /// Attach an image to an existing product.
    pub async fn upload_image(&self, id: u64, image: FilePart) -> ApiResult<Product> {
        let form = MultipartForm::default().file(image);
        self.client
            .send_json(RequestDescriptor::patch(product_path(id)).with_multipart(form))
            .await
    }
}

fn with_draft(descriptor: RequestDescriptor, draft: &ProductDraft) -> ApiResult<RequestDescriptor> {
    if draft.images.is_empty() {
        return descriptor.with_json(draft);
    }

    let Value::Object(fields) = serde_json::to_value(draft)
        .map_err(|error| ApiError::configuration(format!("could not encode product: {error}")))?
    else {
        return Err(ApiError::configuration("product draft is not an object"));
    };
    let form = fields
        .into_iter()
        .filter_map(|(name, value)| match value {
            Value::Null => None,
            Value::String(text) => Some((name, text)),
            other => Some((name, other.to_string())),
        })
        .fold(MultipartForm::default(), |form, (name, value)| {
            form.text(name, value)
        });
    let form = draft
        .images
        .iter()
        .cloned()
        .fold(form, MultipartForm::file);
    Ok(descriptor.with_multipart(form))
}
