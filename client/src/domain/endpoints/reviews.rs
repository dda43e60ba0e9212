//! Product reviews.

use super::fetch_list;
use crate::domain::api_client::ApiClient;
use crate::domain::error::ApiResult;
use crate::domain::models::{NewReview, Review};
use crate::domain::request::RequestDescriptor;

const REVIEWS_PATH: &str = "reviews/";

fn review_path(id: u64) -> String {
    format!("reviews/{id}/")
}

/// Review endpoint group.
#[derive(Debug, Clone, Copy)]
pub struct ReviewEndpoints<'a> {
    client: &'a ApiClient,
}

impl<'a> ReviewEndpoints<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Reviews, optionally for one product.
    pub async fn list(&self, product_id: Option<u64>) -> ApiResult<Vec<Review>> {
        fetch_list(
            self.client,
            RequestDescriptor::get(REVIEWS_PATH).with_optional_query("product", product_id),
        )
        .await
    }

    pub async fn create(&self, review: &NewReview) -> ApiResult<Review> {
        let descriptor = RequestDescriptor::post(REVIEWS_PATH).with_json(review)?;
        self.client.send_json(descriptor).await
    }

    pub async fn update(&self, id: u64, review: &NewReview) -> ApiResult<Review> {
        let descriptor = RequestDescriptor::patch(review_path(id)).with_json(review)?;
        self.client.send_json(descriptor).await
    }

    pub async fn delete(&self, id: u64) -> ApiResult<()> {
        self.client
            .send_unit(RequestDescriptor::delete(review_path(id)))
            .await
    }
}
