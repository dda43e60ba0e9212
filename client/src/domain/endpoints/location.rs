//! Address geocoding.

use serde::Deserialize;

use crate::domain::api_client::ApiClient;
use crate::domain::error::ApiResult;
use crate::domain::models::{GeocodeResult, ListPayload};
use crate::domain::request::RequestDescriptor;

const GEOCODE_PATH: &str = "location/geocode/";

/// The geocoder answers with one match or a list of candidates.
#[derive(Deserialize)]
#[serde(untagged)]
enum GeocodePayload {
    Many(ListPayload<GeocodeResult>),
    One(GeocodeResult),
}

/// Location endpoint group.
#[derive(Debug, Clone, Copy)]
pub struct LocationEndpoints<'a> {
    client: &'a ApiClient,
}

impl<'a> LocationEndpoints<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Candidate positions for `address`, best match first.
    pub async fn geocode(&self, address: &str) -> ApiResult<Vec<GeocodeResult>> {
        let payload = self
            .client
            .send_json::<GeocodePayload>(
                RequestDescriptor::get(GEOCODE_PATH).with_query("address", address),
            )
            .await?;
        Ok(match payload {
            GeocodePayload::Many(list) => list.into_items(),
            GeocodePayload::One(result) => vec![result],
        })
    }
}
