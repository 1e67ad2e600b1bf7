use axum::Json;
use serde::Deserialize;

use crate::extract::AppQuery;
use crate::services::resources::{self, Collection, CollectionView};

#[derive(Debug, Deserialize)]
pub struct ResourceParams {
    pub collection: Option<Collection>,
}

pub async fn list_resources(
    AppQuery(params): AppQuery<ResourceParams>,
) -> Json<Vec<CollectionView>> {
    Json(resources::catalog(params.collection))
}
