/// Persisting split covers through the host's GraphQL API
use crate::error::SplitError;
use crate::splitter::EncodedImage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

const MOVIE_UPDATE_MUTATION: &str = "mutation MovieUpdate($input: MovieUpdateInput!) {
  movieUpdate(input: $input) {
    id
    front_image_path
    back_image_path
  }
}";

// Host plugin API
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = stash, js_name = callGQL)]
    async fn call_gql(request: JsValue) -> Result<JsValue, JsValue>;
}

/// Server-assigned image URLs after a successful update
#[derive(Debug, Clone, PartialEq)]
pub struct CoverRefs {
    pub front_ref: String,
    pub back_ref: String,
}

#[async_trait(?Send)]
pub trait CoverUpdater {
    async fn update(
        &self,
        resource_id: &str,
        front: &EncodedImage,
        back: &EncodedImage,
    ) -> Result<CoverRefs, SplitError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlRequest<'a> {
    pub operation_name: &'static str,
    pub variables: GqlVariables<'a>,
    pub query: &'static str,
}

#[derive(Debug, Serialize)]
pub struct GqlVariables<'a> {
    pub input: MovieUpdateInput<'a>,
}

#[derive(Debug, Serialize)]
pub struct MovieUpdateInput<'a> {
    pub id: &'a str,
    pub front_image: &'a EncodedImage,
    pub back_image: &'a EncodedImage,
}

impl<'a> GqlRequest<'a> {
    pub fn movie_update(id: &'a str, front: &'a EncodedImage, back: &'a EncodedImage) -> Self {
        GqlRequest {
            operation_name: "MovieUpdate",
            variables: GqlVariables {
                input: MovieUpdateInput {
                    id,
                    front_image: front,
                    back_image: back,
                },
            },
            query: MOVIE_UPDATE_MUTATION,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GqlResponse {
    #[serde(default)]
    pub data: Option<GqlData>,
    #[serde(default)]
    pub errors: Option<Vec<GqlError>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlData {
    #[serde(default)]
    pub movie_update: Option<MovieUpdatePayload>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MovieUpdatePayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub front_image_path: Option<String>,
    #[serde(default)]
    pub back_image_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GqlError {
    #[serde(default)]
    pub message: Option<String>,
}

impl GqlResponse {
    /// Success needs a non-empty id; otherwise the first error message wins.
    pub fn into_refs(self) -> Result<CoverRefs, SplitError> {
        let payload = self.data.and_then(|d| d.movie_update);

        let has_id = |p: &MovieUpdatePayload| p.id.as_deref().is_some_and(|id| !id.is_empty());
        if let Some(payload) = payload.filter(has_id) {
            return Ok(CoverRefs {
                front_ref: payload.front_image_path.unwrap_or_default(),
                back_ref: payload.back_image_path.unwrap_or_default(),
            });
        }

        let message = self
            .errors
            .unwrap_or_default()
            .into_iter()
            .find_map(|e| e.message)
            .unwrap_or_else(|| "Movie update returned no result".to_string());

        Err(SplitError::RemoteDomain(message))
    }
}

/// Sends the mutation through `stash.callGQL`
pub struct GqlCoverUpdater;

#[async_trait(?Send)]
impl CoverUpdater for GqlCoverUpdater {
    async fn update(
        &self,
        resource_id: &str,
        front: &EncodedImage,
        back: &EncodedImage,
    ) -> Result<CoverRefs, SplitError> {
        let request = GqlRequest::movie_update(resource_id, front, back);

        // Plain JS objects, not Maps, so the host can JSON.stringify them
        let request_js = request
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| SplitError::RemoteTransport(format!("Failed to serialize: {:?}", e)))?;

        let response_js = call_gql(request_js).await.map_err(SplitError::transport)?;

        let raw: serde_json::Value = serde_wasm_bindgen::from_value(response_js)
            .map_err(|e| {
                SplitError::RemoteTransport(format!("Failed to parse response: {:?}", e))
            })?;

        let response: GqlResponse = serde_json::from_value(raw.clone()).map_err(|e| {
            log::error!("Unexpected MovieUpdate response: {}", raw);
            SplitError::RemoteTransport(e.to_string())
        })?;

        response.into_refs()
    }
}
