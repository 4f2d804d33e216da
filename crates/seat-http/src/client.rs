//! Cliente HTTP del motor de workflows y de la fuente de assets.
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use seat_core::{
    AssetSnapshot, AssetSource, CancelAck, PipelineError, PipelineRequest, ProgressSnapshot, VenueId, WorkflowClient,
    WorkflowId,
};

use crate::config::ApiConfig;
use crate::dto::{AssetsResponse, CancelResponse, ErrorBody, ProgressResponse, StartResponse};
use crate::error::HttpError;

#[derive(Debug, Clone)]
pub struct HttpPipelineApi {
    client: Client,
    config: ApiConfig,
}

impl HttpPipelineApi {
    pub fn new(config: ApiConfig) -> Result<Self, HttpError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, HttpError> { Self::new(ApiConfig::from_env()?) }

    pub fn config(&self) -> &ApiConfig { &self.config }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, HttpError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(HttpError::Status { status: status.as_u16(), detail: ErrorBody::detail_of(&body) });
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, HttpError> {
        let url = self.config.url(path);
        debug!("http:get url={url}");
        Self::decode(self.client.get(&url).send().await?).await
    }

    async fn post_json<B, T>(&self, path: &str, body: Option<&B>) -> Result<T, HttpError>
    where
        B: serde::Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.config.url(path);
        debug!("http:post url={url}");
        let request = self.client.post(&url);
        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };
        Self::decode(request.send().await?).await
    }

    /// Reintenta lecturas idempotentes ante errores transitorios.
    async fn get_with_retry<T: DeserializeOwned>(&self, path: &str) -> Result<T, HttpError> {
        let mut attempts = 0;
        loop {
            match self.get_json(path).await {
                Err(e) if e.is_retryable() && attempts < self.config.read_retries => {
                    let delay_ms = 200 * u64::from(attempts + 1);
                    warn!("http:retry path={} attempt={} err={} -> sleeping {}ms", path, attempts + 1, e, delay_ms);
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    attempts += 1;
                }
                r => return r,
            }
        }
    }
}

#[async_trait]
impl WorkflowClient for HttpPipelineApi {
    async fn start_pipeline(&self, request: &PipelineRequest) -> Result<WorkflowId, PipelineError> {
        let stage = request.stage();
        let response: StartResponse =
            self.post_json("pipelines/", Some(request)).await.map_err(|e| e.into_launch(stage))?;
        debug!("http:started workflow={} status={} message={}", response.workflow_id, response.status, response.message);
        Ok(response.workflow_id)
    }

    async fn get_progress(&self, workflow_id: &WorkflowId) -> Result<ProgressSnapshot, PipelineError> {
        let response: ProgressResponse =
            self.get_json(&format!("pipelines/{workflow_id}")).await.map_err(HttpError::into_poll)?;
        Ok(response.into_snapshot())
    }

    async fn cancel(&self, workflow_id: &WorkflowId) -> Result<CancelAck, PipelineError> {
        let response: CancelResponse = self
            .post_json::<(), _>(&format!("pipelines/{workflow_id}/cancel"), None)
            .await
            .map_err(HttpError::into_cancel)?;
        Ok(CancelAck { workflow_id: response.workflow_id, status: response.status })
    }
}

#[async_trait]
impl AssetSource for HttpPipelineApi {
    async fn get_asset_snapshot(&self, venue_id: &VenueId) -> Result<AssetSnapshot, PipelineError> {
        let response: AssetsResponse =
            self.get_with_retry(&format!("images/{venue_id}/assets")).await.map_err(HttpError::into_fetch)?;
        response.into_snapshot().map_err(HttpError::into_fetch)
    }
}
