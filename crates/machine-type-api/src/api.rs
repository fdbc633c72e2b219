//! API server for launching machine type updates.
//!
//! Serves the `update-machine-type` subresource: each call creates one
//! machine-type-updater Job in the namespace named by the path and answers
//! with the generated job name.

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::job::generate_machine_type_updater_job;
use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::put,
    Json, Router,
};
use crds::{UpdateMachineTypeInfo, UpdateMachineTypeRequest};
use kubevirt_client::KubeVirtClientTrait;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub const UPDATE_MACHINE_TYPE_PATH: &str =
    "/apis/subresources.kubevirt.io/v1/namespaces/{namespace}/virtualmachines/update-machine-type";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn KubeVirtClientTrait>,
    pub updater_image: Option<String>,
}

/// Creates the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            UPDATE_MACHINE_TYPE_PATH,
            put(update_machine_type).post(update_machine_type),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Decodes a YAML or JSON request body. An empty body is the default request.
pub fn decode_request(body: &[u8]) -> ApiResult<UpdateMachineTypeRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(UpdateMachineTypeRequest::default());
    }
    serde_yaml::from_slice(body).map_err(|e| {
        ApiError::BadRequest(format!(
            "Can not unmarshal Request body to struct, error: {}",
            e
        ))
    })
}

async fn update_machine_type(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
    body: Bytes,
) -> ApiResult<Json<UpdateMachineTypeInfo>> {
    let request = decode_request(&body)?;

    let image = request
        .image
        .clone()
        .filter(|image| !image.is_empty())
        .or_else(|| state.updater_image.clone())
        .ok_or_else(|| ApiError::Internal("failed getting machine-type-updater image".to_string()))?;

    let job = generate_machine_type_updater_job(&namespace, &image, &request);
    let job = state.client.create_job(&namespace, &job).await.map_err(|e| {
        error!("Failed to create machine-type-updater job in {}: {}", namespace, e);
        ApiError::Internal(format!("error creating machine-type-updater job: {}", e))
    })?;

    let info = UpdateMachineTypeInfo {
        job_name: job.metadata.name.unwrap_or_default(),
        job_namespace: job.metadata.namespace.unwrap_or(namespace),
    };
    info!(
        "Created machine-type-updater job {}/{} (glob: \"{}\", restart: {}, selector: \"{}\")",
        info.job_namespace,
        info.job_name,
        request.machine_type_glob,
        request.restart_required,
        request.label_selector
    );
    Ok(Json(info))
}

/// HTTP server wrapping the router
pub struct ApiServer {
    config: ApiConfig,
    state: AppState,
}

impl ApiServer {
    pub fn new(config: ApiConfig, client: Arc<dyn KubeVirtClientTrait>) -> Self {
        let state = AppState {
            client,
            updater_image: config.updater_image.clone(),
        };
        Self { config, state }
    }

    /// Serves requests until the process is stopped.
    pub async fn start(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_address).await?;
        info!("API server listening on {}", listener.local_addr()?);

        axum::serve(listener, create_router(self.state.clone())).await?;
        Ok(())
    }
}
