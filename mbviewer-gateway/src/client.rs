//! Typed client for the processing backend

use crate::config::BackendConfig;
use crate::http_error;
use crate::models::{DeleteRequest, ProcessingSettings, ScriptSettings};
use mbviewer_core::Result;
use mbviewer_io::join_url;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub const LOD_FILE_NAMES_PATH: &str = "get-lod-file-names";
pub const RAW_FILE_NAMES_PATH: &str = "get-raw-file-names";
pub const PROCESS_FILE_PATH: &str = "post-process-file/";
pub const EXECUTE_SCRIPT_PATH: &str = "post-execute-script/";
pub const DELETE_FILE_PATH: &str = "post-file-delete/";

/// Operations offered by the processing backend
///
/// Each call is a single request/response. Callers never block rendering on
/// these; they only refresh their file lists afterwards.
#[allow(async_fn_in_trait)]
pub trait BackendApi {
    /// Base names of files that have LOD variants
    async fn list_lod_file_names(&self) -> Result<Vec<String>>;

    /// Names of raw survey files awaiting processing
    async fn list_raw_file_names(&self) -> Result<Vec<String>>;

    /// Convert a raw file into LOD variants
    async fn process_file(&self, settings: &ProcessingSettings) -> Result<bool>;

    /// Run analysis scripts on a processed file
    async fn execute_scripts(&self, settings: &ScriptSettings) -> Result<bool>;

    /// Delete a file and everything derived from it
    async fn delete_file(&self, file_name: &str) -> Result<bool>;

    /// Upload a raw file to the file server
    async fn upload_file(&self, file_name: &str, contents: Vec<u8>) -> Result<()>;
}

/// [`BackendApi`] over HTTP
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    config: BackendConfig,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(http_error)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Absolute URL of a backend endpoint
    pub fn endpoint(&self, path: &str) -> String {
        join_url(&self.config.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path);
        log::debug!("GET {}", url);

        self.client
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(http_error)?
            .json::<T>()
            .await
            .map_err(http_error)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        log::debug!("POST {}", url);

        self.client
            .post(&url)
            .json(body)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(http_error)?
            .json::<T>()
            .await
            .map_err(http_error)
    }
}

impl BackendApi for HttpBackend {
    async fn list_lod_file_names(&self) -> Result<Vec<String>> {
        self.get_json(LOD_FILE_NAMES_PATH).await
    }

    async fn list_raw_file_names(&self) -> Result<Vec<String>> {
        self.get_json(RAW_FILE_NAMES_PATH).await
    }

    async fn process_file(&self, settings: &ProcessingSettings) -> Result<bool> {
        self.post_json(PROCESS_FILE_PATH, settings).await
    }

    async fn execute_scripts(&self, settings: &ScriptSettings) -> Result<bool> {
        self.post_json(EXECUTE_SCRIPT_PATH, settings).await
    }

    async fn delete_file(&self, file_name: &str) -> Result<bool> {
        let body = DeleteRequest {
            file_name: file_name.to_string(),
        };
        self.post_json(DELETE_FILE_PATH, &body).await
    }

    async fn upload_file(&self, file_name: &str, contents: Vec<u8>) -> Result<()> {
        log::debug!("Uploading {} ({} bytes) to {}", file_name, contents.len(), self.config.upload_url);

        let form = Form::new().part("file", Part::bytes(contents).file_name(file_name.to_string()));
        self.client
            .post(&self.config.upload_url)
            .multipart(form)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(http_error)?;

        Ok(())
    }
}
