use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// HTTP client for the PostgREST endpoint in front of the relational
/// schema. Row filters ride in the query string (`?col=eq.value`) and
/// inserts return the created rows when the `Prefer` header asks for
/// representation.
pub struct PostgrestClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl PostgrestClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.database_rest_url.clone(),
            service_key: config.database_service_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert(
            "apikey",
            HeaderValue::from_str(&self.service_key)
                .map_err(|_| anyhow!("Service key is not a valid header value"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let bearer = auth_token.unwrap_or(&self.service_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", bearer))
                .map_err(|_| anyhow!("Bearer token is not a valid header value"))?,
        );

        Ok(headers)
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, auth_token, body, None)
            .await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.get_headers(auth_token)?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Database API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                409 => anyhow!("Row conflict: {}", error_text),
                _ => anyhow!("Database API error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Fire a statement whose response body is empty (DELETE, PATCH
    /// without representation).
    pub async fn request_no_content(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let headers = self.get_headers(auth_token)?;
        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Database API error ({}): {}", status, error_text);
            return Err(anyhow!("Database API error ({}): {}", status, error_text));
        }

        Ok(())
    }

    /// Upload raw bytes to the storage API alongside the relational
    /// endpoint.
    pub async fn upload_object(
        &self,
        bucket: &str,
        object_name: &str,
        content_type: &str,
        data: Vec<u8>,
        auth_token: Option<&str>,
    ) -> Result<()> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, object_name);
        debug!("Uploading object to {}", url);

        let mut headers = self.get_headers(auth_token)?;
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(content_type)
                .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
        );

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .body(data)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Storage upload failed ({}): {}", status, error_text);
            return Err(anyhow!("Storage upload failed ({}): {}", status, error_text));
        }

        Ok(())
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }

    /// Public URL for an object in a bucket.
    pub fn get_public_url(&self, bucket: &str, object_name: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, bucket, object_name)
    }
}
