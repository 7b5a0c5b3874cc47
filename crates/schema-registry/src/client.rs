//! HTTP client for a Confluent-compatible schema registry.
//!
//! Only the two calls the publisher needs are implemented: fetching the
//! latest version under a subject and registering a new version.

use crate::error::{Result, SchemaRegistryError};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const REGISTRY_CONTENT_TYPE: &str = "application/vnd.schemaregistry.v1+json";

/// Schema definition language understood by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    #[default]
    Protobuf,
    Avro,
    Json,
}

/// A schema as stored by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDescriptor {
    /// Registry-assigned id, unique per schema body.
    pub id: i32,
    /// Subject the schema is registered under (the topic name).
    pub subject: String,
    /// Subject version, when the registry reported one.
    pub version: Option<i32>,
    /// Raw schema text.
    pub definition: String,
    pub schema_type: SchemaType,
}

impl SchemaDescriptor {
    /// Schema id as written into the wire header.
    pub fn wire_id(&self) -> Result<u32> {
        u32::try_from(self.id).map_err(|_| SchemaRegistryError::InvalidSchemaId(self.id))
    }
}

/// Registry operations used by [`crate::SchemaResolver`].
#[async_trait]
pub trait SchemaRegistry: Send + Sync {
    /// Latest schema under `subject`, or `None` if the subject has none.
    async fn latest_schema(&self, subject: &str) -> Result<Option<SchemaDescriptor>>;

    /// Register `definition` under `subject` and return the stored descriptor.
    async fn register_schema(
        &self,
        subject: &str,
        definition: &str,
        schema_type: SchemaType,
    ) -> Result<SchemaDescriptor>;
}

/// HTTP basic auth credentials for the registry.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    /// Parse a `user:password` pair, as found in
    /// `schema.registry.basic.auth.user.info`.
    pub fn parse(user_info: &str) -> Result<Self> {
        let (username, password) = user_info.split_once(':').ok_or_else(|| {
            SchemaRegistryError::Credentials("expected '<user>:<password>'".to_string())
        })?;
        if username.is_empty() {
            return Err(SchemaRegistryError::Credentials(
                "username is empty".to_string(),
            ));
        }
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response of `GET /subjects/{subject}/versions/latest`.
#[derive(Debug, Deserialize)]
struct SubjectVersionResponse {
    subject: String,
    id: i32,
    version: i32,
    schema: String,
    // Omitted by the registry for Avro schemas.
    #[serde(rename = "schemaType", default)]
    schema_type: Option<SchemaType>,
}

#[derive(Debug, Serialize)]
struct RegisterSchemaRequest<'a> {
    schema: &'a str,

    #[serde(rename = "schemaType", skip_serializing_if = "Option::is_none")]
    schema_type: Option<SchemaType>,
}

#[derive(Debug, Deserialize)]
struct RegisterSchemaResponse {
    id: i32,
}

/// Schema registry client speaking the REST API over HTTP(S).
pub struct HttpSchemaRegistry {
    base_url: String,
    credentials: Option<BasicAuth>,
    http_client: reqwest::Client,
}

impl HttpSchemaRegistry {
    /// Create a client for the registry at `base_url`
    /// (e.g. "https://psrc-xxxx.region.aws.confluent.cloud").
    pub fn new(base_url: &str, credentials: Option<BasicAuth>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn latest_version_url(&self, subject: &str) -> String {
        format!("{}/subjects/{subject}/versions/latest", self.base_url)
    }

    fn register_url(&self, subject: &str) -> String {
        format!("{}/subjects/{subject}/versions", self.base_url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some(auth) => request.basic_auth(&auth.username, Some(&auth.password)),
            None => request,
        }
    }
}

async fn status_error(response: reqwest::Response) -> SchemaRegistryError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    SchemaRegistryError::Status { status, body }
}

#[async_trait]
impl SchemaRegistry for HttpSchemaRegistry {
    async fn latest_schema(&self, subject: &str) -> Result<Option<SchemaDescriptor>> {
        let request = self
            .http_client
            .get(self.latest_version_url(subject))
            .header(reqwest::header::ACCEPT, REGISTRY_CONTENT_TYPE);
        let response = self.authorize(request).send().await?;

        // 40401 (subject not found) and 40402 (version not found) both mean
        // there is nothing registered yet.
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(subject = subject, "No schema registered for subject");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let latest: SubjectVersionResponse = response.json().await?;
        tracing::debug!(
            schema_id = latest.id,
            subject = %latest.subject,
            version = latest.version,
            "Fetched latest schema"
        );

        Ok(Some(SchemaDescriptor {
            id: latest.id,
            subject: latest.subject,
            version: Some(latest.version),
            definition: latest.schema,
            schema_type: latest.schema_type.unwrap_or(SchemaType::Avro),
        }))
    }

    async fn register_schema(
        &self,
        subject: &str,
        definition: &str,
        schema_type: SchemaType,
    ) -> Result<SchemaDescriptor> {
        let body = RegisterSchemaRequest {
            schema: definition,
            schema_type: registered_type(schema_type),
        };
        let request = self
            .http_client
            .post(self.register_url(subject))
            .header(reqwest::header::CONTENT_TYPE, REGISTRY_CONTENT_TYPE)
            .json(&body);
        let response = self.authorize(request).send().await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let registered: RegisterSchemaResponse = response.json().await?;
        tracing::debug!(
            schema_id = registered.id,
            subject = subject,
            format = ?schema_type,
            "Schema registered successfully"
        );

        Ok(SchemaDescriptor {
            id: registered.id,
            subject: subject.to_string(),
            version: None,
            definition: definition.to_string(),
            schema_type,
        })
    }
}

/// Avro is the registry default and is sent without a `schemaType`.
fn registered_type(schema_type: SchemaType) -> Option<SchemaType> {
    match schema_type {
        SchemaType::Avro => None,
        other => Some(other),
    }
}
