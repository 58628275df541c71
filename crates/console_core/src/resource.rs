use std::fmt::{Debug, Display};

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shared::error::{ErrorBody, ResourceError};
use tracing::{debug, warn};
use url::Url;

use crate::editor::FormModel;

/// A remotely stored record the console can list and edit. Implemented by
/// the entity structs themselves; `Draft` is the editable projection used
/// by the editor session.
pub trait Resource: Clone + Debug + PartialEq + Send + Sync + 'static {
    type Id: Copy + Eq + std::hash::Hash + Display + Debug + Send + Sync + 'static;
    type Draft: FormModel + Serialize;

    /// Collection segment under the API root, e.g. `services`.
    const PATH: &'static str;
    /// Singular noun for user-facing messages, e.g. `service`.
    const LABEL: &'static str;

    fn id(&self) -> Self::Id;
    fn new_draft() -> Self::Draft;
    fn edit_draft(&self) -> Self::Draft;
}

/// Remote CRUD surface for one resource type. The REST implementation
/// lives below; tests substitute recording fakes.
#[async_trait]
pub trait ResourceClient<R: Resource>: Send + Sync {
    async fn list(&self) -> Result<Vec<R>, ResourceError>;
    async fn get(&self, id: R::Id) -> Result<R, ResourceError>;
    async fn create(&self, draft: &R::Draft) -> Result<R, ResourceError>;
    async fn update(&self, id: R::Id, draft: &R::Draft) -> Result<R, ResourceError>;
    async fn delete(&self, id: R::Id) -> Result<(), ResourceError>;
}

/// JSON-over-HTTP client for one resource collection.
pub struct RestResource<R> {
    http: reqwest::Client,
    base: Url,
    _marker: std::marker::PhantomData<fn() -> R>,
}

impl<R: Resource> RestResource<R> {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Shares an existing HTTP client across resource clients. The base URL
    /// is the API root; the collection path comes from the resource type.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, url::ParseError> {
        let mut base = base_url.trim_end_matches('/').to_owned();
        base.push('/');
        Ok(Self {
            http,
            base: Url::parse(&base)?,
            _marker: std::marker::PhantomData,
        })
    }

    fn collection_url(&self) -> Result<Url, ResourceError> {
        self.base
            .join(R::PATH)
            .map_err(|err| ResourceError::Network(err.to_string()))
    }

    fn item_url(&self, id: R::Id) -> Result<Url, ResourceError> {
        self.base
            .join(&format!("{}/{id}", R::PATH))
            .map_err(|err| ResourceError::Network(err.to_string()))
    }
}

fn request_error<R: Resource>(err: reqwest::Error) -> ResourceError {
    warn!(resource = R::PATH, error = %err, "api: request failed");
    ResourceError::Network(err.to_string())
}

fn message_from(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if !parsed.message.is_empty() {
            return parsed.message;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no response body".to_owned()
    } else {
        trimmed.chars().take(200).collect()
    }
}

async fn check_status<R: Resource>(
    response: Response,
    id: Option<&str>,
) -> Result<Response, ResourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let err = classify_status::<R>(status, &body, id);
    warn!(resource = R::PATH, status = status.as_u16(), error = %err, "api: request rejected");
    Err(err)
}

fn classify_status<R: Resource>(status: StatusCode, body: &str, id: Option<&str>) -> ResourceError {
    match status {
        StatusCode::NOT_FOUND => ResourceError::NotFound {
            resource: R::LABEL,
            id: id.unwrap_or("?").to_owned(),
        },
        StatusCode::CONFLICT => ResourceError::Conflict(message_from(body)),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
                if !parsed.errors.is_empty() {
                    let mut field_errors: Vec<(String, String)> =
                        parsed.errors.into_iter().collect();
                    field_errors.sort();
                    return ResourceError::Validation { field_errors };
                }
            }
            ResourceError::Server {
                status: status.as_u16(),
                message: message_from(body),
            }
        }
        other => ResourceError::Server {
            status: other.as_u16(),
            message: message_from(body),
        },
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ResourceError> {
    let status = response.status().as_u16();
    response.json().await.map_err(|err| {
        warn!(status, error = %err, "api: undecodable response body");
        ResourceError::Server {
            status,
            message: format!("invalid response body: {err}"),
        }
    })
}

#[async_trait]
impl<R: Resource> ResourceClient<R> for RestResource<R>
where
    R: DeserializeOwned,
{
    async fn list(&self) -> Result<Vec<R>, ResourceError> {
        debug!(resource = R::PATH, "api: list");
        let response = self
            .http
            .get(self.collection_url()?)
            .send()
            .await
            .map_err(request_error::<R>)?;
        let response = check_status::<R>(response, None).await?;
        read_json(response).await
    }

    async fn get(&self, id: R::Id) -> Result<R, ResourceError> {
        debug!(resource = R::PATH, id = %id, "api: get");
        let url = self.item_url(id)?;
        let response = self.http.get(url).send().await.map_err(request_error::<R>)?;
        let response = check_status::<R>(response, Some(&id.to_string())).await?;
        read_json(response).await
    }

    async fn create(&self, draft: &R::Draft) -> Result<R, ResourceError> {
        debug!(resource = R::PATH, "api: create");
        let response = self
            .http
            .post(self.collection_url()?)
            .json(draft)
            .send()
            .await
            .map_err(request_error::<R>)?;
        let response = check_status::<R>(response, None).await?;
        read_json(response).await
    }

    async fn update(&self, id: R::Id, draft: &R::Draft) -> Result<R, ResourceError> {
        debug!(resource = R::PATH, id = %id, "api: update");
        let url = self.item_url(id)?;
        let response = self
            .http
            .put(url)
            .json(draft)
            .send()
            .await
            .map_err(request_error::<R>)?;
        let response = check_status::<R>(response, Some(&id.to_string())).await?;
        read_json(response).await
    }

    async fn delete(&self, id: R::Id) -> Result<(), ResourceError> {
        debug!(resource = R::PATH, id = %id, "api: delete");
        let url = self.item_url(id)?;
        let response = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(request_error::<R>)?;
        check_status::<R>(response, Some(&id.to_string())).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/resource_tests.rs"]
mod tests;
