use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Response, StatusCode,
};

use crate::entity::Entity;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend responded {status_code}: {message}")]
    Status { status_code: u16, message: String },
    #[error("unable to decode {resource} response: {source}")]
    Decode {
        resource: &'static str,
        source: serde_json::Error,
    },
    #[error("unable to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("{0} has no identifier")]
    MissingId(&'static str),
    #[error("invalid API token")]
    InvalidToken,
}

#[async_trait]
pub trait ResponseExt {
    async fn map_api_error(self) -> Result<Response, ApiError>;
}

#[async_trait]
impl ResponseExt for Response {
    async fn map_api_error(self) -> Result<Response, ApiError> {
        if self.status().is_success() {
            return Ok(self);
        }
        Err(ApiError::Status {
            status_code: self.status().as_u16(),
            message: self.text().await.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl ResponseExt for Result<Response, reqwest::Error> {
    async fn map_api_error(self) -> Result<Response, ApiError> {
        match self {
            Ok(response) => response.map_api_error().await,
            Err(e) => Err(ApiError::Transport(e)),
        }
    }
}

/// Query parameters accepted by the list endpoints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub filter: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort: Vec<String>,
}

impl QueryOptions {
    /// Only entities not yet linked through `relation`, e.g.
    /// `unclaimed_by("building")` sends `filter=building-is-null`.
    pub fn unclaimed_by(relation: &str) -> Self {
        QueryOptions {
            filter: Some(format!("{relation}-is-null")),
            ..Default::default()
        }
    }

    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(filter) = &self.filter {
            pairs.push(("filter", filter.clone()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size", size.to_string()));
        }
        for sort in &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        pairs
    }
}

/// Shared connection to the rent-management REST API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(url: &str, token: Option<&str>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::InvalidToken)?;
            headers.insert(AUTHORIZATION, value);
        }
        let client = Client::builder().default_headers(headers).build()?;
        Ok(ApiClient {
            url: url.trim_end_matches('/').to_owned(),
            client,
        })
    }

    pub fn repository<E: Entity>(&self) -> Repository<E> {
        Repository {
            client: self.client.clone(),
            resource_url: format!("{}/api/{}", self.url, E::RESOURCE),
            _entity: PhantomData,
        }
    }
}

/// CRUD calls for one entity type.
#[derive(Clone, Debug)]
pub struct Repository<E> {
    client: Client,
    resource_url: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Repository<E> {
    fn resource_url(&self) -> &str {
        &self.resource_url
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/{}", self.resource_url(), id)
    }

    fn require_id(entity: &E) -> Result<i64, ApiError> {
        entity.id().ok_or(ApiError::MissingId(E::TITLE))
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            resource: E::RESOURCE,
            source,
        })
    }

    pub async fn create(&self, entity: &E) -> Result<E, ApiError> {
        log::debug!("POST {}", self.resource_url());
        let response = self
            .client
            .post(self.resource_url())
            .json(entity)
            .send()
            .await
            .map_api_error()
            .await?;
        Self::decode(response).await
    }

    pub async fn update(&self, entity: &E) -> Result<E, ApiError> {
        let url = self.item_url(Self::require_id(entity)?);
        log::debug!("PUT {}", url);
        let response = self
            .client
            .put(&url)
            .json(entity)
            .send()
            .await
            .map_api_error()
            .await?;
        Self::decode(response).await
    }

    /// Merge-patch: only the fields set on `entity` are sent.
    pub async fn partial_update(&self, entity: &E) -> Result<E, ApiError> {
        let url = self.item_url(Self::require_id(entity)?);
        log::debug!("PATCH {}", url);
        let body = serde_json::to_vec(entity)?;
        let response = self
            .client
            .patch(&url)
            .header(CONTENT_TYPE, "application/merge-patch+json")
            .body(body)
            .send()
            .await
            .map_api_error()
            .await?;
        Self::decode(response).await
    }

    /// `Ok(None)` when the backend has no such record, either as a 404 or as
    /// an empty body.
    pub async fn find(&self, id: i64) -> Result<Option<E>, ApiError> {
        let url = self.item_url(id);
        log::debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response.map_api_error().await?;
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str::<Option<E>>(&body).map_err(|source| ApiError::Decode {
            resource: E::RESOURCE,
            source,
        })
    }

    pub async fn query(&self, options: &QueryOptions) -> Result<Vec<E>, ApiError> {
        log::debug!("GET {} {:?}", self.resource_url(), options);
        let response = self
            .client
            .get(self.resource_url())
            .query(&options.to_pairs())
            .send()
            .await
            .map_api_error()
            .await?;
        let list: Option<Vec<E>> = Self::decode(response).await?;
        Ok(list.unwrap_or_default())
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let url = self.item_url(id);
        log::debug!("DELETE {}", url);
        self.client
            .delete(&url)
            .send()
            .await
            .map_api_error()
            .await?;
        log::info!("{} with id {} deleted", E::TITLE, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::{Building, Location, Owner, Tenant};
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri(), Some("secret")).unwrap()
    }

    #[tokio::test]
    async fn find_returns_the_entity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/buildings/123"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 123})))
            .expect(1)
            .mount(&server)
            .await;

        let repo = client_for(&server).await.repository::<Building>();
        let found = repo.find(123).await.unwrap();
        assert_eq!(found.and_then(|b| b.id), Some(123));
    }

    #[tokio::test]
    async fn find_maps_null_body_and_404_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/owners/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/owners/2"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let repo = client_for(&server).await.repository::<Owner>();
        assert!(repo.find(1).await.unwrap().is_none());
        assert!(repo.find(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn query_sends_filter_and_paging() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/locations"))
            .and(query_param("filter", "building-is-null"))
            .and(query_param("size", "20"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let repo = client_for(&server).await.repository::<Location>();
        let options = QueryOptions {
            size: Some(20),
            ..QueryOptions::unclaimed_by("building")
        };
        let list = repo.query(&options).await.unwrap();
        assert_eq!(list.len(), 2);
    }

    #[tokio::test]
    async fn query_parses_tenant_dates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tenants"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "rentStartDate": "2021-11-03"},
                {"id": 2}
            ])))
            .mount(&server)
            .await;

        let repo = client_for(&server).await.repository::<Tenant>();
        let list = repo.query(&QueryOptions::default()).await.unwrap();
        assert_eq!(list[0].rent_start_date, NaiveDate::from_ymd_opt(2021, 11, 3));
        assert_eq!(list[1].rent_start_date, None);
    }

    #[tokio::test]
    async fn update_puts_to_the_item_url() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/tenants/5"))
            .and(body_json(json!({
                "id": 5,
                "tenantName": "Asha",
                "rentStartDate": "2022-04-01",
                "sendNotification": false,
                "monthEndCalculation": false,
                "calculateOnDate": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 5,
                "tenantName": "Asha",
                "rentStartDate": "2022-04-01"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let repo = client_for(&server).await.repository::<Tenant>();
        let tenant = Tenant {
            id: Some(5),
            tenant_name: Some("Asha".into()),
            rent_start_date: NaiveDate::from_ymd_opt(2022, 4, 1),
            ..Default::default()
        };
        let saved = repo.update(&tenant).await.unwrap();
        assert_eq!(saved.rent_start_date, tenant.rent_start_date);
    }

    #[tokio::test]
    async fn update_without_identifier_is_refused() {
        let server = MockServer::start().await;
        let repo = client_for(&server).await.repository::<Owner>();
        let err = repo.update(&Owner::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingId("Owner")));
        let err = repo.partial_update(&Owner::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingId(_)));
    }

    #[tokio::test]
    async fn partial_update_sends_only_set_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/owners/3"))
            .and(header("content-type", "application/merge-patch+json"))
            .and(body_json(json!({"id": 3, "emailAddress": "a@b.in"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 3, "phoneNumber": "99", "emailAddress": "a@b.in"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let repo = client_for(&server).await.repository::<Owner>();
        let patch = Owner {
            id: Some(3),
            email_address: Some("a@b.in".into()),
            ..Default::default()
        };
        let saved = repo.partial_update(&patch).await.unwrap();
        assert_eq!(saved.phone_number.as_deref(), Some("99"));
    }

    #[tokio::test]
    async fn create_and_delete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/owners"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 11, "phoneNumber": "12345"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/owners/11"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let repo = client_for(&server).await.repository::<Owner>();
        let created = repo
            .create(&Owner {
                phone_number: Some("12345".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(created.id, Some(11));
        repo.delete(11).await.unwrap();
    }

    #[tokio::test]
    async fn backend_errors_carry_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/owners/4"))
            .respond_with(ResponseTemplate::new(400).set_body_string("idnull"))
            .mount(&server)
            .await;

        let repo = client_for(&server).await.repository::<Owner>();
        match repo.delete(4).await.unwrap_err() {
            ApiError::Status {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 400);
                assert_eq!(message, "idnull");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn repository_urls() {
        let client = ApiClient::new("http://backend:8081/", None).unwrap();
        let repo = client.repository::<crate::structs::GenerateBill>();
        assert_eq!(repo.resource_url(), "http://backend:8081/api/generate-bills");
    }
}
