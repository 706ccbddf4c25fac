use reqwest::header::{HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::builder::ApiClientBuilder;
use super::options::RequestOptions;
use crate::auth::AuthCoordinator;
use crate::config::ClientConfig;
use crate::interceptors::InterceptorPipeline;
use crate::schema::{
    fill_path, BodyOf, Delete, Get, HttpMethod, Operation, Patch, PathParamsOf, Post, Put,
    QueryOf, ResponseOf,
};
use crate::transport::{HttpTransport, RequestParts};
use crate::{ApiResult, Error, Result};

const REQUEST_ID: &str = "x-request-id";

/// Typed client bound to one base URL and one interceptor pipeline.
///
/// Every method is generic over a schema path type; the compiler rejects a
/// method the path does not declare and enforces the parameter, query, body
/// and response shapes declared for it.
///
/// ```rust,no_run
/// use typed_api_client::api::todos::{TodoById, TodoId};
/// use typed_api_client::{ApiClient, RequestOptions};
///
/// # async fn run() -> typed_api_client::Result<()> {
/// let client = ApiClient::builder().base_url("https://dummyjson.com").build()?;
/// let todo = client
///     .get::<TodoById>(&TodoId { id: 7 }, RequestOptions::default())
///     .await?;
/// println!("{}", todo.todo);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    pub(crate) transport: Arc<HttpTransport>,
    pub(crate) pipeline: Arc<InterceptorPipeline>,
    pub(crate) auth: AuthCoordinator,
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::new()
    }

    /// Client with default storage, navigator and refresher.
    pub fn new(config: ClientConfig) -> Result<Self> {
        ApiClientBuilder::new().config(config).build()
    }

    /// The auth coordinator registered on this client's pipeline.
    pub fn auth(&self) -> &AuthCoordinator {
        &self.auth
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Interceptor names in registration order.
    pub fn interceptors(&self) -> Vec<&'static str> {
        self.pipeline.names()
    }

    pub async fn get<P>(
        &self,
        params: &PathParamsOf<P, Get>,
        options: RequestOptions<QueryOf<P, Get>>,
    ) -> ApiResult<ResponseOf<P, Get>>
    where
        P: Operation<Get>,
    {
        self.call::<P, Get>(params, None, options).await
    }

    pub async fn post<P>(
        &self,
        params: &PathParamsOf<P, Post>,
        body: &BodyOf<P, Post>,
        options: RequestOptions<QueryOf<P, Post>>,
    ) -> ApiResult<ResponseOf<P, Post>>
    where
        P: Operation<Post>,
    {
        self.call::<P, Post>(params, Some(body), options).await
    }

    pub async fn put<P>(
        &self,
        params: &PathParamsOf<P, Put>,
        body: &BodyOf<P, Put>,
        options: RequestOptions<QueryOf<P, Put>>,
    ) -> ApiResult<ResponseOf<P, Put>>
    where
        P: Operation<Put>,
    {
        self.call::<P, Put>(params, Some(body), options).await
    }

    pub async fn patch<P>(
        &self,
        params: &PathParamsOf<P, Patch>,
        body: &BodyOf<P, Patch>,
        options: RequestOptions<QueryOf<P, Patch>>,
    ) -> ApiResult<ResponseOf<P, Patch>>
    where
        P: Operation<Patch>,
    {
        self.call::<P, Patch>(params, Some(body), options).await
    }

    pub async fn delete<P>(
        &self,
        params: &PathParamsOf<P, Delete>,
        options: RequestOptions<QueryOf<P, Delete>>,
    ) -> ApiResult<ResponseOf<P, Delete>>
    where
        P: Operation<Delete>,
    {
        self.call::<P, Delete>(params, None, options).await
    }

    async fn call<P, M>(
        &self,
        params: &P::PathParams,
        body: Option<&P::Body>,
        options: RequestOptions<P::Query>,
    ) -> ApiResult<P::Response>
    where
        P: Operation<M>,
        M: HttpMethod,
    {
        let mut req = RequestParts::new(M::method(), fill_path(P::TEMPLATE, params)?);
        if let Some(query) = &options.query {
            req.query = to_query(query)?;
        }
        if let Some(body) = body {
            req.body = Some(serde_json::to_value(body).map_err(Error::from)?).filter(|v| !v.is_null());
        }

        let request_id = Uuid::new_v4().to_string();
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            req.headers.insert(HeaderName::from_static(REQUEST_ID), value);
        }
        debug!(
            method = M::NAME,
            path = req.path.as_str(),
            request_id = request_id.as_str(),
            "sending request"
        );

        let response = self
            .pipeline
            .execute(&self.transport, req, options.cancel.as_ref())
            .await?;
        Ok(response.json::<P::Response>()?)
    }
}

/// Serialize query parameters, dropping unset (`null`) values.
fn to_query<Q: Serialize>(query: &Q) -> Result<Option<Value>> {
    match serde_json::to_value(query)? {
        Value::Null => Ok(None),
        Value::Object(mut map) => {
            map.retain(|_, v| !v.is_null());
            Ok((!map.is_empty()).then_some(Value::Object(map)))
        }
        other => Ok(Some(other)),
    }
}
