//! reqwest transport for the admin REST backend.
//!
//! Every call reads the bearer token from the injected [`Session`] at send time;
//! any 401 response tears the session down before the error reaches the caller.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{AccountStatus, AstroId, HoroscopeId, OrderId, ProblemId, UserId},
    error::ErrorBody,
    protocol::{
        AstrologerSummary, CloseComplaintRequest, ComplaintDecisionRequest, ComplaintDetail,
        GeneralComplaintSummary, Horoscope, HoroscopeDraft, HoroscopeUpdate, ListEnvelope,
        LoginRequest, LoginResponse, MaybeWrapped, MessageResponse, MetricsResponse,
        ReportRequest, ReportResponse, ServiceComplaintSummary, StatusUpdateRequest, UserSummary,
        VisibilityUpdateRequest,
    },
};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    error::{ClientError, ClientResult, ValidationError},
    forms::Reason,
    paging::{PageRequest, PageResult},
    resources::{ComplaintSide, ListResource},
    session::Session,
    AdminApi,
};

pub const DEFAULT_API_URL: &str = "https://api-admin.astrosway.com";
const LOGIN_FALLBACK_MESSAGE: &str = "Login failed. Please try again.";

pub struct HttpAdminClient {
    http: Client,
    base_url: Url,
    session: Arc<Session>,
}

impl HttpAdminClient {
    pub fn new(base_url: &str, session: Arc<Session>) -> ClientResult<Self> {
        Self::with_http_client(base_url, session, Client::new())
    }

    pub fn with_timeout(
        base_url: &str,
        session: Arc<Session>,
        timeout: Duration,
    ) -> ClientResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Self::with_http_client(base_url, session, http)
    }

    pub fn with_http_client(
        base_url: &str,
        session: Arc<Session>,
        http: Client,
    ) -> ClientResult<Self> {
        let base_url = parse_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        debug!(%method, path = url.path(), "admin api request");
        let builder = self.http.request(method, url);
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> ClientResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            self.session.expire();
            return Err(ClientError::Unauthorized);
        }
        let message = error_message(response).await;
        warn!(
            status = status.as_u16(),
            message = message.as_deref().unwrap_or_default(),
            "admin api rejected request"
        );
        Err(ClientError::rejected(status, message.as_deref()))
    }

    /// Decodes a JSON body; an empty body decodes as `{}`.
    async fn execute_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let bytes = self.execute(builder).await?.bytes().await?;
        let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"{}"
        } else {
            &bytes
        };
        serde_json::from_slice(body).map_err(|err| ClientError::Decode {
            message: err.to_string(),
        })
    }

    async fn send_json<B, T>(&self, method: Method, segments: &[&str], body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.execute_json(self.request(method, segments).json(body))
            .await
    }

    /// Fetches one page of `resource` and normalizes it against `request`.
    pub async fn list_page<T: DeserializeOwned>(
        &self,
        resource: ListResource,
        request: &PageRequest,
    ) -> ClientResult<PageResult<T>> {
        let builder = self
            .request(Method::GET, &["admin", resource.segment()])
            .query(&request.query_pairs());
        let envelope: ListEnvelope<T> = self.execute_json(builder).await?;
        let page = PageResult::from_envelope(envelope, request);
        debug!(
            resource = resource.segment(),
            page = page.page,
            items = page.items.len(),
            total = page.total,
            "list page received"
        );
        Ok(page)
    }
}

fn parse_base_url(raw: &str) -> ClientResult<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed)
        .map_err(|_| ValidationError::InvalidBaseUrl(raw.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::InvalidBaseUrl(raw.to_string()).into());
    }
    Ok(url)
}

async fn error_message(response: Response) -> Option<String> {
    let bytes = response.bytes().await.ok()?;
    let body = ErrorBody::parse(&bytes)?;
    body.message().map(str::to_string)
}

#[async_trait]
impl AdminApi for HttpAdminClient {
    async fn login(&self, username: &str, password: &str) -> ClientResult<()> {
        let response = self
            .http
            .post(self.endpoint(&["admin", "login"]))
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                self.session.expire();
            }
            let message = error_message(response).await;
            warn!(status = status.as_u16(), "admin login rejected");
            return Err(ClientError::LoginFailed {
                message: message.unwrap_or_else(|| LOGIN_FALLBACK_MESSAGE.to_string()),
            });
        }

        let body: LoginResponse = response.json().await?;
        match body.token.as_deref().map(str::trim) {
            Some(token) if body.success && !token.is_empty() => {
                self.session.establish(token)?;
                info!(username, "admin login succeeded");
                Ok(())
            }
            _ => Err(ClientError::LoginFailed {
                message: body
                    .message
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| "Login failed".to_string()),
            }),
        }
    }

    async fn list_users(&self, request: &PageRequest) -> ClientResult<PageResult<UserSummary>> {
        self.list_page(ListResource::Users, request).await
    }

    async fn list_astrologers(
        &self,
        request: &PageRequest,
    ) -> ClientResult<PageResult<AstrologerSummary>> {
        self.list_page(ListResource::Astrologers, request).await
    }

    async fn list_service_complaints(
        &self,
        request: &PageRequest,
    ) -> ClientResult<PageResult<ServiceComplaintSummary>> {
        self.list_page(ListResource::ServiceComplaints, request)
            .await
    }

    async fn list_general_complaints(
        &self,
        side: ComplaintSide,
        request: &PageRequest,
    ) -> ClientResult<PageResult<GeneralComplaintSummary>> {
        self.list_page(side.resource(), request).await
    }

    async fn list_horoscopes(&self, request: &PageRequest) -> ClientResult<PageResult<Horoscope>> {
        self.list_page(ListResource::Horoscopes, request).await
    }

    async fn set_user_status(
        &self,
        user_id: &UserId,
        status: AccountStatus,
    ) -> ClientResult<serde_json::Value> {
        self.send_json(
            Method::PATCH,
            &["admin", "users", user_id.as_str(), "deactivate"],
            &StatusUpdateRequest { status },
        )
        .await
    }

    async fn set_astrologer_status(
        &self,
        astro_id: &AstroId,
        status: AccountStatus,
    ) -> ClientResult<serde_json::Value> {
        self.send_json(
            Method::PATCH,
            &["admin", "astros", astro_id.as_str(), "status"],
            &StatusUpdateRequest { status },
        )
        .await
    }

    async fn set_astrologer_visibility(
        &self,
        astro_id: &AstroId,
        visible: bool,
    ) -> ClientResult<serde_json::Value> {
        self.send_json(
            Method::PATCH,
            &["admin", "astros", astro_id.as_str(), "visibility"],
            &VisibilityUpdateRequest { visible },
        )
        .await
    }

    async fn decide_complaint(
        &self,
        order_id: &OrderId,
        decision: &ComplaintDecisionRequest,
    ) -> ClientResult<MessageResponse> {
        self.send_json(
            Method::PATCH,
            &["admin", "user-service-complaints", order_id.as_str()],
            decision,
        )
        .await
    }

    async fn close_general_complaint(
        &self,
        side: ComplaintSide,
        problem_id: &ProblemId,
        reason: &Reason,
    ) -> ClientResult<MessageResponse> {
        self.send_json(
            Method::PATCH,
            &["admin", side.resource().segment(), problem_id.as_str(), "close"],
            &CloseComplaintRequest {
                reason: reason.as_str().to_string(),
            },
        )
        .await
    }

    async fn complaint_detail(
        &self,
        service_segment: &str,
        order_id: &OrderId,
    ) -> ClientResult<ComplaintDetail> {
        let builder = self.request(
            Method::GET,
            &[
                "admin",
                "user-service-complaints",
                service_segment,
                order_id.as_str(),
            ],
        );
        let detail: MaybeWrapped<ComplaintDetail> = self.execute_json(builder).await?;
        Ok(detail.into_inner())
    }

    async fn bulk_create_horoscopes(
        &self,
        drafts: &[HoroscopeDraft],
    ) -> ClientResult<MessageResponse> {
        self.send_json(Method::POST, &["admin", "horoscopes", "bulk"], drafts)
            .await
    }

    async fn update_horoscope(
        &self,
        horoscope_id: &HoroscopeId,
        update: &HoroscopeUpdate,
    ) -> ClientResult<serde_json::Value> {
        self.send_json(
            Method::PATCH,
            &["admin", "horoscopes", horoscope_id.as_str()],
            update,
        )
        .await
    }

    async fn delete_horoscope(&self, horoscope_id: &HoroscopeId) -> ClientResult<MessageResponse> {
        let builder = self.request(
            Method::DELETE,
            &["admin", "horoscopes", horoscope_id.as_str()],
        );
        self.execute_json(builder).await
    }

    async fn bulk_create_feedbacks(
        &self,
        feedbacks: &[serde_json::Value],
    ) -> ClientResult<MessageResponse> {
        self.send_json(Method::POST, &["admin", "feedbacks", "bulk"], feedbacks)
            .await
    }

    async fn generate_reports(&self, request: &ReportRequest) -> ClientResult<ReportResponse> {
        self.send_json(Method::POST, &["admin", "scheduler", "generate"], request)
            .await
    }

    async fn download_report(&self, file_name: &str) -> ClientResult<Vec<u8>> {
        let builder = self.request(
            Method::GET,
            &["admin", "scheduler", "download", file_name],
        );
        let bytes = self.execute(builder).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn trigger_scheduler(&self) -> ClientResult<MessageResponse> {
        let builder = self.request(Method::POST, &["admin", "scheduler", "trigger"]);
        self.execute_json(builder).await
    }

    async fn dashboard_metrics(&self) -> ClientResult<MetricsResponse> {
        let builder = self.request(Method::GET, &["admin", "dashboard", "metrics"]);
        self.execute_json(builder).await
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
