//! Client core for the consultation platform's admin console.
//!
//! A [`session::Session`] owns the bearer token and is injected into the
//! [`http::HttpAdminClient`]. List screens are driven by a
//! [`controller::ResourceListController`] and row actions go through the
//! [`dispatcher::ActionDispatcher`]; [`console::AdminConsole`] wires the typed
//! screens together.

use async_trait::async_trait;
use shared::{
    domain::{AccountStatus, AstroId, HoroscopeId, OrderId, ProblemId, UserId},
    protocol::{
        AstrologerSummary, ComplaintDecisionRequest, ComplaintDetail, GeneralComplaintSummary,
        Horoscope, HoroscopeDraft, HoroscopeUpdate, MessageResponse, MetricsResponse,
        ReportRequest, ReportResponse, ServiceComplaintSummary, UserSummary,
    },
};

pub mod bulk;
pub mod console;
pub mod controller;
pub mod dashboard;
pub mod dispatcher;
pub mod error;
pub mod forms;
pub mod http;
pub mod paging;
pub mod reports;
pub mod resources;
pub mod session;

pub use console::AdminConsole;
pub use controller::{FetchOutcome, ListSnapshot, ResourceListController};
pub use dispatcher::{ActionDispatcher, ActionKey, ActionState};
pub use error::{ClientError, ClientResult, ValidationError};
pub use forms::Reason;
pub use http::HttpAdminClient;
pub use paging::{FilterPatch, PageRequest, PageResult};
pub use resources::{ComplaintSide, ListResource};
pub use session::{
    FileTokenStore, MemoryTokenStore, Redirect, Route, RouteDecision, Session, SessionState,
    SignOutReason, TokenStore,
};

/// Operations the admin backend exposes.
///
/// Implementations must route every 401 through [`Session::expire`].
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> ClientResult<()>;

    async fn list_users(&self, request: &PageRequest) -> ClientResult<PageResult<UserSummary>>;
    async fn list_astrologers(
        &self,
        request: &PageRequest,
    ) -> ClientResult<PageResult<AstrologerSummary>>;
    async fn list_service_complaints(
        &self,
        request: &PageRequest,
    ) -> ClientResult<PageResult<ServiceComplaintSummary>>;
    async fn list_general_complaints(
        &self,
        side: ComplaintSide,
        request: &PageRequest,
    ) -> ClientResult<PageResult<GeneralComplaintSummary>>;
    async fn list_horoscopes(&self, request: &PageRequest) -> ClientResult<PageResult<Horoscope>>;

    async fn set_user_status(
        &self,
        user_id: &UserId,
        status: AccountStatus,
    ) -> ClientResult<serde_json::Value>;
    async fn set_astrologer_status(
        &self,
        astro_id: &AstroId,
        status: AccountStatus,
    ) -> ClientResult<serde_json::Value>;
    async fn set_astrologer_visibility(
        &self,
        astro_id: &AstroId,
        visible: bool,
    ) -> ClientResult<serde_json::Value>;

    async fn decide_complaint(
        &self,
        order_id: &OrderId,
        decision: &ComplaintDecisionRequest,
    ) -> ClientResult<MessageResponse>;
    async fn close_general_complaint(
        &self,
        side: ComplaintSide,
        problem_id: &ProblemId,
        reason: &Reason,
    ) -> ClientResult<MessageResponse>;
    async fn complaint_detail(
        &self,
        service_segment: &str,
        order_id: &OrderId,
    ) -> ClientResult<ComplaintDetail>;

    async fn bulk_create_horoscopes(
        &self,
        drafts: &[HoroscopeDraft],
    ) -> ClientResult<MessageResponse>;
    async fn update_horoscope(
        &self,
        horoscope_id: &HoroscopeId,
        update: &HoroscopeUpdate,
    ) -> ClientResult<serde_json::Value>;
    async fn delete_horoscope(&self, horoscope_id: &HoroscopeId) -> ClientResult<MessageResponse>;
    async fn bulk_create_feedbacks(
        &self,
        feedbacks: &[serde_json::Value],
    ) -> ClientResult<MessageResponse>;

    async fn generate_reports(&self, request: &ReportRequest) -> ClientResult<ReportResponse>;
    async fn download_report(&self, file_name: &str) -> ClientResult<Vec<u8>>;
    async fn trigger_scheduler(&self) -> ClientResult<MessageResponse>;

    async fn dashboard_metrics(&self) -> ClientResult<MetricsResponse>;
}
