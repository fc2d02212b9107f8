use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    detail_segment_owned, AccountStatus, AstroId, ComplaintAction, ComplaintStatus, HoroscopeId,
    OrderId, ProblemId, ServiceType, UserId, Visibility,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Generic acknowledgement body returned by mutation and bulk endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

/// Body of every `GET /admin/{resource}` list call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Detail endpoints answer either `{ "data": record }` or the bare record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaybeWrapped<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> MaybeWrapped<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } => data,
            Self::Bare(value) => value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstrologerSummary {
    pub astro_id: AstroId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default)]
    pub visible: Visibility,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceComplaintSummary {
    pub order_id: OrderId,
    #[serde(default)]
    pub service_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub astro_id: Option<AstroId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub astro_name: Option<String>,
    pub status: ComplaintStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
}

impl ServiceComplaintSummary {
    pub fn service_type(&self) -> Option<ServiceType> {
        ServiceType::parse(&self.service_type)
    }

    /// Path segment for the detail endpoint.
    pub fn detail_segment(&self) -> String {
        detail_segment_owned(&self.service_type)
    }

    pub fn is_decidable(&self) -> bool {
        self.status.is_open()
    }
}

/// `problemTypes` arrives as a single label or a list of labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProblemTypes {
    One(String),
    Many(Vec<String>),
}

impl fmt::Display for ProblemTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(label) => f.write_str(label),
            Self::Many(labels) => f.write_str(&labels.join(", ")),
        }
    }
}

/// A user or astrologer grievance that is not tied to an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralComplaintSummary {
    pub problem_id: ProblemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub astro_id: Option<AstroId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_types: Option<ProblemTypes>,
    pub status: ComplaintStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl GeneralComplaintSummary {
    /// Closing is one-way; only open complaints offer it.
    pub fn can_close(&self) -> bool {
        self.status.is_open()
    }

    pub fn filer(&self) -> String {
        self.user_id
            .as_ref()
            .map(ToString::to_string)
            .or_else(|| self.astro_id.as_ref().map(ToString::to_string))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintDecisionRequest {
    pub action: ComplaintAction,
    pub reason: String,
    pub user_refund_money: u64,
    pub astro_refund_money: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseComplaintRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: AccountStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityUpdateRequest {
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    #[serde(default, rename = "isAstrolger", alias = "isAstrologer")]
    pub is_astrologer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<serde_json::Value>,
}

impl ConversationMessage {
    pub fn sender_label(&self) -> &'static str {
        if self.is_astrologer {
            "Astrologer"
        } else {
            "User"
        }
    }

    /// The `text` field of the message, or its raw JSON when absent.
    pub fn display_text(&self) -> Option<String> {
        let message = self.message.as_ref()?;
        match message.get("text").and_then(serde_json::Value::as_str) {
            Some(text) => Some(text.to_string()),
            None => match message {
                serde_json::Value::String(text) => Some(text.clone()),
                other => Some(other.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
}

/// `status` on the detail record is either a label or the full history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailStatus {
    Label(String),
    History(Vec<StatusHistoryEntry>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ivr_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub astro_id: Option<AstroId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DetailStatus>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_type: Option<String>,
    #[serde(
        default,
        rename = "ratePerMintue",
        alias = "ratePerMinute",
        skip_serializing_if = "Option::is_none"
    )]
    pub rate_per_minute: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_received: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub conversation: Vec<ConversationMessage>,
}

impl ComplaintDetail {
    pub fn session_id(&self) -> Option<&str> {
        self.ivr_id
            .as_deref()
            .or(self.chat_id.as_deref())
            .or(self.video_id.as_deref())
    }

    pub fn current_status(&self) -> Option<&str> {
        match (&self.last_status, &self.status) {
            (Some(last), _) => Some(last.as_str()),
            (None, Some(DetailStatus::Label(label))) => Some(label.as_str()),
            (None, Some(DetailStatus::History(history))) => {
                history.last().map(|entry| entry.kind.as_str())
            }
            (None, None) => None,
        }
    }

    pub fn status_history(&self) -> &[StatusHistoryEntry] {
        match &self.status {
            Some(DetailStatus::History(history)) => history,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoroscopeDraft {
    pub sign_name: String,
    pub description: String,
    pub date: NaiveDate,
    /// The backend field is spelled `isAsctive`.
    #[serde(rename = "isAsctive", alias = "isActive", default = "default_active_flag")]
    pub is_active: i32,
}

fn default_active_flag() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Horoscope {
    pub horoscope_id: HoroscopeId,
    #[serde(flatten)]
    pub draft: HoroscopeDraft,
}

/// Partial update for `PATCH /admin/horoscopes/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoroscopeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "isAsctive", default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<i32>,
}

impl HoroscopeUpdate {
    pub fn is_empty(&self) -> bool {
        self.sign_name.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.is_active.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFile {
    #[serde(default)]
    pub collection: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub files: Vec<ReportFile>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMetrics {
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub request: u64,
    #[serde(default)]
    pub complete: u64,
    #[serde(default)]
    pub issue: u64,
    #[serde(default)]
    pub reject: u64,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub chat: ServiceMetrics,
    #[serde(default)]
    pub ivr_call: ServiceMetrics,
    #[serde(default)]
    pub video_call: ServiceMetrics,
}

impl DashboardMetrics {
    pub fn for_service(&self, service: ServiceType) -> ServiceMetrics {
        match service {
            ServiceType::Chat => self.chat,
            ServiceType::Call => self.ivr_call,
            ServiceType::Video => self.video_call,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DashboardMetrics>,
}
