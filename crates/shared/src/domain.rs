use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(AstroId);
id_newtype!(OrderId);
id_newtype!(ProblemId);
id_newtype!(HoroscopeId);

/// Account status shared by users and astrologers.
///
/// Values the console does not know decode as `Unknown` so one odd row never
/// fails a whole page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Inactive,
    #[default]
    #[serde(other)]
    Unknown,
}

impl AccountStatus {
    /// `None` for `Unknown`; there is no safe opposite to send.
    pub fn toggled(self) -> Option<Self> {
        match self {
            Self::Active => Some(Self::Inactive),
            Self::Inactive => Some(Self::Active),
            Self::Unknown => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing visibility of an astrologer. Independent of [`AccountStatus`].
///
/// A missing value means hidden.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    #[default]
    #[serde(alias = "invisible", alias = "hide")]
    Hidden,
    #[serde(other)]
    Unknown,
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        self == Self::Visible
    }

    pub fn toggled(self) -> Option<Self> {
        match self {
            Self::Visible => Some(Self::Hidden),
            Self::Hidden => Some(Self::Visible),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Visible => f.write_str("visible"),
            Self::Hidden => f.write_str("hidden"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplaintStatus {
    Open,
    Closed,
    Rejected,
    #[serde(other)]
    Other,
}

impl ComplaintStatus {
    pub fn is_open(self) -> bool {
        self == Self::Open
    }

    pub fn as_filter(self) -> Option<&'static str> {
        match self {
            Self::Open => Some("open"),
            Self::Closed => Some("closed"),
            Self::Rejected => Some("rejected"),
            Self::Other => None,
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter().unwrap_or("other"))
    }
}

/// Consultation channel a service complaint belongs to.
///
/// The list endpoint reports `chat`, `call` and `video` while the detail endpoint
/// expects `chat`, `ivrCall` and `videoCall`; both spellings deserialize here and
/// [`ServiceType::detail_segment`] picks the detail-side name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    #[serde(rename = "chat", alias = "Chat")]
    Chat,
    #[serde(rename = "call", alias = "ivrCall", alias = "Call")]
    Call,
    #[serde(rename = "video", alias = "videoCall", alias = "Video")]
    Video,
}

/// List-side name to detail-endpoint path segment.
pub const SERVICE_TYPE_DETAIL_SEGMENTS: &[(&str, &str)] = &[
    ("chat", "chat"),
    ("call", "ivrCall"),
    ("video", "videoCall"),
];

impl ServiceType {
    pub const ALL: [ServiceType; 3] = [Self::Chat, Self::Call, Self::Video];

    pub fn list_name(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Call => "call",
            Self::Video => "video",
        }
    }

    pub fn detail_segment(self) -> &'static str {
        detail_segment_for(self.list_name())
    }

    /// Accepts either naming scheme, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "chat" => Some(Self::Chat),
            "call" | "ivrcall" => Some(Self::Call),
            "video" | "videocall" => Some(Self::Video),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.list_name())
    }
}

/// Maps a raw list-side service type to the detail endpoint segment.
///
/// Missing values fall back to `chat`; unknown values pass through lowercased.
pub fn detail_segment_for(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "chat";
    }
    SERVICE_TYPE_DETAIL_SEGMENTS
        .iter()
        .find(|(list, _)| list.eq_ignore_ascii_case(trimmed))
        .map(|(_, detail)| *detail)
        .unwrap_or(trimmed)
}

pub fn detail_segment_owned(raw: &str) -> String {
    let mapped = detail_segment_for(raw);
    if SERVICE_TYPE_DETAIL_SEGMENTS
        .iter()
        .any(|(_, detail)| *detail == mapped)
    {
        mapped.to_string()
    } else {
        mapped.to_ascii_lowercase()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplaintAction {
    Accept,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_lookup_maps_list_names() {
        assert_eq!(detail_segment_for("chat"), "chat");
        assert_eq!(detail_segment_for("call"), "ivrCall");
        assert_eq!(detail_segment_for("VIDEO"), "videoCall");
        assert_eq!(detail_segment_for(""), "chat");
    }

    #[test]
    fn detail_lookup_passes_unknown_values_through_lowercased() {
        assert_eq!(detail_segment_owned("Voice"), "voice");
        assert_eq!(detail_segment_owned("call"), "ivrCall");
    }

    #[test]
    fn service_type_accepts_both_spellings() {
        let list: ServiceType = serde_json::from_str("\"call\"").expect("list name");
        let detail: ServiceType = serde_json::from_str("\"videoCall\"").expect("detail name");
        assert_eq!(list, ServiceType::Call);
        assert_eq!(detail, ServiceType::Video);
        assert_eq!(ServiceType::parse("ivrCall"), Some(ServiceType::Call));
        assert_eq!(ServiceType::Video.detail_segment(), "videoCall");
    }

    #[test]
    fn unknown_complaint_status_is_not_open() {
        let status: ComplaintStatus = serde_json::from_str("\"resolved\"").expect("status");
        assert_eq!(status, ComplaintStatus::Other);
        assert!(!status.is_open());
    }

    #[test]
    fn toggles_are_involutions() {
        assert_eq!(AccountStatus::Active.toggled(), Some(AccountStatus::Inactive));
        assert_eq!(
            AccountStatus::Active.toggled().and_then(AccountStatus::toggled),
            Some(AccountStatus::Active)
        );
        assert_eq!(Visibility::Hidden.toggled(), Some(Visibility::Visible));
    }

    #[test]
    fn unknown_values_decode_but_do_not_toggle() {
        let status: AccountStatus = serde_json::from_str("\"blocked\"").expect("status");
        assert_eq!(status, AccountStatus::Unknown);
        assert_eq!(status.toggled(), None);

        let visible: Visibility = serde_json::from_str("\"pending\"").expect("visibility");
        assert_eq!(visible, Visibility::Unknown);
        assert_eq!(visible.toggled(), None);
        assert!(!visible.is_visible());
    }
}
