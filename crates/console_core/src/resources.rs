use shared::domain::SortOrder;

use crate::{paging::PageRequest, session::Route};

pub const FILTER_NAME: &str = "name";
pub const FILTER_SERVICE_TYPE: &str = "serviceType";
pub const FILTER_STATUS: &str = "status";

/// Paginated collections exposed under `/admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListResource {
    Users,
    Astrologers,
    ServiceComplaints,
    UserGeneralComplaints,
    AstroGeneralComplaints,
    Horoscopes,
}

impl ListResource {
    pub const ALL: [ListResource; 6] = [
        Self::Users,
        Self::Astrologers,
        Self::ServiceComplaints,
        Self::UserGeneralComplaints,
        Self::AstroGeneralComplaints,
        Self::Horoscopes,
    ];

    pub fn segment(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Astrologers => "astros",
            Self::ServiceComplaints => "user-service-complaints",
            Self::UserGeneralComplaints => "user-general-complaints",
            Self::AstroGeneralComplaints => "astro-general-complaints",
            Self::Horoscopes => "horoscopes",
        }
    }

    pub fn path(self) -> String {
        format!("/admin/{}", self.segment())
    }

    pub fn filter_keys(self) -> &'static [&'static str] {
        match self {
            Self::Users | Self::Astrologers => &[FILTER_NAME],
            Self::ServiceComplaints => &[FILTER_SERVICE_TYPE, FILTER_STATUS],
            Self::UserGeneralComplaints | Self::AstroGeneralComplaints | Self::Horoscopes => &[],
        }
    }

    /// Request a screen starts from.
    pub fn default_request(self) -> PageRequest {
        match self {
            Self::Astrologers => PageRequest::default().with_sort(SortOrder::Asc.as_str()),
            _ => PageRequest::default(),
        }
    }

    pub fn route(self) -> Route {
        match self {
            Self::Users => Route::Users,
            Self::Astrologers => Route::Astrologers,
            Self::ServiceComplaints => Route::UserServiceComplaints,
            Self::UserGeneralComplaints => Route::UserGeneralComplaints,
            Self::AstroGeneralComplaints => Route::AstroGeneralComplaints,
            Self::Horoscopes => Route::Horoscopes,
        }
    }
}

/// Who filed a general (not order-bound) complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComplaintSide {
    User,
    Astro,
}

impl ComplaintSide {
    pub fn resource(self) -> ListResource {
        match self {
            Self::User => ListResource::UserGeneralComplaints,
            Self::Astro => ListResource::AstroGeneralComplaints,
        }
    }

    pub fn close_path(self, problem_id: &str) -> String {
        format!("{}/{problem_id}/close", self.resource().path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_admin_prefix() {
        assert_eq!(ListResource::Astrologers.path(), "/admin/astros");
        assert_eq!(
            ComplaintSide::Astro.close_path("p-7"),
            "/admin/astro-general-complaints/p-7/close"
        );
    }

    #[test]
    fn astrologers_default_to_ascending_sort() {
        let request = ListResource::Astrologers.default_request();
        assert_eq!(request.sort(), Some("asc"));
        assert_eq!(request.page(), 1);
        assert_eq!(ListResource::Users.default_request().sort(), None);
    }
}
