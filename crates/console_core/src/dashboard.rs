use futures::try_join;
use shared::{
    domain::ServiceType,
    protocol::{DashboardMetrics, ServiceMetrics},
};
use tracing::debug;

use crate::{
    error::ClientResult, paging::PageRequest, resources::ComplaintSide, AdminApi,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceTotals {
    pub users: u64,
    pub astrologers: u64,
    pub service_complaints: u64,
    pub user_general_complaints: u64,
    pub astro_general_complaints: u64,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardOverview {
    pub metrics: Option<DashboardMetrics>,
    pub totals: ResourceTotals,
}

impl DashboardOverview {
    /// Fetches the daily metrics and one-row pages of the account and complaint
    /// lists concurrently.
    pub async fn load(api: &dyn AdminApi) -> ClientResult<Self> {
        let probe = PageRequest::new(1, 1)?;
        let (metrics, users, astrologers, service, user_general, astro_general) = try_join!(
            api.dashboard_metrics(),
            api.list_users(&probe),
            api.list_astrologers(&probe),
            api.list_service_complaints(&probe),
            api.list_general_complaints(ComplaintSide::User, &probe),
            api.list_general_complaints(ComplaintSide::Astro, &probe),
        )?;

        let totals = ResourceTotals {
            users: users.total,
            astrologers: astrologers.total,
            service_complaints: service.total,
            user_general_complaints: user_general.total,
            astro_general_complaints: astro_general.total,
        };
        debug!(?totals, "dashboard loaded");
        Ok(Self {
            metrics: metrics.data,
            totals,
        })
    }

    pub fn service(&self, service: ServiceType) -> ServiceMetrics {
        self.metrics
            .as_ref()
            .map(|metrics| metrics.for_service(service))
            .unwrap_or_default()
    }

    /// Requests across all channels for the reported day.
    pub fn total_requests(&self) -> u64 {
        ServiceType::ALL
            .into_iter()
            .map(|service| self.service(service).total)
            .sum()
    }
}
