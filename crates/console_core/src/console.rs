//! Screen-level operations: one list controller per resource and typed row
//! actions routed through the shared dispatcher.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::FutureExt;
use serde::de::DeserializeOwned;
use shared::{
    domain::{AccountStatus, HoroscopeId, OrderId, UserId, Visibility},
    protocol::{
        AstrologerSummary, ComplaintDetail, GeneralComplaintSummary, Horoscope, HoroscopeUpdate,
        MessageResponse, ReportResponse, ServiceComplaintSummary, UserSummary,
    },
};
use tracing::info;

use crate::{
    bulk,
    controller::{FetchFuture, ResourceListController},
    dashboard::DashboardOverview,
    dispatcher::{ActionDispatcher, ActionKey, ActionState},
    error::{ClientError, ClientResult, ValidationError},
    forms::{AcceptDraft, Reason, ReasonForm, RejectDraft},
    paging::PageRequest,
    reports::{self, ReportRange},
    resources::{ComplaintSide, ListResource},
    session::Session,
    AdminApi,
};

pub const NO_URL_FOR_ORDER: &str = "no url found for this orderId";

pub struct AdminConsole {
    api: Arc<dyn AdminApi>,
    session: Arc<Session>,
    dispatcher: ActionDispatcher,
}

impl AdminConsole {
    pub fn new(api: Arc<dyn AdminApi>, session: Arc<Session>) -> Self {
        Self {
            api,
            session,
            dispatcher: ActionDispatcher::new(),
        }
    }

    pub fn api(&self) -> &Arc<dyn AdminApi> {
        &self.api
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    pub fn action_state(&self) -> ActionState {
        self.dispatcher.state()
    }

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<()> {
        self.api.login(username.trim(), password).await
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    fn controller<T>(
        &self,
        resource: ListResource,
        initial: PageRequest,
        fetch: fn(Arc<dyn AdminApi>, PageRequest) -> FetchFuture<T>,
    ) -> ResourceListController<T>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        let api = Arc::clone(&self.api);
        ResourceListController::configure(
            resource.segment(),
            Arc::new(move |request| fetch(Arc::clone(&api), request)),
            initial,
        )
    }

    pub fn users(&self, initial: Option<PageRequest>) -> ResourceListController<UserSummary> {
        let resource = ListResource::Users;
        self.controller(
            resource,
            initial.unwrap_or_else(|| resource.default_request()),
            |api, request| async move { api.list_users(&request).await }.boxed(),
        )
    }

    pub fn astrologers(
        &self,
        initial: Option<PageRequest>,
    ) -> ResourceListController<AstrologerSummary> {
        let resource = ListResource::Astrologers;
        self.controller(
            resource,
            initial.unwrap_or_else(|| resource.default_request()),
            |api, request| async move { api.list_astrologers(&request).await }.boxed(),
        )
    }

    pub fn service_complaints(
        &self,
        initial: Option<PageRequest>,
    ) -> ResourceListController<ServiceComplaintSummary> {
        let resource = ListResource::ServiceComplaints;
        self.controller(
            resource,
            initial.unwrap_or_else(|| resource.default_request()),
            |api, request| async move { api.list_service_complaints(&request).await }.boxed(),
        )
    }

    pub fn general_complaints(
        &self,
        side: ComplaintSide,
        initial: Option<PageRequest>,
    ) -> ResourceListController<GeneralComplaintSummary> {
        let resource = side.resource();
        let initial = initial.unwrap_or_else(|| resource.default_request());
        match side {
            ComplaintSide::User => self.controller(resource, initial, |api, request| {
                async move {
                    api.list_general_complaints(ComplaintSide::User, &request)
                        .await
                }
                .boxed()
            }),
            ComplaintSide::Astro => self.controller(resource, initial, |api, request| {
                async move {
                    api.list_general_complaints(ComplaintSide::Astro, &request)
                        .await
                }
                .boxed()
            }),
        }
    }

    pub fn horoscopes(&self, initial: Option<PageRequest>) -> ResourceListController<Horoscope> {
        let resource = ListResource::Horoscopes;
        self.controller(
            resource,
            initial.unwrap_or_else(|| resource.default_request()),
            |api, request| async move { api.list_horoscopes(&request).await }.boxed(),
        )
    }

    pub async fn dashboard(&self) -> ClientResult<DashboardOverview> {
        DashboardOverview::load(self.api.as_ref()).await
    }

    pub async fn set_user_status(
        &self,
        user_id: &UserId,
        status: AccountStatus,
        list: &ResourceListController<UserSummary>,
    ) -> ClientResult<AccountStatus> {
        self.dispatcher
            .run_then_refresh(
                ActionKey::custom(format!("user-status-{user_id}")),
                || self.api.set_user_status(user_id, status),
                list,
            )
            .await?;
        info!(%user_id, %status, "user status updated");
        Ok(status)
    }

    /// Flips the astrologer between active and inactive.
    pub async fn toggle_astrologer_status(
        &self,
        astrologer: &AstrologerSummary,
        list: &ResourceListController<AstrologerSummary>,
    ) -> ClientResult<AccountStatus> {
        let next = astrologer
            .status
            .toggled()
            .ok_or_else(|| ValidationError::UnknownState {
                field: "status",
                value: astrologer.status.to_string(),
            })?;
        self.dispatcher
            .run_then_refresh(
                ActionKey::status(&astrologer.astro_id),
                || self.api.set_astrologer_status(&astrologer.astro_id, next),
                list,
            )
            .await?;
        info!(astro_id = %astrologer.astro_id, status = %next, "astrologer status toggled");
        Ok(next)
    }

    /// Visibility is independent of status; toggling one never touches the other.
    pub async fn toggle_astrologer_visibility(
        &self,
        astrologer: &AstrologerSummary,
        list: &ResourceListController<AstrologerSummary>,
    ) -> ClientResult<Visibility> {
        let next = astrologer
            .visible
            .toggled()
            .ok_or_else(|| ValidationError::UnknownState {
                field: "visibility",
                value: astrologer.visible.to_string(),
            })?;
        self.dispatcher
            .run_then_refresh(
                ActionKey::visibility(&astrologer.astro_id),
                || {
                    self.api
                        .set_astrologer_visibility(&astrologer.astro_id, next.is_visible())
                },
                list,
            )
            .await?;
        info!(astro_id = %astrologer.astro_id, visibility = %next, "astrologer visibility toggled");
        Ok(next)
    }

    /// Validation runs before the action key is taken, so a bad draft never
    /// shows up in [`ActionState`].
    pub async fn accept_complaint(
        &self,
        order_id: &OrderId,
        draft: &AcceptDraft,
        list: &ResourceListController<ServiceComplaintSummary>,
    ) -> ClientResult<MessageResponse> {
        let decision = draft.validate()?;
        self.dispatcher
            .run_then_refresh(
                ActionKey::decision(order_id),
                || self.api.decide_complaint(order_id, &decision),
                list,
            )
            .await
    }

    pub async fn reject_complaint(
        &self,
        order_id: &OrderId,
        draft: &RejectDraft,
        list: &ResourceListController<ServiceComplaintSummary>,
    ) -> ClientResult<MessageResponse> {
        let decision = draft.validate()?;
        self.dispatcher
            .run_then_refresh(
                ActionKey::decision(order_id),
                || self.api.decide_complaint(order_id, &decision),
                list,
            )
            .await
    }

    /// Submits a rejection prompt; a failed request reopens the prompt.
    pub async fn submit_rejection(
        &self,
        form: &mut ReasonForm<OrderId>,
        list: &ResourceListController<ServiceComplaintSummary>,
    ) -> ClientResult<MessageResponse> {
        let (order_id, reason) = form.submit()?;
        let result = self
            .reject_complaint(&order_id, &RejectDraft::new(reason.into_inner()), list)
            .await;
        form.complete(result.as_ref().err().map(ClientError::user_message));
        result
    }

    pub async fn close_general_complaint(
        &self,
        side: ComplaintSide,
        complaint: &GeneralComplaintSummary,
        reason: &Reason,
        list: &ResourceListController<GeneralComplaintSummary>,
    ) -> ClientResult<MessageResponse> {
        if !complaint.can_close() {
            return Err(ValidationError::AlreadyClosed.into());
        }
        self.dispatcher
            .run_then_refresh(
                ActionKey::close(&complaint.problem_id),
                || {
                    self.api
                        .close_general_complaint(side, &complaint.problem_id, reason)
                },
                list,
            )
            .await
    }

    pub async fn submit_close(
        &self,
        side: ComplaintSide,
        form: &mut ReasonForm<GeneralComplaintSummary>,
        list: &ResourceListController<GeneralComplaintSummary>,
    ) -> ClientResult<MessageResponse> {
        let (complaint, reason) = form.submit()?;
        let result = self
            .close_general_complaint(side, &complaint, &reason, list)
            .await;
        form.complete(result.as_ref().err().map(ClientError::user_message));
        result
    }

    /// `service_type` is the list-side name; it is mapped to the detail segment.
    pub async fn complaint_detail(
        &self,
        service_type: &str,
        order_id: &OrderId,
    ) -> ClientResult<ComplaintDetail> {
        let segment = shared::domain::detail_segment_owned(service_type);
        match self.api.complaint_detail(&segment, order_id).await {
            Err(err) if err.is_service_type_mismatch() => match err {
                ClientError::Rejected { status, code, .. } => Err(ClientError::Rejected {
                    status,
                    code,
                    message: NO_URL_FOR_ORDER.to_string(),
                }),
                other => Err(other),
            },
            other => other,
        }
    }

    pub async fn update_horoscope(
        &self,
        horoscope_id: &HoroscopeId,
        update: &HoroscopeUpdate,
        list: &ResourceListController<Horoscope>,
    ) -> ClientResult<serde_json::Value> {
        if update.is_empty() {
            return Err(ValidationError::EmptyUpdate.into());
        }
        self.dispatcher
            .run_then_refresh(
                ActionKey::horoscope(horoscope_id),
                || self.api.update_horoscope(horoscope_id, update),
                list,
            )
            .await
    }

    pub async fn delete_horoscope(
        &self,
        horoscope_id: &HoroscopeId,
        list: &ResourceListController<Horoscope>,
    ) -> ClientResult<MessageResponse> {
        self.dispatcher
            .run_then_refresh(
                ActionKey::horoscope(horoscope_id),
                || self.api.delete_horoscope(horoscope_id),
                list,
            )
            .await
    }

    /// Returns the number of records sent alongside the backend acknowledgement.
    pub async fn upload_horoscopes(&self, text: &str) -> ClientResult<(usize, MessageResponse)> {
        let drafts = bulk::parse_horoscope_lines(text)?;
        let response = self
            .dispatcher
            .run(ActionKey::custom("bulk-horoscopes"), || {
                self.api.bulk_create_horoscopes(&drafts)
            })
            .await?;
        info!(count = drafts.len(), "horoscopes uploaded");
        Ok((drafts.len(), response))
    }

    pub async fn upload_feedbacks(&self, text: &str) -> ClientResult<(usize, MessageResponse)> {
        let feedbacks = bulk::parse_feedback_json(text)?;
        let response = self
            .dispatcher
            .run(ActionKey::custom("bulk-feedbacks"), || {
                self.api.bulk_create_feedbacks(&feedbacks)
            })
            .await?;
        info!(count = feedbacks.len(), "feedbacks uploaded");
        Ok((feedbacks.len(), response))
    }

    pub async fn generate_reports(&self, range: ReportRange) -> ClientResult<ReportResponse> {
        let request = range.to_request();
        self.dispatcher
            .run(ActionKey::custom("generate-reports"), || {
                self.api.generate_reports(&request)
            })
            .await
    }

    pub async fn download_report(&self, file_name: &str, dir: &Path) -> ClientResult<PathBuf> {
        let file_name = reports::validate_report_file_name(file_name)?;
        let bytes = self.api.download_report(file_name).await?;
        reports::save_report(dir, file_name, &bytes).await
    }

    pub async fn trigger_scheduler(&self) -> ClientResult<MessageResponse> {
        self.dispatcher
            .run(ActionKey::custom("trigger-scheduler"), || {
                self.api.trigger_scheduler()
            })
            .await
    }
}

#[cfg(test)]
#[path = "tests/console_tests.rs"]
mod tests;
