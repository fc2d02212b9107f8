//! Plain-text tables for list pages and records.

use console_core::{dashboard::DashboardOverview, PageResult};
use shared::{
    domain::ServiceType,
    protocol::{
        AstrologerSummary, ComplaintDetail, GeneralComplaintSummary, Horoscope, MessageResponse,
        ReportResponse, ServiceComplaintSummary, UserSummary,
    },
};

const EMPTY_CELL: &str = "-";

fn cell(value: Option<&str>) -> &str {
    value.filter(|text| !text.is_empty()).unwrap_or(EMPTY_CELL)
}

fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.len()).collect();
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }
    let line = |values: Vec<String>| {
        values
            .iter()
            .zip(&widths)
            .map(|(value, &width)| format!("{value:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    println!("{}", line(headers.iter().map(|h| h.to_string()).collect()));
    for row in rows {
        println!("{}", line(row));
    }
}

fn footer<T>(page: &PageResult<T>) {
    match page.showing_range() {
        Some((first, last)) => println!(
            "Showing {first} to {last} of {} (page {} of {})",
            page.total,
            page.page,
            page.total_pages.max(1)
        ),
        None => println!(
            "No records on page {} ({} total)",
            page.page, page.total
        ),
    }
}

pub fn users(page: &PageResult<UserSummary>) {
    let rows = page
        .items
        .iter()
        .map(|user| {
            vec![
                user.user_id.to_string(),
                cell(user.name.as_deref()).to_string(),
                cell(user.email.as_deref()).to_string(),
                cell(user.phone.as_deref()).to_string(),
                user.status.to_string(),
            ]
        })
        .collect();
    print_table(&["USER ID", "NAME", "EMAIL", "PHONE", "STATUS"], rows);
    footer(page);
}

pub fn astrologers(page: &PageResult<AstrologerSummary>) {
    let rows = page
        .items
        .iter()
        .map(|astro| {
            vec![
                astro.astro_id.to_string(),
                cell(Some(astro.name.as_str())).to_string(),
                astro.status.to_string(),
                astro.visible.to_string(),
            ]
        })
        .collect();
    print_table(&["ASTRO ID", "NAME", "STATUS", "VISIBILITY"], rows);
    footer(page);
}

pub fn service_complaints(page: &PageResult<ServiceComplaintSummary>) {
    let rows = page
        .items
        .iter()
        .map(|complaint| {
            vec![
                complaint.order_id.to_string(),
                cell(Some(complaint.service_type.as_str())).to_string(),
                cell(complaint.user_name.as_deref()).to_string(),
                cell(complaint.astro_name.as_deref()).to_string(),
                complaint.status.to_string(),
                cell(complaint.comment.as_deref()).to_string(),
            ]
        })
        .collect();
    print_table(
        &["ORDER ID", "SERVICE", "USER", "ASTROLOGER", "STATUS", "COMMENT"],
        rows,
    );
    footer(page);
}

pub fn general_complaints(page: &PageResult<GeneralComplaintSummary>) {
    let rows = page
        .items
        .iter()
        .map(|complaint| {
            let problems = complaint
                .problem_types
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            vec![
                complaint.problem_id.to_string(),
                cell(Some(complaint.filer().as_str())).to_string(),
                cell(Some(problems.as_str())).to_string(),
                complaint.status.to_string(),
                cell(complaint.comment.as_deref()).to_string(),
            ]
        })
        .collect();
    print_table(&["PROBLEM ID", "FILED BY", "PROBLEMS", "STATUS", "COMMENT"], rows);
    footer(page);
}

pub fn horoscopes(page: &PageResult<Horoscope>) {
    let rows = page
        .items
        .iter()
        .map(|horoscope| {
            vec![
                horoscope.horoscope_id.to_string(),
                horoscope.draft.sign_name.clone(),
                horoscope.draft.date.to_string(),
                horoscope.draft.is_active.to_string(),
                horoscope.draft.description.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "SIGN", "DATE", "ACTIVE", "DESCRIPTION"], rows);
    footer(page);
}

pub fn complaint_detail(detail: &ComplaintDetail) {
    let field = |label: &str, value: Option<String>| {
        println!("{label:<18}{}", value.as_deref().unwrap_or(EMPTY_CELL));
    };
    field("Session", detail.session_id().map(str::to_string));
    field("User", detail.user_id.as_ref().map(ToString::to_string));
    field("Astrologer", detail.astro_id.as_ref().map(ToString::to_string));
    field("Status", detail.current_status().map(str::to_string));
    field("Type", detail.kind.clone());
    field("Category", detail.category_type.clone());
    field("Rate per minute", detail.rate_per_minute.map(|rate| rate.to_string()));
    field("Payment received", detail.payment_received.map(|paid| paid.to_string()));
    field("Created", detail.created_on.map(|at| at.to_rfc3339()));
    field("Updated", detail.updated_on.map(|at| at.to_rfc3339()));
    field("Recording", detail.url.clone());

    if !detail.status_history().is_empty() {
        println!("\nStatus history:");
        for entry in detail.status_history() {
            let at = entry
                .created_on
                .map(|at| at.to_rfc3339())
                .unwrap_or_else(|| EMPTY_CELL.to_string());
            println!("  {at}  {}", entry.kind);
        }
    }

    if !detail.conversation.is_empty() {
        println!("\nConversation:");
        for message in &detail.conversation {
            let at = message
                .timestamp
                .map(|at| at.to_rfc3339())
                .unwrap_or_default();
            println!(
                "  [{at}] {}: {}",
                message.sender_label(),
                message.display_text().unwrap_or_default()
            );
        }
    }
}

pub fn dashboard(overview: &DashboardOverview) {
    if let Some(metrics) = &overview.metrics {
        println!("Service metrics for {}", cell(Some(metrics.date.as_str())));
    }
    let rows = ServiceType::ALL
        .into_iter()
        .map(|service| {
            let metrics = overview.service(service);
            vec![
                service.to_string(),
                metrics.request.to_string(),
                metrics.complete.to_string(),
                metrics.failed.to_string(),
                metrics.issue.to_string(),
                metrics.reject.to_string(),
                metrics.total.to_string(),
            ]
        })
        .collect();
    print_table(
        &["SERVICE", "REQUEST", "COMPLETE", "FAILED", "ISSUE", "REJECT", "TOTAL"],
        rows,
    );

    let totals = &overview.totals;
    println!();
    print_table(
        &["RESOURCE", "TOTAL"],
        vec![
            vec!["users".into(), totals.users.to_string()],
            vec!["astrologers".into(), totals.astrologers.to_string()],
            vec!["service complaints".into(), totals.service_complaints.to_string()],
            vec![
                "user general complaints".into(),
                totals.user_general_complaints.to_string(),
            ],
            vec![
                "astro general complaints".into(),
                totals.astro_general_complaints.to_string(),
            ],
        ],
    );
}

pub fn report(response: &ReportResponse) {
    if let Some(message) = &response.message {
        println!("{message}");
    }
    print_table(
        &["COLLECTION", "FILE"],
        response
            .files
            .iter()
            .map(|file| vec![file.collection.clone(), file.file_name.clone()])
            .collect(),
    );
}

pub fn ack(response: &MessageResponse, fallback: &str) {
    let message = response
        .message
        .as_deref()
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .unwrap_or(fallback);
    println!("{message}");
}
