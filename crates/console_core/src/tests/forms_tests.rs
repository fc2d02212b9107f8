use super::*;

#[test]
fn reason_is_trimmed_and_required() {
    assert_eq!(Reason::parse("  spam  ").expect("reason").as_str(), "spam");
    assert_eq!(Reason::parse(" \n "), Err(ValidationError::MissingReason));
}

#[test]
fn refund_inputs_default_to_zero_and_keep_sign() {
    assert_eq!(parse_refund_input(""), Ok(0));
    assert_eq!(parse_refund_input(" 25 "), Ok(25));
    assert_eq!(parse_refund_input("-1"), Ok(-1));
    assert_eq!(
        parse_refund_input("12abc"),
        Err(ValidationError::InvalidRefund("12abc".to_string()))
    );
}

#[test]
fn accept_rejects_negative_refunds_before_reason() {
    let draft = AcceptDraft {
        reason: String::new(),
        user_refund_money: -1,
        astro_refund_money: 0,
    };
    assert_eq!(draft.validate().unwrap_err(), ValidationError::NegativeRefund);

    let draft = AcceptDraft::from_inputs("  ", "10", "5").expect("inputs");
    assert_eq!(draft.validate().unwrap_err(), ValidationError::MissingReason);
}

#[test]
fn accept_builds_decision_request() {
    let decision = AcceptDraft::from_inputs(" call dropped ", "100", "")
        .expect("inputs")
        .validate()
        .expect("valid");
    assert_eq!(decision.action, ComplaintAction::Accept);
    assert_eq!(decision.reason, "call dropped");
    assert_eq!(decision.user_refund_money, 100);
    assert_eq!(decision.astro_refund_money, 0);
}

#[test]
fn reject_carries_no_refund() {
    let decision = RejectDraft::new("not eligible").validate().expect("valid");
    assert_eq!(decision.action, ComplaintAction::Reject);
    assert_eq!(decision.user_refund_money, 0);
    assert_eq!(decision.astro_refund_money, 0);
    assert_eq!(
        RejectDraft::new("").validate().unwrap_err(),
        ValidationError::MissingReason
    );
}

#[test]
fn reason_form_walks_through_submission() {
    let mut form = ReasonForm::default();
    assert_eq!(form.submit().unwrap_err(), ValidationError::FormNotOpen);

    form.open("p-1");
    assert!(!form.can_submit());
    assert_eq!(form.submit().unwrap_err(), ValidationError::MissingReason);
    assert_eq!(form.error(), Some("reason is required"));

    form.edit("resolved by phone");
    assert_eq!(form.error(), None);
    assert!(form.can_submit());

    let (target, reason) = form.submit().expect("submit");
    assert_eq!(target, "p-1");
    assert_eq!(reason.as_str(), "resolved by phone");
    assert!(form.is_submitting());
    assert!(!form.cancel());

    form.complete(None);
    assert_eq!(form, ReasonForm::Hidden);
}

#[test]
fn failed_submission_reopens_with_draft() {
    let mut form = ReasonForm::default();
    form.open(7_u32);
    form.edit("duplicate");
    form.submit().expect("submit");

    form.complete(Some("Complaint already closed".to_string()));

    assert_eq!(
        form,
        ReasonForm::Editing {
            target: 7,
            draft: "duplicate".to_string(),
            error: Some("Complaint already closed".to_string()),
        }
    );
    assert!(form.cancel());
    assert_eq!(form.target(), None);
}
