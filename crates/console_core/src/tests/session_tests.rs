use super::*;
use std::sync::Mutex;

fn recording_session() -> (Arc<Session>, Arc<Mutex<Vec<Redirect>>>) {
    let redirects = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&redirects);
    let session = Session::with_redirect_hook(Arc::new(MemoryTokenStore::new()), move |redirect| {
        sink.lock().expect("redirect log").push(redirect);
    });
    (session, redirects)
}

#[test]
fn login_then_logout_redirects_once() {
    let (session, redirects) = recording_session();
    assert_eq!(session.state(), SessionState::Anonymous);

    session.establish("  tok-1 ").expect("establish");
    assert_eq!(session.token().as_deref(), Some("tok-1"));
    assert!(session.is_authenticated());

    session.logout();
    session.logout();
    assert_eq!(session.state(), SessionState::Anonymous);
    assert_eq!(
        redirects.lock().expect("redirect log").as_slice(),
        &[Redirect {
            to: Route::Login,
            reason: SignOutReason::Logout,
        }]
    );
}

#[test]
fn expire_clears_token_and_reports_unauthorized() {
    let (session, redirects) = recording_session();
    session.establish("tok").expect("establish");
    let mut state_rx = session.subscribe();

    session.expire();

    assert_eq!(session.token(), None);
    assert!(state_rx.has_changed().expect("sender alive"));
    assert_eq!(*state_rx.borrow_and_update(), SessionState::Anonymous);
    assert_eq!(
        redirects.lock().expect("redirect log")[0].reason,
        SignOutReason::Unauthorized
    );
}

#[test]
fn empty_token_is_rejected() {
    let session = Session::new(Arc::new(MemoryTokenStore::new()));
    let err = session.establish("   ").expect_err("must fail");
    assert!(matches!(
        err,
        ClientError::Validation(ValidationError::EmptyToken)
    ));
    assert!(!session.is_authenticated());
}

#[test]
fn protected_routes_never_render_while_anonymous() {
    let session = Session::new(Arc::new(MemoryTokenStore::new()));
    for route in Route::ALL {
        let decision = session.guard(route.path());
        if route.is_protected() {
            assert_eq!(decision, RouteDecision::Redirect(Route::Login), "{route:?}");
        } else {
            assert_eq!(decision, RouteDecision::Render(route));
        }
    }
    assert_eq!(
        session.guard("/nowhere"),
        RouteDecision::Redirect(Route::Login)
    );
}

#[test]
fn authenticated_guard_resolves_root_and_unknown_paths() {
    let session = Session::new(Arc::new(MemoryTokenStore::new()));
    session.establish("tok").expect("establish");

    assert_eq!(session.guard("/"), RouteDecision::Render(Route::Dashboard));
    assert_eq!(session.guard("/astros/"), RouteDecision::Render(Route::Astrologers));
    assert_eq!(
        session.guard("/nowhere"),
        RouteDecision::Redirect(Route::Dashboard)
    );
}

#[test]
fn file_store_persists_between_sessions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("token");

    let session = Session::new(Arc::new(FileTokenStore::new(&path)));
    session.establish("persisted").expect("establish");
    assert_eq!(fs::read_to_string(&path).expect("token file"), "persisted");

    let reopened = Session::new(Arc::new(FileTokenStore::new(&path)));
    assert!(reopened.is_authenticated());
    assert_eq!(reopened.token().as_deref(), Some("persisted"));

    reopened.logout();
    assert!(!path.exists());
    FileTokenStore::new(&path).clear().expect("clearing twice is fine");
}

#[test]
fn out_of_band_token_removal_is_observed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("token");
    let session = Session::new(Arc::new(FileTokenStore::new(&path)));
    session.establish("tok").expect("establish");

    fs::remove_file(&path).expect("remove token");

    assert_eq!(session.state(), SessionState::Anonymous);
    assert_eq!(session.guard("/users"), RouteDecision::Redirect(Route::Login));
}

#[test]
fn expire_after_out_of_band_login_still_redirects() {
    let store = Arc::new(MemoryTokenStore::new());
    let redirects = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&redirects);
    let session = Session::with_redirect_hook(store.clone(), move |redirect| {
        sink.lock().expect("redirect log").push(redirect);
    });
    let mut state_rx = session.subscribe();

    store.save("tok").expect("save");
    session.expire();

    assert_eq!(session.token(), None);
    assert_eq!(*state_rx.borrow_and_update(), SessionState::Anonymous);
    assert_eq!(
        redirects.lock().expect("redirect log").as_slice(),
        &[Redirect {
            to: Route::Login,
            reason: SignOutReason::Unauthorized,
        }]
    );
}
