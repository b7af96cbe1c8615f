use super::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::services::identity::test_helpers::MockIdentity;
use crate::services::identity::{IdentityError, SignedIn};
use gate::{Decision, GuardOutcome, NavigationGuard, Transition, first_status};

fn request(api: MockIdentity, token: Option<&str>) -> (Arc<MockIdentity>, RequestIdentity) {
    let api = Arc::new(api);
    let identity = RequestIdentity::new(api.clone(), token.map(str::to_owned));
    (api, identity)
}

#[tokio::test]
async fn missing_token_is_signed_out_without_lookup() {
    let (api, identity) = request(MockIdentity::new(), None);
    assert_eq!(first_status(&identity).await, SessionStatus::Unauthenticated);
    assert_eq!(api.lookups(), 0);
}

#[tokio::test]
async fn blank_token_counts_as_missing() {
    let (api, identity) = request(MockIdentity::new(), Some("  "));
    assert_eq!(first_status(&identity).await, SessionStatus::Unauthenticated);
    assert_eq!(api.lookups(), 0);
}

#[tokio::test]
async fn live_token_resolves_identity() {
    let user = Identity::new("u1").with_email("u1@example.com");
    let (api, identity) = request(MockIdentity::new().with_session("tok", user.clone()), Some("tok"));

    assert_eq!(first_status(&identity).await, SessionStatus::Authenticated(user.clone()));
    assert_eq!(identity.current_user(), Some(user));
    assert_eq!(api.lookups(), 1);
}

#[tokio::test]
async fn unknown_token_is_signed_out() {
    let (_, identity) = request(MockIdentity::new(), Some("stale"));
    assert_eq!(first_status(&identity).await, SessionStatus::Unauthenticated);
    assert!(identity.current_user().is_none());
}

#[tokio::test]
async fn lookup_failure_collapses_to_redirect() {
    let (_, identity) = request(MockIdentity::failing(), Some("tok"));
    let outcome = NavigationGuard::default()
        .evaluate(&Transition::new("/", "/home"), &identity)
        .await;
    assert_eq!(outcome, GuardOutcome::Decided(Decision::Redirect("/auth".to_owned())));
}

// =============================================================================
// Lookup lifetime
// =============================================================================

/// Lookup that never answers; records when its future is dropped.
#[derive(Default)]
struct StalledLookup {
    started: AtomicBool,
    dropped: Arc<AtomicBool>,
}

struct SetOnDrop(Arc<AtomicBool>);

impl Drop for SetOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl IdentityApi for StalledLookup {
    async fn lookup(&self, _id_token: &str) -> Result<Option<Identity>, IdentityError> {
        let _flag = SetOnDrop(Arc::clone(&self.dropped));
        self.started.store(true, Ordering::SeqCst);
        std::future::pending().await
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<SignedIn, IdentityError> {
        Err(IdentityError::Request("unused".into()))
    }

    async fn sign_up(&self, _email: &str, _password: &str) -> Result<SignedIn, IdentityError> {
        Err(IdentityError::Request("unused".into()))
    }
}

async fn yield_until(flag: &AtomicBool) -> bool {
    for _ in 0..100 {
        if flag.load(Ordering::SeqCst) {
            return true;
        }
        tokio::task::yield_now().await;
    }
    flag.load(Ordering::SeqCst)
}

#[tokio::test]
async fn dropping_subscription_aborts_pending_lookup() {
    let api = Arc::new(StalledLookup::default());
    let identity = RequestIdentity::new(api.clone(), Some("tok".to_owned()));
    let calls = Arc::new(AtomicUsize::new(0));

    let calls_in = Arc::clone(&calls);
    let subscription = identity.on_auth_state_changed(Box::new(move |_| {
        calls_in.fetch_add(1, Ordering::SeqCst);
    }));
    assert!(yield_until(&api.started).await, "lookup task never started");

    drop(subscription);

    assert!(yield_until(&api.dropped).await, "lookup task kept running");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(identity.current_user().is_none());
}
