//! Home page: the protected landing route.

use gate::{AuthHub, IdentityApp, SessionStatus};
use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::state::auth::AuthState;

/// Signed-in landing page with the current identity and a sign-out action.
#[component]
pub fn HomePage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let identity_app = expect_context::<RwSignal<Option<IdentityApp>>>();
    let hub = expect_context::<AuthHub>();
    let navigate = use_navigate();
    let busy = RwSignal::new(false);

    let label = move || {
        auth.get()
            .identity()
            .map(|identity| identity.label().to_owned())
            .unwrap_or_default()
    };
    let project = move || {
        identity_app
            .get()
            .map(|app| app.config().project_id.clone())
            .unwrap_or_default()
    };

    let on_sign_out = move |_: leptos::ev::MouseEvent| {
        if busy.get() {
            return;
        }
        busy.set(true);
        let hub = hub.clone();
        let navigate = navigate.clone();
        leptos::task::spawn_local(async move {
            crate::net::api::logout().await;
            hub.publish(SessionStatus::Unauthenticated);
            navigate("/auth", NavigateOptions::default());
        });
    };

    view! {
        <div class="home-page">
            <h1>"Home"</h1>
            <p class="home-page__user">"Signed in as " <strong>{label}</strong></p>
            <Show when=move || !project().is_empty()>
                <p class="home-page__project">"Project: " {project}</p>
            </Show>
            <button class="home-page__sign-out" on:click=on_sign_out disabled=move || busy.get()>
                "Sign out"
            </button>
        </div>
    }
}
