//! Root application component with routing and context providers.

use gate::{AuthHub, IdentityApp, Navigator};
use leptos::prelude::*;
use leptos_meta::{MetaTags, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{ProtectedRoute, Redirect, Route, Router, Routes},
    hooks::use_location,
};

use crate::pages::{auth::AuthPage, home::HomePage};
use crate::state::auth::AuthState;
use crate::util::auth::install_auth_listener;
use crate::util::guard::supersede_pending;

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Provides the session contexts and sets up client-side routing. `/home`
/// stays blank while the session is still being determined and redirects to
/// `/auth` once it is known to be signed out.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let hub = AuthHub::new();
    let auth = RwSignal::new(AuthState::default());
    let identity_app = RwSignal::new(None::<IdentityApp>);

    let subscription = install_auth_listener(&hub, auth);
    on_cleanup(move || subscription.unsubscribe());

    provide_context(auth);
    provide_context(identity_app);
    provide_context(hub.clone());
    provide_context(Navigator::default());

    #[cfg(feature = "hydrate")]
    crate::util::auth::bootstrap_session(hub, identity_app);
    #[cfg(not(feature = "hydrate"))]
    let _ = hub;

    view! {
        <Title text="Gate"/>

        <Router>
            <LocationWatcher/>
            <Routes fallback=|| "Page not found.".into_view()>
                <Route path=StaticSegment("") view=|| view! { <Redirect path="/home"/> }/>
                <ProtectedRoute
                    path=StaticSegment("home")
                    condition=move || auth.get().access()
                    redirect_path=|| "/auth"
                    view=HomePage
                />
                <Route path=StaticSegment("auth") view=AuthPage/>
            </Routes>
        </Router>
    }
}

/// Advances the guard generation on every router location change, so link
/// and history navigations supersede an in-flight guarded navigation.
#[component]
fn LocationWatcher() -> impl IntoView {
    let navigator = expect_context::<Navigator>();
    let location = use_location();
    Effect::new(move || {
        location.pathname.track();
        supersede_pending(&navigator);
    });
}
