//! Auth page: email + password sign-in and account creation.
//!
//! Public route. On success the new session is published on the auth hub and
//! the page performs a guarded navigation to `/home`.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use gate::{AUTH_PATH, AuthHub, HOME_PATH, Navigator, SessionStatus};
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::net::api::AuthMode;
use crate::util::guard::navigate_guarded;

const MIN_PASSWORD_LEN: usize = 6;

/// Trim the email and require both fields; returns the values to submit.
fn validate_auth_input(email: &str, password: &str) -> Result<(String, String), &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err("Enter both email and password.");
    }
    if !email.contains('@') {
        return Err("Enter a valid email address.");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 6 characters.");
    }
    Ok((email.to_owned(), password.to_owned()))
}

/// User-facing text for an error code returned by the server.
fn describe_auth_error(code: &str) -> String {
    match code {
        "INVALID_LOGIN_CREDENTIALS" | "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" => {
            "Incorrect email or password.".to_owned()
        }
        "EMAIL_EXISTS" => "An account with this email already exists.".to_owned(),
        "WEAK_PASSWORD" => "Password must be at least 6 characters.".to_owned(),
        "INVALID_EMAIL" => "Enter a valid email address.".to_owned(),
        "USER_DISABLED" => "This account has been disabled.".to_owned(),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts. Try again later.".to_owned(),
        other => format!("Sign-in failed: {other}"),
    }
}

fn submit_label(mode: AuthMode) -> &'static str {
    match mode {
        AuthMode::SignIn => "Sign In",
        AuthMode::SignUp => "Create Account",
    }
}

fn toggle_label(mode: AuthMode) -> &'static str {
    match mode {
        AuthMode::SignIn => "Need an account? Sign up",
        AuthMode::SignUp => "Have an account? Sign in",
    }
}

#[component]
pub fn AuthPage() -> impl IntoView {
    let hub = expect_context::<AuthHub>();
    let navigator = expect_context::<Navigator>();
    let navigate = use_navigate();

    let mode = RwSignal::new(AuthMode::default());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let (email_value, password_value) = match validate_auth_input(&email.get(), &password.get()) {
            Ok(values) => values,
            Err(message) => {
                info.set(message.to_owned());
                return;
            }
        };
        busy.set(true);
        info.set("Working...".to_owned());

        let current_mode = mode.get();
        let hub = hub.clone();
        let navigator = navigator.clone();
        let navigate = navigate.clone();
        leptos::task::spawn_local(async move {
            match crate::net::api::submit_credentials(current_mode, &email_value, &password_value).await {
                Ok(identity) => {
                    info.set(String::new());
                    hub.publish(SessionStatus::Authenticated(identity));
                    navigate_guarded(navigator, hub, AUTH_PATH.to_owned(), HOME_PATH.to_owned(), navigate);
                }
                Err(code) => info.set(describe_auth_error(&code)),
            }
            busy.set(false);
        });
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Welcome"</h1>
                <p class="login-card__subtitle">{move || submit_label(mode.get())}</p>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="email"
                        placeholder="you@example.com"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        {move || submit_label(mode.get())}
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <div class="login-divider"></div>
                <button
                    class="login-link"
                    type="button"
                    on:click=move |_| {
                        mode.update(|m| *m = m.toggled());
                        info.set(String::new());
                    }
                >
                    {move || toggle_label(mode.get())}
                </button>
            </div>
        </div>
    }
}
