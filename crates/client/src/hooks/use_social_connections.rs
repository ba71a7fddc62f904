use dioxus::prelude::*;
use tokio::sync::watch;

use crate::auth_session::{AuthState, AuthStore};
use crate::connections::{ConnectionsState, SocialConnections};

/// Copy every value published on `rx` into `signal` until the sender drops.
fn mirror<T: Clone + 'static>(mut rx: watch::Receiver<T>, mut signal: Signal<T>) -> Task {
    spawn(async move {
        while rx.changed().await.is_ok() {
            let next = rx.borrow_and_update().clone();
            signal.set(next);
        }
    })
}

/// Reactive view of a [`SocialConnections`] aggregator.
///
/// ### Example
///
/// ```rust,ignore
/// let social = use_social_connections(connections.clone());
/// let connected = social.read().connected_count();
///
/// rsx! {
///     button {
///         disabled: social.read().is_connecting(),
///         onclick: move |_| {
///             let connections = connections.clone();
///             spawn(async move { let _ = connections.connect(Platform::Twitter).await; });
///         },
///         "Connect Twitter ({connected} connected)"
///     }
/// }
/// ```
pub fn use_social_connections(connections: SocialConnections) -> Signal<ConnectionsState> {
    let state = use_signal(|| connections.snapshot());
    use_hook(move || mirror(connections.subscribe(), state));
    state
}

/// Current user and loading flag of the [`AuthStore`].
pub fn use_auth_state(auth: &AuthStore) -> Signal<AuthState> {
    let state = use_signal(|| auth.state());
    let rx = auth.subscribe();
    use_hook(move || mirror(rx, state));
    state
}
