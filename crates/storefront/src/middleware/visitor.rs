//! Visitor resolution and the identity probe.
//!
//! Runs on page and API requests after the session layer. It attaches the
//! visitor's context, reads the live markers, and the first time this process
//! sees a stored token for a context it asks the platform whether the token
//! is still good. The question is asked again whenever the role marker has
//! lapsed while the token is still live:
//!
//! - accepted with an `admin` flag: the role marker is rewritten
//! - accepted without one: nothing changes
//! - rejected, undecodable, or unreachable: token and role are cleared
//!
//! Failures are silent; the visitor simply becomes anonymous.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use secrecy::SecretString;
use tower_sessions::Session;

use skillcoders_core::{AccessClass, Decision, RoleMarker, Zone, resolve};

use crate::error::AppError;
use crate::middleware::auth::{clear_credentials, ensure_visitor_id, read_markers, write_role};
use crate::models::{Markers, VisitorId};
use crate::platform::{PlatformClient, Profile};
use crate::services::{ProbeOutcome, VisitorContext};
use crate::state::AppState;

/// The visitor behind the current request.
#[derive(Clone)]
pub struct Visitor {
    pub id: VisitorId,
    pub markers: Markers,
    pub context: Arc<VisitorContext>,
}

impl Visitor {
    #[must_use]
    pub fn access_class(&self) -> AccessClass {
        self.markers.access_class()
    }

    /// Resolve a navigation to `zone` for this visitor.
    #[must_use]
    pub fn decide(&self, zone: Zone) -> Decision {
        resolve(self.markers.has_session(), self.markers.role.as_ref(), zone)
    }

    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.markers.token.as_ref()
    }

    #[must_use]
    pub fn username(&self) -> &str {
        self.markers.username.as_deref().unwrap_or_default()
    }

    /// Cart count for the badge, loading it from the profile on first use.
    pub async fn cart_count(&self, platform: &PlatformClient) -> i64 {
        if let Some(token) = self.token() {
            self.context.ensure_profile(platform, token).await;
        }
        self.context.cart().read()
    }

    /// Profile summary for the navigation bar, if one could be loaded.
    pub async fn profile(&self, platform: &PlatformClient) -> Option<Profile> {
        let token = self.token()?;
        self.context.ensure_profile(platform, token).await;
        self.context.profile().await
    }
}

impl std::fmt::Debug for Visitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Visitor")
            .field("id", &self.id)
            .field("markers", &self.markers)
            .finish_non_exhaustive()
    }
}

impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(AppError::Internal("visitor middleware not installed"))
    }
}

/// Middleware that resolves the [`Visitor`] and runs the identity probe.
///
/// Must be layered inside the session layer. Visitors without a live token
/// get a throwaway context and leave the session untouched, so no cookie is
/// issued until something is stored.
pub async fn visitor_middleware(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let mut markers = read_markers(&session).await;

    let (id, context) = if markers.has_session() {
        let id = match ensure_visitor_id(&session).await {
            Ok(id) => id,
            Err(e) => return AppError::Session(e).into_response(),
        };
        (id, state.visitors().get_or_create(id).await)
    } else {
        (VisitorId::generate(), Arc::new(VisitorContext::new()))
    };

    check_identity(
        &session,
        state.platform(),
        state.config().markers.role_ttl,
        &context,
        &mut markers,
    )
    .await;

    request.extensions_mut().insert(Visitor {
        id,
        markers,
        context,
    });

    next.run(request).await
}

/// Ask the platform about the stored token when this context has not done so
/// yet, or again when the role marker lapsed while the token is still live.
async fn check_identity(
    session: &Session,
    platform: &PlatformClient,
    role_ttl: chrono::Duration,
    context: &VisitorContext,
    markers: &mut Markers,
) {
    let Some(token) = markers.token.clone() else {
        return;
    };

    let outcome = if context.probe_outcome().is_none() {
        context
            .probe_once(|| probe_identity(platform, &token))
            .await
    } else if markers.role.is_none() {
        probe_identity(platform, &token).await
    } else {
        return;
    };
    apply_probe(session, role_ttl, markers, outcome).await;
}

async fn probe_identity(platform: &PlatformClient, token: &SecretString) -> ProbeOutcome {
    match platform.identity(token).await {
        Ok(identity) => ProbeOutcome::Confirmed {
            admin: identity.admin,
        },
        Err(e) => {
            tracing::info!(error = %e, "Stored token failed the identity probe");
            ProbeOutcome::Rejected
        }
    }
}

async fn apply_probe(
    session: &Session,
    role_ttl: chrono::Duration,
    markers: &mut Markers,
    outcome: ProbeOutcome,
) {
    match outcome {
        ProbeOutcome::Confirmed { admin: Some(admin) } => {
            let role = RoleMarker::from_admin_flag(admin);
            if let Err(e) = write_role(session, &role, role_ttl).await {
                tracing::warn!(error = %e, "Failed to store role marker");
            }
            markers.role = Some(role);
        }
        ProbeOutcome::Confirmed { admin: None } | ProbeOutcome::Fresh => {}
        ProbeOutcome::Rejected => {
            if let Err(e) = clear_credentials(session).await {
                tracing::warn!(error = %e, "Failed to clear markers");
            }
            markers.token = None;
            markers.role = None;
        }
    }
}
