//! Security headers middleware.
//!
//! Restrictive by default. The only third party allowed in is the Razorpay
//! checkout: its script, its iframe, and the calls it makes. Course images are
//! served by the platform API, so its origin is allowed for `img-src`.

use axum::{
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue,
        header::{CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS},
    },
    middleware::Next,
    response::Response,
};
use url::Url;

use crate::middleware::csp::CspNonce;
use crate::state::AppState;

/// Checkout script host.
pub const CHECKOUT_SCRIPT_ORIGIN: &str = "https://checkout.razorpay.com";

/// Hosts the checkout widget frames and calls.
const CHECKOUT_API_ORIGINS: &str = "https://api.razorpay.com https://lumberjack.razorpay.com";

/// Build the `Content-Security-Policy` value.
///
/// ```text
/// default-src 'none';
/// script-src 'self' 'nonce-…' https://checkout.razorpay.com;
/// style-src 'self';
/// font-src 'self';
/// img-src 'self' data: <platform origin> https://ui-avatars.com;
/// connect-src 'self' https://api.razorpay.com https://lumberjack.razorpay.com;
/// frame-src https://api.razorpay.com https://checkout.razorpay.com;
/// object-src 'none';
/// base-uri 'self';
/// form-action 'self';
/// frame-ancestors 'none';
/// [upgrade-insecure-requests]
/// ```
#[must_use]
pub fn content_security_policy(nonce: Option<&CspNonce>, platform: &Url, secure: bool) -> String {
    let nonce = nonce.map(|n| format!(" {}", n.source())).unwrap_or_default();
    let platform_origin = platform.origin().ascii_serialization();

    let mut policy = format!(
        "default-src 'none'; \
         script-src 'self'{nonce} {CHECKOUT_SCRIPT_ORIGIN}; \
         style-src 'self'; \
         font-src 'self'; \
         img-src 'self' data: {platform_origin} https://ui-avatars.com; \
         connect-src 'self' {CHECKOUT_API_ORIGINS}; \
         frame-src {CHECKOUT_API_ORIGINS} {CHECKOUT_SCRIPT_ORIGIN}; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self'; \
         frame-ancestors 'none'"
    );
    if secure {
        policy.push_str("; upgrade-insecure-requests");
    }
    policy
}

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY`
/// - `X-Content-Type-Options: nosniff`
/// - `Referrer-Policy: strict-origin-when-cross-origin` (the checkout needs the origin)
/// - `Content-Security-Policy` (see [`content_security_policy`])
/// - `Permissions-Policy` denying sensitive features, `payment` excepted for checkout
/// - `Cache-Control: no-store, max-age=0`
/// - `Cross-Origin-Opener-Policy: same-origin-allow-popups` (UPI and netbanking popups)
/// - `Cross-Origin-Resource-Policy: same-origin`
/// - `X-DNS-Prefetch-Control: off`
///
/// No `Cross-Origin-Embedder-Policy`: `require-corp` blocks the checkout frame.
pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let policy = content_security_policy(
        response.extensions().get::<CspNonce>(),
        &state.config().platform.base_url,
        state.config().is_secure(),
    );

    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    match HeaderValue::from_str(&policy) {
        Ok(value) => {
            headers.insert(CONTENT_SECURITY_POLICY, value);
        }
        Err(e) => {
            tracing::error!(error = %e, "Invalid CSP header value; falling back to default-src 'none'");
            headers.insert(
                CONTENT_SECURITY_POLICY,
                HeaderValue::from_static("default-src 'none'"),
            );
        }
    }

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "accelerometer=(), \
             autoplay=(), \
             camera=(), \
             display-capture=(), \
             geolocation=(), \
             gyroscope=(), \
             magnetometer=(), \
             microphone=(), \
             midi=(), \
             payment=(self \"https://api.razorpay.com\"), \
             usb=(), \
             xr-spatial-tracking=()",
        ),
    );

    headers.insert(
        HeaderName::from_static("cache-control"),
        HeaderValue::from_static("no-store, max-age=0"),
    );

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin-allow-popups"),
    );

    headers.insert(
        HeaderName::from_static("cross-origin-resource-policy"),
        HeaderValue::from_static("same-origin"),
    );

    headers.insert(
        HeaderName::from_static("x-dns-prefetch-control"),
        HeaderValue::from_static("off"),
    );

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_allows_checkout_and_platform_images() {
        let nonce = CspNonce("abc123==".to_string());
        let platform = Url::parse("http://localhost:5000").unwrap();
        let policy = content_security_policy(Some(&nonce), &platform, false);

        assert!(policy.contains("script-src 'self' 'nonce-abc123==' https://checkout.razorpay.com;"));
        assert!(policy.contains("img-src 'self' data: http://localhost:5000 "));
        assert!(policy.contains("frame-src https://api.razorpay.com"));
        assert!(!policy.contains("upgrade-insecure-requests"));
    }

    #[test]
    fn test_policy_without_nonce_upgrades_when_secure() {
        let platform = Url::parse("https://api.skillcoders.in/v1/").unwrap();
        let policy = content_security_policy(None, &platform, true);

        assert!(policy.contains("script-src 'self' https://checkout.razorpay.com;"));
        assert!(policy.contains("https://api.skillcoders.in "));
        assert!(policy.ends_with("; upgrade-insecure-requests"));
    }
}
