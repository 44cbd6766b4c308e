//! `actix-web` cookie transport
//!
//! Reads session cookies from an [`HttpRequest`] and collects the cookies a
//! handler writes so they can be attached to the response:
//!
//! ```rust,ignore
//! async fn handler(req: HttpRequest, store: web::Data<CookieStore>) -> HttpResponse {
//!     let transport = ActixTransport::new(&req);
//!     let sessions = store.bind(&transport);
//!
//!     let mut session = sessions.get_or_new("sess").unwrap();
//!     session.insert("visits", 1).unwrap();
//!     session.save().unwrap();
//!
//!     let mut response = HttpResponse::Ok();
//!     transport.apply(&mut response);
//!     response.finish()
//! }
//! ```

use std::cell::RefCell;

use actix_web::cookie::time::{Duration, OffsetDateTime};
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder};
use anyhow::anyhow;
use chrono::{DateTime, Utc};

use super::{CookieTransport, TransportError};
use crate::store::{CookieAttributes, SameSitePolicy};

/// Cookie transport for one `actix-web` request
pub struct ActixTransport<'r> {
    request: &'r HttpRequest,
    outgoing: RefCell<Vec<Cookie<'static>>>,
}

impl<'r> ActixTransport<'r> {
    #[must_use]
    pub fn new(request: &'r HttpRequest) -> Self {
        Self {
            request,
            outgoing: RefCell::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn request(&self) -> &HttpRequest {
        self.request
    }

    /// Drain the cookies written so far
    pub fn take_cookies(&self) -> Vec<Cookie<'static>> {
        self.outgoing.take()
    }

    /// Attach every pending cookie to a response under construction
    pub fn apply(&self, response: &mut HttpResponseBuilder) {
        for cookie in self.take_cookies() {
            response.cookie(cookie);
        }
    }

    /// Attach every pending cookie to a finished response
    ///
    /// # Errors
    ///
    /// Returns an error if a cookie cannot be encoded as a header value
    pub fn apply_to_response(&self, response: &mut HttpResponse) -> Result<(), TransportError> {
        for cookie in self.take_cookies() {
            response
                .add_cookie(&cookie)
                .map_err(|e| anyhow!("Failed to add cookie '{}': {e}", cookie.name()))?;
        }
        Ok(())
    }
}

impl CookieTransport for ActixTransport<'_> {
    fn read_cookie(&self, name: &str) -> Result<String, TransportError> {
        self.request
            .cookie(name)
            .map(|cookie| cookie.value().to_string())
            .ok_or(TransportError::NotFound)
    }

    fn write_cookie(
        &self,
        name: &str,
        value: &str,
        attributes: &CookieAttributes,
    ) -> Result<(), TransportError> {
        let cookie = build_cookie(name, value, attributes, Utc::now())?;

        log::debug!(
            "Queued cookie '{}': max_age={}, secure={}",
            name,
            attributes.max_age,
            attributes.secure
        );
        self.outgoing.borrow_mut().push(cookie);
        Ok(())
    }
}

/// Map session cookie attributes onto an `actix-web` cookie
///
/// # Errors
///
/// Returns an error if the expiry time cannot be represented
pub fn build_cookie(
    name: &str,
    value: &str,
    attributes: &CookieAttributes,
    now: DateTime<Utc>,
) -> Result<Cookie<'static>, TransportError> {
    let mut builder = Cookie::build(name.to_owned(), value.to_owned())
        .path(attributes.path.clone())
        .http_only(attributes.http_only)
        .secure(attributes.secure);

    if !attributes.domain.is_empty() {
        builder = builder.domain(attributes.domain.clone());
    }

    if let Some(policy) = attributes.same_site {
        builder = builder.same_site(match policy {
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::Lax => SameSite::Lax,
            SameSitePolicy::None => SameSite::None,
        });
    }

    if attributes.max_age != 0 {
        // Browsers treat any non-positive Max-Age as "delete now"
        builder = builder.max_age(Duration::seconds(attributes.max_age.max(0)));
    }

    if let Some(expires) = attributes.expires_at(now) {
        let expires = OffsetDateTime::from_unix_timestamp(expires.timestamp())
            .map_err(|e| anyhow!("Invalid cookie expiry: {e}"))?;
        builder = builder.expires(expires);
    }

    Ok(builder.finish())
}
