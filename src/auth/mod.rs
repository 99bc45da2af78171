/*
 * Admin authentication. There is exactly one admin and one
 * secret: the cookie handed out at login carries the secret
 * itself, so the "session" is really a static password sent
 * back on every request. No expiry other than the cookie's
 * own, no revocation short of changing the configuration.
 * Everything goes through the Authenticator trait so that
 * handlers don't care when this gets replaced.
 */

use actix_web::HttpRequest;
use actix_web::cookie::Cookie;
use actix_web::cookie::time::{Duration, OffsetDateTime};
use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;
use crate::config::Config;

const COOKIE_LIFETIME_HOURS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
  Authorized,
  Missing,
  Invalid
}

impl AuthStatus {
  pub fn is_authorized(&self) -> bool {
    *self == AuthStatus::Authorized
  }
}

pub trait Authenticator: Send + Sync {

  fn cookie_name(&self) -> &str;

  // Decision on a credential value, None meaning the
  // client didn't present anything.
  fn verify(&self, presented: Option<&str>) -> AuthStatus;

  // Gives the cookie to set when the credentials are
  // right, None otherwise.
  fn login(&self, username: &str, password: &str) -> Option<Cookie<'static>>;

  // Actix gives us None for cookies it can't parse,
  // which end up as Missing.
  fn authorize(&self, req: &HttpRequest) -> AuthStatus {
    let cookie = req.cookie(self.cookie_name());
    self.verify(cookie.as_ref().map(|c| c.value()))
  }

}

pub struct SharedSecretAuthenticator {
  cookie_name: String,
  secret: String,
  username: String,
  password: String
}

impl SharedSecretAuthenticator {

  pub fn new(
    cookie_name: &str,
    secret: &str,
    username: &str,
    password: &str
  ) -> Self {
    Self {
      cookie_name: cookie_name.to_string(),
      secret: secret.to_string(),
      username: username.to_string(),
      password: password.to_string()
    }
  }

  pub fn from_config(config: &Config) -> Self {
    Self::new(
      &config.cookie_name,
      &config.session_secret,
      &config.admin_username,
      &config.admin_password
    )
  }

}

// Hashing first gives fixed length digests so the
// comparison time doesn't depend on the input length.
fn constant_time_eq(a: &str, b: &str) -> bool {
  let hash_a = Sha1::digest(a.as_bytes());
  let hash_b = Sha1::digest(b.as_bytes());
  hash_a.as_slice().ct_eq(hash_b.as_slice()).into()
}

impl Authenticator for SharedSecretAuthenticator {

  fn cookie_name(&self) -> &str {
    &self.cookie_name
  }

  fn verify(&self, presented: Option<&str>) -> AuthStatus {
    match presented {
      None => AuthStatus::Missing,
      Some(value) if constant_time_eq(value, &self.secret) => AuthStatus::Authorized,
      Some(_) => AuthStatus::Invalid
    }
  }

  fn login(&self, username: &str, password: &str) -> Option<Cookie<'static>> {
    // Non short-circuiting on purpose, both get compared.
    let valid = constant_time_eq(username, &self.username)
      & constant_time_eq(password, &self.password);
    if !valid {
      return None;
    }
    Some(
      Cookie::build(self.cookie_name.clone(), self.secret.clone())
        .path("/")
        .secure(true)
        .http_only(true)
        .max_age(Duration::hours(COOKIE_LIFETIME_HOURS))
        .expires(OffsetDateTime::now_utc() + Duration::hours(COOKIE_LIFETIME_HOURS))
        .finish()
    )
  }

}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::test::TestRequest;

  fn authenticator() -> SharedSecretAuthenticator {
    SharedSecretAuthenticator::new("token", "the-secret", "admin", "secret")
  }

  #[test]
  fn matching_value_is_authorized() {
    assert_eq!(AuthStatus::Authorized, authenticator().verify(Some("the-secret")));
  }

  #[test]
  fn other_values_are_invalid() {
    let auth = authenticator();
    assert_eq!(AuthStatus::Invalid, auth.verify(Some("the-secret ")));
    assert_eq!(AuthStatus::Invalid, auth.verify(Some("")));
    assert_eq!(AuthStatus::Invalid, auth.verify(Some("THE-SECRET")));
  }

  #[test]
  fn nothing_presented_is_missing() {
    assert_eq!(AuthStatus::Missing, authenticator().verify(None));
  }

  #[test]
  fn authorize_reads_the_named_cookie() {
    let auth = authenticator();
    let req = TestRequest::default()
      .cookie(Cookie::new("token", "the-secret"))
      .to_http_request();
    assert!(auth.authorize(&req).is_authorized());

    let req = TestRequest::default()
      .cookie(Cookie::new("other", "the-secret"))
      .to_http_request();
    assert_eq!(AuthStatus::Missing, auth.authorize(&req));

    let req = TestRequest::default()
      .cookie(Cookie::new("token", "nope"))
      .to_http_request();
    assert_eq!(AuthStatus::Invalid, auth.authorize(&req));
  }

  #[test]
  fn login_issues_the_secret_cookie() {
    let cookie = authenticator().login("admin", "secret").unwrap();
    assert_eq!("token", cookie.name());
    assert_eq!("the-secret", cookie.value());
    assert_eq!(Some("/"), cookie.path());
    assert_eq!(Some(true), cookie.secure());
    assert_eq!(Some(true), cookie.http_only());
    assert_eq!(Some(Duration::hours(1)), cookie.max_age());
    let expires = cookie.expires_datetime().unwrap();
    assert!(expires > OffsetDateTime::now_utc() + Duration::minutes(59));
  }

  #[test]
  fn login_with_a_wrong_field_issues_nothing() {
    let auth = authenticator();
    assert!(auth.login("admin", "wrong").is_none());
    assert!(auth.login("root", "secret").is_none());
    assert!(auth.login("", "").is_none());
  }
}
