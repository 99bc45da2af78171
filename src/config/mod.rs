// Adding the context method to errors:
use eyre::{WrapErr, eyre};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::convert::From;
use std::fmt;

#[derive(Deserialize)]
pub struct Config {
  pub db_path: String,
  pub bind_address: String,
  pub views_dir: String,
  pub static_dir: String,
  // Path segment of the dashboard, without slashes:
  pub admin_url: String,
  pub admin_username: String,
  pub admin_password: String,
  // The value the session cookie has to carry.
  pub session_secret: String,
  pub cookie_name: String,
  // Amount of articles per listing page:
  pub page_size: usize,
  // Used for the page metadata (OpenGraph and all that):
  pub site_title: String,
  pub site_root: String,
  pub site_author: String,
  pub site_description: String
}

// The admin credentials and the secret must never end up
// in the logs, so no derived Debug.
impl fmt::Debug for Config {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Config")
      .field("db_path", &self.db_path)
      .field("bind_address", &self.bind_address)
      .field("views_dir", &self.views_dir)
      .field("static_dir", &self.static_dir)
      .field("admin_url", &self.admin_url)
      .field("admin_username", &"<redacted>")
      .field("admin_password", &"<redacted>")
      .field("session_secret", &"<redacted>")
      .field("cookie_name", &self.cookie_name)
      .field("page_size", &self.page_size)
      .field("site_title", &self.site_title)
      .field("site_root", &self.site_root)
      .finish()
  }
}

// Public part of the config that templates get to see.
#[derive(Debug, Clone, Serialize)]
pub struct SiteInfo {
  pub title: String,
  pub root: String,
  pub author: String,
  pub description: String,
  pub admin_url: String
}

impl From<&Config> for SiteInfo {
  fn from(config: &Config) -> Self {
    Self {
      title: config.site_title.clone(),
      root: config.site_root.clone(),
      author: config.site_author.clone(),
      description: config.site_description.clone(),
      admin_url: config.admin_url.clone()
    }
  }
}

impl Config {

  pub fn from_env() -> Result<Config> {
    // Keys are lowercase versions of the environment
    // variables (ADMIN_URL -> admin_url).
    // session_secret, admin_username and admin_password
    // have no default on purpose.
    let c = config::Config::builder()
      .set_default("db_path", "./simplestack.db")?
      .set_default("bind_address", "127.0.0.1:8080")?
      .set_default("views_dir", "./views")?
      .set_default("static_dir", "./static")?
      .set_default("admin_url", "dashboard")?
      .set_default("cookie_name", "simple_stack_token")?
      .set_default("page_size", 10)?
      .set_default("site_title", "SIMPLEstack")?
      // Should never have a trailing slash, it gets removed anyway.
      .set_default("site_root", "http://localhost:8080")?
      .set_default("site_author", "Kevin Suñer")?
      .set_default("site_description", "A simple blog about simple things.")?
      .add_source(config::Environment::default())
      .build()
      .context("Loading configuration from env")?;

    let config: Config = c.try_deserialize()
      .context("Deserializing configuration")?;
    config.normalized()
  }

  // Removes the slashes people tend to put around URLs
  // and refuses values that would break routing.
  fn normalized(mut self) -> Result<Config> {
    self.admin_url = self.admin_url.trim_matches('/').to_string();
    self.site_root = self.site_root.trim_end_matches('/').to_string();
    if self.admin_url.is_empty() {
      return Err(eyre!("ADMIN_URL cannot be empty or \"/\""));
    }
    if self.session_secret.trim().is_empty() {
      return Err(eyre!("SESSION_SECRET cannot be empty"));
    }
    if self.page_size == 0 {
      return Err(eyre!("PAGE_SIZE has to be at least 1"));
    }
    Ok(self)
  }

}

#[cfg(test)]
impl Config {
  pub fn test_config() -> Config {
    Config {
      db_path: ":memory:".to_string(),
      bind_address: "127.0.0.1:0".to_string(),
      views_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/views").to_string(),
      static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string(),
      admin_url: "dashboard".to_string(),
      admin_username: "admin".to_string(),
      admin_password: "secret".to_string(),
      session_secret: "s3cr3t-t0k3n".to_string(),
      cookie_name: "simple_stack_token".to_string(),
      page_size: 2,
      site_title: "SIMPLEstack".to_string(),
      site_root: "http://localhost:8080".to_string(),
      site_author: "Tester".to_string(),
      site_description: "Test blog".to_string()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalized_strips_slashes() {
    let mut config = Config::test_config();
    config.admin_url = "/secret-admin/".to_string();
    config.site_root = "https://example.com/".to_string();
    let config = config.normalized().unwrap();
    assert_eq!("secret-admin", config.admin_url);
    assert_eq!("https://example.com", config.site_root);
  }

  #[test]
  fn normalized_refuses_root_admin_url() {
    let mut config = Config::test_config();
    config.admin_url = "/".to_string();
    assert!(config.normalized().is_err());
  }

  #[test]
  fn normalized_refuses_blank_secret() {
    let mut config = Config::test_config();
    config.session_secret = "  ".to_string();
    assert!(config.normalized().is_err());
  }

  #[test]
  fn debug_output_hides_secrets() {
    let config = Config::test_config();
    let output = format!("{:?}", config);
    assert!(!output.contains("s3cr3t-t0k3n"));
    assert!(!output.contains("\"secret\""));
    assert!(output.contains("dashboard"));
  }
}
