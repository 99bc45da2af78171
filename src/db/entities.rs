use serde::{Deserialize, Serialize};
use derive_more::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
  #[display(fmt = "published")]
  Published,
  #[display(fmt = "unpublished")]
  Unpublished
}

impl ArticleStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      ArticleStatus::Published => "published",
      ArticleStatus::Unpublished => "unpublished"
    }
  }
}

// The forms historically said "draft" in some places,
// so we accept it too.
impl FromStr for ArticleStatus {
  type Err = ValidationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "published" => Ok(ArticleStatus::Published),
      "unpublished" | "draft" => Ok(ArticleStatus::Unpublished),
      _ => Err(ValidationError::InvalidStatus(s.to_string()))
    }
  }
}

// Timestamps are in milliseconds, see time_utils.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
  pub id: i64,
  pub created_at: Option<i64>,
  pub updated_at: Option<i64>,
  pub title: String,
  pub slug: String,
  pub description: String,
  pub author: String,
  pub status: ArticleStatus,
  pub content: String
}

impl Article {
  pub fn is_published(&self) -> bool {
    self.status == ArticleStatus::Published
  }
}

// Everything an admin can write. There is no partial
// update, all of these overwrite what's in the database.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleFields {
  pub title: String,
  pub slug: String,
  // Older forms call it "excerpt".
  #[serde(alias = "excerpt")]
  pub description: String,
  pub author: String,
  pub status: String,
  pub content: String
}

impl ArticleFields {
  // Checks every field and gives back the parsed status.
  // Nothing gets written if this fails.
  pub fn validate(&self) -> Result<ArticleStatus, ValidationError> {
    let fields = [
      ("title", &self.title),
      ("slug", &self.slug),
      ("description", &self.description),
      ("author", &self.author),
      ("status", &self.status),
      ("content", &self.content)
    ];
    if let Some((name, _)) = fields.iter().find(|(_, v)| v.trim().is_empty()) {
      return Err(ValidationError::EmptyField(*name));
    }
    self.status.parse()
  }
}

#[derive(Debug, Display, PartialEq)]
pub enum ValidationError {
  #[display(fmt = "Field \"{}\" cannot be empty", _0)]
  EmptyField(&'static str),
  #[display(fmt = "Unknown article status \"{}\"", _0)]
  InvalidStatus(String),
  #[display(fmt = "Slug \"{}\" is already used by another article", _0)]
  SlugTaken(String)
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
  use super::*;

  fn fields() -> ArticleFields {
    ArticleFields {
      title: "Title".to_string(),
      slug: "title".to_string(),
      description: "Some text".to_string(),
      author: "Someone".to_string(),
      status: "published".to_string(),
      content: "# Title".to_string()
    }
  }

  #[test]
  fn valid_fields_give_status() {
    assert_eq!(Ok(ArticleStatus::Published), fields().validate());
  }

  #[test]
  fn blank_field_is_reported_by_name() {
    let mut f = fields();
    f.author = "   ".to_string();
    assert_eq!(Err(ValidationError::EmptyField("author")), f.validate());
    let mut f = fields();
    f.content = String::new();
    assert_eq!(Err(ValidationError::EmptyField("content")), f.validate());
  }

  #[test]
  fn draft_means_unpublished() {
    assert_eq!(Ok(ArticleStatus::Unpublished), "draft".parse::<ArticleStatus>());
    assert_eq!(Ok(ArticleStatus::Published), " Published ".parse::<ArticleStatus>());
    assert!("archived".parse::<ArticleStatus>().is_err());
  }
}
