use serde::Serialize;
use crate::config::SiteInfo;
use crate::db::entities::Article;
use crate::utils::time_utils::{self, DateFormat};

// What the templates get to see of an article. Dates
// are already formatted.
#[derive(Debug, Serialize)]
pub struct ArticleDto {
  pub id: i64,
  pub title: String,
  pub slug: String,
  pub description: String,
  pub author: String,
  pub status: String,
  pub published: bool,
  pub content: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub created_at: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<String>
}

impl From<Article> for ArticleDto {
  fn from(article: Article) -> Self {
    let published = article.is_published();
    Self {
      id: article.id,
      title: article.title,
      slug: article.slug,
      description: article.description,
      author: article.author,
      status: article.status.to_string(),
      published,
      content: article.content,
      created_at: article.created_at
        .map(|t| time_utils::timestamp_to_date_string(t, DateFormat::Standard)),
      updated_at: article.updated_at
        .map(|t| time_utils::timestamp_to_date_string(t, DateFormat::Standard))
    }
  }
}

// Page metadata, ends up in the <head> (description,
// OpenGraph, canonical URL).
#[derive(Debug, Serialize)]
pub struct Meta {
  pub description: String,
  pub author: String,
  #[serde(rename = "type")]
  pub kind: String,
  pub url: String,
  pub title: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub created_at: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<String>
}

impl Meta {

  // "path" has to start with a slash.
  pub fn website(site: &SiteInfo, path: &str, title: &str) -> Self {
    Self {
      description: site.description.clone(),
      author: site.author.clone(),
      kind: "website".to_string(),
      url: format!("{}{}", site.root, path),
      title: format!("{} | {}", title, site.title),
      created_at: None,
      updated_at: None
    }
  }

  pub fn article(site: &SiteInfo, article: &Article) -> Self {
    Self {
      description: article.description.clone(),
      author: article.author.clone(),
      kind: "article".to_string(),
      url: format!("{}/article/{}", site.root, article.slug),
      title: format!("{} | {}", article.title, site.title),
      created_at: article.created_at
        .map(|t| time_utils::timestamp_to_date_string(t, DateFormat::USCompact)),
      updated_at: article.updated_at
        .map(|t| time_utils::timestamp_to_date_string(t, DateFormat::USCompact))
    }
  }

}

// The one data record given to a template. Built
// for a single render and dropped right after.
#[derive(Serialize)]
pub struct PageContext<'a> {
  pub site: &'a SiteInfo,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub meta: Option<Meta>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub article: Option<ArticleDto>,
  pub articles: Vec<ArticleDto>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub html: Option<String>,
  pub is_admin: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pages: Option<u64>
}

impl<'a> PageContext<'a> {

  pub fn new(site: &'a SiteInfo) -> Self {
    Self {
      site,
      meta: None,
      article: None,
      articles: Vec::new(),
      html: None,
      is_admin: false,
      pages: None
    }
  }

  pub fn meta(mut self, meta: Meta) -> Self {
    self.meta = Some(meta);
    self
  }

  pub fn article(mut self, article: Article) -> Self {
    self.article = Some(article.into());
    self
  }

  pub fn articles(mut self, articles: Vec<Article>) -> Self {
    self.articles = articles.into_iter().map(Into::into).collect();
    self
  }

  pub fn html(mut self, html: String) -> Self {
    self.html = Some(html);
    self
  }

  pub fn admin(mut self, is_admin: bool) -> Self {
    self.is_admin = is_admin;
    self
  }

  pub fn pages(mut self, pages: u64) -> Self {
    self.pages = Some(pages);
    self
  }

}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::entities::ArticleStatus;

  fn site() -> SiteInfo {
    SiteInfo {
      title: "SIMPLEstack".to_string(),
      root: "https://example.com".to_string(),
      author: "Kevin".to_string(),
      description: "A blog".to_string(),
      admin_url: "dashboard".to_string()
    }
  }

  fn article() -> Article {
    Article {
      id: 3,
      created_at: Some(1_700_000_000_000),
      updated_at: None,
      title: "My post".to_string(),
      slug: "my-post".to_string(),
      description: "About things".to_string(),
      author: "Kevin".to_string(),
      status: ArticleStatus::Unpublished,
      content: "# My post".to_string()
    }
  }

  #[test]
  fn article_meta_points_to_canonical_url() {
    let meta = Meta::article(&site(), &article());
    assert_eq!("https://example.com/article/my-post", meta.url);
    assert_eq!("My post | SIMPLEstack", meta.title);
    assert_eq!("article", meta.kind);
    assert!(meta.created_at.is_some());
    assert!(meta.updated_at.is_none());
  }

  #[test]
  fn dto_flags_unpublished_articles() {
    let dto = ArticleDto::from(article());
    assert!(!dto.published);
    assert_eq!("unpublished", dto.status);
    assert!(dto.created_at.is_some());
  }

  #[test]
  fn context_serializes_meta_type() {
    let site = site();
    let ctx = PageContext::new(&site)
      .meta(Meta::website(&site, "/", "Home"))
      .pages(3);
    let value = serde_json::to_value(&ctx).unwrap();
    assert_eq!("website", value["meta"]["type"]);
    assert_eq!("https://example.com/", value["meta"]["url"]);
    assert_eq!(3, value["pages"]);
    assert_eq!(false, value["is_admin"]);
  }
}
