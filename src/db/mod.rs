use rusqlite::{params, OptionalExtension, Params, Row, ToSql, ErrorCode};
pub mod entities;
mod mappers;
pub mod queries;
use eyre::{Report, WrapErr};
use color_eyre::Result;
use entities::*;
use mappers::map_article;
use queries::{select_query_builder, generate_field_equal_qmark, Order, OrderBy};
use crate::utils::time_utils::current_timestamp;

// Type alias to make function signatures much clearer:
pub type Pool = r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>;

const SCHEMA: &str = "
  CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at INTEGER,
    updated_at INTEGER,
    title TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL,
    author TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'unpublished',
    content TEXT NOT NULL
  );
  CREATE INDEX IF NOT EXISTS articles_created_at ON articles (created_at);
";

// Has to match the order used in mappers::map_article.
const ARTICLE_FIELDS: [&str; 9] = [
  "id", "created_at", "updated_at", "title", "slug",
  "description", "author", "status", "content"
];

// Stole most of the signature from the rusqlite doc.
// The connection goes back to the pool when it's
// dropped at the end of the function, error or not.
fn select_many<T, P, F>(
  pool: &Pool,
  query: &str,
  params: P,
  mapper: F
) -> Result<Vec<T>>
  where
    P: Params,
    F: FnMut(&Row<'_>) -> Result<T, rusqlite::Error>,
{
  let conn = pool.get()?;
  let mut stmt = conn.prepare(query)?;
  let rows = stmt.query_map(params, mapper)?
    .collect::<Result<Vec<T>, rusqlite::Error>>()
    .context("Generic select_many query");
  rows
}

fn select_one<T, P, F>(
  pool: &Pool,
  query: &str,
  params: P,
  mapper: F
) -> Result<Option<T>>
  where
    P: Params,
    F: FnOnce(&Row<'_>) -> Result<T, rusqlite::Error>,
{
  let conn = pool.get()?;
  let mut stmt = conn.prepare(query)?;
  stmt.query_row(params, mapper)
    .optional()
    .context("Generic select_one query")
}

// The only constraint a write can break is the UNIQUE
// one on the slug, which is really a validation problem.
fn map_write_error(e: rusqlite::Error, slug: &str, operation: &str) -> Report {
  match &e {
    rusqlite::Error::SqliteFailure(err, _)
      if err.code == ErrorCode::ConstraintViolation =>
        Report::new(ValidationError::SlugTaken(slug.to_string())),
    _ => Report::new(e).wrap_err(format!("Failed to {} article", operation))
  }
}

/**
 * Everything touching the articles table. Meant to be
 * built once and cloned around, cloning only clones the
 * pool handle.
 */
#[derive(Clone)]
pub struct ArticleRepository {
  pool: Pool
}

impl ArticleRepository {

  pub fn new(pool: Pool) -> Self {
    Self { pool }
  }

  pub fn init_schema(&self) -> Result<()> {
    let conn = self.pool.get()?;
    conn.execute_batch(SCHEMA)
      .context("Creating the articles table")
  }

  // Newest first. Ties (same millisecond) are broken
  // by id so pagination stays stable.
  pub fn list(
    &self,
    published_only: bool,
    limit: usize,
    offset: usize
  ) -> Result<Vec<Article>> {
    let status = ArticleStatus::Published.as_str();
    // SQLite only knows signed integers, a wrapped offset
    // would silently become the first page.
    let limit = i64::try_from(limit)
      .context("Listing limit out of range")?;
    let offset = i64::try_from(offset)
      .context("Listing offset out of range")?;
    let mut q_where: Vec<String> = Vec::new();
    let mut values: Vec<&dyn ToSql> = Vec::new();
    if published_only {
      q_where.push(generate_field_equal_qmark("status"));
      values.push(&status);
    }
    values.push(&limit);
    values.push(&offset);
    let query = select_query_builder(
      &ARTICLE_FIELDS,
      "articles",
      &q_where,
      Some(OrderBy::new(
        Order::Desc,
        vec!["created_at".to_string(), "id".to_string()]
      )),
      true
    );
    select_many(&self.pool, &query, values.as_slice(), map_article)
  }

  pub fn count(&self, published_only: bool) -> Result<u64> {
    let count: Option<i64> = if published_only {
      select_one(
        &self.pool,
        "SELECT count(*) FROM articles WHERE status = ?",
        params![ArticleStatus::Published.as_str()],
        |row| row.get(0)
      )?
    } else {
      select_one(
        &self.pool,
        "SELECT count(*) FROM articles",
        [],
        |row| row.get(0)
      )?
    };
    // count(*) always gives a row, but uh... yeah.
    Ok(count.unwrap_or(0).max(0) as u64)
  }

  pub fn get_by_slug(&self, slug: &str) -> Result<Option<Article>> {
    let query = format!(
      "SELECT {} FROM articles WHERE slug = ?",
      ARTICLE_FIELDS.join(",")
    );
    select_one(&self.pool, &query, params![slug], map_article)
  }

  pub fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
    let query = format!(
      "SELECT {} FROM articles WHERE id = ?",
      ARTICLE_FIELDS.join(",")
    );
    select_one(&self.pool, &query, params![id], map_article)
  }

  // Returns the new article ID.
  pub fn create(&self, fields: &ArticleFields) -> Result<i64> {
    let status = fields.validate()?;
    let conn = self.pool.get()?;
    conn.execute(
      "INSERT INTO articles
      (created_at, title, slug, description, author, status, content)
      VALUES (?, ?, ?, ?, ?, ?, ?)",
      params![
        current_timestamp(),
        fields.title,
        fields.slug,
        fields.description,
        fields.author,
        status.as_str(),
        fields.content
      ]
    ).map_err(|e| map_write_error(e, &fields.slug, "insert"))?;
    Ok(conn.last_insert_rowid())
  }

  // Full overwrite. Returns the amount of rows affected,
  // 0 meaning there was no such article.
  pub fn update(&self, id: i64, fields: &ArticleFields) -> Result<usize> {
    let status = fields.validate()?;
    let conn = self.pool.get()?;
    conn.execute(
      "UPDATE articles SET updated_at = ?, title = ?, slug = ?,
      description = ?, author = ?, status = ?, content = ?
      WHERE id = ?",
      params![
        current_timestamp(),
        fields.title,
        fields.slug,
        fields.description,
        fields.author,
        status.as_str(),
        fields.content,
        id
      ]
    ).map_err(|e| map_write_error(e, &fields.slug, "update"))
  }

  pub fn delete(&self, id: i64) -> Result<usize> {
    let conn = self.pool.get()?;
    conn.execute("DELETE FROM articles WHERE id = ?", params![id])
      .context("Failed to delete article")
  }

}

// Every connection of SqliteConnectionManager::memory()
// is a different database, so the pool has to hold a
// single one.
#[cfg(test)]
pub fn memory_pool() -> Pool {
  let manager = r2d2_sqlite::SqliteConnectionManager::memory();
  r2d2::Pool::builder()
    .max_size(1)
    .build(manager)
    .expect("In-memory pool")
}

#[cfg(test)]
pub fn memory_repository() -> ArticleRepository {
  let repo = ArticleRepository::new(memory_pool());
  repo.init_schema().expect("Schema creation");
  repo
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::thread::sleep;
  use std::time::Duration;

  fn fields(slug: &str, status: &str) -> ArticleFields {
    ArticleFields {
      title: format!("Title for {}", slug),
      slug: slug.to_string(),
      description: "A short description".to_string(),
      author: "Kevin".to_string(),
      status: status.to_string(),
      content: "# Hello\n\nSome *markdown*.".to_string()
    }
  }

  #[test]
  fn create_then_get_by_id() {
    let repo = memory_repository();
    let input = fields("first-post", "published");
    let id = repo.create(&input).unwrap();
    let article = repo.get_by_id(id).unwrap().unwrap();
    assert_eq!(id, article.id);
    assert_eq!(input.title, article.title);
    assert_eq!(input.slug, article.slug);
    assert_eq!(input.description, article.description);
    assert_eq!(input.author, article.author);
    assert_eq!(ArticleStatus::Published, article.status);
    assert_eq!(input.content, article.content);
    assert!(article.created_at.is_some());
    assert_eq!(None, article.updated_at);
  }

  #[test]
  fn values_are_stored_untrimmed() {
    let repo = memory_repository();
    let mut input = fields("spaces", "published");
    input.title = "  Spaced title ".to_string();
    let id = repo.create(&input).unwrap();
    assert_eq!("  Spaced title ", repo.get_by_id(id).unwrap().unwrap().title);
  }

  #[test]
  fn get_by_slug_finds_article() {
    let repo = memory_repository();
    let id = repo.create(&fields("by-slug", "unpublished")).unwrap();
    let article = repo.get_by_slug("by-slug").unwrap().unwrap();
    assert_eq!(id, article.id);
    assert_eq!(ArticleStatus::Unpublished, article.status);
  }

  #[test]
  fn missing_rows_are_none() {
    let repo = memory_repository();
    assert!(repo.get_by_slug("nope").unwrap().is_none());
    assert!(repo.get_by_id(42).unwrap().is_none());
  }

  #[test]
  fn empty_field_fails_and_writes_nothing() {
    let repo = memory_repository();
    let mut input = fields("empty", "published");
    input.description = " ".to_string();
    let err = repo.create(&input).unwrap_err();
    assert_eq!(
      Some(&ValidationError::EmptyField("description")),
      err.downcast_ref::<ValidationError>()
    );
    assert_eq!(0, repo.count(false).unwrap());
  }

  #[test]
  fn invalid_update_leaves_article_alone() {
    let repo = memory_repository();
    let id = repo.create(&fields("stable", "published")).unwrap();
    let before = repo.get_by_id(id).unwrap().unwrap();
    let mut input = fields("stable-changed", "published");
    input.title = String::new();
    assert!(repo.update(id, &input).is_err());
    assert_eq!(before, repo.get_by_id(id).unwrap().unwrap());
  }

  #[test]
  fn update_overwrites_and_refreshes_timestamp() {
    let repo = memory_repository();
    let id = repo.create(&fields("to-edit", "unpublished")).unwrap();
    sleep(Duration::from_millis(5));
    let mut input = fields("edited", "published");
    input.title = "New title".to_string();
    input.content = "New content".to_string();
    assert_eq!(1, repo.update(id, &input).unwrap());
    let article = repo.get_by_id(id).unwrap().unwrap();
    assert_eq!("New title", article.title);
    assert_eq!("edited", article.slug);
    assert_eq!("New content", article.content);
    assert_eq!(ArticleStatus::Published, article.status);
    assert!(article.updated_at.unwrap() > article.created_at.unwrap());
  }

  #[test]
  fn update_missing_article_affects_nothing() {
    let repo = memory_repository();
    assert_eq!(0, repo.update(99, &fields("ghost", "published")).unwrap());
  }

  #[test]
  fn delete_then_not_found() {
    let repo = memory_repository();
    let id = repo.create(&fields("doomed", "published")).unwrap();
    assert_eq!(1, repo.delete(id).unwrap());
    assert!(repo.get_by_id(id).unwrap().is_none());
    assert_eq!(0, repo.delete(id).unwrap());
  }

  #[test]
  fn duplicate_slug_is_a_validation_error() {
    let repo = memory_repository();
    repo.create(&fields("twice", "published")).unwrap();
    let err = repo.create(&fields("twice", "published")).unwrap_err();
    assert_eq!(
      Some(&ValidationError::SlugTaken("twice".to_string())),
      err.downcast_ref::<ValidationError>()
    );
  }

  #[test]
  fn published_only_listing_filters_status() {
    let repo = memory_repository();
    repo.create(&fields("a", "published")).unwrap();
    repo.create(&fields("b", "unpublished")).unwrap();
    repo.create(&fields("c", "published")).unwrap();
    repo.create(&fields("d", "draft")).unwrap();

    let public = repo.list(true, 10, 0).unwrap();
    assert_eq!(2, public.len());
    assert!(public.iter().all(|a| a.is_published()));
    assert_eq!(2, repo.count(true).unwrap());

    let all = repo.list(false, 10, 0).unwrap();
    assert_eq!(4, all.len());
    assert_eq!(4, repo.count(false).unwrap());
  }

  #[test]
  fn listing_is_newest_first_and_paginated() {
    let repo = memory_repository();
    for slug in ["one", "two", "three"] {
      repo.create(&fields(slug, "published")).unwrap();
    }
    let first_page = repo.list(true, 2, 0).unwrap();
    let slugs: Vec<&str> = first_page.iter().map(|a| a.slug.as_str()).collect();
    assert_eq!(vec!["three", "two"], slugs);
    let second_page = repo.list(true, 2, 2).unwrap();
    assert_eq!(1, second_page.len());
    assert_eq!("one", second_page[0].slug);
  }

  #[test]
  fn listing_refuses_offsets_sqlite_cant_hold() {
    let repo = memory_repository();
    repo.create(&fields("one", "published")).unwrap();
    assert!(repo.list(true, 2, usize::MAX).is_err());
  }
}
