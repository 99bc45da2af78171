use super::entities::*;
use rusqlite::{Row, Error};
use rusqlite::types::Type;

// Column order has to match ARTICLE_FIELDS in the db module.
pub fn map_article(row: &Row) -> Result<Article, Error> {
  let status: String = row.get(7)?;
  Ok(Article {
    id: row.get(0)?,
    created_at: row.get(1)?,
    updated_at: row.get(2)?,
    title: row.get(3)?,
    slug: row.get(4)?,
    description: row.get(5)?,
    author: row.get(6)?,
    status: status.parse()
      .map_err(|e| Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?,
    content: row.get(8)?
  })
}
