use actix_web::{web, HttpResponse};
use log::error;
use serde::Serialize;
use crate::render::{Page, PageRenderer};
use super::error::{Error, map_db_error};

// SQLite calls are blocking, so they go to the actix
// blocking thread pool. Flattens both layers of errors
// into our Error.
pub async fn run_query<F, R>(query: F) -> Result<R, Error>
  where
    F: FnOnce() -> color_eyre::Result<R> + Send + 'static,
    R: Send + 'static
{
  web::block(query)
    .await
    .map_err(|e| {
      error!("Blocking database task failed - {}", e);
      Error::InternalServerError(e.to_string())
    })?
    .map_err(map_db_error)
}

pub fn render_page<T: Serialize>(
  renderer: &PageRenderer,
  page: Page,
  data: &T
) -> Result<HttpResponse, Error> {
  let body = renderer.render(page, data)
    .map_err(|e| {
      error!("Could not render page \"{}\" - {}", page.name(), e);
      Error::TemplateError(e.to_string())
    })?;
  Ok(
    HttpResponse::Ok()
      .content_type("text/html; charset=utf-8")
      .body(body)
  )
}

// Small bit of HTML htmx swaps in after a successful
// create or update.
pub fn success_snippet(message: &str, admin_url: &str) -> HttpResponse {
  HttpResponse::Ok()
    .content_type("text/html; charset=utf-8")
    .body(format!(
      "<div class=\"alert alert-success\" role=\"alert\">\n\
        <p>{}</p>\n\
        <hr>\n\
        <a href=\"/{}\" class=\"link-success mb-0\">Back to Dashboard &#x2192;</a>\n\
      </div>",
      message,
      admin_url
    ))
}

// Same values Go's strconv.ParseBool accepts, the old
// frontend sends "true" but who knows what else is out there.
pub fn parse_bool(value: &str) -> Option<bool> {
  match value {
    "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
    "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
    _ => None
  }
}

// Ceiling division, 0 articles means 0 pages.
pub fn page_count(article_count: u64, page_size: usize) -> u64 {
  let page_size = page_size.max(1) as u64;
  (article_count + page_size - 1) / page_size
}
