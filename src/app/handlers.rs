use actix_web::{
  web,
  HttpResponse,
  HttpRequest,
  Result
};
use serde::Deserialize;
use log::{debug, info, warn};
use crate::auth::AuthStatus;
use crate::db::entities::ArticleFields;
use crate::render::{render_markdown, Page, PageRenderer};
use super::dtos::*;
use super::error::Error;
use super::helpers::{self, run_query, render_page};
use super::AppState;

// Module with all the handler functions. Public pages
// first, then the admin ones. Admin handlers behind the
// require_admin middleware don't check anything themselves.

/* --- Request query or form objects --- */
#[derive(Deserialize)]
pub struct ArticlesQuery {
  pub admin: Option<String>,
  // Anything past u32 is a 400 from the query extractor.
  pub offset: Option<u32>
}

#[derive(Deserialize)]
pub struct IdQuery {
  pub id: i64
}

// Missing fields are empty strings so they end up as a
// regular failed login (401) instead of a form error.
#[derive(Deserialize)]
pub struct LoginForm {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub password: String
}
/* --- End request query or form objects --- */

// Default response when no route matched the request:
pub async fn not_found() -> Result<HttpResponse, Error> {
  Err(Error::NotFound(String::from("Endpoint doesn't exist")))
}

pub async fn homepage(
  app_state: web::Data<AppState>,
  renderer: web::Data<PageRenderer>
) -> Result<HttpResponse, Error> {
  let articles = app_state.articles.clone();
  let count = run_query(move || articles.count(true)).await?;
  let site = &app_state.site_info;
  let ctx = PageContext::new(site)
    .meta(Meta::website(site, "/", "Home"))
    .pages(helpers::page_count(count, app_state.page_size));
  render_page(&renderer, Page::Homepage, &ctx)
}

// Unpublished articles answer 404 unless the caller is the
// admin, so that drafts don't leak by guessing slugs.
pub async fn article(
  app_state: web::Data<AppState>,
  renderer: web::Data<PageRenderer>,
  path: web::Path<(String,)>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  let slug = path.into_inner().0;
  let articles = app_state.articles.clone();
  let article = run_query(move || articles.get_by_slug(&slug))
    .await?
    .ok_or_else(|| Error::NotFound("Article does not exist".to_string()))?;

  let is_admin = app_state.authenticator.authorize(&req).is_authorized();
  if !article.is_published() && !is_admin {
    debug!("Anonymous request for unpublished article {}", article.id);
    return Err(Error::NotFound("Article does not exist".to_string()));
  }

  let html = render_markdown(&article.content);
  let site = &app_state.site_info;
  let ctx = PageContext::new(site)
    .meta(Meta::article(site, &article))
    .article(article)
    .html(html)
    .admin(is_admin);
  render_page(&renderer, Page::Article, &ctx)
}

// Listing fragment loaded by htmx. "admin=true" adds the
// unpublished articles but needs the cookie, the whole
// request fails without it.
pub async fn articles(
  app_state: web::Data<AppState>,
  renderer: web::Data<PageRenderer>,
  query: web::Query<ArticlesQuery>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  let wants_admin = match query.admin.as_deref() {
    Some(value) if !value.is_empty() => helpers::parse_bool(value)
      .ok_or_else(|| Error::BadRequest("admin has to be a boolean".to_string()))?,
    _ => false
  };
  if wants_admin {
    let status = app_state.authenticator.authorize(&req);
    if status != AuthStatus::Authorized {
      warn!("Rejected {:?} admin credential on the articles listing", status);
      return Err(Error::Unauthorized("failed to authenticate".to_string()));
    }
  }

  let offset = query.offset.unwrap_or(0) as usize;
  let limit = app_state.page_size;
  let articles = app_state.articles.clone();
  let list = run_query(move || articles.list(!wants_admin, limit, offset)).await?;
  let ctx = PageContext::new(&app_state.site_info)
    .articles(list)
    .admin(wants_admin);
  render_page(&renderer, Page::ArticlesList, &ctx)
}

// The redirect header is for htmx, which does a full page
// navigation when it sees it.
pub async fn authenticate(
  app_state: web::Data<AppState>,
  form: web::Form<LoginForm>
) -> Result<HttpResponse, Error> {
  match app_state.authenticator.login(&form.username, &form.password) {
    Some(cookie) => {
      info!("Admin logged in");
      Ok(
        HttpResponse::Ok()
          .cookie(cookie)
          .insert_header(("HX-Redirect", format!("/{}", app_state.site_info.admin_url)))
          .finish()
      )
    },
    None => {
      warn!("Failed login attempt for username \"{}\"", form.username);
      Err(Error::Unauthorized("invalid username or password".to_string()))
    }
  }
}

// Not behind the middleware: people without the cookie
// get the login page instead of a 401.
pub async fn dashboard(
  app_state: web::Data<AppState>,
  renderer: web::Data<PageRenderer>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  let site = &app_state.site_info;
  match app_state.authenticator.authorize(&req) {
    AuthStatus::Authorized => {
      let articles = app_state.articles.clone();
      let count = run_query(move || articles.count(false)).await?;
      let ctx = PageContext::new(site)
        .meta(Meta::website(site, &format!("/{}", site.admin_url), "Dashboard"))
        .pages(helpers::page_count(count, app_state.page_size))
        .admin(true);
      render_page(&renderer, Page::Dashboard, &ctx)
    },
    status => {
      debug!("Showing the login page, credential was {:?}", status);
      let ctx = PageContext::new(site)
        .meta(Meta::website(site, &format!("/{}", site.admin_url), "Sign in"));
      render_page(&renderer, Page::Login, &ctx)
    }
  }
}

pub async fn create_article_form(
  app_state: web::Data<AppState>,
  renderer: web::Data<PageRenderer>
) -> Result<HttpResponse, Error> {
  let ctx = PageContext::new(&app_state.site_info).admin(true);
  render_page(&renderer, Page::CreateArticle, &ctx)
}

pub async fn edit_article_form(
  app_state: web::Data<AppState>,
  renderer: web::Data<PageRenderer>,
  query: web::Query<IdQuery>
) -> Result<HttpResponse, Error> {
  let id = query.id;
  let articles = app_state.articles.clone();
  let article = run_query(move || articles.get_by_id(id))
    .await?
    .ok_or_else(|| Error::NotFound(format!("No article with id {}", id)))?;
  let ctx = PageContext::new(&app_state.site_info)
    .article(article)
    .admin(true);
  render_page(&renderer, Page::EditArticle, &ctx)
}

pub async fn post_article(
  app_state: web::Data<AppState>,
  form: web::Form<ArticleFields>
) -> Result<HttpResponse, Error> {
  let fields = form.into_inner();
  let articles = app_state.articles.clone();
  let id = run_query(move || articles.create(&fields)).await?;
  info!("Created article {}", id);
  Ok(helpers::success_snippet(
    "¡Hooray! A new article has been created",
    &app_state.site_info.admin_url
  ))
}

pub async fn put_article(
  app_state: web::Data<AppState>,
  query: web::Query<IdQuery>,
  form: web::Form<ArticleFields>
) -> Result<HttpResponse, Error> {
  let id = query.id;
  let fields = form.into_inner();
  let articles = app_state.articles.clone();
  let updated = run_query(move || articles.update(id, &fields)).await?;
  if updated == 0 {
    return Err(Error::NotFound(format!("No article with id {}", id)));
  }
  info!("Updated article {}", id);
  Ok(helpers::success_snippet(
    "¡Hey! The article has been successfully edited",
    &app_state.site_info.admin_url
  ))
}

pub async fn delete_article(
  app_state: web::Data<AppState>,
  query: web::Query<IdQuery>
) -> Result<HttpResponse, Error> {
  let id = query.id;
  let articles = app_state.articles.clone();
  let deleted = run_query(move || articles.delete(id)).await?;
  if deleted == 0 {
    return Err(Error::NotFound(format!("No article with id {}", id)));
  }
  info!("Deleted article {}", id);
  Ok(
    HttpResponse::Ok()
      .insert_header(("HX-Redirect", format!("/{}", app_state.site_info.admin_url)))
      .finish()
  )
}
