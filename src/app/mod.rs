use actix_web::{
  body::MessageBody,
  dev::{ServiceFactory, ServiceRequest, ServiceResponse},
  middleware::{self, from_fn},
  web,
  App,
  HttpServer
};
use actix_files::Files;
use r2d2_sqlite::{self, SqliteConnectionManager};
use color_eyre::Result;
use eyre::WrapErr;
use log::{debug, info, warn};
// We have to add crate here because of the other
// crate named "config" that we use as a dependency.
use crate::config::{Config, SiteInfo};
use crate::auth::{Authenticator, SharedSecretAuthenticator};
use crate::db::{ArticleRepository, Pool};
use crate::render::PageRenderer;
use error::Error;
mod handlers;
mod dtos;
mod error;
mod helpers;
mod guards;

// Everything handlers need, built once in run() and
// shared by all the workers. Read-only past startup.
pub struct AppState {
  pub articles: ArticleRepository,
  pub authenticator: Box<dyn Authenticator>,
  pub site_info: SiteInfo,
  pub page_size: usize
}

impl AppState {
  pub fn new(
    articles: ArticleRepository,
    authenticator: Box<dyn Authenticator>,
    config: &Config
  ) -> Self {
    Self {
      articles,
      authenticator,
      site_info: SiteInfo::from(config),
      page_size: config.page_size
    }
  }
}

// Builds the whole application, the server and the tests
// both use this.
pub fn create_app(
  app_state: web::Data<AppState>,
  renderer: web::Data<PageRenderer>,
  static_dir: &str
) -> App<
  impl ServiceFactory<
    ServiceRequest,
    Config = (),
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
    InitError = ()
  >
> {
  let admin_path = format!("/{}", app_state.site_info.admin_url);
  let static_dir = static_dir.to_string();
  App::new()
    .app_data(app_state)
    .app_data(renderer)
    .app_data(web::PathConfig::default().error_handler(|e, _| {
      warn!("Invalid path arguments - {}", e);
      Error::BadRequest("Invalid path arguments".to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|e, _| {
      warn!("Invalid query string arguments - {}", e);
      Error::BadRequest("Invalid query string arguments".to_string()).into()
    }))
    .app_data(web::FormConfig::default().error_handler(|e, _| {
      warn!("Invalid form data - {}", e);
      Error::BadRequest("Invalid form data".to_string()).into()
    }))
    .wrap(middleware::Logger::default())
    .configure(|cfg| routes_config(cfg, &admin_path, &static_dir))
    .default_service(web::route().to(handlers::not_found))
}

// Route configuration. Admin routes are wrapped one by
// one since they don't share a prefix.
fn routes_config(cfg: &mut web::ServiceConfig, admin_path: &str, static_dir: &str) {
  /*** Public ***/
  cfg.route("/", web::get().to(handlers::homepage))
    .route("/article/{slug}", web::get().to(handlers::article))
    .route("/get/articles", web::get().to(handlers::articles))
    .route("/authenticate", web::post().to(handlers::authenticate))
    .route("/login", web::post().to(handlers::authenticate))
    // Does its own credential check to show the login page:
    .route(admin_path, web::get().to(handlers::dashboard))
    .service(Files::new("/static", static_dir));

  /*** Private ***/
  cfg.service(
    web::resource("/create/article")
      .wrap(from_fn(guards::require_admin))
      .route(web::get().to(handlers::create_article_form))
  ).service(
    web::resource("/edit/article")
      .wrap(from_fn(guards::require_admin))
      .route(web::get().to(handlers::edit_article_form))
  ).service(
    web::resource("/post/article")
      .wrap(from_fn(guards::require_admin))
      .route(web::post().to(handlers::post_article))
  ).service(
    web::resource("/put/article")
      .wrap(from_fn(guards::require_admin))
      .route(web::put().to(handlers::put_article))
  ).service(
    web::resource("/delete/article")
      .wrap(from_fn(guards::require_admin))
      .route(web::delete().to(handlers::delete_article))
  );
}

// Function to start the server, main.rs provides the
// actix runtime.
pub async fn run() -> Result<()> {
  let config = Config::from_env()
    .context("Configuration (environment or .env file) is missing or invalid")?;
  debug!("Current config: {:?}", config);

  let manager = SqliteConnectionManager::file(&config.db_path);
  let pool = Pool::new(manager)
    .context("Database connection failed")?;
  let articles = ArticleRepository::new(pool);
  articles.init_schema()?;

  // Templates are compiled once here, the server doesn't
  // start if one of them is broken or missing.
  let renderer = PageRenderer::new(&config.views_dir, config.page_size as u64)
    .context("Fatal: views directory might be missing or contain a broken template")?;
  let renderer_ref = web::Data::new(renderer);

  let authenticator: Box<dyn Authenticator> =
    Box::new(SharedSecretAuthenticator::from_config(&config));

  let bind_address = config.bind_address.clone();
  let static_dir = config.static_dir.clone();
  let app_state = web::Data::new(AppState::new(articles, authenticator, &config));

  info!(
    "Starting HTTP server on {}, dashboard at /{}",
    bind_address,
    app_state.site_info.admin_url
  );
  HttpServer::new(move || {
    create_app(app_state.clone(), renderer_ref.clone(), &static_dir)
  })
  .bind(bind_address)?
  .run()
  .await
  .context("Start Actix web server")
}
