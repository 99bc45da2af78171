mod config;
mod db;
mod utils;
mod auth;
mod render;
mod app;
use color_eyre::Result;
use dotenv::dotenv;
use std::env;

#[actix_web::main]
async fn main() -> Result<()> {
  dotenv().ok();
  // Logger defaults to info level when RUST_LOG isn't set:
  if env::var("RUST_LOG").is_err() {
    env::set_var("RUST_LOG", "info");
  }
  env_logger::init();
  color_eyre::install()?;

  app::run().await
}
