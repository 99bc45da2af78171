#![allow(dead_code)]
mod db;
mod utils;

use std::env;
use color_eyre::Result;
use eyre::WrapErr;
use dotenv::dotenv;
use log::info;
use r2d2_sqlite::SqliteConnectionManager;
use getopts::Options;
use crate::db::{ArticleRepository, Pool};
use crate::db::entities::ArticleFields;

const DEFAULT_DB_PATH: &str = "./simplestack.db";

const DEMO_CONTENT: &str = "Welcome to **SIMPLEstack**.

This article was inserted by `simplestack-db --demo`, edit or
delete it from the dashboard.

## What works

- Markdown with tables, footnotes and ~~strikethrough~~
- Drafts only the admin can see
";

// Copy pasted this from getopts doc.
fn print_usage(program: &str, opts: Options) {
  let brief = format!("Usage: {} [options]", program);
  print!("{}", opts.usage(&brief));
}

fn demo_article() -> ArticleFields {
  ArticleFields {
    title: "Hello SIMPLEstack".to_string(),
    slug: "hello-simplestack".to_string(),
    description: "The demo article, feel free to remove it.".to_string(),
    author: "SIMPLEstack".to_string(),
    status: "published".to_string(),
    content: DEMO_CONTENT.to_string()
  }
}

/**
 * Binary meant to create the database outside of the
 * server, and optionally put an article in there.
 */
fn main() -> Result<()> {
  dotenv().ok();
  env_logger::init();

  let args: Vec<String> = env::args().collect();
  let program = args[0].clone();
  let mut opts = Options::new();
  opts.optflag("i", "init", "Create the articles table if it doesn't exist");
  opts.optflag("", "demo", "Insert a published demo article");
  opts.optopt("d", "db", "SQLite database file (defaults to DB_PATH)", "PATH");
  opts.optflag("h", "help", "Program usage");
  let opt_matches = opts.parse(&args[1..])?;
  if opt_matches.opt_present("h") ||
    (!opt_matches.opt_present("i") && !opt_matches.opt_present("demo")) {
    print_usage(&program, opts);
    return Ok(());
  }

  // No need for the whole server config here.
  let db_path = opt_matches.opt_str("d")
    .or_else(|| env::var("DB_PATH").ok())
    .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
  let manager = SqliteConnectionManager::file(&db_path);
  let pool = Pool::new(manager)
    .context("Database connection failed")?;
  let articles = ArticleRepository::new(pool);

  // The demo article needs the table anyway.
  articles.init_schema()?;
  info!("Schema ready in {}", db_path);

  if opt_matches.opt_present("demo") {
    let id = articles.create(&demo_article())
      .context("Inserting the demo article (it might already be there)")?;
    info!("Inserted demo article with id {}", id);
  }

  Ok(())
}
