/*
 * Page rendering. All the templates are read and compiled
 * once at startup into a single Handlebars registry, handlers
 * only ever look pages up by name.
 * A page is the page-specific fragment wrapped in the shared
 * layout fragments of its Layout, in this order:
 *   Public:     header, navbar, <page>, footer
 *   Admin:      admin_header, navbar, <page>, footer
 *   Standalone: <page>
 */

use std::path::Path;
use derive_more::Display;
use handlebars::{
  handlebars_helper,
  Context,
  Handlebars,
  Helper,
  HelperDef,
  JsonValue,
  RenderContext,
  RenderError as HelperError,
  ScopedJson
};
use log::info;
use serde::Serialize;
pub mod markdown;

pub use markdown::render_markdown;

const TEMPLATE_EXT: &str = "hbs";

// Shared fragments, found in <views>/layouts/.
const LAYOUT_FRAGMENTS: [&str; 4] = ["header", "admin_header", "navbar", "footer"];

#[derive(Debug, Display)]
pub enum RenderError {
  #[display(fmt = "Template parse error: {}", _0)]
  TemplateParse(String),
  #[display(fmt = "Template execution error: {}", _0)]
  TemplateExec(String)
}

impl std::error::Error for RenderError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
  Public,
  Admin,
  Standalone
}

impl Layout {

  // Ordered list of the fragments making up a page.
  pub fn fragments<'a>(&self, page_fragment: &'a str) -> Vec<&'a str> {
    match self {
      Layout::Public => vec!["header", "navbar", page_fragment, "footer"],
      Layout::Admin => vec!["admin_header", "navbar", page_fragment, "footer"],
      Layout::Standalone => vec![page_fragment]
    }
  }

  // The composed page is just a list of partial calls.
  fn compose(&self, page_fragment: &str) -> String {
    self.fragments(page_fragment)
      .iter()
      .map(|f| format!("{{{{> {}}}}}", f))
      .collect()
  }

}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
  Homepage,
  Article,
  Login,
  Dashboard,
  CreateArticle,
  EditArticle,
  ArticlesList
}

impl Page {

  pub const ALL: [Page; 7] = [
    Page::Homepage,
    Page::Article,
    Page::Login,
    Page::Dashboard,
    Page::CreateArticle,
    Page::EditArticle,
    Page::ArticlesList
  ];

  pub fn name(&self) -> &'static str {
    match self {
      Page::Homepage => "homepage",
      Page::Article => "article",
      Page::Login => "login",
      Page::Dashboard => "dashboard",
      Page::CreateArticle => "create",
      Page::EditArticle => "edit",
      Page::ArticlesList => "articles"
    }
  }

  pub fn layout(&self) -> Layout {
    match self {
      Page::Homepage | Page::Article => Layout::Public,
      Page::Login
        | Page::Dashboard
        | Page::CreateArticle
        | Page::EditArticle => Layout::Admin,
      Page::ArticlesList => Layout::Standalone
    }
  }

  // Relative to the views directory, without extension.
  fn fragment_file(&self) -> String {
    match self.layout() {
      Layout::Standalone => format!("fragments/{}", self.name()),
      _ => format!("pages/{}", self.name())
    }
  }

  fn fragment_name(&self) -> String {
    format!("{}_content", self.name())
  }

}

// Range used to generate the pagination links. The upper
// bound is excluded: "iterate 3" gives 0, 1 and 2, one
// entry per page.
handlebars_helper!(iterate: |n: u64| (0..n).collect::<Vec<u64>>());

// Page numbers are 0 based, people count from 1.
handlebars_helper!(inc: |n: u64| n + 1);

// "offset 3" gives the first row of page 3. Needs the page
// size hence the struct.
pub struct OffsetHelper {
  page_size: u64
}

impl HelperDef for OffsetHelper {
  fn call_inner<'reg: 'rc, 'rc>(
    &self,
    h: &Helper<'reg, 'rc>,
    _: &'reg Handlebars<'reg>,
    _: &'rc Context,
    _: &mut RenderContext<'reg, 'rc>
  ) -> Result<ScopedJson<'reg, 'rc>, HelperError> {
    let page = h.param(0)
      .and_then(|p| p.value().as_u64())
      .ok_or_else(|| HelperError::new("offset expects a page number"))?;
    Ok(ScopedJson::Derived(JsonValue::from(page * self.page_size)))
  }
}

pub struct PageRenderer {
  registry: Handlebars<'static>
}

impl PageRenderer {

  pub fn new<P: AsRef<Path>>(
    views_dir: P,
    page_size: u64
  ) -> Result<PageRenderer, RenderError> {
    let views_dir = views_dir.as_ref();
    let mut registry = Handlebars::new();
    registry.register_helper("iterate", Box::new(iterate));
    registry.register_helper("inc", Box::new(inc));
    registry.register_helper("offset", Box::new(OffsetHelper { page_size }));

    let register_file = |registry: &mut Handlebars<'static>, name: &str, file: &str| {
      let path = views_dir.join(format!("{}.{}", file, TEMPLATE_EXT));
      registry.register_template_file(name, &path)
        .map_err(|e| RenderError::TemplateParse(
          format!("{} ({}) - {}", name, path.display(), e)
        ))
    };

    for fragment in LAYOUT_FRAGMENTS {
      let file = format!("layouts/{}", fragment);
      register_file(&mut registry, fragment, file.as_str())?;
    }
    for page in Page::ALL {
      let fragment_name = page.fragment_name();
      let fragment_file = page.fragment_file();
      register_file(&mut registry, fragment_name.as_str(), fragment_file.as_str())?;
      registry.register_template_string(
        page.name(),
        page.layout().compose(&fragment_name)
      ).map_err(|e| RenderError::TemplateParse(format!("{} - {}", page.name(), e)))?;
    }
    info!("Compiled {} page templates from {}", Page::ALL.len(), views_dir.display());

    Ok(PageRenderer { registry })
  }

  pub fn render<T: Serialize>(&self, page: Page, data: &T) -> Result<String, RenderError> {
    self.registry.render(page.name(), data)
      .map_err(|e| RenderError::TemplateExec(e.to_string()))
  }

}

#[cfg(test)]
pub fn test_renderer(page_size: u64) -> PageRenderer {
  PageRenderer::new(concat!(env!("CARGO_MANIFEST_DIR"), "/views"), page_size)
    .expect("Templates in ./views should compile")
}
