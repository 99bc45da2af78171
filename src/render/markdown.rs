use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

// Schemes that would run something when clicked.
const UNSAFE_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

fn safe_destination(dest: CowStr<'_>) -> CowStr<'_> {
  // Browsers ignore whitespace and control chars inside
  // the scheme, so do we.
  let normalized: String = dest.chars()
    .filter(|c| !c.is_whitespace() && !c.is_control())
    .collect::<String>()
    .to_lowercase();
  if UNSAFE_SCHEMES.iter().any(|s| normalized.starts_with(s)) {
    CowStr::Borrowed("#")
  } else {
    dest
  }
}

/**
 * Converts article Markdown into an HTML fragment.
 * Raw HTML in the source is never passed through: it
 * comes out as escaped text, so a <script> tag written
 * in an article shows up as text on the page.
 * pulldown-cmark can't fail, there is no error case.
 */
pub fn render_markdown(source: &str) -> String {
  let mut options = Options::empty();
  options.insert(Options::ENABLE_TABLES);
  options.insert(Options::ENABLE_STRIKETHROUGH);
  options.insert(Options::ENABLE_FOOTNOTES);
  options.insert(Options::ENABLE_TASKLISTS);

  let events = Parser::new_ext(source, options).map(|event| match event {
    Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
    Event::Start(Tag::Link { link_type, dest_url, title, id }) =>
      Event::Start(Tag::Link {
        link_type,
        dest_url: safe_destination(dest_url),
        title,
        id
      }),
    Event::Start(Tag::Image { link_type, dest_url, title, id }) =>
      Event::Start(Tag::Image {
        link_type,
        dest_url: safe_destination(dest_url),
        title,
        id
      }),
    other => other
  });

  // Articles are a few KB at most.
  let mut html_output = String::with_capacity(source.len() * 3 / 2);
  html::push_html(&mut html_output, events);
  html_output
}
