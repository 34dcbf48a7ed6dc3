//! Server-rendered HTML pages: the search form and the results grid.
//!
//! Pages are small enough to build with `format!`; every interpolated value
//! goes through [`escape_html`].

use axum::response::Html;
use serde::Serialize;

use crate::layout::LayoutPreset;
use crate::search::provider::ImageResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Danger,
}

impl NoticeLevel {
    fn class(self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Danger => "danger",
        }
    }
}

/// A one-shot message shown above the search form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    /// Notices that survive a redirect are passed as a short code in `?notice=`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            DOWNLOAD_FAILED => Some(Notice::new(NoticeLevel::Danger, "Failed to download the image")),
            _ => None,
        }
    }
}

pub const DOWNLOAD_FAILED: &str = "download_failed";

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f4f5f7; color: #222; }
main { max-width: 1100px; margin: 0 auto; padding: 24px; }
form.search { display: flex; gap: 8px; }
form.search input[type=text] { flex: 1; padding: 10px; font-size: 16px; }
button { padding: 8px 14px; cursor: pointer; }
.alert { padding: 10px 14px; margin-bottom: 16px; border-radius: 4px; }
.alert.info { background: #e3f2fd; } .alert.warning { background: #fff8e1; } .alert.danger { background: #fdecea; }
.toolbar { display: flex; flex-wrap: wrap; gap: 8px; align-items: center; margin: 16px 0; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(200px, 1fr)); gap: 12px; }
.card { background: #fff; border-radius: 6px; padding: 8px; box-shadow: 0 1px 3px rgba(0,0,0,.1); }
.card img { width: 100%; height: 160px; object-fit: cover; border-radius: 4px; }
.card .meta { font-size: 12px; display: flex; justify-content: space-between; align-items: center; margin-top: 6px; }
"#;

fn layout_shell(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<main>\n{body}\n</main>\n</body>\n</html>\n",
        title = escape_html(title),
    ))
}

fn search_form(query: &str) -> String {
    format!(
        "<form class=\"search\" method=\"post\" action=\"/search\">\
         <input type=\"text\" name=\"query\" value=\"{}\" placeholder=\"Search for images\" autofocus>\
         <button type=\"submit\">Search</button></form>",
        escape_html(query)
    )
}

pub fn index_page(notice: Option<&Notice>) -> Html<String> {
    let alert = notice
        .map(|n| {
            format!(
                "<div class=\"alert {}\">{}</div>",
                n.level.class(),
                escape_html(&n.message)
            )
        })
        .unwrap_or_default();
    let body = format!("<h1>Image Search</h1>\n{alert}\n{}", search_form(""));
    layout_shell("Image Search", &body)
}

/// JSON handed to the page script, embedded in a `<script type="application/json">` tag.
#[derive(Serialize)]
struct PageData<'a> {
    query: &'a str,
    images: &'a [ImageResult],
}

pub fn results_page(query: &str, images: &[ImageResult]) -> Html<String> {
    let cards: String = images.iter().map(image_card).collect();
    let layout_options: String = LayoutPreset::ALL
        .iter()
        .map(|p| {
            let selected = if *p == LayoutPreset::DEFAULT { " selected" } else { "" };
            format!(
                "<option value=\"{key}\"{selected}>{key} per page</option>",
                key = p.key()
            )
        })
        .collect();

    // `</` must not appear inside the script element.
    let data = serde_json::to_string(&PageData { query, images })
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/");

    let body = format!(
        "<h1>Results for \"{query_html}\"</h1>\n{form}\n\
         <div class=\"toolbar\">\
         <span id=\"count\">{count} images</span>\
         <button type=\"button\" id=\"select-all\">Select all</button>\
         <button type=\"button\" id=\"refresh\">Refresh</button>\
         <button type=\"button\" id=\"load-more\">Load more</button>\
         <button type=\"button\" id=\"zip\">Download ZIP</button>\
         <select id=\"layout\">{layout_options}</select>\
         <label><input type=\"checkbox\" id=\"stretch\"> Stretch</label>\
         <button type=\"button\" id=\"pdf\">Download PDF</button>\
         </div>\n<div class=\"grid\" id=\"grid\">{cards}</div>\n\
         <script type=\"application/json\" id=\"page-data\">{data}</script>\n\
         <script>{SCRIPT}</script>",
        query_html = escape_html(query),
        form = search_form(query),
        count = images.len(),
    );
    layout_shell(&format!("{query} - Image Search"), &body)
}

fn image_card(image: &ImageResult) -> String {
    let src = if image.thumbnail.is_empty() {
        &image.image
    } else {
        &image.thumbnail
    };
    format!(
        "<div class=\"card\"><img src=\"{src}\" alt=\"{title}\" loading=\"lazy\">\
         <div class=\"meta\"><label><input type=\"checkbox\" class=\"pick\" value=\"{url}\"> {w}×{h}</label>\
         <a href=\"/download_single/{url}\">Download</a></div></div>",
        src = escape_html(src),
        title = escape_html(&image.title),
        url = escape_html(&image.image),
        w = image.width,
        h = image.height,
    )
}

const SCRIPT: &str = r#"
const data = JSON.parse(document.getElementById('page-data').textContent);
let images = data.images;
const grid = document.getElementById('grid');
const esc = s => String(s ?? '').replace(/[&<>"']/g, c => ({'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;',"'":'&#39;'}[c]));
function card(img) {
  return `<div class="card"><img src="${esc(img.thumbnail || img.image)}" alt="${esc(img.title)}" loading="lazy">` +
    `<div class="meta"><label><input type="checkbox" class="pick" value="${esc(img.image)}"> ${img.width}×${img.height}</label>` +
    `<a href="/download_single/${esc(img.image)}">Download</a></div></div>`;
}
function render() {
  grid.innerHTML = images.map(card).join('');
  document.getElementById('count').textContent = `${images.length} images`;
}
function picked() { return [...document.querySelectorAll('.pick:checked')].map(c => c.value); }
async function failure(res) {
  try { const body = await res.json(); return body.error.message; } catch (_) { return res.statusText; }
}
async function download(url, payload) {
  if (!payload.image_urls.length) { alert('No images selected'); return; }
  const res = await fetch(url, { method: 'POST', headers: { 'Content-Type': 'application/json' }, body: JSON.stringify(payload) });
  if (!res.ok) { alert(await failure(res)); return; }
  const name = (res.headers.get('Content-Disposition') || '').match(/filename="([^"]+)"/);
  const a = document.createElement('a');
  a.href = URL.createObjectURL(await res.blob());
  a.download = name ? name[1] : 'download';
  a.click();
  URL.revokeObjectURL(a.href);
}
document.getElementById('select-all').onclick = () => document.querySelectorAll('.pick').forEach(c => c.checked = true);
document.getElementById('zip').onclick = () => download('/download_images_zip', { image_urls: picked(), query: data.query });
document.getElementById('pdf').onclick = () => download('/download_pdf', {
  image_urls: picked(), query: data.query,
  layout: document.getElementById('layout').value,
  stretch: document.getElementById('stretch').checked,
});
document.getElementById('refresh').onclick = async () => {
  const res = await fetch('/refresh_search', { method: 'POST', body: new URLSearchParams({ query: data.query }) });
  if (!res.ok) { alert(await failure(res)); return; }
  images = (await res.json()).images; render();
};
document.getElementById('load-more').onclick = async () => {
  const res = await fetch('/load_more_images', { method: 'POST', headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ query: data.query, current_count: images.length, current_images: images }) });
  if (!res.ok) { alert(await failure(res)); return; }
  images = images.concat((await res.json()).images); render();
};
"#;
