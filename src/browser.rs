//! Browser-automation fallback for pages that hide or protect the feed API.
//!
//! Drives a real Chrome session via CDP instead of calling the API directly.
//! The session credential is an opaque storage-state file (`auth.json`)
//! produced by an external interactive login step; this module only consumes
//! it. The whole flow is cooperative single-flow: navigate, scroll with fixed
//! yields so dynamic content finishes rendering, expand the "Read More"
//! controls, snapshot the DOM, and extract `{writer, content}` pairs.
//!
//! # Selectors
//!
//! The CSS selectors are per-target constants. They change with the target
//! site's markup, not with this design, so they live at the top of the module
//! where an operator can update them after inspecting the page.

use crate::models::Post;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use futures::StreamExt;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Element wrapping one whole article on the page.
pub const POST_CONTAINER: &str = ".post-item";
/// Element holding the writer's display name inside a post.
pub const AUTHOR_NAME: &str = ".author-name";
/// Element holding the full post text inside a post.
pub const CONTENT_BODY: &str = ".post-content";
/// Visible label of the JS link that expands a truncated post.
pub const READ_MORE_LABEL: &str = "Read More";

/// Number of scroll passes used to trigger infinite-scroll loading.
const SCROLL_PASSES: usize = 5;
/// Pause after each scroll so dynamic content can render.
const SCROLL_PAUSE: Duration = Duration::from_secs(2);
/// Pause after expanding posts so the JS expansion can settle.
const EXPAND_PAUSE: Duration = Duration::from_secs(1);

/// Storage-state blob written by the interactive login step.
///
/// Only the cookie jar is consumed; the rest of the blob (local storage
/// origins and the like) is ignored.
#[derive(Debug, Deserialize)]
struct SessionState {
    #[serde(default)]
    cookies: Vec<SessionCookie>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionCookie {
    name: String,
    value: String,
    domain: String,
    path: String,
    #[serde(default)]
    secure: bool,
}

/// Load the session credential, failing with an operator-facing message when
/// the login step has not been run yet.
fn load_session_state(auth_file: &Path) -> Result<SessionState, Box<dyn Error>> {
    if !auth_file.exists() {
        return Err(format!(
            "session state file {} not found; run the interactive login step first",
            auth_file.display()
        )
        .into());
    }
    let raw = std::fs::read_to_string(auth_file)?;
    let state: SessionState = serde_json::from_str(&raw)?;
    info!(cookies = state.cookies.len(), path = %auth_file.display(), "Loaded saved session state");
    Ok(state)
}

fn to_cookie_param(cookie: &SessionCookie) -> Result<CookieParam, Box<dyn Error>> {
    CookieParam::builder()
        .name(cookie.name.as_str())
        .value(cookie.value.as_str())
        .domain(cookie.domain.as_str())
        .path(cookie.path.as_str())
        .secure(cookie.secure)
        .build()
        .map_err(Into::into)
}

/// Harvest posts from the target page through a logged-in browser session.
///
/// Acquires the browser once and releases it on every exit path, including
/// failures inside the page flow.
#[instrument(level = "info", skip_all, fields(url = %target_url))]
pub async fn harvest_posts(
    target_url: &Url,
    auth_file: &Path,
) -> Result<Vec<Post>, Box<dyn Error>> {
    let session = load_session_state(auth_file)?;

    info!("Launching browser");
    let (mut browser, mut handler) = Browser::launch(BrowserConfig::builder().build()?).await?;
    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    });

    let result = scrape_page(&browser, target_url, &session).await;

    if let Err(e) = browser.close().await {
        warn!(error = %e, "Browser close failed");
    }
    let _ = browser.wait().await;
    handler_task.abort();

    result
}

async fn scrape_page(
    browser: &Browser,
    target_url: &Url,
    session: &SessionState,
) -> Result<Vec<Post>, Box<dyn Error>> {
    let page = browser.new_page("about:blank").await?;

    let cookies = session
        .cookies
        .iter()
        .map(to_cookie_param)
        .collect::<Result<Vec<_>, _>>()?;
    page.set_cookies(cookies).await?;

    info!("Navigating to target page");
    page.goto(target_url.as_str()).await?;
    page.wait_for_navigation().await?;

    info!(passes = SCROLL_PASSES, "Scrolling to load all articles");
    for pass in 0..SCROLL_PASSES {
        page.evaluate("window.scrollBy(0, 5000)").await?;
        debug!(pass = pass + 1, "Scrolled");
        sleep(SCROLL_PAUSE).await;
    }

    // Expand every truncated post before snapshotting the DOM.
    let expand_js = format!(
        "document.querySelectorAll('{POST_CONTAINER}').forEach(p => {{ \
           for (const el of p.querySelectorAll('a, button, span')) {{ \
             if (el.textContent.trim() === '{READ_MORE_LABEL}') el.click(); \
           }} \
         }})"
    );
    page.evaluate(expand_js).await?;
    sleep(EXPAND_PAUSE).await;

    let html = page.content().await?;
    let posts = extract_posts(&html);
    info!(count = posts.len(), "Extracted posts from rendered page");
    Ok(posts)
}

/// Extract `{writer, content}` pairs from the rendered page HTML.
///
/// Posts missing either the author or the content element are logged and
/// skipped; one malformed post never aborts the page.
fn extract_posts(html: &str) -> Vec<Post> {
    let post_selector = Selector::parse(POST_CONTAINER).unwrap();
    let author_selector = Selector::parse(AUTHOR_NAME).unwrap();
    let content_selector = Selector::parse(CONTENT_BODY).unwrap();

    let document = Html::parse_document(html);
    let mut posts = Vec::new();

    for element in document.select(&post_selector) {
        let writer = element
            .select(&author_selector)
            .next()
            .map(|e| e.text().collect::<Vec<_>>().join(" ").trim().to_string());
        let content = element
            .select(&content_selector)
            .next()
            .map(|e| e.text().collect::<Vec<_>>().join(" ").trim().to_string());

        match (writer, content) {
            (Some(writer), Some(content)) if !writer.is_empty() => {
                posts.push(Post { writer, content });
            }
            _ => warn!("Skipping post with missing writer or content"),
        }
    }

    posts
}
