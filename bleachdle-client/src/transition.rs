use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use tracing::{error, info};

use bleachdle_core::{GameVariant, NavIndicator, link_path, nav_indicators, should_intercept};

use crate::backend::PageFetcher;
use crate::error::ClientError;

pub const CONTENT_CONTAINER_ID: &str = "content-container";
pub const DEFAULT_FADE: Duration = Duration::from_millis(300);
pub const NAVIGATION_ERROR_ALERT: &str = "An error occurred while loading the page.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Idle,
    FadingOut,
    Loading,
    FadingIn,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavigationOutcome {
    /// Left to the regular browser navigation
    NotIntercepted,
    /// Content swapped in place. `variant` is the game to bind, if the page has one.
    Swapped {
        path: String,
        variant: Option<GameVariant>,
    },
    /// Old content kept; the alert has to be shown to the player
    Failed { alert: String },
}

/// Inner HTML of the element with the given id.
///
/// Nested elements with the same tag name are balanced, so a
/// `<div id="x"><div></div></div>` yields `<div></div>`.
pub fn extract_region(html: &str, id: &str) -> Result<String, ClientError> {
    let missing = || ClientError::MissingContent(id.to_string());

    let opening = Regex::new(&format!(
        r#"(?i)<([a-z][a-z0-9]*)\b[^>]*\sid\s*=\s*["']{}["'][^>]*>"#,
        regex::escape(id)
    ))
    .map_err(|_| missing())?;

    let captures = opening.captures(html).ok_or_else(missing)?;
    let (Some(whole), Some(tag)) = (captures.get(0), captures.get(1)) else {
        return Err(missing());
    };

    let tags = Regex::new(&format!(r"(?i)<(/?){}\b[^>]*>", regex::escape(tag.as_str())))
        .map_err(|_| missing())?;

    let start = whole.end();
    let mut depth = 1usize;
    for m in tags.captures_iter(&html[start..]) {
        let Some(tag_match) = m.get(0) else { continue };
        let closing = m.get(1).is_some_and(|slash| !slash.as_str().is_empty());
        if closing {
            depth -= 1;
            if depth == 0 {
                return Ok(html[start..start + tag_match.start()].to_string());
            }
        } else if !tag_match.as_str().ends_with("/>") {
            depth += 1;
        }
    }

    Err(missing())
}

/// Every `href` attribute of the anchors in a fragment, in document order
pub fn link_hrefs(html: &str) -> Vec<String> {
    let Ok(anchor) = Regex::new(r#"(?i)<a\b[^>]*\shref\s*=\s*["']([^"']*)["']"#) else {
        return Vec::new();
    };
    anchor
        .captures_iter(html)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Swaps the content region of a page in place instead of reloading it.
pub struct PageNavigator<F> {
    fetcher: Arc<F>,
    origin: String,
    container_id: String,
    fade: Duration,
    current_path: String,
    content: String,
    phase: TransitionPhase,
    trace: Vec<TransitionPhase>,
}

impl<F: PageFetcher> PageNavigator<F> {
    pub fn new(fetcher: Arc<F>, origin: impl Into<String>) -> Self {
        Self {
            fetcher,
            origin: origin.into(),
            container_id: CONTENT_CONTAINER_ID.to_string(),
            fade: DEFAULT_FADE,
            current_path: "/".to_string(),
            content: String::new(),
            phase: TransitionPhase::Idle,
            trace: Vec::new(),
        }
    }

    pub fn with_fade(mut self, fade: Duration) -> Self {
        self.fade = fade;
        self
    }

    pub fn with_container_id(mut self, id: impl Into<String>) -> Self {
        self.container_id = id.into();
        self
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    /// Phases entered by the last transition
    pub fn phase_trace(&self) -> &[TransitionPhase] {
        &self.trace
    }

    /// Nav circles found in the current content
    pub fn indicators(&self) -> Vec<NavIndicator> {
        let hrefs: Vec<String> = link_hrefs(&self.content)
            .into_iter()
            .filter(|href| should_intercept(href, &self.origin))
            .map(|href| link_path(&href, &self.origin))
            .collect();
        nav_indicators(&self.current_path, hrefs.iter().map(String::as_str))
    }

    /// Link click handler
    pub async fn follow_link(&mut self, href: &str) -> NavigationOutcome {
        if !should_intercept(href, &self.origin) {
            return NavigationOutcome::NotIntercepted;
        }
        let path = link_path(href, &self.origin);
        self.navigate_to(&path).await
    }

    /// Run a full fade-out, fetch, swap, fade-in cycle for an in-site path.
    pub async fn navigate_to(&mut self, path: &str) -> NavigationOutcome {
        self.trace.clear();

        self.enter(TransitionPhase::FadingOut);
        self.pause().await;

        self.enter(TransitionPhase::Loading);
        let loaded = match self.fetcher.fetch_page(path).await {
            Ok(html) => extract_region(&html, &self.container_id),
            Err(e) => Err(e),
        };

        let outcome = match loaded {
            Ok(region) => {
                info!("Loaded {} ({} bytes of content)", path, region.len());
                self.content = region;
                self.current_path = path.to_string();
                NavigationOutcome::Swapped {
                    path: path.to_string(),
                    variant: GameVariant::for_path(path),
                }
            }
            Err(e) => {
                error!("Error loading page {}: {}", path, e);
                NavigationOutcome::Failed {
                    alert: NAVIGATION_ERROR_ALERT.to_string(),
                }
            }
        };

        self.enter(TransitionPhase::FadingIn);
        self.pause().await;
        self.enter(TransitionPhase::Idle);

        outcome
    }

    fn enter(&mut self, phase: TransitionPhase) {
        self.phase = phase;
        self.trace.push(phase);
    }

    async fn pause(&self) {
        if !self.fade.is_zero() {
            tokio::time::sleep(self.fade).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
<nav><a href="/">Home</a></nav>
<div id="content-container" class="fade">
  <div class="search"><input id="search-bar"></div>
  <div class="nav"><a href="/character">C</a><a href="/bankai">B</a></div>
</div>
<footer><div>footer</div></footer>
</body></html>"#;

    #[test]
    fn test_extract_region_balances_nested_divs() {
        let region = extract_region(PAGE, CONTENT_CONTAINER_ID).unwrap();
        assert!(region.contains(r#"<div class="search">"#));
        assert!(region.contains(r#"href="/bankai""#));
        assert!(!region.contains("footer"));
        assert!(region.trim_end().ends_with("</div>"));
    }

    #[test]
    fn test_extract_region_missing_or_unclosed() {
        let err = extract_region("<div id=\"other\"></div>", CONTENT_CONTAINER_ID).unwrap_err();
        assert!(matches!(err, ClientError::MissingContent(ref id) if id == CONTENT_CONTAINER_ID));

        assert!(extract_region("<div id='content-container'><div>", CONTENT_CONTAINER_ID).is_err());
    }

    #[test]
    fn test_extract_region_ignores_prefixed_id_attributes() {
        let html = r#"<div data-id="content-container">stale</div>
<section id="content-container"><p>fresh</p></section>"#;
        assert_eq!(
            extract_region(html, CONTENT_CONTAINER_ID).unwrap(),
            "<p>fresh</p>"
        );

        let only_data_id = r#"<div data-id="content-container">stale</div>"#;
        assert!(extract_region(only_data_id, CONTENT_CONTAINER_ID).is_err());
    }

    #[test]
    fn test_extract_region_other_tag() {
        let html = "<main id='content-container'><main>a</main>b</main>";
        assert_eq!(
            extract_region(html, CONTENT_CONTAINER_ID).unwrap(),
            "<main>a</main>b"
        );
    }

    #[test]
    fn test_link_hrefs() {
        assert_eq!(link_hrefs(PAGE), vec!["/", "/character", "/bankai"]);
    }
}
