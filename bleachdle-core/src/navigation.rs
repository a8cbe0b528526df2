use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavStyle {
    /// Link to the page being shown
    GoldGlow,
    GrayBorder,
}

impl NavStyle {
    pub fn css_class(&self) -> &'static str {
        match self {
            NavStyle::GoldGlow => "gold-glow",
            NavStyle::GrayBorder => "gray-border",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavIndicator {
    pub href: String,
    pub style: NavStyle,
}

/// Style every nav circle: exact href match with the current path glows.
pub fn nav_indicators<'a>(
    current_path: &str,
    hrefs: impl IntoIterator<Item = &'a str>,
) -> Vec<NavIndicator> {
    hrefs
        .into_iter()
        .map(|href| NavIndicator {
            href: href.to_string(),
            style: if href == current_path {
                NavStyle::GoldGlow
            } else {
                NavStyle::GrayBorder
            },
        })
        .collect()
}

/// Whether a link click should be handled by an in-place page swap.
///
/// Fragments, other schemes (`mailto:` etc.) and other origins fall through
/// to regular navigation.
pub fn should_intercept(href: &str, origin: &str) -> bool {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return false;
    }

    if href.contains("://") || href.starts_with("//") {
        return strip_origin(href, origin).is_some();
    }

    // Relative paths never carry a scheme before the first slash
    match (href.find(':'), href.find('/')) {
        (Some(colon), Some(slash)) => slash < colon,
        (Some(_), None) => false,
        _ => true,
    }
}

/// Path component of an in-site link, without query string or fragment.
pub fn link_path(href: &str, origin: &str) -> String {
    let href = href.trim();
    let rest = strip_origin(href, origin).unwrap_or(href);
    let path = rest.split(['?', '#']).next().unwrap_or_default();

    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

fn strip_origin<'a>(href: &'a str, origin: &str) -> Option<&'a str> {
    let origin = origin.trim_end_matches('/');
    let rest = href.strip_prefix(origin)?;
    if rest.is_empty() || rest.starts_with(['/', '?', '#']) {
        Some(rest)
    } else {
        None
    }
}
