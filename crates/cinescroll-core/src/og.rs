//! Open Graph share pages
//!
//! Social crawlers do not run the client app, so shared links resolve to a
//! small HTML document carrying the item's meta tags plus a redirect to the
//! real page. Every interpolated value is escaped; error bodies never echo
//! the request.

use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::config::SiteConfig;
use crate::content::{Catalog, Inspiration};

const MAX_ID_LEN: usize = 64;
const DESCRIPTION_LEN: usize = 200;

#[derive(Error, Debug)]
pub enum OgError {
    #[error("Missing or malformed id")]
    InvalidId,

    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OgError {
    pub fn status_code(&self) -> u16 {
        match self {
            OgError::InvalidId => 400,
            OgError::NotFound => 404,
            OgError::Internal(_) => 500,
        }
    }
}

impl From<url::ParseError> for OgError {
    fn from(e: url::ParseError) -> Self {
        OgError::Internal(e.to_string())
    }
}

/// HTTP-shaped result of an Open Graph request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OgResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

/// Accept only non-empty ASCII alphanumeric ids of bounded length
pub fn validate_id(raw: &str) -> Result<&str, OgError> {
    if raw.is_empty() || raw.len() > MAX_ID_LEN || !raw.bytes().all(|b| b.is_ascii_alphanumeric())
    {
        return Err(OgError::InvalidId);
    }
    Ok(raw)
}

/// Escape text for use in HTML element content and quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Canonical URL of an item on the site
pub fn canonical_url(site: &SiteConfig, id: &str) -> Result<Url, OgError> {
    let base = Url::parse(&site.base_url)?;
    Ok(base.join(&format!("inspirations/{id}"))?)
}

/// Render the share page for one item
pub fn render(site: &SiteConfig, item: &Inspiration) -> Result<String, OgError> {
    let url = canonical_url(site, &item.id)?;
    let image = item.preview_image().unwrap_or(&site.default_image);
    let description = item.excerpt(DESCRIPTION_LEN);
    let title = format!("{} | {}", item.title, site.site_name);

    // JSON string literal, with `</` broken up so it cannot close the script
    let redirect_js = serde_json::to_string(url.as_str())
        .map_err(|e| OgError::Internal(e.to_string()))?
        .replace("</", "<\\/");

    let title = escape_html(&title);
    let description = escape_html(&description);
    let image = escape_html(image);
    let site_name = escape_html(&site.site_name);
    let href = escape_html(url.as_str());

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<meta name="description" content="{description}">
<meta property="og:type" content="article">
<meta property="og:title" content="{title}">
<meta property="og:description" content="{description}">
<meta property="og:image" content="{image}">
<meta property="og:url" content="{href}">
<meta property="og:site_name" content="{site_name}">
<meta name="twitter:card" content="summary_large_image">
<meta name="twitter:title" content="{title}">
<meta name="twitter:description" content="{description}">
<meta name="twitter:image" content="{image}">
<link rel="canonical" href="{href}">
<meta http-equiv="refresh" content="0; url={href}">
<script>window.location.replace({redirect_js});</script>
</head>
<body>
<p><a href="{href}">{title}</a></p>
</body>
</html>
"#
    ))
}

fn lookup<'a>(catalog: &'a Catalog, query_id: Option<&str>) -> Result<&'a Inspiration, OgError> {
    let id = validate_id(query_id.unwrap_or_default())?;
    catalog.get(id).ok_or(OgError::NotFound)
}

/// Resolve an `id` query parameter into a complete response
pub fn respond(catalog: &Catalog, site: &SiteConfig, query_id: Option<&str>) -> OgResponse {
    let result = lookup(catalog, query_id).and_then(|item| render(site, item));

    match result {
        Ok(body) => OgResponse {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body,
        },
        Err(e) => {
            match &e {
                OgError::Internal(detail) => error!(detail = %detail, "Open Graph render failed"),
                other => debug!(status = other.status_code(), "Open Graph request rejected"),
            }
            OgResponse {
                status: e.status_code(),
                content_type: "text/plain; charset=utf-8",
                body: match e {
                    OgError::Internal(_) => "Internal error".to_string(),
                    other => other.to_string(),
                },
            }
        }
    }
}
