use anyhow::{anyhow, Result};
use tiny_http::{Header, Method, Response, Server};
use tracing::{info, warn};
use url::Url;

use cinescroll_core::{
    config::SiteConfig,
    content::Catalog,
    og::{self, OgResponse},
    AppConfig,
};

pub async fn run(catalog: Catalog, config: AppConfig, bind: String) -> Result<()> {
    // tiny_http blocks on accept; keep it off the runtime thread
    tokio::task::spawn_blocking(move || serve(&catalog, &config.site, &bind)).await?
}

fn serve(catalog: &Catalog, site: &SiteConfig, bind: &str) -> Result<()> {
    let server =
        Server::http(bind).map_err(|e| anyhow!("Failed to bind {}: {}", bind, e))?;
    info!("Serving Open Graph pages on http://{}/og?id=<id>", bind);

    for request in server.incoming_requests() {
        let response = handle(request.method(), request.url(), catalog, site);
        info!(
            method = %request.method(),
            status = response.status,
            "Handled request"
        );

        let content_type = Header::from_bytes(&b"Content-Type"[..], response.content_type.as_bytes())
            .map_err(|_| anyhow!("Invalid content type header"))?;
        let reply = Response::from_string(response.body)
            .with_status_code(response.status)
            .with_header(content_type);

        if let Err(e) = request.respond(reply) {
            warn!("Failed to send response: {}", e);
        }
    }

    Ok(())
}

fn plain(status: u16, body: &str) -> OgResponse {
    OgResponse {
        status,
        content_type: "text/plain; charset=utf-8",
        body: body.to_string(),
    }
}

fn handle(method: &Method, raw_url: &str, catalog: &Catalog, site: &SiteConfig) -> OgResponse {
    let Ok(url) = Url::parse("http://localhost/").and_then(|base| base.join(raw_url)) else {
        return plain(400, "Bad request");
    };

    if url.path() != "/og" {
        return plain(404, "Not found");
    }
    if *method != Method::Get {
        return plain(405, "Method not allowed");
    }

    let id = url
        .query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned());

    og::respond(catalog, site, id.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(raw_url: &str) -> OgResponse {
        let catalog = Catalog::builtin().unwrap();
        handle(&Method::Get, raw_url, &catalog, &SiteConfig::default())
    }

    #[test]
    fn test_routes() {
        assert_eq!(get("/og?id=softReveal04").status, 200);
        assert_eq!(get("/og?id=unknown1").status, 404);
        assert_eq!(get("/og?id=bad%20id").status, 400);
        assert_eq!(get("/og").status, 400);
        assert_eq!(get("/elsewhere?id=softReveal04").status, 404);
    }

    #[test]
    fn test_method_not_allowed() {
        let catalog = Catalog::builtin().unwrap();
        let resp = handle(&Method::Post, "/og?id=softReveal04", &catalog, &SiteConfig::default());
        assert_eq!(resp.status, 405);
    }
}
