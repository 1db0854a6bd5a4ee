use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::extract::{dedup_posts, extract_posts, PostRecord};

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// The knobs that differed between field versions of this tool, unified into
/// one surface.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Listing page ceiling; roughly 30 posts per page.
    pub page_limit: u32,
    pub request_timeout: Duration,
    /// Pause between page fetches to keep the request rate low.
    pub inter_page_delay: Duration,
    /// Listing endpoint host. Tests point this at a local server.
    pub base_url: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            page_limit: 10,
            request_timeout: Duration::from_secs(10),
            inter_page_delay: Duration::from_millis(500),
            base_url: "https://blog.naver.com".to_string(),
        }
    }
}

/// Fetch listing pages sequentially and return the de-duplicated posts.
///
/// Collection is best-effort: a transport failure or a rejected request ends
/// the loop and whatever has accumulated so far is returned, not an error.
/// A page with no extractable titles is the end-of-list signal.
pub async fn collect_posts(cfg: &CollectorConfig, blog_id: &str) -> Result<Vec<PostRecord>> {
    let client = Client::builder()
        .timeout(cfg.request_timeout)
        .default_headers(listing_headers(&cfg.base_url, blog_id)?)
        .build()?;

    info!(
        "collecting posts for blog '{}' (up to {} pages)",
        blog_id, cfg.page_limit
    );

    let pb = ProgressBar::new(cfg.page_limit as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} pages")?
            .progress_chars("=> "),
    );

    let mut posts: Vec<PostRecord> = Vec::new();
    let mut pages_fetched = 0u32;

    for page in 1..=cfg.page_limit {
        let url = format!(
            "{}/PostTitleListAsync.naver?blogId={}&viewdate=&currentPage={}&categoryNo=0&parentCategoryNo=0",
            cfg.base_url, blog_id, page
        );

        let response = match client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("page {} request failed: {}", page, e);
                break;
            }
        };
        if !response.status().is_success() {
            warn!(
                "listing request rejected on page {}: HTTP {}",
                page,
                response.status()
            );
            break;
        }
        let body = match response.text().await {
            Ok(t) => t,
            Err(e) => {
                warn!("page {} body read failed: {}", page, e);
                break;
            }
        };

        let page_posts = extract_posts(&body, blog_id);
        if page_posts.is_empty() {
            debug!("no titles on page {}, end of list", page);
            break;
        }

        posts.extend(page_posts);
        pages_fetched += 1;
        pb.inc(1);

        if page < cfg.page_limit {
            tokio::time::sleep(cfg.inter_page_delay).await;
        }
    }

    pb.finish_and_clear();

    let unique = dedup_posts(posts);
    info!(
        "collected {} unique posts across {} pages",
        unique.len(),
        pages_fetched
    );
    Ok(unique)
}

/// Header set a stock desktop browser would send, enough to get past the
/// trivial bot checks on the listing endpoint.
fn listing_headers(base_url: &str, blog_id: &str) -> Result<HeaderMap> {
    let referer = format!("{base_url}/PostList.naver?blogId={blog_id}");
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(REFERER, HeaderValue::from_str(&referer)?);
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7"),
    );
    Ok(headers)
}

/// Accepts either a bare blog id or a blog URL, from which the id is the
/// final path segment.
pub fn blog_id_from_input(input: &str) -> &str {
    let trimmed = input.trim();
    let no_query = trimmed.split(['?', '#']).next().unwrap_or(trimmed);
    let no_slash = no_query.trim_end_matches('/');
    no_slash.rsplit('/').next().unwrap_or(no_slash)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    /// Build a listing body the way the endpoint shapes it: one object per
    /// post, fields independently findable.
    fn listing_body(entries: &[(&str, &str, &str)]) -> String {
        let items: Vec<String> = entries
            .iter()
            .map(|(log_no, title, date)| {
                format!(r#"{{"logNo":"{log_no}","titleText":"{title}","addDate":"{date}"}}"#)
            })
            .collect();
        format!(r#"{{"postList":[{}],"countPerPage":"30"}}"#, items.join(","))
    }

    fn test_config(base_url: String, page_limit: u32) -> CollectorConfig {
        CollectorConfig {
            page_limit,
            request_timeout: Duration::from_secs(5),
            inter_page_delay: Duration::ZERO,
            base_url,
        }
    }

    async fn page_mock(server: &mut mockito::ServerGuard, page: &str, body: &str) -> mockito::Mock {
        server
            .mock("GET", "/PostTitleListAsync.naver")
            .match_query(Matcher::UrlEncoded("currentPage".into(), page.into()))
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await
    }

    #[tokio::test]
    async fn two_pages_then_empty() {
        let mut server = mockito::Server::new_async().await;
        let page1 = listing_body(&[
            ("223100", "Hello%20World", "2024. 1. 5."),
            ("223101", "Second%20Post", "2024. 1. 7."),
        ]);
        let _m1 = page_mock(&mut server, "1", &page1).await;
        let _m2 = page_mock(&mut server, "2", &listing_body(&[])).await;

        let cfg = test_config(server.url(), 10);
        let posts = collect_posts(&cfg, "myblog").await.unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "Hello World");
        assert_eq!(posts[1].title, "Second Post");
        assert_eq!(posts[0].link, "https://blog.naver.com/myblog/223100");
        assert_eq!(posts[1].link, "https://blog.naver.com/myblog/223101");
    }

    #[tokio::test]
    async fn empty_first_page_yields_empty_collection() {
        let mut server = mockito::Server::new_async().await;
        let _m = page_mock(&mut server, "1", &listing_body(&[])).await;

        let cfg = test_config(server.url(), 10);
        let posts = collect_posts(&cfg, "myblog").await.unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn rejected_request_returns_partial_result() {
        let mut server = mockito::Server::new_async().await;
        let _m1 = page_mock(
            &mut server,
            "1",
            &listing_body(&[("1", "Only%20Post", "2024. 3. 1.")]),
        )
        .await;
        let _m2 = server
            .mock("GET", "/PostTitleListAsync.naver")
            .match_query(Matcher::UrlEncoded("currentPage".into(), "2".into()))
            .with_status(500)
            .create_async()
            .await;

        let cfg = test_config(server.url(), 10);
        let posts = collect_posts(&cfg, "myblog").await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Only Post");
    }

    #[tokio::test]
    async fn connection_failure_is_not_an_error() {
        // Nothing listens here; the collector logs and returns what it has.
        let cfg = test_config("http://127.0.0.1:1".to_string(), 10);
        let posts = collect_posts(&cfg, "myblog").await.unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn stops_at_page_limit_and_dedups_across_pages() {
        let mut server = mockito::Server::new_async().await;
        // Same body on every page: the page ceiling still holds and the
        // repeats collapse in the final collection.
        let body = listing_body(&[
            ("10", "Repeat%20A", "2024. 4. 1."),
            ("11", "Repeat%20B", "2024. 4. 2."),
        ]);
        let m = server
            .mock("GET", "/PostTitleListAsync.naver")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(body)
            .expect(3)
            .create_async()
            .await;

        let cfg = test_config(server.url(), 3);
        let posts = collect_posts(&cfg, "myblog").await.unwrap();

        m.assert_async().await;
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "Repeat A");
        assert_eq!(posts[1].title, "Repeat B");
    }

    #[test]
    fn blog_id_from_bare_id() {
        assert_eq!(blog_id_from_input("youngwookim77"), "youngwookim77");
        assert_eq!(blog_id_from_input("  spaced  "), "spaced");
    }

    #[test]
    fn blog_id_from_url() {
        assert_eq!(
            blog_id_from_input("https://blog.naver.com/youngwookim77"),
            "youngwookim77"
        );
        assert_eq!(
            blog_id_from_input("https://blog.naver.com/youngwookim77/"),
            "youngwookim77"
        );
        assert_eq!(
            blog_id_from_input("https://blog.naver.com/youngwookim77?tab=1"),
            "youngwookim77"
        );
    }
}
