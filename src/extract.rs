use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

// The listing endpoint returns loosely-structured text, not a stable JSON
// schema; each field is scanned independently. Index i of the title list is
// assumed to line up with index i of the other two.
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""titleText":"([^"]+)""#).unwrap());
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""addDate":"([^"]+)""#).unwrap());
static LOG_NO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""logNo":"([^"]+)""#).unwrap());

/// Host used for constructed permalinks, independent of where the listing
/// pages are fetched from.
pub const PERMALINK_HOST: &str = "https://blog.naver.com";

/// One post from the listing: title, date as the endpoint displays it, and
/// the permalink. Dedup compares the whole tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PostRecord {
    pub title: String,
    pub date: String,
    pub link: String,
}

/// Extract all posts from one listing page body, in order of appearance.
///
/// Dates and log numbers are paired with titles by position; when their
/// lists run short the field is left empty rather than dropping the post.
pub fn extract_posts(body: &str, blog_id: &str) -> Vec<PostRecord> {
    let titles = find_all(&TITLE_RE, body);
    let dates = find_all(&DATE_RE, body);
    let log_nos = find_all(&LOG_NO_RE, body);

    titles
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let date = dates.get(i).map(|d| d.to_string()).unwrap_or_default();
            let link = log_nos
                .get(i)
                .map(|log_no| format!("{PERMALINK_HOST}/{blog_id}/{log_no}"))
                .unwrap_or_default();
            PostRecord {
                title: clean_title(raw),
                date,
                link,
            }
        })
        .collect()
}

/// Percent-decode a raw title, collapse embedded newlines to a single space,
/// drop stray backslashes, trim.
pub fn clean_title(raw: &str) -> String {
    let decoded = match urlencoding::decode(raw) {
        Ok(cow) => cow.into_owned(),
        // Percent-data that isn't valid UTF-8; keep the raw text.
        Err(_) => raw.to_string(),
    };
    decoded
        .replace('\n', " ")
        .replace('\\', "")
        .trim()
        .to_string()
}

/// Drop structurally identical records, keeping the first occurrence.
pub fn dedup_posts(posts: Vec<PostRecord>) -> Vec<PostRecord> {
    let mut seen = HashSet::with_capacity(posts.len());
    posts.into_iter().filter(|p| seen.insert(p.clone())).collect()
}

fn find_all<'a>(re: &Regex, body: &'a str) -> Vec<&'a str> {
    re.captures_iter(body)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect()
}

// ── Tests ──
