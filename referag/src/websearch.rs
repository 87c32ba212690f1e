//! DuckDuckGo web search with LLM summarization.
//!
//! Complements the document corpus with live web results: HTML search with
//! bounded retries, optional page fetch, and one LLM call that answers the
//! query from the collected sources. Only available with the `websearch`
//! feature.
//!
//! Search failures never abort: every network path degrades to an empty
//! result list, and an empty list yields a fixed no-results message without
//! an LLM call.

use std::sync::Arc;
use std::time::Duration;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use referag_core::Llm;

use crate::config::RagConfig;
use crate::error::Result;

const SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Page content is truncated to this many characters before summarization.
const PAGE_CONTENT_CAP: usize = 5000;

/// Per-source content cap inside the summary prompt.
const PROMPT_CONTENT_CAP: usize = 2000;

/// Fixed summary when no results could be retrieved.
pub const NO_WEB_RESULTS: &str = "Web search returned no results. The search \
engine may be rate-limiting automated requests; try again in a few minutes \
or rephrase the query.";

/// One web search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchResult {
    /// Result title.
    pub title: String,
    /// Result URL.
    pub url: String,
    /// Search-engine snippet.
    pub snippet: String,
}

/// A completed search-and-summarize run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchAnswer {
    /// The original query.
    pub query: String,
    /// The raw search hits, without fetched page content.
    pub results: Vec<WebSearchResult>,
    /// The LLM-generated summary, or the fixed no-results message.
    pub summary: String,
}

/// Searches DuckDuckGo and summarizes the hits with the LLM.
pub struct WebSearcher {
    client: reqwest::Client,
    llm: Arc<dyn Llm>,
    results_count: usize,
    max_retries: usize,
}

impl WebSearcher {
    /// Build a searcher from the LLM capability and tuning knobs in `config`.
    pub fn new(llm: Arc<dyn Llm>, config: &RagConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self {
            client,
            llm,
            results_count: config.web_search_results,
            max_retries: config.web_search_max_retries,
        }
    }

    /// Search and summarize; `fetch_content` additionally pulls page bodies
    /// into the summary prompt.
    pub async fn search_and_summarize(
        &self,
        query: &str,
        fetch_content: bool,
    ) -> Result<WebSearchAnswer> {
        let results = self.search(query).await;
        if results.is_empty() {
            info!(query, "no web results, skipping LLM call");
            return Ok(WebSearchAnswer {
                query: query.to_string(),
                results,
                summary: NO_WEB_RESULTS.to_string(),
            });
        }

        let mut contents: Vec<Option<String>> = Vec::with_capacity(results.len());
        for result in &results {
            if fetch_content {
                contents.push(self.fetch_page(&result.url).await);
            } else {
                contents.push(None);
            }
        }

        let summary = self.summarize(query, &results, &contents).await?;
        info!(query, sources = results.len(), "web search summarized");
        Ok(WebSearchAnswer { query: query.to_string(), results, summary })
    }

    /// HTML search with bounded retries and increasing backoff. Degrades to
    /// an empty list on every failure path.
    async fn search(&self, query: &str) -> Vec<WebSearchResult> {
        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(attempt as u64 * 3);
                debug!(attempt, ?delay, "backing off before retry");
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .get(SEARCH_URL)
                .query(&[("q", query), ("kl", "us-en")])
                .send()
                .await;
            let html = match response {
                Ok(r) if r.status().is_success() => match r.text().await {
                    Ok(body) => body,
                    Err(e) => {
                        warn!(attempt, error = %e, "failed to read search response");
                        continue;
                    }
                },
                Ok(r) => {
                    warn!(attempt, status = %r.status(), "search returned bad status");
                    continue;
                }
                Err(e) => {
                    warn!(attempt, error = %e, "search request failed");
                    continue;
                }
            };

            let results = parse_results(&html, self.results_count);
            if !results.is_empty() {
                debug!(count = results.len(), "parsed search results");
                return results;
            }
            warn!(attempt, "no results parsed from search page");
        }
        Vec::new()
    }

    /// Fetch a result page and extract readable text, soft-failing to `None`.
    async fn fetch_page(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(url, error = %e, "page fetch failed");
                return None;
            }
        };
        if !response.status().is_success() {
            warn!(url, status = %response.status(), "page fetch returned bad status");
            return None;
        }
        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                warn!(url, error = %e, "failed to read page body");
                return None;
            }
        };

        let text = extract_readable_text(&body, PAGE_CONTENT_CAP);
        if text.is_empty() { None } else { Some(text) }
    }

    async fn summarize(
        &self,
        query: &str,
        results: &[WebSearchResult],
        contents: &[Option<String>],
    ) -> Result<String> {
        let context = results
            .iter()
            .zip(contents.iter())
            .enumerate()
            .map(|(i, (r, content))| {
                let mut part = format!(
                    "**Source {}: {}**\nURL: {}\nSnippet: {}\n",
                    i + 1,
                    r.title,
                    r.url,
                    r.snippet
                );
                if let Some(content) = content {
                    let capped: String = content.chars().take(PROMPT_CONTENT_CAP).collect();
                    part.push_str(&format!("Content: {capped}\n"));
                }
                part
            })
            .collect::<Vec<_>>()
            .join("\n---\n\n");

        let prompt = format!(
            "Answer the user's question from the web search results below.\n\
             \n\
             QUESTION:\n\
             {query}\n\
             \n\
             SEARCH RESULTS:\n\
             {context}\n\
             \n\
             ANSWER REQUIREMENTS:\n\
             1. Give a detailed, structured answer using all relevant sources\n\
             2. Cite sources inline as [1], [2], and so on\n\
             3. Close with a \"Sources\" section listing title and URL per source\n\
             4. Answer in the language of the question\n\
             \n\
             ANSWER:"
        );
        Ok(self.llm.complete("", &prompt).await?)
    }
}

/// Parse DuckDuckGo's HTML results page, trying the container classes the
/// engine has used across layout revisions.
fn parse_results(html: &str, cap: usize) -> Vec<WebSearchResult> {
    let document = Html::parse_document(html);
    let containers = ["div.result__body", "div.links_main", "div.web-result"];
    let title_selectors = ["a.result__a", "a.result-link"];
    let snippet_selectors = ["a.result__snippet", "div.result__snippet", "div.snippet"];

    let mut results = Vec::new();
    for container in containers {
        let Ok(selector) = Selector::parse(container) else { continue };
        for element in document.select(&selector) {
            let title_el = title_selectors
                .iter()
                .filter_map(|s| Selector::parse(s).ok())
                .find_map(|s| element.select(&s).next());
            let Some(title_el) = title_el else { continue };

            let title = title_el.text().collect::<String>().trim().to_string();
            let url = title_el.value().attr("href").unwrap_or_default().to_string();
            if title.is_empty() || url.is_empty() {
                continue;
            }

            let snippet = snippet_selectors
                .iter()
                .filter_map(|s| Selector::parse(s).ok())
                .find_map(|s| element.select(&s).next())
                .map(|el| el.text().collect::<String>().trim().to_string())
                .unwrap_or_default();

            results.push(WebSearchResult { title, url, snippet });
            if results.len() >= cap {
                return results;
            }
        }
        if !results.is_empty() {
            break;
        }
    }
    results
}

/// Text from content-bearing elements, capped at `max_chars`.
fn extract_readable_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("p, h1, h2, h3, li, td") else {
        return String::new();
    };

    let mut text = String::new();
    for element in document.select(&selector) {
        let piece = element.text().collect::<String>();
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(piece);
        // Stop only once the cap is exceeded, so the marker below fires
        // whenever content was actually cut, including an exact landing
        // followed by more elements.
        if text.chars().count() > max_chars {
            break;
        }
    }

    if text.chars().count() > max_chars {
        let mut capped: String = text.chars().take(max_chars).collect();
        capped.push_str("...");
        capped
    } else {
        text
    }
}
