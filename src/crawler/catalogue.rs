//! SNPedia catalogue listing
//!
//! Pages through the `Category:Is_a_snp` members of the MediaWiki API, following
//! `cmcontinue` tokens until the listing ends. Requests share the crawler's client
//! and retry policy.

use crate::config::Config;
use crate::crawler::fetcher::{FetchOutcome, RetryingFetcher};
use crate::storage::KnownSnps;
use crate::OsGenomeError;
use serde::Deserialize;
use url::Url;

const SNP_CATEGORY: &str = "Category:Is_a_snp";

#[derive(Debug, Deserialize)]
struct CategoryResponse {
    #[serde(default)]
    query: Option<CategoryQuery>,
    #[serde(default, rename = "continue")]
    continuation: Option<Continuation>,
}

#[derive(Debug, Deserialize)]
struct CategoryQuery {
    #[serde(default)]
    categorymembers: Vec<CategoryMember>,
}

#[derive(Debug, Deserialize)]
struct CategoryMember {
    title: String,
}

#[derive(Debug, Deserialize)]
struct Continuation {
    cmcontinue: Option<String>,
}

fn listing_url(api_url: &Url, page_limit: u32, cmcontinue: Option<&str>) -> Url {
    let mut url = api_url.clone();
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("action", "query")
            .append_pair("list", "categorymembers")
            .append_pair("cmtitle", SNP_CATEGORY)
            .append_pair("cmlimit", &page_limit.to_string())
            .append_pair("format", "json");
        if let Some(token) = cmcontinue {
            query.append_pair("cmcontinue", token);
        }
    }
    url
}

/// Lists every identifier SNPedia has a page for
///
/// Fails when any page of the listing cannot be fetched or decoded; a partial
/// catalogue would silently skip identifiers.
pub async fn fetch_known_snps(
    fetcher: &RetryingFetcher,
    api_url: &Url,
    page_limit: u32,
) -> crate::Result<KnownSnps> {
    let mut known = KnownSnps::new();
    let mut cmcontinue: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let url = listing_url(api_url, page_limit, cmcontinue.as_deref());
        let report = fetcher.fetch(url.as_str()).await;
        let body = match report.outcome {
            FetchOutcome::Success(body) => body,
            other => {
                return Err(OsGenomeError::Catalogue(format!(
                    "listing page {} failed after {} attempts: {:?}",
                    pages + 1,
                    report.attempts,
                    other
                )))
            }
        };

        let response: CategoryResponse = serde_json::from_str(&body).map_err(|e| {
            OsGenomeError::Catalogue(format!("listing page {} is not valid JSON: {}", pages + 1, e))
        })?;
        pages += 1;

        if let Some(query) = response.query {
            for member in query.categorymembers {
                known.insert(&member.title);
            }
        }
        tracing::debug!("Catalogue page {}: {} identifiers so far", pages, known.len());

        let next = response.continuation.and_then(|c| c.cmcontinue);
        match next {
            Some(token) if cmcontinue.as_deref() != Some(token.as_str()) => {
                cmcontinue = Some(token);
            }
            Some(token) => {
                tracing::warn!("Catalogue continuation repeated ({}), stopping", token);
                break;
            }
            None => break,
        }
    }

    tracing::info!("Catalogue lists {} identifiers across {} pages", known.len(), pages);
    Ok(known)
}

/// Returns the cached catalogue, fetching and caching it on first use
pub async fn load_or_fetch_known_snps(
    config: &Config,
    fetcher: &RetryingFetcher,
) -> crate::Result<KnownSnps> {
    let path = config.catalogue_path();
    if let Some(known) = KnownSnps::load(&path)? {
        return Ok(known);
    }

    tracing::info!("No catalogue at {}, listing SNPedia", path.display());
    let known = fetch_known_snps(fetcher, &config.catalogue_url()?, config.catalogue.page_limit).await?;
    known.save(&path)?;
    Ok(known)
}
