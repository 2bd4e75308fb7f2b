//! Product search command.

use std::sync::Arc;

use kanty_storefront::StorefrontConfig;
use kanty_storefront::search::{HttpProductSearch, InstantSearch, MIN_QUERY_CHARS};

use super::CommandError;

/// Run `query` through the instant-search debouncer and print the results.
///
/// # Errors
///
/// Returns `CommandError` if the search endpoint cannot be built.
#[allow(clippy::print_stdout)]
pub async fn run(config: &StorefrontConfig, query: &str) -> Result<(), CommandError> {
    let backend = HttpProductSearch::new(&config.base_url)?;
    let mut search = InstantSearch::new(Arc::new(backend));

    if !search.on_input(query) {
        tracing::warn!(min = MIN_QUERY_CHARS, "Query too short, nothing searched");
        return Ok(());
    }

    let Some(task) = search.take_pending() else {
        return Ok(());
    };
    match task.await {
        Ok(Some(results)) => {
            let pretty = serde_json::to_string_pretty(&results).unwrap_or_else(|_| results.to_string());
            println!("{pretty}");
        }
        // Failure already logged by the search task
        Ok(None) => {}
        Err(e) => tracing::error!(error = %e, "Search task failed"),
    }
    Ok(())
}
