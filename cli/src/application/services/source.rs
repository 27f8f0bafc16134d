//! Source resolution: find a buildable agent source tree.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::{Checkout, LocalFs, SourceFetcher};
use crate::domain::source::ENTRY_POINT;
use crate::domain::{ProvisionError, SourceLocation, SourceOrigin, SourceSearch};

/// A resolved source tree.
///
/// When the tree is a remote checkout, this value owns the temporary
/// directory; dropping it deletes the checkout.
pub struct ResolvedSource {
    pub location: SourceLocation,
    // Held only for its Drop.
    #[allow(dead_code)]
    checkout: Option<Checkout>,
}

/// Locate an agent source tree.
///
/// Local candidates are checked lazily in priority order and the first one
/// containing [`ENTRY_POINT`] wins. Only when none matches is `repo`
/// shallow-cloned into a temporary directory and checked the same way.
///
/// # Errors
///
/// Returns [`ProvisionError::SourceNotFound`] if no local candidate matches and
/// the clone either fails or lacks the entry point.
pub async fn resolve_source(
    host: &(impl LocalFs + SourceFetcher),
    search: &SourceSearch,
    repo: &str,
) -> Result<ResolvedSource> {
    let has_entry_point = |root: &Path| host.exists(&root.join(ENTRY_POINT));

    if let Some((root, origin)) = search.candidates().find(|(root, _)| has_entry_point(root)) {
        tracing::info!(root = %root.display(), %origin, "using local agent source");
        return Ok(ResolvedSource {
            location: SourceLocation { root, origin },
            checkout: None,
        });
    }

    let not_found = || ProvisionError::SourceNotFound {
        entry_point: ENTRY_POINT,
        searched: search.candidate_count(),
    };

    tracing::info!(%repo, "no local agent source, cloning");
    let checkout = match host.shallow_clone(repo).await {
        Ok(checkout) => checkout,
        Err(e) => {
            tracing::warn!(%repo, error = %format!("{e:#}"), "clone failed");
            return Err(not_found().into());
        }
    };

    if !has_entry_point(&checkout.root) {
        tracing::warn!(
            root = %checkout.root.display(),
            "checkout has no {ENTRY_POINT}"
        );
        // `checkout` drops here and removes the temporary directory.
        return Err(not_found().into());
    }

    Ok(ResolvedSource {
        location: SourceLocation {
            root: checkout.root.clone(),
            origin: SourceOrigin::RemoteCheckout,
        },
        checkout: Some(checkout),
    })
}
