// Collection resolution: reuse the named collection from a previous run
// (emptied first) or create it.

use tracing::info;

use crate::api::{ApiError, SaploApi};
use crate::model::{Collection, Language};

/// Make sure a collection named `name` exists and holds no texts.
///
/// Issues one `collection.list` followed by either one `collection.reset`
/// or one `collection.create`. Errors are returned as-is.
pub fn resolve_collection<A: SaploApi + ?Sized>(
    api: &A,
    name: &str,
    language: Language,
) -> Result<Collection, ApiError> {
    info!("checking for an existing collection named '{}'", name);
    let collections = api.list_collections()?;

    if let Some(existing) = collections.into_iter().find(|c| c.name == name) {
        info!(
            collection_id = %existing.id,
            "found collection '{}' from an earlier run, resetting it", name
        );
        api.reset_collection(existing.id)?;
        return Ok(existing);
    }

    info!("no collection named '{}', creating one", name);
    let created = api.create_collection(name, language)?;
    info!(collection_id = %created.id, "created collection");
    Ok(created)
}
