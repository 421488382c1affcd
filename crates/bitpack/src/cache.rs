//! Process-wide cache of compiled layouts, keyed by type identity.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::{errors::Error, field::Packable, layout::Layout};

static LAYOUTS: LazyLock<RwLock<HashMap<TypeId, Arc<Layout>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Returns the layout for `T`, compiling and installing it on first use.
/// Compilation failures are returned to the caller and never cached; a hit
/// performs no allocation.
pub(crate) fn layout_for<T: Packable>() -> Result<Arc<Layout>, Error> {
    let key = TypeId::of::<T>();
    {
        let cache = LAYOUTS.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(layout) = cache.get(&key) {
            return Ok(Arc::clone(layout));
        }
    }

    // Compile outside any lock. Two threads may race here; the layout for a
    // type is deterministic, so the loser's work is simply discarded.
    let layout = Arc::new(Layout::compile(T::FIELDS)?);
    let mut cache = LAYOUTS.write().unwrap_or_else(PoisonError::into_inner);
    Ok(Arc::clone(cache.entry(key).or_insert(layout)))
}
