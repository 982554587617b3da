use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies an owned entity instance in the inventory arena.
    pub struct ItemUid;
}

/// Identifies an item definition in the catalog. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogId(pub u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_id_equality() {
        assert_eq!(CatalogId(0), CatalogId(0));
        assert_ne!(CatalogId(0), CatalogId(1));
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(CatalogId(0), "miner_basic");
        assert_eq!(map[&CatalogId(0)], "miner_basic");
    }
}
