//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every entity in the simulation has a strongly-typed ID to prevent
//! accidental mixing of identifiers at compile time. All IDs use UUID v7
//! (time-ordered) so the backing store can index them efficiently.
//!
//! Catalog entries (business kinds, crimes, weapons, territories) and live
//! entities (players, owned assets) share the same scheme; only owned
//! business instances get a separate [`AssetId`] distinct from the
//! [`BusinessId`] of their catalog kind.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a player.
    PlayerId
}

define_id! {
    /// Unique identifier for an owned business instance.
    AssetId
}

define_id! {
    /// Unique identifier for a business kind in the static catalog.
    BusinessId
}

define_id! {
    /// Unique identifier for a territory on the map.
    TerritoryId
}

define_id! {
    /// Unique identifier for a crime definition in the static catalog.
    CrimeId
}

define_id! {
    /// Unique identifier for a weapon definition in the static catalog.
    WeaponId
}

define_id! {
    /// Unique identifier for a ledger entry (balance movement record).
    LedgerEntryId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let player = PlayerId::new();
        let asset = AssetId::new();
        // These are different types — the compiler enforces no mixing.
        assert_ne!(player.into_inner(), Uuid::nil());
        assert_ne!(asset.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = CrimeId::new();
        let json = serde_json::to_string(&original).ok();
        assert!(json.is_some());
        let restored: Result<CrimeId, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert!(restored.is_ok());
    }

    #[test]
    fn id_display_matches_uuid() {
        let id = TerritoryId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }
}
