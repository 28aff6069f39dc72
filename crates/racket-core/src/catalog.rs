//! The static game catalog: businesses, crimes, weapons, territories.
//!
//! Loaded once when a session is created and never mutated afterwards.
//! The YAML shape is four flat lists; lookups go through typed maps so a
//! dangling id surfaces as a [`CatalogError`] instead of a silent miss.
//! [`Catalog::starter`] bundles a small balanced catalog for tests and
//! demos so neither needs a fixture file.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use racket_types::{
    BusinessDefinition, BusinessId, CrimeDefinition, CrimeId, TerritoryDefinition, TerritoryId,
    WeaponDefinition, WeaponId,
};

/// Errors raised while loading or querying the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Failed to read the catalog file.
    #[error("failed to read catalog file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse the catalog YAML.
    #[error("failed to parse catalog YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        #[from]
        source: serde_yml::Error,
    },

    /// A business id with no catalog entry.
    #[error("unknown business kind: {0}")]
    UnknownBusiness(BusinessId),

    /// A crime id with no catalog entry.
    #[error("unknown crime: {0}")]
    UnknownCrime(CrimeId),

    /// A weapon id with no catalog entry.
    #[error("unknown weapon: {0}")]
    UnknownWeapon(WeaponId),

    /// A territory id with no catalog entry.
    #[error("unknown territory: {0}")]
    UnknownTerritory(TerritoryId),
}

/// The YAML shape of a catalog file: four flat definition lists.
#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    businesses: Vec<BusinessDefinition>,
    #[serde(default)]
    crimes: Vec<CrimeDefinition>,
    #[serde(default)]
    weapons: Vec<WeaponDefinition>,
    #[serde(default)]
    territories: Vec<TerritoryDefinition>,
}

/// The loaded, read-only game catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    businesses: BTreeMap<BusinessId, BusinessDefinition>,
    crimes: BTreeMap<CrimeId, CrimeDefinition>,
    weapons: BTreeMap<WeaponId, WeaponDefinition>,
    territories: BTreeMap<TerritoryId, TerritoryDefinition>,
}

impl Catalog {
    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read, or
    /// [`CatalogError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a catalog from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yml::from_str(yaml)?;
        Ok(Self::from_definitions(
            file.businesses,
            file.crimes,
            file.weapons,
            file.territories,
        ))
    }

    /// Build a catalog from in-memory definition lists.
    pub fn from_definitions(
        businesses: Vec<BusinessDefinition>,
        crimes: Vec<CrimeDefinition>,
        weapons: Vec<WeaponDefinition>,
        territories: Vec<TerritoryDefinition>,
    ) -> Self {
        Self {
            businesses: businesses.into_iter().map(|d| (d.id, d)).collect(),
            crimes: crimes.into_iter().map(|d| (d.id, d)).collect(),
            weapons: weapons.into_iter().map(|d| (d.id, d)).collect(),
            territories: territories.into_iter().map(|d| (d.id, d)).collect(),
        }
    }

    /// Look up a business kind.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownBusiness`] for an unlisted id.
    pub fn business(&self, id: BusinessId) -> Result<&BusinessDefinition, CatalogError> {
        self.businesses
            .get(&id)
            .ok_or(CatalogError::UnknownBusiness(id))
    }

    /// Look up a crime.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownCrime`] for an unlisted id.
    pub fn crime(&self, id: CrimeId) -> Result<&CrimeDefinition, CatalogError> {
        self.crimes.get(&id).ok_or(CatalogError::UnknownCrime(id))
    }

    /// Look up a weapon.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownWeapon`] for an unlisted id.
    pub fn weapon(&self, id: WeaponId) -> Result<&WeaponDefinition, CatalogError> {
        self.weapons.get(&id).ok_or(CatalogError::UnknownWeapon(id))
    }

    /// Look up a territory definition.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownTerritory`] for an unlisted id.
    pub fn territory(&self, id: TerritoryId) -> Result<&TerritoryDefinition, CatalogError> {
        self.territories
            .get(&id)
            .ok_or(CatalogError::UnknownTerritory(id))
    }

    /// All business kinds, in id order.
    pub fn businesses(&self) -> impl Iterator<Item = &BusinessDefinition> {
        self.businesses.values()
    }

    /// All crimes, in id order.
    pub fn crimes(&self) -> impl Iterator<Item = &CrimeDefinition> {
        self.crimes.values()
    }

    /// All weapons, in id order.
    pub fn weapons(&self) -> impl Iterator<Item = &WeaponDefinition> {
        self.weapons.values()
    }

    /// All territory definitions, in id order.
    pub fn territories(&self) -> impl Iterator<Item = &TerritoryDefinition> {
        self.territories.values()
    }

    /// The full weapon table, keyed by id, for combat power computation.
    pub const fn arsenal(&self) -> &BTreeMap<WeaponId, WeaponDefinition> {
        &self.weapons
    }

    /// A small built-in catalog for tests and demos.
    ///
    /// Two businesses, two crimes, two weapons, two territories, with
    /// short durations so test clocks stay readable.
    pub fn starter() -> Self {
        let businesses = vec![
            BusinessDefinition {
                id: BusinessId::new(),
                name: "Numbers Game".to_owned(),
                cost: 200,
                base_rate_per_hour: 60,
                build_duration_secs: 60,
                upgrade_base_cost: 100,
                upgrade_duration_secs: 120,
                max_level: 5,
                required_level: 1,
            },
            BusinessDefinition {
                id: BusinessId::new(),
                name: "Speakeasy".to_owned(),
                cost: 800,
                base_rate_per_hour: 240,
                build_duration_secs: 300,
                upgrade_base_cost: 400,
                upgrade_duration_secs: 600,
                max_level: 10,
                required_level: 3,
            },
        ];
        let crimes = vec![
            CrimeDefinition {
                id: CrimeId::new(),
                name: "Pickpocketing".to_owned(),
                energy_cost: 5,
                duration_secs: 30,
                success_rate: 90,
                base_reward: 25,
                base_xp: 10,
                required_level: 1,
                cooldown_secs: 60,
            },
            CrimeDefinition {
                id: CrimeId::new(),
                name: "Warehouse Heist".to_owned(),
                energy_cost: 25,
                duration_secs: 600,
                success_rate: 60,
                base_reward: 400,
                base_xp: 80,
                required_level: 4,
                cooldown_secs: 1_800,
            },
        ];
        let weapons = vec![
            WeaponDefinition {
                id: WeaponId::new(),
                name: "Brass Knuckles".to_owned(),
                power: 3,
                cost: 50,
            },
            WeaponDefinition {
                id: WeaponId::new(),
                name: "Tommy Gun".to_owned(),
                power: 10,
                cost: 450,
            },
        ];
        let territories = vec![
            TerritoryDefinition {
                id: TerritoryId::new(),
                name: "Docklands".to_owned(),
                defender_force: 10,
                income_rate_per_hour: 120,
            },
            TerritoryDefinition {
                id: TerritoryId::new(),
                name: "Market Row".to_owned(),
                defender_force: 25,
                income_rate_per_hour: 300,
            },
        ];
        Self::from_definitions(businesses, crimes, weapons, territories)
    }
}
