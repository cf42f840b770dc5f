//! The closed set of brand ledgers and a fixed-slot table keyed by brand.
//!
//! Brand order is externally observable: it drives `brandsPurchased`
//! ordering, export column order and the `totalPorMarca` map.

use std::ops::{Index, IndexMut};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::ReconError;
use crate::normalize::normalize_column_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Brand {
    OBoticario,
    Eudora,
    AuAmigos,
    Oui,
    Qdb,
}

impl Brand {
    /// Every brand, in reconciliation order.
    pub const ALL: [Brand; 5] = [
        Brand::OBoticario,
        Brand::Eudora,
        Brand::AuAmigos,
        Brand::Oui,
        Brand::Qdb,
    ];

    /// Display label, as it appears in results and exports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::OBoticario => "oBoticário",
            Self::Eudora => "Eudora",
            Self::AuAmigos => "AuAmigos",
            Self::Oui => "O.U.I",
            Self::Qdb => "QDB",
        }
    }

    /// Slot in `ALL` and in `PerBrand`.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Parse a brand from its label or any spelling that folds to the same
    /// slug (`oboticario`, `oui`, `qdb`, ...).
    pub fn from_name(name: &str) -> Result<Brand, ReconError> {
        let slug = normalize_column_name(name);
        Brand::ALL
            .into_iter()
            .find(|b| normalize_column_name(b.label()) == slug)
            .ok_or_else(|| ReconError::UnknownBrand(name.to_string()))
    }
}

impl std::fmt::Display for Brand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Brand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One value per brand, stored in brand order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerBrand<T>([T; 5]);

impl<T> PerBrand<T> {
    pub fn from_fn(mut f: impl FnMut(Brand) -> T) -> Self {
        PerBrand(Brand::ALL.map(&mut f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Brand, &T)> {
        Brand::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<Brand> for PerBrand<T> {
    type Output = T;

    fn index(&self, brand: Brand) -> &T {
        &self.0[brand.index()]
    }
}

impl<T> IndexMut<Brand> for PerBrand<T> {
    fn index_mut(&mut self, brand: Brand) -> &mut T {
        &mut self.0[brand.index()]
    }
}

impl<T: Serialize> Serialize for PerBrand<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Brand::ALL.len()))?;
        for (brand, value) in self.iter() {
            map.serialize_entry(brand.label(), value)?;
        }
        map.end()
    }
}
