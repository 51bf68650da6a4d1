// src/model/echelon.rs

use serde::Serialize;
use std::fmt;

use crate::NUM_ECHELONS;

/// A position in the linear chain. Goods flow from `Supplier` down to
/// `Retailer`, orders flow the other way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Echelon {
    Retailer,
    Distributor,
    Manufacturer,
    Supplier,
}

impl Echelon {
    /// All echelons, most downstream first. The position in this array is the
    /// echelon's index in every per-echelon vector.
    pub const ALL: [Echelon; NUM_ECHELONS] = [
        Echelon::Retailer,
        Echelon::Distributor,
        Echelon::Manufacturer,
        Echelon::Supplier,
    ];

    pub fn index(self) -> usize {
        match self {
            Echelon::Retailer => 0,
            Echelon::Distributor => 1,
            Echelon::Manufacturer => 2,
            Echelon::Supplier => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Echelon> {
        Echelon::ALL.get(index).copied()
    }

    /// The echelon this one ships to, `None` for the retailer (it ships to the
    /// end customer).
    pub fn downstream(self) -> Option<Echelon> {
        self.index().checked_sub(1).and_then(Echelon::from_index)
    }

    /// The echelon this one orders from, `None` for the supplier (it orders
    /// from an unbounded external source).
    pub fn upstream(self) -> Option<Echelon> {
        Echelon::from_index(self.index() + 1)
    }
}

impl fmt::Display for Echelon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
