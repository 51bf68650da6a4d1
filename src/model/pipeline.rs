// src/model/pipeline.rs

use serde::Serialize;

use crate::Int;

/// Goods in transit toward a single echelon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shipment {
    pub quantity: Int,
    pub periods_remaining: u32,
}

impl Shipment {
    pub fn new(quantity: Int, periods_remaining: u32) -> Self {
        Self {
            quantity,
            periods_remaining,
        }
    }
}

/// Unordered set of shipments owned by the echelon they are headed to.
///
/// Unlike a fixed-length delay line, each shipment carries its own delay so
/// lead times may vary from one period to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pipeline {
    shipments: Vec<Shipment>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_shipments(shipments: Vec<Shipment>) -> Self {
        Self { shipments }
    }

    /// Advance every shipment by one period and remove the ones that have
    /// arrived. Call this at the START of the period.
    ///
    /// Returns the total quantity delivered. Delays are floored at 0, so a
    /// shipment queued with a delay of 0 arrives on the next call.
    pub fn advance(&mut self) -> Int {
        for shipment in self.shipments.iter_mut() {
            shipment.periods_remaining = shipment.periods_remaining.saturating_sub(1);
        }
        let delivered = self
            .shipments
            .iter()
            .filter(|s| s.periods_remaining == 0)
            .map(|s| s.quantity)
            .sum();
        self.shipments.retain(|s| s.periods_remaining > 0);
        delivered
    }

    /// Queue a new shipment.
    pub fn push(&mut self, quantity: Int, delay: u32) {
        self.shipments.push(Shipment::new(quantity, delay));
    }

    /// Total quantity still in transit.
    pub fn in_transit(&self) -> Int {
        self.shipments.iter().map(|s| s.quantity).sum()
    }

    pub fn shipments(&self) -> &[Shipment] {
        &self.shipments
    }

    pub fn len(&self) -> usize {
        self.shipments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shipments.is_empty()
    }
}
