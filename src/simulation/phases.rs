// src/simulation/phases.rs
//
// The four phases of one period, in the order the engine runs them:
// arrival -> fulfilment -> ordering -> costing. Each takes only the sub-state
// it touches so it can be exercised on its own.

use crate::model::echelon::Echelon;
use crate::model::pipeline::Pipeline;
use crate::{Int, State, NUM_ECHELONS};

pub type Pipelines = [Pipeline; NUM_ECHELONS];

/// Phase 1: advance every pipeline and book arrivals into inventory.
///
/// Returns the quantity delivered to each echelon.
pub fn receive_shipments(
    inventory: &mut State,
    pipelines: &mut Pipelines,
) -> [Int; NUM_ECHELONS] {
    let mut delivered = [0; NUM_ECHELONS];
    for (i, pipeline) in pipelines.iter_mut().enumerate() {
        delivered[i] = pipeline.advance();
        inventory[i] += delivered[i];
    }
    delivered
}

/// Phase 2: every echelon serves the order it received.
///
/// The full order is always taken off inventory, so a shortfall shows up as
/// negative inventory (the backlog). Only the portion actually on hand is
/// shipped: echelon `i > 0` ships into pipeline `i - 1` with `lead_time`,
/// the retailer ships to the end customer.
///
/// Returns the quantity shipped by each echelon.
pub fn fulfill_orders(
    inventory: &mut State,
    pipelines: &mut Pipelines,
    orders_received: &State,
    lead_time: u32,
) -> [Int; NUM_ECHELONS] {
    let mut shipped = [0; NUM_ECHELONS];
    for echelon in Echelon::ALL {
        let i = echelon.index();
        let order = orders_received[i];
        let on_hand = inventory[i];
        inventory[i] -= order;

        let shipment = if on_hand >= order {
            Some(order)
        } else if on_hand > 0 {
            Some(on_hand)
        } else {
            None
        };

        if let Some(quantity) = shipment {
            shipped[i] = quantity;
            if let Some(downstream) = echelon.downstream() {
                pipelines[downstream.index()].push(quantity, lead_time);
            }
        }
    }
    shipped
}

/// Phase 3: every echelon orders `incoming + adjustment` from upstream.
///
/// Placement runs retailer first and writes straight into `orders_received`,
/// so an echelon's incoming order here is the one its downstream neighbour
/// placed a moment ago. The supplier's order goes into its own pipeline.
/// Negative orders are clamped to 0.
///
/// Returns the order placed by each echelon.
pub fn place_orders(
    orders_received: &mut State,
    pipelines: &mut Pipelines,
    adjustments: &State,
    lead_time: u32,
) -> [Int; NUM_ECHELONS] {
    let mut placed = [0; NUM_ECHELONS];
    for echelon in Echelon::ALL {
        let i = echelon.index();
        let order = (orders_received[i] + adjustments[i]).max(0);
        placed[i] = order;
        match echelon.upstream() {
            Some(upstream) => orders_received[upstream.index()] = order,
            None => pipelines[i].push(order, lead_time),
        }
    }
    placed
}

/// Phase 4: holding cost on positive inventory plus backlog cost on negative.
pub fn period_cost(inventory: &State, holding_cost: f64, backlog_cost: f64) -> f64 {
    inventory
        .iter()
        .map(|&inv| {
            if inv > 0 {
                holding_cost * inv as f64
            } else {
                backlog_cost * inv.unsigned_abs() as f64
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::pipeline::Shipment;

    fn seeded_pipelines() -> Pipelines {
        std::array::from_fn(|_| {
            Pipeline::from_shipments(vec![Shipment::new(4, 1), Shipment::new(4, 2)])
        })
    }

    #[test]
    fn test_receive_shipments_books_due_arrivals() {
        let mut inventory = [12; NUM_ECHELONS];
        let mut pipelines = seeded_pipelines();

        let delivered = receive_shipments(&mut inventory, &mut pipelines);

        assert_eq!(delivered, [4; NUM_ECHELONS]);
        assert_eq!(inventory, [16; NUM_ECHELONS]);
        for pipeline in &pipelines {
            assert_eq!(pipeline.shipments(), &[Shipment::new(4, 1)]);
        }
    }

    #[test]
    fn test_fulfill_ships_downstream_and_backlogs_shortfall() {
        let mut inventory = [16, 3, -2, 10];
        let mut pipelines: Pipelines = Default::default();
        let orders = [15, 5, 4, 0];

        let shipped = fulfill_orders(&mut inventory, &mut pipelines, &orders, 2);

        assert_eq!(inventory, [1, -2, -6, 10]);
        // Retailer ships to the customer, distributor ships what it had,
        // manufacturer had nothing, supplier covers a zero order.
        assert_eq!(shipped, [15, 3, 0, 0]);
        assert_eq!(pipelines[0].shipments(), &[Shipment::new(3, 2)]);
        assert!(pipelines[1].is_empty());
        assert_eq!(pipelines[2].shipments(), &[Shipment::new(0, 2)]);
        assert!(pipelines[3].is_empty());
    }

    #[test]
    fn test_shipments_and_orders_follow_chain_neighbours() {
        for echelon in Echelon::ALL {
            let mut inventory = [10; NUM_ECHELONS];
            let mut pipelines: Pipelines = Default::default();
            let mut orders = [0; NUM_ECHELONS];
            orders[echelon.index()] = 3;

            fulfill_orders(&mut inventory, &mut pipelines, &orders, 1);
            let receiving: Vec<usize> = (0..NUM_ECHELONS)
                .filter(|&i| !pipelines[i].is_empty())
                .collect();
            match echelon.downstream() {
                Some(downstream) => {
                    assert!(receiving.contains(&downstream.index()));
                    assert_eq!(pipelines[downstream.index()].in_transit(), 3);
                }
                None => assert_eq!(pipelines[0].in_transit(), 0),
            }
        }

        let mut orders = [4, 0, 0, 0];
        let mut pipelines: Pipelines = Default::default();
        place_orders(&mut orders, &mut pipelines, &[1, 0, 0, 0], 2);
        let mut echelon = Echelon::Retailer;
        while let Some(upstream) = echelon.upstream() {
            assert_eq!(orders[upstream.index()], 5);
            echelon = upstream;
        }
        assert_eq!(echelon, Echelon::Supplier);
        assert_eq!(pipelines[Echelon::Supplier.index()].in_transit(), 5);
    }

    #[test]
    fn test_place_orders_cascades_upstream() {
        let mut orders = [15, 0, 0, 0];
        let mut pipelines: Pipelines = Default::default();

        let placed = place_orders(&mut orders, &mut pipelines, &[1, 2, 1, 0], 3);

        assert_eq!(placed, [16, 18, 19, 19]);
        assert_eq!(orders, [15, 16, 18, 19]);
        assert_eq!(pipelines[3].shipments(), &[Shipment::new(19, 3)]);
        assert!(pipelines[..3].iter().all(Pipeline::is_empty));
    }

    #[test]
    fn test_place_orders_clamps_negative_orders() {
        let mut orders = [2, 0, 0, 0];
        let mut pipelines: Pipelines = Default::default();

        let placed = place_orders(&mut orders, &mut pipelines, &[-5, 0, 3, -10], 1);

        assert_eq!(placed, [0, 0, 3, 0]);
        assert_eq!(pipelines[3].in_transit(), 0);
    }

    #[test]
    fn test_period_cost_weights_backlog_double() {
        assert_eq!(period_cost(&[1, 16, 16, 16], 1.0, 2.0), 49.0);
        assert_eq!(period_cost(&[-5, 5, 5, 5], 1.0, 2.0), 25.0);
        assert_eq!(period_cost(&[0; NUM_ECHELONS], 1.0, 2.0), 0.0);
    }

    #[test]
    fn test_units_are_conserved_across_phases() {
        let demand = [15, 10, 8, 14, 9, 3, 13, 2, 13, 11];
        let lead_times = [2, 0, 2, 4, 4, 4, 0, 2, 4, 1];
        let adjustments = [1, 0, 3, 2];

        let mut inventory = [12; NUM_ECHELONS];
        let mut pipelines = seeded_pipelines();
        let mut orders = [0; NUM_ECHELONS];

        // Units that entered each echelon's pipeline, starting with the seeds.
        let mut dispatched = [8; NUM_ECHELONS];
        let mut delivered = [0; NUM_ECHELONS];
        let mut served = [0; NUM_ECHELONS];

        for t in 0..demand.len() {
            let arrived = receive_shipments(&mut inventory, &mut pipelines);
            orders[0] = demand[t];
            let shipped = fulfill_orders(&mut inventory, &mut pipelines, &orders, lead_times[t]);
            for i in 0..NUM_ECHELONS {
                served[i] += orders[i];
                delivered[i] += arrived[i];
                if i > 0 {
                    dispatched[i - 1] += shipped[i];
                }
            }
            let placed = place_orders(&mut orders, &mut pipelines, &adjustments, lead_times[t]);
            dispatched[3] += placed[3];
        }

        for i in 0..NUM_ECHELONS {
            assert_eq!(delivered[i] + pipelines[i].in_transit(), dispatched[i]);
            assert_eq!(inventory[i], 12 + delivered[i] - served[i]);
        }
    }
}
