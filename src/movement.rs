//! Stock movement events consumed by the engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Product identifier assigned by the surrounding inventory system.
pub type ProductId = u64;

/// Warehouse identifier assigned by the surrounding inventory system.
pub type WarehouseId = u64;

/// Movement identifier assigned by the surrounding inventory system.
pub type MovementId = u64;

/// Kind of stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementKind {
    /// Goods received from a supplier
    Receipt,
    /// Customer sale
    Sale,
    /// Manual stock correction
    Adjustment,
    /// Transfer between warehouses
    Transfer,
    /// Quantity reserved for a pending order
    Reservation,
}

/// Immutable stock movement event.
///
/// Created by the surrounding inventory system and ordered by timestamp;
/// the engine only ever reads these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub timestamp: DateTime<Utc>,
    /// Signed quantity delta. Outbound movements carry a negative sign.
    pub quantity: i64,
    pub kind: MovementKind,
}

impl StockMovement {
    /// Demand consumed by this movement, in units.
    ///
    /// Sales always count as demand regardless of sign convention.
    /// Transfers count only when outbound. Adjustments contribute their
    /// stock-decreasing magnitude, so an upward correction offsets
    /// demand. Receipts and reservations are supply-side and contribute
    /// nothing.
    pub fn demand_effect(&self) -> f64 {
        match self.kind {
            MovementKind::Sale => self.quantity.unsigned_abs() as f64,
            MovementKind::Transfer => {
                if self.quantity < 0 {
                    self.quantity.unsigned_abs() as f64
                } else {
                    0.0
                }
            }
            MovementKind::Adjustment => -(self.quantity as f64),
            MovementKind::Receipt | MovementKind::Reservation => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn movement(kind: MovementKind, quantity: i64) -> StockMovement {
        StockMovement {
            id: 1,
            product_id: 42,
            warehouse_id: 7,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            quantity,
            kind,
        }
    }

    #[test]
    fn sales_count_as_demand_regardless_of_sign() {
        assert_eq!(movement(MovementKind::Sale, -12).demand_effect(), 12.0);
        assert_eq!(movement(MovementKind::Sale, 12).demand_effect(), 12.0);
    }

    #[test]
    fn only_outbound_transfers_count() {
        assert_eq!(movement(MovementKind::Transfer, -8).demand_effect(), 8.0);
        assert_eq!(movement(MovementKind::Transfer, 8).demand_effect(), 0.0);
    }

    #[test]
    fn adjustments_are_signed() {
        assert_eq!(movement(MovementKind::Adjustment, -5).demand_effect(), 5.0);
        assert_eq!(movement(MovementKind::Adjustment, 5).demand_effect(), -5.0);
    }

    #[test]
    fn supply_side_kinds_contribute_nothing() {
        assert_eq!(movement(MovementKind::Receipt, 100).demand_effect(), 0.0);
        assert_eq!(movement(MovementKind::Reservation, -3).demand_effect(), 0.0);
    }
}
