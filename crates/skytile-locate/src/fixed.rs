//! Fixed-coordinate positioner for the configured fallback location

use chrono::Utc;

use skytile_core::{Coordinate, Position};

use crate::{LocateResult, Positioner};

/// Nominal accuracy reported for a configured coordinate
pub const STATIC_ACCURACY_M: f64 = 5_000.0;

/// Positioner that always answers with one configured coordinate
pub struct StaticPositioner {
    coordinate: Coordinate,
}

impl StaticPositioner {
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate }
    }
}

#[async_trait::async_trait]
impl Positioner for StaticPositioner {
    fn name(&self) -> &str {
        "static"
    }

    async fn lookup(&mut self) -> LocateResult<Position> {
        Ok(Position {
            coordinate: self.coordinate,
            accuracy_m: STATIC_ACCURACY_M,
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_positioner_returns_configured_coordinate() {
        let coordinate = Coordinate::new(47.4760, -118.2550);
        let mut positioner = StaticPositioner::new(coordinate);

        let position = positioner.lookup().await.unwrap();
        assert_eq!(position.coordinate, coordinate);
        assert!(position.is_valid());
        assert_eq!(positioner.name(), "static");
    }
}
