//! Occupancy bookkeeping.
//!
//! Two maps kept as mutual inverses: cell → owner and owner → cell. Every
//! mutation goes through [`OccupancyTable::occupy`] and
//! [`OccupancyTable::release`], which update both sides together.

use std::borrow::Borrow;
use std::collections::HashMap;

use hexzone_topology::HexCoord;
use serde::{Deserialize, Serialize};

use crate::{AllocError, Result};

/// Identifier of the session that owns a zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for OwnerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for OwnerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bidirectional cell ↔ owner map.
///
/// Each cell has at most one owner and each owner holds at most one cell.
#[derive(Debug, Default, Clone)]
pub struct OccupancyTable {
    by_hex: HashMap<HexCoord, OwnerId>,
    by_owner: HashMap<OwnerId, HexCoord>,
}

impl OccupancyTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            by_hex: HashMap::new(),
            by_owner: HashMap::new(),
        }
    }

    /// Assign `hex` to `owner`.
    ///
    /// Rejects a cell held by someone else and an owner already placed on a
    /// different cell. Repeating an existing assignment is a no-op.
    pub fn occupy(&mut self, hex: HexCoord, owner: impl Into<OwnerId>) -> Result<()> {
        let owner = owner.into();

        if let Some(current) = self.by_hex.get(&hex) {
            if *current == owner {
                return Ok(());
            }
            return Err(AllocError::HexOccupied {
                hex,
                occupant: current.clone(),
            });
        }
        if let Some(&placed) = self.by_owner.get(&owner) {
            return Err(AllocError::OwnerAlreadyPlaced { owner, hex: placed });
        }

        self.by_owner.insert(owner.clone(), hex);
        self.by_hex.insert(hex, owner);
        Ok(())
    }

    /// Remove an owner and free its cell. Unknown owners are ignored.
    pub fn release(&mut self, owner: &str) -> Option<HexCoord> {
        let hex = self.by_owner.remove(owner)?;
        self.by_hex.remove(&hex);
        Some(hex)
    }

    /// Check if a cell is held.
    pub fn is_occupied(&self, hex: HexCoord) -> bool {
        self.by_hex.contains_key(&hex)
    }

    /// Owner of a cell.
    pub fn occupant(&self, hex: HexCoord) -> Option<&OwnerId> {
        self.by_hex.get(&hex)
    }

    /// Cell held by an owner.
    pub fn owner_hex(&self, owner: &str) -> Option<HexCoord> {
        self.by_owner.get(owner).copied()
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.by_hex.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.by_hex.is_empty()
    }

    /// All assignments, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (HexCoord, &OwnerId)> {
        self.by_hex.iter().map(|(hex, owner)| (*hex, owner))
    }

    /// Drop every assignment.
    pub fn clear(&mut self) {
        self.by_hex.clear();
        self.by_owner.clear();
    }

    /// Verify both directions agree. Used by tests.
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        self.by_hex.len() == self.by_owner.len()
            && self
                .by_owner
                .iter()
                .all(|(owner, hex)| self.by_hex.get(hex) == Some(owner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn occupy_and_release_symmetry() {
        let mut table = OccupancyTable::new();
        let h = HexCoord::new(2, -1);

        table.occupy(h, "A").unwrap();
        assert!(table.is_occupied(h));
        assert_eq!(table.occupant(h).map(OwnerId::as_str), Some("A"));
        assert_eq!(table.owner_hex("A"), Some(h));
        assert_eq!(table.len(), 1);

        assert_eq!(table.release("A"), Some(h));
        assert!(!table.is_occupied(h));
        assert_eq!(table.occupant(h), None);
        assert_eq!(table.owner_hex("A"), None);
        assert!(table.is_empty());
    }

    #[test]
    fn release_unknown_is_noop() {
        let mut table = OccupancyTable::new();
        table.occupy(HexCoord::ORIGIN, "A").unwrap();
        assert_eq!(table.release("nobody"), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn occupied_hex_rejects_other_owner() {
        let mut table = OccupancyTable::new();
        let h = HexCoord::new(1, 0);
        table.occupy(h, "A").unwrap();

        match table.occupy(h, "B") {
            Err(AllocError::HexOccupied { hex, occupant }) => {
                assert_eq!(hex, h);
                assert_eq!(occupant.as_str(), "A");
            }
            other => panic!("expected HexOccupied, got {:?}", other),
        }

        // Nothing changed, and no stale reverse entry for B.
        assert_eq!(table.occupant(h).map(OwnerId::as_str), Some("A"));
        assert_eq!(table.owner_hex("B"), None);
        assert!(table.is_consistent());
    }

    #[test]
    fn placed_owner_rejects_second_hex() {
        let mut table = OccupancyTable::new();
        table.occupy(HexCoord::new(1, 0), "A").unwrap();

        let err = table.occupy(HexCoord::new(0, 1), "A").unwrap_err();
        assert!(matches!(err, AllocError::OwnerAlreadyPlaced { .. }));
        assert!(!table.is_occupied(HexCoord::new(0, 1)));
        assert!(table.is_consistent());
    }

    #[test]
    fn repeated_occupy_is_idempotent() {
        let mut table = OccupancyTable::new();
        table.occupy(HexCoord::ORIGIN, "A").unwrap();
        table.occupy(HexCoord::ORIGIN, "A").unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn distinct_pairs_never_alias() {
        // "1,23" and "12,3" style collisions cannot happen with struct keys.
        let mut table = OccupancyTable::new();
        table.occupy(HexCoord::new(1, 23), "A").unwrap();
        table.occupy(HexCoord::new(12, 3), "B").unwrap();
        table.occupy(HexCoord::new(-1, 1), "C").unwrap();
        table.occupy(HexCoord::new(1, -1), "D").unwrap();
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn owner_id_conversions() {
        let a = OwnerId::from("session-1");
        assert_eq!(a, OwnerId::new(String::from("session-1")));
        assert_eq!(a.to_string(), "session-1");
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"session-1\"");
    }

    proptest! {
        #[test]
        fn random_operations_stay_consistent(
            ops in proptest::collection::vec((any::<bool>(), 0u8..6, -3i64..3, -3i64..3), 1..200)
        ) {
            let mut table = OccupancyTable::new();
            for (is_occupy, owner, q, r) in ops {
                let owner = format!("s{}", owner);
                if is_occupy {
                    let _ = table.occupy(HexCoord::new(q, r), owner.as_str());
                } else {
                    table.release(&owner);
                }
                prop_assert!(table.is_consistent());
            }
        }
    }
}
