// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Work-list arena for the linearization walk.
//!
//! Legs are held in a slot map with stable keys and indexed by an adjacency
//! map from lowercased station name to the legs touching it. The walk marks
//! legs used instead of removing them, so keys stay valid for the whole run
//! and leg order (which breaks ties) is preserved in a side list.

use cave_lite_core::Leg;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::error::{Error, Result};

new_key_type! {
    /// Key for a leg in the linearization arena.
    pub struct LegKey;
}

#[derive(Debug)]
struct LegEntry {
    leg: Leg,
    used: bool,
}

/// Canonical adjacency key for a station name.
#[inline]
pub(crate) fn station_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// One series' legs plus the station-name adjacency index.
#[derive(Debug)]
pub(crate) struct LegArena {
    legs: SlotMap<LegKey, LegEntry>,
    /// Input order; the walk's tie-break.
    order: Vec<LegKey>,
    adjacency: FxHashMap<String, SmallVec<[LegKey; 4]>>,
}

impl LegArena {
    /// Indexes the given legs. Fails fast on a leg whose endpoint name is
    /// unusable rather than letting the walk build a corrupt tree.
    pub fn build(input: Vec<Leg>) -> Result<Self> {
        let mut legs = SlotMap::with_capacity_and_key(input.len());
        let mut order = Vec::with_capacity(input.len());
        let mut adjacency: FxHashMap<String, SmallVec<[LegKey; 4]>> = FxHashMap::default();

        for leg in input {
            for station in [leg.from(), leg.to()] {
                if station.name().trim().is_empty() {
                    return Err(Error::MalformedStationReference(format!(
                        "{} -> {}",
                        leg.from().name(),
                        leg.to().name()
                    )));
                }
            }
            let from_key = station_key(leg.from().name());
            let to_key = station_key(leg.to().name());
            let key = legs.insert(LegEntry { leg, used: false });
            order.push(key);
            adjacency.entry(from_key).or_default().push(key);
            adjacency.entry(to_key).or_default().push(key);
        }

        Ok(Self {
            legs,
            order,
            adjacency,
        })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn leg(&self, key: LegKey) -> &Leg {
        &self.legs[key].leg
    }

    pub fn mark_used(&mut self, key: LegKey) {
        self.legs[key].used = true;
    }

    /// First unused leg in input order.
    pub fn first_unused(&self) -> Option<LegKey> {
        self.order.iter().copied().find(|&k| !self.legs[k].used)
    }

    /// First unused leg incident to the given station, in input order.
    pub fn first_unused_at(&self, station: &str) -> Option<LegKey> {
        self.adjacency
            .get(station)?
            .iter()
            .copied()
            .find(|&k| !self.legs[k].used)
    }
}
