// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Linearization: decomposing an arbitrary leg graph into simple chains.
//!
//! A parsed series may hold legs in any order, with stations shared by more
//! than two legs (junctions) and legs that close loops. Linearization
//! rebuilds the series as a canonical tree: the series' own legs become one
//! non-branching chain in physical traversal order, every branch becomes a
//! child series rooted at its junction station, and every loop closure is
//! recorded as a [`SeriesLink`] instead of corrupting a chain.
//!
//! Structure is discovered from the station adjacency index, not from input
//! sequence, so any permutation of the input legs produces the same chain
//! and link structure; input order only breaks ties (which chain is the
//! trunk, which continuation is walked first).

use cave_lite_core::{Diagnostic, DiagnosticSink, Leg, Series, SeriesLink, Survey};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::arena::{station_key, LegArena, LegKey};
use crate::error::Result;

/// One simple chain discovered by the walk.
struct Chain {
    /// Legs oriented so `legs[i].to == legs[i+1].from`.
    legs: Vec<Leg>,
    /// Station keys in traversal order; `legs.len() + 1` entries. For a
    /// closed ring the last entry repeats the first.
    stations: Vec<String>,
    /// The chain returned to its own start station.
    closed: bool,
}

impl Chain {
    fn start(&self) -> &str {
        &self.stations[0]
    }

    fn end(&self) -> &str {
        self.stations.last().expect("chain has stations")
    }
}

struct Walker {
    arena: LegArena,
    /// Station key -> index of the chain that first placed it.
    placed: FxHashMap<String, usize>,
}

impl Walker {
    fn new(arena: LegArena) -> Self {
        Self {
            arena,
            placed: FxHashMap::default(),
        }
    }

    fn run(&mut self) -> Vec<Chain> {
        let mut chains = Vec::new();
        while let Some(start) = self.arena.first_unused() {
            let chain = self.walk_chain(start);
            for station in &chain.stations {
                self.placed.entry(station.clone()).or_insert(chains.len());
            }
            chains.push(chain);
        }
        chains
    }

    /// Walks one chain from a seed leg, extending forward then backward.
    ///
    /// Extension stops at a station with no unused incident legs, at a
    /// station first placed by an earlier chain (the new chain attaches
    /// there), or when the next station already lies inside the current
    /// chain. A revisit of the chain's own start station closes a ring and
    /// the closing leg is kept; a revisit of an interior station leaves the
    /// revisiting leg for a later chain.
    fn walk_chain(&mut self, seed: LegKey) -> Chain {
        self.arena.mark_used(seed);
        let first = self.arena.leg(seed).clone();
        let mut stations = vec![
            station_key(first.from().name()),
            station_key(first.to().name()),
        ];
        let mut legs = vec![first];
        let mut closed = stations[0] == stations[1];

        // Forward: extend while the end station is unplaced elsewhere.
        while !closed && !self.placed.contains_key(stations.last().unwrap()) {
            let end = stations.last().unwrap().clone();
            let Some(key) = self.arena.first_unused_at(&end) else {
                break;
            };
            let raw = self.arena.leg(key).clone();
            let oriented = if station_key(raw.from().name()) == end {
                raw
            } else {
                raw.reversed()
            };
            let far = station_key(oriented.to().name());
            if stations.contains(&far) {
                if far == stations[0] {
                    self.arena.mark_used(key);
                    legs.push(oriented);
                    stations.push(far);
                    closed = true;
                }
                break;
            }
            let attaches = self.placed.contains_key(&far);
            self.arena.mark_used(key);
            legs.push(oriented);
            stations.push(far);
            if attaches {
                break;
            }
        }

        // Backward: same walk prepending toward the chain start.
        while !closed && !self.placed.contains_key(&stations[0]) {
            let start = stations[0].clone();
            let Some(key) = self.arena.first_unused_at(&start) else {
                break;
            };
            let raw = self.arena.leg(key).clone();
            let oriented = if station_key(raw.to().name()) == start {
                raw
            } else {
                raw.reversed()
            };
            let far = station_key(oriented.from().name());
            if stations.contains(&far) {
                if &far == stations.last().unwrap() {
                    self.arena.mark_used(key);
                    legs.insert(0, oriented);
                    stations.insert(0, far);
                    closed = true;
                }
                break;
            }
            let attaches = self.placed.contains_key(&far);
            self.arena.mark_used(key);
            legs.insert(0, oriented);
            stations.insert(0, far);
            if attaches {
                break;
            }
        }

        Chain {
            legs,
            stations,
            closed,
        }
    }
}

/// Linearizes one series' direct legs in place.
///
/// Splay legs take no part in the walk; afterwards each splay is reattached
/// to whichever chain owns its origin station. Pre-existing inner series are
/// untouched. Running the operation twice is a no-op the second time.
pub fn linearize_series(series: &mut Series, sink: &mut dyn DiagnosticSink) -> Result<()> {
    if series.leg_count() == 0 {
        return Ok(());
    }

    let (splays, network): (Vec<Leg>, Vec<Leg>) =
        series.take_legs().into_iter().partition(Leg::is_splay);
    if network.is_empty() {
        series.set_legs(splays);
        return Ok(());
    }

    let arena = LegArena::build(network)?;
    let leg_total = arena.len();
    let mut walker = Walker::new(arena);
    let chains = walker.run();
    debug_assert_eq!(
        chains.iter().map(|c| c.legs.len()).sum::<usize>(),
        leg_total
    );

    // Name the trunk after the series itself and each further chain with a
    // counter suffix, skipping names already taken by existing children.
    let parent_name = series.name().to_string();
    let mut names = vec![parent_name.clone()];
    let mut counter = 0usize;
    for _ in 1..chains.len() {
        let name = loop {
            counter += 1;
            let candidate = format!("{parent_name}_{counter}");
            if series.index_of_child(&candidate).is_none()
                && !names.iter().any(|n| n.eq_ignore_ascii_case(&candidate))
            {
                break candidate;
            }
        };
        names.push(name);
    }

    // Links: attachments of a chain endpoint first placed by an earlier
    // chain live in the series being linearized (the nearest common
    // ancestor of trunk and children); a ring's closure link lives in the
    // ring's own series, where both stations are local. add_link
    // deduplicates, which keeps re-linearization from growing the link set.
    let mut links = Vec::new();
    let mut ring_links: Vec<(usize, SeriesLink)> = Vec::new();
    for (index, chain) in chains.iter().enumerate() {
        let start_station = chain.legs[0].from().clone();
        let end_station = chain.legs.last().expect("chain has legs").to().clone();
        if chain.closed {
            ring_links.push((
                index,
                SeriesLink::new(
                    names[index].clone(),
                    start_station.clone(),
                    names[index].clone(),
                    end_station.clone(),
                ),
            ));
        }
        if let Some(&owner) = walker.placed.get(chain.start()) {
            if owner != index {
                links.push(SeriesLink::new(
                    names[owner].clone(),
                    start_station.clone(),
                    names[index].clone(),
                    start_station.clone(),
                ));
            }
        }
        if !chain.closed {
            if let Some(&owner) = walker.placed.get(chain.end()) {
                if owner != index {
                    links.push(SeriesLink::new(
                        names[owner].clone(),
                        end_station.clone(),
                        names[index].clone(),
                        end_station,
                    ));
                }
            }
        }
    }

    let chain_count = chains.len();
    let links_before = series.total_link_count();
    let existing_children = series.inner_series_count();

    let mut trunk_rings = Vec::new();
    let mut child_rings: Vec<(usize, SeriesLink)> = Vec::new();
    for (index, link) in ring_links {
        if index == 0 {
            trunk_rings.push(link);
        } else {
            child_rings.push((index, link));
        }
    }

    let mut chains = chains.into_iter();
    let trunk = chains.next().expect("at least one chain");
    series.set_legs(trunk.legs);
    for (chain_index, (chain, name)) in chains.zip(names.iter().skip(1)).enumerate() {
        let mut child = series.new_child_with_metadata(name.clone());
        child.set_legs(chain.legs);
        for (ring_index, link) in &child_rings {
            if *ring_index == chain_index + 1 {
                child.add_link(link.clone());
            }
        }
        series.add_inner_series(child);
    }
    for link in trunk_rings {
        series.add_link(link);
    }
    for link in links {
        series.add_link(link);
    }

    // Reattach splays to whichever chain owns their origin station.
    for splay in splays {
        let owner = walker.placed.get(&station_key(splay.from().name())).copied();
        match owner {
            Some(0) | None => {
                if owner.is_none() {
                    sink.report(Diagnostic::warning(format!(
                        "series '{}': splay from '{}' touches no surveyed station",
                        parent_name,
                        splay.from().name()
                    )));
                }
                series.add_leg(splay);
            }
            Some(chain_index) => {
                let child_index = existing_children + chain_index - 1;
                series
                    .inner_series_at_mut(child_index)
                    .expect("child created for chain")
                    .add_leg(splay);
            }
        }
    }

    let new_links = series.total_link_count() - links_before;
    if chain_count > 1 || new_links > 0 {
        debug!(
            series = %parent_name,
            chains = chain_count,
            links = new_links,
            "linearized series"
        );
        sink.report(Diagnostic::info(format!(
            "series '{parent_name}': linearized into {chain_count} chains with {new_links} new links"
        )));
    }
    Ok(())
}

/// Applies [`linearize_series`] depth-first to every series of the survey.
pub fn linearize_survey(survey: &mut Survey, sink: &mut dyn DiagnosticSink) -> Result<()> {
    fn walk(series: &mut Series, sink: &mut dyn DiagnosticSink) -> Result<()> {
        linearize_series(series, sink)?;
        for child in series.inner_series_mut() {
            walk(child, sink)?;
        }
        Ok(())
    }

    for series in survey.series_iter_mut() {
        walk(series, sink)?;
    }
    Ok(())
}
