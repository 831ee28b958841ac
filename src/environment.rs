//! Travel graph and pheromone field shared by every colony.

use crate::config::{PheromoneParams, MINUTES_PER_DAY};
use crate::error::{Error, Result};
use log::{debug, warn};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// A location that can be visited within its opening window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub open_minute: u32,
    pub close_minute: u32,
}

impl Location {
    /// Create a new location.
    pub fn new(name: impl Into<String>, open_minute: u32, close_minute: u32) -> Self {
        Location {
            name: name.into(),
            open_minute,
            close_minute,
        }
    }
}

/// A directed connection between two locations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub travel_minutes: u32,
    pub pheromone: f64,
}

/// One outgoing connection as seen from its origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<'a> {
    pub destination: &'a str,
    pub travel_minutes: u32,
    pub pheromone: f64,
    pub open_minute: u32,
    pub close_minute: u32,
}

/// One row of the travel table produced by the graph builder.
///
/// The window columns describe the destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub origin: String,
    pub destination: String,
    pub travel_minutes: u32,
    pub open_minute: u32,
    pub close_minute: u32,
}

/// The edges an ant traversed together with the fitness it earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRecord {
    pub edges: Vec<(String, String)>,
    pub fitness: f64,
}

/// Owns the travel graph and the pheromone stored on its edges.
///
/// Pheromone only changes through [`Environment::deposit`].
#[derive(Debug, Clone)]
pub struct Environment {
    graph: DiGraph<Location, Edge>,
    index: BTreeMap<String, NodeIndex>,
    params: PheromoneParams,
}

impl Environment {
    /// Build a graph from explicit locations and `(origin, destination, minutes)` edges.
    pub fn new(
        locations: Vec<Location>,
        edges: Vec<(String, String, u32)>,
        params: PheromoneParams,
    ) -> Result<Self> {
        params.validate()?;

        let mut graph = DiGraph::with_capacity(locations.len(), edges.len());
        let mut index = BTreeMap::new();

        for location in locations {
            if location.open_minute >= MINUTES_PER_DAY || location.close_minute >= MINUTES_PER_DAY {
                return Err(Error::InvalidTable(format!(
                    "window of {} lies outside the day",
                    location.name
                )));
            }
            if index.contains_key(&location.name) {
                return Err(Error::InvalidTable(format!(
                    "location {} declared twice",
                    location.name
                )));
            }
            let name = location.name.clone();
            index.insert(name, graph.add_node(location));
        }

        let seed = params.initial.clamp(params.min, params.max);
        for (origin, destination, travel_minutes) in edges {
            if origin == destination {
                return Err(Error::InvalidTable(format!("self-loop at {}", origin)));
            }
            let from = *index
                .get(&origin)
                .ok_or_else(|| Error::UnknownLocation(origin.clone()))?;
            let to = *index
                .get(&destination)
                .ok_or_else(|| Error::UnknownLocation(destination.clone()))?;
            if graph.find_edge(from, to).is_some() {
                return Err(Error::InvalidTable(format!(
                    "duplicate edge {} -> {}",
                    origin, destination
                )));
            }
            graph.add_edge(
                from,
                to,
                Edge {
                    travel_minutes,
                    pheromone: seed,
                },
            );
        }

        debug!(
            "Built travel graph with {} locations and {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(Environment {
            graph,
            index,
            params,
        })
    }

    /// Build a graph from travel table rows, taking each location's window
    /// from the rows that name it as destination.
    pub fn from_table(rows: Vec<TableRow>, params: PheromoneParams) -> Result<Self> {
        let mut windows: BTreeMap<String, (u32, u32)> = BTreeMap::new();

        for row in &rows {
            let window = (row.open_minute, row.close_minute);
            match windows.get(&row.destination) {
                Some(known) if *known != window => {
                    return Err(Error::InvalidTable(format!(
                        "conflicting windows for {}",
                        row.destination
                    )));
                }
                Some(_) => {}
                None => {
                    windows.insert(row.destination.clone(), window);
                }
            }
        }

        if let Some(row) = rows.iter().find(|row| !windows.contains_key(&row.origin)) {
            return Err(Error::InvalidTable(format!(
                "{} never appears as a destination, its window is unknown",
                row.origin
            )));
        }

        let locations = windows
            .into_iter()
            .map(|(name, (open, close))| Location::new(name, open, close))
            .collect();
        let edges = rows
            .into_iter()
            .map(|row| (row.origin, row.destination, row.travel_minutes))
            .collect();

        Environment::new(locations, edges, params)
    }

    /// Read a JSON array of [`TableRow`] values.
    pub fn from_json_reader<R: Read>(reader: R, params: PheromoneParams) -> Result<Self> {
        let rows: Vec<TableRow> = serde_json::from_reader(reader)?;
        Environment::from_table(rows, params)
    }

    /// Load a travel table from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P, params: PheromoneParams) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Environment::from_json_reader(reader, params)
    }

    /// All outgoing connections of `origin`.
    pub fn neighbors(&self, origin: &str) -> Result<Vec<Neighbor<'_>>> {
        let node = self.node(origin)?;

        Ok(self
            .graph
            .edges(node)
            .map(|edge| {
                let target = &self.graph[edge.target()];
                Neighbor {
                    destination: &target.name,
                    travel_minutes: edge.weight().travel_minutes,
                    pheromone: edge.weight().pheromone,
                    open_minute: target.open_minute,
                    close_minute: target.close_minute,
                }
            })
            .collect())
    }

    /// Names and opening minutes of all locations not in `excluding`, sorted by name.
    pub fn locations(&self, excluding: &HashSet<String>) -> (Vec<String>, Vec<u32>) {
        self.index
            .iter()
            .filter(|(name, _)| !excluding.contains(*name))
            .map(|(name, &node)| (name.clone(), self.graph[node].open_minute))
            .unzip()
    }

    /// Look up a location by name.
    pub fn location(&self, name: &str) -> Result<&Location> {
        Ok(&self.graph[self.node(name)?])
    }

    /// Current pheromone on the edge `origin -> destination`, if it exists.
    pub fn pheromone(&self, origin: &str, destination: &str) -> Option<f64> {
        let from = *self.index.get(origin)?;
        let to = *self.index.get(destination)?;
        self.graph
            .find_edge(from, to)
            .map(|edge| self.graph[edge].pheromone)
    }

    /// Get the pheromone parameters of this field.
    pub fn params(&self) -> &PheromoneParams {
        &self.params
    }

    pub fn location_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Evaporate every edge once, deposit `Q / cost` along each path, then
    /// clamp the whole field into `[min, max]`.
    ///
    /// Paths with a non-positive cost deposit nothing.
    pub fn deposit(&mut self, paths: &[PathRecord]) {
        let decay = self.params.decay_factor;
        for edge in self.graph.edge_weights_mut() {
            edge.pheromone *= decay;
        }

        let mut missing = 0usize;
        for path in paths {
            if !(path.fitness.is_finite() && path.fitness > 0.0) {
                debug!("Skipping deposit for path with cost {}", path.fitness);
                continue;
            }
            let amount = self.params.deposit_constant / path.fitness;

            for (origin, destination) in &path.edges {
                let edge = self
                    .index
                    .get(origin.as_str())
                    .zip(self.index.get(destination.as_str()))
                    .and_then(|(&from, &to)| self.graph.find_edge(from, to));

                match edge {
                    Some(edge) => self.graph[edge].pheromone += amount,
                    None => missing += 1,
                }
            }
        }
        if missing > 0 {
            warn!("{} deposited edges are not part of the travel graph", missing);
        }

        let (min, max) = (self.params.min, self.params.max);
        for edge in self.graph.edge_weights_mut() {
            edge.pheromone = edge.pheromone.clamp(min, max);
        }

        debug!("Pheromone update applied for {} paths", paths.len());
    }

    fn node(&self, name: &str) -> Result<NodeIndex> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownLocation(name.to_string()))
    }
}
