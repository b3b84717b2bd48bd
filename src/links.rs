//! Link annotation.
//!
//! Generators only create links. The functions here attach the numeric
//! attributes simulators need (capacity, delay, weight, buffer size) to
//! every link and record the unit of each quantity in the graph metadata.
//! Structure is never touched.
//!
//! Edge keys: `capacity`, `delay`, `weight`, `buffer`.
//! Metadata keys: `capacity_unit`, `delay_unit`, `buffer_unit`.

use log::debug;

use crate::topology::{AttrValue, Attributes, DatacenterTopology, EdgeAttrs, Topology};
use crate::utils::units::{BufferUnit, CapacityUnit, TimeUnit, UnitError};

pub const CAPACITY: &str = "capacity";
pub const DELAY: &str = "delay";
pub const WEIGHT: &str = "weight";
pub const BUFFER: &str = "buffer";
pub const CAPACITY_UNIT: &str = "capacity_unit";
pub const DELAY_UNIT: &str = "delay_unit";
pub const BUFFER_UNIT: &str = "buffer_unit";

/// Graphs whose link attributes and metadata can be annotated
pub trait Annotate {
    fn link_attrs_mut(&mut self) -> impl Iterator<Item = &mut EdgeAttrs>;
    fn link_attrs(&self) -> impl Iterator<Item = &EdgeAttrs>;
    fn graph_metadata(&self) -> &Attributes;
    fn graph_metadata_mut(&mut self) -> &mut Attributes;
}

impl Annotate for Topology {
    fn link_attrs_mut(&mut self) -> impl Iterator<Item = &mut EdgeAttrs> {
        self.edges_mut().map(|(_, _, attrs)| attrs)
    }

    fn link_attrs(&self) -> impl Iterator<Item = &EdgeAttrs> {
        self.edges().map(|edge| &edge.attrs)
    }

    fn graph_metadata(&self) -> &Attributes {
        self.metadata()
    }

    fn graph_metadata_mut(&mut self) -> &mut Attributes {
        self.metadata_mut()
    }
}

impl Annotate for DatacenterTopology {
    fn link_attrs_mut(&mut self) -> impl Iterator<Item = &mut EdgeAttrs> {
        self.edges_mut().map(|(_, _, attrs)| attrs)
    }

    fn link_attrs(&self) -> impl Iterator<Item = &EdgeAttrs> {
        self.edges().map(|edge| &edge.attrs)
    }

    fn graph_metadata(&self) -> &Attributes {
        self.metadata()
    }

    fn graph_metadata_mut(&mut self) -> &mut Attributes {
        self.metadata_mut()
    }
}

fn require_positive(value: f64) -> Result<(), UnitError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(UnitError::NonPositive(value))
    }
}

fn stored_unit<T: std::str::FromStr>(metadata: &Attributes, key: &str) -> Option<T> {
    metadata.get(key)?.as_str()?.parse().ok()
}

fn set_all<T: Annotate>(topology: &mut T, key: &str, value: AttrValue) {
    let mut count = 0;
    for attrs in topology.link_attrs_mut() {
        attrs.extra.insert(key.to_string(), value.clone());
        count += 1;
    }
    debug!("Set {}={} on {} links", key, value, count);
}

fn clear_all<T: Annotate>(topology: &mut T, key: &str, unit_key: Option<&str>) {
    for attrs in topology.link_attrs_mut() {
        attrs.extra.remove(key);
    }
    if let Some(unit_key) = unit_key {
        topology.graph_metadata_mut().remove(unit_key);
    }
}

/// Assign the same capacity to every link.
///
/// If the topology already records a capacity unit, the value is converted
/// to it so all links stay in one unit; otherwise `unit` is recorded.
pub fn set_capacities_constant<T: Annotate>(
    topology: &mut T,
    capacity: f64,
    unit: CapacityUnit,
) -> Result<(), UnitError> {
    require_positive(capacity)?;
    let stored = stored_unit::<CapacityUnit>(topology.graph_metadata(), CAPACITY_UNIT);
    let (value, unit) = match stored {
        Some(existing) if existing != unit => {
            (capacity * unit.factor() / existing.factor(), existing)
        }
        _ => (capacity, unit),
    };
    topology
        .graph_metadata_mut()
        .insert(CAPACITY_UNIT.to_string(), AttrValue::from(unit.as_str()));
    set_all(topology, CAPACITY, AttrValue::Float(value));
    Ok(())
}

/// Assign the same propagation delay to every link, converting to an
/// already recorded delay unit if there is one.
pub fn set_delays_constant<T: Annotate>(
    topology: &mut T,
    delay: f64,
    unit: TimeUnit,
) -> Result<(), UnitError> {
    require_positive(delay)?;
    let (value, unit) = match stored_unit::<TimeUnit>(topology.graph_metadata(), DELAY_UNIT) {
        Some(existing) if existing != unit => (delay * unit.factor() / existing.factor(), existing),
        _ => (delay, unit),
    };
    topology
        .graph_metadata_mut()
        .insert(DELAY_UNIT.to_string(), AttrValue::from(unit.as_str()));
    set_all(topology, DELAY, AttrValue::Float(value));
    Ok(())
}

/// Assign the same routing weight to every link. Weights are unitless.
pub fn set_weights_constant<T: Annotate>(topology: &mut T, weight: f64) -> Result<(), UnitError> {
    require_positive(weight)?;
    set_all(topology, WEIGHT, AttrValue::Float(weight));
    Ok(())
}

/// Assign the same buffer size to every link.
///
/// Buffer sizes are counts, so a recorded unit that differs from `unit`
/// cannot be converted and is replaced.
pub fn set_buffer_sizes_constant<T: Annotate>(
    topology: &mut T,
    size: u64,
    unit: BufferUnit,
) -> Result<(), UnitError> {
    if size == 0 {
        return Err(UnitError::NonPositive(0.0));
    }
    let value = i64::try_from(size).map_err(|_| UnitError::InvalidFormat(size.to_string()))?;
    topology
        .graph_metadata_mut()
        .insert(BUFFER_UNIT.to_string(), AttrValue::from(unit.as_str()));
    set_all(topology, BUFFER, AttrValue::Int(value));
    Ok(())
}

pub fn clear_capacities<T: Annotate>(topology: &mut T) {
    clear_all(topology, CAPACITY, Some(CAPACITY_UNIT));
}

pub fn clear_delays<T: Annotate>(topology: &mut T) {
    clear_all(topology, DELAY, Some(DELAY_UNIT));
}

pub fn clear_weights<T: Annotate>(topology: &mut T) {
    clear_all(topology, WEIGHT, None);
}

pub fn clear_buffer_sizes<T: Annotate>(topology: &mut T) {
    clear_all(topology, BUFFER, Some(BUFFER_UNIT));
}

/// Which quantities are present on every link with a usable unit.
///
/// This is what an exporter checks before emitting per-link settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkAnnotations {
    pub capacities: bool,
    pub delays: bool,
    pub weights: bool,
    pub buffers: bool,
}

pub fn link_annotations<T: Annotate>(topology: &T) -> LinkAnnotations {
    let metadata = topology.graph_metadata();
    let all_have = |key: &str| topology.link_attrs().all(|attrs| attrs.extra.contains_key(key));

    LinkAnnotations {
        capacities: stored_unit::<CapacityUnit>(metadata, CAPACITY_UNIT).is_some()
            && all_have(CAPACITY),
        delays: stored_unit::<TimeUnit>(metadata, DELAY_UNIT).is_some() && all_have(DELAY),
        weights: all_have(WEIGHT),
        buffers: stored_unit::<BufferUnit>(metadata, BUFFER_UNIT).is_some() && all_have(BUFFER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{fat_tree, two_tier};

    fn all_values(topology: &DatacenterTopology, key: &str) -> Vec<Option<f64>> {
        topology
            .edges()
            .map(|edge| edge.attrs.extra.get(key).and_then(AttrValue::as_f64))
            .collect()
    }

    #[test]
    fn test_set_capacities_records_unit() {
        let mut topology = two_tier(2, 2, 2).unwrap();
        set_capacities_constant(&mut topology, 10.0, CapacityUnit::Gbps).unwrap();

        assert!(all_values(&topology, CAPACITY).iter().all(|v| *v == Some(10.0)));
        assert_eq!(
            topology.metadata().get(CAPACITY_UNIT),
            Some(&AttrValue::from("Gbps"))
        );
    }

    #[test]
    fn test_capacities_convert_to_recorded_unit() {
        let mut topology = two_tier(1, 1, 1).unwrap();
        set_capacities_constant(&mut topology, 1.0, CapacityUnit::Gbps).unwrap();
        set_capacities_constant(&mut topology, 500.0, CapacityUnit::Mbps).unwrap();

        assert!(all_values(&topology, CAPACITY).iter().all(|v| *v == Some(0.5)));
        assert_eq!(
            topology.metadata().get(CAPACITY_UNIT),
            Some(&AttrValue::from("Gbps"))
        );
    }

    #[test]
    fn test_delays_convert_to_recorded_unit() {
        let mut topology = two_tier(1, 1, 1).unwrap();
        set_delays_constant(&mut topology, 2.0, TimeUnit::Ms).unwrap();
        set_delays_constant(&mut topology, 500.0, TimeUnit::Us).unwrap();

        for value in all_values(&topology, DELAY) {
            assert!((value.unwrap() - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rejects_non_positive_values() {
        let mut topology = two_tier(1, 1, 1).unwrap();
        assert!(set_capacities_constant(&mut topology, 0.0, CapacityUnit::Mbps).is_err());
        assert!(set_delays_constant(&mut topology, -1.0, TimeUnit::Ms).is_err());
        assert!(set_weights_constant(&mut topology, f64::NAN).is_err());
        assert!(set_buffer_sizes_constant(&mut topology, 0, BufferUnit::Packets).is_err());
        assert_eq!(link_annotations(&topology), LinkAnnotations::default());
    }

    #[test]
    fn test_link_annotations_and_clear() {
        let mut topology = fat_tree(4).unwrap();
        set_capacities_constant(&mut topology, 1.0, CapacityUnit::Gbps).unwrap();
        set_delays_constant(&mut topology, 10.0, TimeUnit::Us).unwrap();
        set_weights_constant(&mut topology, 1.0).unwrap();
        set_buffer_sizes_constant(&mut topology, 100, BufferUnit::Packets).unwrap();

        let status = link_annotations(&topology);
        assert_eq!(
            status,
            LinkAnnotations {
                capacities: true,
                delays: true,
                weights: true,
                buffers: true,
            }
        );

        clear_delays(&mut topology);
        clear_buffer_sizes(&mut topology);
        let status = link_annotations(&topology);
        assert!(status.capacities && status.weights);
        assert!(!status.delays && !status.buffers);
        assert!(topology.metadata().get(DELAY_UNIT).is_none());

        clear_capacities(&mut topology);
        clear_weights(&mut topology);
        assert_eq!(link_annotations(&topology), LinkAnnotations::default());
    }

    #[test]
    fn test_annotation_leaves_structure_alone() {
        let mut topology = fat_tree(4).unwrap();
        let before = (topology.number_of_nodes(), topology.number_of_edges());
        set_weights_constant(&mut topology, 3.0).unwrap();
        assert_eq!(before, (topology.number_of_nodes(), topology.number_of_edges()));
    }

    #[test]
    fn test_annotate_plain_topology() {
        let topology = two_tier(1, 2, 1).unwrap();
        let mut graph = topology.into_topology();
        set_weights_constant(&mut graph, 2.0).unwrap();
        assert!(link_annotations(&graph).weights);
    }
}
