use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::TopologyError;
use crate::generators::{bcube, fat_tree, three_tier, two_tier};
use crate::topology::DatacenterTopology;
use crate::utils::units::{parse_capacity, BufferUnit};

/// Job description loaded from YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    pub topology: TopologyParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<LinkConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(level) = &self.general.log_level {
            log::LevelFilter::from_str(level).map_err(|_| {
                ValidationError::InvalidGeneral(format!("unknown log_level '{}'", level))
            })?;
        }

        if let Some(links) = &self.links {
            links.validate()?;
        }

        if let Some(path) = &self.output.path {
            if path.as_os_str().is_empty() {
                return Err(ValidationError::InvalidOutput(
                    "output path cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Settings that do not affect the generated topology
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Which topology to build, with its parameters.
///
/// Parameters are signed so that out-of-range values reach the generator
/// and are reported against the parameter name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TopologyParams {
    FatTree {
        k: i64,
    },
    TwoTier {
        n_core: i64,
        n_edge: i64,
        n_servers: i64,
    },
    ThreeTier {
        n_core: i64,
        n_agg: i64,
        n_edge_per_agg: i64,
        n_servers_per_edge: i64,
    },
    Bcube {
        n: i64,
        k: i64,
    },
}

impl TopologyParams {
    pub fn build(&self) -> Result<DatacenterTopology, TopologyError> {
        match *self {
            TopologyParams::FatTree { k } => fat_tree(k),
            TopologyParams::TwoTier {
                n_core,
                n_edge,
                n_servers,
            } => two_tier(n_core, n_edge, n_servers),
            TopologyParams::ThreeTier {
                n_core,
                n_agg,
                n_edge_per_agg,
                n_servers_per_edge,
            } => three_tier(n_core, n_agg, n_edge_per_agg, n_servers_per_edge),
            TopologyParams::Bcube { n, k } => bcube(n, k),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TopologyParams::FatTree { .. } => "fat_tree",
            TopologyParams::TwoTier { .. } => "two_tier",
            TopologyParams::ThreeTier { .. } => "three_tier",
            TopologyParams::Bcube { .. } => "bcube",
        }
    }
}

/// Constant attributes applied to every link
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Capacity with unit, e.g. "10Gbps"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<String>,
    /// Propagation delay, e.g. "2ms" or "500us"
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub delay: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_size: Option<u64>,
    /// "packets" (default) or "bytes"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_unit: Option<String>,
}

impl LinkConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(capacity) = &self.capacity {
            parse_capacity(capacity).map_err(|e| ValidationError::InvalidLinks(e.to_string()))?;
        }
        if self.delay.is_some_and(|delay| delay.is_zero()) {
            return Err(ValidationError::InvalidLinks("delay must be positive".to_string()));
        }
        if let Some(weight) = self.weight {
            if !(weight > 0.0 && weight.is_finite()) {
                return Err(ValidationError::InvalidLinks(format!(
                    "weight must be positive, got {}",
                    weight
                )));
            }
        }
        if self.buffer_size == Some(0) {
            return Err(ValidationError::InvalidLinks("buffer_size must be positive".to_string()));
        }
        self.buffer_unit()?;
        Ok(())
    }

    pub fn buffer_unit(&self) -> Result<BufferUnit, ValidationError> {
        match &self.buffer_unit {
            Some(unit) => unit.parse().map_err(|e: crate::utils::units::UnitError| {
                ValidationError::InvalidLinks(e.to_string())
            }),
            None => Ok(BufferUnit::Packets),
        }
    }
}

/// Serialization formats for generated topologies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Gml,
    Json,
}

impl OutputFormat {
    /// Guess the format from a file extension, defaulting to GML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Gml,
        }
    }
}

/// Where and how to write the topology. No path means stdout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

impl OutputConfig {
    /// Explicit format, else inferred from the path
    pub fn resolved_format(&self) -> OutputFormat {
        match (self.format, &self.path) {
            (Some(format), _) => format,
            (None, Some(path)) => OutputFormat::from_path(path),
            (None, None) => OutputFormat::Gml,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid link configuration: {0}")]
    InvalidLinks(String),
    #[error("Invalid output configuration: {0}")]
    InvalidOutput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Config {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_config_parsing() {
        let config = parse(
            r#"
general:
  log_level: debug
topology:
  type: fat_tree
  k: 4
links:
  capacity: "10Gbps"
  delay: "2ms"
  weight: 1.0
  buffer_size: 100
output:
  path: "fat_tree.gml"
"#,
        );

        assert_eq!(config.general.log_level.as_deref(), Some("debug"));
        assert_eq!(config.topology, TopologyParams::FatTree { k: 4 });
        let links = config.links.as_ref().unwrap();
        assert_eq!(links.delay, Some(Duration::from_millis(2)));
        assert_eq!(links.buffer_unit().unwrap(), BufferUnit::Packets);
        assert_eq!(config.output.resolved_format(), OutputFormat::Gml);
        config.validate().unwrap();
    }

    #[test]
    fn test_topology_variants() {
        let two = parse("topology: { type: two_tier, n_core: 2, n_edge: 3, n_servers: 4 }");
        assert_eq!(two.topology.kind(), "two_tier");
        assert_eq!(two.topology.build().unwrap().number_of_servers(), 12);

        let three = parse(
            "topology: { type: three_tier, n_core: 1, n_agg: 2, \
             n_edge_per_agg: 2, n_servers_per_edge: 2 }",
        );
        assert_eq!(three.topology.build().unwrap().number_of_servers(), 8);

        let cube = parse("topology: { type: bcube, n: 2, k: 1 }");
        assert_eq!(cube.topology.build().unwrap().number_of_switches(), 4);

        // Out-of-range values parse and fail at build time
        let bad = parse("topology: { type: fat_tree, k: -2 }");
        assert_eq!(bad.topology.build().unwrap_err().parameter(), Some("k"));
    }

    #[test]
    fn test_unknown_topology_type() {
        assert!(serde_yaml::from_str::<Config>("topology: { type: torus, n: 3 }").is_err());
        assert!(serde_yaml::from_str::<Config>("topology: { type: fat_tree }").is_err());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = parse("topology: { type: fat_tree, k: 4 }");
        config.validate().unwrap();

        config.general.log_level = Some("loud".to_string());
        assert!(matches!(config.validate(), Err(ValidationError::InvalidGeneral(_))));
        config.general.log_level = None;

        config.output.path = Some(PathBuf::new());
        assert!(matches!(config.validate(), Err(ValidationError::InvalidOutput(_))));
        config.output.path = None;

        for links in [
            LinkConfig { capacity: Some("10 parsecs".to_string()), ..Default::default() },
            LinkConfig { delay: Some(Duration::ZERO), ..Default::default() },
            LinkConfig { weight: Some(0.0), ..Default::default() },
            LinkConfig { buffer_size: Some(0), ..Default::default() },
            LinkConfig { buffer_unit: Some("frames".to_string()), ..Default::default() },
        ] {
            config.links = Some(links);
            assert!(matches!(config.validate(), Err(ValidationError::InvalidLinks(_))));
        }
    }

    #[test]
    fn test_output_format_resolution() {
        let json = OutputConfig { path: Some(PathBuf::from("out/topo.JSON")), format: None };
        assert_eq!(json.resolved_format(), OutputFormat::Json);

        let forced = OutputConfig {
            path: Some(PathBuf::from("topo.json")),
            format: Some(OutputFormat::Gml),
        };
        assert_eq!(forced.resolved_format(), OutputFormat::Gml);

        assert_eq!(OutputConfig::default().resolved_format(), OutputFormat::Gml);
        assert_eq!(serde_yaml::from_str::<OutputFormat>("json").unwrap(), OutputFormat::Json);
    }
}
