//! Job orchestration.
//!
//! Runs a configuration end to end: build the requested topology, annotate
//! its links, check its consistency and write it out.

use color_eyre::eyre::{eyre, Result, WrapErr};
use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::config::{Config, LinkConfig, OutputConfig, OutputFormat};
use crate::gml;
use crate::links::{
    set_buffer_sizes_constant, set_capacities_constant, set_delays_constant, set_weights_constant,
};
use crate::topology::DatacenterTopology;
use crate::utils::units::{parse_capacity, TimeUnit};
use crate::utils::validation::validate_datacenter_topology;

/// Apply constant link attributes from the configuration
pub fn annotate_links(topology: &mut DatacenterTopology, links: &LinkConfig) -> Result<()> {
    if let Some(capacity) = &links.capacity {
        let (value, unit) = parse_capacity(capacity)?;
        set_capacities_constant(topology, value, unit)?;
        debug!("Link capacity set to {}{}", value, unit);
    }
    if let Some(delay) = links.delay {
        set_delays_constant(topology, delay.as_secs_f64() * 1e3, TimeUnit::Ms)?;
        debug!("Link delay set to {:?}", delay);
    }
    if let Some(weight) = links.weight {
        set_weights_constant(topology, weight)?;
    }
    if let Some(size) = links.buffer_size {
        set_buffer_sizes_constant(topology, size, links.buffer_unit()?)?;
    }
    Ok(())
}

/// Build, annotate and check the topology a configuration describes
pub fn generate(config: &Config) -> Result<DatacenterTopology> {
    let mut topology = config
        .topology
        .build()
        .wrap_err_with(|| format!("Failed to build {} topology", config.topology.kind()))?;

    if let Some(links) = &config.links {
        annotate_links(&mut topology, links)?;
    }

    validate_datacenter_topology(&topology)
        .map_err(|e| eyre!("Generated topology is inconsistent: {}", e))?;

    Ok(topology)
}

/// Serialize a topology in the requested format
pub fn render(topology: &DatacenterTopology, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Gml => gml::to_gml(topology.as_topology()),
        OutputFormat::Json => {
            let mut text = serde_json::to_string_pretty(topology)?;
            text.push('\n');
            Ok(text)
        }
    }
}

/// Write a topology to the configured path, or stdout if there is none
pub fn write_topology(topology: &DatacenterTopology, output: &OutputConfig) -> Result<()> {
    let format = output.resolved_format();
    let text = render(topology, format)?;

    match &output.path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).wrap_err_with(|| {
                    format!("Failed to create output directory '{}'", parent.display())
                })?;
            }
            fs::write(path, text)
                .wrap_err_with(|| format!("Failed to write topology to '{}'", path.display()))?;
            info!("Wrote {:?} topology to {:?}", format, path);
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(text.as_bytes())
                .wrap_err("Failed to write topology to stdout")?;
        }
    }
    Ok(())
}

/// Read a datacenter topology back from a GML or JSON file
pub fn read_topology(path: &Path) -> Result<DatacenterTopology> {
    let topology = match OutputFormat::from_path(path) {
        OutputFormat::Gml => gml::read_gml_file(path)?,
        OutputFormat::Json => {
            let text = fs::read_to_string(path)
                .wrap_err_with(|| format!("Failed to read '{}'", path.display()))?;
            serde_json::from_str(&text)
                .wrap_err_with(|| format!("Failed to parse '{}'", path.display()))?
        }
    };
    DatacenterTopology::try_from(topology)
        .wrap_err_with(|| format!("'{}' is not a datacenter topology", path.display()))
}

/// Generate and write the topology described by `config`
pub fn run(config: &Config) -> Result<DatacenterTopology> {
    let topology = generate(config)?;
    write_topology(&topology, &config.output)?;
    Ok(topology)
}
