//! BCube(n, k) generator and address helpers.
//!
//! Servers carry a `(k+1)`-digit base-`n` address and a level-`i` switch
//! carries the `k` digits its servers share, i.e. the server address with
//! digit `i` removed. Addresses are stored least significant digit first:
//! index `i` holds digit `a_i`.
//!
//! ```text
//! 0 .. n^(k+1)                            servers, id = address value
//! n^(k+1) + i*n^k + j                     switch j of level i
//! ```

use log::{debug, info};

use crate::error::{Constraint, TopologyError};
use crate::topology::{DatacenterTopology, EdgeAttrs, LinkKind, NodeAttrs, NodeId};
use crate::utils::validation::{require_addressable, require_at_least};

/// Digits of server `index` in base `n`, least significant first.
///
/// # Examples
/// ```
/// use dctopo::generators::bcube::server_address;
///
/// // 6 = 1*4 + 1*2 + 0
/// assert_eq!(server_address(2, 2, 6), vec![0, 1, 1]);
/// ```
pub fn server_address(n: usize, k: usize, index: usize) -> Vec<usize> {
    let mut rest = index;
    (0..=k)
        .map(|_| {
            let digit = rest % n;
            rest /= n;
            digit
        })
        .collect()
}

/// Address of the level-`level` switch serving a server: its address with
/// digit `level` removed.
pub fn switch_address(server: &[usize], level: usize) -> Vec<usize> {
    server
        .iter()
        .enumerate()
        .filter(|&(position, _)| position != level)
        .map(|(_, &digit)| digit)
        .collect()
}

/// Rebuild a server address from the switches it is attached to.
///
/// `incident` lists `(level, switch address)` pairs. Switch `(i, s)` fixes
/// every digit except `i`. Returns `None` if some digit is never fixed
/// (always the case for `k = 0`) or two switches disagree.
pub fn decode_server_address(k: usize, incident: &[(usize, &[usize])]) -> Option<Vec<usize>> {
    let mut digits: Vec<Option<usize>> = vec![None; k + 1];
    for &(level, address) in incident {
        if level > k || address.len() != k {
            return None;
        }
        for position in (0..=k).filter(|&p| p != level) {
            let digit = address[if position < level { position } else { position - 1 }];
            match digits[position] {
                Some(known) if known != digit => return None,
                _ => digits[position] = Some(digit),
            }
        }
    }
    digits.into_iter().collect()
}

/// Build a BCube(n, k) topology.
///
/// There are `n^(k+1)` servers and `k+1` levels of `n^k` switches; every
/// switch has exactly `n` ports and every server one port per level.
///
/// # Arguments
/// * `n` - Ports per switch, at least 1
/// * `k` - Highest level, at least 0
///
/// # Examples
/// ```
/// use dctopo::generators::bcube;
///
/// let topology = bcube(2, 3)?;
/// assert_eq!(topology.number_of_servers(), 16);
/// assert_eq!(topology.number_of_switches(), 32);
/// # Ok::<(), dctopo::TopologyError>(())
/// ```
pub fn bcube(n: i64, k: i64) -> Result<DatacenterTopology, TopologyError> {
    let base = require_at_least("n", n, 1)?;
    let top = require_at_least("k", k, 0)?;
    let sizes = u32::try_from(top)
        .ok()
        .and_then(|exp| base.checked_pow(exp))
        .and_then(|per_level| {
            let n_servers = per_level.checked_mul(base)?;
            let n_switches = per_level.checked_mul(top.checked_add(1)?)?;
            Some((per_level, n_servers, n_servers.checked_add(n_switches)?))
        });
    // Overflow is driven by the exponent unless n is 1
    let (culprit, value) = if base == 1 { ("k", k) } else { ("n", n) };
    let (per_level, n_servers) = match sizes {
        Some((per_level, n_servers, total)) => {
            require_addressable(culprit, value, Some(total))?;
            (per_level, n_servers)
        }
        None => return Err(TopologyError::invalid(culprit, value, Constraint::TooLarge)),
    };

    info!("Generating BCube topology (n={}, k={})", base, top);

    let mut topology = DatacenterTopology::new();
    topology.set_name(format!("bcube_topology({},{})", base, top));

    for server in 0..n_servers {
        topology.add_server(
            NodeId::from_index(server),
            NodeAttrs::default().with_address(server_address(base, top, server)),
        );
    }

    // stride = n^level; servers of switch j differ only in digit `level`
    let mut stride = 1;
    for level in 0..=top {
        let level_start = n_servers + level * per_level;
        for j in 0..per_level {
            let low = j % stride;
            let high = j / stride;
            let first = low + high * stride * base;
            let switch = NodeId::from_index(level_start + j);
            let address = switch_address(&server_address(base, top, first), level);
            topology.add_switch(
                switch,
                NodeAttrs::default().with_level(level).with_address(address),
            );

            for digit in 0..base {
                let server = NodeId::from_index(first + digit * stride);
                let attrs = EdgeAttrs::of_kind(LinkKind::Bcube).with_level(level);
                topology.add_edge(switch, server, attrs)?;
            }
        }
        debug!("Level {}: switches {}..{}", level, level_start, level_start + per_level);
        // Only overflows after the last level; n^(k+1) fits
        stride = stride.saturating_mul(base);
    }

    super::log_summary(&topology);
    Ok(topology)
}
