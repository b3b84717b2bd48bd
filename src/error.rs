//! Errors returned by the topology generators.

use std::fmt;

use crate::topology::GraphError;

/// Constraint a generator parameter failed to satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Must be strictly greater than zero
    Positive,
    /// Must be a positive even integer
    Even,
    /// Must be greater than or equal to the given bound
    AtLeast(i64),
    /// Yields more nodes than a `NodeId` can address
    TooLarge,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Positive => f.write_str("must be a positive integer"),
            Constraint::Even => f.write_str("must be a positive even integer"),
            Constraint::AtLeast(min) => write!(f, "must be at least {}", min),
            Constraint::TooLarge => f.write_str("yields more nodes than can be addressed"),
        }
    }
}

/// Errors that can occur while generating a topology
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    #[error("invalid parameter {name}={value}: {constraint}")]
    InvalidParameter {
        name: &'static str,
        value: i64,
        constraint: Constraint,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl TopologyError {
    pub(crate) fn invalid(name: &'static str, value: i64, constraint: Constraint) -> Self {
        TopologyError::InvalidParameter {
            name,
            value,
            constraint,
        }
    }

    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, TopologyError::InvalidParameter { .. })
    }

    /// Name of the offending parameter, for parameter errors
    pub fn parameter(&self) -> Option<&'static str> {
        match self {
            TopologyError::InvalidParameter { name, .. } => Some(*name),
            TopologyError::Graph(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_names_parameter_and_constraint() {
        let err = TopologyError::invalid("k", 11, Constraint::Even);
        assert_eq!(err.to_string(), "invalid parameter k=11: must be a positive even integer");
        assert_eq!(err.parameter(), Some("k"));
        assert!(err.is_invalid_parameter());

        let err = TopologyError::invalid("n", 0, Constraint::AtLeast(1));
        assert_eq!(err.to_string(), "invalid parameter n=0: must be at least 1");
    }

    #[test]
    fn test_graph_errors_are_not_parameter_errors() {
        let err = TopologyError::from(GraphError::Directed);
        assert!(!err.is_invalid_parameter());
        assert_eq!(err.parameter(), None);
    }
}
