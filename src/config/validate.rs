//! Configuration validation

use super::schema::GraphConfig;

/// Validation error type
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid node limit: {0} (must be > 0)")]
    InvalidNodeLimit(usize),
}

/// Validate a graph configuration
pub fn validate_config(config: &GraphConfig) -> Result<(), ValidationError> {
    if config.max_nodes == Some(0) {
        return Err(ValidationError::InvalidNodeLimit(0));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GraphConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_node_limit_rejected() {
        let config = GraphConfig {
            max_nodes: Some(0),
            ..GraphConfig::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidNodeLimit(0)));
    }

    #[test]
    fn test_positive_node_limit_accepted() {
        let config = GraphConfig {
            max_nodes: Some(1),
            ..GraphConfig::default()
        };
        assert!(validate_config(&config).is_ok());
    }
}
