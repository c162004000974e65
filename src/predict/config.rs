//! Prediction run configuration

use serde::{Deserialize, Serialize};

/// Parameters of an edge prediction run.
///
/// The support threshold follows a sign convention: a non-negative value
/// is a fraction of the base support, a negative value is an absolute
/// count (so `-5.0` keeps rules with full pattern support of at least 5).
/// The weight parameters use signs the same way, see the field docs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// predict edges whose destination node is in the rule body
    pub body_node: bool,
    /// predict edges to a node that is not in the rule body
    pub new_node: bool,
    /// treat edges as directed
    pub directed: bool,
    /// minimum number of nodes in a rule body
    pub min_body: usize,
    /// maximum number of nodes in a rule body (0 = no limit)
    pub max_body: usize,
    /// minimum rule support (fraction of base, or absolute if negative)
    pub min_supp: f64,
    /// minimum rule confidence
    pub min_conf: f64,
    /// weight of predicted edges to existing nodes
    /// (negative: per node, positive: split over an embedding's candidates)
    pub xst_weight: f64,
    /// weight of predicted edges to a new node
    /// (negative: per node, positive: relative to the existing-node weight)
    pub new_weight: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        PredictorConfig {
            body_node: true,
            new_node: true,
            directed: false,
            min_body: 1,
            max_body: 0,
            min_supp: 0.0,
            min_conf: 0.0,
            xst_weight: 0.0,
            new_weight: -1.0,
        }
    }
}

impl PredictorConfig {
    /// Minimum support as a fraction of the base support.
    pub(crate) fn supp_fraction(&self) -> f64 {
        if self.min_supp < 0.0 {
            0.0
        } else {
            self.min_supp
        }
    }

    /// Minimum support as an absolute count.
    pub(crate) fn supp_floor(&self) -> u32 {
        if self.min_supp < 0.0 {
            (-self.min_supp) as u32
        } else {
            1
        }
    }

    /// Maximum body size with the "0 = no limit" convention resolved.
    pub(crate) fn max_body_limit(&self) -> usize {
        if self.max_body == 0 {
            usize::MAX
        } else {
            self.max_body
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = PredictorConfig::default();
        assert!(cfg.body_node && cfg.new_node);
        assert!(!cfg.directed);
        assert_eq!(cfg.min_body, 1);
        assert_eq!(cfg.max_body_limit(), usize::MAX);
        assert_eq!(cfg.supp_fraction(), 0.0);
        assert_eq!(cfg.supp_floor(), 1);
        assert_eq!(cfg.new_weight, -1.0);
    }

    #[test]
    fn test_negative_support_is_absolute() {
        let cfg = PredictorConfig {
            min_supp: -5.0,
            ..Default::default()
        };
        assert_eq!(cfg.supp_fraction(), 0.0);
        assert_eq!(cfg.supp_floor(), 5);
    }

    #[test]
    fn test_deserialize_partial() {
        let cfg: PredictorConfig =
            serde_json::from_str(r#"{"directed": true, "min_conf": 0.8}"#).unwrap();
        assert!(cfg.directed);
        assert_eq!(cfg.min_conf, 0.8);
        // unnamed fields keep their defaults
        assert!(cfg.body_node);
        assert_eq!(cfg.new_weight, -1.0);
    }
}
