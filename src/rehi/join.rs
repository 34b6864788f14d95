//! Lookup of institution attributes by (name, region)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RiskError};
use crate::institution::Institution;

/// What to do with a loss row whose key matches no institution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinPolicy {
    /// Unmatched key is a `MissingField` error
    #[default]
    Strict,
    /// Unmatched key falls back to default attributes
    Left,
}

/// Attributes the index needs beyond loss-to-equity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinedAttributes {
    pub npl_ratio: f64,
    pub tli: f64,
    pub diversification_index: f64,
    pub total_assets_jpy: f64,
    pub matched: bool,
}

impl JoinedAttributes {
    /// Defaults for an institution with no attribute record
    pub fn unmatched() -> Self {
        Self {
            npl_ratio: 0.0,
            tli: 0.0,
            diversification_index: 0.0,
            total_assets_jpy: 1.0,
            matched: false,
        }
    }

    fn from_institution(institution: &Institution) -> Self {
        Self {
            npl_ratio: institution.npl_ratio,
            tli: institution.tli,
            diversification_index: institution.diversification_index,
            total_assets_jpy: institution.total_assets_jpy,
            matched: true,
        }
    }
}

/// Exact-match map from (name, region) to institution
#[derive(Debug, Clone)]
pub struct InstitutionIndex<'a> {
    by_key: HashMap<(String, String), &'a Institution>,
}

impl<'a> InstitutionIndex<'a> {
    /// Build the index; a repeated (name, region) pair is rejected
    pub fn build(institutions: &'a [Institution]) -> Result<Self> {
        let mut by_key = HashMap::with_capacity(institutions.len());
        for institution in institutions {
            let key = (institution.name.clone(), institution.region.clone());
            if by_key.insert(key, institution).is_some() {
                return Err(RiskError::invalid(
                    "name",
                    format!(
                        "duplicate institution `{}` in region `{}`",
                        institution.name, institution.region
                    ),
                ));
            }
        }
        Ok(Self { by_key })
    }

    pub fn get(&self, name: &str, region: &str) -> Option<&'a Institution> {
        self.by_key
            .get(&(name.to_string(), region.to_string()))
            .copied()
    }

    /// Resolve attributes for a key under `policy`
    pub fn resolve(&self, name: &str, region: &str, policy: JoinPolicy) -> Result<JoinedAttributes> {
        match (self.get(name, region), policy) {
            (Some(institution), _) => Ok(JoinedAttributes::from_institution(institution)),
            (None, JoinPolicy::Left) => Ok(JoinedAttributes::unmatched()),
            (None, JoinPolicy::Strict) => Err(RiskError::missing(
                name,
                format!("institution attributes for region `{}`", region),
            )),
        }
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
