//! Spatial subdomain tags attached to every symbol.

use crate::parameters::names as param_names;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// One region of the through-cell geometry.
///
/// The declaration order is the canonical left-to-right spatial order; the
/// derived `Ord` is relied on by concatenation checks and by `Domain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Subdomain {
    #[serde(rename = "negative electrode")]
    NegativeElectrode,
    #[serde(rename = "separator")]
    Separator,
    #[serde(rename = "positive electrode")]
    PositiveElectrode,
}

impl Subdomain {
    /// The whole cell in canonical order.
    pub const CELL: [Subdomain; 3] = [
        Subdomain::NegativeElectrode,
        Subdomain::Separator,
        Subdomain::PositiveElectrode,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Subdomain::NegativeElectrode => "negative electrode",
            Subdomain::Separator => "separator",
            Subdomain::PositiveElectrode => "positive electrode",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::CELL.iter().copied().find(|s| s.name() == name)
    }

    /// Prefix used by region-level registry keys, e.g. "Separator porosity".
    pub fn label(&self) -> &'static str {
        match self {
            Subdomain::NegativeElectrode => "Negative electrode",
            Subdomain::Separator => "Separator",
            Subdomain::PositiveElectrode => "Positive electrode",
        }
    }

    /// Prefix used by electrolyte keys, e.g. "Separator electrolyte potential".
    pub fn electrolyte_label(&self) -> &'static str {
        match self {
            Subdomain::NegativeElectrode => "Negative",
            Subdomain::Separator => "Separator",
            Subdomain::PositiveElectrode => "Positive",
        }
    }

    /// Name of the dimensionless thickness parameter of this region.
    pub fn thickness_parameter(&self) -> &'static str {
        match self {
            Subdomain::NegativeElectrode => param_names::NEGATIVE_ELECTRODE_THICKNESS,
            Subdomain::Separator => param_names::SEPARATOR_THICKNESS,
            Subdomain::PositiveElectrode => param_names::POSITIVE_ELECTRODE_THICKNESS,
        }
    }
}

impl fmt::Display for Subdomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A sorted, duplicate-free set of subdomains. Empty means domain-independent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Subdomain>")]
pub struct Domain(SmallVec<[Subdomain; 3]>);

impl Domain {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(subdomains: impl IntoIterator<Item = Subdomain>) -> Self {
        let mut tags: SmallVec<[Subdomain; 3]> = subdomains.into_iter().collect();
        tags.sort();
        tags.dedup();
        Self(tags)
    }

    pub fn whole_cell() -> Self {
        Self::new(Subdomain::CELL)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn subdomains(&self) -> &[Subdomain] {
        &self.0
    }

    pub fn contains(&self, subdomain: Subdomain) -> bool {
        self.0.binary_search(&subdomain).is_ok()
    }

    pub fn is_subset(&self, other: &Domain) -> bool {
        self.0.iter().all(|s| other.contains(*s))
    }

    pub fn is_disjoint(&self, other: &Domain) -> bool {
        !self.0.iter().any(|s| other.contains(*s))
    }

    pub fn union(&self, other: &Domain) -> Domain {
        Domain::new(self.0.iter().chain(other.0.iter()).copied())
    }
}

impl From<Subdomain> for Domain {
    fn from(subdomain: Subdomain) -> Self {
        Domain::new([subdomain])
    }
}

impl From<Vec<Subdomain>> for Domain {
    fn from(subdomains: Vec<Subdomain>) -> Self {
        Domain::new(subdomains)
    }
}

impl From<&[Subdomain]> for Domain {
    fn from(subdomains: &[Subdomain]) -> Self {
        Domain::new(subdomains.iter().copied())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Subdomain::name).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_is_sorted_and_deduplicated() {
        let d = Domain::new([
            Subdomain::PositiveElectrode,
            Subdomain::NegativeElectrode,
            Subdomain::PositiveElectrode,
        ]);
        assert_eq!(
            d.subdomains(),
            &[Subdomain::NegativeElectrode, Subdomain::PositiveElectrode]
        );
        assert_eq!(d.to_string(), "[negative electrode, positive electrode]");
    }

    #[test]
    fn test_set_relations() {
        let n = Domain::from(Subdomain::NegativeElectrode);
        let cell = Domain::whole_cell();
        assert!(n.is_subset(&cell));
        assert!(!cell.is_subset(&n));
        assert!(n.is_disjoint(&Domain::from(Subdomain::Separator)));
        assert_eq!(n.union(&Domain::from(Subdomain::Separator)).subdomains().len(), 2);
        assert!(Domain::empty().is_subset(&n));
    }

    #[test]
    fn test_names_round_trip() {
        for s in Subdomain::CELL {
            assert_eq!(Subdomain::from_name(s.name()), Some(s));
        }
        assert_eq!(Subdomain::from_name("current collector"), None);
    }

    #[test]
    fn test_deserialized_domain_is_canonical() {
        let d: Domain = serde_json::from_str(
            r#"["positive electrode", "separator", "negative electrode", "separator"]"#,
        )
        .unwrap();
        assert_eq!(d, Domain::whole_cell());
        assert!(d.contains(Subdomain::PositiveElectrode));

        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, r#"["negative electrode","separator","positive electrode"]"#);
        assert_eq!(serde_json::from_str::<Domain>(&json).unwrap(), d);
    }
}
