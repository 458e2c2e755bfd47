//! Uniform one-dimensional finite-volume mesh through the cell.
//!
//! The cell occupies `[0, l_n + l_s + l_p]` with the subdomains laid out in
//! canonical order. Each subdomain is split into equal cells; field values
//! live at cell centres.

use crate::error::{ModelError, Result};
use crate::parameters::ParameterValues;
use crate::symbol::{Domain, Subdomain};
use serde::{Deserialize, Serialize};

/// Number of cells per subdomain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeshPoints {
    #[serde(rename = "negative electrode")]
    pub negative: usize,
    #[serde(rename = "separator")]
    pub separator: usize,
    #[serde(rename = "positive electrode")]
    pub positive: usize,
}

impl MeshPoints {
    pub fn get(&self, subdomain: Subdomain) -> usize {
        match subdomain {
            Subdomain::NegativeElectrode => self.negative,
            Subdomain::Separator => self.separator,
            Subdomain::PositiveElectrode => self.positive,
        }
    }
}

impl Default for MeshPoints {
    fn default() -> Self {
        Self { negative: 10, separator: 10, positive: 10 }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct SubMesh {
    /// `n + 1` cell faces.
    edges: Vec<f64>,
}

impl SubMesh {
    fn uniform(start: f64, length: f64, npts: usize) -> Self {
        let dx = length / npts as f64;
        Self { edges: (0..=npts).map(|i| start + dx * i as f64).collect() }
    }

    fn npts(&self) -> usize {
        self.edges.len() - 1
    }

    fn nodes(&self) -> impl Iterator<Item = f64> + '_ {
        self.edges.windows(2).map(|w| 0.5 * (w[0] + w[1]))
    }

    fn widths(&self) -> impl Iterator<Item = f64> + '_ {
        self.edges.windows(2).map(|w| w[1] - w[0])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    submeshes: [SubMesh; 3],
}

impl Mesh {
    /// Builds the mesh from the geometric thickness parameters.
    pub fn new(parameters: &ParameterValues, points: &MeshPoints) -> Result<Self> {
        let mut start = 0.0;
        let mut submeshes = Vec::with_capacity(3);
        for subdomain in Subdomain::CELL {
            let name = subdomain.thickness_parameter();
            let length = parameters
                .value(name)
                .ok_or_else(|| ModelError::UnresolvedParameter { name: name.to_string() })?;
            let npts = points.get(subdomain);
            if !(length > 0.0) || npts == 0 {
                return Err(ModelError::Configuration(format!(
                    "'{}' needs a positive thickness and at least one point (got {} and {})",
                    subdomain, length, npts
                )));
            }
            submeshes.push(SubMesh::uniform(start, length, npts));
            start += length;
        }
        let submeshes: [SubMesh; 3] = submeshes
            .try_into()
            .map_err(|_| ModelError::Configuration("expected three subdomains".to_string()))?;
        Ok(Self { submeshes })
    }

    fn submesh(&self, subdomain: Subdomain) -> &SubMesh {
        match subdomain {
            Subdomain::NegativeElectrode => &self.submeshes[0],
            Subdomain::Separator => &self.submeshes[1],
            Subdomain::PositiveElectrode => &self.submeshes[2],
        }
    }

    /// Cells in `domain`; a domain-less quantity occupies one slot.
    pub fn npts(&self, domain: &Domain) -> usize {
        if domain.is_empty() {
            return 1;
        }
        domain.subdomains().iter().map(|s| self.submesh(*s).npts()).sum()
    }

    pub fn nodes(&self, domain: &Domain) -> Vec<f64> {
        domain.subdomains().iter().flat_map(|s| self.submesh(*s).nodes()).collect()
    }

    pub fn widths(&self, domain: &Domain) -> Vec<f64> {
        domain.subdomains().iter().flat_map(|s| self.submesh(*s).widths()).collect()
    }

    /// Outer faces of the first and last cell of `domain`.
    pub fn bounds(&self, domain: &Domain) -> Option<(f64, f64)> {
        let first = domain.subdomains().first()?;
        let last = domain.subdomains().last()?;
        Some((self.submesh(*first).edges[0], *self.submesh(*last).edges.last()?))
    }
}
