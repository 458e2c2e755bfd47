//! Broadcasts, concatenations, orphans and averages: the primitives that
//! stitch per-subdomain fields into whole-cell fields and back.

use super::domain::{Domain, Subdomain};
use super::node::{BinaryOp, NodeKind, Symbol};
use crate::error::{ModelError, Result};
use smallvec::SmallVec;

impl Symbol {
    /// Lifts a domain-independent value onto `target` without changing its value.
    pub fn broadcast(&self, target: impl Into<Domain>) -> Result<Symbol> {
        let target = target.into();
        if !self.domain().is_empty() || target.is_empty() {
            return Err(ModelError::DomainMismatch {
                op: "Broadcast".to_string(),
                left: self.domain().clone(),
                right: target,
            });
        }
        Ok(Symbol::from_node(NodeKind::Broadcast(self.clone()), target))
    }

    /// Joins fields over disjoint subdomains into one piecewise field.
    ///
    /// Children must be supplied in canonical spatial order
    /// (negative electrode, separator, positive electrode).
    pub fn concatenation(children: impl IntoIterator<Item = Symbol>) -> Result<Symbol> {
        let children: SmallVec<[Symbol; 3]> = children.into_iter().collect();
        if children.is_empty() {
            return Err(ModelError::InvalidConcatenation {
                reason: "no children supplied".to_string(),
            });
        }

        let mut covered = Domain::empty();
        let mut last: Option<Subdomain> = None;
        for child in &children {
            if child.domain().is_empty() {
                return Err(ModelError::InvalidConcatenation {
                    reason: format!("child '{}' has no domain", child),
                });
            }
            for &subdomain in child.domain().subdomains() {
                if covered.contains(subdomain) {
                    return Err(ModelError::InvalidConcatenation {
                        reason: format!("domains overlap on '{}'", subdomain),
                    });
                }
                if let Some(previous) = last {
                    if subdomain < previous {
                        return Err(ModelError::InvalidConcatenation {
                            reason: format!("'{}' supplied after '{}'", subdomain, previous),
                        });
                    }
                }
                covered = covered.union(&Domain::from(subdomain));
                last = Some(subdomain);
            }
        }

        Ok(Symbol::from_node(NodeKind::Concatenation(children), covered))
    }

    /// Independent copies of the pieces of a concatenation, in order.
    pub fn orphans(&self) -> Result<Vec<Symbol>> {
        match self.kind() {
            NodeKind::Concatenation(children) => Ok(children.iter().map(Symbol::deep_copy).collect()),
            _ => Err(ModelError::NotConcatenation {
                expression: self.to_string(),
            }),
        }
    }

    /// Thickness-weighted mean over the symbol's domain, as a domain-independent symbol.
    pub fn average(&self) -> Symbol {
        if self.domain().is_empty() {
            return self.clone();
        }
        match self.kind() {
            NodeKind::Broadcast(child) => child.clone(),
            NodeKind::Concatenation(children) if children.len() > 1 => {
                // sum(l_i * avg(c_i)) / sum(l_i)
                let mut numerator: Option<Symbol> = None;
                let mut total: Option<Symbol> = None;
                for child in children {
                    let l = thickness(child.domain());
                    let term = domainless(BinaryOp::Multiply, &l, &child.average());
                    numerator = Some(match numerator {
                        Some(acc) => domainless(BinaryOp::Add, &acc, &term),
                        None => term,
                    });
                    total = Some(match total {
                        Some(acc) => domainless(BinaryOp::Add, &acc, &l),
                        None => l,
                    });
                }
                match (numerator, total) {
                    (Some(n), Some(d)) => domainless(BinaryOp::Divide, &n, &d),
                    _ => Symbol::from_node(NodeKind::Average(self.clone()), Domain::empty()),
                }
            }
            NodeKind::Concatenation(children) => children[0].average(),
            _ => Symbol::from_node(NodeKind::Average(self.clone()), Domain::empty()),
        }
    }
}

/// Combined thickness parameter of the subdomains in `domain`.
fn thickness(domain: &Domain) -> Symbol {
    domain
        .subdomains()
        .iter()
        .map(|s| Symbol::parameter(s.thickness_parameter()))
        .reduce(|acc, l| domainless(BinaryOp::Add, &acc, &l))
        .unwrap_or_else(|| Symbol::scalar(0.0))
}

fn domainless(op: BinaryOp, left: &Symbol, right: &Symbol) -> Symbol {
    Symbol::from_node(NodeKind::Binary(op, left.clone(), right.clone()), Domain::empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ParameterValues;
    use crate::symbol::node::spatial_variable_for;

    fn cell_broadcast(values: [f64; 3]) -> Symbol {
        Symbol::concatenation(
            Subdomain::CELL
                .iter()
                .zip(values)
                .map(|(s, v)| Symbol::scalar(v).broadcast(*s).unwrap()),
        )
        .unwrap()
    }

    #[test]
    fn test_broadcast_requires_domainless_source() {
        let x = spatial_variable_for(Subdomain::NegativeElectrode);
        assert!(x.broadcast(Subdomain::Separator).is_err());
        assert!(Symbol::scalar(1.0).broadcast(Domain::empty()).is_err());
        let b = Symbol::scalar(1.0).broadcast(Domain::whole_cell()).unwrap();
        assert_eq!(b.domain(), &Domain::whole_cell());
    }

    #[test]
    fn test_average_of_broadcast_is_identity() {
        let s = Symbol::parameter("U").sub(&Symbol::scalar(0.1)).unwrap();
        for target in [
            Domain::from(Subdomain::NegativeElectrode),
            Domain::from(Subdomain::Separator),
            Domain::whole_cell(),
        ] {
            assert_eq!(s.broadcast(target).unwrap().average(), s);
        }
    }

    #[test]
    fn test_concatenation_rejects_wrong_order() {
        let n = Symbol::scalar(0.0).broadcast(Subdomain::NegativeElectrode).unwrap();
        let s = Symbol::scalar(0.0).broadcast(Subdomain::Separator).unwrap();
        let err = Symbol::concatenation([s, n]).unwrap_err();
        match err {
            ModelError::InvalidConcatenation { reason } => assert!(reason.contains("after"), "{}", reason),
            other => panic!("Wrong error type: {:?}", other),
        }
    }

    #[test]
    fn test_concatenation_rejects_overlap() {
        let n = Symbol::scalar(0.0).broadcast(Subdomain::NegativeElectrode).unwrap();
        let ns = Symbol::scalar(0.0)
            .broadcast(Domain::new([Subdomain::NegativeElectrode, Subdomain::Separator]))
            .unwrap();
        let err = Symbol::concatenation([n, ns]).unwrap_err();
        assert!(err.to_string().contains("overlap"));
        assert!(Symbol::concatenation(Vec::new()).is_err());
        assert!(Symbol::concatenation([Symbol::scalar(1.0)]).is_err());
    }

    #[test]
    fn test_orphans_are_detached_equal_pieces() {
        let pieces: Vec<Symbol> = Subdomain::CELL.iter().map(|s| spatial_variable_for(*s).exp()).collect();
        let whole = Symbol::concatenation(pieces.clone()).unwrap();
        let orphans = whole.orphans().unwrap();

        assert_eq!(orphans.len(), 3);
        let mut union = Domain::empty();
        for (orphan, original) in orphans.iter().zip(&pieces) {
            assert_eq!(orphan, original);
            assert!(!orphan.ptr_eq(original));
            union = union.union(orphan.domain());
        }
        assert_eq!(&union, whole.domain());
    }

    #[test]
    fn test_orphans_of_non_concatenation_fail() {
        let err = Symbol::scalar(1.0).orphans().unwrap_err();
        assert!(matches!(err, ModelError::NotConcatenation { .. }));
    }

    #[test]
    fn test_average_of_concatenation_is_thickness_weighted() {
        let eps = cell_broadcast([0.3, 0.5, 0.2]);
        let avg = eps.average();
        assert!(avg.domain().is_empty());

        let mut params = ParameterValues::new();
        params.insert(Subdomain::NegativeElectrode.thickness_parameter(), 0.25);
        params.insert(Subdomain::Separator.thickness_parameter(), 0.5);
        params.insert(Subdomain::PositiveElectrode.thickness_parameter(), 0.25);
        let value = params.process_symbol(&avg).unwrap().simplify().as_scalar().unwrap();
        let expected = (0.25 * 0.3 + 0.5 * 0.5 + 0.25 * 0.2) / 1.0;
        assert!((value - expected).abs() < 1e-12);
    }

    #[test]
    fn test_two_piece_concatenation() {
        let regions = [Subdomain::NegativeElectrode, Subdomain::Separator];
        let pieces: Vec<Symbol> = regions
            .iter()
            .zip([0.4, 1.0])
            .map(|(s, v)| Symbol::scalar(v).broadcast(*s).unwrap())
            .collect();
        let joined = Symbol::concatenation(pieces.clone()).unwrap();
        assert_eq!(joined.domain(), &Domain::new(regions));

        let orphans = joined.orphans().unwrap();
        assert_eq!(orphans, pieces);
        assert!(orphans.iter().zip(&pieces).all(|(o, p)| !o.ptr_eq(p)));

        let mut params = ParameterValues::new();
        params.insert(Subdomain::NegativeElectrode.thickness_parameter(), 0.3);
        params.insert(Subdomain::Separator.thickness_parameter(), 0.1);
        let value = params.process_symbol(&joined.average()).unwrap().simplify().as_scalar().unwrap();
        let expected = (0.3 * 0.4 + 0.1 * 1.0) / 0.4;
        assert!((value - expected).abs() < 1e-12);
    }

    #[test]
    fn test_average_of_spatial_field_is_deferred() {
        let x = spatial_variable_for(Subdomain::PositiveElectrode);
        let avg = x.average();
        assert!(matches!(avg.kind(), NodeKind::Average(_)));
        assert!(avg.domain().is_empty());
    }
}
