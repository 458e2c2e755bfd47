//! Constant folding and trivial algebraic identities.
//!
//! Simplification never changes the domain of the node it rewrites: an
//! identity such as `0 + x -> x` is only applied when `x` already carries the
//! result's domain.

use super::node::{BinaryOp, NodeKind, Symbol, UnaryOp};

impl Symbol {
    pub fn simplify(&self) -> Symbol {
        match self.kind() {
            NodeKind::Scalar(_)
            | NodeKind::StateVariable { .. }
            | NodeKind::SpatialVariable { .. }
            | NodeKind::Parameter { .. }
            | NodeKind::ExternalVariable { .. } => self.clone(),
            NodeKind::Unary(op, child) => self.simplify_unary(*op, &child.simplify()),
            NodeKind::Binary(op, l, r) => self.simplify_binary(*op, &l.simplify(), &r.simplify()),
            NodeKind::Outer(l, r) => {
                let (l, r) = (l.simplify(), r.simplify());
                if l.is_scalar_value(1.0) {
                    r
                } else {
                    self.rebuild(NodeKind::Outer(l, r))
                }
            }
            NodeKind::Broadcast(child) => self.rebuild(NodeKind::Broadcast(child.simplify())),
            NodeKind::Concatenation(children) => {
                self.rebuild(NodeKind::Concatenation(children.iter().map(Symbol::simplify).collect()))
            }
            NodeKind::Average(child) => {
                let child = child.simplify();
                match child.kind() {
                    NodeKind::Average(_) => child,
                    NodeKind::Broadcast(_) | NodeKind::Concatenation(_) => child.average().simplify(),
                    _ if child.domain().is_empty() => child,
                    _ => self.rebuild(NodeKind::Average(child)),
                }
            }
        }
    }

    fn rebuild(&self, kind: NodeKind) -> Symbol {
        Symbol::from_node(kind, self.domain().clone())
    }

    fn simplify_unary(&self, op: UnaryOp, child: &Symbol) -> Symbol {
        if let Some(v) = child.as_scalar() {
            let folded = match op {
                UnaryOp::Negate => Some(-v),
                UnaryOp::Exp => Some(v.exp()),
                UnaryOp::Log if v > 0.0 => Some(v.ln()),
                UnaryOp::Sinh => Some(v.sinh()),
                _ => None,
            };
            if let Some(value) = folded {
                return Symbol::scalar(value);
            }
        }
        if let (UnaryOp::Negate, NodeKind::Unary(UnaryOp::Negate, inner)) = (op, child.kind()) {
            return inner.clone();
        }
        self.rebuild(NodeKind::Unary(op, child.clone()))
    }

    fn simplify_binary(&self, op: BinaryOp, l: &Symbol, r: &Symbol) -> Symbol {
        if let (Some(a), Some(b)) = (l.as_scalar(), r.as_scalar()) {
            let folded = match op {
                BinaryOp::Add => Some(a + b),
                BinaryOp::Subtract => Some(a - b),
                BinaryOp::Multiply => Some(a * b),
                BinaryOp::Divide if b != 0.0 => Some(a / b),
                BinaryOp::Divide => None,
            };
            if let Some(value) = folded {
                return Symbol::scalar(value);
            }
        }

        let keeps_domain = |s: &Symbol| s.domain() == self.domain();
        match op {
            BinaryOp::Add if l.is_scalar_value(0.0) && keeps_domain(r) => return r.clone(),
            BinaryOp::Add | BinaryOp::Subtract if r.is_scalar_value(0.0) && keeps_domain(l) => return l.clone(),
            BinaryOp::Subtract if l.is_scalar_value(0.0) && keeps_domain(r) => return r.neg(),
            BinaryOp::Multiply if l.is_scalar_value(1.0) && keeps_domain(r) => return r.clone(),
            BinaryOp::Multiply | BinaryOp::Divide if r.is_scalar_value(1.0) && keeps_domain(l) => return l.clone(),
            _ => {}
        }
        self.rebuild(NodeKind::Binary(op, l.clone(), r.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::node::spatial_variable_for;
    use crate::symbol::Subdomain;

    #[test]
    fn test_folds_constant_subtrees() {
        let e = Symbol::scalar(0.0)
            .sub(&Symbol::scalar(0.02))
            .unwrap()
            .sub(&Symbol::scalar(0.1))
            .unwrap();
        let v = e.simplify().as_scalar().unwrap();
        assert!((v + 0.12).abs() < 1e-12);
        assert_eq!(Symbol::scalar(0.0).exp().simplify(), Symbol::scalar(1.0));
    }

    #[test]
    fn test_identities_keep_domain() {
        let x = spatial_variable_for(Subdomain::Separator);
        assert_eq!(Symbol::scalar(0.0).add(&x).unwrap().simplify(), x);
        assert_eq!(x.mul(&Symbol::scalar(1.0)).unwrap().simplify(), x);
        assert_eq!(x.neg().neg().simplify(), x);
        assert_eq!(Symbol::outer(&Symbol::scalar(1.0), &x).unwrap().simplify(), x);
    }

    #[test]
    fn test_division_by_zero_is_not_folded() {
        let e = Symbol::scalar(1.0).div(&Symbol::scalar(0.0)).unwrap();
        assert!(e.simplify().as_scalar().is_none());
    }

    #[test]
    fn test_average_of_broadcast_simplifies_through() {
        let b = Symbol::scalar(2.0)
            .add(&Symbol::scalar(1.0))
            .unwrap()
            .broadcast(Subdomain::PositiveElectrode)
            .unwrap();
        assert_eq!(b.average().simplify(), Symbol::scalar(3.0));
    }
}
