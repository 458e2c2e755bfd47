//! Defines `Symbol`, the immutable expression node every model is built from.
//!
//! A symbol is a reference-counted handle to a node; cloning a symbol aliases
//! the same subtree, so shared subexpressions are never copied. Each node caches
//! its structural hash at construction so equality and map lookups stay cheap
//! for deep trees.

use super::domain::{Domain, Subdomain};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identity of a state variable within one model context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct VariableId(pub u32);

impl VariableId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negate,
    Exp,
    Log,
    Sinh,
    Gradient,
    Divergence,
}

impl UnaryOp {
    pub fn name(&self) -> &'static str {
        match self {
            UnaryOp::Negate => "Negate",
            UnaryOp::Exp => "Exp",
            UnaryOp::Log => "Log",
            UnaryOp::Sinh => "Sinh",
            UnaryOp::Gradient => "Gradient",
            UnaryOp::Divergence => "Divergence",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    pub fn name(&self) -> &'static str {
        match self {
            BinaryOp::Add => "Add",
            BinaryOp::Subtract => "Subtract",
            BinaryOp::Multiply => "Multiply",
            BinaryOp::Divide => "Divide",
        }
    }

    pub(crate) fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
        }
    }
}

/// The variant payload of a node. The node's domain lives beside it in `Node`.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Scalar(f64),
    StateVariable { id: VariableId, name: String },
    SpatialVariable { name: String },
    Parameter { name: String },
    /// A value supplied from outside the model at evaluation time.
    ExternalVariable { name: String },
    Unary(UnaryOp, Symbol),
    Binary(BinaryOp, Symbol, Symbol),
    /// Outer product of a domain-independent left operand with a spatial right operand.
    Outer(Symbol, Symbol),
    Broadcast(Symbol),
    Concatenation(SmallVec<[Symbol; 3]>),
    /// Integral mean over the child's domain.
    Average(Symbol),
}

// Scalars compare by bit pattern so that equality agrees with the cached hash.
impl PartialEq for NodeKind {
    fn eq(&self, other: &Self) -> bool {
        use NodeKind::*;
        match (self, other) {
            (Scalar(a), Scalar(b)) => a.to_bits() == b.to_bits(),
            (StateVariable { id: a, name: na }, StateVariable { id: b, name: nb }) => a == b && na == nb,
            (SpatialVariable { name: a }, SpatialVariable { name: b }) => a == b,
            (Parameter { name: a }, Parameter { name: b }) => a == b,
            (ExternalVariable { name: a }, ExternalVariable { name: b }) => a == b,
            (Unary(oa, a), Unary(ob, b)) => oa == ob && a == b,
            (Binary(oa, la, ra), Binary(ob, lb, rb)) => oa == ob && la == lb && ra == rb,
            (Outer(la, ra), Outer(lb, rb)) => la == lb && ra == rb,
            (Broadcast(a), Broadcast(b)) => a == b,
            (Concatenation(a), Concatenation(b)) => a == b,
            (Average(a), Average(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct Node {
    kind: NodeKind,
    domain: Domain,
    hash: u64,
}

/// A shared, immutable expression tree.
#[derive(Clone)]
pub struct Symbol(Arc<Node>);

impl Symbol {
    /// Wraps a node without validating its domain. Callers guarantee the domain
    /// was derived from the children by the construction rules.
    pub(crate) fn from_node(kind: NodeKind, domain: Domain) -> Self {
        let hash = structural_hash(&kind, &domain);
        Symbol(Arc::new(Node { kind, domain, hash }))
    }

    // --- Leaves ---

    pub fn scalar(value: f64) -> Self {
        Self::from_node(NodeKind::Scalar(value), Domain::empty())
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Self::from_node(NodeKind::Parameter { name: name.into() }, Domain::empty())
    }

    pub fn spatial_variable(name: impl Into<String>, domain: impl Into<Domain>) -> Self {
        Self::from_node(NodeKind::SpatialVariable { name: name.into() }, domain.into())
    }

    pub fn external_variable(name: impl Into<String>, domain: impl Into<Domain>) -> Self {
        Self::from_node(NodeKind::ExternalVariable { name: name.into() }, domain.into())
    }

    /// State variable handles are normally obtained from a `ModelContext`,
    /// which keeps ids unique within one assembly.
    pub(crate) fn state_variable(id: VariableId, name: impl Into<String>, domain: impl Into<Domain>) -> Self {
        Self::from_node(NodeKind::StateVariable { id, name: name.into() }, domain.into())
    }

    // --- Accessors ---

    pub fn kind(&self) -> &NodeKind {
        &self.0.kind
    }

    pub fn domain(&self) -> &Domain {
        &self.0.domain
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self.kind() {
            NodeKind::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_scalar_value(&self, value: f64) -> bool {
        self.as_scalar() == Some(value)
    }

    pub fn is_state_variable(&self) -> bool {
        matches!(self.kind(), NodeKind::StateVariable { .. })
    }

    /// The name of a named leaf.
    pub fn name(&self) -> Option<&str> {
        match self.kind() {
            NodeKind::StateVariable { name, .. }
            | NodeKind::SpatialVariable { name }
            | NodeKind::Parameter { name }
            | NodeKind::ExternalVariable { name } => Some(name),
            _ => None,
        }
    }

    pub fn variable_id(&self) -> Option<VariableId> {
        match self.kind() {
            NodeKind::StateVariable { id, .. } => Some(*id),
            _ => None,
        }
    }

    pub fn children(&self) -> SmallVec<[&Symbol; 3]> {
        match self.kind() {
            NodeKind::Scalar(_)
            | NodeKind::StateVariable { .. }
            | NodeKind::SpatialVariable { .. }
            | NodeKind::Parameter { .. }
            | NodeKind::ExternalVariable { .. } => SmallVec::new(),
            NodeKind::Unary(_, c) | NodeKind::Broadcast(c) | NodeKind::Average(c) => smallvec::smallvec![c],
            NodeKind::Binary(_, l, r) | NodeKind::Outer(l, r) => smallvec::smallvec![l, r],
            NodeKind::Concatenation(cs) => cs.iter().collect(),
        }
    }

    /// Whether both handles point at the same node.
    pub fn ptr_eq(&self, other: &Symbol) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn address(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    // --- Traversal ---

    /// Pre-order traversal.
    pub fn visit(&self, f: &mut impl FnMut(&Symbol)) {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }

    /// Unique state variables in first-encounter order.
    pub fn state_variables(&self) -> Vec<Symbol> {
        let mut found: Vec<Symbol> = Vec::new();
        self.visit(&mut |s| {
            if s.is_state_variable() && !found.contains(s) {
                found.push(s.clone());
            }
        });
        found
    }

    pub fn parameters(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.visit(&mut |s| {
            if let NodeKind::Parameter { name } = s.kind() {
                names.insert(name.clone());
            }
        });
        names
    }

    pub fn external_variables(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.visit(&mut |s| {
            if let NodeKind::ExternalVariable { name } = s.kind() {
                names.insert(name.clone());
            }
        });
        names
    }

    /// Union of the domains of state, spatial and external leaves that are
    /// reachable without passing through an `Average`.
    pub fn referenced_domain(&self) -> Domain {
        match self.kind() {
            NodeKind::StateVariable { .. }
            | NodeKind::SpatialVariable { .. }
            | NodeKind::ExternalVariable { .. } => self.domain().clone(),
            NodeKind::Average(_) => Domain::empty(),
            _ => self
                .children()
                .iter()
                .fold(Domain::empty(), |acc, c| acc.union(&c.referenced_domain())),
        }
    }

    /// Rebuilds the tree, replacing every node for which `f` returns a
    /// replacement. Replacements are not visited again.
    ///
    /// Domains of rebuilt interior nodes are kept as they were, so a
    /// replacement must be domain-compatible with the node it stands in for.
    pub fn replace(&self, f: &mut impl FnMut(&Symbol) -> crate::Result<Option<Symbol>>) -> crate::Result<Symbol> {
        if let Some(replacement) = f(self)? {
            return Ok(replacement);
        }
        let kind = match self.kind() {
            NodeKind::Scalar(_)
            | NodeKind::StateVariable { .. }
            | NodeKind::SpatialVariable { .. }
            | NodeKind::Parameter { .. }
            | NodeKind::ExternalVariable { .. } => return Ok(self.clone()),
            NodeKind::Unary(op, c) => NodeKind::Unary(*op, c.replace(f)?),
            NodeKind::Binary(op, l, r) => NodeKind::Binary(*op, l.replace(f)?, r.replace(f)?),
            NodeKind::Outer(l, r) => NodeKind::Outer(l.replace(f)?, r.replace(f)?),
            NodeKind::Broadcast(c) => NodeKind::Broadcast(c.replace(f)?),
            NodeKind::Concatenation(cs) => {
                NodeKind::Concatenation(cs.iter().map(|c| c.replace(f)).collect::<crate::Result<_>>()?)
            }
            NodeKind::Average(c) => NodeKind::Average(c.replace(f)?),
        };
        Ok(Symbol::from_node(kind, self.domain().clone()))
    }

    /// A structurally equal tree that shares no nodes with `self`.
    pub fn deep_copy(&self) -> Symbol {
        let kind = match self.kind() {
            NodeKind::Unary(op, c) => NodeKind::Unary(*op, c.deep_copy()),
            NodeKind::Binary(op, l, r) => NodeKind::Binary(*op, l.deep_copy(), r.deep_copy()),
            NodeKind::Outer(l, r) => NodeKind::Outer(l.deep_copy(), r.deep_copy()),
            NodeKind::Broadcast(c) => NodeKind::Broadcast(c.deep_copy()),
            NodeKind::Concatenation(cs) => NodeKind::Concatenation(cs.iter().map(Symbol::deep_copy).collect()),
            NodeKind::Average(c) => NodeKind::Average(c.deep_copy()),
            leaf => leaf.clone(),
        };
        Symbol::from_node(kind, self.domain().clone())
    }
}

fn structural_hash(kind: &NodeKind, domain: &Domain) -> u64 {
    let mut h = DefaultHasher::new();
    std::mem::discriminant(kind).hash(&mut h);
    domain.hash(&mut h);
    match kind {
        NodeKind::Scalar(v) => v.to_bits().hash(&mut h),
        NodeKind::StateVariable { id, name } => {
            id.hash(&mut h);
            name.hash(&mut h);
        }
        NodeKind::SpatialVariable { name } | NodeKind::Parameter { name } | NodeKind::ExternalVariable { name } => {
            name.hash(&mut h)
        }
        NodeKind::Unary(op, c) => {
            op.hash(&mut h);
            c.0.hash.hash(&mut h);
        }
        NodeKind::Binary(op, l, r) => {
            op.hash(&mut h);
            l.0.hash.hash(&mut h);
            r.0.hash.hash(&mut h);
        }
        NodeKind::Outer(l, r) => {
            l.0.hash.hash(&mut h);
            r.0.hash.hash(&mut h);
        }
        NodeKind::Broadcast(c) | NodeKind::Average(c) => c.0.hash.hash(&mut h),
        NodeKind::Concatenation(cs) => {
            for c in cs {
                c.0.hash.hash(&mut h);
            }
        }
    }
    h.finish()
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.0.hash == other.0.hash && self.0.domain == other.0.domain && self.0.kind == other.0.kind)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash.hash(state);
    }
}

impl From<f64> for Symbol {
    fn from(value: f64) -> Self {
        Symbol::scalar(value)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            NodeKind::Scalar(v) => write!(f, "{}", v),
            NodeKind::StateVariable { name, .. }
            | NodeKind::SpatialVariable { name }
            | NodeKind::Parameter { name }
            | NodeKind::ExternalVariable { name } => f.write_str(name),
            NodeKind::Unary(UnaryOp::Negate, c) => write!(f, "-{}", c),
            NodeKind::Unary(op, c) => write!(f, "{}({})", op.name().to_lowercase(), c),
            NodeKind::Binary(op, l, r) => write!(f, "({} {} {})", l, op.symbol(), r),
            NodeKind::Outer(l, r) => write!(f, "outer({}, {})", l, r),
            NodeKind::Broadcast(c) => write!(f, "broadcast({}, {})", c, self.domain()),
            NodeKind::Concatenation(cs) => {
                let parts: Vec<String> = cs.iter().map(|c| c.to_string()).collect();
                write!(f, "concatenation({})", parts.join(", "))
            }
            NodeKind::Average(c) => write!(f, "average({})", c),
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({} on {})", self, self.domain())
    }
}

/// Builds the canonical through-cell spatial variable for a subdomain.
pub(crate) fn spatial_variable_for(subdomain: Subdomain) -> Symbol {
    let name = match subdomain {
        Subdomain::NegativeElectrode => "x_n",
        Subdomain::Separator => "x_s",
        Subdomain::PositiveElectrode => "x_p",
    };
    Symbol::spatial_variable(name, subdomain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_structural_equality_ignores_identity() {
        let a = Symbol::parameter("a");
        let b = Symbol::parameter("a");
        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
        assert_ne!(a, Symbol::parameter("b"));
    }

    #[test]
    fn test_scalar_equality_uses_bits() {
        assert_eq!(Symbol::scalar(f64::NAN), Symbol::scalar(f64::NAN));
        assert_ne!(Symbol::scalar(0.0), Symbol::scalar(-0.0));
    }

    #[test]
    fn test_domain_is_part_of_identity() {
        let n = Symbol::spatial_variable("x", Subdomain::NegativeElectrode);
        let p = Symbol::spatial_variable("x", Subdomain::PositiveElectrode);
        assert_ne!(n, p);
    }

    #[test]
    fn test_symbols_key_hash_sets() {
        let x = spatial_variable_for(Subdomain::Separator);
        let mut set = HashSet::new();
        set.insert(x.clone());
        set.insert(x.deep_copy());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_deep_copy_shares_no_nodes() {
        let x = spatial_variable_for(Subdomain::NegativeElectrode);
        let e = x.mul(&Symbol::parameter("k")).unwrap().exp();
        let copy = e.deep_copy();
        assert_eq!(copy, e);
        assert!(!copy.ptr_eq(&e));
        assert!(!copy.children()[0].ptr_eq(e.children()[0]));
    }

    #[test]
    fn test_leaf_queries() {
        let l = Symbol::state_variable(VariableId(3), "L", Subdomain::NegativeElectrode);
        let e = l.mul(&Symbol::parameter("k")).unwrap().add(&l).unwrap();
        assert_eq!(e.state_variables(), vec![l.clone()]);
        assert_eq!(e.parameters().into_iter().collect::<Vec<_>>(), vec!["k".to_string()]);
        assert_eq!(l.variable_id(), Some(VariableId(3)));
        assert_eq!(l.name(), Some("L"));
    }

    #[test]
    fn test_referenced_domain_stops_at_average() {
        let x_p = spatial_variable_for(Subdomain::PositiveElectrode);
        assert_eq!(x_p.average().referenced_domain(), Domain::empty());
        assert_eq!(x_p.exp().referenced_domain(), Domain::from(Subdomain::PositiveElectrode));
    }

    #[test]
    fn test_display() {
        let x = spatial_variable_for(Subdomain::NegativeElectrode);
        let e = Symbol::scalar(1.0).sub(&x).unwrap().div(&Symbol::parameter("l")).unwrap();
        assert_eq!(e.to_string(), "((1 - x_n) / l)");
        assert_eq!(x.neg().exp().to_string(), "exp(-x_n)");
    }
}
