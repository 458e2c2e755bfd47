//! Arithmetic and transcendental constructors with domain inference.
//!
//! Binary operations are fallible because combining fields defined on
//! different subdomains is a modelling error that must surface at assembly
//! time. Unary operations never change the domain.

use super::domain::Domain;
use super::node::{BinaryOp, NodeKind, Symbol, UnaryOp};
use crate::error::{ModelError, Result};

/// Domain of a binary operation: a domain-independent operand adopts the
/// other operand's domain, otherwise both must agree.
pub(crate) fn combined_domain(op: &str, left: &Domain, right: &Domain) -> Result<Domain> {
    if left.is_empty() {
        Ok(right.clone())
    } else if right.is_empty() || left == right {
        Ok(left.clone())
    } else {
        Err(ModelError::DomainMismatch {
            op: op.to_string(),
            left: left.clone(),
            right: right.clone(),
        })
    }
}

#[allow(clippy::should_implement_trait)]
impl Symbol {
    pub fn binary(op: BinaryOp, left: &Symbol, right: &Symbol) -> Result<Symbol> {
        let domain = combined_domain(op.name(), left.domain(), right.domain())?;
        Ok(Symbol::from_node(NodeKind::Binary(op, left.clone(), right.clone()), domain))
    }

    pub fn add(&self, other: &Symbol) -> Result<Symbol> {
        Symbol::binary(BinaryOp::Add, self, other)
    }

    pub fn sub(&self, other: &Symbol) -> Result<Symbol> {
        Symbol::binary(BinaryOp::Subtract, self, other)
    }

    pub fn mul(&self, other: &Symbol) -> Result<Symbol> {
        Symbol::binary(BinaryOp::Multiply, self, other)
    }

    pub fn div(&self, other: &Symbol) -> Result<Symbol> {
        Symbol::binary(BinaryOp::Divide, self, other)
    }

    /// `factor * self`. Never fails since the factor has no domain.
    pub fn scale(&self, factor: f64) -> Symbol {
        Symbol::from_node(
            NodeKind::Binary(BinaryOp::Multiply, Symbol::scalar(factor), self.clone()),
            self.domain().clone(),
        )
    }

    fn unary(&self, op: UnaryOp) -> Symbol {
        Symbol::from_node(NodeKind::Unary(op, self.clone()), self.domain().clone())
    }

    pub fn neg(&self) -> Symbol {
        self.unary(UnaryOp::Negate)
    }

    pub fn exp(&self) -> Symbol {
        self.unary(UnaryOp::Exp)
    }

    pub fn log(&self) -> Symbol {
        self.unary(UnaryOp::Log)
    }

    pub fn sinh(&self) -> Symbol {
        self.unary(UnaryOp::Sinh)
    }

    /// Spatial gradient. Only defined for fields that live on a domain.
    pub fn gradient(&self) -> Result<Symbol> {
        self.require_domain("Gradient")?;
        Ok(self.unary(UnaryOp::Gradient))
    }

    pub fn divergence(&self) -> Result<Symbol> {
        self.require_domain("Divergence")?;
        Ok(self.unary(UnaryOp::Divergence))
    }

    /// Outer product of a domain-independent value with a spatial field.
    /// The result lives on the right operand's domain.
    pub fn outer(left: &Symbol, right: &Symbol) -> Result<Symbol> {
        if !left.domain().is_empty() || right.domain().is_empty() {
            return Err(ModelError::DomainMismatch {
                op: "Outer".to_string(),
                left: left.domain().clone(),
                right: right.domain().clone(),
            });
        }
        Ok(Symbol::from_node(
            NodeKind::Outer(left.clone(), right.clone()),
            right.domain().clone(),
        ))
    }

    fn require_domain(&self, op: &str) -> Result<()> {
        if self.domain().is_empty() {
            return Err(ModelError::DomainMismatch {
                op: op.to_string(),
                left: Domain::empty(),
                right: Domain::empty(),
            });
        }
        Ok(())
    }
}
