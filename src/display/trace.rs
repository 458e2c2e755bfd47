use crate::compute::{Ledger, Value};
use crate::error::{ModelError, Result};
use crate::symbol::{NodeKind, Symbol};
use crate::variables::VariableRegistry;
use std::collections::HashMap;
use std::fmt::Write;

/// Renders the expression tree behind `name` as an indented audit trace.
///
/// Subtrees that are themselves registry variables are labelled with their
/// name; a node shared by several parents is printed once and referenced by
/// level afterwards.
pub fn format_trace(registry: &VariableRegistry, name: &str) -> Result<String> {
    trace(registry, None, name)
}

/// Like `format_trace`, with the ledger value of every labelled node.
pub fn format_trace_with_values(registry: &VariableRegistry, ledger: &Ledger, name: &str) -> Result<String> {
    trace(registry, Some(ledger), name)
}

fn trace(registry: &VariableRegistry, ledger: Option<&Ledger>, name: &str) -> Result<String> {
    let root = registry
        .as_map()
        .get(name)
        .ok_or_else(|| ModelError::KeyNotFound { name: name.to_string() })?;

    // First name wins when one symbol is stored under several keys.
    let mut labels: HashMap<&Symbol, &str> = HashMap::new();
    for (key, symbol) in registry.iter() {
        labels.entry(symbol).or_insert(key);
    }
    labels.insert(root, name);

    let mut tracer = Tracer { labels, ledger, visited_at_level: HashMap::new(), output: String::new() };
    let _ = writeln!(tracer.output, "AUDIT TRACE for variable '{}':", name);
    let _ = writeln!(tracer.output, "--------------------------------------------------");
    tracer.trace_node(root, 1, "");
    Ok(tracer.output)
}

struct Tracer<'a> {
    labels: HashMap<&'a Symbol, &'a str>,
    ledger: Option<&'a Ledger>,
    visited_at_level: HashMap<usize, usize>,
    output: String,
}

impl<'a> Tracer<'a> {
    fn trace_node(&mut self, symbol: &Symbol, level: usize, prefix: &str) {
        if let Some(&first_seen) = self.visited_at_level.get(&symbol.address()) {
            let _ = writeln!(self.output, "{}-> (Ref to L{})", prefix, first_seen);
            return;
        }
        let children = symbol.children();
        // Leaves are cheap to repeat and would only clutter the references.
        if !children.is_empty() {
            self.visited_at_level.insert(symbol.address(), level);
        }

        let header = match self.labels.get(symbol) {
            Some(label) => format!("[L{}] {}{} = ", level, label, self.format_value(label)),
            None => format!("[L{}] ", level),
        };
        let _ = writeln!(self.output, "{}{}{}", prefix, header, describe(symbol));

        let stem = child_stem(prefix);
        for (i, child) in children.iter().enumerate() {
            let connector = if i == children.len() - 1 { "`--" } else { "|--" };
            self.trace_node(child, level + 1, &format!("{}{}", stem, connector));
        }
    }

    fn format_value(&self, label: &str) -> String {
        let Some(ledger) = self.ledger else {
            return String::new();
        };
        match ledger.get(label) {
            Some(Ok(Value::Scalar(s))) => format!(" [{:.3}]", s),
            Some(Ok(Value::Series(v))) if v.len() == 1 => format!(" [{:.3}]", v[0]),
            Some(Ok(Value::Series(v))) => match v.first() {
                Some(first) => format!(" [{:.3}, ... len={}]", first, v.len()),
                None => " [len=0]".to_string(),
            },
            Some(Err(e)) => format!(" [Err: {}]", e),
            None => " [?]".to_string(),
        }
    }
}

/// Continuation of `prefix` for the next level: a finished branch becomes
/// blank, an open one keeps its bar.
fn child_stem(prefix: &str) -> String {
    if let Some(stem) = prefix.strip_suffix("`--") {
        format!("{}   ", stem)
    } else if let Some(stem) = prefix.strip_suffix("|--") {
        format!("{}|  ", stem)
    } else {
        prefix.to_string()
    }
}

fn describe(symbol: &Symbol) -> String {
    let domain = if symbol.domain().is_empty() { String::new() } else { format!(" on {}", symbol.domain()) };
    match symbol.kind() {
        NodeKind::Scalar(v) => format!("Scalar({})", v),
        NodeKind::StateVariable { name, .. } => format!("State '{}'{}", name, domain),
        NodeKind::SpatialVariable { name } => format!("Coordinate '{}'{}", name, domain),
        NodeKind::Parameter { name } => format!("Parameter '{}'", name),
        NodeKind::ExternalVariable { name } => format!("External '{}'{}", name, domain),
        NodeKind::Unary(op, _) => format!("{}{}", op.name(), domain),
        NodeKind::Binary(op, _, _) => format!("{}{}", op.name(), domain),
        NodeKind::Outer(_, _) => format!("Outer{}", domain),
        NodeKind::Broadcast(_) => format!("Broadcast{}", domain),
        NodeKind::Concatenation(_) => format!("Concatenation{}", domain),
        NodeKind::Average(_) => "Average".to_string(),
    }
}
