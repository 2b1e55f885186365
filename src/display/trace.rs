use crate::compute::{FunnelReport, NodeReport};
use crate::store::{Branch, FunnelGraph, NodeId};
use std::collections::HashMap;
use std::fmt::Write;

/// Renders the funnel as a tree from the entry offer, one line per node.
///
/// A node fed by several parents is printed in full the first time and as a
/// reference afterwards, so shared tails are not repeated.
pub fn format_trace(graph: &FunnelGraph, report: &FunnelReport) -> String {
    let mut tracer = Tracer {
        graph,
        rows: report.nodes.iter().map(|n| (n.node_id.as_str(), n)).collect(),
        visited_at_level: HashMap::new(),
        output: String::new(),
    };

    let entry = graph.entry();
    let _ = writeln!(tracer.output, "FUNNEL TRACE from '{}':", graph.node(entry).id);
    let _ = writeln!(tracer.output, "--------------------------------------------------");
    tracer.trace_from(entry);

    if !report.dangling.is_empty() {
        let _ = writeln!(tracer.output, "Dangling: {}", report.dangling.join(", "));
    }
    tracer.output
}

struct Tracer<'a> {
    graph: &'a FunnelGraph,
    rows: HashMap<&'a str, &'a NodeReport>,
    visited_at_level: HashMap<NodeId, usize>,
    output: String,
}

impl<'a> Tracer<'a> {
    /// Depth-first walk from `root` with an explicit stack of pending frames.
    ///
    /// Children are pushed in reverse so they pop in branch order, giving the
    /// same pre-order a recursive walk would.
    fn trace_from(&mut self, root: NodeId) {
        let mut stack = vec![(root, 1usize, String::new())];

        while let Some((node_id, level, prefix)) = stack.pop() {
            if let Some(&first_seen) = self.visited_at_level.get(&node_id) {
                let _ = writeln!(self.output, "{}-> {} (Ref to L{})", prefix, self.graph.node(node_id).id, first_seen);
                continue;
            }
            self.visited_at_level.insert(node_id, level);
            self.write_row(node_id, level, &prefix);

            let children = self.graph.successors(node_id);
            let stem = build_child_stem(&prefix);
            for (i, &(branch, child)) in children.iter().enumerate().rev() {
                let connector = if i == children.len() - 1 { "`--" } else { "|--" };
                let label = match branch {
                    Branch::Buy => "buy",
                    Branch::NoThanks => "no",
                };
                stack.push((child, level + 1, format!("{}{} {}: ", stem, connector, label)));
            }
        }
    }

    fn write_row(&mut self, node_id: NodeId, level: usize, prefix: &str) {
        let node = self.graph.node(node_id);
        let header = format!("[L{}] {} ({}, {:.2} @ {}%)", level, node.id, node.kind, node.price, node.conversion_rate);
        match self.rows.get(node.id.as_str()) {
            Some(row) => {
                let _ = writeln!(
                    self.output,
                    "{}{} in={} buy={} decline={} rev={:.2} epc={:.4}",
                    prefix, header, row.traffic_in, row.buyers, row.declined, row.revenue, row.epc
                );
            }
            None => {
                let _ = writeln!(self.output, "{}{} [?]", prefix, header);
            }
        }
    }
}

fn build_child_stem(current_prefix: &str) -> String {
    // Keep only the tree columns; drop the branch label of the parent line.
    let cut = current_prefix
        .rfind("`--")
        .max(current_prefix.rfind("|--"))
        .map_or(current_prefix.len(), |i| i + 3);
    current_prefix[..cut].replace("`--", "   ").replace("|--", "|  ") + " "
}
