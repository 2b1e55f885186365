use crate::compute::{BreakevenStatus, FunnelReport};
use std::fmt::Write;

/// Fixed-width table of per-node results followed by funnel totals.
pub fn format_summary(report: &FunnelReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16} {:<9} {:>10} {:>9} {:>9} {:>12} {:>9}",
        "node", "kind", "in", "buyers", "declined", "revenue", "epc"
    );
    for row in &report.nodes {
        let _ = writeln!(
            out,
            "{:<16} {:<9} {:>10} {:>9} {:>9} {:>12.2} {:>9.4}",
            row.node_id,
            row.kind.to_string(),
            row.traffic_in,
            row.buyers,
            row.declined,
            row.revenue,
            row.epc
        );
    }

    let t = &report.totals;
    let _ = writeln!(out, "--------------------------------------------------");
    let _ = writeln!(out, "Revenue: {:.2}  Cost: {:.2}  Profit: {:.2}", t.total_revenue, t.total_cost, t.total_profit);
    let _ = writeln!(out, "Blended EPC: {:.4} over {} visitors", t.blended_epc, t.total_inbound);

    let status = match report.breakeven_status {
        BreakevenStatus::Above => "above",
        BreakevenStatus::AtBreakeven => "at",
        BreakevenStatus::Below => "below",
        BreakevenStatus::Unreachable => "unreachable",
    };
    match report.breakeven_visitors {
        Some(v) => { let _ = writeln!(out, "Breakeven: {} visitors ({})", v, status); }
        None => { let _ = writeln!(out, "Breakeven: none ({})", status); }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{simulate, SimulationOptions};
    use crate::store::{FunnelGraph, NodeKind, OfferNode, TrafficSource};

    #[test]
    fn test_summary_lists_nodes_and_totals() {
        let g = FunnelGraph::build(
            vec![OfferNode::new("F", NodeKind::Frontend, 50.0, 20.0)],
            vec![],
            vec![TrafficSource::new("s1", "Ads", 1000, 300.0)],
        )
        .unwrap();
        let out = format_summary(&simulate(&g, &SimulationOptions::default()).unwrap());

        assert!(out.lines().nth(1).unwrap().starts_with("F "));
        assert!(out.contains("Revenue: 10000.00  Cost: 300.00  Profit: 9700.00"));
        assert!(out.contains("Blended EPC: 10.0000 over 1000 visitors"));
        assert!(out.contains("Breakeven: 30 visitors (above)"));
    }

    #[test]
    fn test_summary_without_revenue() {
        let g = FunnelGraph::build(
            vec![OfferNode::new("F", NodeKind::Frontend, 0.0, 20.0)],
            vec![],
            vec![TrafficSource::new("s1", "Ads", 10, 5.0)],
        )
        .unwrap();
        let out = format_summary(&simulate(&g, &SimulationOptions::default()).unwrap());
        assert!(out.contains("Breakeven: none (unreachable)"));
    }
}
