//! Pure rendering of a flat list of archived spans into an indented tree.

use crate::span::Span;
use std::collections::{HashMap, HashSet};

/// Render archived spans as an indented tree for human display.
///
/// Parents render before their children; siblings render in chronological
/// start order (ties keep archive insertion order). A span whose parent is
/// absent from the list is treated as a root. Spans that never closed
/// render without a duration.
pub fn format_trace_tree(spans: &[Span]) -> String {
    let known_ids: HashSet<&str> = spans.iter().map(|span| span.id.as_str()).collect();

    let mut children: HashMap<&str, Vec<&Span>> = HashMap::new();
    let mut roots: Vec<&Span> = Vec::new();
    for span in spans {
        match span.parent_id.as_deref().filter(|id| known_ids.contains(id)) {
            Some(parent) => children.entry(parent).or_default().push(span),
            None => roots.push(span),
        }
    }
    roots.sort_by_key(|span| span.started_at);
    for siblings in children.values_mut() {
        siblings.sort_by_key(|span| span.started_at);
    }

    let mut out = String::new();
    for root in roots {
        render(root, &children, 0, &mut out);
    }
    out
}

fn render(span: &Span, children: &HashMap<&str, Vec<&Span>>, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let prefix = if depth == 0 { "" } else { "└─ " };
    let timing = match span.duration_ms {
        Some(ms) => format!("{ms:.2}ms"),
        None => "unfinished".to_string(),
    };
    out.push_str(&format!("{indent}{prefix}{} ({timing})\n", span.name));

    if let Some(nested) = children.get(span.id.as_str()) {
        for child in nested {
            render(child, children, depth + 1, out);
        }
    }
}
