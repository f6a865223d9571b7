//! Plan explanation.
//!
//! Renders an operator tree with each node's estimated output size and I/O
//! cost, without executing anything.

use super::operator::QueryOperator;

/// Render `op` and its inputs as an indented tree.
///
/// ```text
/// -> BNLJ on id = user_id (buffers: 5) [rows=100, pages=4, io=7]
///    -> Scan users [rows=100, pages=2, io=2]
///    -> Materialize [rows=300, pages=3, io=3]
///       -> Scan posts [rows=300, pages=3, io=3]
/// ```
pub fn explain(op: &dyn QueryOperator) -> String {
    let mut out = String::new();
    render(op, 0, &mut out);
    out
}

fn render(op: &dyn QueryOperator, depth: usize, out: &mut String) {
    let stats = op.estimate_stats();
    out.push_str(&format!(
        "{:indent$}-> {} [rows={}, pages={}, io={}]\n",
        "",
        op.describe(),
        stats.num_records,
        stats.num_pages(),
        op.estimate_io_cost(),
        indent = depth * 3
    ));
    for child in op.children() {
        render(child, depth + 1, out);
    }
}
