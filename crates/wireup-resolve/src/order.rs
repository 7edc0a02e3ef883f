//! Dependency-first topological ordering over an edge map.
//!
//! Depth-first search with the classic three-color marking: white nodes are
//! unvisited, gray nodes are on the current path, black nodes are done.
//! Meeting a gray node is a back-edge, reported as a cycle with its full
//! path. Postorder emission places every dependency before its dependents
//! and the walk root at the tail.

use std::collections::HashMap;

use wireup_common::error::{Result, WireupError};

use crate::resolver::EdgeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Orders the resources of `edge_map` reachable from `root` so that every
/// provider precedes its requirers; `root` comes last.
///
/// Siblings are visited in edge declaration order, which ties back to
/// catalog insertion order, so the result is deterministic.
///
/// # Errors
///
/// Returns [`WireupError::CycleDetected`] with the cycle as a closed walk
/// of resource names.
pub fn topological_order(edge_map: &EdgeMap, root: &str) -> Result<Vec<String>> {
    let mut colors: HashMap<&str, Color> = HashMap::new();
    let mut path: Vec<String> = Vec::new();
    let mut order: Vec<String> = Vec::new();

    if edge_map.contains(root) {
        visit(edge_map, root, &mut colors, &mut path, &mut order)?;
    }
    Ok(order)
}

fn visit<'a>(
    edge_map: &'a EdgeMap,
    name: &'a str,
    colors: &mut HashMap<&'a str, Color>,
    path: &mut Vec<String>,
    order: &mut Vec<String>,
) -> Result<()> {
    let _ = colors.insert(name, Color::Gray);
    path.push(name.to_string());

    for edge in edge_map.get(name).unwrap_or_default() {
        let dep = edge.provider.owner.as_str();
        match colors.get(dep).copied().unwrap_or(Color::White) {
            Color::White => visit(edge_map, dep, colors, path, order)?,
            Color::Gray => {
                let start = path.iter().position(|n| n == dep).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].to_vec();
                cycle.push(dep.to_string());
                return Err(WireupError::CycleDetected { path: cycle });
            }
            Color::Black => {}
        }
    }

    let _ = path.pop();
    let _ = colors.insert(name, Color::Black);
    order.push(name.to_string());
    Ok(())
}
