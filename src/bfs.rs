use petgraph::graphmap::DiGraphMap;
use petgraph::visit::Bfs;

// BFS traversal of the link graph from the root link.
// Returns link ids in visiting order: every parent before its children,
// siblings in the order their joints were added to the graph.
pub(super) fn bfs(graph: &DiGraphMap<usize, usize>, start: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(graph.node_count());
    let mut bfs = Bfs::new(graph, start);
    while let Some(link) = bfs.next(graph) {
        order.push(link);
    }
    order
}
