//! Cycle discovery over index-addressed adjacency lists.

/// Find cycles by depth-first traversal, reporting every back edge as a cycle.
///
/// Each cycle is the path from the revisited node's position on the current traversal path to the
/// node that closed it, followed by the revisited node again, so the last element equals the first.
/// Traversal uses an explicit frame stack; depth is bounded only by memory.
pub fn find_cycles(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let n = adjacency.len();
    let mut visited = vec![false; n];
    let mut path_pos: Vec<Option<usize>> = vec![None; n];
    let mut cycles = Vec::new();

    for start in 0..n {
        if visited[start] {
            continue;
        }

        let mut path: Vec<usize> = vec![start];
        // (node, index of the next successor to look at)
        let mut frames: Vec<(usize, usize)> = vec![(start, 0)];
        visited[start] = true;
        path_pos[start] = Some(0);

        while let Some(frame) = frames.last_mut() {
            let (node, next) = *frame;
            match adjacency[node].get(next) {
                Some(&succ) => {
                    frame.1 += 1;
                    if succ >= n {
                        continue;
                    }
                    if let Some(pos) = path_pos[succ] {
                        let mut cycle = path[pos..].to_vec();
                        cycle.push(succ);
                        cycles.push(cycle);
                    } else if !visited[succ] {
                        visited[succ] = true;
                        path_pos[succ] = Some(path.len());
                        path.push(succ);
                        frames.push((succ, 0));
                    }
                }
                None => {
                    frames.pop();
                    path.pop();
                    path_pos[node] = None;
                }
            }
        }
    }

    cycles
}
