use std::cmp::Ordering;

use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    pub id: usize,
    pub distance: f32,
}

#[derive(Debug, Clone, Default)]
pub struct KdTreeBuilder {
    points: Vec<(Vec3, usize)>,
}

impl KdTreeBuilder {
    pub fn insert(&mut self, position: Vec3, id: usize) {
        self.points.push((position, id));
    }

    pub fn build(mut self) -> KdTree {
        let mut nodes = Vec::with_capacity(self.points.len());
        let root = build_node(&mut self.points, 0, &mut nodes);
        KdTree { nodes, root }
    }
}

#[derive(Debug, Clone, Copy)]
struct KdNode {
    position: Vec3,
    id: usize,
    axis: usize,
    left: Option<u32>,
    right: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    root: Option<u32>,
}

impl KdTree {
    pub fn build(points: impl IntoIterator<Item = (Vec3, usize)>) -> Self {
        let mut builder = KdTreeBuilder::default();
        for (position, id) in points {
            builder.insert(position, id);
        }
        builder.build()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[KdNode], node: Option<u32>) -> usize {
            match node {
                None => 0,
                Some(idx) => {
                    let node = &nodes[idx as usize];
                    1 + walk(nodes, node.left).max(walk(nodes, node.right))
                }
            }
        }
        walk(&self.nodes, self.root)
    }

    /// Closest point to `query`. Equal distances resolve to the lower id.
    pub fn nearest(&self, query: Vec3) -> Option<Nearest> {
        let root = self.root?;
        let mut best: Option<(f32, usize)> = None;
        self.search(root, query, &mut best);
        best.map(|(dist_sq, id)| Nearest {
            id,
            distance: dist_sq.sqrt(),
        })
    }

    fn search(&self, node: u32, query: Vec3, best: &mut Option<(f32, usize)>) {
        let node = &self.nodes[node as usize];
        let dist_sq = node.position.distance_squared(query);
        let closer = match *best {
            None => true,
            Some((best_sq, best_id)) => {
                dist_sq < best_sq || (dist_sq == best_sq && node.id < best_id)
            }
        };
        if closer {
            *best = Some((dist_sq, node.id));
        }

        let delta = query[node.axis] - node.position[node.axis];
        let (near, far) = if delta <= 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };
        if let Some(near) = near {
            self.search(near, query, best);
        }
        if let Some(far) = far {
            // Points on the far side sit at least |delta| away on this axis.
            let reachable = match *best {
                None => true,
                Some((best_sq, _)) => delta * delta <= best_sq,
            };
            if reachable {
                self.search(far, query, best);
            }
        }
    }
}

fn build_node(points: &mut [(Vec3, usize)], depth: usize, nodes: &mut Vec<KdNode>) -> Option<u32> {
    if points.is_empty() {
        return None;
    }
    let axis = depth % 3;
    let mid = points.len() / 2;
    points.select_nth_unstable_by(mid, |a, b| compare_on_axis(a, b, axis));
    let (position, id) = points[mid];

    let index = nodes.len() as u32;
    nodes.push(KdNode {
        position,
        id,
        axis,
        left: None,
        right: None,
    });
    let (lower, rest) = points.split_at_mut(mid);
    let left = build_node(lower, depth + 1, nodes);
    let right = build_node(&mut rest[1..], depth + 1, nodes);
    let node = &mut nodes[index as usize];
    node.left = left;
    node.right = right;
    Some(index)
}

fn compare_on_axis(a: &(Vec3, usize), b: &(Vec3, usize), axis: usize) -> Ordering {
    a.0[axis]
        .total_cmp(&b.0[axis])
        .then_with(|| a.1.cmp(&b.1))
}
