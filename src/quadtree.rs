use bevy::math::Vec2;

use crate::particle::Particle;

/// References a node holds directly before it subdivides.
pub const NODE_CAPACITY: usize = 4;

/// Nodes this deep stop subdividing and keep every reference routed to them.
pub const MAX_DEPTH: u32 = 24;

/// Axis-aligned box. `y` grows "south", matching the domain's screen layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Quad {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// The box spanning `[0, extent]` on both axes.
    pub fn from_extent(extent: Vec2) -> Self {
        Self::new(extent * 0.5, extent * 0.5)
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    pub fn contains(&self, p: Vec2) -> bool {
        let (lo, hi) = (self.min(), self.max());
        (p.x >= lo.x) && (p.x <= hi.x) && (p.y >= lo.y) && (p.y <= hi.y)
    }

    /// Whether this box overlaps the square `center ± range`.
    pub fn intersects_square(&self, center: Vec2, range: f32) -> bool {
        let (lo, hi) = (self.min(), self.max());
        !(center.x + range < lo.x
            || center.x - range > hi.x
            || center.y + range < lo.y
            || center.y - range > hi.y)
    }

    /// Children in `[NE, NW, SE, SW]` order.
    pub fn subdivide(&self) -> [Quad; 4] {
        let h = self.half_extents * 0.5;
        [
            Quad::new(self.center + Vec2::new(h.x, -h.y), h), // NE
            Quad::new(self.center + Vec2::new(-h.x, -h.y), h), // NW
            Quad::new(self.center + Vec2::new(h.x, h.y), h), // SE
            Quad::new(self.center + Vec2::new(-h.x, h.y), h), // SW
        ]
    }
}

/// A quadrant of the index.
///
/// Once a node subdivides, the references it already holds stay where they are;
/// only later inserts are routed to the children. Queries visit both.
#[derive(Debug)]
pub struct Node {
    quad: Quad,
    depth: u32,
    items: Vec<usize>,
    children: Option<Box<[Node; 4]>>,
}

impl Node {
    fn new(quad: Quad, depth: u32) -> Self {
        Self {
            quad,
            depth,
            items: Vec::with_capacity(NODE_CAPACITY),
            children: None,
        }
    }

    pub fn quad(&self) -> Quad {
        self.quad
    }

    pub fn items(&self) -> &[usize] {
        &self.items
    }

    pub fn children(&self) -> Option<&[Node; 4]> {
        self.children.as_deref()
    }

    pub fn is_subdivided(&self) -> bool {
        self.children.is_some()
    }

    /// Assumes `p` lies inside this node; the routing below keeps that true
    /// for the child without re-testing bounds that shrink toward float precision.
    fn insert(&mut self, index: usize, p: Vec2) {
        if self.items.len() < NODE_CAPACITY || self.depth >= MAX_DEPTH {
            self.items.push(index);
            return;
        }
        let depth = self.depth + 1;
        let quad = self.quad;
        let children = self
            .children
            .get_or_insert_with(|| Box::new(quad.subdivide().map(|q| Node::new(q, depth))));
        children[child_index(p, quad)].insert(index, p)
    }

    fn query(&self, particles: &[Particle], center: Vec2, range: f32, found: &mut Vec<usize>) {
        if !self.quad.intersects_square(center, range) {
            return;
        }
        let range2 = range * range;
        for &i in &self.items {
            if let Some(p) = particles.get(i) {
                if p.pos.distance_squared(center) < range2 {
                    found.push(i);
                }
            }
        }
        if let Some(children) = &self.children {
            for c in children.iter() {
                c.query(particles, center, range, found);
            }
        }
    }
}

/// Routes east when strictly right of center and south when strictly below it.
fn child_index(p: Vec2, quad: Quad) -> usize {
    let east = p.x > quad.center.x;
    let south = p.y > quad.center.y;
    match (east, south) {
        (true, false) => 0,  // NE
        (false, false) => 1, // NW
        (true, true) => 2,   // SE
        (false, true) => 3,  // SW
    }
}

/// Spatial index over particle indices, rebuilt from scratch every frame.
///
/// The tree stores indices into a [`Population`](crate::particle::Population)
/// and reads positions from the slice passed to [`QuadTree::query_range`], so
/// it must not outlive the frame it was built for. Dropping it releases every
/// node.
#[derive(Debug)]
pub struct QuadTree {
    root: Node,
    len: usize,
}

impl QuadTree {
    pub fn new(bounds: Quad) -> Self {
        Self {
            root: Node::new(bounds, 0),
            len: 0,
        }
    }

    /// Builds a tree holding every particle of `particles` that lies inside `bounds`.
    pub fn build(bounds: Quad, particles: &[Particle]) -> Self {
        let mut qt = Self::new(bounds);
        for (i, p) in particles.iter().enumerate() {
            qt.insert(i, p.pos);
        }
        qt
    }

    /// Inserts `index` at position `p`. Returns `false` if `p` is outside the root.
    pub fn insert(&mut self, index: usize, p: Vec2) -> bool {
        if !self.root.quad.contains(p) {
            return false;
        }
        self.root.insert(index, p);
        self.len += 1;
        true
    }

    /// Collects indices whose particle lies strictly closer than `range` to `center`.
    pub fn query_range(
        &self,
        particles: &[Particle],
        center: Vec2,
        range: f32,
        found: &mut Vec<usize>,
    ) {
        self.root.query(particles, center, range, found);
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Number of references held by the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn node_count(&self) -> usize {
        fn count(node: &Node) -> usize {
            1 + node
                .children()
                .map_or(0, |c| c.iter().map(count).sum::<usize>())
        }
        count(&self.root)
    }

    /// Deepest node level; a lone root is depth 0.
    pub fn depth(&self) -> u32 {
        fn walk(node: &Node) -> u32 {
            match node.children() {
                Some(c) => c.iter().map(walk).max().unwrap_or(node.depth),
                None => node.depth,
            }
        }
        walk(&self.root)
    }
}
