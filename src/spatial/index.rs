use rstar::{RTree, primitives::GeomWithData};

/// Nearest-neighbor lookup over a fixed set of planar points.
pub trait NearestIndex {
    /// Euclidean distance to the closest point and that point's index, or `None` when empty.
    fn nearest(&self, query: [f64; 2]) -> Option<(f64, usize)>;
}

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// R-tree backed [`NearestIndex`]. Point indices are positions in the slice it was built from.
pub struct RTreeIndex {
    tree: RTree<IndexedPoint>,
}

impl RTreeIndex {
    pub fn new(points: &[[f64; 2]]) -> Self {
        Self {
            tree: RTree::bulk_load(points.iter().enumerate()
                .map(|(i, &point)| GeomWithData::new(point, i))
                .collect()),
        }
    }

    #[inline] pub fn len(&self) -> usize { self.tree.size() }

    #[inline] pub fn is_empty(&self) -> bool { self.tree.size() == 0 }
}

impl NearestIndex for RTreeIndex {
    /// Among points at exactly the same distance the lowest index wins, so results do not depend
    /// on the tree layout. Exact ties do not happen with real coordinates; the rule only makes
    /// runs reproducible.
    fn nearest(&self, query: [f64; 2]) -> Option<(f64, usize)> {
        let mut candidates = self.tree.nearest_neighbor_iter_with_distance_2(&query);
        let (first, best_d2) = candidates.next()?;
        let best = candidates
            .take_while(|&(_, d2)| d2 == best_d2)
            .map(|(point, _)| point.data)
            .fold(first.data, usize::min);
        Some((best_d2.sqrt(), best))
    }
}
