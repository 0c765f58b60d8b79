//! Calibration tree relating a period to its shaped sub-periods.

use helios_core::periods::LoadShapedDateRange;

use crate::error::CurveResult;
use crate::shape::ratio_curve::DailyShapeRatioCurve;

/// Index of a node within a [`ShapeRatioTree`] arena.
pub type NodeIndex = usize;

#[derive(Debug, Clone)]
struct Node {
    period: LoadShapedDateRange,
    edges: Vec<(f64, NodeIndex)>,
}

/// A tree of calibration ratios over nested delivery periods.
///
/// Nodes live in an arena indexed by [`NodeIndex`]; each edge carries the
/// raw calibration ratio between a node and one of its children. Ratios
/// need not be pre-normalized: [`ShapeRatioTree::relative_price_map`]
/// normalizes level by level so that pricing any node off a flat underlying
/// curve reproduces its children's ratios exactly.
#[derive(Debug, Clone)]
pub struct ShapeRatioTree {
    nodes: Vec<Node>,
}

impl ShapeRatioTree {
    /// Creates a tree holding only the root period.
    #[must_use]
    pub fn new(root: LoadShapedDateRange) -> Self {
        Self {
            nodes: vec![Node {
                period: root,
                edges: Vec::new(),
            }],
        }
    }

    /// The root node index.
    #[must_use]
    pub fn root(&self) -> NodeIndex {
        0
    }

    /// The period of `node`.
    #[must_use]
    pub fn period(&self, node: NodeIndex) -> LoadShapedDateRange {
        self.nodes[node].period
    }

    /// Appends `period` as a child of `parent` with calibration `ratio`,
    /// returning the new node's index.
    pub fn add_child(
        &mut self,
        parent: NodeIndex,
        ratio: f64,
        period: LoadShapedDateRange,
    ) -> NodeIndex {
        let child = self.nodes.len();
        self.nodes.push(Node {
            period,
            edges: Vec::new(),
        });
        self.nodes[parent].edges.push((ratio, child));
        child
    }

    /// The normalized relative price of every leaf period.
    ///
    /// A leaf maps to 1. An internal node bootstraps a synthetic ratio
    /// curve over its direct children's raw ratios, then rescales each
    /// child's sub-map by `curve.price(leaf) / curve.price(node)` so the
    /// result is arbitrage-free at every level of the hierarchy.
    ///
    /// # Errors
    ///
    /// Propagates bootstrap and pricing failures of the synthetic curves.
    pub fn relative_price_map(&self) -> CurveResult<Vec<(LoadShapedDateRange, f64)>> {
        self.relative_prices(self.root())
    }

    fn relative_prices(&self, index: NodeIndex) -> CurveResult<Vec<(LoadShapedDateRange, f64)>> {
        let node = &self.nodes[index];
        if node.edges.is_empty() {
            return Ok(vec![(node.period, 1.0)]);
        }
        let immediate: Vec<(LoadShapedDateRange, f64)> = node
            .edges
            .iter()
            .map(|&(ratio, child)| (self.nodes[child].period, ratio))
            .collect();
        let curve = DailyShapeRatioCurve::new(immediate)?;
        let normalization = curve.price(&node.period)?;
        let mut result = Vec::new();
        for &(_, child) in &node.edges {
            for (leaf, sub_ratio) in self.relative_prices(child)? {
                let scaled = sub_ratio * curve.price(&leaf)? / normalization;
                result.push((leaf, scaled));
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use helios_core::periods::{DateRange, BASE, WEEKDAY, WEEKEND};

    fn base(range: &str) -> LoadShapedDateRange {
        LoadShapedDateRange::new(range.parse::<DateRange>().unwrap(), BASE)
    }

    #[test]
    fn test_leaf_maps_to_one() {
        let tree = ShapeRatioTree::new(base("2016-M1"));
        assert_eq!(tree.relative_price_map().unwrap(), vec![(base("2016-M1"), 1.0)]);
    }

    #[test]
    fn test_single_level_normalization() {
        let q1 = base("2016-Q1");
        let mut tree = ShapeRatioTree::new(q1);
        let ratios = [1.2, 1.0, 0.9];
        for (month, ratio) in q1.split_by_month().unwrap().into_iter().zip(ratios) {
            tree.add_child(tree.root(), ratio, month);
        }
        let map = tree.relative_price_map().unwrap();
        assert_eq!(map.len(), 3);
        // duration-weighted average of the map is exactly 1
        let curve = DailyShapeRatioCurve::new(map).unwrap();
        assert_relative_eq!(curve.price(&q1).unwrap(), 1.0, epsilon = 1e-12);
        // pairwise ratios survive normalization
        let months = q1.split_by_month().unwrap();
        let jan = curve.price(&months[0]).unwrap();
        let mar = curve.price(&months[2]).unwrap();
        assert_relative_eq!(jan / mar, 1.2 / 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_two_level_tree_stays_arbitrage_free() {
        let q1 = base("2016-Q1");
        let mut tree = ShapeRatioTree::new(q1);
        for (month, ratio) in q1
            .split_by_month()
            .unwrap()
            .into_iter()
            .zip([1.2, 1.0, 0.9])
        {
            let month_node = tree.add_child(tree.root(), ratio, month);
            tree.add_child(
                month_node,
                1.1,
                LoadShapedDateRange::new(month.date_range(), WEEKDAY),
            );
            tree.add_child(
                month_node,
                1.0,
                LoadShapedDateRange::new(month.date_range(), WEEKEND),
            );
        }
        let map = tree.relative_price_map().unwrap();
        assert_eq!(map.len(), 6);
        let curve = DailyShapeRatioCurve::new(map).unwrap();
        // the root still prices at 1 after two levels of rescaling
        assert_relative_eq!(curve.price(&q1).unwrap(), 1.0, epsilon = 1e-12);
        // weekday/weekend ratio holds within each month
        let feb = base("2016-M2");
        let weekday = curve
            .price(&LoadShapedDateRange::new(feb.date_range(), WEEKDAY))
            .unwrap();
        let weekend = curve
            .price(&LoadShapedDateRange::new(feb.date_range(), WEEKEND))
            .unwrap();
        assert_relative_eq!(weekday / weekend, 1.1, epsilon = 1e-12);
    }
}
