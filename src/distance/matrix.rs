//! Dense distance matrix.

use serde::{Deserialize, Serialize};

use crate::models::Node;

/// A dense n×n distance matrix stored in row-major order.
///
/// Built once before the instance is assembled and read-only afterwards.
/// Supports Euclidean computation from node coordinates, an explicit grid,
/// or an arbitrary pairwise oracle (e.g. haversine or road distances).
///
/// # Examples
///
/// ```
/// use u_cvrptw::models::Node;
/// use u_cvrptw::distance::DistanceMatrix;
///
/// let nodes = vec![
///     Node::depot(0.0, 0.0),
///     Node::customer(1, 3.0, 4.0, 10.0, 5.0),
///     Node::customer(2, 6.0, 8.0, 20.0, 5.0),
/// ];
/// let dm = DistanceMatrix::from_nodes(&nodes);
/// assert!((dm.get(0, 1) - 5.0).abs() < 1e-10);
/// assert_eq!(dm.size(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates a distance matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Computes a Euclidean distance matrix from node coordinates.
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let n = nodes.len();
        let mut dm = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = nodes[i].distance_to(&nodes[j]);
                dm.set(i, j, d);
                dm.set(j, i, d);
            }
        }
        dm
    }

    /// Builds a matrix by querying a distance oracle for every ordered pair.
    ///
    /// The diagonal is always zero.
    pub fn from_fn(size: usize, mut oracle: impl FnMut(usize, usize) -> f64) -> Self {
        let mut dm = Self::new(size);
        for i in 0..size {
            for j in 0..size {
                if i != j {
                    dm.set(i, j, oracle(i, j));
                }
            }
        }
        dm
    }

    /// Creates a distance matrix from an explicit n×n grid.
    ///
    /// Returns `None` if the data length doesn't match `size * size`.
    pub fn from_data(size: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != size * size {
            return None;
        }
        Some(Self { data, size })
    }

    /// Returns the distance from location `from` to location `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the distance from location `from` to location `to`.
    pub fn set(&mut self, from: usize, to: usize, distance: f64) {
        self.data[from * self.size + to] = distance;
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of stored entries; `size²` for a well-formed matrix.
    pub fn num_entries(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the matrix is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Returns the first entry that is negative or not finite, if any.
    pub fn first_invalid_entry(&self) -> Option<(usize, usize, f64)> {
        self.data.iter().enumerate().find_map(|(k, &d)| {
            (!d.is_finite() || d < 0.0).then(|| (k / self.size, k % self.size, d))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_nodes() -> Vec<Node> {
        vec![
            Node::depot(0.0, 0.0),
            Node::customer(1, 3.0, 4.0, 10.0, 5.0),
            Node::customer(2, 0.0, 8.0, 20.0, 5.0),
        ]
    }

    #[test]
    fn test_from_nodes() {
        let dm = DistanceMatrix::from_nodes(&sample_nodes());
        assert_eq!(dm.size(), 3);
        assert!((dm.get(0, 1) - 5.0).abs() < 1e-10);
        assert!((dm.get(0, 2) - 8.0).abs() < 1e-10);
        assert!(dm.get(0, 0).abs() < 1e-10);
        assert!(dm.is_symmetric(1e-10));
    }

    #[test]
    fn test_from_fn_asymmetric() {
        let dm = DistanceMatrix::from_fn(3, |i, j| if i < j { 2.0 } else { 3.0 });
        assert_eq!(dm.get(0, 0), 0.0);
        assert_eq!(dm.get(0, 2), 2.0);
        assert_eq!(dm.get(2, 0), 3.0);
        assert!(!dm.is_symmetric(1e-10));
    }

    #[test]
    fn test_from_data() {
        let dm = DistanceMatrix::from_data(2, vec![0.0, 5.0, 5.0, 0.0]).expect("valid");
        assert_eq!(dm.get(0, 1), 5.0);
        assert!(DistanceMatrix::from_data(2, vec![0.0, 1.0, 2.0]).is_none());
    }

    #[test]
    fn test_invalid_entry() {
        let mut dm = DistanceMatrix::new(2);
        assert_eq!(dm.first_invalid_entry(), None);
        dm.set(1, 0, -4.0);
        assert_eq!(dm.first_invalid_entry(), Some((1, 0, -4.0)));
    }
}
