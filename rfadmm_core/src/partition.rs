//! Feature partitioning

use core::ops::Range;

/// `j`-th of `num_parts` balanced contiguous ranges over `0.. total`.
///
/// Returns `ceil(j * total / num_parts).. ceil((j + 1) * total / num_parts)`.
/// Range lengths differ by at most one, longer ones first.
/// The same split is used for feature blocks and for sample rows of each process.
pub fn split_range(total: usize, num_parts: usize, j: usize) -> Range<usize>
{
    assert!(num_parts > 0);
    assert!(j < num_parts);

    let start = |i: usize| (i * total + num_parts - 1) / num_parts;

    start(j).. start(j + 1)
}

/// Splits `0.. total` into `num_parts` ranges.
///
/// Returns the ranges in ascending order, disjoint and covering `0.. total`.
/// Every process derives the identical result from the same arguments.
pub fn feature_partition(total: usize, num_parts: usize) -> Vec<Range<usize>>
{
    (0.. num_parts).map(|j| split_range(total, num_parts, j)).collect()
}

//

/// Feature blocks
///
/// Partition of the random feature dimension \\(D\\) into contiguous blocks \\(J_j\\).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureParts
{
    total: usize,
    ranges: Vec<Range<usize>>,
}

impl FeatureParts
{
    /// Creates an instance.
    ///
    /// * `total` is \\(D\\).
    /// * `num_parts` is a number of blocks, shall be positive.
    pub fn new(total: usize, num_parts: usize) -> Self
    {
        FeatureParts {
            total,
            ranges: feature_partition(total, num_parts),
        }
    }

    /// \\(D\\).
    pub fn total(&self) -> usize
    {
        self.total
    }

    /// Number of blocks.
    pub fn len(&self) -> usize
    {
        self.ranges.len()
    }

    /// `true` if there is no block.
    pub fn is_empty(&self) -> bool
    {
        self.ranges.is_empty()
    }

    /// Range of the `j`-th block.
    pub fn range(&self, j: usize) -> Range<usize>
    {
        self.ranges[j].clone()
    }

    /// All block ranges in ascending order.
    pub fn ranges(&self) -> &[Range<usize>]
    {
        &self.ranges
    }
}

//

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_ten_by_three()
    {
        let p = feature_partition(10, 3);
        assert_eq!(p, vec![0.. 4, 4.. 7, 7.. 10]);
        assert_eq!(p.iter().map(|r| r.len()).collect::<Vec<_>>(), vec![4, 3, 3]);
    }

    #[test]
    fn test_cover_and_balance()
    {
        for total in 0.. 40 {
            for num_parts in 1..= total.max(1) {
                let p = feature_partition(total, num_parts);
                assert_eq!(p.len(), num_parts);

                let mut next = 0;
                for r in p.iter() {
                    assert_eq!(r.start, next);
                    next = r.end;
                }
                assert_eq!(next, total);

                let max = p.iter().map(|r| r.len()).max().unwrap();
                let min = p.iter().map(|r| r.len()).min().unwrap();
                assert!(max - min <= 1, "{} {}: {:?}", total, num_parts, p);
            }
        }
    }

    #[test]
    fn test_width_one()
    {
        let parts = FeatureParts::new(7, 7);
        assert_eq!(parts.len(), 7);
        for j in 0.. 7 {
            assert_eq!(parts.range(j), j.. j + 1);
        }
        assert_eq!(parts, FeatureParts::new(7, 7));
    }
}
