//! Square bit matrix over dense route indices.

use std::fmt;

use fixedbitset::FixedBitSet;

use super::CostError;

/// A square `N×N` bit matrix. Row `i` holds the outbound connectivity of
/// route `i`.
///
/// The matrix never changes shape after construction; combining matrices of
/// different sizes is an error.
#[derive(Clone, PartialEq, Eq)]
pub struct BitMatrix {
    size: usize,
    rows: Vec<FixedBitSet>,
}

impl BitMatrix {
    /// An empty matrix.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            rows: (0..size).map(|_| FixedBitSet::with_capacity(size)).collect(),
        }
    }

    /// A matrix with every bit set; the identity for [`BitMatrix::and`].
    pub fn identity(size: usize) -> Self {
        let mut matrix = Self::new(size);
        for row in &mut matrix.rows {
            row.insert_range(..);
        }
        matrix
    }

    /// Build a matrix from precomputed rows.
    pub fn from_rows(rows: Vec<FixedBitSet>) -> Result<Self, CostError> {
        let size = rows.len();
        if let Some(bad) = rows.iter().find(|row| row.len() != size) {
            return Err(CostError::DimensionMismatch {
                expected: size,
                actual: bad.len(),
            });
        }
        Ok(Self { size, rows })
    }

    /// The number of rows (and columns).
    pub fn dimension(&self) -> usize {
        self.size
    }

    pub fn set(&mut self, row: usize, column: usize) {
        self.rows[row].insert(column);
    }

    pub fn is_set(&self, row: usize, column: usize) -> bool {
        self.rows[row].contains(column)
    }

    /// Borrow a row.
    pub fn row(&self, row: usize) -> &FixedBitSet {
        &self.rows[row]
    }

    /// Extract a column as a bit set over rows.
    pub fn column(&self, column: usize) -> FixedBitSet {
        let mut result = FixedBitSet::with_capacity(self.size);
        for (idx, row) in self.rows.iter().enumerate() {
            if row.contains(column) {
                result.insert(idx);
            }
        }
        result
    }

    /// OR `bits` into a row.
    pub fn or_row(&mut self, row: usize, bits: &FixedBitSet) -> Result<(), CostError> {
        self.check_len(bits)?;
        self.rows[row].union_with(bits);
        Ok(())
    }

    /// AND a row with `mask`.
    pub fn and_row(&mut self, row: usize, mask: &FixedBitSet) -> Result<(), CostError> {
        self.check_len(mask)?;
        self.rows[row].intersect_with(mask);
        Ok(())
    }

    /// A new matrix holding `self AND other`. Neither operand is modified.
    pub fn and(&self, other: &BitMatrix) -> Result<BitMatrix, CostError> {
        self.combine(other, FixedBitSet::intersect_with)
    }

    /// A new matrix holding `self OR other`.
    pub fn or(&self, other: &BitMatrix) -> Result<BitMatrix, CostError> {
        self.combine(other, FixedBitSet::union_with)
    }

    /// A new matrix holding `self AND NOT other`.
    pub fn and_not(&self, other: &BitMatrix) -> Result<BitMatrix, CostError> {
        self.combine(other, FixedBitSet::difference_with)
    }

    fn combine(
        &self,
        other: &BitMatrix,
        op: fn(&mut FixedBitSet, &FixedBitSet),
    ) -> Result<BitMatrix, CostError> {
        if other.size != self.size {
            return Err(CostError::DimensionMismatch {
                expected: self.size,
                actual: other.size,
            });
        }
        let mut result = self.clone();
        for (row, other_row) in result.rows.iter_mut().zip(&other.rows) {
            op(row, other_row);
        }
        Ok(result)
    }

    /// Total number of set bits.
    pub fn count(&self) -> usize {
        self.rows.iter().map(|row| row.count_ones(..)).sum()
    }

    /// Returns true if every bit is set.
    pub fn is_full(&self) -> bool {
        self.count() == self.size * self.size
    }

    fn check_len(&self, bits: &FixedBitSet) -> Result<(), CostError> {
        if bits.len() != self.size {
            return Err(CostError::DimensionMismatch {
                expected: self.size,
                actual: bits.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for BitMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BitMatrix({}x{})", self.size, self.size)?;
        for row in &self.rows {
            let line: String = (0..self.size)
                .map(|c| if row.contains(c) { '1' } else { '0' })
                .collect();
            writeln!(f, "  {line}")?;
        }
        Ok(())
    }
}
