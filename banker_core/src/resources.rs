//! Resource vectors and per-process matrices.
//!
//! Both types are plain owned values. Cloning performs a full copy, so a
//! snapshot taken with `clone()` never shares storage with the working state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Count of instances of one resource type.
pub type Units = u32;

/// One count per resource type, fixed length `m` for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceVector(Vec<Units>);

impl ResourceVector {
    /// Creates a vector from raw counts.
    pub fn new(units: Vec<Units>) -> Self {
        Self(units)
    }

    /// Creates a vector of `m` zeros.
    pub fn zeros(m: usize) -> Self {
        Self(vec![0; m])
    }

    /// Number of resource types.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the count for resource `j`.
    pub fn get(&self, j: usize) -> Option<Units> {
        self.0.get(j).copied()
    }

    pub fn as_slice(&self) -> &[Units] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Units> + '_ {
        self.0.iter()
    }

    /// True when every component is `<=` the matching component of `bound`.
    pub fn fits_within(&self, bound: &ResourceVector) -> bool {
        self.0.iter().zip(bound.0.iter()).all(|(a, b)| a <= b)
    }

    /// Component-wise `self += other`.
    pub fn add_assign(&mut self, other: &ResourceVector) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a += *b;
        }
    }

    /// Component-wise `self + other`.
    pub fn plus(&self, other: &ResourceVector) -> ResourceVector {
        let mut sum = self.clone();
        sum.add_assign(other);
        sum
    }

    /// Component-wise `self - other`, or `None` if any component would go negative.
    pub fn checked_sub(&self, other: &ResourceVector) -> Option<ResourceVector> {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| a.checked_sub(*b))
            .collect::<Option<Vec<_>>>()
            .map(ResourceVector)
    }

    /// Sets every component to zero, keeping the length.
    pub fn clear(&mut self) {
        self.0.iter_mut().for_each(|u| *u = 0);
    }

    /// True when every component is zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&u| u == 0)
    }

    /// Total instances across all resource types.
    pub fn sum(&self) -> u64 {
        self.0.iter().map(|&u| u64::from(u)).sum()
    }
}

impl From<Vec<Units>> for ResourceVector {
    fn from(units: Vec<Units>) -> Self {
        Self(units)
    }
}

impl Index<usize> for ResourceVector {
    type Output = Units;

    fn index(&self, j: usize) -> &Units {
        &self.0[j]
    }
}

impl IndexMut<usize> for ResourceVector {
    fn index_mut(&mut self, j: usize) -> &mut Units {
        &mut self.0[j]
    }
}

impl fmt::Display for ResourceVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (j, u) in self.0.iter().enumerate() {
            if j > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", u)?;
        }
        write!(f, "]")
    }
}

/// `n` rows (one per process) of `m` resource counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Matrix(Vec<ResourceVector>);

impl Matrix {
    pub fn new(rows: Vec<ResourceVector>) -> Self {
        Self(rows)
    }

    /// Creates an `n` x `m` matrix of zeros.
    pub fn zeros(n: usize, m: usize) -> Self {
        Self(vec![ResourceVector::zeros(m); n])
    }

    /// Number of rows (processes).
    pub fn rows(&self) -> usize {
        self.0.len()
    }

    /// Width of the first row; 0 for an empty matrix.
    pub fn columns(&self) -> usize {
        self.0.first().map_or(0, ResourceVector::len)
    }

    pub fn row(&self, i: usize) -> Option<&ResourceVector> {
        self.0.get(i)
    }

    pub fn row_mut(&mut self, i: usize) -> Option<&mut ResourceVector> {
        self.0.get_mut(i)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceVector> + '_ {
        self.0.iter()
    }

    /// Sum of column `j` over all rows.
    pub fn column_sum(&self, j: usize) -> u64 {
        self.0
            .iter()
            .filter_map(|row| row.get(j))
            .map(u64::from)
            .sum()
    }
}

impl From<Vec<Vec<Units>>> for Matrix {
    fn from(rows: Vec<Vec<Units>>) -> Self {
        Self(rows.into_iter().map(ResourceVector::from).collect())
    }
}

impl Index<usize> for Matrix {
    type Output = ResourceVector;

    fn index(&self, i: usize) -> &ResourceVector {
        &self.0[i]
    }
}

impl IndexMut<usize> for Matrix {
    fn index_mut(&mut self, i: usize) -> &mut ResourceVector {
        &mut self.0[i]
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.0.iter().enumerate() {
            writeln!(f, "P{}: {}", i, row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_within_is_componentwise() {
        let need = ResourceVector::from(vec![1, 2, 2]);

        assert!(need.fits_within(&ResourceVector::from(vec![3, 3, 2])));
        assert!(!need.fits_within(&ResourceVector::from(vec![3, 1, 9])));
    }

    #[test]
    fn test_checked_sub_rejects_negative() {
        let max = ResourceVector::from(vec![7, 5, 3]);
        let alloc = ResourceVector::from(vec![0, 1, 0]);

        assert_eq!(max.checked_sub(&alloc), Some(ResourceVector::from(vec![7, 4, 3])));
        assert_eq!(alloc.checked_sub(&max), None);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut matrix = Matrix::from(vec![vec![1, 2], vec![3, 4]]);
        let snapshot = matrix.clone();

        matrix.row_mut(0).unwrap().clear();

        assert_eq!(snapshot.row(0), Some(&ResourceVector::from(vec![1, 2])));
        assert!(matrix.row(0).unwrap().is_zero());
    }

    #[test]
    fn test_display_formats() {
        let matrix = Matrix::from(vec![vec![0, 1, 0], vec![2, 0, 0]]);

        assert_eq!(ResourceVector::from(vec![3, 3, 2]).to_string(), "[3, 3, 2]");
        assert_eq!(matrix.to_string(), "P0: [0, 1, 0]\nP1: [2, 0, 0]\n");
        assert_eq!(matrix.column_sum(0), 2);
    }

    #[test]
    fn test_serializes_as_plain_arrays() {
        let matrix = Matrix::from(vec![vec![0, 1], vec![2, 0]]);
        let json = serde_json::to_string(&matrix).unwrap();

        assert_eq!(json, "[[0,1],[2,0]]");
    }
}
