use std::ops::{Index, IndexMut};

/// Fixed-length column for a single component attribute.
///
/// Storage is allocated once, sized to the owning manager's capacity, and
/// never relocates. Row `i` of every column in a [`ColumnSet`] belongs to
/// the same record.
pub struct Column<T> {
    rows: Box<[T]>,
}

impl<T: Clone> Column<T> {
    /// Create a column of `capacity` rows, each initialised to `value`.
    pub fn filled(capacity: usize, value: T) -> Self {
        Self {
            rows: vec![value; capacity].into_boxed_slice(),
        }
    }
}

impl<T> Column<T> {
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.rows.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.rows.get_mut(index)
    }

    /// Overwrite one row.
    #[inline]
    pub fn fill_at(&mut self, index: usize, value: T) {
        self.rows[index] = value;
    }

    /// Borrow every row, live or free. Bulk scans pair this with the
    /// manager's live slot list.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.rows
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.rows
    }
}

impl<T> Index<usize> for Column<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.rows[index]
    }
}

impl<T> IndexMut<usize> for Column<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.rows[index]
    }
}

/// The SoA data of one component kind: one [`Column`] per attribute.
///
/// Usually generated with [`soa_columns!`](crate::soa_columns).
pub trait ColumnSet: 'static {
    /// Human-readable component name, also the descriptor category.
    const NAME: &'static str;

    /// Allocate every column with exactly `capacity` rows of defaults.
    fn with_capacity(capacity: usize) -> Self;

    /// Write the type defaults into every column at `index`.
    fn reset_slot(&mut self, index: usize);
}
