//! Eye discriminant and per-eye storage

use std::ops::{Index, IndexMut};

/// Which lens a computation is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    /// Both eyes in render order
    pub const BOTH: [Eye; 2] = [Eye::Left, Eye::Right];

    pub fn index(self) -> usize {
        match self {
            Eye::Left => 0,
            Eye::Right => 1,
        }
    }

    pub fn other(self) -> Eye {
        match self {
            Eye::Left => Eye::Right,
            Eye::Right => Eye::Left,
        }
    }
}

/// Fixed two-slot record keyed by [`Eye`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PerEye<T>([T; 2]);

impl<T> PerEye<T> {
    pub fn new(left: T, right: T) -> Self {
        Self([left, right])
    }

    /// Build each slot from its eye
    pub fn from_fn(mut f: impl FnMut(Eye) -> T) -> Self {
        Self([f(Eye::Left), f(Eye::Right)])
    }

    /// Like [`PerEye::from_fn`] but stops at the first error
    pub fn try_from_fn<E>(mut f: impl FnMut(Eye) -> Result<T, E>) -> Result<Self, E> {
        let left = f(Eye::Left)?;
        let right = f(Eye::Right)?;
        Ok(Self([left, right]))
    }

    pub fn map<U>(self, mut f: impl FnMut(Eye, T) -> U) -> PerEye<U> {
        let [left, right] = self.0;
        PerEye([f(Eye::Left, left), f(Eye::Right, right)])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Eye, &T)> {
        Eye::BOTH.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<Eye> for PerEye<T> {
    type Output = T;

    fn index(&self, eye: Eye) -> &T {
        &self.0[eye.index()]
    }
}

impl<T> IndexMut<Eye> for PerEye<T> {
    fn index_mut(&mut self, eye: Eye) -> &mut T {
        &mut self.0[eye.index()]
    }
}
