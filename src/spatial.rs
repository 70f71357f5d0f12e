//! Spatial indexing for neighborhood-limited behaviors.
//!
//! [`SpatialIndex`] is the capability the world consumes; [`SpatialHash`] is
//! a uniform-grid implementation keyed by integer cell coordinates.

use alloc::collections::BTreeMap;
use alloc::vec::Vec as AllocVec;

use crate::arena::ParticleHandle;
use crate::error::PhysicsError;
use crate::float::Float;
use crate::vec::Vec;

/// Neighbor queries over particle positions.
///
/// The world keeps the index in sync: it inserts on `add_particle`, removes
/// on `remove_particle` and calls `reindex` for every particle after a step.
pub trait SpatialIndex<V: Vec> {
    fn insert(&mut self, handle: ParticleHandle, pos: V);

    /// `pos` is where the handle was last indexed; implementations may fall
    /// back to a full search if it is stale. Returns false if not indexed.
    fn remove(&mut self, handle: ParticleHandle, pos: V) -> bool;

    /// Move an entry from `old_pos` to `new_pos`.
    fn reindex(&mut self, handle: ParticleHandle, old_pos: V, new_pos: V);

    /// Push every handle within `radius` of `center` into `out`.
    fn items_within_radius(&self, center: V, radius: V::Scalar, out: &mut AllocVec<ParticleHandle>);

    fn clear(&mut self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

type CellKey = [i64; 3];

/// Above this many cells per query, scan occupied cells instead.
const MAX_QUERY_CELLS: i64 = 4096;

/// Uniform grid spatial hash.
#[derive(Clone, Debug)]
pub struct SpatialHash<V: Vec> {
    cell_size: V::Scalar,
    cells: BTreeMap<CellKey, AllocVec<(ParticleHandle, V)>>,
    len: usize,
}

impl<V: Vec> SpatialHash<V> {
    /// Cells should be about the size of the typical query radius.
    pub fn new(cell_size: V::Scalar) -> Result<Self, PhysicsError> {
        if cell_size <= V::Scalar::zero() || !cell_size.is_finite() {
            return Err(PhysicsError::invalid("cell_size", "must be positive and finite"));
        }
        Ok(SpatialHash { cell_size, cells: BTreeMap::new(), len: 0 })
    }

    pub fn cell_size(&self) -> V::Scalar {
        self.cell_size
    }

    fn cell_coord(&self, c: V::Scalar) -> i64 {
        (c / self.cell_size).floor().to_i64()
    }

    fn key(&self, pos: V) -> CellKey {
        let mut key = [0; 3];
        for (axis, slot) in key.iter_mut().enumerate().take(V::DIM) {
            *slot = self.cell_coord(pos.component(axis));
        }
        key
    }

    fn take(&mut self, key: CellKey, handle: ParticleHandle) -> bool {
        let Some(bucket) = self.cells.get_mut(&key) else {
            return false;
        };
        let Some(i) = bucket.iter().position(|(h, _)| *h == handle) else {
            return false;
        };
        bucket.swap_remove(i);
        if bucket.is_empty() {
            self.cells.remove(&key);
        }
        true
    }

    /// Remove `handle` wherever it is. Used when a position hint is stale.
    fn purge(&mut self, handle: ParticleHandle) -> bool {
        let key = self
            .cells
            .iter()
            .find(|(_, bucket)| bucket.iter().any(|(h, _)| *h == handle))
            .map(|(key, _)| *key);
        key.is_some_and(|key| self.take(key, handle))
    }

    fn collect_bucket(
        bucket: &[(ParticleHandle, V)],
        center: V,
        radius_sq: V::Scalar,
        out: &mut AllocVec<ParticleHandle>,
    ) {
        out.extend(
            bucket
                .iter()
                .filter(|(_, p)| p.distance_sq(center) <= radius_sq)
                .map(|(h, _)| *h),
        );
    }
}

impl<V: Vec> SpatialIndex<V> for SpatialHash<V> {
    fn insert(&mut self, handle: ParticleHandle, pos: V) {
        let key = self.key(pos);
        self.cells.entry(key).or_default().push((handle, pos));
        self.len += 1;
    }

    fn remove(&mut self, handle: ParticleHandle, pos: V) -> bool {
        let removed = self.take(self.key(pos), handle) || self.purge(handle);
        if removed {
            self.len -= 1;
        }
        removed
    }

    fn reindex(&mut self, handle: ParticleHandle, old_pos: V, new_pos: V) {
        let old_key = self.key(old_pos);
        let new_key = self.key(new_pos);
        if old_key == new_key {
            if let Some(entry) = self
                .cells
                .get_mut(&old_key)
                .and_then(|bucket| bucket.iter_mut().find(|(h, _)| *h == handle))
            {
                entry.1 = new_pos;
                return;
            }
        } else if self.take(old_key, handle) {
            self.cells.entry(new_key).or_default().push((handle, new_pos));
            return;
        }
        // Stale hint: drop any entry left elsewhere, then index fresh.
        if self.purge(handle) {
            self.len -= 1;
        }
        self.insert(handle, new_pos);
    }

    fn items_within_radius(&self, center: V, radius: V::Scalar, out: &mut AllocVec<ParticleHandle>) {
        let radius_sq = radius * radius;
        let mut lo = [0i64; 3];
        let mut hi = [0i64; 3];
        let mut cells = 1i64;
        for axis in 0..V::DIM {
            let c = center.component(axis);
            lo[axis] = self.cell_coord(c - radius);
            hi[axis] = self.cell_coord(c + radius);
            cells = cells.saturating_mul(hi[axis].saturating_sub(lo[axis]).saturating_add(1));
        }

        if cells > MAX_QUERY_CELLS || cells as usize > self.cells.len() {
            for bucket in self.cells.values() {
                Self::collect_bucket(bucket, center, radius_sq, out);
            }
            return;
        }

        for x in lo[0]..=hi[0] {
            for y in lo[1]..=hi[1] {
                for z in lo[2]..=hi[2] {
                    if let Some(bucket) = self.cells.get(&[x, y, z]) {
                        Self::collect_bucket(bucket, center, radius_sq, out);
                    }
                }
            }
        }
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.len = 0;
    }

    fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec::{Scalar, Vec2, Vec3};

    fn h(i: u32) -> ParticleHandle {
        ParticleHandle::new(i, 0)
    }

    #[test]
    fn rejects_bad_cell_size() {
        assert!(SpatialHash::<Vec2<f32>>::new(0.0).is_err());
    }

    #[test]
    fn query_filters_by_exact_distance() {
        let mut index = SpatialHash::new(1.0).unwrap();
        index.insert(h(0), Vec2::new(0.0f64, 0.0));
        index.insert(h(1), Vec2::new(0.9, 0.9));
        index.insert(h(2), Vec2::new(5.0, 5.0));
        let mut out = AllocVec::new();
        index.items_within_radius(Vec2::new(0.0, 0.0), 1.0, &mut out);
        assert_eq!(out, [h(0)]);
    }

    #[test]
    fn reindex_moves_between_cells() {
        let mut index = SpatialHash::new(1.0).unwrap();
        index.insert(h(7), Vec3::new(0.5f64, 0.5, 0.5));
        index.reindex(h(7), Vec3::new(0.5, 0.5, 0.5), Vec3::new(10.5, 0.5, 0.5));
        let mut out = AllocVec::new();
        index.items_within_radius(Vec3::new(0.5, 0.5, 0.5), 1.0, &mut out);
        assert!(out.is_empty());
        index.items_within_radius(Vec3::new(10.5, 0.5, 0.5), 0.1, &mut out);
        assert_eq!(out, [h(7)]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn remove_with_stale_hint_still_finds_entry() {
        let mut index = SpatialHash::new(1.0).unwrap();
        index.insert(h(1), Scalar(3.5f32));
        assert!(index.remove(h(1), Scalar(-20.0)));
        assert!(index.is_empty());
        assert!(!index.remove(h(1), Scalar(3.5)));
    }

    #[test]
    fn reindex_with_stale_hint_does_not_duplicate() {
        let mut index = SpatialHash::new(1.0).unwrap();
        index.insert(h(2), Vec2::new(0.5f64, 0.5));
        index.reindex(h(2), Vec2::new(40.0, 40.0), Vec2::new(7.5, 7.5));
        assert_eq!(index.len(), 1);
        let mut out = AllocVec::new();
        index.items_within_radius(Vec2::new(0.5, 0.5), 2.0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn large_radius_falls_back_to_full_scan() {
        let mut index = SpatialHash::new(0.01).unwrap();
        index.insert(h(0), Vec3::new(0.0f64, 0.0, 0.0));
        index.insert(h(1), Vec3::new(3.0, 0.0, 0.0));
        let mut out = AllocVec::new();
        index.items_within_radius(Vec3::new(0.0, 0.0, 0.0), 5.0, &mut out);
        out.sort();
        assert_eq!(out, [h(0), h(1)]);
    }
}
