// sort.rs - Ordering ref sequences by a column key
//
// Keys are gathered once up front, then (key, ref) pairs are sorted on
// rayon's pool. Only the caller's ref slice is written; columns are read.

use rayon::slice::ParallelSliceMut;

use crate::dod::{ColumnSet, ComponentManager, Ref, StoreError};

impl<D: ColumnSet> ComponentManager<D> {
    /// Sort `refs` ascending by `key(columns, slot)`.
    ///
    /// Equal keys end up in unspecified relative order: the sort is unstable
    /// and the parallel split depends on the worker count. The ordering by
    /// key itself does not.
    ///
    /// Every ref is resolved before anything moves; if one is stale the
    /// error is returned and `refs` is left as it was. Inputs of length 0 or
    /// 1 return immediately.
    pub fn sort_refs_by_key<K, F>(&self, refs: &mut [Ref<D>], key: F) -> Result<(), StoreError>
    where
        K: Ord + Send,
        F: Fn(&D, usize) -> K,
    {
        if refs.len() < 2 {
            return Ok(());
        }

        let mut keyed = refs
            .iter()
            .map(|&r| self.resolve(r).map(|slot| (key(self.data(), slot), r)))
            .collect::<Result<Vec<_>, _>>()?;

        if keyed.len() >= self.parallel_sort_threshold() {
            keyed.par_sort_unstable_by(|a, b| a.0.cmp(&b.0));
        } else {
            keyed.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        }

        for (dst, (_, r)) in refs.iter_mut().zip(keyed) {
            *dst = r;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::dod::{ComponentManager, EntityRef, Ref};
    use crate::soa_columns;

    soa_columns! {
        struct Item: "Item" {
            weight: i32 = 0,
        }
    }

    fn store_with(weights: &[i32], threshold: usize) -> (ComponentManager<Item>, Vec<Ref<Item>>) {
        let mut items = ComponentManager::<Item>::new(weights.len().max(1))
            .with_parallel_sort_threshold(threshold);
        let refs = weights
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                let r = items.create(EntityRef::from_raw(i as u64)).unwrap();
                let (data, slot) = items.slot_mut(r).unwrap();
                data.weight[slot] = w;
                r
            })
            .collect();
        (items, refs)
    }

    fn weights_of(items: &ComponentManager<Item>, refs: &[Ref<Item>]) -> Vec<i32> {
        refs.iter()
            .map(|&r| {
                let (data, slot) = items.slot(r).unwrap();
                data.weight[slot]
            })
            .collect()
    }

    #[test]
    fn sorts_ascending_sequential_and_parallel() {
        let weights = [5, -2, 9, 0, 9, 3, -7, 1];
        for threshold in [usize::MAX, 2] {
            let (items, mut refs) = store_with(&weights, threshold);
            items
                .sort_refs_by_key(&mut refs, |d, s| d.weight[s])
                .unwrap();
            assert_eq!(weights_of(&items, &refs), vec![-7, -2, 0, 1, 3, 5, 9, 9]);
        }
    }

    #[test]
    fn short_inputs_are_untouched() {
        let (items, refs) = store_with(&[4], 2);
        let mut empty: Vec<Ref<Item>> = Vec::new();
        items.sort_refs_by_key(&mut empty, |d, s| d.weight[s]).unwrap();
        assert!(empty.is_empty());

        let mut single = refs.clone();
        items.sort_refs_by_key(&mut single, |d, s| d.weight[s]).unwrap();
        assert_eq!(single, refs);
    }

    #[test]
    fn stale_ref_aborts_without_reordering() {
        let (mut items, mut refs) = store_with(&[3, 1, 2], 2);
        items.destroy(refs[2]).unwrap();
        let before = refs.clone();

        assert!(items.sort_refs_by_key(&mut refs, |d, s| d.weight[s]).is_err());
        assert_eq!(refs, before);
    }
}
