//! Property tests: random operation sequences keep the directory sound

use mempool_allocator::{Allocation, PoolAllocator, PoolConfig};
use proptest::prelude::*;

const CAPACITY: usize = 256;

#[derive(Debug, Clone)]
enum Op {
    Alloc(usize),
    Free(usize),
    Resize(usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1..96usize).prop_map(Op::Alloc),
        any::<usize>().prop_map(Op::Free),
        (any::<usize>(), 0..128usize).prop_map(|(i, n)| Op::Resize(i, n)),
    ]
}

fn shape(pool: &PoolAllocator) -> Vec<(usize, usize, bool)> {
    pool.blocks()
        .map(|b| (b.offset(), b.size(), b.is_free()))
        .collect()
}

/// Fills a block with a byte derived from its handle so payload moves can be
/// checked.
fn stamp(pool: &mut PoolAllocator, handle: Allocation, tag: u8) {
    pool.bytes_mut(handle).unwrap().fill(tag);
}

proptest! {
    #[test]
    fn directory_invariants_hold(ops in prop::collection::vec(op(), 1..64)) {
        let mut pool = PoolAllocator::with_config(CAPACITY, PoolConfig::performance()).unwrap();
        // live handles with the tag their payload carries
        let mut live: Vec<(Allocation, u8, usize)> = Vec::new();
        let mut next_tag = 1u8;

        for op in ops {
            match op {
                Op::Alloc(size) => {
                    if let Ok(handle) = pool.allocate(size) {
                        stamp(&mut pool, handle, next_tag);
                        live.push((handle, next_tag, size));
                        next_tag = next_tag.wrapping_add(1).max(1);
                    }
                }
                Op::Free(i) if !live.is_empty() => {
                    let (handle, _, _) = live.swap_remove(i % live.len());
                    pool.free(handle).unwrap();
                }
                Op::Resize(i, new_size) if !live.is_empty() => {
                    let index = i % live.len();
                    let (handle, tag, size) = live[index];
                    match pool.resize(Some(handle), new_size) {
                        Ok(Some(moved)) => {
                            let kept = size.min(new_size);
                            prop_assert!(pool.bytes(moved).unwrap()[..kept].iter().all(|&b| b == tag));
                            stamp(&mut pool, moved, tag);
                            live[index] = (moved, tag, new_size);
                        }
                        Ok(None) => {
                            prop_assert_eq!(new_size, 0);
                            live.swap_remove(index);
                        }
                        Err(err) => {
                            prop_assert!(err.is_retryable());
                            prop_assert!(pool.bytes(handle).unwrap().iter().all(|&b| b == tag));
                        }
                    }
                }
                Op::Free(_) | Op::Resize(..) => {}
            }

            prop_assert!(pool.check_invariants().is_ok(), "{}", pool);
            let total: usize = pool.blocks().map(|b| b.size()).sum();
            prop_assert_eq!(total, CAPACITY);
            let used: usize = live.iter().map(|&(_, _, size)| size).sum();
            prop_assert_eq!(pool.used_bytes(), used);
        }

        // every live payload still carries its own tag
        for &(handle, tag, _) in &live {
            prop_assert!(pool.bytes(handle).unwrap().iter().all(|&b| b == tag));
        }
    }

    #[test]
    fn alloc_then_free_restores_shape(
        setup in prop::collection::vec(1..32usize, 0..6),
        size in 1..64usize,
    ) {
        let mut pool = PoolAllocator::with_config(CAPACITY, PoolConfig::performance()).unwrap();
        for (i, s) in setup.iter().enumerate() {
            let handle = pool.allocate(*s).unwrap();
            // free every other block to leave holes
            if i % 2 == 0 {
                pool.free(handle).unwrap();
            }
        }

        let before = shape(&pool);
        if let Ok(handle) = pool.allocate(size) {
            pool.free(handle).unwrap();
            prop_assert_eq!(shape(&pool), before);
        } else {
            prop_assert_eq!(shape(&pool), before);
        }
    }

    #[test]
    fn double_free_never_changes_directory(sizes in prop::collection::vec(1..40usize, 1..6)) {
        let mut pool = PoolAllocator::with_config(CAPACITY, PoolConfig::performance()).unwrap();
        let handles: Vec<_> = sizes.iter().map(|&s| pool.allocate(s).unwrap()).collect();
        for handle in &handles {
            pool.free(*handle).unwrap();
        }

        let before = shape(&pool);
        for handle in handles {
            prop_assert!(pool.free(handle).is_err());
            prop_assert_eq!(shape(&pool), before.clone());
        }
    }
}
