use super::*;
use crossbeam::scope;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Droppable(Arc<AtomicUsize>);

impl Drop for Droppable {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_basic_push_pop() {
    let mut v = SequenceBuffer::new();
    assert_eq!(v.capacity(), 1);
    v.push_back(1);
    v.push_back(2);
    v.push_back(3);
    assert_eq!(v.len(), 3);
    assert_eq!(v.capacity(), 4);
    assert_eq!(v[0], 1);
    assert_eq!(v[1], 2);
    assert_eq!(v[2], 3);
    assert_eq!(v.pop(), Some(3));
    v.pop_back();
    assert_eq!(v.pop(), Some(1));
    assert_eq!(v.pop(), None);
    assert_eq!(v.capacity(), 4);
}

#[test]
fn test_sized_constructors() {
    let v: SequenceBuffer<u32> = SequenceBuffer::with_len(3);
    assert_eq!(v, [0, 0, 0]);
    assert_eq!(v.capacity(), 6);

    let v = SequenceBuffer::from_elem(2, &String::from("ab"));
    assert_eq!(v, ["ab", "ab"]);
    assert_eq!(v.capacity(), 4);

    let v: SequenceBuffer<u8> = SequenceBuffer::with_len(0);
    assert!(v.is_empty());
    assert_eq!(v.capacity(), 1);

    let v = seqbuf![7; 3];
    assert_eq!(v, [7, 7, 7]);
}

#[test]
fn test_literal_list() {
    let v = seqbuf![1, 2, 3];
    assert_eq!(v.len(), 3);
    assert_eq!(v.capacity(), 6);
    assert_eq!(v, [1, 2, 3]);

    let v: SequenceBuffer<i32> = seqbuf![];
    assert_eq!(v.capacity(), 1);

    let v = SequenceBuffer::<&str>::from(&["x", "y"][..]);
    assert_eq!(v, ["x", "y"]);
}

#[test]
fn test_insert_remove() {
    let mut v = seqbuf![1, 3];
    v.insert(1, 2);
    assert_eq!(v.as_ref(), &[1, 2, 3]);
    assert_eq!(v.remove(1), 2);
    assert_eq!(v.as_ref(), &[1, 3]);
    v.insert(2, 4);
    assert_eq!(v, [1, 3, 4]);
    v.insert(0, 0);
    assert_eq!(v, [0, 1, 3, 4]);
}

#[test]
fn test_insert_when_full_doubles_once() {
    let mut v = SequenceBuffer::with_capacity(4);
    v.extend([10, 20, 30, 40]);
    assert!(v.is_full());
    v.insert(1, 15);
    assert_eq!(v, [10, 15, 20, 30, 40]);
    assert_eq!(v.capacity(), 8);
}

#[test]
fn test_erase_keeps_capacity() {
    let mut v: SequenceBuffer<i32> = (0..10).collect();
    let cap = v.capacity();
    v.erase(0);
    v.erase(8);
    assert_eq!(v, [1, 2, 3, 4, 5, 6, 7, 8]);
    v.erase_range(2..5);
    assert_eq!(v, [1, 2, 6, 7, 8]);
    v.erase_range(..);
    assert!(v.is_empty());
    assert_eq!(v.capacity(), cap);
}

#[test]
fn test_erase_range_bounds() {
    let mut v = seqbuf![0, 1, 2, 3, 4, 5];
    v.erase_range(1..=2);
    assert_eq!(v, [0, 3, 4, 5]);
    v.erase_range(3..);
    assert_eq!(v, [0, 3, 4]);
    v.erase_range(1..1);
    assert_eq!(v, [0, 3, 4]);
    v.erase_range(..1);
    assert_eq!(v, [3, 4]);
}

#[test]
fn test_grow_and_reserve() {
    let mut v = SequenceBuffer::with_capacity(2);
    assert_eq!(v.capacity(), 2);
    v.push_back(1);
    v.push_back(2);
    v.push_back(3);
    assert_eq!(v.capacity(), 4);
    v.reserve(3);
    assert_eq!(v.capacity(), 4);
    v.reserve(100);
    assert_eq!(v.capacity(), 100);
    assert_eq!(v, [1, 2, 3]);
}

#[test]
fn test_resize() {
    let mut v = seqbuf![1, 2, 3];
    v.resize(5, 9);
    assert_eq!(v, [1, 2, 3, 9, 9]);
    v.resize(2, 0);
    assert_eq!(v, [1, 2]);
    v.resize_default(4);
    assert_eq!(v, [1, 2, 0, 0]);
    let mut next = 10;
    v.resize_with(6, || {
        next += 1;
        next
    });
    assert_eq!(v, [1, 2, 0, 0, 11, 12]);
    v.truncate(10);
    assert_eq!(v.len(), 6);
}

#[test]
fn test_checked_access() {
    let mut v = seqbuf![5, 6];
    assert_eq!(v.at(1), Ok(&6));
    assert_eq!(v.at(2), Err(Error::OutOfRange { index: 2, len: 2 }));
    *v.at_mut(0).unwrap() = 50;
    assert_eq!(v.front(), Some(&50));
    assert_eq!(v.back(), Some(&6));
    assert!(v.at_mut(7).is_err());
    unsafe {
        *v.get_unchecked_mut(1) += 1;
        assert_eq!(*v.get_unchecked(1), 7);
    }
    assert_eq!(
        Error::OutOfRange { index: 7, len: 2 }.to_string(),
        "index 7 is out of range for a buffer of length 2"
    );
}

#[test]
fn test_emplace_back() {
    let mut v: SequenceBuffer<String> = SequenceBuffer::new();
    v.emplace_back(|| "a".repeat(3)).push('!');
    v.emplace_back(String::new);
    assert_eq!(v, ["aaa!", ""]);
}

#[test]
fn test_raii_drop() {
    let counter = Arc::new(AtomicUsize::new(0));
    {
        let mut v = SequenceBuffer::new();
        for _ in 0..10 {
            v.push_back(Droppable(counter.clone()));
        }
        v.pop_back();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        v.erase(0);
        v.erase_range(0..2);
        assert_eq!(counter.load(Ordering::SeqCst), 4);
        v.truncate(4);
        assert_eq!(counter.load(Ordering::SeqCst), 6);
    }
    assert_eq!(counter.load(Ordering::SeqCst), 10);
}

#[test]
fn test_clear_then_refill() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut v = SequenceBuffer::new();
    for _ in 0..5 {
        v.push_back(Droppable(counter.clone()));
    }
    let cap = v.capacity();
    v.clear();
    assert_eq!(counter.load(Ordering::SeqCst), 5);
    assert!(v.is_empty());
    assert_eq!(v.capacity(), cap);
    v.push_back(Droppable(counter.clone()));
    assert_eq!(v.len(), 1);
}

#[test]
fn test_exception_safety_clone() {
    #[derive(Debug)]
    struct Fragile {
        id: usize,
        drops: Arc<AtomicUsize>,
    }

    impl Clone for Fragile {
        fn clone(&self) -> Self {
            if self.id == 3 {
                panic!("clone failed");
            }
            Fragile {
                id: self.id,
                drops: self.drops.clone(),
            }
        }
    }

    impl Drop for Fragile {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    let drops = Arc::new(AtomicUsize::new(0));
    let mut v = SequenceBuffer::new();
    for id in 0..5 {
        v.push_back(Fragile {
            id,
            drops: drops.clone(),
        });
    }

    let result = panic::catch_unwind(AssertUnwindSafe(|| v.clone()));
    assert!(result.is_err());
    // the three clones built before the failure are dropped exactly once
    assert_eq!(drops.load(Ordering::SeqCst), 3);

    let mut target = SequenceBuffer::new();
    target.push_back(Fragile {
        id: 9,
        drops: drops.clone(),
    });
    let result = panic::catch_unwind(AssertUnwindSafe(|| target.clone_from(&v)));
    assert!(result.is_err());
    assert_eq!(target.len(), 1);
    assert_eq!(target[0].id, 9);
    assert_eq!(v.len(), 5);
}

#[test]
fn test_exception_safety_fill() {
    // Clones succeed while `clones_left` is non-zero.
    struct Rationed {
        clones_left: Arc<AtomicUsize>,
        drops: Arc<AtomicUsize>,
    }

    impl Clone for Rationed {
        fn clone(&self) -> Self {
            if self.clones_left.load(Ordering::SeqCst) == 0 {
                panic!("out of clones");
            }
            self.clones_left.fetch_sub(1, Ordering::SeqCst);
            Rationed {
                clones_left: self.clones_left.clone(),
                drops: self.drops.clone(),
            }
        }
    }

    impl Drop for Rationed {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    let clones_left = Arc::new(AtomicUsize::new(3));
    let drops = Arc::new(AtomicUsize::new(0));
    let make = || Rationed {
        clones_left: clones_left.clone(),
        drops: drops.clone(),
    };

    let proto = make();
    let result = panic::catch_unwind(AssertUnwindSafe(|| SequenceBuffer::from_elem(5, &proto)));
    assert!(result.is_err());
    assert_eq!(drops.load(Ordering::SeqCst), 3);

    drops.store(0, Ordering::SeqCst);
    clones_left.store(2, Ordering::SeqCst);
    let mut v = SequenceBuffer::new();
    v.push_back(make());
    v.push_back(make());
    let fill = make();
    let result = panic::catch_unwind(AssertUnwindSafe(|| v.resize(v.len() + 5, fill)));
    assert!(result.is_err());
    // `fill` itself goes down with the unwinding resize
    assert_eq!(drops.load(Ordering::SeqCst), 1);
    assert_eq!(v.len(), 4);

    v.push_back(make());
    assert_eq!(v.len(), 5);
    drop(v);
    assert_eq!(drops.load(Ordering::SeqCst), 6);
    drop(proto);
}

#[test]
fn test_exception_safety_erase_range() {
    struct Bomb(bool, Arc<AtomicUsize>);

    impl Drop for Bomb {
        fn drop(&mut self) {
            self.1.fetch_add(1, Ordering::SeqCst);
            if self.0 {
                panic!("boom");
            }
        }
    }

    let drops = Arc::new(AtomicUsize::new(0));
    let mut v = SequenceBuffer::new();
    for i in 0..6 {
        v.push_back(Bomb(i == 2, drops.clone()));
    }
    let result = panic::catch_unwind(AssertUnwindSafe(|| v.erase_range(1..4)));
    assert!(result.is_err());
    assert_eq!(drops.load(Ordering::SeqCst), 3);
    assert_eq!(v.len(), 3);
    drop(v);
    assert_eq!(drops.load(Ordering::SeqCst), 6);
}

#[test]
fn test_iterators() {
    let mut v = seqbuf![10, 20, 30];

    let mut sum = 0;
    for &x in &v {
        sum += x;
    }
    assert_eq!(sum, 60);

    for x in &mut v {
        *x += 1;
    }
    assert_eq!(v[0], 11);

    let reversed: Vec<i32> = v.iter_rev().copied().collect();
    assert_eq!(reversed, vec![31, 21, 11]);
    // restartable
    assert_eq!(v.iter().count(), 3);
    assert_eq!(v.iter().count(), 3);

    let collected: Vec<i32> = v.into_iter().collect();
    assert_eq!(collected, vec![11, 21, 31]);
}

#[test]
fn test_into_iter_drops_rest() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut v = SequenceBuffer::new();
    for _ in 0..6 {
        v.push_back(Droppable(counter.clone()));
    }
    let mut it = v.into_iter();
    assert_eq!(it.len(), 6);
    drop(it.next());
    drop(it.next_back());
    assert_eq!(it.as_slice().len(), 4);
    assert_eq!(counter.load(Ordering::SeqCst), 2);
    drop(it);
    assert_eq!(counter.load(Ordering::SeqCst), 6);
}

#[test]
fn test_take_leaves_empty_source() {
    let mut source = seqbuf![1, 2, 3];
    let moved = source.take();
    assert_eq!(moved, [1, 2, 3]);
    assert_eq!(source.len(), 0);
    assert_eq!(source.capacity(), 0);
    assert!(source.is_full());
    source.push_back(4);
    assert_eq!(source, [4]);
    assert_eq!(source.capacity(), 1);

    let mut target = seqbuf![9, 9];
    assert_eq!(target.len(), 2);
    target = source.take();
    assert_eq!(target, [4]);
    assert!(source.is_empty());
}

#[test]
fn test_duplicate_and_clone_of_empty_source() {
    let v = seqbuf![1u64, 2, 3];
    let d = v.duplicate();
    assert_eq!(d, v);
    assert_eq!(d.capacity(), v.capacity());
    assert_ne!(d.as_ptr(), v.as_ptr());

    let mut target = seqbuf![7u64; 40];
    target.assign_from(&v);
    assert_eq!(target, [1, 2, 3]);
    assert_eq!(target.capacity(), v.capacity());

    let mut moved_from = seqbuf![1];
    drop(moved_from.take());
    let c = moved_from.clone();
    assert_eq!(c.capacity(), 0);
    assert!(c.is_empty());
}

#[test]
fn test_zero_sized_elements() {
    let mut v = SequenceBuffer::new();
    for _ in 0..100 {
        v.push_back(());
    }
    assert_eq!(v.len(), 100);
    assert_eq!(v.capacity(), 128);
    v.insert(50, ());
    v.erase_range(0..10);
    assert_eq!(v.len(), 91);
    assert_eq!(v.into_iter().count(), 91);
}

#[test]
fn test_concurrency() {
    let v: SequenceBuffer<i32> = (0..100).collect();

    scope(|s| {
        s.spawn(|_| {
            let total: i32 = v.iter().sum();
            assert_eq!(total, 4950);
        });
        s.spawn(|_| {
            for (i, x) in v.iter().enumerate() {
                assert_eq!(*x, i as i32);
            }
        });
    })
    .unwrap();
}

#[test]
fn test_try_reserve() {
    let mut v: SequenceBuffer<i32> = SequenceBuffer::new();
    assert!(v.try_reserve(10).is_ok());
    assert_eq!(v.capacity(), 10);
    assert_eq!(v.try_reserve(usize::MAX), Err(Error::CapacityOverflow));
    assert_eq!(v.capacity(), 10);
}

#[test]
fn test_debug_and_hash() {
    use std::collections::HashSet;

    let v = seqbuf![1, 2];
    assert_eq!(format!("{v:?}"), "[1, 2]");

    let mut set = HashSet::new();
    set.insert(v.clone());
    assert!(set.contains(&v));
    assert_eq!(v, vec![1, 2]);
}

#[test]
#[should_panic(expected = "removal index (is 0) should be < len (is 0)")]
fn test_out_of_bounds_erase() {
    let mut v: SequenceBuffer<i32> = SequenceBuffer::new();
    v.erase(0);
}

#[test]
#[should_panic(expected = "insertion index (is 1) should be <= len (is 0)")]
fn test_out_of_bounds_insert() {
    let mut v: SequenceBuffer<i32> = SequenceBuffer::new();
    v.insert(1, 10);
}

#[test]
#[should_panic(expected = "pop_back on an empty SequenceBuffer")]
fn test_pop_back_empty() {
    let mut v: SequenceBuffer<i32> = SequenceBuffer::new();
    v.pop_back();
}

#[test]
#[should_panic(expected = "erase range starts at 2 but ends at 1")]
fn test_inverted_erase_range() {
    let mut v = seqbuf![1, 2, 3];
    #[allow(clippy::reversed_empty_ranges)]
    v.erase_range(2..1);
}

#[test]
#[should_panic]
fn test_unchecked_index_out_of_range() {
    let v = seqbuf![1, 2, 3];
    std::hint::black_box(v[3]);
}
