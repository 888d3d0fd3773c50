//! The fixed benchmark battery and the operation set it drives.

use std::hint::black_box;
use std::mem;
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sequence_buffer::SequenceBuffer;
use tracing::{debug, info};

/// Sizes and seed for one battery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatteryConfig {
    /// Element count for the bulk categories.
    pub elements: usize,
    /// Element count for the quadratic front insert/erase categories.
    pub stress_elements: usize,
    /// Seed for the random read/write index stream.
    pub seed: u64,
    /// Each category runs this many times; the fastest run is kept.
    pub repeat: usize,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            elements: 5_000_000,
            stress_elements: 50_000,
            seed: 123_456_789,
            repeat: 1,
        }
    }
}

/// The operations the battery needs from a container of `i32`.
///
/// Implemented for [`SequenceBuffer`] and `Vec` so the two stay
/// interchangeable.
pub trait BenchSequence: Sized {
    const NAME: &'static str;

    fn empty() -> Self;
    /// `len` zeroes.
    fn with_len(len: usize) -> Self;
    fn push_back(&mut self, value: i32);
    fn emplace_back(&mut self, value: i32);
    /// Grows to a total capacity of at least `capacity`.
    fn reserve_total(&mut self, capacity: usize);
    fn len(&self) -> usize;
    fn get(&self, index: usize) -> i32;
    fn set(&mut self, index: usize, value: i32);
    fn as_mut_slice(&mut self) -> &mut [i32];
    /// Full front-to-back traversal.
    fn sum(&self) -> i64;
    fn erase_front(&mut self);
    fn insert_front(&mut self, value: i32);
    fn pop_back(&mut self);
    fn clear(&mut self);
    fn duplicate(&self) -> Self;
    fn copy_assign(&mut self, source: &Self);
    /// Moves the contents out, leaving `self` empty.
    fn move_out(&mut self) -> Self;
}

impl BenchSequence for SequenceBuffer<i32> {
    const NAME: &'static str = "SequenceBuffer<i32>";

    fn empty() -> Self {
        SequenceBuffer::new()
    }

    fn with_len(len: usize) -> Self {
        SequenceBuffer::with_len(len)
    }

    #[inline]
    fn push_back(&mut self, value: i32) {
        SequenceBuffer::push_back(self, value);
    }

    #[inline]
    fn emplace_back(&mut self, value: i32) {
        SequenceBuffer::emplace_back(self, || value);
    }

    fn reserve_total(&mut self, capacity: usize) {
        self.reserve(capacity);
    }

    fn len(&self) -> usize {
        SequenceBuffer::len(self)
    }

    #[inline]
    fn get(&self, index: usize) -> i32 {
        self[index]
    }

    #[inline]
    fn set(&mut self, index: usize, value: i32) {
        self[index] = value;
    }

    fn as_mut_slice(&mut self) -> &mut [i32] {
        SequenceBuffer::as_mut_slice(self)
    }

    fn sum(&self) -> i64 {
        let mut sum = 0;
        for &x in self {
            sum += i64::from(x);
        }
        sum
    }

    fn erase_front(&mut self) {
        self.erase(0);
    }

    fn insert_front(&mut self, value: i32) {
        self.insert(0, value);
    }

    fn pop_back(&mut self) {
        SequenceBuffer::pop_back(self);
    }

    fn clear(&mut self) {
        SequenceBuffer::clear(self);
    }

    fn duplicate(&self) -> Self {
        SequenceBuffer::duplicate(self)
    }

    fn copy_assign(&mut self, source: &Self) {
        self.assign_from(source);
    }

    fn move_out(&mut self) -> Self {
        self.take()
    }
}

impl BenchSequence for Vec<i32> {
    const NAME: &'static str = "Vec<i32>";

    fn empty() -> Self {
        Vec::new()
    }

    fn with_len(len: usize) -> Self {
        vec![0; len]
    }

    #[inline]
    fn push_back(&mut self, value: i32) {
        self.push(value);
    }

    #[inline]
    fn emplace_back(&mut self, value: i32) {
        self.push(value);
    }

    fn reserve_total(&mut self, capacity: usize) {
        self.reserve(capacity.saturating_sub(Vec::len(self)));
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn get(&self, index: usize) -> i32 {
        self[index]
    }

    #[inline]
    fn set(&mut self, index: usize, value: i32) {
        self[index] = value;
    }

    fn as_mut_slice(&mut self) -> &mut [i32] {
        Vec::as_mut_slice(self)
    }

    fn sum(&self) -> i64 {
        let mut sum = 0;
        for &x in self {
            sum += i64::from(x);
        }
        sum
    }

    fn erase_front(&mut self) {
        self.remove(0);
    }

    fn insert_front(&mut self, value: i32) {
        self.insert(0, value);
    }

    fn pop_back(&mut self) {
        self.pop();
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn duplicate(&self) -> Self {
        self.clone()
    }

    fn copy_assign(&mut self, source: &Self) {
        self.clone_from(source);
    }

    fn move_out(&mut self) -> Self {
        mem::take(self)
    }
}

/// Benchmark categories, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    PushBack,
    EmplaceBack,
    ReservePushBack,
    SequentialRead,
    RandomRead,
    SequentialWrite,
    RandomWrite,
    Iteration,
    FrontErase,
    FrontInsert,
    PopBack,
    ClearRefill,
    CopyConstruct,
    CopyAssign,
    MoveConstruct,
    MoveAssign,
}

impl Operation {
    pub const ALL: [Operation; 16] = [
        Operation::PushBack,
        Operation::EmplaceBack,
        Operation::ReservePushBack,
        Operation::SequentialRead,
        Operation::RandomRead,
        Operation::SequentialWrite,
        Operation::RandomWrite,
        Operation::Iteration,
        Operation::FrontErase,
        Operation::FrontInsert,
        Operation::PopBack,
        Operation::ClearRefill,
        Operation::CopyConstruct,
        Operation::CopyAssign,
        Operation::MoveConstruct,
        Operation::MoveAssign,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Operation::PushBack => "push_back",
            Operation::EmplaceBack => "emplace_back",
            Operation::ReservePushBack => "reserve+push_back",
            Operation::SequentialRead => "sequential read",
            Operation::RandomRead => "random read",
            Operation::SequentialWrite => "sequential write",
            Operation::RandomWrite => "random write",
            Operation::Iteration => "range-for iteration",
            Operation::FrontErase => "front erase stress test",
            Operation::FrontInsert => "front insert stress test",
            Operation::PopBack => "pop_back",
            Operation::ClearRefill => "clear+refill",
            Operation::CopyConstruct => "copy constructor",
            Operation::CopyAssign => "copy assignment",
            Operation::MoveConstruct => "move constructor",
            Operation::MoveAssign => "move assignment",
        }
    }
}

/// Elapsed time of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub operation: Operation,
    pub elapsed: Duration,
}

/// All timings of one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatteryReport {
    pub target: &'static str,
    pub timings: Vec<Timing>,
}

impl BatteryReport {
    pub fn elapsed(&self, operation: Operation) -> Option<Duration> {
        self.timings
            .iter()
            .find(|timing| timing.operation == operation)
            .map(|timing| timing.elapsed)
    }
}

/// Runs every category on a fresh container of type `V`.
pub fn run_battery<V: BenchSequence>(config: &BatteryConfig) -> BatteryReport {
    info!(target_name = V::NAME, ?config, "running battery");
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let runs = config.repeat.max(1);

    let timings = Operation::ALL
        .iter()
        .map(|&operation| {
            let elapsed = (0..runs)
                .map(|_| measure::<V>(operation, config, &mut rng))
                .min()
                .unwrap_or_default();
            debug!(
                target_name = V::NAME,
                operation = operation.label(),
                elapsed_ms = elapsed.as_secs_f64() * 1e3,
                "category finished"
            );
            Timing { operation, elapsed }
        })
        .collect();

    BatteryReport {
        target: V::NAME,
        timings,
    }
}

/// Fills with `0, 1, 2, ...`; values wrap past `i32::MAX`.
fn iota<V: BenchSequence>(v: &mut V) {
    for (i, slot) in v.as_mut_slice().iter_mut().enumerate() {
        *slot = i as i32;
    }
}

fn counted<V: BenchSequence>(len: usize) -> V {
    let mut v = V::with_len(len);
    iota(&mut v);
    v
}

/// Times a single run of `operation`; setup and teardown are excluded.
fn measure<V: BenchSequence>(
    operation: Operation,
    config: &BatteryConfig,
    rng: &mut SmallRng,
) -> Duration {
    let n = config.elements;
    let m = config.stress_elements;

    match operation {
        Operation::PushBack => {
            let mut v = V::empty();
            let start = Instant::now();
            for i in 0..n {
                v.push_back(i as i32);
            }
            let elapsed = start.elapsed();
            black_box(&v);
            elapsed
        }
        Operation::EmplaceBack => {
            let mut v = V::empty();
            let start = Instant::now();
            for i in 0..n {
                v.emplace_back(i as i32);
            }
            let elapsed = start.elapsed();
            black_box(&v);
            elapsed
        }
        Operation::ReservePushBack => {
            let mut v = V::empty();
            let start = Instant::now();
            v.reserve_total(n);
            for i in 0..n {
                v.push_back(i as i32);
            }
            let elapsed = start.elapsed();
            black_box(&v);
            elapsed
        }
        Operation::SequentialRead => {
            let v: V = counted(n);
            let start = Instant::now();
            let mut sum = 0i64;
            for i in 0..n {
                sum += i64::from(v.get(i));
            }
            let elapsed = start.elapsed();
            black_box(sum);
            elapsed
        }
        Operation::RandomRead => {
            let v: V = counted(n);
            let indices = random_indices(rng, n);
            let start = Instant::now();
            let mut sum = 0i64;
            for &index in &indices {
                sum += i64::from(v.get(index));
            }
            let elapsed = start.elapsed();
            black_box(sum);
            elapsed
        }
        Operation::SequentialWrite => {
            let mut v = V::with_len(n);
            let start = Instant::now();
            for i in 0..n {
                v.set(i, i as i32);
            }
            let elapsed = start.elapsed();
            black_box(&v);
            elapsed
        }
        Operation::RandomWrite => {
            let mut v = V::with_len(n);
            let indices = random_indices(rng, n);
            let start = Instant::now();
            for (i, &index) in indices.iter().enumerate() {
                v.set(index, i as i32);
            }
            let elapsed = start.elapsed();
            black_box(&v);
            elapsed
        }
        Operation::Iteration => {
            let v: V = counted(n);
            let start = Instant::now();
            let sum = v.sum();
            let elapsed = start.elapsed();
            black_box(sum);
            elapsed
        }
        Operation::FrontErase => {
            let mut v: V = counted(m);
            let start = Instant::now();
            for _ in 0..m {
                v.erase_front();
            }
            let elapsed = start.elapsed();
            debug_assert_eq!(v.len(), 0);
            elapsed
        }
        Operation::FrontInsert => {
            let mut v = V::empty();
            let start = Instant::now();
            for i in 0..m {
                v.insert_front(i as i32);
            }
            let elapsed = start.elapsed();
            black_box(&v);
            elapsed
        }
        Operation::PopBack => {
            let mut v: V = counted(n);
            let start = Instant::now();
            for _ in 0..n {
                v.pop_back();
            }
            let elapsed = start.elapsed();
            debug_assert_eq!(v.len(), 0);
            elapsed
        }
        Operation::ClearRefill => {
            let mut v: V = counted(n);
            let start = Instant::now();
            v.clear();
            for i in 0..n {
                v.emplace_back(i as i32);
            }
            let elapsed = start.elapsed();
            black_box(&v);
            elapsed
        }
        Operation::CopyConstruct => {
            let source: V = counted(n);
            let start = Instant::now();
            let copy = source.duplicate();
            let elapsed = start.elapsed();
            black_box(&copy);
            elapsed
        }
        Operation::CopyAssign => {
            let source: V = counted(n);
            let mut target: V = counted(n / 50);
            let start = Instant::now();
            target.copy_assign(&source);
            let elapsed = start.elapsed();
            black_box(&target);
            elapsed
        }
        Operation::MoveConstruct => {
            let mut source: V = counted(n);
            let start = Instant::now();
            let moved = source.move_out();
            let elapsed = start.elapsed();
            black_box(&moved);
            elapsed
        }
        Operation::MoveAssign => {
            let mut source: V = counted(n);
            let mut target: V = counted(n / 50);
            black_box(&target);
            let start = Instant::now();
            // the old contents of `target` are released inside the timed region
            target = source.move_out();
            let elapsed = start.elapsed();
            black_box(&target);
            elapsed
        }
    }
}

/// `count` uniformly random indices into `[0, count)`, drawn up front so
/// the generator stays out of the timed loop.
fn random_indices(rng: &mut SmallRng, count: usize) -> Vec<usize> {
    if count == 0 {
        return Vec::new();
    }
    (0..count).map(|_| rng.random_range(0..count)).collect()
}
