use sequence_buffer::SequenceBuffer;
use std::panic;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Tracked(usize, Arc<AtomicUsize>);

impl Clone for Tracked {
    fn clone(&self) -> Self {
        if self.0 == 2 {
            panic!("refusing to clone element {}", self.0);
        }
        Tracked(self.0, self.1.clone())
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        println!("Dropping element {}", self.0);
        self.1.fetch_add(1, Ordering::SeqCst);
    }
}

fn main() {
    println!("--- Panic Safety & RAII Example ---");
    let drop_count = Arc::new(AtomicUsize::new(0));

    {
        let mut buf = SequenceBuffer::new();
        for i in 0..3 {
            buf.push_back(Tracked(i, drop_count.clone()));
        }
        println!("Buffer created with 3 elements.");

        // The partial copy is torn down during unwinding: elements 0 and 1
        // are dropped once, the original stays intact.
        let copy = panic::catch_unwind(panic::AssertUnwindSafe(|| buf.clone()));
        assert!(copy.is_err());
        println!("Clone failed, original still has {} elements.", buf.len());
        assert_eq!(drop_count.load(Ordering::SeqCst), 2);
    }

    println!("Total elements dropped: {}", drop_count.load(Ordering::SeqCst));
    assert_eq!(drop_count.load(Ordering::SeqCst), 5);
}
