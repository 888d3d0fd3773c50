use sequence_buffer::SequenceBuffer;
use std::thread;

fn main() {
    println!("--- Cross-thread Ownership Transfer Example ---");
    let mut buf = SequenceBuffer::new();
    for i in 0..10 {
        buf.push_back(i);
    }
    let store = buf.as_ptr();

    println!("Original buffer (thread main): {:?}", buf);

    // Moving the buffer hands over its store; nothing is copied.
    let handle = thread::spawn(move || {
        println!("Buffer in new thread: {:?}", buf);
        buf.push_back(100);
        buf
    });

    let buf = handle.join().expect("worker thread panicked");
    println!("Buffer back in main thread: {:?}", buf);
    println!("Store reallocated on the way: {}", buf.as_ptr() != store);
}
