use sequence_buffer::SequenceBuffer;

fn main() {
    println!("--- Basic Usage Example ---");
    let mut buf = SequenceBuffer::new();

    for i in 1..=5 {
        buf.push_back(i * 10);
        println!("Pushed: {}, len: {}, cap: {}", i * 10, buf.len(), buf.capacity());
    }

    buf.insert(0, 5);
    println!("After insert at front: {:?}", buf);

    buf.erase(2);
    println!("After erase at 2: {:?} (cap still {})", buf, buf.capacity());

    match buf.at(42) {
        Ok(value) => println!("Element 42: {}", value),
        Err(err) => println!("Checked access failed: {}", err),
    }

    println!("Backwards: {:?}", buf.iter_rev().collect::<Vec<_>>());

    while let Some(val) = buf.pop() {
        println!("Popped: {}, len: {}", val, buf.len());
    }
}
