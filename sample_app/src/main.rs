use sequence_buffer::SequenceBuffer;

fn main() {
    println!("Initializing SequenceBuffer...");
    let mut buffer = SequenceBuffer::new();

    println!("Pushing elements...");
    for i in 0..5 {
        buffer.push_back(i);
    }

    assert_eq!(buffer.len(), 5);
    assert_eq!(buffer[2], 2);
    println!("Buffer length verified: {}", buffer.len());

    buffer.erase(1);
    assert_eq!(buffer, [0, 2, 3, 4]);
    println!("After erase(1): {:?}", buffer);

    buffer.insert(1, 9);
    assert_eq!(buffer, [0, 9, 2, 3, 4]);
    println!("After insert(1, 9): {:?}", buffer);

    buffer.pop_back();
    assert_eq!(buffer, [0, 9, 2, 3]);
    println!("After pop_back: {:?}", buffer);

    println!("Iterating elements:");
    for (i, val) in buffer.iter().enumerate() {
        println!("Index {}: {}", i, val);
    }

    buffer.clear();
    assert_eq!(buffer.len(), 0);
    println!("Capacity kept after clear: {}", buffer.capacity());
    println!("Integration test passed successfully.");
}
