use self::capture::capture;

use super::*;

use tracing::Level;


/// `(address, length)` pairs of a block list, in list order.
fn layout(list: &BlockList) -> Vec<(usize, usize)> {
    list.iter().map(|b| (b.address(), b.length())).collect()
}

/// `(address, length)` pairs of a block list, in address order.
fn sorted_layout(list: &BlockList) -> Vec<(usize, usize)> {
    let mut blocks = layout(list);
    blocks.sort_unstable();
    blocks
}

#[test]
fn test_1() {
    assert_eq!(Heap::new(0, Strategy::FirstFit).unwrap_err(), HeapError::InvalidCapacity);

    let heap = Heap::new(100, Strategy::WorstFit).unwrap();
    assert_eq!(heap.capacity(), 100);
    assert_eq!(heap.strategy(), Strategy::WorstFit);
    assert_eq!(layout(heap.free_blocks()), vec![(0, 100)]);
    assert!(heap.allocated_blocks().is_empty());
    assert_eq!(heap.available_memory(), 100);
}

#[test]
fn test_2() {
    // Splitting with first fit.
    let mut heap = Heap::new(100, Strategy::FirstFit).unwrap();

    assert_eq!(heap.allocate(10), Ok(0));
    assert_eq!(layout(heap.free_blocks()), vec![(10, 90)]);

    assert_eq!(heap.allocate(20), Ok(10));
    assert_eq!(layout(heap.free_blocks()), vec![(30, 70)]);

    // Freeing a block that isn't contiguous with any free block.
    heap.free(0).unwrap();
    assert_eq!(layout(heap.allocated_blocks()), vec![(10, 20)]);
    assert_eq!(layout(heap.free_blocks()), vec![(0, 10), (30, 70)]);
}

#[test]
fn test_3() {
    // Freeing a block between two free blocks merges all three.
    let mut heap = Heap::new(100, Strategy::BestFit).unwrap();

    assert_eq!(heap.allocate(30), Ok(0));
    assert_eq!(heap.allocate(20), Ok(30));
    assert_eq!(heap.allocate(10), Ok(50));
    assert_eq!(layout(heap.free_blocks()), vec![(60, 40)]);

    heap.free(30).unwrap();
    assert_eq!(layout(heap.free_blocks()), vec![(30, 20), (60, 40)]);

    heap.free(50).unwrap();
    assert_eq!(layout(heap.free_blocks()), vec![(30, 70)]);
    assert_eq!(layout(heap.allocated_blocks()), vec![(0, 30)]);
}

#[test]
fn test_4() {
    let mut heap = Heap::new(100, Strategy::FirstFit).unwrap();

    assert_eq!(heap.allocate(0), Err(HeapError::InvalidSize));
    assert_eq!(heap.allocate(101), Err(HeapError::NoFit { size: 101 }));
    assert_eq!(heap.allocate(100), Ok(0));
    assert_eq!(heap.allocate(1), Err(HeapError::NoFit { size: 1 }));
    assert!(heap.free_blocks().is_empty(), "An exact fit should consume the block.");
}

#[test]
fn test_5() {
    let mut heap = Heap::new(100, Strategy::FirstFit).unwrap();

    assert_eq!(heap.free(0), Err(HeapError::InvalidFree { address: 0 }));

    let p = heap.allocate(10).unwrap();
    let q = heap.allocate(10).unwrap();
    assert_eq!(heap.free(p + 1), Err(HeapError::InvalidFree { address: p + 1 }));

    heap.free(q).unwrap();
    assert_eq!(heap.free(q), Err(HeapError::InvalidFree { address: q }));
    assert_eq!(heap.available_memory(), 90);
    assert_eq!(layout(heap.allocated_blocks()), vec![(p, 10)]);
}

/// Carves a 100 byte heap into free holes of 20, 10, 30 and 10 bytes at 10, 35, 50 and 90,
/// each pair separated by a live allocation.
fn holes(strategy: Strategy) -> Heap {
    let mut heap = Heap::new(100, strategy).unwrap();
    let sizes = [10, 20, 5, 10, 5, 30, 10, 10];
    let addresses: Vec<usize> = sizes.iter().map(|&s| heap.allocate(s).unwrap()).collect();
    assert_eq!(addresses, vec![0, 10, 30, 35, 45, 50, 80, 90]);

    for address in [10, 35, 50, 90] {
        heap.free(address).unwrap();
    }
    assert_eq!(
        layout(heap.free_blocks()),
        vec![(10, 20), (35, 10), (50, 30), (90, 10)]
    );
    heap
}

#[test]
fn test_6() {
    let mut heap = holes(Strategy::FirstFit);
    assert_eq!(heap.allocate(10), Ok(10), "First fit ignores waste.");
    assert_eq!(heap.allocate(25), Ok(50));
    assert_eq!(
        layout(heap.free_blocks()),
        vec![(20, 10), (35, 10), (75, 5), (90, 10)]
    );
}

#[test]
fn test_7() {
    let mut heap = holes(Strategy::BestFit);
    assert_eq!(heap.allocate(10), Ok(35), "The first exact fit wins.");
    assert_eq!(heap.allocate(10), Ok(90));
    assert_eq!(heap.allocate(15), Ok(10));
    assert_eq!(layout(heap.free_blocks()), vec![(25, 5), (50, 30)]);
}

#[test]
fn test_8() {
    let mut heap = holes(Strategy::WorstFit);
    assert_eq!(heap.allocate(5), Ok(50));
    // Now 10..30 (20) and 55..80 (25): the larger one wins.
    assert_eq!(heap.allocate(5), Ok(55));
    // 10..30 and 60..80 are both 20 long: the lower address is scanned first.
    assert_eq!(heap.allocate(5), Ok(10));
}

#[test]
fn test_9() {
    // Allocate then free restores the available memory for every strategy.
    for strategy in Strategy::ALL {
        let mut heap = holes(strategy);
        let before = sorted_layout(heap.free_blocks());
        let available = heap.available_memory();

        let p = heap.allocate(7).unwrap();
        assert_eq!(heap.available_memory(), available - 7);
        heap.free(p).unwrap();

        assert_eq!(heap.available_memory(), available, "{strategy}");
        assert_eq!(sorted_layout(heap.free_blocks()), before, "{strategy}");
    }
}

#[test]
fn test_10() {
    let mut heap = Heap::new(64, Strategy::FirstFit).unwrap();
    let a = heap.allocate(8).unwrap();
    let b = heap.allocate(8).unwrap();
    let c = heap.allocate(16).unwrap();
    let d = heap.allocate(8).unwrap();

    heap.payload_mut(b).unwrap().fill(0xb);
    heap.payload_mut(d).unwrap().copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
    heap.free(a).unwrap();
    heap.free(c).unwrap();

    let compaction = heap.compact();
    assert_eq!(compaction.count(), 2);
    assert_eq!(compaction.before(), &[b, d]);
    assert_eq!(compaction.after(), &[0, 8]);
    assert_eq!(compaction.translate(d), Some(8));

    assert_eq!(layout(heap.allocated_blocks()), vec![(0, 8), (8, 8)]);
    assert_eq!(layout(heap.free_blocks()), vec![(16, 48)]);
    assert_eq!(heap.payload(0).unwrap(), &[0xb; 8]);
    assert_eq!(heap.payload(8).unwrap(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(heap.payload(d), Err(HeapError::UnknownBlock { address: d }));
}

#[test]
fn test_11() {
    // Blocks that are already packed stay where they are and are still reported.
    let mut heap = Heap::new(32, Strategy::BestFit).unwrap();
    let a = heap.allocate(8).unwrap();
    let b = heap.allocate(8).unwrap();
    let c = heap.allocate(8).unwrap();
    heap.free(b).unwrap();

    let compaction = heap.compact();
    assert_eq!(compaction.relocations().collect::<Vec<_>>(), vec![(a, 0), (c, 8)]);
    assert_eq!(layout(heap.free_blocks()), vec![(16, 16)]);
}

#[test]
fn test_12() {
    // A full heap leaves no free block after compaction.
    let mut heap = Heap::new(30, Strategy::FirstFit).unwrap();
    for _ in 0..3 {
        heap.allocate(10).unwrap();
    }
    let compaction = heap.compact();
    assert_eq!(compaction.count(), 3);
    assert!(heap.free_blocks().is_empty());

    // An empty heap is left untouched.
    let mut heap = Heap::new(30, Strategy::FirstFit).unwrap();
    assert_eq!(heap.compact().count(), 0);
    assert_eq!(layout(heap.free_blocks()), vec![(0, 30)]);
}

#[test]
fn test_13() {
    // Compaction makes room for a request that didn't fit in any hole.
    let mut heap = holes(Strategy::FirstFit);
    assert_eq!(heap.allocate(50), Err(HeapError::NoFit { size: 50 }));
    heap.compact();
    assert_eq!(layout(heap.free_blocks()), vec![(30, 70)]);
    assert_eq!(heap.allocate(50), Ok(30));
}

#[test]
fn test_14() {
    let mut heap = Heap::new(64, Strategy::FirstFit).unwrap();
    let a = heap.allocate(8).unwrap();
    let b = heap.allocate(8).unwrap();
    let _c = heap.allocate(8).unwrap();
    heap.payload_mut(b).unwrap().fill(7);
    heap.free(a).unwrap();

    let mut before = [0; 2];
    let mut after = [0; 1];
    assert_eq!(
        heap.compact_into(&mut before, &mut after),
        Err(HeapError::OutputCapacityExceeded { required: 2, provided: 1 })
    );
    // Nothing moved.
    assert_eq!(heap.payload(b).unwrap(), &[7; 8]);
    assert_eq!(layout(heap.free_blocks()), vec![(0, 8), (24, 40)]);

    // A short `before` buffer is rejected the same way.
    let mut short = [usize::MAX; 1];
    let mut after = [usize::MAX; 4];
    assert_eq!(
        heap.compact_into(&mut short, &mut after),
        Err(HeapError::OutputCapacityExceeded { required: 2, provided: 1 })
    );
    assert_eq!(short, [usize::MAX; 1]);
    assert_eq!(after, [usize::MAX; 4], "Nothing should be written on failure.");
    assert_eq!(heap.payload(b).unwrap(), &[7; 8]);
    assert_eq!(layout(heap.free_blocks()), vec![(0, 8), (24, 40)]);

    let mut after = [0; 4];
    assert_eq!(heap.compact_into(&mut before, &mut after), Ok(2));
    assert_eq!(before, [8, 16]);
    assert_eq!(after[..2], [0, 8]);
    assert_eq!(heap.payload(0).unwrap(), &[7; 8]);
}

#[test]
fn test_15() {
    let mut heap = holes(Strategy::FirstFit);
    assert_eq!(
        heap.statistics(),
        Statistics {
            allocated_size: 30,
            allocated_count: 4,
            free_size: 70,
            free_count: 4,
            largest_free: 30,
            smallest_free: 10,
        }
    );

    heap.allocate(70).unwrap_err();
    heap.compact();
    heap.allocate(70).unwrap();
    let stats = heap.statistics();
    assert_eq!(stats.free_count, 0);
    assert_eq!(stats.largest_free, 0);
    assert_eq!(stats.smallest_free, 100);
    assert_eq!(stats.allocated_size, 100);
}

#[test]
fn test_16() {
    let mut heap = Heap::new(16, Strategy::FirstFit).unwrap();
    let p = heap.allocate(4).unwrap();
    assert_eq!(heap.payload(p).unwrap(), &[0; 4]);
    heap.payload_mut(p).unwrap().copy_from_slice(b"kilo");
    assert_eq!(heap.payload(p).unwrap(), b"kilo");
    assert_eq!(heap.payload_mut(p + 1), Err(HeapError::UnknownBlock { address: p + 1 }));
    heap.destroy();
}

#[test]
fn test_17() {
    let records = capture(|| {
        let mut heap = Heap::new(16, Strategy::FirstFit).unwrap();
        let p = heap.allocate(8).unwrap();
        heap.free(p).unwrap();
        let _ = heap.free(p);
        let _ = heap.allocate(32);
    });

    let errors = records.find(Level::ERROR, "free");
    assert_eq!(errors.len(), 1, "{:?}", records.records());
    assert!(errors[0].fields.contains("address 0 is not a live allocation"));

    let warnings = records.find(Level::WARN, "allocate");
    assert_eq!(warnings.len(), 1, "{:?}", records.records());
    assert!(warnings[0].fields.contains("no free block can hold 32 bytes"));

    assert!(!records.find(Level::DEBUG, "coalesce").is_empty());
}

#[test]
fn test_18() {
    let heap = Heap::new(8, Strategy::BestFit).unwrap();
    assert_eq!(
        format!("{heap:?}"),
        "Heap { capacity: 8, strategy: BestFit, free: 1, allocated: 0 }"
    );
}
