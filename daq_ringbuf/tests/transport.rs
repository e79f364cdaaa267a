//! End-to-end transport behavior over a real mapped segment.

use daq_ringbuf::{
    Record, RecordHeader, RetryPolicy, RingConsumer, RingError, RingProducer, RunInfo,
    RunInfoReader,
};
use proptest::prelude::*;

const CAPACITY: usize = 1024;

fn record(event: u32, payload: Vec<u32>) -> Record {
    Record::new(
        RecordHeader {
            exp: 7,
            run: 2200,
            subrun: 0,
            event,
            node: 3,
        },
        payload,
    )
}

#[test]
fn three_records_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let mut producer = RingProducer::create(dir.path(), "e2e", CAPACITY).unwrap();
    let mut consumer = RingConsumer::attach(dir.path(), "e2e").unwrap();

    // Total frame sizes 10, 20, 15 words.
    let records = [
        record(1, (0..2).collect()),
        record(2, (100..112).collect()),
        record(3, (200..207).collect()),
    ];
    assert_eq!(records[0].total_words(), 10);
    assert_eq!(records[1].total_words(), 20);
    assert_eq!(records[2].total_words(), 15);

    let policy = RetryPolicy::default();
    for r in &records {
        producer.enqueue(r, &policy).unwrap();
    }

    for expected in &records {
        let got = consumer.dequeue(&policy).unwrap();
        assert_eq!(got.total_words(), expected.total_words());
        assert_eq!(&got, expected);
    }
    assert!(consumer.is_empty());
}

#[test]
fn fan_out_is_per_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let mut out_a = RingProducer::create(dir.path(), "fan_a", CAPACITY).unwrap();
    let mut out_b = RingProducer::create(dir.path(), "fan_b", CAPACITY).unwrap();
    let mut in_a = RingConsumer::attach(dir.path(), "fan_a").unwrap();
    let mut in_b = RingConsumer::attach(dir.path(), "fan_b").unwrap();

    // The same logical stream written to both buffers.
    for event in 0..8 {
        let r = record(event, vec![event; 5]);
        out_a.try_enqueue(&r).unwrap();
        out_b.try_enqueue(&r).unwrap();
    }

    // Each consumer sees the full stream in order, independently.
    for event in 0..8 {
        assert_eq!(in_a.try_dequeue().unwrap().unwrap().header.event, event);
    }
    for event in 0..8 {
        assert_eq!(in_b.try_dequeue().unwrap().unwrap().header.event, event);
    }
}

#[test]
fn producer_and_consumer_across_threads() {
    let dir = tempfile::tempdir().unwrap();
    let mut producer = RingProducer::create(dir.path(), "thr", CAPACITY).unwrap();
    let mut consumer = RingConsumer::attach(dir.path(), "thr").unwrap();

    let total: u32 = 500;
    let policy = RetryPolicy::default();

    let feeder = std::thread::spawn(move || {
        let policy = RetryPolicy::default();
        for event in 0..total {
            let r = record(event, vec![event ^ 0xABCD; (event % 50) as usize]);
            producer.enqueue(&r, &policy).unwrap();
        }
        producer
    });

    for event in 0..total {
        let got = consumer.dequeue(&policy).unwrap();
        assert_eq!(got.header.event, event);
        assert_eq!(got.payload, vec![event ^ 0xABCD; (event % 50) as usize]);
    }

    let producer = feeder.join().unwrap();
    assert!(producer.is_empty());
}

#[test]
fn run_info_alongside_transport() {
    let dir = tempfile::tempdir().unwrap();
    let mut producer = RingProducer::create(dir.path(), "mon", CAPACITY).unwrap();
    let mut consumer = RingConsumer::attach(dir.path(), "mon").unwrap();
    let mut info = RunInfo::create(dir.path(), "mon").unwrap();
    let monitor = RunInfoReader::attach(dir.path(), "mon").unwrap();

    info.begin_run(7, 2200);
    info.report_ready();

    for event in 0..10 {
        let r = record(event, vec![0; 16]);
        producer.try_enqueue(&r).unwrap();
        info.add_output_count(1);
        info.add_output_bytes(r.total_words() as u64 * 4);
        consumer.try_dequeue().unwrap().unwrap();
    }

    let snap = monitor.snapshot();
    assert!(snap.ready);
    assert_eq!(snap.exp, 7);
    assert_eq!(snap.run, 2200);
    assert_eq!(snap.output_count, 10);
    assert_eq!(snap.output_bytes, 10 * 24 * 4);
}

#[test]
fn second_producer_for_same_buffer_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let _producer = RingProducer::create(dir.path(), "excl", CAPACITY).unwrap();
    assert!(matches!(
        RingProducer::create(dir.path(), "excl", CAPACITY),
        Err(RingError::AlreadyExists { .. })
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // FIFO property: any enqueue sequence that fits comes back unchanged
    // and in order.
    #[test]
    fn fifo_property(payload_lens in prop::collection::vec(0usize..32, 1..20)) {
        let dir = tempfile::tempdir().unwrap();
        let mut producer = RingProducer::create(dir.path(), "prop", 4096).unwrap();
        let mut consumer = RingConsumer::attach(dir.path(), "prop").unwrap();

        let records: Vec<Record> = payload_lens
            .iter()
            .enumerate()
            .map(|(i, &len)| record(i as u32, (0..len as u32).map(|w| w * 3 + i as u32).collect()))
            .collect();

        for r in &records {
            producer.enqueue(r, &RetryPolicy::default()).unwrap();
        }
        for expected in &records {
            prop_assert_eq!(&consumer.try_dequeue().unwrap().unwrap(), expected);
        }
        prop_assert!(consumer.try_dequeue().unwrap().is_none());
    }
}
