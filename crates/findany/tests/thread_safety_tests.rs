// Thread-safety tests for compiled search values
use findany::{ByteSearchValues, CharSearchValues, MatchMode, StringSearchValues};
use std::sync::Arc;
use std::thread;

fn utf16(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

#[test]
fn test_search_values_are_send_sync() {
    // Compile-time assertion that every matcher is Send + Sync
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    assert_send::<StringSearchValues>();
    assert_sync::<StringSearchValues>();
    assert_send::<CharSearchValues>();
    assert_sync::<CharSearchValues>();
    assert_send::<ByteSearchValues>();
    assert_sync::<ByteSearchValues>();
}

#[test]
fn test_concurrent_queries() {
    let needles = ["error", "warning", "fatal", "panic"];
    let set = Arc::new(StringSearchValues::new(&needles, MatchMode::CaseInsensitive).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|thread_id| {
            let set = Arc::clone(&set);
            thread::spawn(move || {
                // Each thread does 100 queries, half of them with a hit
                let mut hits = 0;
                for i in 0..100 {
                    let line = if i % 2 == 0 {
                        format!("[{}:{}] request served", thread_id, i)
                    } else {
                        format!("[{}:{}] WARNING slow request", thread_id, i)
                    };
                    if set.contains_any(&utf16(&line)) {
                        hits += 1;
                    }
                }
                hits
            })
        })
        .collect();

    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, 8 * 50);
}

#[test]
fn test_concurrent_reverse_initialization() {
    // The reverse automaton is built lazily; racing threads must all see it.
    let needles = ["alpha", "beta", "gamma", "delta", "epsilon"];
    let set = Arc::new(StringSearchValues::new(&needles, MatchMode::CaseSensitive).unwrap());
    let haystack = Arc::new(utf16("alpha beta gamma delta epsilon alpha"));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let set = Arc::clone(&set);
            let haystack = Arc::clone(&haystack);
            thread::spawn(move || set.rfind(&haystack).map(|m| (m.needle(), m.start())))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Some((0, 31)));
    }
}

#[test]
fn test_concurrent_char_sets() {
    let set = Arc::new(CharSearchValues::new(&utf16(",;:\u{3001}")));

    let handles: Vec<_> = (0..8)
        .map(|thread_id| {
            let set = Arc::clone(&set);
            thread::spawn(move || {
                let text = utf16(&format!("{}{}", "x".repeat(thread_id * 7), "\u{3001}tail"));
                assert_eq!(set.index_of_any(&text), Some(thread_id * 7));
                assert_eq!(set.last_index_of_any_except(&text), Some(text.len() - 1));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
