use crate::{AudioIngestBuffer, CoreError, SessionGeneration};

/// WHAT: The first fragment over the size guard is reported, later ones are not
/// WHY: A stuck client must not exhaust memory or flood clients with errors
#[test]
#[allow(clippy::unwrap_used)]
fn given_buffer_near_limit_when_fragment_exceeds_then_error_once_then_dropped() {
    // Given: A buffer capped at 8 bytes holding 6
    let mut buffer = AudioIngestBuffer::new(8);
    assert!(buffer.append(b"abcdef".to_vec()).unwrap());

    // When: Appending past the limit twice
    let first = buffer.append(b"ghi".to_vec());
    let second = buffer.append(b"j".to_vec());

    // Then: Only the first overflow is an error and nothing was stored
    assert!(matches!(
        first,
        Err(CoreError::RecordingLimitExceeded { limit_bytes: 8, .. })
    ));
    assert!(!second.unwrap());
    assert_eq!(buffer.fragment_count(), 1);
    assert_eq!(buffer.total_bytes(), 6);
}

/// WHAT: Zero-length fragments are ignored
/// WHY: An empty frame must not make a silent recording look non-empty
#[test]
#[allow(clippy::unwrap_used)]
fn given_empty_fragment_when_appending_then_dropped() {
    // Given: An empty buffer
    let mut buffer = AudioIngestBuffer::new(1024);

    // When: Appending an empty fragment
    let stored = buffer.append(Vec::new()).unwrap();

    // Then: Nothing is stored
    assert!(!stored);
    assert!(buffer.is_empty());
}

/// WHAT: Snapshot keeps fragment boundaries and generation
/// WHY: The pipeline receives exactly what was streamed, tagged for staleness checks
#[test]
#[allow(clippy::unwrap_used)]
fn given_fragments_when_snapshotting_then_boundaries_and_generation_kept() {
    // Given: Three fragments
    let mut buffer = AudioIngestBuffer::new(1024);
    for fragment in [&b"one"[..], b"two", b"three"] {
        buffer.append(fragment.to_vec()).unwrap();
    }
    let generation = SessionGeneration::default().next().next();

    // When: Freezing the buffer
    let snapshot = buffer.into_snapshot(generation);

    // Then: Fragments, size and generation are preserved
    assert_eq!(
        snapshot.fragments(),
        &[b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]
    );
    assert_eq!(snapshot.total_bytes(), 11);
    assert_eq!(snapshot.to_bytes(), b"onetwothree".to_vec());
    assert_eq!(snapshot.generation().value(), 2);
}
