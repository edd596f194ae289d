use crate::{
    CoreError, PipelineOutcome, PipelineProgress, RecordingSession, SessionStatus,
};

const LIMIT: usize = 1024 * 1024;

fn completed(video_url: &str) -> PipelineOutcome {
    PipelineOutcome::Completed {
        transcription: "flying".to_string(),
        video_prompt: "a flight".to_string(),
        video_url: video_url.to_string(),
    }
}

/// WHAT: Start enters recording with cleared results and a new generation
/// WHY: Every recording must begin from a clean, uniquely tagged state
#[test]
#[allow(clippy::unwrap_used)]
fn given_ready_session_when_starting_then_recording_with_new_generation() {
    // Given: A fresh session
    let mut session = RecordingSession::new(LIMIT);
    let before = session.generation();

    // When: Starting
    let snapshot = session.start().unwrap();

    // Then: Recording, derived flag set, generation advanced
    assert_eq!(snapshot.status, SessionStatus::Recording);
    assert!(snapshot.is_recording);
    assert!(snapshot.transcription.is_empty());
    assert!(snapshot.video_url.is_none());
    assert!(session.generation() > before);
}

/// WHAT: Repeated starts without a stop have no effect after the first
/// WHY: Duplicate trigger events must not replace the buffer mid-recording
#[test]
#[allow(clippy::unwrap_used)]
fn given_recording_session_when_starting_again_then_rejected_and_buffer_kept() {
    // Given: A recording with one fragment
    let mut session = RecordingSession::new(LIMIT);
    session.start().unwrap();
    session.append(b"abc".to_vec()).unwrap();
    let generation = session.generation();

    // When: Starting twice more
    let second = session.start();
    let third = session.start();

    // Then: Both rejected, buffer and generation unchanged
    assert!(matches!(
        second,
        Err(CoreError::InvalidTransition {
            status: SessionStatus::Recording,
            ..
        })
    ));
    assert!(third.is_err());
    assert_eq!(session.buffered_fragments(), 1);
    assert_eq!(session.generation(), generation);
}

/// WHAT: Fragments outside a recording never reach a snapshot
/// WHY: Late fragments after a racing stop are expected and must be dropped
#[test]
#[allow(clippy::unwrap_used)]
fn given_no_active_recording_when_appending_then_fragment_dropped() {
    // Given: A session that has not started
    let mut session = RecordingSession::new(LIMIT);

    // When: Appending before start, then recording one fragment and stopping
    assert!(!session.append(b"early".to_vec()).unwrap());
    session.start().unwrap();
    session.append(b"dream".to_vec()).unwrap();
    let snapshot = session.finalize().unwrap();
    let late = session.append(b"late".to_vec()).unwrap();

    // Then: Only the in-recording fragment was captured, the late one dropped
    assert_eq!(snapshot.fragments(), &[b"dream".to_vec()]);
    assert!(!late);
    assert_eq!(session.buffered_fragments(), 0);
}

/// WHAT: Finalize captures fragments in arrival order and enters processing
/// WHY: The byte sequence is the recorded audio; any reordering corrupts it
#[test]
#[allow(clippy::unwrap_used)]
fn given_streamed_fragments_when_finalizing_then_snapshot_is_exact_sequence() {
    // Given: A recording fed abc then def
    let mut session = RecordingSession::new(LIMIT);
    assert_eq!(session.status(), SessionStatus::Ready);
    session.start().unwrap();
    assert_eq!(session.status(), SessionStatus::Recording);
    session.append(b"abc".to_vec()).unwrap();
    session.append(b"def".to_vec()).unwrap();

    // When: Finalizing
    let snapshot = session.finalize().unwrap();

    // Then: abcdef, tagged with the current generation, status processing
    assert_eq!(snapshot.to_bytes(), b"abcdef".to_vec());
    assert_eq!(snapshot.fragments().len(), 2);
    assert_eq!(snapshot.generation(), session.generation());
    assert_eq!(session.status(), SessionStatus::Processing);
    assert!(!session.is_recording());
}

/// WHAT: Finalizing with no audio fails and returns to ready
/// WHY: Empty recordings must fail fast without a pipeline job
#[test]
fn given_no_fragments_when_finalizing_then_empty_recording_and_ready() {
    // Given: A started recording with nothing appended
    let mut session = RecordingSession::new(LIMIT);
    let _ = session.start();

    // When: Finalizing
    let result = session.finalize();

    // Then: EmptyRecording, back to ready
    assert!(matches!(result, Err(CoreError::EmptyRecording { .. })));
    assert_eq!(session.status(), SessionStatus::Ready);
}

/// WHAT: Finalize outside a recording is rejected without side effects
/// WHY: A stray stop event must not alter a completed session
#[test]
#[allow(clippy::unwrap_used)]
fn given_complete_session_when_finalizing_then_rejected() {
    // Given: A completed session
    let mut session = RecordingSession::new(LIMIT);
    session.start().unwrap();
    session.append(b"x".to_vec()).unwrap();
    session.finalize().unwrap();
    let generation = session.generation();
    session.apply_result(generation, completed("/media/video/a.mp4"));

    // When: Finalizing again
    let result = session.finalize();

    // Then: Rejected, still complete
    assert!(matches!(result, Err(CoreError::InvalidTransition { .. })));
    assert_eq!(session.status(), SessionStatus::Complete);
}

/// WHAT: Progress reports move processing to generating
/// WHY: Clients show the pipeline's sub-phase as it advances
#[test]
#[allow(clippy::unwrap_used)]
fn given_processing_session_when_progress_applied_then_fields_and_phase_follow() {
    // Given: A session waiting on the pipeline
    let mut session = RecordingSession::new(LIMIT);
    session.start().unwrap();
    session.append(b"x".to_vec()).unwrap();
    let generation = session.finalize().unwrap().generation();

    // When: Transcription then prompt are reported
    let transcribed = session
        .apply_progress(
            generation,
            PipelineProgress::Transcribed {
                transcription: "flying".to_string(),
            },
        )
        .unwrap();
    let prompted = session
        .apply_progress(
            generation,
            PipelineProgress::PromptReady {
                video_prompt: "a flight".to_string(),
            },
        )
        .unwrap();

    // Then: Transcription lands while processing, prompt moves to generating
    assert_eq!(transcribed.status, SessionStatus::Processing);
    assert_eq!(transcribed.transcription, "flying");
    assert_eq!(prompted.status, SessionStatus::Generating);
    assert_eq!(prompted.video_prompt, "a flight");
}

/// WHAT: A failed job returns to ready with every result field empty
/// WHY: Partial results of a failed job must not be shown as a dream
#[test]
#[allow(clippy::unwrap_used)]
fn given_partial_progress_when_failure_applied_then_ready_and_fields_cleared() {
    // Given: A job that already reported a transcription
    let mut session = RecordingSession::new(LIMIT);
    session.start().unwrap();
    session.append(b"x".to_vec()).unwrap();
    let generation = session.finalize().unwrap().generation();
    session.apply_progress(
        generation,
        PipelineProgress::Transcribed {
            transcription: "flying".to_string(),
        },
    );

    // When: The job fails
    let snapshot = session
        .apply_result(
            generation,
            PipelineOutcome::Failed {
                reason: "timeout".to_string(),
            },
        )
        .unwrap();

    // Then: Ready with nothing left over
    assert_eq!(snapshot.status, SessionStatus::Ready);
    assert!(snapshot.transcription.is_empty());
    assert!(snapshot.video_prompt.is_empty());
    assert!(snapshot.video_url.is_none());
}

/// WHAT: A result from a superseded generation is ignored
/// WHY: A slow job must never overwrite a newer recording's state
#[test]
#[allow(clippy::unwrap_used)]
fn given_new_recording_when_old_result_arrives_then_discarded() {
    // Given: Generation 1 dispatched, then a new recording started
    let mut session = RecordingSession::new(LIMIT);
    session.start().unwrap();
    session.append(b"old".to_vec()).unwrap();
    let old = session.finalize().unwrap().generation();
    session.start().unwrap();
    session.append(b"new".to_vec()).unwrap();

    // When: Generation 1 reports progress and completion
    let progress = session.apply_progress(
        old,
        PipelineProgress::PromptReady {
            video_prompt: "stale".to_string(),
        },
    );
    let result = session.apply_result(old, completed("/media/video/old.mp4"));

    // Then: Both ignored, the new recording is untouched
    assert!(progress.is_none());
    assert!(result.is_none());
    let snapshot = session.snapshot();
    assert_eq!(snapshot.status, SessionStatus::Recording);
    assert!(snapshot.video_prompt.is_empty());
    assert!(snapshot.video_url.is_none());
    assert_eq!(session.buffered_fragments(), 1);
}

/// WHAT: Starting from complete clears the previous dream's results
/// WHY: Results are cleared only, and always, when a recording starts
#[test]
#[allow(clippy::unwrap_used)]
fn given_complete_session_when_starting_then_results_cleared() {
    // Given: A completed session
    let mut session = RecordingSession::new(LIMIT);
    session.start().unwrap();
    session.append(b"x".to_vec()).unwrap();
    let generation = session.finalize().unwrap().generation();
    let done = session
        .apply_result(generation, completed("/media/video/a.mp4"))
        .unwrap();
    assert_eq!(done.status, SessionStatus::Complete);
    assert_eq!(done.video_url.as_deref(), Some("/media/video/a.mp4"));

    // When: Starting again
    let snapshot = session.start().unwrap();

    // Then: Clean recording state
    assert_eq!(snapshot.status, SessionStatus::Recording);
    assert!(snapshot.transcription.is_empty());
    assert!(snapshot.video_prompt.is_empty());
    assert!(snapshot.video_url.is_none());
}

/// WHAT: A duplicate result for the current generation is ignored once complete
/// WHY: Only one outcome per generation may be applied
#[test]
#[allow(clippy::unwrap_used)]
fn given_complete_session_when_result_repeated_then_ignored() {
    // Given: A completed generation
    let mut session = RecordingSession::new(LIMIT);
    session.start().unwrap();
    session.append(b"x".to_vec()).unwrap();
    let generation = session.finalize().unwrap().generation();
    session.apply_result(generation, completed("/media/video/a.mp4"));

    // When: A failure for the same generation arrives
    let repeated = session.apply_result(
        generation,
        PipelineOutcome::Failed {
            reason: "late".to_string(),
        },
    );

    // Then: Ignored
    assert!(repeated.is_none());
    assert_eq!(session.status(), SessionStatus::Complete);
}
