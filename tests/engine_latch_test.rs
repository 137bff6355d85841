//! The latch is process-wide, so every case runs in order inside one test.

use body_ngin::{InitError, engine::EngineLatch};

#[test]
fn only_one_engine_slot_per_process() {
    // a held claim blocks the next one
    let first = EngineLatch::claim().unwrap();
    assert_eq!(
        EngineLatch::claim().unwrap_err(),
        InitError::AlreadyInitialized
    );

    // dropping without commit frees the slot, as after a failed setup
    drop(first);
    let retry = EngineLatch::claim().unwrap();
    drop(retry);

    // a committed claim keeps the slot
    EngineLatch::claim().unwrap().commit();
    assert_eq!(
        EngineLatch::claim().unwrap_err(),
        InitError::AlreadyInitialized
    );
    assert_eq!(
        EngineLatch::claim().unwrap_err(),
        InitError::AlreadyInitialized
    );
}
