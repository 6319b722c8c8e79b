use googletest::prelude::*;

use super::*;

#[googletest::test]
fn aged_out_is_zero_until_the_window_is_full() {
    let mut manager = FrameCountWindowManager::new();
    let handle = manager.register_window(3, 0.0);
    for _ in 0..3 {
        manager.on_frame_arrival(0);
        expect_that!(manager.aged_out(handle), eq(0));
    }
}

#[googletest::test]
fn aged_out_is_one_once_full() {
    let mut manager = FrameCountWindowManager::new();
    let handle = manager.register_window(3, 0.0);
    for _ in 0..5 {
        manager.on_frame_arrival(0);
    }
    expect_that!(manager.aged_out(handle), eq(1));
    expect_that!(manager.size(handle), eq(3));
}

#[googletest::test]
fn size_saturates_at_capacity() {
    let mut manager = FrameCountWindowManager::new();
    let handle = manager.register_window(2, 0.0);
    manager.on_frame_arrival(0);
    expect_that!(manager.size(handle), eq(1));
    manager.on_frame_arrival(0);
    expect_that!(manager.size(handle), eq(2));
    manager.on_frame_arrival(0);
    expect_that!(manager.size(handle), eq(2));
}

#[googletest::test]
fn reset_without_keep_last_empties_the_window() {
    let mut manager = FrameCountWindowManager::new();
    let handle = manager.register_window(3, 0.0);
    manager.on_frame_arrival(0);
    manager.on_frame_arrival(0);
    manager.reset(handle, false);
    expect_that!(manager.size(handle), eq(0));
}

#[googletest::test]
fn reset_with_keep_last_retains_one_entry() {
    let mut manager = FrameCountWindowManager::new();
    let handle = manager.register_window(3, 0.0);
    manager.on_frame_arrival(0);
    manager.on_frame_arrival(0);
    manager.reset(handle, true);
    expect_that!(manager.size(handle), eq(1));
}

#[googletest::test]
fn independent_windows_track_separately() {
    let mut manager = FrameCountWindowManager::new();
    let small = manager.register_window(1, 0.0);
    let large = manager.register_window(10, 0.0);
    manager.on_frame_arrival(0);
    manager.on_frame_arrival(0);
    expect_that!(manager.aged_out(small), eq(1));
    expect_that!(manager.aged_out(large), eq(0));
    expect_that!(manager.size(large), eq(2));
}
