//! Browser-side checks, run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn local_storage_round_trips_a_score_table() {
    let storage = web_sys::window()
        .unwrap()
        .local_storage()
        .unwrap()
        .unwrap();

    storage
        .set_item("scores-test", r#"[{"name":"Alice","emoji":"🦈","score":5}]"#)
        .unwrap();
    let stored = storage.get_item("scores-test").unwrap();
    assert_eq!(
        stored.as_deref(),
        Some(r#"[{"name":"Alice","emoji":"🦈","score":5}]"#)
    );

    storage.remove_item("scores-test").unwrap();
    assert_eq!(storage.get_item("scores-test").unwrap(), None);
}

#[wasm_bindgen_test]
fn performance_clock_never_runs_backwards() {
    let performance = web_sys::window().unwrap().performance().unwrap();

    let first = performance.now();
    let second = performance.now();
    assert!(second >= first);
}
