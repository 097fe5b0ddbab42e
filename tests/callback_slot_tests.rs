// Host-side tests for the self-re-arming callback holder used by the frame loop.
// The main crate is wasm-only, so we include the pure-Rust module directly.

#![allow(dead_code)]
mod callback_slot {
    include!("../src/callback_slot.rs");
}

use callback_slot::CallbackSlot;
use std::rc::Rc;

type Tick = Box<dyn Fn() -> usize>;

#[test]
fn callback_holding_its_own_slot_is_freed_on_release() {
    let owned_state = Rc::new(());
    let slot: CallbackSlot<Tick> = CallbackSlot::default();

    let state = Rc::clone(&owned_state);
    let self_ref = slot.clone();
    slot.fill(Box::new(move || {
        let _keep = (&state, &self_ref);
        Rc::strong_count(&state)
    }));
    assert_eq!(Rc::strong_count(&owned_state), 2);
    assert_eq!(slot.with(|cb| cb()), Some(2));

    drop(slot.release());
    assert_eq!(Rc::strong_count(&owned_state), 1);
    assert!(slot.with(|_| ()).is_none());
}

#[test]
fn refilling_replaces_the_previous_callback() {
    let slot: CallbackSlot<Tick> = CallbackSlot::default();
    slot.fill(Box::new(|| 1));
    slot.fill(Box::new(|| 2));
    assert_eq!(slot.with(|cb| cb()), Some(2));
    assert_eq!(slot.release().map(|cb| cb()), Some(2));
    assert!(slot.release().is_none());
}
