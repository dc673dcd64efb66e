#![no_main]

use libfuzzer_sys::fuzz_target;
use slicer_control::{RequestLog, SliceControl};
use slicer_model::{is_valid_slice_expression, Shape};

const MAX_EVENTS: usize = 256;

/// Printable slice-ish fragments so text edits reach validation rather than bailing on brackets.
const FRAGMENTS: &[&str] = &["[", "]", ":", ",", " ", "0", "1", "2", "-1", "9", "x"];

fuzz_target!(|data: &[u8]| {
    let Some((&header, events)) = data.split_first() else {
        return;
    };
    let num_axes = usize::from(header % 5) + 1;
    let dims = (0..num_axes)
        .map(|axis| usize::from(header.rotate_left(axis as u32) % 7) + 1)
        .collect();
    let Ok(shape) = Shape::new(dims) else {
        return;
    };

    let mut control = SliceControl::new(shape.clone(), RequestLog::new());
    let mut text = String::new();

    for chunk in events.chunks(3).take(MAX_EVENTS) {
        let op = chunk[0];
        let a = usize::from(chunk.get(1).copied().unwrap_or(0));
        let b = usize::from(chunk.get(2).copied().unwrap_or(0));
        let slot = a % (control.slot_count() + 1);
        match op % 9 {
            0 => {
                control.toggle(a % 2 == 0);
            }
            1 => {
                text.push_str(FRAGMENTS[a % FRAGMENTS.len()]);
                control.on_text_edited(text.clone());
            }
            2 => {
                text.clear();
                control.on_text_edited(String::new());
            }
            3 => {
                control.on_text_submitted();
            }
            4 => {
                let _ = control.on_axis_selection_changed(slot, (b % 8 != 7).then_some(b % 8));
            }
            5 => {
                let _ = control.on_index_selection_changed(slot, (b % 8 != 7).then_some(b % 8));
            }
            6 => {
                let _ = control.apply_selection(slot, b % 8, a % 8);
            }
            7 => control.set_loading(a % 4 == 0),
            _ => control.sync_applied(None),
        }

        assert_eq!(control.selections().len(), control.slot_count());
        if control.is_enabled() {
            if let Some(applied) = control.applied() {
                assert!(is_valid_slice_expression(applied, &shape));
            }
        }
    }

    // Every request is "no slicing" or a slice that validated against the shape.
    for request in control.handler().requests() {
        if let Some(slice) = &request.slice {
            assert!(is_valid_slice_expression(slice, &shape), "requested `{slice}`");
        }
    }
});
