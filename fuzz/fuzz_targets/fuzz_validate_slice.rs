#![no_main]

use libfuzzer_sys::fuzz_target;
use slicer_model::{
    is_valid_slice_expression, selections_from_text, slot_count, text_from_selections,
    validate_slice_expression, Shape, SliceExpression,
};

/// Slice text longer than this is never typed by hand; keep the harness bounded.
const MAX_EXPRESSION_CHARS: usize = 1_024;
const MAX_INPUT_BYTES: usize = MAX_EXPRESSION_CHARS * 4; // max UTF-8 bytes per char
const MAX_AXES: usize = 6;

fn truncate_to_chars(s: &str, max_chars: usize) -> &str {
    let mut count = 0usize;
    for (idx, _) in s.char_indices() {
        if count == max_chars {
            return &s[..idx];
        }
        count += 1;
    }
    s
}

fuzz_target!(|data: &[u8]| {
    let Some((&header, rest)) = data.split_first() else {
        return;
    };

    // Low bits pick the rank; each following byte is one extent.
    let num_axes = usize::from(header) % MAX_AXES + 1;
    if rest.len() < num_axes {
        return;
    }
    let (extents, text) = rest.split_at(num_axes);
    let dims = extents.iter().map(|&b| usize::from(b % 16) + 1).collect();
    let Ok(shape) = Shape::new(dims) else {
        return;
    };

    let text = if text.len() > MAX_INPUT_BYTES {
        &text[..MAX_INPUT_BYTES]
    } else {
        text
    };
    let input = String::from_utf8_lossy(text);
    let expression = truncate_to_chars(&input, MAX_EXPRESSION_CHARS);

    let result = validate_slice_expression(expression, &shape);
    assert_eq!(result.is_ok(), is_valid_slice_expression(expression, &shape));

    if let Ok(expr) = &result {
        // Canonical text of a valid expression stays valid and resolves identically.
        let resolved = expr.resolve(&shape).expect("validated expression resolves");
        let canonical = expr.to_string();
        let reparsed = SliceExpression::parse(&canonical).expect("canonical text parses");
        assert_eq!(reparsed.resolve(&shape), Ok(resolved));
    }

    if let Some(selections) = selections_from_text(expression, &shape) {
        assert_eq!(selections.len(), slot_count(&shape));
        let derived = text_from_selections(&shape, &selections);
        if derived.is_complete() {
            assert!(is_valid_slice_expression(&derived.text, &shape));
        }
    }
});
