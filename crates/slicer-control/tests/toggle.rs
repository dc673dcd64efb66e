use pretty_assertions::assert_eq;
use slicer_control::{IgnoreReason, Outcome, RequestLog, SliceControl, SliceRequest};
use slicer_model::{AxisSelection, Shape};

fn control(dims: &[usize]) -> SliceControl<RequestLog> {
    SliceControl::new(Shape::new(dims.to_vec()).unwrap(), RequestLog::new())
}

#[test]
fn enabling_on_full_slice_is_silent() {
    let mut c = control(&[5, 6]);
    assert_eq!(c.current_text(), "[:, :]");

    assert_eq!(c.toggle(true), Outcome::Silent);
    assert!(c.is_enabled());
    assert_eq!(c.selections(), &[AxisSelection::UNSET]);

    assert_eq!(c.toggle(false), Outcome::Silent);
    assert!(c.handler().is_empty());
}

#[test]
fn enabling_requests_preselection_and_disabling_clears_it() {
    let mut c = control(&[3, 4, 5, 6]);

    assert_eq!(
        c.toggle(true),
        Outcome::Requested(SliceRequest::slice("[0, 0, :, :]"))
    );
    assert_eq!(c.applied(), Some("[0, 0, :, :]"));
    assert_eq!(
        c.selections(),
        &[AxisSelection::new(0, 0), AxisSelection::new(1, 0)]
    );

    assert_eq!(c.toggle(false), Outcome::Requested(SliceRequest::clear()));
    assert_eq!(c.applied(), None);
    assert!(!c.is_enabled());

    // The host no longer slices, so re-enabling asks again.
    assert_eq!(
        c.toggle(true),
        Outcome::Requested(SliceRequest::slice("[0, 0, :, :]"))
    );
    assert_eq!(
        c.handler().requests(),
        &[
            SliceRequest::slice("[0, 0, :, :]"),
            SliceRequest::clear(),
            SliceRequest::slice("[0, 0, :, :]"),
        ]
    );
}

#[test]
fn enabling_skips_request_when_host_already_has_the_text() {
    let mut c = control(&[3, 4, 5, 6]);
    c.sync_applied(Some("[0, 0, :, :]".to_string()));

    assert_eq!(c.toggle(true), Outcome::Silent);
    assert!(c.handler().is_empty());
    // Slots are still derived from the text.
    assert_eq!(
        c.selections(),
        &[AxisSelection::new(0, 0), AxisSelection::new(1, 0)]
    );
}

#[test]
fn disabling_with_full_text_is_silent_even_if_a_slice_was_applied() {
    let mut c = control(&[2, 3, 4]);
    c.toggle(true);
    c.on_text_edited("[:, :, :]");

    assert_eq!(c.toggle(false), Outcome::Silent);
    assert_eq!(c.handler().len(), 1);
}

#[test]
fn toggle_rederives_slots_from_unrepresentable_text() {
    let mut c = control(&[2, 3, 4]);
    c.toggle(true);
    assert_eq!(c.selections(), &[AxisSelection::new(0, 0)]);

    c.on_text_edited("[0:, :, 1]");
    c.toggle(false);
    assert_eq!(c.selections(), &[AxisSelection::UNSET]);
}

#[test]
fn toggle_is_ignored_while_loading() {
    let mut c = control(&[3, 4, 5, 6]);
    c.set_loading(true);

    assert_eq!(
        c.toggle(true),
        Outcome::Ignored {
            reason: IgnoreReason::Loading
        }
    );
    assert!(!c.is_enabled());
    assert!(c.handler().is_empty());

    c.set_loading(false);
    assert!(c.toggle(true).request().is_some());
}

#[test]
fn enabling_with_invalid_text_is_silent() {
    let mut c = control(&[5, 6]);
    c.toggle(true);
    c.on_text_edited("[9, :]");

    assert_eq!(c.toggle(false), Outcome::Requested(SliceRequest::clear()));
    assert_eq!(c.toggle(true), Outcome::Silent);
    assert_eq!(c.current_text(), "[9, :]");
    assert_eq!(c.handler().requests(), &[SliceRequest::clear()]);
}

#[test]
fn disabling_a_session_that_was_never_enabled_is_silent() {
    let mut c = control(&[3, 4, 5, 6]);

    assert_eq!(c.toggle(false), Outcome::Silent);
    assert!(!c.is_enabled());
    assert!(c.handler().is_empty());
    assert_eq!(c.selections(), &[AxisSelection::UNSET; 2]);
}

#[test]
fn enabling_twice_keeps_unsubmitted_text_and_slots() {
    let mut c = control(&[3, 4, 5, 6]);
    c.toggle(true);
    c.on_text_edited("[0:, :, 1, :]");

    assert_eq!(c.toggle(true), Outcome::Silent);
    assert_eq!(c.current_text(), "[0:, :, 1, :]");
    assert_eq!(c.applied(), Some("[0, 0, :, :]"));
    assert_eq!(
        c.selections(),
        &[AxisSelection::new(0, 0), AxisSelection::new(1, 0)]
    );
    assert_eq!(c.handler().len(), 1);
}

#[test]
fn closures_receive_requests() {
    let mut seen = Vec::new();
    {
        let shape = Shape::new(vec![4, 4, 4]).unwrap();
        let mut c = SliceControl::new(shape, |request: SliceRequest| seen.push(request));
        c.toggle(true);
        c.toggle(false);
    }
    assert_eq!(
        seen,
        vec![SliceRequest::slice("[0, :, :]"), SliceRequest::clear()]
    );
}
