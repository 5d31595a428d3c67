use std::sync::{Arc, Mutex};

use chrono::DateTime;
use signing::signatures::{
    inputs::{PointerInput, Touch, TouchInput},
    replay,
    surface::decode_data_uri,
    Callback, CaptureOptions, Event, InputEvent, Outcome, Session, SessionAction, SharedView,
    SignaturePad, SignerForm, StrokePoint, SurfaceRect,
};
use signing::Error;

fn pad() -> SignaturePad {
    SignaturePad::mount(SurfaceRect::new(0.0, 0.0, 300.0, 150.0))
}

fn jane() -> SignerForm {
    SignerForm {
        signer_name: "Dr. Jane Moyo".to_string(),
        credentials: Some("MD, FRCP".to_string()),
        license_number: Some("ZW-44821".to_string()),
        terms_accepted: true,
    }
}

fn draw(pad: &mut SignaturePad, points: &[(f32, f32)]) {
    let (first, rest) = points.split_first().unwrap();
    pad.begin_stroke(StrokePoint::new(first.0, first.1));
    for &(x, y) in rest {
        pad.extend_stroke(StrokePoint::new(x, y));
    }
    pad.end_stroke();
}

fn pointer_stroke(points: &[(f32, f32)]) -> Vec<InputEvent> {
    let mut inputs = Vec::new();
    for (i, &(x, y)) in points.iter().enumerate() {
        let input = PointerInput::new(x, y);
        inputs.push(if i == 0 {
            InputEvent::PointerDown(input)
        } else {
            InputEvent::PointerMove(input)
        });
    }
    let &(x, y) = points.last().unwrap();
    inputs.push(InputEvent::PointerUp(PointerInput::new(x, y)));
    inputs
}

fn touch_stroke(id: i64, points: &[(f32, f32)]) -> Vec<InputEvent> {
    let mut inputs = Vec::new();
    for (i, &(x, y)) in points.iter().enumerate() {
        let input = TouchInput::new(vec![Touch::new(id, x, y)]);
        inputs.push(if i == 0 {
            InputEvent::TouchStart(input)
        } else {
            InputEvent::TouchMove(input)
        });
    }
    let &(x, y) = points.last().unwrap();
    inputs.push(InputEvent::TouchEnd(TouchInput::new(vec![Touch::new(id, x, y)])));
    inputs
}

fn session(inputs: Vec<InputEvent>) -> Session {
    Session {
        surface: SurfaceRect::new(40.0, 80.0, 300.0, 150.0),
        form: jane(),
        inputs,
        action: SessionAction::Sign,
    }
}

fn signed(session: &Session) -> String {
    match replay(session, CaptureOptions::default()).unwrap().outcome {
        Outcome::Signed(payload) => payload.signature,
        Outcome::Closed => panic!("expected a signature"),
    }
}

#[test]
fn signing_scenario_produces_payload() {
    let mut pad = pad();
    pad.set_form(jane());

    draw(&mut pad, &[(10.0, 10.0), (50.0, 40.0)]);
    assert!(pad.can_submit());

    let payload = pad.submit().unwrap();
    assert_eq!(payload.signer_name, "Dr. Jane Moyo");
    assert_eq!(payload.credentials.as_deref(), Some("MD, FRCP"));
    assert_eq!(payload.license_number.as_deref(), Some("ZW-44821"));
    assert!(!payload.signature.is_empty());

    let json = serde_json::to_value(&payload).unwrap();
    let timestamp = json["timestamp"].as_str().unwrap();
    assert!(DateTime::parse_from_rfc3339(timestamp).is_ok(), "{timestamp}");

    let png = decode_data_uri(&payload.signature).unwrap();
    let image = tiny_skia::Pixmap::decode_png(&png).unwrap();
    assert_eq!((image.width(), image.height()), (300, 150));
    assert!(image.pixel(30, 25).unwrap().alpha() > 0);
}

#[test]
fn submit_without_signer_name_fails() {
    let mut pad = pad();
    pad.set_form(SignerForm {
        signer_name: "   ".to_string(),
        ..jane()
    });
    draw(&mut pad, &[(10.0, 10.0), (50.0, 40.0)]);

    assert!(!pad.can_submit());
    assert!(matches!(pad.submit(), Err(Error::Validation { .. })));
}

#[test]
fn can_submit_requires_name_terms_and_ink() {
    for name in ["", " ", "Dr. Jane Moyo"] {
        for terms in [false, true] {
            for ink in [false, true] {
                let mut pad = pad();
                pad.set_signer_name(name);
                pad.set_terms_accepted(terms);
                if ink {
                    draw(&mut pad, &[(5.0, 5.0), (6.0, 9.0)]);
                }

                let expected = !name.trim().is_empty() && terms && ink;
                assert_eq!(pad.can_submit(), expected, "{name:?} {terms} {ink}");
            }
        }
    }
}

#[test]
fn ink_persists_until_clear() {
    let mut pad = pad();

    pad.begin_stroke(StrokePoint::new(1.0, 1.0));
    pad.extend_stroke(StrokePoint::new(2.0, 2.0));
    pad.end_stroke();
    assert!(pad.state().has_signature);

    pad.begin_stroke(StrokePoint::new(100.0, 100.0));
    pad.end_stroke();
    pad.end_stroke();
    pad.extend_stroke(StrokePoint::new(120.0, 120.0));
    assert!(pad.state().has_signature);

    pad.clear();
    assert!(!pad.state().has_signature);
}

#[test]
fn clear_is_idempotent() {
    let mut pad = pad();
    pad.set_form(jane());

    pad.clear();
    assert!(!pad.state().has_signature);

    draw(&mut pad, &[(10.0, 10.0), (50.0, 40.0)]);
    pad.begin_stroke(StrokePoint::new(60.0, 60.0));
    pad.clear();
    pad.clear();

    assert!(!pad.state().has_signature);
    assert!(!pad.state().is_drawing);
    assert!(pad.surface().unwrap().is_blank());
    assert!(!pad.can_submit());
}

#[test]
fn repeated_submits_differ_only_in_timestamp() {
    let mut pad = pad();
    pad.set_form(jane());
    draw(&mut pad, &[(10.0, 10.0), (50.0, 40.0), (80.0, 20.0)]);

    let first = pad.submit().unwrap();
    let second = pad.submit().unwrap();

    assert!(second.timestamp >= first.timestamp);
    assert_eq!(
        (first.signer_name, first.credentials, first.license_number, first.signature),
        (second.signer_name, second.credentials, second.license_number, second.signature)
    );
    assert!(pad.state().has_signature);
}

#[test]
fn touch_and_pointer_draw_the_same_signature() {
    let points = [(60.0, 100.0), (90.0, 130.0), (140.0, 95.0), (141.0, 95.0)];

    let by_pointer = signed(&session(pointer_stroke(&points)));
    let by_touch = signed(&session(touch_stroke(9, &points)));

    assert_eq!(by_pointer, by_touch);
}

#[test]
fn second_finger_does_not_disturb_active_stroke() {
    let points = [(60.0, 100.0), (90.0, 130.0), (140.0, 95.0)];
    let clean = touch_stroke(1, &points);

    let mut noisy = clean.clone();
    noisy.insert(
        1,
        InputEvent::TouchStart(TouchInput::new(vec![Touch::new(2, 300.0, 200.0)])),
    );
    noisy.insert(
        3,
        InputEvent::TouchMove(TouchInput::new(vec![Touch::new(2, 320.0, 210.0)])),
    );
    noisy.insert(
        4,
        InputEvent::TouchEnd(
            TouchInput::new(vec![Touch::new(2, 320.0, 210.0)])
                .with_touches(vec![Touch::new(1, 90.0, 130.0)]),
        ),
    );

    assert_eq!(signed(&session(clean)), signed(&session(noisy)));
}

#[test]
fn touch_events_request_gesture_suppression() {
    let mut pad = SignaturePad::mount(SurfaceRect::new(40.0, 80.0, 300.0, 150.0));

    let prevented: Vec<bool> = touch_stroke(3, &[(60.0, 100.0), (70.0, 110.0)])
        .iter()
        .map(|event| pad.handle_input(event))
        .collect();

    assert_eq!(prevented, vec![true, true, true]);
    assert!(pad.state().has_signature);
    assert_eq!(pad.stroke_count(), 1);
}

#[test]
fn touch_end_without_touch_list_frees_the_next_finger() {
    let mut pad = SignaturePad::mount(SurfaceRect::new(0.0, 0.0, 300.0, 150.0));

    pad.handle_input(&InputEvent::TouchStart(TouchInput::new(vec![Touch::new(1, 10.0, 10.0)])));
    pad.handle_input(&InputEvent::TouchMove(TouchInput::new(vec![Touch::new(1, 20.0, 20.0)])));
    pad.handle_input(&InputEvent::TouchEnd(TouchInput::default()));
    assert!(!pad.state().is_drawing);

    pad.handle_input(&InputEvent::TouchStart(TouchInput::new(vec![Touch::new(
        2, 100.0, 100.0,
    )])));
    pad.handle_input(&InputEvent::TouchMove(TouchInput::new(vec![Touch::new(
        2, 120.0, 110.0,
    )])));

    assert_eq!(pad.state().last_point, StrokePoint::new(120.0, 110.0));
    assert_eq!(pad.stroke_count(), 1);
}

#[test]
fn form_setters_flow_into_the_payload() {
    let mut pad = pad();
    pad.set_signer_name("Dr. Jane Moyo");
    pad.set_terms_accepted(true);
    pad.set_credentials(Some("RPh".to_string()));
    pad.set_license_number(Some("ZW-1007".to_string()));
    assert_eq!(pad.form().credentials.as_deref(), Some("RPh"));

    draw(&mut pad, &[(10.0, 10.0), (50.0, 40.0)]);
    let payload = pad.submit().unwrap();
    assert_eq!(payload.credentials.as_deref(), Some("RPh"));
    assert_eq!(payload.license_number.as_deref(), Some("ZW-1007"));

    pad.set_license_number(None);
    assert_eq!(pad.submit().unwrap().license_number, None);
}

#[test]
fn relocated_surface_keeps_local_coordinates() {
    let mut pad = SignaturePad::mount(SurfaceRect::new(0.0, 0.0, 300.0, 150.0));
    let view = SharedView::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    pad.subscribe(view.clone());
    pad.subscribe(Callback(move |envelope: &signing::signatures::EventEnvelope| {
        sink.lock().unwrap().push(envelope.payload.clone());
    }));

    pad.relocate(0.0, -500.0);
    pad.handle_input(&InputEvent::PointerDown(PointerInput::new(10.0, -490.0)));

    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[Event::StrokeBegun {
            point: StrokePoint::new(10.0, 10.0)
        }]
    );
    assert!(view.snapshot().is_drawing);
}

#[test]
fn observers_follow_readiness_and_signals() {
    let view = SharedView::new();
    let mut pad = pad().with_query(view.clone());

    pad.set_form(jane());
    assert!(!view.snapshot().can_submit);

    draw(&mut pad, &[(10.0, 10.0), (50.0, 40.0)]);
    let snapshot = view.snapshot();
    assert!(snapshot.can_submit);
    assert!(snapshot.has_signature);
    assert!(!snapshot.is_drawing);
    assert_eq!(snapshot.stroke_count, 1);
    assert_eq!(snapshot.segment_count, 1);
    assert_eq!(snapshot.id, pad.id());

    let payload = pad.submit().unwrap();
    assert_eq!(view.snapshot().signed, Some(payload));

    pad.set_terms_accepted(false);
    assert!(!view.snapshot().can_submit);

    pad.cancel();
    assert!(view.snapshot().closed);
}

#[test]
fn inert_pad_never_signs() {
    let view = SharedView::new();
    let mut pad =
        SignaturePad::mount(SurfaceRect::new(0.0, 0.0, 0.0, 150.0)).with_query(view.clone());
    pad.set_form(jane());

    assert!(pad.is_inert());
    assert!(matches!(
        pad.mount_error(),
        Some(Error::UnsupportedEnvironment { .. })
    ));

    draw(&mut pad, &[(10.0, 10.0), (50.0, 40.0)]);

    assert!(!pad.state().has_signature);
    assert!(!pad.can_submit());
    assert!(matches!(pad.submit(), Err(Error::Validation { .. })));
    assert_eq!(view.snapshot().segment_count, 0);
}

#[test]
fn replay_reports_signals() {
    let mut closing = session(pointer_stroke(&[(60.0, 100.0), (90.0, 130.0)]));
    closing.action = SessionAction::Close;

    let replayed = replay(&closing, CaptureOptions::default()).unwrap();
    assert_eq!(replayed.outcome, Outcome::Closed);
    assert_eq!(replayed.signals.len(), 1);
    assert_eq!(replayed.signals[0].event_type, "Signature:Closed");
    assert_eq!(replayed.signals[0].aggregate_id, replayed.capture_id);

    let signing = session(pointer_stroke(&[(60.0, 100.0), (90.0, 130.0)]));
    let replayed = replay(&signing, CaptureOptions::default()).unwrap();
    assert_eq!(replayed.signals.len(), 1);
    assert_eq!(replayed.signals[0].event_type, "Signature:Signed");

    let forwarded: Event = serde_json::from_str(&replayed.signals[0].payload).unwrap();
    match (forwarded, replayed.outcome) {
        (Event::Signed { payload }, Outcome::Signed(expected)) => assert_eq!(payload, expected),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn replay_on_oversized_surface_is_rejected() {
    let mut oversized = session(pointer_stroke(&[(60.0, 100.0), (90.0, 130.0)]));
    oversized.surface.width = 800.0;

    let err = replay(&oversized, CaptureOptions { max_surface_px: 512 }).unwrap_err();
    assert!(matches!(err, Error::UnsupportedEnvironment { .. }));

    oversized.action = SessionAction::Close;
    let replayed = replay(&oversized, CaptureOptions { max_surface_px: 512 }).unwrap();
    assert_eq!(replayed.outcome, Outcome::Closed);
}
