//! Edit-controller flow against a live server: load, edit, submit, and the
//! validation and redirect behavior in between.

mod common;

use carbook::client::{EditController, EditState};
use carbook::model::{Booking, BookingInput, Car, CarInput};
use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

#[tokio::test]
async fn load_edit_submit_redirects_to_list() {
    let server = common::spawn().await;
    let client = server.admin();
    let car = client
        .create_car(&CarInput {
            model: "Model 3".into(),
            location: "Berlin".into(),
            company_id: None,
        })
        .await
        .unwrap();

    let mut controller = EditController::<Car>::new(car.id);
    controller.load(&client).await.unwrap();

    let form = controller.form_mut().expect("form ready after load");
    assert_eq!(form.model, "Model 3");
    form.location = "Munich".into();

    controller.submit(&client).await.unwrap();
    match controller.state() {
        EditState::Done { record, redirect } => {
            assert_eq!(record.location, "Munich");
            assert_eq!(*redirect, "/cars");
        }
        _ => panic!("expected Done after successful submit"),
    }

    let persisted = client
        .get_car_by_id(car.id, &Default::default())
        .await
        .unwrap();
    assert_eq!(persisted.location, "Munich");
}

#[tokio::test]
async fn local_validation_keeps_form_editable_with_field_errors() {
    let server = common::spawn().await;
    let client = server.admin();
    let car = client
        .create_car(&CarInput {
            model: "i3".into(),
            location: "Hamburg".into(),
            company_id: None,
        })
        .await
        .unwrap();

    let mut controller = EditController::<Car>::new(car.id);
    controller.load(&client).await.unwrap();
    controller.form_mut().unwrap().model = "   ".into();

    // Rejected locally; the server never sees the submit.
    controller.submit(&client).await.unwrap();
    assert!(matches!(controller.state(), EditState::Ready { .. }));
    let errors = controller.field_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "model");

    // The record is untouched and the form can be fixed and resubmitted.
    let persisted = client
        .get_car_by_id(car.id, &Default::default())
        .await
        .unwrap();
    assert_eq!(persisted.model, "i3");

    controller.form_mut().unwrap().model = "i4".into();
    controller.submit(&client).await.unwrap();
    assert!(matches!(controller.state(), EditState::Done { .. }));
}

#[tokio::test]
async fn server_reject_surfaces_error_and_keeps_form() {
    let server = common::spawn().await;
    let client = server.admin();
    let start = Utc.with_ymd_and_hms(2030, 1, 1, 10, 0, 0).unwrap();
    let booking = client
        .create_booking(&BookingInput {
            start_time: start,
            end_time: start + Duration::hours(2),
            user_id: None,
            car_id: None,
        })
        .await
        .unwrap();

    let mut controller = EditController::<Booking>::new(booking.id);
    controller.load(&client).await.unwrap();
    // Point the booking at a car that does not exist; local validation
    // passes, the store rejects with a conflict.
    controller.form_mut().unwrap().car_id = Some(Uuid::new_v4());

    controller.submit(&client).await.unwrap();
    match controller.state() {
        EditState::Ready { error, form, .. } => {
            assert!(error.is_some());
            assert!(form.car_id.is_some());
        }
        _ => panic!("expected Ready with error after server reject"),
    }
}

#[tokio::test]
async fn loading_a_missing_record_fails() {
    let server = common::spawn().await;
    let client = server.admin();
    let mut controller = EditController::<Car>::new(Uuid::new_v4());
    controller.load(&client).await.unwrap();
    match controller.state() {
        EditState::Failed { message } => assert!(message.contains("not found")),
        _ => panic!("expected Failed for a missing record"),
    }
    assert!(controller.form_mut().is_none());
}
