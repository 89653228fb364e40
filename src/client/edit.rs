//! Edit-form controllers: an explicit state machine for the fetch / edit /
//! submit flow of a detail page. Client-side validation runs against the same
//! schema the server enforces, so a clean submit is expected to land.

use super::{ApiClient, ClientError};
use crate::error::FieldError;
use crate::model::{Booking, BookingInput, Car, CarInput};
use crate::schema::Schema;
use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// An entity whose detail page supports fetch-then-update editing.
#[async_trait]
pub trait Editable: Sized + Send + Sync {
    type Input: Clone + Send + Sync + serde::Serialize;

    /// Where to navigate after a successful submit.
    fn list_path() -> &'static str;

    fn schema() -> &'static Schema;

    /// Seed the form from a fetched record.
    fn form_from(&self) -> Self::Input;

    async fn fetch(client: &ApiClient, id: Uuid) -> Result<Self, ClientError>;

    async fn submit(client: &ApiClient, id: Uuid, input: &Self::Input)
        -> Result<Self, ClientError>;
}

pub enum EditState<E: Editable> {
    /// Record fetch in flight.
    Loading,
    /// Form is editable. Holds validation errors from the last rejected
    /// submit and the message of the last failed one.
    Ready {
        form: E::Input,
        field_errors: Vec<FieldError>,
        error: Option<String>,
    },
    Submitting,
    /// Submit succeeded; caller should navigate to `redirect`.
    Done { record: E, redirect: &'static str },
    /// The initial fetch failed. `load` may be retried from here.
    Failed { message: String },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EditError {
    #[error("{0} is not valid in the current state")]
    InvalidTransition(&'static str),
}

/// Drives one record's edit flow. State only moves through the transitions
/// below; anything else is an `InvalidTransition`.
pub struct EditController<E: Editable> {
    id: Uuid,
    state: EditState<E>,
}

impl<E: Editable> EditController<E> {
    pub fn new(id: Uuid) -> Self {
        EditController {
            id,
            state: EditState::Loading,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &EditState<E> {
        &self.state
    }

    /// Mutable access to the form while editable.
    pub fn form_mut(&mut self) -> Option<&mut E::Input> {
        match &mut self.state {
            EditState::Ready { form, .. } => Some(form),
            _ => None,
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match &self.state {
            EditState::Ready { field_errors, .. } => field_errors,
            _ => &[],
        }
    }

    /// Fetch the record and seed the form. Valid from `Loading` and, as a
    /// retry, from `Failed`.
    pub async fn load(&mut self, client: &ApiClient) -> Result<(), EditError> {
        match self.state {
            EditState::Loading | EditState::Failed { .. } => {}
            _ => return Err(EditError::InvalidTransition("load")),
        }
        self.state = match E::fetch(client, self.id).await {
            Ok(record) => EditState::Ready {
                form: record.form_from(),
                field_errors: Vec::new(),
                error: None,
            },
            Err(err) => EditState::Failed {
                message: err.message(),
            },
        };
        Ok(())
    }

    /// Validate and submit the form. On a validation reject (local or from
    /// the server) the form stays editable with the field errors attached;
    /// other failures keep the form and record the error message.
    pub async fn submit(&mut self, client: &ApiClient) -> Result<(), EditError> {
        if !matches!(self.state, EditState::Ready { .. }) {
            return Err(EditError::InvalidTransition("submit"));
        }
        let EditState::Ready { form, .. } =
            std::mem::replace(&mut self.state, EditState::Submitting)
        else {
            unreachable!()
        };

        if let Err(field_errors) = E::schema().validate(&to_body(&form)) {
            self.state = EditState::Ready {
                form,
                field_errors,
                error: None,
            };
            return Ok(());
        }

        self.state = match E::submit(client, self.id, &form).await {
            Ok(record) => EditState::Done {
                record,
                redirect: E::list_path(),
            },
            Err(err) => EditState::Ready {
                field_errors: err.field_errors(),
                error: Some(err.message()),
                form,
            },
        };
        Ok(())
    }
}

fn to_body<T: serde::Serialize>(input: &T) -> Map<String, Value> {
    match serde_json::to_value(input) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

#[async_trait]
impl Editable for Car {
    type Input = CarInput;

    fn list_path() -> &'static str {
        "/cars"
    }

    fn schema() -> &'static Schema {
        crate::model::car::schema()
    }

    fn form_from(&self) -> CarInput {
        CarInput {
            model: self.model.clone(),
            location: self.location.clone(),
            company_id: self.company_id,
        }
    }

    async fn fetch(client: &ApiClient, id: Uuid) -> Result<Self, ClientError> {
        client.get_car_by_id(id, &Default::default()).await
    }

    async fn submit(client: &ApiClient, id: Uuid, input: &CarInput) -> Result<Self, ClientError> {
        client.update_car_by_id(id, input).await
    }
}

#[async_trait]
impl Editable for Booking {
    type Input = BookingInput;

    fn list_path() -> &'static str {
        "/bookings"
    }

    fn schema() -> &'static Schema {
        crate::model::booking::schema()
    }

    fn form_from(&self) -> BookingInput {
        BookingInput {
            start_time: self.start_time,
            end_time: self.end_time,
            user_id: self.user_id,
            car_id: self.car_id,
        }
    }

    async fn fetch(client: &ApiClient, id: Uuid) -> Result<Self, ClientError> {
        client.get_booking_by_id(id, &Default::default()).await
    }

    async fn submit(
        client: &ApiClient,
        id: Uuid,
        input: &BookingInput,
    ) -> Result<Self, ClientError> {
        client.update_booking_by_id(id, input).await
    }
}
