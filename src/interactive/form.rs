//! Add-location form state

use crossterm::event::{KeyCode, KeyEvent};
use tui_input::{Input, InputRequest};

use crate::location::LatLng;

/// Form field types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Place,
    Rate,
}

impl FormField {
    pub const ALL: [FormField; 3] = [FormField::Name, FormField::Place, FormField::Rate];

    pub fn next(&self) -> FormField {
        match self {
            FormField::Name => FormField::Place,
            FormField::Place => FormField::Rate,
            FormField::Rate => FormField::Name,
        }
    }

    pub fn previous(&self) -> FormField {
        match self {
            FormField::Name => FormField::Rate,
            FormField::Place => FormField::Name,
            FormField::Rate => FormField::Place,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Place => "Address / LAT,LNG",
            FormField::Rate => "Rate",
        }
    }
}

/// Where the new location is: explicit coordinates or an address to look up
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceInput {
    Coordinates(LatLng),
    Address(String),
}

/// A form that passed local checks; the rate range is checked on dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct FormSubmission {
    pub name: String,
    pub place: PlaceInput,
    pub rate: i64,
}

#[derive(Debug, Clone)]
pub struct LocationForm {
    pub name: Input,
    pub place: Input,
    pub rate: Input,
    pub current_field: FormField,
}

impl LocationForm {
    pub fn new() -> Self {
        Self {
            name: Input::default(),
            place: Input::default(),
            rate: Input::new("3".to_string()),
            current_field: FormField::Name,
        }
    }

    pub fn input(&self, field: FormField) -> &Input {
        match field {
            FormField::Name => &self.name,
            FormField::Place => &self.place,
            FormField::Rate => &self.rate,
        }
    }

    fn current_input_mut(&mut self) -> &mut Input {
        match self.current_field {
            FormField::Name => &mut self.name,
            FormField::Place => &mut self.place,
            FormField::Rate => &mut self.rate,
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = self.current_field.next();
    }

    pub fn previous_field(&mut self) {
        self.current_field = self.current_field.previous();
    }

    /// Apply an editing key to the focused field; returns false if the key
    /// is not an editing key
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match input_request(&key) {
            Some(request) => {
                self.current_input_mut().handle(request);
                true
            }
            None => false,
        }
    }

    pub fn validate(&self) -> Result<FormSubmission, String> {
        let place = self.place.value().trim();
        if place.is_empty() {
            return Err("An address or LAT,LNG is required".to_string());
        }
        let place = match place.parse::<LatLng>() {
            Ok(pos) => PlaceInput::Coordinates(pos),
            // Something that looks like coordinates but is out of range is an error,
            // not an address
            Err(e) if looks_like_coordinates(place) => return Err(e.to_string()),
            Err(_) => PlaceInput::Address(place.to_string()),
        };

        let rate = self
            .rate
            .value()
            .trim()
            .parse::<i64>()
            .map_err(|_| "Rate must be a whole number from 1 to 5".to_string())?;

        Ok(FormSubmission {
            name: self.name.value().to_string(),
            place,
            rate,
        })
    }
}

impl Default for LocationForm {
    fn default() -> Self {
        Self::new()
    }
}

/// Line-editing request for a key, shared by every text input of the UI
pub fn input_request(key: &KeyEvent) -> Option<InputRequest> {
    let request = match key.code {
        KeyCode::Char(c) => InputRequest::InsertChar(c),
        KeyCode::Backspace => InputRequest::DeletePrevChar,
        KeyCode::Delete => InputRequest::DeleteNextChar,
        KeyCode::Left => InputRequest::GoToPrevChar,
        KeyCode::Right => InputRequest::GoToNextChar,
        KeyCode::Home => InputRequest::GoToStart,
        KeyCode::End => InputRequest::GoToEnd,
        _ => return None,
    };
    Some(request)
}

fn looks_like_coordinates(s: &str) -> bool {
    s.split_once(',').map_or(false, |(lat, lng)| {
        lat.trim().parse::<f64>().is_ok() && lng.trim().parse::<f64>().is_ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn type_str(form: &mut LocationForm, s: &str) {
        for c in s.chars() {
            form.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    #[test]
    fn test_coordinates_submission() {
        let mut form = LocationForm::new();
        type_str(&mut form, "Beach");
        form.next_field();
        type_str(&mut form, "32.08, 34.76");

        let submission = form.validate().unwrap();
        assert_eq!(submission.name, "Beach");
        assert_eq!(submission.place, PlaceInput::Coordinates(LatLng::new(32.08, 34.76)));
        assert_eq!(submission.rate, 3);
    }

    #[test]
    fn test_address_submission_and_editing() {
        let mut form = LocationForm::new();
        form.previous_field();
        assert_eq!(form.current_field, FormField::Rate);
        form.handle_key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
        type_str(&mut form, "5");
        form.previous_field();
        type_str(&mut form, "Dizengoff Square");

        let submission = form.validate().unwrap();
        assert_eq!(submission.place, PlaceInput::Address("Dizengoff Square".to_string()));
        assert_eq!(submission.rate, 5);
        assert_eq!(submission.name, "");
    }

    #[test]
    fn test_validation_errors() {
        let form = LocationForm::new();
        assert!(form.validate().is_err());

        let mut form = LocationForm::new();
        form.next_field();
        type_str(&mut form, "95,10");
        assert!(form.validate().unwrap_err().contains("Invalid coordinates"));

        let mut form = LocationForm::new();
        form.next_field();
        type_str(&mut form, "1,1");
        form.next_field();
        type_str(&mut form, "x");
        assert!(form.validate().unwrap_err().contains("Rate"));
    }

    #[test]
    fn test_non_editing_keys_ignored() {
        let mut form = LocationForm::new();
        assert!(!form.handle_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)));
        assert!(form.handle_key(KeyEvent::new(KeyCode::Home, KeyModifiers::NONE)));
    }
}
