//! Missing-field collector: completes a candidate profile one field at a time,
//! always in the order name → email → phone.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::{ContactField, ExtractedFields, Profile};
use crate::errors::AppError;

static EMAIL_FORM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email form pattern"));

/// Trim and drop angle brackets from free-form user input.
pub fn sanitize_input(input: &str) -> String {
  input.trim().chars().filter(|c| *c != '<' && *c != '>').collect()
}

pub fn validate_email(email: &str) -> bool {
  EMAIL_FORM_RE.is_match(email)
}

/// Digits only, 10..=15 of them, no leading zero once punctuation is stripped.
pub fn validate_phone(phone: &str) -> bool {
  let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
  (10..=15).contains(&digits.len()) && !digits.starts_with('0')
}

/// A partially known profile waiting for the candidate to fill the gaps.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDraft {
  pub id: String,
  #[serde(default)] pub name: Option<String>,
  #[serde(default)] pub email: Option<String>,
  #[serde(default)] pub phone: Option<String>,
  #[serde(default)] pub resume_text: Option<String>,
}

impl ProfileDraft {
  pub fn new(id: String, fields: ExtractedFields, resume_text: Option<String>) -> Self {
    Self { id, name: fields.name, email: fields.email, phone: fields.phone, resume_text }
  }

  /// Next field to ask for, or `None` once all three are present.
  pub fn next_missing(&self) -> Option<ContactField> {
    ContactField::ORDER.into_iter().find(|f| self.slot(*f).is_none())
  }

  /// Fill the next missing field with `value`. Returns the field after it, if any.
  pub fn provide(&mut self, value: &str) -> Result<Option<ContactField>, AppError> {
    let field = self
      .next_missing()
      .ok_or_else(|| AppError::StateMismatch("profile is already complete".into()))?;

    let value = sanitize_input(value);
    if value.is_empty() {
      return Err(AppError::Validation(format!("{} must not be empty", field.label())));
    }
    let value = match field {
      ContactField::Name => crate::extractor::title_case(&value),
      ContactField::Email if !validate_email(&value) => {
        return Err(AppError::Validation(format!("'{value}' is not a valid email address")));
      }
      ContactField::Phone if !validate_phone(&value) => {
        return Err(AppError::Validation(format!("'{value}' is not a valid phone number")));
      }
      ContactField::Phone => value.chars().filter(|c| c.is_ascii_digit()).collect(),
      ContactField::Email => value,
    };

    *self.slot_mut(field) = Some(value);
    Ok(self.next_missing())
  }

  /// The completed profile, or the draft itself while a field is still missing.
  pub fn into_profile(self) -> Result<Profile, Self> {
    if self.next_missing().is_some() {
      return Err(self);
    }
    Ok(Profile {
      name: self.name.unwrap_or_default(),
      email: self.email.unwrap_or_default(),
      phone: self.phone.unwrap_or_default(),
      resume_text: self.resume_text,
    })
  }

  fn slot(&self, field: ContactField) -> Option<&str> {
    let v = match field {
      ContactField::Name => &self.name,
      ContactField::Email => &self.email,
      ContactField::Phone => &self.phone,
    };
    v.as_deref().filter(|s| !s.trim().is_empty())
  }

  fn slot_mut(&mut self, field: ContactField) -> &mut Option<String> {
    match field {
      ContactField::Name => &mut self.name,
      ContactField::Email => &mut self.email,
      ContactField::Phone => &mut self.phone,
    }
  }
}

/// Validate a profile entered by hand in one go.
pub fn validate_profile(profile: Profile) -> Result<Profile, AppError> {
  let name = sanitize_input(&profile.name);
  let email = sanitize_input(&profile.email);
  let phone = sanitize_input(&profile.phone);

  for (field, value) in [(ContactField::Name, &name), (ContactField::Email, &email), (ContactField::Phone, &phone)] {
    if value.is_empty() {
      return Err(AppError::Validation(format!("{} is required", field.label())));
    }
  }
  if !validate_email(&email) {
    return Err(AppError::Validation(format!("'{email}' is not a valid email address")));
  }
  if !validate_phone(&phone) {
    return Err(AppError::Validation(format!("'{phone}' is not a valid phone number")));
  }

  Ok(Profile {
    name: crate::extractor::title_case(&name),
    email,
    phone: phone.chars().filter(|c| c.is_ascii_digit()).collect(),
    resume_text: profile.resume_text,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn draft(name: Option<&str>, email: Option<&str>, phone: Option<&str>) -> ProfileDraft {
    ProfileDraft::new(
      "d1".into(),
      ExtractedFields {
        name: name.map(String::from),
        email: email.map(String::from),
        phone: phone.map(String::from),
      },
      Some("resume".into()),
    )
  }

  #[test]
  fn asks_in_fixed_order() {
    let mut d = draft(None, None, None);
    assert_eq!(d.next_missing(), Some(ContactField::Name));
    assert_eq!(d.provide("  grace hopper ").unwrap(), Some(ContactField::Email));
    assert_eq!(d.provide("grace@navy.mil").unwrap(), Some(ContactField::Phone));
    assert_eq!(d.provide("+1 (202) 555-0147").unwrap(), None);

    let p = d.into_profile().unwrap();
    assert_eq!(p.name, "Grace Hopper");
    assert_eq!(p.phone, "12025550147");
    assert_eq!(p.resume_text.as_deref(), Some("resume"));
  }

  #[test]
  fn skips_fields_already_extracted() {
    let d = draft(Some("Ada Lovelace"), None, Some("5551234567"));
    assert_eq!(d.next_missing(), Some(ContactField::Email));
  }

  #[test]
  fn rejects_invalid_values_without_advancing() {
    let mut d = draft(Some("Ada Lovelace"), None, None);
    assert!(matches!(d.provide("   "), Err(AppError::Validation(_))));
    assert!(matches!(d.provide("not-an-email"), Err(AppError::Validation(_))));
    assert_eq!(d.next_missing(), Some(ContactField::Email));
    d.provide("ada@engine.org").unwrap();
    assert!(matches!(d.provide("12-34"), Err(AppError::Validation(_))));
    assert_eq!(d.next_missing(), Some(ContactField::Phone));
  }

  #[test]
  fn incomplete_draft_is_not_a_profile() {
    let d = draft(Some("Ada Lovelace"), Some("ada@engine.org"), None);
    let back = d.clone().into_profile().unwrap_err();
    assert_eq!(back, d);
  }

  #[test]
  fn sanitize_strips_markup() {
    assert_eq!(sanitize_input("  <b>Ada</b> "), "bAda/b");
  }

  #[test]
  fn manual_profile_is_normalized() {
    let p = validate_profile(Profile {
      name: "linus torvalds".into(),
      email: "linus@kernel.org".into(),
      phone: "(555) 123-4567".into(),
      resume_text: None,
    })
    .unwrap();
    assert_eq!(p.name, "Linus Torvalds");
    assert_eq!(p.phone, "5551234567");

    let missing = validate_profile(Profile {
      name: "".into(),
      email: "x@y.z".into(),
      phone: "5551234567".into(),
      resume_text: None,
    });
    assert!(matches!(missing, Err(AppError::Validation(_))));
  }
}
