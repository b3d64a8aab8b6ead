//! Resume field extraction: name, email and phone from raw document text.
//!
//! Pure and deterministic. Email and phone are single pattern scans; the name is
//! found by an ordered list of matchers where the first hit wins:
//!   1. an explicit `Name:` / `Full Name:` label
//!   2. an ALL-CAPS banner line in the header region
//!   3. the first header line made of 2-4 mostly capitalized words
//!
//! The header region is the first 20 non-empty lines.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::ExtractedFields;

const HEADER_LINES: usize = 20;
const MAX_NAME_LINE_CHARS: usize = 60;
const PHONE_MIN_DIGITS: usize = 10;
const PHONE_MAX_DIGITS: usize = 15;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("email pattern")
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(\+?[0-9]{1,3}[-.\s]?)?\(?[0-9]{2,4}\)?[-.\s]?[0-9]{3,4}[-.\s]?[0-9]{3,4}").expect("phone pattern")
});

// Looser shape, only used to skip contact lines when hunting for a name.
static PHONE_LINE_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"\+?[0-9][0-9\s().\-]{7,}").expect("phone line pattern")
});

static LABELED_NAME_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(
    r"(?im)^[ \t]*(?:full[ \t]+name|name)(?:[ \t]*:[ \t]*|[ \t]+)([a-z][a-z'’.\-]*(?:[ \t]+[a-z][a-z'’.\-]*){1,3})",
  )
  .expect("labeled name pattern")
});

static BANNER_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^[A-Z][A-Z\s.'’\-]{2,}$").expect("banner pattern")
});

static CAPITALIZED_WORD_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^[A-Z][a-zA-Z'’.\-]*$").expect("capitalized word pattern")
});

type NameMatcher = fn(&str, &[&str]) -> Option<String>;

const NAME_MATCHERS: [NameMatcher; 3] = [labeled_name, banner_name, capitalized_name];

/// Extract contact fields from resume text. Never fails; absent fields are `None`.
pub fn extract_fields(text: &str) -> ExtractedFields {
  let header: Vec<&str> = text
    .lines()
    .map(str::trim)
    .filter(|l| !l.is_empty())
    .take(HEADER_LINES)
    .collect();

  ExtractedFields {
    name: NAME_MATCHERS.iter().find_map(|m| m(text, &header)),
    email: EMAIL_RE.find(text).map(|m| m.as_str().to_string()),
    phone: PHONE_RE.find(text).and_then(|m| normalize_phone(m.as_str())),
  }
}

/// Keep digits only; accept 10..=15 of them.
pub fn normalize_phone(raw: &str) -> Option<String> {
  let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
  if (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits.len()) {
    Some(digits)
  } else {
    None
  }
}

/// Overlay fields returned by a model on top of the heuristic result.
/// A model phone must pass the same digit-count rule as the heuristic one.
pub fn merge_model_fields(heuristic: ExtractedFields, model: ExtractedFields) -> ExtractedFields {
  let non_empty = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
  ExtractedFields {
    name: non_empty(model.name).map(|n| title_case(&n)).or(heuristic.name),
    email: non_empty(model.email).filter(|e| EMAIL_RE.is_match(e)).or(heuristic.email),
    phone: non_empty(model.phone).and_then(|p| normalize_phone(&p)).or(heuristic.phone),
  }
}

pub fn title_case(s: &str) -> String {
  s.split_whitespace()
    .map(|w| {
      let mut chars = w.chars();
      match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
      }
    })
    .collect::<Vec<String>>()
    .join(" ")
}

fn labeled_name(text: &str, _header: &[&str]) -> Option<String> {
  LABELED_NAME_RE
    .captures(text)
    .and_then(|c| c.get(1))
    .map(|m| title_case(m.as_str().trim()))
}

fn banner_name(_text: &str, header: &[&str]) -> Option<String> {
  header
    .iter()
    .filter(|l| is_name_candidate(l))
    .filter(|l| BANNER_RE.is_match(l))
    .find_map(|l| {
      let tokens: Vec<&str> = l.split_whitespace().collect();
      (2..=4).contains(&tokens.len()).then(|| title_case(&tokens.join(" ")))
    })
}

fn capitalized_name(_text: &str, header: &[&str]) -> Option<String> {
  header.iter().filter(|l| is_name_candidate(l)).find_map(|l| {
    let words: Vec<&str> = l.split_whitespace().collect();
    if !(2..=4).contains(&words.len()) {
      return None;
    }
    let capitalized = words.iter().filter(|w| CAPITALIZED_WORD_RE.is_match(w)).count();
    (capitalized >= 2).then(|| title_case(&words.join(" ")))
  })
}

fn is_name_candidate(line: &str) -> bool {
  line.chars().count() <= MAX_NAME_LINE_CHARS && !EMAIL_RE.is_match(line) && !PHONE_LINE_RE.is_match(line)
}
