//! Header normalization and alias-based column detection.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Normalize header text for matching: lowercase, strip accents (NFKD,
/// drop combining marks), turn punctuation into spaces, collapse runs of
/// whitespace.
pub fn normalize_header(raw: &str) -> String {
  let folded: String = raw
    .trim()
    .to_lowercase()
    .nfkd()
    .filter(|c| !is_combining_mark(*c))
    .map(|c| match c {
      ',' | '.' | ';' | ':' | '-' | '_' => ' ',
      other => other,
    })
    .collect();
  folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Find the index of the first header matching any alias: exact
/// normalized match first, then substring containment as a fallback.
pub fn detect_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
  let normalized: Vec<String> =
    headers.iter().map(|h| normalize_header(h)).collect();

  if let Some(i) = normalized.iter().position(|h| aliases.contains(&h.as_str()))
  {
    return Some(i);
  }
  normalized
    .iter()
    .position(|h| aliases.iter().any(|a| h.contains(a)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalization_strips_accents_case_and_punctuation() {
    assert_eq!(
      normalize_header("  Fecha Último Mantenimiento "),
      "fecha ultimo mantenimiento"
    );
    assert_eq!(normalize_header("Ubicación"), "ubicacion");
    assert_eq!(normalize_header("FECHA_ULTIMO-MANT."), "fecha ultimo mant");
    assert_eq!(normalize_header("fecha   ulTiiMo   x"), "fecha ultiimo x");
  }

  #[test]
  fn exact_match_beats_substring_match() {
    let headers: Vec<String> =
      ["Ficha técnica", "Ficha"].iter().map(|s| s.to_string()).collect();
    assert_eq!(detect_column(&headers, &["ficha"]), Some(1));
  }

  #[test]
  fn substring_match_is_the_fallback() {
    let headers: Vec<String> =
      ["Modelo del equipo"].iter().map(|s| s.to_string()).collect();
    assert_eq!(detect_column(&headers, &["modelo"]), Some(0));
    assert_eq!(detect_column(&headers, &["ubicacion"]), None);
  }
}
