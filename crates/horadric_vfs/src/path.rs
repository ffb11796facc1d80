//! Asset path normalisation.
//!
//! Every path is resolved to a single canonical form before it reaches an
//! archive or a cache: lower case, forward slashes, no `.`/`..` segments,
//! and a leading `/`. Locale tokens are substituted first:
//!
//! | Token         | Replacement                                         |
//! |---------------|-----------------------------------------------------|
//! | `{LANG}`      | configured language code, lower-cased               |
//! | `{LANG_FONT}` | `latin` for latin-script languages, else the code   |

/// Token replaced with the language code.
pub const LANGUAGE_TOKEN: &str = "{LANG}";

/// Token replaced with the font family of the language.
pub const LANGUAGE_FONT_TOKEN: &str = "{LANG_FONT}";

const LATIN_LANGUAGES: [&str; 7] = ["ENG", "ESP", "DEU", "FRA", "POR", "ITA", "POL"];

/// Font family directory used by a language.
pub fn language_font(language: &str) -> String {
	if LATIN_LANGUAGES.iter().any(|l| l.eq_ignore_ascii_case(language)) {
		"latin".to_string()
	} else {
		language.to_ascii_lowercase()
	}
}

/// Replaces the locale tokens in `path`.
pub fn substitute_language(path: &str, language: &str) -> String {
	// The font token contains the language token, so it goes first
	path.replace(LANGUAGE_FONT_TOKEN, &language_font(language))
		.replace(LANGUAGE_TOKEN, &language.to_ascii_lowercase())
}

/// Converts `path` to its canonical form.
///
/// ```
/// use horadric_vfs::path::normalize_path;
///
/// assert_eq!(normalize_path(r"Data\Global\.\Palette\..\UI\panel.DC6"), "/data/global/ui/panel.dc6");
/// ```
pub fn normalize_path(path: &str) -> String {
	let lowered = path.to_lowercase().replace('\\', "/");
	let mut segments: Vec<&str> = Vec::new();
	for segment in lowered.split('/') {
		match segment {
			"" | "." => {}
			".." => {
				segments.pop();
			}
			other => segments.push(other),
		}
	}
	format!("/{}", segments.join("/"))
}

/// Substitutes locale tokens, then normalises.
pub fn resolve_path(path: &str, language: &str) -> String {
	normalize_path(&substitute_language(path, language))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_normalize() {
		assert_eq!(normalize_path("/data/global/pal.dat"), "/data/global/pal.dat");
		assert_eq!(normalize_path("data//global///pal.dat"), "/data/global/pal.dat");
		assert_eq!(normalize_path("..\\..\\a\\b"), "/a/b");
		assert_eq!(normalize_path(""), "/");
		assert_eq!(normalize_path("./"), "/");
	}

	#[test]
	fn test_language_tokens() {
		assert_eq!(
			resolve_path("/data/local/font/{LANG_FONT}/font16.tbl", "ENG"),
			"/data/local/font/latin/font16.tbl"
		);
		assert_eq!(resolve_path("/data/local/lng/{LANG}/string.tbl", "DEU"), "/data/local/lng/deu/string.tbl");
		assert_eq!(resolve_path("/font/{LANG_FONT}/a.dc6", "JPN"), "/font/jpn/a.dc6");
	}

	#[test]
	fn test_language_font() {
		assert_eq!(language_font("pol"), "latin");
		assert_eq!(language_font("KOR"), "kor");
	}
}
