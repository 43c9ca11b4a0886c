//! ISBN-10 / ISBN-13 conversion and checksum helpers
//!
//! All functions are pure. Conversions return `None` for input that cannot be
//! converted rather than failing.

/// Strip hyphens and whitespace from an ISBN as it appears in catalogs
pub fn clean_isbn(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

/// Convert a `978`-prefixed ISBN-13 to its ISBN-10 form.
///
/// `979` ISBNs have no ISBN-10 equivalent and yield `None`, as does anything
/// that is not 13 digits once cleaned.
pub fn isbn13_to_isbn10(isbn13: &str) -> Option<String> {
    let cleaned = clean_isbn(isbn13);
    if cleaned.len() != 13 || !cleaned.starts_with("978") || !all_digits(&cleaned) {
        return None;
    }

    let core = &cleaned[3..12];
    let total: u32 = digits(core)
        .enumerate()
        .map(|(i, d)| (10 - i as u32) * d)
        .sum();
    let check = match 11 - total % 11 {
        10 => 'X',
        11 => '0',
        d => char::from_digit(d, 10)?,
    };

    Some(format!("{}{}", core, check))
}

/// Convert an ISBN-10 to the `978`-prefixed ISBN-13 form
pub fn isbn10_to_isbn13(isbn10: &str) -> Option<String> {
    let cleaned = clean_isbn(isbn10);
    if cleaned.len() != 10 || !leading_digits(&cleaned, 9) {
        return None;
    }

    let body = format!("978{}", &cleaned[..9]);
    let check = ean13_check_digit(&body);
    Some(format!("{}{}", body, check))
}

/// Validate the ISBN-10 checksum (`X` allowed as the final character)
pub fn is_valid_isbn10(isbn: &str) -> bool {
    let cleaned = clean_isbn(isbn);
    if cleaned.len() != 10 || !leading_digits(&cleaned, 9) {
        return false;
    }

    let last = match cleaned.as_bytes()[9] {
        b'X' | b'x' => 10,
        b @ b'0'..=b'9' => u32::from(b - b'0'),
        _ => return false,
    };
    let total: u32 = digits(&cleaned[..9])
        .enumerate()
        .map(|(i, d)| (10 - i as u32) * d)
        .sum::<u32>()
        + last;

    total % 11 == 0
}

/// Validate the ISBN-13 (EAN-13) checksum
pub fn is_valid_isbn13(isbn: &str) -> bool {
    let cleaned = clean_isbn(isbn);
    if cleaned.len() != 13 || !all_digits(&cleaned) {
        return false;
    }
    let expected = ean13_check_digit(&cleaned[..12]);
    cleaned.ends_with(expected)
}

/// Checksum test for either identifier length
pub fn is_valid_isbn(isbn: &str) -> bool {
    is_valid_isbn13(isbn) || is_valid_isbn10(isbn)
}

fn ean13_check_digit(first_twelve: &str) -> char {
    let total: u32 = digits(first_twelve)
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d } else { d * 3 })
        .sum();
    let check = (10 - total % 10) % 10;
    char::from_digit(check, 10).unwrap_or('0')
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn leading_digits(s: &str, n: usize) -> bool {
    s.len() >= n && s.as_bytes()[..n].iter().all(u8::is_ascii_digit)
}

fn digits(s: &str) -> impl Iterator<Item = u32> + '_ {
    s.chars().filter_map(|c| c.to_digit(10))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isbn13_to_isbn10_known_pairs() {
        // The Catcher in the Rye
        assert_eq!(
            isbn13_to_isbn10("9780316769488").as_deref(),
            Some("0316769487")
        );
        // Dune
        assert_eq!(
            isbn13_to_isbn10("9780441013593").as_deref(),
            Some("0441013597")
        );
        // Remainder 0 maps the check character to '0'
        assert_eq!(
            isbn13_to_isbn10("9780008525903").as_deref(),
            Some("0008525900")
        );
    }

    #[test]
    fn test_isbn13_to_isbn10_x_check_digit() {
        // Core 080442957 sums to 1 mod 11, so check digit 10 -> 'X'
        assert_eq!(
            isbn13_to_isbn10("9780804429573").as_deref(),
            Some("080442957X")
        );
    }

    #[test]
    fn test_isbn13_to_isbn10_strips_hyphens_and_spaces() {
        assert_eq!(
            isbn13_to_isbn10("978-0-316-76948-8").as_deref(),
            Some("0316769487")
        );
        assert_eq!(
            isbn13_to_isbn10(" 978 0441 013593 ").as_deref(),
            Some("0441013597")
        );
    }

    #[test]
    fn test_isbn13_to_isbn10_rejects_unconvertible() {
        assert_eq!(isbn13_to_isbn10("9791234567896"), None);
        assert_eq!(isbn13_to_isbn10("978031676948"), None);
        assert_eq!(isbn13_to_isbn10("97803167694888"), None);
        assert_eq!(isbn13_to_isbn10("0316769487"), None);
        assert_eq!(isbn13_to_isbn10("978ABCDEFGHIJ"), None);
        assert_eq!(isbn13_to_isbn10(""), None);
    }

    #[test]
    fn test_converted_isbn10_passes_checksum() {
        for isbn13 in [
            "9780316769488",
            "9780441013593",
            "9780008525903",
            "9780804429573",
            "9780141036144",
            "9780747532699",
        ] {
            let isbn10 = isbn13_to_isbn10(isbn13).unwrap();
            assert_eq!(isbn10.len(), 10);
            assert!(is_valid_isbn10(&isbn10), "{} -> {}", isbn13, isbn10);
        }
    }

    #[test]
    fn test_isbn10_to_isbn13() {
        assert_eq!(
            isbn10_to_isbn13("0316769487").as_deref(),
            Some("9780316769488")
        );
        assert_eq!(
            isbn10_to_isbn13("0-441-01359-7").as_deref(),
            Some("9780441013593")
        );
        assert_eq!(isbn10_to_isbn13("12345"), None);
        assert_eq!(isbn10_to_isbn13("12345678é"), None);
    }

    #[test]
    fn test_checksum_validation() {
        assert!(is_valid_isbn13("9780441013593"));
        assert!(!is_valid_isbn13("9780441013594"));
        assert!(is_valid_isbn10("0441013597"));
        assert!(is_valid_isbn10("080442957X"));
        assert!(!is_valid_isbn10("0441013598"));
        assert!(is_valid_isbn("978-0-441-01359-3"));
        assert!(!is_valid_isbn("not an isbn"));
    }
}
