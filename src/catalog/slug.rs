//! URL slugs for company names.

/// Lower-case the name, drop everything outside `[a-z0-9\s-]`, then drop all whitespace.
///
/// `"Tata Consultancy Services Ltd."` -> `"tataconsultancyservicesltd"`
pub fn slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_examples() {
        assert_eq!(slug("Tata Consultancy Services Ltd."), "tataconsultancyservicesltd");
        assert_eq!(slug("JSW Steel Ltd"), "jswsteelltd");
        assert_eq!(slug("Bajaj-Auto  (India) & Co."), "bajaj-autoindiaco");
        assert_eq!(slug("Société Générale"), "socitgnrale");
        assert_eq!(slug(""), "");
    }

    #[test]
    fn slug_is_deterministic_and_stable() {
        let name = "Axis Bank Limited";
        assert_eq!(slug(name), slug(name));
        assert_eq!(slug(&slug(name)), slug(name));
    }
}
