use num_format::{CustomFormat, Grouping, ToFormattedString};
use once_cell::sync::Lazy;

use super::Sek;

static SEK_FORMAT: Lazy<CustomFormat> = Lazy::new(|| {
    CustomFormat::builder()
        .grouping(Grouping::Standard)
        .separator(" ")
        .minus_sign("-")
        .build()
        .unwrap_or_default()
});

/// Formats whole kronor the Swedish way, e.g. `1 234 kr`.
pub fn format_sek(amount: Sek) -> String {
    format!("{} kr", amount.to_formatted_string(&*SEK_FORMAT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sek() {
        assert_eq!(format_sek(0), "0 kr");
        assert_eq!(format_sek(849), "849 kr");
        assert_eq!(format_sek(1234), "1 234 kr");
        assert_eq!(format_sek(2_449_000), "2 449 000 kr");
    }

    #[test]
    fn test_format_negative_sek() {
        assert_eq!(format_sek(-1350), "-1 350 kr");
    }
}
