use crate::models::CardData;

/// Build a MECARD payload from the non-blank contact fields.
///
/// Returns an empty string when no field is filled in so callers can fall back to
/// something else.
///
/// # Examples
///
/// ```
/// use qr_keeper::card::build_mecard;
/// use qr_keeper::models::CardData;
///
/// let card = CardData { name: "Ada".into(), email: "ada@example.com".into(), ..Default::default() };
/// assert_eq!(build_mecard(&card), "MECARD:N:Ada;EMAIL:ada@example.com;");
/// ```
pub fn build_mecard(card: &CardData) -> String {
    let fields = [("N", &card.name), ("TEL", &card.phone), ("EMAIL", &card.email), ("URL", &card.website)];

    let parts: Vec<String> = fields
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(tag, value)| format!("{}:{}", tag, escape_field(value)))
        .collect();

    if parts.is_empty() {
        return String::new();
    }

    format!("MECARD:{};", parts.join(";"))
}

/// Backslash-escape the MECARD separators `;` and `:`
fn escape_field(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == ';' || c == ':' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
