use chrono::Weekday;

/// Canonical weekday table: match key, full name, rule.
const DAY_TABLE: [(&str, &str, Weekday); 7] = [
    ("mon", "monday", Weekday::Mon),
    ("tue", "tuesday", Weekday::Tue),
    ("wed", "wednesday", Weekday::Wed),
    ("thu", "thursday", Weekday::Thu),
    ("fri", "friday", Weekday::Fri),
    ("sat", "saturday", Weekday::Sat),
    ("sun", "sunday", Weekday::Sun),
];

/// Resolves a loose day-of-week phrase into distinct weekday rules.
///
/// Accepts comma, slash or whitespace separators as well as run-together
/// abbreviations ("MonWed", "TuTh"). Tokens that match no canonical day are
/// dropped without error; the input originates from AI-extracted text and
/// minor variance is expected. First-seen order is preserved.
pub fn parse_days(input: &str) -> Vec<Weekday> {
    let mut found = Vec::new();
    for token in tokenize(input) {
        let Some(day) = match_token(&token) else {
            tracing::debug!(token = %token, "unrecognized day token dropped");
            continue;
        };
        if !found.contains(&day) {
            found.push(day);
        }
    }
    found
}

/// Splits on separators and at lowercase-to-uppercase boundaries, then
/// case-folds ("Mon/Wed" and "MonWed" both yield ["mon", "wed"]).
fn tokenize(input: &str) -> Vec<String> {
    let mut spaced = String::with_capacity(input.len() + 4);
    let mut prev_lower = false;
    for c in input.chars() {
        match c {
            ',' | '/' => {
                spaced.push(' ');
                prev_lower = false;
            }
            _ => {
                if c.is_uppercase() && prev_lower {
                    spaced.push(' ');
                }
                prev_lower = c.is_lowercase();
                spaced.push(c);
            }
        }
    }
    spaced
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Prefix match against the canonical table; first canonical day wins.
///
/// Either the token carries the three-letter key as a prefix ("tuesday",
/// "tues") or the token itself is a prefix of the full name ("tu", "th").
fn match_token(token: &str) -> Option<Weekday> {
    DAY_TABLE
        .iter()
        .find(|(key, full, _)| token.starts_with(key) || (token.len() >= 2 && full.starts_with(token)))
        .map(|&(_, _, day)| day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_styles_are_equivalent() {
        let expected = vec![Weekday::Tue, Weekday::Thu];
        assert_eq!(parse_days("Tue, Thu"), expected);
        assert_eq!(parse_days("Tue/Thu"), expected);
        assert_eq!(parse_days("Tue Thu"), expected);
    }

    #[test]
    fn test_run_together_abbreviations() {
        assert_eq!(parse_days("MonWed"), vec![Weekday::Mon, Weekday::Wed]);
        assert_eq!(parse_days("TuTh"), vec![Weekday::Tue, Weekday::Thu]);
        assert_eq!(
            parse_days("MonWedFri"),
            vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]
        );
    }

    #[test]
    fn test_full_names_and_prefixes() {
        assert_eq!(parse_days("Tuesday"), vec![Weekday::Tue]);
        assert_eq!(parse_days("tues"), vec![Weekday::Tue]);
        assert_eq!(parse_days("Saturday/Sunday"), vec![Weekday::Sat, Weekday::Sun]);
    }

    #[test]
    fn test_duplicates_suppressed_order_preserved() {
        assert_eq!(
            parse_days("Wed, Mon, wednesday"),
            vec![Weekday::Wed, Weekday::Mon]
        );
    }

    #[test]
    fn test_unknown_tokens_dropped_silently() {
        assert_eq!(parse_days("Xyz, Blursday"), Vec::<Weekday>::new());
        assert_eq!(parse_days("Mon and Wed"), vec![Weekday::Mon, Weekday::Wed]);
        assert_eq!(parse_days(""), Vec::<Weekday>::new());
    }
}
