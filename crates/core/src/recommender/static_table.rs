/// Starter companions for well-known items, shown before any purchase
/// history has accumulated.
const STATIC_RECOMMENDATIONS: &[(&str, &[&str])] = &[
    ("דגני בוקר", &["חלב", "קערות חד פעמיות"]),
    ("פסטה", &["רוטב עגבניות", "גבינה צהובה"]),
    ("לחם", &["חמאה", "גבינה צהובה", "ממרח שוקולד"]),
    ("בשר טחון", &["אורז", "רוטב עגבניות", "בצל"]),
    ("קפה", &["חלב", "סוכר", "עוגיות"]),
    ("ביצים", &["לחם", "גבינה צהובה", "ירקות"]),
    ("עגבניות", &["מלפפונים", "בצל", "שמן זית"]),
];

pub(crate) fn static_companions(item: &str) -> &'static [&'static str] {
    STATIC_RECOMMENDATIONS
        .iter()
        .find(|(anchor, _)| *anchor == item)
        .map(|(_, companions)| *companions)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::static_companions;

    #[test]
    fn known_anchor_has_companions() {
        assert_eq!(static_companions("פסטה"), &["רוטב עגבניות", "גבינה צהובה"]);
    }

    #[test]
    fn unknown_anchor_has_none() {
        assert!(static_companions("אבטיח").is_empty());
    }
}
