use portfolio_relay::sanitize::{escape_html, sanitize, sanitize_multiline};

#[test]
fn escapes_markup_characters_only() {
    assert_eq!(
        escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
        r#"&lt;a href="x"&gt;Tom &amp; 'Jerry'&lt;/a&gt;"#
    );
}

#[test]
fn existing_references_are_left_alone() {
    assert_eq!(escape_html("&amp; &lt; &#169; &#x1F600; &nbsp;"), "&amp; &lt; &#169; &#x1F600; &amp;nbsp;");
}

#[test]
fn strips_control_characters() {
    assert_eq!(sanitize("Ana\u{0}\u{7}\t\r\nLima\u{7F}", 60), "AnaLima");
}

#[test]
fn multiline_keeps_line_feeds_but_drops_carriage_returns() {
    assert_eq!(
        sanitize_multiline("line one\r\nline two\n\u{1B}[31mred", 4000),
        "line one\nline two\n[31mred"
    );
}

#[test]
fn sanitizing_twice_changes_nothing() {
    let inputs = [
        "plain text",
        "<script>alert('x')</script>",
        "fish & chips &amp; more",
        "tab\there\u{0}",
        "&",
    ];

    for input in inputs {
        let once = sanitize(input, 60);
        assert_eq!(sanitize(&once, 60), once, "input: {input:?}");
    }

    let once = sanitize_multiline("a < b\nb > c &\r\n", 4000);
    assert_eq!(sanitize_multiline(&once, 4000), once);
}

#[test]
fn long_message_is_capped_at_limit() {
    let message = "x".repeat(5000);

    let sanitized = sanitize_multiline(&message, 4000);

    assert_eq!(sanitized.chars().count(), 4000);
}

#[test]
fn cap_counts_characters_not_bytes() {
    let name = "é".repeat(100);

    let sanitized = sanitize(&name, 60);

    assert_eq!(sanitized.chars().count(), 60);
}

#[test]
fn cap_never_splits_a_reference() {
    // 58 chars, then `&lt;` would need 4 more
    let input = format!("{}<b", "a".repeat(58));

    let sanitized = sanitize(&input, 60);

    assert_eq!(sanitized, "a".repeat(58));
}

#[test]
fn cap_applies_to_escaped_length() {
    let sanitized = sanitize(&"<".repeat(20), 60);

    assert_eq!(sanitized, "&lt;".repeat(15));
}

#[test]
fn empty_input_stays_empty() {
    assert_eq!(sanitize("", 10), "");
    assert_eq!(sanitize("\u{1}\u{2}", 10), "");
}
