// tests/ingest_normalize.rs
use news_sentiment_dashboard::ingest::{normalize_text, strip_truncation_marker};

#[test]
fn empty_is_ok() {
    assert_eq!(normalize_text(""), "");
}

#[test]
fn strips_html_and_unescapes() {
    let s = "<p>Hello&nbsp;<b>world</b> &ldquo;ok&rdquo;</p>";
    assert_eq!(normalize_text(s), r#"Hello world "ok""#);
}

#[test]
fn folds_whitespace_and_nbsp() {
    let s = "A\u{00A0}\n\tB   C";
    assert_eq!(normalize_text(s), "A B C");
}

#[test]
fn curly_apostrophes_become_ascii() {
    assert_eq!(normalize_text("It\u{2019}s \u{2018}fine\u{2019}"), "It's 'fine'");
}

#[test]
fn ascii_ellipsis_marker_is_stripped_too() {
    assert_eq!(
        strip_truncation_marker("Rupiah menguat... [+512 chars]"),
        "Rupiah menguat"
    );
}
