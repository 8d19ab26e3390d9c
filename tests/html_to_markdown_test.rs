//! End-to-end HTML to Markdown conversion, checked against pulldown-cmark
//! as the reference Markdown renderer.

use html_escape::encode_text;
use markdown_bridge::{BrStyle, BulletListMarker, ConversionOptions, convert_html_to_markdown_sync};
use proptest::prelude::*;
use pulldown_cmark::{Options, Parser, html};

fn convert(html: &str) -> String {
    convert_html_to_markdown_sync(html, &ConversionOptions::default())
}

fn render(markdown: &str) -> String {
    let mut out = String::new();
    html::push_html(&mut out, Parser::new(markdown));
    out
}

fn render_with_tables(markdown: &str) -> String {
    let mut out = String::new();
    html::push_html(&mut out, Parser::new_ext(markdown, Options::ENABLE_TABLES));
    out
}

#[test]
fn documented_examples() {
    assert_eq!(
        convert("<h1>Title</h1><p>Hello <strong>world</strong></p>"),
        "# Title\n\nHello **world**"
    );
    assert_eq!(convert("<ul><li>a</li><li>b</li></ul>"), "- a\n- b");
    assert_eq!(convert("<p>5 * 3 = 15</p>"), r"5 \* 3 = 15");
}

#[test]
fn ordered_list_keeps_start_index() {
    let markdown = convert(r#"<ol start="3"><li>x</li><li>y</li></ol>"#);
    assert_eq!(markdown, "3. x\n4. y");
    assert!(render(&markdown).starts_with(r#"<ol start="3">"#));
}

#[test]
fn nested_lists_survive_rendering() {
    let markdown = convert("<ul><li>a<ul><li>b</li></ul></li><li>c</li></ul>");
    assert_eq!(markdown, "- a\n    - b\n- c");

    let rendered = render(&markdown);
    assert_eq!(rendered.matches("<ul>").count(), 2);
    assert_eq!(rendered.matches("<li>").count(), 3);
}

#[test]
fn bullet_marker_follows_options() {
    let options = ConversionOptions::builder()
        .bullet_list_marker(BulletListMarker::Asterisk)
        .build()
        .expect("valid options");
    let markdown = convert_html_to_markdown_sync("<ul><li>a</li></ul><hr><p>b</p>", &options);
    assert_eq!(markdown, "* a\n\n---\n\nb");
}

#[test]
fn code_block_is_verbatim_with_language() {
    let html = "<pre><code class=\"language-rust\">fn main() {\n    let x = a * b_c;\n}</code></pre>";
    assert_eq!(
        convert(html),
        "```rust\nfn main() {\n    let x = a * b_c;\n}\n```"
    );
}

#[test]
fn inline_code_is_not_escaped() {
    assert_eq!(convert("<p>Run <code>a_b *c*</code> now</p>"), "Run `a_b *c*` now");
}

#[test]
fn long_ordered_start_is_clamped_to_a_valid_marker() {
    let markdown = convert(r#"<ol start="1234567890"><li>a</li><li>b</li></ol>"#);
    assert_eq!(markdown, "999999998. a\n999999999. b");
    assert!(render(&markdown).starts_with(r#"<ol start="999999998">"#));
}

#[test]
fn bang_before_link_stays_text() {
    let markdown = convert(r#"<p>Wow!<a href="https://x.org">docs</a></p>"#);
    assert_eq!(markdown, r"Wow\![docs](https://x.org)");
    assert_eq!(render(&markdown), "<p>Wow!<a href=\"https://x.org\">docs</a></p>\n");

    let image = convert(r#"<p>Wow!<img src="a.png" alt="pic"></p>"#);
    assert!(render(&image).contains(r#"<img src="a.png" alt="pic" />"#));
}

#[test]
fn emphasis_against_letters_with_edge_punctuation() {
    let cases = [
        ("<p>foo<em>(bar)</em>baz</p>", "foo(*bar*)baz", "foo(<em>bar</em>)baz"),
        ("<p><b>Note:</b>text</p>", "**Note**:text", "<strong>Note</strong>:text"),
        (r#"<p>x<strong>"q"</strong>y</p>"#, r#"x"**q**"y"#, "<strong>q</strong>"),
        ("<p><b>Note:</b> text</p>", "**Note:** text", "<strong>Note:</strong> text"),
        ("<p>a<b>:</b>b</p>", "a:b", "<p>a:b</p>"),
    ];
    for (html, markdown, rendered) in cases {
        assert_eq!(convert(html), markdown, "{html}");
        assert!(render(markdown).contains(rendered), "{html} rendered as {}", render(markdown));
    }
}

#[test]
fn tables_become_pipe_tables() {
    let markdown = convert(
        "<table><caption>Prices</caption><thead><tr><th>Item</th><th>Cost</th></tr></thead>\
         <tbody><tr><td>tea</td><td><b>3</b></td></tr><tr><td>a|b</td></tr></tbody></table>",
    );
    assert_eq!(
        markdown,
        "Prices\n\n| Item | Cost  |\n| ---- | ----- |\n| tea  | **3** |\n| a\\|b |       |"
    );

    let rendered = render_with_tables(&markdown);
    assert!(rendered.contains("<th>Item</th>"), "{rendered}");
    assert!(rendered.contains("<td><strong>3</strong></td>"), "{rendered}");
    assert!(rendered.contains("<td>a|b</td>"), "{rendered}");
    assert_eq!(rendered.matches("<tr>").count(), 3);
}

#[test]
fn table_without_header_uses_first_row() {
    let markdown = convert("<table><tr><td>a</td><td>b</td></tr></table>");
    assert_eq!(markdown, "| a   | b   |\n| --- | --- |");
    assert!(render_with_tables(&markdown).contains("<th>a</th>"));

    assert_eq!(convert("<table><tr><td> </td></tr></table><p>after</p>"), "after");
}

#[test]
fn links_keep_href_and_title() {
    let markdown = convert(r#"<p><a href="https://example.com/x" title="Ex">site</a></p>"#);
    assert_eq!(markdown, r#"[site](https://example.com/x "Ex")"#);
    assert_eq!(
        render(&markdown),
        "<p><a href=\"https://example.com/x\" title=\"Ex\">site</a></p>\n"
    );
}

#[test]
fn images_render_with_alt_text() {
    let markdown = convert(r#"<p><img src="pic.png" alt="A pic"></p>"#);
    assert_eq!(markdown, "![A pic](pic.png)");
}

#[test]
fn line_break_styles() {
    assert_eq!(convert("<p>a<br>b</p>"), "a\\\nb");

    let options = ConversionOptions::builder()
        .br_style(BrStyle::TwoSpaces)
        .build()
        .expect("valid options");
    assert_eq!(convert_html_to_markdown_sync("<p>a<br>b</p>", &options), "a  \nb");
}

#[test]
fn blockquote_wraps_paragraphs() {
    let markdown = convert("<blockquote><p>one</p><p>two</p></blockquote>");
    assert_eq!(markdown, "> one\n>\n> two");
    assert_eq!(render(&markdown).matches("<blockquote>").count(), 1);
}

#[test]
fn emphasis_round_trips() {
    let markdown = convert("<p><em>a</em> and <strong>b</strong></p>");
    assert_eq!(markdown, "*a* and **b**");
    assert_eq!(render(&markdown), "<p><em>a</em> and <strong>b</strong></p>\n");
}

#[test]
fn headings_stay_headings() {
    for level in 1..=6 {
        let markdown = convert(&format!("<h{level}>Section</h{level}>"));
        assert_eq!(render(&markdown), format!("<h{level}>Section</h{level}>\n"));
    }
}

#[test]
fn significant_characters_render_literally() {
    let samples = [
        "5 * 3 = 15",
        "snake_case_name",
        "a [b] c",
        "`tick`",
        "# not a heading",
        "1. not a list",
        "- not a bullet",
        "+ not a bullet",
        "> not a quote",
        "back\\slash",
        "**not bold**",
        "&amp; literal",
        "<not-html>",
        "![not](an-image)",
    ];
    for sample in samples {
        let html = format!("<p>{}</p>", encode_text(sample));
        let markdown = convert(&html);
        assert_eq!(
            render(&markdown),
            format!("<p>{}</p>\n", encode_text(sample)),
            "sample {sample:?} emitted as {markdown:?}"
        );
    }
}

#[test]
fn office_export_quirks() {
    let google_docs = r#"<p><b style="font-weight:normal;" id="docs-internal-guid-1"><span style="font-weight:700">Bold</span> and <span style="font-style:italic">italic</span></b></p>"#;
    assert_eq!(convert(google_docs), "**Bold** and *italic*");

    let word = r#"<p class="MsoNormal">Hello <o:p>office</o:p> world</p>"#;
    assert_eq!(convert(word), "Hello office world");
}

#[test]
fn malformed_input_degrades_to_text() {
    let markdown = convert("<p><b>unclosed <i>tags");
    assert!(render(&markdown).contains("unclosed"));

    assert_eq!(convert(""), "");
    assert_eq!(convert("<script>alert(1)</script>"), "");
    assert_eq!(convert("<custom-element>kept</custom-element>"), "kept");
}

#[test]
fn minimal_preset() {
    let markdown = convert_html_to_markdown_sync(
        r#"<p><a href="https://example.com">site</a><img src="a.png" alt="x"></p>"#,
        &ConversionOptions::minimal(),
    );
    assert_eq!(markdown, "site");
}

fn html_fragment() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        "[a-z*_#<>&\\[\\]` ]{1,12}".prop_map(|text| encode_text(&text).into_owned()),
        Just("<br>".to_string()),
        Just("<img src=\"x.png\" alt=\"x\">".to_string()),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        (
            prop::sample::select(vec![
                "p", "em", "strong", "ul", "ol", "li", "blockquote", "pre", "code", "h2", "div", "span",
                "a href=\"/x\"",
            ]),
            prop::collection::vec(inner, 1..4),
        )
            .prop_map(|(tag, children)| {
                let name = tag.split(' ').next().unwrap_or(tag);
                format!("<{tag}>{}</{name}>", children.concat())
            })
    })
}

proptest! {
    #[test]
    fn conversion_is_deterministic(html in html_fragment()) {
        let first = convert(&html);
        let second = convert(&html);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn arbitrary_input_always_converts(html in ".{0,200}") {
        let markdown = convert(&html);
        prop_assert_eq!(markdown, convert(&html));
    }

    #[test]
    fn escaped_words_render_literally(words in prop::collection::vec("[a-z0-9*_`#\\[\\]<>&!~=+.()\\\\-]{1,6}", 1..6)) {
        let text = words.join(" ");
        let markdown = convert(&format!("<p>{}</p>", encode_text(&text)));
        prop_assert_eq!(render(&markdown), format!("<p>{}</p>\n", encode_text(&text)));
    }

    #[test]
    fn words_around_links_render_literally(
        parts in prop::collection::vec(
            (any::<bool>(), "[a-z0-9*_`#\\[\\]<>&!~=+.()\\\\-]{1,6}", prop::sample::select(vec!["", " "])),
            1..6,
        )
    ) {
        let mut html = String::new();
        let mut expected = String::new();
        for (is_link, word, separator) in &parts {
            let word = encode_text(word);
            if *is_link {
                html.push_str(&format!(r#"<a href="https://x.org">{word}</a>"#));
                expected.push_str(&format!(r#"<a href="https://x.org">{word}</a>"#));
            } else {
                html.push_str(&word);
                expected.push_str(&word);
            }
            html.push_str(separator);
            expected.push_str(separator);
        }
        let markdown = convert(&format!("<p>{html}</p>"));
        prop_assert_eq!(render(&markdown), format!("<p>{}</p>\n", expected.trim_end()));
    }
}
