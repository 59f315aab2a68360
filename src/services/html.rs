//! Flattens an HTML document into a single line.

/// Collapses every whitespace run to one space, drops whitespace that sits
/// between two tags, and trims the ends.
///
/// Returns `None` for empty or whitespace-only input.
pub fn html_to_string(html: &str) -> Option<String> {
    let collapsed = html.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }

    Some(collapsed.replace("> <", "><"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_a_document() {
        let html = "<html>\n  <body>\n    <h1>Hello   world</h1>\n\t<p>\n      Hi\n    </p>\n  </body>\n</html>\n";

        assert_eq!(
            html_to_string(html).as_deref(),
            Some("<html><body><h1>Hello world</h1><p> Hi </p></body></html>")
        );
    }

    #[test]
    fn keeps_text_spacing_next_to_tags() {
        assert_eq!(
            html_to_string("<b>bold</b> text <i>it</i>").as_deref(),
            Some("<b>bold</b> text <i>it</i>")
        );
    }

    #[test]
    fn blank_input_is_rejected() {
        assert_eq!(html_to_string(""), None);
        assert_eq!(html_to_string(" \n\t "), None);
    }
}
