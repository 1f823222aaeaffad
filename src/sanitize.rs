//! Strips executable markup from user-supplied text before it is
//! stored. Script and style elements disappear together with their
//! content; every other tag is dropped but its inner text survives.

pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tag = &rest[start..];

        let end = match tag.find('>') {
            Some(end) => end,
            // unterminated tag, drop everything from here on
            None => return out,
        };

        let name = tag_name(&tag[1..end]);
        rest = &tag[end + 1..];

        if name == "script" || name == "style" {
            rest = skip_element_content(rest, &name);
        }
    }

    out.push_str(rest);
    out
}

/// Advances past the element's content and its closing tag. The
/// marker only counts when the tag name ends there, so `</scripty>`
/// does not close a `<script>` block.
fn skip_element_content<'a>(rest: &'a str, name: &str) -> &'a str {
    let close = format!("</{}", name);
    let lowered = rest.to_ascii_lowercase();

    let mut search_from = 0;
    while let Some(found) = lowered[search_from..].find(&close) {
        let pos = search_from + found;
        let after_marker = pos + close.len();

        let terminates = match lowered[after_marker..].chars().next() {
            None => true,
            Some(c) => c == '>' || c == '/' || c.is_ascii_whitespace(),
        };
        if terminates {
            let after = &rest[pos..];
            return match after.find('>') {
                Some(end) => &after[end + 1..],
                None => "",
            };
        }

        search_from = after_marker;
    }

    ""
}

fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}
