/// Minimal HTML page mounting one module script.
///
/// The page forbids caching and appends `build_token` to the script URL so a
/// rebuilt preview is never served stale.
pub fn render_host_page(title: &str, script_src: &str, build_token: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <meta http-equiv="Cache-Control" content="no-cache, no-store, must-revalidate" />
    <meta http-equiv="Pragma" content="no-cache" />
    <meta http-equiv="Expires" content="0" />
    <title>{title} | Smart Preview</title>
  </head>
  <body>
    <div id="root"></div>
    <script type="module" src="{src}?v={token}"></script>
  </body>
</html>
"#,
        title = escape_html(title),
        src = escape_html(script_src),
        token = escape_html(build_token),
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_disables_caching_and_busts_script_url() {
        let html = render_host_page("UserCard", "/preview/UserCard.jsx", "1700000000000");
        assert!(html.contains(r#"content="no-cache, no-store, must-revalidate""#));
        assert!(html.contains(r#"<meta http-equiv="Pragma" content="no-cache" />"#));
        assert!(html.contains(r#"src="/preview/UserCard.jsx?v=1700000000000""#));
        assert!(html.contains("<title>UserCard | Smart Preview</title>"));
    }

    #[test]
    fn title_is_escaped() {
        let html = render_host_page("<Card & Co>", "/preview/x.jsx", "1");
        assert!(html.contains("<title>&lt;Card &amp; Co&gt; | Smart Preview</title>"));
    }
}
