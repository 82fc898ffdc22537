//! Page shell.

use super::html::html_escape;

/// Generate the HTML document around a page body.
pub fn html_shell(title: &str, content: &str) -> String {
    let title = html_escape(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="Extract text from PDFs and images">
    <title>{title} - OCR Extractor</title>

    <!-- HTMX (local, optional: forms fall back to full-page posts) -->
    <script src="/static/vendor/htmx-2.0.8.min.js"></script>

    <!-- Application bundle -->
    <script src="/static/main.js" defer></script>
    <link rel="stylesheet" href="/static/app.css">
</head>
<body>
    <div id="app-shell">
        <header class="app-header">
            <a href="/" class="brand">OCR Extractor</a>
        </header>

        <main id="app">
            {content}
        </main>

        <footer class="app-footer">
            <p>Powered by Axum + HTMX</p>
        </footer>
    </div>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_wraps_content() {
        let page = html_shell("Upload", "<p id=\"body\">hi</p>");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Upload - OCR Extractor</title>"));
        assert!(page.contains("<p id=\"body\">hi</p>"));
        assert!(page.contains("/static/main.js"));
    }

    #[test]
    fn test_title_is_escaped() {
        let page = html_shell("<b>", "");
        assert!(page.contains("<title>&lt;b&gt; - OCR Extractor</title>"));
    }
}
