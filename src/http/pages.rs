//! HTML pages served by the service.

/// Shared page styling.
const PAGE_STYLE: &str = r#"
body {
    font-family: Arial, sans-serif;
    background-color: #f4f4f9;
    margin: 0;
    padding: 20px;
    display: flex;
    flex-direction: column;
    align-items: center;
    justify-content: center;
    height: 100vh;
    text-align: center;
}
h1 { color: #333; }
p { font-size: 1.2em; color: #666; max-width: 600px; }
ul { list-style: none; padding: 0; }
li { margin: 10px 0; }
a { text-decoration: none; color: #1a73e8; }
a:hover { text-decoration: underline; }
.container {
    background: white;
    padding: 20px;
    border-radius: 10px;
    box-shadow: 0 2px 10px rgba(0, 0, 0, 0.1);
}
"#;

/// Renders the landing page with usage instructions.
pub fn index_page() -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Topographic Map Database Download</title>
    <style>{PAGE_STYLE}</style>
</head>
<body>
    <div class="container">
        <h1>Topographic Map Database Download</h1>
        <p>This service exports map data as GeoJSON, clipped to a map-grid
        sheet or county region. Append a grid number or county code to the
        URL and press Enter.</p>
        <p>Example: for sheet 93203NW, request <code>/93203NW</code></p>
        <p>Example: for county code 10013, request <code>/10013</code></p>
    </div>
</body>
</html>
"#
    )
}

/// Renders the per-grid listing page with one download link per exported
/// file and a link to the ZIP bundle.
pub fn listing_page(file_links: &[(String, String)], zip_url: &str) -> String {
    let mut items = String::new();
    for (name, url) in file_links {
        items.push_str(&format!("<li><a href=\"{url}\">{name}</a></li>\n"));
    }
    items.push_str(&format!(
        "<li><a href=\"{zip_url}\">Download All as ZIP</a></li>\n"
    ));

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Download GeoJSON Files</title>
    <style>{PAGE_STYLE}</style>
</head>
<body>
    <div class="container">
        <h1>Download GeoJSON Files</h1>
        <ul>
{items}        </ul>
    </div>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_page_mentions_examples() {
        let html = index_page();
        assert!(html.contains("/93203NW"));
        assert!(html.contains("/10013"));
    }

    #[test]
    fn test_listing_page_links() {
        let links = vec![(
            "93203NW_contours".to_string(),
            "/download/93203NW_contours.geojson".to_string(),
        )];
        let html = listing_page(&links, "/download_all/93203NW");

        assert!(html.contains("href=\"/download/93203NW_contours.geojson\""));
        assert!(html.contains(">93203NW_contours</a>"));
        assert!(html.contains("Download All as ZIP"));
        assert!(html.contains("href=\"/download_all/93203NW\""));
    }
}
