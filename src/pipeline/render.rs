//! HTML fragment rendering.

use crate::models::BookRecord;
use crate::utils::escape_html;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<style>
body {
    margin: 0;
}

body, table {
    font-family: Arial,Helvetica,Verdana;
    font-size: 12px;
}

td {
    vertical-align: top;
    padding-bottom: 15px;
}

a {
    color: #337ab7;
    text-decoration: none;
}
a:focus, a:hover {
    color: #23527c;
    text-decoration: underline;
}

td.resource-thumbnail {
    width: 25%;
}

td.resource-description {
    padding-left: 5px;
}
</style>
</head>

<body>
<table width="100%">
<tbody>
"#;

const PAGE_TAIL: &str = "</tbody></table></body></html>\n";

/// Renders book records as a self-contained HTML page
#[derive(Debug, Clone, Copy)]
pub struct HtmlRenderer {
    escape: bool,
}

impl HtmlRenderer {
    /// `escape` controls whether API-derived text is HTML-escaped
    pub fn new(escape: bool) -> Self {
        Self { escape }
    }

    pub fn render(&self, books: &[BookRecord]) -> String {
        let mut html = String::from(PAGE_HEAD);
        for book in books {
            html.push_str(&self.render_row(book));
        }
        html.push_str(PAGE_TAIL);
        html
    }

    fn render_row(&self, book: &BookRecord) -> String {
        let catalog_url = self.text(book.catalog_url.as_deref().unwrap_or_default());
        let cover_url = self.text(&book.cover_image_url);

        format!(
            r#"<tr>
    <td width="15%" align="right" style="padding-right:10px;padding-bottom:10px;vertical-align:top;">
        <a href="{catalog_url}" target="_blank"><img src="{cover_url}" style="width:100%"></a>
    </td>
    <td align="left" style="vertical-align:top;padding-left:10px">
        <p style="font-size: 15px;"><a href="{catalog_url}" target="_blank"><b>{title}</b></a>{author}</p>
        <p>Publication Year: {year}</p>
    </td>
</tr>
"#,
            title = self.text(&book.title),
            author = self.text(&book.author),
            year = self.text(&book.year),
        )
    }

    fn text(&self, value: &str) -> String {
        if self.escape {
            escape_html(value)
        } else {
            value.to_string()
        }
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}
