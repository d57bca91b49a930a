//! Single-flow HTML preview. Page breaks are print hints, never hard breaks.

use super::outline::{Block, ComposedWill};

const STYLE: &str = r#"
    @page { size: letter; margin: 2cm; }
    body { font-family: 'Times New Roman', Times, serif; font-size: 11pt; line-height: 1.6; color: #000; max-width: 21.59cm; margin: 0 auto; padding: 2cm; }
    .header { text-align: center; margin-bottom: 1.5cm; }
    .header h1 { font-size: 16pt; font-weight: bold; margin: 0; padding-bottom: 0.4cm; border-bottom: 0.5mm solid #000; }
    .header p { margin: 0.3cm 0 0 0; }
    .header .granted-by { font-size: 12pt; }
    .section { margin-bottom: 1.2cm; text-align: justify; page-break-inside: avoid; break-inside: avoid-page; }
    .section-title { font-size: 13pt; font-weight: bold; margin-bottom: 0.7cm; }
    .clause-number { font-weight: bold; }
    .items { margin: 0.5cm 0 0 1.5cm; padding: 0; list-style: none; }
    .items li { margin-bottom: 0.3cm; }
    .firma-section { margin-top: 1.8cm; page-break-inside: avoid; break-inside: avoid-page; text-align: center; }
    .firma-line { border-top: 0.3mm solid #000; width: 8cm; margin: 3cm auto 0.3cm auto; }
    .firma-text { font-size: 10pt; }
    .footer { margin-top: 2cm; padding-top: 0.5cm; border-top: 0.2mm solid #000; font-size: 8pt; text-align: center; page-break-inside: avoid; break-inside: avoid-page; }
    .footer .label { font-size: 9pt; font-weight: bold; }
    .footer .stamp { font-size: 7pt; }
    @media print { body { padding: 0; } }
"#;

pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn render_html(will: &ComposedWill) -> String {
    let mut html = String::with_capacity(8 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str(&format!(
        "<title>Testamento de {}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n",
        escape_html(&will.signature.name)
    ));

    html.push_str(&format!(
        "<div class=\"header\">\n<h1>{}</h1>\n<p class=\"granted-by\">{}</p>\n<p>{}</p>\n</div>\n",
        escape_html(&will.header.title),
        escape_html(&will.header.granted_by),
        escape_html(&will.header.national_id),
    ));

    for section in &will.sections {
        html.push_str(&format!(
            "<div class=\"section\" data-section=\"{}\">\n<div class=\"section-title\">{}</div>\n",
            section.number,
            escape_html(&section.heading())
        ));

        let mut open_list = false;
        for block in &section.blocks {
            let is_item = matches!(block, Block::ListItem { .. });
            if open_list && !is_item {
                html.push_str("</ul>\n");
                open_list = false;
            }
            match block {
                Block::Paragraph { text } => {
                    html.push_str(&format!("<p>{}</p>\n", escape_html(text)));
                }
                Block::Clause { ordinal, text } => {
                    html.push_str(&format!(
                        "<p class=\"clause\"><span class=\"clause-number\">{}</span> {}</p>\n",
                        escape_html(&Block::clause_label(ordinal)),
                        escape_html(text)
                    ));
                }
                Block::ListItem { text } => {
                    if !open_list {
                        html.push_str("<ul class=\"items\">\n");
                        open_list = true;
                    }
                    html.push_str(&format!("<li>{}</li>\n", escape_html(text)));
                }
            }
        }
        if open_list {
            html.push_str("</ul>\n");
        }
        html.push_str("</div>\n");
    }

    let signature = &will.signature;
    html.push_str(&format!(
        "<div class=\"firma-section\">\n<p>{}</p>\n<div class=\"firma-line\"></div>\n\
         <div class=\"firma-text\"><strong>{}</strong><br>{}<br>{}</div>\n</div>\n",
        escape_html(&signature.closing),
        escape_html(&signature.name),
        escape_html(&signature.national_id),
        escape_html(&signature.caption),
    ));

    let disclaimer = &will.disclaimer;
    html.push_str(&format!(
        "<div class=\"footer\">\n<p><span class=\"label\">{}</span> {}</p>\n\
         <p class=\"stamp\">{}</p>\n</div>\n</body>\n</html>\n",
        escape_html(&disclaimer.label),
        escape_html(&disclaimer.text),
        escape_html(&disclaimer.stamp),
    ));

    html
}

#[cfg(test)]
mod tests {
    use super::escape_html;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html("<b>Pérez & \"Hijos\"</b>"),
            "&lt;b&gt;Pérez &amp; &quot;Hijos&quot;&lt;/b&gt;"
        );
    }
}
