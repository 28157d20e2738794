use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use folio_core::RenderedChart;

/// Inline a rendered chart as a base64 data URI.
pub fn data_uri(chart: &RenderedChart) -> String {
    format!("data:{};base64,{}", chart.mime, STANDARD.encode(&chart.bytes))
}

/// The analysis page: free-text analysis followed by the two charts.
pub fn analysis_page(
    analysis: &str,
    cumulative_chart: &RenderedChart,
    daily_chart: &RenderedChart,
) -> String {
    format!(
        r#"<html>
<body>
    <h1>Portfolio Analysis</h1>
    <pre>{analysis}</pre>
    <h2>Cumulative Returns</h2>
    <img src="{cumulative}" alt="Cumulative Returns">
    <h2>Daily Returns</h2>
    <img src="{daily}" alt="Daily Returns">
</body>
</html>"#,
        analysis = escape(analysis),
        cumulative = data_uri(cumulative_chart),
        daily = data_uri(daily_chart),
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(bytes: &[u8]) -> RenderedChart {
        RenderedChart {
            bytes: bytes.to_vec(),
            mime: "image/svg+xml",
        }
    }

    #[test]
    fn page_embeds_analysis_and_both_charts() {
        let page = analysis_page("Looks healthy.", &chart(b"<svg/>"), &chart(b"<svg/>"));

        assert!(page.contains("<h1>Portfolio Analysis</h1>"));
        assert!(page.contains("Looks healthy."));
        assert_eq!(page.matches("data:image/svg+xml;base64,").count(), 2);
    }

    #[test]
    fn analysis_markup_is_escaped() {
        let page = analysis_page("<script>alert(1)</script>", &chart(b"x"), &chart(b"x"));
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn data_uri_round_trips_bytes() {
        let uri = data_uri(&chart(b"<svg/>"));
        assert_eq!(uri, format!("data:image/svg+xml;base64,{}", STANDARD.encode(b"<svg/>")));
    }
}
