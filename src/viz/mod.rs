//! Visualization artifacts built from the final risk table.
//!
//! Everything here is a read-only consumer: charts and the map render
//! whatever the risk table says, with no computation of their own beyond
//! scaling to pixels.

pub mod charts;
pub mod map;

/// Escapes text for embedding in SVG/HTML element content and attributes.
pub(crate) fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("Mare Island & <Napa>"), "Mare Island &amp; &lt;Napa&gt;");
        assert_eq!(escape_xml(r#"O'Brien "Pier""#), "O&#39;Brien &quot;Pier&quot;");
    }
}
