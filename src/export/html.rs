//! HTML Document Writer
//! Standalone page that renders a Vega-Lite document with vega-embed.

use serde_json::{json, Value};

use super::{EmbedOptions, ExportError};

const VEGA_URL: &str = "https://cdn.jsdelivr.net/npm/vega@5";
const VEGA_LITE_URL: &str = "https://cdn.jsdelivr.net/npm/vega-lite@5.20.1";
const VEGA_EMBED_URL: &str = "https://cdn.jsdelivr.net/npm/vega-embed@6";

/// Writes the page around a serialized chart.
pub struct HtmlExporter;

impl HtmlExporter {
    /// Full document for `spec`, with an optional pre-rendered SVG for readers without scripts.
    pub fn document(
        spec: &Value,
        options: &EmbedOptions,
        fallback_svg: Option<&str>,
    ) -> Result<String, ExportError> {
        let spec_json = script_safe(&serde_json::to_string(spec)?);
        let embed_json = script_safe(&serde_json::to_string(&Self::embed_json(options))?);
        let noscript = fallback_svg
            .map(|svg| format!("  <noscript>\n{}\n  </noscript>\n", svg.trim()))
            .unwrap_or_default();

        Ok(format!(
            r##"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <style>
    #vis.vega-embed {{
      width: 100%;
      display: flex;
    }}
  </style>
  <script type="text/javascript" src="{vega}"></script>
  <script type="text/javascript" src="{vega_lite}"></script>
  <script type="text/javascript" src="{vega_embed}"></script>
</head>
<body>
  <div id="vis"></div>
{noscript}  <script type="text/javascript">
    (function(vegaEmbed) {{
      var spec = {spec_json};
      var embedOpt = {embed_json};

      function showError(el, error) {{
        el.innerHTML = '<div style="color:red;"><p>JavaScript Error: ' + error.message + '</p></div>';
        throw error;
      }}
      const el = document.getElementById('vis');
      vegaEmbed("#vis", spec, embedOpt).catch(error => showError(el, error));
    }})(vegaEmbed);
  </script>
</body>
</html>
"##,
            vega = VEGA_URL,
            vega_lite = VEGA_LITE_URL,
            vega_embed = VEGA_EMBED_URL,
        ))
    }

    /// Options handed to vega-embed.
    pub fn embed_json(options: &EmbedOptions) -> Value {
        json!({
            "renderer": options.renderer.as_str(),
            "actions": options.actions,
            "mode": "vega-lite",
        })
    }
}

/// Keep embedded JSON from closing the surrounding script element.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::EmbedRenderer;

    #[test]
    fn test_document_embeds_spec_and_options() {
        let options = EmbedOptions {
            renderer: EmbedRenderer::Svg,
            ..EmbedOptions::default()
        };
        let html = HtmlExporter::document(&json!({"mark": "bar"}), &options, None).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"var spec = {"mark":"bar"};"#));
        assert!(html.contains(r#""renderer":"svg""#));
        assert!(html.contains(VEGA_EMBED_URL));
        assert!(html.contains(r##"vegaEmbed("#vis", spec, embedOpt)"##));
        assert!(html.trim_end().ends_with("</html>"));
        assert!(!html.contains("<noscript>"));
    }

    #[test]
    fn test_fallback_svg_goes_in_noscript() {
        let html = HtmlExporter::document(
            &json!({}),
            &EmbedOptions::default(),
            Some("<svg></svg>\n"),
        )
        .unwrap();
        assert!(html.contains("<noscript>\n<svg></svg>\n  </noscript>"));
    }

    #[test]
    fn test_script_close_tag_is_escaped() {
        let html = HtmlExporter::document(
            &json!({"title": "</script><b>"}),
            &EmbedOptions::default(),
            None,
        )
        .unwrap();
        assert!(!html.contains("</script><b>"));
        assert!(html.contains(r#"<\/script><b>"#));
    }
}
