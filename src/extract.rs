//! Best-effort JSON extraction from model output. Models asked for strict
//! JSON still wrap it in markdown fences or chatter around it often enough
//! that callers parse through this instead of `serde_json` directly.

/// Parse `text` as JSON, tolerating a markdown code fence and surrounding
/// prose. Empty input yields an empty object. Fails only when no JSON
/// object can be carved out at all.
pub fn extract_json(text: &str) -> Result<serde_json::Value, serde_json::Error> {
    let cleaned = strip_fence(text.trim());
    if cleaned.is_empty() {
        return Ok(serde_json::json!({}));
    }

    match serde_json::from_str(cleaned) {
        Ok(value) => Ok(value),
        Err(e) => {
            // Fall back to the outermost brace span — models sometimes
            // preface the object with prose despite instructions.
            let start = cleaned.find('{');
            let end = cleaned.rfind('}');
            if let (Some(start), Some(end)) = (start, end)
                && end > start
            {
                return serde_json::from_str(&cleaned[start..=end]);
            }
            Err(e)
        }
    }
}

/// Strip a leading ```lang fence and its closing ``` when present.
fn strip_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the language tag (anything up to the first newline)
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    body.trim().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_json() {
        let value = extract_json(r#"{"score": 7}"#).unwrap();
        assert_eq!(value["score"], 7);
    }

    #[test]
    fn empty_input_yields_empty_object() {
        assert_eq!(extract_json("").unwrap(), serde_json::json!({}));
        assert_eq!(extract_json("   ").unwrap(), serde_json::json!({}));
    }

    #[test]
    fn strips_markdown_fence() {
        let text = "```json\n{\"plan\": [\"q1\", \"q2\"]}\n```";
        let value = extract_json(text).unwrap();
        assert_eq!(value["plan"][0], "q1");

        // fence without a language tag
        let text = "```\n{\"ok\": true}\n```";
        assert_eq!(extract_json(text).unwrap()["ok"], true);
    }

    #[test]
    fn carves_object_out_of_surrounding_prose() {
        let text = "Here is the report you asked for:\n{\"verdict\": \"hire\"}\nHope it helps!";
        let value = extract_json(text).unwrap();
        assert_eq!(value["verdict"], "hire");
    }

    #[test]
    fn rejects_text_with_no_object() {
        assert!(extract_json("no json here").is_err());
        assert!(extract_json("{ broken").is_err());
    }
}
