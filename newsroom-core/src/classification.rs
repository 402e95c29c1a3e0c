use crate::top_stories::ClassificationResult;

/// One numbered input headline the classification prompt offered the
/// model, carried alongside enough context to validate its reply.
#[derive(Debug, Clone)]
pub struct Headline {
    pub item_id: String,
    pub title: String,
    pub source_name: String,
}

const VALID_LABELS: &[&str] = &["BREAKING", "DEVELOPING", "TOP"];

/// Prose openings the reason-validator rejects once the reason is long
/// enough to read as commentary rather than a tight label.
const REJECTED_PROSE_PREFIXES: &[&str] = &["according to", "the ", "sources say", "reports indicate", "it appears", "analysts say"];

/// Strictly validates a parsed reason string: no source-name mentions,
/// no markdown asterisks, no verbatim 20-char headline prefix, under 80
/// characters, and no long prose-style opener. A reason failing any rule
/// becomes empty; the line itself still survives, only its reason is blanked.
fn validate_reason(raw: &str, headline: &Headline) -> String {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.len() > 80 {
        return String::new();
    }
    if trimmed.contains('*') {
        return String::new();
    }
    if !headline.source_name.is_empty() && trimmed.to_lowercase().contains(&headline.source_name.to_lowercase()) {
        return String::new();
    }

    let title_prefix: String = headline.title.chars().take(20).collect();
    if title_prefix.chars().count() == 20 && trimmed.to_lowercase().contains(&title_prefix.to_lowercase()) {
        return String::new();
    }

    let lower = trimmed.to_lowercase();
    for prefix in REJECTED_PROSE_PREFIXES {
        if lower.starts_with(prefix) && trimmed.len() > 40 {
            return String::new();
        }
    }

    trimmed.to_string()
}

fn normalize_label(raw: &str) -> Option<&'static str> {
    let upper = raw.trim().to_uppercase();
    VALID_LABELS.iter().find(|label| **label == upper).copied()
}

/// Parses the model's `LABEL|number|short-reason` lines. Unknown labels,
/// unparsable numbers, and out-of-range numbers drop the whole line;
/// everything else survives with its reason independently validated.
pub fn parse_pipe_format(raw: &str, headlines: &[Headline]) -> Vec<ClassificationResult> {
    let mut results = Vec::new();

    for line in raw.lines() {
        let parts: Vec<&str> = line.splitn(3, '|').collect();
        if parts.len() != 3 {
            continue;
        }

        let Some(label) = normalize_label(parts[0]) else {
            continue;
        };

        let Ok(number) = parts[1].trim().parse::<usize>() else {
            continue;
        };
        if number < 1 || number > headlines.len() {
            continue;
        }

        let headline = &headlines[number - 1];
        let reason = validate_reason(parts[2], headline);

        results.push(ClassificationResult {
            item_id: headline.item_id.clone(),
            title: headline.title.clone(),
            label: label.to_string(),
            reason,
        });
    }

    results
}

/// Fallback for when the pipe-format parse yields zero entries: aligns
/// markdown list items to headlines by a 20-char title-prefix match or a
/// source-name substring match.
pub fn parse_markdown_fallback(raw: &str, headlines: &[Headline]) -> Vec<ClassificationResult> {
    let mut results = Vec::new();

    for line in raw.lines() {
        let trimmed = line.trim().trim_start_matches(['-', '*', '•']).trim();
        if trimmed.is_empty() {
            continue;
        }
        let lower = trimmed.to_lowercase();

        for headline in headlines {
            let title_prefix: String = headline.title.chars().take(20).collect();
            let matches_title = !title_prefix.is_empty() && lower.contains(&title_prefix.to_lowercase());
            let matches_source = !headline.source_name.is_empty() && lower.contains(&headline.source_name.to_lowercase());

            if matches_title || matches_source {
                results.push(ClassificationResult {
                    item_id: headline.item_id.clone(),
                    title: headline.title.clone(),
                    label: "TOP".to_string(),
                    reason: String::new(),
                });
                break;
            }
        }
    }

    results
}

/// Top-level entry point: try the strict pipe format first, and only fall
/// back to markdown alignment when it yields nothing.
pub fn parse_classification_response(raw: &str, headlines: &[Headline]) -> Vec<ClassificationResult> {
    let pipe_results = parse_pipe_format(raw, headlines);
    if !pipe_results.is_empty() {
        return pipe_results;
    }
    parse_markdown_fallback(raw, headlines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headline(id: &str, title: &str, source: &str) -> Headline {
        Headline { item_id: id.to_string(), title: title.to_string(), source_name: source.to_string() }
    }

    #[test]
    fn rejects_reason_containing_source_name() {
        let headlines = vec![
            headline("a", "irrelevant", "irrelevant"),
            headline("b", "irrelevant", "irrelevant"),
            headline("c", "irrelevant", "irrelevant"),
            headline("d", "irrelevant", "irrelevant"),
            headline("e", "major event unfolds overnight", "CBS News"),
        ];
        let results = parse_pipe_format("BREAKING|5|CBS News reports major event", &headlines);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].reason, "");
    }

    #[test]
    fn drops_lines_with_unknown_label_or_out_of_range_number() {
        let headlines = vec![headline("a", "some title", "Reuters")];
        let results = parse_pipe_format("WEIRD|1|a reason\nBREAKING|9|another reason", &headlines);
        assert!(results.is_empty());
    }

    #[test]
    fn falls_back_to_markdown_when_pipe_parse_empty() {
        let headlines = vec![headline("a", "Markets rally on rate cut hopes", "Reuters")];
        let results = parse_markdown_fallback("- Markets rally on rate cut hopes continues\n", &headlines);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].item_id, "a");
    }
}
