const SECTION_MARKERS: [&str; 3] = ["ingredients:", "inci:", "composition:"];

/// Splits extracted label text into raw ingredient strings.
///
/// Text before the first section marker (`ingredients:`, `inci:`,
/// `composition:`) is ignored; without a marker the whole text is used.
/// Entries of two characters or fewer are treated as OCR noise.
pub fn parse_label_text(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let section = SECTION_MARKERS
        .iter()
        .find_map(|marker| {
            lowered
                .find(marker)
                .map(|index| &lowered[index + marker.len()..])
        })
        .unwrap_or(lowered.as_str());

    section
        .split([',', ';', '\n'])
        .map(str::trim)
        .filter(|entry| entry.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_after_the_ingredients_marker() {
        let text = "Hydrating Serum 30ml\nIngredients: Aqua, Glycerin; Niacinamide\nParfum.";
        assert_eq!(
            parse_label_text(text),
            vec!["aqua", "glycerin", "niacinamide", "parfum."]
        );
    }

    #[test]
    fn uses_whole_text_without_a_marker() {
        assert_eq!(
            parse_label_text("Aqua, Methylparaben"),
            vec!["aqua", "methylparaben"]
        );
    }

    #[test]
    fn drops_short_fragments() {
        assert_eq!(
            parse_label_text("INCI: aqua, , e, ci, zinc"),
            vec!["aqua", "zinc"]
        );
    }
}
