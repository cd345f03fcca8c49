/// Normalize an actor name captured from a chat line.
///
/// Strips game glyphs (private-use code points the client uses for icons),
/// surrounding whitespace and sentence punctuation, collapses runs of
/// whitespace and drops a leading article, so "The  goblin." and "goblin"
/// name the same actor.
pub fn clean_name(raw: &str) -> String {
    let without_glyphs: String = raw.chars().filter(|c| !is_private_use(*c)).collect();

    let collapsed = without_glyphs.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_end_matches(['.', '!', ',', ':']).trim_end();

    let stripped = ["The ", "the "]
        .iter()
        .find_map(|article| trimmed.strip_prefix(*article))
        .unwrap_or(trimmed);

    stripped.trim().to_string()
}

fn is_private_use(c: char) -> bool {
    matches!(c, '\u{E000}'..='\u{F8FF}')
}
