use regex::Regex;
use std::sync::OnceLock;
use tower_lsp::lsp_types::*;

/// Characters a dictionary word can be typed with; uppercase is accepted
/// here and lowercased by the trie lookups.
pub fn valid_token_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn word_pattern() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"[A-Za-z0-9_]+").expect("word pattern"))
}

pub fn get_word_prefix(current_line: &str, character: i32) -> String {
    let mut prefix = Vec::new();
    let line: Vec<char> = current_line.chars().collect();
    let mut i = (character - 1).min(line.len() as i32 - 1);
    while i >= 0 && valid_token_char(line[i as usize]) {
        prefix.push(line[i as usize]);
        i -= 1;
    }
    prefix.reverse();
    prefix.iter().collect()
}

/// The whole word touching `character`, if any.
pub fn get_word_at(current_line: &str, character: usize) -> Option<String> {
    let byte_pos = current_line
        .char_indices()
        .nth(character)
        .map(|(i, _)| i)
        .unwrap_or(current_line.len());
    word_pattern()
        .find_iter(current_line)
        .find(|m| m.start() <= byte_pos && byte_pos <= m.end())
        .map(|m| m.as_str().to_string())
}

pub fn words_to_completion_items(words: Vec<String>, completions: &mut Vec<CompletionItem>) {
    // Keep the trie's traversal order in the editor's sorted list.
    let items: Vec<CompletionItem> = words
        .into_iter()
        .enumerate()
        .map(|(rank, word)| CompletionItem {
            label: word.clone(),
            kind: Some(CompletionItemKind::TEXT),
            sort_text: Some(format!("{:04}", rank)),
            filter_text: Some(word),
            ..CompletionItem::default()
        })
        .collect();
    completions.extend(items);
}

pub fn lines_to_hover(lines: Vec<String>) -> Hover {
    let value = lines
        .iter()
        .map(|line| format!("- {}", line.trim_end()))
        .collect::<Vec<String>>()
        .join("\n");
    Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }),
        range: None,
    }
}
