use thiserror::Error;

/// Number of symbols a node can branch on: ten digits, 26 lowercase
/// letters and one slot shared by underscore and space.
pub const ALPHA_SIZE: usize = 37;

pub const DEFAULT_MAX_SUGGESTIONS: usize = 3;

/// Maps a character onto its child slot, or `None` when the character is not
/// part of the alphabet. Uppercase letters are rejected; callers lowercase
/// first.
pub fn symbol_index(ch: char) -> Option<usize> {
    match ch {
        '0'..='9' => Some(ch as usize - '0' as usize),
        'a'..='z' => Some(ch as usize - 'a' as usize + 10),
        '_' | ' ' => Some(36),
        _ => None,
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrieError {
    #[error("Invalid entry: {word:?} (unexpected {found:?} after {prefix:?})")]
    InvalidEntry {
        word: String,
        prefix: String,
        found: char,
    },
}

#[derive(Debug, Clone)]
pub struct TrieNode {
    prefix: String,
    children: [Option<Box<TrieNode>>; ALPHA_SIZE],
    is_word: bool,
}

impl TrieNode {
    fn new(prefix: String) -> Self {
        TrieNode {
            prefix,
            children: std::array::from_fn(|_| None),
            is_word: false,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_word(&self) -> bool {
        self.is_word
    }

    fn child(&self, ch: char) -> Option<&TrieNode> {
        let index = symbol_index(ch)?;
        self.children[index].as_deref()
    }

    fn children(&self) -> impl Iterator<Item = &TrieNode> {
        self.children.iter().filter_map(|c| c.as_deref())
    }

    /// Collects at most `max_count` words at or below this node, visiting
    /// children in ascending symbol order.
    pub fn suggest(&self, max_count: usize) -> Vec<String> {
        let mut suggestions = Vec::new();
        self.collect_words(max_count, &mut suggestions);
        suggestions
    }

    /// Like `suggest`, but skips this node's own word.
    pub fn suggest_below(&self, max_count: usize) -> Vec<String> {
        let mut suggestions = Vec::new();
        self.collect_children(max_count, &mut suggestions);
        suggestions
    }

    fn collect_words(&self, max_count: usize, suggestions: &mut Vec<String>) {
        if suggestions.len() >= max_count {
            return;
        }

        if self.is_word {
            suggestions.push(self.prefix.clone());
            if suggestions.len() >= max_count {
                return;
            }
        }

        self.collect_children(max_count, suggestions);
    }

    fn collect_children(&self, max_count: usize, suggestions: &mut Vec<String>) {
        for child in self.children() {
            if suggestions.len() >= max_count {
                break;
            }
            child.collect_words(max_count, suggestions);
        }
    }

    fn count_nodes(&self) -> usize {
        1 + self.children().map(TrieNode::count_nodes).sum::<usize>()
    }

    fn count_words(&self) -> usize {
        let own = if self.is_word { 1 } else { 0 };
        own + self.children().map(TrieNode::count_words).sum::<usize>()
    }
}

/// Result of walking a query through the trie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Every query character matched a node.
    Found {
        is_word: bool,
        completions: Vec<String>,
    },
    /// The walk stopped early; suggestions come from the last node reached.
    NotFound { suggestions: Vec<String> },
}

impl SearchOutcome {
    pub fn into_lines(self, query: &str) -> Vec<String> {
        let mut lines = Vec::new();
        match self {
            SearchOutcome::Found {
                is_word,
                completions,
            } => {
                if is_word {
                    lines.push(format!("{} was found", query));
                }
                lines.push("Auto Complete: ".to_string());
                lines.extend(completions);
            }
            SearchOutcome::NotFound { suggestions } => {
                lines.push(format!("{} not found:", query));
                lines.push("Did you mean:".to_string());
                lines.extend(suggestions);
            }
        }
        lines
    }
}

/// Deep copies through `Clone`; each node owns its children outright.
#[derive(Debug, Clone)]
pub struct Trie {
    root: TrieNode,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    pub fn new() -> Self {
        Trie {
            root: TrieNode::new(String::new()),
        }
    }

    pub fn root(&self) -> &TrieNode {
        &self.root
    }

    pub fn node_count(&self) -> usize {
        self.root.count_nodes()
    }

    pub fn word_count(&self) -> usize {
        self.root.count_words()
    }

    /// Adds `word` to the dictionary. The whole word is checked against the
    /// alphabet before any node is created, so a rejected word leaves the
    /// tree untouched. The error carries the valid prefix read so far.
    pub fn insert(&mut self, word: &str) -> Result<(), TrieError> {
        let mut indices = Vec::with_capacity(word.len());
        for (pos, ch) in word.char_indices() {
            match symbol_index(ch) {
                Some(index) => indices.push((index, ch)),
                None => {
                    return Err(TrieError::InvalidEntry {
                        word: word.to_string(),
                        prefix: word[..pos].to_string(),
                        found: ch,
                    })
                }
            }
        }

        let mut node = &mut self.root;
        for (index, ch) in indices {
            let TrieNode {
                prefix, children, ..
            } = node;
            node = &mut **children[index]
                .get_or_insert_with(|| Box::new(TrieNode::new(format!("{}{}", prefix, ch))));
        }
        node.is_word = true;
        Ok(())
    }

    pub fn lookup(&self, query: &str, max_count: usize) -> SearchOutcome {
        let mut node = &self.root;
        for ch in query.chars().map(|c| c.to_ascii_lowercase()) {
            match node.child(ch) {
                Some(child) => node = child,
                None => {
                    return SearchOutcome::NotFound {
                        suggestions: node.suggest(max_count),
                    }
                }
            }
        }

        // The matched word is reported on its own line, so completions only
        // come from below it.
        SearchOutcome::Found {
            is_word: node.is_word,
            completions: node.suggest_below(max_count),
        }
    }

    /// Exact lookup rendered as display lines, with autocomplete on a hit
    /// and "did you mean" suggestions on a miss.
    pub fn search(&self, query: &str) -> Vec<String> {
        self.search_with_limit(query, DEFAULT_MAX_SUGGESTIONS)
    }

    pub fn search_with_limit(&self, query: &str, max_count: usize) -> Vec<String> {
        self.lookup(query, max_count).into_lines(query)
    }

    /// Walks to the node for `partial` without requiring it to be a word.
    /// `partial` is matched as given.
    pub fn find_prefix_node(&self, partial: &str) -> Option<&TrieNode> {
        let mut node = &self.root;
        for ch in partial.chars() {
            node = node.child(ch)?;
        }
        Some(node)
    }

    /// Dropdown candidates for text typed so far.
    pub fn complete(&self, text: &str, max_count: usize) -> Vec<String> {
        let lower = text.to_ascii_lowercase();
        if lower.is_empty() {
            return Vec::new();
        }
        match self.find_prefix_node(&lower) {
            Some(node) => node.suggest(max_count),
            None => Vec::new(),
        }
    }
}
