pub mod dict_lsp;
pub mod dictionary;
pub mod trie;
