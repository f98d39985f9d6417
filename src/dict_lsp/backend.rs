use super::util::*;
use crate::trie::Trie;

use hashbrown::HashMap;
use serde_json::Value;
use simple_log::*;
use tokio::sync::Mutex;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::*;

pub const SEARCH_COMMAND: &str = "dictionary.search";

/// Serves a finished dictionary. The trie is never written after startup,
/// so requests read it without locking.
#[derive(Debug)]
pub struct Backend {
    documents: Mutex<HashMap<String, String>>,
    trie: Trie,
    max_suggestions: usize,
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, _: InitializeParams) -> Result<InitializeResult> {
        info!(
            "initialize with {} words, {} nodes",
            self.trie.word_count(),
            self.trie.node_count()
        );
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    ..CompletionOptions::default()
                }),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![SEARCH_COMMAND.to_string()],
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                }),
                ..ServerCapabilities::default()
            },
            ..InitializeResult::default()
        })
    }

    async fn shutdown(&self) -> Result<()> {
        info!("shutdown trie-dict");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let mut document_lock = self.documents.lock().await;
        document_lock.insert(
            params.text_document.uri.to_string(),
            params.text_document.text,
        );
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let mut document_lock = self.documents.lock().await;
        document_lock.remove(&params.text_document.uri.to_string());
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let mut document_lock = self.documents.lock().await;
        if let Some(last_change) = params.content_changes.into_iter().last() {
            document_lock.insert(params.text_document.uri.to_string(), last_change.text);
        }
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let position = params.text_document_position.position;
        let uri = params.text_document_position.text_document.uri.to_string();

        let mut completions = Vec::new();
        if let Some(current_line) = self.get_line(&uri, position.line).await {
            let prefix = get_word_prefix(&current_line, position.character as i32);
            let words = self.trie.complete(&prefix, self.max_suggestions);
            debug!("complete {:?} -> {:?}", prefix, words);
            words_to_completion_items(words, &mut completions);
        }
        Ok(Some(CompletionResponse::Array(completions)))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let position = params.text_document_position_params.position;
        let uri = params
            .text_document_position_params
            .text_document
            .uri
            .to_string();

        let word = match self.get_line(&uri, position.line).await {
            Some(line) => get_word_at(&line, position.character as usize),
            None => None,
        };
        Ok(word.map(|w| lines_to_hover(self.search(&w))))
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        if params.command != SEARCH_COMMAND {
            return Err(Error::invalid_params(format!(
                "unknown command {}",
                params.command
            )));
        }
        let query = match params.arguments.first() {
            Some(Value::String(query)) => query,
            _ => {
                return Err(Error::invalid_params(
                    "dictionary.search expects a query string",
                ))
            }
        };
        Ok(Some(Value::from(self.search(query))))
    }
}

impl Backend {
    pub fn new(trie: Trie, max_suggestions: usize) -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
            trie,
            max_suggestions,
        }
    }

    fn search(&self, query: &str) -> Vec<String> {
        self.trie.search_with_limit(query, self.max_suggestions)
    }

    async fn get_line(&self, uri: &str, line: u32) -> Option<String> {
        let document_lock = self.documents.lock().await;
        let content = document_lock.get(uri)?;
        content.split('\n').nth(line as usize).map(|l| l.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn backend() -> Backend {
        let mut trie = Trie::new();
        for w in ["cat", "catalog", "catch", "dog"] {
            trie.insert(w).unwrap();
        }
        Backend::new(trie, 3)
    }

    fn uri() -> Url {
        Url::parse("file:///tmp/notes.txt").unwrap()
    }

    async fn open(backend: &Backend, text: &str) {
        backend
            .did_open(DidOpenTextDocumentParams {
                text_document: TextDocumentItem {
                    uri: uri(),
                    language_id: "plaintext".to_string(),
                    version: 1,
                    text: text.to_string(),
                },
            })
            .await;
    }

    fn position(line: u32, character: u32) -> TextDocumentPositionParams {
        TextDocumentPositionParams {
            text_document: TextDocumentIdentifier { uri: uri() },
            position: Position { line, character },
        }
    }

    #[tokio::test]
    async fn test_completion() {
        let backend = backend();
        open(&backend, "first line\nmy Cat").await;

        let response = backend
            .completion(CompletionParams {
                text_document_position: position(1, 6),
                work_done_progress_params: WorkDoneProgressParams::default(),
                partial_result_params: PartialResultParams::default(),
                context: None,
            })
            .await
            .unwrap();
        let labels: Vec<String> = match response {
            Some(CompletionResponse::Array(items)) => items.into_iter().map(|i| i.label).collect(),
            _ => Vec::new(),
        };
        assert_eq!(vec!["cat", "catalog", "catch"], labels);
    }

    async fn complete_at(backend: &Backend, line: u32, character: u32) -> Vec<String> {
        let response = backend
            .completion(CompletionParams {
                text_document_position: position(line, character),
                work_done_progress_params: WorkDoneProgressParams::default(),
                partial_result_params: PartialResultParams::default(),
                context: None,
            })
            .await
            .unwrap();
        match response {
            Some(CompletionResponse::Array(items)) => items.into_iter().map(|i| i.label).collect(),
            _ => Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_completion_after_change() {
        let backend = backend();
        open(&backend, "ca").await;
        assert_eq!(vec!["cat", "catalog", "catch"], complete_at(&backend, 0, 2).await);

        backend
            .did_change(DidChangeTextDocumentParams {
                text_document: VersionedTextDocumentIdentifier {
                    uri: uri(),
                    version: 2,
                },
                content_changes: vec![TextDocumentContentChangeEvent {
                    range: None,
                    range_length: None,
                    text: "ca\ndo".to_string(),
                }],
            })
            .await;
        assert_eq!(vec!["dog"], complete_at(&backend, 1, 2).await);
        assert_eq!(vec!["cat", "catalog", "catch"], complete_at(&backend, 0, 2).await);
    }

    #[tokio::test]
    async fn test_close_drops_document() {
        let backend = backend();
        open(&backend, "do").await;
        assert_eq!(vec!["dog"], complete_at(&backend, 0, 2).await);

        backend
            .did_close(DidCloseTextDocumentParams {
                text_document: TextDocumentIdentifier { uri: uri() },
            })
            .await;
        assert!(complete_at(&backend, 0, 2).await.is_empty());
    }

    #[tokio::test]
    async fn test_completion_unknown_document() {
        let backend = backend();
        let response = backend
            .completion(CompletionParams {
                text_document_position: position(0, 1),
                work_done_progress_params: WorkDoneProgressParams::default(),
                partial_result_params: PartialResultParams::default(),
                context: None,
            })
            .await
            .unwrap();
        assert!(matches!(response, Some(CompletionResponse::Array(items)) if items.is_empty()));
    }

    #[tokio::test]
    async fn test_hover() {
        let backend = backend();
        open(&backend, "a dgo here").await;

        let hover = backend
            .hover(HoverParams {
                text_document_position_params: position(0, 3),
                work_done_progress_params: WorkDoneProgressParams::default(),
            })
            .await
            .unwrap()
            .unwrap();
        match hover.contents {
            HoverContents::Markup(content) => {
                assert_eq!("- dgo not found:\n- Did you mean:\n- dog", content.value);
            }
            _ => panic!("expected markup"),
        }
    }

    #[tokio::test]
    async fn test_execute_search() {
        let backend = backend();
        let value = backend
            .execute_command(ExecuteCommandParams {
                command: SEARCH_COMMAND.to_string(),
                arguments: vec![Value::from("cat")],
                work_done_progress_params: WorkDoneProgressParams::default(),
            })
            .await
            .unwrap();
        assert_eq!(
            Some(serde_json::json!(["cat was found", "Auto Complete: ", "catalog", "catch"])),
            value
        );

        let result = backend
            .execute_command(ExecuteCommandParams {
                command: SEARCH_COMMAND.to_string(),
                arguments: vec![],
                work_done_progress_params: WorkDoneProgressParams::default(),
            })
            .await;
        assert!(result.is_err());
    }
}
