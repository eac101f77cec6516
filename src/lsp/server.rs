//! Core LSP server implementation.

use crate::analysis::Analyzer;
use crate::color::Rgba;
use crate::config::loader::config_from_options;
use crate::config::LensConfig;
use crate::document::Document;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};

use super::convert::{
    line_prefix, to_color_decoration, to_color_information, to_completion_item, to_symbol_information,
    ColorDecorations, ColorDecorationsParams,
};
use super::scheduler::DecorationScheduler;

/// The Stylus Language Server
pub struct StylusLanguageServer {
    client: Client,
    /// Document state tracking for open files
    documents: RwLock<HashMap<Url, String>>,
    /// Replaced once `initialize` delivers the editor's settings
    analyzer: RwLock<Arc<Analyzer>>,
    scheduler: DecorationScheduler,
    /// Settings used when the editor sends none
    base_config: LensConfig,
}

impl StylusLanguageServer {
    pub fn new(client: Client, base_config: LensConfig) -> Self {
        Self {
            client,
            documents: RwLock::new(HashMap::new()),
            scheduler: DecorationScheduler::new(Duration::from_millis(base_config.colors.debounce_ms)),
            analyzer: RwLock::new(Arc::new(Analyzer::default())),
            base_config,
        }
    }

    fn analyzer(&self) -> Arc<Analyzer> {
        Arc::clone(&self.analyzer.read().unwrap())
    }

    fn text(&self, uri: &Url) -> Option<String> {
        self.documents.read().unwrap().get(uri).cloned()
    }

    /// Build the analyzer from `initializationOptions`, or from the base
    /// settings when there are none. Invalid settings fall back to the
    /// defaults.
    async fn configure(&self, options: Option<serde_json::Value>) {
        let config = match options {
            None | Some(serde_json::Value::Null) => Ok(self.base_config.clone()),
            options => config_from_options(options),
        };
        let analyzer = match config {
            Ok(config) => Analyzer::from_config(config).map_err(|err| err.to_string()),
            Err(err) => Err(err.to_string()),
        };

        let analyzer = match analyzer {
            Ok(analyzer) => analyzer,
            Err(message) => {
                tracing::warn!("invalid settings, using defaults: {}", message);
                self.client.show_message(MessageType::WARNING, format!("stylus-lens: {}", message)).await;
                Analyzer::default()
            }
        };

        self.scheduler.set_delay(Duration::from_millis(analyzer.config().colors.debounce_ms));
        *self.analyzer.write().unwrap() = Arc::new(analyzer);
    }

    /// Debounced swatch refresh for one document
    fn schedule_decorations(&self, uri: Url, text: String) {
        let analyzer = self.analyzer();
        if !analyzer.config().colors.decorations {
            return;
        }

        let client = self.client.clone();
        let target = uri.clone();
        self.scheduler.schedule(uri, async move {
            let params = {
                let document = Document::new(&text);
                let decorations = analyzer
                    .decorations(&text)
                    .into_iter()
                    .map(|decoration| to_color_decoration(decoration, &document))
                    .collect();
                ColorDecorationsParams { uri: target, decorations }
            };
            tracing::debug!(uri = %params.uri, count = params.decorations.len(), "publishing decorations");
            client.send_notification::<ColorDecorations>(params).await;
        });
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for StylusLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        self.configure(params.initialization_options).await;

        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: "stylus-lens".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec!["@".to_string(), "$".to_string(), ":".to_string()]),
                    ..Default::default()
                }),
                document_symbol_provider: Some(OneOf::Left(true)),
                color_provider: Some(ColorProviderCapability::Simple(true)),
                ..Default::default()
            },
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client.log_message(MessageType::INFO, "Stylus LSP initialized").await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let text = params.text_document.text;

        self.documents.write().unwrap().insert(uri.clone(), text.clone());
        self.schedule_decorations(uri, text);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;

        // Full sync: the first change is the whole document
        if let Some(change) = params.content_changes.into_iter().next() {
            self.documents.write().unwrap().insert(uri.clone(), change.text.clone());
            self.schedule_decorations(uri, change.text);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;

        self.documents.write().unwrap().remove(&uri);
        self.scheduler.cancel(&uri);
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let pos = params.text_document_position.position;

        let Some(text) = self.text(uri) else {
            return Ok(None);
        };

        let items = {
            let document = Document::new(&text);
            let current_word = line_prefix(document.line(pos.line as usize), pos.character);
            self.analyzer().completions(&text, current_word)
        };

        Ok(Some(CompletionResponse::Array(items.into_iter().map(to_completion_item).collect())))
    }

    async fn document_symbol(&self, params: DocumentSymbolParams) -> Result<Option<DocumentSymbolResponse>> {
        let uri = &params.text_document.uri;

        let Some(text) = self.text(uri) else {
            return Ok(None);
        };

        let document = Document::new(&text);
        let symbols: Vec<SymbolInformation> = self
            .analyzer()
            .symbols(&text)
            .into_iter()
            .map(|symbol| to_symbol_information(symbol, uri, &document))
            .collect();

        Ok(Some(DocumentSymbolResponse::Flat(symbols)))
    }

    async fn document_color(&self, params: DocumentColorParams) -> Result<Vec<ColorInformation>> {
        let uri = &params.text_document.uri;

        let Some(text) = self.text(uri) else {
            return Ok(Vec::new());
        };

        let document = Document::new(&text);
        Ok(self
            .analyzer()
            .colors(&text)
            .into_iter()
            .map(|info| to_color_information(info, &document))
            .collect())
    }

    async fn color_presentation(&self, params: ColorPresentationParams) -> Result<Vec<ColorPresentation>> {
        let color = params.color;
        let rgba = Rgba::from_unit(color.red as f64, color.green as f64, color.blue as f64, color.alpha as f64);

        Ok(self
            .analyzer()
            .presentations(&rgba)
            .into_iter()
            .map(|label| ColorPresentation {
                label: label.clone(),
                text_edit: Some(TextEdit { range: params.range, new_text: label }),
                additional_text_edits: None,
            })
            .collect())
    }
}

/// Run the LSP server on stdin/stdout
pub async fn run_server(config: LensConfig) {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(|client| StylusLanguageServer::new(client, config));
    Server::new(stdin, stdout, socket).serve(service).await;
}
