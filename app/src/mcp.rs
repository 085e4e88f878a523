use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reffind_core::{LineCache, MatchResult, ReferenceResolver, SkipSet};
use reffind_fs::TrackedTree;
use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
    transport::stdio,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tokio::task;
use tracing::{error, info};

use crate::cli::default_root;
use crate::settings::Settings;

#[derive(Clone)]
pub struct ReferenceServer {
    root: PathBuf,
    skip: Arc<SkipSet>,
    cache: Arc<LineCache>,
    tool_router: ToolRouter<ReferenceServer>,
}

impl ReferenceServer {
    fn internal_error(code: &str, message: impl Into<String>) -> McpError {
        let full = format!("{code}: {}", message.into());
        McpError::internal_error(full, None)
    }

    /// Runs `lookup` against a fresh tree snapshot on the blocking pool.
    async fn resolve<F>(&self, item_path: Option<String>, lookup: F) -> Result<CallToolResult, McpError>
    where
        F: FnOnce(&ReferenceResolver<'_, LineCache>, &TrackedTree, &Path) -> reffind_core::ResolveResult<MatchResult>
            + Send
            + 'static,
    {
        let root = self.root.clone();
        let skip = Arc::clone(&self.skip);
        let cache = Arc::clone(&self.cache);

        let found = task::spawn_blocking(move || {
            let tree = TrackedTree::discover(&root)
                .map_err(|e| Self::internal_error("tree_failed", e.to_string()))?;
            let item = item_path
                .map(|p| tree.absolute(Path::new(&p)))
                .unwrap_or_default();
            let resolver = ReferenceResolver::new(&*cache, &skip);
            lookup(&resolver, &tree, &item)
                .map_err(|e| Self::internal_error("reference_not_found", e.to_string()))
        })
        .await
        .map_err(|e| Self::internal_error("resolve_task_failed", e.to_string()))??;

        let text = serde_json::to_string(&found)
            .map_err(|e| Self::internal_error("encode_failed", e.to_string()))?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct FindReferenceArgs {
    /// Filename or keyword to locate.
    pub reference: String,
    /// File of the requirement item itself, excluded from the search.
    #[serde(default)]
    pub item_path: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
pub struct FindFileReferenceArgs {
    /// Path relative to the tree root.
    pub path: String,
    /// Optional keyword to locate inside the file.
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub item_path: Option<String>,
}

#[tool_router]
impl ReferenceServer {
    pub fn new(root: PathBuf, skip: SkipSet) -> Self {
        Self {
            root,
            skip: Arc::new(skip),
            cache: Arc::new(LineCache::new()),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Resolve a requirement's external reference. Matches a tracked filename exactly, or finds the first tracked file containing the reference as a whole token and returns its relative path and 1-based line number."
    )]
    pub async fn find_reference(
        &self,
        Parameters(args): Parameters<FindReferenceArgs>,
    ) -> Result<CallToolResult, McpError> {
        let reference = args.reference;
        self.resolve(args.item_path, move |resolver, tree, item| {
            resolver.find_ref(&reference, tree, item)
        })
        .await
    }

    #[tool(
        description = "Confirm that a path (relative to the tree root) is a tracked file. With a keyword, also return the first line in that file containing the keyword as a whole token."
    )]
    pub async fn find_file_reference(
        &self,
        Parameters(args): Parameters<FindFileReferenceArgs>,
    ) -> Result<CallToolResult, McpError> {
        let path = args.path;
        let keyword = args.keyword;
        self.resolve(args.item_path, move |resolver, tree, item| {
            resolver.find_file_ref(&path, tree.root(), tree, item, keyword.as_deref())
        })
        .await
    }
}

#[tool_handler]
impl ServerHandler for ReferenceServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Resolves external references from requirement items to tracked project files. Use `find_reference` for a filename or keyword and `find_file_reference` for a known relative path."
                    .to_string(),
            ),
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
        }
    }
}

pub async fn run_server(root: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let root = root.unwrap_or_else(default_root);
    let root = root.canonicalize().unwrap_or(root);
    let skip = Settings::load(&root).skip_set(&[], false);

    info!("reffind MCP server starting");
    info!("root: {}", root.display());

    let server = ReferenceServer::new(root, skip);

    let service = server
        .serve(stdio())
        .await
        .inspect_err(|e| error!("reffind MCP serve error: {e:?}"))?;

    service.waiting().await?;

    Ok(())
}
