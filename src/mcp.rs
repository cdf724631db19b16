use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::commands;
use crate::page_range::{PlanError, SelectionMode, TokenError};
use crate::pdf::{Rotation, WatermarkStyle};

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ValidatePagesRequest {
    #[schemars(description = "Path to the PDF file the pages refer to")]
    pub path: String,
    #[schemars(description = "Page specification, 1-based (e.g., '1-3,5,7-9')")]
    pub pages: String,
    #[schemars(description = "One of 'extract', 'remove', 'split_boundary', 'apply' (default: extract)")]
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PageSelectionRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Page specification, 1-based (e.g., '1-3,5,7-9')")]
    pub pages: String,
    #[schemars(description = "Output file path (default: next to the input)")]
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SplitRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Ranges, one output file each (e.g., '1-3,4-6'). Omit to split every page.")]
    #[serde(default)]
    pub ranges: Option<String>,
    #[schemars(description = "Output directory (default: the input's directory)")]
    #[serde(default)]
    pub output_dir: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RotateRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Absolute rotation in degrees: 0, 90, 180 or 270")]
    pub angle: i64,
    #[schemars(description = "Pages to rotate (default: all)")]
    #[serde(default)]
    pub pages: Option<String>,
    #[schemars(description = "Output file path (default: next to the input)")]
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WatermarkRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Watermark text")]
    pub text: String,
    #[schemars(description = "Pages to watermark (default: all)")]
    #[serde(default)]
    pub pages: Option<String>,
    #[schemars(description = "Opacity between 0 and 1 (default: 0.3)")]
    #[serde(default)]
    pub opacity: Option<f32>,
    #[schemars(description = "Output file path (default: next to the input)")]
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MergeRequest {
    #[schemars(description = "PDF files to merge, in order (at least two)")]
    pub inputs: Vec<String>,
    #[schemars(description = "Output file path (default: merged-document.pdf)")]
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ImagesRequest {
    #[schemars(description = "JPG or PNG files, one page each, in order")]
    pub images: Vec<String>,
    #[schemars(description = "Output file path (default: images-to-pdf.pdf)")]
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CompressRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Output file path (default: next to the input)")]
    #[serde(default)]
    pub output: Option<String>,
}

/// Returned instead of a result when a page selection is rejected.
#[derive(Debug, Serialize)]
pub struct SelectionErrorResult {
    pub error: String,
    pub invalid_tokens: Vec<TokenError>,
}

fn parse_mode(mode: Option<&str>) -> Result<SelectionMode> {
    match mode.unwrap_or("extract") {
        "extract" => Ok(SelectionMode::Extract),
        "remove" => Ok(SelectionMode::Remove),
        "split_boundary" | "split-boundary" | "split" => Ok(SelectionMode::SplitBoundary),
        "apply" => Ok(SelectionMode::Apply),
        other => anyhow::bail!("Unknown selection mode: {}", other),
    }
}

/// Serialize a command result, or describe why it failed.
fn respond<T: Serialize>(result: Result<T>) -> String {
    let json = match result {
        Ok(value) => serde_json::to_string_pretty(&value),
        Err(err) => match err.downcast_ref::<PlanError>() {
            Some(plan_err) => serde_json::to_string_pretty(&SelectionErrorResult {
                error: format!("{:#}", err),
                invalid_tokens: plan_err.errors().to_vec(),
            }),
            None => {
                tracing::warn!(error = %format!("{:#}", err), "tool call failed");
                return format!("Error: {:#}", err);
            }
        },
    };
    json.unwrap_or_else(|e| format!("Error: {}", e))
}

fn opt_path(path: &Option<String>) -> Option<&Path> {
    path.as_deref().map(Path::new)
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

impl PdfServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Get PDF metadata, page count, and the size and rotation of every page")]
    fn pdf_info(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        respond(commands::info::run(&path))
    }

    #[tool(description = "Check a page specification like '1-3,5,7-9' against a PDF without writing anything. Returns zero-based indices and every invalid token.")]
    fn pdf_validate_pages(&self, Parameters(req): Parameters<ValidatePagesRequest>) -> String {
        respond(parse_mode(req.mode.as_deref()).and_then(|mode| {
            commands::validate::run(&req.pages, Some(Path::new(&req.path)), None, mode)
        }))
    }

    #[tool(description = "Copy pages into a new PDF in the order given. Repeated pages are kept.")]
    fn pdf_extract(&self, Parameters(req): Parameters<PageSelectionRequest>) -> String {
        respond(commands::extract::run(
            Path::new(&req.path),
            &req.pages,
            opt_path(&req.output),
        ))
    }

    #[tool(description = "Delete pages from a PDF and save the result to a new file")]
    fn pdf_remove(&self, Parameters(req): Parameters<PageSelectionRequest>) -> String {
        respond(commands::remove::run(
            Path::new(&req.path),
            &req.pages,
            opt_path(&req.output),
        ))
    }

    #[tool(description = "Split a PDF into one file per range (ranges may overlap), or one file per page")]
    fn pdf_split(&self, Parameters(req): Parameters<SplitRequest>) -> String {
        respond(commands::split::run(
            Path::new(&req.path),
            req.ranges.as_deref(),
            opt_path(&req.output_dir),
        ))
    }

    #[tool(description = "Set the rotation of all or selected pages to 0, 90, 180 or 270 degrees")]
    fn pdf_rotate(&self, Parameters(req): Parameters<RotateRequest>) -> String {
        let Some(rotation) = Rotation::from_degrees(req.angle) else {
            return format!("Error: angle must be a multiple of 90, got {}", req.angle);
        };
        respond(commands::rotate::run(
            Path::new(&req.path),
            rotation,
            req.pages.as_deref(),
            opt_path(&req.output),
        ))
    }

    #[tool(description = "Draw centred watermark text on all or selected pages")]
    fn pdf_watermark(&self, Parameters(req): Parameters<WatermarkRequest>) -> String {
        let mut style = WatermarkStyle::default();
        if let Some(opacity) = req.opacity {
            style.opacity = opacity;
        }
        respond(commands::watermark::run(
            Path::new(&req.path),
            &req.text,
            req.pages.as_deref(),
            &style,
            opt_path(&req.output),
        ))
    }

    #[tool(description = "Combine two or more PDFs into one, in the order given")]
    fn pdf_merge(&self, Parameters(req): Parameters<MergeRequest>) -> String {
        let inputs: Vec<PathBuf> = req.inputs.iter().map(PathBuf::from).collect();
        respond(commands::merge::run(&inputs, opt_path(&req.output)))
    }

    #[tool(description = "Create a PDF from JPG or PNG images, one page per image sized to the image")]
    fn pdf_from_images(&self, Parameters(req): Parameters<ImagesRequest>) -> String {
        let images: Vec<PathBuf> = req.images.iter().map(PathBuf::from).collect();
        respond(commands::images::run(&images, opt_path(&req.output)))
    }

    #[tool(description = "Rewrite a PDF with unused objects dropped, objects packed into object streams and streams compressed, reporting the size change")]
    fn pdf_compress(&self, Parameters(req): Parameters<CompressRequest>) -> String {
        respond(commands::compress::run(
            Path::new(&req.path),
            opt_path(&req.output),
        ))
    }
}

impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF page tools. Page specifications are 1-based and comma-separated, e.g. \
                 '1-3,5,7-9'. Use pdf_validate_pages to check a specification, pdf_extract, \
                 pdf_remove and pdf_split to work with page selections, and pdf_rotate, \
                 pdf_watermark, pdf_merge, pdf_compress and pdf_info for whole documents, \
                 and pdf_from_images to build a PDF from JPG/PNG files. \
                 Invalid specifications are rejected as a whole with one entry per bad token."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = PdfServer::new();
    tracing::info!("serving MCP over stdio");

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
